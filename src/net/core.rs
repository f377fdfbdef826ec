//! The network controller: a bounded registry of places and transitions,
//! the two-call arc construction protocol, the enabled-set computation and
//! the random single-step firing policy.
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::slots::SlotTable;
use crate::net::structure::{Place, Point, Tokens, Transition};

/// Maximum number of places a network can hold.
pub const PLACE_CAPACITY: usize = 10;

/// Maximum number of transitions a network can hold.
pub const TRANSITION_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Place,
    Transition,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Place => f.write_str("place"),
            NodeKind::Transition => f.write_str("transition"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NetError {
    #[error("{kind} table is full ({capacity} slots)")]
    CapacityExceeded { kind: NodeKind, capacity: usize },
    #[error("no {kind} with id {id}")]
    NotFound { kind: NodeKind, id: u8 },
}

/// Either end of an arc under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Place(PlaceId),
    Transition(TransitionId),
}

/// Outcome of a single simulation step. `NoEnabledTransition` is the normal
/// terminal condition, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fired(TransitionId),
    NoEnabledTransition,
}

/// State of the two-call arc construction/removal protocol. The first
/// designated endpoint fixes the direction; `to_place` mirrors that choice
/// (transition designated first means the arc will run transition-to-place).
#[derive(Debug, Clone, Copy, Default)]
struct PendingArc {
    place: Option<PlaceId>,
    transition: Option<TransitionId>,
    to_place: bool,
    direction_set: bool,
}

fn fresh_rng() -> StdRng {
    StdRng::from_os_rng()
}

/// A Petri net: the one consistency domain of this crate. All mutation goes
/// through `&mut Network`; a multi-threaded host must wrap it in its own
/// mutual exclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub(crate) places: SlotTable<PlaceId, Place>,
    pub(crate) transitions: SlotTable<TransitionId, Transition>,
    #[serde(skip)]
    pending: PendingArc,
    #[serde(skip, default = "fresh_rng")]
    rng: StdRng,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            places: SlotTable::with_capacity(PLACE_CAPACITY),
            transitions: SlotTable::with_capacity(TRANSITION_CAPACITY),
            pending: PendingArc::default(),
            rng: fresh_rng(),
        }
    }

    /// A network whose firing choices are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(id)
    }

    pub fn place_mut(&mut self, id: PlaceId) -> Option<&mut Place> {
        self.places.get_mut(id)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id)
    }

    pub fn transition_mut(&mut self, id: TransitionId) -> Option<&mut Transition> {
        self.transitions.get_mut(id)
    }

    pub fn places(&self) -> impl Iterator<Item = (PlaceId, &Place)> {
        self.places.iter()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions.iter()
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Token counts of every place, in ascending id order.
    pub fn marking(&self) -> Vec<(PlaceId, Tokens)> {
        self.places
            .iter()
            .map(|(id, place)| (id, place.tokens()))
            .collect()
    }

    pub fn add_place(&mut self, x: u16, y: u16) -> Result<PlaceId, NetError> {
        let id = self
            .places
            .insert_with(|id| Place::new(id, Point::new(x, y)))
            .ok_or(NetError::CapacityExceeded {
                kind: NodeKind::Place,
                capacity: PLACE_CAPACITY,
            })?;
        log::trace!("added place {id} at ({x}, {y})");
        Ok(id)
    }

    pub fn add_transition(&mut self, x: u16, y: u16) -> Result<TransitionId, NetError> {
        let id = self
            .transitions
            .insert_with(|id| Transition::new(id, Point::new(x, y)))
            .ok_or(NetError::CapacityExceeded {
                kind: NodeKind::Transition,
                capacity: TRANSITION_CAPACITY,
            })?;
        log::trace!("added transition {id} at ({x}, {y})");
        Ok(id)
    }

    /// Removes a place and detaches every arc touching it. Detachment is
    /// eager: the freed id may be handed out again by the next add, and no
    /// arc created against the previous owner may survive that.
    pub fn remove_place(&mut self, id: PlaceId) -> Result<(), NetError> {
        let mut place = self.places.remove(id).ok_or(NetError::NotFound {
            kind: NodeKind::Place,
            id: id.raw(),
        })?;
        place.invalidate();
        for (_, transition) in self.transitions.iter_mut() {
            transition.arcs_in.retain(|arc| arc.target() != Some(id));
            transition.arcs_out.retain(|arc| arc.target() != Some(id));
        }
        if self.pending.place == Some(id) {
            self.pending.place = None;
        }
        log::trace!("removed place {id}");
        Ok(())
    }

    pub fn remove_transition(&mut self, id: TransitionId) -> Result<(), NetError> {
        let mut transition = self.transitions.remove(id).ok_or(NetError::NotFound {
            kind: NodeKind::Transition,
            id: id.raw(),
        })?;
        transition.invalidate();
        for (_, place) in self.places.iter_mut() {
            place.arcs.retain(|arc| arc.target() != Some(id));
        }
        if self.pending.transition == Some(id) {
            self.pending.transition = None;
        }
        log::trace!("removed transition {id}");
        Ok(())
    }

    /// First place whose extent contains the point; the lowest id wins when
    /// entities overlap. The extent is supplied by the rendering host.
    pub fn locate_place_at(&self, x: u16, y: u16, width: u16, height: u16) -> Option<PlaceId> {
        self.places
            .iter()
            .find(|(_, place)| place.contains(x, y, width, height))
            .map(|(id, _)| id)
    }

    pub fn locate_transition_at(
        &self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Option<TransitionId> {
        self.transitions
            .iter()
            .find(|(_, transition)| transition.contains(x, y, width, height))
            .map(|(id, _)| id)
    }

    /// Removes the place under the point, if any, and reports which one.
    pub fn remove_place_at(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Option<PlaceId> {
        let id = self.locate_place_at(x, y, width, height)?;
        self.remove_place(id).ok()?;
        Some(id)
    }

    pub fn remove_transition_at(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Option<TransitionId> {
        let id = self.locate_transition_at(x, y, width, height)?;
        self.remove_transition(id).ok()?;
        Some(id)
    }

    /// Drops a token on the place under the point, if any.
    pub fn add_token_at(&mut self, x: u16, y: u16, width: u16, height: u16) -> Option<PlaceId> {
        let id = self.locate_place_at(x, y, width, height)?;
        self.places[id].add_token();
        Some(id)
    }

    /// Takes a token from the place under the point. `Some(false)` means the
    /// place was found but already empty.
    pub fn remove_token_at(&mut self, x: u16, y: u16, width: u16, height: u16) -> Option<bool> {
        let id = self.locate_place_at(x, y, width, height)?;
        Some(self.places[id].remove_token())
    }

    pub fn add_token(&mut self, id: PlaceId) -> Result<(), NetError> {
        let place = self.places.get_mut(id).ok_or(NetError::NotFound {
            kind: NodeKind::Place,
            id: id.raw(),
        })?;
        place.add_token();
        Ok(())
    }

    /// `Ok(false)` when the place exists but is already empty.
    pub fn remove_token(&mut self, id: PlaceId) -> Result<bool, NetError> {
        let place = self.places.get_mut(id).ok_or(NetError::NotFound {
            kind: NodeKind::Place,
            id: id.raw(),
        })?;
        Ok(place.remove_token())
    }

    pub fn tokens(&self, id: PlaceId) -> Option<Tokens> {
        self.places.get(id).map(Place::tokens)
    }

    /// Designates one end of the arc being built or removed. The first
    /// designation fixes the direction; a repeated designation of the same
    /// kind replaces the candidate without changing it. Returns `false` when
    /// the endpoint no longer exists.
    pub fn begin_arc(&mut self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Place(id) => {
                if !self.places.contains(id) {
                    return false;
                }
                self.pending.place = Some(id);
                if !self.pending.direction_set {
                    self.pending.to_place = false;
                    self.pending.direction_set = true;
                }
            }
            Endpoint::Transition(id) => {
                if !self.transitions.contains(id) {
                    return false;
                }
                self.pending.transition = Some(id);
                if !self.pending.direction_set {
                    self.pending.to_place = true;
                    self.pending.direction_set = true;
                }
            }
        }
        true
    }

    /// Creates the arc between the two designated endpoints. Without a
    /// compatible pair this is a no-op; either way the pending state is
    /// cleared.
    pub fn complete_arc(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let (Some(p), Some(t)) = (pending.place, pending.transition) else {
            return;
        };
        if !self.places.contains(p) || !self.transitions.contains(t) {
            return;
        }
        if pending.to_place {
            self.transitions[t].add_arc_out(p);
            log::trace!("added arc {t} -> {p}");
        } else if self.places[p].add_arc(t) {
            self.transitions[t].link_arc_in(p);
            log::trace!("added arc {p} -> {t}");
        }
    }

    /// Flags the existing arc between the two designated endpoints for lazy
    /// removal; the owner purges it on its next sweep. Clears pending state
    /// like [`Network::complete_arc`].
    pub fn remove_arc(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let (Some(p), Some(t)) = (pending.place, pending.transition) else {
            return;
        };
        if pending.to_place {
            if let Some(transition) = self.transitions.get_mut(t)
                && transition.flag_arc_out_removal(p)
            {
                log::trace!("flagged arc {t} -> {p} for removal");
            }
        } else {
            let flagged = self
                .places
                .get_mut(p)
                .is_some_and(|place| place.flag_arc_removal(t));
            if flagged {
                if let Some(transition) = self.transitions.get_mut(t) {
                    transition.unlink_arc_in(p);
                }
                log::trace!("flagged arc {p} -> {t} for removal");
            }
        }
    }

    /// Abandons the arc protocol without creating or removing anything.
    pub fn cancel_arc(&mut self) {
        self.pending = PendingArc::default();
    }

    /// A transition is enabled iff it has at least one incoming arc and
    /// every source place holds a token. A transition with no inputs is
    /// never enabled.
    pub fn is_enabled(&self, id: TransitionId) -> bool {
        let Some(transition) = self.transitions.get(id) else {
            return false;
        };
        let mut has_input = false;
        for source in transition.input_places() {
            has_input = true;
            match self.places.get(source) {
                Some(place) if place.tokens() >= 1 => {}
                _ => return false,
            }
        }
        has_input
    }

    pub fn enabled_transitions(&self) -> Vec<TransitionId> {
        self.transitions
            .iter()
            .filter(|(id, _)| self.is_enabled(*id))
            .map(|(id, _)| id)
            .collect()
    }

    /// Fires a transition: one token leaves every source place, one token
    /// arrives at every destination place, in arc order. Enabledness is the
    /// caller's responsibility and is not re-checked.
    pub fn fire(&mut self, id: TransitionId) -> Result<(), NetError> {
        if !self.transitions.contains(id) {
            return Err(NetError::NotFound {
                kind: NodeKind::Transition,
                id: id.raw(),
            });
        }
        self.fire_inner(id);
        Ok(())
    }

    fn fire_inner(&mut self, id: TransitionId) {
        let transition = &self.transitions[id];
        let sources: Vec<PlaceId> = transition.input_places().collect();
        let destinations: Vec<PlaceId> = transition.output_places().collect();
        for source in &sources {
            if let Some(place) = self.places.get_mut(*source) {
                place.remove_token();
            }
        }
        for destination in &destinations {
            if let Some(place) = self.places.get_mut(*destination) {
                place.add_token();
            }
        }
        log::debug!(
            "fired {id}: {} token(s) consumed, {} produced",
            sources.len(),
            destinations.len()
        );
    }

    /// Runs one round of simulation: sweeps stale arcs, computes the enabled
    /// set and fires one member chosen uniformly at random. The choice is
    /// memoryless; callers wanting continuous simulation re-invoke `step`
    /// until it reports [`Step::NoEnabledTransition`].
    pub fn step(&mut self) -> Step {
        self.sweep();
        let enabled = self.enabled_transitions();
        if enabled.is_empty() {
            log::debug!("no enabled transition");
            return Step::NoEnabledTransition;
        }
        let chosen = enabled[self.rng.random_range(0..enabled.len())];
        self.fire_inner(chosen);
        Step::Fired(chosen)
    }

    /// Purges removal-flagged and dangling arcs from every arc list.
    pub(crate) fn sweep(&mut self) {
        let Self {
            places,
            transitions,
            ..
        } = self;
        for (_, place) in places.iter_mut() {
            place.sweep_arcs(|t| transitions.contains(t));
        }
        for (_, transition) in transitions.iter_mut() {
            transition.sweep_arcs(|p| places.contains(p));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(net: &mut Network, from: Endpoint, to: Endpoint) {
        assert!(net.begin_arc(from));
        assert!(net.begin_arc(to));
        net.complete_arc();
    }

    #[test]
    fn capacity_is_enforced_without_mutation() {
        let mut net = Network::new();
        for _ in 0..PLACE_CAPACITY {
            net.add_place(0, 0).unwrap();
        }
        let err = net.add_place(5, 5).unwrap_err();
        assert_eq!(
            err,
            NetError::CapacityExceeded {
                kind: NodeKind::Place,
                capacity: PLACE_CAPACITY,
            }
        );
        assert_eq!(net.place_count(), PLACE_CAPACITY);
    }

    #[test]
    fn freed_slot_is_reused_by_next_add() {
        let mut net = Network::new();
        let p0 = net.add_place(0, 0).unwrap();
        let _p1 = net.add_place(10, 0).unwrap();
        net.remove_place(p0).unwrap();
        let p2 = net.add_place(20, 0).unwrap();
        assert_eq!(p2, p0);
    }

    #[test]
    fn transition_without_inputs_is_never_enabled() {
        let mut net = Network::new();
        let p = net.add_place(0, 0).unwrap();
        let t = net.add_transition(100, 0).unwrap();
        connect(&mut net, Endpoint::Transition(t), Endpoint::Place(p));
        for _ in 0..3 {
            net.add_token(p).unwrap();
        }
        assert!(!net.is_enabled(t));
        assert_eq!(net.step(), Step::NoEnabledTransition);
        assert_eq!(net.tokens(p), Some(3));
    }

    #[test]
    fn enabled_iff_every_input_place_has_a_token() {
        let mut net = Network::new();
        let p0 = net.add_place(0, 0).unwrap();
        let p1 = net.add_place(0, 100).unwrap();
        let t = net.add_transition(100, 50).unwrap();
        connect(&mut net, Endpoint::Place(p0), Endpoint::Transition(t));
        connect(&mut net, Endpoint::Place(p1), Endpoint::Transition(t));

        assert!(!net.is_enabled(t));
        net.add_token(p0).unwrap();
        assert!(!net.is_enabled(t));
        net.add_token(p1).unwrap();
        assert!(net.is_enabled(t));
    }

    #[test]
    fn firing_moves_exactly_one_token_per_arc() {
        let mut net = Network::new();
        let p0 = net.add_place(0, 0).unwrap();
        let p1 = net.add_place(200, 0).unwrap();
        let unrelated = net.add_place(0, 200).unwrap();
        let t = net.add_transition(100, 0).unwrap();
        connect(&mut net, Endpoint::Place(p0), Endpoint::Transition(t));
        connect(&mut net, Endpoint::Transition(t), Endpoint::Place(p1));
        net.add_token(p0).unwrap();
        net.add_token(p0).unwrap();
        net.add_token(unrelated).unwrap();

        net.fire(t).unwrap();
        assert_eq!(net.tokens(p0), Some(1));
        assert_eq!(net.tokens(p1), Some(1));
        assert_eq!(net.tokens(unrelated), Some(1));
    }

    #[test]
    fn single_transition_fires_then_deadlocks() {
        let mut net = Network::with_seed(7);
        let p0 = net.add_place(0, 0).unwrap();
        let t0 = net.add_transition(100, 0).unwrap();
        connect(&mut net, Endpoint::Place(p0), Endpoint::Transition(t0));
        net.add_token(p0).unwrap();

        assert_eq!(net.step(), Step::Fired(t0));
        assert_eq!(net.tokens(p0), Some(0));
        assert_eq!(net.step(), Step::NoEnabledTransition);
    }

    #[test]
    fn chain_moves_the_token_to_the_sink() {
        let mut net = Network::with_seed(7);
        let p0 = net.add_place(0, 0).unwrap();
        let p1 = net.add_place(200, 0).unwrap();
        let t0 = net.add_transition(100, 0).unwrap();
        connect(&mut net, Endpoint::Place(p0), Endpoint::Transition(t0));
        connect(&mut net, Endpoint::Transition(t0), Endpoint::Place(p1));
        net.add_token(p0).unwrap();

        assert_eq!(net.step(), Step::Fired(t0));
        assert_eq!(net.tokens(p0), Some(0));
        assert_eq!(net.tokens(p1), Some(1));
        assert_eq!(net.step(), Step::NoEnabledTransition);
        assert_eq!(net.step(), Step::NoEnabledTransition);
    }

    #[test]
    fn direction_follows_the_first_designated_endpoint() {
        let mut net = Network::new();
        let p = net.add_place(0, 0).unwrap();
        let t = net.add_transition(100, 0).unwrap();

        // place first: place -> transition
        connect(&mut net, Endpoint::Place(p), Endpoint::Transition(t));
        assert_eq!(net.place(p).unwrap().arcs().len(), 1);
        assert!(net.transition(t).unwrap().arcs_out().is_empty());

        // transition first: transition -> place
        connect(&mut net, Endpoint::Transition(t), Endpoint::Place(p));
        assert_eq!(net.transition(t).unwrap().arcs_out().len(), 1);
    }

    #[test]
    fn incomplete_pair_creates_nothing_but_clears_state() {
        let mut net = Network::new();
        let p0 = net.add_place(0, 0).unwrap();
        let p1 = net.add_place(0, 100).unwrap();
        let t = net.add_transition(100, 0).unwrap();

        // two places, no transition: nothing to build
        assert!(net.begin_arc(Endpoint::Place(p0)));
        assert!(net.begin_arc(Endpoint::Place(p1)));
        net.complete_arc();
        assert!(net.place(p0).unwrap().arcs().is_empty());
        assert!(net.place(p1).unwrap().arcs().is_empty());

        // the cleared state means a fresh direction choice
        connect(&mut net, Endpoint::Transition(t), Endpoint::Place(p0));
        assert_eq!(net.transition(t).unwrap().arcs_out().len(), 1);
    }

    #[test]
    fn removed_arc_no_longer_enables() {
        let mut net = Network::with_seed(1);
        let p = net.add_place(0, 0).unwrap();
        let t = net.add_transition(100, 0).unwrap();
        connect(&mut net, Endpoint::Place(p), Endpoint::Transition(t));
        net.add_token(p).unwrap();
        assert!(net.is_enabled(t));

        net.begin_arc(Endpoint::Place(p));
        net.begin_arc(Endpoint::Transition(t));
        net.remove_arc();
        assert!(!net.is_enabled(t));
        assert_eq!(net.step(), Step::NoEnabledTransition);
        // the sweep in step() purged the flagged arc from its owner
        assert!(net.place(p).unwrap().arcs().is_empty());
    }

    #[test]
    fn removing_a_place_detaches_its_arcs() {
        let mut net = Network::with_seed(1);
        let p0 = net.add_place(0, 0).unwrap();
        let p1 = net.add_place(200, 0).unwrap();
        let t = net.add_transition(100, 0).unwrap();
        connect(&mut net, Endpoint::Place(p0), Endpoint::Transition(t));
        connect(&mut net, Endpoint::Transition(t), Endpoint::Place(p1));
        net.add_token(p0).unwrap();
        assert!(net.is_enabled(t));

        net.remove_place(p0).unwrap();
        assert!(!net.is_enabled(t));
        assert!(net.transition(t).unwrap().input_places().next().is_none());

        // the freed id comes back clean
        let p2 = net.add_place(50, 50).unwrap();
        assert_eq!(p2, p0);
        net.add_token(p2).unwrap();
        assert!(!net.is_enabled(t));
    }

    #[test]
    fn removing_a_missing_entity_reports_not_found() {
        let mut net = Network::new();
        let err = net.remove_transition(TransitionId::new(4)).unwrap_err();
        assert_eq!(
            err,
            NetError::NotFound {
                kind: NodeKind::Transition,
                id: 4,
            }
        );
    }

    #[test]
    fn hit_testing_prefers_the_lowest_id() {
        let mut net = Network::new();
        let p0 = net.add_place(100, 100).unwrap();
        let _p1 = net.add_place(110, 110).unwrap();
        assert_eq!(net.locate_place_at(115, 115, 50, 50), Some(p0));
        assert_eq!(net.locate_place_at(500, 500, 50, 50), None);
    }

    #[test]
    fn point_addressed_edits_hit_the_expected_place() {
        let mut net = Network::new();
        let p = net.add_place(100, 100).unwrap();
        assert_eq!(net.add_token_at(120, 120, 50, 50), Some(p));
        assert_eq!(net.tokens(p), Some(1));
        assert_eq!(net.remove_token_at(120, 120, 50, 50), Some(true));
        assert_eq!(net.remove_token_at(120, 120, 50, 50), Some(false));
        assert_eq!(net.add_token_at(500, 500, 50, 50), None);

        assert_eq!(net.remove_place_at(100, 100, 50, 50), Some(p));
        assert_eq!(net.place_count(), 0);
        assert_eq!(net.remove_place_at(100, 100, 50, 50), None);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        fn build() -> Network {
            let mut net = Network::with_seed(42);
            let p0 = net.add_place(0, 0).unwrap();
            let p1 = net.add_place(0, 100).unwrap();
            let t0 = net.add_transition(100, 0).unwrap();
            let t1 = net.add_transition(100, 100).unwrap();
            for (p, t) in [(p0, t0), (p0, t1), (p1, t0), (p1, t1)] {
                net.begin_arc(Endpoint::Place(p));
                net.begin_arc(Endpoint::Transition(t));
                net.complete_arc();
                net.begin_arc(Endpoint::Transition(t));
                net.begin_arc(Endpoint::Place(p));
                net.complete_arc();
            }
            for _ in 0..3 {
                net.add_token(p0).unwrap();
                net.add_token(p1).unwrap();
            }
            net
        }

        let mut left = build();
        let mut right = build();
        for _ in 0..50 {
            assert_eq!(left.step(), right.step());
        }
    }

    #[test]
    fn marking_never_goes_negative() {
        let mut net = Network::with_seed(3);
        let p = net.add_place(0, 0).unwrap();
        let t = net.add_transition(100, 0).unwrap();
        connect(&mut net, Endpoint::Place(p), Endpoint::Transition(t));
        net.add_token(p).unwrap();
        for _ in 0..10 {
            net.step();
            assert!(net.marking().iter().all(|(_, tokens)| *tokens <= 1));
        }
        assert_eq!(net.tokens(p), Some(0));
    }
}
