//! Static structure of the net: places, transitions and the arcs they own.
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};

/// Arc storage; most entities carry only a handful of arcs.
pub type ArcList<I> = SmallVec<[Arc<I>; 4]>;

/// Token count of a single place. Stored on the wire as a 16-bit field.
pub type Tokens = u16;

/// Layout metadata carried for the benefit of a rendering host. The engine
/// stores and round-trips it but never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcDirection {
    PlaceToTransition,
    TransitionToPlace,
}

/// Resolves raw single-byte ids from the wire into live identifiers.
/// Consulted once per decoded arc, after every record has been read.
pub trait IdResolver {
    fn place(&self, raw: u8) -> Option<PlaceId>;
    fn transition(&self, raw: u8) -> Option<TransitionId>;
}

/// Identifier kinds an [`Arc`] may point at.
pub trait ArcEnd: Copy + Eq + fmt::Debug {
    fn raw_id(self) -> u8;
    fn resolve_with(resolver: &dyn IdResolver, raw: u8) -> Option<Self>;
}

impl ArcEnd for PlaceId {
    fn raw_id(self) -> u8 {
        self.raw()
    }

    fn resolve_with(resolver: &dyn IdResolver, raw: u8) -> Option<Self> {
        resolver.place(raw)
    }
}

impl ArcEnd for TransitionId {
    fn raw_id(self) -> u8 {
        self.raw()
    }

    fn resolve_with(resolver: &dyn IdResolver, raw: u8) -> Option<Self> {
        resolver.transition(raw)
    }
}

/// A directed edge between a place and a transition, stored on its owning
/// entity. The opposite endpoint is kept as a raw id plus, once resolved, a
/// live identifier; the two only diverge between decode and the resolution
/// pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc<I> {
    direction: ArcDirection,
    raw: u8,
    target: Option<I>,
    removing: bool,
}

impl<I: ArcEnd> Arc<I> {
    pub fn linked(direction: ArcDirection, target: I) -> Self {
        Self {
            direction,
            raw: target.raw_id(),
            target: Some(target),
            removing: false,
        }
    }

    /// An arc fresh off the wire, pointing at a not-yet-resolved raw id.
    pub fn deferred(direction: ArcDirection, raw: u8) -> Self {
        Self {
            direction,
            raw,
            target: None,
            removing: false,
        }
    }

    pub fn direction(&self) -> ArcDirection {
        self.direction
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }

    /// Live opposite endpoint. Arcs flagged for removal no longer have one.
    pub fn target(&self) -> Option<I> {
        if self.removing { None } else { self.target }
    }

    pub fn flag_removal(&mut self) {
        self.removing = true;
    }

    pub fn is_removing(&self) -> bool {
        self.removing
    }

    /// Looks the raw id up once all records exist. An id that does not
    /// resolve leaves the arc dangling; dangling arcs are purged the next
    /// time the owner's arc list is swept.
    pub fn resolve(&mut self, resolver: &dyn IdResolver) {
        if self.target.is_none() {
            self.target = I::resolve_with(resolver, self.raw);
        }
    }
}

/// A token holder. Owns its outgoing (place-to-transition) arcs; arcs ending
/// at a place are owned by the transition on the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    id: PlaceId,
    pub pos: Point,
    tokens: Tokens,
    valid: bool,
    pub(crate) arcs: ArcList<TransitionId>,
}

impl Place {
    pub fn new(id: PlaceId, pos: Point) -> Self {
        Self {
            id,
            pos,
            tokens: 0,
            valid: true,
            arcs: ArcList::new(),
        }
    }

    pub fn id(&self) -> PlaceId {
        self.id
    }

    pub fn tokens(&self) -> Tokens {
        self.tokens
    }

    pub fn add_token(&mut self) {
        self.tokens = self.tokens.saturating_add(1);
    }

    /// Reports `false` when the place is already empty; the count never
    /// underflows.
    pub fn remove_token(&mut self) -> bool {
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn set_tokens(&mut self, tokens: Tokens) {
        self.tokens = tokens;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn move_to(&mut self, pos: Point) {
        self.pos = pos;
    }

    /// Hit test against a caller-supplied extent (entity size is a rendering
    /// concern, inclusive on all edges).
    pub fn contains(&self, x: u16, y: u16, width: u16, height: u16) -> bool {
        x >= self.pos.x
            && x <= self.pos.x.saturating_add(width)
            && y >= self.pos.y
            && y <= self.pos.y.saturating_add(height)
    }

    pub fn arcs(&self) -> &[Arc<TransitionId>] {
        &self.arcs
    }

    /// Adds an outgoing arc to the given transition. Idempotent: a second
    /// arc to the same transition is not created. Returns whether an arc was
    /// created.
    pub fn add_arc(&mut self, transition: TransitionId) -> bool {
        if self.arcs.iter().any(|arc| arc.target() == Some(transition)) {
            return false;
        }
        self.arcs
            .push(Arc::linked(ArcDirection::PlaceToTransition, transition));
        true
    }

    /// Flags the arc to the given transition for removal. Returns whether a
    /// matching arc was found.
    pub fn flag_arc_removal(&mut self, transition: TransitionId) -> bool {
        for arc in &mut self.arcs {
            if arc.target() == Some(transition) {
                arc.flag_removal();
                return true;
            }
        }
        false
    }

    /// Drops removal-flagged and dangling arcs. `live` reports whether the
    /// transition at the far end still exists.
    pub(crate) fn sweep_arcs(&mut self, live: impl Fn(TransitionId) -> bool) {
        self.arcs.retain(|arc| arc.target().is_some_and(&live));
    }
}

/// A firing rule. Owns its outgoing (transition-to-place) arcs and holds a
/// linked, non-owning view of the place-to-transition arcs arriving at it.
/// The incoming view is what decides enabling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    id: TransitionId,
    pub pos: Point,
    valid: bool,
    pub(crate) arcs_in: ArcList<PlaceId>,
    pub(crate) arcs_out: ArcList<PlaceId>,
}

impl Transition {
    pub fn new(id: TransitionId, pos: Point) -> Self {
        Self {
            id,
            pos,
            valid: true,
            arcs_in: ArcList::new(),
            arcs_out: ArcList::new(),
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn move_to(&mut self, pos: Point) {
        self.pos = pos;
    }

    pub fn contains(&self, x: u16, y: u16, width: u16, height: u16) -> bool {
        x >= self.pos.x
            && x <= self.pos.x.saturating_add(width)
            && y >= self.pos.y
            && y <= self.pos.y.saturating_add(height)
    }

    pub fn arcs_out(&self) -> &[Arc<PlaceId>] {
        &self.arcs_out
    }

    /// Source places of the live incoming arcs, in arc order.
    pub fn input_places(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.arcs_in.iter().filter_map(Arc::target)
    }

    /// Destination places of the live outgoing arcs, in arc order.
    pub fn output_places(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.arcs_out.iter().filter_map(Arc::target)
    }

    /// Adds an outgoing arc to the given place. Idempotent, like
    /// [`Place::add_arc`].
    pub fn add_arc_out(&mut self, place: PlaceId) -> bool {
        if self.arcs_out.iter().any(|arc| arc.target() == Some(place)) {
            return false;
        }
        self.arcs_out
            .push(Arc::linked(ArcDirection::TransitionToPlace, place));
        true
    }

    pub fn flag_arc_out_removal(&mut self, place: PlaceId) -> bool {
        for arc in &mut self.arcs_out {
            if arc.target() == Some(place) {
                arc.flag_removal();
                return true;
            }
        }
        false
    }

    /// Records a place-to-transition arc arriving here. Called by the
    /// connected place's owner when the arc is created or resolved.
    pub(crate) fn link_arc_in(&mut self, source: PlaceId) {
        self.arcs_in
            .push(Arc::linked(ArcDirection::PlaceToTransition, source));
    }

    /// Drops the incoming link from the given place, if present.
    pub(crate) fn unlink_arc_in(&mut self, source: PlaceId) {
        if let Some(idx) = self
            .arcs_in
            .iter()
            .position(|arc| arc.target() == Some(source))
        {
            self.arcs_in.remove(idx);
        }
    }

    pub(crate) fn sweep_arcs(&mut self, live: impl Fn(PlaceId) -> bool) {
        self.arcs_in.retain(|arc| arc.target().is_some_and(&live));
        self.arcs_out.retain(|arc| arc.target().is_some_and(&live));
    }
}
