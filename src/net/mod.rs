//! # Petri net core (Place/Transition net)
//!
//! A net is a bipartite graph of places `P` and transitions `T` joined by
//! directed arcs, each arc moving exactly one token. For a marking
//! `M ∈ ℕ^{|P|}`:
//!
//! * a transition `t` is **enabled** iff its incoming-arc set is non-empty
//!   and `M[p] ≥ 1` for every source place `p` of an incoming arc — a
//!   transition with no inputs is never enabled, the vacuous case is
//!   rejected by design;
//! * **firing** `t` removes one token from every source place and adds one
//!   token to every destination place, in arc order. Token conservation is
//!   not guaranteed in general; only the per-arc one-token transfer is.
//!
//! One simulation step picks uniformly at random from the enabled set and
//! fires; the choice is memoryless and `Step::NoEnabledTransition` is the
//! canonical stopping condition.
//!
//! Networks persist in the binary TPNS format ([`codec`]), with layout
//! coordinates carried opaquely for a rendering host.
//!
//! ## Example
//!
//! ```rust
//! use tpns::net::*;
//!
//! let mut net = Network::with_seed(1);
//! let p0 = net.add_place(0, 0)?;
//! let p1 = net.add_place(200, 0)?;
//! let t0 = net.add_transition(100, 0)?;
//!
//! net.begin_arc(Endpoint::Place(p0));
//! net.begin_arc(Endpoint::Transition(t0));
//! net.complete_arc();
//! net.begin_arc(Endpoint::Transition(t0));
//! net.begin_arc(Endpoint::Place(p1));
//! net.complete_arc();
//!
//! net.add_token(p0)?;
//! assert_eq!(net.step(), Step::Fired(t0));
//! assert_eq!(net.tokens(p1), Some(1));
//! assert_eq!(net.step(), Step::NoEnabledTransition);
//! # Ok::<(), tpns::net::NetError>(())
//! ```

pub mod codec;
pub mod core;
pub mod ids;
pub mod io;
pub mod slots;
pub mod structure;

pub use codec::{DecodeError, EncodeError};
pub use core::{
    Endpoint, NetError, Network, NodeKind, PLACE_CAPACITY, Step, TRANSITION_CAPACITY,
};
pub use ids::{PlaceId, TransitionId};
pub use slots::{Idx, SlotTable};
pub use structure::{Arc, ArcDirection, IdResolver, Place, Point, Tokens, Transition};
