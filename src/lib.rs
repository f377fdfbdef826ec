//! Interactive Petri net model, stochastic single-step simulator and TPNS
//! binary file codec. Rendering, selection and dialog hosts live elsewhere
//! and consume this crate through [`net::Network`].

pub mod net;

pub use net::{DecodeError, EncodeError, Endpoint, NetError, Network, Step};
