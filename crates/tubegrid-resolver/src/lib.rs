//! Progressive thumbnail resolution.
//!
//! For each video card the machine tries the primary image through the
//! proxy, falls back to the secondary image, then polls the thumbnail-status
//! endpoint until the upstream produces a real image or the retry budget is
//! exhausted. Every card terminates in a visible state: a resolved image or
//! the built-in placeholder.
//!
//! The machine is free of any DOM or concrete transport; callers supply
//! [`ImageProbe`] and [`StatusProbe`] implementations. HTTP-backed probes
//! for the proxy surface ship in [`probe`].

pub mod card;
pub mod grid;
pub mod policy;
pub mod probe;

pub use card::{CardRequest, CardResolver, CardState};
pub use grid::GridResolver;
pub use policy::PollPolicy;
pub use probe::{HttpImageProbe, HttpStatusProbe, ImageProbe, ProbeError, StatusProbe};
