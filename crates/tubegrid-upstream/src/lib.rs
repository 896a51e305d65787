//! Clients for the upstream video host.
//!
//! Two concerns live here:
//! - [`UpstreamClient`]: the host's JSON API (file listing, search, file
//!   info, thumbnail lookup), consumed by the REST passthrough handlers and
//!   the resolver's polling tier.
//! - [`ImageFetcher`]: raw image fetches against the host's CDN with the
//!   header spoofing the proxy pipeline needs to bypass referrer blocks.

pub mod client;
pub mod error;
pub mod image;

pub use client::{Envelope, UpstreamClient, UpstreamConfig};
pub use error::UpstreamError;
pub use image::{FetchedImage, ImageFetcher};
