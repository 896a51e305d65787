//! Request handlers.

pub mod embed;
pub mod files;
pub mod health;
pub mod thumbs;
pub mod videos;

pub use embed::*;
pub use files::*;
pub use health::*;
pub use thumbs::*;
pub use videos::*;
