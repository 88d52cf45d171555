//! Marketplace credentials and the bearer token model handed out by the cache.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{cached::*, secret::*};
