//! Bearer token values and their cached lifecycle.

pub mod cached;
pub mod secret;
