//! Shared types and utilities for the SocialPulse server and client.

pub mod error;
pub mod models;
pub mod platform;
pub mod social;

pub use error::*;
pub use models::*;
pub use platform::*;
pub use social::*;
