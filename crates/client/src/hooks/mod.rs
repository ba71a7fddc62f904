//! Dioxus bindings for the client state layer.

pub mod use_social_connections;

pub use use_social_connections::{use_auth_state, use_social_connections};
