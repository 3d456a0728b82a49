//! # API Module
//!
//! HTTP endpoints for the local callback server that backs the OAuth flow.
//!
//! ## Endpoints
//!
//! - [`callback`] - Handles OAuth callback requests from Tidal's
//!   authorization server. Completes the PKCE flow by exchanging the
//!   authorization code for an access token.
//! - [`health`] - Health check returning application status and version.
//!
//! The module is built on [Axum](https://docs.rs/axum); each endpoint is an
//! async function wired into the router in [`crate::server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
