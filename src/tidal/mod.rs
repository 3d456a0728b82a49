//! # Tidal Integration Module
//!
//! This module provides the interface to the Tidal Web API, implementing
//! authentication and the remote library operations the migration engine
//! consumes. It is the only layer that knows about HTTP, endpoint shapes
//! and JSON payloads; everything above it works against the
//! [`crate::migrate::LibraryService`] boundary.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, Orchestrator)
//!          ↓
//! Tidal Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE, one flow per account)
//!     └── TidalService (favorites, playlists, mutations)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Tidal Web API
//! ```
//!
//! ## Authentication Strategy
//!
//! The module implements OAuth 2.0 with PKCE, run once for the SOURCE and
//! once for the DESTINATION account:
//!
//! 1. **Code Verifier Generation**: Creates a cryptographically random verifier
//! 2. **Challenge Creation**: Derives a SHA256 challenge from the verifier
//! 3. **Authorization Request**: Directs the user to Tidal with the challenge
//! 4. **Local Callback**: Receives the authorization code via a temporary HTTP server
//! 5. **Token Exchange**: Exchanges code + verifier for an access token
//! 6. **Token Storage**: Persists the token per account role
//!
//! The token response carries the numeric Tidal user id, which the service
//! keeps because the favorites and playlist endpoints are addressed per
//! user.
//!
//! ## Error Classification
//!
//! Every failed call is classified at this boundary into the engine's
//! [`crate::migrate::ServiceError`] taxonomy:
//!
//! - **429 Too Many Requests** becomes `Throttled`, carrying the
//!   `retry-after` header when the service sends one
//! - **401 / 403** becomes `AuthExpired`
//! - **5xx** becomes `Transient`
//! - any other failing status becomes `Permanent`
//!
//! Backoff and retry policy live in the engine's rate limiter, not here;
//! the adapter only reports what happened.
//!
//! ## API Coverage
//!
//! ### Library listings (explicit `order` / `orderDirection` on every call)
//! - `GET /users/{id}/favorites/artists`
//! - `GET /users/{id}/favorites/albums`
//! - `GET /users/{id}/favorites/tracks`
//! - `GET /users/{id}/playlists`
//! - `GET /playlists/{uuid}/items` (positional order, no directive)
//!
//! ### Mutations
//! - `POST /users/{id}/favorites/{artists|albums|tracks}`
//! - `DELETE /users/{id}/favorites/tracks/{id}`
//! - `POST /users/{id}/playlists`
//! - `POST /playlists/{uuid}/items`
//!
//! ### Authentication
//! - `POST` token endpoint for exchange and refresh operations

pub mod auth;
pub mod service;

pub use service::TidalService;
