//! # CLI Module
//!
//! User-facing command implementations for the Tidal migration tool. Each
//! command coordinates between the Tidal adapter, the migration engine and
//! the terminal: it connects the authenticated accounts, shows previews,
//! asks for confirmation, runs the requested plan and renders the final
//! per-stage report.
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`auth`] - Initiates the Tidal OAuth flow with PKCE for one account
//!   role (source or destination)
//!
//! ### Migration
//!
//! - [`migrate`] - Runs a migration plan between the two authorized
//!   accounts: everything, a single entity kind, or the destructive wipe
//!
//! ### Information
//!
//! - [`info`] - Shows remote library counts for an account
//!
//! ## Confirmation and Previews
//!
//! Mutating commands show the newest items of the affected listing and ask
//! for a y/n confirmation before the engine touches the destination; the
//! wipe path asks twice. `--yes` skips the prompts for scripted use. All of
//! this lives here; the engine itself never prompts, never prints.
//!
//! ## Error Presentation
//!
//! Stage aborts and per-item failure counts come back in the migration
//! report and are rendered as a table so a user can identify exactly what
//! needs manual follow-up. Fatal session errors terminate with a clear
//! pointer at `timicli auth`.

mod auth;
mod info;
mod migrate;

pub use auth::auth;
pub use info::info;
pub use migrate::migrate;
