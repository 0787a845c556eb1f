//! Per-visitor services.
//!
//! - `auth` - login, registration and logout against the platform
//! - `cart_count` - the shared cart count with its one-time load
//! - `visitors` - visitor contexts and their registry

pub mod auth;
pub mod cart_count;
pub mod visitors;

pub use auth::{AuthError, AuthService, RegistrationInput};
pub use cart_count::{CartCounter, LoadPhase};
pub use visitors::{ProbeOutcome, VisitorContext, VisitorRegistry};
