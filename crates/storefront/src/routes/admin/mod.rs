//! Admin console route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin),
//! which only decides what renders. The platform checks the bearer token's
//! role again on every call these handlers make.

pub mod callbacks;
pub mod courses;
pub mod dashboard;
pub mod internships;
