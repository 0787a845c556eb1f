//! Domain models for the storefront.

pub mod session;

pub use session::{Marker, Markers, VisitorId, keys as session_keys};
