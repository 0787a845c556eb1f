//! Core types for the SkillCoders storefront.
//!
//! Type-safe wrappers for the values that cross the platform API boundary.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
pub use price::{Price, PriceError};
pub use status::*;
