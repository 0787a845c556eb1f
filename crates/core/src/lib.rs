//! SkillCoders Core - Shared types library.
//!
//! This crate provides the types and rules used by the storefront binary and
//! its integration tests:
//! - [`types`] - Newtype wrappers for ids, prices, emails, phone numbers and statuses
//! - [`access`] - Route access resolution from the session and role markers
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. This keeps the access rules testable in isolation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod types;

pub use access::{AccessClass, Decision, RoleMarker, Zone, resolve};
pub use types::*;
