//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP with the request's nonce, isolation headers)
//! 5. CSP nonce (generate per-request nonce for page scripts)
//! 6. Session layer (tower-sessions, in-memory store)
//! 7. Visitor (markers, visitor context, identity probe)
//! 8. Rate limiting (governor, per route group)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod visitor;

pub use auth::{
    AuthRejection, RequireAdmin, RequireSession, RequireUser, clear_credentials, write_login,
};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter, form_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use visitor::{Visitor, visitor_middleware};
