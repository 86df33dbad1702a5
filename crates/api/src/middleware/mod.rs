//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (recorded on the span, echoed in the response)
//! 5. Rate limiting (governor), when enabled

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{CartIdentity, GUEST_ID_HEADER, OptionalAuth, RequireAdmin, RequireAuth};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
