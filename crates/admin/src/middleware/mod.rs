//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (reuse or generate `x-request-id`, recorded on the span)
//! 4. Security headers (fixed response headers)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limit (login only)
//! 7. Auth guard ([`RequireAdminAuth`] extractor on protected routes)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdminAuth, clear_admin_session, is_admin, mark_admin_session};
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers;
pub use session::create_session_layer;
