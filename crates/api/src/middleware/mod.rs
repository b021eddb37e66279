//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction) - added in `main`
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. CORS (allow any origin, method and header)
//! 4. Request ID (fills the span field, Sentry tag and response header)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
