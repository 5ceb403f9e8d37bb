//! Middleware components for request processing.
//!
//! Applied outermost first: request ID, logging, session, locale.

mod error_handler;
mod locale;
mod logging;
mod request_id;
mod session;

pub use error_handler::{error_to_code, error_to_status_code, global_error_handler};
pub use locale::locale_middleware;
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use session::session_middleware;
