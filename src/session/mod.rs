//! Cookie-identified server-side sessions.

mod store;

pub use store::{Session, SessionStore};
