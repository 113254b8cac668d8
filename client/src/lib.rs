//! Client core for the content API: authenticated GraphQL executor,
//! magic-link login, session persistence and the query catalog.

pub mod api;
pub mod auth;
pub mod error;
pub mod queries;
pub mod session;

pub use api::{Api, DEFAULT_API_URL};
pub use error::{ClientError, Result};
pub use session::{Session, SessionStore};
