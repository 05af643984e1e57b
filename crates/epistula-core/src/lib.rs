//! Core types of the Epistula web frontend.
//!
//! Everything here is independent of HTTP and rendering: the browser-side
//! session model (storage, unverified token claims, derived auth context),
//! pagination math, image fallback state, backend entities and the backend
//! URL resolution.

pub mod auth;
pub mod claims;
pub mod config;
pub mod entity;
pub mod image;
pub mod pagination;
pub mod session;

pub use auth::AuthContext;
pub use claims::TokenClaims;
pub use pagination::Pagination;
pub use session::{SessionStorage, SessionStore, UserProfile};

pub const LOG_TARGET: &str = "epistula::core";
