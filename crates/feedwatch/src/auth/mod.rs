//! Authentication module for upstream access.
//!
//! Provides the cookie-based session credential.

mod cookie;

pub use cookie::{cookie_header, CookieSource};
