//! Bearer token verification for admin write endpoints.
//!
//! Admins sign in through an external identity provider; the admin UI then
//! holds an HS256 token signed with `JWT_SECRET`. This module only verifies
//! (and, for tooling and tests, issues) those tokens.

pub mod token;

pub use token::{Claims, TOKEN_LIFETIME_SECS, TokenVerifier};
