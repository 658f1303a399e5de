//! Bearer token validation.
//!
//! Tokens are issued by the external identity provider; this server only
//! verifies them. See [`jwt`].

pub mod jwt;
