//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- user and admin token generation and validation.

pub mod jwt;
pub mod password;
