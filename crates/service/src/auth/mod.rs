//! Auth module: domain types, credential hashing and the service that
//! registers users, checks passwords and issues/verifies bearer tokens.

pub mod domain;
pub mod errors;
pub mod hasher;
pub mod service;

pub use hasher::{Argon2Hasher, CredentialHasher};
pub use service::{AuthService, TokenConfig};
