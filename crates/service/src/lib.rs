//! Service layer for the business directory.
//! - `storage`: the persistence contract and its memory / SeaORM backends, which
//!   keep derived counters in step with every mutation.
//! - `services`: authorization and validation in front of storage.
//! - `auth`, `payment`: credential, token and payment-provider seams.

pub mod auth;
pub mod domain;
pub mod errors;
pub mod payment;
pub mod seed;
pub mod services;
pub mod storage;
#[cfg(test)]
pub mod test_support;

pub use errors::{ServiceError, ServiceResult};
pub use services::{Actor, Services};
pub use storage::Storage;
