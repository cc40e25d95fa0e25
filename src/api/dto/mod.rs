//! Data Transfer Objects for REST request/response serialization.
//!
//! All monetary amounts are serialized as JSON strings to prevent
//! precision loss on u128 values.

pub mod common_dto;
pub mod domain_dto;

pub use common_dto::*;
pub use domain_dto::*;
