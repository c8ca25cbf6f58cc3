//! Core types for volo-sync.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod domain;
pub mod id;

pub use domain::{ShopDomain, ShopDomainError};
pub use id::*;
