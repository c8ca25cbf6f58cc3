//! Volo Sync Core - Shared types library.
//!
//! This crate provides common types used by the volo-sync webhook receiver:
//! type-safe Shopify resource identifiers and the validated shop-domain
//! newtype used for tenant resolution.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no secrets.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify resource ids and shop domains

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
