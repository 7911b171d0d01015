//! Noor Abaya Core - Shared types library.
//!
//! This crate provides the domain types used across the Noor Abaya components:
//! - `storefront` - Public-facing storefront API
//! - `cli` - Command-line tools for migrations and previews
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Persistence of carts and wishlists lives in the
//! storefront crate, which wraps these containers with a write-through store.
//!
//! # Modules
//!
//! - [`types`] - Currencies, locales, cart/wishlist containers, emails, order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
