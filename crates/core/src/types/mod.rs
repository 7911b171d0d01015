//! Core types for Noor Abaya.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod currency;
pub mod email;
pub mod locale;
pub mod status;
pub mod wishlist;

pub use cart::{Cart, CartItem, LineKey};
pub use currency::{Currency, CurrencyCode, CurrencyStyle, ParseCurrencyError, resolve_currency};
pub use email::{Email, EmailError};
pub use locale::{
    DEFAULT_LANGUAGE, Language, UnsupportedLanguage, currency_for_country, language_for_country,
    should_show_locale_confirm_popup,
};
pub use status::{InvalidTransition, OrderStatus, UnknownStatus};
pub use wishlist::{Wishlist, WishlistItem};
