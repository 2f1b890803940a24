//! Auth types shared across otpgate crates.
//!
//! Provides JWT claims and validation plus the `AuthenticatedUser` bearer-token extractor.

pub mod identity;
pub mod token;
