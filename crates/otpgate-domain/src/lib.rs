//! Domain types shared across otpgate crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Every layer may import it; it depends on nothing but serde and thiserror.

pub mod otp;
pub mod phone;
pub mod user;
