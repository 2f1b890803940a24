pub mod otp;
pub mod phone_auth;
pub mod token;
pub mod user;
