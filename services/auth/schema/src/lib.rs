//! sea-orm entities owned by the auth service.

pub mod otp_challenges;
pub mod refresh_tokens;
pub mod users;
