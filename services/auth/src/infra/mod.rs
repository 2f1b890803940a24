pub mod db;
pub mod sms;
pub mod sweeper;
