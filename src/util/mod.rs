pub mod parse;
pub mod permission;
pub mod retry;
pub mod throttle;
