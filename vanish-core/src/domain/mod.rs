pub mod error;
pub mod expiry;
pub mod post;
pub mod user;
