pub mod account_service;
pub mod feed_service;
pub mod reaper;
pub mod social_service;
