pub mod follow_store;
pub mod post_store;
pub mod repositories;
pub mod user_store;
