pub mod database;
pub mod logging;
pub mod settings;
