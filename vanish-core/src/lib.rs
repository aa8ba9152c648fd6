//! Core of an ephemeral micro-posting service: posts and replies disappear
//! after a fixed lifetime (3 hours by default).
//!
//! The crate exposes three layers:
//! - `domain`: entities, validation, and the pure [`domain::expiry::ExpiryPolicy`];
//! - `data`: async store traits and their SQLite (sqlx) implementations;
//! - `application`: feed/social/account services and the background
//!   [`application::reaper::Reaper`] that reclaims expired rows.
//!
//! HTTP routing, sessions, and password hashing are adapter concerns and live
//! outside this crate.

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
