//! Points, levels and achievement unlocks.
//!
//! `leveling` and `rules` are pure; `services` applies them to a user through
//! a `ProgressStore`, implemented over Postgres in `pg`.

pub mod leveling;
pub mod pg;
pub mod rules;
pub mod services;
pub mod store;
