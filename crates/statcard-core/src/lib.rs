// Library root: re-exports all modules so integration tests and the CLI can
// access the crate's public API.

pub mod card;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod ratings;
pub mod slots;
pub mod stats;
