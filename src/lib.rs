//! locbook: rated location bookmarks with sorting, filtering, distance
//! annotations and rate/recency charts.
//!
//! The computational core (`distance`, `stats`, `segments`, `view_state`,
//! `render`) is synchronous and pure. The [`controller::Controller`] drives it
//! from typed actions over the async `store` and `geocode` collaborators; the
//! CLI in `main.rs` and the terminal UI in [`interactive`] only present its
//! output.

pub mod config;
pub mod controller;
pub mod distance;
pub mod error;
pub mod geocode;
pub mod interactive;
pub mod location;
pub mod logging;
pub mod messages;
pub mod render;
pub mod segments;
pub mod stats;
pub mod store;
pub mod theme;
pub mod utils;
pub mod view_state;
