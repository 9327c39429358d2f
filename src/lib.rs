//! Quackbox navigation core
//!
//! Gamepad-driven spatial focus navigation for the Quackbox launcher:
//! controller discovery, edge-triggered button events, per-player cursors over
//! a screen-specific grid of targets, and the page transitions between screens.
//!
//! Data flows one way per tick:
//!
//! ```text
//! input (snapshots) → players (reconcile) → events (edges) → focus ← grid ← page
//! ```
//!
//! [`session::Session`] owns all of it and is driven by the binary's main loop.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod events;
pub mod focus;
pub mod grid;
pub mod input;
pub mod navigation;
pub mod notify;
pub mod page;
pub mod paths;
pub mod players;
pub mod session;
pub mod shell;
