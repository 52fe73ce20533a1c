//! Smoothie Server - HTTP surface and CLI for the smoothie counter
//!
//! Wires [`smoothie_core::Shop`] to a SQLite store and the fruit API, then
//! exposes it over warp routes and a `smoothie` binary.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod app;
pub mod cli;
pub mod dto;
pub mod routes;
pub mod telemetry;

pub use app::App;
pub use cli::{Cli, Command};
pub use routes::{routes, status_for};
pub use telemetry::{init_tracing, LogFormat};
