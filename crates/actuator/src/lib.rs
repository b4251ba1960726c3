//! Pollboard Actuator Library
//!
//! HTTP adapter for the motorized poll board.
//!
//! The device exposes three endpoints:
//!
//! - `GET /move?steps=<n>`: relative motor move
//! - `GET /quiz?q=..&a1=..&a2=..`: display refresh
//! - `GET /poll_votes`: `{"A": n, "B": n}` cast on the device since the last poll

pub mod client;
pub mod error;
pub mod protocol;

pub use client::{Actuator, HttpActuator, OfflineActuator};
pub use error::{Error, Result};
pub use protocol::{sanitize_display_text, DisplayFrame, PhysicalVotes};
