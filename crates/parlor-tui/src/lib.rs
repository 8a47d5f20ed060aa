//! Terminal UI for Parlor
//!
//! A thin shell over [`parlor_app::Driver`] that provides terminal-specific
//! I/O: crossterm events in, ratatui rendering out, with the in-memory
//! loopback broker standing in for the hosted messaging service. All
//! orchestration logic lives in the generic [`parlor_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod input;
pub mod peers;
pub mod terminal;
pub mod ui;

pub use input::{InputState, KeyInput};
pub use parlor_app::{Driver, ReadModel, Reconciler, ReconcilerEvent, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
