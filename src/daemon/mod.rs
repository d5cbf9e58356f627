//! Daemon subsystem: main poll loop, background detach, signal handling.

pub mod detach;
pub mod loop_main;
pub mod signals;
