//! Adapters facing the outside world: HTTP, CSV files and the terminal.

pub mod csv;
pub mod display;
pub mod rest;
