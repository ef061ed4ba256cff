//! solvix: a personal-finance tracker.
//!
//! Records income and expenses, keeps the cash balance apart from the
//! credit-card bill, amortizes installment purchases and manages saving boxes.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
