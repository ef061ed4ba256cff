//! Application layer orchestrating the finance rules over the storage ports.
//!
//! `FinanceService` implements every operation exposed over REST and the CLI;
//! `Dashboard` is the client-side state that consumes it through `FinanceApi`.

pub mod api;
pub mod dashboard;
pub mod finance;
