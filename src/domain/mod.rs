//! Value objects and the pure rules of the finance model.

pub mod billing;
pub mod category;
pub mod draft;
pub mod installment;
pub mod money;
pub mod ports;
pub mod saving_box;
pub mod subscription;
pub mod suggestion;
pub mod summary;
pub mod transaction;
