//! Business logic services.

pub mod browse;
pub mod catalog;
pub mod dashboard;
pub mod export;
pub mod validation;
