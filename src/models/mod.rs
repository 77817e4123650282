//! Domain models and DTOs.

pub mod tool;
