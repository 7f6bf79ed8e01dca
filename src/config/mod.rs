//! Configuration loading and defaults

mod settings;

pub use settings::*;
