//! Utility functions and helpers.
//!
//! - [`paths`]: tilde expansion, absolutisation, install directory lookup

/// Path manipulation and resolution utilities
pub mod paths;

pub use paths::{expand_tilde, install_dir, make_absolute};
