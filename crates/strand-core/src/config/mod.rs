//! Configuration for strand tools
//!
//! - Generic YAML config loading/saving
//! - Standard config paths
//! - Soak harness configuration
//!
//! # Usage
//!
//! ```ignore
//! use strand_core::config::{default_config_path, load_config, SoakConfig, SOAK_CONFIG_FILE};
//!
//! let path = default_config_path(SOAK_CONFIG_FILE);
//! let config: SoakConfig = load_config(&path);
//! ```

mod io;
mod paths;
mod soak;

pub use io::{load_config, save_config, try_load_config};
pub use paths::{default_config_dir, default_config_path};
pub use soak::{SoakConfig, MAX_TRANSITION_QUEUE_CAPACITY, SOAK_CONFIG_FILE};
