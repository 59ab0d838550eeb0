//! Configuration for dibs.
//!
//! Two layers:
//! - [`Config`]: tool-wide settings from `config.yaml` (platform domain,
//!   timeouts, readiness sentinels). Unknown fields are ignored and every
//!   field has a default, so a missing file is the same as an empty one.
//! - [`DibsOptions`]: what one command invocation asks for.

mod model;
mod operations;
mod options;
pub mod types;


pub use model::Config;
pub use options::{DibsOptions, SiteEnv, Target};
