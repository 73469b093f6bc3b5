//! Front-end asset build pipeline: Sass and utility CSS, script bundling,
//! markup minification, image optimization, and a live-reloading preview.

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod serve;
pub mod transform;
pub mod util;
pub mod watch;

pub use build::{Category, Profile};
pub use config::Config;
pub use error::{BuildError, Result};
