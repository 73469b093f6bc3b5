//! Constants for assetflow

use std::path::PathBuf;
use std::sync::OnceLock;

/// Full path of the executable file
pub static EXECUTABLE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Project configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "config.toml";

/// Preview server port used when the configuration leaves it unset
pub const DEFAULT_PORT: u16 = 5000;

/// Preview server bind address
pub const PREVIEW_HOST: [u8; 4] = [127, 0, 0, 1];

/// Aggregate stylesheet name
pub const STYLE_BUNDLE: &str = "style.css";

/// Aggregate script name
pub const SCRIPT_BUNDLE: &str = "scripts.js";

/// Script directory concatenated ahead of application code
pub const LIBS_DIR: &str = "libs";

/// Glob (relative to the script root) for third-party scripts that may be excluded
pub const EXTERNAL_SCRIPTS: &str = "**/external/*";

/// Utility-CSS framework binary used when the configuration names none
pub const DEFAULT_UTILITY_BIN: &str = "tailwindcss";

/// Server-sent-events endpoint for reload notifications
pub const RELOAD_ENDPOINT: &str = "/__reload";

/// Supported stylesheet source extensions
pub const STYLE_EXTENSIONS: &[&str] = &["scss", "sass", "css"];

pub fn init_constants() {
    if let Ok(exe_path) = std::env::current_exe() {
        let _ = EXECUTABLE_PATH.set(exe_path);
    }
}
