//! Well-known names and defaults.

/// directory under the working root that holds one log per launch
pub const LOG_DIR: &str = "logs";
/// alias that always points at the newest log
pub const LATEST_LOG: &str = "latest.log";
/// extension of the per-script registry file
pub const PID_EXT: &str = "pid";
/// module resolution root handed to the launched interpreter
pub const MODULE_PATH_ENV: &str = "PYTHONPATH";

// config files
pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml"];

// synthesizer defaults
pub const DEFAULT_D: &str = "UnknownD";
pub const DEFAULT_T: &str = "UnknownT";
pub const DEFAULT_K_FOLD_ID: &str = "0";

/// timestamp embedded in log file names
pub const LOG_TS_FORMAT: &str = "%Y%m%dT%H%M%S";
/// follower poll interval when the log has no new bytes
pub const TAIL_POLL_MS: u64 = 200;
