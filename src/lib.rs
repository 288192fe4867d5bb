//! Launch a long-running training script in the background with arguments
//! derived from a YAML config, record its pid, and optionally follow its log.

pub mod config;
pub mod constants;
pub mod control;
pub mod error;
pub mod follow;
pub mod hooks;
pub mod launch;
pub mod registry;
pub mod synth;

pub use error::{InvokeError, Result};
