//! Session configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.
//!
//! ```json
//! {
//!   "frame_timing": "pal",
//!   "cdl_poll_interval_ms": 500
//! }
//! ```

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// CPU cycles per video frame, by timing standard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameTiming {
    #[default]
    Ntsc,
    Pal,
    Custom { cycles: u32 },
}

impl FrameTiming {
    pub const fn cycles_per_frame(self) -> u32 {
        match self {
            Self::Ntsc => 29_780,
            Self::Pal => 33_247,
            Self::Custom { cycles } => cycles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cycle budget used by "run one frame".
    pub frame_timing: FrameTiming,
    /// Instructions executed at session start so the engine can disassemble
    /// reachable code before the first halt.
    pub warmup_instructions: u32,
    pub cdl_poll_interval_ms: u64,
    /// Capacity of the engine notification queue.
    pub notification_capacity: usize,
    /// Capacity of the session event broadcast channel.
    pub event_capacity: usize,
    pub default_font_size: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_timing: FrameTiming::Ntsc,
            warmup_instructions: 100_000,
            cdl_poll_interval_ms: 1_000,
            notification_capacity: 64,
            event_capacity: 100,
            default_font_size: 13,
        }
    }
}

impl SessionConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Invalid session config {}", path.display()))?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse session config")
    }

    pub const fn cdl_poll_interval(&self) -> Duration {
        Duration::from_millis(self.cdl_poll_interval_ms)
    }
}
