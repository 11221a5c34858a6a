//! Code/data log coverage module.
//!
//! Polls coverage ratios from the engine on a wall-clock interval and formats
//! them for the status lines. The log file itself is owned by the engine.

use crate::engine::{CdlRatios, DebugEngine};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// Text shown when the graphics memory is RAM.
pub const CHR_NOT_APPLICABLE: &str = "N/A (CHR RAM)";

/// Formatted coverage lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdlSummary {
    pub prg: String,
    pub chr: String,
}

impl CdlSummary {
    pub fn from_ratios(ratios: &CdlRatios) -> Self {
        let prg = format!(
            "{} (Code: {}, Data: {}, Unknown: {})",
            percent(ratios.prg_ratio),
            percent(ratios.code_ratio),
            percent(ratios.data_ratio),
            percent(1.0 - ratios.prg_ratio),
        );
        let chr = if ratios.has_chr_coverage() {
            format!(
                "{} (Drawn: {}, Read: {}, Unknown: {})",
                percent(ratios.chr_ratio),
                percent(ratios.chr_drawn_ratio),
                percent(ratios.chr_read_ratio),
                percent(1.0 - ratios.chr_ratio),
            )
        } else {
            CHR_NOT_APPLICABLE.to_string()
        };
        Self { prg, chr }
    }
}

/// Format a `[0, 1]` ratio as a percentage with two decimals.
pub fn percent(ratio: f32) -> String {
    format!("{:.2}%", f64::from(ratio) * 100.0)
}

pub struct CdlRatioPoller {
    ticker: Receiver<Instant>,
    last: Option<CdlSummary>,
}

impl CdlRatioPoller {
    pub fn new(interval: Duration) -> Self {
        Self::with_ticker(crossbeam_channel::tick(interval))
    }

    /// Drive the poller from an arbitrary tick source.
    pub fn with_ticker(ticker: Receiver<Instant>) -> Self {
        Self { ticker, last: None }
    }

    pub const fn ticker(&self) -> &Receiver<Instant> {
        &self.ticker
    }

    /// Consume elapsed ticks. Missed ticks collapse into one.
    pub fn is_due(&self) -> bool {
        self.ticker.try_iter().count() > 0
    }

    /// Fetch and format the current ratios.
    pub fn poll(&mut self, engine: &mut dyn DebugEngine) -> CdlSummary {
        let summary = CdlSummary::from_ratios(&engine.coverage_ratios());
        log::trace!("Coverage: PRG {} / CHR {}", summary.prg, summary.chr);
        self.last = Some(summary.clone());
        summary
    }

    /// Poll only if a tick elapsed since the last call.
    pub fn poll_if_due(&mut self, engine: &mut dyn DebugEngine) -> Option<CdlSummary> {
        self.is_due().then(|| self.poll(engine))
    }

    pub const fn last(&self) -> Option<&CdlSummary> {
        self.last.as_ref()
    }

    pub fn load(engine: &mut dyn DebugEngine, path: &Path) -> bool {
        let ok = engine.load_coverage_log(path);
        if !ok {
            log::warn!("Could not load CDL file {}", path.display());
        }
        ok
    }

    pub fn save(engine: &mut dyn DebugEngine, path: &Path) -> bool {
        let ok = engine.save_coverage_log(path);
        if !ok {
            log::warn!("Could not save CDL file {}", path.display());
        }
        ok
    }

    pub fn reset(engine: &mut dyn DebugEngine) {
        engine.reset_coverage_log();
    }
}
