//! Execution control module.
//!
//! Maps resume and step requests onto single engine calls.

pub mod breakpoint;

pub use breakpoint::{Breakpoint, BreakpointKind, BreakpointStore, BreakpointsChanged};

use crate::config::FrameTiming;
use crate::engine::DebugEngine;
use serde::{Deserialize, Serialize};

/// A command that lets the engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionCommand {
    Continue,
    Break,
    StepInto,
    StepOver,
    StepOut,
    RunFrame,
    RunToAddress(u32),
}

impl ExecutionCommand {
    /// Issue the command as exactly one engine call.
    ///
    /// `RunToAddress` only resumes; the one-shot breakpoint it relies on is
    /// installed by the session before this is called.
    pub fn issue(self, engine: &mut dyn DebugEngine, timing: FrameTiming) {
        match self {
            Self::Continue | Self::RunToAddress(_) => engine.run(),
            Self::Break | Self::StepInto => engine.step(1),
            Self::StepOver => engine.step_over(),
            Self::StepOut => engine.step_out(),
            Self::RunFrame => engine.step_cycles(timing.cycles_per_frame()),
        }
    }
}
