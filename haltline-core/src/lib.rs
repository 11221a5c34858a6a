//! Haltline Core - debug session control for emulator debug engines.
//!
//! This crate sits between an asynchronous, notification-driven debug engine
//! and a single-threaded presentation layer: it owns breakpoints, issues
//! execution commands, and refreshes the code views whenever the engine halts.

pub mod bridge;
pub mod cdl;
pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod session;
pub mod view;
pub mod windows;

// Re-export commonly used types
pub use bridge::{NotificationBridge, NotificationKind, NotificationSender};
pub use cdl::{CdlRatioPoller, CdlSummary};
pub use config::{FrameTiming, SessionConfig};
pub use debug::{Breakpoint, BreakpointKind, BreakpointStore, BreakpointsChanged, ExecutionCommand};
pub use engine::{CdlRatios, CpuState, DebugEngine, DebugState};
pub use error::{BridgeError, SessionError};
pub use session::{
    BreakpointToggle, DebugSessionController, InterruptVector, SessionEvent, SessionState, SessionViews,
};
pub use view::{CodeView, CodeWindow, InspectorPanels, SessionWindow, SplitViewLayout, ViewCoordinator};
pub use windows::{AuxWindow, AuxWindowId, AuxWindowKind, AuxWindowRegistry};
