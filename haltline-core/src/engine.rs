//! Engine interface module.
//!
//! Describes the native debug engine the controller drives, and the snapshots
//! it hands back. The engine itself lives outside this crate.

use crate::debug::Breakpoint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CPU registers captured when the engine halted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    /// Address of the instruction the engine is halted at.
    pub debug_pc: u32,
    pub pc: u32,
    pub sp: u8,
    pub status: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub cycle_count: u64,
}

/// Immutable snapshot of the engine state, replaced wholesale on every halt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugState {
    pub cpu: CpuState,
}

impl DebugState {
    /// The address the engine is halted at.
    pub const fn debug_pc(&self) -> u32 {
        self.cpu.debug_pc
    }
}

/// Code/data log coverage summary.
///
/// A negative `chr_ratio` means the graphics memory is RAM and coverage does
/// not apply to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CdlRatios {
    pub prg_ratio: f32,
    pub code_ratio: f32,
    pub data_ratio: f32,
    pub chr_ratio: f32,
    pub chr_drawn_ratio: f32,
    pub chr_read_ratio: f32,
}

impl CdlRatios {
    pub fn has_chr_coverage(&self) -> bool {
        self.chr_ratio >= 0.0
    }
}

/// The native debug engine.
///
/// Commands return immediately; their effect is observed later through a
/// `CodeBreak` notification. Queries are only meaningful while halted.
/// Failures surface as `bool` results, never as panics.
pub trait DebugEngine {
    fn init_session(&mut self);
    fn release_session(&mut self);

    /// Execute `count` instructions, then halt.
    fn step(&mut self, count: u32);
    fn step_over(&mut self);
    fn step_out(&mut self);
    /// Execute `count` CPU cycles, then halt.
    fn step_cycles(&mut self, count: u32);
    fn run(&mut self);
    /// Move the program counter without executing anything.
    fn set_next_statement(&mut self, address: u32);

    /// Replace the breakpoint set the engine halts on.
    fn set_breakpoints(&mut self, breakpoints: &[Breakpoint]);

    fn read_memory_byte(&mut self, address: u32) -> u8;
    fn debug_state(&mut self) -> DebugState;

    fn is_disassembly_changed(&mut self) -> bool;
    fn disassembly_text(&mut self) -> String;

    fn coverage_ratios(&mut self) -> CdlRatios;
    fn load_coverage_log(&mut self, path: &Path) -> bool;
    fn save_coverage_log(&mut self, path: &Path) -> bool;
    fn reset_coverage_log(&mut self);
}
