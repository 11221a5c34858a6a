//! Presentation-layer collaborators driven by the session controller.

use super::SplitViewLayout;
use crate::debug::Breakpoint;
use crate::engine::DebugState;

/// A scrollable disassembly view.
pub trait CodeView {
    /// Replace the disassembly text.
    fn set_code(&mut self, code: &str);
    /// Re-render from the current text.
    fn update_code(&mut self);

    /// Highlight the "you are here" line and scroll it into view.
    fn select_active_address(&mut self, address: u32);
    /// Highlight the "you are here" line without scrolling.
    fn set_active_address(&mut self, address: u32);
    fn clear_active_address(&mut self);

    fn highlight_breakpoints(&mut self, breakpoints: &[Breakpoint]);

    /// Address of the line under the cursor, if the cursor is on code.
    fn current_line(&self) -> Option<u32>;
    fn scroll_to_address(&mut self, address: u32);

    fn open_search_box(&mut self);
    fn find_next(&mut self);
    fn find_previous(&mut self);
    /// Prompt for an address and jump to it.
    fn go_to_address(&mut self);

    fn font_size(&self) -> u32;
    fn set_font_size(&mut self, size: u32);
}

/// Read-only panels refreshed from the halt snapshot.
pub trait InspectorPanels {
    fn update_status(&mut self, state: &DebugState);
    fn update_watch(&mut self, state: &DebugState);
    fn update_callstack(&mut self, state: &DebugState);
    fn add_watch(&mut self, address: u32);
}

/// The top-level debugger window.
pub trait SessionWindow {
    fn apply_layout(&mut self, layout: &SplitViewLayout);
    fn bring_to_front(&mut self);
}
