//! Code view coordination.
//!
//! Tracks which of the two code views receives navigation, search and font
//! commands, and derives the split-view layout.

pub mod collaborators;

pub use collaborators::{CodeView, InspectorPanels, SessionWindow};

use serde::{Deserialize, Serialize};

/// One of the two code views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeWindow {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidth {
    Percent(f32),
    Absolute(f32),
}

/// Layout of the code area, derived entirely from the split flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitViewLayout {
    pub split_view: bool,
    pub columns: [ColumnWidth; 2],
    /// Minimum window size as `(width, height)`.
    pub minimum_size: (u32, u32),
}

impl SplitViewLayout {
    pub const fn for_split_view(split_view: bool) -> Self {
        if split_view {
            Self {
                split_view,
                columns: [ColumnWidth::Percent(50.0), ColumnWidth::Percent(50.0)],
                minimum_size: (1250, 650),
            }
        } else {
            Self {
                split_view,
                columns: [ColumnWidth::Percent(100.0), ColumnWidth::Absolute(0.0)],
                minimum_size: (1000, 650),
            }
        }
    }

    pub const fn secondary_visible(&self) -> bool {
        self.split_view
    }
}

#[derive(Debug, Default)]
pub struct ViewCoordinator {
    active: CodeWindow,
    split_view: bool,
}

impl ViewCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the split flag actually changed.
    ///
    /// Turning split view off always makes the primary view active.
    pub fn set_split_view(&mut self, enabled: bool) -> bool {
        let changed = self.split_view != enabled;
        self.split_view = enabled;
        if !enabled {
            self.active = CodeWindow::Primary;
        }
        changed
    }

    pub fn on_focus_changed(&mut self, window: CodeWindow) {
        self.active = window;
    }

    pub const fn active_window(&self) -> CodeWindow {
        self.active
    }

    pub const fn is_split_view(&self) -> bool {
        self.split_view
    }

    pub const fn layout(&self) -> SplitViewLayout {
        SplitViewLayout::for_split_view(self.split_view)
    }
}
