//! Auxiliary inspector windows opened from a debug session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuxWindowKind {
    MemoryViewer,
    PpuViewer,
    TraceLogger,
}

/// A child window owned by the session.
pub trait AuxWindow {
    fn kind(&self) -> AuxWindowKind;
    fn show(&mut self);
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuxWindowId(u64);

/// Open auxiliary windows. Each window is closed at most once.
#[derive(Default)]
pub struct AuxWindowRegistry {
    windows: Vec<(AuxWindowId, Box<dyn AuxWindow>)>,
    next_id: u64,
}

impl AuxWindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the window and track it until it is closed.
    pub fn open(&mut self, mut window: Box<dyn AuxWindow>) -> AuxWindowId {
        let id = AuxWindowId(self.next_id);
        self.next_id += 1;
        log::debug!("Opening {:?} window", window.kind());
        window.show();
        self.windows.push((id, window));
        id
    }

    /// Forget a window the user already closed. Returns `false` if unknown.
    pub fn on_closed(&mut self, id: AuxWindowId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|(window_id, _)| *window_id != id);
        self.windows.len() != before
    }

    /// Close every tracked window. Returns how many were closed.
    pub fn close_all(&mut self) -> usize {
        let windows = std::mem::take(&mut self.windows);
        let count = windows.len();
        for (_, mut window) in windows {
            window.close();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
