//! Engine notification bridge.
//!
//! The engine notifies from its own thread. Only `CodeBreak` is queued on the
//! bounded channel and drained, in emission order, on the controller thread.
//! Other kinds are dropped at the sender so a busy engine never fills the
//! queue with notifications nobody reads.

use crate::error::BridgeError;
use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// The engine halted: breakpoint hit, break request or finished step.
    CodeBreak,
    EngineReset,
    GameLoaded,
    FrameDone,
    Other(u32),
}

/// Engine-side handle. Cheap to clone and safe to move to the engine thread.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: Sender<NotificationKind>,
}

impl NotificationSender {
    /// Queue a `CodeBreak`. Blocks while the queue is full. Every other kind
    /// is discarded without touching the queue.
    pub fn notify(&self, kind: NotificationKind) -> Result<(), BridgeError> {
        if !NotificationBridge::accept(kind) {
            return Ok(());
        }
        self.tx.send(kind).map_err(|_| BridgeError::Disconnected)
    }
}

/// Controller-side end of the bridge. Only surfaces `CodeBreak`.
pub struct NotificationBridge {
    rx: Receiver<NotificationKind>,
}

impl NotificationBridge {
    pub fn new(capacity: usize) -> (NotificationSender, Self) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (NotificationSender { tx }, Self { rx })
    }

    /// Next pending `CodeBreak`, without blocking.
    pub fn try_next(&self) -> Option<NotificationKind> {
        self.rx.try_iter().find(|&kind| Self::accept(kind))
    }

    /// Wait up to `timeout` for the next `CodeBreak`.
    pub fn next_timeout(&self, timeout: Duration) -> Option<NotificationKind> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let kind = self.rx.recv_deadline(deadline).ok()?;
            if Self::accept(kind) {
                return Some(kind);
            }
        }
    }

    /// Filter one raw notification received through [`Self::receiver`].
    pub fn filter(&self, kind: NotificationKind) -> Option<NotificationKind> {
        Self::accept(kind).then_some(kind)
    }

    /// Raw receiver, for use in `select!` loops. Pass received values
    /// through [`Self::filter`].
    pub const fn receiver(&self) -> &Receiver<NotificationKind> {
        &self.rx
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    fn accept(kind: NotificationKind) -> bool {
        if kind == NotificationKind::CodeBreak {
            true
        } else {
            log::trace!("Ignoring engine notification {kind:?}");
            false
        }
    }
}
