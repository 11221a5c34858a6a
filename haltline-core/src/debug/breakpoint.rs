//! Breakpoint management module.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of access a breakpoint halts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BreakpointKind {
    Execute,
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub address: u32,
    pub kind: BreakpointKind,
    pub enabled: bool,
}

impl Breakpoint {
    pub const fn new(address: u32, kind: BreakpointKind) -> Self {
        Self { address, kind, enabled: true }
    }
}

/// Sent to subscribers once per mutation of a [`BreakpointStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakpointsChanged {
    pub revision: u64,
}

/// Session-scoped set of breakpoints, unique per `(address, kind)`.
pub struct BreakpointStore {
    breakpoints: BTreeMap<(u32, BreakpointKind), Breakpoint>,
    subscribers: Vec<Sender<BreakpointsChanged>>,
    revision: u64,
}

impl BreakpointStore {
    pub fn new() -> Self {
        Self {
            breakpoints: BTreeMap::new(),
            subscribers: Vec::new(),
            revision: 0,
        }
    }

    /// Register for change notifications. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<BreakpointsChanged> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Add an enabled breakpoint. Returns `false` if one already existed.
    pub fn add(&mut self, address: u32, kind: BreakpointKind) -> bool {
        if self.breakpoints.contains_key(&(address, kind)) {
            return false;
        }
        self.breakpoints.insert((address, kind), Breakpoint::new(address, kind));
        self.notify();
        true
    }

    /// Remove a breakpoint. Returns `false` if there was nothing to remove.
    pub fn remove(&mut self, address: u32, kind: BreakpointKind) -> bool {
        if self.breakpoints.remove(&(address, kind)).is_none() {
            return false;
        }
        self.notify();
        true
    }

    /// Flip the enabled flag of an existing breakpoint.
    ///
    /// Returns the new flag, or `None` if no such breakpoint exists.
    pub fn toggle_enabled(&mut self, address: u32, kind: BreakpointKind) -> Option<bool> {
        let bp = self.breakpoints.get_mut(&(address, kind))?;
        bp.enabled = !bp.enabled;
        let enabled = bp.enabled;
        self.notify();
        Some(enabled)
    }

    /// Remove the breakpoint if present, otherwise add it enabled.
    ///
    /// Returns whether a breakpoint exists afterwards.
    pub fn toggle_existence(&mut self, address: u32, kind: BreakpointKind) -> bool {
        if self.breakpoints.remove(&(address, kind)).is_some() {
            self.notify();
            false
        } else {
            self.breakpoints.insert((address, kind), Breakpoint::new(address, kind));
            self.notify();
            true
        }
    }

    /// Clear all breakpoints.
    pub fn clear(&mut self) {
        if self.breakpoints.is_empty() {
            return;
        }
        self.breakpoints.clear();
        self.notify();
    }

    pub fn get(&self, address: u32, kind: BreakpointKind) -> Option<&Breakpoint> {
        self.breakpoints.get(&(address, kind))
    }

    pub fn contains(&self, address: u32, kind: BreakpointKind) -> bool {
        self.breakpoints.contains_key(&(address, kind))
    }

    /// Iterate in address order, then kind.
    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    /// List all breakpoints.
    pub fn list(&self) -> Vec<Breakpoint> {
        self.breakpoints.values().copied().collect()
    }

    /// List the breakpoints the engine should halt on.
    pub fn list_enabled(&self) -> Vec<Breakpoint> {
        self.breakpoints.values().filter(|bp| bp.enabled).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn notify(&mut self) {
        self.revision += 1;
        let event = BreakpointsChanged { revision: self.revision };
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

impl Default for BreakpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_add_remove_idempotent() {
        let mut store = BreakpointStore::new();
        assert!(store.add(0x8000, BreakpointKind::Execute));
        assert!(!store.add(0x8000, BreakpointKind::Execute));
        assert_eq!(store.len(), 1);

        assert!(store.remove(0x8000, BreakpointKind::Execute));
        assert!(!store.remove(0x8000, BreakpointKind::Execute));
        assert!(store.is_empty());
    }

    #[test]
    fn test_same_address_different_kinds() {
        let mut store = BreakpointStore::new();
        store.add(0x2002, BreakpointKind::Read);
        store.add(0x2002, BreakpointKind::Write);
        assert_eq!(store.len(), 2);
        assert!(!store.contains(0x2002, BreakpointKind::Execute));
    }

    #[test]
    fn test_toggle_existence_twice_restores_membership() {
        let mut store = BreakpointStore::new();
        store.add(0x10, BreakpointKind::Write);

        for (addr, kind) in [(0x10, BreakpointKind::Write), (0x20, BreakpointKind::Execute)] {
            let before = store.contains(addr, kind);
            store.toggle_existence(addr, kind);
            assert_ne!(store.contains(addr, kind), before);
            store.toggle_existence(addr, kind);
            assert_eq!(store.contains(addr, kind), before);
        }
    }

    #[test]
    fn test_toggle_enabled_keeps_breakpoint() {
        let mut store = BreakpointStore::new();
        assert_eq!(store.toggle_enabled(0xC000, BreakpointKind::Execute), None);

        store.add(0xC000, BreakpointKind::Execute);
        assert_eq!(store.toggle_enabled(0xC000, BreakpointKind::Execute), Some(false));
        assert!(store.contains(0xC000, BreakpointKind::Execute));
        assert!(store.list_enabled().is_empty());

        assert_eq!(store.toggle_enabled(0xC000, BreakpointKind::Execute), Some(true));
        assert_eq!(store.list_enabled().len(), 1);
    }

    #[test]
    fn test_no_duplicates_under_mixed_operations() {
        let mut store = BreakpointStore::new();
        let kinds = [BreakpointKind::Execute, BreakpointKind::Read, BreakpointKind::Write];

        for i in 0u32..300 {
            let addr = (i * 7) % 13;
            let kind = kinds[(i % 3) as usize];
            match i % 4 {
                0 => {
                    store.add(addr, kind);
                }
                1 => {
                    store.toggle_existence(addr, kind);
                }
                2 => {
                    store.toggle_enabled(addr, kind);
                }
                _ => {
                    store.remove(addr, kind);
                }
            }

            let keys: HashSet<_> = store.iter().map(|bp| (bp.address, bp.kind)).collect();
            assert_eq!(keys.len(), store.len());
        }
    }

    #[test]
    fn test_one_notification_per_mutation() {
        let mut store = BreakpointStore::new();
        let rx = store.subscribe();

        store.add(1, BreakpointKind::Execute);
        store.add(1, BreakpointKind::Execute);
        store.toggle_enabled(1, BreakpointKind::Execute);
        store.toggle_existence(2, BreakpointKind::Read);
        store.remove(3, BreakpointKind::Read);
        store.clear();
        store.clear();

        let events: Vec<_> = rx.try_iter().collect();
        let revisions: Vec<_> = events.iter().map(|e| e.revision).collect();
        assert_eq!(revisions, vec![1, 2, 3, 4]);
        assert_eq!(store.revision(), 4);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut store = BreakpointStore::new();
        let rx = store.subscribe();
        drop(store.subscribe());

        store.add(0x100, BreakpointKind::Execute);
        assert_eq!(store.subscribers.len(), 1);
        assert_eq!(rx.try_recv().unwrap().revision, 1);
    }

    #[test]
    fn test_iteration_order() {
        let mut store = BreakpointStore::new();
        store.add(0x30, BreakpointKind::Write);
        store.add(0x10, BreakpointKind::Read);
        store.add(0x10, BreakpointKind::Execute);

        let order: Vec<_> = store.iter().map(|bp| (bp.address, bp.kind)).collect();
        assert_eq!(
            order,
            vec![
                (0x10, BreakpointKind::Execute),
                (0x10, BreakpointKind::Read),
                (0x30, BreakpointKind::Write),
            ]
        );
    }
}
