//! Session management module.
//!
//! Owns one debug session: breakpoint state, execution commands, and the
//! refresh of every dependent view each time the engine halts. All of it runs
//! on the caller's thread; the engine reaches it only through the
//! notification bridge.

use crate::bridge::{NotificationBridge, NotificationKind, NotificationSender};
use crate::cdl::{CdlRatioPoller, CdlSummary};
use crate::config::SessionConfig;
use crate::debug::{Breakpoint, BreakpointKind, BreakpointStore, BreakpointsChanged, ExecutionCommand};
use crate::engine::{DebugEngine, DebugState};
use crate::error::SessionError;
use crate::view::{CodeView, CodeWindow, InspectorPanels, SessionWindow, ViewCoordinator};
use crate::windows::{AuxWindow, AuxWindowId, AuxWindowRegistry};
use crossbeam_channel::{select, Receiver, RecvTimeoutError};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Halted,
}

/// Observation point for panels and other collaborators.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started,
    Resumed(ExecutionCommand),
    Halted,
    RefreshComplete { pc: u32 },
    BreakpointsChanged(Vec<Breakpoint>),
    CoverageUpdated(CdlSummary),
    Closed,
}

/// How a breakpoint toggle at the cursor behaves on an existing breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointToggle {
    /// Delete it.
    Existence,
    /// Disable or re-enable it.
    Enabled,
}

/// Interrupt vectors, stored little-endian at the top of the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptVector {
    Nmi,
    Reset,
    Irq,
}

impl InterruptVector {
    pub const fn address(self) -> u32 {
        match self {
            Self::Nmi => 0xFFFA,
            Self::Reset => 0xFFFC,
            Self::Irq => 0xFFFE,
        }
    }
}

/// The presentation collaborators a session drives.
pub struct SessionViews {
    pub primary: Box<dyn CodeView>,
    pub secondary: Box<dyn CodeView>,
    pub panels: Box<dyn InspectorPanels>,
    pub window: Box<dyn SessionWindow>,
}

enum Wake {
    Notification(NotificationKind),
    CoverageTick,
    Timeout,
    Disconnected,
}

pub struct DebugSessionController<E: DebugEngine> {
    engine: E,
    config: SessionConfig,
    state: SessionState,
    breakpoints: BreakpointStore,
    breakpoint_changes: Receiver<BreakpointsChanged>,
    /// One-shot execute breakpoint installed by "run to address".
    run_to: Option<u32>,
    bridge: NotificationBridge,
    poller: CdlRatioPoller,
    views: ViewCoordinator,
    ui: SessionViews,
    aux_windows: AuxWindowRegistry,
    debug_state: Option<DebugState>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl<E: DebugEngine> DebugSessionController<E> {
    /// Create an idle session. The returned sender goes to the engine thread.
    pub fn new(engine: E, ui: SessionViews, config: SessionConfig) -> (Self, NotificationSender) {
        let (notifier, bridge) = NotificationBridge::new(config.notification_capacity.max(1));
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let poller = CdlRatioPoller::new(config.cdl_poll_interval());
        let mut breakpoints = BreakpointStore::new();
        let breakpoint_changes = breakpoints.subscribe();

        let session = Self {
            engine,
            config,
            state: SessionState::Idle,
            breakpoints,
            breakpoint_changes,
            run_to: None,
            bridge,
            poller,
            views: ViewCoordinator::new(),
            ui,
            aux_windows: AuxWindowRegistry::new(),
            debug_state: None,
            event_tx,
        };
        (session, notifier)
    }

    /// Replace the coverage poller, e.g. to drive it from a manual tick source.
    #[must_use]
    pub fn with_cdl_poller(mut self, poller: CdlRatioPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Change feed of the breakpoint store, for a breakpoint list panel.
    /// Delivered as soon as the store changes, ahead of the engine sync.
    pub fn subscribe_breakpoints(&mut self) -> Receiver<BreakpointsChanged> {
        self.breakpoints.subscribe()
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Snapshot taken at the last halt; `None` while running.
    pub const fn debug_state(&self) -> Option<&DebugState> {
        self.debug_state.as_ref()
    }

    pub const fn breakpoints(&self) -> &BreakpointStore {
        &self.breakpoints
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub const fn views(&self) -> &ViewCoordinator {
        &self.views
    }

    pub const fn aux_windows(&self) -> &AuxWindowRegistry {
        &self.aux_windows
    }

    // --- Lifecycle ---

    /// Initialise the engine and let it run a warm-up burst so code gets
    /// disassembled before the first halt.
    pub fn start(&mut self) {
        if self.state != SessionState::Idle {
            log::warn!("Debug session already started");
            return;
        }
        self.engine.init_session();
        self.run_to = None;
        self.breakpoints.clear();
        if !self.sync_breakpoints() {
            self.engine.set_breakpoints(&[]);
        }

        self.state = SessionState::Running;
        self.engine.step(self.config.warmup_instructions);
        log::info!("Debug session started");
        let _ = self.event_tx.send(SessionEvent::Started);
        self.poll_coverage();
    }

    /// Release the engine and close every auxiliary window. Idempotent.
    pub fn close(&mut self) {
        let closed = self.aux_windows.close_all();
        if closed > 0 {
            log::debug!("Closed {closed} auxiliary window(s)");
        }
        if self.state == SessionState::Idle {
            return;
        }
        self.engine.release_session();
        self.state = SessionState::Idle;
        self.debug_state = None;
        log::info!("Debug session closed");
        let _ = self.event_tx.send(SessionEvent::Closed);
    }

    // --- Run loop ---

    /// Process everything pending without blocking. Returns the number of
    /// refreshes performed.
    pub fn pump(&mut self) -> usize {
        self.sync_breakpoints();

        let mut refreshes = 0;
        while let Some(kind) = self.bridge.try_next() {
            if self.handle_notification(kind) {
                refreshes += 1;
            }
        }

        if let Some(summary) = self.poller.poll_if_due(&mut self.engine) {
            let _ = self.event_tx.send(SessionEvent::CoverageUpdated(summary));
        }
        refreshes
    }

    /// Wait up to `timeout` for a notification or coverage tick, then pump.
    pub fn run_once(&mut self, timeout: Duration) -> usize {
        let wake = {
            let notifications = self.bridge.receiver();
            let ticker = self.poller.ticker();
            select! {
                recv(notifications) -> msg => msg.map_or(Wake::Disconnected, Wake::Notification),
                recv(ticker) -> _ => Wake::CoverageTick,
                default(timeout) => Wake::Timeout,
            }
        };

        let mut refreshes = 0;
        match wake {
            Wake::Notification(kind) => {
                if let Some(kind) = self.bridge.filter(kind) {
                    if self.handle_notification(kind) {
                        refreshes += 1;
                    }
                }
            }
            Wake::CoverageTick => {
                self.poll_coverage();
            }
            Wake::Timeout => {}
            Wake::Disconnected => {
                log::trace!("Engine notification senders dropped");
                self.wait_for_coverage_tick(timeout);
            }
        }
        refreshes + self.pump()
    }

    /// With no engine left to notify, only the coverage ticker can wake us.
    fn wait_for_coverage_tick(&mut self, timeout: Duration) {
        match self.poller.ticker().recv_timeout(timeout) {
            Ok(_) => {
                self.poll_coverage();
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => thread::sleep(timeout),
        }
    }

    fn handle_notification(&mut self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::CodeBreak => self.on_code_break(),
            other => {
                log::trace!("Ignoring engine notification {other:?}");
                false
            }
        }
    }

    /// Enter the halted state. Returns `false` if the halt was unexpected.
    fn on_code_break(&mut self) -> bool {
        if self.state != SessionState::Running {
            log::warn!("CodeBreak received while {:?}; ignoring", self.state);
            return false;
        }
        self.state = SessionState::Halted;
        let _ = self.event_tx.send(SessionEvent::Halted);

        if self.run_to.take().is_some() {
            self.push_engine_breakpoints();
        }
        self.refresh();
        true
    }

    /// Bring every view in line with the halted engine.
    fn refresh(&mut self) {
        if self.engine.is_disassembly_changed() {
            let code = self.engine.disassembly_text();
            self.ui.primary.set_code(&code);
            self.ui.secondary.set_code(&code);
        }

        let state = self.engine.debug_state();
        let pc = state.debug_pc();
        log::debug!("Refreshing views at {pc:#06X}");

        let layout = self.views.layout();
        self.ui.window.apply_layout(&layout);
        if layout.secondary_visible() {
            self.ui.secondary.update_code();
        }

        self.ui.primary.select_active_address(pc);
        self.ui.secondary.set_active_address(pc);

        self.highlight_breakpoints();

        self.ui.panels.update_status(&state);
        self.ui.panels.update_watch(&state);
        self.ui.panels.update_callstack(&state);

        self.ui.window.bring_to_front();

        self.debug_state = Some(state);
        let _ = self.event_tx.send(SessionEvent::RefreshComplete { pc });
    }

    // --- Execution ---

    /// Let the engine run. The active line is cleared before the engine
    /// call, since the engine resumes immediately.
    pub fn resume(&mut self, command: ExecutionCommand) -> Result<(), SessionError> {
        if self.state == SessionState::Idle {
            return Err(SessionError::NoSession);
        }
        self.sync_breakpoints();
        if let ExecutionCommand::RunToAddress(address) = command {
            self.run_to = Some(address);
            self.push_engine_breakpoints();
        }

        self.clear_active_statement();
        self.state = SessionState::Running;
        self.debug_state = None;
        command.issue(&mut self.engine, self.config.frame_timing);
        log::debug!("Resumed with {command:?}");
        let _ = self.event_tx.send(SessionEvent::Resumed(command));
        Ok(())
    }

    pub fn continue_execution(&mut self) -> Result<(), SessionError> {
        self.resume(ExecutionCommand::Continue)
    }

    pub fn break_execution(&mut self) -> Result<(), SessionError> {
        self.resume(ExecutionCommand::Break)
    }

    pub fn step_into(&mut self) -> Result<(), SessionError> {
        self.resume(ExecutionCommand::StepInto)
    }

    pub fn step_over(&mut self) -> Result<(), SessionError> {
        self.resume(ExecutionCommand::StepOver)
    }

    pub fn step_out(&mut self) -> Result<(), SessionError> {
        self.resume(ExecutionCommand::StepOut)
    }

    pub fn run_frame(&mut self) -> Result<(), SessionError> {
        self.resume(ExecutionCommand::RunFrame)
    }

    pub fn run_to_address(&mut self, address: u32) -> Result<(), SessionError> {
        self.resume(ExecutionCommand::RunToAddress(address))
    }

    /// Move the program counter and refresh at once. The engine does not
    /// run, so no notification will follow.
    pub fn set_next_statement(&mut self, address: u32) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Err(SessionError::NoSession),
            SessionState::Running => Err(SessionError::NotHalted),
            SessionState::Halted => {
                self.engine.set_next_statement(address);
                self.refresh();
                Ok(())
            }
        }
    }

    fn clear_active_statement(&mut self) {
        self.ui.primary.clear_active_address();
        self.ui.secondary.clear_active_address();
        self.highlight_breakpoints();
    }

    // --- Breakpoints ---

    pub fn add_breakpoint(&mut self, address: u32, kind: BreakpointKind) -> bool {
        let added = self.breakpoints.add(address, kind);
        self.sync_breakpoints();
        added
    }

    pub fn remove_breakpoint(&mut self, address: u32, kind: BreakpointKind) -> bool {
        let removed = self.breakpoints.remove(address, kind);
        self.sync_breakpoints();
        removed
    }

    pub fn toggle_breakpoint_enabled(&mut self, address: u32, kind: BreakpointKind) -> Option<bool> {
        let enabled = self.breakpoints.toggle_enabled(address, kind);
        self.sync_breakpoints();
        enabled
    }

    pub fn toggle_breakpoint_existence(&mut self, address: u32, kind: BreakpointKind) -> bool {
        let present = self.breakpoints.toggle_existence(address, kind);
        self.sync_breakpoints();
        present
    }

    /// Toggle an execute breakpoint on the active view's cursor line.
    ///
    /// Returns `false` when the cursor is not on code.
    pub fn toggle_breakpoint_at_cursor(&mut self, mode: BreakpointToggle) -> bool {
        let Some(address) = self.active_view().current_line() else {
            return false;
        };
        let kind = BreakpointKind::Execute;
        match mode {
            BreakpointToggle::Existence => {
                self.breakpoints.toggle_existence(address, kind);
            }
            BreakpointToggle::Enabled => {
                if self.breakpoints.toggle_enabled(address, kind).is_none() {
                    self.breakpoints.add(address, kind);
                }
            }
        }
        self.sync_breakpoints();
        true
    }

    /// Apply pending breakpoint changes to the engine and both views.
    /// Forward pending store changes to the engine and views. Returns whether
    /// anything changed.
    fn sync_breakpoints(&mut self) -> bool {
        if self.breakpoint_changes.try_iter().count() == 0 {
            return false;
        }
        log::trace!("Breakpoints changed, revision {}", self.breakpoints.revision());
        self.push_engine_breakpoints();
        self.highlight_breakpoints();
        let _ = self
            .event_tx
            .send(SessionEvent::BreakpointsChanged(self.breakpoints.list()));
        true
    }

    fn push_engine_breakpoints(&mut self) {
        let mut active = self.breakpoints.list_enabled();
        if let Some(address) = self.run_to {
            let covered = active
                .iter()
                .any(|bp| bp.address == address && bp.kind == BreakpointKind::Execute);
            if !covered {
                active.push(Breakpoint::new(address, BreakpointKind::Execute));
            }
        }
        self.engine.set_breakpoints(&active);
    }

    fn highlight_breakpoints(&mut self) {
        let list = self.breakpoints.list();
        self.ui.primary.highlight_breakpoints(&list);
        self.ui.secondary.highlight_breakpoints(&list);
    }

    // --- Views ---

    /// Returns whether split view actually changed.
    pub fn set_split_view(&mut self, enabled: bool) -> bool {
        let changed = self.views.set_split_view(enabled);
        if changed {
            self.ui.window.apply_layout(&self.views.layout());
            if enabled && self.state == SessionState::Halted {
                self.ui.secondary.update_code();
            }
        }
        changed
    }

    pub fn on_focus_changed(&mut self, window: CodeWindow) {
        self.views.on_focus_changed(window);
    }

    pub const fn active_window(&self) -> CodeWindow {
        self.views.active_window()
    }

    fn active_view(&self) -> &dyn CodeView {
        match self.views.active_window() {
            CodeWindow::Primary => &*self.ui.primary,
            CodeWindow::Secondary => &*self.ui.secondary,
        }
    }

    fn active_view_mut(&mut self) -> &mut dyn CodeView {
        match self.views.active_window() {
            CodeWindow::Primary => &mut *self.ui.primary,
            CodeWindow::Secondary => &mut *self.ui.secondary,
        }
    }

    pub fn open_search(&mut self) {
        self.active_view_mut().open_search_box();
    }

    pub fn find_next(&mut self) {
        self.active_view_mut().find_next();
    }

    pub fn find_previous(&mut self) {
        self.active_view_mut().find_previous();
    }

    pub fn go_to_address(&mut self) {
        self.active_view_mut().go_to_address();
    }

    pub fn increase_font_size(&mut self) {
        let view = self.active_view_mut();
        let size = view.font_size();
        view.set_font_size(size.saturating_add(1));
    }

    pub fn decrease_font_size(&mut self) {
        let view = self.active_view_mut();
        let size = view.font_size();
        view.set_font_size(size.saturating_sub(1).max(1));
    }

    pub fn reset_font_size(&mut self) {
        let size = self.config.default_font_size;
        self.active_view_mut().set_font_size(size);
    }

    /// Scroll the active view to the handler an interrupt vector points at.
    pub fn go_to_interrupt_handler(&mut self, vector: InterruptVector) -> Result<u32, SessionError> {
        if self.state != SessionState::Halted {
            return Err(if self.state == SessionState::Idle {
                SessionError::NoSession
            } else {
                SessionError::NotHalted
            });
        }
        let base = vector.address();
        let lo = u32::from(self.engine.read_memory_byte(base));
        let hi = u32::from(self.engine.read_memory_byte(base + 1));
        let handler = (hi << 8) | lo;
        self.active_view_mut().scroll_to_address(handler);
        Ok(handler)
    }

    /// A call-stack entry was selected.
    pub fn on_callstack_function_selected(&mut self, address: u32) {
        self.active_view_mut().scroll_to_address(address);
    }

    /// A breakpoint was picked from the breakpoint list.
    pub fn navigate_to_breakpoint(&mut self, breakpoint: &Breakpoint) {
        self.active_view_mut().scroll_to_address(breakpoint.address);
    }

    pub fn add_watch(&mut self, address: u32) {
        self.ui.panels.add_watch(address);
    }

    // --- Auxiliary windows ---

    pub fn open_aux_window(&mut self, window: Box<dyn AuxWindow>) -> AuxWindowId {
        self.aux_windows.open(window)
    }

    /// The user closed an auxiliary window.
    pub fn on_aux_window_closed(&mut self, id: AuxWindowId) {
        self.aux_windows.on_closed(id);
    }

    // --- Coverage log ---

    pub fn poll_coverage(&mut self) -> CdlSummary {
        let summary = self.poller.poll(&mut self.engine);
        let _ = self.event_tx.send(SessionEvent::CoverageUpdated(summary.clone()));
        summary
    }

    pub fn coverage_summary(&self) -> Option<&CdlSummary> {
        self.poller.last()
    }

    pub fn load_coverage_log(&mut self, path: &Path) -> bool {
        CdlRatioPoller::load(&mut self.engine, path)
    }

    pub fn save_coverage_log(&mut self, path: &Path) -> bool {
        CdlRatioPoller::save(&mut self.engine, path)
    }

    pub fn reset_coverage_log(&mut self) {
        CdlRatioPoller::reset(&mut self.engine);
    }
}

impl<E: DebugEngine> Drop for DebugSessionController<E> {
    fn drop(&mut self) {
        self.close();
    }
}
