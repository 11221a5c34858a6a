//! Recording collaborators shared by the integration tests.
#![allow(dead_code)]

use haltline_core::{
    AuxWindow, AuxWindowKind, Breakpoint, CdlRatioPoller, CdlRatios, CodeView, CpuState,
    DebugEngine, DebugSessionController, DebugState, InspectorPanels, NotificationSender,
    SessionConfig, SessionViews, SessionWindow, SplitViewLayout,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

pub fn clear(log: &Log) {
    log.borrow_mut().clear();
}

pub struct FakeEngine {
    log: Log,
    pub disassembly_changed: bool,
    pub disassembly: String,
    pub state: DebugState,
    pub memory: HashMap<u32, u8>,
    pub ratios: CdlRatios,
    pub coverage_io_ok: bool,
    pub breakpoints: Vec<Breakpoint>,
}

impl FakeEngine {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            disassembly_changed: true,
            disassembly: "C000 LDA #$00".to_string(),
            state: DebugState {
                cpu: CpuState { debug_pc: 0xC000, pc: 0xC000, ..Default::default() },
            },
            memory: HashMap::new(),
            ratios: CdlRatios { prg_ratio: 0.1234, chr_ratio: -1.0, ..Default::default() },
            coverage_io_ok: true,
            breakpoints: Vec::new(),
        }
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl DebugEngine for FakeEngine {
    fn init_session(&mut self) {
        self.record("engine.init_session".into());
    }
    fn release_session(&mut self) {
        self.record("engine.release_session".into());
    }
    fn step(&mut self, count: u32) {
        self.record(format!("engine.step({count})"));
    }
    fn step_over(&mut self) {
        self.record("engine.step_over".into());
    }
    fn step_out(&mut self) {
        self.record("engine.step_out".into());
    }
    fn step_cycles(&mut self, count: u32) {
        self.record(format!("engine.step_cycles({count})"));
    }
    fn run(&mut self) {
        self.record("engine.run".into());
    }
    fn set_next_statement(&mut self, address: u32) {
        self.record(format!("engine.set_next_statement({address:04X})"));
        self.state.cpu.debug_pc = address;
        self.state.cpu.pc = address;
    }
    fn set_breakpoints(&mut self, breakpoints: &[Breakpoint]) {
        self.record(format!("engine.set_breakpoints({})", breakpoints.len()));
        self.breakpoints = breakpoints.to_vec();
    }
    fn read_memory_byte(&mut self, address: u32) -> u8 {
        self.record(format!("engine.read_memory_byte({address:04X})"));
        self.memory.get(&address).copied().unwrap_or(0)
    }
    fn debug_state(&mut self) -> DebugState {
        self.record("engine.debug_state".into());
        self.state
    }
    fn is_disassembly_changed(&mut self) -> bool {
        self.record("engine.is_disassembly_changed".into());
        self.disassembly_changed
    }
    fn disassembly_text(&mut self) -> String {
        self.record("engine.disassembly_text".into());
        self.disassembly.clone()
    }
    fn coverage_ratios(&mut self) -> CdlRatios {
        self.record("engine.coverage_ratios".into());
        self.ratios
    }
    fn load_coverage_log(&mut self, path: &Path) -> bool {
        self.record(format!("engine.load_coverage_log({})", path.display()));
        self.coverage_io_ok
    }
    fn save_coverage_log(&mut self, path: &Path) -> bool {
        self.record(format!("engine.save_coverage_log({})", path.display()));
        self.coverage_io_ok
    }
    fn reset_coverage_log(&mut self) {
        self.record("engine.reset_coverage_log".into());
    }
}

/// Cursor position and font size, readable after the view moved into the session.
#[derive(Clone, Default)]
pub struct ViewHandle {
    pub current_line: Rc<Cell<Option<u32>>>,
    pub font_size: Rc<Cell<u32>>,
}

pub struct FakeView {
    name: &'static str,
    log: Log,
    handle: ViewHandle,
}

impl FakeView {
    fn record(&self, entry: String) {
        self.log.borrow_mut().push(format!("{}.{entry}", self.name));
    }
}

impl CodeView for FakeView {
    fn set_code(&mut self, _code: &str) {
        self.record("set_code".into());
    }
    fn update_code(&mut self) {
        self.record("update_code".into());
    }
    fn select_active_address(&mut self, address: u32) {
        self.record(format!("select_active_address({address:04X})"));
    }
    fn set_active_address(&mut self, address: u32) {
        self.record(format!("set_active_address({address:04X})"));
    }
    fn clear_active_address(&mut self) {
        self.record("clear_active_address".into());
    }
    fn highlight_breakpoints(&mut self, breakpoints: &[Breakpoint]) {
        self.record(format!("highlight_breakpoints({})", breakpoints.len()));
    }
    fn current_line(&self) -> Option<u32> {
        self.handle.current_line.get()
    }
    fn scroll_to_address(&mut self, address: u32) {
        self.record(format!("scroll_to_address({address:04X})"));
    }
    fn open_search_box(&mut self) {
        self.record("open_search_box".into());
    }
    fn find_next(&mut self) {
        self.record("find_next".into());
    }
    fn find_previous(&mut self) {
        self.record("find_previous".into());
    }
    fn go_to_address(&mut self) {
        self.record("go_to_address".into());
    }
    fn font_size(&self) -> u32 {
        self.handle.font_size.get()
    }
    fn set_font_size(&mut self, size: u32) {
        self.handle.font_size.set(size);
        self.record(format!("set_font_size({size})"));
    }
}

pub struct FakePanels {
    log: Log,
}

impl InspectorPanels for FakePanels {
    fn update_status(&mut self, state: &DebugState) {
        self.log
            .borrow_mut()
            .push(format!("panels.update_status({:04X})", state.debug_pc()));
    }
    fn update_watch(&mut self, state: &DebugState) {
        self.log
            .borrow_mut()
            .push(format!("panels.update_watch({:04X})", state.debug_pc()));
    }
    fn update_callstack(&mut self, state: &DebugState) {
        self.log
            .borrow_mut()
            .push(format!("panels.update_callstack({:04X})", state.debug_pc()));
    }
    fn add_watch(&mut self, address: u32) {
        self.log.borrow_mut().push(format!("panels.add_watch({address:04X})"));
    }
}

pub struct FakeWindow {
    log: Log,
}

impl SessionWindow for FakeWindow {
    fn apply_layout(&mut self, layout: &SplitViewLayout) {
        self.log
            .borrow_mut()
            .push(format!("window.apply_layout(split={})", layout.split_view));
    }
    fn bring_to_front(&mut self) {
        self.log.borrow_mut().push("window.bring_to_front".into());
    }
}

pub struct FakeAuxWindow {
    pub kind: AuxWindowKind,
    pub closes: Rc<Cell<u32>>,
}

impl AuxWindow for FakeAuxWindow {
    fn kind(&self) -> AuxWindowKind {
        self.kind
    }
    fn show(&mut self) {}
    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}

pub struct Harness {
    pub session: DebugSessionController<FakeEngine>,
    pub notifier: NotificationSender,
    pub log: Log,
    pub primary: ViewHandle,
    pub secondary: ViewHandle,
    /// Feeds the coverage poller.
    pub ticks: crossbeam_channel::Sender<Instant>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_engine(|engine| engine)
    }

    pub fn with_engine(configure: impl FnOnce(FakeEngine) -> FakeEngine) -> Self {
        let log: Log = Rc::default();
        let primary = ViewHandle::default();
        let secondary = ViewHandle::default();
        primary.font_size.set(13);
        secondary.font_size.set(13);

        let ui = SessionViews {
            primary: Box::new(FakeView { name: "primary", log: log.clone(), handle: primary.clone() }),
            secondary: Box::new(FakeView {
                name: "secondary",
                log: log.clone(),
                handle: secondary.clone(),
            }),
            panels: Box::new(FakePanels { log: log.clone() }),
            window: Box::new(FakeWindow { log: log.clone() }),
        };

        let engine = configure(FakeEngine::new(log.clone()));
        let (ticks, ticker) = crossbeam_channel::unbounded();
        let (session, notifier) = DebugSessionController::new(engine, ui, SessionConfig::default());
        let session = session.with_cdl_poller(CdlRatioPoller::with_ticker(ticker));

        Self { session, notifier, log, primary, secondary, ticks }
    }

    /// A started session that has been halted once, with the log cleared.
    pub fn halted() -> Self {
        let mut harness = Self::new();
        harness.session.start();
        harness.code_break();
        clear(&harness.log);
        harness
    }

    pub fn code_break(&mut self) -> usize {
        self.notifier
            .notify(haltline_core::NotificationKind::CodeBreak)
            .expect("bridge connected");
        self.session.pump()
    }

    pub fn entries(&self) -> Vec<String> {
        entries(&self.log)
    }
}
