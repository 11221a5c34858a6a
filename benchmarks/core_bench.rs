use criterion::{black_box, criterion_group, criterion_main, Criterion};
use haltline_core::cdl::CdlSummary;
use haltline_core::{BreakpointKind, BreakpointStore, CdlRatios};

fn bench_breakpoint_toggling(c: &mut Criterion) {
    c.bench_function("breakpoint_toggle_existence", |b| {
        let mut store = BreakpointStore::new();
        let mut address = 0u32;
        b.iter(|| {
            address = (address + 7) & 0xFFFF;
            black_box(store.toggle_existence(address, BreakpointKind::Execute));
        });
    });
}

fn bench_enabled_listing(c: &mut Criterion) {
    let mut store = BreakpointStore::new();
    for address in (0x8000..0x9000).step_by(3) {
        store.add(address, BreakpointKind::Execute);
        if address % 2 == 0 {
            store.toggle_enabled(address, BreakpointKind::Execute);
        }
    }
    c.bench_function("breakpoint_list_enabled", |b| {
        b.iter(|| black_box(store.list_enabled()));
    });
}

fn bench_coverage_formatting(c: &mut Criterion) {
    let ratios = CdlRatios {
        prg_ratio: 0.4321,
        code_ratio: 0.3,
        data_ratio: 0.1321,
        chr_ratio: 0.75,
        chr_drawn_ratio: 0.5,
        chr_read_ratio: 0.25,
    };
    c.bench_function("cdl_summary_format", |b| {
        b.iter(|| black_box(CdlSummary::from_ratios(black_box(&ratios))));
    });
}

criterion_group!(
    benches,
    bench_breakpoint_toggling,
    bench_enabled_listing,
    bench_coverage_formatting
);
criterion_main!(benches);
