//! Criterion benchmarks for the record decoder and counting policy.
//!
//! A fast mouse reports at 1000 Hz with several records per report, so the
//! per-record path has to stay well under a microsecond.
//!
//! Run with:
//! ```bash
//! cargo bench --package activity-core --bench decode_bench
//! ```

use std::time::Duration;

use activity_core::{
    apply, decode, encode, CounterState, DeviceClass, EventKind, RawEvent, EVENT_SIZE,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ── Record fixtures ───────────────────────────────────────────────────────────

fn key_press() -> [u8; EVENT_SIZE] {
    encode(&RawEvent::key_press(30), Duration::from_secs(1))
}

fn rel_motion() -> [u8; EVENT_SIZE] {
    encode(
        &RawEvent {
            kind: EventKind::RelativeMove,
            code: 0,
            value: -3,
        },
        Duration::from_secs(1),
    )
}

fn sync_report() -> [u8; EVENT_SIZE] {
    encode(
        &RawEvent {
            kind: EventKind::Other(0),
            code: 0,
            value: 0,
        },
        Duration::from_secs(1),
    )
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for (name, record) in [
        ("key_press", key_press()),
        ("rel_motion", rel_motion()),
        ("sync_report", sync_report()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &record, |b, r| {
            b.iter(|| decode(black_box(r)))
        });
    }
    group.finish();
}

fn bench_mouse_report(c: &mut Criterion) {
    // One typical mouse report: REL_X, REL_Y, SYN_REPORT.
    let report = [rel_motion(), rel_motion(), sync_report()];
    c.bench_function("count_mouse_report", |b| {
        b.iter(|| {
            let mut state = CounterState::new();
            for record in black_box(&report) {
                state.accumulate(apply(DeviceClass::Pointer, &decode(record)));
            }
            state
        })
    });
}

criterion_group!(benches, bench_decode, bench_mouse_report);
criterion_main!(benches);
