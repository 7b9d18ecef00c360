//! Criterion benchmarks for elk_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use elk_logger::appenders::{ConsoleAppender, LogstashFormatter};
use elk_logger::prelude::*;
use serde_json::{json, Value};

fn sample_payload() -> Value {
    json!({
        "user": "u".repeat(500),
        "id": 7,
        "roles": ["admin", "billing", "support"],
        "profile": {
            "bio": "b".repeat(250),
            "country": "NL",
            "tags": ["x".repeat(120), "short"]
        }
    })
}

fn sample_entry() -> LogEntry {
    LogEntry::new(LogLevel::Info, "request handled".to_string())
        .with_logger_name("bench")
        .with_environment("staging")
        .with_extra(
            build_extra_default(&sample_payload())
                .with_field("request_id", "r-123")
                .with_field("status", 200),
        )
}

// ============================================================================
// Payload Helpers
// ============================================================================

fn bench_truncate(c: &mut Criterion) {
    let mut group = c.benchmark_group("truncate");
    group.throughput(Throughput::Elements(1));

    let payload = sample_payload();
    let already_truncated = truncate(&payload, 100);

    group.bench_function("nested_payload", |b| {
        b.iter(|| black_box(truncate(black_box(&payload), 100)));
    });

    group.bench_function("already_truncated", |b| {
        b.iter(|| black_box(truncate(black_box(&already_truncated), 100)));
    });

    group.finish();
}

fn bench_build_extra(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_extra");
    group.throughput(Throughput::Elements(1));

    let payload = sample_payload();
    group.bench_function("nested_payload", |b| {
        b.iter(|| black_box(build_extra(black_box(&payload), 100)));
    });

    let small = json!({"id": 1});
    group.bench_function("small_payload", |b| {
        b.iter(|| black_box(build_extra_default(black_box(&small))));
    });

    group.finish();
}

// ============================================================================
// Formatting
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    let entry = sample_entry();
    let plain = ConsoleAppender::with_colors(false);
    let colored = ConsoleAppender::with_colors(true);
    let formatter = LogstashFormatter::new()
        .with_project("bench")
        .with_extra("environment", "staging");

    group.bench_function("console_plain", |b| {
        b.iter(|| black_box(plain.format_line(black_box(&entry))));
    });

    group.bench_function("console_colored", |b| {
        b.iter(|| black_box(colored.format_line(black_box(&entry))));
    });

    group.bench_function("logstash_document", |b| {
        b.iter(|| black_box(formatter.document(black_box(&entry))));
    });

    group.bench_function("logstash_line", |b| {
        b.iter(|| black_box(formatter.format(black_box(&entry))));
    });

    group.finish();
}

// ============================================================================
// Level Filtering
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder("bench-filter")
        .min_level(LogLevel::Error)
        .filter(EnvironmentFilter::new(Environment::Prod))
        .build();

    group.bench_function("filtered_out", |b| {
        b.iter(|| logger.debug(black_box("dropped before formatting")));
    });

    group.bench_function("no_appenders", |b| {
        b.iter(|| logger.error(black_box("passes the gate")));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_truncate,
    bench_build_extra,
    bench_formatting,
    bench_level_filtering
);

criterion_main!(benches);
