//! Benchmarks for the document buffer.
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use xeditor_buffer::{Position, TextBuffer};

/// Generates a Python-looking file with `lines` lines.
fn generate_source(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("    value_{i} = compute_something(value_{}, {i})\n", i.saturating_sub(1)))
        .collect()
}

/// The editor surface hands over the whole text after every edit.
fn bench_set_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_text");

    for size in [100, 1000, 10000].iter() {
        let text = generate_source(*size);
        let mut edited = text.clone();
        edited.push_str("x");

        group.bench_with_input(BenchmarkId::new("changed", size), &edited, |b, edited| {
            b.iter_with_setup(
                || TextBuffer::from(text.as_str()),
                |mut buffer| {
                    black_box(buffer.set_text(black_box(edited)));
                    buffer
                },
            )
        });

        group.bench_with_input(BenchmarkId::new("unchanged", size), &text, |b, text| {
            b.iter_with_setup(
                || TextBuffer::from(text.as_str()),
                |mut buffer| {
                    black_box(buffer.set_text(black_box(text)));
                    buffer
                },
            )
        });
    }

    group.finish();
}

fn bench_word_prefix(c: &mut Criterion) {
    let buffer = TextBuffer::from(generate_source(10000).as_str());
    let pos = Position::new(5000, 20);

    c.bench_function("word_prefix_at", |b| {
        b.iter(|| black_box(buffer.word_prefix_at(black_box(pos))))
    });
}

fn bench_position_conversion(c: &mut Criterion) {
    let buffer = TextBuffer::from(generate_source(10000).as_str());
    let mut group = c.benchmark_group("position_conversion");

    group.bench_function("to_char_idx", |b| {
        b.iter(|| black_box(buffer.position_to_char_idx(black_box(Position::new(7500, 12)))))
    });

    let idx = buffer.len_chars() / 2;
    group.bench_function("from_char_idx", |b| {
        b.iter(|| black_box(buffer.char_idx_to_position(black_box(idx))))
    });

    group.bench_function("clamp", |b| {
        b.iter(|| black_box(buffer.clamp(black_box(Position::new(20000, 400)))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set_text,
    bench_word_prefix,
    bench_position_conversion
);
criterion_main!(benches);
