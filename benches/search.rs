//! cargo bench --bench search
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use regexjit::{CompileFlags, Machine};

pub fn criterion_benchmark(c: &mut Criterion) {
    let haystack = "the quick brown fox jumps over the lazy dog ".repeat(200);
    let haystack = haystack.as_bytes();

    {
        let machine = Machine::builder("fox").build().unwrap();
        c.bench_function("search_literal_in_repeated_text", |b| {
            b.iter(|| {
                let mut m = machine.new_match().unwrap();
                m.continue_match(black_box(haystack));
                m.result()
            })
        });
    }

    {
        let machine = Machine::builder("[a-z]+ing").build().unwrap();
        c.bench_function("search_class_and_suffix", |b| {
            b.iter(|| {
                let mut m = machine.new_match().unwrap();
                m.continue_match(black_box(haystack));
                m.result()
            })
        });
    }

    {
        // No prefilter possible (leading character class): exercises the
        // per-character stepping path with no fast-forward assist.
        let machine = Machine::builder("[a-z]{3,8} fox").build().unwrap();
        c.bench_function("search_without_prefilter", |b| {
            b.iter(|| {
                let mut m = machine.new_match().unwrap();
                m.continue_match(black_box(haystack));
                m.result()
            })
        });
    }

    {
        let machine = Machine::builder("^the").flags(CompileFlags::MATCH_BEGIN).build().unwrap();
        c.bench_function("search_anchored_no_match", |b| {
            b.iter(|| {
                let mut m = machine.new_match().unwrap();
                m.continue_match(black_box(&haystack[1..]));
                m.result()
            })
        });
    }

    {
        let machine = Machine::builder("fox").build().unwrap();
        let chunks: Vec<&[u8]> = haystack.chunks(64).collect();
        c.bench_function("search_chunked_streaming", |b| {
            b.iter(|| {
                let mut m = machine.new_match().unwrap();
                for chunk in &chunks {
                    m.continue_match(black_box(chunk));
                }
                m.result()
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
