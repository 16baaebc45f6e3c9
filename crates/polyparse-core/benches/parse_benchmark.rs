//! Benchmarks for ambiguous sequences and recursive alternation
//!
//! Run with: cargo bench -p polyparse-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polyparse_core::{ch, full_match, literal, named, Alternation, Grammar};

/// WORD := "a" | "b" | "ab" | "ba"
fn vocabulary() -> Grammar {
    ["a", "b", "ab", "ba"]
        .iter()
        .map(|word| named("word", literal(word).unwrap()))
        .reduce(|acc, word| acc | word)
        .unwrap()
}

/// S := WORD | WORD S, whole line only
fn segmenter() -> Grammar {
    let word = vocabulary();
    let s = Grammar::new(Alternation::new([word.clone()]));
    s.add_alternative(word + s.clone()).unwrap();
    full_match(s)
}

/// E := 'n' | E '+' 'n'
fn left_recursive_sum() -> Grammar {
    let e = Grammar::new(Alternation::new([ch('n')]));
    e.add_alternative(e.clone() + ch('+') + ch('n')).unwrap();
    full_match(e)
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");

    for size in [2, 4, 6].iter() {
        let input = "ab".repeat(*size);
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_with_input(BenchmarkId::new("fresh", size), &input, |b, input| {
            b.iter(|| {
                let grammar = segmenter();
                let variants = grammar.parse_all(black_box(input.as_str())).unwrap();
                grammar.clear_cache();
                black_box(variants.len())
            })
        });

        let grammar = segmenter();
        group.bench_with_input(BenchmarkId::new("cached", size), &input, |b, input| {
            b.iter(|| {
                let variants = grammar.parse_all(black_box(input.as_str())).unwrap();
                black_box(variants.len())
            })
        });
    }

    group.finish();
}

fn bench_left_recursion(c: &mut Criterion) {
    let mut group = c.benchmark_group("left_recursion");

    for terms in [4, 16, 32].iter() {
        let input = vec!["n"; *terms].join("+");
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_with_input(BenchmarkId::new("sum", terms), &input, |b, input| {
            b.iter(|| {
                let grammar = left_recursive_sum();
                let variants = grammar.parse_all(black_box(input.as_str())).unwrap();
                grammar.clear_cache();
                black_box(variants.len())
            })
        });
    }

    group.finish();
}

fn bench_first_variant(c: &mut Criterion) {
    let input = "ab".repeat(6);

    c.bench_function("first_variant", |b| {
        b.iter(|| {
            let grammar = segmenter();
            let first = grammar.parse(black_box(input.as_str())).next();
            grammar.clear_cache();
            black_box(first.is_some())
        })
    });
}

criterion_group!(
    benches,
    bench_segmentation,
    bench_left_recursion,
    bench_first_variant
);
criterion_main!(benches);
