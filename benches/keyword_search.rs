//! Indexed sliding-window search against a linear scan over every
//! dictionary keyword.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use star_analysis::index::KeywordIndex;
use star_analysis::matcher;
use star_analysis::{analyze, ScoreVector, StarAnalyzer, SAMPLE_STATEMENTS};

/// Counts every occurrence of every keyword by brute force.
fn naive_scan(text: &str, index: &KeywordIndex) -> ScoreVector {
    let folded = text.to_lowercase();
    let mut scores = ScoreVector::zero();
    for occurrence in index.occurrences() {
        let hits = folded.matches(occurrence.normalized.as_str()).count();
        scores[occurrence.category] += hits as f64;
    }
    scores
}

fn bench_search(c: &mut Criterion) {
    let analyzer = StarAnalyzer::default();
    let index = analyzer.index();
    let mut group = c.benchmark_group("keyword_search");

    for repeat in [1usize, 8, 64] {
        let text = SAMPLE_STATEMENTS.join("").repeat(repeat);
        group.throughput(Throughput::Elements(text.chars().count() as u64));

        group.bench_with_input(BenchmarkId::new("indexed", repeat), &text, |b, text| {
            b.iter(|| matcher::search(black_box(text), index))
        });
        group.bench_with_input(BenchmarkId::new("naive", repeat), &text, |b, text| {
            b.iter(|| naive_scan(black_box(text), index))
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    c.bench_function("analyze_samples", |b| {
        b.iter(|| {
            for text in SAMPLE_STATEMENTS {
                black_box(analyze(text));
            }
        })
    });
}

criterion_group!(benches, bench_search, bench_analyze);
criterion_main!(benches);
