use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use findany::{ByteSearchValues, CharSearchValues, Isa, MatchMode, SearchValues, StringSearchValues};
use std::hint::black_box;

/// Prose-like text with the interesting part at the very end.
fn haystack(len: usize, tail: &str) -> Vec<u16> {
    let filler = "the quick brown fox jumps over the lazy dog, ";
    let mut text: String = filler.chars().cycle().take(len).collect();
    text.push_str(tail);
    text.encode_utf16().collect()
}

fn bench_strategies(c: &mut Criterion) {
    let hay = haystack(64 * 1024, "NEEDLE-zq");

    let cases: Vec<(&str, Vec<String>)> = vec![
        ("chars", vec!["Z".into(), "Q".into(), "#".into()]),
        ("single", vec!["NEEDLE-zq".into()]),
        ("teddy", vec!["NEEDLE".into(), "qzx".into(), "ZQ!".into(), "xyzzy".into()]),
        (
            "aho-corasick",
            (0..200).map(|i| format!("token{:03}", i)).chain(["-zq".to_string()]).collect(),
        ),
    ];

    let mut group = c.benchmark_group("strategies");
    group.throughput(Throughput::Elements(hay.len() as u64));

    for (name, needles) in &cases {
        let set = StringSearchValues::new(needles, MatchMode::CaseSensitive).unwrap();
        assert_eq!(set.strategy_name(), *name);

        group.bench_function(BenchmarkId::new("first", name), |b| {
            b.iter(|| black_box(set.index_of_any(black_box(&hay))));
        });
        group.bench_function(BenchmarkId::new("last", name), |b| {
            b.iter(|| black_box(set.last_index_of_any(black_box(&hay))));
        });
    }

    group.finish();
}

fn bench_ignore_case(c: &mut Criterion) {
    let hay = haystack(64 * 1024, "Stra\u{df}e");
    let mut group = c.benchmark_group("ignore_case");
    group.throughput(Throughput::Elements(hay.len() as u64));

    for (name, needles) in [
        ("ascii_letters", &["needle", "HAYSTACK"][..]),
        ("ascii", &["need-le", "hay_stack"][..]),
        ("unicode", &["stra\u{df}e", "\u{e9}t\u{e9}"][..]),
    ] {
        let set = StringSearchValues::new(needles, MatchMode::CaseInsensitive).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| black_box(set.index_of_any(black_box(&hay))));
        });
    }

    group.finish();
}

fn bench_char_sets(c: &mut Criterion) {
    let hay = haystack(64 * 1024, "\u{4e2d}");
    let mut group = c.benchmark_group("char_sets");
    group.throughput(Throughput::Elements(hay.len() as u64));

    let ascii: Vec<u16> = "<>&\"'".encode_utf16().collect();
    let range: Vec<u16> = (0x4e00..0x4e40).collect();
    let sparse: Vec<u16> = (0..40).map(|i| 0x100 + i * 97).chain([0x4e2d]).collect();

    for (name, values) in [("ascii", &ascii), ("range", &range), ("sparse", &sparse)] {
        for isa in [Isa::Portable, Isa::detect()] {
            let set = SearchValues::builder().isa(isa).build_chars(values).unwrap();
            group.bench_function(BenchmarkId::new(name, isa), |b| {
                b.iter(|| black_box(set.index_of_any(black_box(&hay))));
            });
        }
    }

    let set = CharSearchValues::new(&"abcdefghijklmnopqrstuvwxyz ,".encode_utf16().collect::<Vec<_>>());
    group.bench_function("except", |b| {
        b.iter(|| black_box(set.index_of_any_except(black_box(&hay))));
    });

    group.finish();
}

fn bench_byte_sets(c: &mut Criterion) {
    let mut hay = vec![b'a'; 64 * 1024];
    hay.push(b'\n');

    let mut group = c.benchmark_group("byte_sets");
    group.throughput(Throughput::Bytes(hay.len() as u64));

    let set = ByteSearchValues::new(b"\r\n\t");
    group.bench_function("newline", |b| {
        b.iter(|| black_box(set.index_of_any(black_box(&hay))));
    });
    group.bench_function("memchr_baseline", |b| {
        b.iter(|| black_box(memchr::memchr3(b'\r', b'\n', b'\t', black_box(&hay))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_strategies,
    bench_ignore_case,
    bench_char_sets,
    bench_byte_sets
);
criterion_main!(benches);
