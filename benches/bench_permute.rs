use criterion::{criterion_group, criterion_main, Criterion};

use domtwist::permutate::Fuzzer;

fn criterion_benchmark(c: &mut Criterion) {
    let fuzzer = Fuzzer::new("example.com", Vec::new(), Vec::new());

    c.bench_function("addition example.com", |b| b.iter(|| fuzzer.addition()));
    c.bench_function("bitsquatting example.com", |b| {
        b.iter(|| fuzzer.bitsquatting())
    });
    c.bench_function("cyrillic example.com", |b| b.iter(|| fuzzer.cyrillic()));
    c.bench_function("homoglyph example.com", |b| b.iter(|| fuzzer.homoglyph()));
    c.bench_function("hyphenation example.com", |b| {
        b.iter(|| fuzzer.hyphenation())
    });
    c.bench_function("insertion example.com", |b| b.iter(|| fuzzer.insertion()));
    c.bench_function("omission example.com", |b| b.iter(|| fuzzer.omission()));
    c.bench_function("plural example.com", |b| b.iter(|| fuzzer.plural()));
    c.bench_function("repetition example.com", |b| b.iter(|| fuzzer.repetition()));
    c.bench_function("replacement example.com", |b| {
        b.iter(|| fuzzer.replacement())
    });
    c.bench_function("subdomain example.com", |b| b.iter(|| fuzzer.subdomain()));
    c.bench_function("transposition example.com", |b| {
        b.iter(|| fuzzer.transposition())
    });
    c.bench_function("vowel_swap example.com", |b| b.iter(|| fuzzer.vowel_swap()));
    c.bench_function("generate-all example.com", |b| {
        b.iter(|| fuzzer.generate(&[]))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
