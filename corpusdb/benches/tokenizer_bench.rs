use criterion::{criterion_group, criterion_main, Criterion};
use corpusdb::tokenizer::{term_frequencies, tokenize};

static TEXT: &str = "The quick brown fox jumps over the lazy dog. Pack my box \
with five dozen liquor jugs! How vexingly quick daft zebras jump? Sphinx of \
black quartz, judge my vow. The five boxing wizards jump quickly, again and \
again, over every lazy dog in the pack.";

fn bench_tokenizer(c: &mut Criterion) {
    c.bench_function("tokenize", |b| b.iter(|| tokenize(TEXT)));

    let terms = tokenize(TEXT);
    c.bench_function("term_frequencies", |b| {
        b.iter(|| term_frequencies(TEXT, &terms))
    });
}

criterion_group!(benches, bench_tokenizer);
criterion_main!(benches);
