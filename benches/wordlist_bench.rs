use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use wordforge::affix::expand_dictionary;
use wordforge::dict::{AffixKind, AffixRule, MemorySpeller};
use wordforge::frequency::{ExportOptions, FrequencyModel};

const POOL: &[&str] = &[
    "the", "of", "and", "to", "in", "is", "was", "he", "for", "it", "with", "as", "his", "on",
    "be", "at", "by", "had", "not", "are", "but", "from", "or", "have", "an", "they", "which",
    "one", "you", "were", "her", "all", "she", "there", "would", "their", "we", "him", "been",
    "has", "when", "who", "will", "more", "no", "if", "out", "so", "said", "what",
];

// Deterministic pseudo-corpus: word choice walks the pool with a
// multiplicative stride so bigram pairs repeat at realistic rates.
fn synthetic_corpus(sentences: usize) -> Vec<String> {
    let mut corpus = Vec::with_capacity(sentences);
    let mut state = 7usize;
    for _ in 0..sentences {
        let length = 4 + state % 9;
        let mut words = Vec::with_capacity(length);
        for _ in 0..length {
            state = state.wrapping_mul(31).wrapping_add(17);
            words.push(POOL[state % POOL.len()]);
        }
        corpus.push(format!("{}.", words.join(" ")));
    }
    corpus
}

fn ingested_model(corpus: &[String]) -> FrequencyModel {
    let mut model = FrequencyModel::new().unwrap();
    for line in corpus {
        model.add_line(line, true);
    }
    model
}

fn synthetic_speller(stems: usize) -> MemorySpeller {
    let mut speller = MemorySpeller::new();
    let rules = [
        AffixRule::new(AffixKind::Suffix, 'S', "", "s", "[^s]", true, &[]).unwrap(),
        AffixRule::new(AffixKind::Suffix, 'D', "", "ed", "[^e]", true, &['L']).unwrap(),
        AffixRule::new(AffixKind::Suffix, 'L', "", "ly", "", true, &[]).unwrap(),
        AffixRule::new(AffixKind::Prefix, 'U', "", "un", "", true, &[]).unwrap(),
    ];
    for rule in rules {
        speller.add_rule(rule);
    }
    for i in 0..stems {
        let stem = format!("{}{}", POOL[i % POOL.len()], i);
        speller.add_stem(&stem, &['S', 'D', 'U']);
    }
    speller
}

fn criterion_benchmark(c: &mut Criterion) {
    let corpus = synthetic_corpus(2000);

    c.bench_function("ingest 2k sentences", |b| {
        b.iter(|| ingested_model(black_box(&corpus)))
    });

    let model = ingested_model(&corpus);
    c.bench_function("export word list", |b| {
        b.iter(|| model.export(black_box(ExportOptions::default())))
    });

    let speller = synthetic_speller(1000);
    c.bench_function("expand 1k stems", |b| {
        b.iter(|| expand_dictionary(black_box(&speller)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
