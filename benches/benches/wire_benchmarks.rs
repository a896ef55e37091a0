use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scanrc::{
    read_preferences,
    wire::{Direction, Wire, WireCodec},
    write_preferences, Preferences, PresetArea, Printer,
};

fn large_preferences() -> Preferences {
    let mut prefs = Preferences::default();
    for i in 0..64 {
        prefs.printers.push(Printer {
            name: format!("printer \"{i}\""),
            ..Printer::default()
        });
    }
    prefs.preset_areas.extend(PresetArea::standard().into_iter().cycle().take(128));
    prefs
}

fn encode(
    prefs: &mut Preferences,
    capacity: usize,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut wire = Wire::with_capacity(&mut out, Direction::Encode, capacity);
    write_preferences(prefs, &mut wire).unwrap();
    wire.finish().unwrap();
    out
}

fn bench_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar");

    let words: Vec<i64> = (0..1024).map(|i| i * 7919 - 500_000).collect();
    let mut encoded = Vec::new();
    let mut wire = Wire::new(&mut encoded, Direction::Encode);
    words.encode(&mut wire);
    wire.finish().unwrap();

    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("encode 1024 words", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(encoded.len());
            let mut wire = Wire::new(&mut out, Direction::Encode);
            black_box(&words).encode(&mut wire);
            wire.finish().unwrap();
            out
        })
    });
    group.bench_function("decode 1024 words", |b| {
        b.iter(|| {
            let mut input: &[u8] = black_box(&encoded);
            let mut wire = Wire::new(&mut input, Direction::Decode);
            let mut back: Vec<i64> = Vec::new();
            back.decode(&mut wire);
            back
        })
    });

    let text = "path/with \"quotes\" and \\slashes\\ ".repeat(256);
    group.bench_function("string round trip 8k", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            let mut wire = Wire::new(&mut out, Direction::Encode);
            black_box(&text).encode(&mut wire);
            wire.finish().unwrap();
            let mut input: &[u8] = &out;
            let mut wire = Wire::new(&mut input, Direction::Decode);
            let mut back = String::new();
            back.decode(&mut wire);
            back
        })
    });
    group.finish();
}

fn bench_preferences(c: &mut Criterion) {
    let mut group = c.benchmark_group("preferences");
    let mut prefs = large_preferences();
    let encoded = encode(&mut prefs, 8192);
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    for capacity in [64usize, 1024, 8192] {
        group.bench_with_input(BenchmarkId::new("write", capacity), &capacity, |b, &cap| {
            b.iter(|| encode(black_box(&mut prefs), cap))
        });
        group.bench_with_input(BenchmarkId::new("read", capacity), &capacity, |b, &cap| {
            b.iter(|| {
                let mut input: &[u8] = black_box(&encoded);
                let mut wire = Wire::with_capacity(&mut input, Direction::Decode, cap);
                read_preferences(&mut wire).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scalars, bench_preferences);
criterion_main!(benches);
