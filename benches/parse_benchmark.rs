use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dsvstream::{DsvOptions, DsvParser};

fn generate_input(rows: usize, quoted: bool) -> String {
    let mut out = String::new();
    for i in 0..rows {
        if quoted {
            out.push_str(&format!("{i},\"name, {i}\",\"said \"\"hi\"\"\",{}\n", i * 100));
        } else {
            out.push_str(&format!("{i},name_{i},{}\n", i * 100));
        }
    }
    out
}

fn benchmark_plain(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain");

    for size in [1_000, 10_000, 100_000].iter() {
        let input = generate_input(*size, false);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
                parser.feed_str(&input).unwrap();
                parser.end().unwrap();
                while let Some(row) = parser.next_row() {
                    black_box(row);
                }
            });
        });
    }

    group.finish();
}

fn benchmark_quoted(c: &mut Criterion) {
    let mut group = c.benchmark_group("quoted");

    for size in [1_000, 10_000, 100_000].iter() {
        let input = generate_input(*size, true);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut parser = DsvParser::new(DsvOptions::default()).unwrap();
                parser.feed_str(&input).unwrap();
                parser.end().unwrap();
                while let Some(row) = parser.next_row() {
                    black_box(row);
                }
            });
        });
    }

    group.finish();
}

fn benchmark_multichar_tokens(c: &mut Criterion) {
    let mut group = c.benchmark_group("multichar");

    let options = DsvOptions::default().delimiter("||").newline("\r\n");
    let mut input = String::new();
    for i in 0..10_000 {
        input.push_str(&format!("{i}||name_{i}||{}\r\n", i * 100));
    }

    group.bench_function("10000", |b| {
        b.iter(|| {
            let mut parser = DsvParser::new(options.clone()).unwrap();
            parser.feed_str(&input).unwrap();
            parser.end().unwrap();
            while let Some(row) = parser.next_row() {
                black_box(row);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_plain,
    benchmark_quoted,
    benchmark_multichar_tokens
);
criterion_main!(benches);
