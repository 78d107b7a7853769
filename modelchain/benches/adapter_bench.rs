//! Benchmarks for payload building and reply parsing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use modelchain::adapter::{build_payload, extract_text, ModelFamily};
use modelchain::testing::reply_for;

fn adapter_benchmark(c: &mut Criterion) {
    let user_text = "Create comprehensive unit tests for this code. ".repeat(200);

    for family in ModelFamily::ALL {
        c.bench_function(&format!("build_payload/{family}"), |b| {
            b.iter(|| {
                build_payload(black_box(family), black_box("You are a QA engineer."), black_box(&user_text))
                    .to_bytes()
            })
        });

        let reply = reply_for(family, &user_text);
        c.bench_function(&format!("extract_text/{family}"), |b| {
            b.iter(|| extract_text(black_box(family), "bench-model", black_box(&reply)))
        });
    }
}

criterion_group!(benches, adapter_benchmark);
criterion_main!(benches);
