use criterion::{criterion_group, criterion_main, Criterion};
use metrics_cloudwatch_buffered::{Builder, JsonLinesBackend};

fn criterion_benchmark(c: &mut Criterion) {
    let mut metrics = Builder::new()
        .namespace("MyApplication")
        .backend(JsonLinesBackend::new(std::io::sink()))
        .with_dimension("Function", "My_Function_Name")
        .with_dimension("Method", "Default")
        .init()
        .unwrap();

    c.bench_function("count", |b| b.iter(|| metrics.count("requests", None).unwrap().flush().unwrap().sink().len()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
