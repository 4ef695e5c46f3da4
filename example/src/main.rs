use metrics_cloudwatch_buffered::{Builder, Emitter, Error, JsonLinesBackend, Sink, Unit};

fn handle_request(metrics: &mut Emitter<impl Sink>, id: u32) -> Result<(), Error> {
    metrics.push_dimensions().with_dimension("RequestId", id.to_string());

    metrics.time("latency", |metrics| {
        std::thread::sleep(std::time::Duration::from_millis(5));
        metrics.count("requests", None).map(|_| ())
    })??;

    metrics.emit("payload", 512.0 * f64::from(id), Unit::Bytes)?;
    metrics.pop_dimensions()?;
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .compact()
        .init();

    let mut metrics = Builder::<JsonLinesBackend<std::io::Stdout>>::new()
        .namespace("MetricsTest")
        .profile(std::env::var("METRICS_PROFILE").unwrap_or_else(|_| "default".into()))
        .with_dimension("Function", "example")
        .init_from_profile()?;

    metrics.with_timer("run");
    for id in 0..10 {
        handle_request(&mut metrics, id)?;
    }
    metrics.elapsed("run", None)?;

    metrics.flush()?;
    Ok(())
}
