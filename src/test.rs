use super::*;
use std::io;
use std::sync::{Arc, Mutex};

/// Shared buffer the fmt subscriber writes into
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber installed for this thread, returning what was logged at WARN and above
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .with_target(false)
        .without_time()
        .finish();

    let output = tracing::subscriber::with_default(subscriber, f);
    let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (output, logged)
}

/// Buffered emitter with page size 3 and no MetricStreamId dimension
fn metrics(dimensions: &[(&'static str, &'static str)]) -> Emitter<BufferedSink<MemoryBackend>> {
    let mut metrics = Builder::new()
        .namespace("namespace")
        .backend(MemoryBackend::new())
        .page_size(3)
        .init()
        .unwrap();

    metrics.without_dimension(STREAM_ID_DIMENSION);
    for (name, value) in dimensions {
        metrics.with_dimension(*name, *value);
    }
    metrics
}

fn values(page: &[MetricDatum]) -> Vec<f64> {
    page.iter().filter(|d| &*d.metric_name == "counter").map(|d| d.value).collect()
}

#[test]
fn autoflush_exactly_one_page() {
    let mut m = metrics(&[]);
    m.count("counter", 1.0).unwrap();
    m.count("counter", 2.0).unwrap();
    m.count("counter", 3.0).unwrap();

    let calls = m.sink().backend().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.len(), 3);
    assert_eq!(values(&calls[0].1), [1.0, 2.0, 3.0]);
}

#[test]
fn autoflush_one_and_a_half_pages() {
    let mut m = metrics(&[]);
    m.count("counter", 1.0).unwrap();
    m.count("counter", 2.0).unwrap();
    m.count("counter", 3.0).unwrap();
    assert!(m.sink().pending("namespace").is_empty());
    m.count("counter", 4.0).unwrap();

    let calls = m.sink().backend().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(values(&calls[0].1), [1.0, 2.0, 3.0]);

    m.flush().unwrap();

    let calls = m.sink().backend().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].1.len(), 1);
    assert_eq!(values(&calls[1].1), [4.0]);
}

#[test]
fn nine_dimensions_make_three_pages_and_a_summary() {
    let mut m = metrics(&[
        ("dim1", "1"),
        ("dim2", "2"),
        ("dim3", "3"),
        ("dim4", "4"),
        ("dim5", "5"),
        ("dim6", "6"),
        ("dim7", "7"),
        ("dim8", "8"),
        ("dim9", "9"),
    ]);
    m.count("counter", 1.0).unwrap();

    let calls = m.sink().backend().calls();
    assert_eq!(calls.len(), 3);
    for (_, page) in calls {
        assert_eq!(values(page), [1.0, 1.0, 1.0]);
        assert!(page.iter().all(|d| d.dimensions.len() == 1));
    }

    let pending = m.sink().pending("namespace");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].dimensions.len(), 9);

    m.flush().unwrap();
    assert_eq!(m.sink().backend().calls().len(), 4);
}

#[test]
fn overflow_keeps_oldest() {
    let mut m = Builder::new()
        .namespace("namespace")
        .backend(MemoryBackend::new())
        .page_size(10)
        .max_items(5)
        .stream_id("stream")
        .init()
        .unwrap();
    m.without_dimension(STREAM_ID_DIMENSION);

    for value in 0..8 {
        m.count("counter", f64::from(value)).unwrap();
    }
    assert_eq!(m.sink().len(), 5);

    m.flush().unwrap();
    let calls = m.sink().backend().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(values(&calls[0].1), [0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn namespaces_switch_mid_stream() {
    let mut m = metrics(&[]);
    m.count("counter", 1.0).unwrap();
    m.with_namespace("other").count("counter", 2.0).unwrap();
    m.flush().unwrap();

    let calls = m.sink().backend().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "namespace");
    assert_eq!(calls[1].0, "other");

    let listed = m.list_metrics("counter").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].namespace, "other");
}

#[test]
fn json_lines_output() {
    let mut m = Builder::new()
        .namespace("namespace")
        .backend(JsonLinesBackend::new(Vec::<u8>::new()))
        .stream_id("stream")
        .init()
        .unwrap();

    let timestamp = chrono::DateTime::from_timestamp_millis(1687657545423).unwrap();
    m.with_dimension("Api", "a_function")
        .emit_at("success", 1.0, Unit::Count, timestamp)
        .unwrap();
    assert!(m.sink().backend().get_ref().is_empty());

    m.flush().unwrap();
    let output = String::from_utf8(m.into_sink().into_inner().into_inner()).unwrap();
    assert_eq!(
        output,
        r#"{"Namespace":"namespace","MetricData":[{"MetricName":"success","Dimensions":[{"Name":"MetricStreamId","Value":"stream"}],"Timestamp":"2023-06-25 01:45:45 +00:00","Value":1.0,"Unit":"Count","StorageResolution":60},{"MetricName":"success","Dimensions":[{"Name":"Api","Value":"a_function"}],"Timestamp":"2023-06-25 01:45:45 +00:00","Value":1.0,"Unit":"Count","StorageResolution":60},{"MetricName":"success","Dimensions":[{"Name":"MetricStreamId","Value":"stream"},{"Name":"Api","Value":"a_function"}],"Timestamp":"2023-06-25 01:45:45 +00:00","Value":1.0,"Unit":"Count","StorageResolution":60}]}
"#
    );
}
