//! # Datum
//!
//! Records and documents shipped to the metrics backend, serialized via serde_json
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/APIReference/API_PutMetricData.html>

use super::unit::Unit;
use chrono::{DateTime, Utc};
use metrics::SharedString;
use serde::{Serialize, Serializer};

/// Wire format for timestamps, e.g. `2023-06-22 17:36:47 +00:00`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// A single (name, value) tag attached to a MetricDatum
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dimension {
    #[serde(rename = "Name", serialize_with = "shared_str")]
    pub name: SharedString,
    #[serde(rename = "Value", serialize_with = "shared_str")]
    pub value: SharedString,
}

impl Dimension {
    pub fn new(name: impl Into<SharedString>, value: impl Into<SharedString>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One fully formed data point, immutable once built by the [Emitter](super::Emitter)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricDatum {
    #[serde(rename = "MetricName", serialize_with = "shared_str")]
    pub metric_name: SharedString,
    #[serde(rename = "Dimensions")]
    pub dimensions: Vec<Dimension>,
    #[serde(rename = "Timestamp", serialize_with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Unit")]
    pub unit: Unit,
    #[serde(rename = "StorageResolution")]
    pub storage_resolution: u32,
}

/// A metric known to the backend, as returned by `list_metrics`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    #[serde(rename = "Namespace")]
    pub namespace: String,
    #[serde(rename = "MetricName")]
    pub metric_name: String,
    #[serde(rename = "Dimensions")]
    pub dimensions: Vec<Dimension>,
}

/// One page of data as a single PutMetricData request document
#[derive(Serialize)]
pub struct PutMetricData<'a> {
    #[serde(rename = "Namespace")]
    pub namespace: &'a str,
    #[serde(rename = "Profile")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<&'a str>,
    #[serde(rename = "MetricData")]
    pub metric_data: &'a [MetricDatum],
}

fn shared_str<S: Serializer>(value: &SharedString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value)
}

fn timestamp<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn put_metric_data() {
        let datum = MetricDatum {
            metric_name: "FrameTime".into(),
            dimensions: vec![Dimension::new("Address", "10.172.207.225"), Dimension::new("Port", "7779")],
            timestamp: Utc.timestamp_millis_opt(1687394207903).unwrap(),
            value: 10.0,
            unit: Unit::Milliseconds,
            storage_resolution: 60,
        };

        let page = [datum];
        let document = PutMetricData {
            namespace: "GameServerMetrics",
            profile: None,
            metric_data: &page,
        };

        assert_eq!(
            serde_json::to_string(&document).unwrap(),
            r#"{"Namespace":"GameServerMetrics","MetricData":[{"MetricName":"FrameTime","Dimensions":[{"Name":"Address","Value":"10.172.207.225"},{"Name":"Port","Value":"7779"}],"Timestamp":"2023-06-22 00:36:47 +00:00","Value":10.0,"Unit":"Milliseconds","StorageResolution":60}]}"#
        );
    }

    #[test]
    fn profile_is_written_when_set() {
        let document = PutMetricData {
            namespace: "ns",
            profile: Some("staging"),
            metric_data: &[],
        };

        assert_eq!(
            serde_json::to_string(&document).unwrap(),
            r#"{"Namespace":"ns","Profile":"staging","MetricData":[]}"#
        );
    }
}
