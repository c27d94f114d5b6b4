//! Reductions from a decoded render response to event counts.
//!
//! A response that does not have the expected structure is reported as
//! `NoData` and never as an error: the SLO engine treats an empty window
//! differently from a failed query.

use serde_json::Value;
use slo_core::{BucketCounts, EventSum};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq)]
enum ShapeError {
    #[error("response is not a list of series")]
    NotASeriesList,

    #[error("response contains no series")]
    NoSeries,

    #[error("missing key '{0}'")]
    MissingKey(&'static str),

    #[error("'{0}' is not a list")]
    NotAList(&'static str),

    #[error("sample {index} of series {series} is not a [value, timestamp] pair")]
    MalformedSample { series: usize, index: usize },

    #[error("sample {index} of series {series} has a non-numeric value")]
    NonNumeric { series: usize, index: usize },
}

/// Splits every non-null sample into two buckets around `threshold`.
///
/// A value equal to the threshold falls in the below bucket. With
/// `good_below_threshold` the below bucket is good, otherwise it is bad.
pub fn count_threshold(
    response: &Value,
    threshold: f64,
    good_below_threshold: bool,
) -> BucketCounts {
    match tally(response, threshold) {
        Ok((below, above)) => {
            debug!("{} samples below threshold {}, {} above", below, threshold, above);
            let counts = BucketCounts::new(below, above);
            if good_below_threshold {
                counts
            } else {
                counts.swapped()
            }
        }
        Err(e) => {
            warn!("Couldn't find any values in timeseries response");
            debug!("{}", e);
            BucketCounts::NoData
        }
    }
}

/// Sums the strictly positive values of a single series.
///
/// Accepts the render API shape (`[{"datapoints": [[v, ts], ...]}]`, first
/// series only) as well as `{"result": [{"data": [{"values": [...]}]}]}`.
pub fn count(response: &Value) -> EventSum {
    let values = match response {
        Value::Array(_) => first_series_values(response),
        _ => result_data_values(response),
    };

    match values {
        Ok(values) => EventSum::Sum {
            total: values.into_iter().filter(|v| *v > 0.0).sum(),
        },
        Err(e) => {
            warn!("Couldn't find any values in timeseries response");
            debug!("{}", e);
            EventSum::NoData
        }
    }
}

fn series_list(response: &Value) -> Result<&Vec<Value>, ShapeError> {
    let series = response.as_array().ok_or(ShapeError::NotASeriesList)?;
    if series.is_empty() {
        return Err(ShapeError::NoSeries);
    }
    Ok(series)
}

fn datapoints(series: &Value) -> Result<&Vec<Value>, ShapeError> {
    series
        .get("datapoints")
        .ok_or(ShapeError::MissingKey("datapoints"))?
        .as_array()
        .ok_or(ShapeError::NotAList("datapoints"))
}

/// Value of a `[value, timestamp]` pair; `None` when the value is null.
fn sample_value(sample: &Value, series: usize, index: usize) -> Result<Option<f64>, ShapeError> {
    let value = sample
        .as_array()
        .and_then(|pair| pair.first())
        .ok_or(ShapeError::MalformedSample { series, index })?;

    numeric(value).ok_or(ShapeError::NonNumeric { series, index })
}

fn numeric(value: &Value) -> Option<Option<f64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => n.as_f64().map(Some),
        _ => None,
    }
}

fn tally(response: &Value, threshold: f64) -> Result<(u64, u64), ShapeError> {
    let mut below = 0u64;
    let mut above = 0u64;

    for (s, series) in series_list(response)?.iter().enumerate() {
        for (i, sample) in datapoints(series)?.iter().enumerate() {
            match sample_value(sample, s, i)? {
                Some(value) if value <= threshold => below += 1,
                Some(_) => above += 1,
                None => {}
            }
        }
    }

    Ok((below, above))
}

fn first_series_values(response: &Value) -> Result<Vec<f64>, ShapeError> {
    let series = &series_list(response)?[0];
    let mut values = Vec::new();

    for (i, sample) in datapoints(series)?.iter().enumerate() {
        if let Some(value) = sample_value(sample, 0, i)? {
            values.push(value);
        }
    }

    Ok(values)
}

fn result_data_values(response: &Value) -> Result<Vec<f64>, ShapeError> {
    let data = response
        .get("result")
        .ok_or(ShapeError::MissingKey("result"))?
        .as_array()
        .ok_or(ShapeError::NotAList("result"))?
        .first()
        .ok_or(ShapeError::NoSeries)?
        .get("data")
        .ok_or(ShapeError::MissingKey("data"))?
        .as_array()
        .ok_or(ShapeError::NotAList("data"))?;

    let mut values = Vec::new();
    for (i, point) in data.iter().enumerate() {
        let point_values = point
            .get("values")
            .ok_or(ShapeError::MissingKey("values"))?
            .as_array()
            .ok_or(ShapeError::NotAList("values"))?;

        for value in point_values {
            match numeric(value) {
                Some(Some(v)) => values.push(v),
                Some(None) => {}
                None => return Err(ShapeError::NonNumeric { series: 0, index: i }),
            }
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn series(values: &[Option<f64>]) -> Value {
        let datapoints: Vec<Value> = values
            .iter()
            .enumerate()
            .map(|(i, v)| json!([v, 1612257900 + 300 * i as i64]))
            .collect();
        json!([{ "target": "a.b.c", "datapoints": datapoints }])
    }

    #[test]
    fn test_count_threshold_good_below() {
        let response = series(&[Some(10.0), None, Some(60.0), Some(50.0)]);
        assert_eq!(count_threshold(&response, 50.0, true), BucketCounts::new(2, 1));
    }

    #[test]
    fn test_count_threshold_good_above() {
        let response = series(&[Some(10.0), None, Some(60.0), Some(50.0)]);
        assert_eq!(count_threshold(&response, 50.0, false), BucketCounts::new(1, 2));
    }

    #[test]
    fn test_count_threshold_accumulates_all_series() {
        let response = json!([
            { "target": "a", "datapoints": [[1.0, 1], [99.0, 2]] },
            { "target": "b", "datapoints": [[2.0, 1], [null, 2], [3, 3]] }
        ]);
        assert_eq!(count_threshold(&response, 10.0, true), BucketCounts::new(3, 1));
    }

    #[test]
    fn test_count_threshold_all_null_is_zero_counts() {
        let response = series(&[None, None]);
        assert_eq!(count_threshold(&response, 1.0, true), BucketCounts::new(0, 0));
    }

    #[test]
    fn test_count_threshold_malformed_is_no_data() {
        let cases = [
            json!([]),
            json!({}),
            json!(null),
            json!("[]"),
            json!([{ "target": "a.b.c" }]),
            json!([{ "datapoints": {} }]),
            json!([{ "datapoints": [[]] }]),
            json!([{ "datapoints": [5] }]),
            json!([{ "datapoints": [["ten", 1]] }]),
            json!([{ "datapoints": [[1, 1]] }, { "target": "missing" }]),
        ];

        for response in &cases {
            assert_eq!(
                count_threshold(response, 50.0, true),
                BucketCounts::NoData,
                "expected NoData for {}",
                response
            );
        }
    }

    #[test]
    fn test_count_sums_positive_values() {
        let response = series(&[Some(5.0), Some(-3.0), Some(0.0), None, Some(7.0)]);
        assert_eq!(count(&response), EventSum::Sum { total: 12.0 });
    }

    #[test]
    fn test_count_uses_first_series_only() {
        let response = json!([
            { "datapoints": [[1, 1], [2, 2]] },
            { "datapoints": [[100, 1]] }
        ]);
        assert_eq!(count(&response), EventSum::Sum { total: 3.0 });
    }

    #[test]
    fn test_count_result_data_shape() {
        let response = json!({
            "result": [{ "data": [
                { "values": [5, -3, 0] },
                { "values": [null, 7] }
            ]}]
        });
        assert_eq!(count(&response), EventSum::Sum { total: 12.0 });
    }

    #[test]
    fn test_count_malformed_is_no_data() {
        let cases = [
            json!([]),
            json!({}),
            json!({ "result": [] }),
            json!({ "result": [{}] }),
            json!({ "result": [{ "data": [{}] }] }),
            json!([{ "target": "a.b.c" }]),
        ];

        for response in &cases {
            assert_eq!(count(response), EventSum::NoData, "expected NoData for {}", response);
        }
    }

    proptest! {
        #[test]
        fn threshold_value_is_below(threshold in -1.0e6f64..1.0e6) {
            let response = series(&[Some(threshold)]);
            prop_assert_eq!(count_threshold(&response, threshold, true), BucketCounts::new(1, 0));
            prop_assert_eq!(count_threshold(&response, threshold, false), BucketCounts::new(0, 1));
        }

        #[test]
        fn buckets_cover_every_present_sample(
            values in proptest::collection::vec(proptest::option::of(-1.0e3f64..1.0e3), 1..50),
            threshold in -1.0e3f64..1.0e3,
        ) {
            let response = series(&values);
            let present = values.iter().filter(|v| v.is_some()).count() as u64;

            let below = count_threshold(&response, threshold, true);
            let above = count_threshold(&response, threshold, false);

            prop_assert_eq!(below.total(), Some(present));
            prop_assert_eq!(below.swapped(), above);
        }
    }
}
