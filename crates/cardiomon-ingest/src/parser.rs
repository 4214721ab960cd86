use crate::error::{IngestError, Result};
use cardiomon_common::types::{MetricType, Reading};

/// Parses one `Patient ID: <int>, Timestamp: <ms>, Label: <label>, Data: <float>[%]`
/// line into a [`Reading`].
///
/// Fields may appear in any order. A trailing `%` on the data value is
/// stripped. Labels that are not metric types (the simulator also emits
/// `Alert` lines) yield [`IngestError::UnknownLabel`].
///
/// # Examples
///
/// ```
/// use cardiomon_common::types::MetricType;
/// use cardiomon_ingest::parse_line;
///
/// let reading = parse_line("Patient ID: 7, Timestamp: 1000, Label: Saturation, Data: 94.0%").unwrap();
/// assert_eq!(reading.patient_id, 7);
/// assert_eq!(reading.metric_type, MetricType::Saturation);
/// assert_eq!(reading.value, 94.0);
/// ```
pub fn parse_line(line: &str) -> Result<Reading> {
    let malformed = |reason: String| IngestError::Malformed {
        line: line.to_string(),
        reason,
    };

    let mut patient_id = None;
    let mut timestamp = None;
    let mut label = None;
    let mut data = None;

    for field in line.trim().split(',') {
        let field = field.trim();
        let (key, value) = field
            .split_once(": ")
            .ok_or_else(|| malformed(format!("field {field:?} has no ': ' separator")))?;
        let value = value.trim();
        match key.trim() {
            "Patient ID" => patient_id = Some(value),
            "Timestamp" => timestamp = Some(value),
            "Label" => label = Some(value),
            "Data" => data = Some(value),
            other => return Err(malformed(format!("unexpected field {other:?}"))),
        }
    }

    let patient_id = patient_id
        .ok_or_else(|| malformed("missing Patient ID".into()))?
        .parse::<i32>()
        .map_err(|e| malformed(format!("bad Patient ID: {e}")))?;
    let timestamp = timestamp
        .ok_or_else(|| malformed("missing Timestamp".into()))?
        .parse::<i64>()
        .map_err(|e| malformed(format!("bad Timestamp: {e}")))?;
    let label = label.ok_or_else(|| malformed("missing Label".into()))?;
    let data = data.ok_or_else(|| malformed("missing Data".into()))?;

    let metric_type: MetricType = label
        .parse()
        .map_err(|_| IngestError::UnknownLabel(label.to_string()))?;

    let value = data
        .strip_suffix('%')
        .unwrap_or(data)
        .trim()
        .parse::<f64>()
        .map_err(|e| malformed(format!("bad Data: {e}")))?;
    if !value.is_finite() {
        return Err(malformed(format!("non-finite Data {value}")));
    }

    Ok(Reading::new(patient_id, value, metric_type, timestamp))
}
