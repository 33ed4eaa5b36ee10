use super::*;
use crate::parser::{CsvParser, JsonParser, RecordParser};
use serde_json::json;

fn records(value: serde_json::Value) -> Vec<Record> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

fn body_text(output: &SerializedOutput) -> &str {
    std::str::from_utf8(&output.body).unwrap()
}

#[test]
fn test_output_format_names() {
    assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    assert_eq!("parquet".parse::<OutputFormat>().unwrap(), OutputFormat::Parquet);
    assert_eq!(OutputFormat::Csv.content_type(), "text/csv");

    let err = "xml".parse::<OutputFormat>().unwrap_err();
    assert!(matches!(err, DatasetError::UnsupportedFormat(ref f) if f == "xml"));
}

#[test]
fn test_json_is_pretty_printed_in_insertion_order() {
    let input = records(json!([{"b": 1, "a": "x"}]));
    let output = serialize(&input, OutputFormat::Json, None).unwrap();

    assert_eq!(output.content_type, "application/json");
    assert_eq!(body_text(&output), "[\n  {\n    \"b\": 1,\n    \"a\": \"x\"\n  }\n]");
}

#[test]
fn test_json_round_trip() {
    let input = records(json!([
        {"id": 1, "text": "hello", "tags": ["a", "b"], "meta": {"ok": true}, "none": null},
        {"id": 2.5, "other": "field"}
    ]));
    let output = serialize(&input, OutputFormat::Json, None).unwrap();
    let parsed = JsonParser.parse(&output.body).unwrap();

    assert_eq!(parsed, input);
}

#[test]
fn test_json_empty_dataset() {
    let output = serialize(&[], OutputFormat::Json, None).unwrap();
    assert_eq!(body_text(&output), "[]");
}

#[test]
fn test_csv_header_is_sorted_union() {
    let input = records(json!([
        {"name": "a", "id": "1"},
        {"zip": "9", "id": "2"}
    ]));
    let output = serialize(&input, OutputFormat::Csv, None).unwrap();

    assert_eq!(output.content_type, "text/csv");
    assert_eq!(body_text(&output), "id,name,zip\n1,a,\n2,,9\n");
}

#[test]
fn test_csv_value_rendering() {
    let input = records(json!([
        {"b": true, "n": 3, "f": 1.5, "z": null, "o": {"k": 1}, "s": "a,b"}
    ]));
    let output = serialize(&input, OutputFormat::Csv, None).unwrap();

    assert_eq!(
        body_text(&output),
        "b,f,n,o,s,z\ntrue,1.5,3,\"{\"\"k\"\":1}\",\"a,b\",\n"
    );
}

#[test]
fn test_csv_round_trip_ignoring_key_order() {
    let input = records(json!([
        {"text_column": "Review, with comma", "id": "1"},
        {"text_column": "Line\nbreak", "id": "2"}
    ]));
    let output = serialize(&input, OutputFormat::Csv, None).unwrap();
    let parsed = CsvParser::default().parse(&output.body).unwrap();

    assert_eq!(parsed, input);
}

#[test]
fn test_csv_empty_dataset() {
    let output = serialize(&[], OutputFormat::Csv, None).unwrap();
    assert!(output.body.is_empty());
    assert_eq!(output.content_type, "text/csv");
}

#[test]
fn test_parquet_without_codec() {
    let input = records(json!([{"a": 1}]));
    let err = serialize(&input, OutputFormat::Parquet, None).unwrap_err();
    assert!(matches!(err, DatasetError::CapabilityUnavailable("parquet")));
}

/// Codec that fails if it is ever asked to do work
struct UnreachableCodec;

impl ColumnarCodec for UnreachableCodec {
    fn name(&self) -> &'static str {
        "parquet"
    }

    fn decode(&self, _bytes: &[u8]) -> Result<Vec<Record>, DatasetError> {
        panic!("decode must not be called")
    }

    fn encode(&self, _records: &[Record]) -> Result<Vec<u8>, DatasetError> {
        panic!("encode must not be called for an empty dataset")
    }
}

#[test]
fn test_parquet_empty_dataset_skips_codec() {
    let codec: Arc<dyn ColumnarCodec> = Arc::new(UnreachableCodec);
    let output = serialize(&[], OutputFormat::Parquet, Some(&codec)).unwrap();

    assert!(output.body.is_empty());
    assert_eq!(output.content_type, "application/vnd.apache.parquet");
}

#[cfg(feature = "parquet")]
#[test]
fn test_parquet_round_trip() {
    let codec: Arc<dyn ColumnarCodec> = Arc::new(crate::columnar::ParquetCodec::default());
    let input = records(json!([
        {"id": 1, "ai_insight": "first"},
        {"id": 2, "ai_insight": "second"}
    ]));

    let output = serialize(&input, OutputFormat::Parquet, Some(&codec)).unwrap();
    assert_eq!(codec.decode(&output.body).unwrap(), input);
}
