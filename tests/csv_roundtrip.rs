use panformat::conversion::{self, ConversionIssueCode, ConversionRequest};
use panformat::plugin::CsvPlugin;
use panformat::value::json::from_json_str;
use panformat::{Document, FormatError, FormatPlugin, MediaType, Params, PluginRegistry, Value};
use proptest::prelude::*;

mod proptest_helpers;

const ITEMS_CSV: &str = include_str!("fixtures/items.csv");

fn csv_media() -> MediaType {
    MediaType::parse("text/csv").unwrap()
}

fn read_csv(text: &str, params: &Params) -> Result<Value, FormatError> {
    CsvPlugin::new().read(&Document::text(text, csv_media()), params)
}

fn write_csv(value: &Value, params: &Params) -> Result<String, FormatError> {
    let doc = CsvPlugin::new().write(value, params, &csv_media())?;
    Ok(doc.as_text().expect("csv output is text").to_string())
}

#[test]
fn fixture_reads_as_string_rows() {
    let value = read_csv(ITEMS_CSV, &Params::new()).unwrap();

    assert_eq!(
        value,
        from_json_str(
            r#"[
                {"name":"gizmo","quantity":"123","price":"9.99"},
                {"name":"widget, large","quantity":"7","price":"1.50"}
            ]"#
        )
        .unwrap()
    );
}

#[test]
fn fixture_survives_read_then_write() {
    let value = read_csv(ITEMS_CSV, &Params::new()).unwrap();
    assert_eq!(write_csv(&value, &Params::new()).unwrap(), ITEMS_CSV);
}

#[test]
fn headerless_tables_with_custom_dialect() {
    let params = Params::new()
        .with("UseHeader", false)
        .with("Separator", ";")
        .with("Quote", "'");
    let value = read_csv("a;'b;c'\n1;2\n", &params).unwrap();
    assert_eq!(value, from_json_str(r#"[["a","b;c"],["1","2"]]"#).unwrap());

    assert_eq!(write_csv(&value, &params).unwrap(), "a;'b;c'\n1;2\n");
}

#[test]
fn json_numbers_become_csv_text_with_a_warning() {
    let registry = PluginRegistry::with_builtins();
    let input = Document::text(
        r#"[{"name":"gizmo","price":19.990,"stock":null}]"#,
        MediaType::parse("application/json").unwrap(),
    );

    let conversion =
        conversion::convert(&registry, &input, &ConversionRequest::new("text/csv")).unwrap();

    assert_eq!(
        conversion.document.as_text(),
        Some("name,price,stock\ngizmo,19.990,\n")
    );
    assert!(conversion.report.is_lossy());
    assert!(conversion
        .report
        .has_code(ConversionIssueCode::ScalarsWrittenAsText));
}

#[test]
fn nested_values_cannot_be_cells() {
    let value = from_json_str(r#"[{"name":"gizmo","colors":["red"]}]"#).unwrap();
    let err = write_csv(&value, &Params::new()).unwrap_err();
    assert!(matches!(err, FormatError::Unsupported { .. }));
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn string_tables_roundtrip((headers, rows) in proptest_helpers::arb_string_table(4, 8)) {
        let table = Value::Array(rows);
        let params = Params::new().with("Headers", headers.join(","));

        let csv = write_csv(&table, &params).expect("write csv");
        let restored = read_csv(&csv, &Params::new()).expect("read csv");

        prop_assert_eq!(table, restored);
    }
}
