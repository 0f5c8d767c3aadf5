//! CSV format plugin.
//!
//! Maps CSV tables onto the canonical model:
//!
//! - With a header row (the default), a table reads as an array of objects
//!   keyed by column name.
//! - Without a header row, a table reads as an array of arrays, or as an
//!   array of objects when the `Headers` parameter names the columns.
//!
//! Every cell reads as a string; CSV carries no type information. On write,
//! scalars are rendered as text (numbers in their exact lexical form, `null`
//! as an empty cell). Nested arrays or objects inside a cell cannot be
//! represented and fail the write.

use std::borrow::Cow;
use std::collections::HashSet;

use super::{parameter_docs, FormatPlugin, ParameterDocs, Params};
use crate::document::{Document, MediaType};
use crate::error::FormatError;
use crate::value::{Object, Value};

const FORMAT: &str = "CSV";

pub const USE_HEADER: &str = "UseHeader";
pub const QUOTE: &str = "Quote";
pub const SEPARATOR: &str = "Separator";
pub const ESCAPE: &str = "Escape";
pub const HEADERS: &str = "Headers";

/// Reads and writes CSV text.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvPlugin;

impl CsvPlugin {
    pub fn new() -> Self {
        CsvPlugin
    }
}

/// Dialect settings shared by reading and writing.
struct Dialect {
    use_header: bool,
    separator: u8,
    quote: u8,
    escape: Option<u8>,
    headers: Option<Vec<String>>,
}

impl Dialect {
    fn from_params(params: &Params) -> Result<Self, FormatError> {
        Ok(Self {
            use_header: params.get_bool(USE_HEADER)?.unwrap_or(true),
            separator: ascii_byte(SEPARATOR, params.get_char(SEPARATOR)?.unwrap_or(','))?,
            quote: ascii_byte(QUOTE, params.get_char(QUOTE)?.unwrap_or('"'))?,
            escape: params
                .get_char(ESCAPE)?
                .map(|c| ascii_byte(ESCAPE, c))
                .transpose()?,
            headers: params.get_string_list(HEADERS)?,
        })
    }
}

fn ascii_byte(name: &str, c: char) -> Result<u8, FormatError> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(FormatError::invalid_parameter(
            name,
            format!("'{c}' is not an ASCII character"),
        ))
    }
}

impl FormatPlugin for CsvPlugin {
    fn plugin_id(&self) -> &str {
        "CSV"
    }

    fn supported_identifiers(&self) -> &[&str] {
        &["application/csv", "text/csv", "csv"]
    }

    fn preserves_scalar_kinds(&self) -> bool {
        false
    }

    fn read_parameters(&self) -> ParameterDocs {
        parameter_docs(&[
            (USE_HEADER, "Whether the first row holds column names (default true)"),
            (QUOTE, "Quote character (default '\"')"),
            (SEPARATOR, "Field separator character (default ',')"),
            (ESCAPE, "Escape character used instead of doubled quotes"),
            (HEADERS, "Column names for tables read with UseHeader=false"),
        ])
    }

    fn write_parameters(&self) -> ParameterDocs {
        parameter_docs(&[
            (USE_HEADER, "Whether to write a header row (default true)"),
            (QUOTE, "Quote character (default '\"')"),
            (SEPARATOR, "Field separator character (default ',')"),
            (ESCAPE, "Escape character used instead of doubled quotes"),
            (HEADERS, "Column names and order; defaults to first-seen key order"),
        ])
    }

    fn read(&self, input: &Document, params: &Params) -> Result<Value, FormatError> {
        params.log_unrecognized(self.plugin_id(), &self.read_parameters());
        let dialect = Dialect::from_params(params)?;
        let text = input.to_text()?;

        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(dialect.use_header)
            .delimiter(dialect.separator)
            .quote(dialect.quote)
            .escape(dialect.escape);
        if dialect.escape.is_some() {
            builder.double_quote(false);
        }
        let mut reader = builder.from_reader(text.as_bytes());

        let columns = if dialect.use_header {
            let headers = reader
                .headers()
                .map_err(|e| FormatError::parse(FORMAT, e))?;
            Some(headers.iter().map(str::to_string).collect::<Vec<_>>())
        } else {
            dialect.headers
        };
        if let Some(columns) = &columns {
            reject_duplicate_columns(columns)?;
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| FormatError::parse(FORMAT, e))?;
            let row = match &columns {
                Some(columns) => {
                    if record.len() != columns.len() {
                        return Err(FormatError::parse(
                            FORMAT,
                            format!(
                                "record {} has {} fields, expected {}",
                                index + 1,
                                record.len(),
                                columns.len()
                            ),
                        ));
                    }
                    Value::Object(
                        columns
                            .iter()
                            .zip(record.iter())
                            .map(|(column, cell)| (column.as_str(), Value::from(cell)))
                            .collect::<Object>(),
                    )
                }
                None => record.iter().map(Value::from).collect(),
            };
            rows.push(row);
        }

        Ok(Value::Array(rows))
    }

    fn write(
        &self,
        value: &Value,
        params: &Params,
        media_type: &MediaType,
    ) -> Result<Document, FormatError> {
        params.log_unrecognized(self.plugin_id(), &self.write_parameters());
        let dialect = Dialect::from_params(params)?;
        let rows = value.as_array().ok_or_else(|| FormatError::Unsupported {
            format: FORMAT.to_string(),
            kind: value.kind(),
            context: " at the root; expected an array of rows".to_string(),
        })?;

        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(dialect.separator)
            .quote(dialect.quote)
            .flexible(true);
        if let Some(escape) = dialect.escape {
            builder.double_quote(false).escape(escape);
        }
        let mut writer = builder.from_writer(Vec::new());

        let table = plan_table(rows, dialect.headers)?;
        if dialect.use_header {
            if let Some(columns) = &table.columns {
                writer
                    .write_record(columns)
                    .map_err(|e| FormatError::serialize(FORMAT, e))?;
            }
        }
        for row in rows {
            let cells = table.cells(row)?;
            writer
                .write_record(cells.iter().map(|cell| cell.as_bytes()))
                .map_err(|e| FormatError::serialize(FORMAT, e))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| FormatError::serialize(FORMAT, e.error()))?;
        let text = String::from_utf8(bytes).map_err(|e| FormatError::serialize(FORMAT, e))?;
        Ok(Document::text(text, media_type.clone()))
    }
}

/// Rows become objects keyed by column, so a repeated name would drop cells.
fn reject_duplicate_columns(columns: &[String]) -> Result<(), FormatError> {
    let mut seen = HashSet::with_capacity(columns.len());
    match columns.iter().find(|column| !seen.insert(column.as_str())) {
        Some(column) => Err(FormatError::parse(
            FORMAT,
            format!("duplicate column name '{column}'"),
        )),
        None => Ok(()),
    }
}

// ============================================================================
// Write planning
// ============================================================================

/// Column layout for a write: object rows need columns, array rows may have them.
struct Table {
    columns: Option<Vec<String>>,
    object_rows: bool,
}

fn plan_table(rows: &[Value], headers: Option<Vec<String>>) -> Result<Table, FormatError> {
    let object_rows = match rows.first() {
        Some(Value::Object(_)) | None => true,
        Some(_) => false,
    };

    for row in rows {
        let expected = if object_rows {
            row.as_object().is_some()
        } else {
            row.as_array().is_some()
        };
        if !expected {
            return Err(FormatError::Unsupported {
                format: FORMAT.to_string(),
                kind: row.kind(),
                context: " as a row; rows must all be objects or all be arrays".to_string(),
            });
        }
    }

    let columns = match headers {
        Some(headers) => Some(headers),
        None if object_rows && !rows.is_empty() => {
            let mut columns: Vec<String> = Vec::new();
            for key in rows.iter().filter_map(Value::as_object).flat_map(Object::keys) {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
            Some(columns)
        }
        None => None,
    };

    Ok(Table {
        columns,
        object_rows,
    })
}

impl Table {
    fn cells<'a>(&self, row: &'a Value) -> Result<Vec<Cow<'a, str>>, FormatError> {
        match (row, &self.columns) {
            (Value::Object(obj), Some(columns)) if self.object_rows => columns
                .iter()
                .map(|column| match obj.get(column) {
                    Some(value) => cell_text(value, column),
                    None => Ok(Cow::Borrowed("")),
                })
                .collect(),
            (Value::Array(items), _) => items
                .iter()
                .enumerate()
                .map(|(index, value)| cell_text(value, &index.to_string()))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }
}

fn cell_text<'a>(value: &'a Value, column: &str) -> Result<Cow<'a, str>, FormatError> {
    match value {
        Value::Null => Ok(Cow::Borrowed("")),
        Value::Bool(b) => Ok(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Number(n) => Ok(Cow::Owned(n.to_string())),
        Value::String(s) => Ok(Cow::Borrowed(s)),
        Value::Array(_) | Value::Object(_) => Err(FormatError::Unsupported {
            format: FORMAT.to_string(),
            kind: value.kind(),
            context: format!(" in a cell (column '{column}')"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::json::from_json_str;

    fn csv_media() -> MediaType {
        MediaType::parse("text/csv").unwrap()
    }

    fn read(text: &str, params: &Params) -> Result<Value, FormatError> {
        CsvPlugin.read(&Document::text(text, csv_media()), params)
    }

    fn write(json: &str, params: &Params) -> Result<String, FormatError> {
        let value = from_json_str(json).unwrap();
        let doc = CsvPlugin.write(&value, params, &csv_media())?;
        Ok(doc.as_text().unwrap_or_default().to_string())
    }

    #[test]
    fn test_read_with_header() {
        let value = read("name,quantity\ngizmo,123\nwidget,7\n", &Params::new()).unwrap();
        assert_eq!(
            value,
            from_json_str(r#"[{"name":"gizmo","quantity":"123"},{"name":"widget","quantity":"7"}]"#)
                .unwrap()
        );
        let first = &value.as_array().unwrap()[0];
        assert_eq!(
            first.as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["name", "quantity"]
        );
    }

    #[test]
    fn test_read_without_header() {
        let params = Params::new().with(USE_HEADER, false);
        let value = read("a;b\nc;d\n", &params.clone().with(SEPARATOR, ";")).unwrap();
        assert_eq!(value, from_json_str(r#"[["a","b"],["c","d"]]"#).unwrap());

        let named = params.with(HEADERS, "left,right");
        let value = read("a,b\n", &named).unwrap();
        assert_eq!(value, from_json_str(r#"[{"left":"a","right":"b"}]"#).unwrap());
    }

    #[test]
    fn test_read_ragged_rows_fail() {
        assert!(matches!(
            read("a,b\n1,2,3\n", &Params::new()),
            Err(FormatError::Parse { .. })
        ));
        let params = Params::new().with(USE_HEADER, false).with(HEADERS, "a,b");
        assert!(matches!(read("1\n", &params), Err(FormatError::Parse { .. })));
    }

    #[test]
    fn test_write_objects_uses_first_seen_columns() {
        let csv = write(
            r#"[{"name":"gizmo","quantity":123},{"name":"widget","color":"red","quantity":null}]"#,
            &Params::new(),
        )
        .unwrap();
        assert_eq!(csv, "name,quantity,color\ngizmo,123,\nwidget,,red\n");
    }

    #[test]
    fn test_write_with_explicit_headers_and_quoting() {
        let params = Params::new()
            .with(HEADERS, Value::from(vec![Value::from("b"), Value::from("a")]))
            .with(SEPARATOR, "|");
        let csv = write(r#"[{"a":"x|y","b":true}]"#, &params).unwrap();
        assert_eq!(csv, "b|a\ntrue|\"x|y\"\n");
    }

    #[test]
    fn test_write_arrays_without_header() {
        let csv = write(r#"[[1,"two",1.50],[null,false]]"#, &Params::new()).unwrap();
        assert_eq!(csv, "1,two,1.50\n,false\n");
    }

    #[test]
    fn test_write_rejects_non_tabular_values() {
        assert!(matches!(
            write(r#"{"a":1}"#, &Params::new()),
            Err(FormatError::Unsupported { .. })
        ));
        assert!(matches!(
            write(r#"[{"a":1},[1]]"#, &Params::new()),
            Err(FormatError::Unsupported { .. })
        ));
        assert!(matches!(
            write(r#"[{"a":{"nested":true}}]"#, &Params::new()),
            Err(FormatError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_non_ascii_separator_is_invalid() {
        let params = Params::new().with(SEPARATOR, "§");
        assert!(matches!(
            read("a\n", &params),
            Err(FormatError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let err = read("a,a\n1,2\n", &Params::new()).unwrap_err();
        match err {
            FormatError::Parse { message, .. } => assert!(message.contains("'a'")),
            other => panic!("expected Parse, got {other:?}"),
        }

        let params = Params::new()
            .with(USE_HEADER, false)
            .with(HEADERS, "left,right,left");
        assert!(matches!(
            read("1,2,3\n", &params),
            Err(FormatError::Parse { .. })
        ));
    }

    #[test]
    fn test_escape_character_roundtrip() {
        let params = Params::new().with(ESCAPE, "\\");
        let csv = write(r#"[{"id":"1","label":"say \"hi\""}]"#, &params).unwrap();
        assert_eq!(csv, "id,label\n1,\"say \\\"hi\\\"\"\n");

        let value = read(&csv, &params).unwrap();
        assert_eq!(
            value,
            from_json_str(r#"[{"id":"1","label":"say \"hi\""}]"#).unwrap()
        );
    }

    #[test]
    fn test_roundtrip_table() {
        let original = "id,label\n1,\"hello, world\"\n2,\"say \"\"hi\"\"\"\n";
        let value = read(original, &Params::new()).unwrap();
        let doc = CsvPlugin.write(&value, &Params::new(), &csv_media()).unwrap();
        assert_eq!(doc.as_text(), Some(original));
    }
}
