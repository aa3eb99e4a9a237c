//! Snowflake SQL API v2 wire types.

use std::collections::BTreeMap;

use metricdeck_domain::Row;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Body of `POST /api/v2/statements`.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRequest<'a> {
    pub statement: &'a str,
    pub timeout: u64,
    pub database: &'a str,
    pub schema: &'a str,
    pub warehouse: &'a str,
    pub role: &'a str,
    pub parameters: BTreeMap<&'static str, &'a str>,
}

/// Successful (or still running) statement response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub statement_handle: Option<String>,
    #[serde(default)]
    pub result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    pub data: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetMetaData {
    #[serde(default)]
    pub num_rows: u64,
    #[serde(default)]
    pub row_type: Vec<ColumnType>,
    #[serde(default)]
    pub partition_info: Vec<PartitionInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnType {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub scale: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionInfo {
    #[serde(default)]
    pub row_count: u64,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sql_state: Option<String>,
}

/// Convert one partition of string cells into JSON rows.
pub fn decode_rows(columns: &[ColumnType], data: Vec<Vec<Option<String>>>) -> Vec<Row> {
    data.into_iter()
        .map(|cells| {
            columns
                .iter()
                .zip(cells)
                .map(|(column, cell)| (column.name.clone(), decode_cell(column, cell)))
                .collect()
        })
        .collect()
}

/// `fixed`/`real` become numbers, `boolean` a bool, anything else stays text.
fn decode_cell(column: &ColumnType, cell: Option<String>) -> Value {
    let Some(raw) = cell else {
        return Value::Null;
    };

    match column.kind.to_ascii_lowercase().as_str() {
        "fixed" if column.scale.unwrap_or(0) == 0 => match raw.parse::<i64>() {
            Ok(integer) => Value::from(integer),
            Err(_) => parse_float(&raw).unwrap_or(Value::String(raw)),
        },
        "fixed" | "real" => parse_float(&raw).unwrap_or(Value::String(raw)),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(raw),
        },
        _ => Value::String(raw),
    }
}

fn parse_float(raw: &str) -> Option<Value> {
    raw.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}
