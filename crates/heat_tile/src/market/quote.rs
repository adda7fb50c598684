use std::collections::HashMap;

use log::debug;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::HeatTileError;

/// One merged securities/marketdata row as published by the exchange.
///
/// Numeric columns accept numbers, numeric strings or null. Anything unreadable becomes NaN.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct QuoteRow {
    #[serde(default)]
    pub secid: Option<String>,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub last: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prevprice: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prevsettleprice: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub valtoday: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub voltoday: Option<f64>,
}

/// Parse a JSON array of quote rows.
pub fn parse_rows(json: &str) -> Result<Vec<QuoteRow>, HeatTileError> {
    Ok(serde_json::from_str(json)?)
}

/// Column-oriented table as served by the exchange's ISS API.
#[derive(Clone, Debug, Default, Deserialize)]
struct IssBlock {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

impl IssBlock {
    fn records(self) -> Vec<Map<String, Value>> {
        let columns = self.columns;
        self.data
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct IssBoard {
    securities: IssBlock,
    #[serde(default)]
    marketdata: IssBlock,
}

/// Parse a board `securities.json` payload, overlaying each security with its marketdata row.
///
/// Securities without marketdata are kept with their reference columns only.
pub fn parse_iss_board(json: &str) -> Result<Vec<QuoteRow>, HeatTileError> {
    let board: IssBoard = serde_json::from_str(json)?;

    let marketdata: HashMap<String, Map<String, Value>> = board
        .marketdata
        .records()
        .into_iter()
        .filter_map(|record| Some((record.get("SECID")?.to_string(), record)))
        .collect();

    let mut rows = Vec::new();
    for mut security in board.securities.records() {
        let overlay = security.get("SECID").and_then(|secid| marketdata.get(&secid.to_string()));
        if let Some(overlay) = overlay {
            security.extend(overlay.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        rows.push(serde_json::from_value(Value::Object(security))?);
    }

    debug!("merged {} securities with {} marketdata rows", rows.len(), marketdata.len());
    Ok(rows)
}

/// Parse either a JSON array of merged rows or an ISS board payload.
pub fn parse_quotes(json: &str) -> Result<Vec<QuoteRow>, HeatTileError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(object) if object.contains_key("securities") => parse_iss_board(json),
        _ => parse_rows(json),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<RawNumber>::deserialize(deserializer)? {
        None => None,
        Some(RawNumber::Number(value)) => Some(value),
        Some(RawNumber::Text(text)) => Some(text.trim().parse().unwrap_or(f64::NAN)),
        Some(RawNumber::Other(_)) => Some(f64::NAN),
    };
    Ok(value)
}
