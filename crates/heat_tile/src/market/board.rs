use log::warn;
use serde::Serialize;

use super::quote::QuoteRow;

const NAME_LIMIT: usize = 18;

/// Display model of one security on the heat-map board.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketTile {
    pub secid: String,
    pub name: String,
    pub last: Option<f64>,
    /// Previous close, or the previous settlement price when there is none.
    pub base_price: Option<f64>,
    /// Change against `base_price` in percent.
    pub change: Option<f64>,
    pub valtoday: Option<f64>,
}

pub fn compute_tiles(rows: &[QuoteRow]) -> Vec<MarketTile> {
    rows.iter().map(compute_tile).collect()
}

fn compute_tile(row: &QuoteRow) -> MarketTile {
    let secid = row.secid.clone().unwrap_or_default();
    if secid.is_empty() {
        warn!("quote row without SECID: {row:?}");
    }

    let name = row
        .shortname
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(secid.as_str())
        .chars()
        .take(NAME_LIMIT)
        .collect();

    let last = row.last.filter(|last| !last.is_nan());
    let base_price = row.prevprice.filter(|price| !price.is_nan()).or(row.prevsettleprice);
    let base_price = base_price.filter(|price| !price.is_nan());

    let change = match (last, base_price) {
        (Some(last), Some(base)) if usable(last) && usable(base) => {
            Some((last - base) / base * 100.0)
        },
        _ => None,
    };

    let valtoday = row.valtoday.filter(|value| usable(*value)).or(row.voltoday);

    MarketTile { secid, name, last, base_price, change, valtoday }
}

/// Finite and non-zero.
fn usable(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// Render the board as a standalone HTML document of unpainted tiles.
pub fn render_board(title: &str, tiles: &[MarketTile]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str("</head>\n<body>\n<div class=\"board\">\n");

    for tile in tiles {
        let (attr, label) = match tile.change {
            Some(change) => (change.to_string(), format!("{change:+.2}%")),
            None => ("—".to_owned(), "—".to_owned()),
        };
        html.push_str(&format!(
            "<div class=\"tile\" data-change=\"{}\" title=\"{}\">\
             <span class=\"tile-name\">{}</span>\
             <span class=\"tile-change\">{}</span></div>\n",
            escape(&attr),
            escape(&tile.secid),
            escape(&tile.name),
            label,
        ));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
