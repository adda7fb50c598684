mod binding;
mod legend;
mod market;
mod shade;

pub use binding::{
    host::{bind_tiles, BindReport, TileHost},
    html::{paint_html, HtmlPage},
    parse::parse_change,
};
pub use legend::{render_legend, save_legend};
pub use market::{
    board::{compute_tiles, render_board, MarketTile},
    quote::{parse_iss_board, parse_quotes, parse_rows, QuoteRow},
    search::search_tiles,
};
pub use shade::{
    clamp::clamp,
    color::Hsl,
    gradient::{gradient_for_change, GradientDescriptor},
    scale::HeatScale,
};

#[derive(Debug, thiserror::Error)]
pub enum HeatTileError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to parse heat scale: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid heat scale: {0}")]
    InvalidScale(String),
    #[error("failed to parse quote rows: {0}")]
    Json(#[from] serde_json::Error),
    #[error("legend dimensions must be non-zero")]
    InvalidLegend,
}
