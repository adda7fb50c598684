use log::{debug, trace};

use super::parse::parse_change;
use crate::shade::scale::HeatScale;

/// Document holding heat-map tiles.
pub trait TileHost {
    type Tile;

    /// Every tile in document order.
    fn tiles(&self) -> Vec<Self::Tile>;

    /// Raw change attribute of `tile`, if present.
    fn change_of(&self, tile: &Self::Tile) -> Option<String>;

    fn paint(&mut self, tile: &Self::Tile, background: &str);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindReport {
    pub painted: usize,
    /// Tiles left untouched because they carry no usable change.
    pub skipped: usize,
}

/// Paint every tile of `host` with the gradient for its change.
///
/// Tiles whose change is missing or not a finite number are left as they are.
pub fn bind_tiles<H: TileHost>(host: &mut H, scale: &HeatScale) -> BindReport {
    let mut report = BindReport::default();

    for tile in host.tiles() {
        let change = host.change_of(&tile);
        let Some(value) = change.as_deref().and_then(parse_change) else {
            trace!("skipping tile without usable change: {change:?}");
            report.skipped += 1;
            continue;
        };

        let gradient = scale.gradient_for_change(value);
        host.paint(&tile, &gradient.to_string());
        report.painted += 1;
    }

    debug!("painted {} tiles, skipped {}", report.painted, report.skipped);
    report
}
