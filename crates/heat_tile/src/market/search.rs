use super::board::MarketTile;

/// Tiles whose ticker or name contains `query`, ignoring case.
///
/// A blank query matches nothing.
pub fn search_tiles<'a>(tiles: &'a [MarketTile], query: &str) -> Vec<&'a MarketTile> {
    let query = query.trim().to_uppercase();
    if query.is_empty() {
        return Vec::new();
    }

    tiles
        .iter()
        .filter(|tile| {
            tile.secid.to_uppercase().contains(&query) || tile.name.to_uppercase().contains(&query)
        })
        .collect()
}
