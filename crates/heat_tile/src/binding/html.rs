use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use super::host::{bind_tiles, BindReport, TileHost};
use crate::shade::scale::HeatScale;
use crate::HeatTileError;

const TILE_CLASS: &str = "tile";
const CHANGE_ATTR: &str = "data-change";
const STYLE_ATTR: &str = "style";

/// Parsed HTML document whose `.tile` elements can be painted.
pub struct HtmlPage {
    dom: RcDom,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        Self { dom }
    }

    pub fn to_html(&self) -> Result<String, HeatTileError> {
        let document: SerializableHandle = self.dom.document.clone().into();
        let mut out = Vec::new();
        serialize(&mut out, &document, SerializeOpts::default())?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl TileHost for HtmlPage {
    type Tile = Handle;

    fn tiles(&self) -> Vec<Handle> {
        let mut tiles = Vec::new();
        collect_tiles(&self.dom.document, &mut tiles);
        tiles
    }

    fn change_of(&self, tile: &Handle) -> Option<String> {
        attribute(tile, CHANGE_ATTR)
    }

    fn paint(&mut self, tile: &Handle, background: &str) {
        let NodeData::Element { ref attrs, .. } = tile.data else {
            return;
        };

        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|attr| &*attr.name.local == STYLE_ATTR) {
            Some(style) => {
                let merged = merge_background(&style.value, background);
                style.value = StrTendril::from(merged);
            },
            None => attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(STYLE_ATTR)),
                value: StrTendril::from(merge_background("", background)),
            }),
        }
    }
}

/// Paint every tile of an HTML document and return the rewritten markup.
pub fn paint_html(html: &str, scale: &HeatScale) -> Result<(String, BindReport), HeatTileError> {
    let mut page = HtmlPage::parse(html);
    let report = bind_tiles(&mut page, scale);
    Ok((page.to_html()?, report))
}

fn collect_tiles(node: &Handle, tiles: &mut Vec<Handle>) {
    if let Some(class) = attribute(node, "class") {
        if class.split_ascii_whitespace().any(|token| token == TILE_CLASS) {
            tiles.push(node.clone());
        }
    }

    for child in node.children.borrow().iter() {
        collect_tiles(child, tiles);
    }
}

fn attribute(node: &Handle, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Replace the background declarations of an inline style, keeping everything else.
fn merge_background(style: &str, background: &str) -> String {
    let painted = format!("background: {background}");
    let mut declarations: Vec<&str> = split_declarations(style)
        .into_iter()
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| {
            let property = declaration.split(':').next().unwrap_or_default().trim();
            let property = property.to_ascii_lowercase();
            property != "background" && !property.starts_with("background-")
        })
        .collect();
    declarations.push(&painted);
    declarations.join("; ")
}

/// Split an inline style on top-level `;`, leaving quoted strings and parentheses intact.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut declarations = Vec::new();
    let mut quote = None;
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in style.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => (),
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                declarations.push(&style[start..index]);
                start = index + 1;
            },
            _ => (),
        }
    }

    declarations.push(&style[start..]);
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"<!DOCTYPE html>
<html><head><title>Board</title></head><body>
<div class="board">
  <div class="tile" data-change="3.5">GAZP</div>
  <div class="tile up" data-change="-8" style="color: white; background-color: red">SBER</div>
  <div class="tile" data-change="—">LKOH</div>
  <div class="tile">YNDX</div>
  <div class="tiles" data-change="2">not a tile</div>
</div>
</body></html>"#;

    #[test]
    fn finds_tiles_by_class_token() {
        let page = HtmlPage::parse(BOARD);
        let changes: Vec<_> = page.tiles().iter().map(|tile| page.change_of(tile)).collect();
        assert_eq!(changes, vec![
            Some("3.5".to_owned()),
            Some("-8".to_owned()),
            Some("—".to_owned()),
            None,
        ]);
    }

    #[test]
    fn paints_tiles_in_place() {
        let (html, report) = paint_html(BOARD, &HeatScale::default()).unwrap();

        assert_eq!(report, BindReport { painted: 2, skipped: 2 });
        assert!(html.contains(
            r#"data-change="3.5" style="background: linear-gradient(180deg, hsl(140 70% 40.75%) 0%, hsl(140 70% 32.75%) 100%)""#
        ));
        assert!(html.contains(
            r#"style="color: white; background: linear-gradient(180deg, hsl(0 70% 16%) 0%, hsl(0 70% 8%) 100%)""#
        ));
        assert!(html.contains(r#"<div class="tile" data-change="—">LKOH</div>"#));
        assert!(html.contains(r#"<div class="tile">YNDX</div>"#));
        assert!(html.contains(r#"<div class="tiles" data-change="2">not a tile</div>"#));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn repainting_is_idempotent() {
        let scale = HeatScale::default();
        let (once, _) = paint_html(BOARD, &scale).unwrap();
        let (twice, _) = paint_html(&once, &scale).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn document_without_tiles() {
        let (_, report) = paint_html("<p>nothing here</p>", &HeatScale::default()).unwrap();
        assert_eq!(report, BindReport::default());
    }

    #[test]
    fn merges_inline_style() {
        assert_eq!(merge_background("", "red"), "background: red");
        assert_eq!(
            merge_background("color: white; Background-Image: url(x.png);", "red"),
            "color: white; background: red"
        );
        assert_eq!(merge_background("background: blue", "red"), "background: red");
    }

    #[test]
    fn keeps_semicolons_inside_values() {
        assert_eq!(
            merge_background(
                r#"font-family: "a;b"; background-image: url("a;b.png"); mask: url(m;x.svg)"#,
                "red"
            ),
            r#"font-family: "a;b"; mask: url(m;x.svg); background: red"#
        );
        assert_eq!(split_declarations(r"content: '\';'; color: red"), vec![
            r"content: '\';'",
            " color: red",
        ]);
    }
}
