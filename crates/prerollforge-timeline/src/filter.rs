//! Filter-graph text for overlays, with escaping for user-supplied strings.
//!
//! ffmpeg parses a `-filter_complex` argument twice: once at graph level
//! (splitting filters on `,;[]`) and once per filter option (splitting on
//! `:` and `=`). Both levels treat `'` as a quote and `\` as an escape, so
//! text is first escaped for the option level and then quoted for the graph
//! level.

use crate::params::format_number;
use crate::segment::{OverlayPlacement, TextOverlay};

/// Escape a value for the filter-option level: `\`, `'` and `:` get a
/// backslash.
pub fn escape_option_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Quote a value for the graph level: wrap in `'...'`, writing each embedded
/// `'` as `'\''`.
pub fn quote_graph_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Escape free text for a drawtext `text=` option inside a filter graph.
///
/// ```
/// use prerollforge_timeline::filter::escape_drawtext;
///
/// assert_eq!(escape_drawtext("O'Brien"), r"'O\'\''Brien'");
/// ```
pub fn escape_drawtext(text: &str) -> String {
    quote_graph_value(&escape_option_value(text))
}

/// Render one horizontally centred drawtext filter in white.
///
/// Without a font file ffmpeg falls back to its fontconfig default.
pub fn drawtext(font_file: Option<&str>, overlay: &TextOverlay) -> String {
    let y = match overlay.placement {
        OverlayPlacement::Centered => "(h-text_h)/2".to_string(),
        OverlayPlacement::BelowCenter { offset } => {
            format!("(h-text_h)/2+{}", format_number(offset))
        }
    };
    let font = font_file
        .map(|f| format!("fontfile={}:", escape_drawtext(f)))
        .unwrap_or_default();
    format!(
        "drawtext={}expansion=none:text={}:fontcolor=white:fontsize={}:x=(w-text_w)/2:y={}",
        font,
        escape_drawtext(&overlay.text),
        format_number(overlay.font_size),
        quote_graph_value(&y),
    )
}

/// Render a comma-separated chain of drawtext filters, or `null` when there
/// are no overlays.
pub fn overlay_chain(font_file: Option<&str>, overlays: &[TextOverlay]) -> String {
    if overlays.is_empty() {
        return "null".to_string();
    }
    overlays
        .iter()
        .map(|o| drawtext(font_file, o))
        .collect::<Vec<_>>()
        .join(",")
}
