//! Standalone HTML page mirroring the dashboard.
//!
//! Only written when explicitly requested (`fp predict --html <path>`). The
//! background image is optional: when the file is missing we log a warning and
//! render a plain page.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::AppError;

/// Everything the page shows.
#[derive(Debug, Clone)]
pub struct HtmlPage<'a> {
    pub title: &'a str,
    pub message: &'a str,
    /// Non-blocking notices (unknown categories, missing history).
    pub notices: &'a [String],
    /// Inline SVG chart, if history was available.
    pub chart_svg: Option<&'a str>,
    /// `data:` URL for the background image.
    pub background: Option<String>,
}

/// Read the background image as a `data:` URL; `None` (with a warning) if absent.
pub fn load_background(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Background image not found. Running without background.");
            return None;
        }
    };
    Some(format!(
        "data:{};base64,{}",
        image_mime(path),
        STANDARD.encode(bytes)
    ))
}

fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Render the page to a string.
pub fn render_html(page: &HtmlPage<'_>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(page.title)));
    out.push_str("<style>\n");
    out.push_str("body { font-family: sans-serif; color: black; margin: 2rem; }\n");
    if let Some(bg) = &page.background {
        out.push_str(&format!(
            "body {{ background-image: url(\"{bg}\"); background-size: cover; background-position: center; background-repeat: no-repeat; }}\n"
        ));
    }
    out.push_str(".prediction { font-size: 22px; font-weight: bold; }\n");
    out.push_str(".notice { color: #8a6d00; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    out.push_str(&format!("<h1>{}</h1>\n", escape(page.title)));
    out.push_str(&format!("<p class=\"prediction\">{}</p>\n", escape(page.message)));
    for notice in page.notices {
        out.push_str(&format!("<p class=\"notice\">{}</p>\n", escape(notice)));
    }

    out.push_str("<h3>Historical Price Trend</h3>\n");
    match page.chart_svg {
        Some(svg) => {
            out.push_str(svg);
            out.push('\n');
        }
        None => out.push_str("<p class=\"notice\">No historical data available for selected filters.</p>\n"),
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Write the page to `path`.
pub fn write_html(path: &Path, page: &HtmlPage<'_>) -> Result<(), AppError> {
    fs::write(path, render_html(page))
        .map_err(|e| AppError::new(4, format!("Failed to write HTML page '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), "wrote HTML page");
    Ok(())
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
