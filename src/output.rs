//! Picks the output format from the output file's extension, and writes the
//! `Chart` in that format.
use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::Chart;

/// The file formats we can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// A standalone SVG document
    Svg,
    /// A PNG bitmap
    Png,
    /// An HTML page with the SVG document inline
    Html,
}

impl Format {
    /// The format implied by `path`'s extension. A path with no extension, or
    /// an empty one (`plot.`), gets SVG.
    pub fn for_path(path: &Path) -> Result<Format> {
        let Some(extension) = path.extension().filter(|extension| !extension.is_empty()) else {
            return Ok(Format::Svg);
        };
        match extension.to_str().map(str::to_ascii_lowercase).as_deref() {
            Some("svg") => Ok(Format::Svg),
            Some("png") => Ok(Format::Png),
            Some("html" | "htm") => Ok(Format::Html),
            _ => bail!(
                "Can't write {} files (for {}): the output file name must end in .svg, .png, .html, or .htm",
                extension.to_string_lossy(),
                path.display()
            ),
        }
    }
}

/// Returns the output path from the command line's positional arguments:
/// the first of them, if there are any.
pub fn path_from(outputs: &[PathBuf]) -> Result<&Path> {
    match outputs {
        [] => bail!("no output file name was given"),
        [only] => Ok(only.as_path()),
        [first, rest @ ..] => {
            let ignored: Vec<_> = rest.iter().map(|p| p.display().to_string()).collect();
            warn!("Writing only to {}, ignoring {}", first.display(), ignored.join(", "));
            Ok(first.as_path())
        }
    }
}

/// Writes `chart` to `path`, in the format `path`'s extension calls for
pub fn save(chart: &Chart, path: &Path) -> Result<()> {
    let format = Format::for_path(path)?;
    info!("Writing {format:?} to {}", path.display());
    let contents = match format {
        Format::Png => {
            return chart.write_png(path).with_context(|| format!("Can't write file: {}", path.display()));
        }
        Format::Svg => chart.to_svg()?,
        Format::Html => html_page(&chart.title, &chart.to_svg()?),
    };
    fs::write(path, contents).with_context(|| format!("Can't write file: {}", path.display()))
}

fn html_page(title: &str, svg: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{svg}</body>\n</html>\n",
        escape(title)
    )
}

/// Escapes `text` for use as HTML character data. Control characters become
/// U+FFFD.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    fn needs_escape(c: char) -> bool {
        matches!(c, '&' | '<' | '>' | '"' | '\'') || c.is_control()
    }
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if c.is_control() => escaped.push('\u{FFFD}'),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
