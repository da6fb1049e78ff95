//! Minify a page before it is compressed back into the header.
//!
//! This module uses [`minify_html`] under the hood.
use std::path::{Path, PathBuf};

use minify_html::{Cfg, minify};
use tracing::{info, instrument};

use crate::{
    config::{read_text, write_text},
    error::Result,
};

/// Minifies markup and inline `<style>` contents, dropping comments.
///
/// Inline `<script>` bodies are left untouched: the JS minifier rewrites function
/// declarations into arrow functions, which rebinds `this` in event handlers.
///
/// # Errors
/// Returns [`Error::Decode`](crate::Error::Decode) if the minifier produces invalid UTF-8.
#[instrument(level = "trace", skip(html), fields(len = html.len()))]
pub fn minify_html(html: &str) -> Result<String> {
    let cfg = Cfg {
        minify_css: true,
        minify_js: false,
        keep_comments: false,
        ..Cfg::default()
    };
    Ok(String::from_utf8(minify(html.as_bytes(), &cfg))?)
}

/// Default output path for `input`: `index.html` becomes `index-min.html` beside it.
#[must_use]
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "index".into(), |s| s.to_string_lossy());
    let ext = input
        .extension()
        .map_or_else(|| "html".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}-min.{ext}"))
}

/// Minifies the page at `input` and writes it to `output`, returning the minified size.
///
/// # Errors
/// Returns [`Error::Io`](crate::Error::Io) if either file cannot be accessed.
pub fn minify_file(input: &Path, output: &Path) -> Result<usize> {
    let html = read_text(input)?;
    let minified = minify_html(&html)?;
    write_text(output, &minified)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        before = html.len(),
        after = minified.len(),
        "minified page"
    );
    Ok(minified.len())
}
