//! Edit gzip-compressed web pages embedded in C headers as byte arrays.
//!
//! Firmware such as the ESP32 camera web server ships its web UI as a gzip-compressed
//! HTML page stored in a header file:
//!
//! ```c
//! //File: index_ov2640.html.gz, Size: 6787
//! #define index_ov2640_html_gz_len 6787
//! const unsigned char index_ov2640_html_gz[] = {
//!   0x1F, 0x8B, 0x08, 0x00, ...
//! };
//! ```
//!
//! This crate converts between that form and the plain page.
//!
//! ## How It Works
//!
//! 1.  **Extract:** [`extract`] finds the named declaration and decodes its `0xHH`
//!     literals into bytes, which [`decompress`] turns into the page text.
//! 2.  **Recompress:** [`compress`] gzips an edited page and [`render`] writes the bytes
//!     back out as a declaration with a size comment and a `_len` macro.
//! 3.  **Workflow:** [`Config::run`] does both in one go. The page is always extracted;
//!     if an edited copy is present it is also recompressed (see [`choose_mode`]).
//!
//! ## Usage
//!
//! ```no_run
//! let report = gzarray::Config::new("camera_index.h")
//!     .html_out("index.html")
//!     .edited_html("index-edited.html")
//!     .run()
//!     .expect("conversion failed");
//!
//! if let Some(array) = report.array_out {
//!     println!("paste {} back into camera_index.h", array.display());
//! }
//! ```
//!
//! The codec functions can also be used directly:
//!
//! ```
//! let bytes = gzarray::compress("<p>hi</p>");
//! let header = gzarray::render(&bytes, "page_gz");
//! let page = gzarray::decompress(&gzarray::extract(&header, "page_gz")?)?;
//! assert_eq!(page, "<p>hi</p>");
//! # Ok::<(), gzarray::Error>(())
//! ```

pub mod codec;
mod config;
mod error;
mod mode;

#[cfg(feature = "minify")]
pub mod minify;

pub use codec::{compress, decompress, extract, render, render_with_label};
pub use config::{
    Config, DEFAULT_ARRAY_NAME, DEFAULT_ARRAY_OUT, DEFAULT_EDITED_HTML, DEFAULT_HTML_OUT, Report,
};
pub use error::{Error, Result};
pub use mode::{Mode, choose_mode};
