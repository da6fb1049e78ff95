//! Run configuration and the extract/recompress workflow.
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::info;

use crate::{
    codec,
    error::{Error, Result},
    mode::{Mode, choose_mode},
};

/// Array name used by the ESP32 camera web server sketch.
pub const DEFAULT_ARRAY_NAME: &str = "index_ov2640_html_gz";
/// Where the decompressed page is written.
pub const DEFAULT_HTML_OUT: &str = "extracted_index.html";
/// The edited page which, when present, is recompressed.
pub const DEFAULT_EDITED_HTML: &str = "modified_index.html";
/// Where the re-rendered C array is written.
pub const DEFAULT_ARRAY_OUT: &str = "new_camera_index_array.h";

/// A builder describing one extract (and optionally recompress) run.
///
/// # Example
/// ```no_run
/// let report = gzarray::Config::new("camera_index.h")
///     .array_name("index_ov3660_html_gz")
///     .run()
///     .expect("conversion failed");
/// println!("page written to {}", report.html_out.display());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    header: PathBuf,
    #[serde(default = "default_array_name")]
    array_name: String,
    #[serde(default = "default_html_out")]
    html_out: PathBuf,
    #[serde(default = "default_edited_html")]
    edited_html: PathBuf,
    #[serde(default = "default_array_out")]
    array_out: PathBuf,
    #[serde(default = "default_label")]
    label: String,
}

fn default_array_name() -> String {
    DEFAULT_ARRAY_NAME.to_owned()
}

fn default_html_out() -> PathBuf {
    DEFAULT_HTML_OUT.into()
}

fn default_edited_html() -> PathBuf {
    DEFAULT_EDITED_HTML.into()
}

fn default_array_out() -> PathBuf {
    DEFAULT_ARRAY_OUT.into()
}

fn default_label() -> String {
    codec::DEFAULT_FILE_LABEL.to_owned()
}

/// Outcome of [`Config::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub mode: Mode,
    /// The decompressed page.
    pub html_out: PathBuf,
    /// The rendered array, when the edited page was recompressed.
    pub array_out: Option<PathBuf>,
    /// Size in bytes of the compressed edited page.
    pub compressed_len: Option<usize>,
}

impl Config {
    /// Creates a configuration for the given header file with default settings.
    pub fn new(header: impl AsRef<Path>) -> Self {
        Self {
            header: header.as_ref().to_path_buf(),
            array_name: default_array_name(),
            html_out: default_html_out(),
            edited_html: default_edited_html(),
            array_out: default_array_out(),
            label: default_label(),
        }
    }

    /// Parses a TOML configuration. Only `header` is required.
    ///
    /// # Errors
    /// Returns the TOML error if the document is malformed or has unknown keys.
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// Relative paths, including the defaults, are taken relative to the directory
    /// holding the configuration file.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`] if it
    /// does not parse.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml_str(&source).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(match path.parent() {
            Some(base) => config.relative_to(base),
            None => config,
        })
    }

    fn relative_to(mut self, base: &Path) -> Self {
        for path in [
            &mut self.header,
            &mut self.html_out,
            &mut self.edited_html,
            &mut self.array_out,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Sets the header file to read.
    #[must_use]
    pub fn header(mut self, header: impl AsRef<Path>) -> Self {
        self.header = header.as_ref().to_path_buf();
        self
    }

    /// Sets the name of the array holding the compressed page.
    #[must_use]
    pub fn array_name(mut self, name: impl Into<String>) -> Self {
        self.array_name = name.into();
        self
    }

    /// Sets where the decompressed page is written.
    #[must_use]
    pub fn html_out(mut self, path: impl AsRef<Path>) -> Self {
        self.html_out = path.as_ref().to_path_buf();
        self
    }

    /// Sets the edited page whose presence triggers recompression.
    #[must_use]
    pub fn edited_html(mut self, path: impl AsRef<Path>) -> Self {
        self.edited_html = path.as_ref().to_path_buf();
        self
    }

    /// Sets where the re-rendered C array is written.
    #[must_use]
    pub fn array_out(mut self, path: impl AsRef<Path>) -> Self {
        self.array_out = path.as_ref().to_path_buf();
        self
    }

    /// Sets the file label placed in the `//File:` comment of the rendered array.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Extracts and decompresses the page, then recompresses the edited page if one exists.
    ///
    /// The rendered array is meant to be pasted back into the header by hand; the
    /// header itself is never modified.
    ///
    /// # Errors
    /// Returns an [`Error`] if the array is missing, the payload is not gzip-compressed
    /// UTF-8, or any file cannot be read or written.
    pub fn run(&self) -> Result<Report> {
        info!(header = %self.header.display(), array = %self.array_name, "extracting page");
        let document = read_text(&self.header)?;
        let compressed = codec::extract(&document, &self.array_name)?;
        let html = codec::decompress(&compressed)?;
        write_text(&self.html_out, &html)?;
        info!(path = %self.html_out.display(), bytes = html.len(), "decompressed page saved");

        let edited_exists = self
            .edited_html
            .try_exists()
            .map_err(|e| Error::io(&self.edited_html, e))?;

        let mode = choose_mode(edited_exists);
        let mut report = Report {
            mode,
            html_out: self.html_out.clone(),
            array_out: None,
            compressed_len: None,
        };

        match mode {
            Mode::ExtractOnly => {
                info!("to modify the page:");
                info!("  1. edit {}", self.html_out.display());
                info!("  2. save your changes as {}", self.edited_html.display());
                info!("  3. run again to recompress");
            }
            Mode::ExtractAndRecompress => {
                info!(path = %self.edited_html.display(), "found edited page, recompressing");
                let edited = read_text(&self.edited_html)?;
                let recompressed = codec::compress(&edited);
                let array =
                    codec::render_with_label(&recompressed, &self.array_name, &self.label);
                write_text(&self.array_out, &array)?;
                info!(
                    path = %self.array_out.display(),
                    bytes = recompressed.len(),
                    "new C array saved, copy it back into {}",
                    self.header.display()
                );
                report.array_out = Some(self.array_out.clone());
                report.compressed_len = Some(recompressed.len());
            }
        }

        Ok(report)
    }
}

pub(crate) fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| Error::io(path, e))
}
