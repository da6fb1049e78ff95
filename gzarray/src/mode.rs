/// What a run does after extracting the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write the decompressed page only.
    ExtractOnly,
    /// Also recompress the edited page and render it as a C array.
    ExtractAndRecompress,
}

/// Picks the run mode from whether an edited page is present.
#[must_use]
pub const fn choose_mode(edited_file_exists: bool) -> Mode {
    if edited_file_exists {
        Mode::ExtractAndRecompress
    } else {
        Mode::ExtractOnly
    }
}
