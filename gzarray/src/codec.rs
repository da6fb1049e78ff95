//! Conversion between C byte-array declarations and gzip-compressed text.
//!
//! The only declaration shape recognized is
//!
//! ```c
//! const unsigned char NAME[] = { 0x1F, 0x8B, ... };
//! ```
//!
//! with any amount of whitespace between tokens. Declarations with an explicit
//! size, other element types or decimal literals are not matched.
use std::{
    fmt::Write as _,
    io::{self, Read, Write},
    sync::LazyLock,
};

use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use regex::Regex;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Label written into the `//File:` comment when none is given.
pub const DEFAULT_FILE_LABEL: &str = "index_ov2640.html.gz";

/// Number of byte literals on each line of a rendered array.
pub const BYTES_PER_LINE: usize = 16;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"const\s+unsigned\s+char\s+([A-Za-z_][A-Za-z0-9_]*)\s*\[\s*\]\s*=\s*\{([^}]*)\}\s*;",
    )
    .expect("BUG: gzarray: declaration pattern is invalid")
});

static HEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"0x([0-9A-Fa-f]{2})").expect("BUG: gzarray: hex literal pattern is invalid")
});

/// Finds the first declaration of `array_name` in `document` and decodes its hex literals.
///
/// # Errors
/// Returns [`Error::NotFound`] if no declaration of that name exists.
#[instrument(level = "trace", skip(document), fields(document_len = document.len()))]
pub fn extract(document: &str, array_name: &str) -> Result<Vec<u8>> {
    let body = DECLARATION
        .captures_iter(document)
        .find(|caps| &caps[1] == array_name)
        .and_then(|caps| caps.get(2))
        .ok_or_else(|| Error::NotFound {
            name: array_name.to_owned(),
        })?;

    let bytes: Vec<u8> = HEX_LITERAL
        .captures_iter(body.as_str())
        .map(|caps| {
            // The pattern only admits two hex digits.
            u8::from_str_radix(&caps[1], 16).expect("BUG: gzarray: hex literal out of range")
        })
        .collect();

    debug!(array_name, len = bytes.len(), "extracted byte array");
    Ok(bytes)
}

/// Decompresses a gzip stream and decodes the payload as UTF-8.
///
/// Concatenated gzip members decode to the concatenation of their payloads. Zero
/// padding after a member is skipped, and an empty input decodes to an empty string.
///
/// # Errors
/// Returns [`Error::Format`] if `bytes` is not a gzip stream and [`Error::Decode`]
/// if the payload is not valid UTF-8.
#[instrument(level = "trace", skip(bytes), fields(len = bytes.len()))]
pub fn decompress(bytes: &[u8]) -> Result<String> {
    let mut payload = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        if !rest.starts_with(&GZIP_MAGIC) {
            return Err(Error::Format(io::Error::new(
                io::ErrorKind::InvalidData,
                "missing gzip magic bytes",
            )));
        }

        let mut member = GzDecoder::new(rest);
        member.read_to_end(&mut payload).map_err(Error::Format)?;
        rest = member.into_inner();

        let padding = rest.iter().take_while(|&&b| b == 0).count();
        rest = &rest[padding..];
    }

    debug!(compressed = bytes.len(), decompressed = payload.len(), "decompressed");
    Ok(String::from_utf8(payload)?)
}

/// Gzip-compresses the UTF-8 encoding of `text` at the best compression level.
#[must_use]
#[instrument(level = "trace", skip(text), fields(len = text.len()))]
pub fn compress(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(text.as_bytes())
        .expect("BUG: gzarray: writing to an in-memory buffer failed");
    encoder
        .finish()
        .expect("BUG: gzarray: writing to an in-memory buffer failed")
}

/// Renders `bytes` as a C array declaration labelled with [`DEFAULT_FILE_LABEL`].
#[must_use]
pub fn render(bytes: &[u8], array_name: &str) -> String {
    render_with_label(bytes, array_name, DEFAULT_FILE_LABEL)
}

/// Renders `bytes` as a C array declaration.
///
/// The output has a `//File: <label>, Size: N` comment, a `#define <name>_len N`
/// macro and the declaration itself, with [`BYTES_PER_LINE`] uppercase `0xHH`
/// literals per line. Feeding the output back through [`extract`] with the same
/// name yields `bytes` again.
#[must_use]
pub fn render_with_label(bytes: &[u8], array_name: &str, label: &str) -> String {
    let len = bytes.len();
    let body = bytes
        .chunks(BYTES_PER_LINE)
        .map(|chunk| {
            let mut line = String::from("  ");
            for (i, byte) in chunk.iter().enumerate() {
                if i > 0 {
                    line.push_str(", ");
                }
                write!(line, "0x{byte:02X}").expect("BUG: gzarray: writing to a String failed");
            }
            line
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "//File: {label}, Size: {len}\n\
         #define {array_name}_len {len}\n\
         const unsigned char {array_name}[] = {{\n\
         {body}\n\
         }};"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `gzip -n` of "hi".
    const HI_GZ: [u8; 22] = [
        0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xcb, 0xc8, 0x04, 0x00, 0xac,
        0x2a, 0x93, 0xd8, 0x02, 0x00, 0x00, 0x00,
    ];

    fn hi_header() -> String {
        let list = HI_GZ
            .iter()
            .map(|b| format!("0x{b:02x}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("#pragma once\n\nconst unsigned char foo[] = {{{list}}};\n")
    }

    #[test]
    fn extracts_and_decompresses_hi() {
        let bytes = extract(&hi_header(), "foo").unwrap();
        assert_eq!(bytes, HI_GZ);
        assert_eq!(decompress(&bytes).unwrap(), "hi");
    }

    #[test]
    fn missing_name_is_not_found() {
        let err = extract(&hi_header(), "bar").unwrap_err();
        assert!(matches!(err, Error::NotFound { ref name } if name == "bar"));
    }

    #[test]
    fn name_must_match_whole_identifier() {
        let doc = "const unsigned char foo_gz[] = { 0x01 };";
        assert!(matches!(extract(doc, "foo"), Err(Error::NotFound { .. })));
        assert_eq!(extract(doc, "foo_gz").unwrap(), [0x01]);
    }

    #[test]
    fn first_declaration_wins() {
        let doc = "const unsigned char a[] = { 0x01 };\n\
                   const unsigned char b[] = { 0x02 };\n\
                   const unsigned char a[] = { 0x03 };";
        assert_eq!(extract(doc, "a").unwrap(), [0x01]);
        assert_eq!(extract(doc, "b").unwrap(), [0x02]);
    }

    #[test]
    fn sized_declarations_are_not_recognized() {
        let doc = "const unsigned char foo[2] = { 0x01, 0x02 };";
        assert!(matches!(extract(doc, "foo"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn extract_spans_lines_and_mixed_case() {
        let doc = "const unsigned char   page []=\n{\n  0xAb, 0xcD,\n  0x0f\n}\n;";
        assert_eq!(extract(doc, "page").unwrap(), [0xab, 0xcd, 0x0f]);
    }

    #[test]
    fn all_zero_buffer_is_format_error() {
        assert!(matches!(decompress(&[0u8; 32]), Err(Error::Format(_))));
    }

    #[test]
    fn empty_input_decodes_to_empty_text() {
        assert_eq!(decompress(&[]).unwrap(), "");
    }

    #[test]
    fn zero_padding_after_member_is_skipped() {
        let mut gz = HI_GZ.to_vec();
        gz.extend([0u8; 4]);
        assert_eq!(decompress(&gz).unwrap(), "hi");

        let mut gz = compress("<p>");
        gz.extend([0u8; 3]);
        gz.extend(compress("</p>"));
        gz.extend([0u8; 1]);
        assert_eq!(decompress(&gz).unwrap(), "<p></p>");
    }

    #[test]
    fn garbage_after_member_is_format_error() {
        let mut gz = HI_GZ.to_vec();
        gz.extend([0x00, 0x42]);
        assert!(matches!(decompress(&gz), Err(Error::Format(_))));
    }

    #[test]
    fn truncated_stream_is_format_error() {
        assert!(matches!(decompress(&HI_GZ[..18]), Err(Error::Format(_))));
    }

    #[test]
    fn invalid_utf8_payload_is_decode_error() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        let gz = encoder.finish().unwrap();
        assert!(matches!(decompress(&gz), Err(Error::Decode(_))));
    }

    #[test]
    fn concatenated_members_decode_in_order() {
        let mut gz = compress("<p>");
        gz.extend(compress("</p>"));
        assert_eq!(decompress(&gz).unwrap(), "<p></p>");
    }

    #[test]
    fn render_twenty_zero_bytes() {
        let out = render(&[0u8; 20], "x");
        let expected = "//File: index_ov2640.html.gz, Size: 20\n\
             #define x_len 20\n\
             const unsigned char x[] = {\n  \
             0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,\n  \
             0x00, 0x00, 0x00, 0x00\n\
             };";
        assert_eq!(out, expected);
    }

    #[test]
    fn render_uses_label_and_uppercase_hex() {
        let out = render_with_label(&[0x0a, 0xff], "page_gz", "page.html.gz");
        assert!(out.starts_with("//File: page.html.gz, Size: 2\n#define page_gz_len 2\n"));
        assert!(out.contains("  0x0A, 0xFF\n};"));
    }

    #[test]
    fn render_empty_round_trips() {
        let out = render(&[], "empty");
        assert!(out.contains("#define empty_len 0"));
        assert_eq!(extract(&out, "empty").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn full_pipeline_reproduces_text() {
        let html = "<!doctype html>\n<title>Caméra</title>\n<p>ok</p>\n";
        let header = render(&compress(html), "index_ov2640_html_gz");
        let original = decompress(&extract(&header, "index_ov2640_html_gz").unwrap()).unwrap();
        assert_eq!(original, html);

        let edited = original.clone();
        let rerendered = render(&compress(&edited), "index_ov2640_html_gz");
        let bytes = extract(&rerendered, "index_ov2640_html_gz").unwrap();
        assert_eq!(decompress(&bytes).unwrap(), original);
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            #[test]
            fn render_then_extract_is_identity(
                bytes in proptest::collection::vec(any::<u8>(), 0..600),
                name in "[A-Za-z_][A-Za-z0-9_]{0,20}",
            ) {
                prop_assert_eq!(extract(&render(&bytes, &name), &name).unwrap(), bytes);
            }

            #[test]
            fn compress_then_decompress_is_identity(text in any::<String>()) {
                prop_assert_eq!(decompress(&compress(&text)).unwrap(), text);
            }

            #[test]
            fn rendered_lines_are_wrapped_and_uppercase(
                bytes in proptest::collection::vec(any::<u8>(), 1..200),
            ) {
                let out = render(&bytes, "arr");
                let body: Vec<&str> = out
                    .lines()
                    .skip(3)
                    .take_while(|line| *line != "};")
                    .collect();
                prop_assert_eq!(body.len(), bytes.len().div_ceil(BYTES_PER_LINE));

                let token = regex::Regex::new(r"^0x[0-9A-F]{2}$").unwrap();
                for (i, line) in body.iter().enumerate() {
                    let last = i + 1 == body.len();
                    prop_assert!(line.starts_with("  "));
                    prop_assert_eq!(line.ends_with(','), !last);
                    let tokens: Vec<&str> = line
                        .trim()
                        .trim_end_matches(',')
                        .split(", ")
                        .collect();
                    if !last {
                        prop_assert_eq!(tokens.len(), BYTES_PER_LINE);
                    }
                    for t in tokens {
                        prop_assert!(token.is_match(t), "bad token {}", t);
                    }
                }
            }
        }
    }
}
