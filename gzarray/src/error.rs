use std::{io, path::PathBuf, string::FromUtf8Error};

/// A specialized `Result` type for array codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while extracting, converting or re-embedding an array.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Array '{name}' not found in header")]
    NotFound { name: String },
    #[error("Payload is not a valid gzip stream: {0}")]
    Format(#[source] io::Error),
    #[error("Decompressed payload is not valid UTF-8")]
    Decode(#[from] FromUtf8Error),
    #[error("I/O error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config file '{}'", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Process exit status reported by the command line tool for this error kind.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound { .. } => 2,
            Self::Format(_) => 3,
            Self::Decode(_) => 4,
            Self::Io { .. } => 5,
            Self::Config { .. } => 6,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let bad_utf8 = String::from_utf8(vec![0xff]).unwrap_err();
        let bad_toml = toml::from_str::<toml::Table>("=").unwrap_err();
        let errors = [
            Error::NotFound { name: "x".into() },
            Error::Format(io::Error::other("bad")),
            Error::Decode(bad_utf8),
            Error::io("a.h", io::Error::other("gone")),
            Error::Config {
                path: "c.toml".into(),
                source: bad_toml,
            },
        ];
        let mut codes: Vec<u8> = errors.iter().map(Error::exit_code).collect();
        codes.dedup();
        assert_eq!(codes, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn messages_name_the_subject() {
        let err = Error::NotFound {
            name: "index_html_gz".into(),
        };
        assert_eq!(err.to_string(), "Array 'index_html_gz' not found in header");

        let err = Error::io("missing.h", io::Error::other("gone"));
        assert_eq!(err.to_string(), "I/O error on 'missing.h'");
    }
}
