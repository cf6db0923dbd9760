use std::fmt;

/// Error kind for conversion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected source file or directory is absent.
    MissingInput,
    /// A compact token (geometry, enchantment, rule) failed to parse.
    MalformedToken,
    /// Recognized source feature without a target counterpart.
    Unsupported,
    Io,
    Config,
    /// Document could not be decoded or encoded.
    Format,
    Logic,
}

/// Conversion error returned by codecs and conversion steps.
#[derive(Debug)]
pub struct ConvertError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ConvertError {
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::MissingInput, message: msg.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::MalformedToken, message: msg.into() }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Unsupported, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Config, message: msg.into() }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ConvertError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → ConvertError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::missing_input(e.to_string())
        } else {
            Self::io(e.to_string())
        }
    }
}

impl From<std::str::Utf8Error> for ConvertError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::format(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ConvertError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::format(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_kind() {
        let err = ConvertError::malformed("bad token").with_context("weapons:sword");
        assert_eq!(err.kind, ErrorKind::MalformedToken);
        assert_eq!(err.message, "weapons:sword: bad token");
    }

    #[test]
    fn test_not_found_is_missing_input() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ConvertError::from(io).kind, ErrorKind::MissingInput);
    }
}
