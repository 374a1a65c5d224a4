use std::str::FromStr;

use crate::Float;

/// The failures of [`parse_vector`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseVectorError {
    /// The literal is not wrapped in `[` and `]`.
    #[error("vector literal must be enclosed in square brackets")]
    MissingBrackets,
    /// The literal is `[]`.
    #[error("vector literal has no components")]
    Empty,
    /// A component is not a finite number.
    #[error("component {index} ({token:?}) is not a finite number")]
    InvalidNumber {
        /// The position of the component in the literal.
        index: usize,
        /// The offending text, trimmed.
        token: String,
    },
    /// The literal has the wrong number of components for a fixed-size vector.
    #[error("expected {expected} components, found {found}")]
    WrongLength {
        /// The number of components required.
        expected: usize,
        /// The number of components in the literal.
        found: usize,
    },
}

/// Parses a bracketed, comma separated literal such as `"[0.1, 0.2]"` into its components.
///
/// Whitespace around the brackets and components is ignored.
///
/// # Errors
/// See [`ParseVectorError`].
pub fn parse_vector<T: Float + FromStr>(input: &str) -> Result<Vec<T>, ParseVectorError> {
    let inner = input
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(ParseVectorError::MissingBrackets)?;

    if inner.trim().is_empty() {
        return Err(ParseVectorError::Empty);
    }

    inner
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, token)| {
            token
                .parse::<T>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| ParseVectorError::InvalidNumber {
                    index,
                    token: token.to_owned(),
                })
        })
        .collect()
}
