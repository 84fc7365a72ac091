//! Argument pipeline and argument bag
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use log::debug;
use std::any::{type_name, Any};

use super::error::{ArgumentError, ParseFailure};
use super::transformer::{ArgumentTransformer, TokenCursor, TransformContext};

/// Positional, heterogeneously typed results of one pipeline run
pub struct ArgumentBag {
    values: Vec<Box<dyn Any + Send + Sync>>,
}

impl ArgumentBag {
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// Typed access to the value produced by the transformer at `index`
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, ArgumentError> {
        let value = self
            .values
            .get(index)
            .ok_or(ArgumentError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            })?;
        value
            .downcast_ref::<T>()
            .ok_or(ArgumentError::TypeMismatch {
                index,
                expected: type_name::<T>(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for ArgumentBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentBag")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Cursor over the remainder of a command line
///
/// With `suppress_parsing` the whole remainder (leading whitespace removed, newlines
/// kept) is a single token; an empty remainder has no tokens either way.
pub fn tokenize(remainder: &str, suppress_parsing: bool) -> TokenCursor {
    if suppress_parsing {
        TokenCursor::whole(remainder)
    } else {
        TokenCursor::parse(remainder)
    }
}

/// Run `transformers` left to right over the tokenized remainder
///
/// Stops at the first transformer that fails. Tokens left after the last
/// transformer are ignored.
pub async fn decode_arguments(
    transformers: &[Box<dyn ArgumentTransformer>],
    remainder: &str,
    suppress_parsing: bool,
    ctx: &TransformContext<'_>,
) -> Result<ArgumentBag, ParseFailure> {
    let mut tokens = tokenize(remainder, suppress_parsing);
    let mut values = Vec::with_capacity(transformers.len());

    for transformer in transformers {
        let value = transformer.decode(&mut tokens, ctx).await?;
        values.push(value);
    }

    if !tokens.is_exhausted() {
        debug!(
            "Ignoring {} unconsumed argument token(s)",
            tokens.remaining().len()
        );
    }

    Ok(ArgumentBag { values })
}
