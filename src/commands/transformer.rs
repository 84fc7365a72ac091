//! Argument transformers
//!
//! A transformer decodes the leading tokens of a command's argument text into a
//! typed value. Each variant is its own type implementing [`Transformer`]; the
//! pipeline works with them through the type-erased [`ArgumentTransformer`].
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.3.0: `TrRest` and `TrSplit` keep the line's original whitespace
//! - 1.2.0: Add `TrUser` entity lookup
//! - 1.1.0: Add `TrBigInt`, `TrGreedy` and `TrSplit`
//! - 1.0.0: Scalar and rest transformers over a token cursor

use async_trait::async_trait;
use std::any::Any;
use std::num::IntErrorKind;

use super::error::{ParseFailure, ParseFailureReason};
use crate::platform::{ChatPlatform, InboundMessage, UserId, UserRef};

/// Read position over the whitespace-separated tokens of an argument string
///
/// The cursor keeps the source text and each token's byte span, so rest-of-line
/// transformers can take the remainder untouched. Transformers only ever move the
/// position forward, so `consumed() + remaining().len()` always equals the number
/// of tokens the cursor was built with.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    source: String,
    spans: Vec<(usize, usize)>,
    position: usize,
}

impl TokenCursor {
    /// Tokens separated by single spaces
    pub fn new(tokens: Vec<String>) -> Self {
        Self::parse(tokens.join(" "))
    }

    /// Split `source` on runs of whitespace
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let spans = whitespace_spans(&source);
        Self {
            source,
            spans,
            position: 0,
        }
    }

    /// `source` minus leading whitespace as one token; no tokens when blank
    pub fn whole(source: &str) -> Self {
        let source = source.trim_start().to_string();
        let spans = if source.is_empty() {
            Vec::new()
        } else {
            vec![(0, source.len())]
        };
        Self {
            source,
            spans,
            position: 0,
        }
    }

    fn token(&self, index: usize) -> Option<&str> {
        let &(start, end) = self.spans.get(index)?;
        Some(&self.source[start..end])
    }

    pub fn peek(&self) -> Option<&str> {
        self.token(self.position)
    }

    /// Consume and return the next token
    pub fn advance(&mut self) -> Option<&str> {
        let index = self.position;
        if index >= self.spans.len() {
            return None;
        }
        self.position += 1;
        self.token(index)
    }

    /// Consume every remaining token, returning the source text from the next
    /// token to the end with its whitespace intact
    pub fn take_rest_raw(&mut self) -> &str {
        let start = match self.spans.get(self.position) {
            Some(&(start, _)) => start,
            None => self.source.len(),
        };
        self.position = self.spans.len();
        &self.source[start..]
    }

    pub fn remaining(&self) -> Vec<&str> {
        (self.position..self.spans.len())
            .filter_map(|index| self.token(index))
            .collect()
    }

    pub fn consumed(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.spans.len()
    }
}

/// Byte ranges of the whitespace-separated words in `source`
fn whitespace_spans(source: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (index, c) in source.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(begin)) => {
                spans.push((begin, index));
                start = None;
            }
            (false, None) => start = Some(index),
            _ => {}
        }
    }
    if let Some(begin) = start {
        spans.push((begin, source.len()));
    }
    spans
}

/// What a transformer may look at besides its tokens
pub struct TransformContext<'a> {
    pub platform: &'a dyn ChatPlatform,
    pub event: &'a InboundMessage,
}

/// A typed decoder for one command argument
#[async_trait]
pub trait Transformer: Send + Sync {
    type Output: Send + Sync + 'static;

    /// Display name used in usage strings and parse errors
    fn name(&self) -> &str;

    fn is_optional(&self) -> bool;

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        ctx: &TransformContext<'_>,
    ) -> Result<Self::Output, ParseFailure>;
}

/// Object-safe view of a [`Transformer`] whose output is boxed for the argument bag
#[async_trait]
pub trait ArgumentTransformer: Send + Sync {
    fn display_name(&self) -> &str;

    fn optional(&self) -> bool;

    /// `name` or `[name]`
    fn usage(&self) -> String {
        if self.optional() {
            format!("[{}]", self.display_name())
        } else {
            self.display_name().to_string()
        }
    }

    async fn decode(
        &self,
        tokens: &mut TokenCursor,
        ctx: &TransformContext<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>, ParseFailure>;
}

#[async_trait]
impl<T: Transformer> ArgumentTransformer for T {
    fn display_name(&self) -> &str {
        Transformer::name(self)
    }

    fn optional(&self) -> bool {
        self.is_optional()
    }

    async fn decode(
        &self,
        tokens: &mut TokenCursor,
        ctx: &TransformContext<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>, ParseFailure> {
        let value = self.transform(tokens, ctx).await?;
        Ok(Box::new(value))
    }
}

/// Single-token decode with lookahead-then-backoff for optional transformers
fn take_scalar<T: Clone>(
    tokens: &mut TokenCursor,
    name: &str,
    default: Option<&T>,
    parse: impl Fn(&str) -> Result<T, ParseFailureReason>,
) -> Result<T, ParseFailure> {
    let parsed = match tokens.peek() {
        Some(token) => parse(token),
        None => {
            return default
                .cloned()
                .ok_or_else(|| ParseFailure::missing(name));
        }
    };

    match (parsed, default) {
        (Ok(value), _) => {
            tokens.advance();
            Ok(value)
        }
        (Err(_), Some(default)) => Ok(default.clone()),
        (Err(reason), None) => Err(ParseFailure::new(name, reason)),
    }
}

fn integer_reason(token: &str, kind: &IntErrorKind, expected: &'static str) -> ParseFailureReason {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ParseFailureReason::OutOfRange {
            token: token.to_string(),
        },
        _ => ParseFailureReason::InvalidFormat {
            token: token.to_string(),
            expected,
        },
    }
}

/// 64-bit integer, one token
pub struct TrInt {
    name: String,
    default: Option<i64>,
}

impl TrInt {
    pub fn new() -> Self {
        Self {
            name: "number".to_string(),
            default: None,
        }
    }

    /// Optional, yielding `default` when the next token is absent or not an integer
    pub fn optional(default: i64) -> Self {
        Self {
            default: Some(default),
            ..Self::new()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for TrInt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transformer for TrInt {
    type Output = i64;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        _ctx: &TransformContext<'_>,
    ) -> Result<i64, ParseFailure> {
        take_scalar(tokens, &self.name, self.default.as_ref(), |token| {
            token
                .parse::<i64>()
                .map_err(|e| integer_reason(token, e.kind(), "integer"))
        })
    }
}

/// 128-bit integer, one token
pub struct TrBigInt {
    name: String,
    default: Option<i128>,
}

impl TrBigInt {
    pub fn new() -> Self {
        Self {
            name: "number".to_string(),
            default: None,
        }
    }

    pub fn optional(default: i128) -> Self {
        Self {
            default: Some(default),
            ..Self::new()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for TrBigInt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transformer for TrBigInt {
    type Output = i128;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        _ctx: &TransformContext<'_>,
    ) -> Result<i128, ParseFailure> {
        take_scalar(tokens, &self.name, self.default.as_ref(), |token| {
            token
                .parse::<i128>()
                .map_err(|e| integer_reason(token, e.kind(), "big integer"))
        })
    }
}

/// One token taken verbatim
pub struct TrWord {
    name: String,
    default: Option<String>,
}

impl TrWord {
    pub fn new() -> Self {
        Self {
            name: "word".to_string(),
            default: None,
        }
    }

    pub fn optional(default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::new()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for TrWord {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transformer for TrWord {
    type Output = String;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        _ctx: &TransformContext<'_>,
    ) -> Result<String, ParseFailure> {
        take_scalar(tokens, &self.name, self.default.as_ref(), |token| {
            Ok(token.to_string())
        })
    }
}

/// Everything left on the line, whitespace untouched; must be last
pub struct TrRest {
    name: String,
}

impl TrRest {
    pub fn new() -> Self {
        Self {
            name: "text".to_string(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for TrRest {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transformer for TrRest {
    type Output = String;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_optional(&self) -> bool {
        true
    }

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        _ctx: &TransformContext<'_>,
    ) -> Result<String, ParseFailure> {
        Ok(tokens.take_rest_raw().to_string())
    }
}

/// Maps tokens one at a time until one fails to map; never fails
pub struct TrGreedy<T> {
    name: String,
    map: fn(&str) -> Option<T>,
    default: Vec<T>,
}

impl<T> TrGreedy<T> {
    pub fn new(map: fn(&str) -> Option<T>) -> Self {
        Self {
            name: "values".to_string(),
            map,
            default: Vec::new(),
        }
    }

    /// List returned when not a single token maps
    pub fn with_default(mut self, default: Vec<T>) -> Self {
        self.default = default;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl<T> Transformer for TrGreedy<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Vec<T>;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_optional(&self) -> bool {
        true
    }

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        _ctx: &TransformContext<'_>,
    ) -> Result<Vec<T>, ParseFailure> {
        let mut values = Vec::new();
        while let Some(token) = tokens.peek() {
            match (self.map)(token) {
                Some(value) => {
                    values.push(value);
                    tokens.advance();
                }
                None => break,
            }
        }

        if values.is_empty() {
            Ok(self.default.clone())
        } else {
            Ok(values)
        }
    }
}

/// Rest of the line split on a delimiter; must be last
pub struct TrSplit {
    name: String,
    separator: String,
    default: Vec<String>,
}

impl TrSplit {
    /// Split on single spaces
    pub fn new() -> Self {
        Self::on(" ")
    }

    pub fn on(separator: impl Into<String>) -> Self {
        Self {
            name: "values".to_string(),
            separator: separator.into(),
            default: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for TrSplit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transformer for TrSplit {
    type Output = Vec<String>;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_optional(&self) -> bool {
        true
    }

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        _ctx: &TransformContext<'_>,
    ) -> Result<Vec<String>, ParseFailure> {
        let rest = tokens.take_rest_raw();
        if rest.is_empty() {
            return Ok(self.default.clone());
        }
        Ok(rest
            .split(self.separator.as_str())
            .map(str::to_string)
            .collect())
    }
}

/// Outcome of resolving a user reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSearchResult {
    Found(UserRef),
    NotFound,
}

/// One token resolved to a user
///
/// Output is `None` only when the transformer is optional and no token is left.
pub struct TrUser {
    name: String,
    optional: bool,
}

impl TrUser {
    pub fn new() -> Self {
        Self {
            name: "user".to_string(),
            optional: false,
        }
    }

    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Self::new()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for TrUser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transformer for TrUser {
    type Output = Option<UserSearchResult>;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    async fn transform(
        &self,
        tokens: &mut TokenCursor,
        ctx: &TransformContext<'_>,
    ) -> Result<Option<UserSearchResult>, ParseFailure> {
        let input = match tokens.advance() {
            Some(token) => token.to_string(),
            None if self.optional => return Ok(None),
            None => return Err(ParseFailure::missing(&self.name)),
        };
        Ok(Some(resolve_user(ctx.platform, &input).await))
    }
}

/// Resolve a user reference: snowflake id, then `name#1234`, then mention, then name
pub async fn resolve_user(platform: &dyn ChatPlatform, input: &str) -> UserSearchResult {
    let found = if looks_like_snowflake(input) {
        match input.parse::<u64>() {
            Ok(id) => platform.resolve_user_by_id(UserId(id)).await,
            Err(_) => None,
        }
    } else if let Some((name, discriminator)) = parse_tag(input) {
        platform.resolve_user_by_tag(name, discriminator).await
    } else if input.starts_with("<@") {
        platform.resolve_user_by_mention(input).await
    } else {
        platform.resolve_user_by_fuzzy_name(input).await
    };

    match found {
        Some(user) => UserSearchResult::Found(user),
        None => UserSearchResult::NotFound,
    }
}

fn looks_like_snowflake(input: &str) -> bool {
    (17..=20).contains(&input.len()) && input.chars().all(|c| c.is_ascii_digit())
}

fn parse_tag(input: &str) -> Option<(&str, u16)> {
    let (name, discriminator) = input.rsplit_once('#')?;
    if name.is_empty()
        || discriminator.len() != 4
        || !discriminator.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    Some((name, discriminator.parse().ok()?))
}
