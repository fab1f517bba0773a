use std::fmt;

use thiserror::Error;

pub use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub span: Span,
    pub message: String,
}

impl Diag {
    #[inline]
    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: DiagKind::Parse,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagKind::Lex => "lex",
            DiagKind::Parse => "parse",
        };
        write!(
            f,
            "{kind} error at {}..{}: {}",
            self.span.start, self.span.end, self.message
        )
    }
}

/// Diagnostics collected while parsing one input.
#[derive(Debug, Clone, Error)]
#[error("{}", .diags.first().map(ToString::to_string).unwrap_or_else(|| "parse failed".to_string()))]
pub struct ParseFailure {
    pub diags: Vec<Diag>,
}

impl ParseFailure {
    /// Line/column (1-based) of the first diagnostic within `src`.
    pub fn first_position(&self, src: &str) -> Option<(usize, usize)> {
        let d = self.diags.first()?;
        let off = (d.span.start as usize).min(src.len());
        let before = src.get(..off)?;
        let line = before.matches('\n').count() + 1;
        let col = before.rfind('\n').map_or(off, |nl| off - nl - 1) + 1;
        Some((line, col))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("misplaced byte order mark")]
    MisplacedBom,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}
