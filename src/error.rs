use crate::ast::Span;

/// A compilation error with source location, produced by any stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    /// At most one proposed correction, e.g. a close identifier for a typo.
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexer,
    Parser,
    Semantic,
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ErrorKind::Lexer,
            suggestion: None,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ErrorKind::Parser,
            suggestion: None,
        }
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ErrorKind::Semantic,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CompileError {}

/// Convert a byte offset into 1-based line and column numbers.
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_from_offset() {
        let src = "a = 1\nbb = 2\n";
        assert_eq!(offset_to_line_col(src, 0), (1, 1));
        assert_eq!(offset_to_line_col(src, 4), (1, 5));
        assert_eq!(offset_to_line_col(src, 6), (2, 1));
        assert_eq!(offset_to_line_col(src, 11), (2, 6));
    }

    #[test]
    fn suggestion_is_attached() {
        let err = CompileError::semantic("undefined name 'pritn'", Span::new(0, 5))
            .with_suggestion("print");
        assert_eq!(err.suggestion.as_deref(), Some("print"));
        assert_eq!(err.kind, ErrorKind::Semantic);
    }
}
