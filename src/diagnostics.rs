use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{offset_to_line_col, CompileError, ErrorKind};

/// Pipeline stage a diagnostic originated from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Phase {
    Lexical,
    Syntactic,
    Semantic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lexical => "lexical",
            Phase::Syntactic => "syntactic",
            Phase::Semantic => "semantic",
        };
        write!(f, "{name}")
    }
}

/// A single compile problem in presentation form: positions are 1-based
/// line/column rather than byte offsets, and the offending source line
/// rides along so a frontend needs nothing but this struct to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Diagnostic {
    /// Absent for internal errors, which belong to no pipeline stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phase: Option<Phase>,
    /// 1-based; 0 for internal errors.
    pub line: usize,
    /// 1-based; 0 for internal errors.
    pub column: usize,
    pub message: String,
    /// The source line the error points into; empty for internal errors.
    pub code_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn from_error(err: &CompileError, source: &str) -> Self {
        let (line, column) = offset_to_line_col(source, err.span.start);
        let code_line = source
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or("")
            .to_string();
        let phase = match err.kind {
            ErrorKind::Lexer => Phase::Lexical,
            ErrorKind::Parser => Phase::Syntactic,
            ErrorKind::Semantic => Phase::Semantic,
        };
        Self {
            phase: Some(phase),
            line,
            column,
            message: err.message.clone(),
            code_line,
            suggestion: err.suggestion.clone(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            phase: None,
            line: 0,
            column: 0,
            message: message.into(),
            code_line: String::new(),
            suggestion: None,
        }
    }

    /// Plain-text rendering with a caret under the offending column.
    pub fn render(&self) -> String {
        if self.line == 0 {
            return format!("{}\n", self.message);
        }
        let mut out = format!("line {}, column {}: {}\n", self.line, self.column, self.message);
        if !self.code_line.is_empty() {
            out.push_str(&format!("    {}\n", self.code_line));
            out.push_str(&format!("    {}^\n", " ".repeat(self.column.saturating_sub(1))));
        }
        if let Some(s) = &self.suggestion {
            out.push_str(&format!("    suggestion: {s}\n"));
        }
        out
    }
}

/// Convert raw compile errors into presentation order: by source position
/// within the phase, with exact duplicates dropped.
pub fn collect(errors: Vec<CompileError>, source: &str) -> Vec<Diagnostic> {
    let mut diags: Vec<Diagnostic> = errors
        .iter()
        .map(|e| Diagnostic::from_error(e, source))
        .collect();
    diags.sort_by(|a, b| {
        phase_rank(a.phase)
            .cmp(&phase_rank(b.phase))
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column))
            .then(a.message.cmp(&b.message))
    });
    diags.dedup_by(|a, b| {
        a.phase == b.phase && a.line == b.line && a.column == b.column && a.message == b.message
    });
    diags
}

fn phase_rank(phase: Option<Phase>) -> u8 {
    match phase {
        Some(Phase::Lexical) => 0,
        Some(Phase::Syntactic) => 1,
        Some(Phase::Semantic) => 2,
        None => 3,
    }
}

/// Group rendered diagnostics under per-phase headers.
pub fn render_report(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    let mut current: Option<Option<Phase>> = None;
    for diag in diagnostics {
        if current != Some(diag.phase) {
            current = Some(diag.phase);
            if !out.is_empty() {
                out.push('\n');
            }
            match diag.phase {
                Some(phase) => out.push_str(&format!("{phase} errors:\n")),
                None => out.push_str("internal errors:\n"),
            }
        }
        out.push_str(&diag.render());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ast::Span;

    #[test]
    fn positions_are_one_based_line_and_column() {
        let source = "x = 5\ny = @\n";
        let err = CompileError::lexer("Unrecognized character: '@'", Span::new(10, 11));
        let diag = Diagnostic::from_error(&err, source);
        assert_eq!(diag.phase, Some(Phase::Lexical));
        assert_eq!((diag.line, diag.column), (2, 5));
        assert_eq!(diag.code_line, "y = @");
    }

    #[test]
    fn internal_diagnostics_have_no_position() {
        let diag = Diagnostic::internal("internal error: oops");
        assert_eq!(diag.phase, None);
        assert_eq!((diag.line, diag.column), (0, 0));
        assert_eq!(diag.render(), "internal error: oops\n");
    }

    #[test]
    fn collect_orders_by_position() {
        let source = "a\nb\n";
        let errors = vec![
            CompileError::semantic("second", Span::new(2, 3)),
            CompileError::semantic("first", Span::new(0, 1)),
        ];
        let diags = collect(errors, source);
        assert_eq!(diags[0].message, "first");
        assert_eq!(diags[1].message, "second");
    }

    #[test]
    fn collect_drops_exact_duplicates() {
        let source = "a\n";
        let errors = vec![
            CompileError::semantic("same", Span::new(0, 1)),
            CompileError::semantic("same", Span::new(0, 1)),
        ];
        assert_eq!(collect(errors, source).len(), 1);
    }

    #[test]
    fn render_puts_the_caret_under_the_column() {
        let source = "y = @\n";
        let err = CompileError::lexer("Unrecognized character: '@'", Span::new(4, 5));
        let rendered = Diagnostic::from_error(&err, source).render();
        assert_eq!(
            rendered,
            "line 1, column 5: Unrecognized character: '@'\n    y = @\n        ^\n"
        );
    }

    #[test]
    fn render_appends_the_suggestion() {
        let source = "pritn(5)\n";
        let err = CompileError::semantic("undefined function 'pritn'", Span::new(0, 8))
            .with_suggestion("print");
        let rendered = Diagnostic::from_error(&err, source).render();
        assert!(rendered.ends_with("    suggestion: print\n"));
    }

    #[test]
    fn report_groups_under_phase_headers() {
        let source = "y = @\n";
        let errors = vec![CompileError::lexer("Unrecognized character: '@'", Span::new(4, 5))];
        let report = render_report(&collect(errors, source));
        assert!(report.starts_with("lexical errors:\n"));
    }

    #[test]
    fn wire_shape_is_camel_case_and_sparse() {
        let source = "y = @\n";
        let err = CompileError::lexer("Unrecognized character: '@'", Span::new(4, 5));
        let value = serde_json::to_value(Diagnostic::from_error(&err, source)).unwrap();
        assert_eq!(value["phase"], "lexical");
        assert_eq!(value["codeLine"], "y = @");
        assert!(value.get("suggestion").is_none());

        let internal = serde_json::to_value(Diagnostic::internal("x")).unwrap();
        assert!(internal.get("phase").is_none());
    }
}
