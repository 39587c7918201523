use crate::ast::{Span, TypeRef};
use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(String),
    Str(String),
    True,
    False,
    None,

    // Identifiers & keywords
    Ident(String),
    Def,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Class,
    And,
    Or,
    Not,

    // Type names
    TypeName(TypeRef),

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Arrow,     // ->

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Le,        // <=
    Ge,        // >=
    EqEq,      // ==
    Ne,        // !=
    Eq,        // =

    // Structural
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl Token {
    /// Human-readable name for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(raw) => format!("number '{raw}'"),
            Token::Str(_) => "string literal".to_string(),
            Token::True => "'True'".to_string(),
            Token::False => "'False'".to_string(),
            Token::None => "'None'".to_string(),
            Token::Ident(name) => format!("identifier '{name}'"),
            Token::Def => "'def'".to_string(),
            Token::Return => "'return'".to_string(),
            Token::If => "'if'".to_string(),
            Token::Elif => "'elif'".to_string(),
            Token::Else => "'else'".to_string(),
            Token::While => "'while'".to_string(),
            Token::For => "'for'".to_string(),
            Token::In => "'in'".to_string(),
            Token::Class => "'class'".to_string(),
            Token::And => "'and'".to_string(),
            Token::Or => "'or'".to_string(),
            Token::Not => "'not'".to_string(),
            Token::TypeName(t) => format!("type name '{}'", t.name()),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Arrow => "'->'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::Ne => "'!='".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Newline => "end of line".to_string(),
            Token::Indent => "an indented block".to_string(),
            Token::Dedent => "end of block".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

pub fn lex(source: &str) -> Result<Vec<SpannedToken>, Vec<CompileError>> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<SpannedToken>,
    errors: Vec<CompileError>,
    /// Enclosing block widths, innermost last. Never empty; starts at [0].
    indent_stack: Vec<usize>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            indent_stack: vec![0],
        }
    }

    fn tokenize(&mut self) -> Result<Vec<SpannedToken>, Vec<CompileError>> {
        while self.start_of_line() {
            self.lex_line();
        }

        // Guarantee a trailing newline so every statement is terminated,
        // then close any blocks still open at end of input.
        if let Some(last) = self.tokens.last() {
            if !matches!(last.token, Token::Newline) {
                self.push(Token::Newline, self.pos, self.pos);
            }
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(Token::Dedent, self.pos, self.pos);
        }
        self.push(Token::Eof, self.pos, self.pos);

        if self.errors.is_empty() {
            Ok(std::mem::take(&mut self.tokens))
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    // ── Line structure ───────────────────────────────────────────

    /// Advance to the first significant character of the next logical line,
    /// skipping blank and comment-only lines, and emit Indent/Dedent tokens
    /// for its leading whitespace. Returns false at end of input.
    fn start_of_line(&mut self) -> bool {
        loop {
            let line_start = self.pos;
            let mut width = 0usize;
            // Spaces and tabs both count one unit of indentation.
            while matches!(self.peek(), Some(b' ' | b'\t')) {
                width += 1;
                self.pos += 1;
            }
            match self.peek() {
                None => return false,
                Some(b'\n' | b'\r') => self.consume_newline(),
                Some(b'#') => self.skip_comment(),
                Some(_) => {
                    self.apply_indent(line_start, width);
                    return true;
                }
            }
        }
    }

    fn apply_indent(&mut self, start: usize, width: usize) {
        let current = self.indent_stack.last().copied().unwrap_or(0);
        if width > current {
            self.indent_stack.push(width);
            self.push(Token::Indent, start, self.pos);
        } else if width < current {
            while self.indent_stack.last().copied().unwrap_or(0) > width {
                self.indent_stack.pop();
                self.push(Token::Dedent, start, self.pos);
            }
            if self.indent_stack.last().copied().unwrap_or(0) != width {
                // Resynchronize at the nearest enclosing level (already
                // popped past it above).
                self.errors.push(CompileError::lexer(
                    "Inconsistent indentation: this line matches no enclosing block",
                    Span::new(start, self.pos),
                ));
            }
        }
    }

    fn consume_newline(&mut self) {
        if self.peek() == Some(b'\r') {
            self.pos += 1;
        }
        if self.peek() == Some(b'\n') {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        while self.pos < self.bytes.len()
            && self.bytes[self.pos] != b'\n'
            && self.bytes[self.pos] != b'\r'
        {
            self.pos += 1;
        }
    }

    /// Scan tokens until the line's newline has been consumed (or input ends).
    fn lex_line(&mut self) {
        while self.pos < self.bytes.len() {
            while matches!(self.peek(), Some(b' ' | b'\t')) {
                self.pos += 1;
            }
            let start = self.pos;
            let Some(ch) = self.peek() else { return };

            match ch {
                b'\n' | b'\r' => {
                    self.consume_newline();
                    self.push(Token::Newline, start, self.pos);
                    return;
                }
                b'#' => self.skip_comment(),
                b'(' => { self.pos += 1; self.push(Token::LParen, start, self.pos); }
                b')' => { self.pos += 1; self.push(Token::RParen, start, self.pos); }
                b'[' => { self.pos += 1; self.push(Token::LBracket, start, self.pos); }
                b']' => { self.pos += 1; self.push(Token::RBracket, start, self.pos); }
                b'{' => { self.pos += 1; self.push(Token::LBrace, start, self.pos); }
                b'}' => { self.pos += 1; self.push(Token::RBrace, start, self.pos); }
                b',' => { self.pos += 1; self.push(Token::Comma, start, self.pos); }
                b':' => { self.pos += 1; self.push(Token::Colon, start, self.pos); }
                b';' => { self.pos += 1; self.push(Token::Semicolon, start, self.pos); }
                b'.' => { self.pos += 1; self.push(Token::Dot, start, self.pos); }
                b'+' => { self.pos += 1; self.push(Token::Plus, start, self.pos); }
                b'*' => { self.pos += 1; self.push(Token::Star, start, self.pos); }
                b'/' => { self.pos += 1; self.push(Token::Slash, start, self.pos); }
                b'%' => { self.pos += 1; self.push(Token::Percent, start, self.pos); }
                b'-' => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        self.push(Token::Arrow, start, self.pos);
                    } else {
                        self.push(Token::Minus, start, self.pos);
                    }
                }
                b'<' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.push(Token::Le, start, self.pos);
                    } else {
                        self.push(Token::Lt, start, self.pos);
                    }
                }
                b'>' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.push(Token::Ge, start, self.pos);
                    } else {
                        self.push(Token::Gt, start, self.pos);
                    }
                }
                b'=' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.push(Token::EqEq, start, self.pos);
                    } else {
                        self.push(Token::Eq, start, self.pos);
                    }
                }
                b'!' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.push(Token::Ne, start, self.pos);
                    } else {
                        self.errors.push(
                            CompileError::lexer(
                                "Expected '!=' after '!'",
                                Span::new(start, self.pos),
                            )
                            .with_suggestion("not"),
                        );
                    }
                }
                b'"' | b'\'' => self.lex_string(start, ch),
                b'0'..=b'9' => self.lex_number(start),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_ident(start),
                _ => {
                    // Decode the full character — smart quotes and similar
                    // look-alikes are multi-byte.
                    let ch = self.source[self.pos..].chars().next().unwrap_or('\u{fffd}');
                    let mut err = CompileError::lexer(
                        format!("Unrecognized character: '{ch}'"),
                        Span::new(start, start + ch.len_utf8()),
                    );
                    if let Some(replacement) = lookalike(ch) {
                        err = err.with_suggestion(replacement);
                    }
                    self.errors.push(err);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    // ── Token scanners ───────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn push(&mut self, token: Token, start: usize, end: usize) {
        self.tokens.push(SpannedToken {
            token,
            span: Span::new(start, end),
        });
    }

    fn lex_string(&mut self, start: usize, quote: u8) {
        self.pos += 1; // opening quote
        let mut content = String::new();
        let mut seg_start = self.pos;
        loop {
            match self.peek() {
                None | Some(b'\n' | b'\r') => {
                    content.push_str(&self.source[seg_start..self.pos]);
                    self.errors.push(CompileError::lexer(
                        "Unterminated string literal",
                        Span::new(start, self.pos),
                    ));
                    break;
                }
                Some(c) if c == quote => {
                    content.push_str(&self.source[seg_start..self.pos]);
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    content.push_str(&self.source[seg_start..self.pos]);
                    self.pos += 1;
                    match self.peek() {
                        Some(b'n') => { content.push('\n'); self.pos += 1; }
                        Some(b't') => { content.push('\t'); self.pos += 1; }
                        Some(b'r') => { content.push('\r'); self.pos += 1; }
                        Some(b'\\') => { content.push('\\'); self.pos += 1; }
                        Some(b'"') => { content.push('"'); self.pos += 1; }
                        Some(b'\'') => { content.push('\''); self.pos += 1; }
                        // Unknown escape: keep the backslash verbatim.
                        _ => content.push('\\'),
                    }
                    seg_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.push(Token::Str(content), start, self.pos);
    }

    fn lex_number(&mut self, start: usize) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        // Fractional part only when a digit follows the dot
        if self.pos < self.bytes.len()
            && self.bytes[self.pos] == b'.'
            && self.bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit)
        {
            self.pos += 1;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        // The raw lexeme is kept as-is; the emitter re-prints it verbatim.
        let raw = self.source[start..self.pos].to_string();
        self.push(Token::Number(raw), start, self.pos);
    }

    fn lex_ident(&mut self, start: usize) {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'_')
        {
            self.pos += 1;
        }
        let word = &self.source[start..self.pos];

        // An f-prefixed quote lexes as a plain string literal; interpolation
        // is not expanded.
        if word == "f" || word == "F" {
            if let Some(q) = self.peek() {
                if q == b'"' || q == b'\'' {
                    self.lex_string(start, q);
                    return;
                }
            }
        }

        let token = match word {
            "def" => Token::Def,
            "return" => Token::Return,
            "if" => Token::If,
            "elif" => Token::Elif,
            "else" => Token::Else,
            "while" => Token::While,
            "for" => Token::For,
            "in" => Token::In,
            "class" => Token::Class,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "True" => Token::True,
            "False" => Token::False,
            "None" => Token::None,
            "int" => Token::TypeName(TypeRef::Int),
            "float" => Token::TypeName(TypeRef::Float),
            "str" => Token::TypeName(TypeRef::Str),
            "bool" => Token::TypeName(TypeRef::Bool),
            "list" => Token::TypeName(TypeRef::List),
            "dict" => Token::TypeName(TypeRef::Dict),
            _ => Token::Ident(word.to_string()),
        };
        self.push(token, start, self.pos);
    }
}

/// Common look-alikes that sneak in from word processors and IME input.
fn lookalike(ch: char) -> Option<&'static str> {
    match ch {
        '\u{201c}' | '\u{201d}' => Some("\""), // “ ”
        '\u{2018}' | '\u{2019}' => Some("'"),  // ‘ ’
        '\u{2014}' | '\u{2013}' => Some("-"),  // em/en dash
        '\u{ff08}' => Some("("),               // fullwidth paren
        '\u{ff09}' => Some(")"),
        '\u{ff1a}' => Some(":"),               // fullwidth colon
        '\u{00a0}' => Some(" "),               // non-breaking space
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tok(s: &str) -> Vec<Token> {
        lex(s).unwrap().into_iter().map(|t| t.token).collect()
    }

    fn errs(s: &str) -> Vec<CompileError> {
        lex(s).unwrap_err()
    }

    #[test]
    fn simple_assignment() {
        assert_eq!(
            tok("x = 5\n"),
            vec![
                Token::Ident("x".to_string()),
                Token::Eq,
                Token::Number("5".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_type_names() {
        assert_eq!(
            tok("def return not True None int dict\n"),
            vec![
                Token::Def,
                Token::Return,
                Token::Not,
                Token::True,
                Token::None,
                Token::TypeName(TypeRef::Int),
                Token::TypeName(TypeRef::Dict),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            tok("a <= b >= c == d != e\n"),
            vec![
                Token::Ident("a".to_string()),
                Token::Le,
                Token::Ident("b".to_string()),
                Token::Ge,
                Token::Ident("c".to_string()),
                Token::EqEq,
                Token::Ident("d".to_string()),
                Token::Ne,
                Token::Ident("e".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn arrow_after_params() {
        let tokens = tok("def f() -> int:\n    return 1\n");
        assert!(tokens.contains(&Token::Arrow));
        assert!(tokens.contains(&Token::TypeName(TypeRef::Int)));
    }

    #[test]
    fn block_emits_indent_and_dedent() {
        assert_eq!(
            tok("if a:\n    b = 1\nc = 2\n"),
            vec![
                Token::If,
                Token::Ident("a".to_string()),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::Ident("b".to_string()),
                Token::Eq,
                Token::Number("1".to_string()),
                Token::Newline,
                Token::Dedent,
                Token::Ident("c".to_string()),
                Token::Eq,
                Token::Number("2".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn nested_blocks_flush_at_eof() {
        // No trailing newline in the source: the lexer supplies one, then
        // closes both open blocks.
        let tokens = tok("def f():\n    if a:\n        return 1");
        let tail = &tokens[tokens.len() - 4..];
        assert_eq!(tail, &[Token::Newline, Token::Dedent, Token::Dedent, Token::Eof]);
    }

    #[test]
    fn blank_and_comment_lines_do_not_indent() {
        let tokens = tok("x = 1\n\n   # indented comment\n\ny = 2\n");
        assert!(!tokens.contains(&Token::Indent));
        let newlines = tokens.iter().filter(|t| matches!(t, Token::Newline)).count();
        assert_eq!(newlines, 2);
    }

    #[test]
    fn comment_truncates_the_line() {
        assert_eq!(
            tok("x = 5  # the rest is ignored\n"),
            vec![
                Token::Ident("x".to_string()),
                Token::Eq,
                Token::Number("5".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn inconsistent_indentation_is_reported() {
        let errors = errs("if a:\n    b = 1\n  c = 2\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Inconsistent indentation"));
    }

    #[test]
    fn partial_dedent_recovers_to_nearest_level() {
        // After the error the lexer continues at indentation level 0.
        let errors = errs("if a:\n    b = 1\n  c = 2\nd = 3\n");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unterminated_string() {
        let errors = errs("s = \"abc\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unterminated string literal");
    }

    #[test]
    fn string_escapes_are_decoded() {
        assert_eq!(
            tok("s = \"a\\n\\\"b\\\"\"\n"),
            vec![
                Token::Ident("s".to_string()),
                Token::Eq,
                Token::Str("a\n\"b\"".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn single_quoted_strings() {
        assert_eq!(
            tok("s = 'hi'\n"),
            vec![
                Token::Ident("s".to_string()),
                Token::Eq,
                Token::Str("hi".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn f_prefix_lexes_as_string() {
        assert_eq!(
            tok("s = f\"hi {x}\"\n"),
            vec![
                Token::Ident("s".to_string()),
                Token::Eq,
                Token::Str("hi {x}".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn number_lexemes_are_preserved() {
        assert_eq!(
            tok("x = 3.14\n"),
            vec![
                Token::Ident("x".to_string()),
                Token::Eq,
                Token::Number("3.14".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
        // A dot with no following digit is not part of the number.
        let tokens = tok("x = 5.\n");
        assert!(tokens.contains(&Token::Number("5".to_string())));
        assert!(tokens.contains(&Token::Dot));
    }

    #[test]
    fn unrecognized_character_is_one_error() {
        let errors = errs("y = @\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains('@'));
        assert_eq!(errors[0].span, Span::new(4, 5));
    }

    #[test]
    fn lexing_continues_past_bad_characters() {
        let errors = errs("a = $\nb = @\n");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn smart_quotes_suggest_ascii() {
        let errors = errs("s = \u{201c}hi\u{201d}\n");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].suggestion.as_deref(), Some("\""));
    }

    #[test]
    fn bare_bang_suggests_not() {
        let errors = errs("x = !a\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].suggestion.as_deref(), Some("not"));
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(tok(""), vec![Token::Eof]);
        assert_eq!(tok("\n\n"), vec![Token::Eof]);
    }

    #[test]
    fn tabs_count_as_indentation_units() {
        let tokens = tok("if a:\n\tb = 1\n");
        assert!(tokens.contains(&Token::Indent));
    }
}
