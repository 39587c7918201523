use crate::ast::{
    BinOp, Expr, ExprKind, LitKind, Param, Program, Span, Stmt, StmtKind, TypeRef, UnaryOp,
};
use crate::error::CompileError;
use crate::lexer::{SpannedToken, Token};
use crate::suggest;

/// Statement-position keywords offered as spelling suggestions when an
/// identifier appears somewhere no identifier belongs.
const KEYWORDS: &[&str] = &[
    "def", "return", "if", "else", "and", "or", "not", "True", "False", "None",
];

const TYPE_NAMES: &[&str] = &["int", "float", "str", "bool", "list", "dict"];

pub fn parse(tokens: Vec<SpannedToken>) -> Result<Program, Vec<CompileError>> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    errors: Vec<CompileError>,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn parse_program(&mut self) -> Result<Program, Vec<CompileError>> {
        let mut stmts = Vec::new();
        while !self.at_eof() {
            if matches!(self.peek(), Token::Newline) {
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.recover_to_line_start();
                }
            }
        }
        if self.errors.is_empty() {
            Ok(Program { stmts })
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    // ── Statements ───────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        match self.peek() {
            Token::Def => self.parse_function_def(),
            Token::If => self.parse_if(),
            Token::Return => self.parse_return(),
            Token::While => Err(CompileError::parser("'while' loops are not supported", self.span())),
            Token::For => Err(CompileError::parser("'for' loops are not supported", self.span())),
            Token::Class => Err(CompileError::parser("'class' definitions are not supported", self.span())),
            Token::In => Err(CompileError::parser("'in' is only valid inside a 'for' loop, which is not supported", self.span())),
            Token::Elif => Err(CompileError::parser(
                "'elif' is not supported; nest an 'if' inside an 'else' block",
                self.span(),
            )),
            Token::Else => Err(CompileError::parser("'else' without a matching 'if'", self.span())),
            Token::Indent => Err(CompileError::parser("Unexpected indentation", self.span())),
            Token::Ident(_) if matches!(self.peek_ahead(1), Token::Eq) => self.parse_assignment(),
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_assignment(&mut self) -> Result<Stmt, CompileError> {
        let (name, name_span) = self.expect_ident("a name")?;
        self.expect(&Token::Eq, "'='")?;
        let value = self.parse_expression()?;
        self.expect_newline()?;
        let span = name_span.merge(value.span);
        Ok(Stmt {
            kind: StmtKind::Assignment { name, value },
            span,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, CompileError> {
        let kw_span = self.expect(&Token::Return, "'return'")?;
        if matches!(self.peek(), Token::Newline | Token::Eof) {
            self.expect_newline()?;
            return Ok(Stmt {
                kind: StmtKind::Return(None),
                span: kw_span,
            });
        }
        let value = self.parse_expression()?;
        self.expect_newline()?;
        let span = kw_span.merge(value.span);
        Ok(Stmt {
            kind: StmtKind::Return(Some(value)),
            span,
        })
    }

    fn parse_function_def(&mut self) -> Result<Stmt, CompileError> {
        let kw_span = self.expect(&Token::Def, "'def'")?;
        let (name, _) = self.expect_ident("a function name after 'def'")?;
        self.expect(&Token::LParen, "'(' after the function name")?;

        let mut params = Vec::new();
        if !matches!(self.peek(), Token::RParen) {
            loop {
                let (pname, pspan) = self.expect_ident("a parameter name")?;
                let ty = if matches!(self.peek(), Token::Colon) {
                    self.advance();
                    Some(self.expect_type("a type after ':'")?)
                } else {
                    None
                };
                params.push(Param {
                    name: pname,
                    ty,
                    span: pspan,
                });
                if matches!(self.peek(), Token::Comma) {
                    self.advance();
                    if matches!(self.peek(), Token::RParen) {
                        return Err(CompileError::parser(
                            "Expected a parameter after ','",
                            self.span(),
                        ));
                    }
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')' after the parameter list")?;

        let return_type = if matches!(self.peek(), Token::Arrow) {
            self.advance();
            Some(self.expect_type("a return type after '->'")?)
        } else {
            None
        };

        let colon_span = self.expect(&Token::Colon, "':' after the function signature")?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::FunctionDef {
                name,
                params,
                return_type,
                body,
            },
            span: kw_span.merge(colon_span),
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, CompileError> {
        let kw_span = self.expect(&Token::If, "'if'")?;
        let condition = self.parse_expression()?;
        let colon_span = self.expect(&Token::Colon, "':' after the if condition")?;
        let then_body = self.parse_block()?;

        if matches!(self.peek(), Token::Elif) {
            return Err(CompileError::parser(
                "'elif' is not supported; nest an 'if' inside an 'else' block",
                self.span(),
            ));
        }
        let else_body = if matches!(self.peek(), Token::Else) {
            self.advance();
            self.expect(&Token::Colon, "':' after 'else'")?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_body,
                else_body,
            },
            span: kw_span.merge(colon_span),
        })
    }

    fn parse_expr_statement(&mut self) -> Result<Stmt, CompileError> {
        let expr = self.parse_expression()?;
        if let Err(mut err) = self.expect_newline() {
            // A lone identifier followed by more tokens is usually a
            // misspelled statement keyword, e.g. `retrun x`.
            if err.suggestion.is_none() {
                if let ExprKind::Identifier(name) = &expr.kind {
                    err.suggestion = suggest::closest(name, KEYWORDS.iter().copied());
                }
            }
            return Err(err);
        }
        let span = expr.span;
        Ok(Stmt {
            kind: StmtKind::Expression(expr),
            span,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, CompileError> {
        self.expect(&Token::Newline, "a newline before the indented block")?;
        self.expect(&Token::Indent, "an indented block")?;
        let mut stmts = Vec::new();
        while !matches!(self.peek(), Token::Dedent | Token::Eof) {
            if matches!(self.peek(), Token::Newline) {
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.recover_to_line_start();
                }
            }
        }
        self.expect(&Token::Dedent, "end of the indented block")?;
        Ok(stmts)
    }

    /// Skip to the start of the next statement at the current nesting depth.
    /// An indented block immediately after the skipped line belongs to the
    /// failed statement and is skipped with it.
    fn recover_to_line_start(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Token::Eof => return,
                Token::Indent => {
                    depth += 1;
                    self.advance();
                }
                Token::Dedent => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                Token::Newline => {
                    self.advance();
                    if depth == 0 && !matches!(self.peek(), Token::Indent) {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Expressions ──────────────────────────────────────────────

    fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        self.parse_binary(0)
    }

    /// Precedence climbing. Operators bind tighter as the level rises; all
    /// binary operators are left-associative.
    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr, CompileError> {
        let mut left = self.parse_unary()?;
        loop {
            let Some((op, bp)) = binary_op(self.peek()) else {
                break;
            };
            if bp <= min_bp {
                break;
            }
            self.advance();
            let right = self.parse_binary(bp)?;
            let span = left.span.merge(right.span);
            left = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Not => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let op_span = self.span();
        self.advance();
        let operand = self.parse_unary()?;
        let span = op_span.merge(operand.span);
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let span = self.span();
        let token = self.peek().clone();
        match token {
            Token::Number(raw) => {
                self.advance();
                Ok(literal(LitKind::Number, raw, span))
            }
            Token::Str(value) => {
                self.advance();
                Ok(literal(LitKind::Str, value, span))
            }
            Token::True => {
                self.advance();
                Ok(literal(LitKind::Bool, "True".to_string(), span))
            }
            Token::False => {
                self.advance();
                Ok(literal(LitKind::Bool, "False".to_string(), span))
            }
            Token::None => {
                self.advance();
                Ok(literal(LitKind::None, "None".to_string(), span))
            }
            Token::Ident(name) => {
                self.advance();
                if matches!(self.peek(), Token::LParen) {
                    self.parse_call(name, span)
                } else {
                    Ok(Expr {
                        kind: ExprKind::Identifier(name),
                        span,
                    })
                }
            }
            // Type names double as conversion functions: int("5"), str(x).
            Token::TypeName(t) => {
                self.advance();
                if matches!(self.peek(), Token::LParen) {
                    self.parse_call(t.name().to_string(), span)
                } else {
                    Err(CompileError::parser(
                        format!("Expected an expression, got type name '{}'", t.name()),
                        span,
                    ))
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let close = self.expect(&Token::RParen, "')' to close the parenthesized expression")?;
                Ok(Expr {
                    kind: ExprKind::Grouping(Box::new(inner)),
                    span: span.merge(close),
                })
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_call(&mut self, name: String, name_span: Span) -> Result<Expr, CompileError> {
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if matches!(self.peek(), Token::Comma) {
                    self.advance();
                    if matches!(self.peek(), Token::RParen) {
                        return Err(CompileError::parser(
                            "Expected an argument after ','",
                            self.span(),
                        ));
                    }
                } else {
                    break;
                }
            }
        }
        let close = self.expect(&Token::RParen, "')' after the arguments")?;
        Ok(Expr {
            kind: ExprKind::Call { name, args },
            span: name_span.merge(close),
        })
    }

    // ── Token helpers ────────────────────────────────────────────

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map_or(&Token::Eof, |t| &t.token)
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).map_or(&Token::Eof, |t| &t.token)
    }

    fn span(&self) -> Span {
        self.tokens.get(self.pos).map_or_else(
            || self.tokens.last().map_or(Span::new(0, 0), |t| t.span),
            |t| t.span,
        )
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn advance(&mut self) -> SpannedToken {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(SpannedToken {
            token: Token::Eof,
            span: Span::new(0, 0),
        });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<Span, CompileError> {
        if self.peek() == expected {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span), CompileError> {
        if let Token::Ident(name) = self.peek() {
            let name = name.clone();
            let span = self.span();
            self.advance();
            Ok((name, span))
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_type(&mut self, what: &str) -> Result<TypeRef, CompileError> {
        match self.peek() {
            Token::TypeName(t) => {
                let t = *t;
                self.advance();
                Ok(t)
            }
            Token::Ident(name) => {
                let mut err = CompileError::parser(
                    format!("Unknown type '{name}'; expected one of int, float, str, bool, list, dict"),
                    self.span(),
                );
                if let Some(s) = suggest::closest(name, TYPE_NAMES.iter().copied()) {
                    err = err.with_suggestion(s);
                }
                Err(err)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_newline(&mut self) -> Result<(), CompileError> {
        match self.peek() {
            Token::Newline => {
                self.advance();
                Ok(())
            }
            // The lexer guarantees a trailing newline; tolerate its absence
            // anyway so the parser never depends on it.
            Token::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn unexpected(&self, what: &str) -> CompileError {
        let found = self.peek();
        let mut err = CompileError::parser(
            format!("Expected {what}, got {}", found.describe()),
            self.span(),
        );
        if let Some(s) = keyword_suggestion(found) {
            err = err.with_suggestion(s);
        }
        err
    }
}

fn literal(kind: LitKind, raw: String, span: Span) -> Expr {
    Expr {
        kind: ExprKind::Literal { kind, raw },
        span,
    }
}

/// Binding power per binary operator. Higher binds tighter.
fn binary_op(token: &Token) -> Option<(BinOp, u8)> {
    let entry = match token {
        Token::Or => (BinOp::Or, 1),
        Token::And => (BinOp::And, 2),
        Token::EqEq => (BinOp::Eq, 3),
        Token::Ne => (BinOp::Ne, 3),
        Token::Lt => (BinOp::Lt, 4),
        Token::Le => (BinOp::Le, 4),
        Token::Gt => (BinOp::Gt, 4),
        Token::Ge => (BinOp::Ge, 4),
        Token::Plus => (BinOp::Add, 5),
        Token::Minus => (BinOp::Sub, 5),
        Token::Star => (BinOp::Mul, 6),
        Token::Slash => (BinOp::Div, 6),
        Token::Percent => (BinOp::Mod, 6),
        _ => return None,
    };
    Some(entry)
}

fn keyword_suggestion(found: &Token) -> Option<String> {
    match found {
        // `if x = 5:` and friends: almost always a mistyped comparison
        Token::Eq => Some("==".to_string()),
        Token::Ident(name) => suggest::closest(name, KEYWORDS.iter().copied()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ast::TypeRef;
    use crate::lexer::lex;

    fn parse_str(src: &str) -> Program {
        parse(lex(src).unwrap()).unwrap()
    }

    fn parse_errs(src: &str) -> Vec<CompileError> {
        parse(lex(src).unwrap()).unwrap_err()
    }

    /// Strip a grouping node; assertions on shape don't care about parens.
    fn ungroup(expr: &Expr) -> &Expr {
        match &expr.kind {
            ExprKind::Grouping(inner) => ungroup(inner),
            _ => expr,
        }
    }

    fn binary_parts(expr: &Expr) -> (BinOp, &Expr, &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, left, right } => (*op, left, right),
            other => panic!("expected a binary expression, got {other:?}"),
        }
    }

    #[test]
    fn assignment_statement() {
        let program = parse_str("x = 5\n");
        assert_eq!(program.stmts.len(), 1);
        let StmtKind::Assignment { name, value } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        assert_eq!(name, "x");
        assert!(matches!(
            &value.kind,
            ExprKind::Literal { kind: LitKind::Number, raw } if raw == "5"
        ));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse_str("y = 1 + 2 * 3\n");
        let StmtKind::Assignment { value, .. } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        let (op, left, right) = binary_parts(value);
        assert_eq!(op, BinOp::Add);
        assert!(matches!(&left.kind, ExprKind::Literal { raw, .. } if raw == "1"));
        let (op, _, _) = binary_parts(right);
        assert_eq!(op, BinOp::Mul);
    }

    #[test]
    fn same_level_operators_are_left_associative() {
        let program = parse_str("y = 1 - 2 - 3\n");
        let StmtKind::Assignment { value, .. } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        let (op, left, right) = binary_parts(value);
        assert_eq!(op, BinOp::Sub);
        assert!(matches!(&right.kind, ExprKind::Literal { raw, .. } if raw == "3"));
        let (op, _, _) = binary_parts(left);
        assert_eq!(op, BinOp::Sub);
    }

    #[test]
    fn comparison_binds_tighter_than_equality() {
        let program = parse_str("b = x < y == z\n");
        let StmtKind::Assignment { value, .. } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        let (op, left, _) = binary_parts(value);
        assert_eq!(op, BinOp::Eq);
        let (op, _, _) = binary_parts(left);
        assert_eq!(op, BinOp::Lt);
    }

    #[test]
    fn boolean_operators_nest_or_around_and() {
        let program = parse_str("z = not a or b and c\n");
        let StmtKind::Assignment { value, .. } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        let (op, left, right) = binary_parts(value);
        assert_eq!(op, BinOp::Or);
        assert!(matches!(&left.kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
        let (op, _, _) = binary_parts(right);
        assert_eq!(op, BinOp::And);
    }

    #[test]
    fn unary_minus_binds_tighter_than_addition() {
        let program = parse_str("y = -a + b\n");
        let StmtKind::Assignment { value, .. } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        let (op, left, _) = binary_parts(value);
        assert_eq!(op, BinOp::Add);
        assert!(matches!(&left.kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn grouping_is_preserved_in_the_tree() {
        let program = parse_str("x = (1 + 2) * 3\n");
        let StmtKind::Assignment { value, .. } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        let (op, left, _) = binary_parts(value);
        assert_eq!(op, BinOp::Mul);
        assert!(matches!(&left.kind, ExprKind::Grouping(_)));
        let (op, _, _) = binary_parts(ungroup(left));
        assert_eq!(op, BinOp::Add);
    }

    #[test]
    fn call_with_arguments() {
        let program = parse_str("f(1, x, \"s\")\n");
        let StmtKind::Expression(expr) = &program.stmts[0].kind else {
            panic!("expected an expression statement");
        };
        let ExprKind::Call { name, args } = &expr.kind else {
            panic!("expected a call");
        };
        assert_eq!(name, "f");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn conversion_call_uses_the_type_name() {
        let program = parse_str("x = int(\"5\")\n");
        let StmtKind::Assignment { value, .. } = &program.stmts[0].kind else {
            panic!("expected an assignment");
        };
        let ExprKind::Call { name, args } = &value.kind else {
            panic!("expected a call");
        };
        assert_eq!(name, "int");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn function_def_with_annotations() {
        let program = parse_str("def f(a: int, b) -> str:\n    return \"x\"\n");
        let StmtKind::FunctionDef {
            name,
            params,
            return_type,
            body,
        } = &program.stmts[0].kind
        else {
            panic!("expected a function definition");
        };
        assert_eq!(name, "f");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].ty, Some(TypeRef::Int));
        assert_eq!(params[1].ty, None);
        assert_eq!(*return_type, Some(TypeRef::Str));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn bare_return() {
        let program = parse_str("def f():\n    return\n");
        let StmtKind::FunctionDef { body, .. } = &program.stmts[0].kind else {
            panic!("expected a function definition");
        };
        assert!(matches!(body[0].kind, StmtKind::Return(None)));
    }

    #[test]
    fn if_else_blocks() {
        let program = parse_str("if a < b:\n    x = 1\nelse:\n    x = 2\n");
        let StmtKind::If {
            then_body,
            else_body,
            ..
        } = &program.stmts[0].kind
        else {
            panic!("expected an if statement");
        };
        assert_eq!(then_body.len(), 1);
        assert_eq!(else_body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn nested_function_defs_parse() {
        let program = parse_str("def outer():\n    def inner():\n        return 1\n    return 2\n");
        let StmtKind::FunctionDef { body, .. } = &program.stmts[0].kind else {
            panic!("expected a function definition");
        };
        assert_eq!(body.len(), 2);
        assert!(matches!(body[0].kind, StmtKind::FunctionDef { .. }));
    }

    #[test]
    fn missing_colon_after_if() {
        let errors = parse_errs("if a\n    x = 1\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Expected ':' after the if condition"));
    }

    #[test]
    fn assignment_in_condition_suggests_comparison() {
        let errors = parse_errs("if x = 5:\n    y = 1\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].suggestion.as_deref(), Some("=="));
    }

    #[test]
    fn misspelled_keyword_statement_gets_a_suggestion() {
        let errors = parse_errs("retrun x\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].suggestion.as_deref(), Some("return"));
    }

    #[test]
    fn unknown_annotation_type_gets_a_suggestion() {
        let errors = parse_errs("def f(a: strr):\n    return a\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unknown type 'strr'"));
        assert_eq!(errors[0].suggestion.as_deref(), Some("str"));
    }

    #[test]
    fn trailing_comma_in_params() {
        let errors = parse_errs("def f(a,):\n    return a\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Expected a parameter after ','"));
    }

    #[test]
    fn trailing_comma_in_arguments() {
        let errors = parse_errs("f(1,)\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Expected an argument after ','"));
    }

    #[test]
    fn while_loop_is_rejected_with_a_clear_message() {
        let errors = parse_errs("while x:\n    y = 1\nz = 2\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'while' loops are not supported"));
    }

    #[test]
    fn elif_is_rejected_once() {
        let errors = parse_errs("if a:\n    x = 1\nelif b:\n    x = 2\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'elif' is not supported"));
    }

    #[test]
    fn orphan_else() {
        let errors = parse_errs("else:\n    x = 1\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'else' without a matching 'if'"));
    }

    #[test]
    fn unexpected_indentation() {
        let errors = parse_errs("x = 1\n    y = 2\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unexpected indentation"));
    }

    #[test]
    fn recovery_reports_one_error_per_bad_line() {
        let errors = parse_errs("x = = 1\ny = ) 2\nz = 3\n");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn recovery_inside_a_block_keeps_later_statements() {
        let program = parse_errs("def f():\n    x = = 1\n    y = 2\nz = 3\n");
        // One error for the bad line; y and z still parse, so no cascade.
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn missing_block_body() {
        let errors = parse_errs("def f():\nx = 1\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Expected an indented block"));
    }

    #[test]
    fn empty_source_parses_to_an_empty_program() {
        assert!(parse_str("").stmts.is_empty());
        assert!(parse_str("# only a comment\n").stmts.is_empty());
    }
}
