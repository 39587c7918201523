use crate::ast::{BinOp, LitKind, UnaryOp};
use crate::builtins::{self, EmitForm};
use crate::resolver::{TypedExpr, TypedExprKind, TypedProgram, TypedStmt, TypedStmtKind};

/// Render a resolved program as TypeScript. Infallible: anything that could
/// go wrong was reported by an earlier stage.
pub fn emit(program: &TypedProgram) -> String {
    let mut emitter = Emitter {
        out: String::new(),
        indent: 0,
    };
    for stmt in &program.stmts {
        emitter.emit_stmt(stmt);
    }
    emitter.out
}

struct Emitter {
    out: String,
    indent: usize,
}

impl Emitter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn emit_stmt(&mut self, stmt: &TypedStmt) {
        match &stmt.kind {
            TypedStmtKind::Expression(expr) => {
                let expr = render_expr(expr);
                self.line(&format!("{expr};"));
            }
            TypedStmtKind::Assignment {
                name,
                value,
                first_binding,
            } => {
                let value = render_expr(value);
                if *first_binding {
                    self.line(&format!("let {name} = {value};"));
                } else {
                    self.line(&format!("{name} = {value};"));
                }
            }
            TypedStmtKind::Return(value) => match value {
                Some(value) => {
                    let value = render_expr(value);
                    self.line(&format!("return {value};"));
                }
                None => self.line("return;"),
            },
            TypedStmtKind::FunctionDef {
                name,
                params,
                ret,
                body,
            } => {
                let params: Vec<String> = params
                    .iter()
                    .map(|(pname, pty)| format!("{pname}: {}", pty.ts_name()))
                    .collect();
                self.line(&format!(
                    "function {name}({}): {} {{",
                    params.join(", "),
                    ret.ts_name()
                ));
                self.indent += 1;
                for stmt in body {
                    self.emit_stmt(stmt);
                }
                self.indent -= 1;
                self.line("}");
            }
            TypedStmtKind::If {
                condition,
                then_body,
                else_body,
            } => {
                let condition = render_expr(condition);
                self.line(&format!("if ({condition}) {{"));
                self.indent += 1;
                for stmt in then_body {
                    self.emit_stmt(stmt);
                }
                self.indent -= 1;
                match else_body {
                    Some(body) => {
                        self.line("} else {");
                        self.indent += 1;
                        for stmt in body {
                            self.emit_stmt(stmt);
                        }
                        self.indent -= 1;
                        self.line("}");
                    }
                    None => self.line("}"),
                }
            }
        }
    }
}

fn render_expr(expr: &TypedExpr) -> String {
    match &expr.kind {
        TypedExprKind::Literal { kind, raw } => render_literal(*kind, raw),
        TypedExprKind::Var(name) => name.clone(),
        TypedExprKind::Binary { op, left, right } => format!(
            "{} {} {}",
            render_expr(left),
            binop_ts(*op),
            render_expr(right)
        ),
        TypedExprKind::Unary { op, operand } => {
            let rendered = render_expr(operand);
            match op {
                UnaryOp::Neg => {
                    // A doubled minus would read as a decrement operator.
                    if matches!(
                        operand.kind,
                        TypedExprKind::Unary {
                            op: UnaryOp::Neg,
                            ..
                        }
                    ) {
                        format!("-({rendered})")
                    } else {
                        format!("-{rendered}")
                    }
                }
                UnaryOp::Not => format!("!{rendered}"),
            }
        }
        TypedExprKind::Grouping(inner) => format!("({})", render_expr(inner)),
        TypedExprKind::Call { name, args } => render_call(name, args),
    }
}

fn render_call(name: &str, args: &[TypedExpr]) -> String {
    let rendered: Vec<String> = args.iter().map(render_expr).collect();
    match builtins::lookup_builtin(name).map(|b| &b.emit) {
        Some(EmitForm::Call(target)) => format!("{target}({})", rendered.join(", ")),
        Some(EmitForm::Member(member)) => match args.first() {
            Some(receiver) => {
                let rendered = render_expr(receiver);
                if member_receiver_needs_parens(receiver) {
                    format!("({rendered}).{member}")
                } else {
                    format!("{rendered}.{member}")
                }
            }
            None => format!("{name}()"),
        },
        None => format!("{name}({})", rendered.join(", ")),
    }
}

/// `1 + 2.length` and `5.length` do not mean what the source meant;
/// such receivers get wrapped.
fn member_receiver_needs_parens(expr: &TypedExpr) -> bool {
    matches!(
        expr.kind,
        TypedExprKind::Binary { .. }
            | TypedExprKind::Unary { .. }
            | TypedExprKind::Literal {
                kind: LitKind::Number,
                ..
            }
    )
}

fn render_literal(kind: LitKind, raw: &str) -> String {
    match kind {
        // Numbers re-print their source lexeme untouched.
        LitKind::Number => raw.to_string(),
        LitKind::Str => format!("\"{}\"", escape_ts(raw)),
        LitKind::Bool => {
            if raw == "True" {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        LitKind::None => "null".to_string(),
    }
}

fn escape_ts(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn binop_ts(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "===",
        BinOp::Ne => "!==",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}
