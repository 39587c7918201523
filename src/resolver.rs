use indexmap::IndexMap;

use crate::ast::{
    BinOp, Expr, ExprKind, LitKind, Param, Program, Span, Stmt, StmtKind, Type, TypeRef, UnaryOp,
};
use crate::builtins;
use crate::error::CompileError;
use crate::suggest;

// ── Typed tree ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TypedProgram {
    pub stmts: Vec<TypedStmt>,
    /// Module-level variable bindings with their final inferred types.
    pub module_bindings: IndexMap<String, Type>,
    /// All functions, in definition order, with finalized signatures.
    pub functions: IndexMap<String, FnSig>,
}

#[derive(Debug, Clone)]
pub struct FnSig {
    pub params: Vec<(String, Type)>,
    pub ret: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedStmt {
    pub kind: TypedStmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedStmtKind {
    Expression(TypedExpr),
    Assignment {
        name: String,
        value: TypedExpr,
        /// True when this statement introduces the variable, which is what
        /// decides between `let x = ...` and plain `x = ...` on output.
        first_binding: bool,
    },
    Return(Option<TypedExpr>),
    FunctionDef {
        name: String,
        params: Vec<(String, Type)>,
        ret: Type,
        body: Vec<TypedStmt>,
    },
    If {
        condition: TypedExpr,
        then_body: Vec<TypedStmt>,
        else_body: Option<Vec<TypedStmt>>,
    },
}

#[derive(Debug, Clone)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedExprKind {
    Literal { kind: LitKind, raw: String },
    Var(String),
    Binary {
        op: BinOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Grouping(Box<TypedExpr>),
    Call { name: String, args: Vec<TypedExpr> },
}

pub fn resolve(program: &Program) -> Result<TypedProgram, Vec<CompileError>> {
    let mut resolver = Resolver::new();
    resolver.resolve_program(program)
}

// ── Resolver ─────────────────────────────────────────────────────

struct Resolver {
    functions: IndexMap<String, FnSig>,
    /// Lexical scopes, innermost last. The first entry is the module scope.
    scopes: Vec<IndexMap<String, Type>>,
    fn_depth: usize,
    /// Return sites of the function currently being resolved. `None` marks
    /// a bare `return`.
    returns: Vec<(Option<Type>, Span)>,
    /// Declared return type of the current function; Unknown when absent.
    current_ret: Type,
    errors: Vec<CompileError>,
}

impl Resolver {
    fn new() -> Self {
        Self {
            functions: IndexMap::new(),
            scopes: vec![IndexMap::new()],
            fn_depth: 0,
            returns: Vec::new(),
            current_ret: Type::Unknown,
            errors: Vec::new(),
        }
    }

    fn resolve_program(&mut self, program: &Program) -> Result<TypedProgram, Vec<CompileError>> {
        // Pass 1: register every function signature so calls may appear
        // before the definition they refer to.
        self.register_functions(&program.stmts);
        // Pass 2: resolve statements in order.
        let stmts: Vec<TypedStmt> = program.stmts.iter().map(|s| self.resolve_stmt(s)).collect();

        if self.errors.is_empty() {
            let module_bindings = self.scopes.pop().unwrap_or_default();
            Ok(TypedProgram {
                stmts,
                module_bindings,
                functions: std::mem::take(&mut self.functions),
            })
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    /// Collect function signatures from annotations, recursing into nested
    /// definitions and branch bodies. Everything lands in one module-wide
    /// registry.
    fn register_functions(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::FunctionDef {
                    name,
                    params,
                    return_type,
                    body,
                } => {
                    if self.functions.contains_key(name)
                        || builtins::lookup_builtin(name).is_some()
                    {
                        self.errors.push(CompileError::semantic(
                            format!("function '{name}' is already defined"),
                            stmt.span,
                        ));
                    } else {
                        self.functions.insert(
                            name.clone(),
                            FnSig {
                                params: annotated_params(params),
                                ret: return_type.map_or(Type::Unknown, TypeRef::ty),
                                span: stmt.span,
                            },
                        );
                    }
                    self.register_functions(body);
                }
                StmtKind::If {
                    then_body,
                    else_body,
                    ..
                } => {
                    self.register_functions(then_body);
                    if let Some(body) = else_body {
                        self.register_functions(body);
                    }
                }
                _ => {}
            }
        }
    }

    // ── Statements ───────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) -> TypedStmt {
        let kind = match &stmt.kind {
            StmtKind::Expression(expr) => TypedStmtKind::Expression(self.resolve_expr(expr)),
            StmtKind::Assignment { name, value } => self.resolve_assignment(name, value, stmt.span),
            StmtKind::Return(value) => self.resolve_return(value.as_ref(), stmt.span),
            StmtKind::FunctionDef {
                name,
                params,
                return_type,
                body,
            } => self.resolve_function_def(name, params, return_type.as_ref(), body, stmt.span),
            StmtKind::If {
                condition,
                then_body,
                else_body,
            } => self.resolve_if(condition, then_body, else_body.as_deref()),
        };
        TypedStmt {
            kind,
            span: stmt.span,
        }
    }

    fn resolve_assignment(&mut self, name: &str, value: &Expr, span: Span) -> TypedStmtKind {
        let value = self.resolve_expr(value);

        if self.functions.contains_key(name) || builtins::lookup_builtin(name).is_some() {
            self.errors.push(CompileError::semantic(
                format!("'{name}' is already defined as a function"),
                span,
            ));
            return TypedStmtKind::Assignment {
                name: name.to_string(),
                value,
                first_binding: false,
            };
        }

        // Assignment targets the innermost scope: a function-body assignment
        // to a module-level name introduces a local that shadows it, it does
        // not rebind the outer variable.
        let first_binding = match self.lookup_local(name) {
            Some(existing) => {
                if existing == Type::Unknown {
                    if value.ty != Type::Unknown {
                        self.set_var(name, value.ty);
                    }
                } else if value.ty != Type::Unknown && value.ty != existing {
                    // The binding keeps its original type.
                    self.errors.push(CompileError::semantic(
                        format!(
                            "type mismatch for '{name}': expected {existing}, got {}",
                            value.ty
                        ),
                        span,
                    ));
                }
                false
            }
            None => {
                self.bind_var(name, value.ty);
                true
            }
        };

        TypedStmtKind::Assignment {
            name: name.to_string(),
            value,
            first_binding,
        }
    }

    fn resolve_return(&mut self, value: Option<&Expr>, span: Span) -> TypedStmtKind {
        if self.fn_depth == 0 {
            self.errors.push(CompileError::semantic(
                "'return' outside of a function",
                span,
            ));
        }
        let typed = value.map(|v| {
            let mut typed = self.resolve_expr(v);
            // A declared return type pins down otherwise-unknown values.
            if self.current_ret != Type::Unknown {
                self.refine(&mut typed, self.current_ret);
            }
            typed
        });
        if self.fn_depth > 0 {
            self.returns.push((typed.as_ref().map(|t| t.ty), span));
        }
        TypedStmtKind::Return(typed)
    }

    fn resolve_if(
        &mut self,
        condition: &Expr,
        then_body: &[Stmt],
        else_body: Option<&[Stmt]>,
    ) -> TypedStmtKind {
        let mut condition = self.resolve_expr(condition);
        self.refine(&mut condition, Type::Boolean);
        if condition.ty != Type::Boolean && condition.ty != Type::Unknown {
            self.errors.push(CompileError::semantic(
                format!("'if' condition must be boolean, got {}", condition.ty),
                condition.span,
            ));
        }
        // Branches share the enclosing scope, as in the source language.
        let then_body = then_body.iter().map(|s| self.resolve_stmt(s)).collect();
        let else_body =
            else_body.map(|body| body.iter().map(|s| self.resolve_stmt(s)).collect());
        TypedStmtKind::If {
            condition,
            then_body,
            else_body,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn resolve_function_def(
        &mut self,
        name: &str,
        params: &[Param],
        return_type: Option<&TypeRef>,
        body: &[Stmt],
        span: Span,
    ) -> TypedStmtKind {
        let mut param_types = annotated_params(params);
        let mut seen = IndexMap::new();
        for param in params {
            if seen.insert(param.name.clone(), ()).is_some() {
                self.errors.push(CompileError::semantic(
                    format!("duplicate parameter '{}'", param.name),
                    param.span,
                ));
            }
        }

        let annotated = return_type.map(|t| t.ty());
        let prev_returns = std::mem::take(&mut self.returns);
        let prev_ret = self.current_ret;
        self.current_ret = annotated.unwrap_or(Type::Unknown);
        self.fn_depth += 1;
        self.scopes.push(IndexMap::new());
        for (pname, pty) in &param_types {
            self.bind_var(pname, *pty);
        }

        let typed_body: Vec<TypedStmt> = body.iter().map(|s| self.resolve_stmt(s)).collect();

        // Read back parameter types refined by how the body used them.
        let fn_scope = self.scopes.pop().unwrap_or_default();
        for (pname, pty) in &mut param_types {
            if let Some(refined) = fn_scope.get(pname) {
                *pty = *refined;
            }
        }
        self.fn_depth -= 1;
        self.current_ret = prev_ret;
        let returns = std::mem::replace(&mut self.returns, prev_returns);

        let ret = self.finalize_return_type(name, annotated, &returns, span);
        self.finalize_params(name, params, &param_types);
        if ret == Type::Unknown {
            self.errors.push(
                CompileError::semantic(
                    format!("cannot infer the return type of function '{name}'"),
                    span,
                )
                .with_suggestion("add a return annotation like '-> int'"),
            );
        }

        // Refresh the registry entry so later calls see the refined
        // signature. Skipped when this definition lost a duplicate-name
        // race and was never registered.
        if self.functions.get(name).is_some_and(|sig| sig.span == span) {
            self.functions.insert(
                name.to_string(),
                FnSig {
                    params: param_types.clone(),
                    ret,
                    span,
                },
            );
        }

        TypedStmtKind::FunctionDef {
            name: name.to_string(),
            params: param_types,
            ret,
            body: typed_body,
        }
    }

    fn finalize_return_type(
        &mut self,
        name: &str,
        annotated: Option<Type>,
        returns: &[(Option<Type>, Span)],
        span: Span,
    ) -> Type {
        if let Some(expected) = annotated {
            for (ty, ret_span) in returns {
                match ty {
                    Some(t) if *t != Type::Unknown && *t != expected => {
                        self.errors.push(CompileError::semantic(
                            format!(
                                "return type mismatch for '{name}': expected {expected}, got {t}"
                            ),
                            *ret_span,
                        ));
                    }
                    None => {
                        self.errors.push(CompileError::semantic(
                            format!(
                                "return type mismatch for '{name}': expected {expected}, got no value"
                            ),
                            *ret_span,
                        ));
                    }
                    _ => {}
                }
            }
            if returns.is_empty() {
                self.errors.push(CompileError::semantic(
                    format!(
                        "function '{name}' is declared to return {expected} but never returns a value"
                    ),
                    span,
                ));
            }
            return expected;
        }

        let valued: Vec<(Type, Span)> = returns
            .iter()
            .filter_map(|(t, sp)| t.map(|t| (t, *sp)))
            .collect();
        let bare: Vec<Span> = returns
            .iter()
            .filter(|(t, _)| t.is_none())
            .map(|(_, sp)| *sp)
            .collect();
        let known: Vec<(Type, Span)> = valued
            .iter()
            .filter(|(t, _)| *t != Type::Unknown)
            .copied()
            .collect();

        if let Some((first, _)) = known.first() {
            if let Some((other, other_span)) = known.iter().find(|(t, _)| t != first) {
                self.errors.push(CompileError::semantic(
                    format!("inconsistent return types in function '{name}': {first} and {other}"),
                    *other_span,
                ));
            } else if let Some(bare_span) = bare.first() {
                self.errors.push(CompileError::semantic(
                    format!(
                        "inconsistent return types in function '{name}': some returns have a value and some do not"
                    ),
                    *bare_span,
                ));
            }
            *first
        } else if valued.is_empty() {
            // Only bare returns, or no returns at all.
            Type::Void
        } else {
            // Every returned value is still unknown; reported by the caller.
            Type::Unknown
        }
    }

    fn finalize_params(&mut self, name: &str, params: &[Param], param_types: &[(String, Type)]) {
        for (param, (pname, pty)) in params.iter().zip(param_types) {
            if *pty == Type::Unknown {
                self.errors.push(
                    CompileError::semantic(
                        format!("cannot infer a type for parameter '{pname}' of function '{name}'"),
                        param.span,
                    )
                    .with_suggestion(format!("add an annotation like '{pname}: int'")),
                );
            }
        }
    }

    // ── Expressions ──────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) -> TypedExpr {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal { kind, raw } => TypedExpr {
                ty: literal_type(*kind),
                kind: TypedExprKind::Literal {
                    kind: *kind,
                    raw: raw.clone(),
                },
                span,
            },
            ExprKind::Identifier(name) => self.resolve_identifier(name, span),
            ExprKind::Grouping(inner) => {
                let inner = self.resolve_expr(inner);
                TypedExpr {
                    ty: inner.ty,
                    kind: TypedExprKind::Grouping(Box::new(inner)),
                    span,
                }
            }
            ExprKind::Unary { op, operand } => self.resolve_unary(*op, operand, span),
            ExprKind::Binary { op, left, right } => self.resolve_binary(*op, left, right, span),
            ExprKind::Call { name, args } => self.resolve_call(name, args, span),
        }
    }

    fn resolve_identifier(&mut self, name: &str, span: Span) -> TypedExpr {
        let ty = if let Some(ty) = self.lookup_var(name) {
            ty
        } else if self.functions.contains_key(name) || builtins::lookup_builtin(name).is_some() {
            self.errors.push(CompileError::semantic(
                format!("'{name}' is a function and cannot be used as a value"),
                span,
            ));
            Type::Unknown
        } else {
            let mut err =
                CompileError::semantic(format!("undefined name '{name}'"), span);
            if let Some(s) = self.closest_visible(name) {
                err = err.with_suggestion(s);
            }
            self.errors.push(err);
            Type::Unknown
        };
        TypedExpr {
            kind: TypedExprKind::Var(name.to_string()),
            ty,
            span,
        }
    }

    fn resolve_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> TypedExpr {
        let mut operand = self.resolve_expr(operand);
        let ty = match op {
            UnaryOp::Neg => {
                self.refine(&mut operand, Type::Number);
                if operand.ty != Type::Number && operand.ty != Type::Unknown {
                    self.errors.push(CompileError::semantic(
                        format!("operator '-' requires a number operand, got {}", operand.ty),
                        span,
                    ));
                }
                Type::Number
            }
            UnaryOp::Not => {
                self.refine(&mut operand, Type::Boolean);
                if operand.ty != Type::Boolean && operand.ty != Type::Unknown {
                    self.errors.push(CompileError::semantic(
                        format!(
                            "operator 'not' requires a boolean operand, got {}",
                            operand.ty
                        ),
                        span,
                    ));
                }
                Type::Boolean
            }
        };
        TypedExpr {
            kind: TypedExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
            span,
        }
    }

    fn resolve_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> TypedExpr {
        let mut left = self.resolve_expr(left);
        let mut right = self.resolve_expr(right);

        let ty = match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                self.refine(&mut left, Type::Number);
                self.refine(&mut right, Type::Number);
                let bad = |t: Type| t != Type::Number && t != Type::Unknown;
                if bad(left.ty) || bad(right.ty) {
                    self.errors.push(CompileError::semantic(
                        format!(
                            "operator '{op}' requires number operands, got {} and {}",
                            left.ty, right.ty
                        ),
                        span,
                    ));
                }
                Type::Number
            }
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                if left.ty == Type::Unknown && right.ty != Type::Unknown {
                    self.refine(&mut left, right.ty);
                } else if right.ty == Type::Unknown && left.ty != Type::Unknown {
                    self.refine(&mut right, left.ty);
                }
                if left.ty != Type::Unknown
                    && right.ty != Type::Unknown
                    && left.ty != right.ty
                {
                    self.errors.push(CompileError::semantic(
                        format!(
                            "operator '{op}' requires matching operand types, got {} and {}",
                            left.ty, right.ty
                        ),
                        span,
                    ));
                }
                Type::Boolean
            }
            BinOp::And | BinOp::Or => {
                self.refine(&mut left, Type::Boolean);
                self.refine(&mut right, Type::Boolean);
                let bad = |t: Type| t != Type::Boolean && t != Type::Unknown;
                if bad(left.ty) || bad(right.ty) {
                    self.errors.push(CompileError::semantic(
                        format!(
                            "operator '{op}' requires boolean operands, got {} and {}",
                            left.ty, right.ty
                        ),
                        span,
                    ));
                }
                Type::Boolean
            }
        };

        TypedExpr {
            kind: TypedExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            span,
        }
    }

    fn resolve_call(&mut self, name: &str, args: &[Expr], span: Span) -> TypedExpr {
        let mut typed_args: Vec<TypedExpr> = args.iter().map(|a| self.resolve_expr(a)).collect();

        let ty = if let Some(builtin) = builtins::lookup_builtin(name) {
            let expected: Vec<Option<Type>> =
                builtin.params.iter().map(|(_, ty)| *ty).collect();
            self.check_call_args(name, &expected, &mut typed_args, span);
            builtin.ret
        } else if let Some(sig) = self.functions.get(name).cloned() {
            let expected: Vec<Option<Type>> = sig
                .params
                .iter()
                .map(|(_, ty)| (*ty != Type::Unknown).then_some(*ty))
                .collect();
            self.check_call_args(name, &expected, &mut typed_args, span);
            sig.ret
        } else if self.lookup_var(name).is_some() {
            self.errors.push(CompileError::semantic(
                format!("'{name}' is not a function"),
                span,
            ));
            Type::Unknown
        } else {
            let mut err =
                CompileError::semantic(format!("undefined function '{name}'"), span);
            if let Some(s) = self.closest_callable(name) {
                err = err.with_suggestion(s);
            }
            self.errors.push(err);
            Type::Unknown
        };

        TypedExpr {
            kind: TypedExprKind::Call {
                name: name.to_string(),
                args: typed_args,
            },
            ty,
            span,
        }
    }

    /// Arity and per-argument type checks shared by builtin and user calls.
    /// A `None` expectation accepts any argument type.
    fn check_call_args(
        &mut self,
        name: &str,
        expected: &[Option<Type>],
        args: &mut [TypedExpr],
        span: Span,
    ) {
        if expected.len() != args.len() {
            let noun = if expected.len() == 1 { "argument" } else { "arguments" };
            let verb = if args.len() == 1 { "was" } else { "were" };
            self.errors.push(CompileError::semantic(
                format!(
                    "'{name}' takes {} {noun} but {} {verb} given",
                    expected.len(),
                    args.len()
                ),
                span,
            ));
            return;
        }
        for (i, (arg, want)) in args.iter_mut().zip(expected).enumerate() {
            let Some(want) = want else { continue };
            self.refine(arg, *want);
            if arg.ty != *want && arg.ty != Type::Unknown {
                self.errors.push(CompileError::semantic(
                    format!(
                        "argument {} of '{name}' expects {want}, got {}",
                        i + 1,
                        arg.ty
                    ),
                    arg.span,
                ));
            }
        }
    }

    // ── Scope and refinement helpers ─────────────────────────────

    fn lookup_var(&self, name: &str) -> Option<Type> {
        self.scopes.iter().rev().find_map(|s| s.get(name).copied())
    }

    /// Look `name` up in the innermost scope only.
    fn lookup_local(&self, name: &str) -> Option<Type> {
        self.scopes.last().and_then(|s| s.get(name).copied())
    }

    /// Overwrite the nearest existing binding of `name`.
    fn set_var(&mut self, name: &str, ty: Type) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = ty;
                return;
            }
        }
    }

    /// Bind `name` in the innermost scope.
    fn bind_var(&mut self, name: &str, ty: Type) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    /// Pin an unknown-typed variable (possibly parenthesized) to `ty`,
    /// updating its binding so later uses agree. Anything that is not a
    /// scope-bound variable is left untouched.
    fn refine(&mut self, expr: &mut TypedExpr, ty: Type) {
        if expr.ty != Type::Unknown || ty == Type::Unknown {
            return;
        }
        match &mut expr.kind {
            TypedExprKind::Var(name) => {
                let name = name.clone();
                if self.lookup_var(&name).is_some() {
                    self.set_var(&name, ty);
                    expr.ty = ty;
                }
            }
            TypedExprKind::Grouping(inner) => {
                self.refine(inner, ty);
                expr.ty = inner.ty;
            }
            _ => {}
        }
    }

    fn closest_visible(&self, name: &str) -> Option<String> {
        let candidates: Vec<&str> = self
            .scopes
            .iter()
            .flat_map(|s| s.keys().map(String::as_str))
            .chain(self.functions.keys().map(String::as_str))
            .chain(builtins::builtin_names())
            .collect();
        suggest::closest(name, candidates)
    }

    fn closest_callable(&self, name: &str) -> Option<String> {
        let candidates: Vec<&str> = self
            .functions
            .keys()
            .map(String::as_str)
            .chain(builtins::builtin_names())
            .collect();
        suggest::closest(name, candidates)
    }
}

fn annotated_params(params: &[Param]) -> Vec<(String, Type)> {
    params
        .iter()
        .map(|p| (p.name.clone(), p.ty.map_or(Type::Unknown, |t| t.ty())))
        .collect()
}

fn literal_type(kind: LitKind) -> Type {
    match kind {
        LitKind::Number => Type::Number,
        LitKind::Str => Type::String,
        LitKind::Bool => Type::Boolean,
        LitKind::None => Type::Void,
    }
}
