/// Byte range into the original source. Used for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A whole source file: statements at indentation level zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// An expression evaluated for its effect, e.g. a bare call.
    Expression(Expr),
    /// `name = value`
    Assignment { name: String, value: Expr },
    /// `return` with an optional value.
    Return(Option<Expr>),
    /// `def name(params) -> ret:` followed by an indented body.
    FunctionDef {
        name: String,
        params: Vec<Param>,
        return_type: Option<TypeRef>,
        body: Vec<Stmt>,
    },
    /// `if cond:` with an optional `else:` arm. No `elif` chaining.
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeRef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Explicit parentheses, preserved so emission mirrors the source.
    Grouping(Box<Expr>),
    /// Literals keep their raw lexeme; the emitter re-prints numbers verbatim.
    Literal {
        kind: LitKind,
        raw: String,
    },
    Identifier(String),
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Number,
    Str,
    Bool,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

/// A type name as written in the source (`x: int`, `-> str`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    Int,
    Float,
    Str,
    Bool,
    List,
    Dict,
}

impl TypeRef {
    pub fn name(self) -> &'static str {
        match self {
            TypeRef::Int => "int",
            TypeRef::Float => "float",
            TypeRef::Str => "str",
            TypeRef::Bool => "bool",
            TypeRef::List => "list",
            TypeRef::Dict => "dict",
        }
    }

    /// Resolved type this annotation denotes. `int` and `float` collapse
    /// into a single numeric type on the target side.
    pub fn ty(self) -> Type {
        match self {
            TypeRef::Int | TypeRef::Float => Type::Number,
            TypeRef::Str => Type::String,
            TypeRef::Bool => Type::Boolean,
            TypeRef::List => Type::Array,
            TypeRef::Dict => Type::Record,
        }
    }
}

/// Resolved type of an expression or binding. `Unknown` marks a type the
/// resolver has not pinned down yet; it must never survive into an emitted
/// function signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Number,
    String,
    Boolean,
    Array,
    Record,
    Void,
    Unknown,
}

impl Type {
    /// Spelling used in emitted TypeScript and in diagnostics.
    pub fn ts_name(self) -> &'static str {
        match self {
            Type::Number => "number",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Array => "Array",
            Type::Record => "Record",
            Type::Void => "void",
            Type::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ts_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_covers_both() {
        let a = Span::new(3, 7);
        let b = Span::new(5, 12);
        assert_eq!(a.merge(b), Span::new(3, 12));
        assert_eq!(b.merge(a), Span::new(3, 12));
    }

    #[test]
    fn type_ref_maps_to_target_types() {
        assert_eq!(TypeRef::Int.ty(), Type::Number);
        assert_eq!(TypeRef::Float.ty(), Type::Number);
        assert_eq!(TypeRef::Str.ty(), Type::String);
        assert_eq!(TypeRef::Bool.ty(), Type::Boolean);
        assert_eq!(TypeRef::List.ty(), Type::Array);
        assert_eq!(TypeRef::Dict.ty(), Type::Record);
    }

    #[test]
    fn type_spellings() {
        assert_eq!(Type::Number.ts_name(), "number");
        assert_eq!(Type::Void.ts_name(), "void");
        assert_eq!(format!("{}", Type::String), "string");
    }
}
