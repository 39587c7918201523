use crate::ast::Type;

/// How a built-in call is rewritten on the TypeScript side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitForm {
    /// Plain call rewrite: `print(x)` becomes `console.log(x)`.
    Call(&'static str),
    /// Property access on the first argument: `len(x)` becomes `x.length`.
    Member(&'static str),
}

/// Built-in function: single source of truth for name, type signature, AND
/// target rewrite. Adding a builtin means adding ONE entry here — the
/// resolver, the emitter, and the suggestion candidates all read from this.
///
/// A parameter type of `None` accepts any argument type.
#[derive(Debug, Clone)]
pub struct BuiltinFn {
    pub name: &'static str,
    pub params: &'static [(&'static str, Option<Type>)],
    pub ret: Type,
    pub emit: EmitForm,
    pub description: &'static str,
}

/// All built-in functions available to source programs.
pub static BUILTINS: &[BuiltinFn] = &[
    // ── I/O ─────────────────────────────────────────────────────
    BuiltinFn {
        name: "print", params: &[("value", None)], ret: Type::Void,
        emit: EmitForm::Call("console.log"), description: "Write a value to the console",
    },
    BuiltinFn {
        name: "input", params: &[("prompt", Some(Type::String))], ret: Type::String,
        emit: EmitForm::Call("prompt"), description: "Read a line of text from the user",
    },
    // ── Introspection ───────────────────────────────────────────
    BuiltinFn {
        name: "len", params: &[("obj", None)], ret: Type::Number,
        emit: EmitForm::Member("length"), description: "Length of a string or collection",
    },
    // ── Conversions ─────────────────────────────────────────────
    BuiltinFn {
        name: "str", params: &[("value", None)], ret: Type::String,
        emit: EmitForm::Call("String"), description: "Convert a value to a string",
    },
    BuiltinFn {
        name: "int", params: &[("value", None)], ret: Type::Number,
        emit: EmitForm::Call("parseInt"), description: "Convert a value to an integer",
    },
    BuiltinFn {
        name: "float", params: &[("value", None)], ret: Type::Number,
        emit: EmitForm::Call("parseFloat"), description: "Convert a value to a number",
    },
    BuiltinFn {
        name: "bool", params: &[("value", None)], ret: Type::Boolean,
        emit: EmitForm::Call("Boolean"), description: "Convert a value to a boolean",
    },
];

pub fn lookup_builtin(name: &str) -> Option<&'static BuiltinFn> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// Names of every built-in, in table order. Suggestion candidates.
pub fn builtin_names<'a>() -> impl Iterator<Item = &'a str> {
    BUILTINS.iter().map(|b| b.name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_known_builtins() {
        let print = lookup_builtin("print").unwrap();
        assert_eq!(print.params.len(), 1);
        assert_eq!(print.ret, Type::Void);
        assert_eq!(print.emit, EmitForm::Call("console.log"));

        let len = lookup_builtin("len").unwrap();
        assert_eq!(len.ret, Type::Number);
        assert_eq!(len.emit, EmitForm::Member("length"));
    }

    #[test]
    fn lookup_misses_unknown_names() {
        assert!(lookup_builtin("pritn").is_none());
        assert!(lookup_builtin("").is_none());
    }

    #[test]
    fn casts_share_the_call_form() {
        for name in ["str", "int", "float", "bool"] {
            let b = lookup_builtin(name).unwrap();
            assert_eq!(b.params.len(), 1);
            assert!(matches!(b.emit, EmitForm::Call(_)));
        }
    }

    #[test]
    fn input_requires_a_string_prompt() {
        let input = lookup_builtin("input").unwrap();
        assert_eq!(input.params[0].1, Some(Type::String));
        assert_eq!(input.ret, Type::String);
    }
}
