//! Compile a small statically-typed subset of Python into TypeScript.
//!
//! The pipeline is source → lex → parse → resolve → emit; each stage either
//! produces input for the next or stops the run with its diagnostics.

#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod ast;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod error;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod suggest;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod builtins;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod lexer;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod parser;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod resolver;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod emitter;
#[allow(
    clippy::indexing_slicing,
    clippy::wildcard_imports,
    clippy::cast_possible_truncation,
    clippy::single_match_else,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
)]
pub mod diagnostics;

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use diagnostics::Diagnostic;
use error::CompileError;
use resolver::TypedProgram;

/// Deepest pipeline stage a compilation got into. `Ok` means the whole
/// pipeline ran and target code was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PhaseReached {
    Lexical,
    Syntactic,
    Semantic,
    Ok,
}

/// Everything a frontend needs from one compilation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompileResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub target_code: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Function signatures first, then module bindings, as display strings.
    pub inferred_types: IndexMap<String, String>,
    pub phase_reached: PhaseReached,
}

/// Compile a source module into TypeScript.
///
/// Never panics; an internal failure surfaces as a phase-less diagnostic on
/// the returned result, with `phase_reached` naming the stage that was
/// running.
pub fn compile(source: &str) -> CompileResult {
    let reached = Cell::new(PhaseReached::Lexical);
    match panic::catch_unwind(AssertUnwindSafe(|| compile_inner(source, &reached))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            CompileResult {
                success: false,
                target_code: None,
                diagnostics: vec![Diagnostic::internal(format!("internal error: {message}"))],
                inferred_types: IndexMap::new(),
                phase_reached: reached.get(),
            }
        }
    }
}

fn compile_inner(source: &str, reached: &Cell<PhaseReached>) -> CompileResult {
    reached.set(PhaseReached::Lexical);
    let tokens = match lexer::lex(source) {
        Ok(tokens) => tokens,
        Err(errors) => return failure(source, errors, PhaseReached::Lexical),
    };

    reached.set(PhaseReached::Syntactic);
    let program = match parser::parse(tokens) {
        Ok(program) => program,
        Err(errors) => return failure(source, errors, PhaseReached::Syntactic),
    };

    reached.set(PhaseReached::Semantic);
    let typed = match resolver::resolve(&program) {
        Ok(typed) => typed,
        Err(errors) => return failure(source, errors, PhaseReached::Semantic),
    };

    reached.set(PhaseReached::Ok);
    CompileResult {
        success: true,
        target_code: Some(emitter::emit(&typed)),
        diagnostics: Vec::new(),
        inferred_types: inferred_types(&typed),
        phase_reached: PhaseReached::Ok,
    }
}

fn failure(source: &str, errors: Vec<CompileError>, phase: PhaseReached) -> CompileResult {
    CompileResult {
        success: false,
        target_code: None,
        diagnostics: diagnostics::collect(errors, source),
        inferred_types: IndexMap::new(),
        phase_reached: phase,
    }
}

fn inferred_types(program: &TypedProgram) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for (name, sig) in &program.functions {
        let params: Vec<String> = sig
            .params
            .iter()
            .map(|(pname, pty)| format!("{pname}: {}", pty.ts_name()))
            .collect();
        map.insert(
            name.clone(),
            format!("({}) => {}", params.join(", "), sig.ret.ts_name()),
        );
    }
    for (name, ty) in &program.module_bindings {
        map.insert(name.clone(), ty.ts_name().to_string());
    }
    map
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
