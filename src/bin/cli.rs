// CLI binary — panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use py2ts::{compile, diagnostics, CompileResult};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "py2ts", about = "Compile a small Python subset to TypeScript", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output the full compile result as JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a file and print the TypeScript (or write it with --out)
    Build {
        /// Source file
        file: PathBuf,
        /// Write the TypeScript here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Compile a file and report diagnostics without producing output
    Check {
        /// Source file
        file: PathBuf,
    },
}

// ── Command handling ─────────────────────────────────────────────

fn read_source(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error: cannot read {}: {e}", path.display());
        process::exit(1);
    })
}

fn print_json(result: &CompileResult) {
    println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
}

fn report_failure(result: &CompileResult, json: bool) -> ! {
    if json {
        print_json(result);
    } else {
        eprint!("{}", diagnostics::render_report(&result.diagnostics));
    }
    process::exit(1);
}

fn run_build(file: &Path, out: Option<&Path>, json: bool) {
    let source = read_source(file);
    let result = compile(&source);
    if !result.success {
        report_failure(&result, json);
    }

    if json {
        print_json(&result);
        return;
    }

    let code = result.target_code.unwrap_or_default();
    match out {
        Some(out) => {
            if let Err(e) = fs::write(out, &code) {
                eprintln!("Error: cannot write {}: {e}", out.display());
                process::exit(1);
            }
            eprintln!("Wrote {}", out.display());
        }
        None => print!("{code}"),
    }
}

fn run_check(file: &Path, json: bool) {
    let source = read_source(file);
    let result = compile(&source);
    if !result.success {
        report_failure(&result, json);
    }

    if json {
        print_json(&result);
    } else {
        println!("ok: no diagnostics");
        for (name, ty) in &result.inferred_types {
            println!("  {name}: {ty}");
        }
    }
}

// ── Main ─────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Build { file, out } => run_build(file, out.as_deref(), cli.json),
        Commands::Check { file } => run_check(file, cli.json),
    }
}
