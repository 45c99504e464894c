use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use batpy::{
    Bindings, EvaluatorOptions, FormulaError, assemble_formula,
    evaluate_formula_with_options, render_error,
};
use batpy_core::parser;
use bumpalo::Bump;
use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};

mod chunk_file;

use chunk_file::ChunkFile;

/// batpy-eval - Evaluate restricted arithmetic formulas
#[derive(Parser, Debug)]
#[command(name = "batpy-eval")]
#[command(about = "Evaluate restricted arithmetic formulas", long_about = None)]
struct Args {
    /// Bind a variable, e.g. `--var modules=20` (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Evaluate every target of a TOML chunk file
    #[arg(long, value_name = "FILE")]
    chunks: Option<PathBuf>,

    /// Maximum formula length in characters
    #[arg(long, default_value_t = batpy::MAX_FORMULA_LENGTH)]
    max_length: usize,

    /// Maximum nesting depth
    #[arg(long, default_value_t = batpy::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print the parsed AST (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Formula to evaluate (if not provided, reads one formula per line from stdin)
    expression: Option<String>,
}

fn parse_var(arg: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found `{arg}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in `{arg}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

struct Session {
    options: EvaluatorOptions,
    bindings: Bindings,
    debug_parse: bool,
    failures: usize,
}

impl Session {
    fn from_args(args: &Args) -> Result<Self> {
        let mut bindings = Bindings::new();
        for (name, value) in &args.vars {
            bindings
                .insert(name.as_str(), value.as_str())
                .map_err(|e| miette!("invalid --var: {e}"))?;
        }

        Ok(Self {
            options: EvaluatorOptions {
                max_length: args.max_length,
                max_depth: args.max_depth,
            },
            bindings,
            debug_parse: args.debug_parse,
            failures: 0,
        })
    }

    /// Evaluate one formula, printing the value or the rendered error.
    fn interpret(&mut self, label: Option<&str>, formula: &str) {
        if self.debug_parse {
            let arena = Bump::new();
            if let Ok(parsed) = parser::parse_with_limits(&arena, formula, &self.options) {
                println!("=== Parsed AST ===");
                println!("{:#?}", parsed.expr);
                println!();
            }
        }

        match evaluate_formula_with_options(formula, Some(&self.bindings), &self.options) {
            Ok(value) => match label {
                Some(label) => println!("{label} = {value}"),
                None => println!("{value}"),
            },
            Err(e) => self.report(label, formula, &e),
        }
    }

    fn report(&mut self, label: Option<&str>, formula: &str, error: &FormulaError) {
        if let Some(label) = label {
            eprintln!("{label}: {formula}");
        }
        render_error(error, formula);
        self.failures += 1;
    }

    fn run_chunk_file(&mut self, file: &ChunkFile) {
        for target in &file.targets {
            match assemble_formula(&target.chunks, &file.cells) {
                Ok(formula) => self.interpret(Some(&target.name), &formula),
                Err(e) => {
                    eprintln!("{}: {e}", target.name);
                    self.failures += 1;
                }
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level, WARN if not set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut session = Session::from_args(&args)?;

    if let Some(path) = &args.chunks {
        let file = ChunkFile::load(path)?;
        session.run_chunk_file(&file);
    }

    if let Some(expr) = &args.expression {
        session.interpret(None, expr);
    } else if args.chunks.is_none() {
        read_stdin(&mut session)?;
    }

    if session.failures > 0 {
        tracing::debug!(failures = session.failures, "evaluation failed");
        std::process::exit(1);
    }
    Ok(())
}

/// One formula per line; blank lines are skipped.
fn read_stdin(session: &mut Session) -> Result<()> {
    let is_interactive = atty::is(atty::Stream::Stdin);
    if is_interactive {
        println!("batpy-eval - Type formulas to evaluate (Ctrl+D to exit)");
        prompt()?;
    }

    let stdin = std::io::stdin();
    let reader = BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = line.into_diagnostic()?;
        if !line.trim().is_empty() {
            session.interpret(None, &line);
        }
        if is_interactive {
            prompt()?;
        }
    }

    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().into_diagnostic()
}
