use std::{fs::read_to_string, io, path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser as ClapParser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use monkey::{
    compiler::compiler::generate,
    display_error,
    errors::errors::PipelineError,
    pipeline::{analyze, parse_source, CompileOptions},
    vm::vm::{execute, DEFAULT_MAX_CALL_DEPTH},
};

/// Compile and run a Monkey program.
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file to compile
    file: PathBuf,

    /// Stop after semantic analysis
    #[clap(long)]
    check: bool,

    /// Print the generated bytecode before running it
    #[clap(long)]
    dump_bytecode: bool,

    /// Maximum number of nested calls before the run faults
    #[clap(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let source = match read_to_string(&args.file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read {}: {}", args.file.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| args.file.display().to_string());

    let options = CompileOptions {
        file_name,
        max_call_depth: args.max_call_depth,
        dump_bytecode: args.dump_bytecode,
    };

    match compile_and_run(&source, &options, args.check) {
        Ok(()) => ExitCode::SUCCESS,
        Err(PipelineError::Syntax(err)) => {
            eprint!("{}", display_error(&err, &source));
            ExitCode::FAILURE
        }
        Err(PipelineError::Semantic(diagnostics)) => {
            for diagnostic in diagnostics {
                eprintln!("{}", diagnostic);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn compile_and_run(source: &str, options: &CompileOptions, check_only: bool) -> Result<(), PipelineError> {
    let start = Instant::now();

    let program = parse_source(source, options)?;
    debug!(elapsed = ?start.elapsed(), "parsed");

    let type_check_start = Instant::now();
    let types = analyze(&program)?;
    debug!(elapsed = ?type_check_start.elapsed(), "type checked");

    if check_only {
        println!("{}: no errors", options.file_name);
        return Ok(());
    }

    let compile_start = Instant::now();
    let generated = generate(&program, &types)?;
    debug!(elapsed = ?compile_start.elapsed(), "generated");

    if options.dump_bytecode {
        println!("{}", generated);
    }

    let run_start = Instant::now();
    execute(&generated, &mut io::stdout().lock(), options.max_call_depth)?;
    debug!(elapsed = ?run_start.elapsed(), total = ?start.elapsed(), "finished");

    Ok(())
}
