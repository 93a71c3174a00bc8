//! End-to-end driver: source text in, program output out.
//!
//! Each stage refuses to start while an earlier one reported problems.
//! In particular no code is generated for a program with semantic errors.

use std::{io::Write, rc::Rc};

use tracing::{debug, warn};

use crate::{
    ast::ast::Program,
    compiler::{bytecode::GeneratedProgram, compiler::generate},
    errors::errors::{PipelineError, RuntimeFault},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::{type_checker::type_check, typed_ast::TypeTable},
    vm::vm::{execute, DEFAULT_MAX_CALL_DEPTH},
};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name used in syntax error positions
    pub file_name: String,
    pub max_call_depth: usize,
    /// Write the disassembly to the output before running
    pub dump_bytecode: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            file_name: String::from("<source>"),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            dump_bytecode: false,
        }
    }
}

pub fn parse_source(source: &str, options: &CompileOptions) -> Result<Program, PipelineError> {
    let tokens = tokenize(source.to_string(), Some(options.file_name.clone()))?;
    let program = parse(tokens, Rc::new(options.file_name.clone()))?;

    Ok(program)
}

/// Runs semantic analysis, returning the resolved expression types.
///
/// All diagnostics are reported together as [`PipelineError::Semantic`].
pub fn analyze(program: &Program) -> Result<TypeTable, PipelineError> {
    let checker = type_check(program)?;

    if checker.has_errors() {
        warn!(errors = checker.get_errors().len(), "semantic analysis failed");
        return Err(PipelineError::Semantic(checker.get_errors().to_vec()));
    }

    Ok(checker.into_types())
}

/// Parses, analyzes and generates code for `source`.
pub fn compile(source: &str, options: &CompileOptions) -> Result<GeneratedProgram, PipelineError> {
    let program = parse_source(source, options)?;
    let types = analyze(&program)?;
    let generated = generate(&program, &types)?;

    debug!(file = %options.file_name, units = generated.units.len(), "compiled");
    Ok(generated)
}

/// Compiles `source` and executes it, writing `print` output to `output`.
pub fn run<W: Write>(source: &str, options: &CompileOptions, output: &mut W) -> Result<(), PipelineError> {
    let program = compile(source, options)?;

    if options.dump_bytecode {
        write!(output, "{}", program).map_err(|error| RuntimeFault::Output {
            message: error.to_string(),
        })?;
    }

    execute(&program, output, options.max_call_depth)?;
    Ok(())
}
