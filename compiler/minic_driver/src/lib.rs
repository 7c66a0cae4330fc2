use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser as ClapParser};
use log::info;
use thiserror::Error;

use ast::debug_ast;
use codegen::gen_assm;
use emission::{output, render};
use lexer::{Lexer, Token, TokenType, TokenValue};
use parser::Parser;
use semantic_analysis::resolve;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = "Runs the MiniC compiler, producing MASM assembly for Irvine32")]
struct CLI {
    /// Path to MiniC source file
    path: String,

    /// "Specifies a point in compilation process to stop, only one(1) option can be specified at a time"
    #[command(flatten)]
    stage_options: StageOptions,

    /// Write the resolved AST next to the source as <name>.ast
    #[arg(long)]
    dump_ast: bool,

    /// Where to write the assembly, defaults to <name>.asm next to the source
    #[arg(short = 'o', long)]
    output: Option<String>,
}

/// Run MiniC compiler with optional arguments
#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct StageOptions {
    /// Stop after lexer
    #[arg(long)]
    lex: bool,

    /// Stop after parser
    #[arg(long)]
    parse: bool,

    /// Stop after scope and symbol resolution
    #[arg(long)]
    validate: bool,

    /// Stop after assembly generation, without writing it out
    #[arg(long)]
    codegen: bool,
}

/// Which stage the compiler should stop at
enum StopStage {
    Lexer,
    Parser,
    Analysis,
    CodeGen,
}

impl StopStage {
    fn from_args(options: &StageOptions) -> Option<StopStage> {
        if options.lex {
            Some(StopStage::Lexer)
        } else if options.parse {
            Some(StopStage::Parser)
        } else if options.validate {
            Some(StopStage::Analysis)
        } else if options.codegen {
            Some(StopStage::CodeGen)
        } else {
            None
        }
    }
}

pub fn main() -> Result<()> {
    env_logger::init();

    let args = CLI::parse();

    let stop_stage = StopStage::from_args(&args.stage_options);

    run_driver(&args.path, args.output.as_deref(), &stop_stage, args.dump_ast)
}

fn run_driver(
    path: &str,
    output_path: Option<&str>,
    stop_stage: &Option<StopStage>,
    dump_ast: bool,
) -> Result<()> {
    let source_path = Path::new(path);

    let dir = source_path.parent().unwrap_or(Path::new(""));
    let file_stem = source_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("Invalid source path: {}", path))?;
    let file_name = source_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path);

    let assembly_path = match output_path {
        Some(out) => PathBuf::from(out),
        None => dir.join(format!("{file_stem}.asm")),
    };
    let ast_path = dump_ast.then(|| dir.join(format!("{file_stem}.ast")));

    let source =
        read_to_string(path).with_context(|| format!("Unable to read source file: {}", path))?;

    compile(
        &source,
        file_name,
        stop_stage,
        &assembly_path,
        ast_path.as_deref(),
    )
}

/// Actually run our compiler stages: Lexer, Parser, Resolver, Codegen, Emission
/// If no StopStage is specified, an assembly file is written to `assembly_path`
fn compile(
    source: &str,
    file_name: &str,
    stop_stage: &Option<StopStage>,
    assembly_path: &Path,
    ast_path: Option<&Path>,
) -> Result<()> {
    let tokens = lex(source, file_name)?;
    info!("Lexed {} tokens from {}", tokens.len(), file_name);

    if let Some(StopStage::Lexer) = stop_stage {
        return Ok(());
    }

    let mut parser = Parser::new(tokens);
    let unit = parser.parse()?;

    if let Some(StopStage::Parser) = stop_stage {
        return Ok(());
    }

    let ast = resolve(&unit)?;
    info!("Resolved {} AST nodes", ast.len());

    if let Some(path) = ast_path {
        debug_ast(&ast, path.display().to_string())?;
    }

    if let Some(StopStage::Analysis) = stop_stage {
        return Ok(());
    }

    let assm = gen_assm(&ast);

    if let Some(StopStage::CodeGen) = stop_stage {
        return Ok(());
    }

    output(&assembly_path.display().to_string(), &assm)?;
    info!("Wrote {}", assembly_path.display());

    Ok(())
}

/// Compiles MiniC source text straight to assembly text.
pub fn compile_source(source: &str) -> Result<String> {
    let tokens = lex(source, "<source>")?;
    let unit = Parser::new(tokens).parse()?;
    let ast = resolve(&unit)?;
    let assm = gen_assm(&ast);

    Ok(render(&assm)?)
}

fn lex(source: &str, file_name: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);

    let (tokens, errors): (Vec<_>, Vec<_>) = lexer
        .tokenize()
        .partition(|t| t.kind != TokenType::Unknown && t.kind != TokenType::InvalidIdent);

    if !errors.is_empty() {
        let error_msgs = errors
            .iter()
            .map(|err| {
                let reason = match &err.value {
                    TokenValue::Error(e) => e.to_string(),
                    other => format!("{:?}", other),
                };
                format!(
                    "{} at {}:{}:{}: '{}'",
                    reason,
                    file_name,
                    err.line,
                    err.col,
                    &source[err.start..err.end]
                )
            })
            .collect();

        return Err(CompileErr::Lexer(error_msgs).into());
    }

    Ok(tokens)
}

#[derive(Error, Debug)]
enum CompileErr {
    #[error("Lexer encountered an error(s): {:#?}", .0)]
    Lexer(Vec<String>),
}
