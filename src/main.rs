use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use loxide as lox;

use clap::Parser as ClapParser;
use clap::Subcommand;

use lox::ast_printer::AstPrinter;
use lox::lox::{Lox, EXIT_STATIC_ERROR};
use lox::parser::Parser;
use lox::scanner::Scanner;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Script to run; starts the REPL when omitted
    script: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes the provided input from a given valid filepath
    Tokenize { filename: PathBuf },

    /// Parses the provided input and prints the AST in prefix form
    Parse { filename: PathBuf },
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let args: Cli = Cli::parse();

    match args.command {
        Some(Commands::Tokenize { filename }) => tokenize(&filename),

        Some(Commands::Parse { filename }) => parse(&filename),

        None => match args.script {
            Some(script) => {
                let code = Lox::new().run_file(&script)?;

                if code == 0 {
                    Ok(ExitCode::SUCCESS)
                } else {
                    Ok(ExitCode::from(code as u8))
                }
            }

            None => {
                Lox::new().run_prompt()?;

                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

fn read_source(filename: &Path) -> anyhow::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    let mut reader: BufReader<File> = BufReader::new(File::open(filename)?);
    reader.read_to_end(&mut buf)?;

    Ok(buf)
}

fn tokenize(filename: &Path) -> anyhow::Result<ExitCode> {
    let buf = read_source(filename)?;

    let mut tokenized = true;

    for token in Scanner::new(&buf) {
        match token {
            Ok(token) => println!("{}", token),

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        return Ok(ExitCode::from(EXIT_STATIC_ERROR as u8));
    }

    Ok(ExitCode::SUCCESS)
}

fn parse(filename: &Path) -> anyhow::Result<ExitCode> {
    let buf = read_source(filename)?;

    let mut scan_ok = true;
    let mut tokens: Vec<Token> = Vec::new();

    for token in Scanner::new(&buf) {
        match token {
            Ok(token) => tokens.push(token),

            Err(e) => {
                scan_ok = false;
                eprintln!("{}", e);
            }
        }
    }

    let (statements, errors) = Parser::new(tokens, 0).parse();

    if !scan_ok || !errors.is_empty() {
        for e in errors {
            eprintln!("{}", e);
        }
        return Ok(ExitCode::from(EXIT_STATIC_ERROR as u8));
    }

    for statement in &statements {
        println!("{}", AstPrinter::print_stmt(statement));
    }

    Ok(ExitCode::SUCCESS)
}
