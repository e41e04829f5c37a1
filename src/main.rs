//! Command-line driver for the `parslr` toolkit.
//!
//! `demo` parses a built-in sample program; `parse` reads a source
//! file. Both print the token stream and the resulting syntax tree,
//! and `--dump-table` writes the ACTION/GOTO dump for debugging.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use parslr::{lang, Lexer, SlrParser, Token};
use std::io::Write;

const SAMPLE_SOURCE: &str = "
int x;
x = 10;
float y;
y = 3.14;

if (x > 5) {
    y = y + 1.0;
} else {
    while (y < 10.0) {
        y = y * 2.0;
    }
}
";

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parses a built-in sample program
    Demo {
        /// Write the ACTION/GOTO table dump to this path
        #[arg(long)]
        dump_table: Option<String>,
    },
    /// Parses a source file
    Parse {
        /// Input file with demo-language source
        #[arg(short, long)]
        input: String,

        /// Write the ACTION/GOTO table dump to this path
        #[arg(long)]
        dump_table: Option<String>,
    },
}

fn print_tokens(tokens: &[Token]) {
    println!("=== Token Stream ===");
    for token in tokens {
        println!("[{:?} {:?} line:{}]", token.ty, token.lexeme, token.line);
    }
    println!("====================");
}

fn run(source: &str, dump_table: Option<&str>) -> Result<()> {
    let parser = SlrParser::try_new(lang::grammar())?;
    if let Some(path) = dump_table {
        parser
            .table()
            .dump_to_path(path)
            .with_context(|| format!("can't write table dump to {path:?}"))?;
        log::info!("table dump written to {path}");
    }

    let tokens = Lexer::new(source).tokenize();
    print_tokens(&tokens);

    let tree = parser.parse_tokens(tokens)?;
    println!("\nSyntax Tree:");
    let mut stdout = std::io::stdout().lock();
    tree.write_indented(&mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Commands::Demo { dump_table } => run(SAMPLE_SOURCE, dump_table.as_deref()),
        Commands::Parse { input, dump_table } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("can't open {input:?}"))?;
            run(&source, dump_table.as_deref())
        }
    }
}
