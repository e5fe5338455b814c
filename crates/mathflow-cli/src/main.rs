//! mathflow - scan `$$` math blocks in a document

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;

use mathflow_config::{Config, OutputFormat};
use mathflow_syntax::lexer::lex;
use mathflow_syntax::{Construct, ParseOptions, SyntaxKind, SyntaxNode, ast, debug_tree};

#[derive(Parser, Debug)]
#[command(name = "mathflow")]
#[command(version, about = "Scan $$ math blocks in a document", long_about = None)]
#[command(after_help = "EXAMPLES:
    mathflow notes.md                   Dump the syntax tree
    mathflow --format blocks notes.md   List math blocks and their content
    cat notes.md | mathflow --lazy 4    Treat line 4 as a lazy continuation")]
struct Cli {
    /// Input file, `-` or nothing for stdin
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// 1-based line that is a lazy continuation (repeatable)
    #[arg(long, value_name = "LINE")]
    lazy: Vec<usize>,

    /// Construct to disable: code_indented or math_flow (repeatable)
    #[arg(long, value_name = "NAME")]
    disable: Vec<Construct>,

    /// Output format: tree or blocks [default: from config, else tree]
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Config file [default: ~/.config/mathflow/config.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective --disable/--format settings back to the config file
    #[arg(long)]
    save_config: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let config_path = cli
        .config
        .as_deref()
        .map(|path| Config::expand_path(path).unwrap_or_else(|| path.to_path_buf()));
    let config = load_config(config_path.as_deref(), !cli.save_config)?;

    let mut constructs = config.constructs()?;
    for construct in &cli.disable {
        constructs.disable(*construct);
    }
    let format = cli.format.unwrap_or(config.format);

    if cli.save_config {
        let effective = Config {
            disable: constructs.disabled().map(|c| c.name().to_string()).collect(),
            format,
        };
        let saved = match config_path.as_deref() {
            Some(path) => effective.save_to_path(path),
            None => effective.save(),
        };
        saved.context("Failed to save config")?;
        log::info!("saved config: {effective:?}");
    }

    let source = read_source(cli.file.as_deref())?;
    let lazy: BTreeSet<usize> = cli.lazy.iter().copied().collect();
    let options = ParseOptions::new(constructs, &lazy);
    log::debug!("parsing with {options:?}, lazy lines {lazy:?}");

    let tree = mathflow_syntax::parse_with_options(&source, &options);
    log::info!("found {} math blocks", ast::math_blocks(&tree).count());

    Ok(match format {
        OutputFormat::Tree => debug_tree(&tree),
        OutputFormat::Blocks => render_blocks(&source, &tree),
    })
}

/// An explicit `--config` must exist unless it is about to be written; the
/// default location is always optional.
fn load_config(path: Option<&Path>, must_exist: bool) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    match (loaded, path) {
        (Some(config), _) => Ok(config),
        (None, Some(path)) if must_exist => {
            bail!("config file not found: {}", path.display())
        }
        (None, _) => Ok(Config::default()),
    }
}

fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            Ok(source)
        }
    }
}

/// One header line per block, then its content indented by two spaces.
fn render_blocks(source: &str, tree: &SyntaxNode) -> String {
    let mut out = String::new();

    for (i, block) in ast::math_blocks(tree).enumerate() {
        let start: usize = block.syntax().text_range().start().into();
        let status = match block.closing_fence_size() {
            Some(size) => format!("closed ({size})"),
            None => "unclosed".to_string(),
        };
        let _ = writeln!(
            out,
            "block {}: line {}, fence {}, {status}",
            i + 1,
            line_at(source, start),
            block.fence_size(),
        );

        for line in block.content().lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                let _ = writeln!(out, "  {line}");
            }
        }
    }

    out
}

/// 1-based line containing byte `offset`, counting every kind of line ending.
fn line_at(source: &str, offset: usize) -> usize {
    let endings = lex(&source[..offset])
        .iter()
        .filter(|t| t.kind == SyntaxKind::NEWLINE)
        .count();
    endings + 1
}
