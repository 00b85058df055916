//! Codemap CLI - map a Python codebase into a cross-referenced symbol graph

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codemap_core::{
    Analysis, Analyzer, AnalyzerConfig, ElementKind, OutputConfig, OutputFormat,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codemap")]
#[command(about = "Static analyzer that maps a Python codebase into a symbol graph", long_about = None)]
#[command(version = codemap_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project directory and emit its element map
    Analyze {
        /// Project root to analyze
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Write the element map to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Configuration file (default: <path>/.codemap.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extra include patterns, e.g. "*.pyi"
        #[arg(long)]
        include: Vec<String>,

        /// Extra exclude patterns
        #[arg(long)]
        exclude: Vec<String>,

        /// Record structured call sites per function
        #[arg(long)]
        call_sites: bool,

        /// Lower statement bodies into linear IR
        #[arg(long)]
        instructions: bool,

        /// Print the summary only, skip the element dump
        #[arg(long)]
        summary_only: bool,
    },

    /// Write a commented default .codemap.toml to the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            config,
            include,
            exclude,
            call_sites,
            instructions,
            summary_only,
        } => run_analyze(
            path,
            format,
            output,
            config,
            include,
            exclude,
            call_sites,
            instructions,
            summary_only,
        ),
        Commands::Init { force } => run_init(force),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    path: PathBuf,
    format: Format,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    include: Vec<String>,
    exclude: Vec<String>,
    call_sites: bool,
    instructions: bool,
    summary_only: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(p) => AnalyzerConfig::load(&p)?,
        None => AnalyzerConfig::load_or_default(&path)?,
    };
    config.include.extend(include);
    config.exclude.extend(exclude);
    if call_sites {
        config.extract.functions.call_sites = true;
    }
    if instructions {
        config.extract.functions.instructions = true;
        config.extract.module_instructions = true;
    }

    let spinner = create_spinner(&format!("Analyzing {}", path.display()));
    let analysis = Analyzer::new(config).analyze(&path)?;
    spinner.finish_and_clear();

    print_summary(&analysis);

    if !summary_only {
        let output_config = OutputConfig {
            format: match format {
                Format::Json => OutputFormat::Json,
                Format::Yaml => OutputFormat::Yaml,
            },
            ..OutputConfig::default()
        };
        match output {
            Some(file) => {
                output_config.write(&analysis.models, &file)?;
                eprintln!("{} wrote {}", "✓".green(), file.display());
            }
            None => println!("{}", output_config.render(&analysis.models)?),
        }
    }

    Ok(())
}

fn print_summary(analysis: &Analysis) {
    let mut folders = 0usize;
    let mut modules = 0usize;
    let mut classes = 0usize;
    let mut functions = 0usize;
    let mut resolved_bases = 0usize;
    let mut unresolved_bases = 0usize;
    let mut resolved_calls = 0usize;

    for element in analysis.models.values() {
        match element.kind() {
            ElementKind::Folder => folders += 1,
            ElementKind::Module => modules += 1,
            ElementKind::Class => classes += 1,
            ElementKind::Function => functions += 1,
        }
        match element.data() {
            codemap_core::ElementData::Class {
                base_classes,
                unresolved_base_classes,
                ..
            } => {
                resolved_bases += base_classes.len();
                unresolved_bases += unresolved_base_classes.len();
            }
            codemap_core::ElementData::Function { outgoing_calls, .. } => {
                resolved_calls += outgoing_calls.len();
            }
            _ => {}
        }
    }

    eprintln!(
        "{} {} folders, {} modules, {} classes, {} functions",
        "✓".green(),
        folders,
        modules,
        classes,
        functions
    );
    eprintln!(
        "{} {} base classes resolved, {} unresolved",
        "✓".green(),
        resolved_bases,
        unresolved_bases
    );
    eprintln!("{} {} call edges", "✓".green(), resolved_calls);

    if !analysis.errors.is_empty() {
        eprintln!(
            "{} {} files skipped:",
            "!".yellow(),
            analysis.errors.len()
        );
        for error in &analysis.errors {
            eprintln!("  {}", error.dimmed());
        }
    }
}

fn run_init(force: bool) -> Result<()> {
    let path = PathBuf::from(".codemap.toml");
    if path.exists() && !force {
        bail!(".codemap.toml already exists (use --force to overwrite)");
    }
    std::fs::write(&path, DEFAULT_CONFIG)?;
    eprintln!("{} wrote {}", "✓".green(), path.display());
    Ok(())
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

const DEFAULT_CONFIG: &str = r#"# codemap configuration

# Files to analyze (glob patterns on file names)
include = ["*.py"]

# Paths to skip (substring of the path or glob on the file name)
exclude = ["__pycache__", "*.pyc", "*.pyo", "*.pyd"]

[extract.classes]
decorator_list = true
base_classes = true

[extract.functions]
decorator_list = true
parameters = true
outgoing_calls = true
# Structured (expression, line, column) call sites; enables precise-mode
# call resolution when a semantic engine is attached.
call_sites = false
# Linear IR lowering of function bodies.
instructions = false

# Linear IR lowering of top-level module statements.
module_instructions = false
"#;
