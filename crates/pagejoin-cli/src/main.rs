//! PageJoin Command-Line Tool
//!
//! Joins two relation files with a page-budgeted block nested loop join and
//! prints the result, or the query plan with `--explain`.

mod formatter;
mod relation;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use formatter::OutputFormat;
use pagejoin_core::iterator::collect_records;
use pagejoin_core::query::{explain, BnljOperator, ExecutionContext, QueryOperator};
use pagejoin_core::storage::{ExecutionConfig, NullEquality};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// PageJoin Command-Line Tool
#[derive(Parser, Debug)]
#[command(name = "pagejoin")]
#[command(version, about = "Join two relation files with a block nested loop join")]
pub struct Args {
    /// Left (outer) relation file
    #[arg(short = 'l', long)]
    pub left: PathBuf,

    /// Right (inner) relation file
    #[arg(short = 'r', long)]
    pub right: PathBuf,

    /// Join column of the left relation
    #[arg(long)]
    pub left_column: String,

    /// Join column of the right relation
    #[arg(long)]
    pub right_column: String,

    /// Working memory in pages (at least 3)
    #[arg(short = 'm', long)]
    pub work_mem: Option<usize>,

    /// Page size in bytes
    #[arg(long)]
    pub page_size: Option<usize>,

    /// How null join keys compare
    #[arg(long, value_enum)]
    pub nulls: Option<NullMode>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Print the query plan instead of running the join
    #[arg(long)]
    pub explain: bool,

    /// Execution config file (JSON); flags override its values
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Null join key semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NullMode {
    /// Null never matches
    Distinct,
    /// Null matches null
    Match,
}

impl From<NullMode> for NullEquality {
    fn from(mode: NullMode) -> Self {
        match mode {
            NullMode::Distinct => NullEquality::Distinct,
            NullMode::Match => NullEquality::Match,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagejoin=info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Build the join described by `args` and render its output.
fn run(args: &Args) -> anyhow::Result<String> {
    let config = resolve_config(args)?;
    config.validate()?;
    let ctx = ExecutionContext::new(config);

    let left = relation::load_relation(&args.left, &ctx)?;
    let right = relation::load_relation(&args.right, &ctx)?;
    let op = BnljOperator::new(
        Box::new(left),
        Box::new(right),
        &args.left_column,
        &args.right_column,
        &ctx,
    )?;

    let formatter = formatter::create_formatter(args.format);
    if args.explain {
        return Ok(formatter.format_plan(&explain(&op)));
    }

    let mut iter = op.join_iter()?;
    let records = collect_records(&mut iter)?;

    let metrics = ctx.metrics().snapshot();
    info!(
        records = records.len(),
        left_blocks = metrics.left_blocks_fetched,
        right_pages = metrics.right_pages_fetched,
        comparisons = metrics.comparisons,
        estimated_io = op.estimate_io_cost(),
        "Join complete"
    );

    Ok(formatter.format_records(op.schema(), &records))
}

/// Start from the config file (or defaults) and apply flag overrides.
fn resolve_config(args: &Args) -> anyhow::Result<ExecutionConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ExecutionConfig::default(),
    };

    if let Some(pages) = args.work_mem {
        config = config.with_work_mem_pages(pages);
    }
    if let Some(page_size) = args.page_size {
        config = config.with_page_size(page_size);
    }
    if let Some(nulls) = args.nulls {
        config = config.with_null_equality(nulls.into());
    }
    Ok(config)
}

fn load_config(path: &Path) -> anyhow::Result<ExecutionConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}
