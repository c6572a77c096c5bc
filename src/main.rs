use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;

use profile_metrics::layout::RunLayout;
use profile_metrics::model::{self, AlignmentMode, Timeline};
use profile_metrics::{render, run};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "profile-metrics")]
#[command(about = "Derive resource-usage metrics from profiling run logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Result set to read (default: the most recently modified directory under the results root).
    results_dir: Option<PathBuf>,

    #[arg(long, default_value = run::DEFAULT_RESULTS_ROOT)]
    results_root: PathBuf,

    /// JSON file describing the logs of a run (default: the standard client profiling layout).
    #[arg(long)]
    layout: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TableFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Integrate CPU usage over time into CPU-seconds (area under the curve).
    CpuSeconds {
        #[command(flatten)]
        args: RunArgs,

        /// Print a report with sample statistics instead of the bare number.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print every metric of a run aligned on one index.
    Table {
        #[command(flatten)]
        args: RunArgs,

        /// Index rows by iteration number instead of timestamp.
        #[arg(long, conflicts_with = "reference")]
        ordinal: bool,

        /// Use only the reference metric's timestamps as rows.
        #[arg(long)]
        reference: bool,

        #[arg(long, value_enum, default_value_t = TableFormat::Csv)]
        format: TableFormat,
    },
    /// Write a multi-panel HTML chart of a run.
    Plot {
        #[command(flatten)]
        args: RunArgs,

        #[arg(short = 'o', long, default_value = "plot.html")]
        out: PathBuf,
    },
}

impl RunArgs {
    fn layout(&self) -> Result<RunLayout> {
        match &self.layout {
            Some(path) => RunLayout::from_file(path)
                .with_context(|| format!("load layout {}", path.display())),
            None => Ok(RunLayout::standard()),
        }
    }

    fn resolve(&self, announce: bool) -> Result<PathBuf> {
        let dir = run::resolve_run(self.results_dir.as_deref(), &self.results_root)?;
        if announce && self.results_dir.is_none() {
            println!("Using most recent results: {}", dir.display());
        }
        Ok(dir)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::CpuSeconds { args, verbose } => {
            let layout = args.layout()?;
            let dir = args.resolve(verbose)?;
            let result = run::cpu_seconds(&dir, &layout)?;
            if verbose {
                println!("{}", render::text::verbose(&result));
            } else {
                println!("{}", render::text::terse(&result));
            }
        }
        Commands::Table {
            args,
            ordinal,
            reference,
            format,
        } => {
            let layout = args.layout()?;
            // stdout carries the table, so no announcement here.
            let dir = args.resolve(false)?;
            let data = run::load_run(&dir, &layout)?;
            let mode = if ordinal {
                AlignmentMode::ByOrdinal
            } else if reference {
                AlignmentMode::ByTimestamp(Timeline::Reference(layout.reference.clone()))
            } else {
                AlignmentMode::ByTimestamp(Timeline::Union)
            };
            let table = model::align(&data.series, &mode)?;
            let out = io::stdout().lock();
            match format {
                TableFormat::Csv => render::table::write_csv(&table, out)?,
                TableFormat::Json => render::table::write_json(&table, out)?,
            }
        }
        Commands::Plot { args, out } => {
            let layout = args.layout()?;
            let dir = args.resolve(true)?;
            let data = run::load_run(&dir, &layout)?;
            let table = model::align(&data.series, &AlignmentMode::ByTimestamp(Timeline::Union))?;
            let chart = render::build_chart_data(&data.dir, &table, &layout)?;
            let html = render::render_html_report(&chart)?;
            std::fs::write(&out, html).with_context(|| format!("write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
    }

    Ok(())
}
