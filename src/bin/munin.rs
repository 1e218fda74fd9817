use std::path::PathBuf;

use structopt::StructOpt;
use tokio::task::JoinSet;

use munin::analysis;
use munin::config::{Config, EngineConfig};
use munin::error::AnalyzeError;
use munin::output::{self, FileSink};

/// Network traffic journal analyzer
#[derive(StructOpt, Debug)]
#[structopt(
    name = "munin",
    about = "Analyze traffic journals for top talkers, periodic requests and frequent n-grams"
)]
struct Cli {
    /// Journal files to analyze
    #[structopt(required = true, parse(from_os_str))]
    inputs: Vec<PathBuf>,

    /// Path to configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Directory for result files (defaults to the current directory)
    #[structopt(short, long, parse(from_os_str))]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::from_args();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let output_dir = cli
        .output_dir
        .or(config.output.directory.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut tasks = JoinSet::new();
    let mut failures = 0usize;

    for input in cli.inputs {
        match std::fs::metadata(&input) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                eprintln!("{}: not a regular file", input.display());
                failures += 1;
                continue;
            }
            Err(e) => {
                eprintln!("{}: {}", input.display(), e);
                failures += 1;
                continue;
            }
        }

        let out_path = output_dir.join(output::result_filename(&input));
        let engine = config.engine.clone();
        tasks.spawn(async move {
            let result = analyze_one(&input, &out_path, &engine).await;
            (input, out_path, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (input, out_path, result) = match joined {
            Ok(finished) => finished,
            Err(e) => {
                log::error!("analysis task failed: {}", e);
                failures += 1;
                continue;
            }
        };
        match result {
            Ok(()) => log::info!("{} -> {}", input.display(), out_path.display()),
            Err(e) => {
                eprintln!("{}: {}", input.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

/// Analyze one journal into its result file. On any failure the partial
/// result file is removed; a failed input never leaves a report behind.
async fn analyze_one(
    input: &PathBuf,
    out_path: &PathBuf,
    engine: &EngineConfig,
) -> Result<(), AnalyzeError> {
    let result: Result<(), AnalyzeError> = async {
        let mut sink = FileSink::create(out_path)?;
        analysis::analyze_journal(input, &mut sink, engine).await?;
        sink.finish()?;
        Ok(())
    }
    .await;

    if result.is_err() {
        let _ = std::fs::remove_file(out_path);
    }
    result
}
