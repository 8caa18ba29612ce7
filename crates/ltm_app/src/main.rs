//! ltm-merge - merge libTAS movies across an RNG reseed.
//!
//! Every subcommand reads the shared config file first; merge runs write a
//! per-merge log under the configured logs folder.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};

use ltm_core::config::{ConfigManager, Settings, DEFAULT_CONFIG_PATH};
use ltm_core::logging::{init_tracing, LogLevel};
use ltm_core::movie::Recording;
use ltm_core::orchestrator::{MergeMode, MergeReport, MergeRequest, MergeRunner};
use ltm_core::rng::{
    export_seed_csv, find_duplicates_in_window, find_repeats_in_window, micros_to_seed,
    micros_to_state, search_seed, search_state, search_state_aligned, SeedCsvLayout,
};
use ltm_core::states::StatesFile;
use ltm_core::timeline::Alignment;

#[derive(Parser, Debug)]
#[command(name = "ltm-merge", version, about = "Merge libTAS movies across an RNG reseed")]
struct Cli {
    /// Config file (created with defaults when missing)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured log level
    #[arg(long, global = true, value_enum)]
    log_level: Option<Level>,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the splice point and persist it for the replay workflow
    Prepare {
        first: PathBuf,
        second: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Turn replay-measured states into exact absolute micros
    CorrectStates {
        input: PathBuf,
        output: PathBuf,
        /// Start time (micros) the measurements are relative to
        #[arg(long, conflicts_with = "recording", required_unless_present = "recording")]
        start: Option<u64>,
        /// Read the start time from this recording instead
        #[arg(long)]
        recording: Option<PathBuf>,
        /// Search window per record (defaults to the configured window)
        #[arg(long)]
        window: Option<u64>,
    },

    /// Merge two recordings into one
    Merge {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
        /// Alignment JSON from an earlier `prepare`
        #[arg(long)]
        alignment: Option<PathBuf>,
        /// Corrected states file with entry indices filled in
        #[arg(long)]
        states: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Earliest micros at or after START producing SEED
    MatchSeed {
        seed: u32,
        start: u64,
        #[arg(long)]
        window: Option<u64>,
    },

    /// Earliest micros at or after START producing STATE
    MatchState {
        state: u16,
        start: u64,
        #[arg(long)]
        window: Option<u64>,
        /// Only test multiples of this many micros
        #[arg(long)]
        stride: Option<u64>,
    },

    /// Export the seed sequence over [MIN, MAX) as CSV
    Seeds {
        min: u64,
        max: u64,
        output: PathBuf,
        /// Write a `seed` header and one seed per line, without micros
        #[arg(long)]
        seeds_only: bool,
    },

    /// Look for a repeating state cycle after START
    Repeats {
        start: u64,
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Look for the longest run of one repeated state after START
    Duplicates {
        start: u64,
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Show a recording's version, rate, and timing
    Inspect { movie: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    if let Err(e) = config.load_or_create() {
        eprintln!("Warning: Failed to load config: {}", e);
    }

    let level = match (cli.verbose, cli.log_level) {
        (true, _) => LogLevel::Debug,
        (false, Some(level)) => level.into(),
        (false, None) => config.settings().logging.level,
    };
    init_tracing(level);

    tracing::info!("ltm-merge {}", ltm_core::version());
    tracing::debug!("Config: {}", config.path().display());

    config
        .ensure_dirs_exist()
        .context("failed to create working directories")?;

    let settings = config.settings().clone();
    run(cli.command, settings)
}

fn run(command: Command, settings: Settings) -> Result<()> {
    match command {
        Command::Prepare { first, second, json } => {
            let request = MergeRequest::new(&first, &second, PathBuf::new());
            let report = merge(&settings, request, MergeMode::Prepare)?;
            print_report(&report, json)
        }

        Command::CorrectStates {
            input,
            output,
            start,
            recording,
            window,
        } => {
            let start = match (start, recording) {
                (Some(start), _) => start,
                (None, Some(path)) => open(&path, &settings)?
                    .start_micros()
                    .with_context(|| format!("no start time in {}", path.display()))?,
                (None, None) => bail!("either --start or --recording is required"),
            };
            let window = window.unwrap_or(settings.search.window);

            let states = StatesFile::load(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let corrected = states
                .correct(start, window)
                .context("failed to correct states")?;
            corrected
                .save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;

            println!(
                "Corrected {} of {} records into {}",
                corrected.len(),
                states.len(),
                output.display()
            );
            Ok(())
        }

        Command::Merge {
            first,
            second,
            output,
            alignment,
            states,
            json,
        } => {
            let mut request = MergeRequest::new(first, second, output);
            if let Some(path) = alignment {
                let alignment = Alignment::load(&path)
                    .with_context(|| format!("failed to read alignment {}", path.display()))?;
                request = request.with_alignment(alignment);
            }
            if let Some(path) = states {
                request = request.with_states_file(path);
            }

            let report = merge(&settings, request, MergeMode::Full)?;
            print_report(&report, json)
        }

        Command::MatchSeed { seed, start, window } => {
            let window = window.unwrap_or(settings.search.window);
            let micros = search_seed(seed, start, window)?;
            println!("{}", micros);
            Ok(())
        }

        Command::MatchState {
            state,
            start,
            window,
            stride,
        } => {
            let micros = match stride {
                Some(stride) if stride > 1 => {
                    let window = window.unwrap_or(settings.search.aligned_window);
                    search_state_aligned(state, start.next_multiple_of(stride), window, stride)?
                }
                _ => search_state(state, start, window.unwrap_or(settings.search.window))?,
            };
            println!("{}", micros);
            Ok(())
        }

        Command::Seeds {
            min,
            max,
            output,
            seeds_only,
        } => {
            let layout = if seeds_only {
                SeedCsvLayout::SeedsOnly
            } else {
                SeedCsvLayout::MicrosAndSeed
            };
            let rows = export_seed_csv(&output, min, max, layout)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Wrote {} seeds to {}", rows, output.display());
            Ok(())
        }

        Command::Repeats { start, limit } => {
            let limit = limit.unwrap_or(settings.search.analysis_window);
            match find_repeats_in_window(start, limit) {
                Some(found) => println!(
                    "State at {} repeats at {} (period {}us)",
                    found.anchor_micros, found.repeat_micros, found.period
                ),
                None => println!("No repeat within {}us of {}", limit, start),
            }
            Ok(())
        }

        Command::Duplicates { start, limit } => {
            let limit = limit.unwrap_or(settings.search.analysis_window);
            match find_duplicates_in_window(start, limit) {
                Some(found) => println!(
                    "State {} holds for {}us from {}",
                    micros_to_state(found.start_micros),
                    found.length,
                    found.start_micros
                ),
                None => println!("No duplicated states within {}us of {}", limit, start),
            }
            Ok(())
        }

        Command::Inspect { movie } => inspect(&movie, &settings),
    }
}

fn merge(settings: &Settings, request: MergeRequest, mode: MergeMode) -> Result<MergeReport> {
    let runner = MergeRunner::new(settings.clone());
    let report = runner.run(
        request,
        mode,
        Some(Box::new(|line: &str| println!("{}", line))),
        Some(Box::new(|step: &str, percent: u32, message: &str| {
            tracing::debug!("[{:>3}%] {}: {}", percent, step, message);
        })),
    )?;
    Ok(report)
}

fn print_report(report: &MergeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if let Some(alignment) = &report.alignment {
        println!(
            "Aligned: second start {} -> {} (first ends at {})",
            alignment.second_start, alignment.aligned, alignment.first_end
        );
    }
    if let Some(path) = &report.alignment_artifact {
        println!("Alignment saved to {}", path.display());
    }
    if let Some(added) = report.reseed_added_micros {
        println!("Reseed corrections added {}us", added);
    }
    if let Some(output) = &report.output_path {
        println!("Merged movie written to {}", output.display());
    }
    println!("Log: {}", report.log_path.display());
    Ok(())
}

fn open(path: &Path, settings: &Settings) -> Result<Recording> {
    Recording::load(path, &settings.paths.temp_root)
        .with_context(|| format!("failed to open {}", path.display()))
}

fn inspect(path: &Path, settings: &Settings) -> Result<()> {
    let recording = open(path, settings)?;
    let version = recording.version()?;
    let rate = recording.frame_rate()?;
    let start = recording.start_micros()?;
    let end = recording.end_micros()?;

    println!("{}", recording.display_name());
    println!("  libTAS version:  {}", version);
    println!(
        "  frame rate:      {}{}",
        rate.rate,
        if rate.variable { " (variable)" } else { "" }
    );
    println!("  start:           {}us (state {})", start, micros_to_state(start));
    println!(
        "  end:             {}us (seed {}, state {})",
        end,
        micros_to_seed(end),
        micros_to_state(end)
    );
    println!("  entries:         {}", recording.frames.len());
    println!("  rate overrides:  {}", recording.frames.override_count());
    println!("  rerecords:       {}", recording.metadata.rerecord_count()?);
    Ok(())
}
