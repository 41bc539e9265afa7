//! `edl` command-line tool
//!
//! Thin front end over `edl-core`: EDL summaries, timecode matchback,
//! Resolve marker conversion, EDL text building and timecode arithmetic.
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG=debug` for more.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use edl_core::timecode::shaped;
use edl_core::{
    parse_resolve_markers, BuildOptions, Direction, EdlBuilder, EdlSequence, EdlSummary, Fps,
    MatchOptions, Shape, TcMatcher,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "edl", version, about = "EDL summaries, matchback and timecode tools")]
struct Cli {
    /// Frame rate of the EDL timecodes
    #[arg(long, env = "EDL_FPS", global = true)]
    fps: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tabular summary of an EDL
    Summary {
        /// EDL file
        file: PathBuf,
    },

    /// Map record timecodes to source timecodes, or back with --reverse
    Match {
        /// EDL file
        file: PathBuf,

        /// Timecodes to look up
        #[arg(required = true)]
        timecodes: Vec<String>,

        /// Frames added to every result
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,

        /// Skip black and filler events
        #[arg(long)]
        ignore_filler: bool,

        /// Source to record instead of record to source
        #[arg(long)]
        reverse: bool,

        /// Report the containing shot instead of the frame
        #[arg(long)]
        shots: bool,
    },

    /// Convert a DaVinci Resolve marker export to tab-separated rows
    Markers {
        /// Marker EDL exported from Resolve
        file: PathBuf,
    },

    /// Build EDL text from tab-separated 3- or 8-column rows
    Build {
        /// Tab-separated input
        file: PathBuf,

        /// EDL title
        #[arg(long)]
        title: String,

        /// Fail instead of warning when the result does not parse back
        #[arg(long)]
        strict: bool,
    },

    /// Timecode arithmetic
    #[command(subcommand)]
    Tc(TcCommand),
}

#[derive(Subcommand, Debug)]
enum TcCommand {
    /// Timecodes to frame counts
    ToFrame {
        #[arg(required = true)]
        timecodes: Vec<String>,
    },
    /// Frame counts to timecodes
    ToTc {
        #[arg(required = true, allow_hyphen_values = true)]
        frames: Vec<f64>,
    },
    /// Frame counts to `HHh MMm SS.SSs` durations
    Duration {
        #[arg(required = true)]
        frames: Vec<f64>,
    },
    /// Shift timecodes by a number of frames
    Offset {
        /// Frames to add, negative to subtract
        #[arg(allow_hyphen_values = true)]
        frames: f64,
        #[arg(required = true)]
        timecodes: Vec<String>,
    },
    /// Convert timecodes to another frame rate
    Convert {
        /// Target frame rate
        #[arg(long)]
        to: u32,
        #[arg(required = true)]
        timecodes: Vec<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    match execute(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    let fps = cli.fps.map(Fps::new).transpose()?;
    match cli.command {
        Command::Summary { file } => {
            let sequence = EdlSequence::parse(&read(&file)?, fps)?;
            info!(events = sequence.events().len(), "parsed {}", file.display());
            write!(out, "{}", EdlSummary::compute(&sequence))?;
        }
        Command::Match {
            file,
            timecodes,
            offset,
            ignore_filler,
            reverse,
            shots,
        } => {
            let sequence = EdlSequence::parse(&read(&file)?, fps)?;
            let direction = if reverse {
                Direction::Reverse
            } else {
                Direction::Forward
            };
            let options = MatchOptions::default()
                .with_offset(offset)
                .with_ignore_filler(ignore_filler)
                .with_shots(shots);
            let matcher = TcMatcher::new(&sequence, direction, options)?;
            let queries = to_shape(&timecodes);
            writeln!(out, "{}", matcher.query_shape(&queries)?.render())?;
        }
        Command::Markers { file } => {
            let markers = parse_resolve_markers(&read(&file)?, require(fps)?)?;
            debug!(count = markers.len(), "markers found");
            for marker in markers {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    marker.start,
                    marker.end.unwrap_or_default(),
                    marker.name,
                    marker.color,
                    marker.duration,
                    marker.note
                )?;
            }
        }
        Command::Build {
            file,
            title,
            strict,
        } => {
            let rows = read_rows(&read(&file)?);
            let built = EdlBuilder::new(title, require(fps)?)
                .import_events(&rows)?
                .build(BuildOptions::default().with_strict(strict))?;
            writeln!(out, "{}", built.text)?;
        }
        Command::Tc(command) => tc(command, require(fps)?, out)?,
    }
    Ok(())
}

fn tc(command: TcCommand, fps: Fps, out: &mut impl Write) -> Result<()> {
    let rate = f64::from(fps.get());
    let shaped = match command {
        TcCommand::ToFrame { timecodes } => shaped::tc_to_frame(&to_shape(&timecodes), rate)?.render(),
        TcCommand::ToTc { frames } => shaped::frame_to_tc(&Shape::from(frames), rate)?.render(),
        TcCommand::Duration { frames } => shaped::frame_to_duration(&Shape::from(frames), rate)?.render(),
        TcCommand::Offset { frames, timecodes } => {
            shaped::tc_offset(&to_shape(&timecodes), frames, rate)?.render()
        }
        TcCommand::Convert { to, timecodes } => {
            shaped::tc_conv(&to_shape(&timecodes), rate, f64::from(to))?.render()
        }
    };
    writeln!(out, "{shaped}")?;
    Ok(())
}

fn require(fps: Option<Fps>) -> Result<Fps> {
    match fps {
        Some(fps) => Ok(fps),
        None => bail!("a frame rate is required here, pass --fps or set EDL_FPS"),
    }
}

fn read(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading input");
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Split tab-separated text into rows of cells
fn read_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.trim_end_matches('\r').split('\t').map(String::from).collect())
        .collect()
}

fn to_shape(values: &[String]) -> Shape<String> {
    Shape::from(values.iter().map(String::as_str).collect::<Vec<_>>())
}
