//! Command-line entry point for trajsmooth.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use trajsmooth::{
    error::SmoothError,
    host::{CommandScript, HostCommand, Session},
    options::{BoundaryPolicy, ConvolutionMethod, Options, StrategyKind},
    smoother::{SmoothReport, Smoother},
};

/// Smooth every trajectory of a session and append the smoothed frames.
#[derive(Parser, Debug)]
#[command(name = "trajsmooth", version, about)]
struct Cli {
    /// Session JSON holding the trajectories.
    #[arg(short, long, required_unless_present = "list_presets")]
    input: Option<PathBuf>,

    /// Where to write the smoothed session (defaults to the input path).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML options preset.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Print the preset names found in a directory and exit.
    #[arg(long, value_name = "DIR")]
    list_presets: Option<PathBuf>,

    /// Write the effective options (preset plus overrides) as TOML.
    #[arg(long, value_name = "PATH")]
    save_options: Option<PathBuf>,

    /// Window strategy: manual, linear, adaptive, stochastic (or 1-4).
    #[arg(short, long)]
    strategy: Option<String>,

    /// Seed for the stochastic strategy.
    #[arg(long)]
    seed: Option<u64>,

    /// Convolution method.
    #[arg(long, value_enum)]
    method: Option<ConvolutionMethod>,

    /// Edge handling.
    #[arg(long, value_enum)]
    boundary: Option<BoundaryPolicy>,

    /// Smooth trajectories on worker threads.
    #[arg(long)]
    parallel: bool,

    /// Write a host script that plays back the smoothed frames.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Structure the host opens before playback.
    #[arg(long, requires = "script")]
    structure: Option<PathBuf>,

    /// Record the playback as a movie at this path.
    #[arg(long, requires = "script")]
    movie: Option<PathBuf>,

    /// Save an image of the final view at this path.
    #[arg(long, requires = "script")]
    snapshot: Option<PathBuf>,

    /// Movie frames per second.
    #[arg(long, default_value_t = 25)]
    framerate: u32,

    /// Supersampling for movies and snapshots.
    #[arg(long, default_value_t = 3)]
    supersample: u32,

    /// Snapshot width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Snapshot height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Print the active settings and per-trajectory results.
    #[arg(long)]
    summary: bool,
}

impl Cli {
    /// Options from the preset file, with command-line overrides applied.
    fn options(&self) -> Result<Options, SmoothError> {
        let mut options = match &self.options {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        if let Some(selector) = &self.strategy {
            options.planner.strategy = selector.parse::<StrategyKind>()?;
        }
        if let Some(seed) = self.seed {
            options.planner.stochastic.seed = Some(seed);
        }
        if let Some(method) = self.method {
            options.engine.method = method;
        }
        if let Some(boundary) = self.boundary {
            options.engine.boundary = boundary;
        }
        options.engine.parallel |= self.parallel;
        Ok(options)
    }

    /// Host script: open, frame everything, play the smoothed blocks
    /// (optionally recorded), then snapshot.
    fn host_script(&self, report: &SmoothReport) -> CommandScript {
        let mut script = CommandScript::new();
        if let Some(structure) = &self.structure {
            let _ = script.push(HostCommand::Open {
                path: structure.display().to_string(),
            });
        }
        let _ = script.push(HostCommand::View { model: None });

        let mut playback = report.playback_script();
        if let Some(movie) = &self.movie {
            let _ = playback.record_movie(
                &movie.display().to_string(),
                self.supersample,
                self.framerate,
            );
        }
        script.extend(playback);

        if let Some(snapshot) = &self.snapshot {
            let _ = script.push(HostCommand::SaveImage {
                path: snapshot.display().to_string(),
                width: self.width,
                height: self.height,
                supersample: self.supersample,
            });
        }
        script
    }
}

fn run(cli: &Cli, input: &Path) -> Result<(), SmoothError> {
    let options = cli.options()?;
    if let Some(path) = &cli.save_options {
        options.save(path)?;
        log::info!("Wrote options {}", path.display());
    }

    let mut session = Session::load(input)?;
    log::info!(
        "Loaded {} trajectories from {}",
        session.len(),
        input.display()
    );

    let smoother = Smoother::new(options);
    let report = smoother.run(&mut session)?;

    let output = cli.output.as_deref().unwrap_or(input);
    session.save(output)?;
    log::info!("Wrote {}", output.display());

    if let Some(path) = &cli.script {
        cli.host_script(&report).save(path)?;
        log::info!("Wrote host script {}", path.display());
    }
    if cli.summary {
        print_summary(smoother.options(), &report);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_presets(dir: &Path) {
    for name in Options::list_presets(dir) {
        println!("{name}");
    }
}

#[allow(clippy::print_stdout)]
fn print_summary(options: &Options, report: &SmoothReport) {
    for (name, value) in options.summary() {
        println!("{name:<20} {value}");
    }
    println!();
    for s in &report.smoothed {
        println!(
            "#{:<6} window {:<3} {} -> {} frames",
            s.id,
            s.window,
            s.original_frames,
            s.original_frames + s.appended_frames
        );
    }
    for (id, reason) in &report.skipped {
        println!("#{id:<6} skipped: {reason}");
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let cli = Cli::parse();
    if let Some(dir) = &cli.list_presets {
        print_presets(dir);
        return ExitCode::SUCCESS;
    }
    let Some(input) = cli.input.as_deref() else {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "--input is required")
            .exit()
    };
    match run(&cli, input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
