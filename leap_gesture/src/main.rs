//! leap_gesture: command-line entry point.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hand_gesture::GestureCatalog;
use leap_gesture::config::Config;
use leap_gesture::recording::{load_frames, save_frames};
use leap_gesture::service::GestureService;
use leap_gesture::source::{spawn_frame_source, FrameHub, ReplayFrameSource};
use leap_gesture::synth::{self, Outcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "leap_gesture", version, about = "Multi-hand gesture recognition for LeapMotion")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every gesture in the catalog
    List,

    /// Show one gesture's metadata
    Info {
        id: String,
    },

    /// Recognize a gesture from the LeapMotion or a recording
    Recognize {
        id: String,

        /// Replay a JSON-lines recording instead of the hardware
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Number of consecutive attempts
        #[arg(short, long, default_value_t = 1)]
        attempts: u32,
    },

    /// Recognize a gesture against a scripted performance
    Demo {
        id: String,

        /// Perform only the first half of the gesture
        #[arg(long)]
        incomplete: bool,
    },

    /// Write a scripted performance as a JSON-lines recording
    Record {
        id: String,

        #[arg(short, long)]
        output: PathBuf,

        /// Record only the first half of the gesture
        #[arg(long)]
        incomplete: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load_or_default(cli.config.as_deref())
        .with_context(|| format!("loading configuration {:?}", cli.config))?;
    let catalog = GestureCatalog::standard()?;

    match cli.command {
        Command::List                               => run_list(&catalog),
        Command::Info { id }                        => run_info(&catalog, &id),
        Command::Recognize { id, replay, attempts } => run_recognize(catalog, &config, &id, replay, attempts),
        Command::Demo { id, incomplete }            => run_demo(catalog, &config, &id, outcome(incomplete)),
        Command::Record { id, output, incomplete }  => run_record(&id, &output, outcome(incomplete)),
    }
}

fn outcome(incomplete: bool) -> Outcome {
    if incomplete { Outcome::Incomplete } else { Outcome::Complete }
}

fn banner(title: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  {:<60}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

// ════════════════════════════════════════════════════════════════════════════
// Catalog commands
// ════════════════════════════════════════════════════════════════════════════

fn run_list(catalog: &GestureCatalog) -> anyhow::Result<()> {
    banner("Gesture catalog");
    println!("  {:<18} {:>8} {:>6} {:>6}  illustration", "id", "duration", "hands", "steps");
    for entry in catalog.entries() {
        println!(
            "  {:<18} {:>7.1}s {:>6} {:>6}  {}",
            entry.id(),
            entry.duration().as_secs_f32(),
            entry.hand_count(),
            entry.total_steps(),
            entry.illustration(),
        );
    }
    println!();
    Ok(())
}

fn run_info(catalog: &GestureCatalog, id: &str) -> anyhow::Result<()> {
    let Some(entry) = catalog.get(id) else {
        bail!("unknown gesture {:?} (try `leap_gesture list`)", id);
    };
    banner(&format!("Gesture {}", entry.id()));
    println!("  Duration:     {:.1} s", entry.duration().as_secs_f32());
    println!("  Hands:        {}", entry.hand_count());
    println!("  Steps:        {}", entry.total_steps());
    println!("  Illustration: {}", entry.illustration());
    println!();
    Ok(())
}

fn run_record(id: &str, output: &Path, outcome: Outcome) -> anyhow::Result<()> {
    let Some(frames) = synth::script(id, outcome) else {
        bail!("no scripted performance for {:?}", id);
    };
    save_frames(output, &frames).with_context(|| format!("writing {:?}", output))?;
    println!("  Wrote {} frames of {} to {}", frames.len(), id, output.display());
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Recognition commands
// ════════════════════════════════════════════════════════════════════════════

fn run_demo(catalog: GestureCatalog, config: &Config, id: &str, outcome: Outcome) -> anyhow::Result<()> {
    let Some(frames) = synth::script(id, outcome) else {
        bail!("no scripted performance for {:?}", id);
    };
    banner(&format!("Demo: {} ({:?})", id, outcome));
    let hub = FrameHub::new();
    let replay = ReplayFrameSource::new(frames, config.replay.fallback_interval())
        .awaiting_subscriber(&hub, config.replay.subscriber_wait());
    hub.attach(spawn_frame_source(replay));

    let mut service = GestureService::from_config(catalog, hub, config)?;
    attempt(&mut service, id)
}

fn run_recognize(
    catalog:  GestureCatalog,
    config:   &Config,
    id:       &str,
    replay:   Option<PathBuf>,
    attempts: u32,
) -> anyhow::Result<()> {
    let hub = FrameHub::new();
    match replay {
        Some(path) => {
            let frames = load_frames(&path).with_context(|| format!("reading recording {:?}", path))?;
            info!(?path, frames = frames.len(), "replaying recording");
            let source = ReplayFrameSource::new(frames, config.replay.fallback_interval())
                .awaiting_subscriber(&hub, config.replay.subscriber_wait());
            hub.attach(spawn_frame_source(source));
        }
        None => attach_hardware(&hub)?,
    }

    banner(&format!("Recognize: {}", id));
    let mut service = GestureService::from_config(catalog, hub, config)?;
    for n in 1..=attempts {
        println!("  Attempt {}/{}", n, attempts);
        attempt(&mut service, id)?;
    }
    Ok(())
}

#[cfg(feature = "leap")]
fn attach_hardware(hub: &FrameHub) -> anyhow::Result<()> {
    use leap_gesture::source::LeapFrameSource;
    println!("  Mode: LeapMotion hardware");
    hub.attach(spawn_frame_source(LeapFrameSource));
    Ok(())
}

#[cfg(not(feature = "leap"))]
fn attach_hardware(_hub: &FrameHub) -> anyhow::Result<()> {
    bail!("built without the `leap` feature; pass --replay FILE or rebuild with --features leap")
}

fn attempt(service: &mut GestureService, id: &str) -> anyhow::Result<()> {
    if let Some(gif) = service.illustration(id) {
        println!("  Illustration: {}", gif);
    }
    let window = service.attempt_duration(id)?;
    println!("  Perform {} within {:.1} s…", id, window.as_secs_f32());

    let verdict = service.recognize(id, |recognized| {
        if recognized {
            println!("  ✔ {} recognized", id);
        } else {
            println!("  ✘ {} not recognized", id);
        }
    })?;
    println!(
        "    {} frames in {:.2} s, {} late",
        verdict.frames_processed,
        verdict.elapsed.as_secs_f32(),
        verdict.frames_skipped_late,
    );
    println!();
    Ok(())
}
