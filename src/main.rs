//! Vigil CLI
//!
//! Usage:
//!   vigil --simulate                 # Play a canned drowsiness scenario
//!   vigil --interactive              # Enter samples and commands by hand
//!   vigil --serve                    # HTTP API server
//!   vigil --simulate --json          # JSON output
//!
//! The CLI stands in for the out-of-scope camera, detector, and UI
//! collaborators: it produces observations and renders status lines;
//! the engine underneath is the same one the API serves.

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use vigil::core::{run_server, AudioBackend, BellBackend, MonitorSession, SimulatedCamera};
use vigil::types::{EyeStateSample, FrameObservation, MonitorConfig};
use vigil::{TARGET_SAMPLE_RATE_HZ, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version = VERSION,
    about = "Vigil - drowsiness alerts from eye-openness samples",
    long_about = "Vigil watches a stream of per-frame eye-openness probabilities,\n\
                  debounces them into open/closed verdicts, and sounds an alert\n\
                  when the eyes stay closed.\n\n\
                  Modes:\n  \
                  --simulate     Play a canned drowsiness scenario at 5 Hz\n  \
                  --interactive  Enter samples and commands by hand\n  \
                  --serve        HTTP API server mode\n\n\
                  Verdicts:\n  \
                  OPEN          - Most recent frame shows open eyes\n  \
                  CLOSED        - Eyes closed across the whole debounce window\n  \
                  INSUFFICIENT  - Not enough frames yet, or no face visible"
)]
struct Args {
    /// Play a canned drowsiness scenario
    #[arg(short = 'S', long)]
    simulate: bool,

    /// Interactive mode - enter samples and commands at a prompt
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Alert sound locator (a file path with --features playback,
    /// ignored by the default terminal-bell backend)
    #[arg(long, default_value = "bell")]
    sound: String,

    /// Eye-openness probability below which a frame counts as closed
    #[arg(long, default_value_t = vigil::EYE_CLOSED_THRESHOLD)]
    threshold: f64,

    /// Consecutive closed frames required before alerting
    #[arg(long, default_value_t = vigil::DEBOUNCE_WINDOW_FRAMES)]
    frames: usize,

    /// Minimum interval between alerts in milliseconds
    #[arg(long, default_value_t = vigil::ALERT_COOLDOWN_MS)]
    cooldown_ms: u64,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info".into()),
        )
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = MonitorConfig {
        closed_eye_threshold: args.threshold,
        debounce_frames: args.frames,
        alert_cooldown_ms: args.cooldown_ms,
        ..MonitorConfig::default()
    };
    let (backend, backend_kind) = select_backend(&args.sound);
    tracing::info!(backend = backend_kind, sound = %args.sound, "audio backend selected");
    let session = Arc::new(MonitorSession::new(
        config,
        backend,
        Arc::new(SimulatedCamera),
        args.sound.clone(),
    ));

    if args.serve {
        run_serve(&args, session.clone()).await;
    } else if args.simulate {
        run_simulate(&args, &session).await;
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args, &session).await;
    }

    session.shutdown();
}

/// Pick the audio backend for the sound locator. Anything other than
/// "bell" is a file path and needs the playback feature; without it
/// the CLI falls back to the terminal bell.
fn select_backend(sound: &str) -> (Arc<dyn AudioBackend>, &'static str) {
    #[cfg(feature = "playback")]
    if sound != "bell" {
        return (Arc::new(vigil::core::RodioBackend::new()), "file");
    }
    #[cfg(not(feature = "playback"))]
    if sound != "bell" {
        eprintln!(
            "{}",
            "built without the playback feature; using the terminal bell".yellow()
        );
    }
    (Arc::new(BellBackend), "bell")
}

/// Canned scenario: alert open frames, a blink, then a sustained
/// closure that fires the alert, then recovery
const SCENARIO: &[(&str, Option<(f64, f64)>)] = &[
    ("alert, eyes open", Some((0.95, 0.92))),
    ("alert, eyes open", Some((0.90, 0.91))),
    ("a blink", Some((0.05, 0.04))),
    ("eyes open again", Some((0.88, 0.93))),
    ("face turns away", None),
    ("eyes open", Some((0.90, 0.89))),
    ("eyes closing", Some((0.12, 0.15))),
    ("eyes closed", Some((0.06, 0.08))),
    ("eyes closed - alert expected here", Some((0.04, 0.05))),
    ("still closed (cooldown)", Some((0.03, 0.06))),
    ("still closed (cooldown)", Some((0.05, 0.04))),
    ("startled awake", Some((0.97, 0.95))),
    ("alert, eyes open", Some((0.93, 0.94))),
];

/// Run the canned scenario at the target sample rate
async fn run_simulate(args: &Args, session: &MonitorSession) {
    print_header("Simulate", args.no_color);
    println!(
        "Playing {} frames at {} Hz (threshold {}, window {}, cooldown {}ms)",
        SCENARIO.len(),
        TARGET_SAMPLE_RATE_HZ,
        args.threshold,
        args.frames,
        args.cooldown_ms
    );
    println!();

    if let Err(e) = session.start_monitoring() {
        eprintln!("{} {}", "cannot start monitoring:".red(), e);
        std::process::exit(1);
    }

    let frame_gap = std::time::Duration::from_millis(1000 / TARGET_SAMPLE_RATE_HZ as u64);
    for (label, probs) in SCENARIO {
        tokio::time::sleep(frame_gap).await;

        let obs = match probs {
            Some((left, right)) => FrameObservation::Face(EyeStateSample::new(*left, *right)),
            None => FrameObservation::NoFace,
        };
        let Some(output) = session.on_frame(obs) else {
            continue;
        };

        if args.json {
            println!("{}", serde_json::to_string(&output).unwrap());
        } else if args.no_color {
            println!("{:<36} {}", label, output.to_parseable_string());
        } else {
            println!("{:<36} {}", label.dimmed(), output.to_terminal_string());
        }
    }

    session.stop_monitoring();
    println!();
    let status = session.status();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status).unwrap());
    } else if args.no_color {
        println!("{}", status.to_parseable_string());
    } else {
        println!("{}", status.to_terminal_string());
    }
}

/// Interactive mode: two probabilities per line, or a command
async fn run_interactive(args: &Args, session: &MonitorSession) {
    print_header("Interactive", args.no_color);
    println!("Enter two eye-openness probabilities per line (e.g. '0.1 0.1'),");
    println!("or 'none' for a no-face frame.");
    println!("Commands: start, stop, status, reload, quit");
    println!();

    if let Err(e) = session.start_monitoring() {
        eprintln!("{} {}", "cannot start monitoring:".red(), e);
        std::process::exit(1);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let prompt = format_prompt(session, args.no_color);
        print!("{}", prompt);
        stdout.flush().unwrap();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_ascii_lowercase().as_str() {
            "quit" | "exit" => {
                let status = session.status();
                println!(
                    "\nSession ended. Samples: {} | Alerts: {}",
                    status.samples_seen, status.alerts_fired
                );
                break;
            }
            "start" => {
                match session.start_monitoring() {
                    Ok(report) if report.already_active => println!("already monitoring"),
                    Ok(_) => println!("monitoring started"),
                    Err(e) => println!("{} {}", "start failed:".red(), e),
                }
                continue;
            }
            "stop" => {
                if session.stop_monitoring() {
                    println!("monitoring stopped");
                } else {
                    println!("already idle");
                }
                continue;
            }
            "status" => {
                let status = session.status();
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&status).unwrap());
                } else if args.no_color {
                    println!("{}", status.to_parseable_string());
                } else {
                    println!("{}", status.to_terminal_string());
                }
                continue;
            }
            "reload" => {
                println!("audio: {}", session.reload_audio());
                continue;
            }
            _ => {}
        }

        let Some(obs) = parse_observation(line) else {
            println!(
                "{}",
                "enter two probabilities in [0,1], 'none', or a command".yellow()
            );
            continue;
        };

        match session.on_frame(obs) {
            Some(output) => {
                if args.json {
                    println!("{}", serde_json::to_string(&output).unwrap());
                } else if args.no_color {
                    println!("{}", output.to_parseable_string());
                } else {
                    println!("{}", output.to_terminal_string());
                }
            }
            None => println!("monitoring is idle; sample dropped ('start' to resume)"),
        }
    }
}

/// Parse a sample line: "0.1 0.2" or "none" for a no-face frame
fn parse_observation(line: &str) -> Option<FrameObservation> {
    if line.eq_ignore_ascii_case("none") || line.eq_ignore_ascii_case("noface") {
        return Some(FrameObservation::NoFace);
    }

    let mut parts = line.split_whitespace();
    let left: f64 = parts.next()?.parse().ok()?;
    let right: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if !(0.0..=1.0).contains(&left) || !(0.0..=1.0).contains(&right) {
        return None;
    }
    Some(FrameObservation::Face(EyeStateSample::new(left, right)))
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Vigil v{} - {} Mode", VERSION, mode);
        println!("========================================");
    } else {
        println!("{}", "========================================".bold());
        println!("{}", format!("  Vigil v{} - {} Mode", VERSION, mode).bold());
        println!("{}", "========================================".bold());
    }
    println!();
}

/// Format the interactive prompt from the live session state
fn format_prompt(session: &MonitorSession, no_color: bool) -> String {
    let status = session.status();
    if no_color {
        format!("[{} | audio={}] > ", status.monitoring, status.audio)
    } else {
        format!(
            "{}{} [{} | audio={}]{} > ",
            status.monitoring.color_code(),
            status.monitoring.emoji(),
            status.monitoring,
            status.audio,
            vigil::types::MonitoringState::color_reset()
        )
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args, session: Arc<MonitorSession>) {
    println!();
    println!("Vigil API Server v{}", VERSION);
    println!();

    if let Err(e) = run_server(&args.addr, session).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

// =============================================================================
// TESTS
// =============================================================================
