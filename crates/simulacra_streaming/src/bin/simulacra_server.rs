//! # SIMULACRA Server
//!
//! Streams a capture clip or idle motion to an avatar engine.
//!
//! ## Usage
//!
//! ```bash
//! simulacra_server                                  # idle, text protocol on 127.0.0.1:3910
//! simulacra_server --bvh clips/wave.bvh --loop
//! simulacra_server --protocol binary --tick-rate 50
//! simulacra_server --config simulacra.toml --duration 30
//! ```
//!
//! Flags override the config file. Set `RUST_LOG` for more or less output.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use simulacra_motion::MotionClip;
use simulacra_streaming::{Protocol, SimulacraConfig, StreamResult, StreamingSession};

#[derive(Parser)]
#[command(name = "simulacra_server")]
#[command(author, version, about = "Stream avatar motion over TCP or UDP")]
struct Args {
    /// TOML config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Capture file to play instead of idle motion
    #[arg(long, short = 'b')]
    bvh: Option<PathBuf>,

    /// Loop the capture file instead of falling back to idle at its end
    #[arg(long = "loop", short = 'l')]
    looping: bool,

    /// Wire protocol
    #[arg(long, short = 'p', value_enum)]
    protocol: Option<Protocol>,

    /// Idle tick rate in Hz
    #[arg(long, short = 't')]
    tick_rate: Option<u32>,

    /// Run for N seconds then exit
    #[arg(long, short = 'd')]
    duration: Option<u64>,
}

impl Args {
    fn into_config(self) -> StreamResult<(SimulacraConfig, Option<Duration>)> {
        let mut config = match &self.config {
            Some(path) => SimulacraConfig::load(path)?,
            None => SimulacraConfig::default(),
        };

        if let Some(protocol) = self.protocol {
            config.stream.protocol = protocol;
        }
        if let Some(tick_rate) = self.tick_rate {
            config.stream.tick_rate = tick_rate;
        }
        if self.bvh.is_some() {
            config.playback.file = self.bvh;
        }
        if self.looping {
            config.playback.looping = true;
        }
        config.validate()?;

        Ok((config, self.duration.map(Duration::from_secs)))
    }
}

fn run(args: Args) -> StreamResult<()> {
    let (config, duration) = args.into_config()?;

    tracing::info!(
        protocol = ?config.stream.protocol,
        tick_rate = config.stream.tick_rate,
        duration_s = duration.map(|d| d.as_secs()),
        "Starting"
    );

    let clip = match &config.playback.file {
        Some(path) => Some(Arc::new(MotionClip::load(path)?)),
        None => None,
    };

    let (mut session, handle) = StreamingSession::new(&config)?;
    if let Some(clip) = clip {
        handle.play(clip, config.playback.looping)?;
    }

    session.run(duration);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal");
            ExitCode::FAILURE
        }
    }
}
