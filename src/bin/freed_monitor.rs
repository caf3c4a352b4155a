use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use freed_link::{
    Endpoint, FreeD, PublishDriver, ReceiverConfig, Sink, SubjectId, SubjectRole, Transform,
};

#[derive(Parser)]
#[command(name = "freed-monitor")]
#[command(about = "Listen for FreeD D1 camera tracking and log converted poses")]
struct Args {
    /// Address to listen on, e.g. 0.0.0.0:6301 or 239.1.1.1:6301 for multicast
    endpoint: Endpoint,

    #[arg(short, long, help = "YAML receiver configuration")]
    config: Option<PathBuf>,

    #[arg(long, help = "Publish rate in Hz, overrides the config file")]
    hz: Option<u32>,

    #[arg(short, long, help = "Stop after this many seconds instead of waiting for Ctrl-C")]
    duration: Option<u64>,
}

/// Logs every update at debug level.
struct LogSink;

impl Sink for LogSink {
    fn declare_subject(&mut self, _subject: &SubjectId, _role: SubjectRole) {}

    fn update_subject_frame(&mut self, subject: &SubjectId, transform: Transform) {
        let (axis, angle) = transform.orientation.to_axis_angle();
        tracing::debug!(
            %subject,
            x = transform.position.x,
            y = transform.position.y,
            z = transform.position.z,
            ?axis,
            angle_deg = angle.to_degrees(),
            "Pose"
        );
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("freed_link=info,freed_monitor=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .with(filter)
        .init();
}

fn load_config(args: &Args) -> Result<ReceiverConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ReceiverConfig::from_yaml(&yaml)?
        }
        None => ReceiverConfig::default(),
    };

    if let Some(hz) = args.hz {
        config.publish_hz = hz;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = load_config(&args)?;
    let period = config.publish_period();

    let mut source = FreeD::listen_with(args.endpoint, config);
    info!(endpoint = %source.endpoint(), status = %source.status(), "Source opened");
    if !source.is_valid() {
        anyhow::bail!("could not listen on {}: {}", source.endpoint(), source.status());
    }

    let driver = PublishDriver::spawn(source.publisher().clone(), LogSink, period);

    match args.duration {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Ctrl-C handler failed, shutting down");
            }
        }
    }

    let ticks = driver.shutdown().await;
    source.request_shutdown();

    let stats = source.stats();
    info!(
        ticks,
        devices = source.store().present_count(),
        datagrams = stats.datagrams,
        accepted = stats.accepted,
        rejected = stats.rejected(),
        io_errors = stats.io_errors,
        "Monitor finished"
    );

    Ok(())
}
