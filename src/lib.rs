mod chime;
mod config;
mod face;
mod persist;
mod rotation;
mod scheduler;
mod settings;
mod utils;

pub use chime::{build_hourly_pattern, Chime, ChimeEngine, ChimePattern, Haptics, PulseStyle};
pub use config::RuntimeConfig;
pub use face::{FaceDisplay, FaceOptions, TickUnits, Watchface};
pub use persist::{PersistStore, SqlitePersist};
pub use rotation::{ImageId, ImageLoader, ImageRotator, CATALOG};
pub use settings::{ConfigMessage, Settings, SettingsStore, VibrationStyle};

use anyhow::{Context, Result};
use chrono::Local;
use chime::LogHaptics;
use face::LogDisplay;
use rotation::FsImageLoader;
use scheduler::{input, run_face_loop};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const EVENT_QUEUE_DEPTH: usize = 32;

pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Watchface starting up...");

    let config = RuntimeConfig::from_env();
    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")
        .and_then(|runtime| runtime.block_on(serve(config)));

    if let Err(err) = result {
        log::error!("Watchface failed: {err:?}");
        std::process::exit(1);
    }
}

async fn serve(config: RuntimeConfig) -> Result<()> {
    let store = SqlitePersist::open(config.database_path())?;
    let loader = FsImageLoader::new(config.resource_dir.clone());
    let options = FaceOptions {
        clock_is_24h: config.clock_is_24h,
        abbreviate: config.abbreviate,
        catalog: CATALOG.to_vec(),
    };

    let mut face = Watchface::start(
        store,
        loader,
        LogDisplay,
        Box::new(LogHaptics),
        options,
        Local::now().naive_local(),
    )?;

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let cancel = CancellationToken::new();

    let input_task = tokio::spawn(input::read_stdin(events_tx, cancel.clone()));

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received");
            signal_cancel.cancel();
        }
    });

    run_face_loop(&mut face, events_rx, cancel.clone(), || {
        Local::now().naive_local()
    })
    .await;

    cancel.cancel();
    if let Err(err) = input_task.await {
        log::warn!("Input task ended abnormally: {err}");
    }

    face.shutdown();
    Ok(())
}
