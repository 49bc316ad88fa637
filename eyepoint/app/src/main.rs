mod config;
mod control;
mod dispatcher;
mod sinks;
mod sources;

use anyhow::{Context, Result};
use api::LandmarkSource;
use common::calibration_manager::CalibrationManager;
use common::{CalibrationEvent, GazeEngine};
use config::{load_config, AppConfig, SourceKind};
use control::{Command, ControlState};
use dispatcher::Dispatcher;
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct Args {
    config_path: PathBuf,
    replay: Option<PathBuf>,
    profile: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config_path: PathBuf::from("config.json"),
        replay: None,
        profile: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(v) = iter.next() {
                    args.config_path = PathBuf::from(v);
                }
            }
            "--replay" => args.replay = iter.next().map(PathBuf::from),
            "--profile" => args.profile = iter.next(),
            other => warn!("Ignoring unknown argument '{}'", other),
        }
    }
    args
}

fn apply_command(engine: &mut GazeEngine, command: Command) {
    match command {
        Command::Recenter => {
            if !engine.recenter() {
                info!("Recenter request ignored while calibrating");
            }
        }
        Command::StartCalibration(variant) => {
            if !engine.start_calibration(variant) {
                info!("Calibration request ignored; one is already running");
            }
        }
        Command::AbandonCalibration => {
            if engine.is_calibrating() {
                engine.abandon_calibration();
                info!("Calibration abandoned; keeping previous mapping");
            }
        }
        Command::Resize(viewport) => {
            info!("Viewport resized to {}x{}", viewport.width, viewport.height);
            engine.resize(viewport);
        }
    }
}

/// Remaining sleep to hold `target` frame time. Frames without a face are
/// not paced; the source's own latency bounds the loop then.
fn frame_pause(target: Option<Duration>, elapsed: Duration, face_seen: bool) -> Option<Duration> {
    let target = target.filter(|_| face_seen)?;
    (elapsed < target).then(|| target - elapsed)
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    info!("Starting...");
    debug!("Debug logging is active");
    trace!("Trace logging is active");

    let args = parse_args();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let mut config = load_config(&args.config_path).unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        AppConfig::default()
    });
    if let Some(path) = args.replay {
        config.source.kind = SourceKind::Replay;
        config.source.replay_path = path;
    }
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    info!("Loaded Config: {:?}", config);

    let control = ControlState::new(config.settings.clone());
    control::spawn(config.control_port, control.clone());

    let mut dispatcher = Dispatcher::new(sinks::create_sink(&config.output));
    if let Err(e) = dispatcher.initialize() {
        error!("Failed to initialize output: {}", e);
        return Err(e);
    }
    info!("Output initialized with {:?} sink.", config.output.mode);

    let mut engine = GazeEngine::new(config.engine.clone(), config.viewport);

    let profiles = CalibrationManager::with_profile(config.profile_dir.clone(), &config.profile);
    match profiles.load() {
        Ok(Some(mapping)) => {
            engine.import_mapping(mapping);
        }
        Ok(None) => info!("No saved mapping; starting uncalibrated."),
        Err(e) => error!("Failed to load mapping profile: {:#}", e),
    }

    let mut source = sources::create_source(&config.source);
    source
        .initialize()
        .context("Failed to initialize landmark source")?;

    info!("Entering Main Loop...");

    let started = Instant::now();
    let mut frame_count: u64 = 0;
    let mut log_interval: u64 = 1000;
    let mut last_log = Instant::now();
    let mut last_source_error: Option<Instant> = None;
    let mut last_frame_time = Instant::now();
    let target_frame_duration = config
        .max_fps
        .filter(|fps| *fps > 0.0)
        .map(|fps| Duration::from_secs_f32(1.0 / fps));

    while running.load(Ordering::SeqCst) {
        for command in control.take_commands() {
            apply_command(&mut engine, command);
        }
        let settings = control.settings();

        let timestamp_ms = started.elapsed().as_secs_f64() * 1000.0;
        let frame = match source.detect(timestamp_ms) {
            Ok(frame) => frame,
            Err(e) => {
                let now = Instant::now();
                if last_source_error.map_or(true, |t| now.duration_since(t).as_secs() >= 5) {
                    error!("Landmark source failed: {}", e);
                    last_source_error = Some(now);
                }
                None
            }
        };

        let now = Instant::now();
        let dt = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        let report = engine.process_frame(&settings, frame.as_ref(), dt);

        if let Some(CalibrationEvent::Completed(mapping)) = &report.calibration {
            info!(
                "Calibration finished! Saving to {:?}",
                profiles.profile_path(&profiles.current_profile_id)
            );
            if let Err(e) = profiles.save(mapping) {
                error!("Failed to save mapping: {:#}", e);
            }
        }

        if let Err(e) = dispatcher.send(&report) {
            error!("Failed to send pointer: {}", e);
        }
        control.publish(&engine, &report);

        if report.pointer.is_some() {
            frame_count += 1;
            if frame_count % log_interval == 0 {
                let elapsed = last_log.elapsed().as_secs_f32();
                let fps = log_interval as f32 / elapsed;
                info!(
                    "Tracking Active: Processed {} frames (approx {:.1} FPS)",
                    frame_count, fps
                );
                last_log = Instant::now();

                if frame_count >= 1_000_000 {
                    log_interval = 1_000_000;
                } else if frame_count >= 100_000 {
                    log_interval = 100_000;
                } else if frame_count >= 10_000 {
                    log_interval = 10_000;
                }
            }
        }

        if let Some(pause) = frame_pause(
            target_frame_duration,
            last_frame_time.elapsed(),
            frame.is_some(),
        ) {
            thread::sleep(pause);
        }
    }

    info!("Shutting down...");
    source.unload();
    Ok(())
}
