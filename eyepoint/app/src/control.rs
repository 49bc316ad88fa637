//! HTTP control surface. Handlers never touch the engine: they edit the live
//! settings, queue commands for the next frame, and read snapshots the frame
//! loop publishes.

use api::Viewport;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{
    CalibrationEvent, CalibrationState, CalibrationVariant, EyeMode, FrameReport, GazeEngine,
    Settings,
};
use glam::Vec2;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Recenter,
    StartCalibration(Option<CalibrationVariant>),
    AbandonCalibration,
    Resize(Viewport),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CalibrationStatus {
    pub is_calibrating: bool,
    pub last_failed: bool,
    pub mapping: String,
    pub step: Option<usize>,
    pub total: usize,
    pub prompt: Option<String>,
    /// Normalized screen position of the active target.
    pub target: Option<Vec2>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PointerStatus {
    pub position: Vec2,
    pub calibrated: bool,
    pub face_detected: bool,
    pub depth_scale: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub eye_mode: Option<EyeMode>,
    pub mirror: Option<bool>,
    pub invert_y: Option<bool>,
    pub smoothing_factor: Option<f32>,
    pub reference_face_size: Option<f32>,
}

impl SettingsPatch {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(v) = self.eye_mode {
            settings.eye_mode = v;
        }
        if let Some(v) = self.mirror {
            settings.mirror = v;
        }
        if let Some(v) = self.invert_y {
            settings.invert_y = v;
        }
        if let Some(v) = self.smoothing_factor.filter(|v| v.is_finite()) {
            settings.smoothing_factor = v;
        }
        if let Some(v) = self.reference_face_size.filter(|v| v.is_finite() && *v > 0.0) {
            settings.reference_face_size = v;
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// State shared between the frame loop and the HTTP handlers.
#[derive(Clone)]
pub struct ControlState {
    settings: Arc<RwLock<Settings>>,
    commands: Arc<Mutex<Vec<Command>>>,
    calibration: Arc<RwLock<CalibrationStatus>>,
    pointer: Arc<RwLock<PointerStatus>>,
}

impl ControlState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
            commands: Arc::new(Mutex::new(Vec::new())),
            calibration: Arc::new(RwLock::new(CalibrationStatus::default())),
            pointer: Arc::new(RwLock::new(PointerStatus::default())),
        }
    }

    pub fn settings(&self) -> Settings {
        read(&self.settings).clone()
    }

    pub fn update_settings(&self, patch: &SettingsPatch) -> Settings {
        let mut settings = write(&self.settings);
        patch.apply(&mut settings);
        settings.clone()
    }

    pub fn push(&self, command: Command) {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command);
    }

    /// Removes and returns every queued command, oldest first.
    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut *self.commands.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn calibration_status(&self) -> CalibrationStatus {
        read(&self.calibration).clone()
    }

    pub fn pointer_status(&self) -> PointerStatus {
        read(&self.pointer).clone()
    }

    /// Refreshes the snapshots served over HTTP after a frame.
    pub fn publish(&self, engine: &GazeEngine, report: &FrameReport) {
        let step = match engine.calibration_state() {
            CalibrationState::Warmup { step, .. } | CalibrationState::Collecting { step, .. } => Some(step),
            _ => None,
        };
        let target = engine.calibration_target();

        {
            let mut status = write(&self.calibration);
            status.is_calibrating = engine.is_calibrating();
            status.last_failed = engine.calibration_failed();
            status.mapping = engine.mapping().kind().to_string();
            status.step = step;
            status.prompt = target.map(|t| t.prompt.clone());
            status.target = target.map(|t| t.screen_position());
            match &report.calibration {
                Some(CalibrationEvent::Progress(p)) => status.total = p.total,
                _ if !status.is_calibrating => status.total = 0,
                _ => {}
            }
        }

        let mut pointer = write(&self.pointer);
        pointer.position = engine.pointer();
        pointer.calibrated = engine.mapping().is_calibrated();
        pointer.face_detected = report.pointer.is_some();
        pointer.depth_scale = engine.depth_scale();
    }
}

#[derive(Debug, Deserialize)]
struct StartCalibrationPayload {
    variant: Option<CalibrationVariant>,
}

#[derive(Debug, Deserialize)]
struct ViewportPayload {
    width: f32,
    height: f32,
}

pub fn get_router(state: ControlState) -> Router {
    Router::new()
        .route("/settings", get(get_settings_handler).post(update_settings_handler))
        .route("/recenter", post(recenter_handler))
        .route("/calibration/start", post(start_calibration_handler))
        .route("/calibration/abandon", post(abandon_calibration_handler))
        .route("/calibration/status", get(calibration_status_handler))
        .route("/pointer", get(pointer_handler))
        .route("/viewport", post(viewport_handler))
        .with_state(state)
}

async fn get_settings_handler(State(state): State<ControlState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "settings": state.settings()
    }))
}

async fn update_settings_handler(
    State(state): State<ControlState>,
    Json(patch): Json<SettingsPatch>,
) -> Json<Value> {
    let settings = state.update_settings(&patch);
    info!("Updated settings: {:?}", settings);
    Json(json!({
        "status": "ok",
        "settings": settings
    }))
}

async fn recenter_handler(State(state): State<ControlState>) -> Json<Value> {
    if state.calibration_status().is_calibrating {
        return Json(json!({
            "status": "ignored",
            "message": "Recenter is unavailable while calibrating"
        }));
    }
    state.push(Command::Recenter);
    Json(json!({ "status": "queued" }))
}

async fn start_calibration_handler(
    State(state): State<ControlState>,
    payload: Option<Json<StartCalibrationPayload>>,
) -> Json<Value> {
    let status = state.calibration_status();
    if status.is_calibrating {
        return Json(json!({
            "status": "already_calibrating",
            "message": "Calibration is already in progress",
            "calibration": status
        }));
    }

    let variant = payload.and_then(|Json(p)| p.variant);
    state.push(Command::StartCalibration(variant));
    Json(json!({
        "status": "starting",
        "variant": variant
    }))
}

async fn abandon_calibration_handler(State(state): State<ControlState>) -> Json<Value> {
    if !state.calibration_status().is_calibrating {
        return Json(json!({
            "status": "ignored",
            "message": "No calibration is running"
        }));
    }
    state.push(Command::AbandonCalibration);
    Json(json!({ "status": "queued" }))
}

async fn calibration_status_handler(State(state): State<ControlState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "calibration": state.calibration_status()
    }))
}

async fn pointer_handler(State(state): State<ControlState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "pointer": state.pointer_status()
    }))
}

async fn viewport_handler(
    State(state): State<ControlState>,
    Json(payload): Json<ViewportPayload>,
) -> Json<Value> {
    if !(payload.width > 0.0 && payload.height > 0.0) {
        return Json(json!({
            "status": "error",
            "message": "width and height must be positive"
        }));
    }
    let viewport = Viewport::new(payload.width, payload.height);
    state.push(Command::Resize(viewport));
    Json(json!({
        "status": "queued",
        "viewport": viewport
    }))
}

pub async fn serve(port: u16, state: ControlState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Control surface listening on http://{}", listener.local_addr()?);
    axum::serve(listener, get_router(state)).await?;
    Ok(())
}

/// Runs the control server on its own thread with a dedicated runtime.
pub fn spawn(port: u16, state: ControlState) {
    thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = serve(port, state).await {
                error!("Control server failed: {}", e);
            }
        });
    });
}
