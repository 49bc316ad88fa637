use anyhow::{Context, Result};
use common::{CalibrationEvent, PointerSink, PointerUpdate, Telemetry};
use log::info;
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;

pub const POINTER_ADDR: &str = "/eyepoint/pointer";
pub const CALIBRATION_ADDR: &str = "/eyepoint/calibration";
pub const CALIBRATION_RESULT_ADDR: &str = "/eyepoint/calibration/result";
pub const DEBUG_ADDR: &str = "/eyepoint/debug";

/// Streams the pointer to an OSC listener over UDP.
pub struct OscSink {
    socket: Option<UdpSocket>,
    target_address: String,
}

impl OscSink {
    pub fn new(target_address: String) -> Self {
        Self {
            socket: None,
            target_address,
        }
    }

    fn send_packets(&self, packets: Vec<OscPacket>) -> Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("OscSink not initialized"))?;
        for packet in packets {
            let buf = encoder::encode(&packet)?;
            socket.send(&buf)?;
        }
        Ok(())
    }
}

fn message(addr: &str, args: Vec<OscType>) -> OscPacket {
    OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    })
}

pub fn pointer_packet(pointer: &PointerUpdate) -> OscPacket {
    message(
        POINTER_ADDR,
        vec![
            OscType::Float(pointer.position.x),
            OscType::Float(pointer.position.y),
            OscType::Bool(pointer.calibrated),
        ],
    )
}

/// `centered.x, centered.y, face_scale, depth_scale`
pub fn telemetry_packet(telemetry: &Telemetry) -> OscPacket {
    message(
        DEBUG_ADDR,
        vec![
            OscType::Float(telemetry.centered.x),
            OscType::Float(telemetry.centered.y),
            OscType::Float(telemetry.face_scale),
            OscType::Float(telemetry.depth_scale),
        ],
    )
}

pub fn calibration_packets(event: &CalibrationEvent) -> Vec<OscPacket> {
    match event {
        CalibrationEvent::Progress(progress) => vec![message(
            CALIBRATION_ADDR,
            vec![OscType::String(progress.to_string())],
        )],
        CalibrationEvent::Completed(_) => {
            vec![message(CALIBRATION_RESULT_ADDR, vec![OscType::Bool(true)])]
        }
        CalibrationEvent::Failed(e) => vec![
            message(CALIBRATION_ADDR, vec![OscType::String(e.to_string())]),
            message(CALIBRATION_RESULT_ADDR, vec![OscType::Bool(false)]),
        ],
    }
}

impl PointerSink for OscSink {
    fn initialize(&mut self) -> Result<()> {
        info!("Initializing OSC sink...");
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind UDP socket")?;
        socket
            .connect(&self.target_address)
            .context(format!("Failed to connect to {}", self.target_address))?;
        socket
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;

        self.socket = Some(socket);
        info!("OSC sink initialized. Target: {}", self.target_address);
        Ok(())
    }

    fn send_pointer(&self, pointer: &PointerUpdate) -> Result<()> {
        self.send_packets(vec![pointer_packet(pointer)])
    }

    fn send_calibration(&self, event: &CalibrationEvent) -> Result<()> {
        self.send_packets(calibration_packets(event))
    }

    fn send_telemetry(&self, telemetry: &Telemetry) -> Result<()> {
        self.send_packets(vec![telemetry_packet(telemetry)])
    }
}
