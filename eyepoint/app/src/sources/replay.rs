//! Plays back a recorded landmark stream.
//!
//! The file holds one detection per line: a JSON array of `[x, y, z]` points,
//! or `null` (or `[]`) where the detector found no face. Blank lines and
//! lines starting with `#` are ignored. Playback loops at the end of the file.

use anyhow::{bail, Context, Result};
use api::{LandmarkFrame, LandmarkSource};
use glam::Vec3;
use log::info;
use std::fs;
use std::path::PathBuf;

pub struct ReplaySource {
    path: PathBuf,
    frames: Vec<Option<LandmarkFrame>>,
    cursor: usize,
}

impl ReplaySource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            frames: Vec::new(),
            cursor: 0,
        }
    }

    #[cfg(test)]
    pub fn from_frames(frames: Vec<Option<LandmarkFrame>>) -> Self {
        Self {
            path: PathBuf::new(),
            frames,
            cursor: 0,
        }
    }
}

/// Parses one recorded line. `Ok(None)` is a frame without a face.
pub fn parse_line(line: &str) -> Result<Option<LandmarkFrame>> {
    let points: Option<Vec<[f32; 3]>> = serde_json::from_str(line)?;
    Ok(points
        .map(|points| LandmarkFrame::new(points.into_iter().map(Vec3::from_array).collect()))
        .filter(|frame| !frame.is_empty()))
}

pub fn parse_recording(text: &str) -> Result<Vec<Option<LandmarkFrame>>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| parse_line(line.trim()).with_context(|| format!("Bad landmark record on line {}", n + 1)))
        .collect()
}

impl LandmarkSource for ReplaySource {
    fn initialize(&mut self) -> Result<()> {
        if self.frames.is_empty() {
            let text = fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read recording {:?}", self.path))?;
            self.frames = parse_recording(&text)?;
        }
        if self.frames.is_empty() {
            bail!("Recording {:?} contains no frames", self.path);
        }
        self.cursor = 0;
        info!(
            "Replay source ready: {} frames from {:?}",
            self.frames.len(),
            self.path
        );
        Ok(())
    }

    fn detect(&mut self, _timestamp_ms: f64) -> Result<Option<LandmarkFrame>> {
        if self.frames.is_empty() {
            bail!("Replay source not initialized");
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }

    fn unload(&mut self) {
        self.frames.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_line_is_no_face() {
        assert_eq!(parse_line("null").unwrap(), None);
        assert_eq!(parse_line("[]").unwrap(), None);
    }

    #[test]
    fn points_are_parsed_in_order() {
        let frame = parse_line("[[0.1, 0.2, 0.0], [0.5, 0.6, -0.1]]")
            .unwrap()
            .unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(1), Some(Vec3::new(0.5, 0.6, -0.1)));
    }

    #[test]
    fn recording_skips_comments_and_reports_bad_lines() {
        let frames = parse_recording("# header\n\n[[0,0,0]]\nnull\n").unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].is_none());

        let err = parse_recording("[[0,0,0]]\n{oops}\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn playback_loops() {
        let a = LandmarkFrame::new(vec![Vec3::ZERO]);
        let mut source = ReplaySource::from_frames(vec![Some(a.clone()), None]);
        source.initialize().unwrap();

        assert_eq!(source.detect(0.0).unwrap(), Some(a.clone()));
        assert_eq!(source.detect(33.0).unwrap(), None);
        assert_eq!(source.detect(66.0).unwrap(), Some(a));
    }
}
