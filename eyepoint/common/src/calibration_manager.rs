use crate::mapping::{AffineAxis, Mapping};
use anyhow::{bail, Context, Result};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const PROFILE_PREFIX: &str = "mapping_";

/// Saves and restores the learned mapping between sessions, one JSON file
/// per profile.
pub struct CalibrationManager {
    storage_dir: PathBuf,
    pub current_profile_id: String,
}

impl CalibrationManager {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            storage_dir,
            current_profile_id: "default".to_string(),
        }
    }

    pub fn with_profile(storage_dir: PathBuf, profile_id: &str) -> Self {
        Self {
            storage_dir,
            current_profile_id: profile_id.to_string(),
        }
    }

    pub fn profile_path(&self, profile_id: &str) -> PathBuf {
        self.storage_dir
            .join(format!("{}{}.json", PROFILE_PREFIX, sanitize_id(profile_id)))
    }

    /// Replaces non-finite fields with defaults. Errors for the fallback,
    /// which is never stored.
    fn sanitized_for_save(mapping: &Mapping) -> Result<Mapping> {
        let finite = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };

        match *mapping {
            Mapping::Bounds(mut b) => {
                b.min_x = finite(b.min_x, -0.28);
                b.max_x = finite(b.max_x, 0.28);
                b.min_y = finite(b.min_y, -0.22);
                b.max_y = finite(b.max_y, 0.22);
                Ok(Mapping::Bounds(b))
            }
            Mapping::Affine(mut a) => {
                let fix = |axis: AffineAxis| AffineAxis {
                    a: finite(axis.a, 1.0),
                    b: finite(axis.b, 0.5),
                };
                a.x = fix(a.x);
                a.y = fix(a.y);
                Ok(Mapping::Affine(a))
            }
            Mapping::Fallback(_) => bail!("Refusing to save the uncalibrated fallback mapping"),
        }
    }

    pub fn save(&self, mapping: &Mapping) -> Result<()> {
        let sanitized = Self::sanitized_for_save(mapping)?;
        let path = self.profile_path(&self.current_profile_id);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create profile dir: {:?}", parent))?;
            }
        }
        let file = File::create(&path).context("Failed to create profile file")?;
        serde_json::to_writer_pretty(file, &sanitized)
            .context("Failed to serialize mapping")?;
        info!("Saved mapping to {:?}", path);
        Ok(())
    }

    /// Loads the current profile. Ok(None) when no file exists yet.
    pub fn load(&self) -> Result<Option<Mapping>> {
        load_from(&self.profile_path(&self.current_profile_id))
    }

    pub fn switch_profile(&mut self, profile_id: &str) {
        if self.current_profile_id != profile_id {
            info!(
                "Switching mapping profile {} -> {}",
                self.current_profile_id, profile_id
            );
            self.current_profile_id = profile_id.to_string();
        }
    }
}

fn load_from(path: &Path) -> Result<Option<Mapping>> {
    if !path.exists() {
        info!("No mapping profile at {:?}, using fallback", path);
        return Ok(None);
    }

    let file = File::open(path).context("Failed to open profile file")?;
    let mapping: Mapping = serde_json::from_reader(BufReader::new(file))
        .context("Failed to deserialize mapping")?;
    if !mapping.is_valid() {
        bail!("Mapping in {:?} is degenerate", path);
    }
    info!("Loaded {} mapping from {:?}", mapping.kind(), path);
    Ok(Some(mapping))
}

fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}
