//! Persisted per-user calibration
//!
//! The headset runtime keeps a JSON profile document; this crate owns a single
//! field in it, the strabismus correction quaternion. Everything else in the
//! document is carried through untouched on write.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Quat;
use lazy_static::lazy_static;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

pub const STRABISMUS_CORRECTION_KEY: &str = "StrabismusCorrection";
pub const PROFILE_FILE_NAME: &str = "profile2.json";

lazy_static! {
    // Resolved once per process, on first use
    static ref DEFAULT_PROFILE_PATH: Option<PathBuf> = profile_path_under(base_profile_dir());
}

#[cfg(target_os = "windows")]
fn base_profile_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("Oculus"))
}

#[cfg(target_os = "macos")]
fn base_profile_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Preferences").join("Oculus"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn base_profile_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".oculus"))
}

fn profile_path_under(base: Option<PathBuf>) -> Option<PathBuf> {
    match base {
        Some(base) => Some(base.join(PROFILE_FILE_NAME)),
        None => {
            warn!("No user profile directory on this system; calibration will not be persisted by default");
            None
        }
    }
}

/// Location of the runtime's profile document on this machine, if the
/// user's home directory is known
pub fn default_profile_path() -> Option<&'static Path> {
    DEFAULT_PROFILE_PATH.as_deref()
}

/// On-disk shape of a quaternion; missing components fall back to identity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct QuatRecord {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl Default for QuatRecord {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl From<QuatRecord> for Quat {
    fn from(r: QuatRecord) -> Self {
        Quat::from_xyzw(r.x, r.y, r.z, r.w)
    }
}

impl From<Quat> for QuatRecord {
    fn from(q: Quat) -> Self {
        Self { x: q.x, y: q.y, z: q.z, w: q.w }
    }
}

/// Reads and writes the calibration field of one profile document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for [`default_profile_path`]; `None` when there is no home directory
    pub fn at_default_location() -> Option<Self> {
        default_profile_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole document; a missing file reads as an empty object
    pub fn read_document(&self) -> Result<Value> {
        if !self.path.exists() {
            return Ok(Value::Object(Map::new()));
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write_document(&self, document: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut json = serde_json::to_string_pretty(document)?;
        json.push('\n');
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Stored correction, or identity when there is none or it cannot be read
    pub fn strabismus_correction(&self) -> Quat {
        let document = match self.read_document() {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to parse config {}: {}", self.path.display(), e);
                return Quat::IDENTITY;
            }
        };
        match document.get(STRABISMUS_CORRECTION_KEY) {
            None | Some(Value::Null) => Quat::IDENTITY,
            Some(value) => match QuatRecord::deserialize(value) {
                Ok(record) => record.into(),
                Err(e) => {
                    warn!("Ignoring malformed {}: {}", STRABISMUS_CORRECTION_KEY, e);
                    Quat::IDENTITY
                }
            },
        }
    }

    /// Replace the stored correction, keeping every other field of the document.
    ///
    /// A document that exists but does not parse is left alone and the error
    /// is returned.
    pub fn set_strabismus_correction(&self, q: Quat) -> Result<()> {
        let mut document = self.read_document()?;
        if !document.is_object() {
            document = Value::Object(Map::new());
        }
        if let Value::Object(fields) = &mut document {
            fields.insert(
                STRABISMUS_CORRECTION_KEY.to_string(),
                serde_json::to_value(QuatRecord::from(q))?,
            );
        }
        self.write_document(&document)?;
        info!("Saved strabismus correction to {}", self.path.display());
        Ok(())
    }
}
