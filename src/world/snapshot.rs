//! On-disk world snapshots.
//!
//! Snapshots are JSON documents. Paths ending in `.gz` are gzip-compressed on
//! write; compression is detected from the file header on read, so a renamed
//! file still loads.

use super::{BodyOptions, WorldError};
use crate::util::Point;
use chrono::Utc;
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

pub const CURRENT_VERSION: u32 = 1;

/// Body-local collision geometry, in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Circle { radius: f64 },
    Rect { half_width: f64, half_height: f64 },
    Convex { vertices: Vec<Point> },
    Complex { vertices: Vec<Point> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    Distance,
    Pin,
    Motor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: u64,
    pub shape: ShapeSpec,
    pub position: Point,
    pub angle: f64,
    #[serde(default)]
    pub linear_velocity: Point,
    #[serde(default)]
    pub angular_velocity: f64,
    pub options: BodyOptions,
}

/// A joint between `body_a` and either `body_b` or the static world.
///
/// `anchor_a` is local to `body_a`. `anchor_b` is local to `body_b` when there
/// is one, otherwise it is the world-space anchor in meters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JointSnapshot {
    pub kind: JointKind,
    pub body_a: u64,
    #[serde(default)]
    pub body_b: Option<u64>,
    pub anchor_a: Point,
    pub anchor_b: Point,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub last_modified: String,
    #[serde(default)]
    pub bodies: Vec<BodySnapshot>,
    #[serde(default)]
    pub joints: Vec<JointSnapshot>,
}

impl WorldSnapshot {
    pub fn new(bodies: Vec<BodySnapshot>, joints: Vec<JointSnapshot>) -> Self {
        Self {
            version: CURRENT_VERSION,
            last_modified: Utc::now().to_rfc3339(),
            bodies,
            joints,
        }
    }
}

/// Writes `snapshot` to `path`, gzip-compressing when the extension is `.gz`.
pub fn write_snapshot(path: &Path, snapshot: &WorldSnapshot) -> Result<(), WorldError> {
    let json = serde_json::to_vec_pretty(snapshot)?;
    let payload = if wants_compression(path) {
        compress(&json).map_err(|source| io_error(path, source))?
    } else {
        json
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    fs::write(path, &payload).map_err(|source| io_error(path, source))?;

    info!(
        "Saved world snapshot to {} ({} bodies, {} joints)",
        path.display(),
        snapshot.bodies.len(),
        snapshot.joints.len()
    );
    Ok(())
}

/// Reads a snapshot written by [`write_snapshot`].
pub fn read_snapshot(path: &Path) -> Result<WorldSnapshot, WorldError> {
    let file_bytes = fs::read(path).map_err(|source| io_error(path, source))?;

    let json = if is_gzip(&file_bytes) {
        debug!("Snapshot {} is gzip-compressed", path.display());
        let mut decoder = GzDecoder::new(&file_bytes[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|source| io_error(path, source))?;
        out
    } else {
        file_bytes
    };

    let snapshot: WorldSnapshot = serde_json::from_slice(&json)?;
    if snapshot.version > CURRENT_VERSION {
        return Err(WorldError::UnsupportedVersion(snapshot.version));
    }
    Ok(snapshot)
}

fn io_error(path: &Path, source: std::io::Error) -> WorldError {
    WorldError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn wants_compression(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> WorldSnapshot {
        WorldSnapshot::new(
            vec![BodySnapshot {
                id: 3,
                shape: ShapeSpec::Circle { radius: 0.8 },
                position: Point::new(2.0, 5.0),
                angle: 0.25,
                linear_velocity: Point::ORIGIN,
                angular_velocity: -1.5,
                options: BodyOptions::default(),
            }],
            vec![JointSnapshot {
                kind: JointKind::Pin,
                body_a: 3,
                body_b: None,
                anchor_a: Point::ORIGIN,
                anchor_b: Point::new(2.0, 5.0),
            }],
        )
    }

    #[test]
    fn compressed_snapshots_are_detected_on_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scene.json.gz");
        write_snapshot(&path, &sample()).unwrap();

        let raw = fs::read(&path).unwrap();
        assert!(is_gzip(&raw));

        let loaded = read_snapshot(&path).unwrap();
        assert_eq!(loaded.bodies.len(), 1);
        assert_eq!(loaded.bodies[0].shape, ShapeSpec::Circle { radius: 0.8 });
        assert_eq!(loaded.joints[0].kind, JointKind::Pin);
    }

    #[test]
    fn newer_versions_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("future.json");
        let mut snapshot = sample();
        snapshot.version = CURRENT_VERSION + 1;
        fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

        assert!(matches!(
            read_snapshot(&path),
            Err(WorldError::UnsupportedVersion(v)) if v == CURRENT_VERSION + 1
        ));
    }

    #[test]
    fn garbage_is_a_format_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(read_snapshot(&path), Err(WorldError::Format(_))));
    }
}
