use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use snake_core::{ReplayData, ReplayStore};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const REPLAY_FORMAT_VERSION: u32 = 1;
const REPLAY_FILE_NAME: &str = "last_game.replay";

/// On-disk envelope, versioned so the format can evolve.
#[derive(Debug, Serialize, Deserialize)]
struct ReplayFile {
    version: u32,
    replay: ReplayData,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("replay file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported replay format version {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Gzipped JSON persistence for the last recorded game. Every failure
/// degrades to "no replay available" at the `ReplayStore` seam; nothing
/// here can reach the engine as an error.
pub struct FileReplayStore {
    path: PathBuf,
}

impl FileReplayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileReplayStore {
            path: dir.into().join(REPLAY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, data: &ReplayData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        let envelope = ReplayFile {
            version: REPLAY_FORMAT_VERSION,
            replay: data.clone(),
        };
        let json = serde_json::to_string(&envelope)?;
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?;
        Ok(())
    }

    fn read(&self) -> Result<ReplayData, StoreError> {
        let file = File::open(&self.path)?;
        let mut decoder = GzDecoder::new(file);
        let mut raw = String::new();
        decoder.read_to_string(&mut raw)?;
        let envelope: ReplayFile = serde_json::from_str(&raw)?;
        if envelope.version != REPLAY_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(envelope.version));
        }
        Ok(envelope.replay)
    }
}

impl ReplayStore for FileReplayStore {
    fn save(&mut self, data: &ReplayData) -> bool {
        match self.write(data) {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to save replay to {:?}: {err}", self.path);
                false
            }
        }
    }

    fn load(&self) -> Option<ReplayData> {
        match self.read() {
            Ok(replay) if replay.is_valid() => Some(replay),
            Ok(_) => {
                warn!("stored replay failed validation, treating as absent");
                None
            }
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!("failed to load replay from {:?}: {err}", self.path);
                None
            }
        }
    }

    fn exists(&self) -> bool {
        self.load().is_some()
    }

    fn clear(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                warn!("failed to clear replay at {:?}: {err}", self.path);
            }
        }
    }
}
