use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::snake::Direction;

/// One recorded turn. The log is sparse: only ticks where the heading
/// actually changed are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayMove {
    pub tick: u32,
    pub direction: Direction,
}

/// Everything needed to reproduce a session bit-for-bit: the RNG seed plus
/// the sparse move log. Final stats ride along for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayData {
    pub seed: u32,
    pub moves: Vec<ReplayMove>,
    pub final_score: u32,
    pub final_length: usize,
    pub timestamp: u64,
}

impl ReplayData {
    /// Structural checks beyond what deserialization already enforces:
    /// ticks start at 1 and never decrease.
    pub fn is_valid(&self) -> bool {
        let mut last = 0;
        for entry in &self.moves {
            if entry.tick < 1 || entry.tick < last {
                return false;
            }
            last = entry.tick;
        }
        true
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to encode replay data")
    }

    /// Decodes and validates. Malformed input is an error, which callers
    /// degrade to "no replay available".
    pub fn from_json(raw: &str) -> Result<ReplayData> {
        let data: ReplayData = serde_json::from_str(raw).context("failed to decode replay data")?;
        if !data.is_valid() {
            bail!("replay move log is out of order");
        }
        Ok(data)
    }
}

/// Playback scanner over a move log. Each tick, every not-yet-applied entry
/// whose tick has been reached is consumed in order; the last one wins.
#[derive(Debug, Clone)]
pub struct ReplayCursor {
    moves: Vec<ReplayMove>,
    index: usize,
}

impl ReplayCursor {
    pub fn new(moves: Vec<ReplayMove>) -> Self {
        ReplayCursor { moves, index: 0 }
    }

    pub fn next_direction(&mut self, tick: u32) -> Option<Direction> {
        let mut direction = None;
        while self.index < self.moves.len() && self.moves[self.index].tick <= tick {
            direction = Some(self.moves[self.index].direction);
            self.index += 1;
        }
        direction
    }
}

/// Persistence collaborator for the last recorded game. Implementations
/// must never panic into the engine: failures read as `false` or `None`.
pub trait ReplayStore {
    fn save(&mut self, data: &ReplayData) -> bool;
    fn load(&self) -> Option<ReplayData>;
    fn exists(&self) -> bool;
    fn clear(&mut self);
}

/// Store for headless sessions and tests: nothing is ever kept.
#[derive(Debug, Default)]
pub struct NullReplayStore;

impl ReplayStore for NullReplayStore {
    fn save(&mut self, _data: &ReplayData) -> bool {
        false
    }

    fn load(&self) -> Option<ReplayData> {
        None
    }

    fn exists(&self) -> bool {
        false
    }

    fn clear(&mut self) {}
}
