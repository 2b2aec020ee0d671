use std::{fs, io, path::PathBuf};

use raindrop_session::{BestScoreStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestScoreRecord {
    #[serde(rename = "Best_Score")]
    best_score: i64,
}

/// Best-score store backed by a small JSON document on disk.
#[derive(Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&self) -> i64 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return 0,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "could not read best score");
                return 0;
            }
        };
        match serde_json::from_str::<BestScoreRecord>(&contents) {
            Ok(record) => record.best_score,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "ignoring malformed best score file");
                0
            }
        }
    }

    fn save(&mut self, best: i64) -> Result<(), StoreError> {
        let record = BestScoreRecord { best_score: best };
        let json = serde_json::to_string_pretty(&record).map_err(|error| StoreError::new(best, error))?;
        fs::write(&self.path, json).map_err(|error| StoreError::new(best, error))
    }
}
