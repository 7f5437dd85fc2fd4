use anyhow::Result;
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use uuid::Uuid;

/// Per-session directory of stage outputs (`layout`, `images`, `code`,
/// `refine-N`), one pretty JSON file each.
pub struct Journal {
    dir: PathBuf,
    tx: Uuid,
    refinements: AtomicUsize,
}

#[derive(Serialize)]
struct StageRecord<'a, T: Serialize> {
    stage: &'a str,
    transaction: Uuid,
    timestamp: DateTime<Utc>,
    payload: &'a T,
}

fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".weaver").join("tx").join(tx.to_string())
}

impl Journal {
    pub fn new(root: &Path, tx: Uuid) -> Self {
        let dir = tx_dir(root, tx);
        debug!(dir = %dir.display(), "planned artifacts directory");
        Self { dir, tx, refinements: AtomicUsize::new(0) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_stage<T: Serialize>(&self, stage: &str, payload: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let record = StageRecord {
            stage,
            transaction: self.tx,
            timestamp: Utc::now(),
            payload,
        };
        let p = self.dir.join(format!("{stage}.json"));
        fs::write(&p, to_string_pretty(&record)?)?;
        debug!(stage, path = %p.display(), "stage saved");
        Ok(p)
    }

    /// Stage name for the next refinement: `refine-1`, `refine-2`, ...
    pub fn next_refine_stage(&self) -> String {
        let n = self.refinements.fetch_add(1, Ordering::Relaxed) + 1;
        format!("refine-{n}")
    }
}
