//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::{LmdbAttendanceStore, LmdbError, LmdbPreferenceStore};

/// Default map size: plenty for years of attendance rows.
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    preferences_db: Database<Bytes, Bytes>,
    attendance_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this
        // directory and no other code maps the same files.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let preferences_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some("preferences"))?;
        let attendance_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some("attendance"))?;
        wtxn.commit()?;

        info!("opened LMDB store at {}", path.display());
        Ok(Self {
            env: Arc::new(env),
            preferences_db,
            attendance_db,
        })
    }

    pub fn preference_store(&self) -> LmdbPreferenceStore {
        LmdbPreferenceStore {
            env: Arc::clone(&self.env),
            preferences_db: self.preferences_db,
        }
    }

    pub fn attendance_store(&self) -> LmdbAttendanceStore {
        LmdbAttendanceStore {
            env: Arc::clone(&self.env),
            attendance_db: self.attendance_db,
        }
    }
}
