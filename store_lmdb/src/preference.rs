//! LMDB implementation of PreferenceStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use clockin_store::{PreferenceStore, StoreError};

use crate::LmdbError;

pub struct LmdbPreferenceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) preferences_db: Database<Bytes, Bytes>,
}

impl PreferenceStore for LmdbPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .preferences_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| StoreError::Serialization(format!("preference '{key}': {e}"))),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.preferences_db
            .put(&mut wtxn, key.as_bytes(), value.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.preferences_db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
    use clockin_store::SECURITY_MODE_KEY;

    #[test]
    fn put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        let store = env.preference_store();

        assert_eq!(store.get(SECURITY_MODE_KEY).unwrap(), None);
        store.put(SECURITY_MODE_KEY, "wifi-only").unwrap();
        assert_eq!(
            store.get(SECURITY_MODE_KEY).unwrap().as_deref(),
            Some("wifi-only")
        );
        store.delete(SECURITY_MODE_KEY).unwrap();
        assert_eq!(store.get(SECURITY_MODE_KEY).unwrap(), None);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
            env.preference_store()
                .put(SECURITY_MODE_KEY, "photo-only")
                .unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        assert_eq!(
            env.preference_store()
                .get(SECURITY_MODE_KEY)
                .unwrap()
                .as_deref(),
            Some("photo-only")
        );
    }
}
