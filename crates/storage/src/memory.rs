use crate::{PreferenceStore, Result, StorageError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Preference store kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().unwrap().is_empty()
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("preference {key}")))
    }
}
