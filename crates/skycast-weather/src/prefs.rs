//! JSON-file-backed key/value preference store.
//!
//! Holds the selected city, unit choice, and the last successful forecast
//! payload. Values are kept in memory and written through to disk on every
//! put, so a read after a write always observes the new value.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::Value;

const PREFS_FILE: &str = "prefs.json";

pub struct PrefStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl PrefStore {
    /// Open the store at `dir/prefs.json`, loading any existing contents.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("Failed to create preference directory")?;
        let path = dir.join(PREFS_FILE);

        let values = if path.exists() {
            let raw = fs::read_to_string(&path).context("Failed to read preference file")?;
            serde_json::from_str(&raw).context("Failed to parse preference file")?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .get(key)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, Value::from(value))
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.lock().get(key).and_then(Value::as_f64)
    }

    pub fn put_f64(&self, key: &str, value: f64) -> Result<()> {
        self.put(key, Value::from(value))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.lock().get(key).and_then(Value::as_bool)
    }

    pub fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.put(key, Value::from(value))
    }

    /// Drop a key entirely; absent keys fall back to their defaults on read.
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock();
        if values.remove(key).is_some() {
            Self::flush(&self.path, &values)?;
        }
        Ok(())
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value);
        Self::flush(&self.path, &values)
    }

    fn flush(path: &Path, values: &BTreeMap<String, Value>) -> Result<()> {
        let json =
            serde_json::to_string_pretty(values).context("Failed to serialize preferences")?;
        fs::write(path, json).context("Failed to write preference file")?;
        Ok(())
    }
}
