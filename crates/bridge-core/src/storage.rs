//! Storage Seams
//!
//! Key-value storage and cookie access behind traits so the bridge never
//! touches page globals directly. Absent keys are `None`, never errors.

use std::collections::HashMap;
use std::sync::RwLock;

/// Persistent string key-value storage (local-storage shaped)
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);
}

/// Cookie access
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    /// Set a cookie; `max_age_days` of `None` means session-scoped
    fn set(&self, name: &str, value: &str, max_age_days: Option<u32>);
}

/// In-memory key-value store (for development/testing)
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

/// In-memory cookie jar (for development/testing)
pub struct MemoryCookieJar {
    cookies: RwLock<HashMap<String, String>>,
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self {
            cookies: RwLock::new(HashMap::new()),
        }
    }

    /// Parse a standard `name=value; name2=value2` cookie header
    ///
    /// Malformed segments (no `=`) are skipped.
    pub fn from_header(header: &str) -> Self {
        let jar = Self::new();
        {
            let mut cookies = jar.cookies.write().unwrap();
            for segment in header.split(';') {
                let segment = segment.trim();
                if let Some((name, value)) = segment.split_once('=') {
                    cookies.insert(name.trim().to_string(), value.trim().to_string());
                }
            }
        }
        jar
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.read().unwrap().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str, _max_age_days: Option<u32>) {
        self.cookies
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }
}
