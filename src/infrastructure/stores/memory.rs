use std::collections::HashMap;

use anyhow::Result;

use crate::domain::models::KeyValueStore;

/// Store that lives for the process only. Used when no cache directory is
/// available.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_values(values: &[(&str, &str)]) -> MemoryStore {
        let values = values
            .iter()
            .map(|(key, value)| return (key.to_string(), value.to_string()))
            .collect();

        return MemoryStore { values };
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        return self.values.get(key).cloned();
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        return Ok(());
    }
}
