use anyhow::Result;

/// String key-value storage for values that outlive a single run.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

pub type StoreBox = Box<dyn KeyValueStore + Send>;
