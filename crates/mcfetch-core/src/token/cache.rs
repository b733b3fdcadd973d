use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Registration tokens keyed by project id, for one download batch.
///
/// Holds at most one token per project; entries are never replaced.
#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: HashMap<String, String>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, project_id: &str) -> Option<&str> {
        self.tokens.get(project_id).map(String::as_str)
    }

    /// Cached token for `project_id`, or the result of `acquire` stored
    /// under it. `acquire` is not called on a hit; its error leaves the
    /// cache unchanged.
    pub fn get_or_try_insert_with<E, F>(&mut self, project_id: &str, acquire: F) -> Result<&str, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        match self.tokens.entry(project_id.to_string()) {
            Entry::Occupied(e) => Ok(e.into_mut().as_str()),
            Entry::Vacant(e) => {
                let token = acquire()?;
                Ok(e.insert(token).as_str())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
