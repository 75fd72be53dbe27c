//! Saved accounts and gift targets, persisted as JSON arrays.

use crate::credential::mask_id;
use crate::error::RegistryError;
use core_logic::JsonStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub nickname: String,
    pub user_id: String,
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.nickname, mask_id(&self.user_id))
    }
}

/// Recipient of light/heart gifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub user_id: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.name, mask_id(&self.user_id))
    }
}

/// Ordered list of records backed by one JSON file. Every mutation is saved immediately.
pub struct RecordList<T> {
    path: PathBuf,
    entries: Vec<T>,
}

impl<T> RecordList<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Entries that do not decode are skipped with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let raw: Vec<serde_json::Value> = JsonStore::load_or_default(&path);
        let entries = raw
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping entry {} in {}: {}", i, path.display(), e);
                    None
                }
            })
            .collect();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<(), RegistryError> {
        JsonStore::save(&self.path, &self.entries)?;
        Ok(())
    }

    fn push(&mut self, entry: T) -> Result<(), RegistryError> {
        self.entries.push(entry);
        self.save()
    }

    fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> Result<Vec<T>, RegistryError> {
        let (removed, kept): (Vec<T>, Vec<T>) = self.entries.drain(..).partition(|e| pred(e));
        self.entries = kept;
        if !removed.is_empty() {
            self.save()?;
        }
        Ok(removed)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, RegistryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RegistryError::MissingField(field));
    }
    Ok(value.to_string())
}

pub type UserRegistry = RecordList<UserProfile>;
pub type TargetRegistry = RecordList<Target>;

impl RecordList<UserProfile> {
    pub fn add(&mut self, nickname: &str, user_id: &str) -> Result<UserProfile, RegistryError> {
        let user = UserProfile {
            nickname: required(nickname, "Nickname")?,
            user_id: required(user_id, "User ID")?,
        };
        self.push(user.clone())?;
        Ok(user)
    }

    /// Looks a user up by exact nickname, else by 0-based list index.
    pub fn find(&self, key: &str) -> Result<&UserProfile, RegistryError> {
        self.position(key).map(|i| &self.entries[i])
    }

    pub fn remove(&mut self, key: &str) -> Result<UserProfile, RegistryError> {
        let index = self.position(key)?;
        let user = self.entries.remove(index);
        self.save()?;
        Ok(user)
    }

    fn position(&self, key: &str) -> Result<usize, RegistryError> {
        let key = key.trim();
        self.entries
            .iter()
            .position(|u| u.nickname == key)
            .or_else(|| key.parse::<usize>().ok().filter(|i| *i < self.entries.len()))
            .ok_or_else(|| RegistryError::UnknownUser(key.to_string()))
    }
}

impl RecordList<Target> {
    pub fn add(&mut self, name: &str, user_id: &str) -> Result<Target, RegistryError> {
        let target = Target {
            name: required(name, "Target name")?,
            user_id: required(user_id, "Target ID")?,
        };
        self.push(target.clone())?;
        Ok(target)
    }

    /// Removes every target whose id is listed. Returns what was removed.
    pub fn remove_ids(&mut self, ids: &[String]) -> Result<Vec<Target>, RegistryError> {
        self.remove_where(|t| ids.iter().any(|id| *id == t.user_id))
    }

    pub fn select_ids(&self, ids: &[String]) -> Vec<Target> {
        self.entries
            .iter()
            .filter(|t| ids.iter().any(|id| *id == t.user_id))
            .cloned()
            .collect()
    }
}
