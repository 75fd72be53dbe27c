use std::path::{Path, PathBuf};

/// Well-known data files, all resolved under one base directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    base: PathBuf,
}

impl DataPaths {
    pub const PICKUP_FILE: &'static str = "pickup_data.json";
    pub const USERS_FILE: &'static str = "users.json";
    pub const QUEST_NAMES_FILE: &'static str = "questname.json";
    pub const COLLECTIBLES_FILE: &'static str = "claimquest.json";
    pub const TARGETS_FILE: &'static str = "targets.json";
    pub const CONFIG_FILE: &'static str = "config.json";

    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn pickup(&self) -> PathBuf {
        self.base.join(Self::PICKUP_FILE)
    }

    pub fn users(&self) -> PathBuf {
        self.base.join(Self::USERS_FILE)
    }

    pub fn quest_names(&self) -> PathBuf {
        self.base.join(Self::QUEST_NAMES_FILE)
    }

    pub fn collectibles(&self) -> PathBuf {
        self.base.join(Self::COLLECTIBLES_FILE)
    }

    pub fn targets(&self) -> PathBuf {
        self.base.join(Self::TARGETS_FILE)
    }

    pub fn config(&self) -> PathBuf {
        self.base.join(Self::CONFIG_FILE)
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(".")
    }
}
