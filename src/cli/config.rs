use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Local seed data: users to register with a fresh crew service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub fn load_seed_file(path: &Path) -> anyhow::Result<SeedFile> {
    if !path.exists() {
        return Ok(SeedFile::default());
    }

    let content = fs::read_to_string(path)?;
    let seed: SeedFile = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{} is not a valid seed file: {}", path.display(), e))?;
    Ok(seed)
}

pub fn save_seed_file(path: &Path, seed: &SeedFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(seed)?;
    fs::write(path, content)?;
    Ok(())
}
