use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_catalogue_path")]
    pub catalogue_path: PathBuf,
    #[serde(default = "default_tags_path")]
    pub tags_path: PathBuf,
    /// Tags shown by `picker tags` unless `--all` is given.
    #[serde(default = "default_tag_list_limit")]
    pub tag_list_limit: usize,
    /// Tags shown per commander in listings.
    #[serde(default = "default_preview_tag_limit")]
    pub preview_tag_limit: usize,
}

fn default_catalogue_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_CATALOGUE_FILE)
}

fn default_tags_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_TAGS_FILE)
}

fn default_tag_list_limit() -> usize {
    36
}

fn default_preview_tag_limit() -> usize {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalogue_path: default_catalogue_path(),
            tags_path: default_tags_path(),
            tag_list_limit: default_tag_list_limit(),
            preview_tag_limit: default_preview_tag_limit(),
        }
    }
}

impl Config {
    /// Load `.picker/config.yaml`; a missing file means defaults.
    pub fn load(root: &Path) -> Result<Self> {
        match crate::io::read_optional(&paths::config_path(root))? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    pub fn catalogue_file(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.catalogue_path)
    }

    pub fn tags_file(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.tags_path)
    }

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let catalogue = self.catalogue_file(root);
        if !catalogue.exists() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("catalogue file not found: {}", catalogue.display()),
            });
        }
        if !self.tags_file(root).exists() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "tag file not found; commanders will have no tags".to_string(),
            });
        }
        for (field, value) in [
            ("tag_list_limit", self.tag_list_limit),
            ("preview_tag_limit", self.preview_tag_limit),
        ] {
            if value == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{field} must be greater than zero"),
                });
            }
        }
        warnings
    }
}
