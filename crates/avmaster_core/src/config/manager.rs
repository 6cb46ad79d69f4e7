//! Loading and saving the settings file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::DocumentMut;

use super::settings::{ConfigSection, Settings};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config is not valid TOML: {0}")]
    DocumentError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings file path and the settings read from it.
///
/// A missing file is not an error for [`load_or_default`](Self::load_or_default),
/// which never writes, so it is safe for dry runs. Saving replaces the file
/// atomically.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
    unknown_sections: Vec<String>,
}

impl ConfigManager {
    /// Does not read anything yet.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
            unknown_sections: Vec::new(),
        }
    }

    /// `<config dir>/avmaster/settings.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("avmaster")
            .join("settings.toml")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory only until [`save`](Self::save).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Tables in the file that avmaster does not know.
    pub fn unknown_sections(&self) -> &[String] {
        &self.unknown_sections
    }

    pub fn load(&mut self) -> ConfigResult<()> {
        let content = match fs::read_to_string(&self.config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(self.config_path.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        self.unknown_sections = unknown_tables(&content.parse::<DocumentMut>()?);
        for name in &self.unknown_sections {
            tracing::warn!(
                "Ignoring unknown config section [{}] in {}",
                name,
                self.config_path.display()
            );
        }

        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    pub fn load_or_default(&mut self) -> ConfigResult<()> {
        match self.load() {
            Err(ConfigError::NotFound(_)) => {
                self.settings = Settings::default();
                Ok(())
            }
            other => other,
        }
    }

    /// Like [`load_or_default`](Self::load_or_default), but writes the
    /// defaults out when the file is missing.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        match self.load() {
            Err(ConfigError::NotFound(_)) => {
                self.settings = Settings::default();
                self.save()
            }
            other => other,
        }
    }

    /// Write the settings with a comment above each section.
    pub fn save(&self) -> ConfigResult<()> {
        let document = self.render()?;
        self.replace_file(&document.to_string())?;
        Ok(())
    }

    fn render(&self) -> ConfigResult<DocumentMut> {
        let mut document: DocumentMut = toml::to_string_pretty(&self.settings)?.parse()?;

        for (i, section) in ConfigSection::ALL.iter().enumerate() {
            let header = if i == 0 {
                "# avmaster settings. Missing keys use built-in defaults.\n"
            } else {
                ""
            };
            if let Some(table) = document
                .get_mut(section.table_name())
                .and_then(|item| item.as_table_mut())
            {
                table
                    .decor_mut()
                    .set_prefix(format!("{}\n# {}\n", header, section.comment()));
            }
        }
        Ok(document)
    }

    /// Temp file in the same directory, then rename over the target.
    fn replace_file(&self, content: &str) -> io::Result<()> {
        let dir = match self.config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".settings-")
            .suffix(".toml")
            .tempfile_in(&dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.config_path)
            .map_err(|e| e.error)?;
        Ok(())
    }
}

fn unknown_tables(document: &DocumentMut) -> Vec<String> {
    document
        .iter()
        .map(|(key, _)| key)
        .filter(|key| ConfigSection::from_table_name(key).is_none())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_writes_commented_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("avmaster").join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.starts_with("# avmaster settings."), "{content}");
        assert!(content.contains("# Loudness target and dynamics chain\n[mastering]"));
        assert!(content.contains("[mastering.compressor]"));
        assert!(content.contains("[logging]"));

        let leftovers = fs::read_dir(config_path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".settings-"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.settings_mut().mastering.integrated_lufs = -14.0;
        manager.settings_mut().batch.workers = 3;
        manager.save().unwrap();

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().mastering.integrated_lufs, -14.0);
        assert_eq!(reloaded.settings().batch.workers, 3);
        assert!(reloaded.unknown_sections().is_empty());
    }

    #[test]
    fn load_or_default_never_writes() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_default().unwrap();

        assert!(!config_path.exists());
        assert_eq!(manager.settings().format.bitrate_kbps, 192);
    }

    #[test]
    fn unknown_tables_are_reported_not_fatal() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        fs::write(
            &config_path,
            "[paths]\nassets_dir = \"/srv/assets\"\n\n[remux]\ncontainer = \"mkv\"\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load().unwrap();

        assert_eq!(manager.settings().paths.assets_dir, "/srv/assets");
        assert_eq!(manager.unknown_sections(), ["remux".to_string()]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("nope.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        fs::write(&config_path, "[paths\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(manager.load_or_default().is_err());
    }
}
