//! Application settings and the locations of the files the host keeps

use crate::errors::{AppError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use session_engine::{AudioConfig, SortMethod};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Load directory purpose used by the sound file chooser
pub const AUDIO_FILE_PURPOSE: &str = "audio-file";

/// Catppuccin flavour of the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThemeFlavour {
    Latte,
    Frappe,
    Macchiato,
    #[default]
    Mocha,
}

impl ThemeFlavour {
    pub const ALL: [ThemeFlavour; 4] = [
        ThemeFlavour::Latte,
        ThemeFlavour::Frappe,
        ThemeFlavour::Macchiato,
        ThemeFlavour::Mocha,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ThemeFlavour::Latte => "Latte",
            ThemeFlavour::Frappe => "Frappé",
            ThemeFlavour::Macchiato => "Macchiato",
            ThemeFlavour::Mocha => "Mocha",
        }
    }

    pub fn theme(&self) -> catppuccin_egui::Theme {
        match self {
            ThemeFlavour::Latte => catppuccin_egui::LATTE,
            ThemeFlavour::Frappe => catppuccin_egui::FRAPPE,
            ThemeFlavour::Macchiato => catppuccin_egui::MACCHIATO,
            ThemeFlavour::Mocha => catppuccin_egui::MOCHA,
        }
    }
}

/// User settings, stored as JSON in the platform config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: ThemeFlavour,
    /// How the plugin menu groups external plugins
    pub sort_method: SortMethod,
    /// Searched in addition to each format's default locations
    pub scan_paths: Vec<PathBuf>,
    /// Open a plugin's editor as soon as it is added to the track
    pub show_editor_on_insert: bool,
    /// Last directory used per file chooser purpose
    pub default_load_dirs: BTreeMap<String, PathBuf>,
    pub audio: AudioConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeFlavour::default(),
            sort_method: SortMethod::ByManufacturer,
            scan_paths: Vec::new(),
            show_editor_on_insert: false,
            default_load_dirs: BTreeMap::new(),
            audio: AudioConfig::default(),
        }
    }
}

impl AppSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring settings in {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Where the file chooser for `purpose` should start
    pub fn default_load_directory(&self, purpose: &str) -> Option<&Path> {
        self.default_load_dirs
            .get(purpose)
            .map(PathBuf::as_path)
            .filter(|dir| dir.is_dir())
    }

    pub fn set_default_load_directory(&mut self, purpose: &str, dir: impl Into<PathBuf>) {
        self.default_load_dirs.insert(purpose.to_string(), dir.into());
    }
}

/// Files the host reads at start and writes on exit
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub settings_file: PathBuf,
    pub known_plugins_file: PathBuf,
    pub session_file: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "PluginHost", "plugin-host").ok_or(AppError::NoProjectDirs)?;
        Ok(Self::in_dirs(dirs.config_dir(), dirs.data_dir()))
    }

    pub fn in_dirs(config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            settings_file: config_dir.join("settings.json"),
            known_plugins_file: data_dir.join("known-plugins.json"),
            session_file: data_dir.join("session.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load_or_default(&dir.path().join("nope.json"));
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn settings_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("settings.json");

        let mut settings = AppSettings {
            theme: ThemeFlavour::Latte,
            sort_method: SortMethod::ByCategory,
            show_editor_on_insert: true,
            ..Default::default()
        };
        settings.scan_paths.push(PathBuf::from("/opt/vst3"));
        settings.set_default_load_directory(AUDIO_FILE_PURPOSE, dir.path());
        settings.save(&path).unwrap();

        let loaded = AppSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.default_load_directory(AUDIO_FILE_PURPOSE), Some(dir.path()));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "show_editor_on_insert": true }"#).unwrap();

        let settings = AppSettings::load_or_default(&path);
        assert!(settings.show_editor_on_insert);
        assert_eq!(settings.theme, ThemeFlavour::Mocha);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(AppSettings::load_or_default(&path), AppSettings::default());
    }

    #[test]
    fn vanished_directories_are_not_offered() {
        let mut settings = AppSettings::default();
        settings.set_default_load_directory(AUDIO_FILE_PURPOSE, "/definitely/not/here");
        assert_eq!(settings.default_load_directory(AUDIO_FILE_PURPOSE), None);
    }
}
