//! The VST3 plugin format

use crate::{
    audio::AudioConfig,
    description::PluginDescription,
    error::{Error, Result},
    format::{PluginFormat, PluginInstance},
    internal::plugin_impl::{describe_module, Vst3Instance, Vst3Module},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Format name stored in descriptions of VST3 plugins
pub const VST3_FORMAT_NAME: &str = "VST3";

/// Finds, describes and loads `.vst3` bundles
#[derive(Debug, Default, Clone, Copy)]
pub struct Vst3Format;

impl Vst3Format {
    /// Create the format
    pub fn new() -> Self {
        Self
    }
}

impl PluginFormat for Vst3Format {
    fn name(&self) -> &str {
        VST3_FORMAT_NAME
    }

    fn default_search_paths(&self) -> Vec<PathBuf> {
        standard_paths()
    }

    fn find_plugin_files(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut plugins = Vec::new();

        for path in paths {
            if path.exists() {
                scan_directory(path, &mut plugins);
            }
        }

        plugins.sort();
        plugins.dedup();
        plugins
    }

    fn find_descriptions(&self, file: &Path) -> Result<Vec<PluginDescription>> {
        let binary = binary_path(file)?;
        let module = Vst3Module::load(&binary)?;
        let descriptions = describe_module(&module, file, VST3_FORMAT_NAME);

        if descriptions.is_empty() {
            return Err(Error::PluginLoadFailed(format!(
                "No audio component found in {}",
                file.display()
            )));
        }
        Ok(descriptions)
    }

    fn create_instance(
        &self,
        desc: &PluginDescription,
        _config: &AudioConfig,
    ) -> Result<Box<dyn PluginInstance>> {
        let bundle = desc
            .file()
            .ok_or_else(|| Error::PluginNotFound(desc.name.clone()))?;

        if !bundle.exists() {
            return Err(Error::PluginNotFound(bundle.display().to_string()));
        }

        let binary = binary_path(&bundle)?;
        let module = Vst3Module::load(&binary)?;
        let instance = Vst3Instance::create(module, desc)?;
        log::debug!("Loaded VST3 {} from {}", desc.name, bundle.display());
        Ok(Box::new(instance))
    }
}

/// Standard VST3 directories for this platform
pub fn standard_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/Library/Audio/Plug-Ins/VST3"));
        if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(format!("{}/Library/Audio/Plug-Ins/VST3", home)));
        }
    }

    #[cfg(target_os = "windows")]
    {
        paths.push(PathBuf::from(r"C:\Program Files\Common Files\VST3"));
        paths.push(PathBuf::from(r"C:\Program Files (x86)\Common Files\VST3"));
    }

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/lib/vst3"));
        paths.push(PathBuf::from("/usr/local/lib/vst3"));
        if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(format!("{}/.vst3", home)));
        }
    }

    paths
}

fn is_vst3(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("vst3"))
}

/// Recursively collect `.vst3` bundles, without descending into them
fn scan_directory(dir: &Path, plugins: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        log::debug!("Cannot read {}", dir.display());
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if is_vst3(&path) {
            plugins.push(path);
        } else if path.is_dir() {
            scan_directory(&path, plugins);
        }
    }
}

/// Platform-specific VST3 binary path resolution
pub fn binary_path(bundle_path: &Path) -> Result<PathBuf> {
    if bundle_path.is_file() {
        return Ok(bundle_path.to_path_buf());
    }

    #[cfg(target_os = "macos")]
    {
        let contents_path = bundle_path.join("Contents").join("MacOS");
        if let Ok(entries) = std::fs::read_dir(&contents_path) {
            for entry in entries.flatten() {
                let file_path = entry.path();
                let Some(name) = file_path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if file_path.is_file()
                    && !name.starts_with('.')
                    && !name.ends_with(".plist")
                    && !name.ends_with(".txt")
                {
                    return Ok(file_path);
                }
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        for arch in ["x86_64-win", "x86-win"] {
            let contents_path = bundle_path.join("Contents").join(arch);
            if let Ok(entries) = std::fs::read_dir(&contents_path) {
                for entry in entries.flatten() {
                    let file_path = entry.path();
                    if is_vst3(&file_path) {
                        return Ok(file_path);
                    }
                }
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        for arch in ["x86_64-linux", "aarch64-linux", "i386-linux"] {
            let contents_path = bundle_path.join("Contents").join(arch);
            if let Ok(entries) = std::fs::read_dir(&contents_path) {
                for entry in entries.flatten() {
                    let file_path = entry.path();
                    if file_path.extension() == Some(OsStr::new("so")) {
                        return Ok(file_path);
                    }
                }
            }
        }
    }

    Err(Error::PluginNotFound(format!(
        "Could not find VST3 binary in bundle: {}",
        bundle_path.display()
    )))
}
