//! Registry of plugin types found by scanning

use crate::description::PluginDescription;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Folder name used when a plugin has no value for the sort key
pub const UNNAMED_FOLDER: &str = "Other";

/// How [`KnownPluginList::create_tree`] groups plugins into folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMethod {
    /// One folder per manufacturer
    #[default]
    ByManufacturer,
    /// One folder per category
    ByCategory,
    /// One folder per plugin format
    ByFormat,
    /// No folders, all plugins sorted by name
    Alphabetical,
}

impl SortMethod {
    /// All sort methods, in menu order
    pub const ALL: [SortMethod; 4] = [
        SortMethod::ByManufacturer,
        SortMethod::ByCategory,
        SortMethod::ByFormat,
        SortMethod::Alphabetical,
    ];

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            SortMethod::ByManufacturer => "By manufacturer",
            SortMethod::ByCategory => "By category",
            SortMethod::ByFormat => "By format",
            SortMethod::Alphabetical => "Alphabetical",
        }
    }

    fn folder_key<'a>(&self, desc: &'a PluginDescription) -> Option<&'a str> {
        match self {
            SortMethod::ByManufacturer => Some(&desc.manufacturer),
            SortMethod::ByCategory => Some(&desc.category),
            SortMethod::ByFormat => Some(&desc.plugin_format_name),
            SortMethod::Alphabetical => None,
        }
    }
}

/// A folder of plugin descriptions, possibly nested
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginTree {
    /// Folder name (empty for the root)
    pub folder: String,
    /// Nested folders
    pub sub_folders: Vec<PluginTree>,
    /// Plugins directly in this folder
    pub plugins: Vec<PluginDescription>,
}

impl PluginTree {
    /// Whether the folder holds no plugins at any depth
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.sub_folders.iter().all(PluginTree::is_empty)
    }

    /// Number of plugins at any depth
    pub fn num_plugins(&self) -> usize {
        self.plugins.len()
            + self
                .sub_folders
                .iter()
                .map(PluginTree::num_plugins)
                .sum::<usize>()
    }
}

/// The set of plugin types the host knows about, plus the files that must
/// not be probed again
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnownPluginList {
    types: Vec<PluginDescription>,
    #[serde(default)]
    blacklist: Vec<PathBuf>,
}

impl KnownPluginList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// All known types, in insertion order
    pub fn types(&self) -> &[PluginDescription] {
        &self.types
    }

    /// Number of known types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are known
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Add a type, replacing an existing entry for the same plugin.
    /// Returns `true` if the type was new.
    pub fn add_type(&mut self, desc: PluginDescription) -> bool {
        if let Some(existing) = self.types.iter_mut().find(|t| t.is_duplicate_of(&desc)) {
            *existing = desc;
            false
        } else {
            self.types.push(desc);
            true
        }
    }

    /// Remove a type
    pub fn remove_type(&mut self, desc: &PluginDescription) {
        self.types.retain(|t| !t.is_duplicate_of(desc));
    }

    /// Remove all types that came from the given file
    pub fn remove_types_for_file(&mut self, file: &Path) {
        let file = file.to_string_lossy();
        self.types.retain(|t| t.file_or_identifier != file);
    }

    /// Forget every known type (the blacklist is kept)
    pub fn clear(&mut self) {
        self.types.clear();
    }

    /// Files that crashed or hung a previous scan
    pub fn blacklisted_files(&self) -> &[PathBuf] {
        &self.blacklist
    }

    /// Whether a file is blacklisted
    pub fn is_blacklisted(&self, file: &Path) -> bool {
        self.blacklist.iter().any(|p| p == file)
    }

    /// Stop probing a file on future scans
    pub fn add_to_blacklist(&mut self, file: PathBuf) {
        if !self.is_blacklisted(&file) {
            self.remove_types_for_file(&file);
            self.blacklist.push(file);
        }
    }

    /// Allow every blacklisted file to be probed again
    pub fn clear_blacklist(&mut self) {
        self.blacklist.clear();
    }

    /// Build a folder tree of the known types.
    ///
    /// Plugins are sorted by folder key then name; consecutive plugins whose
    /// keys are equal ignoring case share a folder. Blank keys end up in
    /// [`UNNAMED_FOLDER`].
    pub fn create_tree(&self, sort: SortMethod) -> PluginTree {
        let mut sorted: Vec<&PluginDescription> = self.types.iter().collect();
        sorted.sort_by(|a, b| {
            let key_a = sort.folder_key(a).map(folder_name);
            let key_b = sort.folder_key(b).map(folder_name);
            key_a
                .map(|k| k.to_lowercase())
                .cmp(&key_b.map(|k| k.to_lowercase()))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        let mut root = PluginTree::default();

        if sort == SortMethod::Alphabetical {
            root.plugins = sorted.into_iter().cloned().collect();
            return root;
        }

        let mut current: Option<PluginTree> = None;

        for desc in sorted {
            let key = sort.folder_key(desc).map(folder_name).unwrap_or_default();

            let starts_new_folder = current
                .as_ref()
                .map(|folder| folder.folder.to_lowercase() != key.to_lowercase())
                .unwrap_or(true);

            if starts_new_folder {
                if let Some(done) = current.take() {
                    root.sub_folders.push(done);
                }
                current = Some(PluginTree {
                    folder: key,
                    ..Default::default()
                });
            }

            if let Some(folder) = current.as_mut() {
                folder.plugins.push(desc.clone());
            }
        }

        if let Some(done) = current {
            root.sub_folders.push(done);
        }

        root
    }

    /// Load a list previously written with [`KnownPluginList::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the list as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn folder_name(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        UNNAMED_FOLDER.to_string()
    } else {
        key.to_string()
    }
}
