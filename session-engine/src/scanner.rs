//! Plugin scanning with crash protection
//!
//! Every file is probed inside `catch_unwind`. Before a file is probed its
//! path is written to a "dead man's pedal" file and removed again afterwards,
//! so a file that takes the whole process down is still named in the pedal
//! on the next start and gets blacklisted instead of probed again.

use crate::description::PluginDescription;
use crate::format::{PluginFormat, PluginFormatManager};
use crate::known_plugins::KnownPluginList;
use crate::message_loop::MessageLoop;
use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// Outcome of a scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Types found, in probe order
    pub found: Vec<PluginDescription>,
    /// Files that could not be described, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Files that crashed this scan or a previous one
    pub blacklisted: Vec<PathBuf>,
    /// Files skipped because they were already blacklisted
    pub skipped: usize,
}

/// Scans search paths for plugin files of every registered format
#[derive(Clone)]
pub struct PluginScanner {
    formats: Vec<Arc<dyn PluginFormat>>,
    search_paths: Vec<PathBuf>,
    pedal_file: Option<PathBuf>,
}

impl PluginScanner {
    /// Scan with the given formats and each format's default paths
    pub fn new(formats: &PluginFormatManager) -> Self {
        Self {
            formats: formats.formats().to_vec(),
            search_paths: Vec::new(),
            pedal_file: None,
        }
    }

    /// Also search these directories
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    /// Record files being probed in `path`
    pub fn with_dead_mans_pedal(mut self, path: impl Into<PathBuf>) -> Self {
        self.pedal_file = Some(path.into());
        self
    }

    /// Files left in the pedal by a scan that did not finish
    pub fn crashed_files(&self) -> Vec<PathBuf> {
        let Some(pedal) = &self.pedal_file else {
            return Vec::new();
        };
        std::fs::read_to_string(pedal)
            .map(|contents| {
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_pedal(&self, file: Option<&Path>) {
        let Some(pedal) = &self.pedal_file else {
            return;
        };
        let result = match file {
            Some(file) => pedal
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .and_then(|()| std::fs::write(pedal, file.to_string_lossy().as_bytes())),
            None if pedal.exists() => std::fs::remove_file(pedal),
            None => Ok(()),
        };
        if let Err(e) = result {
            log::warn!("Could not update {}: {}", pedal.display(), e);
        }
    }

    /// Probe every plugin file not in `skip`. Blocks until done.
    pub fn scan(&self, skip: &[PathBuf]) -> ScanReport {
        let mut report = ScanReport {
            blacklisted: self.crashed_files(),
            ..Default::default()
        };
        self.set_pedal(None);

        for crashed in &report.blacklisted {
            log::warn!("{} crashed a previous scan; blacklisting", crashed.display());
        }

        for format in &self.formats {
            let mut paths = format.default_search_paths();
            paths.extend(self.search_paths.iter().cloned());

            for file in format.find_plugin_files(&paths) {
                if skip.contains(&file) || report.blacklisted.contains(&file) {
                    report.skipped += 1;
                    continue;
                }

                log::debug!("Probing {}", file.display());
                self.set_pedal(Some(&file));
                let outcome = catch_unwind(AssertUnwindSafe(|| format.find_descriptions(&file)));
                self.set_pedal(None);

                match outcome {
                    Ok(Ok(descriptions)) => report.found.extend(descriptions),
                    Ok(Err(e)) => {
                        log::warn!("Failed to describe {}: {}", file.display(), e);
                        report.failed.push((file, e.to_string()));
                    }
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        log::warn!("{} panicked while probing: {}", file.display(), reason);
                        report.failed.push((file.clone(), reason));
                        report.blacklisted.push(file);
                    }
                }
            }
        }

        log::info!(
            "Scan finished: {} found, {} failed, {} blacklisted",
            report.found.len(),
            report.failed.len(),
            report.blacklisted.len()
        );
        report
    }

    /// Scan on a worker thread and merge the result into `known` on the UI
    /// thread, then call `on_done`.
    pub fn scan_async<F>(
        self,
        message_loop: &MessageLoop,
        known: Rc<RefCell<KnownPluginList>>,
        on_done: F,
    ) where
        F: FnOnce(&ScanReport) + 'static,
    {
        let skip = known.borrow().blacklisted_files().to_vec();
        let known = Rc::downgrade(&known);

        message_loop.spawn_blocking(
            move || self.scan(&skip),
            move |report| {
                if let Some(known) = known.upgrade() {
                    let mut known = known.borrow_mut();
                    for file in &report.blacklisted {
                        known.add_to_blacklist(file.clone());
                    }
                    for desc in &report.found {
                        known.add_type(desc.clone());
                    }
                }
                on_done(&report);
            },
        );
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
