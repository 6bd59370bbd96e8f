//! Pop-up menu for picking a plugin type from the catalog
//!
//! Items are keyed by the 32-bit hash of the type's unique name. A picked key
//! is mapped back to its catalog item by searching the tree in the same order
//! the menu was built: sub-groups first (depth first), then the level's own
//! leaves. When two items hash to the same key only the first one in that
//! order is selectable; the others are shown disabled.

use crate::catalog::{CatalogItem, CatalogNode};
use eframe::egui;
use std::collections::HashSet;

/// One row of the menu
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    SubMenu { name: String, entries: Vec<MenuEntry> },
    Item { key: i32, label: String, enabled: bool },
}

/// What the user did with the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Still open
    Pending,
    Picked(i32),
    Dismissed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PluginMenu {
    entries: Vec<MenuEntry>,
}

impl PluginMenu {
    pub fn new(root: &CatalogNode) -> Self {
        let mut seen = HashSet::new();
        Self {
            entries: Self::build_entries(root, &mut seen),
        }
    }

    fn build_entries(node: &CatalogNode, seen: &mut HashSet<i32>) -> Vec<MenuEntry> {
        let mut entries = Vec::new();

        for group in node.groups() {
            entries.push(MenuEntry::SubMenu {
                name: group.name().to_string(),
                entries: Self::build_entries(group, seen),
            });
        }

        for item in node.leaves() {
            let key = item.key();
            let enabled = seen.insert(key);
            if !enabled {
                log::debug!("Menu key {} of {} is already taken", key, item.unique_name());
            }
            entries.push(MenuEntry::Item {
                key,
                label: item.name().to_string(),
                enabled,
            });
        }

        entries
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// The first item in menu order whose key is `key`
    pub fn find_type(node: &CatalogNode, key: i32) -> Option<&CatalogItem> {
        for group in node.groups() {
            if let Some(item) = Self::find_type(group, key) {
                return Some(item);
            }
        }
        node.leaves().find(|item| item.key() == key)
    }

    /// Map what the user did to the chosen item
    pub fn resolve(node: &CatalogNode, outcome: MenuOutcome) -> Option<&CatalogItem> {
        match outcome {
            MenuOutcome::Picked(key) => Self::find_type(node, key),
            MenuOutcome::Pending | MenuOutcome::Dismissed => None,
        }
    }

    /// Draw the menu as a modal. Escape or a click outside dismisses it.
    pub fn show(&self, ctx: &egui::Context) -> MenuOutcome {
        let mut outcome = MenuOutcome::Pending;

        let response = egui::Modal::new(egui::Id::new("plugin_menu")).show(ctx, |ui| {
            ui.set_min_width(260.0);
            ui.heading("Add plugin");
            ui.separator();

            egui::ScrollArea::vertical()
                .max_height(420.0)
                .show(ui, |ui| {
                    if let Some(key) = Self::entries_ui(ui, &self.entries) {
                        outcome = MenuOutcome::Picked(key);
                    }
                });

            ui.separator();
            if ui.button("Cancel").clicked() {
                outcome = MenuOutcome::Dismissed;
            }
        });

        if outcome == MenuOutcome::Pending && response.should_close() {
            outcome = MenuOutcome::Dismissed;
        }
        outcome
    }

    fn entries_ui(ui: &mut egui::Ui, entries: &[MenuEntry]) -> Option<i32> {
        let mut picked = None;

        for (index, entry) in entries.iter().enumerate() {
            match entry {
                MenuEntry::SubMenu { name, entries } => {
                    ui.push_id(index, |ui| {
                        egui::CollapsingHeader::new(name.as_str()).show(ui, |ui| {
                            if let Some(key) = Self::entries_ui(ui, entries) {
                                picked = Some(key);
                            }
                        });
                    });
                }
                MenuEntry::Item { key, label, enabled } => {
                    let button = egui::Button::new(label.as_str()).frame(false);
                    if ui.add_enabled(*enabled, button).clicked() {
                        picked = Some(*key);
                    }
                }
            }
        }

        picked
    }
}
