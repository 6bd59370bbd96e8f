//! The "Plugins" dialog: the known plugin list, scanning and the blacklist

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use session_engine::{
    message_loop::MessageLoop, scanner::PluginScanner, KnownPluginList, PluginDescription,
    PluginTree, SortMethod,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct PluginListDialog {
    open: bool,
    known: Rc<RefCell<KnownPluginList>>,
    message_loop: MessageLoop,
    scanning: Rc<Cell<bool>>,
    status: Rc<RefCell<String>>,
}

impl PluginListDialog {
    pub fn new(known: Rc<RefCell<KnownPluginList>>, message_loop: MessageLoop) -> Self {
        Self {
            open: false,
            known,
            message_loop,
            scanning: Rc::new(Cell::new(false)),
            status: Rc::new(RefCell::new(String::new())),
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.get()
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    /// Scan in the background; the list is updated when the scan finishes.
    /// Does nothing while a scan is running.
    pub fn start_scan(&self, scanner: PluginScanner) {
        if self.scanning.replace(true) {
            return;
        }
        *self.status.borrow_mut() = "Scanning...".to_string();

        let scanning = Rc::downgrade(&self.scanning);
        let status = Rc::downgrade(&self.status);
        scanner.scan_async(&self.message_loop, self.known.clone(), move |report| {
            if let Some(scanning) = scanning.upgrade() {
                scanning.set(false);
            }
            if let Some(status) = status.upgrade() {
                *status.borrow_mut() = format!(
                    "Found {} plugins, {} failed, {} blacklisted",
                    report.found.len(),
                    report.failed.len(),
                    report.blacklisted.len()
                );
            }
        });
    }

    /// Draw the dialog. Returns `true` when the user asked for a scan.
    pub fn show(&mut self, ctx: &egui::Context, sort: &mut SortMethod) -> bool {
        if !self.open {
            return false;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.open = false;
            return false;
        }

        let mut scan_requested = false;
        let known = &self.known;
        let scanning = self.scanning.get();
        let status = self.status.borrow().clone();

        egui::Window::new("Plugins")
            .open(&mut self.open)
            .resizable(true)
            .default_size([800.0, 600.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let scan = ui.add_enabled(!scanning, egui::Button::new("Scan for new or updated plugins"));
                    if scan.clicked() {
                        scan_requested = true;
                    }
                    if scanning {
                        ui.spinner();
                    }
                    ui.label(status);
                });

                ui.horizontal(|ui| {
                    ui.label("Sort:");
                    egui::ComboBox::from_id_salt("plugin_sort")
                        .selected_text(sort.label())
                        .show_ui(ui, |ui| {
                            for method in SortMethod::ALL {
                                ui.selectable_value(sort, method, method.label());
                            }
                        });
                });

                ui.separator();

                let tree = known.borrow().create_tree(*sort);
                if let Some(desc) = plugin_table(ui, &tree) {
                    log::info!("Removing {} from the plugin list", desc.name);
                    known.borrow_mut().remove_type(&desc);
                }

                blacklist_section(ui, known);
            });

        scan_requested
    }
}

/// Rows in the order of the tree: each folder's plugins, folders first
fn rows(tree: &PluginTree) -> Vec<&PluginDescription> {
    let mut rows = Vec::with_capacity(tree.num_plugins());
    collect_rows(tree, &mut rows);
    rows
}

fn collect_rows<'a>(tree: &'a PluginTree, rows: &mut Vec<&'a PluginDescription>) {
    for folder in &tree.sub_folders {
        collect_rows(folder, rows);
    }
    rows.extend(tree.plugins.iter());
}

fn plugin_table(ui: &mut egui::Ui, tree: &PluginTree) -> Option<PluginDescription> {
    let rows = rows(tree);
    if rows.is_empty() {
        ui.label("No plugins known yet. Scan to find some.");
        return None;
    }

    let mut remove = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(420.0)
        .column(Column::initial(200.0).at_least(80.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::initial(100.0))
        .column(Column::initial(160.0))
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Name", "Format", "Category", "Manufacturer", "Version", ""] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let desc = rows[row.index()];
                row.col(|ui| {
                    ui.label(&desc.name).on_hover_text(&desc.file_or_identifier);
                });
                row.col(|ui| {
                    ui.label(&desc.plugin_format_name);
                });
                row.col(|ui| {
                    ui.label(&desc.category);
                });
                row.col(|ui| {
                    ui.label(&desc.manufacturer);
                });
                row.col(|ui| {
                    ui.label(&desc.version);
                });
                row.col(|ui| {
                    if ui.small_button("Remove").clicked() {
                        remove = Some(desc.clone());
                    }
                });
            });
        });

    remove
}

fn blacklist_section(ui: &mut egui::Ui, known: &RefCell<KnownPluginList>) {
    let blacklisted = known.borrow().blacklisted_files().to_vec();
    if blacklisted.is_empty() {
        return;
    }

    ui.separator();
    egui::CollapsingHeader::new(format!("Blacklisted files ({})", blacklisted.len())).show(ui, |ui| {
        for file in &blacklisted {
            ui.label(file.display().to_string());
        }
        if ui.button("Clear blacklist").clicked() {
            known.borrow_mut().clear_blacklist();
        }
    });
}
