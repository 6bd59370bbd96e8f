// Module declarations
pub mod app;
pub mod catalog;
pub mod engine_helpers;
pub mod errors;
pub mod generic_editor;
pub mod plugin_factory;
pub mod plugin_list_dialog;
pub mod plugin_menu;
pub mod plugin_window;
pub mod settings;
pub mod track_plugin_list;

// Re-exports for convenience
pub use app::PluginHostApp;
pub use catalog::{build_catalog, CatalogItem, CatalogNode};
pub use errors::{AppError, Result};
pub use plugin_menu::{MenuOutcome, PluginMenu};
pub use plugin_window::PluginWindowManager;
pub use settings::{AppPaths, AppSettings};
pub use track_plugin_list::TrackPluginList;
