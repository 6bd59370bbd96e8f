use crate::catalog::CatalogItem;
use session_engine::{Edit, PluginHandle};

/// Create an instance of the picked type in `edit`. The plugin is not put on
/// a track. Failures are logged and give `None`.
pub fn create_plugin(item: &CatalogItem, edit: &mut Edit) -> Option<PluginHandle> {
    match edit.create_new_plugin(&item.xml_type, &item.description) {
        Ok(plugin) => Some(plugin),
        Err(e) => {
            log::debug!("Could not create {} ({}): {}", item.name(), item.xml_type, e);
            None
        }
    }
}
