//! The tree of plugin types offered by the plugin menu
//!
//! The root holds, in order: the engine's built-in processors, the racks of
//! the edit (plus an entry that creates a new one), then the known plugin
//! list grouped the way [`KnownPluginList::create_tree`] grouped it.
//!
//! [`KnownPluginList::create_tree`]: session_engine::KnownPluginList::create_tree

use session_engine::{
    builtin::{BuiltInType, PluginTypes},
    hash::string_hash,
    plugin::EXTERNAL_XML_TYPE,
    rack::{new_rack_identifier, rack_identifier, RACK_PRESET_PREFIX, RACK_XML_TYPE},
    Edit, PluginDescription, PluginTree, BUILT_IN_FORMAT_NAME,
};

pub const ROOT_GROUP_NAME: &str = "Plugins";
pub const BUILTIN_GROUP_NAME: &str = "Builtin Plugins";
pub const RACKS_GROUP_NAME: &str = "Plugin Racks";
pub const NEW_RACK_NAME: &str = "Create New Empty Rack";

/// A plugin type that can be picked from the menu
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub description: PluginDescription,
    /// Type tag handed to [`Edit::create_new_plugin`]
    pub xml_type: String,
    /// Whether the type comes from a plugin format rather than the engine
    pub is_plugin: bool,
}

impl CatalogItem {
    /// An item for a type from the known plugin list
    pub fn from_description(description: PluginDescription) -> Self {
        Self {
            description,
            xml_type: EXTERNAL_XML_TYPE.to_string(),
            is_plugin: true,
        }
    }

    /// An item for a type the engine implements itself
    pub fn internal(identifier: String, name: &str, xml_type: &str, is_synth: bool) -> Self {
        Self {
            description: PluginDescription {
                name: name.to_string(),
                file_or_identifier: identifier,
                plugin_format_name: BUILT_IN_FORMAT_NAME.to_string(),
                category: xml_type.to_string(),
                is_instrument: is_synth,
                ..Default::default()
            },
            xml_type: xml_type.to_string(),
            is_plugin: false,
        }
    }

    /// Name identifying the type within one menu
    pub fn unique_name(&self) -> String {
        if self
            .description
            .file_or_identifier
            .starts_with(RACK_PRESET_PREFIX)
        {
            return self.description.file_or_identifier.clone();
        }
        self.description.create_identifier_string()
    }

    /// Menu item key
    pub fn key(&self) -> i32 {
        string_hash(&self.unique_name())
    }

    pub fn name(&self) -> &str {
        &self.description.name
    }
}

/// A node of the catalog tree
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogNode {
    Group { name: String, children: Vec<CatalogNode> },
    Leaf(CatalogItem),
}

impl CatalogNode {
    pub fn group(name: impl Into<String>) -> Self {
        CatalogNode::Group {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogNode::Group { name, .. } => name,
            CatalogNode::Leaf(item) => item.name(),
        }
    }

    /// Direct children; empty for leaves
    pub fn children(&self) -> &[CatalogNode] {
        match self {
            CatalogNode::Group { children, .. } => children,
            CatalogNode::Leaf(_) => &[],
        }
    }

    /// Child groups in order
    pub fn groups(&self) -> impl Iterator<Item = &CatalogNode> {
        self.children()
            .iter()
            .filter(|child| matches!(child, CatalogNode::Group { .. }))
    }

    /// Child leaves in order
    pub fn leaves(&self) -> impl Iterator<Item = &CatalogItem> {
        self.children().iter().filter_map(|child| match child {
            CatalogNode::Leaf(item) => Some(item),
            CatalogNode::Group { .. } => None,
        })
    }

    /// Find a direct child group by name
    pub fn find_group(&self, name: &str) -> Option<&CatalogNode> {
        self.groups().find(|group| group.name() == name)
    }

    /// Every leaf below this node, depth first, groups before leaves
    pub fn all_items(&self) -> Vec<&CatalogItem> {
        let mut items = Vec::new();
        self.collect_items(&mut items);
        items
    }

    fn collect_items<'a>(&'a self, items: &mut Vec<&'a CatalogItem>) {
        for group in self.groups() {
            group.collect_items(items);
        }
        items.extend(self.leaves());
    }

    fn push(&mut self, node: CatalogNode) {
        if let CatalogNode::Group { children, .. } = self {
            children.push(node);
        }
    }
}

/// Build the catalog for `edit` from a tree of known plugins
pub fn build_catalog(edit: &Edit, tree: &PluginTree, types: PluginTypes) -> CatalogNode {
    let mut root = CatalogNode::group(ROOT_GROUP_NAME);

    let mut builtins = CatalogNode::group(BUILTIN_GROUP_NAME);
    for (n, kind) in BuiltInType::available(types).enumerate() {
        builtins.push(CatalogNode::Leaf(CatalogItem::internal(
            format!("{}_builtin", n + 1),
            kind.display_name(),
            kind.xml_type_name(),
            kind.is_synth(),
        )));
    }
    root.push(builtins);

    let mut racks = CatalogNode::group(RACKS_GROUP_NAME);
    racks.push(CatalogNode::Leaf(CatalogItem::internal(
        new_rack_identifier(),
        NEW_RACK_NAME,
        RACK_XML_TYPE,
        false,
    )));
    for (i, rack) in edit.rack_types().types().iter().enumerate() {
        racks.push(CatalogNode::Leaf(CatalogItem::internal(
            rack_identifier(i),
            &rack.rack_name,
            RACK_XML_TYPE,
            false,
        )));
    }
    root.push(racks);

    populate_from(&mut root, tree);
    root
}

fn populate_from(node: &mut CatalogNode, tree: &PluginTree) {
    for sub_tree in &tree.sub_folders {
        if sub_tree.plugins.is_empty() && sub_tree.sub_folders.is_empty() {
            continue;
        }
        let mut group = CatalogNode::group(sub_tree.folder.clone());
        populate_from(&mut group, sub_tree);
        node.push(group);
    }

    for desc in &tree.plugins {
        node.push(CatalogNode::Leaf(CatalogItem::from_description(desc.clone())));
    }
}
