//! Live plugin instances owned by an edit

use crate::{
    builtin::BuiltInType,
    description::PluginDescription,
    error::{Error, Result},
    format::{NativeEditor, PluginInstance},
    geometry::Bounds,
    parameters::Parameter,
    rack::RackId,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Type tag of plugins loaded from an external format
pub const EXTERNAL_XML_TYPE: &str = "vst";

/// Identifier of a plugin within an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginId(pub u64);

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a plugin. The owning track's plugin list holds one;
/// windows and UI hold clones or weak references.
pub type PluginHandle = Rc<RefCell<Plugin>>;

/// Editor window bookkeeping that outlives the window itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginWindowState {
    /// Where the editor window was last placed
    pub last_window_bounds: Option<Bounds>,
    /// Whether the user closed the window themselves
    pub was_explicitly_closed: bool,
    /// Whether a window is open right now
    #[serde(skip)]
    pub window_open: bool,
}

/// An external plugin; the native instance is missing when it failed to load
/// while restoring a session
pub struct ExternalPlugin {
    instance: Option<Box<dyn PluginInstance>>,
    load_error: Option<String>,
}

impl ExternalPlugin {
    /// The native instance
    pub fn instance(&self) -> Option<&dyn PluginInstance> {
        self.instance.as_deref()
    }

    /// Why the native instance is missing
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}

/// What kind of processor a plugin is
pub enum PluginKind {
    /// Implemented by the engine
    BuiltIn(BuiltInType),
    /// A rack instance
    Rack(RackId),
    /// Loaded from a plugin format
    External(ExternalPlugin),
}

impl fmt::Debug for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::BuiltIn(t) => f.debug_tuple("BuiltIn").field(t).finish(),
            PluginKind::Rack(id) => f.debug_tuple("Rack").field(id).finish(),
            PluginKind::External(ext) => f
                .debug_struct("External")
                .field("loaded", &ext.instance.is_some())
                .field("load_error", &ext.load_error)
                .finish(),
        }
    }
}

/// A plugin instance on a track
#[derive(Debug)]
pub struct Plugin {
    id: PluginId,
    description: PluginDescription,
    xml_type: String,
    kind: PluginKind,
    parameters: Vec<Parameter>,
    window_state: PluginWindowState,
    state_dirty: bool,
}

impl Plugin {
    pub(crate) fn built_in(id: PluginId, kind: BuiltInType, description: PluginDescription) -> Self {
        Self {
            id,
            description,
            xml_type: kind.xml_type_name().to_string(),
            kind: PluginKind::BuiltIn(kind),
            parameters: kind.default_parameters(),
            window_state: PluginWindowState::default(),
            state_dirty: false,
        }
    }

    pub(crate) fn rack(id: PluginId, rack: RackId, description: PluginDescription) -> Self {
        Self {
            id,
            description,
            xml_type: crate::rack::RACK_XML_TYPE.to_string(),
            kind: PluginKind::Rack(rack),
            parameters: Vec::new(),
            window_state: PluginWindowState::default(),
            state_dirty: false,
        }
    }

    pub(crate) fn external(
        id: PluginId,
        description: PluginDescription,
        instance: Result<Box<dyn PluginInstance>>,
    ) -> Self {
        let (instance, load_error, parameters) = match instance {
            Ok(instance) => {
                let parameters = instance.parameters();
                (Some(instance), None, parameters)
            }
            Err(e) => (None, Some(e.to_string()), Vec::new()),
        };

        Self {
            id,
            description,
            xml_type: EXTERNAL_XML_TYPE.to_string(),
            kind: PluginKind::External(ExternalPlugin {
                instance,
                load_error,
            }),
            parameters,
            window_state: PluginWindowState::default(),
            state_dirty: false,
        }
    }

    /// Plugin id
    pub fn id(&self) -> PluginId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.description.name
    }

    /// Type description
    pub fn description(&self) -> &PluginDescription {
        &self.description
    }

    /// Type tag
    pub fn xml_type(&self) -> &str {
        &self.xml_type
    }

    /// What kind of processor this is
    pub fn kind(&self) -> &PluginKind {
        &self.kind
    }

    /// Whether this is a rack instance
    pub fn is_rack(&self) -> bool {
        matches!(self.kind, PluginKind::Rack(_))
    }

    /// Whether this is an external plugin whose native instance is missing
    pub fn is_missing_instance(&self) -> bool {
        matches!(&self.kind, PluginKind::External(ext) if ext.instance.is_none())
    }

    /// Whether the plugin provides its own editor view
    pub fn has_native_editor(&self) -> bool {
        match &self.kind {
            PluginKind::External(ExternalPlugin {
                instance: Some(instance),
                ..
            }) => instance.has_editor(),
            _ => false,
        }
    }

    /// Create the plugin's own editor view
    pub fn create_native_editor(&mut self) -> Result<Box<dyn NativeEditor>> {
        match &mut self.kind {
            PluginKind::External(ExternalPlugin {
                instance: Some(instance),
                ..
            }) => instance.create_editor(),
            _ => Err(Error::Other(format!(
                "{} has no native editor",
                self.description.name
            ))),
        }
    }

    /// Current parameters
    pub fn parameters(&self) -> Vec<Parameter> {
        match &self.kind {
            PluginKind::External(ExternalPlugin {
                instance: Some(instance),
                ..
            }) => instance.parameters(),
            _ => self.parameters.clone(),
        }
    }

    /// Set a parameter from a normalized value
    pub fn set_parameter(&mut self, id: u32, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidParameter(format!(
                "Value {} is out of range [0.0, 1.0]",
                value
            )));
        }

        if let PluginKind::External(ExternalPlugin {
            instance: Some(instance),
            ..
        }) = &mut self.kind
        {
            instance.set_parameter(id, value)?;
        }

        match self.parameters.iter_mut().find(|p| p.id == id) {
            Some(param) => param.value = value,
            None if matches!(self.kind, PluginKind::External(_)) => {}
            None => {
                return Err(Error::InvalidParameter(format!(
                    "{} has no parameter {}",
                    self.description.name,
                    id
                )))
            }
        }

        self.state_dirty = true;
        Ok(())
    }

    /// Whether parameter state changed since the last flush
    pub fn is_state_dirty(&self) -> bool {
        self.state_dirty
    }

    /// Copy the native instance's parameter values into the saved state.
    /// Returns whether anything was flushed.
    pub fn flush_state_if_needed(&mut self) -> bool {
        if !self.state_dirty {
            return false;
        }

        if let PluginKind::External(ExternalPlugin {
            instance: Some(instance),
            ..
        }) = &self.kind
        {
            self.parameters = instance.parameters();
        }

        self.state_dirty = false;
        true
    }

    /// Parameter values as last saved
    pub fn saved_parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn restore_parameters(&mut self, saved: &[Parameter]) {
        let missing_instance = self.is_missing_instance();

        for saved in saved {
            if let PluginKind::External(ExternalPlugin {
                instance: Some(instance),
                ..
            }) = &mut self.kind
            {
                if let Err(e) = instance.set_parameter(saved.id, saved.value) {
                    log::debug!(
                        "Could not restore parameter {} of {}: {}",
                        saved.id,
                        self.description.name,
                        e
                    );
                }
            }

            match self.parameters.iter_mut().find(|p| p.id == saved.id) {
                Some(param) => param.value = saved.value,
                None if missing_instance => self.parameters.push(saved.clone()),
                None => {}
            }
        }
    }

    /// Editor window bookkeeping
    pub fn window_state(&self) -> &PluginWindowState {
        &self.window_state
    }

    /// Editor window bookkeeping
    pub fn window_state_mut(&mut self) -> &mut PluginWindowState {
        &mut self.window_state
    }
}

/// A plugin as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginState {
    /// Type tag
    pub xml_type: String,
    /// Type description
    pub description: PluginDescription,
    /// Rack the plugin instantiates, for rack plugins
    #[serde(default)]
    pub rack: Option<RackId>,
    /// Parameter values
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Editor window bookkeeping
    #[serde(default)]
    pub window_state: PluginWindowState,
}

impl From<&Plugin> for PluginState {
    fn from(plugin: &Plugin) -> Self {
        Self {
            xml_type: plugin.xml_type.clone(),
            description: plugin.description.clone(),
            rack: match plugin.kind {
                PluginKind::Rack(id) => Some(id),
                _ => None,
            },
            parameters: plugin.parameters.clone(),
            window_state: plugin.window_state.clone(),
        }
    }
}
