//! The editing session: tracks, their plugins and clips, racks and transport

use crate::{
    audio::{AudioConfig, Playhead, SharedPlayhead},
    audio_file::AudioFile,
    builtin::BuiltInType,
    clip::WaveClipState,
    description::PluginDescription,
    error::{Error, Result},
    format::PluginFormatManager,
    listeners::{ListenerList, Subscription},
    plugin::{Plugin, PluginHandle, PluginId, PluginState, EXTERNAL_XML_TYPE},
    rack::{parse_rack_index, RackId, RackList, RACK_PRESET_PREFIX, RACK_XML_TYPE},
    track::{AudioTrack, TrackHandle},
    transport::TransportControl,
};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

/// Shared handle to an edit
pub type EditHandle = Rc<RefCell<Edit>>;

/// Edit-wide notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    /// A plugin instance was created
    PluginCreated(PluginId),
    /// A plugin reported a change that should be saved
    PluginChanged(PluginId),
    /// A plugin was removed from its track
    PluginDeleted(PluginId),
}

/// An editing session
pub struct Edit {
    tracks: Vec<TrackHandle>,
    racks: RackList,
    formats: PluginFormatManager,
    audio_config: AudioConfig,
    playhead: SharedPlayhead,
    transport: TransportControl,
    next_plugin_id: u64,
    changed: Cell<bool>,
    listeners: ListenerList<EditEvent>,
}

impl Edit {
    /// An empty edit that creates external plugins with `formats`
    pub fn new(formats: PluginFormatManager, audio_config: AudioConfig) -> Self {
        let playhead = Playhead::shared();
        Self {
            tracks: Vec::new(),
            racks: RackList::default(),
            formats,
            audio_config,
            transport: TransportControl::new(playhead.clone()),
            playhead,
            next_plugin_id: 0,
            changed: Cell::new(false),
            listeners: ListenerList::new(),
        }
    }

    /// Wrap in a shared handle
    pub fn into_handle(self) -> EditHandle {
        Rc::new(RefCell::new(self))
    }

    /// Listen for edit-wide changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&EditEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Playback control
    pub fn transport(&self) -> &TransportControl {
        &self.transport
    }

    /// The playhead an audio output should pull from
    pub fn playhead(&self) -> SharedPlayhead {
        self.playhead.clone()
    }

    /// Audio settings plugins are created with
    pub fn audio_config(&self) -> &AudioConfig {
        &self.audio_config
    }

    /// Formats used to create external plugins
    pub fn formats(&self) -> &PluginFormatManager {
        &self.formats
    }

    /// Make sure at least `count` audio tracks exist
    pub fn ensure_number_of_audio_tracks(&mut self, count: usize) {
        while self.tracks.len() < count {
            let index = self.tracks.len();
            self.tracks
                .push(Rc::new(RefCell::new(AudioTrack::new(index, self.playhead.clone()))));
        }
    }

    /// Audio tracks in order
    pub fn audio_tracks(&self) -> &[TrackHandle] {
        &self.tracks
    }

    /// Audio track at an index
    pub fn audio_track(&self, index: usize) -> Option<TrackHandle> {
        self.tracks.get(index).cloned()
    }

    /// Racks defined in this edit
    pub fn rack_types(&self) -> &RackList {
        &self.racks
    }

    fn allocate_plugin_id(&mut self) -> PluginId {
        self.next_plugin_id += 1;
        PluginId(self.next_plugin_id)
    }

    /// Create a plugin instance of the given type. The plugin is not placed
    /// on any track.
    ///
    /// `xml_type` selects the kind: [`RACK_XML_TYPE`], [`EXTERNAL_XML_TYPE`]
    /// or a built-in type name.
    pub fn create_new_plugin(
        &mut self,
        xml_type: &str,
        desc: &PluginDescription,
    ) -> Result<PluginHandle> {
        let plugin = match xml_type {
            RACK_XML_TYPE => {
                let rack = self.rack_for_identifier(&desc.file_or_identifier)?;
                let mut desc = desc.clone();
                if desc.name.is_empty() || desc.file_or_identifier.starts_with(RACK_PRESET_PREFIX)
                {
                    desc.name = self
                        .racks
                        .find(rack)
                        .map(|r| r.rack_name.clone())
                        .unwrap_or_default();
                }
                Plugin::rack(self.allocate_plugin_id(), rack, desc)
            }
            EXTERNAL_XML_TYPE => {
                let instance = self.formats.create_instance(desc, &self.audio_config)?;
                Plugin::external(self.allocate_plugin_id(), desc.clone(), Ok(instance))
            }
            other => {
                let kind = BuiltInType::from_xml_type_name(other)
                    .ok_or_else(|| Error::UnknownPluginType(other.to_string()))?;
                let mut desc = desc.clone();
                if desc.name.is_empty() {
                    desc.name = kind.display_name().to_string();
                }
                Plugin::built_in(self.allocate_plugin_id(), kind, desc)
            }
        };

        let id = plugin.id();
        log::info!("Created plugin {} ({}) as {}", plugin.name(), plugin.xml_type(), id);
        self.listeners.emit(&EditEvent::PluginCreated(id));
        Ok(Rc::new(RefCell::new(plugin)))
    }

    fn rack_for_identifier(&mut self, identifier: &str) -> Result<RackId> {
        if identifier.starts_with(RACK_PRESET_PREFIX) {
            let rack = self.racks.add_new_rack();
            log::info!("Created {}", rack.rack_name);
            self.changed.set(true);
            return Ok(rack.id);
        }

        parse_rack_index(identifier)
            .and_then(|index| self.racks.type_at(index))
            .map(|rack| rack.id)
            .ok_or_else(|| Error::RackNotFound(identifier.to_string()))
    }

    /// Put a plugin on a track at `index` (or at the end)
    pub fn insert_plugin(&self, track: usize, plugin: PluginHandle, index: Option<usize>) -> Result<()> {
        let track = self
            .audio_track(track)
            .ok_or_else(|| Error::Other(format!("No audio track {}", track)))?;
        track.borrow_mut().insert_plugin(plugin, index);
        self.changed.set(true);
        Ok(())
    }

    /// Find a plugin on any track
    pub fn find_plugin(&self, id: PluginId) -> Option<PluginHandle> {
        self.tracks
            .iter()
            .find_map(|track| track.borrow().plugin_list().find(id).cloned())
    }

    /// Remove a plugin from whichever track holds it
    pub fn delete_plugin(&self, id: PluginId) -> Option<PluginHandle> {
        let removed = self
            .tracks
            .iter()
            .find_map(|track| track.borrow_mut().remove_plugin(id))?;
        log::info!("Deleted plugin {}", id);
        self.changed.set(true);
        self.listeners.emit(&EditEvent::PluginDeleted(id));
        Some(removed)
    }

    /// Record that a plugin changed in a way that should be saved
    pub fn plugin_changed(&self, id: PluginId) {
        self.changed.set(true);
        self.listeners.emit(&EditEvent::PluginChanged(id));
    }

    /// Save a plugin's pending parameter state into the edit
    pub fn flush_plugin_state_if_needed(&self, plugin: &PluginHandle) -> bool {
        let Ok(mut plugin) = plugin.try_borrow_mut() else {
            log::debug!("Plugin busy, state flush skipped");
            return false;
        };
        let flushed = plugin.flush_state_if_needed();
        if flushed {
            self.changed.set(true);
            log::debug!("Flushed state of {}", plugin.name());
        }
        flushed
    }

    /// Whether anything changed since the last save or load
    pub fn has_changed_since_saved(&self) -> bool {
        self.changed.get()
    }

    /// Serializable snapshot of the edit
    pub fn state(&self) -> EditState {
        EditState {
            tracks: self
                .tracks
                .iter()
                .map(|track| {
                    let track = track.borrow();
                    TrackState {
                        name: track.name().to_string(),
                        plugins: track
                            .plugin_list()
                            .iter()
                            .map(|p| PluginState::from(&*p.borrow()))
                            .collect(),
                        clips: track.clips().iter().map(WaveClipState::from).collect(),
                    }
                })
                .collect(),
            racks: self.racks.clone(),
        }
    }

    /// Flush every plugin and write the edit as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        for track in &self.tracks {
            for plugin in track.borrow().plugin_list().iter() {
                self.flush_plugin_state_if_needed(plugin);
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.state())?)?;
        self.changed.set(false);
        log::info!("Saved edit to {}", path.display());
        Ok(())
    }

    /// Read an edit written by [`Edit::save`]
    pub fn load(path: &Path, formats: PluginFormatManager, audio_config: AudioConfig) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let state: EditState = serde_json::from_str(&json)?;
        let edit = Self::from_state(state, formats, audio_config);
        log::info!("Loaded edit from {}", path.display());
        Ok(edit)
    }

    /// Rebuild an edit from a snapshot.
    ///
    /// External plugins that fail to load are kept as placeholders so their
    /// saved state survives the next save. Clips whose files cannot be read
    /// are dropped.
    pub fn from_state(state: EditState, formats: PluginFormatManager, audio_config: AudioConfig) -> Self {
        let mut edit = Self::new(formats, audio_config);
        edit.racks = state.racks;
        edit.ensure_number_of_audio_tracks(state.tracks.len());

        for (index, track_state) in state.tracks.into_iter().enumerate() {
            let Some(track) = edit.audio_track(index) else {
                continue;
            };
            track.borrow_mut().set_name(track_state.name);

            for plugin_state in track_state.plugins {
                if let Some(plugin) = edit.restore_plugin(plugin_state) {
                    track.borrow_mut().insert_plugin(plugin, None);
                }
            }

            for clip in track_state.clips {
                match AudioFile::open(&clip.source_file) {
                    Ok(audio) => {
                        track.borrow_mut().insert_wave_clip(
                            clip.name,
                            clip.source_file,
                            Arc::new(audio),
                            clip.position,
                        );
                    }
                    Err(e) => log::warn!("Dropping clip {}: {}", clip.name, e),
                }
            }
        }

        edit.changed.set(false);
        edit
    }

    fn restore_plugin(&mut self, state: PluginState) -> Option<PluginHandle> {
        let id = self.allocate_plugin_id();

        let mut plugin = match state.xml_type.as_str() {
            RACK_XML_TYPE => {
                let rack = state.rack.filter(|rack| self.racks.find(*rack).is_some());
                match rack {
                    Some(rack) => Plugin::rack(id, rack, state.description),
                    None => {
                        log::warn!("Dropping rack plugin {}: rack missing", state.description.name);
                        return None;
                    }
                }
            }
            EXTERNAL_XML_TYPE => {
                let instance = self.formats.create_instance(&state.description, &self.audio_config);
                if let Err(e) = &instance {
                    log::warn!("Could not load {}: {}", state.description.name, e);
                }
                Plugin::external(id, state.description, instance)
            }
            other => match BuiltInType::from_xml_type_name(other) {
                Some(kind) => Plugin::built_in(id, kind, state.description),
                None => {
                    log::warn!("Dropping plugin of unknown type {}", other);
                    return None;
                }
            },
        };

        plugin.restore_parameters(&state.parameters);
        *plugin.window_state_mut() = state.window_state;
        Some(Rc::new(RefCell::new(plugin)))
    }
}

/// Serialized form of a track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackState {
    /// Track name
    pub name: String,
    /// Plugin chain
    #[serde(default)]
    pub plugins: Vec<PluginState>,
    /// Clips
    #[serde(default)]
    pub clips: Vec<WaveClipState>,
}

/// Serialized form of an edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditState {
    /// Audio tracks in order
    pub tracks: Vec<TrackState>,
    /// Rack definitions
    #[serde(default)]
    pub racks: RackList,
}
