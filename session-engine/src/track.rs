//! Audio tracks: a plugin chain plus the clips placed on the track

use crate::audio::{PlaybackClip, SharedPlayhead};
use crate::audio_file::AudioFile;
use crate::clip::{ClipId, TimeRange, WaveClip};
use crate::listeners::{ListenerList, Subscription};
use crate::plugin::{PluginHandle, PluginId};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

/// Shared handle to a track
pub type TrackHandle = Rc<RefCell<AudioTrack>>;

/// The kind of child a [`TrackEvent`] is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// A plugin in the chain
    Plugin(PluginId),
    /// A clip on the timeline
    Clip(ClipId),
}

/// Structural change to a track.
///
/// Events are emitted while the track is mutably borrowed; listeners must
/// not borrow the track from inside the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEvent {
    /// A child was added
    ChildAdded(ChildKind),
    /// A child was removed
    ChildRemoved(ChildKind),
    /// Children were reordered
    ChildOrderChanged,
}

/// The ordered plugin chain of a track
#[derive(Debug, Default)]
pub struct PluginList {
    plugins: Vec<PluginHandle>,
}

impl PluginList {
    /// Number of plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin at a chain position
    pub fn get(&self, index: usize) -> Option<&PluginHandle> {
        self.plugins.get(index)
    }

    /// Plugins in chain order
    pub fn iter(&self) -> impl Iterator<Item = &PluginHandle> {
        self.plugins.iter()
    }

    /// Chain position of a plugin
    pub fn index_of(&self, id: PluginId) -> Option<usize> {
        self.plugins.iter().position(|p| p.borrow().id() == id)
    }

    /// Find a plugin by id
    pub fn find(&self, id: PluginId) -> Option<&PluginHandle> {
        self.plugins.iter().find(|p| p.borrow().id() == id)
    }

    /// Handles in chain order
    pub fn to_vec(&self) -> Vec<PluginHandle> {
        self.plugins.clone()
    }
}

/// An audio track
pub struct AudioTrack {
    index: usize,
    name: String,
    plugins: PluginList,
    clips: Vec<WaveClip>,
    next_clip_id: u64,
    playhead: SharedPlayhead,
    listeners: ListenerList<TrackEvent>,
}

impl AudioTrack {
    pub(crate) fn new(index: usize, playhead: SharedPlayhead) -> Self {
        Self {
            index,
            name: format!("Track {}", index + 1),
            plugins: PluginList::default(),
            clips: Vec::new(),
            next_clip_id: 0,
            playhead,
            listeners: ListenerList::new(),
        }
    }

    /// Position in the edit
    pub fn index(&self) -> usize {
        self.index
    }

    /// Track name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the track
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Listen for structural changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&TrackEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// The plugin chain
    pub fn plugin_list(&self) -> &PluginList {
        &self.plugins
    }

    /// Insert a plugin at `index`, or at the end of the chain
    pub fn insert_plugin(&mut self, plugin: PluginHandle, index: Option<usize>) {
        let id = plugin.borrow().id();
        let index = index
            .unwrap_or(self.plugins.len())
            .min(self.plugins.len());
        self.plugins.plugins.insert(index, plugin);
        log::debug!("Inserted plugin {} on {} at {}", id, self.name, index);
        self.listeners
            .emit(&TrackEvent::ChildAdded(ChildKind::Plugin(id)));
    }

    /// Remove a plugin from the chain
    pub fn remove_plugin(&mut self, id: PluginId) -> Option<PluginHandle> {
        let index = self.plugins.index_of(id)?;
        let removed = self.plugins.plugins.remove(index);
        log::debug!("Removed plugin {} from {}", id, self.name);
        self.listeners
            .emit(&TrackEvent::ChildRemoved(ChildKind::Plugin(id)));
        Some(removed)
    }

    /// Move a plugin to a new chain position
    pub fn move_plugin(&mut self, id: PluginId, new_index: usize) -> bool {
        let Some(index) = self.plugins.index_of(id) else {
            return false;
        };
        let new_index = new_index.min(self.plugins.len() - 1);
        if index == new_index {
            return false;
        }
        let plugin = self.plugins.plugins.remove(index);
        self.plugins.plugins.insert(new_index, plugin);
        self.listeners.emit(&TrackEvent::ChildOrderChanged);
        true
    }

    /// Clips in insertion order
    pub fn clips(&self) -> &[WaveClip] {
        &self.clips
    }

    /// Place a wave clip on the track
    pub fn insert_wave_clip(
        &mut self,
        name: impl Into<String>,
        source_file: PathBuf,
        audio: Arc<AudioFile>,
        position: TimeRange,
    ) -> ClipId {
        self.next_clip_id += 1;
        let id = ClipId(self.next_clip_id);
        self.clips.push(WaveClip {
            id,
            name: name.into(),
            source_file,
            position,
            audio,
        });
        self.publish_clips();
        self.listeners.emit(&TrackEvent::ChildAdded(ChildKind::Clip(id)));
        id
    }

    /// Remove one clip
    pub fn remove_clip(&mut self, id: ClipId) -> bool {
        let before = self.clips.len();
        self.clips.retain(|c| c.id != id);
        if self.clips.len() == before {
            return false;
        }
        self.publish_clips();
        self.listeners
            .emit(&TrackEvent::ChildRemoved(ChildKind::Clip(id)));
        true
    }

    /// Remove every clip
    pub fn remove_all_clips(&mut self) {
        let removed: Vec<ClipId> = self.clips.drain(..).map(|c| c.id).collect();
        if removed.is_empty() {
            return;
        }
        self.publish_clips();
        for id in removed {
            self.listeners
                .emit(&TrackEvent::ChildRemoved(ChildKind::Clip(id)));
        }
    }

    fn publish_clips(&self) {
        let clips = self
            .clips
            .iter()
            .map(|clip| PlaybackClip {
                position: clip.position,
                audio: clip.audio.clone(),
            })
            .collect();

        match self.playhead.lock() {
            Ok(mut playhead) => playhead.set_track_clips(self.index, clips),
            Err(_) => log::warn!("Playhead lock poisoned, clips not updated"),
        }
    }
}

impl std::fmt::Debug for AudioTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioTrack")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("plugins", &self.plugins.len())
            .field("clips", &self.clips.len())
            .finish()
    }
}
