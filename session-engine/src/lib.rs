//! # session-engine
//!
//! The audio-host side of the plugin host: plugin formats and scanning, the
//! known plugin list, and an editing session (tracks, plugin chains, racks,
//! clips and transport) driven from a single UI thread.
//!
//! ## Quick Start
//!
//! ```no_run
//! use session_engine::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new()?;
//! let mut edit = engine.create_edit();
//! edit.ensure_number_of_audio_tracks(1);
//!
//! // Add a built-in reverb to the first track
//! let desc = PluginDescription {
//!     name: "Reverb".into(),
//!     plugin_format_name: BUILT_IN_FORMAT_NAME.into(),
//!     ..Default::default()
//! };
//! let reverb = edit.create_new_plugin("reverb", &desc)?;
//! edit.insert_plugin(0, reverb, None)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod audio;
pub mod audio_file;
pub mod builtin;
pub mod clip;
pub mod description;
pub mod edit;
pub mod error;
pub mod format;
pub mod geometry;
pub mod hash;
pub mod host;
pub mod known_plugins;
pub mod listeners;
pub mod message_loop;
pub mod native_window;
pub mod parameters;
pub mod plugin;
pub mod rack;
pub mod scanner;
pub mod track;
pub mod transport;
pub mod vst3_format;

#[cfg(feature = "cpal-backend")]
pub mod backends;

mod internal;

pub use audio::{AudioConfig, AudioOutput, NullOutput, Playhead, SharedPlayhead};
pub use description::{PluginDescription, BUILT_IN_FORMAT_NAME};
pub use edit::{Edit, EditEvent, EditHandle};
pub use error::{Error, Result};
pub use host::{Engine, EngineBuilder};
pub use known_plugins::{KnownPluginList, PluginTree, SortMethod};
pub use parameters::Parameter;
pub use plugin::{Plugin, PluginHandle, PluginId, PluginKind};
pub use track::{AudioTrack, TrackEvent, TrackHandle};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        audio::{AudioConfig, AudioOutput},
        builtin::{BuiltInType, PluginTypes},
        clip::TimeRange,
        description::{PluginDescription, BUILT_IN_FORMAT_NAME},
        edit::{Edit, EditEvent, EditHandle},
        error::{Error, Result},
        format::{NativeEditor, PluginFormat, PluginFormatManager, PluginInstance},
        geometry::{Bounds, ResizeLimits},
        host::{Engine, EngineBuilder},
        known_plugins::{KnownPluginList, PluginTree, SortMethod},
        listeners::Subscription,
        message_loop::{AsyncUpdater, MessageLoop, UpdateFlag},
        parameters::Parameter,
        plugin::{Plugin, PluginHandle, PluginId, PluginKind},
        track::{ChildKind, TrackEvent, TrackHandle},
        transport::{TransportControl, TransportEvent},
    };

    #[cfg(feature = "cpal-backend")]
    pub use crate::backends::CpalOutput;
}
