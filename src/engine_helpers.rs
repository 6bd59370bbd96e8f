//! Small operations on an edit used by the shell

use session_engine::{
    audio_file::{AudioFile, SUPPORTED_EXTENSIONS},
    clip::{ClipId, TimeRange},
    message_loop::MessageLoop,
    Edit, EditHandle, TrackHandle,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// Make sure the track at `index` exists and return it
pub fn get_or_insert_audio_track_at(edit: &mut Edit, index: usize) -> TrackHandle {
    edit.ensure_number_of_audio_tracks(index + 1);
    edit.audio_tracks()[index].clone()
}

pub fn remove_all_clips(track: &TrackHandle) {
    track.borrow_mut().remove_all_clips();
}

/// Replace the clips of the first track with one clip playing `file` from
/// the start. Returns `None` and leaves the track alone if the file cannot be
/// decoded.
pub fn load_audio_file_as_clip(edit: &mut Edit, file: &Path) -> Option<ClipId> {
    match AudioFile::open(file) {
        Ok(audio) => Some(replace_clips_with(edit, file, Arc::new(audio))),
        Err(e) => {
            log::debug!("Not loading {}: {}", file.display(), e);
            None
        }
    }
}

/// Like [`load_audio_file_as_clip`], but the file is decoded on a worker
/// thread. The clip is placed during a later dispatch and `on_loaded` gets
/// its id, or `None` if the file could not be decoded. Nothing happens if the
/// edit is gone by then.
pub fn load_audio_file_as_clip_async<F>(
    message_loop: &MessageLoop,
    edit: &EditHandle,
    file: PathBuf,
    on_loaded: F,
) where
    F: FnOnce(Option<ClipId>) + 'static,
{
    let edit = Rc::downgrade(edit);
    let source = file.clone();

    message_loop.spawn_blocking(
        move || AudioFile::open(&source),
        move |decoded| {
            let Some(edit) = edit.upgrade() else {
                return;
            };
            let clip = match decoded {
                Ok(audio) => Some(replace_clips_with(&mut edit.borrow_mut(), &file, Arc::new(audio))),
                Err(e) => {
                    log::debug!("Not loading {}: {}", file.display(), e);
                    None
                }
            };
            on_loaded(clip);
        },
    );
}

fn replace_clips_with(edit: &mut Edit, file: &Path, audio: Arc<AudioFile>) -> ClipId {
    let track = get_or_insert_audio_track_at(edit, 0);
    remove_all_clips(&track);

    let mut track = track.borrow_mut();
    let range = TimeRange::with_length(0.0, audio.length());
    let id = track.insert_wave_clip(audio.stem(), file.to_path_buf(), audio, range);
    log::info!("Loaded {} onto {}", file.display(), track.name());
    id
}

/// Loop the transport around a clip and start playing from the top
pub fn loop_around_clip(edit: &Edit, track: usize, clip: ClipId) -> bool {
    let Some(range) = edit.audio_track(track).and_then(|track| {
        track
            .borrow()
            .clips()
            .iter()
            .find(|c| c.id == clip)
            .map(|c| c.position)
    }) else {
        return false;
    };

    let transport = edit.transport();
    transport.set_loop_range(range);
    transport.set_looping(true);
    transport.set_position(0.0);
    transport.play();
    true
}

pub fn toggle_play(edit: &Edit) {
    let transport = edit.transport();
    if transport.is_playing() {
        transport.stop();
    } else {
        transport.play();
    }
}

/// Ask for an audio file without blocking the caller. The chooser runs on a
/// worker thread and `on_chosen` gets the file during a later dispatch, or
/// `None` if cancelled.
pub fn browse_for_audio_file<F>(message_loop: &MessageLoop, start_dir: Option<PathBuf>, on_chosen: F)
where
    F: FnOnce(Option<PathBuf>) + 'static,
{
    message_loop.spawn_blocking(
        move || {
            let mut dialog = rfd::FileDialog::new()
                .set_title("Please select an audio file to load...")
                .add_filter("Audio files", SUPPORTED_EXTENSIONS);
            if let Some(dir) = start_dir {
                dialog = dialog.set_directory(dir);
            }
            dialog.pick_file().filter(|f| f.is_file())
        },
        on_chosen,
    );
}
