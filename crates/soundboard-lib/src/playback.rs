//! Clip playback — rodio sink on a dedicated OS thread.
//!
//! ```text
//! play(path) / stop() → [cmd_tx] → playback thread: decode file → sink
//! ```
//!
//! rodio's `OutputStream` is `!Send`, so the stream and its sink live on one
//! thread for the lifetime of the player. Callers never block: `play` only
//! queues a command. A clip that cannot be opened or decoded is logged and
//! dropped.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

use rodio::{Decoder, OutputStream, Sink};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::host::AudioPlayer;

enum PlayCmd {
    Play(PathBuf),
    Stop,
}

/// Handle to the playback thread. Dropping it ends the thread.
pub struct RodioPlayer {
    cmd_tx: Mutex<Sender<PlayCmd>>,
}

impl RodioPlayer {
    /// Spawn the playback thread.
    pub fn new() -> Result<Self> {
        let (cmd_tx, cmd_rx) = channel::<PlayCmd>();
        std::thread::Builder::new()
            .name("soundboard-playback".into())
            .spawn(move || playback_thread(cmd_rx))?;
        Ok(Self {
            cmd_tx: Mutex::new(cmd_tx),
        })
    }

    fn send(&self, cmd: PlayCmd) {
        let sent = match self.cmd_tx.lock() {
            Ok(tx) => tx.send(cmd).is_ok(),
            Err(_) => false,
        };
        if !sent {
            warn!("playback: thread is gone, command dropped");
        }
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, path: &Path) {
        self.send(PlayCmd::Play(path.to_path_buf()));
    }

    fn stop(&self) {
        self.send(PlayCmd::Stop);
    }
}

fn open_clip(path: &Path) -> std::result::Result<Decoder<BufReader<File>>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())
}

fn playback_thread(cmd_rx: Receiver<PlayCmd>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            error!("playback: failed to open audio output: {e}");
            return;
        }
    };

    let mut sink = match Sink::try_new(&stream_handle) {
        Ok(sink) => sink,
        Err(e) => {
            error!("playback: failed to create sink: {e}");
            return;
        }
    };

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            PlayCmd::Play(path) => match open_clip(&path) {
                Ok(source) => {
                    debug!("playback: {}", path.display());
                    sink.append(source);
                }
                Err(e) => error!("playback: cannot play {}: {e}", path.display()),
            },
            PlayCmd::Stop => {
                sink.stop();
                sink = match Sink::try_new(&stream_handle) {
                    Ok(sink) => sink,
                    Err(e) => {
                        error!("playback: failed to recreate sink: {e}");
                        return;
                    }
                };
            }
        }
    }

    sink.stop();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_clip_missing_file() {
        assert!(open_clip(Path::new("/nonexistent/clip.mp3")).is_err());
    }

    #[test]
    fn open_clip_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.mp3");
        std::fs::write(&path, b"garbage").unwrap();
        assert!(open_clip(&path).is_err());
    }
}
