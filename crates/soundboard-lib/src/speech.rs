//! Speech output — dialog templates rendered to a text sink.
//!
//! The skill speaks either literal text or a named dialog template. Templates
//! are read from `*.dialog` files; the chosen line is handed to a
//! [`SpeechSink`], which is the actual voice: any TTS server accepting
//! `POST /speak`, or the log when no server is configured.

use std::path::Path;

use tokio::runtime::Handle;
use tracing::{debug, error, info};

use soundboard_core::dialog::DialogSet;

use crate::error::Result;
use crate::host::SpeechOutput;

/// Final destination of spoken text.
pub trait SpeechSink: Send + Sync {
    fn say(&self, text: &str);
}

/// Writes spoken lines to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SpeechSink for LogSink {
    fn say(&self, text: &str) {
        info!("speak: {text}");
    }
}

/// Posts spoken lines to a TTS server's `/speak` endpoint.
///
/// Fire and forget: the request runs on the tokio runtime and failures are
/// only logged.
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
    handle: Handle,
}

impl HttpSink {
    pub fn new(server: &str, handle: Handle) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/speak", server.trim_end_matches('/')),
            handle,
        }
    }
}

impl SpeechSink for HttpSink {
    fn say(&self, text: &str) {
        let request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }));
        let url = self.url.clone();
        debug!("speech: POST {} chars to {url}", text.len());
        self.handle.spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => error!("speech: {url} returned {}", resp.status()),
                Err(e) => error!("speech: request to {url} failed: {e}"),
            }
        });
    }
}

/// [`SpeechOutput`] that renders dialog templates into a sink.
pub struct DialogSpeech {
    dialogs: DialogSet,
    sink: Box<dyn SpeechSink>,
}

impl DialogSpeech {
    pub fn new(dialogs: DialogSet, sink: Box<dyn SpeechSink>) -> Self {
        Self { dialogs, sink }
    }

    /// Read every `*.dialog` file in `dir`.
    pub fn load(dir: &Path, sink: Box<dyn SpeechSink>) -> Result<Self> {
        let mut dialogs = DialogSet::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "dialog") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            dialogs.insert(name, &std::fs::read_to_string(&path)?);
        }
        debug!("speech: {} dialog templates from {}", dialogs.len(), dir.display());
        Ok(Self::new(dialogs, sink))
    }

    pub fn dialogs(&self) -> &DialogSet {
        &self.dialogs
    }
}

impl SpeechOutput for DialogSpeech {
    fn speak(&self, text: &str) {
        self.sink.say(text);
    }

    fn speak_dialog(&self, template: &str) {
        let line = self.dialogs.render(template, &mut rand::thread_rng());
        self.sink.say(&line);
    }
}
