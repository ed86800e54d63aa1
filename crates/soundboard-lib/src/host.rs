//! Host contracts — what the assistant runtime provides to the skill.
//!
//! The skill never reaches past these traits. The reference host in this
//! crate implements them with rodio, tokio and axum; tests implement them
//! with recorders.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use soundboard_core::intent::KeywordIntent;
use soundboard_core::types::Message;

use crate::error::Result;

/// Callback invoked with a dispatched intent.
pub type IntentHandler = Arc<dyn Fn(&Message) -> Result<()> + Send + Sync>;

/// One-shot callback run by the [`Scheduler`].
pub type EventCallback = Box<dyn FnOnce() + Send + 'static>;

/// Routes recognized utterances to registered handlers.
pub trait IntentDispatcher {
    /// Register a handler for the phrase grammar `<name>.intent`.
    fn register_intent_file(&mut self, name: &str, handler: IntentHandler) -> Result<()>;

    /// Register a handler for a keyword-conjunction intent.
    fn register_keyword_intent(&mut self, intent: KeywordIntent, handler: IntentHandler) -> Result<()>;
}

/// Asynchronous clip playback.
pub trait AudioPlayer: Send + Sync {
    /// Start playing `path`. Returns immediately.
    fn play(&self, path: &Path);

    /// Stop whatever is playing. Best effort.
    fn stop(&self);
}

/// Named one-shot timers.
///
/// Several pending events may share a name; `cancel` drops all of them.
/// Cancelling an unknown name does nothing.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, name: &str, at: Instant, callback: EventCallback);

    fn cancel(&self, name: &str);
}

/// Spoken output.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);

    /// Speak a line picked from the named dialog template.
    fn speak_dialog(&self, template: &str);
}

/// Time source. `sleep` blocks the calling thread.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
