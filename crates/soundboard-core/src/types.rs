//! Shared types and constants for the soundboard skill.
//!
//! Kept free of tokio and rodio so the HTTP client side and tests can depend
//! on them without pulling in the playback stack.

use std::ops::Range;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::PICROFT;

// ─── Skill layout ──────────────────────────────────────────────────────────

/// Sub-directory of the skill holding the sound clips.
pub const SOUNDS_DIR: &str = "sounds";

/// Sub-directory of the skill holding `*.dialog` templates.
pub const DIALOG_DIR: &str = "dialog/en-us";

/// Sub-directory of the skill holding `*.intent` and `*.voc` grammars.
pub const VOCAB_DIR: &str = "vocab/en-us";

/// Extensions admitted into the sound library. `.wav` is left out on purpose.
pub const SOUND_EXTENSIONS: &[&str] = &["mp3"];

// ─── Intents and dialogs ───────────────────────────────────────────────────

pub const INTENT_ACCUSE: &str = "accuse";
pub const INTENT_REQUEST: &str = "request";
pub const INTENT_RANDOM: &str = "random";
pub const INTENT_HALT: &str = "halt_farting";

/// Vocabularies the halt intent requires, in any order.
pub const HALT_VOCAB: &[&str] = &["halt", "farting"];

pub const DIALOG_APOLOGISE: &str = "apologise";
pub const DIALOG_NOISE: &str = "noise";
pub const DIALOG_CANCEL: &str = "cancel";

/// Lines spoken when random mode is switched on.
pub const RANDOM_ACK: &str = "got it";
pub const RANDOM_PROMISE: &str = "don't worry, I'll be very discrete";

/// Pause between the two acknowledgement lines.
pub const RANDOM_ACK_PAUSE: Duration = Duration::from_millis(500);

// ─── Timer chain ───────────────────────────────────────────────────────────

/// Prefix of every scheduled random event name.
pub const EVENT_PREFIX: &str = "random_fart";

/// Delay (seconds) before the first random event after activation.
pub const FIRST_EVENT_DELAY_SECS: Range<u64> = 30..60;

/// Delay (seconds) between subsequent random events.
pub const NEXT_EVENT_DELAY_SECS: Range<u64> = 60..1800;

/// Name of the scheduled event for a given counter value.
pub fn event_name(counter: u64) -> String {
    format!("{EVENT_PREFIX}{counter}")
}

/// Pause after a clip's own duration before the comment is spoken.
///
/// Picroft output lags behind the Mark 1, so it waits longer.
pub fn post_playback_delay(platform: &str) -> Duration {
    if platform == PICROFT {
        Duration::from_secs(6)
    } else {
        Duration::from_secs(1)
    }
}

// ─── Dispatch ──────────────────────────────────────────────────────────────

/// Payload handed to an intent handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub intent: String,
    pub utterance: String,
}

impl Message {
    pub fn new(intent: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            utterance: utterance.into(),
        }
    }
}

/// Skill state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStatus {
    pub random_active: bool,
    pub event_counter: u64,
    pub platform: String,
    pub sound_count: usize,
}
