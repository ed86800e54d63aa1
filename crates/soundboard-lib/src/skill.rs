//! The soundboard skill.
//!
//! Plays a random clip on request, on a self-re-arming random timer, and
//! comments afterwards. The host owns the skill and drives it through the
//! intent handlers registered in [`SoundboardSkill::initialize`] and through
//! scheduled event callbacks.
//!
//! Timer chain:
//!
//! ```text
//! random intent → schedule random_fart<n>       (30..60 s)
//! fart event    → cancel random_fart<n>, n += 1,
//!                 schedule random_fart<n>       (60..1800 s), fart and comment
//! halt          → cancel random_fart<n>
//! ```
//!
//! A fart-and-comment cycle blocks its caller for the clip length plus a
//! platform delay. Halt cannot cut that sleep short; it clears the active
//! flag so the next event does nothing, and stops the player.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use tracing::{error, info, warn};

use soundboard_core::intent::{KeywordIntent, Vocabulary};
use soundboard_core::types::{
    DIALOG_APOLOGISE, DIALOG_CANCEL, DIALOG_NOISE, FIRST_EVENT_DELAY_SECS, HALT_VOCAB,
    INTENT_ACCUSE, INTENT_HALT, INTENT_RANDOM, INTENT_REQUEST, Message,
    NEXT_EVENT_DELAY_SECS, RANDOM_ACK, RANDOM_ACK_PAUSE, RANDOM_PROMISE, SOUND_EXTENSIONS,
    SOUNDS_DIR, SkillStatus, event_name, post_playback_delay,
};

use crate::config::detect_platform;
use crate::error::{Result, SkillError};
use crate::host::{AudioPlayer, Clock, IntentDispatcher, IntentHandler, Scheduler, SpeechOutput};
use crate::library::{DurationProbe, SoundLibrary};

/// Host services handed to the skill at construction.
#[derive(Clone)]
pub struct SkillServices {
    pub scheduler: Arc<dyn Scheduler>,
    pub speech: Arc<dyn SpeechOutput>,
    pub clock: Arc<dyn Clock>,
    pub probe: Arc<dyn DurationProbe>,
}

#[derive(Debug, Default)]
struct SkillState {
    random_active: bool,
    event_counter: u64,
}

pub struct SoundboardSkill {
    platform: String,
    library: SoundLibrary,
    services: SkillServices,
    audio: OnceLock<Arc<dyn AudioPlayer>>,
    state: Mutex<SkillState>,
}

impl SoundboardSkill {
    pub fn new(platform: impl Into<String>, library: SoundLibrary, services: SkillServices) -> Self {
        Self {
            platform: platform.into(),
            library,
            services,
            audio: OnceLock::new(),
            state: Mutex::new(SkillState::default()),
        }
    }

    /// Detect the platform from the host config layers and scan
    /// `<skill_dir>/sounds` for clips.
    pub fn load(skill_dir: &Path, config_paths: &[PathBuf], services: SkillServices) -> Result<Self> {
        let platform = detect_platform(config_paths);
        let library = SoundLibrary::load(&skill_dir.join(SOUNDS_DIR), SOUND_EXTENSIONS)?;
        info!("skill: platform {platform}, {} clips", library.len());
        Ok(Self::new(platform, library, services))
    }

    /// Register intent handlers and take the audio player.
    pub fn initialize(
        self: &Arc<Self>,
        dispatcher: &mut dyn IntentDispatcher,
        audio: Arc<dyn AudioPlayer>,
    ) -> Result<()> {
        dispatcher.register_intent_file(
            INTENT_ACCUSE,
            self.handler(|skill, msg| skill.handle_accuse_intent(msg)),
        )?;
        dispatcher.register_intent_file(
            INTENT_REQUEST,
            self.handler(|skill, msg| skill.handle_request_intent(msg)),
        )?;
        dispatcher.register_intent_file(
            INTENT_RANDOM,
            self.handler(|skill, msg| skill.handle_random_intent(msg)),
        )?;

        let halt = HALT_VOCAB.iter().fold(KeywordIntent::new(INTENT_HALT), |intent, name| {
            intent.require(Vocabulary::literal(name))
        });
        dispatcher.register_keyword_intent(halt, self.handler(|skill, msg| skill.halt_farting(msg)))?;

        if self.audio.set(audio).is_err() {
            warn!("skill: initialize called twice, keeping the first audio player");
        }
        Ok(())
    }

    fn handler(
        self: &Arc<Self>,
        f: impl Fn(&Arc<Self>, &Message) -> Result<()> + Send + Sync + 'static,
    ) -> IntentHandler {
        let skill = Arc::clone(self);
        Arc::new(move |msg: &Message| f(&skill, msg))
    }

    fn state(&self) -> MutexGuard<'_, SkillState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    /// Extra wait after a clip before commenting on it.
    pub fn post_playback_delay(&self) -> Duration {
        post_playback_delay(&self.platform)
    }

    pub fn status(&self) -> SkillStatus {
        let state = self.state();
        SkillStatus {
            random_active: state.random_active,
            event_counter: state.event_counter,
            platform: self.platform.clone(),
            sound_count: self.library.len(),
        }
    }

    // ─── Intent handlers ───────────────────────────────────────────────

    /// Play a clip now.
    pub fn handle_request_intent(&self, _message: &Message) -> Result<()> {
        self.fart_and_comment()
    }

    pub fn handle_accuse_intent(&self, _message: &Message) -> Result<()> {
        self.services.speech.speak_dialog(DIALOG_APOLOGISE);
        Ok(())
    }

    /// Switch random mode on and arm the first event. Calling it again arms
    /// another chain alongside the first.
    pub fn handle_random_intent(self: &Arc<Self>, _message: &Message) -> Result<()> {
        info!("skill: triggering random farting");
        let speech = &self.services.speech;
        speech.speak(RANDOM_ACK);
        self.services.clock.sleep(RANDOM_ACK_PAUSE);
        speech.speak(RANDOM_PROMISE);

        let counter = {
            let mut state = self.state();
            state.random_active = true;
            state.event_counter
        };
        self.schedule_fart_event(FIRST_EVENT_DELAY_SECS, counter);
        Ok(())
    }

    /// Scheduled event callback. Re-arms itself and plays a clip while random
    /// mode is active; does nothing otherwise.
    pub fn handle_fart_event(self: &Arc<Self>) -> Result<()> {
        info!("skill: handling fart event");
        let (current, next) = {
            let mut state = self.state();
            if !state.random_active {
                return Ok(());
            }
            let current = state.event_counter;
            state.event_counter += 1;
            (current, state.event_counter)
        };

        self.services.scheduler.cancel(&event_name(current));
        self.schedule_fart_event(NEXT_EVENT_DELAY_SECS, next);
        self.fart_and_comment()
    }

    /// Leave random mode.
    pub fn halt_farting(&self, _message: &Message) -> Result<()> {
        info!("skill: stopping");
        let counter = {
            let mut state = self.state();
            if !state.random_active {
                return Ok(());
            }
            state.random_active = false;
            state.event_counter
        };

        info!("skill: stopping random farting event");
        self.services.speech.speak_dialog(DIALOG_CANCEL);
        if let Some(audio) = self.audio.get() {
            audio.stop();
        }
        self.services.scheduler.cancel(&event_name(counter));
        Ok(())
    }

    /// Host stop hook.
    pub fn stop(&self) {}

    // ─── Cycle ────────────────────────────────────────────────────────

    /// Play a random clip, wait for it to finish, then comment.
    ///
    /// The clip whose duration is measured and the clip that is played are
    /// two independent draws. Blocks the calling thread.
    pub fn fart_and_comment(&self) -> Result<()> {
        info!("skill: fart and comment");
        let audio = self.audio.get().ok_or(SkillError::NotInitialized)?;
        let mut rng = rand::thread_rng();

        let measured = self.library.choose(&mut rng)?;
        let duration = Duration::from_secs(self.services.probe.duration(measured)?.as_secs());
        let played = self.library.choose(&mut rng)?;
        audio.play(played);
        info!("skill: fart duration {}", duration.as_secs());

        self.services.clock.sleep(duration + self.post_playback_delay());
        self.services.speech.speak_dialog(DIALOG_NOISE);
        Ok(())
    }

    fn schedule_fart_event(self: &Arc<Self>, delay_secs: Range<u64>, counter: u64) {
        let delay = Duration::from_secs(rand::thread_rng().gen_range(delay_secs));
        let skill: Weak<Self> = Arc::downgrade(self);
        self.services.scheduler.schedule(
            &event_name(counter),
            self.services.clock.now() + delay,
            Box::new(move || {
                let Some(skill) = skill.upgrade() else {
                    return;
                };
                if let Err(e) = skill.handle_fart_event() {
                    error!("skill: fart event failed: {e}");
                }
            }),
        );
    }
}
