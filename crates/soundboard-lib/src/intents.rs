//! Intent router — the reference host's [`IntentDispatcher`].
//!
//! Grammars come from the skill's vocab directory: `<name>.intent` phrase
//! lists for file intents and `<name>.voc` synonym lists for the vocabularies
//! a keyword intent requires. Keyword intents are tried first, in
//! registration order; among phrase intents the longest matching phrase wins.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use soundboard_core::intent::{KeywordIntent, PhraseIntent, tokenize};
use soundboard_core::types::Message;

use crate::error::{Result, SkillError};
use crate::host::{IntentDispatcher, IntentHandler};

pub struct IntentRouter {
    vocab_dir: PathBuf,
    keyword_intents: Vec<(KeywordIntent, IntentHandler)>,
    phrase_intents: Vec<(PhraseIntent, IntentHandler)>,
}

impl IntentRouter {
    pub fn new(vocab_dir: &Path) -> Self {
        Self {
            vocab_dir: vocab_dir.to_path_buf(),
            keyword_intents: Vec::new(),
            phrase_intents: Vec::new(),
        }
    }

    /// Names of every registered intent.
    pub fn intent_names(&self) -> Vec<String> {
        self.keyword_intents
            .iter()
            .map(|(intent, _)| intent.name.clone())
            .chain(self.phrase_intents.iter().map(|(intent, _)| intent.name.clone()))
            .collect()
    }

    /// Find the intent an utterance triggers.
    pub fn recognize(&self, utterance: &str) -> Option<(Message, IntentHandler)> {
        let tokens = tokenize(utterance);
        let keyword = self
            .keyword_intents
            .iter()
            .find(|(intent, _)| intent.matches(&tokens))
            .map(|(intent, handler)| (intent.name.as_str(), handler));
        // Longest matching phrase wins; ties go to the earlier registration.
        let phrase = || {
            let mut best: Option<(usize, &str, &IntentHandler)> = None;
            for (intent, handler) in &self.phrase_intents {
                if let Some(len) = intent.match_len(&tokens)
                    && best.is_none_or(|(best_len, _, _)| len > best_len)
                {
                    best = Some((len, intent.name.as_str(), handler));
                }
            }
            best.map(|(_, name, handler)| (name, handler))
        };

        let (name, handler) = keyword.or_else(phrase)?;
        debug!("intents: '{utterance}' → {name}");
        Some((Message::new(name, utterance), handler.clone()))
    }

    /// Look up a handler by intent name.
    pub fn handler(&self, name: &str) -> Option<IntentHandler> {
        self.keyword_intents
            .iter()
            .find(|(intent, _)| intent.name == name)
            .map(|(_, handler)| handler)
            .or_else(|| {
                self.phrase_intents
                    .iter()
                    .find(|(intent, _)| intent.name == name)
                    .map(|(_, handler)| handler)
            })
            .cloned()
    }
}

impl IntentDispatcher for IntentRouter {
    fn register_intent_file(&mut self, name: &str, handler: IntentHandler) -> Result<()> {
        let path = self.vocab_dir.join(format!("{name}.intent"));
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            debug!("intents: cannot read {}: {e}", path.display());
            SkillError::MissingGrammar(name.to_string())
        })?;
        let intent = PhraseIntent::parse(name, &contents);
        info!("intents: registered {name} ({} phrases)", intent.phrase_count());
        self.phrase_intents.push((intent, handler));
        Ok(())
    }

    fn register_keyword_intent(&mut self, mut intent: KeywordIntent, handler: IntentHandler) -> Result<()> {
        for vocab in &mut intent.required {
            let path = self.vocab_dir.join(format!("{}.voc", vocab.name));
            if let Ok(contents) = std::fs::read_to_string(&path) {
                vocab.extend(&contents);
            }
        }
        info!("intents: registered {} (keywords)", intent.name);
        self.keyword_intents.push((intent, handler));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundboard_core::intent::Vocabulary;
    use std::sync::{Arc, Mutex};

    fn recording_handler(log: &Arc<Mutex<Vec<Message>>>) -> IntentHandler {
        let log = log.clone();
        Arc::new(move |message: &Message| -> Result<()> {
            log.lock().unwrap().push(message.clone());
            Ok(())
        })
    }

    /// Recognize and run the handler inline.
    fn dispatch(router: &IntentRouter, utterance: &str) -> Option<(String, Result<()>)> {
        let (message, handler) = router.recognize(utterance)?;
        let result = handler(&message);
        Some((message.intent, result))
    }

    fn vocab_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("request.intent"), "fart for me\nlet one rip\n").unwrap();
        std::fs::write(dir.path().join("accuse.intent"), "did you fart\n").unwrap();
        std::fs::write(dir.path().join("halt.voc"), "halt\nstop\n").unwrap();
        std::fs::write(dir.path().join("farting.voc"), "farting\nfarts\n").unwrap();
        dir
    }

    fn halt() -> KeywordIntent {
        KeywordIntent::new("halt_farting")
            .require(Vocabulary::literal("halt"))
            .require(Vocabulary::literal("farting"))
    }

    #[test]
    fn dispatches_phrase_intent() {
        let dir = vocab_dir();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(dir.path());
        router.register_intent_file("request", recording_handler(&log)).unwrap();

        let (intent, result) = dispatch(&router, "Hey, fart for me").unwrap();
        assert_eq!(intent, "request");
        assert!(result.is_ok());
        assert_eq!(log.lock().unwrap()[0], Message::new("request", "Hey, fart for me"));
    }

    #[test]
    fn unmatched_utterance_returns_none() {
        let dir = vocab_dir();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(dir.path());
        router.register_intent_file("request", recording_handler(&log)).unwrap();

        assert!(dispatch(&router, "what's the weather").is_none());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_intent_file_is_an_error() {
        let dir = vocab_dir();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(dir.path());
        let err = router.register_intent_file("random", recording_handler(&log)).unwrap_err();
        assert!(matches!(err, SkillError::MissingGrammar(name) if name == "random"));
    }

    #[test]
    fn keyword_intent_uses_voc_synonyms() {
        let dir = vocab_dir();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(dir.path());
        router.register_keyword_intent(halt(), recording_handler(&log)).unwrap();

        assert_eq!(dispatch(&router, "stop the farts").unwrap().0, "halt_farting");
        assert_eq!(dispatch(&router, "farting, halt").unwrap().0, "halt_farting");
        assert!(dispatch(&router, "stop").is_none());
    }

    #[test]
    fn keyword_intents_win_over_phrases() {
        let dir = vocab_dir();
        std::fs::write(dir.path().join("random.intent"), "start farting\n").unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(dir.path());
        router.register_intent_file("random", recording_handler(&log)).unwrap();
        router.register_keyword_intent(halt(), recording_handler(&log)).unwrap();

        assert_eq!(dispatch(&router, "halt start farting").unwrap().0, "halt_farting");
        assert_eq!(dispatch(&router, "start farting").unwrap().0, "random");
    }

    #[test]
    fn longest_phrase_wins() {
        let dir = vocab_dir();
        std::fs::write(dir.path().join("random.intent"), "fart for me at random\n").unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(dir.path());
        router.register_intent_file("request", recording_handler(&log)).unwrap();
        router.register_intent_file("random", recording_handler(&log)).unwrap();

        assert_eq!(dispatch(&router, "fart for me at random").unwrap().0, "random");
        assert_eq!(dispatch(&router, "fart for me").unwrap().0, "request");
    }

    #[test]
    fn handler_lookup_by_name() {
        let dir = vocab_dir();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(dir.path());
        router.register_intent_file("accuse", recording_handler(&log)).unwrap();
        router.register_keyword_intent(halt(), recording_handler(&log)).unwrap();

        assert!(router.handler("accuse").is_some());
        assert!(router.handler("halt_farting").is_some());
        assert!(router.handler("request").is_none());
        assert_eq!(router.intent_names(), vec!["halt_farting", "accuse"]);
    }

    #[test]
    fn shipped_grammar_keeps_halt_narrow() {
        let vocab = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../skill/vocab/en-us");
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = IntentRouter::new(&vocab);
        router.register_intent_file("request", recording_handler(&log)).unwrap();
        router.register_keyword_intent(halt(), recording_handler(&log)).unwrap();

        assert_eq!(dispatch(&router, "don't stop, fart for me").unwrap().0, "request");
        assert_eq!(dispatch(&router, "halt the farting").unwrap().0, "halt_farting");
        assert!(dispatch(&router, "stop the farts").is_none());
    }

    #[test]
    fn handler_error_is_returned() {
        let dir = vocab_dir();
        let mut router = IntentRouter::new(dir.path());
        router
            .register_intent_file("accuse", Arc::new(|_: &Message| -> Result<()> { Err(SkillError::EmptyLibrary) }))
            .unwrap();

        let (_, result) = dispatch(&router, "did you fart").unwrap();
        assert!(matches!(result, Err(SkillError::EmptyLibrary)));
    }
}
