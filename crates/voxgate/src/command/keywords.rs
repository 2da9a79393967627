//! Keyword buckets for the rule-based classifier.

const OPEN_WORDS: &[&str] = &["open", "launch", "start", "run"];
const LOCK_WORDS: &[&str] = &["lock", "screen", "secure"];
const PLAY_VERBS: &[&str] = &["play", "resume"];
const PAUSE_WORDS: &[&str] = &["pause", "stop", "halt"];
// Nouns only count toward play once no pause verb is present: "pause the music" pauses.
const MEDIA_NOUNS: &[&str] = &["music", "video"];

const NOTEPAD_WORDS: &[&str] = &["notepad", "text", "editor"];
const CALCULATOR_WORDS: &[&str] = &["calculator", "calc"];
const BROWSER_WORDS: &[&str] = &["browser", "chrome", "firefox", "edge"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Open,
    Lock,
    Play,
    Pause,
}

/// Generic application kinds an unmatched "open" request can still fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericApp {
    Notepad,
    Calculator,
    Browser,
}

impl GenericApp {
    pub fn name(&self) -> &'static str {
        match self {
            GenericApp::Notepad => "notepad",
            GenericApp::Calculator => "calculator",
            GenericApp::Browser => "browser",
        }
    }

    pub fn detect(tokens: &[String]) -> Option<Self> {
        if any_of(tokens, NOTEPAD_WORDS) {
            Some(GenericApp::Notepad)
        } else if any_of(tokens, CALCULATOR_WORDS) {
            Some(GenericApp::Calculator)
        } else if any_of(tokens, BROWSER_WORDS) {
            Some(GenericApp::Browser)
        } else {
            None
        }
    }
}

/// Lower-case `text` and split it on anything that is not a letter or digit.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bucket for a tokenized transcript, in precedence order open, lock, play, pause.
pub fn classify(tokens: &[String]) -> Option<Bucket> {
    if any_of(tokens, OPEN_WORDS) {
        Some(Bucket::Open)
    } else if any_of(tokens, LOCK_WORDS) {
        Some(Bucket::Lock)
    } else if any_of(tokens, PLAY_VERBS) {
        Some(Bucket::Play)
    } else if any_of(tokens, PAUSE_WORDS) {
        Some(Bucket::Pause)
    } else if any_of(tokens, MEDIA_NOUNS) {
        Some(Bucket::Play)
    } else {
        None
    }
}

/// Text following the first open trigger word, or the whole text when there is none.
/// `lowered` must already be lower-case.
pub fn open_remainder(lowered: &str) -> &str {
    let mut offset = 0;
    for word in lowered.split(|c: char| !c.is_alphanumeric()) {
        let end = offset + word.len();
        if OPEN_WORDS.contains(&word) {
            return lowered[end..].trim();
        }
        // Every separator is one char; step past it.
        offset = end
            + lowered[end..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(0);
    }
    lowered.trim()
}

fn any_of(tokens: &[String], words: &[&str]) -> bool {
    tokens.iter().any(|token| words.contains(&token.as_str()))
}
