use serde::Serialize;

/// Placeholder standing in for an application name inside a templated pattern.
pub const APPLICATION_PLACEHOLDER: &str = "<application_name>";

/// Root intents the gateway can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Open,
    LockScreen,
    PlayMedia,
    PauseMedia,
}

#[derive(Debug, Clone, Serialize)]
pub struct VocabularyEntry {
    pub pattern: &'static str,
    pub description: &'static str,
    pub intent: Intent,
}

/// The complete set of resolvable root intents, in match order.
pub const VOCABULARY: [VocabularyEntry; 4] = [
    VocabularyEntry {
        pattern: "open <application_name>",
        description: "Opens any given application",
        intent: Intent::Open,
    },
    VocabularyEntry {
        pattern: "lock screen",
        description: "Locks the computer screen",
        intent: Intent::LockScreen,
    },
    VocabularyEntry {
        pattern: "play media",
        description: "Plays or resumes media",
        intent: Intent::PlayMedia,
    },
    VocabularyEntry {
        pattern: "pause media",
        description: "Pauses media",
        intent: Intent::PauseMedia,
    },
];

impl VocabularyEntry {
    pub fn is_templated(&self) -> bool {
        self.pattern.contains(APPLICATION_PLACEHOLDER)
    }

    /// Literal text of the pattern: the whole pattern for fixed entries, the text before
    /// the placeholder for templated ones.
    pub fn literal(&self) -> &'static str {
        match self.pattern.find(APPLICATION_PLACEHOLDER) {
            Some(index) => self.pattern[..index].trim(),
            None => self.pattern,
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        let literal = self.literal();
        if self.is_templated() {
            contains_word(lowered, literal)
        } else {
            lowered.contains(literal)
        }
    }
}

pub fn entries() -> &'static [VocabularyEntry] {
    &VOCABULARY
}

pub fn entry_for(intent: Intent) -> &'static VocabularyEntry {
    VOCABULARY
        .iter()
        .find(|entry| entry.intent == intent)
        .unwrap_or(&VOCABULARY[0])
}

/// First entry whose literal text occurs, case-insensitively, in `text`.
///
/// The templated literal (`open`) must stand as a whole word so "reopened" or "opener"
/// in a generated reply do not count as an open request.
pub fn match_response(text: &str) -> Option<&'static VocabularyEntry> {
    let lowered = text.to_lowercase();
    VOCABULARY.iter().find(|entry| entry.matches(&lowered))
}

/// Pipe-delimited pattern list, used in log lines and the management API.
pub fn pattern_list() -> String {
    VOCABULARY
        .iter()
        .map(|entry| entry.pattern)
        .collect::<Vec<_>>()
        .join("|")
}

fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
