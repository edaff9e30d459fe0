//! Static translation tables and the swappable `Translator` value.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "de" => Some(Self::De),
            _ => None,
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("addStory", "Add story"),
    ("storyTitle", "Story title"),
    ("description", "Description"),
    ("backlog", "Backlog"),
    ("trash", "Trash"),
    ("help", "Help"),
    ("settings", "Settings"),
    ("log", "Log"),
    ("reveal", "Reveal"),
    ("newRound", "New round"),
    ("leaveRoom", "Leave room"),
    ("joinedRoom", "{{username}} joined the room"),
    ("leftRoom", "{{username}} left the room"),
    ("kicked", "{{username}} was kicked from the room"),
    ("connectionLost", "{{username}} lost the connection"),
    ("storyAdded", "New story added"),
    ("storyChanged", "Story changed"),
    ("storyTrashed", "Story moved to trash"),
    ("storyRestored", "Story restored from trash"),
    ("storyDeleted", "Story deleted"),
    ("storySelected", "Story selected"),
    ("storyEstimateGiven", "{{username}} estimated"),
    ("storyEstimateCleared", "{{username}} cleared the estimate"),
    ("revealed", "Cards revealed"),
    ("newEstimationRoundStarted", "New estimation round started"),
    ("consensusAchieved", "Consensus achieved: {{value}}"),
    ("commandRejected", "An error occurred: {{reason}}"),
    ("uptime", "Uptime"),
    ("totalRooms", "Total rooms"),
];

const DE: &[(&str, &str)] = &[
    ("addStory", "Story hinzufügen"),
    ("storyTitle", "Story Titel"),
    ("description", "Beschreibung"),
    ("backlog", "Backlog"),
    ("trash", "Papierkorb"),
    ("help", "Hilfe"),
    ("settings", "Einstellungen"),
    ("log", "Log"),
    ("reveal", "Aufdecken"),
    ("newRound", "Neue Runde"),
    ("leaveRoom", "Raum verlassen"),
    ("joinedRoom", "{{username}} hat den Raum betreten"),
    ("leftRoom", "{{username}} hat den Raum verlassen"),
    ("kicked", "{{username}} wurde aus dem Raum entfernt"),
    ("connectionLost", "{{username}} hat die Verbindung verloren"),
    ("storyAdded", "Neue Story hinzugefügt"),
    ("storyChanged", "Story geändert"),
    ("storyTrashed", "Story in den Papierkorb verschoben"),
    ("storyRestored", "Story wiederhergestellt"),
    ("storyDeleted", "Story gelöscht"),
    ("storySelected", "Story ausgewählt"),
    ("storyEstimateGiven", "{{username}} hat geschätzt"),
    ("storyEstimateCleared", "{{username}} hat die Schätzung zurückgezogen"),
    ("revealed", "Karten aufgedeckt"),
    ("newEstimationRoundStarted", "Neue Schätzrunde gestartet"),
    ("consensusAchieved", "Konsens erreicht: {{value}}"),
    ("commandRejected", "Ein Fehler ist aufgetreten: {{reason}}"),
    ("uptime", "Laufzeit"),
    ("totalRooms", "Räume gesamt"),
];

fn table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::En => EN,
        Language::De => DE,
    }
}

/// Translation strategy for one language.
///
/// Cheap to clone. A language change builds a new `Translator` instead of
/// mutating the current one, so subscribers always observe a replacement.
#[derive(Clone)]
pub struct Translator {
    language: Language,
    strings: Arc<HashMap<&'static str, &'static str>>,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            strings: Arc::new(table(language).iter().copied().collect()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Missing keys translate to themselves.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        self.strings.get(key).copied().unwrap_or(key)
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut text = self.t(key).to_string();
        for (name, value) in params {
            text = text.replace(&format!("{{{{{name}}}}}"), value);
        }
        text
    }

    /// True when both values are the same translator instance.
    pub fn same_instance(&self, other: &Translator) -> bool {
        Arc::ptr_eq(&self.strings, &other.strings)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

#[cfg(test)]
#[path = "tests/translator_tests.rs"]
mod tests;
