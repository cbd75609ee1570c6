//! Plain records shared by every backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A translatable product. A nil `id` asks the repository to assign one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: Uuid::nil(), name: name.into() }
    }
}

/// Localized messages of one service in one language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub language: String,
    #[serde(default)]
    pub original: bool,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Translation {
    pub fn new(language: impl Into<String>) -> Self {
        Self { language: language.into(), ..Self::default() }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Upsert `incoming` into the stored messages by id. Existing ids keep
    /// their position and take the new contents, unknown ids are appended.
    /// Later duplicates in `incoming` win.
    pub fn merge_messages(&mut self, incoming: Vec<Message>) {
        for message in incoming {
            match self.messages.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => *existing = message,
                None => self.messages.push(message),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub status: MessageStatus,
}

impl Message {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self { id: id.into(), message: message.into(), ..Self::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Untranslated,
    Fuzzy,
    Translated,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Untranslated => "untranslated",
            MessageStatus::Fuzzy => "fuzzy",
            MessageStatus::Translated => "translated",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "untranslated" => Ok(MessageStatus::Untranslated),
            "fuzzy" => Ok(MessageStatus::Fuzzy),
            "translated" => Ok(MessageStatus::Translated),
            other => Err(format!("unknown message status: {other}")),
        }
    }
}

/// Options for `load_translations`. An empty filter means every language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadTranslationsOpts {
    pub filter_languages: Vec<String>,
}

impl LoadTranslationsOpts {
    pub fn languages<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { filter_languages: languages.into_iter().map(Into::into).collect() }
    }

    /// Requested languages, deduplicated and sorted.
    pub(crate) fn normalized_languages(&self) -> Vec<String> {
        let mut langs = self.filter_languages.clone();
        langs.sort();
        langs.dedup();
        langs
    }
}
