use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use thiserror::Error;

/// Fixed behavioral instruction seeded as the first transcript turn.
///
/// Never displayed and never removed; the endpoint sees it on every call.
pub const SYSTEM_PROMPT: &str = "You are a helpful skincare and beauty advisor. \
Based on the user's selected products (including brand, name, category, and description), \
generate a personalized and logically ordered routine. Keep it clear, concise, and tailored \
to the product functions. You should only answer questions that relate to the generated \
routine or to topics like skincare, haircare, makeup, fragrance, and other related areas. \
If the user asks about unrelated topics, politely redirect them to focus on their routine \
or related beauty topics. You should also be able to remember the user's previous questions \
and answers to provide more contextually relevant responses.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("message content must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    /// Use `value` if it has content, otherwise the (statically non-empty) fallback.
    pub fn from_string_or(value: String, fallback: &'static str) -> Self {
        Self::new(value).unwrap_or_else(|_| Self(fallback.to_string()))
    }

    pub fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTurn {
    content: NonEmptyString,
    timestamp: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTurn {
    content: NonEmptyString,
    timestamp: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantTurn {
    content: NonEmptyString,
    timestamp: SystemTime,
}

/// One transcript turn.
///
/// A real sum type, not a `Role` tag + "sometimes-meaningful" fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Turn {
    System(SystemTurn),
    User(UserTurn),
    Assistant(AssistantTurn),
}

impl Turn {
    pub fn system(content: NonEmptyString) -> Self {
        Self::System(SystemTurn {
            content,
            timestamp: SystemTime::now(),
        })
    }

    pub fn user(content: NonEmptyString) -> Self {
        Self::User(UserTurn {
            content,
            timestamp: SystemTime::now(),
        })
    }

    pub fn assistant(content: NonEmptyString) -> Self {
        Self::Assistant(AssistantTurn {
            content,
            timestamp: SystemTime::now(),
        })
    }

    pub fn role_str(&self) -> &'static str {
        match self {
            Turn::System(_) => "system",
            Turn::User(_) => "user",
            Turn::Assistant(_) => "assistant",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Turn::System(t) => t.content.as_str(),
            Turn::User(t) => t.content.as_str(),
            Turn::Assistant(t) => t.content.as_str(),
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Turn::System(_))
    }
}

/// Ordered, append-only conversation history.
///
/// Seeded with exactly one system turn. The endpoint is stateless, so
/// `snapshot()` (the full sequence, system turn included) is resent on every
/// exchange. Lives for the session only; never persisted.
#[derive(Debug)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn seed() -> Self {
        Self {
            turns: vec![Turn::system(NonEmptyString::from_static(SYSTEM_PROMPT))],
        }
    }

    pub fn append_user(&mut self, content: NonEmptyString) {
        self.turns.push(Turn::user(content));
    }

    pub fn append_assistant(&mut self, content: NonEmptyString) {
        self.turns.push(Turn::assistant(content));
    }

    /// Turns to render, in order, with the system seed hidden.
    pub fn visible(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|turn| !turn.is_system())
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    /// The full ordered transcript, exactly what goes out on the wire.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop the conversation and re-establish the system seed.
    pub fn reset(&mut self) {
        *self = Self::seed();
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::seed()
    }
}
