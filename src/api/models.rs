use crate::error::ChatError;
use crate::utils::{date_key, format_duration, format_time};
use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of people (and utility chats) the user can message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contact {
    Alex,
    Elly,
    Office,
    Friend,
    Notes,
}

impl Contact {
    pub const ALL: [Contact; 5] = [
        Contact::Alex,
        Contact::Elly,
        Contact::Office,
        Contact::Friend,
        Contact::Notes,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Contact::Alex => "alex",
            Contact::Elly => "elly",
            Contact::Office => "office",
            Contact::Friend => "friend",
            Contact::Notes => "notes",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Contact::Alex => "Alex",
            Contact::Elly => "Elly",
            Contact::Office => "Office",
            Contact::Friend => "Friend",
            Contact::Notes => "Notes",
        }
    }

    pub fn default_avatar(self) -> &'static str {
        match self {
            Contact::Alex => "https://images.pexels.com/photos/614810/pexels-photo-614810.jpeg?auto=compress&cs=tinysrgb&w=200",
            Contact::Elly => "https://images.pexels.com/photos/3760853/pexels-photo-3760853.jpeg?auto=compress&cs=tinysrgb&w=200",
            Contact::Office => "https://images.pexels.com/photos/1181675/pexels-photo-1181675.jpeg?auto=compress&cs=tinysrgb&w=200",
            Contact::Friend => "https://images.pexels.com/photos/733872/pexels-photo-733872.jpeg?auto=compress&cs=tinysrgb&w=200",
            Contact::Notes => "https://images.pexels.com/photos/2246476/pexels-photo-2246476.jpeg?auto=compress&cs=tinysrgb&w=200",
        }
    }

    pub fn default_settings(self) -> ContactSettings {
        ContactSettings {
            name: self.default_name().to_string(),
            avatar: self.default_avatar().to_string(),
        }
    }

    pub fn about(self) -> &'static str {
        match self {
            Contact::Alex => "British businessman, travels a lot for work. Met Mona in India on a business trip and has been in a relationship with her for over 2 years. Very in love, a bit possessive and clingy, gets jealous easily but adores her. Calls her “love”, “babe”, and “sweetheart”.",
            Contact::Elly => "American best friend, living in Australia with her boyfriend Leon. She has known Mona for around 10 years, knows all her drama with Alex, and talks in a casual, outspoken, and supportive way.",
            Contact::Office => "A placeholder contact for work or projects. You can rename and customize this contact.",
            Contact::Friend => "A generic friend contact you can rename and use however you like.",
            Contact::Notes => "Use this chat as a space to drop random thoughts, to‑dos, and ideas.",
        }
    }

    /// Text shown in place of an empty transcript.
    pub fn empty_state(self, name: &str) -> String {
        match self {
            Contact::Notes => {
                "This is your space. Drop any thoughts, notes, or to‑dos here.".to_string()
            }
            Contact::Office => "Plan work, track tasks, or jot ideas down here.".to_string(),
            _ => format!("Start a conversation with {name}."),
        }
    }

    pub fn typing_text(self, name: &str) -> String {
        match self {
            Contact::Notes => "Writing this down...".to_string(),
            Contact::Office => "Preparing something for you...".to_string(),
            _ => format!("{name} is typing..."),
        }
    }

    pub fn empty_preview(self) -> &'static str {
        match self {
            Contact::Alex => "Tap to chat with Alex",
            Contact::Elly => "Tap to chat with Elly",
            _ => "Tap to chat",
        }
    }

    pub fn input_placeholder(self, name: &str) -> String {
        match self {
            Contact::Notes => "Write a note...".to_string(),
            _ => format!("Message {name}..."),
        }
    }

    /// Header status line. Persona contacts flip between online and last-seen.
    pub fn presence<R: Rng>(self, rng: &mut R, now: NaiveDateTime) -> String {
        match self {
            Contact::Alex => {
                if rng.gen_bool(0.8) { "Online".to_string() } else { "Last seen just now".to_string() }
            }
            Contact::Elly => {
                if rng.gen_bool(0.5) { "Online".to_string() } else { "Last seen recently".to_string() }
            }
            Contact::Notes => "Notes · private".to_string(),
            Contact::Office => "Work / tasks".to_string(),
            Contact::Friend => format!("Last seen {}", format_time(now)),
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Contact {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Contact::ALL
            .into_iter()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| ChatError::UnknownContact(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSettings {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Call,
}

/// Delivery state of a user message. Ordered so that later states compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Sent,
    Delivered,
    Read,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Sent => "✓ Sent",
            Status::Delivered => "✓✓ Delivered",
            Status::Read => "✓✓ Read",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallOutcome {
    Completed,
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallInitiator {
    You,
    Them,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default)]
    pub time: String,
    pub date_str: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<CallOutcome>,
}

impl Message {
    fn stamped(role: Role, kind: MessageKind, content: String, at: NaiveDateTime) -> Self {
        Self {
            role,
            kind,
            content,
            image_data: None,
            time: format_time(at),
            date_str: date_key(at),
            status: None,
            subtype: None,
        }
    }

    pub fn user_text(text: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            status: Some(Status::Sent),
            ..Self::stamped(Role::User, MessageKind::Text, text.into(), at)
        }
    }

    pub fn user_image(caption: impl Into<String>, image_data: String, at: NaiveDateTime) -> Self {
        Self {
            status: Some(Status::Sent),
            image_data: Some(image_data),
            ..Self::stamped(Role::User, MessageKind::Image, caption.into(), at)
        }
    }

    pub fn assistant_text(text: impl Into<String>, at: NaiveDateTime) -> Self {
        Self::stamped(Role::Assistant, MessageKind::Text, text.into(), at)
    }

    /// Call record for a call with `contact_name` that lasted `elapsed_secs`.
    pub fn call(
        contact_name: &str,
        elapsed_secs: u64,
        initiator: CallInitiator,
        at: NaiveDateTime,
    ) -> Self {
        let duration = format_duration(elapsed_secs);
        let (content, outcome) = match (initiator, elapsed_secs) {
            (CallInitiator::You, 0) => (
                format!("You tried calling {contact_name} – missed call"),
                CallOutcome::Missed,
            ),
            (CallInitiator::Them, 0) => (
                format!("{contact_name} tried calling – missed call"),
                CallOutcome::Missed,
            ),
            (CallInitiator::You, _) => (
                format!("You called {contact_name} – {duration}"),
                CallOutcome::Completed,
            ),
            (CallInitiator::Them, _) => (
                format!("{contact_name} called you – {duration}"),
                CallOutcome::Completed,
            ),
        };
        Self {
            subtype: Some(outcome),
            ..Self::stamped(Role::Assistant, MessageKind::Call, content, at)
        }
    }

    pub fn is_call(&self) -> bool {
        self.kind == MessageKind::Call
    }

    /// Moves the delivery status forward. Returns false when `next` would not advance it.
    pub fn advance_status(&mut self, next: Status) -> bool {
        match self.status {
            Some(current) if current < next => {
                self.status = Some(next);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Cute,
    Light,
    Dark,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Cute => "cute",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cute" => Ok(Theme::Cute),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ChatError::UnknownTheme(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub contact_id: Contact,
    pub user_text: String,
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    #[serde(default)]
    pub reply_text: Option<String>,
}
