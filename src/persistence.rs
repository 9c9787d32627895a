use crate::api::models::{Contact, ContactSettings, Message, Theme};
use crate::error::Result;
use crate::storage::{Storage, KEY_CONTACTS, KEY_CONVERSATIONS, KEY_THEME};
use crate::store::{ContactBook, ConversationStore};
use log::warn;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Everything that is persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub conversations: ConversationStore,
    pub contacts: ContactBook,
}

pub fn save(storage: &Storage, state: &ChatState) -> Result<()> {
    let conversations: BTreeMap<&str, &[Message]> = state
        .conversations
        .iter()
        .map(|(c, msgs)| (c.id(), msgs))
        .collect();
    let contacts: BTreeMap<&str, ContactSettings> =
        state.contacts.iter().map(|(c, s)| (c.id(), s)).collect();

    let conversations = serde_json::to_string(&conversations)?;
    let contacts = serde_json::to_string(&contacts)?;
    storage.set_many(&[
        (KEY_CONVERSATIONS, conversations.as_str()),
        (KEY_CONTACTS, contacts.as_str()),
    ])
}

/// Loads persisted state over the defaults. Entries found in storage replace the
/// default for that contact; anything missing or undecodable keeps the default.
pub fn load(storage: &Storage) -> Result<ChatState> {
    let mut state = ChatState::default();

    if let Some(stored) = read_map::<Vec<Message>>(storage, KEY_CONVERSATIONS)? {
        for (contact, messages) in stored {
            state.conversations.replace(contact, messages);
        }
    }
    if let Some(stored) = read_map::<ContactSettings>(storage, KEY_CONTACTS)? {
        for (contact, settings) in stored {
            state.contacts.set(contact, settings);
        }
    }
    Ok(state)
}

fn read_map<T: DeserializeOwned>(storage: &Storage, key: &str) -> Result<Option<Vec<(Contact, T)>>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    let parsed: BTreeMap<String, T> = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("ignoring unreadable {key}: {e}");
            return Ok(None);
        }
    };
    let entries = parsed
        .into_iter()
        .filter_map(|(id, value)| match id.parse::<Contact>() {
            Ok(contact) => Some((contact, value)),
            Err(_) => {
                warn!("ignoring stored entry for unknown contact {id:?} in {key}");
                None
            }
        })
        .collect();
    Ok(Some(entries))
}

pub fn load_theme(storage: &Storage) -> Result<Theme> {
    let Some(raw) = storage.get(KEY_THEME)? else {
        return Ok(Theme::default());
    };
    Ok(raw.parse().unwrap_or_else(|e| {
        warn!("{e}, using the default theme");
        Theme::default()
    }))
}

pub fn save_theme(storage: &Storage, theme: Theme) -> Result<()> {
    storage.set(KEY_THEME, theme.name())
}
