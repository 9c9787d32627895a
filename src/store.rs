use crate::api::models::{Contact, ContactSettings, HistoryTurn, Message, MessageKind, Role};
use crate::error::{ChatError, Result};
use std::collections::BTreeMap;

/// Transcripts keyed by contact. Append-only apart from single deletes and clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationStore {
    conversations: BTreeMap<Contact, Vec<Message>>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self {
            conversations: Contact::ALL.into_iter().map(|c| (c, Vec::new())).collect(),
        }
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, contact: Contact) -> &[Message] {
        self.conversations
            .get(&contact)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn append(&mut self, contact: Contact, message: Message) {
        self.conversations.entry(contact).or_default().push(message);
    }

    /// Removes the message at `index`. Out-of-range indices are ignored.
    pub fn delete_at(&mut self, contact: Contact, index: usize) -> Option<Message> {
        let messages = self.conversations.get_mut(&contact)?;
        if index < messages.len() {
            Some(messages.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self, contact: Contact) {
        self.conversations.insert(contact, Vec::new());
    }

    /// Replaces a whole transcript. Used when hydrating from storage.
    pub fn replace(&mut self, contact: Contact, messages: Vec<Message>) {
        self.conversations.insert(contact, messages);
    }

    #[cfg(test)]
    pub fn last_user_message(&self, contact: Contact) -> Option<&Message> {
        self.messages(contact).iter().rev().find(|m| m.role == Role::User)
    }

    pub fn last_user_message_mut(&mut self, contact: Contact) -> Option<&mut Message> {
        self.conversations
            .get_mut(&contact)?
            .iter_mut()
            .rev()
            .find(|m| m.role == Role::User)
    }

    /// The last `limit` user/assistant turns, call records excluded, oldest first.
    pub fn history_tail(&self, contact: Contact, limit: usize) -> Vec<HistoryTurn> {
        let turns: Vec<HistoryTurn> = self
            .messages(contact)
            .iter()
            .filter(|m| !m.is_call())
            .map(|m| HistoryTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();
        let skip = turns.len().saturating_sub(limit);
        turns.into_iter().skip(skip).collect()
    }

    /// Sidebar preview of the most recent message.
    pub fn preview(&self, contact: Contact) -> Option<String> {
        let last = self.messages(contact).last()?;
        let prefix = if last.role == Role::User { "You: " } else { "" };
        let body = match last.kind {
            MessageKind::Image => "[Image]".to_string(),
            MessageKind::Call => last.content.clone(),
            MessageKind::Text => last.content.chars().take(40).collect(),
        };
        Some(format!("{prefix}{body}"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Contact, &[Message])> {
        Contact::ALL.into_iter().map(|c| (c, self.messages(c)))
    }
}

/// Display settings for every contact. Entries are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactBook {
    settings: BTreeMap<Contact, ContactSettings>,
}

impl Default for ContactBook {
    fn default() -> Self {
        Self {
            settings: Contact::ALL
                .into_iter()
                .map(|c| (c, c.default_settings()))
                .collect(),
        }
    }
}

impl ContactBook {
    pub fn settings(&self, contact: Contact) -> ContactSettings {
        self.settings
            .get(&contact)
            .cloned()
            .unwrap_or_else(|| contact.default_settings())
    }

    pub fn name(&self, contact: Contact) -> String {
        let name = self.settings(contact).name;
        if name.is_empty() { contact.default_name().to_string() } else { name }
    }

    pub fn avatar(&self, contact: Contact) -> String {
        let avatar = self.settings(contact).avatar;
        if avatar.is_empty() { contact.default_avatar().to_string() } else { avatar }
    }

    pub fn set(&mut self, contact: Contact, settings: ContactSettings) {
        self.settings.insert(contact, settings);
    }

    pub fn rename(&mut self, contact: Contact, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::InvalidName);
        }
        self.settings
            .entry(contact)
            .or_insert_with(|| contact.default_settings())
            .name = name.to_string();
        Ok(())
    }

    pub fn set_avatar(&mut self, contact: Contact, avatar: String) {
        self.settings
            .entry(contact)
            .or_insert_with(|| contact.default_settings())
            .avatar = avatar;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Contact, ContactSettings)> + '_ {
        Contact::ALL.into_iter().map(|c| (c, self.settings(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::CallInitiator;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    fn store_with(contact: Contact, texts: &[(&str, Role)]) -> ConversationStore {
        let mut store = ConversationStore::new();
        for (i, (text, role)) in texts.iter().enumerate() {
            let msg = match role {
                Role::User => Message::user_text(*text, at(i as u32)),
                Role::Assistant => Message::assistant_text(*text, at(i as u32)),
            };
            store.append(contact, msg);
        }
        store
    }

    #[test]
    fn history_tail_skips_calls_and_keeps_order() {
        let mut store = ConversationStore::new();
        let c = Contact::Alex;
        for i in 0..6 {
            store.append(c, Message::user_text(format!("u{i}"), at(i)));
            if i % 2 == 0 {
                store.append(c, Message::call("Alex", i as u64, CallInitiator::You, at(i)));
            }
            store.append(c, Message::assistant_text(format!("a{i}"), at(i)));
        }
        let tail = store.history_tail(c, 4);
        let contents: Vec<&str> = tail.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["u4", "a4", "u5", "a5"]);
        assert_eq!(tail[0].role, Role::User);

        assert_eq!(store.history_tail(c, 100).len(), 12);
        assert!(store.history_tail(Contact::Elly, 8).is_empty());
    }

    #[test]
    fn delete_out_of_range_is_a_no_op() {
        let mut store = store_with(Contact::Friend, &[("a", Role::User), ("b", Role::Assistant)]);
        let before = store.clone();
        assert!(store.delete_at(Contact::Friend, 2).is_none());
        assert!(store.delete_at(Contact::Notes, 0).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn delete_in_range_preserves_order() {
        let mut store = store_with(
            Contact::Friend,
            &[("a", Role::User), ("b", Role::Assistant), ("c", Role::User)],
        );
        let removed = store.delete_at(Contact::Friend, 1).unwrap();
        assert_eq!(removed.content, "b");
        let left: Vec<&str> = store
            .messages(Contact::Friend)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(left, ["a", "c"]);
    }

    #[test]
    fn last_user_message_and_clear() {
        let mut store = store_with(
            Contact::Elly,
            &[("first", Role::User), ("reply", Role::Assistant), ("second", Role::User), ("x", Role::Assistant)],
        );
        assert_eq!(store.last_user_message(Contact::Elly).unwrap().content, "second");
        store.clear(Contact::Elly);
        assert!(store.messages(Contact::Elly).is_empty());
        assert!(store.last_user_message(Contact::Elly).is_none());
    }

    #[test]
    fn previews_follow_message_kind() {
        let mut store = ConversationStore::new();
        assert_eq!(store.preview(Contact::Alex), None);

        store.append(Contact::Alex, Message::user_text("x".repeat(50), at(0)));
        assert_eq!(store.preview(Contact::Alex).unwrap(), format!("You: {}", "x".repeat(40)));

        store.append(Contact::Alex, Message::user_image("", "data:image/png;base64,AA".into(), at(1)));
        assert_eq!(store.preview(Contact::Alex).unwrap(), "You: [Image]");

        store.append(Contact::Alex, Message::call("Alex", 0, CallInitiator::You, at(2)));
        assert_eq!(
            store.preview(Contact::Alex).unwrap(),
            "You tried calling Alex – missed call"
        );
    }

    #[test]
    fn rename_trims_and_rejects_blank_names() {
        let mut book = ContactBook::default();
        book.rename(Contact::Office, "  Work  ").unwrap();
        assert_eq!(book.name(Contact::Office), "Work");
        assert!(matches!(book.rename(Contact::Office, "   "), Err(ChatError::InvalidName)));
        assert_eq!(book.name(Contact::Office), "Work");
    }

    #[test]
    fn empty_avatar_falls_back_to_default() {
        let mut book = ContactBook::default();
        book.set_avatar(Contact::Notes, String::new());
        assert_eq!(book.avatar(Contact::Notes), Contact::Notes.default_avatar());
        book.set_avatar(Contact::Notes, "file:///tmp/me.png".into());
        assert_eq!(book.avatar(Contact::Notes), "file:///tmp/me.png");
    }
}
