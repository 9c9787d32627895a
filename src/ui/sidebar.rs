use crate::api::models::Contact;
use crate::persistence::ChatState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub contact: Contact,
    pub name: String,
    pub preview: String,
    pub active: bool,
}

pub fn contact_rows(state: &ChatState, active: Contact) -> Vec<ContactRow> {
    Contact::ALL
        .into_iter()
        .map(|contact| ContactRow {
            contact,
            name: state.contacts.name(contact),
            preview: state
                .conversations
                .preview(contact)
                .unwrap_or_else(|| contact.empty_preview().to_string()),
            active: contact == active,
        })
        .collect()
}

pub fn format_contacts(rows: &[ContactRow]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let marker = if row.active { '>' } else { ' ' };
            format!("{marker} {:<7} {:<12} {}", row.contact.id(), row.name, row.preview)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Message;
    use chrono::NaiveDate;

    #[test]
    fn previews_fall_back_per_contact() {
        let mut state = ChatState::default();
        let at = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap().and_hms_opt(8, 0, 0).unwrap();
        state.conversations.append(Contact::Office, Message::user_text("standup notes", at));
        state.contacts.rename(Contact::Friend, "Sam").unwrap();

        let rows = contact_rows(&state, Contact::Office);
        let previews: Vec<&str> = rows.iter().map(|r| r.preview.as_str()).collect();
        assert_eq!(
            previews,
            ["Tap to chat with Alex", "Tap to chat with Elly", "You: standup notes", "Tap to chat", "Tap to chat"]
        );
        assert!(rows[2].active);
        assert_eq!(rows[3].name, "Sam");

        let lines = format_contacts(&rows);
        assert_eq!(lines[2], "> office  Office       You: standup notes");
        assert!(lines[0].starts_with("  alex "));
    }
}
