use crate::api::models::Contact;
use crate::render::Row;

/// Notifications the session hands to its view after state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Opened {
        contact: Contact,
        name: String,
        presence: String,
        placeholder: String,
    },
    /// Freshly rendered transcript of the contact on screen.
    Transcript { contact: Contact, rows: Vec<Row> },
    /// A contact's transcript changed while another contact is on screen.
    Updated { contact: Contact },
    Typing { contact: Contact, text: String },
    TypingDone { contact: Contact, presence: String },
    Notice(String),
}
