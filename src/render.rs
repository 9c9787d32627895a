//! Turns a transcript into display rows.
//!
//! Rendering is pure: the caller supplies `today` so that date separators
//! are reproducible.

use crate::api::models::{CallOutcome, Contact, Message, MessageKind, Role, Status};
use crate::utils::{date_label, parse_date_key};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleContent {
    Text(String),
    Image { data: String, caption: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Placeholder(String),
    DateSeparator(String),
    CallBadge { text: String, missed: bool },
    Bubble {
        /// Position in the transcript, used to address the message for deletion.
        index: usize,
        role: Role,
        group_start: bool,
        group_end: bool,
        content: BubbleContent,
        time: String,
        status: Option<&'static str>,
    },
}

pub fn render(contact: Contact, name: &str, messages: &[Message], today: NaiveDate) -> Vec<Row> {
    if messages.is_empty() {
        return vec![Row::Placeholder(contact.empty_state(name))];
    }

    // Bubbles group only with other bubbles; call rows are transparent here.
    let bubble_indices: Vec<usize> = messages
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.is_call())
        .map(|(i, _)| i)
        .collect();

    let mut rows = Vec::with_capacity(messages.len() + 1);
    let mut last_date_key: Option<&str> = None;
    let mut bubble_pos: usize = 0;

    for (idx, msg) in messages.iter().enumerate() {
        if last_date_key != Some(msg.date_str.as_str()) {
            let label = match parse_date_key(&msg.date_str) {
                Some(date) => date_label(date, today),
                None => msg.date_str.clone(),
            };
            rows.push(Row::DateSeparator(label));
            last_date_key = Some(msg.date_str.as_str());
        }

        if msg.is_call() {
            rows.push(Row::CallBadge {
                text: msg.content.clone(),
                missed: msg.subtype == Some(CallOutcome::Missed),
            });
            continue;
        }

        let prev = bubble_pos
            .checked_sub(1)
            .map(|p| &messages[bubble_indices[p]]);
        let next = bubble_indices.get(bubble_pos + 1).map(|&n| &messages[n]);
        bubble_pos += 1;

        let breaks = |other: Option<&Message>| {
            other.is_none_or(|o| o.role != msg.role || o.date_str != msg.date_str)
        };

        let content = match msg.kind {
            MessageKind::Image => BubbleContent::Image {
                data: msg.image_data.clone().unwrap_or_default(),
                caption: (!msg.content.is_empty()).then(|| msg.content.clone()),
            },
            _ => BubbleContent::Text(msg.content.clone()),
        };

        rows.push(Row::Bubble {
            index: idx,
            role: msg.role,
            group_start: breaks(prev),
            group_end: breaks(next),
            content,
            time: msg.time.clone(),
            status: match msg.role {
                Role::User => Some(msg.status.unwrap_or(Status::Sent).label()),
                Role::Assistant => None,
            },
        });
    }

    rows
}
