use crate::api::events::ChatEvent;
use crate::api::models::Role;
use crate::render::{BubbleContent, Row};
use crate::ui::View;
use std::io::{self, Write};

const WIDTH: usize = 60;

/// Prints session events as plain lines. Output always ends at the newest row.
pub struct ChatView<W: Write> {
    out: W,
    /// Name of the contact on screen, used for bubble headers.
    name: String,
}

impl ChatView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ChatView<W> {
    pub fn new(out: W) -> Self {
        Self { out, name: String::new() }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn centered(text: &str) -> String {
        let len = text.chars().count();
        let pad = WIDTH.saturating_sub(len) / 2;
        format!("{}{}", " ".repeat(pad), text)
    }

    pub fn format_rows(&self, rows: &[Row]) -> Vec<String> {
        let mut lines = Vec::new();
        for row in rows {
            match row {
                Row::Placeholder(text) => lines.push(Self::centered(text)),
                Row::DateSeparator(label) => lines.push(Self::centered(&format!("── {label} ──"))),
                Row::CallBadge { text, missed } => {
                    let icon = if *missed { "✗" } else { "☎" };
                    lines.push(Self::centered(&format!("{icon} {text}")));
                }
                Row::Bubble { index, role, group_start, group_end, content, time, status } => {
                    if *group_start {
                        lines.push(match role {
                            Role::User => "You".to_string(),
                            Role::Assistant => self.name.clone(),
                        });
                    }
                    let body = match content {
                        BubbleContent::Text(text) => text.clone(),
                        BubbleContent::Image { data, caption } => {
                            let payload = data.split_once(',').map_or(data.as_str(), |(_, b64)| b64);
                            let size = payload.len() * 3 / 4 / 1024;
                            match caption {
                                Some(caption) => format!("[image ~{size} KB] {caption}"),
                                None => format!("[image ~{size} KB]"),
                            }
                        }
                    };
                    let meta = match status {
                        Some(status) => format!("{time}  {status}"),
                        None => time.clone(),
                    };
                    lines.push(format!("  [{index}] {body}    {meta}"));
                    if *group_end {
                        lines.push(String::new());
                    }
                }
            }
        }
        lines
    }

    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    fn render_event(&mut self, event: ChatEvent) -> io::Result<()> {
        let lines = match event {
            ChatEvent::Opened { name, presence, placeholder, .. } => {
                let header = format!("== {name} · {presence} ==");
                self.name = name;
                vec![String::new(), header, format!("({placeholder})")]
            }
            ChatEvent::Transcript { rows, .. } => {
                let mut lines = vec!["-".repeat(WIDTH)];
                lines.extend(self.format_rows(&rows));
                lines
            }
            ChatEvent::Updated { contact } => vec![format!("(new activity in {contact})")],
            ChatEvent::Typing { text, .. } => vec![text],
            ChatEvent::TypingDone { presence, .. } => vec![format!("({presence})")],
            ChatEvent::Notice(text) => vec![format!("* {text}")],
        };
        self.write_lines(&lines)
    }
}

impl<W: Write> View for ChatView<W> {
    fn show(&mut self, event: ChatEvent) {
        if let Err(e) = self.render_event(event) {
            log::error!("failed to write to terminal: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Contact;

    fn printed(events: Vec<ChatEvent>) -> String {
        let mut view = ChatView::new(Vec::new());
        for event in events {
            view.show(event);
        }
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn bubbles_show_sender_on_group_start_only() {
        let bubble = |index, start, end, text: &str, status| Row::Bubble {
            index,
            role: Role::User,
            group_start: start,
            group_end: end,
            content: BubbleContent::Text(text.into()),
            time: "9:05 PM".into(),
            status,
        };
        let out = printed(vec![
            ChatEvent::Opened {
                contact: Contact::Elly,
                name: "Elly".into(),
                presence: "Online".into(),
                placeholder: "Message Elly...".into(),
            },
            ChatEvent::Transcript {
                contact: Contact::Elly,
                rows: vec![
                    Row::DateSeparator("Today".into()),
                    bubble(0, true, false, "hi", Some("✓✓ Read")),
                    bubble(1, false, true, "you there?", Some("✓ Sent")),
                ],
            },
        ]);
        assert!(out.contains("== Elly · Online =="));
        assert!(out.contains("── Today ──"));
        assert_eq!(out.matches("\nYou\n").count(), 1);
        assert!(out.contains("  [0] hi    9:05 PM  ✓✓ Read"));
        assert!(out.contains("  [1] you there?    9:05 PM  ✓ Sent"));
    }

    #[test]
    fn assistant_header_uses_contact_name_and_missed_calls_stand_out() {
        let out = printed(vec![
            ChatEvent::Opened {
                contact: Contact::Alex,
                name: "Alex".into(),
                presence: "Online".into(),
                placeholder: "Message Alex...".into(),
            },
            ChatEvent::Transcript {
                contact: Contact::Alex,
                rows: vec![
                    Row::CallBadge { text: "Alex tried calling – missed call".into(), missed: true },
                    Row::Bubble {
                        index: 1,
                        role: Role::Assistant,
                        group_start: true,
                        group_end: true,
                        content: BubbleContent::Image {
                            data: "data:image/png;base64,AAAA".into(),
                            caption: Some("look".into()),
                        },
                        time: "1:00 AM".into(),
                        status: None,
                    },
                ],
            },
        ]);
        assert!(out.contains("✗ Alex tried calling – missed call"));
        assert!(out.contains("\nAlex\n"));
        assert!(out.contains("[image ~0 KB] look    1:00 AM\n"));
    }

    #[test]
    fn image_size_ignores_data_url_prefix() {
        let view = ChatView::new(Vec::new());
        let image = Row::Bubble {
            index: 0,
            role: Role::User,
            group_start: false,
            group_end: false,
            content: BubbleContent::Image {
                data: format!("data:image/png;base64,{}", "A".repeat(2728)),
                caption: None,
            },
            time: "8:00 AM".into(),
            status: None,
        };
        assert_eq!(view.format_rows(&[image]), ["  [0] [image ~1 KB]    8:00 AM"]);
    }

    #[test]
    fn notices_and_typing_lines() {
        let out = printed(vec![
            ChatEvent::Typing { contact: Contact::Notes, text: "Writing this down...".into() },
            ChatEvent::Notice("Chat deleted".into()),
        ]);
        assert_eq!(out, "Writing this down...\n* Chat deleted\n");
    }
}
