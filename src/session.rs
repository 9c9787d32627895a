use crate::api::client::ReplyService;
use crate::api::events::ChatEvent;
use crate::api::models::{CallInitiator, Contact, Message, ReplyRequest, Status, Theme};
use crate::app::AppConfig;
use crate::error::Result;
use crate::persistence::{self, ChatState};
use crate::render::render;
use crate::storage::Storage;
use crate::ui::View;
use crate::utils;
use chrono::NaiveDateTime;
use log::{debug, info};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

pub const ALEX_GREETING: &str =
    "Hey love, it’s Alex. I’ve been thinking about you all day and just wanted to check in on you.";
pub const IMAGE_ONLY_PROMPT: &str =
    "I just sent you a picture. It's something I wanted to show you.";
/// Most user/assistant turns ever sent along with a reply request.
pub const MAX_HISTORY: usize = 8;

const READ_RECEIPT_DELAY: Duration = Duration::from_millis(400);
const CALL_CONNECT_DELAY: Duration = Duration::from_millis(1500);

/// Artificial "thinking" time before a reply: grows with the message, capped, plus jitter.
pub fn reply_delay<R: Rng>(text: &str, rng: &mut R) -> Duration {
    let len = text.chars().count().min(120) as u64;
    Duration::from_millis(700 + len * 8 + rng.gen_range(0..600))
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub simulate_latency: bool,
    pub history_limit: usize,
}

impl From<&AppConfig> for SessionOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            simulate_latency: config.simulate_latency,
            history_limit: config.history_limit.min(MAX_HISTORY),
        }
    }
}

/// Progress of a reply running in the background, tagged with the contact it
/// was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyUpdate {
    /// The service answered; the read receipt follows after a short pause.
    Answered { contact: Contact },
    Ready { contact: Contact, text: String },
}

struct ActiveCall {
    contact: Contact,
    initiator: CallInitiator,
    started: Instant,
}

/// Owns the chat state and drives every mutation: change, persist, re-render.
pub struct ChatSession<S, V> {
    state: ChatState,
    theme: Theme,
    storage: Storage,
    replies: Arc<S>,
    view: V,
    current: Contact,
    options: SessionOptions,
    clock: fn() -> NaiveDateTime,
    call: Option<ActiveCall>,
    updates_tx: mpsc::UnboundedSender<ReplyUpdate>,
    updates_rx: mpsc::UnboundedReceiver<ReplyUpdate>,
    pending: usize,
}

impl<S: ReplyService, V: View> ChatSession<S, V> {
    /// Hydrates state from `storage` and seeds Alex's greeting into an empty chat.
    pub fn open(storage: Storage, replies: S, view: V, options: SessionOptions) -> Result<Self> {
        Self::open_with_clock(storage, replies, view, options, utils::now)
    }

    pub fn open_with_clock(
        storage: Storage,
        replies: S,
        view: V,
        options: SessionOptions,
        clock: fn() -> NaiveDateTime,
    ) -> Result<Self> {
        let state = persistence::load(&storage)?;
        let theme = persistence::load_theme(&storage)?;
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            state,
            theme,
            storage,
            replies: Arc::new(replies),
            view,
            current: Contact::Alex,
            options,
            clock,
            call: None,
            updates_tx,
            updates_rx,
            pending: 0,
        };
        if session.state.conversations.messages(Contact::Alex).is_empty() {
            let greeting = Message::assistant_text(ALEX_GREETING, (session.clock)());
            session.state.conversations.append(Contact::Alex, greeting);
            session.persist()?;
        }
        Ok(session)
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn current(&self) -> Contact {
        self.current
    }

    #[cfg(test)]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Number of replies still in flight.
    pub fn pending_replies(&self) -> usize {
        self.pending
    }

    pub fn presence(&self, contact: Contact) -> String {
        contact.presence(&mut rand::thread_rng(), (self.clock)())
    }

    pub fn switch_to(&mut self, contact: Contact) {
        self.current = contact;
        let name = self.state.contacts.name(contact);
        let presence = self.presence(contact);
        self.view.show(ChatEvent::Opened {
            contact,
            presence,
            placeholder: contact.input_placeholder(&name),
            name,
        });
        self.refresh(contact);
    }

    fn refresh(&mut self, contact: Contact) {
        if contact != self.current {
            self.view.show(ChatEvent::Updated { contact });
            return;
        }
        let name = self.state.contacts.name(contact);
        let today = (self.clock)().date();
        let rows = render(contact, &name, self.state.conversations.messages(contact), today);
        self.view.show(ChatEvent::Transcript { contact, rows });
    }

    fn persist(&self) -> Result<()> {
        persistence::save(&self.storage, &self.state)
    }

    fn commit(&mut self, contact: Contact) -> Result<()> {
        self.persist()?;
        self.refresh(contact);
        Ok(())
    }

    fn advance_last_user(&mut self, contact: Contact, status: Status) -> Result<()> {
        let advanced = self
            .state
            .conversations
            .last_user_message_mut(contact)
            .is_some_and(|m| m.advance_status(status));
        if advanced {
            self.commit(contact)?;
        }
        Ok(())
    }

    /// Sends text and/or an image to `contact` and starts fetching the reply in
    /// the background. Returns false when there was nothing to send.
    ///
    /// The reply comes back through [`next_reply`](Self::next_reply) and is
    /// always applied to `contact`, whichever chat is open by then.
    pub fn send(&mut self, contact: Contact, text: &str, image: Option<String>) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Ok(false);
        }

        let at = (self.clock)();
        let message = match image {
            Some(data) => Message::user_image(text, data, at),
            None => Message::user_text(text, at),
        };
        self.state.conversations.append(contact, message);
        self.commit(contact)?;
        self.advance_last_user(contact, Status::Delivered)?;

        let name = self.state.contacts.name(contact);
        self.view.show(ChatEvent::Typing {
            contact,
            text: contact.typing_text(&name),
        });

        let user_text = if text.is_empty() { IMAGE_ONLY_PROMPT } else { text };
        let request = ReplyRequest {
            contact_id: contact,
            user_text: user_text.to_string(),
            history: self
                .state
                .conversations
                .history_tail(contact, self.options.history_limit.min(MAX_HISTORY)),
        };
        self.spawn_reply(request);
        Ok(true)
    }

    fn spawn_reply(&mut self, request: ReplyRequest) {
        let replies = Arc::clone(&self.replies);
        let tx = self.updates_tx.clone();
        let simulate_latency = self.options.simulate_latency;
        let delay = reply_delay(&request.user_text, &mut rand::thread_rng());
        self.pending += 1;

        tokio::spawn(async move {
            let contact = request.contact_id;
            if simulate_latency {
                debug!("waiting {delay:?} before asking for a reply");
                sleep(delay).await;
            }
            let text = replies.reply(&request).await;
            let _ = tx.send(ReplyUpdate::Answered { contact });
            if simulate_latency {
                sleep(READ_RECEIPT_DELAY).await;
            }
            let _ = tx.send(ReplyUpdate::Ready { contact, text });
        });
    }

    /// Waits for the next update from a reply in flight. Never resolves while
    /// nothing is pending.
    pub async fn next_reply(&mut self) -> Option<ReplyUpdate> {
        self.updates_rx.recv().await
    }

    pub fn apply_reply(&mut self, update: ReplyUpdate) -> Result<()> {
        match update {
            ReplyUpdate::Answered { contact } => {
                let presence = self.presence(contact);
                self.view.show(ChatEvent::TypingDone { contact, presence });
                Ok(())
            }
            ReplyUpdate::Ready { contact, text } => {
                self.pending = self.pending.saturating_sub(1);
                self.advance_last_user(contact, Status::Read)?;
                self.state
                    .conversations
                    .append(contact, Message::assistant_text(text, (self.clock)()));
                self.commit(contact)
            }
        }
    }

    /// Applies updates until every reply in flight has landed.
    pub async fn settle(&mut self) -> Result<()> {
        while self.pending > 0 {
            let Some(update) = self.updates_rx.recv().await else {
                break;
            };
            self.apply_reply(update)?;
        }
        Ok(())
    }

    /// Deletes one message from the open chat. Returns false for an unknown index.
    pub fn delete_message(&mut self, index: usize) -> Result<bool> {
        let contact = self.current;
        if self.state.conversations.delete_at(contact, index).is_none() {
            return Ok(false);
        }
        self.commit(contact)?;
        self.view.show(ChatEvent::Notice("Message deleted".into()));
        Ok(true)
    }

    pub fn clear_chat(&mut self, contact: Contact) -> Result<()> {
        self.state.conversations.clear(contact);
        self.commit(contact)?;
        info!("cleared chat with {contact}");
        self.view.show(ChatEvent::Notice("Chat deleted".into()));
        Ok(())
    }

    pub fn start_call(&mut self, initiator: CallInitiator) {
        let contact = self.current;
        let name = self.state.contacts.name(contact);
        if let Some(call) = &self.call {
            let busy = format!("Already on a call with {}", self.state.contacts.name(call.contact));
            self.view.show(ChatEvent::Notice(busy));
            return;
        }
        self.call = Some(ActiveCall {
            contact,
            initiator,
            started: Instant::now(),
        });
        let notice = match initiator {
            CallInitiator::You => format!("Calling {name}…"),
            CallInitiator::Them => format!("{name} is calling…"),
        };
        self.view.show(ChatEvent::Notice(notice));
    }

    /// Hangs up and records the call. Time spent connecting does not count.
    pub fn end_call(&mut self) -> Result<Option<u64>> {
        let Some(call) = self.call.take() else {
            self.view.show(ChatEvent::Notice("No call in progress".into()));
            return Ok(None);
        };
        let elapsed = call
            .started
            .elapsed()
            .saturating_sub(CALL_CONNECT_DELAY)
            .as_secs();
        self.record_call(call.contact, elapsed, call.initiator)?;
        Ok(Some(elapsed))
    }

    pub fn record_call(&mut self, contact: Contact, elapsed_secs: u64, initiator: CallInitiator) -> Result<()> {
        let name = self.state.contacts.name(contact);
        let message = Message::call(&name, elapsed_secs, initiator, (self.clock)());
        self.state.conversations.append(contact, message);
        self.commit(contact)
    }

    pub fn rename(&mut self, contact: Contact, name: &str) -> Result<()> {
        self.state.contacts.rename(contact, name)?;
        self.persist()?;
        self.view.show(ChatEvent::Notice("Name saved".into()));
        if contact == self.current {
            self.switch_to(contact);
        }
        Ok(())
    }

    pub fn set_avatar(&mut self, contact: Contact, avatar: String) -> Result<()> {
        self.state.contacts.set_avatar(contact, avatar);
        self.persist()?;
        self.view.show(ChatEvent::Notice("Profile photo saved".into()));
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        persistence::save_theme(&self.storage, theme)?;
        self.theme = theme;
        self.view.show(ChatEvent::Notice(format!("Theme: {}", theme.name())));
        Ok(())
    }
}
