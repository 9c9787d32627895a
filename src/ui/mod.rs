pub mod chat_view;
pub mod profile;
pub mod shell;
pub mod sidebar;

use crate::api::events::ChatEvent;

/// Receives session events. The terminal view prints them; tests record them.
pub trait View {
    fn show(&mut self, event: ChatEvent);
}

#[cfg(test)]
impl View for Vec<ChatEvent> {
    fn show(&mut self, event: ChatEvent) {
        self.push(event);
    }
}
