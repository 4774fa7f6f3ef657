// Chat view state
// Holds the conversation, the message draft and the auxiliary identifier

use crate::socket::OutboundMessage;

/// One rendered line of conversation
/// Immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    text: String,
    is_from_service: bool,
}

impl ChatEntry {
    /// Entry typed by the user
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_from_service: false,
        }
    }

    /// Entry received from the service
    pub fn from_service(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_from_service: true,
        }
    }

    /// Entry text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True for service replies
    pub fn is_from_service(&self) -> bool {
        self.is_from_service
    }

    /// Role label shown next to the entry
    pub fn role_label(&self) -> &'static str {
        if self.is_from_service {
            "AI"
        } else {
            "User"
        }
    }
}

/// Chat view state
/// The entry sequence only grows; there is no removal or editing
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// Conversation in display order
    entries: Vec<ChatEntry>,
    /// Message field contents
    pub draft: String,
    /// Auxiliary identifier field contents, forwarded with every message
    pub auxiliary_id: String,
}

impl ChatState {
    /// Create an empty chat
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the auxiliary identifier
    pub fn set_auxiliary_id(&mut self, value: impl Into<String>) {
        self.auxiliary_id = value.into();
    }

    /// Replace the message draft
    pub fn set_draft(&mut self, value: impl Into<String>) {
        self.draft = value.into();
    }

    /// Submit the draft
    /// Blank drafts are ignored. Otherwise the draft is appended as a local
    /// entry, cleared, and returned with the current auxiliary identifier for
    /// sending. The text is sent as typed, not trimmed.
    pub fn submit(&mut self) -> Option<OutboundMessage> {
        if self.draft.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.draft);
        self.entries.push(ChatEntry::local(text.clone()));
        Some(OutboundMessage::new(self.auxiliary_id.clone(), text))
    }

    /// Append a reply from the service
    pub fn push_reply(&mut self, text: impl Into<String>) {
        self.entries.push(ChatEntry::from_service(text));
    }

    /// Entries in display order
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_state_creation() {
        let state = ChatState::new();
        assert_eq!(state.entry_count(), 0);
        assert!(state.draft.is_empty());
        assert!(state.auxiliary_id.is_empty());
    }

    #[test]
    fn test_submit_appends_and_sends() {
        let mut state = ChatState::new();
        state.set_auxiliary_id("hello");
        state.set_draft("hi there");

        let outbound = state.submit().unwrap();
        assert_eq!(outbound, OutboundMessage::new("hello", "hi there"));
        assert_eq!(state.entries(), &[ChatEntry::local("hi there")]);
        assert!(!state.entries()[0].is_from_service());
        assert!(state.draft.is_empty()); // Draft cleared after submit
    }

    #[test]
    fn test_submit_blank_is_noop() {
        let mut state = ChatState::new();
        assert!(state.submit().is_none());

        state.set_draft("   \t\n ");
        assert!(state.submit().is_none());
        assert_eq!(state.entry_count(), 0);
        assert_eq!(state.draft, "   \t\n "); // Blank draft left untouched
    }

    #[test]
    fn test_submit_keeps_surrounding_whitespace() {
        let mut state = ChatState::new();
        state.set_draft("  padded ");

        let outbound = state.submit().unwrap();
        assert_eq!(outbound.text, "  padded ");
        assert_eq!(state.entries()[0].text(), "  padded ");
    }

    #[test]
    fn test_submissions_keep_order() {
        let mut state = ChatState::new();
        for text in ["one", "two", "three"] {
            state.set_draft(text);
            assert!(state.submit().is_some());
        }

        let texts: Vec<_> = state.entries().iter().map(ChatEntry::text).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_auxiliary_id_is_latest_value() {
        let mut state = ChatState::new();
        state.set_auxiliary_id("first");
        state.set_draft("a");
        assert_eq!(state.submit().unwrap().auxiliary_id, "first");

        state.set_auxiliary_id("second");
        state.set_draft("b");
        assert_eq!(state.submit().unwrap().auxiliary_id, "second");
    }

    #[test]
    fn test_reply_appends_after_existing_entries() {
        let mut state = ChatState::new();
        state.set_draft("question");
        state.submit();
        state.push_reply("42");

        let last = state.entries().last().unwrap();
        assert_eq!(last, &ChatEntry::from_service("42"));
        assert_eq!(last.role_label(), "AI");
        assert_eq!(state.entry_count(), 2);
    }

    #[test]
    fn test_repeated_replies_are_not_deduplicated() {
        let mut state = ChatState::new();
        state.push_reply("same");
        state.push_reply("same");
        state.push_reply("");

        assert_eq!(state.entry_count(), 3);
        assert!(state.entries().iter().all(ChatEntry::is_from_service));
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(ChatEntry::local("x").role_label(), "User");
        assert_eq!(ChatEntry::from_service("x").role_label(), "AI");
    }
}
