pub mod attachments;

pub const NO_SQL_GENERATED: &str = "No SQL generated.";
pub const FETCH_FAILED: &str = "Failed to fetch SQL query.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub message: String,
}

impl Message {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            message: message.into(),
        }
    }

    pub fn bot(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            message: message.into(),
        }
    }

    pub fn presentation(&self) -> Presentation<'_> {
        match self.sender {
            Sender::Bot => Presentation::Preformatted(&self.message),
            Sender::User => Presentation::Inline {
                sender: self.sender.as_str(),
                text: &self.message,
            },
        }
    }
}

/// How a transcript entry is laid out. Bot replies are SQL and keep their
/// whitespace verbatim; everything else is a `"<sender>: <text>"` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation<'a> {
    Preformatted(&'a str),
    Inline { sender: &'a str, text: &'a str },
}

impl Presentation<'_> {
    #[cfg(test)]
    pub fn to_line(&self) -> String {
        match self {
            Self::Preformatted(text) => (*text).to_string(),
            Self::Inline { sender, text } => format!("{sender}: {text}"),
        }
    }
}

/// Append-only transcript. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_keeps_insertion_order() {
        let mut log = ConversationLog::default();
        log.append(Message::user("first"));
        log.append(Message::bot("SELECT 1;"));
        log.append(Message::user("second"));

        assert_eq!(
            log.messages(),
            &[
                Message::user("first"),
                Message::bot("SELECT 1;"),
                Message::user("second"),
            ]
        );
        assert_eq!(log.messages().last(), Some(&Message::user("second")));
    }

    #[test]
    fn bot_messages_render_preformatted_with_whitespace_intact() {
        let sql = "SELECT id,\n       name\n  FROM users;";
        let message = Message::bot(sql);
        assert_eq!(message.presentation(), Presentation::Preformatted(sql));
        assert_eq!(message.presentation().to_line(), sql);
    }

    #[test]
    fn user_messages_render_inline_with_sender_prefix() {
        let message = Message::user("how many sessions per day?");
        assert_eq!(
            message.presentation().to_line(),
            "User: how many sessions per day?"
        );
    }
}
