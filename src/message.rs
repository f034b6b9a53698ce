//! Inbound command messages.

/// A chat message already classified as a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Chat the command came from
    pub chat_id: i64,
    /// Command name without the leading `/`
    pub command: String,
    /// Raw text following the command name
    pub command_args: Option<String>,
}

impl Message {
    pub fn new(chat_id: i64, command: impl Into<String>, command_args: Option<String>) -> Self {
        Self {
            chat_id,
            command: command.into(),
            command_args,
        }
    }

    /// Parses chat text such as `/pay@RandTalkBot 31416 10 Thanks!`.
    ///
    /// Returns `None` for text that is not a command.
    pub fn parse(chat_id: i64, text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;

        let (head, args) = match rest.find(char::is_whitespace) {
            Some(pos) => (&rest[..pos], Some(rest[pos..].trim())),
            None => (rest, None),
        };

        // Drop the `@botname` suffix used in group chats
        let command = head.split('@').next().unwrap_or_default();
        if command.is_empty() {
            return None;
        }

        let command_args = args.filter(|a| !a.is_empty()).map(str::to_string);

        Some(Self::new(chat_id, command, command_args))
    }
}
