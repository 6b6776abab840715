/// Core error type for the homework bot.
///
/// Adapter crates map their specific errors into this type so the poll loop
/// can handle failures consistently (fatal at startup vs logged-and-retried).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    #[error("incomplete API response: missing key '{0}'")]
    IncompleteResponse(&'static str),

    #[error("undocumented homework status in API response: {0:?}")]
    UnknownStatus(String),

    #[error("incorrect answer from API: {status}: {body}")]
    IncorrectAnswer { status: u16, body: String },

    #[error("API connection error: url={url} from_date={from_date}: {reason}")]
    ApiConnection {
        url: String,
        from_date: i64,
        reason: String,
    },

    #[error("failed to send message to Telegram: {0}")]
    Notification(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Closed classification of everything that can go wrong in one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigMissing,
    MalformedResponse,
    IncompleteResponse,
    UnknownStatus,
    Transport,
    Notification,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::Io(_) => ErrorKind::ConfigMissing,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Error::IncompleteResponse(_) => ErrorKind::IncompleteResponse,
            Error::UnknownStatus(_) => ErrorKind::UnknownStatus,
            Error::IncorrectAnswer { .. } | Error::ApiConnection { .. } => ErrorKind::Transport,
            Error::Notification(_) => ErrorKind::Notification,
        }
    }

    /// Whether the error is worth duplicating into the chat as an alert.
    ///
    /// A failed send means the chat is unreachable, and config errors happen
    /// before there is a chat to talk to.
    pub fn forward_to_chat(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Notification | ErrorKind::ConfigMissing
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
