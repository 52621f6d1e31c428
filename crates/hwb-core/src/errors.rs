use std::fmt;

/// Classification of a failure, independent of its message.
///
/// The poll loop decides how to react (fatal, relay, log only) from the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EnvMisconfigured,
    BadApiAnswer,
    BadResponse,
    BadStatus,
    SendFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::EnvMisconfigured => "environment misconfigured",
            ErrorKind::BadApiAnswer => "bad api answer",
            ErrorKind::BadResponse => "bad response",
            ErrorKind::BadStatus => "bad status",
            ErrorKind::SendFailed => "send failed",
        };
        f.write_str(s)
    }
}

/// Core error type.
///
/// Adapter crates map their specific errors (reqwest, teloxide) into one of
/// these variants so the poller can classify failures uniformly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("bad api answer: {0}")]
    ApiAnswer(String),

    #[error("bad response: {0}")]
    Response(String),

    #[error("bad status: {0}")]
    Status(String),

    #[error("send failed: {0}")]
    Send(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::EnvMisconfigured,
            Error::ApiAnswer(_) => ErrorKind::BadApiAnswer,
            Error::Response(_) => ErrorKind::BadResponse,
            Error::Status(_) => ErrorKind::BadStatus,
            Error::Send(_) => ErrorKind::SendFailed,
        }
    }

    /// Message payload without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Config(m)
            | Error::ApiAnswer(m)
            | Error::Response(m)
            | Error::Status(m)
            | Error::Send(m) => m,
        }
    }

    /// Whether the poll loop should forward this error to the chat.
    ///
    /// A send failure is never relayed: the relay would go through the same
    /// channel that just failed.
    pub fn is_relayable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::SendFailed | ErrorKind::EnvMisconfigured)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        assert_eq!(
            Error::ApiAnswer("x".into()).kind(),
            ErrorKind::BadApiAnswer
        );
        assert_eq!(Error::Status("x".into()).kind(), ErrorKind::BadStatus);
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::EnvMisconfigured);
    }

    #[test]
    fn display_carries_kind_and_message() {
        let e = Error::Response("homeworks is not a list".into());
        assert_eq!(e.to_string(), "bad response: homeworks is not a list");
        assert_eq!(e.message(), "homeworks is not a list");
    }

    #[test]
    fn send_failures_are_not_relayed() {
        assert!(!Error::Send("boom".into()).is_relayable());
        assert!(Error::ApiAnswer("boom".into()).is_relayable());
        assert!(Error::Status("boom".into()).is_relayable());
    }
}
