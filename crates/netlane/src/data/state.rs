use std::fmt;

/// How a request finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Success,
    Error,
    Cancelled,
}

/// Lifecycle of a single in-flight request.
///
/// Requests move through these states in order and never go back:
/// Pending → Sending → (Buffering | Streaming) → Terminal
///
/// A request may jump to `Terminal` from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Accepted, body and headers not yet built.
    #[default]
    Pending,

    /// Waiting on the transport for response headers.
    Sending,

    /// Reading the whole body into memory.
    Buffering,

    /// Reading the body chunk by chunk.
    Streaming,

    Terminal(Terminal),
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Terminal(_))
    }

    /// Returns `true` if `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: RequestState) -> bool {
        use RequestState::*;
        match (self, next) {
            (Terminal(_), _) => false,
            (_, Terminal(_)) => true,
            (Pending, Sending) => true,
            (Sending, Buffering | Streaming) => true,
            _ => false,
        }
    }

    /// Move to `next`, logging the transition.
    ///
    /// Illegal transitions are a bug in the executor and trip a debug assertion.
    pub(crate) fn advance(self, next: RequestState) -> RequestState {
        debug_assert!(
            self.can_advance_to(next),
            "illegal request transition {self} -> {next}"
        );
        tracing::trace!(from = %self, to = %next, "request state");
        next
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::Pending => write!(f, "Pending"),
            RequestState::Sending => write!(f, "Sending"),
            RequestState::Buffering => write!(f, "Buffering"),
            RequestState::Streaming => write!(f, "Streaming"),
            RequestState::Terminal(Terminal::Success) => write!(f, "Terminal(Success)"),
            RequestState::Terminal(Terminal::Error) => write!(f, "Terminal(Error)"),
            RequestState::Terminal(Terminal::Cancelled) => write!(f, "Terminal(Cancelled)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(RequestState::Pending.can_advance_to(RequestState::Sending));
        assert!(RequestState::Sending.can_advance_to(RequestState::Buffering));
        assert!(RequestState::Sending.can_advance_to(RequestState::Streaming));
        assert!(RequestState::Streaming.can_advance_to(RequestState::Terminal(Terminal::Success)));
        assert!(RequestState::Pending.can_advance_to(RequestState::Terminal(Terminal::Error)));
    }

    #[test]
    fn no_state_is_reentered() {
        assert!(!RequestState::Sending.can_advance_to(RequestState::Pending));
        assert!(!RequestState::Streaming.can_advance_to(RequestState::Buffering));
        assert!(!RequestState::Buffering.can_advance_to(RequestState::Sending));
        assert!(!RequestState::Pending.can_advance_to(RequestState::Streaming));
    }

    #[test]
    fn terminal_is_final() {
        let done = RequestState::Terminal(Terminal::Success);
        assert!(done.is_terminal());
        assert!(!done.can_advance_to(RequestState::Terminal(Terminal::Error)));
        assert!(!done.can_advance_to(RequestState::Sending));
    }
}
