use std::fmt::Display;

/// The exchange a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    ReceiveJob,
    ControlCommand,
    ControlFile,
    DataCommand,
    DataFile,
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Step::Connect => "connect",
            Step::ReceiveJob => "receive job",
            Step::ControlCommand => "control file command",
            Step::ControlFile => "control file",
            Step::DataCommand => "data file command",
            Step::DataFile => "data file",
        };
        write!(f, "{}", str)
    }
}

/// Everything that can end a job. None of these are recoverable within a session.
#[derive(Debug, thiserror::Error)]
pub enum LpdError {
    /// Connect, bind, read or write failed, or timed out.
    #[error("{step}: transport error: {source}")]
    Transport {
        step: Step,
        #[source]
        source: std::io::Error,
    },

    /// The daemon answered with a non-zero acknowledgement.
    #[error("{step}: rejected by server (code {code})")]
    ProtocolRejected { step: Step, code: u8 },

    /// The connection closed before the acknowledgement byte arrived.
    #[error("{step}: connection closed before acknowledgement")]
    ShortRead { step: Step },

    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("session already finished")]
    SessionFinished,
}

impl LpdError {
    pub fn transport(step: Step, source: std::io::Error) -> Self {
        LpdError::Transport { step, source }
    }

    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        LpdError::InvalidPayload {
            reason: reason.into(),
        }
    }

    /// The step that failed, when the failure happened on the wire.
    pub fn step(&self) -> Option<Step> {
        match self {
            LpdError::Transport { step, .. }
            | LpdError::ProtocolRejected { step, .. }
            | LpdError::ShortRead { step } => Some(*step),
            LpdError::InvalidPayload { .. } | LpdError::SessionFinished => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LpdError>;
