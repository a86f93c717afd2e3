pub type CardResult<T> = Result<T, CardError>;

#[derive(thiserror::Error, Debug)]
pub enum CardError {
    #[error("invalid color format: {0:?}")]
    InvalidColorFormat(String),

    #[error("gradient needs at least 2 colors, got {0}")]
    InsufficientColors(usize),

    #[error("unsupported gradient direction: {0:?}")]
    UnsupportedDirection(String),

    #[error("markdown input too large: {size} bytes (limit {limit})")]
    MarkdownInputTooLarge { size: usize, limit: usize },

    #[error("no color combination with id {0}")]
    CombinationNotFound(u32),

    #[error("font error: {0}")]
    Font(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
