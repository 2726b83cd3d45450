use thiserror::Error;

/// Application-level errors using thiserror for structured error handling.
///
/// One enum per collaborator seam. Every per-cycle failure is recoverable
/// and handled at the monitor loop boundary; startup failures are raised
/// to `main`, which refuses to enter the loop.

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to initialize screen capturer")]
    InitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to capture screen")]
    CaptureFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("No displays found")]
    NoDisplays,

    #[error("Invalid display index: {0}")]
    InvalidDisplayIndex(usize),
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to load image classification model")]
    LoadFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Image classification failed")]
    InferenceFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine")]
    InitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to perform OCR on image")]
    RecognitionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Translation request failed")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Translation service returned an unusable response")]
    MalformedResponse,
}

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Failed to load toxicity model")]
    LoadFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to tokenize text chunk")]
    TokenizeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Toxicity inference failed")]
    InferenceFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Event store URL is not configured")]
    NotConfigured,

    #[error("Failed to connect to event store at {url}")]
    ConnectFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to write detection event")]
    WriteFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
