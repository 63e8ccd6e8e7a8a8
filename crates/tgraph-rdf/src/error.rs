/// Errors from triple sources and sinks.
#[derive(Debug, thiserror::Error)]
pub enum RdfError {
    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed statement.
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A prefix was declared after the first triple had been written.
    #[error("prefix {prefix:?} declared after the first triple")]
    LatePrefix { prefix: String },
}

impl RdfError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Result alias for triple-stream operations.
pub type RdfResult<T> = Result<T, RdfError>;
