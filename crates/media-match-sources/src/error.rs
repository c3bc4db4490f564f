/// Failures raised by the catalog store and the HTTP backends
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure reaching a dependency
    #[error("{context}: unavailable: {reason}")]
    Unavailable { context: String, reason: String },

    /// Non-success response from an application endpoint
    #[error("{context}: unexpected status {status}")]
    Fatal { context: String, status: u16 },

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A catalog row that cannot be interpreted
    #[error("invalid media item row: {0}")]
    Data(String),

    #[error("{context}: failed decoding response: {source}")]
    Decode {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Config(String),
}

impl SourceError {
    pub fn unavailable(context: impl Into<String>, reason: impl ToString) -> Self {
        SourceError::Unavailable {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn store(context: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Self {
        let context = context.into();
        move |source| SourceError::Store { context, source }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SourceError::Unavailable { .. })
    }
}
