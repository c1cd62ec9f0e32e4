use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized ({0}); set WORKTIME_TOKEN or save a token in the configuration")]
    Unauthorized(u16),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API client unavailable: {0}")]
    Unavailable(String),

    #[error("could not decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
