/// Errors surfaced by weather lookups and the API key source.
///
/// City catalog refreshes never return these; they log and fall back instead.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// A required setting (e.g. the OpenWeatherMap API key) is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The server answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// HTTP status carried by [`WeatherError::Http`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn http(status: reqwest::StatusCode, body: &str) -> Self {
        WeatherError::Http {
            status: status.as_u16(),
            body: truncate_body(body),
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}

/// Cut an error body down to something that fits on a terminal line.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
