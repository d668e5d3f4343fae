use crate::dto::view_dto::ErrorPanel;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{what} not found")]
    NotFound { what: &'static str },

    #[error("Server responded {status}: {body}")]
    Server { status: u16, body: String },

    #[error("PDF export is not available for test type {0:?}")]
    UnsupportedTestType(Option<String>),

    #[error("Could not write download: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text shown to the person using the app.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NotFound { what } => format!("{} non trovato", what),
            ClientError::Server { body, .. } if !body.trim().is_empty() => {
                server_message(body)
            }
            ClientError::Server { status, .. } => {
                format!("Il server ha risposto con errore {}", status)
            }
            ClientError::UnsupportedTestType(_) => {
                "Esportazione PDF non disponibile per questo tipo di test".to_string()
            }
            ClientError::Io(_) => "Impossibile salvare il file scaricato".to_string(),
            ClientError::Url(_) | ClientError::Http(_) => {
                "Si è verificato un errore durante il caricamento dei dati".to_string()
            }
        }
    }

    pub fn error_panel(&self) -> ErrorPanel {
        ErrorPanel::back_to_tests(self.user_message())
    }
}

/// The `error` field of a JSON error body, or the body text itself.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_body_becomes_the_message() {
        let err = ClientError::Server {
            status: 400,
            body: "Il report non è di tipo PID-5".into(),
        };
        assert_eq!(err.user_message(), "Il report non è di tipo PID-5");

        let empty = ClientError::Server {
            status: 502,
            body: "  ".into(),
        };
        assert_eq!(empty.user_message(), "Il server ha risposto con errore 502");
    }

    #[test]
    fn json_error_bodies_are_unwrapped() {
        let err = ClientError::Server {
            status: 403,
            body: r#"{"error":"Accesso negato"}"#.into(),
        };
        assert_eq!(err.user_message(), "Accesso negato");

        let no_field = ClientError::Server {
            status: 500,
            body: r#"{"detail":"boom"}"#.into(),
        };
        assert_eq!(no_field.user_message(), r#"{"detail":"boom"}"#);
    }

    #[test]
    fn not_found_panel_points_back_to_tests() {
        let panel = ClientError::NotFound { what: "Report" }.error_panel();
        assert_eq!(panel.message, "Report non trovato");
        assert_eq!(panel.action_url, "/tests");
    }
}
