use thiserror::Error;

/// Errors from the authenticated archive.
///
/// Authentication failures end the whole archive source; the other variants
/// only fail the query that raised them.
#[derive(Debug, Error)]
pub enum SpaceTrackError {
    #[error("missing Space-Track credentials: set {0}")]
    MissingCredentials(&'static str),

    #[error("Space-Track login rejected: {0}")]
    LoginRejected(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {path}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
    },

    #[error("unexpected response for {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl SpaceTrackError {
    /// True for errors that make every further request pointless
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SpaceTrackError::MissingCredentials(_) | SpaceTrackError::LoginRejected(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        assert!(SpaceTrackError::MissingCredentials("SPACE_TRACK_USER").is_auth());
        assert!(SpaceTrackError::LoginRejected("HTTP 401".to_string()).is_auth());

        let decode = SpaceTrackError::Decode {
            path: "/x".to_string(),
            reason: "not an array".to_string(),
        };
        assert!(!decode.is_auth());
        assert_eq!(decode.to_string(), "unexpected response for /x: not an array");
    }
}
