use super::error::SpaceTrackError;

pub const USER_ENV: &str = "SPACE_TRACK_USER";
pub const PASS_ENV: &str = "SPACE_TRACK_PASS";

/// Space-Track account credentials
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `SPACE_TRACK_USER` / `SPACE_TRACK_PASS` from the environment
    pub fn from_env() -> Result<Self, SpaceTrackError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve both variables through `lookup`; empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SpaceTrackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(SpaceTrackError::MissingCredentials(key))
        };

        Ok(Self {
            username: read(USER_ENV)?,
            password: read(PASS_ENV)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_ok() {
        let creds =
            Credentials::from_lookup(lookup_from(&[(USER_ENV, "alice"), (PASS_ENV, "s3cret")]))
                .unwrap();
        assert_eq!(creds.username(), "alice");
        assert_eq!(creds.password(), "s3cret");
    }

    #[test]
    fn test_missing_user_is_reported_by_name() {
        let err = Credentials::from_lookup(lookup_from(&[(PASS_ENV, "s3cret")])).unwrap_err();
        assert!(matches!(err, SpaceTrackError::MissingCredentials(USER_ENV)));
        assert!(err.is_auth());
    }

    #[test]
    fn test_empty_password_is_missing() {
        let err = Credentials::from_lookup(lookup_from(&[(USER_ENV, "alice"), (PASS_ENV, "  ")]))
            .unwrap_err();
        assert!(matches!(err, SpaceTrackError::MissingCredentials(PASS_ENV)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("alice", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret"));
    }
}
