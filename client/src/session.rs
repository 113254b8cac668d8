use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Auth headers for one `(api_url, organization)` pair.
///
/// Immutable once obtained; shared read-only by every request the
/// executor issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub api_url: String,
    pub organization: String,
    pub headers: BTreeMap<String, String>,
}

impl Session {
    pub fn new(
        api_url: impl Into<String>,
        organization: impl Into<String>,
        jwt: impl AsRef<str>,
    ) -> Self {
        let organization = organization.into();
        let mut headers = BTreeMap::new();
        headers.insert(
            "authorization".to_string(),
            format!("Bearer {}", jwt.as_ref()),
        );
        headers.insert("x-organization".to_string(), organization.clone());
        Self {
            api_url: api_url.into(),
            organization,
            headers,
        }
    }

    /// Key under which this session is persisted.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.api_url, self.organization)
    }
}

/// JSON-file-backed store of saved sessions, keyed by
/// `"{api_url}:{organization}"`.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user cache directory, when one exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("ccai-client").join("sessions.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self, key: &str) -> Result<Option<Session>> {
        let sessions = self.read_all().await?;
        Ok(sessions.get(key).cloned())
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let mut sessions = self.read_all().await?;
        sessions.insert(session.cache_key(), session.clone());
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(&sessions)?;
        tokio::fs::write(&self.path, body).await?;
        tracing::debug!("saved session to {}", self.path.display());
        Ok(())
    }

    async fn read_all(&self) -> Result<BTreeMap<String, Session>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(body) => Ok(serde_json::from_str(&body)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_headers_carry_jwt_and_organization() {
        let session = Session::new("https://api.example.com", "patho", "tok-1");
        assert_eq!(
            session.headers.get("authorization").map(String::as_str),
            Some("Bearer tok-1")
        );
        assert_eq!(
            session.headers.get("x-organization").map(String::as_str),
            Some("patho")
        );
        assert_eq!(session.cache_key(), "https://api.example.com:patho");
    }

    #[tokio::test]
    async fn store_round_trips_sessions_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sessions.json"));

        let first = Session::new("https://api.example.com", "patho", "tok-1");
        let second = Session::new("https://api.example.com", "radiology", "tok-2");
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        let loaded = store.load(&first.cache_key()).await.unwrap();
        assert_eq!(loaded, Some(first));
        let loaded = store.load(&second.cache_key()).await.unwrap();
        assert_eq!(loaded, Some(second));
    }

    #[tokio::test]
    async fn missing_store_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sessions.json"));
        let loaded = store.load("https://api.example.com:patho").await.unwrap();
        assert_eq!(loaded, None);
    }
}
