use serde_json::Value;

use crate::auth;
use crate::error::{ClientError, Result};
use crate::queries;
use crate::session::{Session, SessionStore};

pub const DEFAULT_API_URL: &str = "https://api.cancercenter.ai";

/// Authenticated executor for a single GraphQL endpoint.
///
/// Cheap to clone; the session headers are shared read-only across
/// every request.
#[derive(Clone)]
pub struct Api {
    http: reqwest::Client,
    session: Session,
    verbose: bool,
}

impl Api {
    pub fn new(session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
            verbose: false,
        }
    }

    /// Logs in against `api_url` for `organization`, reusing a cached
    /// session when one exists and still verifies.
    pub async fn login(api_url: &str, organization: &str) -> Result<Self> {
        let store = SessionStore::default_path().map(SessionStore::new);
        let key = format!("{}:{}", api_url, organization);

        if let Some(store) = &store {
            if let Some(session) = store.load(&key).await? {
                let api = Api::new(session);
                if api.verify().await {
                    tracing::debug!("reusing cached session for {}", key);
                    return Ok(api);
                }
                tracing::info!("cached session for {} is stale, logging in again", key);
            }
        }

        let http = reqwest::Client::new();
        let session = auth::authenticate(&http, api_url, organization).await?;
        if let Some(store) = &store {
            store.save(&session).await?;
        }
        Ok(Api::new(session))
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api_url(&self) -> &str {
        &self.session.api_url
    }

    /// The underlying HTTP client, for direct transfers against signed
    /// URLs (downloads, presigned uploads).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Cheap authenticated probe; `true` when the session still works.
    pub async fn verify(&self) -> bool {
        self.query_graphql(&queries::QUERY_ENTITY, None).await.is_ok()
    }

    /// Executes one query or mutation and unwraps the single root field
    /// of `data`.
    ///
    /// A response carrying both `errors` and `data` fails with
    /// [`ClientError::GraphQL`]; the errors list wins. `data` holding
    /// zero or more than one root field fails with
    /// [`ClientError::Decode`] rather than guessing a field.
    pub async fn query_graphql(
        &self,
        document: &str,
        variables: Option<Value>,
    ) -> Result<Value> {
        if self.verbose {
            tracing::debug!(?variables, "sending GraphQL document:\n{}", document);
        }

        let mut request = self
            .http
            .post(format!("{}/graphql", self.session.api_url))
            .json(&serde_json::json!({
                "query": document,
                "variables": variables,
            }));
        for (name, value) in &self.session.headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if self.verbose {
            tracing::debug!("GraphQL response ({}): {}", status, body);
        }
        if !status.is_success() {
            return Err(ClientError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let mut envelope: Value = serde_json::from_str(&body)?;

        // Errors win over data: a response can carry both.
        if let Some(errors) = envelope.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let messages = errors
                    .iter()
                    .map(|error| {
                        error
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown error")
                            .to_string()
                    })
                    .collect();
                return Err(ClientError::GraphQL(messages));
            }
        }

        let data = envelope
            .get_mut("data")
            .map(Value::take)
            .ok_or_else(|| ClientError::decode("response has no data object"))?;
        let Value::Object(data) = data else {
            return Err(ClientError::decode("data is not an object"));
        };

        let mut fields = data.into_iter();
        match (fields.next(), fields.next()) {
            (Some((_, value)), None) => Ok(value),
            (None, _) => Err(ClientError::decode("data holds no root field")),
            (Some(_), Some(_)) => Err(ClientError::decode(
                "data holds more than one root field",
            )),
        }
    }
}
