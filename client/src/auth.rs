//! Magic-link CLI login.
//!
//! The handshake prints a link for a human to open in a browser, then
//! polls the activation endpoint until the login completes. The rest of
//! the client only consumes the resulting [`Session`] headers.

use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::session::Session;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polling stops after this many attempts (5 minutes at one per second).
const MAX_LOGIN_POLLS: usize = 300;

/// Fetches the human-facing login link for an organization.
pub async fn get_magic_link(
    http: &reqwest::Client,
    api_url: &str,
    organization: &str,
) -> Result<String> {
    let response = http
        .get(format!("{}/auth/cli/get-magic-link", api_url))
        .header("x-organization", organization)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Transport {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.text().await?)
}

/// One activation poll. `Ok(None)` means the login is still pending:
/// the endpoint answers 401, or 200 with an empty body, until the link
/// is opened.
pub async fn wait_for_login(
    http: &reqwest::Client,
    api_url: &str,
    pre_auth_session_id: &str,
) -> Result<Option<String>> {
    let response = http
        .post(format!("{}/auth/cli/wait-for-login", api_url))
        .json(&serde_json::json!({ "preAuthSessionId": pre_auth_session_id }))
        .send()
        .await?;
    let status = response.status();
    if status.as_u16() == 401 {
        return Ok(None);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Transport {
            status: status.as_u16(),
            body,
        });
    }
    let jwt = response.text().await?;
    if jwt.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(jwt))
}

/// Runs the full interactive handshake and returns a ready [`Session`].
pub async fn authenticate(
    http: &reqwest::Client,
    api_url: &str,
    organization: &str,
) -> Result<Session> {
    let magic_link = get_magic_link(http, api_url, organization).await?;
    println!("Paste the following link in your browser:\n\n{}", magic_link);

    let pre_auth_session_id = pre_auth_session_id(&magic_link)?;

    for _ in 0..MAX_LOGIN_POLLS {
        tokio::time::sleep(POLL_INTERVAL).await;
        if let Some(jwt) = wait_for_login(http, api_url, &pre_auth_session_id).await? {
            tracing::info!("login completed for organization {}", organization);
            return Ok(Session::new(api_url, organization, jwt.trim()));
        }
    }

    Err(ClientError::auth(format!(
        "login was not completed within {} seconds",
        MAX_LOGIN_POLLS
    )))
}

fn pre_auth_session_id(magic_link: &str) -> Result<String> {
    let parsed = url::Url::parse(magic_link)
        .map_err(|err| ClientError::auth(format!("malformed magic link: {}", err)))?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "preAuthSessionId")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| ClientError::auth("magic link carries no preAuthSessionId"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_auth_session_id_is_read_from_the_link_query() {
        let id =
            pre_auth_session_id("https://app.example.com/verify?rid=cli&preAuthSessionId=abc123")
                .unwrap();
        assert_eq!(id, "abc123");
    }

    #[test]
    fn link_without_session_id_is_rejected() {
        let err = pre_auth_session_id("https://app.example.com/verify?rid=cli").unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
    }
}
