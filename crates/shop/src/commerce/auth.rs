//! OAuth2 client-credentials flow for the commerce platform.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::ApiError;

/// Seconds before the reported expiry at which a token counts as expired, so
/// an in-flight request never crosses the boundary with a dying token.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// API client credentials.
#[derive(Clone)]
pub(crate) struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Bearer token obtained from the platform's token endpoint.
#[derive(Debug, Clone)]
pub(crate) struct AccessToken {
    /// Token value for the `Authorization` header.
    pub access_token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl AccessToken {
    /// Whether the token is expired or about to expire.
    pub(crate) fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() + EXPIRY_LEEWAY_SECS >= self.expires_at
    }
}

/// Response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

/// Error response from the token endpoint.
#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Obtain a bearer token scoped to the project via client credentials.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` if the credentials are rejected.
#[instrument(skip(client, credentials), fields(project_key = %project_key))]
pub(crate) async fn authenticate(
    client: &reqwest::Client,
    auth_url: &Url,
    project_key: &str,
    credentials: &ClientCredentials,
) -> Result<AccessToken, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let endpoint = format!("{}/oauth/token", auth_url.as_str().trim_end_matches('/'));
    let scope = format!(
        "manage_my_shopping_lists:{project_key} view_products:{project_key} view_categories:{project_key}"
    );

    let response = client
        .post(endpoint)
        .basic_auth(
            &credentials.client_id,
            Some(credentials.client_secret.expose_secret()),
        )
        .form(&[
            ("grant_type", "client_credentials"),
            ("scope", scope.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();

    if status.is_success() {
        let token_response: TokenResponse = response.json().await?;

        Ok(AccessToken {
            access_token: SecretString::from(token_response.access_token),
            expires_at: now + token_response.expires_in,
        })
    } else if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::BAD_REQUEST
    {
        let error_response: TokenErrorResponse =
            response.json().await.unwrap_or(TokenErrorResponse {
                error: None,
                error_description: Some("Invalid client credentials".to_string()),
            });

        let message = error_response
            .error_description
            .or(error_response.error)
            .unwrap_or_else(|| "Invalid client credentials".to_string());

        Err(ApiError::AuthenticationFailed(message))
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(ApiError::AuthenticationFailed(format!(
            "HTTP {status}: {error_text}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry_includes_leeway() {
        let now = chrono::Utc::now().timestamp();
        let dying = AccessToken {
            access_token: SecretString::from("t"),
            expires_at: now + 30,
        };
        assert!(dying.is_expired());

        let healthy = AccessToken {
            access_token: SecretString::from("t"),
            expires_at: now + 600,
        };
        assert!(!healthy.is_expired());
    }
}
