//! Google OAuth 2.0 provider client.
//!
//! Standard authorization-code flow: redirect the browser to Google, trade
//! the returned code for an access token, then fetch the profile the token
//! grants. Only `profile` and `email` scopes are requested.

use serde::Deserialize;
use tracing::error;

use closet_core::{Error, ProviderProfile, Result};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Google OAuth client configured from the environment.
#[derive(Clone)]
pub struct GoogleOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleOAuth {
    /// Create a client from environment configuration.
    ///
    /// Reads:
    /// - `GOOGLE_CLIENT_ID` (required)
    /// - `GOOGLE_CLIENT_SECRET` (required)
    /// - `GOOGLE_REDIRECT_URI` (default: local callback route)
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| Error::Config("GOOGLE_CLIENT_ID is not set".to_string()))?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .map_err(|_| Error::Config("GOOGLE_CLIENT_SECRET is not set".to_string()))?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
            "http://localhost:5000/api/auth/google/callback".to_string()
        });

        Ok(Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
        })
    }

    /// Authorization URL the browser is redirected to.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=online",
            AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode("openid email profile"),
        )
    }

    /// Trade the provider's authorization code for the profile it grants.
    pub async fn fetch_profile(&self, code: &str) -> Result<ProviderProfile> {
        let token: TokenResponse = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                error!(error = %e, "Google token exchange failed");
                Error::Unauthorized("Google sign-in failed".to_string())
            })?
            .json()
            .await?;

        let info: UserInfo = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                error!(error = %e, "Google userinfo fetch failed");
                Error::Unauthorized("Google sign-in failed".to_string())
            })?
            .json()
            .await?;

        Ok(ProviderProfile {
            google_id: info.id,
            name: info.name.unwrap_or_else(|| info.email.clone()),
            email: info.email,
            avatar: info.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GoogleOAuth {
        GoogleOAuth {
            client: reqwest::Client::new(),
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:5000/api/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn test_authorize_url_encodes_params() {
        let url = test_client().authorize_url();
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fapi%2Fauth%2Fgoogle%2Fcallback"
        ));
    }
}
