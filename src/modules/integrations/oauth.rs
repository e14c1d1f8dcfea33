//! OAuth 2.0 authorization-code flow for the supported providers.

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::{Rng, distributions::Alphanumeric};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use super::{id_to_string, read_json};
use crate::domain::DomainError;
use crate::infrastructure::config::{Endpoints, OAuthCredentials, ProviderCredentials};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Twitter,
    Instagram,
    Threads,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Google,
        Provider::LinkedIn,
        Provider::Twitter,
        Provider::Instagram,
        Provider::Threads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::LinkedIn => "linkedin",
            Provider::Twitter => "twitter",
            Provider::Instagram => "instagram",
            Provider::Threads => "threads",
        }
    }

    pub fn scopes(&self) -> &'static [&'static str] {
        match self {
            Provider::Google => &[
                "openid",
                "email",
                "profile",
                "https://www.googleapis.com/auth/gmail.readonly",
                "https://www.googleapis.com/auth/gmail.send",
                "https://www.googleapis.com/auth/gmail.modify",
            ],
            Provider::LinkedIn => &["openid", "profile", "email", "w_member_social"],
            Provider::Twitter => &["tweet.read", "tweet.write", "users.read", "offline.access"],
            Provider::Instagram => &[
                "instagram_business_basic",
                "instagram_business_content_publish",
            ],
            Provider::Threads => &["threads_basic", "threads_content_publish"],
        }
    }

    fn scope_separator(&self) -> &'static str {
        match self {
            Provider::Instagram | Provider::Threads => ",",
            _ => " ",
        }
    }

    /// Twitter requires PKCE even for confidential clients
    pub fn uses_pkce(&self) -> bool {
        matches!(self, Provider::Twitter)
    }

    /// Meta platforms hand out short-lived tokens that must be upgraded
    pub fn has_long_lived_exchange(&self) -> bool {
        matches!(self, Provider::Instagram | Provider::Threads)
    }

    pub fn can_publish(&self) -> bool {
        !matches!(self, Provider::Google)
    }

    /// Post length limit in characters
    pub fn max_chars(&self) -> Option<usize> {
        match self {
            Provider::Twitter => Some(280),
            Provider::LinkedIn => Some(3000),
            Provider::Instagram => Some(2200),
            Provider::Threads => Some(500),
            Provider::Google => None,
        }
    }

    pub fn requires_media(&self) -> bool {
        matches!(self, Provider::Instagram)
    }

    pub fn credentials<'a>(&self, creds: &'a ProviderCredentials) -> Option<&'a OAuthCredentials> {
        match self {
            Provider::Google => creds.google.as_ref(),
            Provider::LinkedIn => creds.linkedin.as_ref(),
            Provider::Twitter => creds.twitter.as_ref(),
            Provider::Instagram => creds.instagram.as_ref(),
            Provider::Threads => creds.threads.as_ref(),
        }
    }

    fn authorize_endpoint(&self, endpoints: &Endpoints) -> String {
        match self {
            Provider::Google => format!("{}/o/oauth2/v2/auth", endpoints.google_auth),
            Provider::LinkedIn => format!("{}/oauth/v2/authorization", endpoints.linkedin_auth),
            Provider::Twitter => format!("{}/i/oauth2/authorize", endpoints.twitter_auth),
            Provider::Instagram => format!("{}/oauth/authorize", endpoints.instagram_auth),
            Provider::Threads => format!("{}/oauth/authorize", endpoints.threads_auth),
        }
    }

    fn token_endpoint(&self, endpoints: &Endpoints) -> String {
        match self {
            Provider::Google => format!("{}/token", endpoints.google_oauth),
            Provider::LinkedIn => format!("{}/oauth/v2/accessToken", endpoints.linkedin_auth),
            Provider::Twitter => format!("{}/2/oauth2/token", endpoints.twitter_api),
            Provider::Instagram => format!("{}/oauth/access_token", endpoints.instagram_oauth),
            Provider::Threads => format!("{}/oauth/access_token", endpoints.threads_graph),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("Unknown provider '{}'", s)))
    }
}

/// PKCE verifier/challenge pair (RFC 7636, S256)
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Self {
        let verifier = random_token(64);
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Tokens returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    user_id: Option<serde_json::Value>,
}

impl From<TokenResponse> for TokenSet {
    fn from(raw: TokenResponse) -> Self {
        Self {
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
            expires_in: raw.expires_in,
            scope: raw.scope,
            user_id: raw.user_id.as_ref().and_then(id_to_string),
        }
    }
}

pub struct OAuthClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl OAuthClient {
    pub fn new(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// URL the admin's browser is sent to for consent
    pub fn authorize_url(
        &self,
        provider: Provider,
        creds: &OAuthCredentials,
        redirect_uri: &str,
        state: &str,
        pkce_challenge: Option<&str>,
    ) -> Result<String, DomainError> {
        let mut url = url::Url::parse(&provider.authorize_endpoint(&self.endpoints))
            .map_err(|e| DomainError::Internal(format!("bad authorize endpoint: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &creds.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", &provider.scopes().join(provider.scope_separator()))
                .append_pair("state", state);

            if provider == Provider::Google {
                // Needed to receive a refresh token on every consent
                query
                    .append_pair("access_type", "offline")
                    .append_pair("prompt", "consent");
            }

            if let Some(challenge) = pkce_challenge {
                query
                    .append_pair("code_challenge", challenge)
                    .append_pair("code_challenge_method", "S256");
            }
        }

        Ok(url.into())
    }

    pub async fn exchange_code(
        &self,
        provider: Provider,
        creds: &OAuthCredentials,
        code: &str,
        redirect_uri: &str,
        pkce_verifier: Option<&str>,
    ) -> Result<TokenSet, DomainError> {
        let secret = creds.client_secret.expose_secret().as_str();
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", creds.client_id.as_str()),
        ];
        if !provider.uses_pkce() {
            form.push(("client_secret", secret));
        }
        if let Some(verifier) = pkce_verifier {
            form.push(("code_verifier", verifier));
        }

        let raw: TokenResponse = self.post_token(provider, creds, &form).await?;
        tracing::info!("🔑 {} authorization code exchanged", provider);
        Ok(raw.into())
    }

    /// Swap a Meta short-lived token (1 h) for a long-lived one (60 days)
    pub async fn exchange_long_lived(
        &self,
        provider: Provider,
        creds: &OAuthCredentials,
        short_lived: &str,
    ) -> Result<TokenSet, DomainError> {
        let (base, grant) = match provider {
            Provider::Instagram => (&self.endpoints.instagram_graph, "ig_exchange_token"),
            Provider::Threads => (&self.endpoints.threads_graph, "th_exchange_token"),
            _ => return Err(DomainError::validation("provider has no long-lived exchange")),
        };

        let resp = self
            .http
            .get(format!("{}/access_token", base))
            .query(&[
                ("grant_type", grant),
                ("client_secret", creds.client_secret.expose_secret().as_str()),
                ("access_token", short_lived),
            ])
            .send()
            .await?;

        let raw: TokenResponse = read_json(resp, &format!("{} token exchange", provider)).await?;
        Ok(raw.into())
    }

    /// Renew access. Takes the refresh token, or for Meta platforms the
    /// current long-lived access token.
    pub async fn refresh(
        &self,
        provider: Provider,
        creds: &OAuthCredentials,
        token: &str,
    ) -> Result<TokenSet, DomainError> {
        let mut tokens: TokenSet = match provider {
            Provider::Instagram | Provider::Threads => {
                let (base, grant) = if provider == Provider::Instagram {
                    (&self.endpoints.instagram_graph, "ig_refresh_token")
                } else {
                    (&self.endpoints.threads_graph, "th_refresh_token")
                };
                let resp = self
                    .http
                    .get(format!("{}/refresh_access_token", base))
                    .query(&[("grant_type", grant), ("access_token", token)])
                    .send()
                    .await?;
                let raw: TokenResponse =
                    read_json(resp, &format!("{} token refresh", provider)).await?;
                raw.into()
            }
            _ => {
                let secret = creds.client_secret.expose_secret().as_str();
                let mut form: Vec<(&str, &str)> = vec![
                    ("grant_type", "refresh_token"),
                    ("refresh_token", token),
                    ("client_id", creds.client_id.as_str()),
                ];
                if !provider.uses_pkce() {
                    form.push(("client_secret", secret));
                }
                let raw: TokenResponse = self.post_token(provider, creds, &form).await?;
                raw.into()
            }
        };

        // Google omits the refresh token on refresh; the old one stays valid
        if tokens.refresh_token.is_none() && !provider.has_long_lived_exchange() {
            tokens.refresh_token = Some(token.to_string());
        }
        Ok(tokens)
    }

    async fn post_token(
        &self,
        provider: Provider,
        creds: &OAuthCredentials,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, DomainError> {
        let mut request = self.http.post(provider.token_endpoint(&self.endpoints)).form(form);

        if provider.uses_pkce() {
            // Confidential Twitter clients authenticate with HTTP Basic
            let basic = STANDARD.encode(format!(
                "{}:{}",
                creds.client_id,
                creds.client_secret.expose_secret()
            ));
            request = request.header("Authorization", format!("Basic {}", basic));
        }

        let resp = request.send().await?;
        read_json(resp, &format!("{} token endpoint", provider)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::collections::HashMap;

    fn creds() -> OAuthCredentials {
        OAuthCredentials {
            client_id: "client-123".to_string(),
            client_secret: SecretString::new("shh".to_string()),
        }
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_provider_round_trip_names() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!("LinkedIn".parse::<Provider>().unwrap(), Provider::LinkedIn);
        assert!("myspace".parse::<Provider>().is_err());
    }

    #[test]
    fn test_pkce_challenge_is_s256_of_verifier() {
        let pkce = Pkce::generate();
        assert_eq!(pkce.verifier.len(), 64);
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(pkce.verifier.as_bytes()));
        assert_eq!(pkce.challenge, expected);
        assert!(!pkce.challenge.contains('='));
    }

    #[test]
    fn test_google_authorize_url_requests_offline_access() {
        let client = OAuthClient::new(reqwest::Client::new(), Endpoints::default());
        let url = client
            .authorize_url(
                Provider::Google,
                &creds(),
                "https://brand.example/api/oauth/google/callback",
                "state-1",
                None,
            )
            .unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        let q = query_of(&url);
        assert_eq!(q["client_id"], "client-123");
        assert_eq!(q["state"], "state-1");
        assert_eq!(q["access_type"], "offline");
        assert!(q["scope"].contains("gmail.send"));
        assert!(!q.contains_key("code_challenge"));
    }

    #[test]
    fn test_twitter_authorize_url_carries_pkce() {
        let client = OAuthClient::new(reqwest::Client::new(), Endpoints::default());
        let url = client
            .authorize_url(
                Provider::Twitter,
                &creds(),
                "https://brand.example/cb",
                "s",
                Some("challenge-xyz"),
            )
            .unwrap();
        let q = query_of(&url);
        assert_eq!(q["code_challenge"], "challenge-xyz");
        assert_eq!(q["code_challenge_method"], "S256");
        assert_eq!(q["scope"], "tweet.read tweet.write users.read offline.access");
    }

    #[test]
    fn test_meta_scopes_are_comma_separated() {
        let client = OAuthClient::new(reqwest::Client::new(), Endpoints::default());
        let url = client
            .authorize_url(Provider::Threads, &creds(), "https://x/cb", "s", None)
            .unwrap();
        assert_eq!(query_of(&url)["scope"], "threads_basic,threads_content_publish");
    }
}
