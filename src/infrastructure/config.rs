use secrecy::SecretString;
use std::env;

/// Client credentials registered with an OAuth provider
#[derive(Clone, Debug)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

#[derive(Clone, Debug, Default)]
pub struct ProviderCredentials {
    pub google: Option<OAuthCredentials>,
    pub linkedin: Option<OAuthCredentials>,
    pub twitter: Option<OAuthCredentials>,
    pub instagram: Option<OAuthCredentials>,
    pub threads: Option<OAuthCredentials>,
}

#[derive(Clone, Debug)]
pub struct SenderConfig {
    pub api_key: SecretString,
    pub group_id: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

/// Base URLs of every third-party API the app talks to.
/// Production defaults; tests point them at a mock server.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub google_auth: String,
    pub google_oauth: String,
    pub google_api: String,
    pub gmail_api: String,
    pub linkedin_auth: String,
    pub linkedin_api: String,
    pub twitter_auth: String,
    pub twitter_api: String,
    pub instagram_auth: String,
    pub instagram_oauth: String,
    pub instagram_graph: String,
    pub threads_auth: String,
    pub threads_graph: String,
    pub sender_api: String,
    pub openai_api: String,
    pub anthropic_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            google_auth: "https://accounts.google.com".to_string(),
            google_oauth: "https://oauth2.googleapis.com".to_string(),
            google_api: "https://www.googleapis.com".to_string(),
            gmail_api: "https://gmail.googleapis.com".to_string(),
            linkedin_auth: "https://www.linkedin.com".to_string(),
            linkedin_api: "https://api.linkedin.com".to_string(),
            twitter_auth: "https://twitter.com".to_string(),
            twitter_api: "https://api.twitter.com".to_string(),
            instagram_auth: "https://www.instagram.com".to_string(),
            instagram_oauth: "https://api.instagram.com".to_string(),
            instagram_graph: "https://graph.instagram.com".to_string(),
            threads_auth: "https://threads.net".to_string(),
            threads_graph: "https://graph.threads.net".to_string(),
            sender_api: "https://api.sender.net/v2".to_string(),
            openai_api: "https://api.openai.com/v1".to_string(),
            anthropic_api: "https://api.anthropic.com/v1".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint pointed at one base URL (mock servers)
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            google_auth: base.clone(),
            google_oauth: base.clone(),
            google_api: base.clone(),
            gmail_api: base.clone(),
            linkedin_auth: base.clone(),
            linkedin_api: base.clone(),
            twitter_auth: base.clone(),
            twitter_api: base.clone(),
            instagram_auth: base.clone(),
            instagram_oauth: base.clone(),
            instagram_graph: base.clone(),
            threads_auth: base.clone(),
            threads_graph: base.clone(),
            sender_api: base.clone(),
            openai_api: base.clone(),
            anthropic_api: base,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub site_name: String,
    pub public_base_url: String,
    pub admin_app_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub encryption_key: SecretString,
    pub oauth: ProviderCredentials,
    pub sender: Option<SenderConfig>,
    pub scheduler_enabled: bool,
    pub scheduler_tick_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://brandhub.db?mode=rwc".to_string(),
            port: 8000,
            site_name: "BrandHub".to_string(),
            public_base_url: "http://localhost:8000".to_string(),
            admin_app_url: "http://localhost:8000/admin".to_string(),
            cors_allowed_origins: Vec::new(),
            encryption_key: SecretString::new("dev-encryption-key".to_string()),
            oauth: ProviderCredentials::default(),
            sender: None,
            scheduler_enabled: true,
            scheduler_tick_secs: 60,
            endpoints: Endpoints::default(),
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn oauth_from_env(prefix: &str) -> Option<OAuthCredentials> {
    let client_id = non_empty(&format!("{}_CLIENT_ID", prefix))?;
    let client_secret = non_empty(&format!("{}_CLIENT_SECRET", prefix))?;
    Some(OAuthCredentials {
        client_id,
        client_secret: SecretString::new(client_secret),
    })
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

/// Secret for the token vault: `ENCRYPTION_KEY`, else `JWT_SECRET`.
/// Only debug builds may fall back to the development key.
fn encryption_key(
    explicit: Option<String>,
    jwt_secret: Option<String>,
    allow_dev_key: bool,
    dev_key: SecretString,
) -> Result<SecretString, String> {
    match explicit.or(jwt_secret) {
        Some(key) => Ok(SecretString::new(key)),
        None if allow_dev_key => Ok(dev_key),
        None => Err("ENCRYPTION_KEY or JWT_SECRET must be set in production".to_string()),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();

        let public_base_url = non_empty("PUBLIC_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_base_url);

        let admin_app_url = non_empty("ADMIN_APP_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/admin", public_base_url));

        let encryption_key = encryption_key(
            non_empty("ENCRYPTION_KEY"),
            non_empty("JWT_SECRET"),
            cfg!(debug_assertions),
            defaults.encryption_key,
        )?;

        let sender = non_empty("SENDER_API_KEY").map(|api_key| SenderConfig {
            api_key: SecretString::new(api_key),
            group_id: non_empty("SENDER_GROUP_ID"),
            from_email: non_empty("SENDER_FROM_EMAIL")
                .unwrap_or_else(|| "hello@example.com".to_string()),
            from_name: non_empty("SENDER_FROM_NAME").unwrap_or_else(|| "Newsletter".to_string()),
        });

        Ok(Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            site_name: non_empty("SITE_NAME").unwrap_or(defaults.site_name),
            public_base_url,
            admin_app_url,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            encryption_key,
            oauth: ProviderCredentials {
                google: oauth_from_env("GOOGLE"),
                linkedin: oauth_from_env("LINKEDIN"),
                twitter: oauth_from_env("TWITTER"),
                instagram: oauth_from_env("INSTAGRAM"),
                threads: oauth_from_env("THREADS"),
            },
            sender,
            scheduler_enabled: flag("SCHEDULER_ENABLED", true),
            scheduler_tick_secs: env::var("SCHEDULER_TICK_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .unwrap_or(defaults.scheduler_tick_secs),
            endpoints: Endpoints::default(),
        })
    }

    /// Where a provider sends the user back after consent
    pub fn oauth_redirect_uri(&self, provider: &str) -> String {
        format!("{}/api/oauth/{}/callback", self.public_base_url, provider)
    }

    pub fn blog_url(&self, slug: &str) -> String {
        format!("{}/journal/{}", self.public_base_url, slug)
    }
}
