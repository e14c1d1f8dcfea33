//! OAuth connection lifecycle: consent, callback, token storage and refresh

use chrono::{Duration as ChronoDuration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TryIntoModel,
};
use std::time::{Duration, Instant};

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::config::OAuthCredentials;
use crate::models::social_account::{self, ActiveModel, Entity as SocialAccount};
use crate::modules::integrations::oauth::{OAuthClient, Pkce, Provider, TokenSet, random_token};
use crate::modules::integrations::{self, AccountProfile};
use crate::utils::time::{format_ts, now_ts};

/// How long an authorization `state` stays valid
pub const STATE_TTL: Duration = Duration::from_secs(600);

/// Refresh tokens expiring within this window
pub const REFRESH_WINDOW_HOURS: i64 = 24;

/// A consent redirect waiting for its callback
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub provider: Provider,
    pub pkce_verifier: Option<String>,
    pub created_at: Instant,
}

fn credentials(state: &AppState, provider: Provider) -> Result<OAuthCredentials, DomainError> {
    provider
        .credentials(&state.config.oauth)
        .cloned()
        .ok_or_else(|| {
            DomainError::NotConfigured(format!("{} OAuth client is not configured", provider))
        })
}

fn oauth_client(state: &AppState) -> OAuthClient {
    OAuthClient::new(state.http.clone(), state.config.endpoints.clone())
}

fn purge_expired(state: &AppState) {
    state
        .oauth_states
        .retain(|_, pending| pending.created_at.elapsed() < STATE_TTL);
}

/// Start a connection: remember a fresh `state` and return the consent URL
pub fn begin(state: &AppState, provider: Provider) -> Result<String, DomainError> {
    let creds = credentials(state, provider)?;
    purge_expired(state);

    let csrf = random_token(32);
    let pkce = provider.uses_pkce().then(Pkce::generate);
    let url = oauth_client(state).authorize_url(
        provider,
        &creds,
        &state.config.oauth_redirect_uri(provider.as_str()),
        &csrf,
        pkce.as_ref().map(|p| p.challenge.as_str()),
    )?;

    state.oauth_states.insert(
        csrf,
        PendingAuthorization {
            provider,
            pkce_verifier: pkce.map(|p| p.verifier),
            created_at: Instant::now(),
        },
    );
    tracing::info!("🔐 {} authorization started", provider);
    Ok(url)
}

/// Consume a callback `state`. Unknown, expired or mismatched values fail.
pub fn take_pending(
    state: &AppState,
    provider: Provider,
    csrf: &str,
) -> Result<PendingAuthorization, DomainError> {
    let (_, pending) = state
        .oauth_states
        .remove(csrf)
        .ok_or_else(|| DomainError::validation("unknown or already used OAuth state"))?;

    if pending.created_at.elapsed() >= STATE_TTL {
        return Err(DomainError::validation("OAuth state expired"));
    }
    if pending.provider != provider {
        return Err(DomainError::validation("OAuth state belongs to another provider"));
    }
    Ok(pending)
}

/// Exchange the code, look up the account and store the encrypted tokens
pub async fn complete(
    state: &AppState,
    provider: Provider,
    pending: PendingAuthorization,
    code: &str,
) -> Result<social_account::Model, DomainError> {
    let creds = credentials(state, provider)?;
    let client = oauth_client(state);

    let mut tokens = client
        .exchange_code(
            provider,
            &creds,
            code,
            &state.config.oauth_redirect_uri(provider.as_str()),
            pending.pkce_verifier.as_deref(),
        )
        .await?;

    if provider.has_long_lived_exchange() {
        let long_lived = client
            .exchange_long_lived(provider, &creds, &tokens.access_token)
            .await?;
        tokens = TokenSet {
            user_id: tokens.user_id.or(long_lived.user_id.clone()),
            scope: tokens.scope.or(long_lived.scope.clone()),
            ..long_lived
        };
    }

    let profile = integrations::fetch_profile(
        provider,
        &state.http,
        &state.config.endpoints,
        &tokens.access_token,
    )
    .await?;

    let account = save_account(state, provider, &profile, &tokens).await?;
    tracing::info!(
        "✅ {} connected as {}",
        provider,
        account.display_name.as_deref().unwrap_or(&account.external_id)
    );
    Ok(account)
}

fn expiry(tokens: &TokenSet) -> Option<String> {
    tokens
        .expires_in
        .filter(|secs| *secs > 0)
        .map(|secs| format_ts(Utc::now() + ChronoDuration::seconds(secs)))
}

/// One row per platform; reconnecting replaces identity and tokens
async fn save_account(
    state: &AppState,
    provider: Provider,
    profile: &AccountProfile,
    tokens: &TokenSet,
) -> Result<social_account::Model, DomainError> {
    let db = state.db();
    let now = now_ts();
    let access_token = state.vault.encrypt(&tokens.access_token)?;
    let refresh_token = state.vault.encrypt_opt(tokens.refresh_token.as_deref())?;

    let existing = find_account(db, provider).await?;
    let mut active = match existing {
        Some(model) => model.into(),
        None => ActiveModel {
            platform: Set(provider.as_str().to_string()),
            created_at: Set(now.clone()),
            ..Default::default()
        },
    };

    active.external_id = Set(profile.external_id.clone());
    active.display_name = Set(profile.display_name.clone());
    active.access_token = Set(access_token);
    active.refresh_token = Set(refresh_token);
    active.token_expires_at = Set(expiry(tokens));
    active.scopes = Set(tokens
        .scope
        .clone()
        .or_else(|| Some(provider.scopes().join(" "))));
    active.updated_at = Set(now);

    Ok(active.save(db).await?.try_into_model()?)
}

pub async fn find_account(
    db: &DatabaseConnection,
    provider: Provider,
) -> Result<Option<social_account::Model>, DomainError> {
    Ok(SocialAccount::find()
        .filter(social_account::Column::Platform.eq(provider.as_str()))
        .one(db)
        .await?)
}

pub async fn list_accounts(
    db: &DatabaseConnection,
) -> Result<Vec<social_account::Model>, DomainError> {
    Ok(SocialAccount::find()
        .order_by_asc(social_account::Column::Platform)
        .all(db)
        .await?)
}

pub async fn disconnect(db: &DatabaseConnection, provider: Provider) -> Result<(), DomainError> {
    let result = SocialAccount::delete_many()
        .filter(social_account::Column::Platform.eq(provider.as_str()))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound);
    }
    tracing::info!("🔌 {} disconnected", provider);
    Ok(())
}

/// The connected account for a platform and its decrypted access token
pub async fn access_token(
    state: &AppState,
    provider: Provider,
) -> Result<(social_account::Model, String), DomainError> {
    let account = find_account(state.db(), provider).await?.ok_or_else(|| {
        DomainError::NotConfigured(format!("no connected {} account", provider))
    })?;
    let token = state.vault.decrypt(&account.access_token)?;
    Ok((account, token))
}

/// Renew one account's access token and store the result
pub async fn refresh_account(
    state: &AppState,
    account: social_account::Model,
) -> Result<social_account::Model, DomainError> {
    let provider: Provider = account.platform.parse()?;
    let creds = credentials(state, provider)?;

    let grant = if provider.has_long_lived_exchange() {
        state.vault.decrypt(&account.access_token)?
    } else {
        let stored = account.refresh_token.as_deref().ok_or_else(|| {
            DomainError::validation(format!("{} account has no refresh token", provider))
        })?;
        state.vault.decrypt(stored)?
    };

    let tokens = oauth_client(state).refresh(provider, &creds, &grant).await?;

    let mut active: ActiveModel = account.into();
    active.access_token = Set(state.vault.encrypt(&tokens.access_token)?);
    if let Some(refresh) = tokens.refresh_token.as_deref() {
        active.refresh_token = Set(Some(state.vault.encrypt(refresh)?));
    }
    active.token_expires_at = Set(expiry(&tokens));
    active.updated_at = Set(now_ts());
    Ok(active.update(state.db()).await?)
}

/// Refresh every account whose token expires within the window.
/// Returns (refreshed, failed).
pub async fn refresh_expiring(state: &AppState) -> Result<(usize, usize), DomainError> {
    let horizon = format_ts(Utc::now() + ChronoDuration::hours(REFRESH_WINDOW_HOURS));
    let expiring = SocialAccount::find()
        .filter(social_account::Column::TokenExpiresAt.is_not_null())
        .filter(social_account::Column::TokenExpiresAt.lte(horizon))
        .all(state.db())
        .await?;

    let (mut refreshed, mut failed) = (0, 0);
    for account in expiring {
        let platform = account.platform.clone();
        match refresh_account(state, account).await {
            Ok(_) => {
                tracing::info!("🔄 {} token refreshed", platform);
                refreshed += 1;
            }
            Err(e) => {
                tracing::warn!("⚠️ {} token refresh failed: {}", platform, e);
                failed += 1;
            }
        }
    }
    Ok((refreshed, failed))
}
