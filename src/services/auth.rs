// src/services/auth.rs

use std::{collections::HashSet, sync::Arc};

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Identity, NewAccount},
    services::shop_context::SessionRegistry,
};

/// Configuração do provedor OAuth externo.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub endpoint: String,
    pub project_id: String,
    pub providers: Vec<String>,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    sessions: SessionRegistry,
    jwt_secret: String,
    session_ttl: chrono::Duration,
    oauth: OAuthConfig,
    // Sessões encerradas (sid). Vive em memória, como o próprio token.
    revoked: Arc<RwLock<HashSet<Uuid>>>,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        sessions: SessionRegistry,
        jwt_secret: String,
        session_ttl: chrono::Duration,
        oauth: OAuthConfig,
    ) -> Self {
        Self {
            user_repo,
            sessions,
            jwt_secret,
            session_ttl,
            oauth,
            revoked: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<String, AppError> {
        let email = email.trim().to_lowercase();

        // 1. E-mail único entre as contas
        if self.user_repo.find_account_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // 2. Hashing fora do runtime assíncrono
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 3. Cria a conta
        let account = self
            .user_repo
            .create_account(&NewAccount {
                email: &email,
                name: name.trim(),
                password_hash: &hashed_password,
                prefs: Map::new(),
            })
            .await?;

        tracing::info!("Conta {} registrada", account.id);

        // 4. Sessão
        self.create_token(&account.id)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let account = self
            .user_repo
            .find_account_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Contas criadas via OAuth não têm senha.
        let password_hash = account.password_hash.clone().ok_or(AppError::InvalidCredentials)?;
        let password_clone = password.to_owned();

        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&account.id)
    }

    /// Valida o token e devolve (id da sessão, identidade).
    pub async fn authenticate(&self, token: &str) -> Result<(Uuid, Identity), AppError> {
        let claims = self.decode_claims(token).await?;

        let account = match self.user_repo.find_account(&claims.sub).await {
            Ok(account) => account,
            Err(AppError::DocumentNotFound { .. }) => return Err(AppError::InvalidToken),
            Err(e) => return Err(e),
        };

        Ok((claims.sid, account.into()))
    }

    /// `None` quando não há sessão válida (token revogado, expirado ou malformado).
    pub async fn get_current_identity(&self, token: &str) -> Result<Option<Identity>, AppError> {
        match self.authenticate(token).await {
            Ok((_, identity)) => Ok(Some(identity)),
            Err(AppError::InvalidToken) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn start_oauth_login(&self, provider: &str, success: &str, failure: &str) -> Result<String, AppError> {
        let provider = provider.to_lowercase();
        if !self.oauth.providers.iter().any(|p| *p == provider) {
            return Err(AppError::InvalidInput("unknown_oauth_provider".into()));
        }

        // Os redirecionamentos precisam ser URLs absolutas.
        for target in [success, failure] {
            Url::parse(target).map_err(|_| AppError::InvalidInput("invalid_redirect".into()))?;
        }

        let raw = format!(
            "{}/account/sessions/oauth2/{}",
            self.oauth.endpoint.trim_end_matches('/'),
            provider
        );
        let url = Url::parse_with_params(
            &raw,
            &[
                ("project", self.oauth.project_id.as_str()),
                ("success", success),
                ("failure", failure),
            ],
        )
        .map_err(|e| AppError::StoreMisconfigured(format!("endpoint OAuth inválido: {e}")))?;

        Ok(url.to_string())
    }

    /// Revoga a sessão e descarta o contexto de loja dela.
    pub async fn end_session(&self, token: &str) -> Result<(), AppError> {
        let claims = self.decode_claims(token).await?;
        self.revoked.write().await.insert(claims.sid);
        self.sessions.remove(claims.sid).await;
        tracing::info!("Sessão {} encerrada", claims.sid);
        Ok(())
    }

    pub async fn update_prefs(&self, account_id: &str, patch: Map<String, Value>) -> Result<Identity, AppError> {
        Ok(self.user_repo.merge_prefs(account_id, patch).await?.into())
    }

    async fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?
        .claims;

        if self.revoked.read().await.contains(&claims.sid) {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    fn create_token(&self, account_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: account_id.to_string(),
            sid: Uuid::new_v4(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{document_store::DocumentStore, memory_store::MemoryDocumentStore};
    use serde_json::json;

    fn service() -> AuthService {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        AuthService::new(
            UserRepository::new(store, "accounts", "users"),
            SessionRegistry::new(),
            "segredo-de-teste".into(),
            chrono::Duration::days(1),
            OAuthConfig {
                endpoint: "https://auth.example.com/v1/".into(),
                project_id: "alfaiataria".into(),
                providers: vec!["google".into()],
            },
        )
    }

    #[tokio::test]
    async fn register_then_login_yields_identity() {
        let auth = service();
        auth.register("Ana@Example.com", "segredo1", "Ana").await.unwrap();

        let token = auth.login("ana@example.com", "segredo1").await.unwrap();
        let identity = auth.get_current_identity(&token).await.unwrap().unwrap();

        assert_eq!(identity.email, "ana@example.com");
        assert_eq!(identity.name, "Ana");
    }

    #[tokio::test]
    async fn duplicate_email_and_bad_password_are_rejected() {
        let auth = service();
        auth.register("ana@example.com", "segredo1", "Ana").await.unwrap();

        let dup = auth.register("ANA@example.com", "outra123", "Ana 2").await;
        assert!(matches!(dup, Err(AppError::EmailAlreadyExists)));

        let wrong = auth.login("ana@example.com", "errada99").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn ended_session_no_longer_identifies() {
        let auth = service();
        let token = auth.register("ana@example.com", "segredo1", "Ana").await.unwrap();

        auth.end_session(&token).await.unwrap();

        assert!(auth.get_current_identity(&token).await.unwrap().is_none());
        assert!(auth.get_current_identity("lixo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prefs_are_merged() {
        let auth = service();
        let token = auth.register("ana@example.com", "segredo1", "Ana").await.unwrap();
        let (_, identity) = auth.authenticate(&token).await.unwrap();

        let mut patch = Map::new();
        patch.insert("theme".into(), json!("dark"));
        auth.update_prefs(&identity.id, patch).await.unwrap();

        let mut patch = Map::new();
        patch.insert("currentShopId".into(), json!("s1"));
        let updated = auth.update_prefs(&identity.id, patch).await.unwrap();

        assert_eq!(updated.prefs["theme"], json!("dark"));
        assert_eq!(updated.prefs["currentShopId"], json!("s1"));
    }

    #[test]
    fn oauth_url_points_at_provider_with_redirects() {
        let auth = service();
        let url = auth
            .start_oauth_login("google", "https://app.example.com/ok", "https://app.example.com/fail")
            .unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/v1/account/sessions/oauth2/google");
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("project".into(), "alfaiataria".into())));
        assert!(pairs.contains(&("success".into(), "https://app.example.com/ok".into())));

        assert!(matches!(
            auth.start_oauth_login("github", "https://a.b/ok", "https://a.b/f"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
