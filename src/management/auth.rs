use std::path::PathBuf;

use chrono::Utc;

use crate::{
    tidal,
    types::{AccountRole, Token},
};

/// Persisted OAuth token for one account role.
///
/// Source and destination tokens live in separate cache files so both
/// sessions can be loaded during the same run.
pub struct TokenManager {
    role: AccountRole,
    token: Token,
}

impl TokenManager {
    pub fn new(role: AccountRole, token: Token) -> Self {
        TokenManager { role, token }
    }

    pub async fn load(role: AccountRole) -> Result<Self, String> {
        let path = Self::token_path(role);
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { role, token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path(self.role);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(Self::token_path(self.role), json)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn get_valid_token(&mut self) -> String {
        if self.is_expired() {
            if let Ok(new_token) =
                tidal::auth::refresh_token(&self.token.refresh_token, self.token.user_id).await
            {
                self.token = new_token;
                let _ = self.persist().await;
            }
        }

        self.token.access_token.clone()
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in - 240
    }

    fn token_path(role: AccountRole) -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(format!("timicli/cache/{}-token.json", role));
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    pub fn user_id(&self) -> u64 {
        self.token.user_id
    }
}
