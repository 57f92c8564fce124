use tracing::{info, warn};

use super::{EntryCache, EntryStore, Gateway, Scope};
use crate::errors::{Error, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(message) => Notice {
                level: NoticeLevel::Success,
                message,
            },
            Err(e) => {
                warn!(error = %e, "session action failed");
                Notice {
                    level: NoticeLevel::Error,
                    message: e.to_string(),
                }
            }
        }
    }
}

pub struct Session<C: EntryCache, G: Gateway> {
    store: EntryStore<C>,
    gateway: G,
}

impl<C: EntryCache, G: Gateway> Session<C, G> {
    pub fn new(store: EntryStore<C>, gateway: G) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &EntryStore<C> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntryStore<C> {
        &mut self.store
    }

    pub fn current_user(&self) -> Option<&str> {
        self.store.scope().username()
    }

    pub fn login(&mut self, username: &str) -> Result<String> {
        let scope = Scope::user(username.trim())?;
        self.store.switch_scope(scope);
        let name = self.current_user().unwrap_or_default().to_string();
        info!(user = %name, "logged in");
        Ok(format!("Welcome, {name}!"))
    }

    /// Leaves the store empty in the anonymous scope.
    pub fn logout(&mut self) -> Notice {
        if let Some(user) = self.current_user() {
            info!(%user, "logged out");
        }
        // Clear after leaving the user's scope so their cached entries survive.
        self.store.switch_scope(Scope::Anonymous);
        self.store.clear_all();
        Notice {
            level: NoticeLevel::Info,
            message: "Session closed.".to_string(),
        }
    }

    fn require_user(&self) -> Result<String> {
        self.current_user()
            .map(str::to_string)
            .ok_or_else(|| Error::validation("log in first"))
    }

    pub async fn save_remote(&self) -> Result<String> {
        let user = self.require_user()?;
        self.gateway.save(&user, self.store.entries()).await?;
        info!(%user, "entries saved to server");
        Ok("Data saved to server.".to_string())
    }

    /// Replaces every local entry with the user's saved document.
    pub async fn load_remote(&mut self) -> Result<String> {
        let user = self.require_user()?;
        let snapshot = self.gateway.load(&user).await?;
        self.store.replace_all(snapshot);
        info!(%user, "entries loaded from server");
        Ok("Data loaded.".to_string())
    }
}
