use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::repo::{PgSessionStore, PgUserStore, SessionStore, UserStore};
use crate::config::AppConfig;
use crate::db;
use crate::memory::MemoryStore;
use crate::workouts::repo::{PgWorkoutStore, WorkoutStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub workouts: Arc<dyn WorkoutStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        match config.database_url.clone() {
            Some(url) => {
                let db = db::connect(&config, &url).await?;
                info!("using postgres store");
                Ok(Self {
                    config,
                    users: Arc::new(PgUserStore::new(db.clone())),
                    workouts: Arc::new(PgWorkoutStore::new(db.clone())),
                    sessions: Arc::new(PgSessionStore::new(db)),
                })
            }
            None => {
                warn!("DATABASE_URL not set; data is kept in memory and lost on restart");
                Ok(Self::with_memory_store(config))
            }
        }
    }

    pub fn with_memory_store(config: Arc<AppConfig>) -> Self {
        Self::from_memory_store(config, Arc::new(MemoryStore::new()))
    }

    fn from_memory_store(config: Arc<AppConfig>, store: Arc<MemoryStore>) -> Self {
        Self {
            config,
            users: store.clone(),
            workouts: store.clone(),
            sessions: store,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_store().0
    }

    /// Like [`AppState::fake`], also handing back the store for direct inspection.
    #[cfg(test)]
    pub fn fake_with_store() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = Self::from_memory_store(Arc::new(AppConfig::for_tests()), store.clone());
        (state, store)
    }
}
