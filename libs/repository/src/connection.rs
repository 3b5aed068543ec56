use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use url::Url;

use crate::{IntoResponse, RepositoryError, Response};

/// Pool settings, read from the `[database]` table of `Config.toml`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub max_pool_size: u32,
    /// Upper bound on opening a connection or waiting for a free one.
    pub server_selection_timeout_ms: u64,
    /// Idle connections are closed after this long.
    pub socket_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_pool_size: 10,
            server_selection_timeout_ms: 5_000,
            socket_timeout_ms: 45_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
}

impl ConnectionState {
    pub fn ready_state(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DbState {
    pub ready_state: u8,
    pub db_name: Option<String>,
    pub host: Option<String>,
}

/// Connects lazily and hands out the same pool to every caller.
///
/// Callers arriving while a connect is in flight queue on `connecting` and
/// pick up its result instead of opening a second pool. A failed attempt
/// leaves nothing cached, so the next call starts over.
#[derive(Debug)]
pub struct ConnectionManager {
    url: String,
    settings: DatabaseSettings,
    conn: RwLock<Option<DatabaseConnection>>,
    connecting: Mutex<()>,
    attempts: AtomicUsize,
}

impl ConnectionManager {
    pub fn new(url: impl Into<String>, settings: DatabaseSettings) -> Self {
        Self {
            url: url.into(),
            settings,
            conn: RwLock::new(None),
            connecting: Mutex::new(()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub async fn ensure_connection(&self) -> Response<DatabaseConnection> {
        if let Some(db) = self.conn.read().await.as_ref() {
            return Ok(db.clone());
        }

        let _connecting = self.connecting.lock().await;

        if let Some(db) = self.conn.read().await.as_ref() {
            return Ok(db.clone());
        }

        let db = self.connect().await?;
        *self.conn.write().await = Some(db.clone());

        Ok(db)
    }

    /// Forgets the cached pool; the next `ensure_connection` reconnects.
    pub async fn invalidate(&self) {
        if self.conn.write().await.take().is_some() {
            warn!(task = "drop cached database connection");
        }
    }

    pub async fn state(&self) -> ConnectionState {
        if self.conn.read().await.is_some() {
            return ConnectionState::Connected;
        }

        match self.connecting.try_lock() {
            Ok(_) => ConnectionState::Disconnected,
            Err(_) => ConnectionState::Connecting,
        }
    }

    pub async fn describe(&self) -> DbState {
        let url = Url::parse(&self.url).ok();

        DbState {
            ready_state: self.state().await.ready_state(),
            db_name: url.as_ref().and_then(|url| {
                let name = url.path().trim_start_matches('/');
                (!name.is_empty()).then(|| name.to_string())
            }),
            host: url
                .as_ref()
                .and_then(|url| url.host_str().map(str::to_string)),
        }
    }

    /// Number of connection attempts started so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Converts a failed query, dropping the cached pool when the failure
    /// was at the connection level.
    pub(crate) async fn check<T>(
        &self,
        result: Result<T, DbErr>,
        message: &str,
    ) -> Response<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err @ (DbErr::ConnectionAcquire(_) | DbErr::Conn(_))) => {
                self.invalidate().await;
                Err(RepositoryError::Connectivity(err))
            }
            Err(err) => Err(err).into_response(message),
        }
    }

    async fn connect(&self) -> Response<DatabaseConnection> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(task = "connect to database", attempt);

        let selection =
            Duration::from_millis(self.settings.server_selection_timeout_ms);
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.settings.max_pool_size.max(1))
            .min_connections(1)
            .connect_timeout(selection)
            .acquire_timeout(selection)
            .idle_timeout(Duration::from_millis(self.settings.socket_timeout_ms))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = Database::connect(opt).await.map_err(|e| {
            warn!(task = "connect to database", attempt, error = %e);
            RepositoryError::Connectivity(e)
        })?;

        Migrator::up(&db, None)
            .await
            .into_response("in migrator up")?;

        info!(task = "connected to database", attempt);

        Ok(db)
    }
}
