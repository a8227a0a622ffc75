use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use chrono::Utc;
use sqlx::{MySql, Pool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const REDIS_KEY_PREFIX: &str = "boardsignal:refresh";

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub user_repo: Arc<dyn UserRepo>,
    pub cookie_secure: bool,
    pub refresh_ttl: chrono::Duration,
    purge_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;

        let needs_mysql = settings.session.backend == "mysql" || settings.user.backend == "mysql";
        let pool = if needs_mysql {
            let mysql = settings
                .mysql
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("mysql backend selected but [mysql] is missing"))?;
            Some(Pool::<MySql>::connect(&mysql.dsn).await?)
        } else {
            None
        };
        let mysql_pool = || {
            pool.clone()
                .ok_or_else(|| anyhow::anyhow!("mysql pool is not configured"))
        };

        let refresh_store: Arc<dyn RefreshTokenStore> = match settings.session.backend.as_str() {
            "memory" => Arc::new(MemoryRefreshTokenStore::new()),
            "redis" => {
                let dsn = settings
                    .session
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("redis backend selected but session.redis_dsn is missing"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisRefreshTokenStore::new(redis_manager, REDIS_KEY_PREFIX))
            }
            "mysql" => Arc::new(MySqlRefreshTokenStore::new(mysql_pool()?)),
            other => return Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        };

        let user_repo: Arc<dyn UserRepo> = match settings.user.backend.as_str() {
            "memory" => Arc::new(MemoryUserRepo::new()),
            "mysql" => Arc::new(MySqlUserRepo::new(mysql_pool()?)),
            other => return Err(anyhow::anyhow!("Unknown user backend: {}", other)),
        };

        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            access_ttl: chrono::Duration::seconds(settings.auth.access_ttl_secs),
            signing_key: settings.auth.signing_key.clone().into_bytes(),
        }));
        let refresh_ttl = chrono::Duration::seconds(settings.auth.refresh_ttl_secs);
        let store_timeout = Duration::from_millis(settings.auth.store_timeout_ms);

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            token_codec.clone(),
            TokenIssuer::new(token_codec, refresh_store.clone(), refresh_ttl, store_timeout),
            SessionRevoker::new(refresh_store.clone(), store_timeout),
        ));
        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(user_repo.clone()));

        let cancel = CancellationToken::new();
        let purge_handle = match settings.session.purge_interval_secs {
            0 => None,
            secs => Some(spawn_purge(
                refresh_store,
                Duration::from_secs(secs),
                cancel.clone(),
            )),
        };

        info!(
            session_backend = %settings.session.backend,
            user_backend = %settings.user.backend,
            "server started"
        );

        Ok(Self {
            auth_service,
            user_service,
            user_repo,
            cookie_secure: settings.auth.cookie_secure,
            refresh_ttl,
            purge_handle: Mutex::new(purge_handle),
            cancel,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self.purge_handle.lock().ok().and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("purge handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

fn spawn_purge(
    store: Arc<dyn RefreshTokenStore>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => match store.purge_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "purged expired refresh tokens"),
                    Err(e) => warn!("purging refresh tokens: {}", e),
                },
            }
        }
    })
}
