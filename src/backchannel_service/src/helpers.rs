use redis::{Client, RedisResult, aio::MultiplexedConnection};
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};

use backchannel_adapters::config::{PostgresSettings, RedisSettings};

use crate::ServiceSetupError;

/// Connect to PostgreSQL and run pending migrations.
pub async fn configure_postgresql(settings: &PostgresSettings) -> Result<PgPool, ServiceSetupError> {
    let pg_pool = get_postgres_pool(settings.url.expose_secret()).await?;

    sqlx::migrate!("./migrations").run(&pg_pool).await?;

    Ok(pg_pool)
}

/// Open a multiplexed Redis connection shared by every store.
pub async fn configure_redis(settings: &RedisSettings) -> Result<MultiplexedConnection, ServiceSetupError> {
    let conn = get_redis_client(&settings.host_name)?
        .get_multiplexed_async_connection()
        .await?;

    Ok(conn)
}

pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}

pub fn get_redis_client(redis_hostname: &str) -> RedisResult<Client> {
    let redis_url = format!("redis://{}/", redis_hostname);
    redis::Client::open(redis_url)
}
