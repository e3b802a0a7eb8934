use sea_orm::DatabaseConnection;

use crate::{
    config::Config,
    error::Error,
    service::{cache::RedisReadingCache, provider::ProviderChain},
};

/// Build the ordered provider chain from the configured credentials
pub fn build_provider_chain(config: &Config) -> Result<ProviderChain, Error> {
    let chain = ProviderChain::with_credentials(
        &config.weather_api_url,
        &[
            config.weather_api_key.as_str(),
            config.weather_api_key_2.as_str(),
        ],
    )?;

    Ok(chain)
}

/// Connect to the database and run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, Error> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Connect to Valkey/Redis for the weather reading cache
pub async fn connect_to_cache(config: &Config) -> Result<RedisReadingCache, Error> {
    use fred::prelude::*;

    let redis_config = Config::from_url(&config.valkey_url)?;
    let pool = Pool::new(redis_config, None, None, None, 6)?;

    pool.connect();
    pool.wait_for_connect().await?;

    Ok(RedisReadingCache::new(pool))
}
