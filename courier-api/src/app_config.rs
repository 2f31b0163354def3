use courier_catalog::{Catalog, CatalogItem};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub owner: OwnerConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// The registry owner: the only identity allowed to register roles, and the
/// implicit operator account escrow settles into.
#[derive(Debug, Deserialize, Clone)]
pub struct OwnerConfig {
    pub identity: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub items: Vec<CatalogItemConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogItemConfig {
    pub sku: String,
    pub unit_price: u64,
}

impl CatalogConfig {
    pub fn build(&self) -> Catalog {
        Catalog::new(
            self.items
                .iter()
                .map(|item| CatalogItem {
                    sku: item.sku.clone(),
                    unit_price: item.unit_price,
                })
                .collect(),
        )
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `COURIER__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("COURIER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
