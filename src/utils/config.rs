use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use twelf::{config, Layer};

use crate::{
    error::ConfigResult,
    model::provider::{ProviderConfiguration, UrlKeyMode},
};

/// Root configuration for the cosmetics resolver.
///
/// Loaded once before any resolution and treated as read-only thereafter;
/// hot-reload is out of scope.
#[config]
#[derive(Debug)]
pub struct CosmeticsConfiguration {
    /// Cape texture providers, tried in ascending priority order.
    #[serde(default = "default_cape_providers")]
    pub cape_providers: Vec<ProviderConfiguration>,

    /// Ears texture providers, tried in ascending priority order.
    #[serde(default = "default_ears_providers")]
    pub ears_providers: Vec<ProviderConfiguration>,

    /// Fetch behaviour of the provider loop.
    #[serde(default)]
    pub fetch: FetchConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfiguration {
    /// Hard per-provider timeout for cape lookups. On expiry the in-flight
    /// request is cancelled, not left to finish in the background.
    #[serde(with = "humantime_serde", default = "default_cape_timeout")]
    pub cape_timeout: Duration,

    /// Hard per-provider timeout for ears lookups.
    #[serde(with = "humantime_serde", default = "default_ears_timeout")]
    pub ears_timeout: Duration,

    /// How many outbound requests per second to allow across all providers.
    #[serde(default = "default_rate_limit_per_second")]
    pub rate_limit_per_second: u64,
}

impl Default for CosmeticsConfiguration {
    fn default() -> Self {
        Self {
            cape_providers: default_cape_providers(),
            ears_providers: default_ears_providers(),
            fetch: FetchConfiguration::default(),
        }
    }
}

impl Default for FetchConfiguration {
    fn default() -> Self {
        Self {
            cape_timeout: default_cape_timeout(),
            ears_timeout: default_ears_timeout(),
            rate_limit_per_second: default_rate_limit_per_second(),
        }
    }
}

impl CosmeticsConfiguration {
    /// Loads the configuration from a toml file layered under `TPC_`-prefixed
    /// environment variables. Any error here means a broken deployment and is
    /// surfaced loudly instead of being swallowed like per-request failures.
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        Ok(Self::with_layers(&[
            Layer::DefaultTrait,
            Layer::Toml(path),
            Layer::Env(Some("TPC_".to_string())),
        ])?)
    }
}

fn default_cape_providers() -> Vec<ProviderConfiguration> {
    vec![
        ProviderConfiguration {
            id: "optifine".to_string(),
            url_template: "https://optifine.net/capes/{player}.png".to_string(),
            key_mode: UrlKeyMode::Username,
            priority: 0,
        },
        ProviderConfiguration {
            id: "labymod".to_string(),
            url_template: "https://dl.labymod.net/capes/{player}".to_string(),
            key_mode: UrlKeyMode::UuidDashed,
            priority: 1,
        },
        ProviderConfiguration {
            id: "minecraftcapes".to_string(),
            url_template: "https://api.minecraftcapes.net/profile/{player}/cape".to_string(),
            key_mode: UrlKeyMode::UuidPlain,
            priority: 2,
        },
    ]
}

fn default_ears_providers() -> Vec<ProviderConfiguration> {
    vec![ProviderConfiguration {
        id: "minecraftcapes".to_string(),
        url_template: "https://api.minecraftcapes.net/profile/{player}/ears".to_string(),
        key_mode: UrlKeyMode::UuidPlain,
        priority: 0,
    }]
}

#[inline]
const fn default_cape_timeout() -> Duration {
    Duration::from_secs(3)
}

#[inline]
const fn default_ears_timeout() -> Duration {
    Duration::from_secs(4)
}

#[inline]
const fn default_rate_limit_per_second() -> u64 {
    10
}
