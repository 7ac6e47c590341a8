use serde::{Deserialize, Serialize};
use strum::Display;
use url::Url;

use crate::{
    error::{ConfigError, ConfigResult},
    model::PlayerIdentity,
};

/// The token substituted with the derived player key when formatting a
/// provider url template.
pub const PLAYER_KEY_PLACEHOLDER: &str = "{player}";

/// How the lookup key for a provider url is derived from the player identity.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UrlKeyMode {
    Username,
    UuidPlain,
    UuidDashed,
}

impl UrlKeyMode {
    #[must_use]
    pub fn derive_key(self, identity: &PlayerIdentity) -> String {
        match self {
            Self::Username => identity.username.clone(),
            Self::UuidPlain => identity.uuid.simple().to_string(),
            Self::UuidDashed => identity.uuid.as_hyphenated().to_string(),
        }
    }
}

/// A single third-party texture provider. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub id: String,
    pub url_template: String,
    pub key_mode: UrlKeyMode,
    pub priority: i32,
}

impl Provider {
    /// Formats the provider url for a player. Pure formatting, no I/O.
    ///
    /// Returns `None` when the template is empty, which the resolver treats
    /// as an immediate skip rather than a failure.
    #[must_use]
    pub fn resolve_url(&self, identity: &PlayerIdentity) -> Option<String> {
        if self.url_template.is_empty() {
            return None;
        }

        Some(
            self.url_template
                .replace(PLAYER_KEY_PLACEHOLDER, &self.key_mode.derive_key(identity)),
        )
    }
}

/// A provider record as it appears in the persisted configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfiguration {
    pub id: String,
    pub url_template: String,
    pub key_mode: UrlKeyMode,
    #[serde(default)]
    pub priority: i32,
}

/// Builds the ordered provider registry from configuration records.
///
/// Non-empty templates are validated here so that malformed configuration
/// fails at load time, never during a resolution. Ordering is ascending
/// priority, with ties broken by the original list order.
pub fn build_registry(configs: &[ProviderConfiguration]) -> ConfigResult<Vec<Provider>> {
    let mut providers = Vec::with_capacity(configs.len());

    for config in configs {
        if !config.url_template.is_empty() {
            validate_template(config)?;
        }

        providers.push(Provider {
            id: config.id.clone(),
            url_template: config.url_template.clone(),
            key_mode: config.key_mode,
            priority: config.priority,
        });
    }

    providers.sort_by_key(|provider| provider.priority);

    Ok(providers)
}

fn validate_template(config: &ProviderConfiguration) -> ConfigResult<()> {
    if !config.url_template.contains(PLAYER_KEY_PLACEHOLDER) {
        return Err(ConfigError::MissingKeyPlaceholder(config.id.clone()));
    }

    // Substitute a fixed key so url parse errors surface now.
    let sample = config.url_template.replace(PLAYER_KEY_PLACEHOLDER, "player");

    Url::parse(&sample)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrlTemplate(config.id.clone(), e))
}

#[cfg(test)]
mod tests {
    use uuid::uuid;

    use super::*;

    fn identity() -> PlayerIdentity {
        PlayerIdentity::new(uuid!("ad4569f3-7576-4376-a7c7-8e8cfcd9b832"), "NickAc")
    }

    fn record(id: &str, template: &str, priority: i32) -> ProviderConfiguration {
        ProviderConfiguration {
            id: id.to_string(),
            url_template: template.to_string(),
            key_mode: UrlKeyMode::Username,
            priority,
        }
    }

    #[test]
    fn key_modes_derive_the_expected_keys() {
        let identity = identity();

        assert_eq!(UrlKeyMode::Username.derive_key(&identity), "NickAc");
        assert_eq!(
            UrlKeyMode::UuidPlain.derive_key(&identity),
            "ad4569f375764376a7c78e8cfcd9b832"
        );
        assert_eq!(
            UrlKeyMode::UuidDashed.derive_key(&identity),
            "ad4569f3-7576-4376-a7c7-8e8cfcd9b832"
        );
    }

    #[test]
    fn key_modes_display_as_their_config_names() {
        assert_eq!(UrlKeyMode::Username.to_string(), "username");
        assert_eq!(UrlKeyMode::UuidPlain.to_string(), "uuid_plain");
        assert_eq!(UrlKeyMode::UuidDashed.to_string(), "uuid_dashed");
    }

    #[test]
    fn url_resolution_substitutes_the_player_key() {
        let provider = Provider {
            id: "optifine".to_string(),
            url_template: "https://optifine.net/capes/{player}.png".to_string(),
            key_mode: UrlKeyMode::Username,
            priority: 0,
        };

        assert_eq!(
            provider.resolve_url(&identity()).as_deref(),
            Some("https://optifine.net/capes/NickAc.png")
        );
    }

    #[test]
    fn empty_template_resolves_to_no_url() {
        let provider = Provider {
            id: "disabled".to_string(),
            url_template: String::new(),
            key_mode: UrlKeyMode::Username,
            priority: 0,
        };

        assert_eq!(provider.resolve_url(&identity()), None);
    }

    #[test]
    fn registry_orders_by_priority_keeping_list_order_on_ties() {
        let registry = build_registry(&[
            record("c", "https://c.example/{player}", 1),
            record("a", "https://a.example/{player}", 0),
            record("b", "https://b.example/{player}", 1),
        ])
        .expect("registry should build");

        let ids: Vec<_> = registry.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn template_without_placeholder_is_a_config_error() {
        let result = build_registry(&[record("bad", "https://bad.example/capes.png", 0)]);

        assert!(matches!(
            result,
            Err(ConfigError::MissingKeyPlaceholder(id)) if id == "bad"
        ));
    }

    #[test]
    fn unparseable_template_is_a_config_error() {
        let result = build_registry(&[record("bad", "not a url {player}", 0)]);

        assert!(matches!(result, Err(ConfigError::InvalidUrlTemplate(..))));
    }

    #[test]
    fn empty_template_is_allowed_at_load_time() {
        let registry =
            build_registry(&[record("disabled", "", 0)]).expect("empty template should load");

        assert_eq!(registry.len(), 1);
    }
}
