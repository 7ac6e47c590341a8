use std::{sync::Arc, time::Duration};

use tracing::{debug, instrument};

use crate::{
    config::CosmeticsConfiguration,
    error::{AttemptError, ConfigResult},
    http_client::TextureFetcher,
    model::{
        provider::{build_registry, Provider},
        CapeResolution, EarsResolution, PlayerIdentity, TextureAsset,
    },
    texture::{self, compositor},
};

pub mod placeholder;

use placeholder::PlaceholderTable;

/// Players that get the built-in ears geometry without any provider lookup.
const BUILTIN_EARS_USERNAMES: &[&str] = &["deadmau5"];

/// Walks the ordered provider registries looking for a cosmetic texture,
/// one timeout-bounded fetch per provider, stopping at the first accepted
/// result.
///
/// Providers are queried strictly sequentially, so the worst case latency of
/// a resolution is the sum of the per-provider timeouts across the full list.
/// Independent resolutions may run concurrently; they share only this
/// read-only state.
pub struct CosmeticResolver {
    cape_providers: Vec<Provider>,
    ears_providers: Vec<Provider>,
    cape_timeout: Duration,
    ears_timeout: Duration,
    placeholders: PlaceholderTable,
    client: Arc<dyn TextureFetcher>,
}

impl CosmeticResolver {
    /// Builds the resolver with the shipped placeholder signatures,
    /// validating both provider registries. Malformed url templates surface
    /// here, never during a resolution.
    pub fn new(
        config: &CosmeticsConfiguration,
        client: Arc<dyn TextureFetcher>,
    ) -> ConfigResult<Self> {
        Self::with_placeholder_table(config, client, PlaceholderTable::default())
    }

    /// Builds the resolver with a custom placeholder signature table, for
    /// deployments that install signatures recomputed against this crate's
    /// canonical png encoding.
    pub fn with_placeholder_table(
        config: &CosmeticsConfiguration,
        client: Arc<dyn TextureFetcher>,
        placeholders: PlaceholderTable,
    ) -> ConfigResult<Self> {
        Ok(Self {
            cape_providers: build_registry(&config.cape_providers)?,
            ears_providers: build_registry(&config.ears_providers)?,
            cape_timeout: config.fetch.cape_timeout,
            ears_timeout: config.fetch.ears_timeout,
            placeholders,
            client,
        })
    }

    /// Tries to find a replacement cape for a player.
    ///
    /// Every per-provider failure (skip, transport, timeout, decode or
    /// placeholder) advances to the next provider; exhaustion yields
    /// [`CapeResolution::Unchanged`] and the caller keeps its current cape.
    #[instrument(skip(self), fields(player = %identity.username))]
    pub async fn resolve_cape(&self, identity: &PlayerIdentity) -> CapeResolution {
        for provider in &self.cape_providers {
            match self.try_cape(provider, identity).await {
                Ok(cape) => {
                    debug!(provider = %provider.id, "resolved cape texture");
                    return CapeResolution::Replaced(cape);
                }
                Err(err) => {
                    debug!(provider = %provider.id, key_mode = %provider.key_mode, %err, "cape attempt failed");
                }
            }
        }

        CapeResolution::Unchanged
    }

    /// Tries to find an ears texture for a player and composite it onto the
    /// given base skin.
    ///
    /// Allow-listed players are assigned the built-in ears geometry up front,
    /// without any network call. Otherwise the provider loop behaves exactly
    /// like the cape one, with the compositing step as an extra failure
    /// point.
    #[instrument(skip(self, base_skin), fields(player = %identity.username))]
    pub async fn resolve_ears(
        &self,
        base_skin: &TextureAsset,
        identity: &PlayerIdentity,
    ) -> EarsResolution {
        if BUILTIN_EARS_USERNAMES.contains(&identity.username.as_str()) {
            debug!("player is allow-listed for built-in ears geometry");
            return EarsResolution::BuiltinGeometry;
        }

        for provider in &self.ears_providers {
            match self.try_ears(provider, base_skin, identity).await {
                Ok(skin) => {
                    debug!(provider = %provider.id, "resolved ears texture");
                    return EarsResolution::Applied(skin);
                }
                Err(err) => {
                    debug!(provider = %provider.id, key_mode = %provider.key_mode, %err, "ears attempt failed");
                }
            }
        }

        EarsResolution::Unchanged
    }

    async fn try_cape(
        &self,
        provider: &Provider,
        identity: &PlayerIdentity,
    ) -> Result<TextureAsset, AttemptError> {
        let url = provider
            .resolve_url(identity)
            .ok_or(AttemptError::Skipped)?;

        let bytes = self.fetch_bounded(&url, self.cape_timeout).await?;

        let cape = texture::normalize_cape(decode_transport(&bytes)?);

        if self
            .placeholders
            .is_placeholder(&provider.id, &cape)
            .map_err(texture_as_decode)?
        {
            return Err(AttemptError::Placeholder);
        }

        let id = last_path_segment(&url).map(ToOwned::to_owned);

        Ok(TextureAsset::new(
            Some(url),
            id,
            texture::encode_raw(cape),
        ))
    }

    async fn try_ears(
        &self,
        provider: &Provider,
        base_skin: &TextureAsset,
        identity: &PlayerIdentity,
    ) -> Result<TextureAsset, AttemptError> {
        let url = provider
            .resolve_url(identity)
            .ok_or(AttemptError::Skipped)?;

        let bytes = self.fetch_bounded(&url, self.ears_timeout).await?;

        let overlay = decode_transport(&bytes)?;

        let data = compositor::overlay_ears(base_skin.data(), &overlay)
            .map_err(AttemptError::Composite)?;

        Ok(TextureAsset::new(Some(url), None, data))
    }

    /// One timeout-bounded fetch. Expiry drops the in-flight future, which
    /// tears down the underlying request instead of letting it run on.
    async fn fetch_bounded(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<hyper::body::Bytes, AttemptError> {
        tokio::time::timeout(timeout, self.client.fetch(url))
            .await
            .map_err(|_| AttemptError::TimedOut)?
            .map_err(AttemptError::Transport)
    }
}

fn decode_transport(bytes: &[u8]) -> Result<image::RgbaImage, AttemptError> {
    texture::decode_png(bytes).map_err(texture_as_decode)
}

/// Codec failures at the transport boundary are decode failures; the raw
/// layout variants cannot occur for a freshly decoded image.
fn texture_as_decode(error: crate::error::TextureError) -> AttemptError {
    match error {
        crate::error::TextureError::ImageError(e) => AttemptError::Decode(e),
        other => AttemptError::Composite(other),
    }
}

/// The texture id a provider response is filed under: the last path segment
/// of the formatted url.
fn last_path_segment(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|segment| !segment.is_empty())
}
