use image::RgbaImage;
use md5::{Digest, Md5};
use uuid::{uuid, Builder, Uuid};

use crate::{error::TextureResult, texture};

/// Known "no cosmetic assigned" cape signatures shipped with the crate,
/// keyed by provider id.
const KNOWN_PLACEHOLDER_SIGNATURES: &[(&str, Uuid)] = &[
    // LabyMod serves its default cape instead of a 404.
    ("labymod", uuid!("dc1b48fa-ca1b-3eb3-b137-37f8bdaae45a")),
];

/// The placeholder signature table consulted for cape responses.
///
/// A signature is only meaningful for the provider that produced it; the
/// same pixels coming from a different provider are a real cape. Deployments
/// can install signatures recomputed against this crate's canonical png
/// encoding on top of the shipped entries.
#[derive(Debug, Clone)]
pub struct PlaceholderTable {
    entries: Vec<(String, Uuid)>,
}

impl Default for PlaceholderTable {
    fn default() -> Self {
        Self::new(
            KNOWN_PLACEHOLDER_SIGNATURES
                .iter()
                .map(|(id, signature)| ((*id).to_string(), *signature)),
        )
    }
}

impl PlaceholderTable {
    pub fn new(entries: impl IntoIterator<Item = (String, Uuid)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Whether a decoded cape matches a known placeholder for this provider.
    pub fn is_placeholder(&self, provider_id: &str, image: &RgbaImage) -> TextureResult<bool> {
        // Only hash once a provider actually has known signatures.
        if !self.entries.iter().any(|(id, _)| id == provider_id) {
            return Ok(false);
        }

        let signature = content_signature(image)?;

        Ok(self
            .entries
            .iter()
            .any(|(id, known)| id == provider_id && *known == signature))
    }
}

/// Computes the deterministic content identifier for a decoded texture: the
/// md5 name-uuid of its canonical png encoding. Content-based only, the
/// source url plays no part.
pub fn content_signature(image: &RgbaImage) -> TextureResult<Uuid> {
    let png = texture::encode_png(image)?;
    let digest = Md5::digest(&png);

    Ok(Builder::from_md5_bytes(digest.into()).into_uuid())
}
