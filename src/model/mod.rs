use derive_more::Debug;
use uuid::Uuid;

pub mod provider;
pub mod resolver;

/// The player a resolution is running for. Input only, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub uuid: Uuid,
    pub username: String,
}

impl PlayerIdentity {
    #[must_use]
    pub fn new(uuid: Uuid, username: impl Into<String>) -> Self {
        Self {
            uuid,
            username: username.into(),
        }
    }
}

/// A cosmetic texture (cape or skin) in the flat raw rgba8 interchange layout:
/// 4 bytes per pixel, channel order R,G,B,A, rows top-to-bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureAsset {
    source_url: Option<String>,
    id: Option<String>,
    #[debug(skip)]
    data: Vec<u8>,
}

impl TextureAsset {
    #[must_use]
    pub fn new(source_url: Option<String>, id: Option<String>, data: Vec<u8>) -> Self {
        Self {
            source_url,
            id,
            data,
        }
    }

    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the asset carries no texture data. Derived rather than
    /// stored, so it can never disagree with `data`.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.data.is_empty()
    }
}

/// Outcome of a cape resolution. `Unchanged` means every provider failed or
/// was exhausted and the caller should keep using its current cape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapeResolution {
    Unchanged,
    Replaced(TextureAsset),
}

/// Outcome of an ears resolution.
///
/// `Applied` carries the base skin with the ears overlay composited in; the
/// caller is expected to also switch to the ears geometry. `BuiltinGeometry`
/// is the static allow-list override: ears geometry applies without any
/// texture change or network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EarsResolution {
    Unchanged,
    Applied(TextureAsset),
    BuiltinGeometry,
}
