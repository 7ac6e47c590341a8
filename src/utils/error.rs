use hyper::StatusCode;
use thiserror::Error;

/// Errors raised while loading or validating the provider configuration.
///
/// These indicate a broken deployment and are surfaced loudly at startup,
/// unlike per-request failures which are swallowed by the resolver loop.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to load configuration: {0}")]
    LoadError(#[from] twelf::Error),
    #[error("Url template for provider {0} is missing the {{player}} placeholder")]
    MissingKeyPlaceholder(String),
    #[error("Url template for provider {0} does not format into a valid url: {1}")]
    InvalidUrlTemplate(String, url::ParseError),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Http error: {0}")]
    HttpError(#[from] hyper::http::Error),
    #[error("Request error: {0}")]
    BoxedRequestError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Provider responded with status {0}")]
    BadStatusError(StatusCode),
}

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("Raw texture data of {len} bytes is not a whole number of {width}-pixel rgba rows")]
    InvalidRawLength { len: usize, width: u32 },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type FetchResult<T> = std::result::Result<T, FetchError>;
pub type TextureResult<T> = std::result::Result<T, TextureError>;

/// Per-provider attempt failures. All of these are handled locally inside the
/// resolver loop and converted into "advance to the next provider"; none of
/// them ever cross the public API.
#[derive(Error, Debug)]
pub(crate) enum AttemptError {
    #[error("provider has no url configured")]
    Skipped,
    #[error("transport failure: {0}")]
    Transport(#[from] FetchError),
    #[error("fetch timed out")]
    TimedOut,
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
    #[error("provider returned a known placeholder texture")]
    Placeholder,
    #[error("failed to composite ears overlay: {0}")]
    Composite(TextureError),
}
