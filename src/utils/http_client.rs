use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderName, HeaderValue};
use http_body_util::{BodyExt, Empty};
use hyper::{
    body::{Bytes, Incoming},
    Method, Request, Response,
};
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, Error as ClientError},
    rt::TokioExecutor,
};
use sync_wrapper::SyncWrapper;
use tokio::sync::RwLock;
use tower::{util::BoxService, Service, ServiceBuilder, ServiceExt};
use tower_http::set_header::SetRequestHeaderLayer;
use tracing::instrument;

use crate::error::{FetchError, FetchResult};

const USER_AGENT: &str = concat!("ThirdPartyCosmetics/", env!("CARGO_PKG_VERSION"));

type BoxedHttpService = BoxService<Request<Empty<Bytes>>, Response<Incoming>, ClientError>;

/// The network seam of the resolver: one GET per texture candidate.
///
/// Success is a status in the 2xx range together with the body bytes; any
/// other status or transport error is a `FetchError`. The resolver applies
/// its per-attempt timeout around this call, so implementations must be
/// cancel-safe: dropping the returned future tears down the request.
#[async_trait]
pub trait TextureFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<Bytes>;
}

pub struct CosmeticsHttpClient {
    inner: RwLock<SyncWrapper<BoxedHttpService>>,
}

impl CosmeticsHttpClient {
    #[must_use]
    pub fn new(rate_limit_per_second: u64) -> Self {
        create_http_client(rate_limit_per_second)
    }
}

#[async_trait]
impl TextureFetcher for CosmeticsHttpClient {
    #[allow(clippy::significant_drop_tightening)] // Not worth making the code less readable
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> FetchResult<Bytes> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .body(Empty::<Bytes>::new())?;

        let response = {
            let mut client = self.inner.write().await;
            let service = client
                .get_mut()
                .ready()
                .await
                .map_err(|e| FetchError::BoxedRequestError(Box::new(e)))?;

            service
                .call(request)
                .await
                .map_err(|e| FetchError::BoxedRequestError(Box::new(e)))?
        };

        if !response.status().is_success() {
            return Err(FetchError::BadStatusError(response.status()));
        }

        response
            .into_body()
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .map_err(|e| FetchError::BoxedRequestError(Box::new(e)))
    }
}

fn create_http_client(rate_limit_per_second: u64) -> CosmeticsHttpClient {
    let https = HttpsConnector::new();

    let client = Client::builder(TokioExecutor::new()).build(https);

    let service = ServiceBuilder::new()
        .boxed()
        .rate_limit(rate_limit_per_second, Duration::from_secs(1))
        .layer(SetRequestHeaderLayer::overriding(
            HeaderName::from_static("user-agent"),
            HeaderValue::from_static(USER_AGENT),
        ))
        .service(client);

    CosmeticsHttpClient {
        inner: RwLock::new(SyncWrapper::new(service)),
    }
}
