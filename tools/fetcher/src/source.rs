/*!
 * Where objects come from.  The controller only needs ObjectSource; S3Source
 * is the real implementation, backed by rusoto.
 */

use crate::config::Config;
use crate::error::FetchError;
use crate::request::ObjectId;
use hyper::client::HttpConnector;
use hyper_tls::HttpsConnector;
use rusoto_core::HttpClient;
use rusoto_core::Region;
use rusoto_credential::DefaultCredentialsProvider;
use rusoto_s3::GetObjectRequest;
use rusoto_s3::S3Client;
use rusoto_s3::S3;
use std::str::FromStr;
use tokio::io::AsyncWrite;

#[allow(async_fn_in_trait)]
pub trait ObjectSource {
    /**
     * Copies the whole object (at `object.version`, if given) into `out` and
     * returns the number of bytes copied.
     */
    async fn download<W>(
        &self,
        object: &ObjectId,
        out: &mut W,
    ) -> Result<u64, FetchError>
    where
        W: AsyncWrite + Unpin + ?Sized;
}

pub struct S3Source {
    client: S3Client,
}

impl S3Source {
    pub fn new(config: &Config) -> Result<S3Source, FetchError> {
        let region = resolve_region(&config.region);
        let provider = DefaultCredentialsProvider::new()
            .map_err(|e| FetchError::client("credentials provider", e))?;
        let http_client = if config.no_verify_ssl {
            log::warn!("TLS certificate verification is disabled");
            insecure_http_client()?
        } else {
            HttpClient::new()
                .map_err(|e| FetchError::client("creating HTTP client", e))?
        };
        log::debug!("using region {}", region.name());

        Ok(S3Source {
            client: S3Client::new_with(http_client, provider, region),
        })
    }
}

/*
 * Region names newer than rusoto's built-in list still work: they're treated
 * as custom regions with the standard S3 endpoint.
 */
pub fn resolve_region(name: &str) -> Region {
    Region::from_str(name).unwrap_or_else(|_| Region::Custom {
        name: name.to_string(),
        endpoint: format!("https://s3.{}.amazonaws.com", name),
    })
}

/*
 * The same HTTPS transport rusoto builds by default, except that it accepts
 * any certificate and any host name.
 */
fn insecure_http_client() -> Result<HttpClient, FetchError> {
    let tls = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| FetchError::client("creating TLS connector", e))?;
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    let https = HttpsConnector::from((http, tokio_tls::TlsConnector::from(tls)));
    Ok(HttpClient::from_connector(https))
}

impl ObjectSource for S3Source {
    async fn download<W>(
        &self,
        object: &ObjectId,
        out: &mut W,
    ) -> Result<u64, FetchError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        log::debug!(
            "fetching s3://{}/{} (version {})",
            object.bucket,
            object.key,
            object.version.as_deref().unwrap_or("latest")
        );

        let object_output = self
            .client
            .get_object(GetObjectRequest {
                bucket: object.bucket.clone(),
                key: object.key.clone(),
                version_id: object.version.clone(),
                ..Default::default()
            })
            .await
            .map_err(|e| FetchError::transfer(&object.key, e))?;

        let body = object_output
            .body
            .ok_or_else(|| FetchError::transfer(&object.key, "object missing body"))?;
        tokio::io::copy(&mut body.into_async_read(), out)
            .await
            .map_err(|e| FetchError::transfer(&object.key, e))
    }
}
