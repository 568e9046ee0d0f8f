use backoff::{future::retry, ExponentialBackoffBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{ApiError, Error, Result};

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Client is a wrapper around `reqwest::Client` which provides automatically
/// prepending the base url.
#[derive(Debug, Clone)]
pub(crate) struct Client {
    base_url: Url,
    inner: reqwest::Client,
}

impl Client {
    /// Creates a new client.
    pub(crate) fn new<U>(base_url: U) -> Result<Self>
    where
        U: AsRef<str>,
    {
        let base_url = Url::parse(base_url.as_ref()).map_err(Error::InvalidUrl)?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(Error::HttpClientSetup)?;

        Ok(Self {
            base_url,
            inner: http_client,
        })
    }

    async fn execute<P>(
        &self,
        method: http::Method,
        path: P,
        body: serde_json::Value,
    ) -> Result<Response>
    where
        P: AsRef<str>,
    {
        let url = self
            .base_url
            .join(path.as_ref().trim_start_matches('/'))
            .map_err(Error::InvalidUrl)?;

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500)) // first retry after 500ms
            .with_multiplier(2.0) // all following retries are twice as long as the previous one
            .with_max_elapsed_time(Some(Duration::from_secs(5))) // a login attempt is interactive, give up quickly
            .build();

        let res = retry(backoff, || async {
            let req = self
                .inner
                .request(method.clone(), url.clone())
                .json(&body);
            self.inner.execute(req.build()?).await.map_err(|e| {
                if e.is_connect() {
                    // The endpoint refuses connections, more attempts within
                    // one credential exchange won't change that.
                    return backoff::Error::permanent(e);
                }
                if let Some(status) = e.status() {
                    if status.is_client_error() {
                        // Don't retry 4XX
                        return backoff::Error::permanent(e);
                    }
                }

                backoff::Error::transient(e)
            })
        })
        .await
        .map(|res| Response::new(res, method, path.as_ref().to_string()))
        .map_err(Error::ServiceUnreachable)?;

        Ok(res)
    }

    pub(crate) async fn post<S, P>(&self, path: S, payload: P) -> Result<Response>
    where
        S: AsRef<str>,
        P: Serialize,
    {
        self.execute(http::Method::POST, path, serde_json::to_value(payload)?)
            .await
    }
}

#[derive(Debug)]
pub(crate) struct Response {
    inner: reqwest::Response,
    method: http::Method,
    path: String,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response, method: http::Method, path: String) -> Self {
        Self {
            inner,
            method,
            path,
        }
    }

    pub(crate) async fn json<T: DeserializeOwned>(self) -> Result<T> {
        self.check_error()
            .await?
            .inner
            .json::<T>()
            .await
            .map_err(Error::Deserialize)
    }

    pub(crate) async fn check_error(self) -> Result<Response> {
        let status = self.inner.status();
        if !status.is_success() {
            // Any non-success reply on a credential exchange is a rejection.
            // Try to decode the error payload for diagnostics.
            let e = match self.inner.json::<ApiError>().await {
                Ok(mut e) => {
                    e.status = status.as_u16();
                    e.method = self.method;
                    e.path = self.path;
                    Error::AuthRejected(e)
                }
                Err(_e) => {
                    // Decoding failed, we still want an ApiError
                    Error::AuthRejected(ApiError::new(
                        status.as_u16(),
                        self.method,
                        self.path,
                        None,
                    ))
                }
            };
            return Err(e);
        }

        Ok(self)
    }
}
