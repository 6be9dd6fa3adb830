//! Shared HTTP plumbing for the keyserver and the verification service.

use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use hyper::{Body, Client, Method, Request, StatusCode};
use hyper_tls::HttpsConnector;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Result;

/// A plain response: status and fully buffered body.
#[derive(Debug)]
pub(crate) struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Response {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Client speaking both `http` and `https`.
#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Client<HttpsConnector<HttpConnector>>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder().build(HttpsConnector::new()),
        }
    }

    pub async fn get(&self, url: &Url) -> Result<Response> {
        debug!(%url, "GET");
        let res = self.client.get(url2uri(url)?).await?;
        let status = res.status();
        let body = hyper::body::to_bytes(res.into_body()).await?;
        Ok(Response { status, body })
    }

    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &Url, payload: &T) -> Result<Response> {
        debug!(%url, "POST");
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(url2uri(url)?)
            .body(Body::from(serde_json::to_vec(payload)?))?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        let res = self.client.request(request).await?;
        let status = res.status();
        let body = hyper::body::to_bytes(res.into_body()).await?;
        Ok(Response { status, body })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

pub(crate) fn url2uri(url: &Url) -> Result<hyper::Uri> {
    Ok(url.as_str().parse()?)
}

/// Appends `segment` to the path of `base`, keeping whatever path it already has.
pub(crate) fn join_path(base: &Url, segment: &str) -> Result<Url> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), segment);
    Ok(Url::parse(&joined)?)
}
