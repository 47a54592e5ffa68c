//! Cookie-authenticated HTTP fetches, independent of the browser session.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use rcloud_common::protocol::SessionCookies;
use reqwest::header::COOKIE;
use url::Url;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransferError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for TransferError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TransferError::Status(status.as_u16()),
            None => TransferError::Transport(e.to_string()),
        }
    }
}

pub struct FetchResponse {
    /// Value of the `Content-Length` header, when the server sent one.
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, Result<Vec<u8>, TransferError>>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, cookies: &SessionCookies)
    -> Result<FetchResponse, TransferError>;
}

/// `reqwest`-backed fetcher. Each call is a fresh, stateless request.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        cookies: &SessionCookies,
    ) -> Result<FetchResponse, TransferError> {
        let mut request = self.client.get(url.clone());
        if let Some(header) = cookies.header_value() {
            request = request.header(COOKIE, header);
        }

        let response = request.send().await?.error_for_status()?;
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(TransferError::from))
            .boxed();

        Ok(FetchResponse {
            content_length,
            body,
        })
    }
}
