//! Binary downloads as chunk streams.
//!
//! The body is never buffered here; the app-layer tracker consumes the
//! chunks, reports progress and hands the assembled bytes to a sink.

use std::fmt;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;

use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::api::MarketplaceApi;
use crate::error::ApiError;

/// An open download: headers already checked, body not yet read.
pub struct ByteStream {
    /// Declared `Content-Length`, if the server sent one.
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub chunks: BoxStream<'static, Result<Vec<u8>, ApiError>>,
}

impl ByteStream {
    /// Wrap an arbitrary chunk stream, e.g. one built in tests.
    pub fn new(
        content_length: Option<u64>,
        content_type: Option<String>,
        chunks: BoxStream<'static, Result<Vec<u8>, ApiError>>,
    ) -> Self {
        Self {
            content_length,
            content_type,
            chunks,
        }
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl MarketplaceApi {
    /// Start downloading a purchased or free sound.
    pub async fn download_sound(&self, token: &BearerToken, id: DbId) -> Result<ByteStream, ApiError> {
        tracing::info!(sound_id = id, "Opening sound download");
        Self::open_stream(self.download_sound_request(token, id)).await
    }

    fn download_sound_request(&self, token: &BearerToken, id: DbId) -> RequestBuilder {
        self.post(&format!("/api/sounds/{id}/download"), Some(token))
    }

    /// Send the request and expose the body as a stream of chunks.
    pub(crate) async fn open_stream(builder: RequestBuilder) -> Result<ByteStream, ApiError> {
        let response = Self::ensure_success(builder.send().await?).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();

        let chunks = response
            .bytes_stream()
            .map_ok(|bytes| bytes.to_vec())
            .map_err(ApiError::from)
            .boxed();

        Ok(ByteStream {
            content_length,
            content_type,
            chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use crate::api::tests::api;

    use super::*;

    #[test]
    fn download_is_an_authenticated_post() {
        let token = BearerToken::new("tok");
        let req = api().download_sound_request(&token, 12).build().unwrap();
        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().path(), "/api/sounds/12/download");
        assert!(req.headers().contains_key(reqwest::header::AUTHORIZATION));
    }

    #[tokio::test]
    async fn debug_omits_chunks() {
        let mut s = ByteStream::new(
            Some(3),
            Some("audio/mpeg".into()),
            stream::iter(vec![Ok(vec![1u8, 2, 3])]).boxed(),
        );
        let rendered = format!("{s:?}");
        assert!(rendered.contains("content_length: Some(3)"));
        assert_eq!(s.chunks.next().await.unwrap().unwrap(), vec![1, 2, 3]);
    }
}
