use super::DavError;
use crate::config::Config;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};

/// PROPFIND body asking only for the content type of each child
const PROPFIND_CONTENT_TYPE: &str = r#"<?xml version="1.0"?>
<d:propfind xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">
    <d:prop>
        <d:getcontenttype />
    </d:prop>
</d:propfind>"#;

/// Raw reply to a listing request
#[derive(Debug)]
pub struct DavResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Fully buffered image body plus the content type the server declared
#[derive(Debug)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Client bound to one album collection on the DAV server
pub struct DavClient {
    client: Client,
    album_url: String,
    username: String,
    password: String,
    max_body_bytes: u64,
    propfind: Method,
}

impl DavClient {
    pub fn new(config: &Config) -> Result<Self, DavError> {
        let client = Client::builder()
            .timeout(config.remote_timeout)
            .user_agent(concat!("albumd/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            album_url: album_url(&config.nextcloud_url, &config.username, &config.album),
            username: config.username.clone(),
            password: config.password.clone(),
            max_body_bytes: config.max_image_bytes,
            propfind: Method::from_bytes(b"PROPFIND").map_err(|_| DavError::InvalidMethod("PROPFIND"))?,
        })
    }

    fn url_for(&self, relative: &str) -> String {
        format!("{}{}", self.album_url, relative.trim_start_matches('/'))
    }

    /// Depth-1 PROPFIND on the album collection
    pub async fn list(&self) -> Result<DavResponse, DavError> {
        tracing::debug!(url = %self.album_url, "PROPFIND album");

        let resp = self
            .client
            .request(self.propfind.clone(), &self.album_url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Depth", "1")
            .header(CONTENT_TYPE, "application/xml")
            .body(PROPFIND_CONTENT_TYPE)
            .send()
            .await?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "PROPFIND reply");
        Ok(DavResponse { status, headers, body })
    }

    /// GET an item relative to the album root, buffering the whole body.
    ///
    /// The declared content type must start with `expected`; otherwise the
    /// body is never read.
    pub async fn fetch(&self, relative: &str, expected: &'static str) -> Result<FetchedImage, DavError> {
        let url = self.url_for(relative);
        tracing::debug!(url = %url, "GET album item");

        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(DavError::Status(resp.status()));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.starts_with(expected) {
            return Err(DavError::ContentType {
                expected,
                found: content_type,
            });
        }

        if let Some(len) = resp.content_length() {
            if len > self.max_body_bytes {
                return Err(DavError::BodyTooLarge { limit: self.max_body_bytes });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            bytes.extend_from_slice(&chunk);
            if bytes.len() as u64 > self.max_body_bytes {
                return Err(DavError::BodyTooLarge { limit: self.max_body_bytes });
            }
        }

        Ok(FetchedImage { bytes, content_type })
    }
}

/// `<base>/remote.php/dav/photos/<user>/albums/<album>/`
pub fn album_url(base: &str, username: &str, album: &str) -> String {
    format!(
        "{}/remote.php/dav/photos/{}/albums/{}/",
        base.trim_end_matches('/'),
        urlencoding::encode(username),
        urlencoding::encode(album)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const ALBUM_PATH: &str = "/remote.php/dav/photos/alice/albums/summer-2024/";

    #[test]
    fn test_album_url_encodes_user_and_album() {
        let url = album_url("https://cloud.example.com/", "jo doe@home", "Summer Trip/2024");
        assert_eq!(
            url,
            "https://cloud.example.com/remote.php/dav/photos/jo%20doe%40home/albums/Summer%20Trip%2F2024/"
        );
    }

    #[tokio::test]
    async fn test_list_sends_depth_one_propfind() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PROPFIND", ALBUM_PATH)
            .match_header("depth", "1")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .match_body(Matcher::Regex("getcontenttype".to_string()))
            .with_status(207)
            .with_body("<d:multistatus xmlns:d=\"DAV:\"/>")
            .create_async()
            .await;

        let client = DavClient::new(&Config::for_test(&server.url())).unwrap();
        let resp = client.list().await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.status.as_u16(), 207);
        assert!(resp.body.contains("multistatus"));
    }

    #[tokio::test]
    async fn test_fetch_buffers_body_and_content_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/remote.php/dav/photos/alice/albums/summer-2024/photo1.jpg")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(vec![0xFFu8, 0xD8, 0xFF, 0xE0])
            .create_async()
            .await;

        let client = DavClient::new(&Config::for_test(&server.url())).unwrap();
        let image = client.fetch("photo1.jpg", "image/jpeg").await.unwrap();

        mock.assert_async().await;
        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(image.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/remote.php/dav/photos/alice/albums/summer-2024/big.jpg")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(vec![0u8; 4096])
            .create_async()
            .await;

        let mut config = Config::for_test(&server.url());
        config.max_image_bytes = 1024;
        let client = DavClient::new(&config).unwrap();

        let err = client.fetch("big.jpg", "image/jpeg").await.unwrap_err();
        assert!(matches!(err, DavError::BodyTooLarge { limit: 1024 }));
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/remote.php/dav/photos/alice/albums/summer-2024/gone.jpg")
            .with_status(404)
            .create_async()
            .await;

        let client = DavClient::new(&Config::for_test(&server.url())).unwrap();
        let err = client.fetch("gone.jpg", "image/jpeg").await.unwrap_err();
        assert!(matches!(err, DavError::Status(s) if s.as_u16() == 404));
    }

    #[tokio::test]
    async fn test_fetch_rejects_content_type_before_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/remote.php/dav/photos/alice/albums/summer-2024/page.jpg")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(vec![b'x'; 4096])
            .create_async()
            .await;

        let mut config = Config::for_test(&server.url());
        config.max_image_bytes = 1024;
        let client = DavClient::new(&config).unwrap();

        // Oversized too, but the content type is checked first
        let err = client.fetch("page.jpg", "image/jpeg").await.unwrap_err();
        assert!(matches!(err, DavError::ContentType { ref found, .. } if found == "text/html"));
    }
}
