use std::path::PathBuf;

use tracing::info;

use crate::{
    error::LoadError,
    models::{CatalogueDocument, Item},
};

/// Where the games document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueSource {
    /// A JSON file on the local filesystem.
    File(PathBuf),
    /// A JSON document served over HTTP(S).
    Remote(String),
}

impl CatalogueSource {
    /// Interpret a configured source string: URLs go remote, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Remote(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Fetch and parse the document. There is no timeout and no retry.
    pub async fn fetch(&self) -> Result<Vec<Item>, LoadError> {
        let bytes = match self {
            Self::File(path) => {
                info!(path = %path.display(), "reading catalogue");
                tokio::fs::read(path).await.map_err(|err| {
                    LoadError::Unreachable(format!("{}: {err}", path.display()))
                })?
            }
            Self::Remote(url) => {
                info!(%url, "fetching catalogue");
                let response = reqwest::get(url).await?.error_for_status()?;
                response.bytes().await?.to_vec()
            }
        };
        parse_document(&bytes)
    }
}

/// Parse a `{ "games": [...] }` payload.
pub fn parse_document(bytes: &[u8]) -> Result<Vec<Item>, LoadError> {
    let document: CatalogueDocument = serde_json::from_slice(bytes)?;
    Ok(document.games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serve canned responses keyed by request path until the test ends.
    async fn serve(routes: Vec<(&'static str, &'static str, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(route, _, _)| *route == path)
                    .map(|(_, status, body)| (*status, *body))
                    .unwrap_or(("404 Not Found", ""));
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn parses_urls_and_paths() {
        assert_eq!(
            CatalogueSource::parse(" https://example.com/games.json "),
            CatalogueSource::Remote("https://example.com/games.json".to_string())
        );
        assert_eq!(
            CatalogueSource::parse("games.json"),
            CatalogueSource::File(PathBuf::from("games.json"))
        );
    }

    #[tokio::test]
    async fn reads_file_source() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("games.json");
        std::fs::write(
            &path,
            r#"{ "games": [
                { "id": "a", "name": "A", "description": "first", "preview": "a.png" },
                { "id": "b", "name": "B", "description": "second", "preview": "b.png",
                  "url": "https://example.com/b", "tags": ["puzzle"] }
            ] }"#,
        )?;

        let games = CatalogueSource::File(path).fetch().await?;
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].url.as_deref(), Some("https://example.com/b"));
        Ok(())
    }

    #[tokio::test]
    async fn remote_source_maps_status_and_schema_errors() {
        let base = serve(vec![
            ("/bad.json", "200 OK", r#"{ "games": 3 }"#),
            ("/games.json", "200 OK", r#"{ "games": [] }"#),
        ])
        .await;

        let missing = CatalogueSource::parse(&format!("{base}/missing.json"));
        assert!(matches!(missing, CatalogueSource::Remote(_)));
        assert!(matches!(
            missing.fetch().await,
            Err(LoadError::Unreachable(_))
        ));

        let bad = CatalogueSource::parse(&format!("{base}/bad.json"));
        assert!(matches!(bad.fetch().await, Err(LoadError::Malformed(_))));

        let good = CatalogueSource::parse(&format!("{base}/games.json"));
        let games = good.fetch().await.expect("empty catalogue");
        assert!(games.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_unreachable() {
        let dir = tempdir().expect("tempdir");
        let err = CatalogueSource::File(dir.path().join("nope.json"))
            .fetch()
            .await
            .expect_err("missing file");
        assert!(matches!(err, LoadError::Unreachable(_)));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            parse_document(b"not json"),
            Err(LoadError::Malformed(_))
        ));
        assert!(matches!(
            parse_document(br#"{ "items": [] }"#),
            Err(LoadError::Malformed(_))
        ));
        assert!(matches!(
            parse_document(br#"{ "games": [ { "id": "a", "name": "A" } ] }"#),
            Err(LoadError::Malformed(_))
        ));
    }
}
