//! HTTP fetcher used to pull page content for similarity hashing. Handles
//! gzip bodies by magic-byte detection (transparent decompression is off
//! because we pin `Accept-Encoding` ourselves), follows server redirects, and
//! chases at most one client-side meta-refresh hop.

use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::header;

use crate::constants::{CSS_URL_REGEX, HTML_ATTR_REGEX, META_REFRESH_REGEX};
use crate::error::Error;

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

#[derive(Debug)]
pub struct FetchedPage {
    pub status: u16,
    pub headers: header::HeaderMap,
    /// URL after server redirects; the meta-refresh hop updates it too.
    pub url: String,
    pub content: Vec<u8>,
    /// Content with volatile page noise stripped, fed to the LSH digests.
    pub normalized: Vec<u8>,
}

pub async fn fetch(
    url: &str,
    timeout: Duration,
    user_agent: &str,
    verify_tls: bool,
) -> Result<FetchedPage, Error> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10));
    if !verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }
    let client = builder.build()?;

    let mut target = url.to_string();
    let mut meta_hops = 0usize;

    loop {
        let response = client
            .get(&target)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9")
            .header(header::ACCEPT_ENCODING, "gzip,identity")
            .header(header::ACCEPT_LANGUAGE, "en-GB,en-US;q=0.9,en;q=0.8")
            .header(header::USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();

        let mut content = response.bytes().await?.to_vec();
        if content.starts_with(&GZIP_MAGIC) {
            content = gunzip(&content)?;
        }

        // Small interstitial pages frequently carry nothing but a meta
        // refresh to the real page; follow it once.
        if meta_hops == 0 && content.len() > 64 && content.len() < 1024 {
            if let Some(captures) = META_REFRESH_REGEX.captures(&content) {
                target = String::from_utf8_lossy(&captures[1]).into_owned();
                meta_hops += 1;
                continue;
            }
        }

        let normalized = normalize(&content);

        return Ok(FetchedPage {
            status,
            headers,
            url: final_url,
            content,
            normalized,
        });
    }
}

fn gunzip(content: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = GzDecoder::new(content);
    let mut decoded = Vec::new();
    decoder
        .read_to_end(&mut decoded)
        .map_err(|err| Error::Network(format!("gzip decode failed: {err}")))?;
    Ok(decoded)
}

/// Collapse whitespace runs and blank out attribute values that vary per
/// request (`action`/`src`/`href`, CSS `url(..)`), so two renderings of the
/// same page hash alike.
pub fn normalize(content: &[u8]) -> Vec<u8> {
    let collapsed = content
        .split(|byte| byte.is_ascii_whitespace())
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<&[u8]>>()
        .join(&b' ');

    let stripped = HTML_ATTR_REGEX.replace_all(&collapsed, &b"$1=\"\""[..]);
    CSS_URL_REGEX.replace_all(&stripped, &b"url()"[..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        let normalized = normalize(b"<html>\n\n  <body>   hi\t</body>\n</html>");
        assert_eq!(normalized, b"<html> <body> hi </body> </html>".to_vec());
    }

    #[test]
    fn test_normalize_blanks_varying_attributes() {
        let normalized = normalize(br#"<a href="/session/4f2a">x</a>"#);
        assert_eq!(normalized, br#"<a href="">x</a>"#.to_vec());

        let normalized = normalize(br#"<img src="/img?v=123">"#);
        assert!(normalized.windows(6).any(|w| w == br#"src="""#));
    }

    #[test]
    fn test_normalize_blanks_css_urls() {
        let normalized = normalize(b"body { background: url(/bg.png?cache=9) }");
        assert_eq!(normalized, b"body { background: url() }".to_vec());
    }

    #[test]
    fn test_gunzip_round_trip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello world").unwrap();
        let compressed = encoder.finish().unwrap();

        assert!(compressed.starts_with(&GZIP_MAGIC));
        assert_eq!(gunzip(&compressed).unwrap(), b"hello world".to_vec());
    }

    #[test]
    fn test_meta_refresh_regex_extracts_target() {
        let body = br#"<html><meta http-equiv="refresh" content="0; url=https://example.com/landing""#;
        let captures = META_REFRESH_REGEX.captures(body).unwrap();
        assert_eq!(&captures[1], b"https://example.com/landing");
    }
}
