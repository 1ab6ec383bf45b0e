//! Minimal WHOIS client: query TCP/43, chase `refer:` referrals, extract the
//! registrar and creation date by pattern. Runs as a sequential post-pass
//! over registered candidates only, so simplicity beats throughput here.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::constants::{
    WHOIS_CREATED_REGEX, WHOIS_DATE_FORMATS, WHOIS_IANA, WHOIS_REFER_REGEX,
    WHOIS_REGISTRAR_REGEX, WHOIS_TIMEOUT, WHOIS_TLD_SERVERS,
};
use crate::domain;

const MAX_REFERRALS: usize = 4;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WhoisInfo {
    pub registrar: Option<String>,
    pub created: Option<NaiveDate>,
}

pub struct WhoisClient {
    /// Referral targets learned at runtime, keyed by TLD. Shared across the
    /// whole pass so each registry is discovered once.
    learned: Mutex<HashMap<String, String>>,
}

impl Default for WhoisClient {
    fn default() -> Self {
        WhoisClient::new()
    }
}

impl WhoisClient {
    pub fn new() -> WhoisClient {
        WhoisClient {
            learned: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lookup(&self, fqdn: &str) -> WhoisInfo {
        match self.query(fqdn).await {
            Some(response) => extract(&response),
            None => WhoisInfo::default(),
        }
    }

    fn initial_server(&self, tld: &str) -> String {
        if let Some(server) = self.learned.lock().unwrap().get(tld) {
            return server.clone();
        }
        WHOIS_TLD_SERVERS
            .get(tld)
            .copied()
            .unwrap_or(WHOIS_IANA)
            .to_string()
    }

    async fn query(&self, fqdn: &str) -> Option<String> {
        let tld = domain::split(fqdn).tld;
        let mut server = self.initial_server(&tld);

        for _ in 0..=MAX_REFERRALS {
            let response = raw_query(&server, fqdn).await?;

            if let Some(captures) = WHOIS_REFER_REGEX.captures(&response) {
                let refer = captures[1].to_lowercase();
                if refer != server {
                    debug!(tld = %tld, server = %refer, "memoising whois referral");
                    self.learned
                        .lock()
                        .unwrap()
                        .entry(tld.clone())
                        .or_insert_with(|| refer.clone());
                    server = refer;
                    continue;
                }
            }

            return Some(response);
        }

        None
    }
}

/// One query with the whole exchange under the 2-second budget.
async fn raw_query(server: &str, fqdn: &str) -> Option<String> {
    let exchange = async {
        let mut stream = TcpStream::connect((server, 43)).await.ok()?;
        stream
            .write_all(format!("{fqdn}\r\n").as_bytes())
            .await
            .ok()?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.ok()?;
        Some(String::from_utf8_lossy(&response).into_owned())
    };

    timeout(WHOIS_TIMEOUT, exchange).await.ok().flatten()
}

/// Strip `%` comment lines, then pull out registrar and creation date.
fn extract(response: &str) -> WhoisInfo {
    let reduced: String = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('%'))
        .collect::<Vec<&str>>()
        .join("\r\n");

    let registrar = WHOIS_REGISTRAR_REGEX
        .captures(&reduced)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string());

    let created = WHOIS_CREATED_REGEX
        .captures(&reduced)
        .and_then(|captures| captures.get(1))
        .and_then(|m| brute_parse_date(m.as_str().trim()));

    WhoisInfo { registrar, created }
}

/// Try each known date layout in order; first hit wins.
fn brute_parse_date(value: &str) -> Option<NaiveDate> {
    for format in WHOIS_DATE_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
        if let Ok(datetime) = DateTime::parse_from_str(value, format) {
            return Some(datetime.date_naive());
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_registrar_and_date() {
        let response = "% Terms of use apply\r\n\
                        Domain Name: EXAMPLE.COM\r\n\
                        Registrar: Example Registrar, LLC\r\n\
                        Creation Date: 1995-08-14T04:00:00Z\r\n";
        let info = extract(response);

        assert_eq!(info.registrar.as_deref(), Some("Example Registrar, LLC"));
        assert_eq!(info.created.unwrap().to_string(), "1995-08-14");
    }

    #[test]
    fn test_extract_ignores_comment_lines() {
        let response = "% registrar: not this one\r\nstatus: active\r\n";
        let info = extract(response);
        assert_eq!(info.registrar, None);
    }

    #[test]
    fn test_extract_registrar_name_prefix_form() {
        let info = extract("registrar: name: Tucows Inc.\r\n");
        assert_eq!(info.registrar.as_deref(), Some("Tucows Inc."));
    }

    #[test]
    fn test_brute_parse_date_formats() {
        // Every value here reformats to plain ISO dates (partial-function
        // round trip).
        let cases = [
            ("1997-09-15T04:00:00Z", "1997-09-15"),
            ("2003-02-05 09:30", "2003-02-05"),
            ("2003.02.05 09:30:15", "2003-02-05"),
            ("05.02.2003 09:30:15", "2003-02-05"),
            ("14-Aug-1995", "1995-08-14"),
            ("1995-08-14", "1995-08-14"),
        ];

        for (input, expected) in cases {
            let parsed = brute_parse_date(input)
                .unwrap_or_else(|| panic!("failed to parse {input}"));
            assert_eq!(parsed.to_string(), expected);
        }
    }

    #[test]
    fn test_brute_parse_date_rejects_garbage() {
        assert_eq!(brute_parse_date("before records began"), None);
        assert_eq!(brute_parse_date(""), None);
    }

    #[test]
    fn test_initial_server_prefers_static_map_then_iana() {
        let client = WhoisClient::new();
        assert_eq!(client.initial_server("com"), "whois.verisign-grs.com");
        assert_eq!(client.initial_server("zz"), WHOIS_IANA);

        client
            .learned
            .lock()
            .unwrap()
            .insert("zz".to_string(), "whois.nic.zz".to_string());
        assert_eq!(client.initial_server("zz"), "whois.nic.zz");
    }
}
