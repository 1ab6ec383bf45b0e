//! The per-candidate probe state machine. Each worker owns its DNS client,
//! optional GeoIP reader and optional browser, pulls candidates from a shared
//! closed queue, runs the ordered probe sequence with its gating rules, and
//! hands the enriched candidate back over a channel.
//!
//! Probe order and gating: NS decides everything (ServFail or NXDOMAIN ends
//! the candidate), A/AAAA follow, MX only after a usable NS answer, and the
//! expensive probes (banners, screenshots, content hashing) only run against
//! candidates that resolved.

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::browser::{HeadlessBrowser, PageRenderer};
use crate::candidate::Candidate;
use crate::constants::{
    BANNER_RECV_BYTES, DNS_TIMEOUT, HTTP_TIMEOUT, MXSPY_RECV_BYTES, PHASH_SIZE, SMTP_TIMEOUT,
};
use crate::fetch;
use crate::geoip::{extract_country, GeoIp};
use crate::lsh::{LshDigest, LshKind};
use crate::phash::PHash;
use crate::urlparse::UrlTarget;

pub const SERVFAIL_MARKER: &str = "!ServFail";

/// Shared, pre-filled and therefore already-closed FIFO of work.
pub type JobQueue = Arc<Mutex<VecDeque<Candidate>>>;

/// Everything a worker needs to know about the run. Built once by the driver
/// and shared read-only.
pub struct ScanOptions {
    /// Use the explicit DNS client with NS/MX probes and rcode handling;
    /// otherwise fall back to the system resolver (addresses only).
    pub ext_dns: bool,
    pub geoip: bool,
    pub banners: bool,
    pub mx_check: bool,
    pub lsh: Option<LshKind>,
    pub lsh_seed: Option<LshSeed>,
    pub phash: bool,
    pub phash_seed: Option<PHash>,
    pub screenshot_dir: Option<PathBuf>,
    pub nameservers: Vec<IpAddr>,
    pub user_agent: String,
}

/// Seed-page digest plus the URL it effectively came from; candidates whose
/// final URL collapses onto it are skipped (comparing a page to itself says
/// nothing).
pub struct LshSeed {
    pub digest: LshDigest,
    pub effective_url: String,
}

pub struct Scanner {
    pub id: u32,
    target: Arc<UrlTarget>,
    options: Arc<ScanOptions>,
    stopped: Arc<AtomicBool>,
}

enum DnsAnswer {
    Records(Vec<String>),
    Empty,
    NxDomain,
    ServFail,
}

impl Scanner {
    pub fn new(
        id: u32,
        target: Arc<UrlTarget>,
        options: Arc<ScanOptions>,
        stopped: Arc<AtomicBool>,
    ) -> Scanner {
        Scanner {
            id,
            target,
            options,
            stopped,
        }
    }

    /// Worker loop: check the stop flag, pull the next candidate, enrich it,
    /// send it back. The in-flight candidate is always finished before the
    /// flag is honoured.
    pub async fn run(self, jobs: JobQueue, results: mpsc::Sender<Candidate>) {
        let resolver = if self.options.ext_dns {
            Some(build_resolver(&self.options.nameservers))
        } else {
            None
        };

        let geoip = if self.options.geoip {
            match GeoIp::open() {
                Ok(reader) => Some(reader),
                Err(err) => {
                    warn!(worker = self.id, "geoip disabled: {err}");
                    None
                }
            }
        } else {
            None
        };

        let browser = if self.options.phash || self.options.screenshot_dir.is_some() {
            match HeadlessBrowser::launch(&self.options.user_agent) {
                Ok(browser) => Some(browser),
                Err(err) => {
                    warn!(worker = self.id, "browser disabled: {err}");
                    None
                }
            }
        } else {
            None
        };

        while !self.stopped.load(Ordering::SeqCst) {
            let job = jobs.lock().unwrap().pop_front();
            let Some(mut candidate) = job else { break };

            self.scan(&mut candidate, resolver.as_ref(), geoip.as_ref(), browser.as_ref())
                .await;

            if results.send(candidate).await.is_err() {
                break;
            }
        }
    }

    async fn scan(
        &self,
        task: &mut Candidate,
        resolver: Option<&TokioAsyncResolver>,
        geoip: Option<&GeoIp>,
        browser: Option<&HeadlessBrowser>,
    ) {
        let domain = task.domain.clone();
        let mut has_a = false;
        let mut has_aaaa = false;
        let mut has_mx = false;

        if let Some(resolver) = resolver {
            let mut ns_ok = false;

            match query_dns(resolver, &domain, RecordType::NS).await {
                DnsAnswer::ServFail => {
                    // A resolver that fails on NS will fail on everything
                    // else; record the marker and end this candidate.
                    task.dns_ns = vec![SERVFAIL_MARKER.to_string()];
                    return;
                }
                DnsAnswer::NxDomain => return,
                DnsAnswer::Records(records) => {
                    task.dns_ns = records;
                    ns_ok = true;
                }
                DnsAnswer::Empty => ns_ok = true,
            }

            match query_dns(resolver, &domain, RecordType::A).await {
                DnsAnswer::ServFail => task.dns_a = vec![SERVFAIL_MARKER.to_string()],
                DnsAnswer::Records(records) => {
                    task.dns_a = records;
                    has_a = true;
                }
                DnsAnswer::Empty | DnsAnswer::NxDomain => {}
            }

            match query_dns(resolver, &domain, RecordType::AAAA).await {
                DnsAnswer::ServFail => task.dns_aaaa = vec![SERVFAIL_MARKER.to_string()],
                DnsAnswer::Records(records) => {
                    task.dns_aaaa = records;
                    has_aaaa = true;
                }
                DnsAnswer::Empty | DnsAnswer::NxDomain => {}
            }

            if ns_ok {
                match query_dns(resolver, &domain, RecordType::MX).await {
                    DnsAnswer::ServFail => task.dns_mx = vec![SERVFAIL_MARKER.to_string()],
                    DnsAnswer::Records(records) => {
                        task.dns_mx = records;
                        has_mx = true;
                    }
                    DnsAnswer::Empty | DnsAnswer::NxDomain => {}
                }
            }

            if self.options.mx_check && has_mx && domain != self.target.domain {
                let mx_host = task.dns_mx[0].clone();
                if mx_spy(&mx_host, &self.target.domain, &domain).await {
                    debug!(domain = %domain, mx = %mx_host, "mx accepts arbitrary recipients");
                    task.mx_spy = true;
                }
            }
        } else {
            // System resolver path: addresses only, no rcode distinctions.
            if let Ok(addrs) = tokio::net::lookup_host((domain.as_str(), 0)).await {
                let mut ipv4 = Vec::new();
                let mut ipv6 = Vec::new();
                for addr in addrs {
                    match addr.ip() {
                        IpAddr::V4(ip) => ipv4.push(ip.to_string()),
                        IpAddr::V6(ip) => ipv6.push(ip.to_string()),
                    }
                }
                ipv4.sort();
                ipv4.dedup();
                ipv6.sort();
                ipv6.dedup();

                if !ipv4.is_empty() {
                    task.dns_a = ipv4;
                    has_a = true;
                }
                if !ipv6.is_empty() {
                    task.dns_aaaa = ipv6;
                    has_aaaa = true;
                }
            }
        }

        if self.options.geoip && has_a {
            if let Some(geoip) = geoip {
                if let Some(country) = geoip.country_by_addr(&task.dns_a[0]) {
                    if !country.is_empty() {
                        task.geoip = Some(extract_country(&country));
                    }
                }
            }
        }

        if self.options.banners {
            if has_a {
                task.banner_http =
                    banner_http(&task.dns_a[0], &domain, &self.options.user_agent).await;
            }
            if has_mx {
                task.banner_smtp = banner_smtp(&task.dns_mx[0]).await;
            }
        }

        if (self.options.phash || self.options.screenshot_dir.is_some())
            && (has_a || has_aaaa)
        {
            if let Some(browser) = browser {
                self.screenshot_probe(task, &domain, browser).await;
            }
        }

        if let (Some(kind), Some(seed)) = (self.options.lsh, self.options.lsh_seed.as_ref()) {
            if has_a || has_aaaa {
                self.lsh_probe(task, &domain, kind, seed).await;
            }
        }
    }

    async fn screenshot_probe(&self, task: &mut Candidate, domain: &str, browser: &HeadlessBrowser) {
        let url = self.target.full_uri(Some(domain));

        // headless_chrome drives the browser synchronously.
        let rendered = tokio::task::block_in_place(|| browser.render(&url));
        let screenshot = match rendered {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(domain = %domain, "screenshot failed: {err}");
                return;
            }
        };

        if self.options.phash {
            if let Some(seed) = &self.options.phash_seed {
                if let Ok(hash) = PHash::from_image_bytes(&screenshot, PHASH_SIZE) {
                    task.phash = Some(seed.similarity(&hash));
                }
            }
        }

        if let Some(dir) = &self.options.screenshot_dir {
            let filename = dir.join(format!("{:08x}_{domain}.png", self.id));
            if let Err(err) = tokio::fs::write(&filename, &screenshot).await {
                debug!(domain = %domain, "screenshot not saved: {err}");
            }
        }
    }

    async fn lsh_probe(&self, task: &mut Candidate, domain: &str, kind: LshKind, seed: &LshSeed) {
        let url = self.target.full_uri(Some(domain));

        let page = match fetch::fetch(&url, HTTP_TIMEOUT, &self.options.user_agent, false).await {
            Ok(page) => page,
            Err(err) => {
                debug!(domain = %domain, "content fetch failed: {err}");
                return;
            }
        };

        // A candidate that redirects onto the seed page would trivially score
        // 100; that comparison carries no signal.
        let effective = page.url.split('?').next().unwrap_or(&page.url);
        if effective == seed.effective_url {
            return;
        }

        if let Some(digest) = LshDigest::hash(kind, &page.normalized) {
            if let Some(score) = seed.digest.compare(&digest) {
                match kind {
                    LshKind::Ssdeep => task.ssdeep = Some(score),
                    LshKind::Tlsh => task.tlsh = Some(score),
                }
            }
        }
    }
}

fn build_resolver(nameservers: &[IpAddr]) -> TokioAsyncResolver {
    let mut opts = ResolverOpts::default();
    opts.timeout = DNS_TIMEOUT;

    if !nameservers.is_empty() {
        let mut config = ResolverConfig::new();
        for ip in nameservers {
            config.add_name_server(NameServerConfig::new(
                SocketAddr::new(*ip, 53),
                Protocol::Udp,
            ));
        }
        return TokioAsyncResolver::tokio(config, opts);
    }

    match hickory_resolver::system_conf::read_system_conf() {
        Ok((config, mut system_opts)) => {
            system_opts.timeout = DNS_TIMEOUT;
            TokioAsyncResolver::tokio(config, system_opts)
        }
        Err(_) => {
            let mut config = ResolverConfig::new();
            config.add_name_server(NameServerConfig::new(
                SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 53),
                Protocol::Udp,
            ));
            TokioAsyncResolver::tokio(config, opts)
        }
    }
}

async fn query_dns(resolver: &TokioAsyncResolver, domain: &str, qtype: RecordType) -> DnsAnswer {
    // Trailing dot: query the name as-is, never through search suffixes.
    let name = format!("{domain}.");
    let lookup = match resolver.lookup(name.as_str(), qtype).await {
        Ok(lookup) => lookup,
        Err(err) => return classify_error(&err),
    };

    let mut records: Vec<String> = lookup
        .iter()
        .filter_map(|rdata| match rdata {
            RData::A(a) => Some(a.0.to_string()),
            RData::AAAA(aaaa) => Some(aaaa.0.to_string()),
            RData::NS(ns) => Some(ns.0.to_utf8().trim_end_matches('.').to_string()),
            RData::MX(mx) => Some(mx.exchange().to_utf8().trim_end_matches('.').to_string()),
            _ => None,
        })
        .collect();

    if records.is_empty() {
        return DnsAnswer::Empty;
    }

    records.sort();
    DnsAnswer::Records(records)
}

fn classify_error(err: &ResolveError) -> DnsAnswer {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match response_code {
            ResponseCode::NXDomain => DnsAnswer::NxDomain,
            ResponseCode::ServFail => DnsAnswer::ServFail,
            _ => DnsAnswer::Empty,
        },
        _ => DnsAnswer::ServFail,
    }
}

/// Open a TCP connection, optionally send a payload, read one bounded
/// response. The budget covers the whole exchange; every exit path closes the
/// socket.
async fn send_recv_tcp(
    host: &str,
    port: u16,
    payload: Option<&[u8]>,
    budget: std::time::Duration,
    cap: usize,
) -> Option<String> {
    let exchange = async {
        let mut stream = TcpStream::connect((host, port)).await.ok()?;
        if let Some(data) = payload {
            stream.write_all(data).await.ok()?;
        }

        let mut buffer = vec![0u8; cap];
        let read = stream.read(&mut buffer).await.ok()?;
        Some(String::from_utf8_lossy(&buffer[..read]).into_owned())
    };

    timeout(budget, exchange).await.ok().flatten()
}

async fn banner_http(ip: &str, vhost: &str, user_agent: &str) -> Option<String> {
    let request =
        format!("HEAD / HTTP/1.1\r\nHost: {vhost}\r\nUser-Agent: {user_agent}\r\n\r\n");
    let response =
        send_recv_tcp(ip, 80, Some(request.as_bytes()), HTTP_TIMEOUT, BANNER_RECV_BYTES).await?;

    response
        .lines()
        .find(|line| line.to_ascii_lowercase().starts_with("server: "))
        .map(|line| line["server: ".len()..].trim().to_string())
        .filter(|banner| !banner.is_empty())
}

async fn banner_smtp(mx: &str) -> Option<String> {
    let response = send_recv_tcp(mx, 25, None, SMTP_TIMEOUT, BANNER_RECV_BYTES).await?;

    let greeting = response.lines().next()?.trim();
    if !greeting.starts_with("220") {
        return None;
    }

    greeting
        .get("220 ".len()..)
        .map(|rest| rest.trim().to_string())
        .filter(|banner| !banner.is_empty())
}

/// Walk an SMTP dialogue up to `RCPT TO` against the first MX. A host that
/// answers `2xx` throughout will accept mail addressed to the candidate
/// domain, i.e. it can silently collect misdirected mail.
async fn mx_spy(mx_host: &str, from_domain: &str, rcpt_domain: &str) -> bool {
    let commands = [
        format!("EHLO {mx_host}\r\n"),
        format!("MAIL FROM: randombob1986@{from_domain}\r\n"),
        format!("RCPT TO: randomalice1986@{rcpt_domain}\r\n"),
    ];

    let dialogue = async {
        let mut stream = TcpStream::connect((mx_host, 25)).await.ok()?;
        let mut buffer = vec![0u8; MXSPY_RECV_BYTES];

        for command in &commands {
            let read = stream.read(&mut buffer).await.ok()?;
            if read == 0 || buffer[0] != b'2' {
                return None;
            }
            stream.write_all(command.as_bytes()).await.ok()?;
        }

        Some(())
    };

    timeout(SMTP_TIMEOUT, dialogue)
        .await
        .ok()
        .flatten()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::FuzzerKind;

    fn options() -> Arc<ScanOptions> {
        Arc::new(ScanOptions {
            ext_dns: false,
            geoip: false,
            banners: false,
            mx_check: false,
            lsh: None,
            lsh_seed: None,
            phash: false,
            phash_seed: None,
            screenshot_dir: None,
            nameservers: Vec::new(),
            user_agent: "test".to_string(),
        })
    }

    fn queue_of(domains: &[&str]) -> JobQueue {
        Arc::new(Mutex::new(
            domains
                .iter()
                .map(|d| Candidate::new(FuzzerKind::Original, *d))
                .collect(),
        ))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stopped_worker_takes_no_jobs() {
        let target = Arc::new(UrlTarget::parse("example.com").unwrap());
        let stopped = Arc::new(AtomicBool::new(true));
        let jobs = queue_of(&["example.com", "examp1e.com"]);
        let (tx, mut rx) = mpsc::channel(4);

        let scanner = Scanner::new(0, target, options(), stopped);
        scanner.run(jobs.clone(), tx).await;

        // The flag was up before the first dequeue: nothing was consumed and
        // nothing was produced.
        assert_eq!(jobs.lock().unwrap().len(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_worker_drains_closed_queue_and_exits() {
        // With no probes enabled and unresolvable candidates, the worker
        // must still visit every job exactly once and then stop.
        let target = Arc::new(UrlTarget::parse("example.com").unwrap());
        let stopped = Arc::new(AtomicBool::new(false));
        let jobs = queue_of(&["a.invalid", "b.invalid"]);
        let (tx, mut rx) = mpsc::channel(4);

        let scanner = Scanner::new(0, target, options(), stopped);
        scanner.run(jobs.clone(), tx).await;

        assert!(jobs.lock().unwrap().is_empty());

        let mut returned = Vec::new();
        while let Ok(candidate) = rx.try_recv() {
            returned.push(candidate.domain);
        }
        returned.sort();
        assert_eq!(returned, vec!["a.invalid", "b.invalid"]);
    }

    #[test]
    fn test_servfail_marker_counts_as_registered() {
        let mut candidate = Candidate::new(FuzzerKind::Omission, "exmple.com");
        candidate.dns_ns = vec![SERVFAIL_MARKER.to_string()];
        assert!(candidate.is_registered());
    }
}
