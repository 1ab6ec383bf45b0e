//! The unit of work and of the result set: a candidate domain tagged with the
//! fuzzer that produced it, enriched in place by exactly one scanner worker,
//! then read-only during formatting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tag identifying the algorithm that produced a candidate. Replaces the
/// stringly-typed dispatch of older tooling with an exhaustive enum; the
/// wire/output labels live in [`FuzzerKind::label`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub enum FuzzerKind {
    #[default]
    #[serde(rename = "*original")]
    Original,
    #[serde(rename = "addition")]
    Addition,
    #[serde(rename = "bitsquatting")]
    Bitsquatting,
    #[serde(rename = "cyrillic")]
    Cyrillic,
    #[serde(rename = "dictionary")]
    Dictionary,
    #[serde(rename = "homoglyph")]
    Homoglyph,
    #[serde(rename = "hyphenation")]
    Hyphenation,
    #[serde(rename = "insertion")]
    Insertion,
    #[serde(rename = "omission")]
    Omission,
    #[serde(rename = "plural")]
    Plural,
    #[serde(rename = "repetition")]
    Repetition,
    #[serde(rename = "replacement")]
    Replacement,
    #[serde(rename = "subdomain")]
    Subdomain,
    #[serde(rename = "tld-swap")]
    TldSwap,
    #[serde(rename = "transposition")]
    Transposition,
    #[serde(rename = "various")]
    Various,
    #[serde(rename = "vowel-swap")]
    VowelSwap,
}

impl FuzzerKind {
    /// The fourteen families run by default; `tld-swap` and `various` are
    /// appended by the engine under their own conditions.
    pub const BASE_FAMILIES: [FuzzerKind; 14] = [
        FuzzerKind::Addition,
        FuzzerKind::Bitsquatting,
        FuzzerKind::Cyrillic,
        FuzzerKind::Dictionary,
        FuzzerKind::Homoglyph,
        FuzzerKind::Hyphenation,
        FuzzerKind::Insertion,
        FuzzerKind::Omission,
        FuzzerKind::Plural,
        FuzzerKind::Repetition,
        FuzzerKind::Replacement,
        FuzzerKind::Subdomain,
        FuzzerKind::Transposition,
        FuzzerKind::VowelSwap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FuzzerKind::Original => "*original",
            FuzzerKind::Addition => "addition",
            FuzzerKind::Bitsquatting => "bitsquatting",
            FuzzerKind::Cyrillic => "cyrillic",
            FuzzerKind::Dictionary => "dictionary",
            FuzzerKind::Homoglyph => "homoglyph",
            FuzzerKind::Hyphenation => "hyphenation",
            FuzzerKind::Insertion => "insertion",
            FuzzerKind::Omission => "omission",
            FuzzerKind::Plural => "plural",
            FuzzerKind::Repetition => "repetition",
            FuzzerKind::Replacement => "replacement",
            FuzzerKind::Subdomain => "subdomain",
            FuzzerKind::TldSwap => "tld-swap",
            FuzzerKind::Transposition => "transposition",
            FuzzerKind::Various => "various",
            FuzzerKind::VowelSwap => "vowel-swap",
        }
    }

    pub fn from_label(label: &str) -> Option<FuzzerKind> {
        match label {
            "*original" => Some(FuzzerKind::Original),
            "addition" => Some(FuzzerKind::Addition),
            "bitsquatting" => Some(FuzzerKind::Bitsquatting),
            "cyrillic" => Some(FuzzerKind::Cyrillic),
            "dictionary" => Some(FuzzerKind::Dictionary),
            "homoglyph" => Some(FuzzerKind::Homoglyph),
            "hyphenation" => Some(FuzzerKind::Hyphenation),
            "insertion" => Some(FuzzerKind::Insertion),
            "omission" => Some(FuzzerKind::Omission),
            "plural" => Some(FuzzerKind::Plural),
            "repetition" => Some(FuzzerKind::Repetition),
            "replacement" => Some(FuzzerKind::Replacement),
            "subdomain" => Some(FuzzerKind::Subdomain),
            "tld-swap" => Some(FuzzerKind::TldSwap),
            "transposition" => Some(FuzzerKind::Transposition),
            "various" => Some(FuzzerKind::Various),
            "vowel-swap" => Some(FuzzerKind::VowelSwap),
            _ => None,
        }
    }
}

fn score_is_empty(score: &Option<u8>) -> bool {
    matches!(score, None | Some(0))
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// A generated look-alike domain together with its provenance and the
/// evidence collected for it. Evidence fields are monotonic: a worker sets
/// them once and nothing clears them afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub fuzzer: FuzzerKind,
    /// ASCII (Punycode) FQDN, lowercased.
    pub domain: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_a: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_aaaa: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_ns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_mx: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoip: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mx_spy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_http: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_smtp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_registrar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_created: Option<String>,
    #[serde(default, skip_serializing_if = "score_is_empty")]
    pub ssdeep: Option<u8>,
    #[serde(default, skip_serializing_if = "score_is_empty")]
    pub tlsh: Option<u8>,
    #[serde(default, skip_serializing_if = "score_is_empty")]
    pub phash: Option<u8>,
}

impl Candidate {
    pub fn new(fuzzer: FuzzerKind, domain: impl Into<String>) -> Candidate {
        Candidate {
            fuzzer,
            domain: domain.into(),
            ..Candidate::default()
        }
    }

    /// A candidate is registered iff any DNS record set is non-empty.
    pub fn is_registered(&self) -> bool {
        !self.dns_a.is_empty()
            || !self.dns_aaaa.is_empty()
            || !self.dns_ns.is_empty()
            || !self.dns_mx.is_empty()
    }
}

/// Mapping from ASCII domain to candidate. Insertion with an existing key is
/// a no-op: the first fuzzer to produce a domain owns it.
#[derive(Clone, Debug, Default)]
pub struct CandidateSet {
    inner: HashMap<String, Candidate>,
}

impl CandidateSet {
    pub fn new() -> CandidateSet {
        CandidateSet::default()
    }

    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if self.inner.contains_key(&candidate.domain) {
            return false;
        }
        self.inner.insert(candidate.domain.clone(), candidate);
        true
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.inner.contains_key(domain)
    }

    pub fn get(&self, domain: &str) -> Option<&Candidate> {
        self.inner.get(domain)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.inner.values()
    }

    pub fn into_values(self) -> impl Iterator<Item = Candidate> {
        self.inner.into_values()
    }

    /// Stable output order: fuzzer label ascending, registered candidates
    /// first ordered by (first A record, domain), unregistered ones by plain
    /// domain.
    pub fn into_sorted_vec(self) -> Vec<Candidate> {
        let mut rows: Vec<Candidate> = self.inner.into_values().collect();
        rows.sort_by(|a, b| {
            a.fuzzer
                .label()
                .cmp(b.fuzzer.label())
                .then_with(|| match (a.is_registered(), b.is_registered()) {
                    (true, false) => std::cmp::Ordering::Less,
                    (false, true) => std::cmp::Ordering::Greater,
                    (true, true) => {
                        let ip_a = a.dns_a.first().map(String::as_str).unwrap_or("");
                        let ip_b = b.dns_a.first().map(String::as_str).unwrap_or("");
                        (ip_a, &a.domain).cmp(&(ip_b, &b.domain))
                    }
                    (false, false) => a.domain.cmp(&b.domain),
                })
        });
        rows
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> CandidateSet {
        let mut set = CandidateSet::new();
        for candidate in iter {
            set.insert(candidate);
        }
        set
    }
}

/// Apply `--registered` / `--unregistered` selection. Passing both is
/// rejected earlier, at argument parsing.
pub fn filter_candidates(
    rows: Vec<Candidate>,
    registered: bool,
    unregistered: bool,
) -> Vec<Candidate> {
    if registered == unregistered {
        return rows;
    }

    rows.into_iter()
        .filter(|candidate| candidate.is_registered() == registered)
        .collect()
}

/// Without `--all`, registered candidates keep only the first record of each
/// DNS list.
pub fn cut_dns_records(rows: &mut [Candidate]) {
    for candidate in rows.iter_mut().filter(|c| c.is_registered()) {
        candidate.dns_a.truncate(1);
        candidate.dns_aaaa.truncate(1);
        candidate.dns_ns.truncate(1);
        candidate.dns_mx.truncate(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(fuzzer: FuzzerKind, domain: &str, ip: &str) -> Candidate {
        Candidate {
            dns_a: vec![ip.to_string()],
            ..Candidate::new(fuzzer, domain)
        }
    }

    #[test]
    fn test_insert_is_first_writer_wins() {
        let mut set = CandidateSet::new();
        assert!(set.insert(Candidate::new(FuzzerKind::Original, "example.com")));
        assert!(!set.insert(Candidate::new(FuzzerKind::Transposition, "example.com")));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get("example.com").unwrap().fuzzer,
            FuzzerKind::Original
        );
    }

    #[test]
    fn test_registered_requires_any_dns_evidence() {
        let mut candidate = Candidate::new(FuzzerKind::Omission, "exmple.com");
        assert!(!candidate.is_registered());
        candidate.dns_mx = vec!["mx.exmple.com".to_string()];
        assert!(candidate.is_registered());
    }

    #[test]
    fn test_sorted_order_groups_by_fuzzer_then_evidence() {
        let mut set = CandidateSet::new();
        set.insert(Candidate::new(FuzzerKind::Omission, "bxample.com"));
        set.insert(registered(FuzzerKind::Omission, "axample.com", "10.0.0.2"));
        set.insert(registered(FuzzerKind::Omission, "cxample.com", "10.0.0.1"));
        set.insert(Candidate::new(FuzzerKind::Original, "example.com"));

        let rows = set.into_sorted_vec();
        let domains: Vec<&str> = rows.iter().map(|c| c.domain.as_str()).collect();

        // "*original" sorts before "omission"; within omission the two
        // registered rows order by first A record.
        assert_eq!(
            domains,
            vec!["example.com", "cxample.com", "axample.com", "bxample.com"]
        );
    }

    #[test]
    fn test_filter_candidates() {
        let rows = vec![
            registered(FuzzerKind::Original, "example.com", "10.0.0.1"),
            Candidate::new(FuzzerKind::Omission, "exmple.com"),
        ];

        let only_registered = filter_candidates(rows.clone(), true, false);
        assert_eq!(only_registered.len(), 1);
        assert_eq!(only_registered[0].domain, "example.com");

        let only_unregistered = filter_candidates(rows.clone(), false, true);
        assert_eq!(only_unregistered.len(), 1);
        assert_eq!(only_unregistered[0].domain, "exmple.com");

        assert_eq!(filter_candidates(rows, false, false).len(), 2);
    }

    #[test]
    fn test_cut_dns_records_keeps_first_entries() {
        let mut rows = vec![Candidate {
            dns_a: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
            dns_ns: vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()],
            ..Candidate::new(FuzzerKind::Original, "example.com")
        }];

        cut_dns_records(&mut rows);
        assert_eq!(rows[0].dns_a, vec!["10.0.0.1"]);
        assert_eq!(rows[0].dns_ns, vec!["ns1.example.com"]);
    }

    #[test]
    fn test_json_round_trip_omits_empty_fields() {
        let candidate = Candidate {
            dns_a: vec!["192.0.2.1".to_string()],
            ssdeep: Some(88),
            ..Candidate::new(FuzzerKind::Homoglyph, "examp1e.com")
        };

        let json = serde_json::to_string(&candidate).unwrap();
        assert!(json.contains(r#""fuzzer":"homoglyph""#));
        assert!(!json.contains("dns_mx"));
        assert!(!json.contains("mx_spy"));

        let back: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.domain, candidate.domain);
        assert_eq!(back.dns_a, candidate.dns_a);
        assert_eq!(back.ssdeep, Some(88));
        assert!(back.dns_mx.is_empty());
    }

    #[test]
    fn test_fuzzer_labels_round_trip() {
        for kind in FuzzerKind::BASE_FAMILIES {
            assert_eq!(FuzzerKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(FuzzerKind::from_label("*original"), Some(FuzzerKind::Original));
        assert_eq!(FuzzerKind::from_label("nope"), None);
    }
}
