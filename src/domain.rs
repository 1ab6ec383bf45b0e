//! Domain-name utilities: the registry-suffix split heuristic, IDNA
//! conversions and FQDN validation. Every permutation the engine emits goes
//! through [`validate_fqdn`] before it is allowed into the candidate set.

use crate::constants::{COMMON_SECOND_LEVEL_TLDS, VALID_FQDN_REGEX};
use crate::error::Error;

/// A domain broken into the three chunks the permutation engine operates on.
/// `sld` is the label permutations apply to; `subdomain` and `tld` are
/// carried through unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DomainParts {
    pub subdomain: String,
    pub sld: String,
    pub tld: String,
}

/// Split a domain into (subdomain, sld, tld) using a closed set of common
/// second-level registry labels in place of the full public suffix list.
pub fn split(domain: &str) -> DomainParts {
    let parts: Vec<&str> = domain.split('.').collect();
    let n = parts.len();

    match n {
        0 | 1 => DomainParts {
            subdomain: String::new(),
            sld: domain.to_string(),
            tld: String::new(),
        },
        2 => DomainParts {
            subdomain: String::new(),
            sld: parts[0].to_string(),
            tld: parts[1].to_string(),
        },
        _ => {
            if COMMON_SECOND_LEVEL_TLDS.contains(parts[n - 2]) {
                if n == 3 {
                    DomainParts {
                        subdomain: String::new(),
                        sld: parts[0].to_string(),
                        tld: format!("{}.{}", parts[1], parts[2]),
                    }
                } else {
                    DomainParts {
                        subdomain: parts[..n - 3].join("."),
                        sld: parts[n - 3].to_string(),
                        tld: format!("{}.{}", parts[n - 2], parts[n - 1]),
                    }
                }
            } else {
                DomainParts {
                    subdomain: parts[..n - 2].join("."),
                    sld: parts[n - 2].to_string(),
                    tld: parts[n - 1].to_string(),
                }
            }
        }
    }
}

/// Reassemble a domain from its chunks, skipping empty ones.
pub fn join(subdomain: &str, sld: &str, tld: &str) -> String {
    [subdomain, sld, tld]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

/// UTS-46 encode a single FQDN to its Punycode (ASCII) form.
pub fn idna_encode(domain: &str) -> Result<String, Error> {
    idna::domain_to_ascii(domain).map_err(|_| Error::InvalidDomain {
        expected: "domain encodable to ASCII under UTS-46".to_string(),
        found: domain.to_string(),
    })
}

/// UTS-46 decode a single FQDN back to its Unicode form.
pub fn idna_decode(domain: &str) -> Result<String, Error> {
    let (decoded, result) = idna::domain_to_unicode(domain);
    match result {
        Ok(()) => Ok(decoded),
        Err(_) => Err(Error::InvalidDomain {
            expected: "domain decodable under UTS-46".to_string(),
            found: domain.to_string(),
        }),
    }
}

/// A string is a valid FQDN when it fits the 253-octet bound, matches the
/// label grammar, and decodes cleanly from Punycode.
pub fn validate_fqdn(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    if !VALID_FQDN_REGEX.is_match(domain) {
        return false;
    }

    idna_decode(domain).is_ok()
}
