//! Thin adapters over the two locality-sensitive hashes used for page
//! similarity. Both yield percentages in `[0, 100]`; a digest that cannot be
//! computed (too little input) simply never enters the comparison.

use std::str::FromStr;
use std::sync::Arc;

use fuzzyhash::FuzzyHash;
use tlsh_fixed::{BucketKind, ChecksumKind, Tlsh, TlshBuilder, Version};

use crate::error::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LshKind {
    Ssdeep,
    Tlsh,
}

impl FromStr for LshKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<LshKind, Error> {
        match value {
            "ssdeep" => Ok(LshKind::Ssdeep),
            "tlsh" => Ok(LshKind::Tlsh),
            other => Err(Error::Argument(format!(
                "invalid LSH algorithm: {other} (choose from ssdeep, tlsh)"
            ))),
        }
    }
}

/// Digests that mean "insufficient input" for their respective algorithm.
fn is_null_digest(digest: &str) -> bool {
    matches!(digest, "" | "3::" | "TNULL")
}

/// A computed page digest. For TLSH the parsed form is kept alongside the
/// hex rendering so comparisons skip re-parsing.
#[derive(Clone)]
pub struct LshDigest {
    kind: LshKind,
    digest: String,
    tlsh: Option<Arc<Tlsh>>,
}

impl LshDigest {
    /// Hash `data`, returning `None` when the input is too small or too
    /// uniform to produce a meaningful digest.
    pub fn hash(kind: LshKind, data: &[u8]) -> Option<LshDigest> {
        match kind {
            LshKind::Ssdeep => {
                let digest = FuzzyHash::new(data).to_string();
                if is_null_digest(&digest) {
                    return None;
                }
                Some(LshDigest {
                    kind,
                    digest,
                    tlsh: None,
                })
            }
            LshKind::Tlsh => {
                let mut builder = TlshBuilder::new(
                    BucketKind::Bucket128,
                    ChecksumKind::OneByte,
                    Version::Version4,
                );
                builder.update(data);
                let tlsh = builder.build().ok()?;
                let digest = tlsh.hash();
                if is_null_digest(&digest) {
                    return None;
                }
                Some(LshDigest {
                    kind,
                    digest,
                    tlsh: Some(Arc::new(tlsh)),
                })
            }
        }
    }

    pub fn kind(&self) -> LshKind {
        self.kind
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Similarity in `[0, 100]`. `None` on mismatched algorithms or when the
    /// underlying comparison rejects the digests.
    pub fn compare(&self, other: &LshDigest) -> Option<u8> {
        if self.kind != other.kind {
            return None;
        }

        match self.kind {
            LshKind::Ssdeep => {
                let score = FuzzyHash::compare(&self.digest, &other.digest).ok()?;
                Some(score.min(100) as u8)
            }
            LshKind::Tlsh => {
                let ours = self.tlsh.as_deref()?;
                let theirs = other.tlsh.as_deref()?;
                let diff = ours.diff(theirs, false);
                // 300+ difference units flatten to zero similarity.
                let score = 100usize.saturating_sub(diff.min(300) / 3);
                Some(score.min(100) as u8)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic but non-uniform payload, large enough for both hashes.
    fn sample(len: usize, salt: u8) -> Vec<u8> {
        (0..len)
            .map(|i| ((i as u32 * 131 + salt as u32 * 7 + 13) % 251) as u8)
            .collect()
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(LshKind::from_str("ssdeep").unwrap(), LshKind::Ssdeep);
        assert_eq!(LshKind::from_str("tlsh").unwrap(), LshKind::Tlsh);
        assert!(LshKind::from_str("md5").is_err());
    }

    #[test]
    fn test_ssdeep_self_similarity_is_100() {
        let digest = LshDigest::hash(LshKind::Ssdeep, &sample(4096, 1)).unwrap();
        assert_eq!(digest.compare(&digest), Some(100));
    }

    #[test]
    fn test_tlsh_self_similarity_is_100() {
        let digest = LshDigest::hash(LshKind::Tlsh, &sample(4096, 1)).unwrap();
        assert_eq!(digest.compare(&digest), Some(100));
    }

    #[test]
    fn test_scores_stay_in_range() {
        for kind in [LshKind::Ssdeep, LshKind::Tlsh] {
            let a = LshDigest::hash(kind, &sample(4096, 1)).unwrap();
            let b = LshDigest::hash(kind, &sample(4096, 200)).unwrap();
            if let Some(score) = a.compare(&b) {
                assert!(score <= 100);
            }
        }
    }

    #[test]
    fn test_empty_input_yields_no_digest() {
        assert!(LshDigest::hash(LshKind::Ssdeep, b"").is_none());
        assert!(LshDigest::hash(LshKind::Tlsh, b"").is_none());
    }

    #[test]
    fn test_mismatched_kinds_do_not_compare() {
        let a = LshDigest::hash(LshKind::Ssdeep, &sample(4096, 1)).unwrap();
        let b = LshDigest::hash(LshKind::Tlsh, &sample(4096, 1)).unwrap();
        assert_eq!(a.compare(&b), None);
    }

    #[test]
    fn test_null_digest_detection() {
        assert!(is_null_digest(""));
        assert!(is_null_digest("3::"));
        assert!(is_null_digest("TNULL"));
        assert!(!is_null_digest("T1A0B1..."));
    }
}
