//! The permutation engine: deterministic string transformations that turn a
//! seed domain into the set of plausible look-alikes. This module is only
//! concerned with generating candidates; probing them is `scan.rs`.
//!
//! Every family operates on the decoded (Unicode) second-level label, indexed
//! by codepoint. Produced labels are rejoined with the seed's subdomain and
//! TLD, IDNA-encoded and FQDN-validated; anything that fails validation is
//! silently dropped. Duplicate domains keep the first producing fuzzer.
//!
//! Example:
//!
//! ```
//! use domtwist::permutate::Fuzzer;
//!
//! let fuzzer = Fuzzer::new("example.com", Vec::new(), Vec::new());
//! let candidates = fuzzer.generate(&[]);
//! assert!(candidates.contains("example.com"));
//! ```

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::candidate::{Candidate, CandidateSet, FuzzerKind};
use crate::constants::{
    ASCII_LOWER, GLYPHS_ASCII, GLYPHS_IDN_BY_TLD, GLYPHS_UNICODE, KEYBOARD_LAYOUTS,
    LATIN_TO_CYRILLIC, VOWELS,
};
use crate::domain::{self, idna_encode, validate_fqdn};

/// Permutation generator for a single seed domain.
pub struct Fuzzer {
    subdomain: String,
    /// Decoded (Unicode) second-level label the transformations apply to.
    domain: String,
    tld: String,
    dictionary: Vec<String>,
    tld_dictionary: Vec<String>,
}

impl Fuzzer {
    /// Build a fuzzer from an ASCII (Punycode) FQDN. The SLD is decoded to
    /// Unicode so codepoint-level families see real characters; if decoding
    /// fails the ASCII form is used as-is.
    pub fn new(fqdn: &str, dictionary: Vec<String>, tld_dictionary: Vec<String>) -> Fuzzer {
        let parts = domain::split(fqdn);
        let decoded = domain::idna_decode(&parts.sld).unwrap_or_else(|_| parts.sld.clone());

        Fuzzer {
            subdomain: parts.subdomain,
            domain: decoded,
            tld: parts.tld,
            dictionary,
            tld_dictionary,
        }
    }

    fn chars(&self) -> Vec<char> {
        self.domain.chars().collect()
    }

    /// Append every ASCII digit and lowercase letter to the label. Labels
    /// containing a hyphen additionally get each character spliced in before
    /// every hyphen split.
    pub fn addition(&self) -> Vec<String> {
        let mut results = Vec::new();

        if self.domain.contains('-') {
            let parts: Vec<&str> = self.domain.split('-').collect();
            for p in 1..parts.len() {
                for c in ('0'..='9').chain(ASCII_LOWER.iter().copied()) {
                    results.push(format!(
                        "{}{}-{}",
                        parts[..p].join("-"),
                        c,
                        parts[p..].join("-")
                    ));
                }
            }
        }

        for c in ('0'..='9').chain(ASCII_LOWER.iter().copied()) {
            results.push(format!("{}{}", self.domain, c));
        }

        results
    }

    /// XOR each character against the eight single-bit masks, keeping results
    /// that stay within `[a-z0-9-]`. Models single bit-flips in transit.
    ///
    ///  - <`https://github.com/artemdinaburg/bitsquat-script/blob/master/bitsquat.py`>
    ///  - <`http://dinaburg.org/bitsquatting.html`>
    pub fn bitsquatting(&self) -> Vec<String> {
        let chars = self.chars();

        chars
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_ascii())
            .flat_map(|(i, &c)| {
                (0..8).filter_map(move |mask_index| {
                    let mask: u8 = 1 << mask_index;
                    let squatted = mask ^ (c as u8);

                    if squatted.is_ascii_lowercase()
                        || squatted.is_ascii_digit()
                        || squatted == b'-'
                    {
                        Some((i, squatted as char))
                    } else {
                        None
                    }
                })
            })
            .map(|(i, replacement)| {
                let mut label = chars.clone();
                label[i] = replacement;
                label.into_iter().collect()
            })
            .collect()
    }

    /// Swap the whole label to its Cyrillic rendering in one pass. Emission is
    /// all-or-nothing: if any codepoint survives unmapped the result would be
    /// a telltale mixed-script label, so nothing is produced.
    pub fn cyrillic(&self) -> Vec<String> {
        let mapped: String = self
            .domain
            .chars()
            .map(|c| LATIN_TO_CYRILLIC.get(&c).copied().unwrap_or(c))
            .collect();

        let unchanged = mapped
            .chars()
            .zip(self.domain.chars())
            .any(|(after, before)| after == before);

        if unchanged {
            Vec::new()
        } else {
            vec![mapped]
        }
    }

    /// Substitute visually confusable glyphs over one- and two-character
    /// windows, two rounds deep. The effective table is the ASCII confusables
    /// unioned with either the registry override for the seed TLD or the
    /// global Unicode table.
    pub fn homoglyph(&self) -> Vec<String> {
        let mut glyphs: HashMap<&str, Vec<&str>> = HashMap::new();
        for (key, values) in GLYPHS_ASCII.entries() {
            glyphs.insert(key, values.to_vec());
        }

        let unicode_table = GLYPHS_IDN_BY_TLD
            .get(self.tld.as_str())
            .copied()
            .unwrap_or(&GLYPHS_UNICODE);
        for (key, values) in unicode_table.entries() {
            glyphs.entry(key).or_default().extend_from_slice(values);
        }

        let mix = |label: &str| -> Vec<String> {
            let chars: Vec<char> = label.chars().collect();
            let mut results = Vec::new();

            for i in 0..chars.len() {
                let key = chars[i].to_string();
                if let Some(candidates) = glyphs.get(key.as_str()) {
                    for glyph in candidates {
                        let prefix: String = chars[..i].iter().collect();
                        let suffix: String = chars[i + 1..].iter().collect();
                        results.push(format!("{prefix}{glyph}{suffix}"));
                    }
                }
            }

            for i in 0..chars.len().saturating_sub(1) {
                let window: String = chars[i..i + 2].iter().collect();
                let keys = [chars[i].to_string(), chars[i + 1].to_string(), window.clone()];

                for key in &keys {
                    if let Some(candidates) = glyphs.get(key.as_str()) {
                        for glyph in candidates {
                            let prefix: String = chars[..i].iter().collect();
                            let suffix: String = chars[i + 2..].iter().collect();
                            let replaced = window.replacen(key.as_str(), glyph, 1);
                            results.push(format!("{prefix}{replaced}{suffix}"));
                        }
                    }
                }
            }

            results
        };

        let first_round = mix(&self.domain);
        let second_round: Vec<String> = first_round.iter().flat_map(|label| mix(label)).collect();

        first_round
            .into_iter()
            .chain(second_round)
            .unique()
            .collect()
    }

    /// Insert a hyphen at every interior position.
    pub fn hyphenation(&self) -> Vec<String> {
        let chars = self.chars();

        (1..chars.len())
            .map(|i| {
                let mut label = chars.clone();
                label.insert(i, '-');
                label.into_iter().collect()
            })
            .collect()
    }

    /// Insert keyboard-adjacent characters on either side of each interior
    /// character, across all layouts.
    pub fn insertion(&self) -> Vec<String> {
        let chars = self.chars();
        let mut results = Vec::new();

        if chars.len() < 3 {
            return results;
        }

        for i in 1..chars.len() - 1 {
            let prefix: String = chars[..i].iter().collect();
            let original = chars[i];
            let suffix: String = chars[i + 1..].iter().collect();

            for layout in KEYBOARD_LAYOUTS.iter() {
                if let Some(adjacent) = layout.get(&original) {
                    for c in adjacent.chars() {
                        results.push(format!("{prefix}{c}{original}{suffix}"));
                        results.push(format!("{prefix}{original}{c}{suffix}"));
                    }
                }
            }
        }

        results.into_iter().unique().collect()
    }

    /// Delete each single position.
    pub fn omission(&self) -> Vec<String> {
        let chars = self.chars();

        (0..chars.len())
            .map(|i| {
                let mut label = chars.clone();
                label.remove(i);
                label.into_iter().collect()
            })
            .collect()
    }

    /// Duplicate each single position (`example` -> `exaample`).
    pub fn repetition(&self) -> Vec<String> {
        let chars = self.chars();

        (0..chars.len())
            .map(|i| {
                let mut label = chars.clone();
                label.insert(i, chars[i]);
                label.into_iter().collect()
            })
            .collect()
    }

    /// Replace each character with its keyboard-adjacent neighbours, across
    /// all layouts.
    pub fn replacement(&self) -> Vec<String> {
        let chars = self.chars();
        let mut results = Vec::new();

        for (i, c) in chars.iter().enumerate() {
            let prefix: String = chars[..i].iter().collect();
            let suffix: String = chars[i + 1..].iter().collect();

            for layout in KEYBOARD_LAYOUTS.iter() {
                if let Some(adjacent) = layout.get(c) {
                    for replacement in adjacent.chars() {
                        results.push(format!("{prefix}{replacement}{suffix}"));
                    }
                }
            }
        }

        results
    }

    /// Split the label with a dot at interior positions not adjacent to an
    /// existing hyphen or dot.
    pub fn subdomain(&self) -> Vec<String> {
        let chars = self.chars();

        (1..chars.len().saturating_sub(1))
            .filter(|&i| {
                ![chars[i - 1], chars[i]]
                    .iter()
                    .any(|c| *c == '-' || *c == '.')
            })
            .map(|i| {
                let prefix: String = chars[..i].iter().collect();
                let suffix: String = chars[i..].iter().collect();
                format!("{prefix}.{suffix}")
            })
            .collect()
    }

    /// Swap every adjacent pair (`example` -> `xeample`). Swapping a doubled
    /// character reproduces the seed, which the candidate set absorbs.
    pub fn transposition(&self) -> Vec<String> {
        let chars = self.chars();

        (0..chars.len().saturating_sub(1))
            .map(|i| {
                let mut label = chars.clone();
                label.swap(i, i + 1);
                label.into_iter().collect()
            })
            .collect()
    }

    /// Substitute every vowel position with each of the five vowels.
    pub fn vowel_swap(&self) -> Vec<String> {
        let chars = self.chars();

        chars
            .iter()
            .enumerate()
            .filter(|(_, c)| VOWELS.contains(c))
            .flat_map(|(i, _)| {
                let chars = &chars;
                VOWELS.iter().map(move |vowel| {
                    let mut label = chars.clone();
                    label[i] = *vowel;
                    label.into_iter().collect()
                })
            })
            .collect()
    }

    /// Pluralise interior positions (`example` -> `examsple`), using `es`
    /// after sibilants. Labels shorter than six characters produce nothing.
    pub fn plural(&self) -> Vec<String> {
        let chars = self.chars();
        if chars.len() < 5 {
            return Vec::new();
        }

        (2..chars.len() - 2)
            .map(|i| {
                let prefix: String = chars[..=i].iter().collect();
                let suffix: String = chars[i + 1..].iter().collect();
                let plural = if matches!(chars[i], 's' | 'x' | 'z') {
                    "es"
                } else {
                    "s"
                };
                format!("{prefix}{plural}{suffix}")
            })
            .collect()
    }

    /// Combine the label with dictionary words on both sides, hyphenated and
    /// plain. Hyphenated labels also get their first/last chunk replaced.
    pub fn dictionary(&self) -> Vec<String> {
        let mut results = HashSet::new();

        for word in &self.dictionary {
            if !(self.domain.starts_with(word.as_str()) && self.domain.ends_with(word.as_str())) {
                results.insert(format!("{}-{}", self.domain, word));
                results.insert(format!("{}{}", self.domain, word));
                results.insert(format!("{}-{}", word, self.domain));
                results.insert(format!("{}{}", word, self.domain));
            }
        }

        if self.domain.contains('-') {
            let parts: Vec<&str> = self.domain.split('-').collect();
            for word in &self.dictionary {
                results.insert(format!("{}-{}", parts[..parts.len() - 1].join("-"), word));
                results.insert(format!("{}-{}", word, parts[1..].join("-")));
            }
        }

        results.into_iter().collect()
    }

    /// Replacement TLDs from the supplied dictionary, excluding the seed's.
    fn tld_swaps(&self) -> Vec<&str> {
        self.tld_dictionary
            .iter()
            .map(String::as_str)
            .filter(|tld| *tld != self.tld)
            .collect()
    }

    /// The closed list of rejoin tricks: nested-TLD shortening, TLD
    /// absorption into the label, and subdomain flattening. Produces full
    /// domains rather than bare labels.
    fn various(&self) -> Vec<String> {
        let mut results = Vec::new();
        let (sub, label, tld) = (&self.subdomain, &self.domain, &self.tld);

        if tld.contains('.') {
            let last = tld.rsplit('.').next().unwrap_or_default();
            results.push(domain::join(sub, label, last));
            results.push(domain::join(
                sub,
                &format!("{}{}", label, tld.replace('.', "")),
                "com",
            ));
        } else {
            results.push(domain::join(sub, &format!("{label}{tld}"), tld));
            if tld != "com" {
                results.push(domain::join(sub, &format!("{label}-{tld}"), "com"));
                results.push(domain::join(sub, &format!("{label}{tld}"), "com"));
            }
        }

        if !sub.is_empty() {
            results.push(domain::join("", &format!("{sub}{label}"), tld));
            results.push(domain::join(
                "",
                &format!("{}{}", sub.replace('.', ""), label),
                tld,
            ));
            results.push(domain::join("", &format!("{sub}-{label}"), tld));
            results.push(domain::join(
                "",
                &format!("{}-{}", sub.replace('.', "-"), label),
                tld,
            ));
        }

        results
    }

    /// Run the selected fuzzer families (all of them when `selected` is
    /// empty) and collect the deduplicated, validated candidate set. The seed
    /// itself is always present under the `*original` tag.
    pub fn generate(&self, selected: &[FuzzerKind]) -> CandidateSet {
        let mut set = CandidateSet::new();

        let wants =
            |kind: FuzzerKind| selected.is_empty() || selected.contains(&kind);

        self.insert_domain(
            &mut set,
            FuzzerKind::Original,
            domain::join(&self.subdomain, &self.domain, &self.tld),
        );

        for kind in FuzzerKind::BASE_FAMILIES {
            if !wants(kind) {
                continue;
            }

            let labels = match kind {
                FuzzerKind::Addition => self.addition(),
                FuzzerKind::Bitsquatting => self.bitsquatting(),
                FuzzerKind::Cyrillic => self.cyrillic(),
                FuzzerKind::Dictionary => self.dictionary(),
                FuzzerKind::Homoglyph => self.homoglyph(),
                FuzzerKind::Hyphenation => self.hyphenation(),
                FuzzerKind::Insertion => self.insertion(),
                FuzzerKind::Omission => self.omission(),
                FuzzerKind::Plural => self.plural(),
                FuzzerKind::Repetition => self.repetition(),
                FuzzerKind::Replacement => self.replacement(),
                FuzzerKind::Subdomain => self.subdomain(),
                FuzzerKind::Transposition => self.transposition(),
                FuzzerKind::VowelSwap => self.vowel_swap(),
                FuzzerKind::Original | FuzzerKind::TldSwap | FuzzerKind::Various => {
                    unreachable!("not a base family")
                }
            };

            for label in labels {
                self.insert_domain(
                    &mut set,
                    kind,
                    domain::join(&self.subdomain, &label, &self.tld),
                );
            }
        }

        if wants(FuzzerKind::TldSwap) {
            for tld in self.tld_swaps() {
                self.insert_domain(
                    &mut set,
                    FuzzerKind::TldSwap,
                    domain::join(&self.subdomain, &self.domain, tld),
                );
            }
        }

        if wants(FuzzerKind::Various) {
            for fqdn in self.various() {
                self.insert_domain(&mut set, FuzzerKind::Various, fqdn);
            }
        }

        set
    }

    fn insert_domain(&self, set: &mut CandidateSet, kind: FuzzerKind, unicode_fqdn: String) {
        if let Ok(encoded) = idna_encode(&unicode_fqdn) {
            if validate_fqdn(&encoded) {
                set.insert(Candidate::new(kind, encoded));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuzzer(fqdn: &str) -> Fuzzer {
        Fuzzer::new(fqdn, Vec::new(), Vec::new())
    }

    fn kinds(set: &CandidateSet) -> HashSet<FuzzerKind> {
        set.iter().map(|c| c.fuzzer).collect()
    }

    #[test]
    fn test_original_always_present_once() {
        let set = fuzzer("example.com").generate(&[]);
        let originals: Vec<_> = set
            .iter()
            .filter(|c| c.fuzzer == FuzzerKind::Original)
            .collect();

        assert_eq!(originals.len(), 1);
        assert_eq!(originals[0].domain, "example.com");
    }

    #[test]
    fn test_every_candidate_is_a_valid_fqdn() {
        let set = fuzzer("example.com").generate(&[]);

        assert!(!set.is_empty());
        for candidate in set.iter() {
            assert!(validate_fqdn(&candidate.domain), "{}", candidate.domain);
            assert!(domain::idna_decode(&candidate.domain).is_ok());
        }
    }

    #[test]
    fn test_expected_simple_edits_are_present() {
        let set = fuzzer("example.com").generate(&[]);

        assert_eq!(set.get("exampl.com").map(|c| c.fuzzer), Some(FuzzerKind::Omission));
        assert_eq!(
            set.get("exaample.com").map(|c| c.fuzzer),
            Some(FuzzerKind::Repetition)
        );
    }

    #[test]
    fn test_addition_appends_digits_and_letters() {
        let labels = fuzzer("example.com").addition();
        assert_eq!(labels.len(), 36);
        assert!(labels.contains(&"example0".to_string()));
        assert!(labels.contains(&"examplez".to_string()));
    }

    #[test]
    fn test_addition_splices_around_hyphens() {
        let labels = fuzzer("ex-ample.com").addition();
        assert!(labels.contains(&"exa-ample".to_string()));
        assert!(labels.contains(&"ex-amplea".to_string()));
    }

    #[test]
    fn test_bitsquatting_stays_in_hostname_alphabet() {
        for label in fuzzer("example.com").bitsquatting() {
            assert!(label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }

    #[test]
    fn test_cyrillic_is_all_or_nothing() {
        // Every letter of "example" maps, so the swap emits.
        assert_eq!(fuzzer("example.com").cyrillic().len(), 1);

        // "f" has no Cyrillic counterpart: one aligned codepoint survives and
        // the whole emission is suppressed.
        assert!(fuzzer("ficus.com").cyrillic().is_empty());
    }

    #[test]
    fn test_homoglyph_includes_two_char_expansions() {
        let labels = fuzzer("corn.com").homoglyph();
        assert!(labels.contains(&"com".to_string()), "rn -> m window missing");
        assert!(labels.contains(&"c0rn".to_string()), "o -> 0 missing");
    }

    #[test]
    fn test_homoglyph_round_two_composes() {
        // Round one turns `m` into `rn`; round two can then turn the
        // surviving `o` into `0`.
        let labels = fuzzer("om.com").homoglyph();
        assert!(labels.contains(&"0rn".to_string()));
    }

    #[test]
    fn test_hyphenation_interior_positions() {
        let labels = fuzzer("abc.com").hyphenation();
        assert_eq!(labels, vec!["a-bc".to_string(), "ab-c".to_string()]);
    }

    #[test]
    fn test_insertion_skips_first_and_last_position() {
        let labels = fuzzer("abc.com").insertion();
        assert!(!labels.is_empty());
        for label in &labels {
            assert_eq!(label.chars().count(), 4);
            // Both emitted shapes keep the original first and last character.
            assert!(label.starts_with('a'));
            assert!(label.ends_with('c'));
        }
    }

    #[test]
    fn test_omission_bound() {
        let sld_len = "example".chars().count();
        let set = fuzzer("example.com").generate(&[FuzzerKind::Omission]);
        let omissions = set
            .iter()
            .filter(|c| c.fuzzer == FuzzerKind::Omission)
            .count();
        assert!(omissions <= sld_len);
    }

    #[test]
    fn test_transposition_emits_every_adjacent_pair() {
        let labels = fuzzer("google.com").transposition();
        assert_eq!(labels.len(), "google".len() - 1);
        assert!(labels.contains(&"goolge".to_string()));
        // The doubled-letter swap reproduces the seed; dedup handles it later.
        assert!(labels.contains(&"google".to_string()));
    }

    #[test]
    fn test_transposition_is_an_involution() {
        let chars: Vec<char> = "example".chars().collect();
        for i in 0..chars.len() - 1 {
            let mut once = chars.clone();
            once.swap(i, i + 1);
            let mut twice = once.clone();
            twice.swap(i, i + 1);
            assert_eq!(twice, chars);
        }
    }

    #[test]
    fn test_plural_range_and_suffixes() {
        let labels = fuzzer("example.com").plural();
        assert_eq!(labels.len(), 3);
        assert!(labels.contains(&"exasmple".to_string()));

        // Too short to pluralise at all.
        assert!(fuzzer("abcd.com").plural().is_empty());

        // Sibilant positions take "es".
        let labels = fuzzer("taxation.com").plural();
        assert!(labels.contains(&"taxesation".to_string()));
    }

    #[test]
    fn test_vowel_swap_touches_only_vowel_positions() {
        let labels = fuzzer("example.com").vowel_swap();
        assert!(labels.contains(&"ixample".to_string()));
        assert!(labels.contains(&"exampli".to_string()));
        assert!(!labels.contains(&"yxample".to_string()));
    }

    #[test]
    fn test_dictionary_combinations() {
        let fuzzer = Fuzzer::new(
            "example.com",
            vec!["secure".to_string(), "login".to_string()],
            Vec::new(),
        );
        let labels = fuzzer.dictionary();

        for expected in [
            "example-secure",
            "examplesecure",
            "secure-example",
            "secureexample",
            "example-login",
        ] {
            assert!(labels.contains(&expected.to_string()), "{expected}");
        }
    }

    #[test]
    fn test_dictionary_skips_word_equal_to_label() {
        let fuzzer = Fuzzer::new("login.com", vec!["login".to_string()], Vec::new());
        let labels = fuzzer.dictionary();
        assert!(!labels.contains(&"login-login".to_string()));
    }

    #[test]
    fn test_tld_swap_excludes_the_seed_tld() {
        let fuzzer = Fuzzer::new(
            "example.com",
            Vec::new(),
            vec!["com".to_string(), "net".to_string(), "co.uk".to_string()],
        );
        let set = fuzzer.generate(&[FuzzerKind::TldSwap]);

        assert!(set.contains("example.net"));
        assert!(set.contains("example.co.uk"));
        let swaps = set.iter().filter(|c| c.fuzzer == FuzzerKind::TldSwap).count();
        assert_eq!(swaps, 2);
    }

    #[test]
    fn test_selected_families_only() {
        let set = fuzzer("google.com")
            .generate(&[FuzzerKind::Omission, FuzzerKind::Transposition]);

        let seen = kinds(&set);
        let allowed: HashSet<FuzzerKind> = [
            FuzzerKind::Original,
            FuzzerKind::Omission,
            FuzzerKind::Transposition,
        ]
        .into_iter()
        .collect();
        assert!(seen.is_subset(&allowed));
        assert!(seen.contains(&FuzzerKind::Original));
    }

    #[test]
    fn test_unicode_seed_normalises_to_ascii() {
        let set = fuzzer("xn--bcher-kva.de").generate(&[]);

        assert_eq!(
            set.get("xn--bcher-kva.de").map(|c| c.fuzzer),
            Some(FuzzerKind::Original)
        );
        for candidate in set.iter() {
            assert!(candidate.domain.is_ascii(), "{}", candidate.domain);
        }
    }

    #[test]
    fn test_nested_tld_split_and_various() {
        let parts = domain::split("example.co.uk");
        assert_eq!(
            (parts.subdomain.as_str(), parts.sld.as_str(), parts.tld.as_str()),
            ("", "example", "co.uk")
        );

        let set = fuzzer("example.co.uk").generate(&[FuzzerKind::Various]);
        assert_eq!(set.get("example.uk").map(|c| c.fuzzer), Some(FuzzerKind::Various));
        assert_eq!(
            set.get("examplecouk.com").map(|c| c.fuzzer),
            Some(FuzzerKind::Various)
        );
    }

    #[test]
    fn test_various_absorbs_single_label_tlds() {
        let set = fuzzer("example.net").generate(&[FuzzerKind::Various]);
        assert!(set.contains("examplenet.net"));
        assert!(set.contains("example-net.com"));
        assert!(set.contains("examplenet.com"));
    }

    #[test]
    fn test_various_flattens_subdomains() {
        let set = fuzzer("foo.example.com").generate(&[FuzzerKind::Various]);
        assert!(set.contains("fooexample.com"));
        assert!(set.contains("foo-example.com"));
    }

    #[test]
    fn test_no_duplicate_domains() {
        let set = fuzzer("example.com").generate(&[]);
        let unique: HashSet<&str> = set.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(unique.len(), set.len());
    }
}
