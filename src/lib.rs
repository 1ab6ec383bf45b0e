//! domtwist is a domain-name permutation engine and concurrent scanner for
//! detecting typosquatting, homograph phishing and brand impersonation.
//!
//! The two halves of the pipeline are independent and composable:
//!
//! * [`permutate::Fuzzer`] turns a seed domain into a deduplicated
//!   [`candidate::CandidateSet`] using deterministic transformation families
//!   (bitsquatting, homoglyphs, keyboard adjacency, Cyrillic scripts, ...).
//! * [`scan::Scanner`] workers pull candidates off a shared queue and enrich
//!   them with DNS, banner, GeoIP, WHOIS and page-similarity evidence.
//!
//! ### Example
//!
//! ```
//! use domtwist::permutate::Fuzzer;
//!
//! let fuzzer = Fuzzer::new("example.com", Vec::new(), Vec::new());
//! let candidates = fuzzer.generate(&[]);
//!
//! assert!(candidates.len() > 100);
//! assert!(candidates.contains("examp1e.com"));
//! ```

#![deny(
    future_incompatible,
    nonstandard_style,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_qualifications
)]
#![deny(
    clippy::explicit_into_iter_loop,
    clippy::explicit_iter_loop,
    clippy::manual_filter_map,
    clippy::filter_map_next,
    clippy::manual_find_map,
    clippy::if_not_else,
    clippy::items_after_statements,
    clippy::map_flatten,
    clippy::match_same_arms,
    clippy::mem_forget,
    clippy::mut_mut,
    clippy::needless_continue,
    clippy::map_unwrap_or,
    clippy::path_buf_push_overwrite,
    clippy::redundant_closure_for_method_calls,
    clippy::string_add,
    clippy::string_add_assign,
    clippy::unicode_not_nfc,
    clippy::unseparated_literal_suffix
)]

pub mod browser;
pub mod candidate;
pub mod constants;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod format;
pub mod geoip;
pub mod lsh;
pub mod permutate;
pub mod phash;
pub mod scan;
pub mod urlparse;
pub mod whois;
