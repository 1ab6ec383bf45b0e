use std::time::Duration;

use lazy_static::lazy_static;
use phf::{phf_map, phf_set};
use regex::Regex;

/// Static list of lowercase ASCII characters.
// Stack allocate these at compile time
pub static ASCII_LOWER: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub static VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Second-level registry labels that pull the preceding label into the TLD
/// (`example.co.uk` -> tld `co.uk`). A deliberate approximation of the public
/// suffix list; permutation output depends on this exact set.
pub static COMMON_SECOND_LEVEL_TLDS: phf::Set<&'static str> = phf_set! {
    "org", "com", "net", "gov", "edu", "co", "mil", "nom", "ac", "info", "biz", "ne",
};

pub const DNS_TIMEOUT: Duration = Duration::from_millis(2500);
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(5);
pub const WEBDRIVER_TIMEOUT: Duration = Duration::from_secs(15);
pub const WHOIS_TIMEOUT: Duration = Duration::from_secs(2);
pub const PROGRESS_TICK: Duration = Duration::from_millis(200);

pub const THREAD_COUNT_DEFAULT: usize = 16;

/// Bytes read when grabbing HTTP/SMTP banners.
pub const BANNER_RECV_BYTES: usize = 1024;
/// Bytes read between SMTP commands during the MX intercept check.
pub const MXSPY_RECV_BYTES: usize = 512;

/// Edge length of the average-hash grid; the hash carries `PHASH_SIZE²` bits.
pub const PHASH_SIZE: u32 = 8;

static QWERTY_KEYBOARD_LAYOUT: phf::Map<char, &'static str> = phf_map! {
    '1' => "2q",
    '2' => "3wq1",
    '3' => "4ew2",
    '4' => "5re3",
    '5' => "6tr4",
    '6' => "7yt5",
    '7' => "8uy6",
    '8' => "9iu7",
    '9' => "0oi8",
    '0' => "po9",
    'q' => "12wa",
    'w' => "3esaq2",
    'e' => "4rdsw3",
    'r' => "5tfde4",
    't' => "6ygfr5",
    'y' => "7uhgt6",
    'u' => "8ijhy7",
    'i' => "9okju8",
    'o' => "0plki9",
    'p' => "lo0",
    'a' => "qwsz",
    's' => "edxzaw",
    'd' => "rfcxse",
    'f' => "tgvcdr",
    'g' => "yhbvft",
    'h' => "ujnbgy",
    'j' => "ikmnhu",
    'k' => "olmji",
    'l' => "kop",
    'z' => "asx",
    'x' => "zsdc",
    'c' => "xdfv",
    'v' => "cfgb",
    'b' => "vghn",
    'n' => "bhjm",
    'm' => "njk"
};

static QWERTZ_KEYBOARD_LAYOUT: phf::Map<char, &'static str> = phf_map! {
    '1' => "2q",
    '2' => "3wq1",
    '3' => "4ew2",
    '4' => "5re3",
    '5' => "6tr4",
    '6' => "7zt5",
    '7' => "8uz6",
    '8' => "9iu7",
    '9' => "0oi8",
    '0' => "po9",
    'q' => "12wa",
    'w' => "3esaq2",
    'e' => "4rdsw3",
    'r' => "5tfde4",
    't' => "6zgfr5",
    'z' => "7uhgt6",
    'u' => "8ijhz7",
    'i' => "9okju8",
    'o' => "0plki9",
    'p' => "lo0",
    'a' => "qwsy",
    's' => "edxyaw",
    'd' => "rfcxse",
    'f' => "tgvcdr",
    'g' => "zhbvft",
    'h' => "ujnbgz",
    'j' => "ikmnhu",
    'k' => "olmji",
    'l' => "kop",
    'y' => "asx",
    'x' => "ysdc",
    'c' => "xdfv",
    'v' => "cfgb",
    'b' => "vghn",
    'n' => "bhjm",
    'm' => "njk"
};

static AZERTY_KEYBOARD_LAYOUT: phf::Map<char, &'static str> = phf_map! {
    '1' => "2a",
    '2' => "3za1",
    '3' => "4ez2",
    '4' => "5re3",
    '5' => "6tr4",
    '6' => "7yt5",
    '7' => "8uy6",
    '8' => "9iu7",
    '9' => "0oi8",
    '0' => "po9",
    'a' => "2zq1",
    'z' => "3esqa2",
    'e' => "4rdsz3",
    'r' => "5tfde4",
    't' => "6ygfr5",
    'y' => "7uhgt6",
    'u' => "8ijhy7",
    'i' => "9okju8",
    'o' => "0plki9",
    'p' => "lo0m",
    'q' => "zswa",
    's' => "edxwqz",
    'd' => "rfcxse",
    'f' => "tgvcdr",
    'g' => "yhbvft",
    'h' => "ujnbgy",
    'j' => "iknhu",
    'k' => "olji",
    'l' => "kopm",
    'm' => "lp",
    'w' => "sxq",
    'x' => "wsdc",
    'c' => "xdfv",
    'v' => "cfgb",
    'b' => "vghn",
    'n' => "bhj"
};

/// ASCII-only confusables. Keys may span two characters (`rn` -> `m`); the
/// permutation engine handles both window widths.
pub static GLYPHS_ASCII: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "0" => &["o"],
    "1" => &["l", "i"],
    "3" => &["8"],
    "6" => &["9"],
    "8" => &["3"],
    "9" => &["6"],
    "b" => &["d", "lb"],
    "c" => &["e"],
    "d" => &["b", "cl", "dl"],
    "e" => &["c"],
    "g" => &["q"],
    "h" => &["lh"],
    "i" => &["1", "l"],
    "k" => &["lk", "ik", "lc"],
    "l" => &["1", "i"],
    "m" => &["n", "nn", "rn", "rr"],
    "n" => &["m", "r"],
    "o" => &["0"],
    "q" => &["g"],
    "u" => &["v"],
    "v" => &["u"],
    "w" => &["vv", "uu"],
    "rn" => &["m"],
    "cl" => &["d"],
};

/// Unicode confusables applied when the seed TLD has no registry-specific
/// override table. Trimmed to glyphs that survive IDNA round-trips.
pub static GLYPHS_UNICODE: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "2" => &["ƻ"],
    "3" => &["ʒ"],
    "5" => &["ƽ"],
    "a" => &["á", "à", "â", "ä", "ǎ", "ă", "ā", "ã", "å", "ą", "ȧ", "ả", "ạ", "ḁ", "ⱥ"],
    "b" => &["ḃ", "ḅ", "ḇ", "ƀ", "ɓ"],
    "c" => &["ć", "ĉ", "č", "ċ", "ç", "ḉ", "ƈ", "ȼ"],
    "d" => &["ď", "ḋ", "ḍ", "ḏ", "ḑ", "ḓ", "đ", "ɖ", "ɗ"],
    "e" => &["é", "è", "ê", "ë", "ě", "ĕ", "ē", "ẽ", "ė", "ẹ", "ę", "ȩ", "ɇ", "ḛ"],
    "f" => &["ƒ", "ḟ"],
    "g" => &["ǵ", "ğ", "ǧ", "ģ", "ĝ", "ġ", "ɠ", "ḡ", "ǥ"],
    "h" => &["ĥ", "ȟ", "ħ", "ḧ", "ḩ", "ⱨ", "ḣ", "ḥ", "ḫ", "ẖ"],
    "i" => &["í", "ì", "î", "ï", "ǐ", "ĭ", "ī", "ĩ", "į", "ı", "ỉ", "ị"],
    "j" => &["ĵ", "ǰ", "ɉ"],
    "k" => &["ķ", "ḳ", "ḵ", "ƙ", "ⱪ"],
    "l" => &["ĺ", "ľ", "ļ", "ł", "ḷ", "ḽ", "ḻ", "ḹ", "ɫ"],
    "m" => &["ḿ", "ṁ", "ṃ", "ɱ"],
    "n" => &["ń", "ǹ", "ň", "ñ", "ṅ", "ṇ", "ṉ", "ṋ", "ņ", "ɲ", "ƞ"],
    "o" => &["ó", "ò", "ô", "ö", "ǒ", "ŏ", "ō", "õ", "ő", "ọ", "ơ", "ǫ", "ȯ", "ø"],
    "p" => &["ṕ", "ṗ", "ƥ"],
    "q" => &["ʠ"],
    "r" => &["ŕ", "ř", "ŗ", "ṙ", "ṛ", "ṟ", "ɍ", "ɽ"],
    "s" => &["ś", "š", "ş", "ŝ", "ș", "ṡ", "ṣ", "ʂ"],
    "t" => &["ť", "ţ", "ṫ", "ṭ", "ț", "ƫ"],
    "u" => &["ú", "ù", "û", "ü", "ǔ", "ŭ", "ū", "ũ", "ů", "ű", "ų", "ụ", "ṳ"],
    "v" => &["ṽ", "ṿ", "ʋ"],
    "w" => &["ẃ", "ẁ", "ŵ", "ẅ", "ⱳ", "ẇ", "ẉ"],
    "x" => &["ẋ", "ẍ"],
    "y" => &["ý", "ỳ", "ŷ", "ÿ", "ȳ", "ẏ", "ỵ", "ƴ", "ɏ"],
    "z" => &["ź", "ž", "ż", "ẓ", "ẕ", "ƶ"],
};

// Per-registry IDN tables. Registries accept different repertoires, so a
// candidate that renders under .com may be unregistrable under .pl; keeping
// the tables narrow avoids emitting dead permutations.
static GLYPHS_TLD_DE: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["á", "à", "â", "ä", "ã", "å"],
    "c" => &["ç", "ć"],
    "e" => &["é", "è", "ê", "ë"],
    "i" => &["í", "ì", "î", "ï"],
    "n" => &["ñ", "ń"],
    "o" => &["ó", "ò", "ô", "ö", "õ"],
    "s" => &["ś", "š"],
    "u" => &["ú", "ù", "û", "ü"],
};

static GLYPHS_TLD_PL: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["ą"],
    "c" => &["ć"],
    "e" => &["ę"],
    "l" => &["ł"],
    "n" => &["ń"],
    "o" => &["ó"],
    "s" => &["ś"],
    "z" => &["ż", "ź"],
};

static GLYPHS_TLD_DK: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["å", "ä", "á"],
    "e" => &["é"],
    "o" => &["ø", "ö", "ó"],
    "u" => &["ü"],
};

static GLYPHS_TLD_NO: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["å", "à", "á"],
    "e" => &["é", "è", "ê"],
    "o" => &["ø", "ò", "ô"],
};

static GLYPHS_TLD_SE: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["å", "ä", "á"],
    "e" => &["é"],
    "o" => &["ö", "ó"],
    "u" => &["ü"],
};

static GLYPHS_TLD_FI: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["ä", "å"],
    "o" => &["ö", "õ"],
    "s" => &["š"],
    "z" => &["ž"],
};

static GLYPHS_TLD_HU: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["á"],
    "e" => &["é"],
    "i" => &["í"],
    "o" => &["ó", "ö", "ő"],
    "u" => &["ú", "ü", "ű"],
};

static GLYPHS_TLD_ES: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["á"],
    "c" => &["ç"],
    "e" => &["é"],
    "i" => &["í"],
    "n" => &["ñ"],
    "o" => &["ó"],
    "u" => &["ú", "ü"],
};

static GLYPHS_TLD_BR: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "a" => &["à", "á", "â", "ã"],
    "c" => &["ç"],
    "e" => &["é", "ê"],
    "i" => &["í"],
    "n" => &["ñ"],
    "o" => &["ó", "ô", "õ"],
    "u" => &["ú", "ü"],
};

/// Registry-specific homoglyph overrides, keyed by TLD as produced by
/// `domain::split`. A present table replaces `GLYPHS_UNICODE` for that seed.
pub static GLYPHS_IDN_BY_TLD: phf::Map<
    &'static str,
    &'static phf::Map<&'static str, &'static [&'static str]>,
> = phf_map! {
    "de" => &GLYPHS_TLD_DE,
    "pl" => &GLYPHS_TLD_PL,
    "dk" => &GLYPHS_TLD_DK,
    "no" => &GLYPHS_TLD_NO,
    "se" => &GLYPHS_TLD_SE,
    "fi" => &GLYPHS_TLD_FI,
    "hu" => &GLYPHS_TLD_HU,
    "es" => &GLYPHS_TLD_ES,
    "br" => &GLYPHS_TLD_BR,
    "com.br" => &GLYPHS_TLD_BR,
};

/// Latin letters with a near-identical Cyrillic counterpart. Applied as a
/// whole by the `cyrillic` fuzzer; letters outside this map keep their Latin
/// form, which suppresses emission entirely.
pub static LATIN_TO_CYRILLIC: phf::Map<char, char> = phf_map! {
    'a' => 'а',
    'b' => 'ь',
    'c' => 'с',
    'd' => 'ԁ',
    'e' => 'е',
    'g' => 'ԍ',
    'h' => 'һ',
    'i' => 'і',
    'j' => 'ј',
    'k' => 'к',
    'l' => 'ӏ',
    'm' => 'м',
    'o' => 'о',
    'p' => 'р',
    'q' => 'ԛ',
    's' => 'ѕ',
    't' => 'т',
    'v' => 'ѵ',
    'w' => 'ш',
    'x' => 'х',
    'y' => 'у',
};

pub const WHOIS_IANA: &str = "whois.iana.org";

/// Registries we can query directly, skipping the IANA referral round-trip.
pub static WHOIS_TLD_SERVERS: phf::Map<&'static str, &'static str> = phf_map! {
    "com" => "whois.verisign-grs.com",
    "net" => "whois.verisign-grs.com",
    "org" => "whois.pir.org",
    "info" => "whois.afilias.net",
    "pl" => "whois.dns.pl",
    "us" => "whois.nic.us",
    "co" => "whois.nic.co",
    "cn" => "whois.cnnic.cn",
    "ru" => "whois.tcinet.ru",
    "in" => "whois.registry.in",
    "eu" => "whois.eu",
    "uk" => "whois.nic.uk",
    "de" => "whois.denic.de",
    "nl" => "whois.domain-registry.nl",
    "br" => "whois.registro.br",
    "jp" => "whois.jprs.jp",
};

/// Formats tried in order when parsing a WHOIS creation date. First match
/// wins; anything else yields no date.
pub static WHOIS_DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%a %b %d %Y",
    "%d-%b-%Y",
    "%Y-%m-%d",
];

lazy_static! {
    /// FQDN grammar: labels of 1-63 `[a-z0-9]` with interior hyphens, joined
    /// by dots. ACE (`xn--`) labels satisfy the grammar as written. Length
    /// bounds are checked separately against the 253-octet limit.
    pub static ref VALID_FQDN_REGEX: Regex = Regex::new(
        r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$"
    )
    .unwrap();

    /// Accepted dictionary words: plain labels or ACE labels.
    pub static ref DICTIONARY_WORD_REGEX: Regex =
        Regex::new(r"^(?:xn--[a-z0-9-]{3,59}|[a-z0-9-]{1,63})$").unwrap();

    /// Accepted TLD-file entries: one or two dot-separated labels.
    pub static ref TLD_ENTRY_REGEX: Regex =
        Regex::new(r"^[a-z0-9-]{2,63}(?:\.[a-z0-9-]{2,63})?$").unwrap();

    pub static ref WHOIS_REGISTRAR_REGEX: Regex =
        Regex::new(r"(?im)^\s*registrar[ .]*:\s+(?:name:\s)?(.+)$").unwrap();

    pub static ref WHOIS_CREATED_REGEX: Regex =
        Regex::new(r"(?im)^\s*(?:created(?: on)?|creation date|registered(?: on)?)[ .]*:\s+(.+)$")
            .unwrap();

    pub static ref WHOIS_REFER_REGEX: Regex =
        Regex::new(r"(?im)^\s*refer:\s+([-a-z0-9.]+)\s*$").unwrap();

    pub static ref META_REFRESH_REGEX: regex::bytes::Regex = regex::bytes::Regex::new(
        r#"(?i)<meta[^>]*?url=(https?://[\w.,?!:;/*#@$&+=\[\]()%~-]*?)""#
    )
    .unwrap();

    pub static ref HTML_ATTR_REGEX: regex::bytes::Regex =
        regex::bytes::Regex::new(r#"(?i)(action|src|href)=".+""#).unwrap();

    pub static ref CSS_URL_REGEX: regex::bytes::Regex =
        regex::bytes::Regex::new(r"(?i)url\(.+\)").unwrap();

    pub static ref KEYBOARD_LAYOUTS: Vec<&'static phf::Map<char, &'static str>> = vec![
        &QWERTY_KEYBOARD_LAYOUT,
        &QWERTZ_KEYBOARD_LAYOUT,
        &AZERTY_KEYBOARD_LAYOUT
    ];

    /// Default User-Agent sent by the fetcher, banner grabber and browser.
    pub static ref USER_AGENT: String = format!(
        "Mozilla/5.0 ({} {}) domtwist/{}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        env!("CARGO_PKG_VERSION"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqdn_regex_accepts_common_shapes() {
        for fqdn in ["example.com", "a.b.c.co.uk", "xn--bcher-kva.de", "e-x.net"] {
            assert!(VALID_FQDN_REGEX.is_match(fqdn), "{fqdn} should match");
        }
    }

    #[test]
    fn test_fqdn_regex_rejects_bad_labels() {
        for fqdn in ["-example.com", "example-.com", "exa mple.com", "Example.com", ""] {
            assert!(!VALID_FQDN_REGEX.is_match(fqdn), "{fqdn} should not match");
        }
    }

    #[test]
    fn test_keyboard_layouts_cover_all_letters() {
        for layout in KEYBOARD_LAYOUTS.iter() {
            for c in ASCII_LOWER.iter() {
                assert!(layout.get(c).is_some(), "layout misses {c}");
            }
        }
    }

    #[test]
    fn test_glyph_tables_have_no_empty_sets() {
        for (_, glyphs) in GLYPHS_ASCII.entries() {
            assert!(!glyphs.is_empty());
        }
        for (_, glyphs) in GLYPHS_UNICODE.entries() {
            assert!(!glyphs.is_empty());
        }
        for (_, table) in GLYPHS_IDN_BY_TLD.entries() {
            assert!(table.len() > 0);
        }
    }

    #[test]
    fn test_whois_extraction_regexes() {
        let response = "Domain Name: EXAMPLE.COM\r\nRegistrar: Example Registrar, Inc.\r\nCreation Date: 1995-08-14T04:00:00Z\r\n";
        let registrar = WHOIS_REGISTRAR_REGEX
            .captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim());
        assert_eq!(registrar, Some("Example Registrar, Inc."));

        let created = WHOIS_CREATED_REGEX
            .captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim());
        assert_eq!(created, Some("1995-08-14T04:00:00Z"));
    }
}
