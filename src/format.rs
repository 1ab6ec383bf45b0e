//! Result-set serialisation: machine formats (list, csv, json) and the
//! aligned, optionally coloured terminal table.

use std::str::FromStr;

use serde::Serialize;

use crate::candidate::Candidate;
use crate::domain::idna_decode;
use crate::error::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Cli,
    Csv,
    Json,
    List,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<OutputFormat, Error> {
        match value {
            "cli" => Ok(OutputFormat::Cli),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "list" => Ok(OutputFormat::List),
            other => Err(Error::Argument(format!(
                "invalid output format: {other} (choose from cli, csv, json, list)"
            ))),
        }
    }
}

/// Column identifiers in their fixed discovery order. CSV headers appear in
/// the order the first populated row reveals them, scanning fields in this
/// sequence.
const EVIDENCE_COLUMNS: [&str; 13] = [
    "dns_a",
    "dns_aaaa",
    "dns_ns",
    "dns_mx",
    "geoip",
    "mx_spy",
    "banner_http",
    "banner_smtp",
    "whois_registrar",
    "whois_created",
    "ssdeep",
    "tlsh",
    "phash",
];

fn score(value: Option<u8>) -> Option<u8> {
    value.filter(|s| *s > 0)
}

fn field_value(candidate: &Candidate, column: &str) -> String {
    match column {
        "fuzzer" => candidate.fuzzer.label().to_string(),
        "domain" => candidate.domain.clone(),
        "dns_a" => candidate.dns_a.join(";"),
        "dns_aaaa" => candidate.dns_aaaa.join(";"),
        "dns_ns" => candidate.dns_ns.join(";"),
        "dns_mx" => candidate.dns_mx.join(";"),
        "geoip" => candidate.geoip.clone().unwrap_or_default(),
        "mx_spy" => {
            if candidate.mx_spy {
                "True".to_string()
            } else {
                String::new()
            }
        }
        "banner_http" => candidate.banner_http.clone().unwrap_or_default(),
        "banner_smtp" => candidate.banner_smtp.clone().unwrap_or_default(),
        "whois_registrar" => candidate.whois_registrar.clone().unwrap_or_default(),
        "whois_created" => candidate.whois_created.clone().unwrap_or_default(),
        "ssdeep" => score(candidate.ssdeep).map(|s| s.to_string()).unwrap_or_default(),
        "tlsh" => score(candidate.tlsh).map(|s| s.to_string()).unwrap_or_default(),
        "phash" => score(candidate.phash).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    }
}

/// One ASCII domain per line.
pub fn to_list(rows: &[Candidate]) -> String {
    rows.iter()
        .map(|candidate| candidate.domain.as_str())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Header plus one row per candidate; only columns some row populates are
/// emitted, and values containing commas are quoted.
pub fn to_csv(rows: &[Candidate]) -> String {
    let mut columns: Vec<&str> = vec!["fuzzer", "domain"];

    for candidate in rows {
        for column in EVIDENCE_COLUMNS {
            if !columns.contains(&column) && !field_value(candidate, column).is_empty() {
                columns.push(column);
            }
        }
    }

    let mut lines = vec![columns.join(",")];
    for candidate in rows {
        let line = columns
            .iter()
            .map(|column| {
                let value = field_value(candidate, column);
                if value.contains(',') {
                    format!("\"{value}\"")
                } else {
                    value
                }
            })
            .collect::<Vec<String>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Pretty-printed JSON array with four-space indentation; empty evidence
/// fields are omitted by the candidate's serde attributes.
pub fn to_json(rows: &[Candidate]) -> Result<String, Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

    rows.serialize(&mut serializer)
        .map_err(|err| Error::Init(format!("json serialisation: {err}")))?;

    String::from_utf8(buffer).map_err(|err| Error::Init(format!("json serialisation: {err}")))
}

const FG_YELLOW: &str = "\x1b[33m";
const FG_CYAN: &str = "\x1b[36m";
const FG_BLUE: &str = "\x1b[34m";
const FG_RESET: &str = "\x1b[39m";

/// Aligned terminal table. `color` should be true only for non-Windows TTYs;
/// `decode_idn` renders Punycode domains in Unicode (set when `LANG`
/// advertises UTF-8).
pub fn to_cli(rows: &[Candidate], color: bool, decode_idn: bool) -> String {
    let (yellow, cyan, blue, reset) = if color {
        (FG_YELLOW, FG_CYAN, FG_BLUE, FG_RESET)
    } else {
        ("", "", "", "")
    };

    let kv = |key: &str, value: &str| {
        if key.is_empty() {
            format!("{cyan}{value}{reset}")
        } else {
            format!("{yellow}{key}{cyan}{value}{reset}")
        }
    };

    let display_domains: Vec<String> = rows
        .iter()
        .map(|candidate| {
            if decode_idn {
                idna_decode(&candidate.domain).unwrap_or_else(|_| candidate.domain.clone())
            } else {
                candidate.domain.clone()
            }
        })
        .collect();

    let fuzzer_width = rows
        .iter()
        .map(|candidate| candidate.fuzzer.label().len())
        .max()
        .unwrap_or(0)
        + 1;
    let domain_width = display_domains
        .iter()
        .map(|domain| domain.chars().count())
        .max()
        .unwrap_or(0)
        + 1;

    let mut lines = Vec::with_capacity(rows.len());

    for (candidate, display_domain) in rows.iter().zip(&display_domains) {
        let mut info: Vec<String> = Vec::new();

        if !candidate.dns_a.is_empty() {
            let geo = candidate
                .geoip
                .as_ref()
                .map(|country| kv("/", &country.replace(' ', "")))
                .unwrap_or_default();
            info.push(format!("{}{geo}", candidate.dns_a.join(";")));
        }

        if !candidate.dns_aaaa.is_empty() {
            info.push(candidate.dns_aaaa.join(";"));
        }

        if !candidate.dns_ns.is_empty() {
            info.push(kv("NS:", &candidate.dns_ns.join(";")));
        }

        if !candidate.dns_mx.is_empty() {
            let label = if candidate.mx_spy { "SPYING-MX:" } else { "MX:" };
            info.push(kv(label, &candidate.dns_mx.join(";")));
        }

        if let Some(banner) = &candidate.banner_http {
            info.push(kv("HTTP:", banner));
        }

        if let Some(banner) = &candidate.banner_smtp {
            info.push(kv("SMTP:", banner));
        }

        if let Some(registrar) = &candidate.whois_registrar {
            info.push(kv("REGISTRAR:", registrar));
        }

        if let Some(created) = &candidate.whois_created {
            info.push(kv("CREATED:", created));
        }

        if let Some(value) = score(candidate.ssdeep) {
            info.push(kv("SSDEEP:", &format!("{value}%")));
        }

        if let Some(value) = score(candidate.tlsh) {
            info.push(kv("TLSH:", &format!("{value}%")));
        }

        if let Some(value) = score(candidate.phash) {
            info.push(kv("PHASH:", &format!("{value}%")));
        }

        let info_rendered = if info.is_empty() {
            "-".to_string()
        } else {
            info.join(" ")
        };

        lines.push(format!(
            "{blue}{:<fuzzer_width$}{reset} {:<domain_width$} {}",
            candidate.fuzzer.label(),
            display_domain,
            info_rendered,
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::FuzzerKind;

    fn sample_rows() -> Vec<Candidate> {
        vec![
            Candidate {
                dns_a: vec!["192.0.2.1".to_string()],
                dns_ns: vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()],
                geoip: Some("United States".to_string()),
                banner_http: Some("nginx/1.24.0 (Ubuntu, x64)".to_string()),
                ..Candidate::new(FuzzerKind::Original, "example.com")
            },
            Candidate {
                dns_mx: vec!["mail.examp1e.com".to_string()],
                mx_spy: true,
                ssdeep: Some(83),
                ..Candidate::new(FuzzerKind::Homoglyph, "examp1e.com")
            },
            Candidate::new(FuzzerKind::Omission, "exmple.com"),
        ]
    }

    #[test]
    fn test_list_is_one_domain_per_line() {
        let output = to_list(&sample_rows());
        assert_eq!(output, "example.com\nexamp1e.com\nexmple.com");
    }

    #[test]
    fn test_csv_discovers_columns_in_field_order() {
        let output = to_csv(&sample_rows());
        let header = output.lines().next().unwrap();

        // dns_a/dns_ns/geoip/banner_http come from row one, then row two
        // contributes dns_mx/mx_spy/ssdeep; discovery order is by row, then
        // by the fixed field order.
        assert_eq!(
            header,
            "fuzzer,domain,dns_a,dns_ns,geoip,banner_http,dns_mx,mx_spy,ssdeep"
        );
    }

    #[test]
    fn test_csv_quotes_values_with_commas() {
        let output = to_csv(&sample_rows());
        assert!(output.contains("\"nginx/1.24.0 (Ubuntu, x64)\""));
    }

    #[test]
    fn test_csv_renders_mx_spy_as_literal_true() {
        let output = to_csv(&sample_rows());
        let spying_row = output
            .lines()
            .find(|line| line.starts_with("homoglyph"))
            .unwrap();
        assert!(spying_row.contains("True"));
    }

    #[test]
    fn test_json_round_trips() {
        let rows = sample_rows();
        let output = to_json(&rows).unwrap();

        // Four-space indentation, not serde_json's default two.
        assert!(output.contains("\n    {"));

        let parsed: Vec<Candidate> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), rows.len());
        assert_eq!(parsed[0].domain, "example.com");
        assert_eq!(parsed[1].ssdeep, Some(83));
        assert!(parsed[2].dns_a.is_empty());
    }

    #[test]
    fn test_cli_labels_and_alignment() {
        let output = to_cli(&sample_rows(), false, false);
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].contains("NS:ns1.example.com;ns2.example.com"));
        assert!(lines[0].contains("/UnitedStates"));
        assert!(lines[1].contains("SPYING-MX:mail.examp1e.com"));
        assert!(lines[1].contains("SSDEEP:83%"));
        assert!(lines[2].trim_end().ends_with('-'));

        // No ANSI escapes without color.
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_cli_color_uses_ansi_codes() {
        let output = to_cli(&sample_rows(), true, false);
        assert!(output.contains(FG_BLUE));
        assert!(output.contains(FG_RESET));
    }

    #[test]
    fn test_cli_decodes_idn_for_display() {
        let rows = vec![Candidate::new(FuzzerKind::Original, "xn--bcher-kva.de")];
        let output = to_cli(&rows, false, true);
        assert!(output.contains("bücher.de"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("cli").unwrap(), OutputFormat::Cli);
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("xml").is_err());
    }
}
