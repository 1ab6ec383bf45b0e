//! Command-line front-end and scan driver: argument handling, seed
//! acquisition for the similarity probes, the worker pool with its progress
//! line and signal handling, and the final post-passes (filtering, record
//! trimming, WHOIS) before formatting.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::Parser;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use domtwist::browser::{HeadlessBrowser, PageRenderer};
use domtwist::candidate::{cut_dns_records, filter_candidates, Candidate, CandidateSet, FuzzerKind};
use domtwist::constants::{
    DICTIONARY_WORD_REGEX, HTTP_TIMEOUT, PHASH_SIZE, PROGRESS_TICK, THREAD_COUNT_DEFAULT,
    TLD_ENTRY_REGEX, USER_AGENT,
};
use domtwist::domain;
use domtwist::error::Error;
use domtwist::fetch;
use domtwist::format::{self, OutputFormat};
use domtwist::geoip::GeoIp;
use domtwist::lsh::{LshDigest, LshKind};
use domtwist::permutate::Fuzzer;
use domtwist::phash::PHash;
use domtwist::scan::{JobQueue, LshSeed, ScanOptions, Scanner};
use domtwist::urlparse::UrlTarget;
use domtwist::whois::WhoisClient;

const BANNER: &str = r#"     _                 _            _     _
  __| | ___  _ __ ___ | |___      _(_)___| |_
 / _` |/ _ \| '_ ` _ \| __\ \ /\ / / / __| __|
| (_| | (_) | | | | | | |_ \ V  V /| \__ \ |_
 \__,_|\___/|_| |_| |_|\__| \_/\_/ |_|___/\__| {%s}

"#;

#[derive(Parser, Debug)]
#[command(
    name = "domtwist",
    version,
    about = "Domain name permutation engine for detecting homograph phishing attacks,\ntyposquatting, fraud and brand impersonation"
)]
struct Cli {
    /// Domain name or URL to scan
    domain: String,

    /// Print all DNS records instead of the first ones
    #[arg(long)]
    all: bool,

    /// Determine HTTP and SMTP service banners
    #[arg(long)]
    banners: bool,

    /// Generate more domains using dictionary FILE
    #[arg(long, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// Output format: cli, csv, json, list
    #[arg(long, default_value = "cli", value_name = "FORMAT")]
    format: String,

    /// Use only selected fuzzing algorithms (separated with commas)
    #[arg(long, value_name = "CSV")]
    fuzzers: Option<String>,

    /// Lookup for GeoIP location
    #[arg(long)]
    geoip: bool,

    /// Evaluate web page similarity with LSH algorithm: ssdeep, tlsh
    #[arg(long, value_name = "ALGO")]
    lsh: Option<String>,

    /// Override URL to fetch the original web page from
    #[arg(long, requires = "lsh", value_name = "URL")]
    lsh_url: Option<String>,

    /// Check if MX host can be used to intercept emails
    #[arg(long)]
    mxcheck: bool,

    /// Save output to FILE
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Show only registered domain names
    #[arg(long, conflicts_with = "unregistered")]
    registered: bool,

    /// Show only unregistered domain names
    #[arg(long)]
    unregistered: bool,

    /// Render web pages and evaluate visual similarity
    #[arg(long)]
    phash: bool,

    /// Override URL to render the original web page from
    #[arg(long, requires = "phash", value_name = "URL")]
    phash_url: Option<String>,

    /// Save web page screenshots into DIR
    #[arg(long, requires = "phash", value_name = "DIR")]
    screenshots: Option<PathBuf>,

    /// Start specified NUM of threads
    #[arg(long, default_value_t = THREAD_COUNT_DEFAULT, value_name = "NUM")]
    threads: usize,

    /// Lookup WHOIS database for creation date and registrar
    #[arg(long)]
    whois: bool,

    /// Swap TLD for the original domain from FILE
    #[arg(long, value_name = "FILE")]
    tld: Option<PathBuf>,

    /// DNS servers to query (separated with commas)
    #[arg(long, value_name = "CSV")]
    nameservers: Option<String>,

    /// Set User-Agent STRING
    #[arg(long, value_name = "STRING")]
    useragent: Option<String>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                std::process::exit(0);
            }
            _ => {
                let _ = err.print();
                std::process::exit(1);
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Emit transient status lines only in cli format; machine formats stay
/// clean.
fn print_cli(format: OutputFormat, text: &str) {
    if format == OutputFormat::Cli {
        eprint!("{text}");
        let _ = std::io::stderr().flush();
    }
}

fn lang_supports_utf8() -> bool {
    std::env::var("LANG")
        .map(|lang| lang.to_lowercase().contains("utf-8"))
        .unwrap_or(false)
}

fn load_word_list(path: &PathBuf, pattern: &regex::Regex) -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("unable to open {}", path.display()))?;

    let mut seen = std::collections::HashSet::new();
    let mut words = Vec::new();

    for line in contents.lines() {
        let word = line.trim().to_lowercase();
        if !word.is_empty() && pattern.is_match(&word) && seen.insert(word.clone()) {
            words.push(word);
        }
    }

    Ok(words)
}

#[tokio::main]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_str(&cli.format)?;

    if cli.threads < 1 {
        bail!(Error::Argument(
            "number of threads must be greater than zero".to_string()
        ));
    }

    let selected_fuzzers: Vec<FuzzerKind> = match &cli.fuzzers {
        Some(csv) => csv
            .split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .map(|name| {
                FuzzerKind::from_label(&name)
                    .ok_or_else(|| Error::Argument(format!("unknown fuzzer: {name}")))
            })
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    let nameservers: Vec<IpAddr> = match &cli.nameservers {
        Some(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|server| !server.is_empty())
            .map(|server| {
                server
                    .parse()
                    .map_err(|_| Error::Argument(format!("invalid nameserver address: {server}")))
            })
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    let dictionary = match &cli.dictionary {
        Some(path) => load_word_list(path, &DICTIONARY_WORD_REGEX)?,
        None => Vec::new(),
    };

    let tld_dictionary = match &cli.tld {
        Some(path) => load_word_list(path, &TLD_ENTRY_REGEX)?,
        None => Vec::new(),
    };

    let mut output_file = match &cli.output {
        Some(path) => Some(
            File::create(path).with_context(|| format!("unable to open {}", path.display()))?,
        ),
        None => None,
    };

    if let Some(dir) = &cli.screenshots {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("unable to create {}", dir.display()))?;
    }

    if cli.geoip {
        GeoIp::validate()?;
    }

    let user_agent = cli.useragent.clone().unwrap_or_else(|| USER_AGENT.clone());

    let target = Arc::new(
        UrlTarget::parse(&cli.domain)
            .map_err(|_| Error::InvalidDomain {
                expected: "domain name or http(s) URL".to_string(),
                found: cli.domain.clone(),
            })?,
    );

    let fuzzer = Fuzzer::new(&target.domain, dictionary, tld_dictionary);
    let candidates = fuzzer.generate(&selected_fuzzers);

    if candidates.is_empty() {
        bail!(Error::PermutationEmpty);
    }

    // The list format needs no scanning at all.
    if output_format == OutputFormat::List {
        let rows = candidates.into_sorted_vec();
        return write_output(&mut output_file, &format::to_list(&rows));
    }

    if output_format == OutputFormat::Cli && output_file.is_none() && std::io::stdout().is_terminal()
    {
        let color = rand::thread_rng().gen_range(1..=8);
        let banner = BANNER.replace("{%s}", &format!("{{{}}}", env!("CARGO_PKG_VERSION")));
        eprint!("\x1b[3{color}m\x1b[1m{banner}\x1b[39m\x1b[0m");
    }

    // Seed digest for content similarity; a null digest disables the probe
    // for the whole run.
    let mut lsh_kind = match &cli.lsh {
        Some(name) => Some(LshKind::from_str(name)?),
        None => None,
    };
    let mut lsh_seed = None;

    if let Some(kind) = lsh_kind {
        let request_url = match &cli.lsh_url {
            Some(url) => UrlTarget::parse(url)?.full_uri(None),
            None => target.full_uri(None),
        };

        print_cli(output_format, &format!("fetching content from: {request_url} "));

        let page = fetch::fetch(&request_url, HTTP_TIMEOUT, &user_agent, true)
            .await
            .map_err(|err| Error::Init(format!("unable to fetch {request_url}: {err}")))?;

        let effective_url = page
            .url
            .split('?')
            .next()
            .unwrap_or(&page.url)
            .to_string();
        print_cli(
            output_format,
            &format!("> {} [{:.1} KB]\n", effective_url, page.content.len() as f64 / 1024.0),
        );

        match LshDigest::hash(kind, &page.normalized) {
            Some(digest) => {
                lsh_seed = Some(LshSeed {
                    digest,
                    effective_url,
                });
            }
            None => {
                debug!("seed page digest is null, disabling LSH probes");
                lsh_kind = None;
            }
        }
    }

    // Seed screenshot hash; failures here are fatal because the user asked
    // for visual similarity explicitly.
    let mut phash_seed = None;
    if cli.phash {
        let request_url = match &cli.phash_url {
            Some(url) => UrlTarget::parse(url)?.full_uri(None),
            None => target.full_uri(None),
        };

        print_cli(output_format, &format!("rendering web page: {request_url}\n"));

        let browser = HeadlessBrowser::launch(&user_agent)?;
        let screenshot = tokio::task::block_in_place(|| browser.render(&request_url))
            .map_err(|err| Error::Init(format!("unable to render {request_url}: {err}")))?;

        phash_seed = Some(PHash::from_image_bytes(&screenshot, PHASH_SIZE)?);
    }

    let options = Arc::new(ScanOptions {
        ext_dns: true,
        geoip: cli.geoip,
        banners: cli.banners,
        mx_check: cli.mxcheck,
        lsh: lsh_kind,
        lsh_seed,
        phash: cli.phash,
        phash_seed,
        screenshot_dir: cli.screenshots.clone(),
        nameservers,
        user_agent: user_agent.clone(),
    });

    let total = candidates.len();
    let jobs: JobQueue = Arc::new(Mutex::new(
        candidates.into_values().collect::<VecDeque<Candidate>>(),
    ));

    let stopped = Arc::new(AtomicBool::new(false));
    install_signal_handler(stopped.clone());

    let (results_tx, mut results_rx) = mpsc::channel::<Candidate>(total.max(1));
    let session_id: u32 = rand::thread_rng().gen();

    let mut workers = Vec::with_capacity(cli.threads);
    for _ in 0..cli.threads {
        let scanner = Scanner::new(session_id, target.clone(), options.clone(), stopped.clone());
        workers.push(tokio::spawn(
            scanner.run(jobs.clone(), results_tx.clone()),
        ));
    }
    drop(results_tx);

    print_cli(output_format, &format!("started {} scanner threads\n", cli.threads));

    let started = Instant::now();
    let mut ticker = tokio::time::interval(PROGRESS_TICK);
    let mut completed = 0usize;
    let mut found = 0usize;
    let mut scanned: Vec<Candidate> = Vec::with_capacity(total);

    loop {
        tokio::select! {
            result = results_rx.recv() => match result {
                Some(candidate) => {
                    completed += 1;
                    if candidate.is_registered() {
                        found += 1;
                    }
                    scanned.push(candidate);
                }
                None => break,
            },
            _ = ticker.tick() => {
                if completed > 0 {
                    let elapsed = started.elapsed().as_secs_f64();
                    let rate = ((completed as f64 / elapsed) as usize).max(1);
                    let eta = (total - completed) / rate;
                    print_cli(
                        output_format,
                        &format!(
                            "\rpermutations: {:.2}% of {} | found: {} | eta: {}m {:02}s | speed: {} qps",
                            completed as f64 / total as f64 * 100.0,
                            total,
                            found,
                            eta / 60,
                            eta % 60,
                            rate,
                        ),
                    );
                }
            }
        }
    }

    print_cli(output_format, "\n");

    for worker in workers {
        let _ = worker.await;
    }

    // Whatever the workers never reached (cancellation) still belongs to the
    // result set, just without evidence.
    let leftovers: Vec<Candidate> = jobs.lock().unwrap().drain(..).collect();
    let all_candidates: CandidateSet = scanned.into_iter().chain(leftovers).collect();

    let mut rows = filter_candidates(
        all_candidates.into_sorted_vec(),
        cli.registered,
        cli.unregistered,
    );

    if !cli.all {
        cut_dns_records(&mut rows);
    }

    if cli.whois {
        whois_pass(&mut rows, output_format).await;
    }

    print_cli(output_format, "\n");

    let rendered = match output_format {
        OutputFormat::Csv => format::to_csv(&rows),
        OutputFormat::Json => format::to_json(&rows)?,
        OutputFormat::List => format::to_list(&rows),
        OutputFormat::Cli => {
            let color = output_file.is_none()
                && std::io::stdout().is_terminal()
                && !cfg!(windows);
            format::to_cli(&rows, color, lang_supports_utf8())
        }
    };

    write_output(&mut output_file, &rendered)
}

/// Sequential WHOIS enrichment over registered candidates.
async fn whois_pass(rows: &mut [Candidate], output_format: OutputFormat) {
    let client = WhoisClient::new();
    let total = rows.iter().filter(|row| row.is_registered()).count();
    let mut index = 0usize;

    for row in rows.iter_mut().filter(|row| row.is_registered()) {
        index += 1;
        print_cli(
            output_format,
            &format!(
                "\rWHOIS: {} ({:.2}%)",
                row.domain,
                index as f64 / total as f64 * 100.0
            ),
        );

        let parts = domain::split(&row.domain);
        let registrable = domain::join("", &parts.sld, &parts.tld);
        let info = client.lookup(&registrable).await;

        if let Some(created) = info.created {
            row.whois_created = Some(created.to_string());
        }
        if let Some(registrar) = info.registrar {
            row.whois_registrar = Some(registrar);
        }
    }

    print_cli(output_format, "\n");
}

fn install_signal_handler(stopped: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let interrupted = async {
            let _ = tokio::signal::ctrl_c().await;
        };

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut terminate =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = interrupted => {}
                _ = terminate.recv() => {}
            }
        }

        #[cfg(not(unix))]
        interrupted.await;

        eprintln!("\nstopping threads...");
        stopped.store(true, Ordering::SeqCst);
    });
}

fn write_output(output_file: &mut Option<File>, rendered: &str) -> anyhow::Result<()> {
    match output_file {
        Some(file) => {
            writeln!(file, "{rendered}").context("unable to write output file")?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
