//! IP-to-country lookups against a MaxMind-format database. The reader is a
//! per-worker capability: opened at worker start, dropped at worker exit, and
//! silently absent when the database cannot be loaded.

use std::net::IpAddr;
use std::path::PathBuf;

use maxminddb::geoip2;

use crate::error::Error;

const DATABASE_FILENAME: &str = "GeoLite2-Country.mmdb";

pub struct GeoIp {
    reader: maxminddb::Reader<Vec<u8>>,
}

/// `GEOLITE2_MMDB` wins; otherwise the database is expected next to the
/// executable.
pub fn database_path() -> PathBuf {
    if let Ok(path) = std::env::var("GEOLITE2_MMDB") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DATABASE_FILENAME)))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILENAME))
}

impl GeoIp {
    pub fn open() -> Result<GeoIp, Error> {
        let path = database_path();
        let reader = maxminddb::Reader::open_readfile(&path).map_err(|err| {
            Error::Init(format!(
                "missing geoip2 database file at {} ({err}); check $GEOLITE2_MMDB",
                path.display()
            ))
        })?;

        Ok(GeoIp { reader })
    }

    /// Probe the database with a known address so a broken file fails the run
    /// up front instead of silently degrading every candidate.
    pub fn validate() -> Result<(), Error> {
        let geo = GeoIp::open()?;
        geo.reader
            .lookup::<geoip2::Country>("8.8.8.8".parse().unwrap())
            .map_err(|err| Error::Init(format!("geoip2 database rejected test lookup: {err}")))?;
        Ok(())
    }

    /// English country name for an address, or `None` when the address is
    /// unparseable or unknown to the database.
    pub fn country_by_addr(&self, addr: &str) -> Option<String> {
        let ip: IpAddr = addr.parse().ok()?;
        let country: geoip2::Country = self.reader.lookup(ip).ok()?;

        country
            .country
            .and_then(|c| c.names)
            .and_then(|names| names.get("en").copied())
            .map(str::to_string)
    }
}

/// Country names occasionally carry qualifiers after a comma; keep the part
/// before it.
pub fn extract_country(name: &str) -> String {
    name.split(',').next().unwrap_or_default().trim().to_string()
}
