//! Geolocation module for filling in missing candidate countries using MMDB

use crate::proxy::models::Candidate;
use crate::Result;
use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// GeoLocator for looking up IP addresses in MMDB databases
#[derive(Clone)]
pub struct GeoLocator {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoLocator {
    /// Create a new GeoLocator from an MMDB file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Look up the ISO country code for an IP address string
    pub fn country_code(&self, ip_str: &str) -> Result<Option<String>> {
        let ip: IpAddr = ip_str.parse()?;
        let lookup_result = self.reader.lookup(ip)?;
        let country: Option<geoip2::Country> = lookup_result.decode()?;

        Ok(country.and_then(|c| c.country.iso_code.map(String::from)))
    }

    /// Fill in the country of candidates whose provider did not report one
    ///
    /// Hostnames and unknown addresses are left as they are.
    pub fn enrich(&self, candidates: &mut [Candidate]) {
        for candidate in candidates.iter_mut().filter(|c| c.country.is_none()) {
            if let Some(host) = &candidate.host {
                if let Ok(code) = self.country_code(host) {
                    candidate.country = code;
                }
            }
        }
    }
}
