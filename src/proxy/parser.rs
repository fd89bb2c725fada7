//! Proxy parser module for turning provider payloads into candidates

use crate::proxy::models::Candidate;
use once_cell::sync::Lazy;
use regex::Regex;

static URL_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:([^:]+):([^@]+)@)?([^:/]+):(\d+)/?$").expect("Invalid URL regex")
});

static AUTH_AT_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:]+):([^@]+)@([^:]+):(\d+)$").expect("Invalid auth regex"));

/// `<td>IP</td><td>PORT</td>` with an optional two-letter country code cell
static TABLE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<td>\s*(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\s*</td>\s*<td>\s*(\d{1,5})\s*</td>(?:\s*<td>\s*([A-Z]{2})\s*</td>)?",
    )
    .expect("Invalid table row regex")
});

/// Regex pattern to match IP:PORT patterns in text
static IP_PORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d{1,5})\b")
        .expect("Invalid IP:PORT regex")
});

/// Proxy parser for candidate lists published by providers
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// Supports formats:
    /// - IP:PORT
    /// - IP:PORT:USER:PASS
    /// - USER:PASS@IP:PORT
    /// - http://IP:PORT
    /// - http://USER:PASS@IP:PORT
    pub fn parse_line(line: &str) -> Option<Candidate> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        Self::parse_url_format(line)
            .or_else(|| Self::parse_auth_at_format(line))
            .or_else(|| Self::parse_colon_format(line))
    }

    fn parse_url_format(line: &str) -> Option<Candidate> {
        let caps = URL_FORMAT.captures(line)?;
        let port: u16 = caps[4].parse().ok()?;
        let candidate = Candidate::new(&caps[3], port);

        match (caps.get(1), caps.get(2)) {
            (Some(user), Some(pass)) => {
                Some(candidate.with_auth(user.as_str().to_string(), pass.as_str().to_string()))
            }
            _ => Some(candidate),
        }
    }

    fn parse_auth_at_format(line: &str) -> Option<Candidate> {
        let caps = AUTH_AT_FORMAT.captures(line)?;
        let port: u16 = caps[4].parse().ok()?;
        Some(Candidate::new(&caps[3], port).with_auth(caps[1].to_string(), caps[2].to_string()))
    }

    fn parse_colon_format(line: &str) -> Option<Candidate> {
        let parts: Vec<&str> = line.split(':').collect();

        match parts.as_slice() {
            [host, port] => Some(Candidate::new(*host, port.parse().ok()?)),
            [host, port, username, password] => Some(
                Candidate::new(*host, port.parse().ok()?)
                    .with_auth(username.to_string(), password.to_string()),
            ),
            _ => None,
        }
    }

    /// Parse a provider payload
    ///
    /// Tries line formats first, then HTML table rows, then any IP:PORT
    /// pair embedded in free text. Duplicate host:port pairs keep their
    /// first occurrence.
    pub fn parse_document(content: &str) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = content.lines().filter_map(Self::parse_line).collect();

        if candidates.is_empty() {
            candidates = Self::parse_table_rows(content);
        }

        if candidates.is_empty() {
            candidates = Self::extract_ip_ports(content);
        }

        dedup_candidates(candidates)
    }

    fn parse_table_rows(content: &str) -> Vec<Candidate> {
        TABLE_ROW
            .captures_iter(content)
            .filter_map(|cap| {
                let host = cap.get(1)?.as_str();
                let port = valid_port(cap.get(2)?.as_str())?;
                if !valid_ipv4(host) {
                    return None;
                }
                let candidate = Candidate::new(host, port);
                Some(match cap.get(3) {
                    Some(country) => candidate.with_country(country.as_str()),
                    None => candidate,
                })
            })
            .collect()
    }

    fn extract_ip_ports(content: &str) -> Vec<Candidate> {
        IP_PORT
            .captures_iter(content)
            .filter_map(|cap| {
                let host = cap.get(1)?.as_str();
                let port = valid_port(cap.get(2)?.as_str())?;
                valid_ipv4(host).then(|| Candidate::new(host, port))
            })
            .collect()
    }
}

/// Drop repeated host:port pairs, keeping discovery order
pub fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert((c.host.clone(), c.port)))
        .collect()
}

fn valid_ipv4(host: &str) -> bool {
    host.split('.').count() == 4 && host.split('.').all(|part| part.parse::<u8>().is_ok())
}

fn valid_port(port: &str) -> Option<u16> {
    port.parse::<u16>().ok().filter(|p| *p != 0)
}
