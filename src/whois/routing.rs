// iwhois - Registry Routing
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Suffix based choice of the first server to ask
//!
//! Two tables are kept: domain suffixes (`.com`, `.co.uk`) and registration
//! handle suffixes (`-ripe`, `-arin`). Domains are checked first. Within a
//! table the longest matching suffix wins.

use crate::config::IANA_WHOIS_SERVER;

const AFILIAS_WHOIS_SERVER: &str = "whois.afilias-grs.info";
const VERISIGN_WHOIS_SERVER: &str = "whois.verisign-grs.com";

#[derive(Debug, Clone, Default)]
struct SuffixTable {
    // Sorted by suffix length, longest first
    entries: Vec<(String, String)>,
}

impl SuffixTable {
    fn insert(&mut self, suffix: &str, host: &str) {
        let suffix = suffix.to_lowercase();
        let host = host.to_lowercase();
        match self.entries.iter_mut().find(|(s, _)| *s == suffix) {
            Some(entry) => entry.1 = host,
            None => {
                self.entries.push((suffix, host));
                self.entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
            }
        }
    }

    fn lookup(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(suffix, _)| value.ends_with(suffix.as_str()))
            .map(|(_, host)| host.as_str())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    domains: SuffixTable,
    handles: SuffixTable,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_domain(&mut self, suffix: &str, host: &str) {
        self.domains.insert(suffix, host);
    }

    pub fn insert_handle(&mut self, suffix: &str, host: &str) {
        self.handles.insert(suffix, host);
    }

    /// Number of (domain, handle) suffixes known
    pub fn sizes(&self) -> (usize, usize) {
        (self.domains.len(), self.handles.len())
    }

    /// Suffix match only; `None` means no table knows the value
    pub fn lookup(&self, value: &str) -> Option<&str> {
        let value = value.trim().trim_end_matches('.').to_lowercase();
        self.domains
            .lookup(&value)
            .or_else(|| self.handles.lookup(&value))
    }

    /// Server a recursive resolution of `value` starts at
    pub fn start_host(&self, value: &str) -> &str {
        self.lookup(value).unwrap_or(IANA_WHOIS_SERVER)
    }

    /// Merges a `tld_serv_list` file. Entries starting with `.` are domain
    /// suffixes, entries starting with `-` are handle suffixes.
    pub fn load_tld_serv_list(&mut self, text: &str) -> usize {
        let mut loaded = 0;
        for (suffix, host) in parse_tld_serv_list(text) {
            if suffix.starts_with('.') {
                self.insert_domain(&suffix, &host);
            } else if suffix.starts_with('-') {
                self.insert_handle(&suffix, &host);
            } else {
                continue;
            }
            loaded += 1;
        }
        loaded
    }
}

/// Parses the `tld_serv_list` format into `(suffix, host)` pairs, dropping
/// suffixes that have no usable WHOIS server (`WEB`, `NONE`, `ARPA`, `IP6`).
pub fn parse_tld_serv_list(text: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();

    for line in text.lines() {
        if line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().filter(|f| !f.contains('#')).collect();
        let (Some(suffix), Some(kind)) = (fields.first(), fields.get(1)) else {
            continue;
        };

        let host = match *kind {
            "WEB" | "NONE" | "ARPA" | "IP6" => continue,
            "AFILIAS" => AFILIAS_WHOIS_SERVER,
            "VERISIGN" => fields.get(2).copied().unwrap_or(VERISIGN_WHOIS_SERVER),
            host => host,
        };
        entries.push((suffix.to_lowercase(), host.to_lowercase()));
    }

    entries
}
