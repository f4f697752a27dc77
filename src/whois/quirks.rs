// iwhois - Registry Quirks
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-registry query rewriting and reply charsets
//!
//! Templates use `{{data}}` as the placeholder for the query value, e.g.
//! RIPE wants `{{data}} -B` so that contact data is not filtered, and ARIN
//! only answers ASN lookups phrased as `a {{data}}`.

use std::collections::HashMap;

use encoding_rs::Encoding;

use crate::config::{AFRINIC_WHOIS_SERVER, ARIN_WHOIS_SERVER, RIPE_WHOIS_SERVER};
use crate::core::{is_asn, is_ip_literal, strip_asn_prefix};
use crate::log_warn;

pub const DATA_PLACEHOLDER: &str = "{{data}}";

#[derive(Debug, Clone)]
struct CharsetRule {
    encoding: &'static Encoding,
    template: String,
}

/// Rewrite and decoding rules keyed by WHOIS host
#[derive(Debug, Clone, Default)]
pub struct QuirkTable {
    charsets: HashMap<String, CharsetRule>,
    quirks: HashMap<String, String>,
    asn_quirks: HashMap<String, String>,
    ip_quirks: HashMap<String, String>,
}

impl QuirkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the registries whose behaviour is known to need them
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert_quirk(RIPE_WHOIS_SERVER, "{{data}} -B");
        table.insert_quirk(AFRINIC_WHOIS_SERVER, "{{data}} -B");
        table.insert_asn_quirk(ARIN_WHOIS_SERVER, "a {{data}}");
        table.insert_ip_quirk(ARIN_WHOIS_SERVER, "n + {{data}}");
        table
    }

    /// Declares the reply charset of `host`, optionally with a command that
    /// must prefix every query. Returns `false` for unknown charset labels.
    pub fn insert_charset(&mut self, host: &str, label: &str, command: Option<&str>) -> bool {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            return false;
        };
        let template = match command.map(str::trim).filter(|c| !c.is_empty()) {
            Some(command) => format!("{} {}", command, DATA_PLACEHOLDER),
            None => DATA_PLACEHOLDER.to_string(),
        };
        self.charsets.insert(
            host.to_lowercase(),
            CharsetRule {
                encoding,
                template,
            },
        );
        true
    }

    pub fn insert_quirk(&mut self, host: &str, template: &str) {
        self.quirks.insert(host.to_lowercase(), template.to_string());
    }

    pub fn insert_asn_quirk(&mut self, host: &str, template: &str) {
        self.asn_quirks.insert(host.to_lowercase(), template.to_string());
    }

    pub fn insert_ip_quirk(&mut self, host: &str, template: &str) {
        self.ip_quirks.insert(host.to_lowercase(), template.to_string());
    }

    /// Merges a `servers_charset_list` file (`host charset [command...]`)
    pub fn load_charset_list(&mut self, text: &str) -> usize {
        let mut loaded = 0;
        for (host, label, command) in parse_charset_list(text) {
            if self.insert_charset(&host, &label, command.as_deref()) {
                loaded += 1;
            } else {
                log_warn!("Ignoring unknown charset '{}' for {}", label, host);
            }
        }
        loaded
    }

    /// Explicit reply encoding for `host`, if one is configured
    pub fn encoding(&self, host: &str) -> Option<&'static Encoding> {
        self.charsets.get(&host.to_lowercase()).map(|rule| rule.encoding)
    }

    /// Builds the line actually sent to `host` for `value`.
    ///
    /// Stages run in a fixed order (charset command, host flag, ASN
    /// rewrite, IP rewrite). Each stage works on the output of the previous
    /// one, while the ASN/IP checks look at the shape of the original value.
    pub fn apply(&self, host: &str, value: &str) -> String {
        let host = host.to_lowercase();
        let mut line = value.to_string();

        if let Some(rule) = self.charsets.get(&host) {
            line = fill(&rule.template, &line);
        }
        if let Some(template) = self.quirks.get(&host) {
            line = fill(template, &line);
        }
        if is_asn(value) {
            if let Some(template) = self.asn_quirks.get(&host) {
                line = fill(template, strip_asn_prefix(&line));
            }
        }
        if is_ip_literal(value) {
            if let Some(template) = self.ip_quirks.get(&host) {
                line = fill(template, &line);
            }
        }

        line
    }
}

fn fill(template: &str, data: &str) -> String {
    template.replacen(DATA_PLACEHOLDER, data, 1)
}

/// Parses the `servers_charset_list` format into `(host, charset, command)`
pub fn parse_charset_list(text: &str) -> Vec<(String, String, Option<String>)> {
    let mut entries = Vec::new();

    for line in text.lines() {
        if line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().filter(|f| !f.contains('#')).collect();
        let Some((host, rest)) = fields.split_first() else {
            continue;
        };

        let charset = rest.first().copied().unwrap_or("utf-8").to_string();
        let command = (rest.len() > 1).then(|| rest[1..].join(" "));
        entries.push((host.to_lowercase(), charset, command));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ripe_flag_appended() {
        let table = QuirkTable::builtin();
        assert_eq!(table.apply("whois.ripe.net", "ORG-TCA23-RIPE"), "ORG-TCA23-RIPE -B");
        assert_eq!(table.apply("WHOIS.AFRINIC.NET", "AS33762"), "AS33762 -B");
    }

    #[test]
    fn test_unknown_host_untouched() {
        let table = QuirkTable::builtin();
        assert_eq!(table.apply("whois.verisign-grs.com", "google.com"), "google.com");
        assert_eq!(table.apply("whois.iana.org", "AS13335"), "AS13335");
    }

    #[test]
    fn test_arin_asn_rewrite() {
        let table = QuirkTable::builtin();
        assert_eq!(table.apply("whois.arin.net", "AS174"), "a 174");
        assert_eq!(table.apply("whois.arin.net", "as174"), "a 174");
    }

    #[test]
    fn test_arin_ip_rewrite() {
        let table = QuirkTable::builtin();
        assert_eq!(table.apply("whois.arin.net", "8.8.8.8"), "n + 8.8.8.8");
        assert_eq!(
            table.apply("whois.arin.net", "2001:4860:4860::8888"),
            "n + 2001:4860:4860::8888"
        );
        assert_eq!(table.apply("whois.arin.net", "NET-8-8-8-0-1"), "NET-8-8-8-0-1");
    }

    #[test]
    fn test_arin_leaves_short_numbers_alone() {
        let table = QuirkTable::builtin();
        assert_eq!(table.apply("whois.arin.net", "10"), "10");
        assert_eq!(table.apply("whois.arin.net", "127.1"), "127.1");
        assert_eq!(table.apply("whois.arin.net", "1.1.1"), "1.1.1");
        assert_eq!(table.apply("whois.arin.net", "192.0.2.0/24"), "n + 192.0.2.0/24");
    }

    #[test]
    fn test_stages_compose_in_order() {
        let mut table = QuirkTable::new();
        assert!(table.insert_charset("whois.example.net", "iso-8859-1", Some("-T dn,ace")));
        table.insert_quirk("whois.example.net", "{{data}} -B");

        assert_eq!(table.apply("whois.example.net", "example.de"), "-T dn,ace example.de -B");
    }

    #[test]
    fn test_asn_rewrite_after_host_flag() {
        let mut table = QuirkTable::new();
        table.insert_quirk("whois.example.net", "{{data}} -B");
        table.insert_asn_quirk("whois.example.net", "as {{data}}");

        assert_eq!(table.apply("whois.example.net", "AS65000"), "as 65000 -B");
    }

    #[test]
    fn test_charset_lookup() {
        let mut table = QuirkTable::new();
        assert!(table.insert_charset("whois.jprs.jp", "iso-2022-jp", None));
        assert!(!table.insert_charset("whois.bogus.example", "no-such-charset", None));

        assert_eq!(table.encoding("whois.jprs.jp"), Some(encoding_rs::ISO_2022_JP));
        assert_eq!(table.encoding("whois.bogus.example"), None);
        assert_eq!(table.apply("whois.jprs.jp", "example.jp"), "example.jp");
    }

    #[test]
    fn test_parse_charset_list() {
        let list = concat!(
            "# comment\n",
            "\n",
            "whois.denic.de\t\tutf-8\t-T dn,ace\n",
            "whois.jprs.jp iso-2022-jp #trailing\n",
            "whois.example.org\n",
        );
        let entries = parse_charset_list(list);
        assert_eq!(
            entries,
            vec![
                (
                    "whois.denic.de".to_string(),
                    "utf-8".to_string(),
                    Some("-T dn,ace".to_string())
                ),
                ("whois.jprs.jp".to_string(), "iso-2022-jp".to_string(), None),
                ("whois.example.org".to_string(), "utf-8".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_load_charset_list() {
        let mut table = QuirkTable::new();
        let loaded =
            table.load_charset_list("whois.denic.de utf-8 -T dn,ace\nwhois.bad.example nonsense\n");
        assert_eq!(loaded, 1);
        assert_eq!(table.apply("whois.denic.de", "example.de"), "-T dn,ace example.de");
    }
}
