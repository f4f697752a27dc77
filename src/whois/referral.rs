// iwhois - Referral Parser
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Extraction of "ask that server instead" lines from WHOIS replies
//!
//! Registries announce the next server in a handful of ways:
//!
//! ```text
//! refer:        whois.verisign-grs.com
//! whois:        whois.arin.net
//! ReferralServer:  rwhois://rwhois.example.net:4321
//! Registrar WHOIS Server: whois.markmonitor.com
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::DEFAULT_WHOIS_PORT;

static LABELLED_SERVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\w+ WHOIS Server:\s+(.+)$").expect("Invalid WHOIS Server regex pattern")
});

const REFERRAL_KEYS: [&str; 3] = ["refer:", "whois:", "referralserver:"];

/// A server named by a referral line
#[derive(Debug, Clone)]
pub struct ReferralRecord {
    pub host: String,
    pub port: u16,
}

impl ReferralRecord {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn is_standard_port(&self) -> bool {
        self.port == DEFAULT_WHOIS_PORT
    }
}

// Records are the same server when the host matches, whatever the port
impl PartialEq for ReferralRecord {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host
    }
}

impl Eq for ReferralRecord {}

/// Returns every referral in `text`, first occurrence per host, in the order
/// they appear.
pub fn parse_referrals(text: &str) -> Vec<ReferralRecord> {
    let separator = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let mut seen = HashSet::new();
    let mut referrals = Vec::new();

    for line in text.split(separator) {
        if line.starts_with('%') || line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let Some(value) = referral_value(line.trim()) else {
            continue;
        };

        let record = normalize_server(&value);
        if record.host.is_empty() {
            continue;
        }
        if seen.insert(record.host.clone()) {
            referrals.push(record);
        }
    }

    referrals
}

fn referral_value(line: &str) -> Option<String> {
    let lower = line.to_lowercase();

    if REFERRAL_KEYS.iter().any(|key| lower.starts_with(key)) {
        let (_, rest) = line.split_once(char::is_whitespace)?;
        let value = rest.trim();
        return (!value.is_empty()).then(|| value.to_lowercase());
    }

    LABELLED_SERVER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|value| !value.is_empty())
}

/// Splits `whois://host:port` style values into a record.
fn normalize_server(value: &str) -> ReferralRecord {
    let value = value
        .strip_prefix("rwhois://")
        .or_else(|| value.strip_prefix("whois://"))
        .unwrap_or(value)
        .trim_end_matches('/');

    // [2001:db8::1]:4321
    if let Some(bracketed) = value.strip_prefix('[') {
        if let Some((host, rest)) = bracketed.split_once(']') {
            let port = rest
                .strip_prefix(':')
                .and_then(parse_port)
                .unwrap_or(DEFAULT_WHOIS_PORT);
            return ReferralRecord::new(host, port);
        }
    }

    // A single colon separates host and port; more than one is a bare IPv6
    // address.
    // A port outside u16 range still belongs to the port, not the host; the
    // record falls back to port 43.
    if value.matches(':').count() == 1 {
        if let Some((host, port)) = value.split_once(':') {
            if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
                return ReferralRecord::new(host, parse_port(port).unwrap_or(DEFAULT_WHOIS_PORT));
            }
        }
    }

    ReferralRecord::new(value, DEFAULT_WHOIS_PORT)
}

fn parse_port(digits: &str) -> Option<u16> {
    if digits.is_empty() || digits.len() > 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
