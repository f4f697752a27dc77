// iwhois - Query Kinds
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use cidr::IpInet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{
    AFRINIC_WHOIS_SERVER,
    APNIC_WHOIS_SERVER,
    ARIN_WHOIS_SERVER,
    LACNIC_WHOIS_SERVER,
    RADB_WHOIS_SERVER,
    RIPE_WHOIS_SERVER,
};
use crate::whois::WhoisError;

static ASN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^AS\d{1,10}").expect("Invalid ASN regex pattern"));

/// Registries reachable through the fixed-host interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Registry {
    Ripe,
    Arin,
    Afrinic,
    Apnic,
    Lacnic,
    Radb,
}

impl Registry {
    pub const ALL: [Registry; 6] = [
        Registry::Ripe,
        Registry::Arin,
        Registry::Afrinic,
        Registry::Apnic,
        Registry::Lacnic,
        Registry::Radb,
    ];

    pub fn host(self) -> &'static str {
        match self {
            Registry::Ripe => RIPE_WHOIS_SERVER,
            Registry::Arin => ARIN_WHOIS_SERVER,
            Registry::Afrinic => AFRINIC_WHOIS_SERVER,
            Registry::Apnic => APNIC_WHOIS_SERVER,
            Registry::Lacnic => LACNIC_WHOIS_SERVER,
            Registry::Radb => RADB_WHOIS_SERVER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Registry::Ripe => "ripe",
            Registry::Arin => "arin",
            Registry::Afrinic => "afrinic",
            Registry::Apnic => "apnic",
            Registry::Lacnic => "lacnic",
            Registry::Radb => "radb",
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Registry {
    type Err = WhoisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Registry::ALL
            .into_iter()
            .find(|registry| registry.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| WhoisError::UnsupportedQueryKind(s.to_string()))
    }
}

/// How a query value should be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Start at the routing table or IANA and follow referrals
    Recursive,
    /// Like `Recursive`, but return every hop's reply
    RecursiveVerbose,
    /// Single query against a known registry
    Fixed(Registry),
}

impl FromStr for QueryKind {
    type Err = WhoisError;

    /// Parses the short route names used by the HTTP front end
    /// (`w`, `ww`, or a registry name).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "recursive" => Ok(QueryKind::Recursive),
            "ww" | "recursive-verbose" => Ok(QueryKind::RecursiveVerbose),
            other => other.parse().map(QueryKind::Fixed),
        }
    }
}

/// `AS` followed by digits at the start of the value, any case
pub fn is_asn(value: &str) -> bool {
    ASN_PATTERN.is_match(value)
}

/// Strips a leading `AS`/`as` from the value if present
pub fn strip_asn_prefix(value: &str) -> &str {
    match value.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("AS") => &value[2..],
        _ => value,
    }
}

/// IPv4/IPv6 literal, with or without a prefix length. IPv4 needs all four
/// octets; the prefix length must fit the address family.
pub fn is_ip_literal(value: &str) -> bool {
    let (address, prefix) = match value.split_once('/') {
        Some((address, prefix)) => (address, Some(prefix)),
        None => (value, None),
    };
    let Ok(address) = address.parse::<IpAddr>() else {
        return false;
    };

    match prefix {
        None => true,
        Some(len) if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) => false,
        Some(len) => len
            .parse::<u8>()
            .is_ok_and(|len| IpInet::new(address, len).is_ok()),
    }
}
