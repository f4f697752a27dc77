// iwhois - Configuration
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;

use crate::log_info;
use crate::whois::{QuirkTable, RoutingTable};

// WHOIS protocol constants
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";
pub const DEFAULT_WHOIS_PORT: u16 = 43;
pub const TIMEOUT_SECONDS: u64 = 3;
pub const RECURSE_LIMIT: usize = 10;
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

// Regional Internet Registries and routing registries
pub const RIPE_WHOIS_SERVER: &str = "whois.ripe.net";
pub const ARIN_WHOIS_SERVER: &str = "whois.arin.net";
pub const AFRINIC_WHOIS_SERVER: &str = "whois.afrinic.net";
pub const APNIC_WHOIS_SERVER: &str = "whois.apnic.net";
pub const LACNIC_WHOIS_SERVER: &str = "whois.lacnic.net";
pub const RADB_WHOIS_SERVER: &str = "whois.radb.net";

// HTTP front end
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const POWERED_BY: &str = "iwhois";

#[derive(Parser, Debug)]
#[command(author, version, about = "Recursive WHOIS lookups over HTTP")]
pub struct Cli {
    /// Listen address
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(short, long, default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Per-hop timeout in seconds [default: 3]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum number of referrals followed [default: 10]
    #[arg(long)]
    pub recurse_limit: Option<usize>,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable trace output (extremely verbose)
    #[arg(short, long)]
    pub trace: bool,

    /// Log in journald format
    #[arg(long)]
    pub journald: bool,
}

/// On-disk layout of the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Path to a `tld_serv_list` file, relative to the config file
    pub tld_serv_list: Option<PathBuf>,
    /// Path to a `servers_charset_list` file, relative to the config file
    pub servers_charset_list: Option<PathBuf>,
    pub resolver: ResolverSection,
    pub routing: RoutingSection,
    pub charsets: HashMap<String, CharsetSection>,
    pub quirks: HashMap<String, String>,
    pub asn_quirks: HashMap<String, String>,
    pub ip_quirks: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverSection {
    pub timeout: Option<u64>,
    pub recurse_limit: Option<usize>,
    pub max_response_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingSection {
    pub domains: HashMap<String, String>,
    pub handles: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharsetSection {
    pub encoding: String,
    pub command: Option<String>,
}

/// Everything a resolution reads. Built once at start-up and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub routing: RoutingTable,
    pub quirks: QuirkTable,
    pub recurse_limit: usize,
    /// Per-hop transport timeout
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            routing: RoutingTable::new(),
            quirks: QuirkTable::builtin(),
            recurse_limit: RECURSE_LIMIT,
            timeout: Duration::from_secs(TIMEOUT_SECONDS),
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }
}

impl ResolverConfig {
    /// Reads and applies a TOML configuration file on top of the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file: FileConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_file_config(file, base_dir)
    }

    /// Configuration for the command line: optional file, then flag overrides
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(timeout) = cli.timeout {
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(limit) = cli.recurse_limit {
            config.recurse_limit = limit;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file_config(file: FileConfig, base_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(timeout) = file.resolver.timeout {
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(limit) = file.resolver.recurse_limit {
            config.recurse_limit = limit;
        }
        if let Some(max) = file.resolver.max_response_bytes {
            config.max_response_bytes = max;
        }

        // Lists first so explicit table entries override them
        if let Some(list) = &file.tld_serv_list {
            let path = base_dir.join(list);
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read tld_serv_list {}", path.display()))?;
            let loaded = config.routing.load_tld_serv_list(&text);
            log_info!("Loaded {} routing entries from {}", loaded, path.display());
        }
        if let Some(list) = &file.servers_charset_list {
            let path = base_dir.join(list);
            let text = fs::read_to_string(&path).with_context(|| {
                format!("Failed to read servers_charset_list {}", path.display())
            })?;
            let loaded = config.quirks.load_charset_list(&text);
            log_info!("Loaded {} charset entries from {}", loaded, path.display());
        }

        for (suffix, host) in &file.routing.domains {
            config.routing.insert_domain(suffix, host);
        }
        for (suffix, host) in &file.routing.handles {
            config.routing.insert_handle(suffix, host);
        }

        for (host, charset) in &file.charsets {
            if !config
                .quirks
                .insert_charset(host, &charset.encoding, charset.command.as_deref())
            {
                bail!("Unknown encoding '{}' for {}", charset.encoding, host);
            }
        }
        for (host, template) in &file.quirks {
            config.quirks.insert_quirk(host, template);
        }
        for (host, template) in &file.asn_quirks {
            config.quirks.insert_asn_quirk(host, template);
        }
        for (host, template) in &file.ip_quirks {
            config.quirks.insert_ip_quirk(host, template);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            bail!("Timeout must be at least one second");
        }
        if self.max_response_bytes == 0 {
            bail!("max_response_bytes must be greater than zero");
        }
        Ok(())
    }
}
