// iwhois - Recursive WHOIS over HTTP
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use iwhois::config::{Cli, ResolverConfig};
use iwhois::core::logger::{self, log_init_failed, log_init_ok_with_details, log_init_start};
use iwhois::web::run_web_server;
use iwhois::whois::Resolver;
use iwhois::log_info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Err(e) = logger::init_from_args(args.debug, args.trace, args.journald) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    log_init_start("resolver configuration");
    let config = match ResolverConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            log_init_failed("resolver configuration", &format!("{:#}", e));
            return Err(e);
        }
    };
    let (domains, handles) = config.routing.sizes();
    log_init_ok_with_details(
        "resolver configuration",
        &format!(
            "{} domain suffixes, {} handle suffixes, timeout {}s, recurse limit {}",
            domains,
            handles,
            config.timeout.as_secs(),
            config.recurse_limit
        ),
    );

    let resolver = Resolver::with_tcp(Arc::new(config));

    let addr = format!("{}:{}", args.host, args.port);
    log_info!("Starting iwhois on {}", addr);
    run_web_server(&addr, resolver).await
}
