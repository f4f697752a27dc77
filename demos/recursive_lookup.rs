// iwhois - Library usage
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! `cargo run --example recursive_lookup -- [--verbose] <value> [config.toml]`

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use iwhois::core::logger;
use iwhois::{Resolver, ResolverConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = match args.iter().position(|a| a == "--verbose") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };

    let value = args.first().context("usage: recursive_lookup [--verbose] <value> [config.toml]")?;
    let config = match args.get(1) {
        Some(path) => ResolverConfig::load(Path::new(path))?,
        None => ResolverConfig::default(),
    };

    logger::init_from_args(verbose, false, false)?;

    let resolver = Resolver::with_tcp(Arc::new(config));
    let text = if verbose {
        resolver.resolve_recursive_verbose(value).await?
    } else {
        resolver.resolve_recursive(value).await?
    };

    println!("{}", text);
    Ok(())
}
