// iwhois - Resolution Errors
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::io;

/// Failures surfaced by the transport and the resolvers.
///
/// The `Display` text is what ends up in `%#%` annotations.
#[derive(Debug, thiserror::Error)]
pub enum WhoisError {
    #[error("Connection Timeout")]
    ConnectionTimeout,
    #[error("Connection closed with Error")]
    ConnectionClosedWithError,
    #[error("{0}")]
    Transport(#[from] io::Error),
    #[error("Unsupported query kind: {0}")]
    UnsupportedQueryKind(String),
}

impl WhoisError {
    /// Errors the front end may still deliver as a text reply
    pub fn is_degraded(&self) -> bool {
        matches!(self, WhoisError::ConnectionTimeout)
    }
}
