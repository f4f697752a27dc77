// iwhois - Recursive WHOIS Engine
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

mod error;
pub mod quirks;
pub mod referral;
pub mod resolver;
pub mod routing;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use error::WhoisError;
pub use quirks::QuirkTable;
pub use referral::{ReferralRecord, parse_referrals};
pub use resolver::{ResolutionState, Resolver, StartPoint};
pub use routing::RoutingTable;
pub use transport::{TcpTransport, WhoisRequest, WhoisTransport};
