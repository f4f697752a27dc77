// iwhois - Recursive Resolver
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Referral following
//!
//! A resolution is a loop over [`ResolutionState`]: query the current host,
//! parse the referrals in the reply, then either stop or move to the next
//! host. Two flavours exist:
//!
//! - plain: returns the last reply only. A failing hop after the first one
//!   returns the previous reply with a `%#%` annotation instead of an error.
//! - verbose: returns every reply in order, separated by two blank lines, and
//!   keeps unfollowed referrals in a backlog to fall back on.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::referral::{ReferralRecord, parse_referrals};
use super::transport::{TcpTransport, WhoisRequest, WhoisTransport};
use super::WhoisError;
use crate::config::{DEFAULT_WHOIS_PORT, IANA_WHOIS_SERVER, ResolverConfig};
use crate::core::{QueryKind, Registry, normalize_line_endings, normalize_reply};
use crate::{log_debug, log_warn};

/// Prefix of every line the resolver adds to a reply
pub const ANNOTATION_PREFIX: &str = "%#%";

const HOP_SEPARATOR: &str = "\n\n\n";

/// Where a recursive resolution begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPoint {
    /// Suffix routing table, falling back to IANA
    #[default]
    Routed,
    /// Always IANA
    Root,
}

/// Why a referral was not followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyVisited,
    NonStandardPort(u16),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::AlreadyVisited => f.write_str("already queried"),
            Rejection::NonStandardPort(port) => write!(f, "non-standard port {}", port),
        }
    }
}

/// Outcome of looking at one hop's referrals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Follow(ReferralRecord),
    DepthLimit,
    NoReferrals,
    Rejected(ReferralRecord, Rejection),
}

/// Per-resolution bookkeeping. Never shared between resolutions.
#[derive(Debug, Clone)]
pub struct ResolutionState {
    pub host: String,
    pub port: u16,
    pub depth: usize,
    visited: Vec<String>,
}

impl ResolutionState {
    pub fn new(start_host: &str) -> Self {
        let host = start_host.to_lowercase();
        Self {
            visited: vec![host.clone()],
            host,
            port: DEFAULT_WHOIS_PORT,
            depth: 0,
        }
    }

    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    pub fn has_visited(&self, host: &str) -> bool {
        self.visited.iter().any(|h| h == host)
    }

    /// Whether `candidate` may be queried next by the plain resolver
    pub fn check(&self, candidate: &ReferralRecord) -> Result<(), Rejection> {
        self.check_unvisited(candidate)?;
        if !candidate.is_standard_port() {
            return Err(Rejection::NonStandardPort(candidate.port));
        }
        Ok(())
    }

    /// Host check only, any port is acceptable
    pub fn check_unvisited(&self, candidate: &ReferralRecord) -> Result<(), Rejection> {
        if self.has_visited(&candidate.host) {
            return Err(Rejection::AlreadyVisited);
        }
        Ok(())
    }

    /// Decides what follows a hop that produced `referrals`
    pub fn next_step(&self, referrals: &[ReferralRecord], recurse_limit: usize) -> Step {
        if self.depth >= recurse_limit {
            return Step::DepthLimit;
        }
        let Some(first) = referrals.first() else {
            return Step::NoReferrals;
        };
        match self.check(first) {
            Ok(()) => Step::Follow(first.clone()),
            Err(rejection) => Step::Rejected(first.clone(), rejection),
        }
    }

    fn advance(&mut self, next: ReferralRecord) {
        if !self.has_visited(&next.host) {
            self.visited.push(next.host.clone());
        }
        self.host = next.host;
        self.port = next.port;
        self.depth += 1;
    }
}

/// Entry point for all lookups
#[derive(Clone)]
pub struct Resolver {
    config: Arc<ResolverConfig>,
    transport: Arc<dyn WhoisTransport>,
}

impl Resolver {
    pub fn new(config: Arc<ResolverConfig>, transport: Arc<dyn WhoisTransport>) -> Self {
        Self { config, transport }
    }

    /// Resolver talking plain TCP with the configured timeout and size cap
    pub fn with_tcp(config: Arc<ResolverConfig>) -> Self {
        let transport = TcpTransport::new(config.timeout, config.max_response_bytes);
        Self::new(config, Arc::new(transport))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Dispatches on the query kind
    pub async fn resolve(&self, kind: QueryKind, value: &str) -> Result<String, WhoisError> {
        match kind {
            QueryKind::Recursive => self.resolve_recursive(value).await,
            QueryKind::RecursiveVerbose => self.resolve_recursive_verbose(value).await,
            QueryKind::Fixed(registry) => self.resolve_fixed(registry, value).await,
        }
    }

    /// Like [`Resolver::resolve`] but with the kind given by name (`w`, `ww`,
    /// `ripe`, ...)
    pub async fn resolve_named(&self, kind: &str, value: &str) -> Result<String, WhoisError> {
        let kind: QueryKind = kind.parse()?;
        self.resolve(kind, value).await
    }

    pub async fn resolve_recursive(&self, value: &str) -> Result<String, WhoisError> {
        self.resolve_recursive_from(value, StartPoint::Routed).await
    }

    pub async fn resolve_recursive_verbose(&self, value: &str) -> Result<String, WhoisError> {
        self.resolve_recursive_verbose_from(value, StartPoint::Routed).await
    }

    /// Follows referrals and returns the last reply
    pub async fn resolve_recursive_from(
        &self,
        value: &str,
        start: StartPoint,
    ) -> Result<String, WhoisError> {
        let mut state = ResolutionState::new(self.start_host(value, start));
        // (host, reply) of the hop before the current one
        let mut previous: Option<(String, String)> = None;

        loop {
            let reply = match self.query_hop(&state, value).await {
                Ok(reply) => reply,
                Err(e) => {
                    let Some((previous_host, previous_reply)) = previous else {
                        return Err(e);
                    };
                    log_warn!(
                        "Query for {} failed on {} ({}), returning data from {}",
                        value,
                        state.host,
                        e,
                        previous_host
                    );
                    return Ok(format!(
                        "{} {} on host \"{}\", returning data from \"{}\"\n\n{}",
                        ANNOTATION_PREFIX, e, state.host, previous_host, previous_reply
                    ));
                }
            };

            let referrals = parse_referrals(&reply);
            match state.next_step(&referrals, self.config.recurse_limit) {
                Step::Follow(next) => {
                    log_debug!("{} refers {} to {}:{}", state.host, value, next.host, next.port);
                    previous = Some((state.host.clone(), reply));
                    state.advance(next);
                }
                step => {
                    log_debug!("Resolution of {} stops at {}: {:?}", value, state.host, step);
                    return Ok(reply);
                }
            }
        }
    }

    /// Follows referrals and returns every reply with decision annotations
    pub async fn resolve_recursive_verbose_from(
        &self,
        value: &str,
        start: StartPoint,
    ) -> Result<String, WhoisError> {
        let mut state = ResolutionState::new(self.start_host(value, start));
        let mut trace: Option<String> = None;
        let mut backlog: VecDeque<ReferralRecord> = VecDeque::new();

        loop {
            let reply = match self.query_hop(&state, value).await {
                Ok(reply) => reply,
                Err(e) => {
                    let Some(trace) = trace else {
                        return Err(e);
                    };
                    log_warn!("Verbose query for {} failed on {}: {}", value, state.host, e);
                    return Ok(format!(
                        "{}\n{} {} on host \"{}\"",
                        trace, ANNOTATION_PREFIX, e, state.host
                    ));
                }
            };

            let referrals = parse_referrals(&reply);
            let mut current = match trace.take() {
                Some(earlier) => format!("{}{}{}", earlier, HOP_SEPARATOR, reply),
                None => reply,
            };

            if state.depth >= self.config.recurse_limit {
                log_debug!("Verbose resolution of {} hit the recursion limit", value);
                return Ok(current);
            }
            let Some(first) = referrals.first() else {
                log_debug!("Verbose resolution of {} ends at {}", value, state.host);
                return Ok(current);
            };

            // Ports are not checked here, the trace shows wherever the
            // referral leads
            let next = match state.check_unvisited(first) {
                Ok(()) => {
                    annotate(
                        &mut current,
                        &format!(
                            "Found referrals to '{}', trying the first host (\"{}\")",
                            host_list(referrals.iter()),
                            first.host
                        ),
                    );
                    backlog = referrals.iter().skip(1).cloned().collect();
                    Some(first.clone())
                }
                Err(rejection) => {
                    annotate(
                        &mut current,
                        &format!("Not following \"{}\": {}", first.host, rejection),
                    );
                    take_from_backlog(&state, &mut backlog, &mut current)
                }
            };

            match next {
                Some(next) => {
                    log_debug!("{} refers {} to {}:{}", state.host, value, next.host, next.port);
                    trace = Some(current);
                    state.advance(next);
                }
                None => return Ok(current),
            }
        }
    }

    /// One query against a known registry, no referral following
    pub async fn resolve_fixed(
        &self,
        registry: Registry,
        value: &str,
    ) -> Result<String, WhoisError> {
        let host = registry.host();
        let line = self.config.quirks.apply(host, value);
        let reply = self
            .transport
            .execute(WhoisRequest {
                host,
                port: DEFAULT_WHOIS_PORT,
                line: &line,
                encoding: self.config.quirks.encoding(host),
            })
            .await?;
        Ok(normalize_line_endings(&reply))
    }

    /// Like [`Resolver::resolve_fixed`] with the registry given by name
    pub async fn resolve_fixed_named(
        &self,
        registry: &str,
        value: &str,
    ) -> Result<String, WhoisError> {
        let registry: Registry = registry.parse()?;
        self.resolve_fixed(registry, value).await
    }

    fn start_host(&self, value: &str, start: StartPoint) -> &str {
        match start {
            StartPoint::Routed => self.config.routing.start_host(value),
            StartPoint::Root => IANA_WHOIS_SERVER,
        }
    }

    async fn query_hop(&self, state: &ResolutionState, value: &str) -> Result<String, WhoisError> {
        let line = self.config.quirks.apply(&state.host, value);
        log_debug!("Hop {} for {}: {}:{}", state.depth, value, state.host, state.port);

        let reply = self
            .transport
            .execute(WhoisRequest {
                host: &state.host,
                port: state.port,
                line: &line,
                encoding: self.config.quirks.encoding(&state.host),
            })
            .await?;
        Ok(normalize_reply(&reply))
    }
}

/// Pops referrals left over from the previous hop until one has not been
/// visited yet
fn take_from_backlog(
    state: &ResolutionState,
    backlog: &mut VecDeque<ReferralRecord>,
    trace: &mut String,
) -> Option<ReferralRecord> {
    while let Some(candidate) = backlog.front().cloned() {
        match state.check_unvisited(&candidate) {
            Ok(()) => {
                annotate(
                    trace,
                    &format!(
                        "Already have referrals to '{}', trying the first host (\"{}\")",
                        host_list(backlog.iter()),
                        candidate.host
                    ),
                );
                backlog.pop_front();
                return Some(candidate);
            }
            Err(rejection) => {
                annotate(
                    trace,
                    &format!("Not following \"{}\": {}", candidate.host, rejection),
                );
                backlog.pop_front();
            }
        }
    }
    None
}

fn annotate(trace: &mut String, message: &str) {
    trace.push_str(HOP_SEPARATOR);
    trace.push_str(ANNOTATION_PREFIX);
    trace.push(' ');
    trace.push_str(message);
}

/// JSON array of the hosts, e.g. `["whois.arin.net","whois.ripe.net"]`
fn host_list<'a>(records: impl Iterator<Item = &'a ReferralRecord>) -> String {
    let hosts: Vec<&str> = records.map(|r| r.host.as_str()).collect();
    serde_json::to_string(&hosts).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RECURSE_LIMIT;
    use crate::whois::testing::{Scripted, ScriptedTransport};

    const IANA_COM: &str = concat!(
        "% IANA WHOIS server\n",
        "\n",
        "refer:        whois.verisign-grs.com\n",
        "\n",
        "domain:       COM\n",
    );

    fn resolver_with(config: ResolverConfig, transport: &Arc<ScriptedTransport>) -> Resolver {
        Resolver::new(Arc::new(config), transport.clone())
    }

    fn resolver(transport: &Arc<ScriptedTransport>) -> Resolver {
        resolver_with(ResolverConfig::default(), transport)
    }

    fn chain(length: usize) -> ScriptedTransport {
        let mut transport =
            ScriptedTransport::new().reply("whois.iana.org", "refer: whois.hop1.example");
        for i in 1..=length {
            transport = transport.reply(
                &format!("whois.hop{}.example", i),
                &format!("refer: whois.hop{}.example", i + 1),
            );
        }
        transport
    }

    /// The annotation written before following `first`
    fn found(hosts: &str, first: &str) -> String {
        format!(
            "%#% Found referrals to '{}', trying the first host (\"{}\")",
            hosts, first
        )
    }

    #[test]
    fn test_next_step_decisions() {
        let mut state = ResolutionState::new("whois.iana.org");
        let arin = ReferralRecord::new("whois.arin.net", 43);

        assert_eq!(state.next_step(&[], 10), Step::NoReferrals);
        assert_eq!(state.next_step(&[arin.clone()], 10), Step::Follow(arin.clone()));
        assert_eq!(
            state.next_step(&[ReferralRecord::new("whois.iana.org", 43)], 10),
            Step::Rejected(ReferralRecord::new("whois.iana.org", 43), Rejection::AlreadyVisited)
        );
        assert_eq!(
            state.next_step(&[ReferralRecord::new("rwhois.example.net", 4321)], 10),
            Step::Rejected(
                ReferralRecord::new("rwhois.example.net", 4321),
                Rejection::NonStandardPort(4321)
            )
        );

        assert_eq!(
            state.check_unvisited(&ReferralRecord::new("rwhois.example.net", 4321)),
            Ok(())
        );

        state.advance(arin.clone());
        assert_eq!(state.depth, 1);
        assert_eq!(state.visited(), ["whois.iana.org", "whois.arin.net"]);
        assert_eq!(
            state.next_step(&[ReferralRecord::new("whois.ripe.net", 43)], 1),
            Step::DepthLimit
        );
    }

    #[tokio::test]
    async fn test_domain_follows_root_referral() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", IANA_COM)
                .reply(
                    "whois.verisign-grs.com",
                    concat!(
                        "   Domain Name: GOOGLE.COM\r\n",
                        "   Registry Domain ID: 2138514_DOMAIN_COM-VRSN\r\n",
                    ),
                ),
        );

        let result = resolver(&transport).resolve_recursive("google.com").await.unwrap();

        assert_eq!(
            transport.calls(),
            vec![
                ("whois.iana.org".to_string(), 43, "google.com".to_string()),
                ("whois.verisign-grs.com".to_string(), 43, "google.com".to_string()),
            ]
        );
        assert_eq!(
            result,
            "   Domain Name: GOOGLE.COM\n   Registry Domain ID: 2138514_DOMAIN_COM-VRSN"
        );
    }

    #[tokio::test]
    async fn test_recursion_bounded_by_limit() {
        let transport = Arc::new(chain(30));

        let result = resolver(&transport).resolve_recursive("example.test").await.unwrap();

        assert_eq!(transport.calls().len(), RECURSE_LIMIT + 1);
        assert_eq!(result, "refer: whois.hop11.example");
    }

    #[tokio::test]
    async fn test_cycle_stops_without_extra_query() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.a.example")
                .reply("whois.a.example", "status: active\nwhois: WHOIS.IANA.ORG\n"),
        );

        let result = resolver(&transport).resolve_recursive("example.test").await.unwrap();

        assert_eq!(transport.hosts(), vec!["whois.iana.org", "whois.a.example"]);
        assert_eq!(result, "status: active\nwhois: WHOIS.IANA.ORG");
    }

    #[tokio::test]
    async fn test_non_standard_port_not_followed() {
        let transport = Arc::new(ScriptedTransport::new().reply(
            "whois.iana.org",
            "NetRange: 192.0.2.0 - 192.0.2.255\nReferralServer: rwhois://rwhois.example.net:4321\n",
        ));

        let result = resolver(&transport).resolve_recursive("192.0.2.1").await.unwrap();

        assert_eq!(transport.calls().len(), 1);
        assert!(result.ends_with("rwhois://rwhois.example.net:4321"));
    }

    #[tokio::test]
    async fn test_later_hop_timeout_returns_previous_data() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.slow.example\n\nhello\n")
                .fail("whois.slow.example", Scripted::Timeout),
        );

        let result = resolver(&transport).resolve_recursive("example.test").await.unwrap();

        assert_eq!(
            result,
            concat!(
                "%#% Connection Timeout on host \"whois.slow.example\", ",
                "returning data from \"whois.iana.org\"\n",
                "\n",
                "refer: whois.slow.example\n",
                "\n",
                "hello",
            )
        );
    }

    #[tokio::test]
    async fn test_first_hop_failure_propagates() {
        let transport =
            Arc::new(ScriptedTransport::new().fail("whois.iana.org", Scripted::Refused));

        let plain = resolver(&transport).resolve_recursive("example.test").await;
        let verbose = resolver(&transport).resolve_recursive_verbose("example.test").await;

        assert!(matches!(plain, Err(WhoisError::Transport(_))));
        assert!(matches!(verbose, Err(WhoisError::Transport(_))));
    }

    #[tokio::test]
    async fn test_quirks_applied_per_hop() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.arin.net\n")
                .reply("whois.arin.net", "ASNumber: 174\n"),
        );

        resolver(&transport).resolve_recursive("AS174").await.unwrap();

        let lines: Vec<String> = transport.calls().into_iter().map(|(_, _, line)| line).collect();
        assert_eq!(lines, vec!["AS174", "a 174"]);
    }

    #[tokio::test]
    async fn test_routing_table_picks_start_host() {
        let transport =
            Arc::new(ScriptedTransport::new().reply("whois.denic.de", "Domain: example.de\n"));
        let mut config = ResolverConfig::default();
        config.routing.insert_domain(".de", "whois.denic.de");
        let resolver = resolver_with(config, &transport);

        let result = resolver.resolve_recursive("example.de").await.unwrap();
        assert_eq!(result, "Domain: example.de");

        let _ = resolver.resolve_recursive_from("example.de", StartPoint::Root).await;
        assert_eq!(transport.hosts(), vec!["whois.denic.de", "whois.iana.org"]);
    }

    #[tokio::test]
    async fn test_verbose_trace_in_hop_order() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.a.example")
                .reply("whois.a.example", "whois: whois.b.example")
                .reply("whois.b.example", "final record"),
        );

        let result = resolver(&transport).resolve_recursive_verbose("example.test").await.unwrap();

        let expected = [
            "refer: whois.a.example".to_string(),
            found(r#"["whois.a.example"]"#, "whois.a.example"),
            "whois: whois.b.example".to_string(),
            found(r#"["whois.b.example"]"#, "whois.b.example"),
            "final record".to_string(),
        ]
        .join("\n\n\n");
        assert_eq!(result, expected);
        assert_eq!(transport.hosts(), vec!["whois.iana.org", "whois.a.example", "whois.b.example"]);
    }

    #[tokio::test]
    async fn test_verbose_falls_back_to_backlog() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.a.example\nwhois: whois.b.example")
                .reply("whois.a.example", "refer: whois.iana.org")
                .reply("whois.b.example", "final record"),
        );

        let result = resolver(&transport).resolve_recursive_verbose("example.test").await.unwrap();

        assert_eq!(transport.hosts(), vec!["whois.iana.org", "whois.a.example", "whois.b.example"]);
        assert!(result.contains(&found(
            r#"["whois.a.example","whois.b.example"]"#,
            "whois.a.example"
        )));
        assert!(result.contains("%#% Not following \"whois.iana.org\": already queried"));
        assert!(result.contains(concat!(
            r#"%#% Already have referrals to '["whois.b.example"]', "#,
            r#"trying the first host ("whois.b.example")"#
        )));
        assert!(result.ends_with("\n\n\nfinal record"));
    }

    #[tokio::test]
    async fn test_verbose_stops_at_terminal_reply() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.a.example\nwhois: whois.b.example")
                .reply("whois.a.example", "refer: whois.c.example")
                .reply("whois.c.example", "final record")
                .reply("whois.b.example", "stale backlog record"),
        );

        let result = resolver(&transport)
            .resolve_recursive_verbose("example.test")
            .await
            .unwrap();

        assert_eq!(
            transport.hosts(),
            vec!["whois.iana.org", "whois.a.example", "whois.c.example"]
        );
        assert!(result.ends_with("\n\n\nfinal record"));
        assert!(!result.contains("Already have referrals"));
    }

    #[tokio::test]
    async fn test_verbose_backlog_only_holds_previous_hop() {
        // b is queued at hop 0 but replaced once a's referrals are followed
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.a.example\nwhois: whois.b.example")
                .reply("whois.a.example", "refer: whois.c.example")
                .reply("whois.c.example", "refer: whois.a.example")
                .reply("whois.b.example", "stale backlog record"),
        );

        let result = resolver(&transport)
            .resolve_recursive_verbose("example.test")
            .await
            .unwrap();

        assert_eq!(
            transport.hosts(),
            vec!["whois.iana.org", "whois.a.example", "whois.c.example"]
        );
        assert!(result.ends_with("%#% Not following \"whois.a.example\": already queried"));
    }

    #[tokio::test]
    async fn test_verbose_follows_non_standard_port() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "ReferralServer: rwhois://rwhois.example.net:4321")
                .reply("rwhois.example.net", "network:ID:NET-192-0-2-0"),
        );

        let result = resolver(&transport)
            .resolve_recursive_verbose("192.0.2.1")
            .await
            .unwrap();

        assert_eq!(
            transport.calls()[1],
            ("rwhois.example.net".to_string(), 4321, "192.0.2.1".to_string())
        );
        assert!(result.contains(&found(r#"["rwhois.example.net"]"#, "rwhois.example.net")));
        assert!(result.ends_with("\n\n\nnetwork:ID:NET-192-0-2-0"));
    }

    #[tokio::test]
    async fn test_verbose_cycle_ends_trace() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.a.example")
                .reply("whois.a.example", "refer: whois.iana.org"),
        );

        let result = resolver(&transport).resolve_recursive_verbose("example.test").await.unwrap();

        assert_eq!(transport.calls().len(), 2);
        assert!(result.ends_with(
            "refer: whois.iana.org\n\n\n%#% Not following \"whois.iana.org\": already queried"
        ));
    }

    #[tokio::test]
    async fn test_verbose_failure_appends_annotation() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", "refer: whois.a.example")
                .fail("whois.a.example", Scripted::Closed),
        );

        let result = resolver(&transport).resolve_recursive_verbose("example.test").await.unwrap();

        assert_eq!(
            result,
            format!(
                "refer: whois.a.example\n\n\n{}\n{}",
                found(r#"["whois.a.example"]"#, "whois.a.example"),
                "%#% Connection closed with Error on host \"whois.a.example\""
            )
        );
    }

    #[tokio::test]
    async fn test_verbose_respects_limit() {
        let transport = Arc::new(chain(30));
        let config = ResolverConfig {
            recurse_limit: 2,
            ..ResolverConfig::default()
        };

        let result = resolver_with(config, &transport)
            .resolve_recursive_verbose("example.test")
            .await
            .unwrap();

        assert_eq!(transport.calls().len(), 3);
        assert!(result.ends_with("\n\n\nrefer: whois.hop3.example"));
    }

    #[tokio::test]
    async fn test_fixed_ripe_query() {
        let transport = Arc::new(
            ScriptedTransport::new().reply(
                "whois.ripe.net",
                "organisation: ORG-TCA23-RIPE\r\norg-name: Example\r\n",
            ),
        );

        let result = resolver(&transport)
            .resolve_fixed(Registry::Ripe, "ORG-TCA23-RIPE")
            .await
            .unwrap();

        assert_eq!(
            transport.calls(),
            vec![("whois.ripe.net".to_string(), 43, "ORG-TCA23-RIPE -B".to_string())]
        );
        assert_eq!(result, "organisation: ORG-TCA23-RIPE\norg-name: Example\n");
    }

    #[tokio::test]
    async fn test_fixed_query_does_not_follow_referrals() {
        let transport =
            Arc::new(ScriptedTransport::new().reply("whois.apnic.net", "refer: whois.ripe.net\n"));

        let result = resolver(&transport).resolve_named("apnic", "203.0.113.1").await.unwrap();

        assert_eq!(transport.calls().len(), 1);
        assert_eq!(result, "refer: whois.ripe.net\n");
    }

    #[tokio::test]
    async fn test_unsupported_kind_rejected() {
        let transport = Arc::new(ScriptedTransport::new());

        let result = resolver(&transport).resolve_named("altdb", "AS13335").await;

        assert!(matches!(result, Err(WhoisError::UnsupportedQueryKind(kind)) if kind == "altdb"));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_are_independent() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply("whois.iana.org", IANA_COM)
                .reply("whois.verisign-grs.com", "Domain Name: EXAMPLE.COM"),
        );
        let resolver = resolver(&transport);

        let (a, b) = tokio::join!(
            resolver.resolve_recursive("example.com"),
            resolver.resolve_recursive("example.net"),
        );

        assert_eq!(a.unwrap(), "Domain Name: EXAMPLE.COM");
        assert_eq!(b.unwrap(), "Domain Name: EXAMPLE.COM");
        assert_eq!(transport.calls().len(), 4);
    }
}
