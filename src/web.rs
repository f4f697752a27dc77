// iwhois - HTTP Front End
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Plain-text HTTP access to the resolver
//!
//! `GET /w/<value>` resolves recursively, `GET /ww/<value>` returns the whole
//! referral trace and `GET /<registry>/<value>` asks one registry directly.

use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Path, Request, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::POWERED_BY;
use crate::core::QueryKind;
use crate::whois::Resolver;
use crate::{log_error, log_info, log_warn};

const NOT_FOUND: &str = "Sorry, can't find that!";
const SERVER_ERROR: &str = "Something broke!";

const ROBOTS_TXT: &str = "User-agent: *\nAllow: /$\nDisallow: /\n";

const NOSCRIPT_TXT: &str = "\
This service needs JavaScript for the form, but every lookup is a plain URL:

  /w/<query>        recursive lookup, last reply only
  /ww/<query>       recursive lookup, every reply in order
  /ripe/<query>     whois.ripe.net
  /arin/<query>     whois.arin.net
  /afrinic/<query>  whois.afrinic.net
  /apnic/<query>    whois.apnic.net
  /lacnic/<query>   whois.lacnic.net
  /radb/<query>     whois.radb.net
";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>iwhois</title>
</head>
<body>
<form onsubmit="location.href = '/' + this.kind.value + '/'
  + encodeURIComponent(this.q.value.trim()); return false;">
<select name="kind">
<option value="w">recursive</option>
<option value="ww">recursive (verbose)</option>
<option value="ripe">RIPE</option>
<option value="arin">ARIN</option>
<option value="afrinic">AFRINIC</option>
<option value="apnic">APNIC</option>
<option value="lacnic">LACNIC</option>
<option value="radb">RADb</option>
</select>
<input name="q" placeholder="example.com, AS13335, 192.0.2.1" autofocus>
<button type="submit">whois</button>
</form>
<noscript><a href="/noscript.txt">Using this without JavaScript</a></noscript>
</body>
</html>
"#;

/// Router with all routes and layers, without a listener
pub fn router(resolver: Resolver) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/robots.txt", get(robots))
        .route("/noscript.txt", get(noscript))
        .route("/:kind/*value", get(lookup))
        .fallback(not_found)
        .layer(middleware::from_fn(access_log))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-powered-by"),
            HeaderValue::from_static(POWERED_BY),
        ))
        .layer(CorsLayer::permissive())
        .with_state(resolver)
}

/// Serves until SIGTERM or Ctrl-C
pub async fn run_web_server(addr: &str, resolver: Resolver) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    log_info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log_info!("Shutdown signal received, stopping HTTP server");
}

async fn lookup(
    State(resolver): State<Resolver>,
    Path((kind, value)): Path<(String, String)>,
) -> Response {
    let Ok(kind) = kind.parse::<QueryKind>() else {
        return not_found().await;
    };

    match resolver.resolve(kind, &value).await {
        Ok(text) => plain_text(StatusCode::OK, text),
        Err(e) if e.is_degraded() => {
            log_warn!("Lookup of {} returned no data: {}", value, e);
            plain_text(StatusCode::OK, e.to_string())
        }
        Err(e) => {
            log_error!("Lookup of {} failed: {}", value, e);
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_string())
        }
    }
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn robots() -> Response {
    plain_text(StatusCode::OK, ROBOTS_TXT.to_string())
}

async fn noscript() -> Response {
    plain_text(StatusCode::CONFLICT, NOSCRIPT_TXT.to_string())
}

async fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, NOT_FOUND.to_string())
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log_info!(
        "{} {} {} {}ms",
        method,
        response.status().as_u16(),
        path,
        started.elapsed().as_millis()
    );
    response
}
