// iwhois - Test Transport
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{WhoisError, WhoisRequest, WhoisTransport};

#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String),
    Timeout,
    Closed,
    Refused,
}

/// Answers from a fixed host -> reply table and records every request as
/// `(host, port, line)`
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: HashMap<String, Scripted>,
    calls: Mutex<Vec<(String, u16, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, host: &str, text: &str) -> Self {
        self.script.insert(host.to_string(), Scripted::Reply(text.to_string()));
        self
    }

    pub fn fail(mut self, host: &str, failure: Scripted) -> Self {
        self.script.insert(host.to_string(), failure);
        self
    }

    pub fn calls(&self) -> Vec<(String, u16, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(host, _, _)| host).collect()
    }
}

#[async_trait]
impl WhoisTransport for ScriptedTransport {
    async fn execute(&self, request: WhoisRequest<'_>) -> Result<String, WhoisError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.host.to_string(), request.port, request.line.to_string()));

        match self.script.get(request.host) {
            Some(Scripted::Reply(text)) => Ok(text.clone()),
            Some(Scripted::Timeout) => Err(WhoisError::ConnectionTimeout),
            Some(Scripted::Closed) => Err(WhoisError::ConnectionClosedWithError),
            Some(Scripted::Refused) | None => Err(WhoisError::Transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connect ECONNREFUSED",
            ))),
        }
    }
}
