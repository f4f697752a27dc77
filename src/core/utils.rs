// iwhois - Text Helpers
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

/// Converts CRLF line endings to LF
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Converts CRLF to LF and drops leading and trailing newlines.
///
/// Only `\n` is trimmed; a first line that starts with spaces keeps its
/// indentation.
pub fn normalize_reply(text: &str) -> String {
    normalize_line_endings(text).trim_matches('\n').to_string()
}
