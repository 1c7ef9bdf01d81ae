// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Helpers for blob responses.

use std::path::Path;

use percent_encoding::percent_decode_str;

/// File name advertised by a `Content-Disposition` header.
///
/// `filename*` (RFC 5987, `charset'lang'value`) wins over a plain
/// `filename`; both are percent-decoded. Returns `None` when neither
/// parameter is present or the name is empty.
pub fn file_name_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for part in header.split(';').skip(1) {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());
        match name.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                extended = Some(decode(encoded));
            }
            "filename" => plain = Some(decode(value)),
            _ => {}
        }
    }

    extended
        .or(plain)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Reduce a server-supplied name to a single path component so a download
/// cannot escape its target directory.
pub(crate) fn safe_file_name(name: &str) -> Option<String> {
    Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .map(str::to_string)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
