//!
//! Utilities for handling signing strings
//!

use crate::{Digest, Error, Result};
use http::request::Parts;
use std::fmt::Write;

/// Components covered by outbound signatures, in the order they appear in the signing string
pub const SIGNED_COMPONENTS: [&str; 4] = ["(request-target)", "date", "host", "digest"];

/// Construct the signing string for an outbound `POST` delivery
///
/// The line order is part of the protocol. Receivers rebuild the string from the `headers`
/// parameter, which is always [`SIGNED_COMPONENTS`] for signatures we produce.
#[inline]
#[must_use]
pub fn construct(path: &str, date: &str, host: &str, digest: &Digest) -> String {
    format!("(request-target): post {path}\ndate: {date}\nhost: {host}\ndigest: {digest}")
}

/// Reconstruct a signing string from a received request and the `headers` parameter
#[inline]
pub fn from_request<'a, I>(parts: &Parts, components: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut signing_string = String::new();
    for name in components {
        if name == "(request-target)" {
            let method = parts.method.as_str().to_lowercase();
            let path_and_query = parts.uri.path_and_query().map_or_else(
                || parts.uri.path(),
                |path_and_query| path_and_query.as_str(),
            );

            let _ = writeln!(signing_string, "{name}: {method} {path_and_query}");
        } else {
            let value = parts
                .headers
                .get(name)
                .ok_or_else(|| Error::MissingHeaderValue(name.to_owned()))?
                .to_str()?;

            let _ = writeln!(signing_string, "{}: {}", name.to_lowercase(), value);
        }
    }

    // Remove the last new-line
    signing_string.pop();

    Ok(signing_string)
}
