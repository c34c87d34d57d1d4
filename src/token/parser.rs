//! Decoding of the textual PHC form.
//!
//! ```text
//! $<id>[$<name>=<value>(,<name>=<value>)*][$<salt>[$<hash>]]
//! ```
//!
//! Identifiers use `[a-z0-9-]` and parameter names `[a-zA-Z0-9-]`, which admits scrypt's
//! `N`. Parameter values, salt and hash use `[a-zA-Z0-9/+.-]`. A segment holding a `=` is
//! the parameter list, any other segment after the identifier is the salt. The whole input
//! has to match.

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    encoding,
    error::{Error, Result},
    function::Registry,
    param::{ParamMap, ParamValue},
};

use super::Token;

#[derive(Debug, PartialEq, Eq)]
struct Segments<'a> {
    id: &'a str,
    params: Vec<(&'a str, &'a str)>,
    salt: Option<&'a str>,
    hash: Option<&'a str>,
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn is_value_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '+' | '.' | '-')
}

fn matching(segment: &str, allowed: fn(char) -> bool) -> Result<&str> {
    if segment.chars().all(allowed) {
        Ok(segment)
    } else {
        Err(Error::UnparsableToken)
    }
}

fn split_params(segment: &str) -> Result<Vec<(&str, &str)>> {
    segment
        .split(',')
        .map(|pair| {
            let (name, value) = pair.split_once('=').ok_or(Error::UnparsableToken)?;
            Ok::<_, Error>((matching(name, is_name_char)?, matching(value, is_value_char)?))
        })
        .collect()
}

fn split(token: &str) -> Result<Segments<'_>> {
    let mut segments = token
        .strip_prefix('$')
        .ok_or(Error::UnparsableToken)?
        .split('$');
    let id = matching(segments.next().ok_or(Error::UnparsableToken)?, is_id_char)?;
    let mut next = segments.next();
    let params = match next {
        Some(segment) if segment.contains('=') => {
            next = segments.next();
            split_params(segment)?
        }
        _ => Vec::new(),
    };
    let salt = next.map(|salt| matching(salt, is_value_char)).transpose()?;
    let hash = segments
        .next()
        .map(|hash| matching(hash, is_value_char))
        .transpose()?;

    if segments.next().is_some() {
        return Err(Error::UnparsableToken);
    }

    Ok(Segments {
        id,
        params,
        salt,
        hash,
    })
}

fn decode(field: &'static str, segment: Option<&str>) -> Result<Option<Vec<u8>>> {
    segment
        .map(encoding::decode)
        .transpose()
        .map_err(|source| Error::MalformedEncoding { field, source })
}

/// Parses `token` against the functions of `registry`.
///
/// When a parameter name repeats, the last occurrence wins. Names the function does not
/// know are dropped.
pub fn parse(registry: &Registry, token: &str) -> Result<Token> {
    let segments = split(token)?;
    let function = registry
        .lookup(segments.id)
        .ok_or_else(|| Error::UnknownFunction {
            id: segments.id.to_owned(),
        })?;
    let mut raw = IndexMap::new();

    for (name, value) in segments.params {
        if let Some(previous) = raw.insert(name, value) {
            debug!(name, previous, value, "duplicate parameter, keeping the last value");
        }
    }

    let mut params = ParamMap::new();

    for (name, value) in raw {
        let Some(key) = function.parameter(name) else {
            debug!(function = function.id(), name, "dropping unknown parameter");
            continue;
        };

        params.insert_validated(key, key.validate(ParamValue::Text(value.to_owned()))?);
    }

    let salt = decode("salt", segments.salt)?;
    let hash = decode("hash", segments.hash)?;

    Ok(Token::new(function, params, salt, hash))
}
