//! Typed, validated tunables of the supported functions.
//!
//! Every function family owns one enum of parameters (see [`crate::function`]), wrapped in
//! [`ParamKey`]. Each parameter is described by a static [`ParamSpec`] holding its rendered
//! name, its rendering priority and the [`ParamDomain`] its values must fall into.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt::{Debug, Display},
};

use derive_more::Deref;
use proptest::{
    arbitrary::any,
    prop_oneof,
    strategy::{BoxedStrategy, Strategy},
};
use proptest_derive::Arbitrary;
use thiserror::Error;

use crate::{
    encoding,
    error::InvalidParameterError,
    function::{
        argon2::Argon2Param, bcrypt::BcryptParam, pbkdf2::Pbkdf2Param, scrypt::ScryptParam,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Text,
    Bytes,
}

impl ValueType {
    /// The name used as the last ordering tie-break between parameters.
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Bytes => "bytes",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ParamValue {
    Integer(u32),
    Text(String),
    Bytes(Vec<u8>),
}

impl ParamValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Integer(_) => ValueType::Integer,
            Self::Text(_) => ValueType::Text,
            Self::Bytes(_) => ValueType::Bytes,
        }
    }

    pub fn as_integer(&self) -> Option<u32> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) => Some(value),
            _ => None,
        }
    }
}

/// Renders the value the way it appears in a PHC string. Byte values use the unpadded
/// base64 alphabet.
impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Bytes(value) => f.write_str(&encoding::encode(value)),
        }
    }
}

impl Debug for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "Integer({value})"),
            Self::Text(value) => write!(f, "Text({value:?})"),
            Self::Bytes(value) => write!(f, "Bytes({})", encoding::encode(value)),
        }
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for ParamValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for ParamValue {
    fn from(value: &[u8; N]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamDomain {
    /// Inclusive range. Values below `recommended` are accepted with a warning.
    Integer {
        min: u32,
        max: u32,
        recommended: Option<u32>,
    },
    /// Inclusive range of powers of two.
    PowerOfTwo { min: u32, max: u32 },
    Bytes { max_len: usize },
    /// One of a fixed set of labels.
    Text { allowed: &'static [&'static str] },
}

impl ParamDomain {
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Integer { .. } | Self::PowerOfTwo { .. } => ValueType::Integer,
            Self::Bytes { .. } => ValueType::Bytes,
            Self::Text { .. } => ValueType::Text,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamDomainError {
    #[error("{0:?} is not an unsigned integer")]
    NotAnInteger(String),
    #[error("{value} is outside of the range {min}..={max}")]
    OutOfRange { value: u32, min: u32, max: u32 },
    #[error("{0} is not a power of two")]
    NotPowerOfTwo(u32),
    #[error("{len} bytes exceed the maximum of {max_len} bytes")]
    TooLong { len: usize, max_len: usize },
    #[error("not valid base64: {0}")]
    NotBase64(#[from] base64::DecodeError),
    #[error("{value:?} is not one of {allowed:?}")]
    NotAllowed {
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("expected a value of type {expected}, got {actual}")]
    WrongType {
        expected: ValueType,
        actual: ValueType,
    },
    #[error("not a parameter of {function:?}")]
    NotOwned { function: &'static str },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    /// The key rendered into the PHC string. Parameters without a name are internal-only:
    /// they steer the derivation but are never rendered.
    pub name: Option<&'static str>,
    /// Used in error messages and logs, also for internal-only parameters.
    pub label: &'static str,
    pub priority: u32,
    pub domain: ParamDomain,
}

impl ParamSpec {
    /// Coerces textual input into the domain's value type, then applies the domain rule.
    pub fn validate(&self, value: ParamValue) -> std::result::Result<ParamValue, ParamDomainError> {
        let value = self.coerce(value)?;

        match (&self.domain, &value) {
            (
                ParamDomain::Integer {
                    min,
                    max,
                    recommended,
                },
                ParamValue::Integer(integer),
            ) => {
                if integer < min || integer > max {
                    return Err(ParamDomainError::OutOfRange {
                        value: *integer,
                        min: *min,
                        max: *max,
                    });
                }

                if let Some(recommended) = recommended.filter(|recommended| integer < recommended)
                {
                    tracing::warn!(
                        "parameter {label:?} is set to the value {integer} lower than the recommended value of {recommended}",
                        label = self.label,
                    );
                }
            }
            (ParamDomain::PowerOfTwo { min, max }, ParamValue::Integer(integer)) => {
                if integer < min || integer > max {
                    return Err(ParamDomainError::OutOfRange {
                        value: *integer,
                        min: *min,
                        max: *max,
                    });
                }

                if !integer.is_power_of_two() {
                    return Err(ParamDomainError::NotPowerOfTwo(*integer));
                }
            }
            (ParamDomain::Bytes { max_len }, ParamValue::Bytes(bytes)) => {
                if bytes.len() > *max_len {
                    return Err(ParamDomainError::TooLong {
                        len: bytes.len(),
                        max_len: *max_len,
                    });
                }
            }
            (ParamDomain::Text { allowed }, ParamValue::Text(text)) => {
                if !allowed.contains(&text.as_str()) {
                    return Err(ParamDomainError::NotAllowed {
                        value: text.clone(),
                        allowed: *allowed,
                    });
                }
            }
            (domain, value) => {
                return Err(ParamDomainError::WrongType {
                    expected: domain.value_type(),
                    actual: value.value_type(),
                });
            }
        }

        Ok(value)
    }

    fn coerce(&self, value: ParamValue) -> std::result::Result<ParamValue, ParamDomainError> {
        let ParamValue::Text(text) = value else {
            return Ok(value);
        };

        Ok(match self.domain.value_type() {
            ValueType::Text => ParamValue::Text(text),
            ValueType::Integer => ParamValue::Integer(
                text.parse()
                    .map_err(|_| ParamDomainError::NotAnInteger(text.clone()))?,
            ),
            ValueType::Bytes => ParamValue::Bytes(encoding::decode(&text)?),
        })
    }
}

/// Identifies one parameter of one function family.
///
/// Ordering is total: by priority, then by name (internal-only parameters first), then by
/// the value type's canonical name. The owning family and the label only break ties
/// between parameters of different families, which never share a token.
#[derive(Arbitrary, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Argon2(Argon2Param),
    Pbkdf2(Pbkdf2Param),
    Bcrypt(BcryptParam),
    Scrypt(ScryptParam),
}

impl ParamKey {
    pub fn spec(self) -> &'static ParamSpec {
        match self {
            Self::Argon2(param) => param.spec(),
            Self::Pbkdf2(param) => param.spec(),
            Self::Bcrypt(param) => param.spec(),
            Self::Scrypt(param) => param.spec(),
        }
    }

    pub fn family(self) -> &'static str {
        match self {
            Self::Argon2(_) => "argon2",
            Self::Pbkdf2(_) => "pbkdf2",
            Self::Bcrypt(_) => "bcrypt",
            Self::Scrypt(_) => "scrypt",
        }
    }

    pub fn name(self) -> Option<&'static str> {
        self.spec().name
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn priority(self) -> u32 {
        self.spec().priority
    }

    pub fn value_type(self) -> ValueType {
        self.spec().domain.value_type()
    }

    pub fn validate(self, value: ParamValue) -> std::result::Result<ParamValue, InvalidParameterError> {
        self.spec()
            .validate(value)
            .map_err(|source| InvalidParameterError::new(self.label(), source))
    }

    /// Absent values stay absent; not every parameter is needed by every operation.
    pub fn validate_optional(
        self,
        value: Option<ParamValue>,
    ) -> std::result::Result<Option<ParamValue>, InvalidParameterError> {
        value.map(|value| self.validate(value)).transpose()
    }
}

impl Ord for ParamKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority()
            .cmp(&other.priority())
            .then_with(|| self.name().cmp(&other.name()))
            .then_with(|| {
                self.value_type()
                    .canonical_name()
                    .cmp(other.value_type().canonical_name())
            })
            .then_with(|| self.family().cmp(other.family()))
            .then_with(|| self.label().cmp(other.label()))
    }
}

impl PartialOrd for ParamKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ParamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated parameter values in rendering order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref)]
pub struct ParamMap(BTreeMap<ParamKey, ParamValue>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callers are responsible for having validated `value` against `key`.
    pub(crate) fn insert_validated(&mut self, key: ParamKey, value: ParamValue) {
        self.0.insert(key, value);
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&ParamKey, &mut ParamValue) -> bool) {
        self.0.retain(keep);
    }

    pub fn integer(&self, key: ParamKey) -> Option<u32> {
        self.0.get(&key).and_then(ParamValue::as_integer)
    }

    pub fn text(&self, key: ParamKey) -> Option<&str> {
        self.0.get(&key).and_then(ParamValue::as_text)
    }

    pub fn bytes(&self, key: ParamKey) -> Option<&[u8]> {
        self.0.get(&key).and_then(ParamValue::as_bytes)
    }

    /// The parameters that appear in a PHC string, with their rendered names.
    pub fn rendered(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.0
            .iter()
            .filter_map(|(key, value)| key.name().map(|name| (name, value)))
    }
}

pub fn arb_param_value() -> BoxedStrategy<ParamValue> {
    prop_oneof![
        any::<u32>().prop_map(ParamValue::Integer),
        "[A-Za-z0-9/+.-]{0,16}".prop_map(ParamValue::Text),
        proptest::collection::vec(any::<u8>(), 0..40).prop_map(ParamValue::Bytes),
    ]
    .boxed()
}
