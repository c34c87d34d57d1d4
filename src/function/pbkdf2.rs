use std::{fmt::Display, str::FromStr};

use pbkdf2::pbkdf2_hmac;
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use crate::{
    error::{InvalidParameterError, OptionExt, Result},
    param::{ParamDomain, ParamDomainError, ParamKey, ParamMap, ParamSpec, ParamValue},
};

use super::PhcFunction;

pub static PBKDF2: Pbkdf2 = Pbkdf2;

/// The HMAC pseudo-random function.
pub const ALG: ParamKey = ParamKey::Pbkdf2(Pbkdf2Param::Algorithm);
/// Iteration count.
pub const C: ParamKey = ParamKey::Pbkdf2(Pbkdf2Param::Iterations);
/// Output length in bytes. Internal-only: it selects the length of the derived hash and is
/// never rendered.
pub const LENGTH: ParamKey = ParamKey::Pbkdf2(Pbkdf2Param::Length);

const DEFAULT_SALT_LENGTH: usize = 128;
const DEFAULT_HASH_LENGTH: usize = 64;

static PARAMETERS: [ParamKey; 3] = [ALG, LENGTH, C];

static ALGORITHM: ParamSpec = ParamSpec {
    name: Some("alg"),
    label: "alg",
    priority: 1,
    domain: ParamDomain::Text {
        allowed: Pbkdf2Algorithm::LABELS,
    },
};

static ITERATIONS: ParamSpec = ParamSpec {
    name: Some("c"),
    label: "c",
    priority: 2,
    domain: ParamDomain::Integer {
        min: 1,
        max: u32::MAX,
        recommended: Some(10_000),
    },
};

static OUTPUT_LENGTH: ParamSpec = ParamSpec {
    name: None,
    label: "length",
    priority: 2,
    domain: ParamDomain::Integer {
        min: 12,
        max: 64,
        recommended: None,
    },
};

#[derive(Arbitrary, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pbkdf2Param {
    Algorithm,
    Iterations,
    Length,
}

impl Pbkdf2Param {
    pub fn spec(self) -> &'static ParamSpec {
        match self {
            Self::Algorithm => &ALGORITHM,
            Self::Iterations => &ITERATIONS,
            Self::Length => &OUTPUT_LENGTH,
        }
    }
}

#[derive(Arbitrary, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pbkdf2Algorithm {
    #[serde(rename = "HmacSHA1")]
    HmacSha1,
    #[serde(rename = "HmacSHA224")]
    HmacSha224,
    #[serde(rename = "HmacSHA256")]
    HmacSha256,
    #[serde(rename = "HmacSHA384")]
    HmacSha384,
    #[serde(rename = "HmacSHA512")]
    HmacSha512,
    #[serde(rename = "HmacSHA3-224")]
    HmacSha3_224,
    #[serde(rename = "HmacSHA3-256")]
    HmacSha3_256,
    #[serde(rename = "HmacSHA3-384")]
    HmacSha3_384,
    #[serde(rename = "HmacSHA3-512")]
    HmacSha3_512,
}

impl Pbkdf2Algorithm {
    pub const ALL: [Self; 9] = [
        Self::HmacSha1,
        Self::HmacSha224,
        Self::HmacSha256,
        Self::HmacSha384,
        Self::HmacSha512,
        Self::HmacSha3_224,
        Self::HmacSha3_256,
        Self::HmacSha3_384,
        Self::HmacSha3_512,
    ];

    const LABELS: &'static [&'static str] = &[
        "HmacSHA1",
        "HmacSHA224",
        "HmacSHA256",
        "HmacSHA384",
        "HmacSHA512",
        "HmacSHA3-224",
        "HmacSHA3-256",
        "HmacSHA3-384",
        "HmacSHA3-512",
    ];

    /// The label rendered as the value of `alg`.
    pub fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }

    fn derive(self, password: &[u8], salt: &[u8], rounds: u32, output: &mut [u8]) {
        match self {
            Self::HmacSha1 => pbkdf2_hmac::<Sha1>(password, salt, rounds, output),
            Self::HmacSha224 => pbkdf2_hmac::<Sha224>(password, salt, rounds, output),
            Self::HmacSha256 => pbkdf2_hmac::<Sha256>(password, salt, rounds, output),
            Self::HmacSha384 => pbkdf2_hmac::<Sha384>(password, salt, rounds, output),
            Self::HmacSha512 => pbkdf2_hmac::<Sha512>(password, salt, rounds, output),
            Self::HmacSha3_224 => pbkdf2_hmac::<Sha3_224>(password, salt, rounds, output),
            Self::HmacSha3_256 => pbkdf2_hmac::<Sha3_256>(password, salt, rounds, output),
            Self::HmacSha3_384 => pbkdf2_hmac::<Sha3_384>(password, salt, rounds, output),
            Self::HmacSha3_512 => pbkdf2_hmac::<Sha3_512>(password, salt, rounds, output),
        }
    }
}

impl Display for Pbkdf2Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pbkdf2Algorithm {
    type Err = ParamDomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.label() == s)
            .ok_or_else(|| ParamDomainError::NotAllowed {
                value: s.to_owned(),
                allowed: Self::LABELS,
            })
    }
}

impl From<Pbkdf2Algorithm> for ParamValue {
    fn from(value: Pbkdf2Algorithm) -> Self {
        ParamValue::Text(value.label().to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2;

impl PhcFunction for Pbkdf2 {
    fn id(&self) -> &'static str {
        "pbkdf2"
    }

    fn parameters(&self) -> &'static [ParamKey] {
        &PARAMETERS
    }

    fn default_salt_length(&self) -> usize {
        DEFAULT_SALT_LENGTH
    }

    fn default_hash_length(&self) -> usize {
        DEFAULT_HASH_LENGTH
    }

    fn requested_length(&self, params: &ParamMap) -> Option<usize> {
        params
            .integer(LENGTH)
            .and_then(|length| usize::try_from(length).ok())
    }

    fn hash_password(
        &self,
        params: &ParamMap,
        password: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        let algorithm = params
            .text(ALG)
            .require_parameter(ALG.label())?
            .parse::<Pbkdf2Algorithm>()
            .map_err(|source| InvalidParameterError::new(ALG.label(), source))?;
        let rounds = params.integer(C).require_parameter(C.label())?;

        algorithm.derive(password, salt, rounds, output);

        Ok(())
    }
}
