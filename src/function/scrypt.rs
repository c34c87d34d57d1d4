use proptest_derive::Arbitrary;

use crate::{
    error::{OptionExt, Result},
    param::{ParamDomain, ParamKey, ParamMap, ParamSpec},
};

use super::PhcFunction;

pub static SCRYPT: Scrypt = Scrypt;

/// CPU/memory cost, a power of two.
pub const N: ParamKey = ParamKey::Scrypt(ScryptParam::CostFactor);
/// Block size multiplier.
pub const R: ParamKey = ParamKey::Scrypt(ScryptParam::BlockSize);
/// Parallelization factor.
pub const P: ParamKey = ParamKey::Scrypt(ScryptParam::Parallelization);

const DEFAULT_SALT_LENGTH: usize = 128;
const DEFAULT_HASH_LENGTH: usize = 64;

static PARAMETERS: [ParamKey; 3] = [N, R, P];

static COST_FACTOR: ParamSpec = ParamSpec {
    name: Some("N"),
    label: "N",
    priority: 1,
    domain: ParamDomain::PowerOfTwo {
        min: 2,
        max: 1 << 31,
    },
};

static BLOCK_SIZE: ParamSpec = ParamSpec {
    name: Some("r"),
    label: "r",
    priority: 2,
    domain: ParamDomain::Integer {
        min: 1,
        max: u32::MAX,
        recommended: None,
    },
};

static PARALLELIZATION: ParamSpec = ParamSpec {
    name: Some("p"),
    label: "p",
    priority: 3,
    domain: ParamDomain::Integer {
        min: 1,
        max: u32::MAX,
        recommended: None,
    },
};

#[derive(Arbitrary, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScryptParam {
    CostFactor,
    BlockSize,
    Parallelization,
}

impl ScryptParam {
    pub fn spec(self) -> &'static ParamSpec {
        match self {
            Self::CostFactor => &COST_FACTOR,
            Self::BlockSize => &BLOCK_SIZE,
            Self::Parallelization => &PARALLELIZATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrypt;

impl PhcFunction for Scrypt {
    fn id(&self) -> &'static str {
        "scrypt"
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

    fn hash_password(
        &self,
        params: &ParamMap,
        password: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        let cost_factor = params.integer(N).require_parameter(N.label())?;
        // Validated as a power of two, so the exponent is exact.
        let log_n = cost_factor.trailing_zeros() as u8;
        let r = params.integer(R).require_parameter(R.label())?;
        let p = params.integer(P).require_parameter(P.label())?;
        // The length recorded in `Params` only matters for the crate's own PHC encoder.
        let params = scrypt::Params::new(log_n, r, p, scrypt::Params::RECOMMENDED_LEN)?;

        scrypt::scrypt(password, salt, &params, output)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn params(cost: u32, r: u32, p: u32) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert_validated(N, cost.into());
        params.insert_validated(R, r.into());
        params.insert_validated(P, p.into());
        params
    }

    #[test]
    fn matches_the_rfc_7914_vector() {
        let hash = SCRYPT
            .derive(&params(1024, 8, 16), b"NaCl", b"password", Some(64))
            .unwrap();

        assert_eq!(
            hex::encode(hash),
            "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162\
             2eaf30d92e22a3886ff109279d9830dac727afb94a83ee6d8360cbdfa2cc0640"
        );
    }

    #[test]
    fn cost_is_the_literal_work_factor() {
        let hash = SCRYPT
            .derive(&params(4, 1, 1), b"salt", b"password", Some(32))
            .unwrap();
        let mut expected = [0_u8; 32];
        scrypt::scrypt(
            b"password",
            b"salt",
            &scrypt::Params::new(2, 1, 1, 32).unwrap(),
            &mut expected,
        )
        .unwrap();

        assert_eq!(hash, expected);
    }

    #[test]
    fn missing_block_size_is_reported() {
        let mut params = ParamMap::new();
        params.insert_validated(N, 16_u32.into());
        params.insert_validated(P, 1_u32.into());

        assert!(matches!(
            SCRYPT.derive(&params, b"salt", b"password", None),
            Err(Error::MissingParameter { label: "r" })
        ));
    }
}
