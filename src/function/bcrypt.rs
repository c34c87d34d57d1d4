use proptest_derive::Arbitrary;
use zeroize::Zeroizing;

use crate::{
    error::{Error, OptionExt, Result},
    param::{ParamDomain, ParamKey, ParamMap, ParamSpec},
};

use super::PhcFunction;

pub static BCRYPT: Bcrypt = Bcrypt;

/// Base-2 logarithm of the number of key expansion rounds.
pub const COST: ParamKey = ParamKey::Bcrypt(BcryptParam::Cost);

const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 24;
const MAX_PASSWORD_LENGTH: usize = 72;

static PARAMETERS: [ParamKey; 1] = [COST];

static COST_SPEC: ParamSpec = ParamSpec {
    name: Some("c"),
    label: "c",
    priority: 1,
    domain: ParamDomain::Integer {
        min: 4,
        max: 31,
        recommended: Some(10),
    },
};

#[derive(Arbitrary, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BcryptParam {
    Cost,
}

impl BcryptParam {
    pub fn spec(self) -> &'static ParamSpec {
        match self {
            Self::Cost => &COST_SPEC,
        }
    }
}

/// Raw bcrypt output, without the modular crypt encoding. Salt and hash sizes are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bcrypt;

impl PhcFunction for Bcrypt {
    fn id(&self) -> &'static str {
        "bcrypt"
    }

    fn parameters(&self) -> &'static [ParamKey] {
        &PARAMETERS
    }

    fn default_salt_length(&self) -> usize {
        SALT_LENGTH
    }

    fn default_hash_length(&self) -> usize {
        HASH_LENGTH
    }

    fn hash_password(
        &self,
        params: &ParamMap,
        password: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        let cost = params.integer(COST).require_parameter(COST.label())?;
        let salt: [u8; SALT_LENGTH] = salt.try_into().map_err(|_| Error::InvalidLength {
            label: "salt",
            expected: SALT_LENGTH,
            actual: salt.len(),
        })?;

        if output.len() != HASH_LENGTH {
            return Err(Error::InvalidLength {
                label: "hash",
                expected: HASH_LENGTH,
                actual: output.len(),
            });
        }

        // The key schedule consumes the password NUL-terminated, truncated to 72 bytes.
        let mut key = Zeroizing::new(Vec::with_capacity(password.len() + 1));
        key.extend_from_slice(password);
        key.push(0);
        key.truncate(MAX_PASSWORD_LENGTH);

        let hash = Zeroizing::new(bcrypt::bcrypt(cost, salt, &key));
        output.copy_from_slice(&*hash);

        Ok(())
    }
}
