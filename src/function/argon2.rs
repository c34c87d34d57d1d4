use proptest_derive::Arbitrary;

use crate::{
    error::{OptionExt, Result},
    param::{ParamDomain, ParamKey, ParamMap, ParamSpec},
};

use super::PhcFunction;

pub static ARGON2I: Argon2 = Argon2::new(Variant::Argon2i);
pub static ARGON2D: Argon2 = Argon2::new(Variant::Argon2d);
pub static ARGON2ID: Argon2 = Argon2::new(Variant::Argon2id);

/// Memory size in 1 KiB blocks.
pub const M: ParamKey = ParamKey::Argon2(Argon2Param::MemoryCost);
/// Number of iterations.
pub const T: ParamKey = ParamKey::Argon2(Argon2Param::Iterations);
/// Degree of parallelism.
pub const P: ParamKey = ParamKey::Argon2(Argon2Param::Parallelism);
/// Secret key mixed into the hash, identified in the string by its bytes.
pub const KEY_ID: ParamKey = ParamKey::Argon2(Argon2Param::KeyId);
/// Associated data.
pub const DATA: ParamKey = ParamKey::Argon2(Argon2Param::Data);

const DEFAULT_SALT_LENGTH: usize = 16;
const DEFAULT_HASH_LENGTH: usize = 32;

static PARAMETERS: [ParamKey; 5] = [M, T, P, KEY_ID, DATA];

static MEMORY_COST: ParamSpec = ParamSpec {
    name: Some("m"),
    label: "m",
    priority: 1,
    domain: ParamDomain::Integer {
        min: 1,
        max: u32::MAX,
        recommended: None,
    },
};

static ITERATIONS: ParamSpec = ParamSpec {
    name: Some("t"),
    label: "t",
    priority: 2,
    domain: ParamDomain::Integer {
        min: 1,
        max: u32::MAX,
        recommended: None,
    },
};

static PARALLELISM: ParamSpec = ParamSpec {
    name: Some("p"),
    label: "p",
    priority: 3,
    domain: ParamDomain::Integer {
        min: 1,
        max: 255,
        recommended: None,
    },
};

static KEY_ID_SPEC: ParamSpec = ParamSpec {
    name: Some("keyid"),
    label: "keyid",
    priority: 4,
    domain: ParamDomain::Bytes { max_len: 8 },
};

static DATA_SPEC: ParamSpec = ParamSpec {
    name: Some("data"),
    label: "data",
    priority: 5,
    domain: ParamDomain::Bytes { max_len: 32 },
};

#[derive(Arbitrary, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Argon2Param {
    MemoryCost,
    Iterations,
    Parallelism,
    KeyId,
    Data,
}

impl Argon2Param {
    pub fn spec(self) -> &'static ParamSpec {
        match self {
            Self::MemoryCost => &MEMORY_COST,
            Self::Iterations => &ITERATIONS,
            Self::Parallelism => &PARALLELISM,
            Self::KeyId => &KEY_ID_SPEC,
            Self::Data => &DATA_SPEC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Argon2d,
    Argon2i,
    Argon2id,
}

impl From<Variant> for argon2::Algorithm {
    fn from(value: Variant) -> Self {
        match value {
            Variant::Argon2d => argon2::Algorithm::Argon2d,
            Variant::Argon2i => argon2::Algorithm::Argon2i,
            Variant::Argon2id => argon2::Algorithm::Argon2id,
        }
    }
}

/// One Argon2 variant. All variants share the same parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2 {
    variant: Variant,
}

impl Argon2 {
    pub const fn new(variant: Variant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl PhcFunction for Argon2 {
    fn id(&self) -> &'static str {
        match self.variant {
            Variant::Argon2d => "argon2d",
            Variant::Argon2i => "argon2i",
            Variant::Argon2id => "argon2id",
        }
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
        let m_cost = params.integer(M).require_parameter(M.label())?;
        let t_cost = params.integer(T).require_parameter(T.label())?;
        let p_cost = params.integer(P).require_parameter(P.label())?;
        let mut builder = argon2::ParamsBuilder::new();

        builder
            .m_cost(m_cost)
            .t_cost(t_cost)
            .p_cost(p_cost)
            .output_len(output.len());

        if let Some(data) = params.bytes(DATA) {
            builder.data(argon2::AssociatedData::new(data)?);
        }

        let argon2 = argon2::Argon2::new_with_secret(
            params.bytes(KEY_ID).unwrap_or_default(),
            self.variant.into(),
            argon2::Version::V0x13,
            builder.build()?,
        )?;
        argon2.hash_password_into(password, salt, output)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn variants_share_parameters() {
        assert_eq!(ARGON2I.parameters(), ARGON2ID.parameters());
        assert_eq!(ARGON2D.parameter("keyid"), Some(KEY_ID));
        assert!(ARGON2I.owns(DATA));
    }

    #[test]
    fn memory_below_the_primitive_minimum_is_reported() {
        let mut params = ParamMap::new();
        params.insert_validated(M, 1_u32.into());
        params.insert_validated(T, 1_u32.into());
        params.insert_validated(P, 1_u32.into());

        let result = ARGON2ID.derive(&params, b"somesalt", b"password", None);

        assert!(matches!(result, Err(Error::Argon2(_))));
    }

    #[test]
    fn keyid_and_data_change_the_output() {
        let mut params = ParamMap::new();
        params.insert_validated(M, 32_u32.into());
        params.insert_validated(T, 1_u32.into());
        params.insert_validated(P, 1_u32.into());

        let plain = ARGON2ID.derive(&params, b"somesalt", b"password", None).unwrap();
        params.insert_validated(KEY_ID, b"key".into());
        let keyed = ARGON2ID.derive(&params, b"somesalt", b"password", None).unwrap();
        params.insert_validated(DATA, b"data".into());
        let with_data = ARGON2ID.derive(&params, b"somesalt", b"password", None).unwrap();

        assert_eq!(plain.len(), DEFAULT_HASH_LENGTH);
        assert_ne!(plain, keyed);
        assert_ne!(keyed, with_data);
    }
}
