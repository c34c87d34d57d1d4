//! The PHC string value object.
//!
//! A [`Token`] is either parsed from its textual form ([`crate::Registry::parse`]) or
//! produced by hashing a password with a [`TokenBuilder`]. Tokens are immutable; the
//! [`Display`] implementation renders the canonical string, which parses back into an
//! equal token.

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use itertools::Itertools;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use tracing::instrument;
use zeroize::Zeroizing;

use crate::{
    encoding,
    error::{Error, Result},
    function::{PhcFunction, Registry},
    param::{ParamKey, ParamMap, ParamValue},
};

pub mod builder;
pub mod parser;

pub use builder::TokenBuilder;

#[derive(Clone, SerializeDisplay, DeserializeFromStr)]
pub struct Token {
    function: &'static dyn PhcFunction,
    params: ParamMap,
    salt: Option<Box<[u8]>>,
    hash: Option<Box<[u8]>>,
}

impl Token {
    /// `params` must hold values validated against keys owned by `function`.
    pub(crate) fn new(
        function: &'static dyn PhcFunction,
        params: ParamMap,
        salt: Option<Vec<u8>>,
        hash: Option<Vec<u8>>,
    ) -> Self {
        debug_assert!(params.keys().all(|key| function.owns(*key)));

        Self {
            function,
            params,
            salt: salt.map(Vec::into_boxed_slice),
            hash: hash.map(Vec::into_boxed_slice),
        }
    }

    pub fn function(&self) -> &'static dyn PhcFunction {
        self.function
    }

    pub fn id(&self) -> &'static str {
        self.function.id()
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn param(&self, key: ParamKey) -> Option<&ParamValue> {
        self.params.get(&key)
    }

    pub fn integer(&self, key: ParamKey) -> Option<u32> {
        self.params.integer(key)
    }

    pub fn text(&self, key: ParamKey) -> Option<&str> {
        self.params.text(key)
    }

    pub fn bytes(&self, key: ParamKey) -> Option<&[u8]> {
        self.params.bytes(key)
    }

    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    pub fn hash(&self) -> Option<&[u8]> {
        self.hash.as_deref()
    }

    /// Checks `password` against the stored hash.
    ///
    /// The candidate hash is derived with the stored parameters and salt at the stored
    /// hash's length, then compared in constant time.
    #[instrument(skip_all, fields(function = self.id()))]
    pub fn verify(&self, password: impl AsRef<[u8]>) -> Result<bool> {
        let (Some(salt), Some(hash)) = (self.salt(), self.hash()) else {
            return Err(Error::IncompleteToken);
        };

        if hash.is_empty() {
            return Err(Error::EmptyHash);
        }

        let candidate = Zeroizing::new(self.function.derive(
            &self.params,
            salt,
            password.as_ref(),
            Some(hash.len()),
        )?);

        Ok(encoding::constant_time_eq(&candidate, hash))
    }

    /// A builder for new hashes with this token's function and parameters.
    ///
    /// Useful with parameter-only tokens that store the configuration for future hashes.
    pub fn to_builder(&self) -> TokenBuilder {
        let mut builder = TokenBuilder::new(self.function);

        for (key, value) in self.params.iter() {
            builder.with_param(*key, value.clone());
        }

        builder
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.id())?;

        let mut rendered = self.params.rendered().peekable();

        if rendered.peek().is_some() {
            write!(
                f,
                "${}",
                rendered.format_with(",", |(name, value), f| {
                    f(&format_args!("{name}={value}"))
                })
            )?;
        }

        if let Some(salt) = self.salt() {
            write!(f, "${}", encoding::encode(salt))?;

            if let Some(hash) = self.hash() {
                write!(f, "${}", encoding::encode(hash))?;
            }
        }

        Ok(())
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("function", &self.id())
            .field("params", &self.params)
            .field("salt", &self.salt().map(encoding::encode))
            .field("hash", &self.hash().map(encoding::encode))
            .finish()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
            && self.params == other.params
            && self.salt == other.salt
            && self.hash == other.hash
    }
}

impl Eq for Token {}

/// Parses against [`Registry::default`].
impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Registry::default().parse(s)
    }
}
