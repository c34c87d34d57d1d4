//! Password-protection functions and the registry that resolves them by identifier.
//!
//! The derivations themselves are delegated to the RustCrypto implementations; the
//! descriptors only select and validate their inputs.

use std::fmt::Debug;

use indexmap::IndexMap;
use tracing::instrument;
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    param::{ParamKey, ParamMap},
    token::{Token, builder::TokenBuilder},
};

pub mod argon2;
pub mod bcrypt;
pub mod pbkdf2;
pub mod scrypt;

pub use self::{
    argon2::{ARGON2D, ARGON2I, ARGON2ID},
    bcrypt::BCRYPT,
    pbkdf2::PBKDF2,
    scrypt::SCRYPT,
};

pub trait PhcFunction: Debug + Send + Sync {
    /// The identifier that follows the leading `$` of a PHC string.
    fn id(&self) -> &'static str;

    /// Every parameter this function accepts, in rendering order.
    fn parameters(&self) -> &'static [ParamKey];

    fn default_salt_length(&self) -> usize;

    fn default_hash_length(&self) -> usize;

    /// Writes `output.len()` bytes derived from `password` and `salt` into `output`.
    fn hash_password(
        &self,
        params: &ParamMap,
        password: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<()>;

    /// Output length selected through an internal-only parameter, if the function has one.
    fn requested_length(&self, _params: &ParamMap) -> Option<usize> {
        None
    }

    /// Resolves a rendered parameter name. Unknown names yield `None`.
    fn parameter(&self, name: &str) -> Option<ParamKey> {
        self.parameters()
            .iter()
            .copied()
            .find(|key| key.name() == Some(name))
    }

    fn owns(&self, key: ParamKey) -> bool {
        self.parameters().contains(&key)
    }

    /// Derives a hash of `length` bytes, or of the function's own preferred length.
    ///
    /// An empty output would match any password and is refused.
    fn derive(
        &self,
        params: &ParamMap,
        salt: &[u8],
        password: &[u8],
        length: Option<usize>,
    ) -> Result<Vec<u8>> {
        let length = length
            .or_else(|| self.requested_length(params))
            .unwrap_or_else(|| self.default_hash_length());

        if length == 0 {
            return Err(Error::EmptyHash);
        }

        let mut output = Zeroizing::new(vec![0_u8; length]);

        self.hash_password(params, password, salt, &mut output)?;

        Ok(std::mem::take(&mut *output))
    }
}

/// Immutable lookup from function identifiers to their descriptors.
///
/// Build it once, then share it by reference with everything that parses or creates
/// tokens.
#[derive(Clone, Debug)]
pub struct Registry {
    by_id: IndexMap<&'static str, &'static dyn PhcFunction>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builder()
            .register(&ARGON2I)
            .register(&ARGON2D)
            .register(&ARGON2ID)
            .register(&PBKDF2)
            .register(&BCRYPT)
            .register(&SCRYPT)
            .build()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        Default::default()
    }

    pub fn lookup(&self, id: &str) -> Option<&'static dyn PhcFunction> {
        self.by_id.get(id).copied()
    }

    /// Registered functions in registration order.
    pub fn functions(&self) -> impl Iterator<Item = &'static dyn PhcFunction> + '_ {
        self.by_id.values().copied()
    }

    #[instrument(skip(self, token))]
    pub fn parse(&self, token: &str) -> Result<Token> {
        crate::token::parser::parse(self, token)
    }

    pub fn token_builder(&self, id: &str) -> Result<TokenBuilder> {
        self.lookup(id)
            .map(TokenBuilder::new)
            .ok_or_else(|| Error::UnknownFunction { id: id.to_owned() })
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegistryBuilder {
    by_id: IndexMap<&'static str, &'static dyn PhcFunction>,
}

impl RegistryBuilder {
    /// Adds `function` under its identifier. Identifiers are unique; a repeated
    /// registration keeps the first descriptor.
    pub fn register(&mut self, function: &'static dyn PhcFunction) -> &mut Self {
        let id = function.id();

        debug_assert!(
            !self.by_id.contains_key(id),
            "function {id:?} registered twice"
        );
        self.by_id.entry(id).or_insert(function);
        self
    }

    pub fn build(&self) -> Registry {
        Registry {
            by_id: self.by_id.clone(),
        }
    }
}
