use std::collections::BTreeMap;

use rand::{CryptoRng, RngCore, rngs::OsRng};
use tracing::instrument;

use crate::{
    error::{Error, InvalidParameterError, Result},
    function::PhcFunction,
    param::{ParamDomainError, ParamKey, ParamMap, ParamValue},
};

use super::Token;

/// Collects the inputs of one hash computation.
///
/// Parameter values are validated when the token is produced, so a builder may be filled
/// in any order. After [`TokenBuilder::hash`] the builder is untouched and can hash again.
#[derive(Clone, Debug)]
pub struct TokenBuilder {
    function: &'static dyn PhcFunction,
    params: BTreeMap<ParamKey, ParamValue>,
    salt: Option<Vec<u8>>,
}

impl TokenBuilder {
    pub fn new(function: &'static dyn PhcFunction) -> Self {
        Self {
            function,
            params: BTreeMap::new(),
            salt: None,
        }
    }

    pub fn function(&self) -> &'static dyn PhcFunction {
        self.function
    }

    /// Sets `key`, replacing an earlier value. Text is coerced into the parameter's type.
    pub fn with_param(&mut self, key: ParamKey, value: impl Into<ParamValue>) -> &mut Self {
        self.params.insert(key, value.into());
        self
    }

    pub fn with_salt(&mut self, salt: impl Into<Vec<u8>>) -> Result<&mut Self> {
        if self.salt.is_some() {
            return Err(Error::SaltAlreadySet);
        }

        self.salt = Some(salt.into());
        Ok(self)
    }

    /// Fills the salt from the operating system's generator. Without a `length` the
    /// function's default salt length is used.
    pub fn with_random_salt(&mut self, length: Option<usize>) -> Result<&mut Self> {
        self.with_random_salt_from(OsRng, length)
    }

    pub fn with_random_salt_from(
        &mut self,
        mut csprng: impl RngCore + CryptoRng,
        length: Option<usize>,
    ) -> Result<&mut Self> {
        let mut salt = vec![0_u8; length.unwrap_or_else(|| self.function.default_salt_length())];

        csprng.fill_bytes(&mut salt);
        self.with_salt(salt)
    }

    /// Validates the collected parameters, then derives a hash of `password`.
    ///
    /// Without a `length` the output length is chosen by the function. Internal-only
    /// parameters take part in the derivation but are not kept in the token.
    #[instrument(skip_all, fields(function = self.function.id()))]
    pub fn hash(&self, password: impl AsRef<[u8]>, length: Option<usize>) -> Result<Token> {
        let salt = self.salt.as_deref().ok_or(Error::SaltRequired)?;
        let mut params = self.validated_params()?;
        let hash = self
            .function
            .derive(&params, salt, password.as_ref(), length)?;

        params.retain(|key, _| key.name().is_some());

        Ok(Token::new(
            self.function,
            params,
            Some(salt.to_vec()),
            Some(hash),
        ))
    }

    /// A token carrying only the function, the rendered parameters and the salt if one was
    /// set. Stores the configuration for hashes computed later.
    pub fn configuration(&self) -> Result<Token> {
        let mut params = self.validated_params()?;

        params.retain(|key, _| key.name().is_some());

        Ok(Token::new(self.function, params, self.salt.clone(), None))
    }

    fn validated_params(&self) -> Result<ParamMap> {
        let mut params = ParamMap::new();

        for (key, value) in &self.params {
            if !self.function.owns(*key) {
                return Err(InvalidParameterError::new(
                    key.label(),
                    ParamDomainError::NotOwned {
                        function: self.function.id(),
                    },
                )
                .into());
            }

            params.insert_validated(*key, key.validate(value.clone())?);
        }

        Ok(params)
    }
}
