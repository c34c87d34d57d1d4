use itertools::Itertools;
use phc::{
    TokenBuilder, encoding,
    function::{
        PBKDF2, SCRYPT,
        pbkdf2::{ALG, C, Pbkdf2Algorithm},
        scrypt::{self, N, R},
    },
};
use proptest::{
    arbitrary::{Arbitrary, any},
    collection::vec,
    option, prop_compose,
    strategy::{BoxedStrategy, Just, Strategy},
};

/// A builder with a salt set, ready to hash `password`.
#[allow(unused)]
#[derive(Debug, Clone)]
pub struct HashingInput {
    pub builder: TokenBuilder,
    pub password: Vec<u8>,
}

prop_compose! {
    fn arb_pbkdf2_builder()(
        algorithm in any::<Pbkdf2Algorithm>(),
        rounds in 1_u32..4,
        salt in vec(any::<u8>(), 0..32),
    ) -> TokenBuilder {
        let mut builder = TokenBuilder::new(&PBKDF2);
        builder.with_param(ALG, algorithm).with_param(C, rounds);
        builder.with_salt(salt).unwrap();
        builder
    }
}

prop_compose! {
    fn arb_scrypt_builder()(
        log_n in 2_u32..=4,
        r in 1_u32..=2,
        p in 1_u32..=2,
        salt in vec(any::<u8>(), 1..32),
    ) -> TokenBuilder {
        let mut builder = TokenBuilder::new(&SCRYPT);
        builder
            .with_param(N, 1_u32 << log_n)
            .with_param(R, r)
            .with_param(scrypt::P, p);
        builder.with_salt(salt).unwrap();
        builder
    }
}

prop_compose! {
    fn arb_hashing_input()(
        builder in proptest::prop_oneof![arb_pbkdf2_builder(), arb_scrypt_builder()],
        password in vec(any::<u8>(), 0..64),
    ) -> HashingInput {
        HashingInput { builder, password }
    }
}

impl Arbitrary for HashingInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        arb_hashing_input().boxed()
    }
}

/// An Argon2 PHC string in canonical form, as it is rendered by [`phc::Token`].
#[allow(unused)]
#[derive(Debug, Clone)]
pub struct CanonicalArgon2Token(pub String);

prop_compose! {
    fn arb_canonical_argon2_token()(
        id in proptest::sample::select(vec!["argon2i", "argon2d", "argon2id"]),
        m in 1_u32..,
        t in 1_u32..,
        p in 1_u32..=255,
        keyid in option::of(vec(any::<u8>(), 0..=8)),
        data in option::of(vec(any::<u8>(), 0..=32)),
        salt in option::of(vec(any::<u8>(), 0..64)),
    )(
        hash in if salt.is_some() {
            option::of(vec(any::<u8>(), 0..64)).boxed()
        } else {
            Just(None).boxed()
        },
        id in Just(id),
        m in Just(m),
        t in Just(t),
        p in Just(p),
        keyid in Just(keyid),
        data in Just(data),
        salt in Just(salt),
    ) -> CanonicalArgon2Token {
        let params = [("m", Some(m.to_string())), ("t", Some(t.to_string())), ("p", Some(p.to_string()))]
            .into_iter()
            .chain([
                ("keyid", keyid.as_deref().map(encoding::encode)),
                ("data", data.as_deref().map(encoding::encode)),
            ])
            .filter_map(|(name, value)| value.map(|value| format!("{name}={value}")))
            .join(",");
        let mut token = format!("${id}${params}");

        for segment in [salt, hash].into_iter().flatten() {
            token.push('$');
            token.push_str(&encoding::encode(&segment));
        }

        CanonicalArgon2Token(token)
    }
}

impl Arbitrary for CanonicalArgon2Token {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        arb_canonical_argon2_token().boxed()
    }
}
