use criterion::{Criterion, criterion_group, criterion_main};
use phc::{
    Registry, Token, TokenBuilder,
    function::{
        ARGON2ID, PBKDF2,
        argon2::{M, P, T},
        pbkdf2::{ALG, C, Pbkdf2Algorithm},
    },
};

const TOKEN: &str = "$argon2i$m=120,t=5000,p=2,keyid=Hj5+dsK0,data=sRlHhRmKUGzdOmXn01XmXygd5Kc\
                     $4fXXG0spB92WPB1NitT8/OH0VKI$iPBVuORECm5biUsjq33hn9/7BKqy9aPWKhFfK2haEsM";

fn bench_parse(c: &mut Criterion) {
    let registry = Registry::default();

    c.bench_function("parse", |b| b.iter(|| registry.parse(TOKEN).unwrap()));
}

fn bench_render(c: &mut Criterion) {
    let token: Token = TOKEN.parse().unwrap();

    c.bench_function("render", |b| b.iter(|| token.to_string()));
}

fn bench_hash(c: &mut Criterion) {
    let mut pbkdf2 = TokenBuilder::new(&PBKDF2);
    pbkdf2
        .with_param(ALG, Pbkdf2Algorithm::HmacSha256)
        .with_param(C, 10_000_u32)
        .with_random_salt(None)
        .unwrap();

    let mut argon2 = TokenBuilder::new(&ARGON2ID);
    argon2
        .with_param(M, 19_456_u32)
        .with_param(T, 2_u32)
        .with_param(P, 1_u32)
        .with_random_salt(None)
        .unwrap();

    c.bench_function("hash_pbkdf2", |b| {
        b.iter(|| pbkdf2.hash(b"password", None).unwrap())
    });
    c.bench_function("hash_argon2id", |b| {
        b.iter(|| argon2.hash(b"password", None).unwrap())
    });
}

fn with_samples(samples: usize) -> Criterion {
    Criterion::default().sample_size(samples)
}

criterion_group!(codec, bench_parse, bench_render);
criterion_group! {
    name = hashing;
    config = with_samples(10);
    targets = bench_hash
}
criterion_main!(codec, hashing);
