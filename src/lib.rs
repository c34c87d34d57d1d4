//! Encoding, decoding and verification of password hashes in the PHC string format.
//!
//! ```text
//! $argon2i$m=65536,t=2,p=1$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA
//! ```

pub mod encoding;
pub mod error;
pub mod function;
pub mod param;
pub mod token;

pub use error::{Error, Result};
pub use function::{PhcFunction, Registry};
pub use token::{Token, TokenBuilder};
