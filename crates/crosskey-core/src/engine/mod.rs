pub mod backends;
pub mod traits;

pub use backends::{MockEngine, RustCryptoEngine};
pub use traits::CryptoEngine;
