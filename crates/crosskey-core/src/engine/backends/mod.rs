pub mod mock;
pub mod rustcrypto;

pub use mock::MockEngine;
pub use rustcrypto::RustCryptoEngine;
