pub mod claims;
pub mod descriptor;
pub mod factory;
pub mod key;
pub mod policy;
pub mod validator;

pub use claims::{Claims, RESERVED_CLAIMS, TOKEN_ID_CLAIM};
pub use descriptor::TokenDescriptor;
pub use factory::{JwtTokenFactory, TokenFactory};
pub use key::SigningKey;
pub use policy::{IssuerCheck, ValidationPolicy, ValidationPolicyBuilder};
pub use validator::{JwtTokenValidator, TokenValidator};
