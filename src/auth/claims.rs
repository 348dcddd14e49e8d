use serde::{Deserialize, Serialize};

/// JWT payload fields the service reads.
///
/// `aud` is checked by the verifier directly and is not deserialized here, since
/// identity providers send it either as a string or as an array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user ID
    pub exp: usize,  // expires at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>, // issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>, // issuer
}
