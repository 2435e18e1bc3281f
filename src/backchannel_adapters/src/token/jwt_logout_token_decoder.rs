use std::sync::Arc;

use async_trait::async_trait;
use backchannel_core::{LogoutTokenClaims, LogoutTokenDecoder, TokenDecodeError};
use jsonwebtoken::{
    Validation, dangerous::insecure_decode, decode, decode_header, errors::ErrorKind,
};

use super::key_provider::{KeyFamily, KeyProvider};

/// Verifies logout token signatures with [`jsonwebtoken`].
///
/// The unverified `iss` claim only selects which keys to try. Claim checks
/// (`aud`, `exp`, ...) are left to the authenticator, so `jsonwebtoken`'s own
/// claim validation is switched off here.
#[derive(Clone)]
pub struct JwtLogoutTokenDecoder {
    keys: Arc<dyn KeyProvider>,
}

impl JwtLogoutTokenDecoder {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl LogoutTokenDecoder for JwtLogoutTokenDecoder {
    #[tracing::instrument(name = "JwtLogoutTokenDecoder::decode", skip_all)]
    async fn decode(&self, token: &str) -> Result<LogoutTokenClaims, TokenDecodeError> {
        // Unknown algorithms, including "none", fail here
        let header =
            decode_header(token).map_err(|e| TokenDecodeError::Malformed(e.to_string()))?;
        if KeyFamily::of(header.alg).is_none() {
            return Err(TokenDecodeError::UnsupportedAlgorithm(format!(
                "{:?}",
                header.alg
            )));
        }

        let unverified = insecure_decode::<LogoutTokenClaims>(token)
            .map_err(|e| TokenDecodeError::Malformed(e.to_string()))?;
        let issuer = unverified
            .claims
            .issuer()
            .ok_or_else(|| TokenDecodeError::Malformed("missing iss claim".to_owned()))?;

        let kid = header.kid.as_deref();
        let keys = self
            .keys
            .keys_for(issuer, kid)
            .await?
            .ok_or_else(|| TokenDecodeError::UnknownIssuer(issuer.to_owned()))?;

        let mut validation = Validation::new(header.alg);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        for key in keys.iter().filter(|key| key.accepts(header.alg, kid)) {
            match decode::<LogoutTokenClaims>(token, key.decoding_key(), &validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => continue,
                Err(e) => return Err(TokenDecodeError::Malformed(e.to_string())),
            }
        }

        Err(TokenDecodeError::InvalidSignature)
    }
}
