//! RSA2 签名与验签

use base64::{Engine as _, engine::general_purpose::STANDARD};
use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey, Private, Public};
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};
use std::fmt;
use tracing::debug;

use crate::utils::error::{AppError, AppResult};

/// 商户私钥签名器，只能签名（RSA2: SHA256WithRSA, PKCS#1 v1.5）
#[derive(Clone)]
pub struct MerchantSigner {
    key: PKey<Private>,
}

impl MerchantSigner {
    /// 支持 PEM（PKCS#1 / PKCS#8）或者支付宝开放平台导出的无头 base64 私钥
    pub fn from_key_material(material: &str) -> AppResult<Self> {
        let material = material.trim();

        let key = if material.starts_with("-----BEGIN") {
            PKey::private_key_from_pem(material.as_bytes())?
        } else {
            let der = decode_key_body(material)?;
            match PKey::private_key_from_der(&der) {
                Ok(key) => key,
                Err(_) => PKey::from_rsa(Rsa::private_key_from_der(&der)?)?,
            }
        };

        ensure_rsa(key.id())?;
        Ok(Self { key })
    }

    // 生成支付宝签名
    pub fn sign(&self, content: &str) -> AppResult<String> {
        let mut signer = Signer::new(MessageDigest::sha256(), &self.key)?;
        signer.update(content.as_bytes())?;
        let signature = signer.sign_to_vec()?;

        Ok(STANDARD.encode(signature))
    }
}

impl fmt::Debug for MerchantSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantSigner").finish_non_exhaustive()
    }
}

/// 支付宝公钥验签器，只能验签
#[derive(Clone)]
pub struct GatewayVerifier {
    key: PKey<Public>,
}

impl GatewayVerifier {
    /// 支持 PEM（SPKI / PKCS#1）或者无头 base64 公钥
    pub fn from_key_material(material: &str) -> AppResult<Self> {
        let material = material.trim();

        let key = if material.starts_with("-----BEGIN RSA PUBLIC KEY") {
            PKey::from_rsa(Rsa::public_key_from_pem_pkcs1(material.as_bytes())?)?
        } else if material.starts_with("-----BEGIN") {
            PKey::public_key_from_pem(material.as_bytes())?
        } else {
            let der = decode_key_body(material)?;
            match PKey::public_key_from_der(&der) {
                Ok(key) => key,
                Err(_) => PKey::from_rsa(Rsa::public_key_from_der_pkcs1(&der)?)?,
            }
        };

        ensure_rsa(key.id())?;
        Ok(Self { key })
    }

    /// 验证支付宝签名
    ///
    /// 验签失败是正常结果：base64 非法、签名长度不对等一律返回 false。
    pub fn verify(&self, content: &str, signature: &str) -> bool {
        let signature = match STANDARD.decode(signature.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Signature is not valid base64: {}", e);
                return false;
            }
        };

        let result = Verifier::new(MessageDigest::sha256(), &self.key).and_then(|mut verifier| {
            verifier.update(content.as_bytes())?;
            verifier.verify(&signature)
        });

        match result {
            Ok(valid) => valid,
            Err(e) => {
                debug!("Signature verification error: {}", e);
                false
            }
        }
    }
}

impl fmt::Debug for GatewayVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayVerifier").finish_non_exhaustive()
    }
}

fn decode_key_body(material: &str) -> AppResult<Vec<u8>> {
    let body: String = material.split_whitespace().collect();
    STANDARD
        .decode(body)
        .map_err(|e| AppError::crypto(format!("Invalid key encoding: {}", e)))
}

fn ensure_rsa(id: Id) -> AppResult<()> {
    if id != Id::RSA {
        return Err(AppError::crypto("Only RSA keys are supported for RSA2 signing"));
    }
    Ok(())
}
