use std::path::Path;

use anyhow::Context;
use cipher::rsa::{PrivateKey, PublicKey};
use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Serialize};

use crate::error::RsaPssError;

/// JSON格式的RSA密钥文件, 所有整数都是十六进制字符串(可带`0x`前缀).
///
/// 公钥文件只需要`n`和`e`, 私钥文件还需要`d`, `primes`为空时不使用CRT.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyFile {
    pub n: String,
    pub e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primes: Vec<String>,
}

fn parse_hex(s: &str) -> Result<BigUint, RsaPssError> {
    let x = s.trim();
    let x = x
        .strip_prefix("0x")
        .or_else(|| x.strip_prefix("0X"))
        .unwrap_or(x);

    BigUint::from_str_radix(x, 16).map_err(|_| RsaPssError::InvalidHexInteger(s.to_string()))
}

impl KeyFile {
    pub fn open(p: &Path) -> anyhow::Result<Self> {
        anyhow::ensure!(
            p.is_file(),
            RsaPssError::PathNotExist(p.display().to_string())
        );

        let content = std::fs::read_to_string(p)
            .with_context(|| format!("read the key file `{}` failed", p.display()))?;

        serde_json::from_str(&content)
            .map_err(|e| RsaPssError::JsonParseFailed(format!("`{}`, {e}", p.display())).into())
    }

    pub fn public_key(&self) -> anyhow::Result<PublicKey> {
        let key = PublicKey::new_uncheck(parse_hex(&self.n)?, parse_hex(&self.e)?);
        key.is_valid()?;
        Ok(key)
    }

    pub fn private_key(&self) -> anyhow::Result<PrivateKey> {
        let d = self.d.as_deref().ok_or(RsaPssError::NotPrivateKey)?;
        let primes = self
            .primes
            .iter()
            .map(|x| parse_hex(x))
            .collect::<Result<Vec<_>, _>>()?;

        let key = PrivateKey::from_components(
            parse_hex(&self.n)?,
            parse_hex(&self.e)?,
            parse_hex(d)?,
            primes,
        )?;
        if !key.primes().is_empty() {
            key.is_valid()?;
        }

        log::debug!(
            "load {}-bit private key with {} primes",
            key.public_key().bits(),
            key.primes().len()
        );
        Ok(key)
    }
}
