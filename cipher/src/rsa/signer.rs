use super::pss::{sign_pss, verify_pss, verify_pss_auto};
use crate::rsa::{PrivateKey, PublicKey};
use crate::{CipherError, Rand, Sign, Verify};
use crypto_hash::DigestX;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 盐的字节长度
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SaltLength {
    /// 签名时使用最大长度`emLen - hLen - 2`, 验证时从编码消息中恢复
    #[default]
    Auto,
    /// 等于摘要长度
    EqualsHash,
    Fixed(usize),
}

impl SaltLength {
    /// 签名时实际使用的盐长度
    pub fn resolve(&self, em_len: usize, hlen: usize) -> usize {
        match self {
            Self::Auto => em_len.saturating_sub(hlen + 2),
            Self::EqualsHash => hlen,
            Self::Fixed(x) => *x,
        }
    }
}

impl Display for SaltLength {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::EqualsHash => f.write_str("hash"),
            Self::Fixed(x) => write!(f, "{x}"),
        }
    }
}

impl FromStr for SaltLength {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "hash" | "equals-hash" => Ok(Self::EqualsHash),
            x => x.parse::<usize>().map(Self::Fixed).map_err(|e| {
                CipherError::Other(format!("pss: invalid salt length `{x}`, {e}"))
            }),
        }
    }
}

impl TryFrom<String> for SaltLength {
    type Error = CipherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SaltLength> for String {
    fn from(value: SaltLength) -> Self {
        value.to_string()
    }
}

pub struct PSSVerify<H: DigestX, R: Rand> {
    key: PublicKey,
    salt_len: SaltLength,
    // 签名时使用的盐长度
    slen: usize,
    hlen: usize,
    hf: RefCell<H>,
    rd: RefCell<R>,
}

pub struct PSSSign<H: DigestX, R: Rand> {
    key: PrivateKey,
    pss: PSSVerify<H, R>,
}

impl<H: DigestX, R: Rand> AsRef<PSSVerify<H, R>> for PSSSign<H, R> {
    fn as_ref(&self) -> &PSSVerify<H, R> {
        &self.pss
    }
}

impl<H: DigestX, R: Rand> AsRef<PublicKey> for PSSVerify<H, R> {
    fn as_ref(&self) -> &PublicKey {
        &self.key
    }
}

impl<H: DigestX, R: Rand> AsRef<PrivateKey> for PSSSign<H, R> {
    fn as_ref(&self) -> &PrivateKey {
        &self.key
    }
}

impl<H: DigestX, R: Rand> From<PSSSign<H, R>> for PSSVerify<H, R> {
    fn from(value: PSSSign<H, R>) -> Self {
        value.pss
    }
}

impl<H: DigestX, R: Rand> PSSVerify<H, R> {
    /// `hasher`: message digest generator;
    /// `rng`: random number generator, 用于生成盐;
    /// `salt_len`: 盐的字节长度策略, 见`SaltLength`;
    pub fn new(
        key: PublicKey,
        hasher: H,
        rng: R,
        salt_len: SaltLength,
    ) -> Result<Self, CipherError> {
        if hasher.digest_bits_x() & 7 != 0 {
            return Err(CipherError::Other(
                "pss: hasher bits must be multiple of 8".to_string(),
            ));
        }
        let (klen, hlen) = (key.key_len(), hasher.digest_bits_x() >> 3);
        if klen < hlen + 2 {
            return Err(CipherError::Other(
                "pss: the public key is too short".to_string(),
            ));
        }
        key.is_valid()?;

        let em_len = (key.bits().saturating_sub(1) + 7) >> 3;
        let slen = salt_len.resolve(em_len, hlen);
        if slen > em_len.saturating_sub(hlen + 2) {
            return Err(CipherError::EncodingTooShort {
                em_len,
                hash_len: hlen,
                salt_len: slen,
            });
        }

        log::debug!(
            "pss: {} bits key, hash length {hlen}, salt length {salt_len}({slen})",
            key.bits()
        );

        Ok(Self {
            key,
            salt_len,
            slen,
            hlen,
            hf: RefCell::new(hasher),
            rd: RefCell::new(rng),
        })
    }

    pub fn salt_len(&self) -> usize {
        self.slen
    }

    /// 公钥modulus占用的字节数
    pub fn key_len(&self) -> usize {
        self.key.key_len()
    }

    pub fn key_bits(&self) -> usize {
        self.key.bits()
    }

    /// 编码消息的位数
    pub fn em_bits(&self) -> usize {
        self.key_bits() - 1
    }

    pub fn em_len(&self) -> usize {
        (self.em_bits() + 7) >> 3
    }

    pub fn hash_len(&self) -> usize {
        self.hlen
    }

    fn hash(&self, msg: &[u8]) -> Vec<u8> {
        let mut hf = self.hf.borrow_mut();
        hf.reset_x();
        hf.write_x(msg);
        hf.finish_x()
    }

    fn verify_inner(&self, msg: &[u8], signature: &[u8]) -> Result<(), CipherError> {
        let hashed = self.hash(msg);
        let mut hf = self.hf.borrow_mut();
        match self.salt_len {
            SaltLength::Auto => verify_pss_auto(&self.key, &mut *hf, &hashed, signature),
            SaltLength::EqualsHash => {
                verify_pss(&self.key, &mut *hf, &hashed, signature, self.hlen)
            }
            SaltLength::Fixed(slen) => verify_pss(&self.key, &mut *hf, &hashed, signature, slen),
        }
    }
}

impl<H: DigestX, R: Rand> PSSSign<H, R> {
    /// `hasher`: message digest generator;
    /// `rng`: random number generator, 用于生成盐和私钥运算的盲化;
    /// `salt_len`: 盐的字节长度策略, 见`SaltLength`;
    pub fn new(
        key: PrivateKey,
        hasher: H,
        rng: R,
        salt_len: SaltLength,
    ) -> Result<Self, CipherError> {
        let pss = PSSVerify::new(key.public_key().clone(), hasher, rng, salt_len)?;
        key.is_valid()?;
        Ok(Self { pss, key })
    }

    /// 不检查key的合法性, 无需`n`的因子`p,q`
    pub fn new_uncheck(
        key: PrivateKey,
        hasher: H,
        rng: R,
        salt_len: SaltLength,
    ) -> Result<Self, CipherError> {
        let pss = PSSVerify::new(key.public_key().clone(), hasher, rng, salt_len)?;
        Ok(Self { pss, key })
    }

    pub fn salt_len(&self) -> usize {
        self.pss.salt_len()
    }

    pub fn key_len(&self) -> usize {
        self.pss.key_len()
    }

    pub fn key_bits(&self) -> usize {
        self.pss.key_bits()
    }

    pub fn em_len(&self) -> usize {
        self.pss.em_len()
    }

    pub fn em_bits(&self) -> usize {
        self.pss.em_bits()
    }

    pub fn hash_len(&self) -> usize {
        self.pss.hash_len()
    }

    fn sign_inner(&self, msg: &[u8], signature: &mut Vec<u8>) -> Result<(), CipherError> {
        let hashed = self.pss.hash(msg);
        let mut salt = vec![0u8; self.salt_len()];
        let mut rd = self.pss.rd.borrow_mut();
        rd.rand(salt.as_mut_slice())?;

        let mut hf = self.pss.hf.borrow_mut();
        let mut s = sign_pss(Some(&mut *rd), &self.key, &mut *hf, &hashed, &salt)?;
        signature.append(&mut s);
        Ok(())
    }
}

impl<H: DigestX, R: Rand> Verify for PSSVerify<H, R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        self.verify_inner(msg, sign)
    }
}

impl<H: DigestX, R: Rand> Verify for PSSSign<H, R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError> {
        self.pss.verify_inner(msg, sign)
    }
}

impl<H: DigestX, R: Rand> Sign for PSSSign<H, R> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        self.sign_inner(msg, sign)
    }
}
