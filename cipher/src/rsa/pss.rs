//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === PSS(Probabilistic Signature Scheme)
//!
//! ```txt
//! M' = 0x00 00 00 00 00 00 00 00 || mHash || salt
//! H  = Hash(M')
//! DB = PS || 0x01 || salt
//! EM = (DB ^ MGF1(H, emLen - hLen - 1)) || H || 0xbc
//! ```
//!
//! 验证失败只返回`CipherError::Verification`, 不区分失败的原因.

use super::guard::HashGuard;
use super::mgf::mgf1_xor;
use crate::rsa::{PrivateKey, PublicKey};
use crate::{CipherError, Rand};
use crypto_hash::DigestX;
use num_bigint::BigUint;
use subtle::ConstantTimeEq;
use utils::BigUintExt;

const TRAILER: u8 = 0xbc;
const PADDING1: [u8; 8] = [0u8; 8];

#[cfg(feature = "sec-zeroize")]
type Buf = zeroize::Zeroizing<Vec<u8>>;
#[cfg(not(feature = "sec-zeroize"))]
type Buf = Vec<u8>;

const fn em_len(em_bits: usize) -> usize {
    (em_bits + 7) >> 3
}

/// EMSA-PSS编码, `m_hash`是消息的摘要, `em_bits`一般为模数位长度减1.
pub fn emsa_pss_encode<H: DigestX + ?Sized>(
    m_hash: &[u8],
    em_bits: usize,
    salt: &[u8],
    hasher: &mut H,
) -> Result<Vec<u8>, CipherError> {
    let mut hf = HashGuard::new(hasher);
    let (hlen, slen, em_len) = (hf.hash_len(), salt.len(), em_len(em_bits));

    if m_hash.len() != hlen {
        return Err(CipherError::InvalidDigestLen {
            target: hlen,
            real: m_hash.len(),
        });
    }

    if em_len < hlen + slen + 2 {
        return Err(CipherError::EncodingTooShort {
            em_len,
            hash_len: hlen,
            salt_len: slen,
        });
    }

    // em = maskedDB || H || 0xbc
    let mut em = vec![0u8; em_len];
    let (db, h) = em.split_at_mut(em_len - hlen - 1);

    // H = Hash(M')
    hf.write_x(PADDING1.as_slice());
    hf.write_x(m_hash);
    hf.write_x(salt);
    h[..hlen].copy_from_slice(hf.finish_x().as_slice());
    h[hlen] = TRAILER;

    // db = ps || 0x01 || salt
    let ps_len = db.len() - slen - 1;
    db[ps_len] = 0x01;
    db[(ps_len + 1)..].copy_from_slice(salt);

    mgf1_xor(db, &mut *hf, &h[..hlen]);
    db[0] &= 0xffu8 >> ((em_len << 3) - em_bits);

    Ok(em)
}

/// EMSA-PSS验证, `s_len`是签名时使用的盐的字节长度.
pub fn emsa_pss_verify<H: DigestX + ?Sized>(
    m_hash: &[u8],
    em: &[u8],
    em_bits: usize,
    s_len: usize,
    hasher: &mut H,
) -> Result<(), CipherError> {
    emsa_pss_verify_inner(m_hash, em, em_bits, Some(s_len), hasher)
}

/// EMSA-PSS验证, 盐的长度由`DB`中`0x01`分隔符的位置确定.
pub fn emsa_pss_verify_auto<H: DigestX + ?Sized>(
    m_hash: &[u8],
    em: &[u8],
    em_bits: usize,
    hasher: &mut H,
) -> Result<(), CipherError> {
    emsa_pss_verify_inner(m_hash, em, em_bits, None, hasher)
}

fn emsa_pss_verify_inner<H: DigestX + ?Sized>(
    m_hash: &[u8],
    em: &[u8],
    em_bits: usize,
    s_len: Option<usize>,
    hasher: &mut H,
) -> Result<(), CipherError> {
    let mut hf = HashGuard::new(hasher);
    let (hlen, em_len) = (hf.hash_len(), em_len(em_bits));

    if m_hash.len() != hlen || em.len() != em_len {
        return Err(CipherError::Verification);
    }

    // 盐的长度由调用者给出, 可能任意大
    let max_slen = em_len.checked_sub(hlen + 2).ok_or(CipherError::Verification)?;
    if s_len.is_some_and(|x| x > max_slen) || em[em_len - 1] != TRAILER {
        return Err(CipherError::Verification);
    }

    let (masked_db, h) = (&em[..(em_len - hlen - 1)], &em[(em_len - hlen - 1)..(em_len - 1)]);
    let zero_bits = (em_len << 3) - em_bits;
    if masked_db[0] & !(0xffu8 >> zero_bits) != 0 {
        return Err(CipherError::Verification);
    }

    let mut db = Buf::from(masked_db.to_vec());
    mgf1_xor(db.as_mut_slice(), &mut *hf, h);
    db[0] &= 0xffu8 >> zero_bits;

    // db = ps || 0x01 || salt
    let ps_len = match s_len {
        Some(slen) => em_len - hlen - slen - 2,
        None => db
            .iter()
            .position(|&x| x != 0)
            .ok_or(CipherError::Verification)?,
    };
    if db[..ps_len].iter().any(|&x| x != 0) || db[ps_len] != 0x01 {
        return Err(CipherError::Verification);
    }

    hf.write_x(PADDING1.as_slice());
    hf.write_x(m_hash);
    hf.write_x(&db[(ps_len + 1)..]);
    let h0 = hf.finish_x();

    if bool::from(h0.as_slice().ct_eq(h)) {
        Ok(())
    } else {
        Err(CipherError::Verification)
    }
}

/// RSASSA-PSS签名, `hashed`是消息的摘要, 返回`ceil(bits(n) / 8)`字节的签名.
///
/// `rng`为`None`时私钥运算不使用盲化.
pub fn sign_pss<H: DigestX + ?Sized, R: Rand>(
    rng: Option<&mut R>,
    key: &PrivateKey,
    hasher: &mut H,
    hashed: &[u8],
    salt: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let pk = key.public_key();
    let em = Buf::from(emsa_pss_encode(
        hashed,
        pk.bits().saturating_sub(1),
        salt,
        hasher,
    )?);

    let m = BigUint::from_bytes_be(em.as_slice());
    let s = key.decrypt(rng, &m)?;

    BigUintExt(&s)
        .to_be_bytes_padded(pk.key_len())
        .ok_or(CipherError::Other(
            "pss: the signature is longer than the modulus".to_string(),
        ))
}

/// RSASSA-PSS验证, `s_len`是签名时使用的盐的字节长度.
pub fn verify_pss<H: DigestX + ?Sized>(
    key: &PublicKey,
    hasher: &mut H,
    hashed: &[u8],
    sig: &[u8],
    s_len: usize,
) -> Result<(), CipherError> {
    verify_pss_inner(key, hasher, hashed, sig, Some(s_len))
}

/// RSASSA-PSS验证, 盐的长度从编码消息中恢复.
pub fn verify_pss_auto<H: DigestX + ?Sized>(
    key: &PublicKey,
    hasher: &mut H,
    hashed: &[u8],
    sig: &[u8],
) -> Result<(), CipherError> {
    verify_pss_inner(key, hasher, hashed, sig, None)
}

fn verify_pss_inner<H: DigestX + ?Sized>(
    key: &PublicKey,
    hasher: &mut H,
    hashed: &[u8],
    sig: &[u8],
    s_len: Option<usize>,
) -> Result<(), CipherError> {
    let s = BigUint::from_bytes_be(sig);
    if &s >= key.modules() {
        return Err(CipherError::Verification);
    }

    let m = key.encrypt(&s);
    let em_bits = key.bits().saturating_sub(1);
    let em = BigUintExt(&m)
        .to_be_bytes_padded(em_len(em_bits))
        .ok_or(CipherError::Verification)?;

    emsa_pss_verify_inner(hashed, em.as_slice(), em_bits, s_len, hasher)
}
