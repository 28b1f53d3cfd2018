//! 参考notebook 'RSA密码学规范PKCS1_v_2_2.md'
use crate::{CipherError, Rand};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utils::BigUintExt;

/// 寻找可逆盲化因子的最大尝试次数. 对正常的RSA模数, 随机数与模数不互质的概率可以忽略.
pub const MAX_BLINDING_ATTEMPTS: usize = 256;

#[derive(Clone, Debug, PartialOrd, PartialEq, Ord, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    // n = p * q
    n: BigUint,
    // public exponent, gcd(e, (p-1)(q-1)) = 1
    e: BigUint,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrivateKey {
    pk: PublicKey,
    // d * e = 1 % lambda(n)
    // lambda(n) = (p-1)(q-1)*r1*...*ri*...
    d: BigUint,
    // n = p * q * r1 * ... * ri * ...
    // 为空时只能使用`c^d mod n`解密
    #[serde(default)]
    primes: Vec<BigUint>,
    // 预计算值, 加速私钥的计算
    #[serde(default)]
    pre: Option<PrecomputedValues>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRTValue {
    // d % (ri-1)
    di: BigUint,
    //Ri: rm = r1 * r2 * ... r_(i-1), r0 = p * q
    rm: BigUint,
    // CRT coefficients: $r \cdot coeff \equiv 1 \mod prime$
    // rm^{-1} % ri
    ti: BigUint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedValues {
    // $e \cdot d_p \equiv 1 \mod (p-1)$
    // d % (p - 1)
    d_p: BigUint,
    // $e \cdot d_q \equiv 1 \mod (q-1)$
    // d % (q - 1)
    d_q: BigUint,
    // $q \cdot q_inv \equiv 1 \mod p$
    // q^{-1} % p
    q_inv: BigUint,

    // CRTValues is used for the 3rd and subsequent primes. Due to a
    // historical accident, the CRT for the first two primes is handled
    // differently in PKCS#1 and interoperability is sufficiently
    // important that we mirror this.
    crt_val: Vec<CRTValue>,
}

impl PublicKey {
    /// n: RSA modules
    /// e: public key exponent
    /// note: not to check the `n` and `exp` are right RSA parameters
    pub fn new_uncheck(n: BigUint, exp: BigUint) -> Self {
        Self { e: exp, n }
    }

    /// note: not to check the `n` and `exp` are right RSA parameters
    pub fn from_be_bytes(n: &[u8], exp: &[u8]) -> Self {
        Self {
            e: BigUint::from_bytes_be(exp),
            n: BigUint::from_bytes_be(n),
        }
    }

    /// n
    pub fn modules(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// 模数的位长度
    pub fn bits(&self) -> usize {
        self.n.bits() as usize
    }

    /// 模数的字节长度, 也是签名的字节长度
    pub fn key_len(&self) -> usize {
        (self.bits() + 7) >> 3
    }

    /// $m^e \mod n$, 不检查`m`的范围, 也不做任何填充
    pub fn encrypt(&self, m: &BigUint) -> BigUint {
        m.modpow(&self.e, &self.n)
    }

    /// RSAEP: RSA Encrypt primitive
    pub fn rsaep(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        if m < &self.n {
            Ok(self.encrypt(m))
        } else {
            Err(CipherError::Other(format!(
                "rsaep: invalid message that need less than {:#x}",
                self.n
            )))
        }
    }

    pub fn is_valid(&self) -> Result<(), CipherError> {
        if self.e < BigUint::from(2u8) {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: public key {:#x} is too small",
                self.e
            )))
        } else if self.e > BigUint::from(u32::MAX - 1) {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: public key {:#x} is too large",
                self.e
            )))
        } else {
            Ok(())
        }
    }
}

impl PrivateKey {
    /// 没有素因子, 解密时直接计算`c^d mod n`
    pub fn new_uncheck(modulus: BigUint, public_exp: BigUint, private_exp: BigUint) -> Self {
        Self {
            pk: PublicKey::new_uncheck(modulus, public_exp),
            d: private_exp,
            primes: Vec::new(),
            pre: None,
        }
    }

    /// `primes`: `p, q, r1, r2, ...`, 有两个及以上素因子时会预计算CRT参数.
    /// note: 不检查`primes`的乘积是否等于`modulus`
    pub fn from_components(
        modulus: BigUint,
        public_exp: BigUint,
        private_exp: BigUint,
        primes: Vec<BigUint>,
    ) -> Result<Self, CipherError> {
        if primes.len() == 1 {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: need at least two primes".to_string(),
            ));
        }

        let mut key = Self {
            pk: PublicKey::new_uncheck(modulus, public_exp),
            d: private_exp,
            primes,
            pre: None,
        };
        key.precompute()?;
        Ok(key)
    }

    /// 计算CRT参数, 已经计算过或者素因子少于两个时不做任何事
    pub fn precompute(&mut self) -> Result<(), CipherError> {
        if self.pre.is_some() || self.primes.len() < 2 {
            return Ok(());
        }

        let pre = PrecomputedValues::new(
            &self.primes[0],
            &self.primes[1],
            &self.d,
            &self.primes[2..],
        )?;
        self.pre = Some(pre);
        Ok(())
    }

    /// 丢弃CRT参数, 之后的解密都使用`c^d mod n`
    pub fn clear_precomputed(&mut self) {
        self.pre = None;
    }

    pub fn is_precomputed(&self) -> bool {
        self.pre.is_some()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    pub fn primes(&self) -> &[BigUint] {
        self.primes.as_slice()
    }

    /// RSADP: RSA Decrypt primitive, 不使用盲化
    pub fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        if c < &self.pk.n {
            Ok(self.rsadp_uncheck(c))
        } else {
            Err(CipherError::Decryption)
        }
    }

    /// 私钥运算`c^d mod n`.
    ///
    /// `rng`不为`None`时使用盲化: 随机选择与`n`互质的`r`, 对`c * r^e`做私钥运算后再乘以`r^{-1}`,
    /// 使得私钥运算的耗时/功耗与攻击者选择的`c`无关. 结果与不盲化时完全相同.
    pub fn decrypt<R: Rand>(
        &self,
        rng: Option<&mut R>,
        c: &BigUint,
    ) -> Result<BigUint, CipherError> {
        let n = &self.pk.n;
        if c >= n {
            return Err(CipherError::Decryption);
        }

        let Some(rng) = rng else {
            log::trace!("rsa: decrypt without blinding");
            return Ok(self.rsadp_uncheck(c));
        };

        let (r, ir) = self.blinding_factor(rng)?;
        let blinded = (c * r.modpow(&self.pk.e, n)) % n;
        let m = self.rsadp_uncheck(&blinded);

        Ok((m * ir) % n)
    }

    // (r, r^{-1} mod n)
    fn blinding_factor<R: Rand>(&self, rng: &mut R) -> Result<(BigUint, BigUint), CipherError> {
        let n = &self.pk.n;
        for i in 0..MAX_BLINDING_ATTEMPTS {
            let mut r = BigUintExt(n).gen_random(rng)?;
            if r.is_zero() {
                r = BigUint::one();
            }

            if let Some(ir) = BigUintExt(&r).modinv(n) {
                log::trace!("rsa: blinding factor found after {} attempts", i + 1);
                return Ok((r, ir));
            }
        }

        log::error!(
            "rsa: cannot find an invertible blinding factor in {} attempts",
            MAX_BLINDING_ATTEMPTS
        );
        Err(CipherError::BlindingExhausted(MAX_BLINDING_ATTEMPTS))
    }

    // m1 = c^{dp}, m2 = c^{dq}
    // mi = c^{di}, i >= 3...
    // h = (m1 - m2) * qinv % p
    // m = m2 + q * h
    // mi = c^{di} % ri
    // m = m + Ri * ((mi - m) * ti % ri)
    fn rsadp_uncheck(&self, c: &BigUint) -> BigUint {
        // 反序列化得到的预计算值可能与素因子不匹配
        let Some(pre) = self
            .pre
            .as_ref()
            .filter(|pre| self.primes.len() >= 2 && pre.crt_val.len() + 2 == self.primes.len())
        else {
            log::trace!("rsa: decrypt by the full modulus exponentiation");
            return c.modpow(&self.d, &self.pk.n);
        };

        log::trace!("rsa: decrypt by CRT with {} primes", self.primes.len());
        let (p, q) = (&self.primes[0], &self.primes[1]);
        let (m1, m2) = (c.modpow(&pre.d_p, p), c.modpow(&pre.d_q, q));

        // (m1 - m2) % p, 先加上p避免出现负数
        let mut h = m1 + p - (&m2 % p);
        h *= &pre.q_inv;
        h %= p;
        let mut m = m2 + h * q;

        for (crt, ri) in pre.crt_val.iter().zip(self.primes[2..].iter()) {
            let mi = c.modpow(&crt.di, ri);
            let mut tmp = mi + ri - (&m % ri);
            tmp *= &crt.ti;
            tmp %= ri;
            m += tmp * &crt.rm;
        }

        m
    }

    /// 检查素因子的乘积等于模数, 以及`d * e = 1 mod (prime - 1)`
    pub fn is_valid(&self) -> Result<(), CipherError> {
        self.pk.is_valid()?;

        if self.primes.is_empty() {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: factor doesn't exist".to_string(),
            ));
        }

        let mut n = BigUint::one();
        for prime in self.primes.iter() {
            if prime.is_zero() || prime.is_one() {
                return Err(CipherError::InvalidPrivateKey(
                    "rsa: invalid prime value".to_string(),
                ));
            }

            n *= prime;
        }

        if n != self.pk.n {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: invalid modulus".to_string(),
            ));
        }

        // d*e
        let de = &self.d * &self.pk.e;
        for prime in self.primes.iter() {
            let pm1 = prime - 1u8;
            if !(&de % pm1).is_one() {
                return Err(CipherError::InvalidPrivateKey(
                    "rsa: invalid exponent".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl PrecomputedValues {
    // r: r2 ... , 不包括r0(p), r1(q)
    fn new(p: &BigUint, q: &BigUint, d: &BigUint, r: &[BigUint]) -> Result<Self, CipherError> {
        let one = BigUint::one();
        if p <= &one || q <= &one || r.iter().any(|x| x <= &one) {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: invalid prime value".to_string(),
            ));
        }

        let (d_p, d_q) = (d % (p - &one), d % (q - &one));
        let q_inv = BigUintExt(q).modinv(p).ok_or(CipherError::InvalidPrivateKey(
            "rsa: the primes p and q are not coprime".to_string(),
        ))?;

        // R
        let (mut rm, mut crt) = (p * q, Vec::with_capacity(r.len()));

        for r in r.iter() {
            // d * di = 1 % (ri - 1)
            let di = d % (r - &one);
            // R * ti = 1 % ri
            let ti = BigUintExt(&rm).modinv(r).ok_or(CipherError::InvalidPrivateKey(
                "rsa: the primes are not pairwise coprime".to_string(),
            ))?;

            crt.push(CRTValue {
                di,
                rm: rm.clone(),
                ti,
            });

            rm *= r;
        }

        Ok(Self {
            d_p,
            d_q,
            q_inv,
            crt_val: crt,
        })
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{n={:#x}, e={:#x}}}", self.n, self.e)
    }
}

impl Display for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{pk: {}, primes: {}, crt: {}}}",
            self.pk,
            self.primes.len(),
            self.pre.is_some()
        )
    }
}
