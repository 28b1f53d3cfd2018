use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::One;
use rand::{Rand, RandError};
use std::borrow::Borrow;
use std::ops::Deref;

pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// <<算法导论>>
    /// 定理31.23: 若有d=gcd(a, n), 假设对于某些整数x'和y', 有d=ax'+ny'. 如果d|b, 则方程
    /// ax=b(mod n)有一个解的值位x0, 则x0=x'(b/d) mod n;
    /// self * inv = 1 \mod modules
    ///
    /// `None` if `gcd(self, modulus) != 1`
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        let (a, n) = (
            BigInt::from(self.deref() % modulus),
            BigInt::from(modulus.clone()),
        );
        let g = a.extended_gcd(&n);
        if g.gcd.is_one() {
            g.x.mod_floor(&n).to_biguint()
        } else {
            None
        }
    }

    /// 生成[0..self)之间均匀分布的随机数, 随机源出错时直接返回错误
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> Result<BigUint, RandError> {
        let bits = self.bits() as usize;
        let len = (bits + 7) >> 3;
        let mut n = vec![0u8; len];
        // 高位字节中超出`bits`的位恒置零, 以减少拒绝次数
        let top_mask = 0xffu8 >> ((len << 3) - bits);

        loop {
            rng.rand(n.as_mut_slice())?;
            if let Some(top) = n.last_mut() {
                *top &= top_mask;
            }
            let r = BigUint::from_bytes_le(n.as_slice());
            if self.deref() > &r {
                return Ok(r);
            }
        }
    }

    /// big-endian bytes left padded with zeros to `len`, `None` if `self` needs more than `len` bytes
    pub fn to_be_bytes_padded(&self, len: usize) -> Option<Vec<u8>> {
        let b = self.to_bytes_be();
        let b = if b == [0u8] { Vec::new() } else { b };
        if b.len() > len {
            return None;
        }

        let mut out = vec![0u8; len - b.len()];
        out.extend_from_slice(b.as_slice());
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::BigUintExt;
    use num_bigint::BigUint;
    use rand::{DefaultRand, Rand, RandError};

    #[derive(Default)]
    struct Broken;

    impl Rand for Broken {
        fn rand(&mut self, _random: &mut [u8]) -> Result<(), RandError> {
            Err(RandError::Source("broken".to_string()))
        }
    }

    #[test]
    fn modinv() {
        let cases = [(3u32, 11u32, Some(4u32)), (10, 17, Some(12)), (6, 9, None), (1, 7, Some(1))];
        for (a, n, inv) in cases {
            assert_eq!(
                BigUintExt(BigUint::from(a)).modinv(&BigUint::from(n)),
                inv.map(BigUint::from),
                "modinv({a}, {n})"
            );
        }
    }

    #[test]
    fn gen_random_in_range() {
        let mut rng = DefaultRand::default();
        for n in [1u32, 2, 255, 256, 257, 65537, u32::MAX] {
            let n = BigUint::from(n);
            for _ in 0..64 {
                let r = BigUintExt(&n).gen_random(&mut rng).unwrap();
                assert!(r < n, "{r} out of range [0, {n})");
            }
        }
    }

    #[test]
    fn gen_random_propagates_source_error() {
        let n = BigUint::from(65537u32);
        assert_eq!(
            BigUintExt(&n).gen_random(&mut Broken),
            Err(RandError::Source("broken".to_string()))
        );
    }

    #[test]
    fn left_pad() {
        let x = BigUint::from(0x0102u32);
        assert_eq!(BigUintExt(&x).to_be_bytes_padded(4), Some(vec![0, 0, 1, 2]));
        assert_eq!(BigUintExt(&x).to_be_bytes_padded(2), Some(vec![1, 2]));
        assert_eq!(BigUintExt(&x).to_be_bytes_padded(1), None);
        let zero = BigUint::from(0u8);
        assert_eq!(BigUintExt(&zero).to_be_bytes_padded(3), Some(vec![0, 0, 0]));
    }
}
