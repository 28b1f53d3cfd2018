//! 签名方案使用的哈希适配层.
//!
//! 哈希算法本身由`sha1`/`sha2`提供, 这里只定义签名方案需要的最小接口`DigestX`:
//! 可多次写入, 生成摘要后自动重置, 可以在MGF1和EMSA-PSS的多轮哈希中反复使用.

mod error;
pub use error::HashError;

mod kind;
pub use kind::HashKind;

use digest::{Digest, FixedOutputReset};

/// 可重置, 可复用的摘要累加器
pub trait DigestX {
    /// 哈希算法生成的摘要的位长度
    fn digest_bits_x(&self) -> usize;
    fn write_x(&mut self, data: &[u8]);
    /// 生成摘要并重置到初始化状态
    fn finish_x(&mut self) -> Vec<u8>;
    /// 重置哈希算法到初始化状态
    fn reset_x(&mut self);
}

impl<T> DigestX for T
where
    T: Digest + FixedOutputReset,
{
    fn digest_bits_x(&self) -> usize {
        <T as Digest>::output_size() << 3
    }

    fn write_x(&mut self, data: &[u8]) {
        Digest::update(self, data)
    }

    fn finish_x(&mut self) -> Vec<u8> {
        Digest::finalize_reset(self).to_vec()
    }

    fn reset_x(&mut self) {
        Digest::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::DigestX;
    use hex_literal::hex;
    use sha2::{Digest, Sha256};

    #[test]
    fn finish_resets_state() {
        let mut h = Sha256::new();
        h.write_x(b"abc");
        let d1 = h.finish_x();
        h.write_x(b"abc");
        let d2 = h.finish_x();

        assert_eq!(
            d1,
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        assert_eq!(d1, d2);
        assert_eq!(h.digest_bits_x(), 256);
    }

    #[test]
    fn reset_discards_pending_input() {
        let mut h = Sha256::new();
        h.write_x(b"garbage");
        h.reset_x();
        h.write_x(b"abc");
        assert_eq!(h.finish_x(), Sha256::digest(b"abc").to_vec());
    }
}
