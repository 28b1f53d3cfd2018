//! MGF1: 基于哈希函数的掩码生成函数(RFC 8017 B.2.1)

use super::guard::HashGuard;
use crypto_hash::DigestX;

/// `out ^= MGF1(seed, out.len())`
///
/// 计数器是4字节大端整数, 超过`2^32`个块后回绕, 实际使用中`out`远达不到这个长度.
/// 返回时`hasher`已被重置.
pub fn mgf1_xor<H: DigestX + ?Sized>(out: &mut [u8], hasher: &mut H, seed: &[u8]) {
    let mut hf = HashGuard::new(hasher);
    let (mut done, mut counter) = (0, [0u8; 4]);

    while done < out.len() {
        hf.write_x(seed);
        hf.write_x(counter.as_slice());
        let d = hf.finish_x();

        out.iter_mut().skip(done).zip(d).for_each(|(a, b)| {
            *a ^= b;
            done += 1;
        });

        inc_counter(&mut counter);
    }
}

fn inc_counter(counter: &mut [u8; 4]) {
    for c in counter.iter_mut().rev() {
        *c = c.wrapping_add(1);
        if *c != 0 {
            return;
        }
    }
}
