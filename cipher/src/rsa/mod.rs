//! RSA
//!
//! - 随机选择两个质数$p$和$q$($p\neq q$), 则模数$n=p*q$. 模数的字节长度$k$满足: $2^{((k-1)*8}\le n \lt 2^{k*8}$;
//! - 在$[1,n]$之中, 随机选择一个整数$e$作为公钥的指数部分. 其中, $e$满足和$p-1$及$q-1$都是互质关系(公共因子是1);
//! - 那么私钥的指数部分$d$满足: $d*e-1$能被$q-1$和$p-1$整除;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $y = x^d \mod n$;
//!
//! 原理: 欧拉定理$a^{\phi(n)} \equiv 1 \mod n$
//! - $x ^ {k(p-1)(q-1)+1} \equiv x \mod n$
//!
//! 签名使用RSASSA-PSS(RFC 8017 8.1), 私钥运算可选盲化, 有素因子时使用CRT加速.
//!

mod key;
pub use key::{PrivateKey, PublicKey, MAX_BLINDING_ATTEMPTS};

mod guard;

mod mgf;
pub use mgf::mgf1_xor;

mod pss;
pub use pss::{
    emsa_pss_encode, emsa_pss_verify, emsa_pss_verify_auto, sign_pss, verify_pss,
    verify_pss_auto,
};

mod signer;
pub use signer::{PSSSign, PSSVerify, SaltLength};
