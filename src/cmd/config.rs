use std::path::Path;
use std::sync::OnceLock;

use cipher::rsa::SaltLength;
use config::Config;
use crypto_hash::HashKind;
use serde::{Deserialize, Serialize};

/// 默认配置 < 配置文件 < `RSAPSS__*`环境变量
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PssConfig {
    // 消息摘要使用的哈希算法
    pub hash: HashKind,

    pub salt_len: SaltLength,

    // 签名时私钥运算是否使用盲化
    pub blinding: bool,
}

impl Default for PssConfig {
    fn default() -> Self {
        Self {
            hash: HashKind::Sha256,
            salt_len: SaltLength::Auto,
            blinding: true,
        }
    }
}

impl PssConfig {
    /// 只在第一次调用时加载, 之后的`f`会被忽略
    pub fn config_with_file(f: Option<&Path>) -> &'static Self {
        static CONFIG: OnceLock<PssConfig> = OnceLock::new();

        CONFIG.get_or_init(|| match Self::load(f) {
            Ok(config) => config,
            Err(e) => {
                log::error!("load configuration failed, use the default, {e:#}");
                Self::default()
            }
        })
    }

    pub fn load(f: Option<&Path>) -> anyhow::Result<Self> {
        let default_config = Config::try_from(&PssConfig::default())?;

        let mut config = Config::builder().add_source(default_config);

        if let Some(f) = f {
            anyhow::ensure!(f.is_file(), "the configuration file `{}` not exist", f.display());
            config = config.add_source(config::File::from(f).required(true));
        }

        config = config.add_source(
            config::Environment::with_prefix("RSAPSS")
                .try_parsing(true)
                .separator("__"),
        );

        let config: PssConfig = config.build()?.try_deserialize()?;

        log::trace!("{:?}", config);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::PssConfig;
    use cipher::rsa::SaltLength;
    use crypto_hash::HashKind;
    use std::path::PathBuf;

    fn tmp_file(name: &str, content: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("rsapss-{}-{name}", std::process::id()));
        std::fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn default_config() {
        let config = PssConfig::load(None).unwrap();
        assert_eq!(config, PssConfig::default());
    }

    #[test]
    fn file_overrides_default() {
        let p = tmp_file(
            "config.json",
            r#"{"hash": "sha512", "salt_len": "32", "blinding": false}"#,
        );
        let config = PssConfig::load(Some(p.as_path())).unwrap();
        std::fs::remove_file(&p).unwrap();

        assert_eq!(
            config,
            PssConfig {
                hash: HashKind::Sha512,
                salt_len: SaltLength::Fixed(32),
                blinding: false,
            }
        );
    }

    #[test]
    fn partial_file_keeps_default() {
        let p = tmp_file("partial.json", r#"{"salt_len": "hash"}"#);
        let config = PssConfig::load(Some(p.as_path())).unwrap();
        std::fs::remove_file(&p).unwrap();

        assert_eq!(config.salt_len, SaltLength::EqualsHash);
        assert_eq!(config.hash, HashKind::Sha256);
        assert!(config.blinding);
    }

    #[test]
    fn missing_file() {
        let p = std::env::temp_dir().join("rsapss-config-not-exist.json");
        assert!(PssConfig::load(Some(p.as_path())).is_err());
    }
}
