use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod config;
pub use config::PssConfig;

mod keyfile;
pub use keyfile::KeyFile;

mod sign;
pub use sign::SignArgs;

mod verify;
pub use verify::VerifyArgs;

#[derive(Parser, Debug)]
#[command(name = "rsapss", version, about = "RSASSA-PSS sign and verify")]
pub struct RsaPssArgs {
    /// the configuration file, `RSAPSS__*` environment variables take precedence over it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: RsaPssSubArgs,
}

#[derive(Subcommand, Debug)]
enum RsaPssSubArgs {
    /// sign the file with the RSA private key
    Sign(SignArgs),
    /// verify the signature of the file with the RSA public key
    Verify(VerifyArgs),
}

impl RsaPssArgs {
    /// 返回是否执行成功
    pub fn exe(self) -> bool {
        let config = PssConfig::config_with_file(self.config.as_deref());

        match self.cmd {
            RsaPssSubArgs::Sign(a) => a.exe(config),
            RsaPssSubArgs::Verify(a) => a.exe(config),
        }
    }
}
