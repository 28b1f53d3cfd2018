use clap::Parser;
use log::LevelFilter;
use rsapss::cmd::RsaPssArgs;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if !RsaPssArgs::parse().exe() {
        std::process::exit(1);
    }
}
