use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(name = "scan-typing", about = "Scrolling-word typing trainer")]
pub struct Config {
  /// Address to listen on
  #[arg(long, env = "SCAN_TYPING_BIND", default_value = "0.0.0.0:8080")]
  pub bind: SocketAddr,

  /// Word table (`word,level` per line); the built-in list is used when absent
  #[arg(long, env = "SCAN_TYPING_WORDS")]
  pub words: Option<PathBuf>,

  /// Fixed seed for word sampling
  #[arg(long, env = "SCAN_TYPING_SEED")]
  pub seed: Option<u64>,
}

impl Config {
  pub fn load() -> Self {
    Self::parse()
  }
}
