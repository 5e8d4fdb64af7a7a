//! `dockergen version` — print version and build commit.

use anyhow::Result;
use dockergen_core::BuildInfo;

pub fn run() -> Result<()> {
    println!("dockergen {}", BuildInfo::current());
    Ok(())
}
