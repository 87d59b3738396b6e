#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    // Falls back to idempotent output when building outside of a git checkout.
    EmitBuilder::builder().all_git().emit()?;
    println!("cargo:rerun-if-changed=assets/products.json");

    return Ok(());
}
