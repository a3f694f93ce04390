//! Masked background removal CLI tool
//!
//! Command-line front end for the masked-bgremove library: rasterize stroke
//! scripts into selection masks, submit them to the removal service and
//! refine the result with include/remove edits.

#[cfg(feature = "cli")]
use masked_bgremove::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
