//! Basic memfs usage example
//!
//! Run with: RUST_LOG=memfs=debug cargo run --example basic

use memfs::{
    Encoding, FileSystem, FsHelper, FsLimits, InMemoryFs, MkdirOptions, ReadDirOptions, RmOptions,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Build a small fixture tree
    let fs = Arc::new(InMemoryFs::with_limits(FsLimits::new().max_node_count(100)));
    fs.mkdir("pim/poum", MkdirOptions::recursive()).await?;
    fs.mkdir("pim/poush", MkdirOptions::recursive()).await?;
    fs.write_file("pim/poush/test1", b"first").await?;
    fs.write_file("readme.txt", "test-ééé".as_bytes()).await?;

    println!("Tree:");
    for entry in fs.read_dir(".", ReadDirOptions::recursive()).await? {
        let marker = if entry.is_dir() { "/" } else { "" };
        println!("  {}{}", entry.path(), marker);
    }

    // Move a file across directories
    fs.rename("pim/poush/test1", "pim/poum/moved").await?;
    let text = fs.read_file("pim/poum/moved", Encoding::Utf8).await?;
    println!("\nMoved content: {}", text.into_text()?);

    // A populated directory refuses a plain rm
    match fs.rm("pim", RmOptions::new()).await {
        Ok(()) => println!("Unexpected success"),
        Err(e) => println!("Blocked as expected: {}", e),
    }

    // The helper wraps the same store
    let helper = FsHelper::new(fs.clone());
    let stat = helper.stat("readme.txt").await?;
    println!("\nreadme.txt: {}", serde_json::to_string(&stat)?);

    helper.rm("pim", RmOptions::new().recursive(true)).await?;
    println!("\nFile map: {:?}", fs.file_map());
    println!("Usage: {:?}", fs.usage());

    Ok(())
}
