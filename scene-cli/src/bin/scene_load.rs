//! Loads a GLB file through the whitelist + cache pipeline and prints a
//! one-line summary of its asset graph (spec §6 "Whitelist CLI surface
//! (tests)"). Exits 0 on success; prints the error chain to stderr and
//! exits nonzero on any failure (malformed GLB, parse error, path outside
//! the whitelist), matching spec §7's "no partial result is ever returned".

use std::path::PathBuf;

use clap::Parser;

/// Parses a glTF/GLB file and reports its top-level counts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the .glb file to load.
    glb: PathBuf,
}

fn main() -> anyhow::Result<()> {
    scene_cli::init_tracing();
    let args = Args::parse();

    let document = scene_cli::load_document(&args.glb)?;

    println!("asset.version = {}", document.asset().version);
    println!("buffers       = {}", document.buffers().len());
    println!("accessors     = {}", document.accessors().len());
    println!("meshes        = {}", document.meshes().len());
    println!("nodes         = {}", document.nodes().len());
    println!("skins         = {}", document.skins().len());
    println!("animations    = {}", document.animations().len());
    println!("scenes        = {}", document.scenes().len());

    for scene in document.scenes() {
        println!(
            "scene {:?}: {} root node(s)",
            scene.name.as_deref().unwrap_or("<unnamed>"),
            scene.nodes.len()
        );
    }

    Ok(())
}
