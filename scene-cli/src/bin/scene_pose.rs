//! Evaluates one armature's pose at a given time against a single
//! animation and prints the resulting bone-matrix palette, one row-major
//! 4x4 matrix per line (spec §4.H/§4.I/§4.J, §6 skin-palette layout). This
//! is the "Whitelist CLI surface (tests)" front-end for the animation
//! evaluator: it takes positional asset paths/indices and exits nonzero on
//! any structural failure (bad skin, unsupported sampler shape) rather
//! than returning a partial palette.

use std::path::PathBuf;

use clap::Parser;
use scene_skel::{Armature, Pose, SkelAnimation};

/// Samples an armature's pose from a glTF skin + animation pair.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the .glb file to load.
    glb: PathBuf,

    /// Index into the document's `skins[]` array.
    #[arg(short, long, default_value_t = 0)]
    skin: usize,

    /// Index into the document's `animations[]` array.
    #[arg(short, long, default_value_t = 0)]
    animation: usize,

    /// Time to sample the animation at, in seconds.
    #[arg(short, long, default_value_t = 0.0)]
    time: f32,

    /// Blend weight to accumulate the animation with.
    #[arg(short, long, default_value_t = 1.0)]
    weight: f32,
}

fn main() -> anyhow::Result<()> {
    scene_cli::init_tracing();
    let args = Args::parse();

    let document = scene_cli::load_document(&args.glb)?;

    let skin = document
        .skins()
        .get(args.skin)
        .ok_or_else(|| anyhow::anyhow!("no skin at index {}", args.skin))?;
    let animation = document
        .animations()
        .get(args.animation)
        .ok_or_else(|| anyhow::anyhow!("no animation at index {}", args.animation))?;

    let armature = Armature::from_skin(&document, skin)?;
    let skel_animation = SkelAnimation::from_gltf(&document, animation)?;

    let mut pose = Pose::new(&armature);
    pose.accumulate(&armature, &skel_animation, args.time, args.weight, None)?;
    let matrices = pose.finalize();

    println!("bone_count = {}", matrices.len());
    for (index, bone) in armature.bones.iter().enumerate() {
        let m = matrices[index].to_cols_array();
        println!(
            "bone[{index}] {:?}: [{:.4} {:.4} {:.4} {:.4} | {:.4} {:.4} {:.4} {:.4} | {:.4} {:.4} {:.4} {:.4} | {:.4} {:.4} {:.4} {:.4}]",
            bone.name.as_deref().unwrap_or("<unnamed>"),
            m[0], m[4], m[8], m[12],
            m[1], m[5], m[9], m[13],
            m[2], m[6], m[10], m[14],
            m[3], m[7], m[11], m[15],
        );
    }

    Ok(())
}
