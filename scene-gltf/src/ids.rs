/// Arena indices into a [`crate::Document`]'s per-kind `Vec`s (spec §9
/// "Cyclic-owner graph -> arena-plus-index"). These replace the raw
/// cross-references (`node.parent`, `channel.target.node`, `skin.joints`)
/// the original engine represents as interior pointers: ids are `Copy` and
/// resolved through `Document` accessor methods, never stored as borrows
/// into the graph's own arena.
macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

id_type!(BufferId);
id_type!(BufferViewId);
id_type!(AccessorId);
id_type!(ImageId);
id_type!(TextureSamplerId);
id_type!(TextureId);
id_type!(MaterialId);
id_type!(MeshId);
id_type!(NodeId);
id_type!(SkinId);
id_type!(SceneId);
id_type!(AnimationId);

/// A sampler index local to one [`crate::Animation`] (not a document-wide
/// arena — samplers are only ever referenced by channels of their own
/// animation, per spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationSamplerId(pub(crate) u32);

impl AnimationSamplerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
