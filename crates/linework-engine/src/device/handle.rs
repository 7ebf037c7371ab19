//! Opaque resource handles handed out by a `LineDevice`.

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

handle!(
    /// Linked vertex + fragment program.
    ProgramId
);

handle!(
    /// Vertex input binding object the program is created against.
    VertexArrayId
);

handle!(
    /// Static vertex buffer.
    BufferId
);
