//! Public library API for shape-aware inspection of foreign runtime memory.

/// Shape matching, chain dereferencing, decoders, registry, and the snapshot host.
pub mod inspect;
