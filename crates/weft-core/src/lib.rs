//! Script registry and virtual-code trees for projected documents
//!
//! A source document (a component file mixing markup, script and style) is
//! projected into a tree of [`VirtualCode`] documents, one per embedded
//! language region. The [`ScriptRegistry`] owns one [`SourceScript`] record
//! per document identity, regenerates its virtual-code tree when the
//! document changes, and tracks cross-document read dependencies so that a
//! change to one document marks its dependents stale.
//!
//! What virtual code gets generated is a pluggable concern: generators
//! implement [`LanguagePlugin`] and are probed in registration order. This
//! crate only owns the bookkeeping — snapshots, identities, the dependency
//! graph, and the mapping data each virtual code carries back to its source
//! (see `weft-source-map`).

pub mod ids;
pub mod plugin;
pub mod registry;
pub mod snapshot;
pub mod virtual_code;

pub use ids::{CodeId, LanguageId, ScriptId};
pub use plugin::{AssociatedScript, LanguagePlugin, SemanticProjection, VirtualCodeUpdate};
pub use registry::{
    CodegenContext, Generated, RegistryOptions, ScriptRegistry, ScriptSync, SourceScript,
    SyncedScript,
};
pub use snapshot::{Snapshot, SnapshotId};
pub use virtual_code::{VirtualCode, for_each_embedded};
