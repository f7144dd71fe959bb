//! The generator contract: plugins that produce virtual code

use crate::ids::{CodeId, LanguageId, ScriptId};
use crate::registry::CodegenContext;
use crate::snapshot::Snapshot;
use crate::virtual_code::VirtualCode;

/// Another script's current state, as seen during generation.
///
/// Returned by [`CodegenContext::get_associated_script`]; the act of asking
/// records the dependency edge, so a later change to the associated script
/// marks the asking script stale.
#[derive(Debug, Clone)]
pub struct AssociatedScript {
    pub id: ScriptId,
    pub language_id: LanguageId,
    pub snapshot: Snapshot,
}

/// Outcome of an incremental update request.
pub enum VirtualCodeUpdate {
    /// The tree was updated in place (or rebuilt by the plugin).
    Updated(VirtualCode),
    /// The plugin declines incremental updates; the registry falls back to
    /// a full [`LanguagePlugin::create_virtual_code`].
    Full,
    /// The document no longer produces virtual code; treat as deleted.
    Removed,
}

/// Which embedded codes represent a script for whole-file semantic
/// analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticProjection {
    /// The one embedded code a semantic backend should treat as the
    /// primary generated document for the whole file.
    pub primary: CodeId,
    /// Secondary generated documents contributing extra analyzable files.
    pub extras: Vec<CodeId>,
}

/// A generator of virtual code for some class of source documents.
///
/// Plugins are probed in registration order and the first match wins — for
/// language-id resolution and for tree creation alike. When two plugins
/// could both claim a language id, their relative order is a configuration
/// contract of the caller, not a priority scheme of the registry.
///
/// A plugin that panics during generation is a defect; the registry does
/// not catch it.
pub trait LanguagePlugin: Send + Sync {
    /// Claim a language id for a document identity, or pass.
    fn resolve_language_id(&self, id: &ScriptId) -> Option<LanguageId>;

    /// Whether documents of this language exist only to be read by other
    /// scripts' generators (no virtual tree of their own).
    fn is_associated_file_only(&self, _id: &ScriptId, _language_id: &LanguageId) -> bool {
        false
    }

    /// Produce the virtual-code tree for a document, or pass.
    ///
    /// `ctx` lets the generator pull other scripts' snapshots while it
    /// runs; every pull registers a dependency edge.
    fn create_virtual_code(
        &self,
        id: &ScriptId,
        language_id: &LanguageId,
        snapshot: &Snapshot,
        ctx: &mut CodegenContext<'_>,
    ) -> Option<VirtualCode>;

    /// Incrementally update a previously generated tree.
    ///
    /// The default declines, which makes the registry fall back to
    /// [`create_virtual_code`](Self::create_virtual_code).
    fn update_virtual_code(
        &self,
        _id: &ScriptId,
        _previous: VirtualCode,
        _snapshot: &Snapshot,
        _ctx: &mut CodegenContext<'_>,
    ) -> VirtualCodeUpdate {
        VirtualCodeUpdate::Full
    }

    /// Teardown hook, called before a generated tree is dropped on
    /// `delete`.
    fn dispose_virtual_code(&self, _id: &ScriptId, _root: &mut VirtualCode) {}

    /// Pick the embedded codes that represent this tree for semantic
    /// analysis.
    fn semantic_projection(&self, _root: &VirtualCode) -> Option<SemanticProjection> {
        None
    }
}
