//! The virtual-code tree: generated documents and their mappings

use crate::ids::{CodeId, LanguageId, ScriptId};
use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::sync::Arc;
use weft_source_map::Mapping;

/// One generated document, possibly with nested generated documents.
///
/// A virtual code carries its own text snapshot plus the mappings that
/// relate it to its declared source. Nested regions (a script region inside
/// a template region) form a tree per source document; the whole tree is
/// owned by the registry record it was generated for and is replaced
/// wholesale or incrementally on regeneration. External references use
/// `(ScriptId, CodeId)` handles resolved through the registry, never
/// pointers held across a regeneration.
#[derive(Debug, Clone)]
pub struct VirtualCode {
    /// Unique within this tree.
    pub id: CodeId,
    pub language_id: LanguageId,
    pub snapshot: Snapshot,
    /// Mappings to the owning script's source text.
    pub mappings: Arc<[Mapping]>,
    /// Same-document mirror links (spans that a rename edits together).
    pub linked_mappings: Arc<[Mapping]>,
    /// Extra mappings relative to *other* source scripts, for cross-file
    /// constructs.
    pub associated_script_mappings: Vec<(ScriptId, Arc<[Mapping]>)>,
    pub embedded_codes: Vec<VirtualCode>,
}

impl VirtualCode {
    pub fn new(
        id: impl Into<CodeId>,
        language_id: impl Into<LanguageId>,
        snapshot: Snapshot,
        mappings: Vec<Mapping>,
    ) -> Self {
        VirtualCode {
            id: id.into(),
            language_id: language_id.into(),
            snapshot,
            mappings: mappings.into(),
            linked_mappings: Arc::from([]),
            associated_script_mappings: Vec::new(),
            embedded_codes: Vec::new(),
        }
    }

    pub fn with_embedded(mut self, embedded_codes: Vec<VirtualCode>) -> Self {
        self.embedded_codes = embedded_codes;
        self
    }

    pub fn with_linked_mappings(mut self, linked_mappings: Vec<Mapping>) -> Self {
        self.linked_mappings = linked_mappings.into();
        self
    }

    pub fn with_associated_script_mappings(
        mut self,
        associated: Vec<(ScriptId, Vec<Mapping>)>,
    ) -> Self {
        self.associated_script_mappings = associated
            .into_iter()
            .map(|(id, mappings)| (id, mappings.into()))
            .collect();
        self
    }

    /// Mappings relative to a specific other script, if any were declared.
    pub fn associated_mappings(&self, script: &ScriptId) -> Option<&Arc<[Mapping]>> {
        self.associated_script_mappings
            .iter()
            .find(|(id, _)| id == script)
            .map(|(_, mappings)| mappings)
    }
}

/// Pre-order walk of a virtual-code tree, root first.
///
/// Visits every node exactly once, in a deterministic order; the iterator
/// is finite and a fresh one can be obtained per call.
pub fn for_each_embedded(root: &VirtualCode) -> impl Iterator<Item = &VirtualCode> {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let code = stack.pop()?;
        // Reverse push keeps children in declaration order.
        for child in code.embedded_codes.iter().rev() {
            stack.push(child);
        }
        Some(code)
    })
}

/// Index every node of a tree by id, as child-index paths from the root.
///
/// Paths survive clone-based tree edits and cost a walk to resolve, which
/// keeps the index valid without self-references into the tree. A duplicate
/// id keeps its last pre-order occurrence.
pub(crate) fn embedded_paths(root: &VirtualCode) -> HashMap<CodeId, Vec<usize>> {
    let mut paths = HashMap::new();
    let mut path = Vec::new();
    index_into(root, &mut path, &mut paths);
    paths
}

fn index_into(
    code: &VirtualCode,
    path: &mut Vec<usize>,
    paths: &mut HashMap<CodeId, Vec<usize>>,
) {
    paths.insert(code.id.clone(), path.clone());
    for (i, child) in code.embedded_codes.iter().enumerate() {
        path.push(i);
        index_into(child, path, paths);
        path.pop();
    }
}

/// Validate every mapping carried by a tree.
///
/// Called when a generated tree is accepted into the registry so that
/// corrupt mapping data fails fast near its source. A violation is a defect
/// of the generator that produced the tree and panics rather than being
/// recovered.
pub(crate) fn validate_tree(root: &VirtualCode) {
    for code in for_each_embedded(root) {
        for mapping in code.mappings.iter().chain(code.linked_mappings.iter()) {
            if let Err(error) = mapping.validate() {
                panic!("invalid mapping in virtual code `{}`: {error}", code.id);
            }
        }
        for (script, mappings) in &code.associated_script_mappings {
            for mapping in mappings.iter() {
                if let Err(error) = mapping.validate() {
                    panic!(
                        "invalid mapping in virtual code `{}` for associated script `{script}`: {error}",
                        code.id
                    );
                }
            }
        }
    }
}
