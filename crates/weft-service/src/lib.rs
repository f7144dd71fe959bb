//! Workspace-scoped orchestration of registry, maps and document views
//!
//! One [`LanguageService`] serves one project/workspace scope. It owns the
//! script registry and memoizes the derived objects feature operations ask
//! for on every keystroke: [`TextDocument`] views per snapshot identity,
//! [`SourceMap`] translators per (virtual snapshot, source snapshot) pair,
//! and [`LinkedPositionMap`]s per virtual snapshot. Re-parsing mapping
//! segments on every lookup is the primary avoidable cost in this design;
//! the memos are what keep lookups at interactive latency.
//!
//! Cache entries are keyed by process-unique snapshot identities, so a
//! stale entry can never be wrongly served; eviction on `set`/`delete` is
//! explicit and exists for memory hygiene, not correctness.

pub mod maps;

pub use maps::{DocumentMap, LinkedDocumentMap};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;
use weft_core::{
    CodeId, LanguageId, LanguagePlugin, RegistryOptions, ScriptId, ScriptRegistry,
    SemanticProjection, Snapshot, SnapshotId, SourceScript, VirtualCode, for_each_embedded,
};
use weft_document::{DocumentViewCache, TextDocument};
use weft_source_map::{LinkedPositionMap, Mapping, SourceMap};

/// Orchestrates the registry and its derived caches for one workspace.
pub struct LanguageService {
    registry: ScriptRegistry,
    documents: DocumentViewCache,
    /// Two-level memo: virtual snapshot id, then source snapshot id.
    maps: HashMap<SnapshotId, HashMap<SnapshotId, Arc<SourceMap>>>,
    linked: HashMap<SnapshotId, Arc<LinkedPositionMap>>,
}

impl LanguageService {
    pub fn new(plugins: Vec<Arc<dyn LanguagePlugin>>, options: RegistryOptions) -> Self {
        Self::from_registry(ScriptRegistry::new(plugins, options))
    }

    /// Wrap an already configured registry (e.g. one with a pull-model
    /// sync source attached).
    pub fn from_registry(registry: ScriptRegistry) -> Self {
        LanguageService {
            registry,
            documents: DocumentViewCache::new(),
            maps: HashMap::new(),
            linked: HashMap::new(),
        }
    }

    /// Read-only view of the underlying registry.
    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    /// Create or update a script, invalidating caches for replaced
    /// snapshots.
    pub fn set(
        &mut self,
        id: ScriptId,
        snapshot: Snapshot,
        language_id: Option<LanguageId>,
    ) -> Option<&SourceScript> {
        let before = self.snapshot_ids_of(&id);
        self.registry.set(id.clone(), snapshot, language_id);
        self.evict_replaced(before, &id);
        self.registry.peek(&id)
    }

    /// Get a script, bringing it up to date first (pull sync and stale-
    /// association healing both run here).
    pub fn get(&mut self, id: &ScriptId) -> Option<&SourceScript> {
        let before = self.snapshot_ids_of(id);
        self.registry.get(id);
        self.evict_replaced(before, id);
        self.registry.peek(id)
    }

    /// Delete a script and every cache entry derived from it.
    pub fn delete(&mut self, id: &ScriptId) {
        let before = self.snapshot_ids_of(id);
        self.registry.delete(id);
        self.evict_replaced(before, id);
    }

    /// Resolve a virtual code by handle, without healing.
    pub fn virtual_code(&self, script: &ScriptId, code: &CodeId) -> Option<&VirtualCode> {
        self.registry
            .peek(script)?
            .generated()?
            .embedded_code(code)
    }

    /// The document view for a snapshot.
    pub fn document(&mut self, snapshot: &Snapshot) -> Arc<TextDocument> {
        self.documents.get(snapshot)
    }

    /// The map between a virtual code and its owning script.
    pub fn primary_map(&mut self, script: &ScriptId, code: &CodeId) -> Option<DocumentMap> {
        self.map_between(script, code, script)
    }

    /// The memoized map between a virtual code and a source script.
    ///
    /// `source` is usually the owning script; for cross-file constructs it
    /// may be any script the code declared associated mappings for (codes
    /// without a dedicated entry fall back to their primary mappings).
    pub fn map_between(
        &mut self,
        script: &ScriptId,
        code: &CodeId,
        source: &ScriptId,
    ) -> Option<DocumentMap> {
        self.get(script)?;
        if source != script {
            self.get(source)?;
        }
        let (virtual_snapshot, mappings) = {
            let record = self.registry.peek(script)?;
            let code = record.generated()?.embedded_code(code)?;
            let mappings = if source == script {
                code.mappings.clone()
            } else {
                code.associated_mappings(source)
                    .cloned()
                    .unwrap_or_else(|| code.mappings.clone())
            };
            (code.snapshot.clone(), mappings)
        };
        let source_snapshot = self.registry.peek(source)?.snapshot().clone();
        let map = self.memo_map(virtual_snapshot.id(), source_snapshot.id(), mappings);
        Some(DocumentMap::new(
            self.documents.get(&source_snapshot),
            self.documents.get(&virtual_snapshot),
            map,
        ))
    }

    /// Every (source script, map) pair a virtual code translates into: the
    /// owning script first, then each script it declared associated
    /// mappings for.
    pub fn maps_for(&mut self, script: &ScriptId, code: &CodeId) -> Vec<(ScriptId, DocumentMap)> {
        let mut sources = vec![script.clone()];
        if let Some(record) = {
            self.get(script);
            self.registry.peek(script)
        } {
            if let Some(found) = record.generated().and_then(|g| g.embedded_code(code)) {
                sources.extend(
                    found
                        .associated_script_mappings
                        .iter()
                        .map(|(source, _)| source.clone()),
                );
            }
        }
        sources
            .into_iter()
            .filter_map(|source| {
                let map = self.map_between(script, code, &source)?;
                Some((source, map))
            })
            .collect()
    }

    /// The linked-position map of a virtual code, if it declares one.
    pub fn linked_map(&mut self, script: &ScriptId, code: &CodeId) -> Option<LinkedDocumentMap> {
        self.get(script)?;
        let (snapshot, linked_mappings) = {
            let record = self.registry.peek(script)?;
            let code = record.generated()?.embedded_code(code)?;
            if code.linked_mappings.is_empty() {
                return None;
            }
            (code.snapshot.clone(), code.linked_mappings.clone())
        };
        let map = self
            .linked
            .entry(snapshot.id())
            .or_insert_with(|| Arc::new(LinkedPositionMap::new(linked_mappings)))
            .clone();
        Some(LinkedDocumentMap::new(self.documents.get(&snapshot), map))
    }

    /// Which embedded codes represent a script for semantic analysis,
    /// according to the plugin that generated its tree.
    pub fn semantic_projection(&mut self, script: &ScriptId) -> Option<SemanticProjection> {
        self.get(script)?;
        let record = self.registry.peek(script)?;
        let generated = record.generated()?;
        generated.plugin().semantic_projection(generated.root())
    }

    /// Number of memoized translators (test/diagnostic surface).
    pub fn cached_maps(&self) -> usize {
        self.maps.values().map(HashMap::len).sum::<usize>() + self.linked.len()
    }

    /// Number of memoized document views (test/diagnostic surface).
    pub fn cached_documents(&self) -> usize {
        self.documents.len()
    }

    fn memo_map(
        &mut self,
        virtual_id: SnapshotId,
        source_id: SnapshotId,
        mappings: Arc<[Mapping]>,
    ) -> Arc<SourceMap> {
        self.maps
            .entry(virtual_id)
            .or_default()
            .entry(source_id)
            .or_insert_with(|| Arc::new(SourceMap::new(mappings)))
            .clone()
    }

    /// Snapshot identities currently reachable from a script record: its
    /// source snapshot plus every snapshot in its generated tree.
    fn snapshot_ids_of(&self, id: &ScriptId) -> HashSet<SnapshotId> {
        let mut ids = HashSet::new();
        if let Some(record) = self.registry.peek(id) {
            ids.insert(record.snapshot().id());
            if let Some(generated) = record.generated() {
                for code in for_each_embedded(generated.root()) {
                    ids.insert(code.snapshot.id());
                }
            }
        }
        ids
    }

    /// Evict cache entries for snapshots a mutation made unreachable.
    fn evict_replaced(&mut self, before: HashSet<SnapshotId>, id: &ScriptId) {
        let live = self.snapshot_ids_of(id);
        let dead: Vec<SnapshotId> = before.difference(&live).copied().collect();
        if dead.is_empty() {
            return;
        }
        trace!(script = %id, evicted = dead.len(), "evicting stale cache entries");
        for snapshot_id in &dead {
            self.documents.evict(*snapshot_id);
            self.maps.remove(snapshot_id);
            self.linked.remove(snapshot_id);
        }
        for inner in self.maps.values_mut() {
            for snapshot_id in &dead {
                inner.remove(snapshot_id);
            }
        }
        self.maps.retain(|_, inner| !inner.is_empty());
    }
}
