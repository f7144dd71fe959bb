//! The script registry: one record per source-document identity

use crate::ids::{CodeId, LanguageId, ScriptId};
use crate::plugin::{AssociatedScript, LanguagePlugin, VirtualCodeUpdate};
use crate::snapshot::Snapshot;
use crate::virtual_code::{VirtualCode, embedded_paths, validate_tree};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryOptions {
    /// Whether script identities are compared case-sensitively. File-backed
    /// identities on case-insensitive filesystems want `false`.
    pub case_sensitive_ids: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            case_sensitive_ids: true,
        }
    }
}

/// A freshly fetched document from a pull-model sync source.
pub struct SyncedScript {
    pub snapshot: Snapshot,
    /// Optional explicit language id; resolved via plugins when absent.
    pub language_id: Option<LanguageId>,
}

/// Pull-model document source.
///
/// When configured, [`ScriptRegistry::get`] first asks whether the
/// identity's version changed and routes a fresh snapshot through `set`
/// before answering. This lets a host that owns document state (an external
/// compiler service, a build daemon) drive the registry lazily instead of
/// pushing every edit.
pub trait ScriptSync: Send + Sync {
    /// A version token for the identity. Returning `None` disables version
    /// caching and fetches on every access.
    fn script_version(&self, _id: &ScriptId) -> Option<String> {
        None
    }

    /// The identity's current document, or `None` if it no longer exists
    /// (which deletes the record).
    fn script_snapshot(&self, id: &ScriptId) -> Option<SyncedScript>;
}

/// The generated half of a [`SourceScript`]: the virtual-code tree, the
/// plugin that produced it, and an id index over the tree.
pub struct Generated {
    root: VirtualCode,
    plugin: Arc<dyn LanguagePlugin>,
    embedded: HashMap<CodeId, Vec<usize>>,
    revision: u64,
}

impl Generated {
    /// Root of the virtual-code tree.
    pub fn root(&self) -> &VirtualCode {
        &self.root
    }

    /// The plugin that generated (and will update/dispose) this tree.
    pub fn plugin(&self) -> &Arc<dyn LanguagePlugin> {
        &self.plugin
    }

    /// Resolve an embedded code by id, anywhere in the tree.
    pub fn embedded_code(&self, id: &CodeId) -> Option<&VirtualCode> {
        let path = self.embedded.get(id)?;
        let mut code = &self.root;
        for &index in path {
            code = code.embedded_codes.get(index)?;
        }
        Some(code)
    }

    /// Ids of every code in the tree.
    pub fn embedded_ids(&self) -> impl Iterator<Item = &CodeId> {
        self.embedded.keys()
    }

    /// Monotonic generation counter; unchanged means the tree object was
    /// reused as-is (the no-op `set` path).
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Registry record for one authored document identity.
///
/// The dependency sets are registry-private: all graph mutation goes
/// through registry operations so the mutual-inverse invariant between
/// `associated_ids` and `target_ids` is enforced in one place.
pub struct SourceScript {
    id: ScriptId,
    language_id: LanguageId,
    snapshot: Snapshot,
    associated_only: bool,
    generated: Option<Generated>,
    /// Scripts this one's generation read from.
    associated_ids: HashSet<ScriptId>,
    /// Scripts whose generation read this one.
    target_ids: HashSet<ScriptId>,
    /// Set when a script this one depends on changed; forces regeneration
    /// on next access even though this script's own snapshot is unchanged.
    is_association_dirty: bool,
}

impl SourceScript {
    pub fn id(&self) -> &ScriptId {
        &self.id
    }

    pub fn language_id(&self) -> &LanguageId {
        &self.language_id
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// True if this script exists only to be read by other scripts'
    /// generators.
    pub fn associated_only(&self) -> bool {
        self.associated_only
    }

    pub fn generated(&self) -> Option<&Generated> {
        self.generated.as_ref()
    }

    pub fn is_association_dirty(&self) -> bool {
        self.is_association_dirty
    }

    pub fn associated_ids(&self) -> impl Iterator<Item = &ScriptId> {
        self.associated_ids.iter()
    }

    pub fn target_ids(&self) -> impl Iterator<Item = &ScriptId> {
        self.target_ids.iter()
    }
}

/// Gives a running generator access to other scripts.
///
/// Handed to [`LanguagePlugin::create_virtual_code`] /
/// [`LanguagePlugin::update_virtual_code`]. Every successful
/// [`get_associated_script`](Self::get_associated_script) records the
/// dependency edge in both directions.
pub struct CodegenContext<'a> {
    registry: &'a mut ScriptRegistry,
    current: ScriptId,
}

impl CodegenContext<'_> {
    /// Identity of the script being generated.
    pub fn current_script(&self) -> &ScriptId {
        &self.current
    }

    /// Pull another script's current state, registering the dependency.
    ///
    /// Runs the pull-model sync for the identity first, so the snapshot
    /// seen here is current. Asking for the script that is itself being
    /// generated observes it mid-flight (its previous tree detached) and
    /// records no edge.
    pub fn get_associated_script(&mut self, id: &ScriptId) -> Option<AssociatedScript> {
        self.registry.sync_script(id);
        let current_key = self.registry.key_of(&self.current);
        let target_key = self.registry.key_of(id);
        let register_edge = current_key != target_key && self.registry.scripts.contains_key(&current_key);
        let (target_id, language_id, snapshot) = {
            let target = self.registry.scripts.get_mut(&target_key)?;
            if register_edge {
                target.target_ids.insert(self.current.clone());
            }
            (
                target.id.clone(),
                target.language_id.clone(),
                target.snapshot.clone(),
            )
        };
        if register_edge {
            if let Some(current) = self.registry.scripts.get_mut(&current_key) {
                current.associated_ids.insert(target_id.clone());
            }
        }
        Some(AssociatedScript {
            id: target_id,
            language_id,
            snapshot,
        })
    }
}

/// Owns the canonical [`SourceScript`] record per document identity.
///
/// All mutation and lookup is synchronous; one registry serves one
/// workspace scope on a single logical thread of control.
pub struct ScriptRegistry {
    plugins: Vec<Arc<dyn LanguagePlugin>>,
    options: RegistryOptions,
    scripts: HashMap<String, SourceScript>,
    synced_versions: HashMap<String, String>,
    sync: Option<Arc<dyn ScriptSync>>,
    next_revision: u64,
}

enum Action {
    Create,
    Reset,
    ReplaceSnapshot,
    Regenerate,
    Unchanged,
}

impl ScriptRegistry {
    /// Create a registry over an ordered plugin list.
    ///
    /// Plugin order is meaningful: language-id resolution and tree creation
    /// both probe in order and take the first match.
    pub fn new(plugins: Vec<Arc<dyn LanguagePlugin>>, options: RegistryOptions) -> Self {
        ScriptRegistry {
            plugins,
            options,
            scripts: HashMap::new(),
            synced_versions: HashMap::new(),
            sync: None,
            next_revision: 0,
        }
    }

    /// Attach a pull-model document source (see [`ScriptSync`]).
    pub fn with_sync(mut self, sync: Arc<dyn ScriptSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn plugins(&self) -> &[Arc<dyn LanguagePlugin>] {
        &self.plugins
    }

    /// Number of registered scripts.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Iterate all records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceScript> {
        self.scripts.values()
    }

    /// Read a record without syncing or healing stale associations.
    pub fn peek(&self, id: &ScriptId) -> Option<&SourceScript> {
        self.scripts.get(&self.key_of(id))
    }

    /// Get the record for an identity, bringing it up to date first.
    ///
    /// With a sync source configured this pulls the current document if the
    /// version changed. Independently, a record whose dependencies changed
    /// (`is_association_dirty`) is re-`set` with its own unchanged snapshot
    /// so it regenerates against fresh dependency data — this is how
    /// cross-file invalidation propagates without a global re-scan.
    pub fn get(&mut self, id: &ScriptId) -> Option<&SourceScript> {
        self.sync_script(id);
        let key = self.key_of(id);
        let stale = match self.scripts.get(&key) {
            Some(script) if script.is_association_dirty => {
                Some((script.snapshot.clone(), script.language_id.clone()))
            }
            _ => None,
        };
        if let Some((snapshot, language_id)) = stale {
            self.set(id.clone(), snapshot, Some(language_id));
        }
        self.scripts.get(&key)
    }

    /// Create or update the record for an identity.
    ///
    /// Returns the record, or `None` when no language id could be resolved
    /// or generation reported the document gone. Calling `set` with an
    /// unchanged snapshot on a clean record is a free no-op returning the
    /// existing record (callers may `set` speculatively).
    pub fn set(
        &mut self,
        id: ScriptId,
        snapshot: Snapshot,
        language_id: Option<LanguageId>,
    ) -> Option<&SourceScript> {
        let language_id = language_id.or_else(|| {
            self.plugins
                .iter()
                .find_map(|plugin| plugin.resolve_language_id(&id))
        });
        let Some(language_id) = language_id else {
            warn!(script = %id, "no plugin resolved a language id; script not registered");
            return None;
        };
        let associated_only = self
            .plugins
            .iter()
            .any(|plugin| plugin.is_associated_file_only(&id, &language_id));
        let key = self.key_of(&id);

        let action = match self.scripts.get(&key) {
            None => Action::Create,
            Some(script)
                if script.language_id != language_id
                    || script.associated_only != associated_only =>
            {
                Action::Reset
            }
            Some(_) if associated_only => Action::ReplaceSnapshot,
            Some(script)
                if script.is_association_dirty || script.snapshot.id() != snapshot.id() =>
            {
                Action::Regenerate
            }
            Some(_) => Action::Unchanged,
        };

        match action {
            Action::Unchanged => self.scripts.get(&key),
            Action::Reset => {
                // Never mutate in place across a classification change.
                self.delete(&id);
                self.set(id, snapshot, Some(language_id))
            }
            Action::ReplaceSnapshot => {
                let mut replaced = false;
                if let Some(script) = self.scripts.get_mut(&key) {
                    replaced = script.snapshot.id() != snapshot.id();
                    script.snapshot = snapshot;
                    script.is_association_dirty = false;
                }
                if replaced {
                    self.mark_targets_dirty(&key);
                }
                self.scripts.get(&key)
            }
            Action::Regenerate => self.regenerate(&key, snapshot),
            Action::Create => {
                debug!(script = %id, language = %language_id, "registering script");
                self.scripts.insert(
                    key.clone(),
                    SourceScript {
                        id: id.clone(),
                        language_id: language_id.clone(),
                        snapshot: snapshot.clone(),
                        associated_only,
                        generated: None,
                        associated_ids: HashSet::new(),
                        target_ids: HashSet::new(),
                        is_association_dirty: false,
                    },
                );
                if !associated_only {
                    for plugin in self.plugins.clone() {
                        let root = {
                            let mut ctx = CodegenContext {
                                registry: &mut *self,
                                current: id.clone(),
                            };
                            plugin.create_virtual_code(&id, &language_id, &snapshot, &mut ctx)
                        };
                        match root {
                            Some(root) => {
                                self.accept_generated(&key, root, plugin);
                                break;
                            }
                            // A declined probe must not leave edges behind.
                            None => self.clear_outgoing_edges(&key),
                        }
                    }
                }
                self.scripts.get(&key)
            }
        }
    }

    /// Remove the record for an identity.
    ///
    /// Disposes the generated tree via the plugin hook, removes this script
    /// from every dependency's target set, and marks every dependent stale.
    pub fn delete(&mut self, id: &ScriptId) {
        let key = self.key_of(id);
        debug!(script = %id, "deleting script");
        self.remove_record(&key);
    }

    fn regenerate(&mut self, key: &str, snapshot: Snapshot) -> Option<&SourceScript> {
        // Stale associations must never survive a regeneration: drop the
        // outgoing edges now, let generation repopulate them.
        let (id, language_id, snapshot_replaced) = {
            let script = self.scripts.get_mut(key)?;
            let snapshot_replaced = script.snapshot.id() != snapshot.id();
            script.snapshot = snapshot.clone();
            script.is_association_dirty = false;
            (script.id.clone(), script.language_id.clone(), snapshot_replaced)
        };
        self.clear_outgoing_edges(key);

        let previous = match self.scripts.get_mut(key) {
            Some(script) => script.generated.take(),
            None => return None,
        };
        let Some(previous) = previous else {
            // Nothing was ever generated for this record; there is no tree
            // to rebuild, only dependents to notify.
            if snapshot_replaced {
                self.mark_targets_dirty(key);
            }
            return self.scripts.get(key);
        };

        let plugin = previous.plugin.clone();
        debug!(script = %id, "regenerating virtual code");
        let update = {
            let mut ctx = CodegenContext {
                registry: &mut *self,
                current: id.clone(),
            };
            plugin.update_virtual_code(&id, previous.root, &snapshot, &mut ctx)
        };
        let root = match update {
            VirtualCodeUpdate::Updated(root) => Some(root),
            VirtualCodeUpdate::Full => {
                let mut ctx = CodegenContext {
                    registry: &mut *self,
                    current: id.clone(),
                };
                plugin.create_virtual_code(&id, &language_id, &snapshot, &mut ctx)
            }
            VirtualCodeUpdate::Removed => None,
        };

        match root {
            Some(root) => {
                self.accept_generated(key, root, plugin);
                if snapshot_replaced {
                    self.mark_targets_dirty(key);
                }
                self.scripts.get(key)
            }
            None => {
                // Generation reports the document gone; same as delete.
                self.remove_record(key);
                None
            }
        }
    }

    /// Validate and install a freshly generated tree, rebuilding the
    /// embedded-code index by a full pre-order walk.
    fn accept_generated(&mut self, key: &str, root: VirtualCode, plugin: Arc<dyn LanguagePlugin>) {
        validate_tree(&root);
        let embedded = embedded_paths(&root);
        self.next_revision += 1;
        let revision = self.next_revision;
        if let Some(script) = self.scripts.get_mut(key) {
            script.generated = Some(Generated {
                root,
                plugin,
                embedded,
                revision,
            });
        }
    }

    fn remove_record(&mut self, key: &str) {
        let Some(mut script) = self.scripts.remove(key) else {
            return;
        };
        self.synced_versions.remove(key);
        if let Some(mut generated) = script.generated.take() {
            let plugin = generated.plugin.clone();
            plugin.dispose_virtual_code(&script.id, &mut generated.root);
        }
        let own_id = script.id.clone();
        for dependency in script.associated_ids.drain() {
            let dependency_key = self.key_of(&dependency);
            if let Some(record) = self.scripts.get_mut(&dependency_key) {
                record.target_ids.remove(&own_id);
            }
        }
        for target in &script.target_ids {
            let target_key = self.key_of(target);
            if let Some(record) = self.scripts.get_mut(&target_key) {
                // Fully detach the dying script from the graph; dependents
                // re-add fresh edges when they regenerate.
                record.associated_ids.remove(&own_id);
                record.is_association_dirty = true;
            }
        }
    }

    fn clear_outgoing_edges(&mut self, key: &str) {
        let (own_id, associated) = match self.scripts.get_mut(key) {
            Some(script) => (
                script.id.clone(),
                script.associated_ids.drain().collect::<Vec<_>>(),
            ),
            None => return,
        };
        for dependency in associated {
            let dependency_key = self.key_of(&dependency);
            if let Some(record) = self.scripts.get_mut(&dependency_key) {
                record.target_ids.remove(&own_id);
            }
        }
    }

    fn mark_targets_dirty(&mut self, key: &str) {
        let targets: Vec<ScriptId> = match self.scripts.get(key) {
            Some(script) => script.target_ids.iter().cloned().collect(),
            None => return,
        };
        for target in targets {
            let target_key = self.key_of(&target);
            if let Some(record) = self.scripts.get_mut(&target_key) {
                record.is_association_dirty = true;
            }
        }
    }

    fn sync_script(&mut self, id: &ScriptId) {
        let Some(sync) = self.sync.clone() else {
            return;
        };
        let key = self.key_of(id);
        if let Some(version) = sync.script_version(id) {
            if self.synced_versions.get(&key).is_some_and(|known| *known == version) {
                return;
            }
            self.synced_versions.insert(key, version);
        }
        match sync.script_snapshot(id) {
            Some(synced) => {
                self.set(id.clone(), synced.snapshot, synced.language_id);
            }
            None => self.delete(id),
        }
    }

    fn key_of(&self, id: &ScriptId) -> String {
        if self.options.case_sensitive_ids {
            id.as_str().to_owned()
        } else {
            id.as_str().to_lowercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_case_sensitive() {
        assert!(RegistryOptions::default().case_sensitive_ids);
    }

    #[test]
    fn options_deserialize() {
        let options: RegistryOptions =
            serde_json::from_str(r#"{"case_sensitive_ids": false}"#).unwrap();
        assert!(!options.case_sensitive_ids);
    }

    #[test]
    fn empty_registry() {
        let registry = ScriptRegistry::new(Vec::new(), RegistryOptions::default());
        assert!(registry.is_empty());
        assert!(registry.peek(&ScriptId::new("file:///a.cmp")).is_none());
    }
}
