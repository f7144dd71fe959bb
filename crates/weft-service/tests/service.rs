//! End-to-end service scenarios: projection, translation, memoization and
//! cache invalidation.
//!
//! The fixture plugin projects a component dialect: `{{name}}`
//! interpolations become an embedded `javascript` code, `@import <id>`
//! lines inline the imported `.props` file's text into the generated script
//! with cross-file mappings back to the imported document.

use std::collections::HashMap;
use std::sync::Arc;
use weft_core::{
    CodeId, CodegenContext, LanguageId, LanguagePlugin, RegistryOptions, ScriptId,
    SemanticProjection, Snapshot, VirtualCode,
};
use weft_document::Position;
use weft_service::LanguageService;
use weft_source_map::{CapabilitySet, Mapping};

fn interpolations(text: &str) -> Vec<(String, usize)> {
    let mut found = Vec::new();
    let mut rest = 0;
    while let Some(open) = text[rest..].find("{{") {
        let name_start = rest + open + 2;
        let Some(close) = text[name_start..].find("}}") else {
            break;
        };
        found.push((text[name_start..name_start + close].to_owned(), name_start));
        rest = name_start + close + 2;
    }
    found
}

struct ComponentPlugin;

impl LanguagePlugin for ComponentPlugin {
    fn resolve_language_id(&self, id: &ScriptId) -> Option<LanguageId> {
        if id.as_str().ends_with(".cmp") {
            Some(LanguageId::new("component"))
        } else if id.as_str().ends_with(".props") {
            Some(LanguageId::new("props"))
        } else {
            None
        }
    }

    fn is_associated_file_only(&self, _id: &ScriptId, language_id: &LanguageId) -> bool {
        language_id.as_str() == "props"
    }

    fn create_virtual_code(
        &self,
        _id: &ScriptId,
        language_id: &LanguageId,
        snapshot: &Snapshot,
        ctx: &mut CodegenContext<'_>,
    ) -> Option<VirtualCode> {
        if language_id.as_str() != "component" {
            return None;
        }
        let text = snapshot.text().to_owned();

        let mut script_text = String::new();
        let mut mappings = Vec::new();
        let mut linked = Vec::new();
        let mut first_occurrence: HashMap<String, usize> = HashMap::new();
        for (name, offset) in interpolations(&text) {
            let generated_offset = script_text.len();
            mappings.push(Mapping::one(
                offset,
                generated_offset,
                name.len(),
                CapabilitySet::all(),
            ));
            match first_occurrence.get(&name) {
                Some(&first) => linked.push(Mapping::one(
                    first,
                    generated_offset,
                    name.len(),
                    CapabilitySet::empty(),
                )),
                None => {
                    first_occurrence.insert(name.clone(), generated_offset);
                }
            }
            script_text.push_str(&name);
            script_text.push(';');
        }

        let mut associated = Vec::new();
        for import in text
            .lines()
            .filter_map(|line| line.strip_prefix("@import "))
            .map(|id| ScriptId::new(id.trim()))
        {
            if let Some(dep) = ctx.get_associated_script(&import) {
                let at = script_text.len();
                script_text.push_str(dep.snapshot.text());
                associated.push((
                    dep.id.clone(),
                    vec![Mapping::one(0, at, dep.snapshot.len(), CapabilitySet::all())],
                ));
            }
        }

        let script = VirtualCode::new("script", "javascript", Snapshot::new(script_text), mappings)
            .with_linked_mappings(linked)
            .with_associated_script_mappings(associated);
        Some(
            VirtualCode::new(
                "root",
                "html",
                Snapshot::new(text.clone()),
                vec![Mapping::one(0, 0, text.len(), CapabilitySet::all())],
            )
            .with_embedded(vec![script]),
        )
    }

    fn semantic_projection(&self, _root: &VirtualCode) -> Option<SemanticProjection> {
        Some(SemanticProjection {
            primary: CodeId::new("script"),
            extras: Vec::new(),
        })
    }
}

fn service() -> LanguageService {
    LanguageService::new(
        vec![Arc::new(ComponentPlugin) as Arc<dyn LanguagePlugin>],
        RegistryOptions::default(),
    )
}

fn id(s: &str) -> ScriptId {
    ScriptId::new(s)
}

fn script_code() -> CodeId {
    CodeId::new("script")
}

fn navigation(data: CapabilitySet) -> bool {
    data.contains(CapabilitySet::NAVIGATION)
}

#[test]
fn interpolation_translates_both_ways() {
    let mut service = service();
    // The `x` sits at source offset 5 and becomes offset 0 of the script.
    service.set(id("a.cmp"), Snapshot::new("<a>{{x}}</a>"), None);

    let map = service
        .primary_map(&id("a.cmp"), &script_code())
        .expect("component has a primary map");
    assert_eq!(map.virtual_document().text(), "x;");

    assert_eq!(
        map.generated_position(Position::new(0, 5), navigation),
        Some(Position::new(0, 0))
    );
    assert_eq!(
        map.source_position(Position::new(0, 0), navigation),
        Some(Position::new(0, 5))
    );
    assert_eq!(map.map().to_source_offset(0, navigation), Some(5));

    // Unmapped generated territory (the `;`) translates to the span edge;
    // past it, nothing.
    assert_eq!(map.source_position(Position::new(0, 2), navigation), None);
}

#[test]
fn range_translation_through_documents() {
    let mut service = service();
    service.set(id("a.cmp"), Snapshot::new("<a>{{item}}</a>"), None);

    let map = service
        .primary_map(&id("a.cmp"), &script_code())
        .expect("map");
    // "item" is source [5, 9) and generated [0, 4).
    let range = map
        .generated_range(
            weft_document::Range::new(Position::new(0, 5), Position::new(0, 9)),
            navigation,
        )
        .expect("range maps");
    assert_eq!(range.start, Position::new(0, 0));
    assert_eq!(range.end, Position::new(0, 4));
}

#[test]
fn maps_are_memoized_per_snapshot_pair() {
    let mut service = service();
    service.set(id("a.cmp"), Snapshot::new("{{x}}"), None);

    let first = service.primary_map(&id("a.cmp"), &script_code()).expect("map");
    let second = service.primary_map(&id("a.cmp"), &script_code()).expect("map");
    assert!(Arc::ptr_eq(first.map(), second.map()));
    assert!(Arc::ptr_eq(first.virtual_document(), second.virtual_document()));
    assert_eq!(service.cached_maps(), 1);
}

#[test]
fn edit_replaces_and_evicts_stale_caches() {
    let mut service = service();
    service.set(id("a.cmp"), Snapshot::new("{{x}}"), None);
    let before = service.primary_map(&id("a.cmp"), &script_code()).expect("map");
    // Source view + script view.
    assert_eq!(service.cached_documents(), 2);

    service.set(id("a.cmp"), Snapshot::new("{{renamed}}"), None);
    let after = service.primary_map(&id("a.cmp"), &script_code()).expect("map");

    assert!(!Arc::ptr_eq(before.map(), after.map()));
    assert_eq!(after.virtual_document().text(), "renamed;");
    // Stale entries went with their snapshots.
    assert_eq!(service.cached_documents(), 2);
    assert_eq!(service.cached_maps(), 1);
}

#[test]
fn delete_clears_derived_caches() {
    let mut service = service();
    service.set(id("a.cmp"), Snapshot::new("{{x}}"), None);
    service.primary_map(&id("a.cmp"), &script_code());
    service.linked_map(&id("a.cmp"), &script_code());

    service.delete(&id("a.cmp"));
    assert_eq!(service.cached_documents(), 0);
    assert_eq!(service.cached_maps(), 0);
    assert!(service.virtual_code(&id("a.cmp"), &script_code()).is_none());
}

#[test]
fn linked_positions_are_symmetric() {
    let mut service = service();
    // Script text "x;x;": occurrences at generated offsets 0 and 2.
    service.set(id("a.cmp"), Snapshot::new("{{x}}{{x}}"), None);

    let linked = service
        .linked_map(&id("a.cmp"), &script_code())
        .expect("repeated name links positions");
    assert_eq!(
        linked.linked_positions(Position::new(0, 0)),
        vec![Position::new(0, 2)]
    );
    assert_eq!(
        linked.linked_positions(Position::new(0, 2)),
        vec![Position::new(0, 0)]
    );
}

#[test]
fn single_occurrence_has_no_linked_map() {
    let mut service = service();
    service.set(id("a.cmp"), Snapshot::new("{{x}}"), None);
    assert!(service.linked_map(&id("a.cmp"), &script_code()).is_none());
}

#[test]
fn cross_file_mappings_reach_the_imported_document() {
    let mut service = service();
    service.set(id("b.props"), Snapshot::new("red"), None);
    service.set(id("a.cmp"), Snapshot::new("@import b.props\n{{x}}"), None);

    // Script text is "x;red": the import lands at generated [2, 5).
    let maps = service.maps_for(&id("a.cmp"), &script_code());
    let sources: Vec<&str> = maps.iter().map(|(source, _)| source.as_str()).collect();
    assert_eq!(sources, ["a.cmp", "b.props"]);

    let cross = service
        .map_between(&id("a.cmp"), &script_code(), &id("b.props"))
        .expect("cross-file map");
    assert_eq!(cross.source_document().text(), "red");
    assert_eq!(cross.map().to_source_offset(2, navigation), Some(0));
    assert_eq!(
        cross.source_position(Position::new(0, 3), navigation),
        Some(Position::new(0, 1))
    );
}

#[test]
fn dependency_edit_propagates_through_access() {
    let mut service = service();
    service.set(id("b.props"), Snapshot::new("red"), None);
    service.set(id("a.cmp"), Snapshot::new("@import b.props\n{{x}}"), None);
    assert_eq!(
        service
            .virtual_code(&id("a.cmp"), &script_code())
            .expect("script code")
            .snapshot
            .text(),
        "x;red"
    );

    // Only the dependency changes; a.cmp's own snapshot stays.
    service.set(id("b.props"), Snapshot::new("blue"), None);
    let map = service
        .primary_map(&id("a.cmp"), &script_code())
        .expect("map after healing");
    assert_eq!(map.virtual_document().text(), "x;blue");
}

#[test]
fn semantic_projection_names_the_script_code() {
    let mut service = service();
    service.set(id("a.cmp"), Snapshot::new("{{x}}"), None);

    let projection = service
        .semantic_projection(&id("a.cmp"))
        .expect("plugin projects semantics");
    assert_eq!(projection.primary, script_code());
    assert!(projection.extras.is_empty());
    assert!(
        service
            .virtual_code(&id("a.cmp"), &projection.primary)
            .is_some()
    );
}

#[test]
fn unknown_handles_resolve_to_nothing() {
    let mut service = service();
    service.set(id("a.cmp"), Snapshot::new("{{x}}"), None);
    assert!(service.primary_map(&id("a.cmp"), &CodeId::new("style")).is_none());
    assert!(service.primary_map(&id("missing.cmp"), &script_code()).is_none());
}
