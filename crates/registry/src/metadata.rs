//! MetadataRegistry: annotation storage and tag queries
//!
//! ## Design
//!
//! Annotations arrive as [`Record`] values attached to declarations in
//! source. Module initializers flatten them into the registry at load time
//! via [`MetadataRegistry::harvest`], which walks the record's keys and
//! takes each key's live value. After load the registry is a read-mostly
//! index with three access paths:
//!
//! - by declaration: [`MetadataRegistry::metadata_of`]
//! - by module: [`MetadataRegistry::module_metadata`] and
//!   [`MetadataRegistry::find_metadata`]
//! - by tag: [`MetadataRegistry::modules_for_tag`] and the
//!   `declarations_for_tag` pair
//!
//! Tag queries resolve declarations to runtime values through accessors the
//! generated module code registers with
//! [`MetadataRegistry::register_declaration`]. There is no name-based
//! lookup at query time; a tagged declaration with no registered accessor
//! (a type, say) is simply not reported.
//!
//! ## Ownership
//!
//! Registration takes `&mut self`, queries take `&self`. The registry is
//! cheap to clone (persistent maps throughout), so concurrent loaders can
//! wrap one in `tanager_collections::Atom` and `swap` harvested modules in.

use serde_json::Value as JsonValue;
use tanager_collections::{Key, OrderedMap, Record, Value};
use tracing::{debug, info};

/// A generated accessor returning a top-level declaration's runtime value.
///
/// Emitted by code generation next to the declaration itself, so resolving
/// a tagged declaration never consults names at runtime.
pub type DeclAccessor = fn() -> Value;

/// A declaration matched by a tag query, with its resolved accessor.
#[derive(Clone, Debug)]
pub struct TaggedDecl {
    /// Module the declaration lives in.
    pub module: Key,
    /// The declaration's name.
    pub decl: Key,
    /// Accessor for the declaration's runtime value.
    pub accessor: DeclAccessor,
}

impl TaggedDecl {
    /// The declaration's current runtime value.
    pub fn value(&self) -> Value {
        (self.accessor)()
    }
}

/// Everything registered for one module.
#[derive(Clone, Debug, Default)]
struct ModuleMetadata {
    /// Module-level attributes (annotations on the module header).
    attrs: OrderedMap<Key, Value>,
    /// Per-declaration attributes, in declaration registration order.
    decls: OrderedMap<Key, OrderedMap<Key, Value>>,
    /// Generated accessors, one per value-level declaration.
    accessors: OrderedMap<Key, DeclAccessor>,
}

/// Registry of annotation metadata for loaded modules.
///
/// Attribute and declaration ordering is first-registration order
/// throughout, so tooling output is stable across runs.
///
/// # Examples
///
/// ```
/// use tanager_collections::{Record, Value};
/// use tanager_registry::MetadataRegistry;
///
/// let mut registry = MetadataRegistry::new();
/// let annotations = Record::new()
///     .assoc("deprecated", Value::Bool(true))
///     .assoc("since", Value::from("0.4.0"));
/// registry.harvest("app.http", "handler", &annotations);
///
/// let meta = registry.metadata_of("app.http", "handler");
/// assert_eq!(meta.get("since"), Some(&Value::from("0.4.0")));
/// assert_eq!(registry.modules_for_tag("deprecated").len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MetadataRegistry {
    modules: OrderedMap<Key, ModuleMetadata>,
}

impl MetadataRegistry {
    /// An empty registry. Created once at program load, before any module
    /// initializer runs.
    pub fn new() -> MetadataRegistry {
        MetadataRegistry {
            modules: OrderedMap::new(),
        }
    }

    /// Record one attribute on a declaration. Re-registering an attribute
    /// replaces its value and keeps its position.
    pub fn register_meta(&mut self, module: &str, decl: &str, attr: &str, value: Value) {
        debug!(target: "tanager::registry", module, decl, attr, "Declaration metadata registered");
        self.with_module(module, |meta| {
            let mut attrs = meta.decls.get(decl).cloned().unwrap_or_default();
            attrs.insert(Key::intern(attr), value);
            meta.decls.insert(Key::intern(decl), attrs);
        });
    }

    /// Record one attribute on a module header.
    pub fn register_module_meta(&mut self, module: &str, attr: &str, value: Value) {
        debug!(target: "tanager::registry", module, attr, "Module metadata registered");
        self.with_module(module, |meta| {
            meta.attrs.insert(Key::intern(attr), value);
        });
    }

    /// Flatten a record of annotations onto a declaration.
    ///
    /// Reads the record's keys in insertion order and registers each key's
    /// live value; shadowed history underneath is not harvested. The record
    /// itself is untouched.
    pub fn harvest(&mut self, module: &str, decl: &str, annotations: &Record) {
        for key in annotations.keys() {
            self.register_meta(module, decl, key.as_str(), annotations[key].clone());
        }
    }

    /// Register the generated accessor for a value-level declaration.
    pub fn register_declaration(&mut self, module: &str, decl: &str, accessor: DeclAccessor) {
        debug!(target: "tanager::registry", module, decl, "Declaration accessor registered");
        self.with_module(module, |meta| {
            meta.accessors.insert(Key::intern(decl), accessor);
        });
    }

    /// All attributes registered on a declaration, empty when the module or
    /// declaration is unknown.
    pub fn metadata_of(&self, module: &str, decl: &str) -> OrderedMap<Key, Value> {
        self.modules
            .get(module)
            .and_then(|meta| meta.decls.get(decl))
            .cloned()
            .unwrap_or_default()
    }

    /// All module-level attributes, empty when the module is unknown.
    pub fn module_metadata(&self, module: &str) -> OrderedMap<Key, Value> {
        self.modules
            .get(module)
            .map(|meta| meta.attrs.clone())
            .unwrap_or_default()
    }

    /// Every attribute map registered under a module: the module-level map
    /// first (possibly empty), then one map per declaration in registration
    /// order. Empty when the module is unknown.
    pub fn find_metadata(&self, module: &str) -> Vec<OrderedMap<Key, Value>> {
        let mut found = Vec::new();
        if let Some(meta) = self.modules.get(module) {
            found.push(meta.attrs.clone());
            for attrs in meta.decls.values() {
                found.push(attrs.clone());
            }
        }
        found
    }

    /// Modules containing at least one declaration tagged with `attr`.
    ///
    /// Scans declaration metadata only; a module-level attribute does not
    /// put its module in this list.
    pub fn modules_for_tag(&self, attr: &str) -> Vec<Key> {
        let mut found = Vec::new();
        for (module, meta) in self.modules.iter() {
            if meta.decls.values().any(|attrs| attrs.contains_key(attr)) {
                found.push(module.clone());
            }
        }
        found
    }

    /// Declarations in `module` tagged with `attr` that have a registered
    /// accessor, in declaration registration order.
    pub fn declarations_for_tag(&self, module: &str, attr: &str) -> Vec<TaggedDecl> {
        let mut found = Vec::new();
        if let Some(meta) = self.modules.get(module) {
            tagged_decls(&Key::intern(module), meta, attr, &mut found);
        }
        found
    }

    /// Declarations tagged with `attr` across every module, in module
    /// registration order.
    pub fn all_declarations_for_tag(&self, attr: &str) -> Vec<TaggedDecl> {
        let mut found = Vec::new();
        for (module, meta) in self.modules.iter() {
            tagged_decls(module, meta, attr, &mut found);
        }
        found
    }

    /// Modules with registered metadata, in registration order.
    pub fn modules<'a>(&'a self) -> impl Iterator<Item = &'a Key> + 'a {
        self.modules.keys()
    }

    /// Number of modules with registered metadata.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Snapshot of everything registered, for the doc generator and other
    /// out-of-process consumers:
    ///
    /// ```text
    /// { "<module>": { "module": { ... }, "declarations": { "<decl>": { ... } } } }
    /// ```
    pub fn to_json(&self) -> JsonValue {
        let mut modules = serde_json::Map::new();
        for (module, meta) in self.modules.iter() {
            let mut entry = serde_json::Map::new();
            entry.insert("module".to_string(), attrs_to_json(&meta.attrs));
            let mut decls = serde_json::Map::new();
            for (decl, attrs) in meta.decls.iter() {
                decls.insert(decl.as_str().to_string(), attrs_to_json(attrs));
            }
            entry.insert("declarations".to_string(), JsonValue::Object(decls));
            modules.insert(module.as_str().to_string(), JsonValue::Object(entry));
        }
        JsonValue::Object(modules)
    }

    /// Forget everything registered. Used on program reload.
    pub fn clear(&mut self) {
        info!(target: "tanager::registry", modules = self.modules.len(), "Metadata registry cleared");
        self.modules = OrderedMap::new();
    }

    /// Apply `f` to the module's metadata, creating the entry on first use.
    fn with_module<F>(&mut self, module: &str, f: F)
    where
        F: FnOnce(&mut ModuleMetadata),
    {
        let key = Key::intern(module);
        let mut meta = self.modules.get(key.as_str()).cloned().unwrap_or_default();
        f(&mut meta);
        self.modules.insert(key, meta);
    }
}

fn tagged_decls(module: &Key, meta: &ModuleMetadata, attr: &str, found: &mut Vec<TaggedDecl>) {
    for (decl, attrs) in meta.decls.iter() {
        if !attrs.contains_key(attr) {
            continue;
        }
        if let Some(accessor) = meta.accessors.get(decl.as_str()) {
            found.push(TaggedDecl {
                module: module.clone(),
                decl: decl.clone(),
                accessor: *accessor,
            });
        }
    }
}

fn attrs_to_json(attrs: &OrderedMap<Key, Value>) -> JsonValue {
    let mut obj = serde_json::Map::new();
    for (attr, value) in attrs.iter() {
        obj.insert(attr.as_str().to_string(), JsonValue::from(value));
    }
    JsonValue::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> Value {
        Value::Int(42)
    }

    fn greeting() -> Value {
        Value::from("hello")
    }

    // === Registration and lookup ===

    #[test]
    fn test_register_and_metadata_of() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("app.core", "main", "entry", Value::Bool(true));
        registry.register_meta("app.core", "main", "since", Value::from("1.0"));

        let meta = registry.metadata_of("app.core", "main");
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.get("entry"), Some(&Value::Bool(true)));
        assert_eq!(meta.get("since"), Some(&Value::from("1.0")));
    }

    #[test]
    fn test_metadata_of_unknown_is_empty() {
        let registry = MetadataRegistry::new();
        assert!(registry.metadata_of("nope", "nothing").is_empty());

        let mut registry = registry;
        registry.register_meta("app.core", "main", "entry", Value::Bool(true));
        assert!(registry.metadata_of("app.core", "other").is_empty());
    }

    #[test]
    fn test_module_metadata_is_separate_from_decl_metadata() {
        let mut registry = MetadataRegistry::new();
        registry.register_module_meta("app.core", "doc", Value::from("core module"));
        registry.register_meta("app.core", "main", "entry", Value::Bool(true));

        assert_eq!(registry.module_metadata("app.core").len(), 1);
        assert!(registry.metadata_of("app.core", "doc").is_empty());
        assert!(!registry.module_metadata("app.core").contains_key("entry"));
    }

    #[test]
    fn test_reregistering_attr_replaces_value_keeps_position() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("m", "d", "a", Value::Int(1));
        registry.register_meta("m", "d", "b", Value::Int(2));
        registry.register_meta("m", "d", "a", Value::Int(9));

        let meta = registry.metadata_of("m", "d");
        assert_eq!(meta.get("a"), Some(&Value::Int(9)));
        assert_eq!(meta.index_of("a"), Some(0));
    }

    // === Harvesting from records ===

    #[test]
    fn test_harvest_registers_every_key() {
        let mut registry = MetadataRegistry::new();
        let annotations = Record::new()
            .assoc("deprecated", Value::Bool(true))
            .assoc("since", Value::from("0.4.0"));
        registry.harvest("app.http", "handler", &annotations);

        let meta = registry.metadata_of("app.http", "handler");
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.get("deprecated"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_harvest_takes_live_values_only() {
        let mut registry = MetadataRegistry::new();
        let annotations = Record::new()
            .assoc("priority", Value::Int(1))
            .assoc("priority", Value::Int(2));
        registry.harvest("app.http", "handler", &annotations);

        let meta = registry.metadata_of("app.http", "handler");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("priority"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_harvest_leaves_record_untouched() {
        let mut registry = MetadataRegistry::new();
        let annotations = Record::new().assoc("tag", Value::Unit);
        let before = annotations.clone();
        registry.harvest("m", "d", &annotations);
        assert!(annotations.ptr_eq(&before));
    }

    // === find_metadata ===

    #[test]
    fn test_find_metadata_module_first_then_decls_in_order() {
        let mut registry = MetadataRegistry::new();
        registry.register_module_meta("m", "doc", Value::from("module doc"));
        registry.register_meta("m", "first", "a", Value::Int(1));
        registry.register_meta("m", "second", "b", Value::Int(2));

        let found = registry.find_metadata("m");
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].get("doc"), Some(&Value::from("module doc")));
        assert_eq!(found[1].get("a"), Some(&Value::Int(1)));
        assert_eq!(found[2].get("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_find_metadata_includes_empty_module_map() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("m", "d", "a", Value::Int(1));

        let found = registry.find_metadata("m");
        assert_eq!(found.len(), 2);
        assert!(found[0].is_empty());
    }

    #[test]
    fn test_find_metadata_unknown_module_is_empty() {
        let registry = MetadataRegistry::new();
        assert!(registry.find_metadata("ghost").is_empty());
    }

    // === Tag queries ===

    #[test]
    fn test_modules_for_tag_in_registration_order() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("b.module", "d", "derive", Value::Unit);
        registry.register_meta("a.module", "d", "derive", Value::Unit);
        registry.register_meta("c.module", "d", "other", Value::Unit);

        let modules = registry.modules_for_tag("derive");
        let names: Vec<&str> = modules.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["b.module", "a.module"]);
    }

    #[test]
    fn test_modules_for_tag_ignores_module_level_attrs() {
        let mut registry = MetadataRegistry::new();
        registry.register_module_meta("m", "derive", Value::Unit);
        assert!(registry.modules_for_tag("derive").is_empty());
    }

    #[test]
    fn test_declarations_for_tag_resolves_accessors() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("m", "answer", "export", Value::Unit);
        registry.register_declaration("m", "answer", answer);

        let tagged = registry.declarations_for_tag("m", "export");
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].module.as_str(), "m");
        assert_eq!(tagged[0].decl.as_str(), "answer");
        assert_eq!(tagged[0].value(), Value::Int(42));
    }

    #[test]
    fn test_declarations_for_tag_skips_missing_accessor() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("m", "SomeType", "export", Value::Unit);
        registry.register_meta("m", "answer", "export", Value::Unit);
        registry.register_declaration("m", "answer", answer);

        let tagged = registry.declarations_for_tag("m", "export");
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].decl.as_str(), "answer");
    }

    #[test]
    fn test_all_declarations_for_tag_spans_modules() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("m.one", "answer", "export", Value::Unit);
        registry.register_declaration("m.one", "answer", answer);
        registry.register_meta("m.two", "greeting", "export", Value::Unit);
        registry.register_declaration("m.two", "greeting", greeting);

        let tagged = registry.all_declarations_for_tag("export");
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[0].module.as_str(), "m.one");
        assert_eq!(tagged[1].value(), Value::from("hello"));
    }

    // === Snapshot and lifecycle ===

    #[test]
    fn test_to_json_shape() {
        let mut registry = MetadataRegistry::new();
        registry.register_module_meta("m", "doc", Value::from("docs"));
        registry.register_meta("m", "d", "count", Value::Int(3));

        let snapshot = registry.to_json();
        assert_eq!(
            snapshot,
            serde_json::json!({
                "m": {
                    "module": { "doc": "docs" },
                    "declarations": { "d": { "count": 3 } }
                }
            })
        );
    }

    #[test]
    fn test_to_json_empty_registry() {
        let registry = MetadataRegistry::new();
        assert_eq!(registry.to_json(), serde_json::json!({}));
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("m", "d", "a", Value::Int(1));
        registry.register_declaration("m", "d", answer);
        assert_eq!(registry.module_count(), 1);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.metadata_of("m", "d").is_empty());
        assert!(registry.declarations_for_tag("m", "a").is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut registry = MetadataRegistry::new();
        registry.register_meta("m", "d", "a", Value::Int(1));

        let snapshot = registry.clone();
        registry.register_meta("m", "d", "b", Value::Int(2));

        assert_eq!(snapshot.metadata_of("m", "d").len(), 1);
        assert_eq!(registry.metadata_of("m", "d").len(), 2);
    }

    #[test]
    fn test_modules_iterates_in_registration_order() {
        let mut registry = MetadataRegistry::new();
        registry.register_module_meta("z", "a", Value::Unit);
        registry.register_module_meta("a", "a", Value::Unit);

        let names: Vec<&str> = registry.modules().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
