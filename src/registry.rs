//! Plugin registry.
//!
//! Maps format identifiers to plugins. A registry is an ordinary value owned
//! by whoever needs it (typically one per transformation engine); there is no
//! process-wide instance.
//!
//! # Identifier policy
//!
//! Identifiers are matched after normalization: surrounding whitespace and
//! media-type parameters are dropped and ASCII letters are lowercased, so
//! `"Application/JSON; charset=UTF-8"` resolves like `"application/json"`.
//!
//! # Conflicts
//!
//! Registering a plugin under an identifier that already belongs to another
//! plugin replaces the earlier mapping: the last registration wins. Every
//! replacement is logged at warn level and reported back to the caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::UnsupportedFormatError;
use crate::plugin::{
    CsvPlugin, FormatPlugin, HostObjectPlugin, JsonPlugin, ParameterDocs, TypeRegistry,
};

/// Normalizes an identifier for lookup.
pub fn normalize_identifier(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

// ============================================================================
// Descriptors
// ============================================================================

/// A registered plugin together with what it declared at registration.
pub struct PluginDescriptor {
    plugin: Arc<dyn FormatPlugin>,
    plugin_id: String,
    supported_identifiers: Vec<String>,
    read_parameters: ParameterDocs,
    write_parameters: ParameterDocs,
}

impl PluginDescriptor {
    /// Captures a plugin's declarations.
    pub fn describe(plugin: Arc<dyn FormatPlugin>) -> Self {
        Self {
            plugin_id: plugin.plugin_id().to_string(),
            supported_identifiers: plugin
                .supported_identifiers()
                .iter()
                .map(|id| id.to_string())
                .collect(),
            read_parameters: plugin.read_parameters(),
            write_parameters: plugin.write_parameters(),
            plugin,
        }
    }

    pub fn plugin(&self) -> &Arc<dyn FormatPlugin> {
        &self.plugin
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn supported_identifiers(&self) -> &[String] {
        &self.supported_identifiers
    }

    /// The first declared identifier.
    pub fn canonical_identifier(&self) -> Option<&str> {
        self.supported_identifiers.first().map(String::as_str)
    }

    pub fn read_parameters(&self) -> &ParameterDocs {
        &self.read_parameters
    }

    pub fn write_parameters(&self) -> &ParameterDocs {
        &self.write_parameters
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("plugin_id", &self.plugin_id)
            .field("supported_identifiers", &self.supported_identifiers)
            .field("read_parameters", &self.read_parameters)
            .field("write_parameters", &self.write_parameters)
            .finish()
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Something that can enumerate plugin implementations.
pub trait PluginSource {
    fn plugins(&self) -> Vec<Arc<dyn FormatPlugin>>;
}

impl PluginSource for Vec<Arc<dyn FormatPlugin>> {
    fn plugins(&self) -> Vec<Arc<dyn FormatPlugin>> {
        self.clone()
    }
}

/// The plugins shipped with panformat: JSON, CSV and host objects.
#[derive(Clone, Debug, Default)]
pub struct BuiltinPlugins {
    types: TypeRegistry,
}

impl BuiltinPlugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builtins whose host-object plugin knows the given output types.
    pub fn with_types(types: TypeRegistry) -> Self {
        Self { types }
    }
}

impl PluginSource for BuiltinPlugins {
    fn plugins(&self) -> Vec<Arc<dyn FormatPlugin>> {
        vec![
            Arc::new(JsonPlugin::new()),
            Arc::new(CsvPlugin::new()),
            Arc::new(HostObjectPlugin::with_types(self.types.clone())),
        ]
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Identifier → plugin catalog.
///
/// Reads (`resolve`, `descriptor`, listing) take a shared lock; registration
/// takes the exclusive lock for the whole plugin, so readers never observe a
/// plugin with only some of its identifiers mapped.
pub struct PluginRegistry {
    entries: RwLock<HashMap<String, Arc<PluginDescriptor>>>,
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding the builtin plugins.
    pub fn with_builtins() -> Self {
        Self::with_types(TypeRegistry::new())
    }

    /// Create a registry holding the builtin plugins, with named host output types.
    pub fn with_types(types: TypeRegistry) -> Self {
        let registry = Self::new();
        registry.discover_and_register(&BuiltinPlugins::with_types(types));
        registry
    }

    /// Register a plugin under every identifier it declares.
    ///
    /// Returns the normalized identifiers that previously belonged to a
    /// different plugin and now point at this one.
    pub fn register<P: FormatPlugin + 'static>(&self, plugin: P) -> Vec<String> {
        self.register_shared(Arc::new(plugin))
    }

    /// Register an already shared plugin instance.
    pub fn register_shared(&self, plugin: Arc<dyn FormatPlugin>) -> Vec<String> {
        let descriptor = Arc::new(PluginDescriptor::describe(plugin));
        if descriptor.supported_identifiers.is_empty() {
            warn!(
                plugin = descriptor.plugin_id(),
                "plugin declares no identifiers; nothing registered"
            );
            return Vec::new();
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut replaced = Vec::new();
        for identifier in &descriptor.supported_identifiers {
            let key = normalize_identifier(identifier);
            if key.is_empty() {
                warn!(plugin = descriptor.plugin_id(), "skipping empty identifier");
                continue;
            }
            if let Some(previous) = entries.insert(key.clone(), Arc::clone(&descriptor)) {
                let same_plugin = Arc::ptr_eq(previous.plugin(), descriptor.plugin());
                if !same_plugin && !replaced.contains(&key) {
                    warn!(
                        identifier = %key,
                        previous = previous.plugin_id(),
                        replacement = descriptor.plugin_id(),
                        "identifier re-registered; last registration wins"
                    );
                    replaced.push(key);
                }
            }
        }
        debug!(
            plugin = descriptor.plugin_id(),
            identifiers = ?descriptor.supported_identifiers,
            "registered format plugin"
        );
        replaced
    }

    /// Register every plugin a source provides. Returns how many were registered.
    ///
    /// A source with no plugins is not an error.
    pub fn discover_and_register(&self, source: &dyn PluginSource) -> usize {
        let plugins = source.plugins();
        if plugins.is_empty() {
            warn!("plugin discovery found no plugins");
        }
        let count = plugins.len();
        for plugin in plugins {
            self.register_shared(plugin);
        }
        count
    }

    /// Look up the plugin for an identifier or media type.
    ///
    /// # Errors
    /// Returns [`UnsupportedFormatError`] when nothing is registered for it.
    pub fn resolve(
        &self,
        identifier: &str,
    ) -> Result<Arc<dyn FormatPlugin>, UnsupportedFormatError> {
        self.descriptor(identifier)
            .map(|descriptor| Arc::clone(descriptor.plugin()))
    }

    /// Look up the full descriptor for an identifier or media type.
    pub fn descriptor(
        &self,
        identifier: &str,
    ) -> Result<Arc<PluginDescriptor>, UnsupportedFormatError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&normalize_identifier(identifier))
            .cloned()
            .ok_or_else(|| UnsupportedFormatError {
                identifier: identifier.to_string(),
                registered: sorted_keys(&entries).join(", "),
            })
    }

    /// Check if an identifier resolves
    pub fn contains(&self, identifier: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&normalize_identifier(identifier))
    }

    /// All registered identifiers (normalized, sorted)
    pub fn identifiers(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        sorted_keys(&entries)
    }

    /// Registered plugins that still own at least one identifier, sorted by plugin id.
    pub fn descriptors(&self) -> Vec<Arc<PluginDescriptor>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut unique: Vec<Arc<PluginDescriptor>> = Vec::new();
        for descriptor in entries.values() {
            if !unique.iter().any(|d| Arc::ptr_eq(d, descriptor)) {
                unique.push(Arc::clone(descriptor));
            }
        }
        unique.sort_by(|a, b| a.plugin_id().cmp(b.plugin_id()));
        unique
    }
}

fn sorted_keys(entries: &HashMap<String, Arc<PluginDescriptor>>) -> Vec<String> {
    let mut keys: Vec<_> = entries.keys().cloned().collect();
    keys.sort();
    keys
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, MediaType};
    use crate::error::FormatError;
    use crate::plugin::Params;
    use crate::value::Value;

    // Test plugin
    struct FakeJson;

    impl FormatPlugin for FakeJson {
        fn plugin_id(&self) -> &str {
            "FakeJSON"
        }
        fn supported_identifiers(&self) -> &[&str] {
            &["json"]
        }
        fn read(&self, _input: &Document, _params: &Params) -> Result<Value, FormatError> {
            Ok(Value::Null)
        }
        fn write(
            &self,
            _value: &Value,
            _params: &Params,
            media_type: &MediaType,
        ) -> Result<Document, FormatError> {
            Ok(Document::text("fake", media_type.clone()))
        }
    }

    struct Anonymous;

    impl FormatPlugin for Anonymous {
        fn plugin_id(&self) -> &str {
            "Anonymous"
        }
        fn supported_identifiers(&self) -> &[&str] {
            &[]
        }
        fn read(&self, _input: &Document, _params: &Params) -> Result<Value, FormatError> {
            Ok(Value::Null)
        }
        fn write(
            &self,
            _value: &Value,
            _params: &Params,
            media_type: &MediaType,
        ) -> Result<Document, FormatError> {
            Ok(Document::text("", media_type.clone()))
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = PluginRegistry::new();
        assert!(registry.identifiers().is_empty());
        assert!(registry.descriptors().is_empty());
    }

    #[test]
    fn test_resolve_returns_registered_instance() {
        let registry = PluginRegistry::new();
        let plugin: Arc<dyn FormatPlugin> = Arc::new(JsonPlugin::new());
        registry.register_shared(Arc::clone(&plugin));

        for identifier in plugin.supported_identifiers() {
            let resolved = registry.resolve(identifier).expect("registered identifier");
            assert!(Arc::ptr_eq(&resolved, &plugin));
        }
    }

    #[test]
    fn test_resolve_unknown_identifier() {
        let registry = PluginRegistry::with_builtins();
        let err = registry.resolve("nonexistent/type").err().expect("should fail");
        assert_eq!(err.identifier, "nonexistent/type");
        assert!(err.registered.contains("application/json"));
    }

    #[test]
    fn test_identifier_normalization() {
        let registry = PluginRegistry::with_builtins();
        for identifier in ["JSON", " application/json ", "Application/JSON; charset=UTF-8"] {
            let plugin = registry.resolve(identifier).expect(identifier);
            assert_eq!(plugin.plugin_id(), "JSON");
        }
        assert!(registry.contains("TEXT/CSV"));
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = PluginRegistry::with_builtins();
        let replaced = registry.register(FakeJson);

        assert_eq!(replaced, vec!["json".to_string()]);
        assert_eq!(registry.resolve("json").unwrap().plugin_id(), "FakeJSON");
        assert_eq!(registry.resolve("application/json").unwrap().plugin_id(), "JSON");
    }

    #[test]
    fn test_reregistering_same_instance_reports_nothing() {
        let registry = PluginRegistry::new();
        let plugin: Arc<dyn FormatPlugin> = Arc::new(CsvPlugin::new());
        registry.register_shared(Arc::clone(&plugin));
        assert!(registry.register_shared(plugin).is_empty());
    }

    #[test]
    fn test_discover_tolerates_empty_source() {
        let registry = PluginRegistry::new();
        let empty: Vec<Arc<dyn FormatPlugin>> = Vec::new();
        assert_eq!(registry.discover_and_register(&empty), 0);
        assert!(registry.identifiers().is_empty());
    }

    #[test]
    fn test_discover_builtins() {
        let registry = PluginRegistry::new();
        assert_eq!(registry.discover_and_register(&BuiltinPlugins::new()), 3);
        assert_eq!(
            registry.identifiers(),
            vec![
                "application/csv",
                "application/json",
                "application/x-rust-object",
                "csv",
                "json",
                "rust",
                "rust-object",
                "text/csv",
            ]
        );
        let ids: Vec<_> = registry
            .descriptors()
            .iter()
            .map(|d| d.plugin_id().to_string())
            .collect();
        assert_eq!(ids, vec!["CSV", "JSON", "Rust"]);
    }

    #[test]
    fn test_plugin_without_identifiers_is_not_registered() {
        let registry = PluginRegistry::new();
        assert!(registry.register(Anonymous).is_empty());
        assert!(registry.descriptors().is_empty());
    }

    #[test]
    fn test_descriptor_captures_declarations() {
        let registry = PluginRegistry::with_builtins();
        let descriptor = registry.descriptor("rust").unwrap();
        assert_eq!(descriptor.plugin_id(), "Rust");
        assert_eq!(descriptor.canonical_identifier(), Some("application/x-rust-object"));
        assert!(descriptor.write_parameters().contains_key("OutputClass"));
        assert!(descriptor.read_parameters().is_empty());
    }

    #[test]
    fn test_default_has_builtins() {
        let registry = PluginRegistry::default();
        assert!(registry.contains("json"));
        assert!(registry.contains("csv"));
        assert!(registry.contains("rust"));
    }
}
