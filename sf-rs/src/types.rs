//! Dynamic type registry and component factory.
//!
//! Script authors define component-like types at runtime:
//!
//! | Relation | Shape | Checked by |
//! |----------|-------|------------|
//! | type → parent type | single inheritance, a tree rooted at `Component` | [`TypeRegistry::is_subclass_of`] |
//! | type → interfaces | any number, declared per type | [`TypeRegistry::implements_interface`] |
//! | interface → parent interfaces | any number (diamonds allowed) | [`TypeRegistry::implements_interface`] |
//!
//! Every name referenced at registration must already be registered, so the
//! graphs are acyclic by construction.  Type and interface names share one
//! namespace: a name can be a type or an interface, never both.
//!
//! Defaults declared with [`TypeRegistry::define_property`] belong to the
//! exact type they were declared on.  A component created from a derived
//! type is seeded with the derived type's own defaults only.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::ScriptError;
use crate::script::value::Value;

/// Registry shared between the sessions of one host.
pub type SharedRegistry = Arc<RwLock<TypeRegistry>>;

/// Root of the type tree.
pub const ROOT_TYPE: &str = "Component";

// ── Builtin components ────────────────────────────────────────────────────────

/// Types the registry knows at construction, each with a fixed field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Component,
    Text,
    Image,
    SpriteRenderer,
}

impl BuiltinKind {
    pub const ALL: &'static [BuiltinKind] = &[
        BuiltinKind::Component,
        BuiltinKind::Text,
        BuiltinKind::Image,
        BuiltinKind::SpriteRenderer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Component => "Component",
            BuiltinKind::Text => "Text",
            BuiltinKind::Image => "Image",
            BuiltinKind::SpriteRenderer => "SpriteRenderer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// The schema with every field at its initial value.
    pub fn default_fields(self) -> BTreeMap<String, Value> {
        let fields: Vec<(&str, Value)> = match self {
            BuiltinKind::Component => vec![],
            BuiltinKind::Text => vec![
                ("text", Value::Str(String::new())),
                ("fontSize", Value::Int(14)),
                ("color", Value::color(0.0, 0.0, 0.0, 1.0)),
            ],
            BuiltinKind::Image => vec![
                ("sprite", Value::Null),
                ("color", Value::color(1.0, 1.0, 1.0, 1.0)),
                ("fillAmount", Value::Float(1.0)),
            ],
            BuiltinKind::SpriteRenderer => vec![
                ("sprite", Value::Null),
                ("color", Value::color(1.0, 1.0, 1.0, 1.0)),
                ("flipX", Value::Bool(false)),
                ("flipY", Value::Bool(false)),
                ("sortingOrder", Value::Int(0)),
            ],
        };
        fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
    }
}

// ── Component ─────────────────────────────────────────────────────────────────

/// A component instance created by [`TypeRegistry::create_component`].
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Fixed schema: only the fields of `kind` can be read or written.
    Builtin {
        kind: BuiltinKind,
        fields: BTreeMap<String, Value>,
    },
    /// Open property bag for a script-defined type.
    Custom {
        type_name: String,
        properties: BTreeMap<String, Value>,
    },
}

impl Component {
    pub fn builtin(kind: BuiltinKind) -> Self {
        Component::Builtin { kind, fields: kind.default_fields() }
    }

    pub fn custom(type_name: impl Into<String>, properties: BTreeMap<String, Value>) -> Self {
        Component::Custom { type_name: type_name.into(), properties }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Component::Builtin { kind, .. } => kind.name(),
            Component::Custom { type_name, .. } => type_name,
        }
    }

    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.fields().get(prop)
    }

    /// Write a property.  Builtins reject names outside their schema;
    /// custom components accept any name.
    pub fn set(&mut self, prop: &str, value: Value) -> Result<(), ScriptError> {
        match self {
            Component::Builtin { kind, fields } => match fields.get_mut(prop) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(ScriptError::argument(format!(
                    "{} has no field '{prop}'",
                    kind.name()
                ))),
            },
            Component::Custom { properties, .. } => {
                properties.insert(prop.to_owned(), value);
                Ok(())
            }
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        match self {
            Component::Builtin { fields, .. } => fields,
            Component::Custom { properties, .. } => properties,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())?;
        let fields = self.fields();
        if fields.is_empty() {
            return Ok(());
        }
        f.write_str(" {")?;
        for (i, (k, v)) in fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {k}: {v}")?;
        }
        f.write_str(" }")
    }
}

// ── Registry records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub name: String,
    pub parent: Option<String>,
    /// Declared interfaces, in declaration order, without duplicates.
    pub interfaces: Vec<String>,
    pub defaults: BTreeMap<String, Value>,
    pub builtin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub parents: Vec<String>,
}

// ── TypeRegistry ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct TypeRegistry {
    types: HashMap<String, TypeInfo>,
    interfaces: HashMap<String, InterfaceInfo>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry holding only the builtin types.
    pub fn new() -> Self {
        let mut reg = TypeRegistry { types: HashMap::new(), interfaces: HashMap::new() };
        for &kind in BuiltinKind::ALL {
            let parent = (kind != BuiltinKind::Component).then(|| ROOT_TYPE.to_owned());
            reg.types.insert(
                kind.name().to_owned(),
                TypeInfo {
                    name: kind.name().to_owned(),
                    parent,
                    interfaces: Vec::new(),
                    defaults: kind.default_fields(),
                    builtin: true,
                },
            );
        }
        reg
    }

    /// Wrap a fresh registry for sharing.
    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(TypeRegistry::new()))
    }

    // ── Registration ──────────────────────────────────────────────────────────

    pub fn register_interface(&mut self, name: &str, parents: &[String]) -> Result<(), ScriptError> {
        self.check_new_name(name)?;
        for p in parents {
            if !self.interfaces.contains_key(p) {
                return Err(ScriptError::registration(format!(
                    "interface '{name}': parent interface '{p}' is not registered"
                )));
            }
        }
        let info = InterfaceInfo { name: name.to_owned(), parents: dedup(parents) };
        debug!(interface = name, parents = ?info.parents, "registered interface");
        self.interfaces.insert(name.to_owned(), info);
        Ok(())
    }

    pub fn register_type(
        &mut self,
        name: &str,
        parent: Option<&str>,
        interfaces: &[String],
    ) -> Result<(), ScriptError> {
        self.check_new_name(name)?;
        if let Some(p) = parent {
            if !self.types.contains_key(p) {
                return Err(ScriptError::registration(format!(
                    "type '{name}': parent type '{p}' is not registered"
                )));
            }
        }
        for i in interfaces {
            if !self.interfaces.contains_key(i) {
                return Err(ScriptError::registration(format!(
                    "type '{name}': interface '{i}' is not registered"
                )));
            }
        }
        let info = TypeInfo {
            name: name.to_owned(),
            parent: parent.map(str::to_owned),
            interfaces: dedup(interfaces),
            defaults: BTreeMap::new(),
            builtin: false,
        };
        debug!(ty = name, parent = ?info.parent, interfaces = ?info.interfaces, "registered type");
        self.types.insert(name.to_owned(), info);
        Ok(())
    }

    pub fn define_property(&mut self, ty: &str, prop: &str, default: Value) -> Result<(), ScriptError> {
        if prop.is_empty() {
            return Err(ScriptError::registration("property name cannot be empty"));
        }
        let info = self
            .types
            .get_mut(ty)
            .ok_or_else(|| ScriptError::registration(format!("unknown type '{ty}'")))?;
        if info.builtin {
            return Err(ScriptError::registration(format!(
                "cannot define properties on builtin type '{ty}'"
            )));
        }
        debug!(ty, prop, default = %default, "defined property");
        info.defaults.insert(prop.to_owned(), default);
        Ok(())
    }

    /// Declare that `ty` implements `iface`.  Declaring it twice is a no-op.
    pub fn add_interface_to_type(&mut self, ty: &str, iface: &str) -> Result<(), ScriptError> {
        if !self.interfaces.contains_key(iface) {
            return Err(ScriptError::registration(format!("unknown interface '{iface}'")));
        }
        let info = self
            .types
            .get_mut(ty)
            .ok_or_else(|| ScriptError::registration(format!("unknown type '{ty}'")))?;
        if !info.interfaces.iter().any(|i| i == iface) {
            info.interfaces.push(iface.to_owned());
        }
        Ok(())
    }

    fn check_new_name(&self, name: &str) -> Result<(), ScriptError> {
        if name.is_empty() {
            return Err(ScriptError::registration("name cannot be empty"));
        }
        if self.types.contains_key(name) {
            return Err(ScriptError::registration(format!("'{name}' is already a type")));
        }
        if self.interfaces.contains_key(name) {
            return Err(ScriptError::registration(format!("'{name}' is already an interface")));
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn has_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn type_info(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    pub fn interface_info(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.get(name)
    }

    /// All type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All interface names, sorted.
    pub fn interface_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.interfaces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `true` if `derived == base` or `base` is an ancestor of `derived`.
    pub fn is_subclass_of(&self, derived: &str, base: &str) -> bool {
        if derived == base {
            return true;
        }
        let mut cur = self.types.get(derived).and_then(|t| t.parent.as_deref());
        while let Some(name) = cur {
            if name == base {
                return true;
            }
            cur = self.types.get(name).and_then(|t| t.parent.as_deref());
        }
        false
    }

    /// `true` if `ty` or any ancestor declares `iface` or an interface that
    /// extends it.
    pub fn implements_interface(&self, ty: &str, iface: &str) -> bool {
        if !self.types.contains_key(ty) || !self.interfaces.contains_key(iface) {
            return false;
        }
        let mut seen = HashSet::new();
        let mut cur = self.types.get(ty);
        while let Some(info) = cur {
            if info.interfaces.iter().any(|i| self.interface_extends(i, iface, &mut seen)) {
                return true;
            }
            cur = info.parent.as_deref().and_then(|p| self.types.get(p));
        }
        false
    }

    /// Depth-first walk over interface parents.  `seen` prunes the shared
    /// ancestors of diamonds.
    fn interface_extends<'a>(&'a self, iface: &'a str, target: &str, seen: &mut HashSet<&'a str>) -> bool {
        if iface == target {
            return true;
        }
        if !seen.insert(iface) {
            return false;
        }
        self.interfaces
            .get(iface)
            .map(|info| info.parents.iter().any(|p| self.interface_extends(p, target, seen)))
            .unwrap_or(false)
    }

    /// Interface targets test implementation; anything else tests subclassing.
    pub fn is_assignable_to(&self, name: &str, target: &str) -> bool {
        if self.interfaces.contains_key(target) {
            self.implements_interface(name, target)
        } else {
            self.is_subclass_of(name, target)
        }
    }

    // ── Factory ───────────────────────────────────────────────────────────────

    pub fn create_component(&self, ty: &str) -> Result<Component, ScriptError> {
        let info = self
            .types
            .get(ty)
            .ok_or_else(|| ScriptError::argument(format!("unknown type '{ty}'")))?;
        match BuiltinKind::from_name(ty).filter(|_| info.builtin) {
            Some(kind) => Ok(Component::builtin(kind)),
            None => Ok(Component::custom(ty, info.defaults.clone())),
        }
    }
}

fn dedup(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for n in names {
        if !out.contains(n) {
            out.push(n.clone());
        }
    }
    out
}

// ── Process-scoped registry ───────────────────────────────────────────────────

static GLOBAL_REGISTRY: OnceLock<SharedRegistry> = OnceLock::new();

/// The process-wide registry, created on first use.
///
/// Concurrent first callers all observe the same instance.  Hosts that want
/// isolation create their own with [`TypeRegistry::shared`] instead.
pub fn global_registry() -> &'static SharedRegistry {
    GLOBAL_REGISTRY.get_or_init(TypeRegistry::shared)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn diamond() -> TypeRegistry {
        let mut reg = TypeRegistry::new();
        reg.register_interface("Movable", &[]).unwrap();
        reg.register_interface("Colorable", &[]).unwrap();
        reg.register_interface("ColorMovable", &names(&["Movable", "Colorable"])).unwrap();
        reg.register_type("Enemy", Some("Component"), &names(&["ColorMovable"])).unwrap();
        reg.register_type("Boss", Some("Enemy"), &[]).unwrap();
        reg
    }

    // -- builtins ---------------------------------------------------------------

    #[test]
    fn builtins_registered() {
        let reg = TypeRegistry::new();
        for name in ["Component", "Text", "Image", "SpriteRenderer"] {
            assert!(reg.has_type(name), "{name}");
            assert!(reg.type_info(name).unwrap().builtin);
        }
        assert_eq!(reg.type_info("Component").unwrap().parent, None);
        assert_eq!(reg.type_info("Text").unwrap().parent.as_deref(), Some("Component"));
        assert!(reg.is_subclass_of("SpriteRenderer", "Component"));
    }

    #[test]
    fn builtin_rejects_define_property() {
        let mut reg = TypeRegistry::new();
        let err = reg.define_property("Text", "extra", Value::Int(1)).unwrap_err();
        assert!(matches!(err, ScriptError::TypeRegistration(_)));
    }

    #[test]
    fn builtin_component_schema() {
        let reg = TypeRegistry::new();
        let mut text = reg.create_component("Text").unwrap();
        assert_eq!(text.get("fontSize"), Some(&Value::Int(14)));
        text.set("text", Value::Str("hi".into())).unwrap();
        assert_eq!(text.get("text"), Some(&Value::Str("hi".into())));
        assert!(text.set("bogus", Value::Null).is_err());
        let root = reg.create_component("Component").unwrap();
        assert!(root.fields().is_empty());
    }

    // -- registration -----------------------------------------------------------

    #[test]
    fn unknown_parent_leaves_no_state() {
        let mut reg = TypeRegistry::new();
        assert!(reg.register_type("Orphan", Some("Missing"), &[]).is_err());
        assert!(!reg.has_type("Orphan"));
        assert!(reg.register_type("Orphan", None, &names(&["IMissing"])).is_err());
        assert!(!reg.has_type("Orphan"));
        assert!(reg.register_interface("IOrphan", &names(&["IMissing"])).is_err());
        assert!(!reg.has_interface("IOrphan"));
    }

    #[test]
    fn duplicate_and_colliding_names() {
        let mut reg = diamond();
        assert!(reg.register_type("Enemy", None, &[]).is_err());
        assert!(reg.register_interface("Movable", &[]).is_err());
        assert!(reg.register_type("Movable", None, &[]).is_err());
        assert!(reg.register_interface("Enemy", &[]).is_err());
        assert!(reg.register_type("", None, &[]).is_err());
        assert!(reg.register_interface("", &[]).is_err());
    }

    #[test]
    fn add_interface_is_idempotent() {
        let mut reg = TypeRegistry::new();
        reg.register_interface("IDamageable", &[]).unwrap();
        reg.register_type("Crate", Some("Component"), &[]).unwrap();
        reg.add_interface_to_type("Crate", "IDamageable").unwrap();
        reg.add_interface_to_type("Crate", "IDamageable").unwrap();
        assert_eq!(reg.type_info("Crate").unwrap().interfaces, names(&["IDamageable"]));
        assert!(reg.add_interface_to_type("Crate", "INope").is_err());
        assert!(reg.add_interface_to_type("Nope", "IDamageable").is_err());
    }

    // -- queries ----------------------------------------------------------------

    #[test]
    fn subclass_reflexive_and_transitive() {
        let reg = diamond();
        assert!(reg.is_subclass_of("Enemy", "Enemy"));
        assert!(reg.is_subclass_of("Boss", "Enemy"));
        assert!(reg.is_subclass_of("Boss", "Component"));
        assert!(!reg.is_subclass_of("Enemy", "Boss"));
        assert!(!reg.is_subclass_of("Text", "Enemy"));
        assert!(!reg.is_subclass_of("Nope", "Component"));
    }

    #[test]
    fn diamond_interfaces() {
        let reg = diamond();
        assert!(reg.implements_interface("Enemy", "ColorMovable"));
        assert!(reg.implements_interface("Enemy", "Movable"));
        assert!(reg.implements_interface("Enemy", "Colorable"));
        // inherited through the parent type
        assert!(reg.implements_interface("Boss", "Movable"));
        assert!(!reg.implements_interface("Text", "Movable"));
        assert!(!reg.implements_interface("Nope", "Movable"));
        assert!(!reg.implements_interface("Enemy", "INope"));
    }

    #[test]
    fn assignability_prefers_interfaces() {
        let reg = diamond();
        assert!(reg.is_assignable_to("Boss", "Colorable"));
        assert!(reg.is_assignable_to("Boss", "Enemy"));
        assert!(!reg.is_assignable_to("Text", "Colorable"));
        assert!(!reg.is_assignable_to("Enemy", "Boss"));
    }

    #[test]
    fn name_listings_sorted() {
        let reg = diamond();
        assert_eq!(reg.interface_names(), vec!["ColorMovable", "Colorable", "Movable"]);
        assert!(reg.type_names().windows(2).all(|w| w[0] <= w[1]));
    }

    // -- factory ----------------------------------------------------------------

    #[test]
    fn defaults_are_not_inherited() {
        let mut reg = diamond();
        reg.define_property("Enemy", "health", Value::Int(100)).unwrap();
        reg.define_property("Boss", "phase", Value::Int(1)).unwrap();
        let enemy = reg.create_component("Enemy").unwrap();
        assert_eq!(enemy.get("health"), Some(&Value::Int(100)));
        let boss = reg.create_component("Boss").unwrap();
        assert_eq!(boss.get("phase"), Some(&Value::Int(1)));
        assert_eq!(boss.get("health"), None);
    }

    #[test]
    fn create_unknown_type_fails() {
        let reg = TypeRegistry::new();
        assert!(matches!(reg.create_component("Ghost"), Err(ScriptError::Argument(_))));
    }

    #[test]
    fn component_display() {
        let mut props = BTreeMap::new();
        props.insert("health".to_string(), Value::Int(100));
        let c = Component::custom("Enemy", props);
        assert_eq!(c.to_string(), "Enemy { health: 100 }");
        assert_eq!(Component::builtin(BuiltinKind::Component).to_string(), "Component");
    }

    #[test]
    fn global_registry_is_one_instance() {
        let seen: Vec<SharedRegistry> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| Arc::clone(global_registry()))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for r in &seen {
            assert!(Arc::ptr_eq(r, &seen[0]));
        }
        assert!(Arc::ptr_eq(global_registry(), &seen[0]));
        assert!(seen[0].read().has_type("Component"));
    }
}
