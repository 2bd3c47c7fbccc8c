//! Runtime value type for command arguments and operation results.
//!
//! The parser produces every variant except [`Value::Component`], which only
//! operations create (see [`TypeRegistry::create_component`]).
//!
//! [`TypeRegistry::create_component`]: crate::types::TypeRegistry::create_component

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::Component;

/// Shared handle to a component instance.
///
/// Components have reference semantics: storing one in two variables and
/// setting a property through either is visible through both.
///
/// Handles are reference counted, so components that reach each other
/// through their properties form a cycle that outlives every variable
/// holding them. `SFScript.Type.SetProperty` refuses the direct case of a
/// component stored in itself; longer cycles are kept until process exit.
pub type ComponentRef = Arc<Mutex<Component>>;

// ── CompositeKind ─────────────────────────────────────────────────────────────

/// The closed set of constructor-like literals the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// `Vector3(x, y, z)`
    Vector3,
    /// `Color(r, g, b)` or `Color(r, g, b, a)`; alpha defaults to `1.0`.
    Color,
    /// `Bounds(Vector3(..), Vector3(..))`: center and size.
    Bounds,
}

impl CompositeKind {
    pub const ALL: &'static [CompositeKind] =
        &[CompositeKind::Vector3, CompositeKind::Color, CompositeKind::Bounds];

    pub fn name(self) -> &'static str {
        match self {
            CompositeKind::Vector3 => "Vector3",
            CompositeKind::Color => "Color",
            CompositeKind::Bounds => "Bounds",
        }
    }

    /// Look up a kind by its constructor name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Value ─────────────────────────────────────────────────────────────────────

/// A script value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Composite {
        kind: CompositeKind,
        fields: Vec<Value>,
    },
    /// `$name`, replaced by the context's value before dispatch.
    VarRef(String),
    Component(ComponentRef),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (
                Value::Composite { kind: ka, fields: fa },
                Value::Composite { kind: kb, fields: fb },
            ) => ka == kb && fa == fb,
            (Value::VarRef(a), Value::VarRef(b)) => a == b,
            // Identity, not structure: two handles are equal only if they
            // refer to the same instance.
            (Value::Component(a), Value::Component(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => fmt_float(f, *x),
            Value::Str(s) => f.write_str(s),
            Value::Composite { kind, fields } => {
                write!(f, "{kind}(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
            Value::VarRef(name) => write!(f, "${name}"),
            // Already locked means a component reachable from itself.
            Value::Component(c) => match c.try_lock() {
                Some(guard) => write!(f, "{guard}"),
                None => f.write_str("<cycle>"),
            },
        }
    }
}

/// Floats print with at least one decimal so `1.0` never reads as an integer.
fn fmt_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

impl Value {
    /// Build a `Vector3` composite.
    pub fn vector3(x: f64, y: f64, z: f64) -> Self {
        Value::Composite {
            kind: CompositeKind::Vector3,
            fields: vec![Value::Float(x), Value::Float(y), Value::Float(z)],
        }
    }

    /// Build a `Color` composite.
    pub fn color(r: f64, g: f64, b: f64, a: f64) -> Self {
        Value::Composite {
            kind: CompositeKind::Color,
            fields: vec![Value::Float(r), Value::Float(g), Value::Float(b), Value::Float(a)],
        }
    }

    /// Wrap a freshly created component in a shared handle.
    pub fn component(c: Component) -> Self {
        Value::Component(Arc::new(Mutex::new(c)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of `Int`/`Float` (and numeric strings).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Str(s) => s.trim().parse().ok().filter(|x: &f64| x.is_finite()),
            _ => None,
        }
    }

    /// The three fields of a `Vector3` composite.
    pub fn as_vector3(&self) -> Option<[f64; 3]> {
        match self {
            Value::Composite { kind: CompositeKind::Vector3, fields } if fields.len() == 3 => {
                Some([fields[0].as_f64()?, fields[1].as_f64()?, fields[2].as_f64()?])
            }
            _ => None,
        }
    }

    /// The four channels of a `Color` composite.
    pub fn as_color(&self) -> Option<[f64; 4]> {
        match self {
            Value::Composite { kind: CompositeKind::Color, fields } if fields.len() == 4 => Some([
                fields[0].as_f64()?,
                fields[1].as_f64()?,
                fields[2].as_f64()?,
                fields[3].as_f64()?,
            ]),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            Value::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Composite { kind, .. } => kind.name(),
            Value::VarRef(_) => "variable reference",
            Value::Component(_) => "component",
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Component;

    #[test]
    fn display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Str("hello".into()).to_string(), "hello");
    }

    #[test]
    fn display_float() {
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(-2.0).to_string(), "-2.0");
    }

    #[test]
    fn display_composite() {
        assert_eq!(Value::vector3(1.0, -2.5, 0.0).to_string(), "Vector3(1.0, -2.5, 0.0)");
    }

    #[test]
    fn as_f64_coercions() {
        assert_eq!(Value::Int(5).as_f64(), Some(5.0));
        assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Str(" 3 ".into()).as_f64(), Some(3.0));
        assert_eq!(Value::Str("abc".into()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn as_vector3() {
        assert_eq!(Value::vector3(1.0, 2.0, 3.0).as_vector3(), Some([1.0, 2.0, 3.0]));
        assert_eq!(Value::color(1.0, 1.0, 1.0, 1.0).as_vector3(), None);
        assert_eq!(Value::Int(1).as_vector3(), None);
    }

    #[test]
    fn as_color() {
        assert_eq!(Value::color(1.0, 0.5, 0.0, 1.0).as_color(), Some([1.0, 0.5, 0.0, 1.0]));
        assert_eq!(Value::vector3(1.0, 2.0, 3.0).as_color(), None);
    }

    #[test]
    fn component_equality_is_identity() {
        let a = Value::component(Component::custom("Enemy", Default::default()));
        let b = a.clone();
        let c = Value::component(Component::custom("Enemy", Default::default()));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn self_referencing_component_displays() {
        let v = Value::component(Component::custom("Node", Default::default()));
        if let Value::Component(c) = &v {
            c.lock().set("me", v.clone()).unwrap();
        }
        assert_eq!(v.to_string(), "Node { me: <cycle> }");
    }

    #[test]
    fn composite_kind_names() {
        for &k in CompositeKind::ALL {
            assert_eq!(CompositeKind::from_name(k.name()), Some(k));
        }
        assert_eq!(CompositeKind::from_name("vector3"), None);
        assert_eq!(CompositeKind::from_name("Quaternion"), None);
    }

    #[test]
    fn from_impls() {
        let v: Value = 42i64.into();
        assert_eq!(v, Value::Int(42));
        let v: Value = "hi".into();
        assert_eq!(v, Value::Str("hi".into()));
        let v: Value = true.into();
        assert_eq!(v, Value::Bool(true));
    }
}
