//! Value types for the Tanager runtime
//!
//! This module defines:
//! - Value: Unified enum for every runtime value the collection layer stores
//!
//! ## Canonical Value Model
//!
//! The Value enum has exactly 8 variants:
//! - Unit, Bool, Int, Float, Char, Str, List, Record
//!
//! ### Type Rules
//!
//! - Different variants are NEVER equal: `Int(1) != Float(1.0)`
//! - No implicit coercions anywhere in the collection layer
//! - Equality is *value identity*, not numeric comparison: floats compare by
//!   bit pattern, so `Float(f64::NAN) == Float(f64::NAN)` and
//!   `Float(-0.0) != Float(0.0)`. This keeps `Eq` and `Hash` lawful so
//!   values can live inside sets and map keys. Numeric `==` in the language
//!   is the arithmetic layer's concern.
//! - `Hash` agrees with equality for every variant
//!
//! ## Rendering
//!
//! `Display` produces the printer form: scalars in their literal notation
//! (strings and chars quoted), lists wrapped in `[` `]`, records flat and
//! unwrapped (see [`Record`]'s own rendering contract).

use crate::chain::ValueChain;
use crate::record::Record;
use im::Vector;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Canonical runtime value for the collection layer
///
/// Compound variants share structure on clone: `List` is a persistent
/// vector and `Record` a persistent record store, so cloning a `Value` is
/// cheap regardless of size.
///
/// ## Type Equality
///
/// Different variants are NEVER equal, even when they look alike:
/// - `Int(1) != Float(1.0)`
/// - `Str("a") != Char('a')`
///
/// Float equality is bitwise (`to_bits`), giving a total equivalence:
/// - `NaN == NaN`
/// - `-0.0 != 0.0`
#[derive(Debug, Clone)]
pub enum Value {
    /// The unit value
    Unit,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754, compared by bits)
    Float(f64),
    /// Unicode scalar value
    Char(char),
    /// UTF-8 string (shared allocation)
    Str(Arc<str>),
    /// Sequence of values
    List(Vector<Value>),
    /// Record store (insertion-ordered, duplicate-key capable)
    Record(Record),
}

// Bitwise float comparison keeps this a total equivalence relation.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            // Different variants are never equal
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Unit => state.write_u8(0),
            Value::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Value::Int(i) => {
                state.write_u8(2);
                i.hash(state);
            }
            Value::Float(x) => {
                state.write_u8(3);
                x.to_bits().hash(state);
            }
            Value::Char(c) => {
                state.write_u8(4);
                c.hash(state);
            }
            Value::Str(s) => {
                state.write_u8(5);
                s.hash(state);
            }
            Value::List(items) => {
                state.write_u8(6);
                items.hash(state);
            }
            Value::Record(rec) => {
                state.write_u8(7);
                rec.hash(state);
            }
        }
    }
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Char(_) => "Char",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Record(_) => "Record",
        }
    }

    /// Check if this is the unit value
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Check if this is a boolean value
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if this is an integer value
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Check if this is a float value
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Check if this is a char value
    pub fn is_char(&self) -> bool {
        matches!(self, Value::Char(_))
    }

    /// Check if this is a string value
    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Check if this is a list value
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Check if this is a record value
    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Get as char if this is a Char value
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Get as &str if this is a Str value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &Vector if this is a List value
    pub fn as_list(&self) -> Option<&Vector<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as &Record if this is a Record value
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(rec) => Some(rec),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            // Records render flat, without delimiters
            Value::Record(rec) => write!(f, "{rec}"),
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x as f64)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s.as_str()))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<Vector<Value>> for Value {
    fn from(items: Vector<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Vector::from(items))
    }
}

impl From<Record> for Value {
    fn from(rec: Record) -> Self {
        Value::Record(rec)
    }
}

// ============================================================================
// serde_json interop for the registry's JSON snapshots and host embedding
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Unit,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    // u64 beyond i64 range degrades to Float
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(Arc::from(s.as_str())),
            serde_json::Value::Array(arr) => {
                Value::List(arr.into_iter().map(Value::from).collect())
            }
            // JSON objects carry unique keys, so every chain is a singleton.
            // serde_json iterates objects in its own key order, which is what
            // the imported record's insertion order becomes.
            serde_json::Value::Object(obj) => {
                let mut rec = Record::new().linear();
                for (k, v) in obj {
                    rec.assoc(&k, Value::from(v));
                }
                Value::Record(rec.forked())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Unit => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            // NaN and infinities have no JSON form and degrade to null
            Value::Float(x) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Char(c) => serde_json::Value::String(c.to_string()),
            Value::Str(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Record(rec) => serde_json::Value::from(rec),
        }
    }
}

impl From<&ValueChain> for serde_json::Value {
    /// A singleton chain exports its head; a longer chain exports the whole
    /// chain as an array, most recent value first.
    fn from(chain: &ValueChain) -> Self {
        if chain.len() == 1 {
            serde_json::Value::from(chain.head())
        } else {
            serde_json::Value::Array(chain.iter().map(serde_json::Value::from).collect())
        }
    }
}

impl From<&Record> for serde_json::Value {
    fn from(rec: &Record) -> Self {
        let mut obj = serde_json::Map::new();
        for (key, chain) in rec.iter() {
            obj.insert(key.as_str().to_string(), serde_json::Value::from(chain));
        }
        serde_json::Value::Object(obj)
    }
}
