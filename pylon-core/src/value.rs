//! Value - Tri-state configuration values
//!
//! Every attribute of a config model is in exactly one of three states:
//! null (explicitly absent), unknown (not resolved until apply), or known
//! with a concrete value. Containers additionally carry the type of their
//! elements so that a null container can still be serialized with its shape.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{MapError, MapResult};

/// Three-valued state of a configuration attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TriState<T> {
    /// Explicitly absent
    #[default]
    Null,
    /// Not yet computed (e.g. known only after apply)
    Unknown,
    /// Concrete value
    Known(T),
}

impl<T> TriState<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, TriState::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TriState::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, TriState::Known(_))
    }

    /// Borrow the known value, if any
    pub fn known(&self) -> Option<&T> {
        match self {
            TriState::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            TriState::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Map the known value, keeping null and unknown as they are
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TriState<U> {
        match self {
            TriState::Null => TriState::Null,
            TriState::Unknown => TriState::Unknown,
            TriState::Known(v) => TriState::Known(f(v)),
        }
    }

    /// Fallible variant of [`TriState::map`]
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<TriState<U>, E> {
        Ok(match self {
            TriState::Null => TriState::Null,
            TriState::Unknown => TriState::Unknown,
            TriState::Known(v) => TriState::Known(f(v)?),
        })
    }

    /// Same state with the payload dropped
    fn shape(&self) -> TriState<()> {
        match self {
            TriState::Null => TriState::Null,
            TriState::Unknown => TriState::Unknown,
            TriState::Known(_) => TriState::Known(()),
        }
    }
}

impl<T> From<T> for TriState<T> {
    fn from(value: T) -> Self {
        TriState::Known(value)
    }
}

impl From<&str> for TriState<String> {
    fn from(value: &str) -> Self {
        TriState::Known(value.to_string())
    }
}

impl<T> TriState<T> {
    /// `None` becomes null
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => TriState::Known(v),
            None => TriState::Null,
        }
    }
}

/// Arbitrary-precision number as carried by the config layer
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// String whose equality ignores case
///
/// Used for fields the cluster normalizes (e.g. `"KRB5"` vs `"krb5"`), so that
/// a difference in case alone is not reported as drift.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseInsensitive(String);

impl CaseInsensitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl PartialEq for CaseInsensitive {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl PartialOrd for CaseInsensitive {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CaseInsensitive {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.to_lowercase().cmp(&other.0.to_lowercase())
    }
}

impl Hash for CaseInsensitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl From<&str> for CaseInsensitive {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CaseInsensitive {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CaseInsensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type StringValue = TriState<String>;
pub type BoolValue = TriState<bool>;
pub type Int64Value = TriState<i64>;
pub type Int32Value = TriState<i32>;
pub type Float64Value = TriState<f64>;
pub type NumberValue = TriState<Number>;
pub type CaseInsensitiveValue = TriState<CaseInsensitive>;

/// Attribute types of an object, keyed by attribute name
pub type ObjectType = BTreeMap<String, AttrType>;

/// Type of a config attribute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttrType {
    String,
    Bool,
    Int64,
    Int32,
    Float64,
    Number,
    CaseInsensitiveString,
    List(Box<AttrType>),
    Set(Box<AttrType>),
    Object(ObjectType),
    /// Element type of a zero-valued container that has not been typed yet
    #[default]
    Missing,
}

impl AttrType {
    pub fn list(elem: AttrType) -> Self {
        AttrType::List(Box::new(elem))
    }

    pub fn set(elem: AttrType) -> Self {
        AttrType::Set(Box::new(elem))
    }

    /// Whether a value of type `other` may stand where `self` is expected.
    /// `Missing` is compatible with every type.
    pub fn accepts(&self, other: &AttrType) -> bool {
        match (self, other) {
            (AttrType::Missing, _) | (_, AttrType::Missing) => true,
            (AttrType::List(a), AttrType::List(b)) | (AttrType::Set(a), AttrType::Set(b)) => {
                a.accepts(b)
            }
            (AttrType::Object(a), AttrType::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(name, t)| b.get(name).is_some_and(|u| t.accepts(u)))
            }
            (a, b) => a == b,
        }
    }

    /// Short kind name, without element types
    pub fn kind(&self) -> &'static str {
        match self {
            AttrType::String => "String",
            AttrType::Bool => "Bool",
            AttrType::Int64 => "Int64",
            AttrType::Int32 => "Int32",
            AttrType::Float64 => "Float64",
            AttrType::Number => "Number",
            AttrType::CaseInsensitiveString => "CaseInsensitiveString",
            AttrType::List(_) => "List",
            AttrType::Set(_) => "Set",
            AttrType::Object(_) => "Object",
            AttrType::Missing => "Missing",
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::List(inner) => write!(f, "List<{}>", inner),
            AttrType::Set(inner) => write!(f, "Set<{}>", inner),
            AttrType::Object(attrs) => {
                write!(f, "Object{{")?;
                for (i, (name, t)) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, t)?;
                }
                write!(f, "}}")
            }
            other => f.write_str(other.kind()),
        }
    }
}

/// Ordered list of tri-state values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListValue {
    elem_type: AttrType,
    state: TriState<Vec<AttrValue>>,
}

impl ListValue {
    pub fn null(elem_type: AttrType) -> Self {
        Self {
            elem_type,
            state: TriState::Null,
        }
    }

    pub fn unknown(elem_type: AttrType) -> Self {
        Self {
            elem_type,
            state: TriState::Unknown,
        }
    }

    /// Known list; every element must fit `elem_type`
    pub fn known(elem_type: AttrType, elements: Vec<AttrValue>) -> MapResult<Self> {
        check_elements("List", &elem_type, &elements)?;
        Ok(Self {
            elem_type,
            state: TriState::Known(elements),
        })
    }

    pub fn elem_type(&self) -> &AttrType {
        &self.elem_type
    }

    pub fn state(&self) -> &TriState<Vec<AttrValue>> {
        &self.state
    }

    /// Elements of a known list
    pub fn elements(&self) -> Option<&[AttrValue]> {
        self.state.known().map(Vec::as_slice)
    }

    pub fn is_null(&self) -> bool {
        self.state.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.state.is_unknown()
    }

    pub fn is_known(&self) -> bool {
        self.state.is_known()
    }

    pub(crate) fn into_parts(self) -> (AttrType, TriState<Vec<AttrValue>>) {
        (self.elem_type, self.state)
    }

    /// Assemble without checking element types
    pub(crate) fn from_parts(elem_type: AttrType, state: TriState<Vec<AttrValue>>) -> Self {
        Self { elem_type, state }
    }
}

/// Unordered, deduplicated collection of tri-state values
#[derive(Debug, Clone, Default)]
pub struct SetValue {
    elem_type: AttrType,
    state: TriState<Vec<AttrValue>>,
}

impl SetValue {
    pub fn null(elem_type: AttrType) -> Self {
        Self {
            elem_type,
            state: TriState::Null,
        }
    }

    pub fn unknown(elem_type: AttrType) -> Self {
        Self {
            elem_type,
            state: TriState::Unknown,
        }
    }

    /// Known set; duplicate elements are dropped, keeping the first occurrence
    pub fn known(elem_type: AttrType, elements: Vec<AttrValue>) -> MapResult<Self> {
        check_elements("Set", &elem_type, &elements)?;
        Ok(Self::from_parts(elem_type, TriState::Known(elements)))
    }

    /// Assemble without checking element types; duplicates are still dropped
    pub(crate) fn from_parts(elem_type: AttrType, state: TriState<Vec<AttrValue>>) -> Self {
        let state = state.map(|elements| {
            let mut unique: Vec<AttrValue> = Vec::with_capacity(elements.len());
            for element in elements {
                if !unique.contains(&element) {
                    unique.push(element);
                }
            }
            unique
        });
        Self { elem_type, state }
    }

    pub fn elem_type(&self) -> &AttrType {
        &self.elem_type
    }

    pub fn state(&self) -> &TriState<Vec<AttrValue>> {
        &self.state
    }

    pub fn elements(&self) -> Option<&[AttrValue]> {
        self.state.known().map(Vec::as_slice)
    }

    pub fn contains(&self, value: &AttrValue) -> bool {
        self.elements().is_some_and(|e| e.contains(value))
    }

    pub fn is_null(&self) -> bool {
        self.state.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.state.is_unknown()
    }

    pub fn is_known(&self) -> bool {
        self.state.is_known()
    }

    pub(crate) fn into_parts(self) -> (AttrType, TriState<Vec<AttrValue>>) {
        (self.elem_type, self.state)
    }
}

impl PartialEq for SetValue {
    fn eq(&self, other: &Self) -> bool {
        if self.elem_type != other.elem_type {
            return false;
        }
        match (&self.state, &other.state) {
            (TriState::Known(a), TriState::Known(b)) => {
                a.len() == b.len() && a.iter().all(|v| b.contains(v))
            }
            (a, b) => a.shape() == b.shape(),
        }
    }
}

/// Named-attribute aggregate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectValue {
    attr_types: ObjectType,
    state: TriState<BTreeMap<String, AttrValue>>,
}

impl ObjectValue {
    pub fn null(attr_types: ObjectType) -> Self {
        Self {
            attr_types,
            state: TriState::Null,
        }
    }

    pub fn unknown(attr_types: ObjectType) -> Self {
        Self {
            attr_types,
            state: TriState::Unknown,
        }
    }

    /// Known object; attributes must match `attr_types` one to one
    pub fn known(
        attr_types: ObjectType,
        attributes: BTreeMap<String, AttrValue>,
    ) -> MapResult<Self> {
        for (name, value) in &attributes {
            match attr_types.get(name) {
                Some(t) if t.accepts(&value.attr_type()) => {}
                Some(t) => {
                    return Err(MapError::InvalidValue {
                        path: String::new(),
                        message: format!(
                            "attribute '{}' has type {}, expected {}",
                            name,
                            value.attr_type(),
                            t
                        ),
                    });
                }
                None => {
                    return Err(MapError::InvalidValue {
                        path: String::new(),
                        message: format!("object type has no attribute '{}'", name),
                    });
                }
            }
        }
        if let Some(missing) = attr_types.keys().find(|k| !attributes.contains_key(*k)) {
            return Err(MapError::InvalidValue {
                path: String::new(),
                message: format!("object is missing attribute '{}'", missing),
            });
        }
        Ok(Self {
            attr_types,
            state: TriState::Known(attributes),
        })
    }

    pub fn attr_types(&self) -> &ObjectType {
        &self.attr_types
    }

    pub fn state(&self) -> &TriState<BTreeMap<String, AttrValue>> {
        &self.state
    }

    pub fn attributes(&self) -> Option<&BTreeMap<String, AttrValue>> {
        self.state.known()
    }

    /// Look up a single attribute of a known object
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes().and_then(|a| a.get(name))
    }

    pub fn is_null(&self) -> bool {
        self.state.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.state.is_unknown()
    }

    pub fn is_known(&self) -> bool {
        self.state.is_known()
    }

    pub(crate) fn into_parts(self) -> (ObjectType, TriState<BTreeMap<String, AttrValue>>) {
        (self.attr_types, self.state)
    }

    pub(crate) fn from_parts(
        attr_types: ObjectType,
        state: TriState<BTreeMap<String, AttrValue>>,
    ) -> Self {
        Self { attr_types, state }
    }
}

fn check_elements(container: &str, elem_type: &AttrType, elements: &[AttrValue]) -> MapResult<()> {
    for (i, element) in elements.iter().enumerate() {
        let actual = element.attr_type();
        if !elem_type.accepts(&actual) {
            return Err(MapError::InvalidValue {
                path: String::new(),
                message: format!(
                    "{} element {} has type {}, expected {}",
                    container, i, actual, elem_type
                ),
            });
        }
    }
    Ok(())
}

/// Dynamic tri-state config value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(StringValue),
    Bool(BoolValue),
    Int64(Int64Value),
    Int32(Int32Value),
    Float64(Float64Value),
    Number(NumberValue),
    CaseInsensitiveString(CaseInsensitiveValue),
    List(ListValue),
    Set(SetValue),
    Object(ObjectValue),
}

impl AttrValue {
    /// Type of this value, including element and attribute types
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::String(_) => AttrType::String,
            AttrValue::Bool(_) => AttrType::Bool,
            AttrValue::Int64(_) => AttrType::Int64,
            AttrValue::Int32(_) => AttrType::Int32,
            AttrValue::Float64(_) => AttrType::Float64,
            AttrValue::Number(_) => AttrType::Number,
            AttrValue::CaseInsensitiveString(_) => AttrType::CaseInsensitiveString,
            AttrValue::List(l) => AttrType::list(l.elem_type.clone()),
            AttrValue::Set(s) => AttrType::set(s.elem_type.clone()),
            AttrValue::Object(o) => AttrType::Object(o.attr_types.clone()),
        }
    }

    /// Null value of the given type
    pub fn null(ty: &AttrType) -> MapResult<Self> {
        Self::with_state(ty, false)
    }

    /// Unknown value of the given type
    pub fn unknown(ty: &AttrType) -> MapResult<Self> {
        Self::with_state(ty, true)
    }

    fn with_state(ty: &AttrType, unknown: bool) -> MapResult<Self> {
        fn state<T>(unknown: bool) -> TriState<T> {
            if unknown {
                TriState::Unknown
            } else {
                TriState::Null
            }
        }
        Ok(match ty {
            AttrType::String => AttrValue::String(state(unknown)),
            AttrType::Bool => AttrValue::Bool(state(unknown)),
            AttrType::Int64 => AttrValue::Int64(state(unknown)),
            AttrType::Int32 => AttrValue::Int32(state(unknown)),
            AttrType::Float64 => AttrValue::Float64(state(unknown)),
            AttrType::Number => AttrValue::Number(state(unknown)),
            AttrType::CaseInsensitiveString => AttrValue::CaseInsensitiveString(state(unknown)),
            AttrType::List(elem) => AttrValue::List(ListValue {
                elem_type: (**elem).clone(),
                state: state(unknown),
            }),
            AttrType::Set(elem) => AttrValue::Set(SetValue {
                elem_type: (**elem).clone(),
                state: state(unknown),
            }),
            AttrType::Object(attrs) => AttrValue::Object(ObjectValue {
                attr_types: attrs.clone(),
                state: state(unknown),
            }),
            AttrType::Missing => {
                return Err(MapError::MissingType {
                    path: String::new(),
                    container: "value",
                });
            }
        })
    }

    fn state_shape(&self) -> TriState<()> {
        match self {
            AttrValue::String(v) => v.shape(),
            AttrValue::Bool(v) => v.shape(),
            AttrValue::Int64(v) => v.shape(),
            AttrValue::Int32(v) => v.shape(),
            AttrValue::Float64(v) => v.shape(),
            AttrValue::Number(v) => v.shape(),
            AttrValue::CaseInsensitiveString(v) => v.shape(),
            AttrValue::List(v) => v.state.shape(),
            AttrValue::Set(v) => v.state.shape(),
            AttrValue::Object(v) => v.state.shape(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.state_shape().is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.state_shape().is_unknown()
    }

    pub fn is_known(&self) -> bool {
        self.state_shape().is_known()
    }

    /// Render this value as JSON state; fails on unknown values
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.into())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(TriState::Known(value))
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(TriState::Known(value))
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int64(TriState::Known(value))
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int32(TriState::Known(value))
    }
}

fn serialize_state<S, T>(state: &TriState<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match state {
        TriState::Null => serializer.serialize_none(),
        TriState::Unknown => Err(S::Error::custom(
            "unknown values cannot be written to state",
        )),
        TriState::Known(v) => v.serialize(serializer),
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::String(v) => serialize_state(v, serializer),
            AttrValue::Bool(v) => serialize_state(v, serializer),
            AttrValue::Int64(v) => serialize_state(v, serializer),
            AttrValue::Int32(v) => serialize_state(v, serializer),
            AttrValue::Float64(v) => serialize_state(v, serializer),
            AttrValue::Number(v) => serialize_state(v, serializer),
            AttrValue::CaseInsensitiveString(v) => serialize_state(v, serializer),
            AttrValue::List(ListValue { state, .. }) | AttrValue::Set(SetValue { state, .. }) => {
                match state {
                    TriState::Known(elements) => {
                        let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                        for element in elements {
                            seq.serialize_element(element)?;
                        }
                        seq.end()
                    }
                    other => serialize_state(&other.shape(), serializer),
                }
            }
            AttrValue::Object(ObjectValue { state, .. }) => match state {
                TriState::Known(attributes) => {
                    let mut map = serializer.serialize_map(Some(attributes.len()))?;
                    for (name, value) in attributes {
                        map.serialize_entry(name, value)?;
                    }
                    map.end()
                }
                other => serialize_state(&other.shape(), serializer),
            },
        }
    }
}
