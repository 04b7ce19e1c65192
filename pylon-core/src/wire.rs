//! Wire - REST request/response models
//!
//! Wire models are plain structs matching an API payload. Optional fields are
//! `Option<T>` (the nil pointer of the payload), present slices are `Vec<T>`
//! (wrap in `Option` when the payload distinguishes a missing slice from an
//! empty one), and [`Nullable<T>`] distinguishes an explicit `null` from an
//! absent field.
//!
//! The [`wire_model!`](crate::wire_model) macro describes a struct's tagged
//! fields so that the projections can walk it without per-type code.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MapError, MapResult};
use crate::tag::TagIndex;
use crate::value::{CaseInsensitive, ObjectType};

/// Dynamic snapshot of a wire value
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Field not present in the payload
    Absent,
    /// Field explicitly transmitted as `null`
    Null,
    String(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    List(Vec<WireValue>),
    /// Struct fields as (tag, value), in declaration order
    Struct(Vec<(String, WireValue)>),
}

impl WireValue {
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Absent => "absent",
            WireValue::Null => "null",
            WireValue::String(_) => "string",
            WireValue::Bool(_) => "bool",
            WireValue::Int(_) => "integer",
            WireValue::UInt(_) => "unsigned integer",
            WireValue::Float(_) => "float",
            WireValue::List(_) => "list",
            WireValue::Struct(_) => "struct",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, WireValue::Absent)
    }

    /// Look up a struct entry by tag
    pub fn get(&self, tag: &str) -> Option<&WireValue> {
        match self {
            WireValue::Struct(entries) => entries.iter().find(|(t, _)| t == tag).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Declared field of a wire struct
#[derive(Debug, Clone, PartialEq)]
pub struct WireFieldSpec {
    /// Tag with modifiers stripped
    pub tag: &'static str,
    pub ty: WireType,
}

/// Declared shape of a wire struct
///
/// Field specs and attribute types are reached through function pointers and
/// built on first use, so describing a recursive type does not recurse.
#[derive(Clone, Copy)]
pub struct StructType {
    name: &'static str,
    fields: fn() -> &'static [WireFieldSpec],
    attr_types: fn() -> &'static ObjectType,
}

impl StructType {
    pub fn new(
        name: &'static str,
        fields: fn() -> &'static [WireFieldSpec],
        attr_types: fn() -> &'static ObjectType,
    ) -> Self {
        Self {
            name,
            fields,
            attr_types,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [WireFieldSpec] {
        (self.fields)()
    }

    /// Config attribute type of every field, keyed by tag
    pub fn attr_types(&self) -> &'static ObjectType {
        (self.attr_types)()
    }

    /// Declared type of the field tagged `tag`
    pub fn field(&self, tag: &str) -> Option<&'static WireType> {
        self.fields().iter().find(|f| f.tag == tag).map(|f| &f.ty)
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructType({})", self.name)
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Declared type of a wire field
#[derive(Debug, Clone, PartialEq)]
pub enum WireType {
    String,
    Bool,
    Int { bits: u8 },
    UInt { bits: u8 },
    Float { bits: u8 },
    /// String compared without regard to case
    CaseInsensitive,
    /// Value that may be explicitly `null`
    Nullable(Box<WireType>),
    /// Pointer: may be absent
    Optional(Box<WireType>),
    List(Box<WireType>),
    Struct(StructType),
}

impl WireType {
    /// Type with pointer and nullable wrappers removed
    pub fn base(&self) -> &WireType {
        match self {
            WireType::Optional(inner) | WireType::Nullable(inner) => inner.base(),
            other => other,
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.base(), WireType::Struct(_))
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::String => f.write_str("string"),
            WireType::Bool => f.write_str("bool"),
            WireType::Int { bits } => write!(f, "i{}", bits),
            WireType::UInt { bits } => write!(f, "u{}", bits),
            WireType::Float { bits } => write!(f, "f{}", bits),
            WireType::CaseInsensitive => f.write_str("case-insensitive string"),
            WireType::Nullable(inner) => write!(f, "Nullable<{}>", inner),
            WireType::Optional(inner) => write!(f, "Option<{}>", inner),
            WireType::List(inner) => write!(f, "Vec<{}>", inner),
            WireType::Struct(st) => f.write_str(st.name),
        }
    }
}

/// A value that can appear in a wire model
///
/// Object safe apart from [`Wire::wire_type`], so projections can hold
/// fields as `&dyn Wire`.
pub trait Wire {
    /// Declared type of this Rust type
    fn wire_type() -> WireType
    where
        Self: Sized;

    /// Declared type, reachable through a trait object
    fn declared_type(&self) -> WireType;

    /// Snapshot of the current value
    fn to_wire(&self) -> WireValue;

    /// Overwrite with `value`. Writing `Absent` or `Null` into a field that
    /// cannot represent them leaves the field unchanged.
    fn write_wire(&mut self, value: WireValue) -> MapResult<()>;
}

fn unexpected(expected: &str, value: &WireValue) -> MapError {
    match value {
        WireValue::List(_) | WireValue::Struct(_) => MapError::Shape {
            path: String::new(),
            expected: expected.to_string(),
            found: value.kind().to_string(),
        },
        _ => MapError::TypeMismatch {
            path: String::new(),
            expected: expected.to_string(),
            found: value.kind().to_string(),
        },
    }
}

fn overflow(value: impl fmt::Display, target: &'static str) -> MapError {
    MapError::Overflow {
        path: String::new(),
        value: value.to_string(),
        target,
    }
}

impl Wire for String {
    fn wire_type() -> WireType {
        WireType::String
    }

    fn declared_type(&self) -> WireType {
        WireType::String
    }

    fn to_wire(&self) -> WireValue {
        WireValue::String(self.clone())
    }

    fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
        match value {
            WireValue::String(s) => *self = s,
            WireValue::Absent | WireValue::Null => {}
            other => return Err(unexpected("string", &other)),
        }
        Ok(())
    }
}

impl Wire for CaseInsensitive {
    fn wire_type() -> WireType {
        WireType::CaseInsensitive
    }

    fn declared_type(&self) -> WireType {
        WireType::CaseInsensitive
    }

    fn to_wire(&self) -> WireValue {
        WireValue::String(self.as_str().to_string())
    }

    fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
        match value {
            WireValue::String(s) => *self = CaseInsensitive::new(s),
            WireValue::Absent | WireValue::Null => {}
            other => return Err(unexpected("string", &other)),
        }
        Ok(())
    }
}

impl Wire for bool {
    fn wire_type() -> WireType {
        WireType::Bool
    }

    fn declared_type(&self) -> WireType {
        WireType::Bool
    }

    fn to_wire(&self) -> WireValue {
        WireValue::Bool(*self)
    }

    fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
        match value {
            WireValue::Bool(b) => *self = b,
            WireValue::Absent | WireValue::Null => {}
            other => return Err(unexpected("bool", &other)),
        }
        Ok(())
    }
}

macro_rules! impl_wire_int {
    ($($t:ty => $variant:ident($bits:expr) via $wide:ty),* $(,)?) => {
        $(
            impl Wire for $t {
                fn wire_type() -> WireType {
                    WireType::$variant { bits: $bits }
                }

                fn declared_type(&self) -> WireType {
                    WireType::$variant { bits: $bits }
                }

                fn to_wire(&self) -> WireValue {
                    WireValue::$variant(<$wide>::from(*self))
                }

                fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
                    match value {
                        WireValue::Int(v) => {
                            *self = <$t>::try_from(v).map_err(|_| overflow(v, stringify!($t)))?;
                        }
                        WireValue::UInt(v) => {
                            *self = <$t>::try_from(v).map_err(|_| overflow(v, stringify!($t)))?;
                        }
                        WireValue::Absent | WireValue::Null => {}
                        other => return Err(unexpected(stringify!($t), &other)),
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_wire_int!(
    i8 => Int(8) via i64,
    i16 => Int(16) via i64,
    i32 => Int(32) via i64,
    i64 => Int(64) via i64,
    u8 => UInt(8) via u64,
    u16 => UInt(16) via u64,
    u32 => UInt(32) via u64,
    u64 => UInt(64) via u64,
);

macro_rules! impl_wire_float {
    ($($t:ty => $bits:expr),* $(,)?) => {
        $(
            impl Wire for $t {
                fn wire_type() -> WireType {
                    WireType::Float { bits: $bits }
                }

                fn declared_type(&self) -> WireType {
                    WireType::Float { bits: $bits }
                }

                fn to_wire(&self) -> WireValue {
                    WireValue::Float(f64::from(*self))
                }

                /// Values the float cannot hold are an overflow: a finite
                /// value that would become infinite, or an integer that
                /// would lose precision
                fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
                    match value {
                        WireValue::Float(v) => {
                            let x = v as $t;
                            if v.is_finite() && !x.is_finite() {
                                return Err(overflow(v, stringify!($t)));
                            }
                            *self = x;
                        }
                        WireValue::Int(v) => {
                            let x = v as $t;
                            if x as i128 != i128::from(v) {
                                return Err(overflow(v, stringify!($t)));
                            }
                            *self = x;
                        }
                        WireValue::UInt(v) => {
                            let x = v as $t;
                            if x as i128 != i128::from(v) {
                                return Err(overflow(v, stringify!($t)));
                            }
                            *self = x;
                        }
                        WireValue::Absent | WireValue::Null => {}
                        other => return Err(unexpected(stringify!($t), &other)),
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_wire_float!(f32 => 32, f64 => 64);

impl<T: Wire + Default> Wire for Option<T> {
    fn wire_type() -> WireType {
        WireType::Optional(Box::new(T::wire_type()))
    }

    fn declared_type(&self) -> WireType {
        Self::wire_type()
    }

    fn to_wire(&self) -> WireValue {
        match self {
            Some(v) => v.to_wire(),
            None => WireValue::Absent,
        }
    }

    /// Allocates on first write; an existing value is patched in place
    fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
        match value {
            WireValue::Absent | WireValue::Null => {
                *self = None;
                Ok(())
            }
            other => self.get_or_insert_with(T::default).write_wire(other),
        }
    }
}

impl<T: Wire + Default> Wire for Box<T> {
    fn wire_type() -> WireType {
        T::wire_type()
    }

    fn declared_type(&self) -> WireType {
        T::wire_type()
    }

    fn to_wire(&self) -> WireValue {
        (**self).to_wire()
    }

    fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
        (**self).write_wire(value)
    }
}

impl<T: Wire + Default> Wire for Vec<T> {
    fn wire_type() -> WireType {
        WireType::List(Box::new(T::wire_type()))
    }

    fn declared_type(&self) -> WireType {
        Self::wire_type()
    }

    fn to_wire(&self) -> WireValue {
        WireValue::List(self.iter().map(Wire::to_wire).collect())
    }

    /// Replaces the whole slice; absent elements stay at their zero value
    fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
        match value {
            WireValue::List(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    let mut element = T::default();
                    element.write_wire(item)?;
                    elements.push(element);
                }
                *self = elements;
                Ok(())
            }
            WireValue::Absent | WireValue::Null => Ok(()),
            other => Err(unexpected("list", &other)),
        }
    }
}

/// Field that distinguishes an explicit `null` from an absent field
///
/// Use with `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`
/// so that an absent value is omitted from request bodies while an explicit
/// null is sent as `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Nullable<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    pub fn set(&mut self, value: T) {
        *self = Nullable::Value(value);
    }

    pub fn set_null(&mut self) {
        *self = Nullable::Null;
    }

    pub fn unset(&mut self) {
        *self = Nullable::Absent;
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Value(v) => v.serialize(serializer),
            Nullable::Null | Nullable::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        })
    }
}

impl<T: Wire + Default> Wire for Nullable<T> {
    fn wire_type() -> WireType {
        WireType::Nullable(Box::new(T::wire_type()))
    }

    fn declared_type(&self) -> WireType {
        Self::wire_type()
    }

    fn to_wire(&self) -> WireValue {
        match self {
            Nullable::Absent => WireValue::Absent,
            Nullable::Null => WireValue::Null,
            Nullable::Value(v) => v.to_wire(),
        }
    }

    fn write_wire(&mut self, value: WireValue) -> MapResult<()> {
        match value {
            WireValue::Absent => self.unset(),
            WireValue::Null => self.set_null(),
            other => {
                let mut v = T::default();
                v.write_wire(other)?;
                self.set(v);
            }
        }
        Ok(())
    }
}

/// Struct whose tagged fields are described by [`wire_model!`](crate::wire_model)
pub trait WireModel: Wire + Default + Sized {
    fn type_name() -> &'static str;

    /// Raw tags in declaration order, modifiers included
    fn wire_tags() -> &'static [&'static str];

    /// Tag lookup, built once per type
    fn tag_index() -> &'static TagIndex;

    fn field(&self, position: usize) -> Option<&dyn Wire>;

    fn field_mut(&mut self, position: usize) -> Option<&mut dyn Wire>;

    /// Declared fields, in declaration order; built once per type
    fn field_specs() -> &'static [WireFieldSpec];

    /// Config attribute types of the fields; derived once per type
    fn attr_types() -> &'static ObjectType;

    /// Declared fields, read off a default instance
    fn describe_fields() -> Vec<WireFieldSpec> {
        let sample = Self::default();
        Self::tag_index()
            .entries()
            .iter()
            .filter_map(|&(tag, position)| {
                sample.field(position).map(|f| WireFieldSpec {
                    tag,
                    ty: f.declared_type(),
                })
            })
            .collect()
    }

    fn struct_type() -> StructType {
        StructType::new(Self::type_name(), Self::field_specs, Self::attr_types)
    }
}

/// Snapshot of a wire struct; used by [`wire_model!`](crate::wire_model)
pub fn struct_to_wire<M: WireModel>(model: &M) -> WireValue {
    WireValue::Struct(
        M::tag_index()
            .entries()
            .iter()
            .filter_map(|&(tag, position)| {
                model.field(position).map(|f| (tag.to_string(), f.to_wire()))
            })
            .collect(),
    )
}

/// Patch a wire struct field by field; used by [`wire_model!`](crate::wire_model)
///
/// Entries whose tag the struct does not declare are skipped.
pub fn struct_write_wire<M: WireModel>(model: &mut M, value: WireValue) -> MapResult<()> {
    match value {
        WireValue::Struct(entries) => {
            for (tag, value) in entries {
                match M::tag_index()
                    .position(&tag)
                    .and_then(|position| model.field_mut(position))
                {
                    Some(field) => field.write_wire(value)?,
                    None => log::trace!("{}: no field tagged '{}', skipping", M::type_name(), tag),
                }
            }
            Ok(())
        }
        WireValue::Absent | WireValue::Null => Ok(()),
        other => Err(unexpected(M::type_name(), &other)),
    }
}

/// Describe the tagged fields of a wire struct
///
/// ```
/// use pylon_core::wire_model;
///
/// #[derive(Debug, Default)]
/// pub struct Share {
///     pub name: Option<String>,
///     pub size: Option<i64>,
/// }
///
/// wire_model!(Share {
///     "name" => name,
///     "size,omitempty" => size,
/// });
/// ```
#[macro_export]
macro_rules! wire_model {
    ($model:ident { $($tag:literal => $field:ident),* $(,)? }) => {
        impl $crate::wire::WireModel for $model {
            fn type_name() -> &'static str {
                stringify!($model)
            }

            fn wire_tags() -> &'static [&'static str] {
                &[$($tag),*]
            }

            fn tag_index() -> &'static $crate::tag::TagIndex {
                static INDEX: ::std::sync::OnceLock<$crate::tag::TagIndex> =
                    ::std::sync::OnceLock::new();
                INDEX.get_or_init(|| {
                    $crate::tag::TagIndex::new(<Self as $crate::wire::WireModel>::wire_tags())
                })
            }

            fn field_specs() -> &'static [$crate::wire::WireFieldSpec] {
                static SPECS: ::std::sync::OnceLock<::std::vec::Vec<$crate::wire::WireFieldSpec>> =
                    ::std::sync::OnceLock::new();
                SPECS.get_or_init(<Self as $crate::wire::WireModel>::describe_fields)
            }

            fn attr_types() -> &'static $crate::value::ObjectType {
                static TYPES: ::std::sync::OnceLock<$crate::value::ObjectType> =
                    ::std::sync::OnceLock::new();
                TYPES.get_or_init(|| {
                    $crate::convert::struct_attr_types(
                        &<Self as $crate::wire::WireModel>::struct_type(),
                    )
                })
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field(&self, position: usize) -> ::std::option::Option<&dyn $crate::wire::Wire> {
                let mut index = 0usize;
                $(
                    if index == position {
                        return ::std::option::Option::Some(&self.$field as &dyn $crate::wire::Wire);
                    }
                    index += 1;
                )*
                ::std::option::Option::None
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field_mut(
                &mut self,
                position: usize,
            ) -> ::std::option::Option<&mut dyn $crate::wire::Wire> {
                let mut index = 0usize;
                $(
                    if index == position {
                        return ::std::option::Option::Some(
                            &mut self.$field as &mut dyn $crate::wire::Wire,
                        );
                    }
                    index += 1;
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::wire::Wire for $model {
            fn wire_type() -> $crate::wire::WireType {
                $crate::wire::WireType::Struct(
                    <Self as $crate::wire::WireModel>::struct_type(),
                )
            }

            fn declared_type(&self) -> $crate::wire::WireType {
                <Self as $crate::wire::Wire>::wire_type()
            }

            fn to_wire(&self) -> $crate::wire::WireValue {
                $crate::wire::struct_to_wire(self)
            }

            fn write_wire(
                &mut self,
                value: $crate::wire::WireValue,
            ) -> $crate::error::MapResult<()> {
                $crate::wire::struct_write_wire(self, value)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Persona {
        id: Option<String>,
        uid: Option<u32>,
    }

    wire_model!(Persona {
        "id,omitempty" => id,
        "uid,omitempty" => uid,
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Export {
        paths: Vec<String>,
        owner: Option<Persona>,
        comment: Nullable<String>,
        internal: bool,
    }

    wire_model!(Export {
        "paths" => paths,
        "owner,omitempty" => owner,
        "comment" => comment,
        "-" => internal,
    });

    #[test]
    fn snapshot_skips_untagged_fields() {
        let export = Export {
            paths: vec!["/ifs/data".to_string()],
            owner: None,
            comment: Nullable::Null,
            internal: true,
        };
        assert_eq!(
            export.to_wire(),
            WireValue::Struct(vec![
                (
                    "paths".to_string(),
                    WireValue::List(vec![WireValue::String("/ifs/data".to_string())])
                ),
                ("owner".to_string(), WireValue::Absent),
                ("comment".to_string(), WireValue::Null),
            ])
        );
    }

    #[test]
    fn field_specs_follow_declaration_order() {
        let specs = Export::field_specs();
        let tags: Vec<&str> = specs.iter().map(|s| s.tag).collect();
        assert_eq!(tags, vec!["paths", "owner", "comment"]);
        assert_eq!(specs[1].ty.base(), &Persona::wire_type());
        assert!(specs[1].ty.is_struct());
    }

    #[test]
    fn write_allocates_optional_struct() {
        let mut export = Export::default();
        export
            .write_wire(WireValue::Struct(vec![(
                "owner".to_string(),
                WireValue::Struct(vec![("uid".to_string(), WireValue::Int(1000))]),
            )]))
            .unwrap();
        assert_eq!(
            export.owner,
            Some(Persona {
                id: None,
                uid: Some(1000)
            })
        );
    }

    #[test]
    fn write_patches_existing_pointer() {
        let mut export = Export {
            owner: Some(Persona {
                id: Some("root".to_string()),
                uid: None,
            }),
            ..Default::default()
        };
        export
            .write_wire(WireValue::Struct(vec![(
                "owner".to_string(),
                WireValue::Struct(vec![("uid".to_string(), WireValue::Int(0))]),
            )]))
            .unwrap();
        let owner = export.owner.unwrap();
        assert_eq!(owner.id.as_deref(), Some("root"));
        assert_eq!(owner.uid, Some(0));
    }

    #[test]
    fn narrowing_write_is_checked() {
        let mut v: i32 = 0;
        assert!(v.write_wire(WireValue::Int(i64::from(i32::MAX))).is_ok());
        let err = v.write_wire(WireValue::Int(i64::from(i32::MAX) + 1)).unwrap_err();
        assert!(matches!(err, MapError::Overflow { target: "i32", .. }));

        let mut u: u32 = 0;
        assert!(u.write_wire(WireValue::Int(-1)).is_err());
    }

    #[test]
    fn field_specs_are_built_once() {
        assert!(std::ptr::eq(Export::field_specs(), Export::field_specs()));
        let st = Export::struct_type();
        assert!(std::ptr::eq(st.fields(), Export::field_specs()));
        assert_eq!(st.field("comment"), Some(&Nullable::<String>::wire_type()));
        assert_eq!(st.field("internal"), None);
    }

    #[test]
    fn float_narrowing_is_checked() {
        let mut f: f32 = 0.0;
        f.write_wire(WireValue::Float(0.5)).unwrap();
        assert_eq!(f, 0.5);
        let err = f.write_wire(WireValue::Float(1e300)).unwrap_err();
        assert!(matches!(err, MapError::Overflow { target: "f32", .. }));
        assert_eq!(f, 0.5);

        f.write_wire(WireValue::Int(16_777_216)).unwrap();
        assert!(f.write_wire(WireValue::Int(16_777_217)).is_err());

        let mut d: f64 = 0.0;
        d.write_wire(WireValue::Int(1 << 53)).unwrap();
        assert!(d.write_wire(WireValue::Int(i64::MAX)).is_err());
        assert!(d.write_wire(WireValue::UInt(u64::MAX)).is_err());
    }

    #[test]
    fn nullable_setters() {
        let mut comment: Nullable<String> = Nullable::default();
        assert!(comment.is_absent());
        comment.write_wire(WireValue::Null).unwrap();
        assert!(comment.is_null());
        comment
            .write_wire(WireValue::String("hello".to_string()))
            .unwrap();
        assert_eq!(comment.get().map(String::as_str), Some("hello"));
    }

    #[test]
    fn nullable_serde() {
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Body {
            #[serde(default, skip_serializing_if = "Nullable::is_absent")]
            comment: Nullable<String>,
        }

        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(body.comment.is_absent());
        let body: Body = serde_json::from_str(r#"{"comment": null}"#).unwrap();
        assert!(body.comment.is_null());

        assert_eq!(serde_json::to_string(&Body::default()).unwrap(), "{}");
        let body = Body {
            comment: Nullable::Null,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"comment":null}"#);
    }

    #[test]
    fn struct_into_scalar_is_a_shape_error() {
        let mut name = String::new();
        let err = name.write_wire(WireValue::Struct(vec![])).unwrap_err();
        assert!(matches!(err, MapError::Shape { .. }));
    }
}
