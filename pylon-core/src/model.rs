//! Model - Typed configuration models
//!
//! A config model is a struct whose fields are tri-state values, dynamic
//! containers, or nested config models. The [`config_model!`](crate::config_model)
//! macro describes its tagged fields.

use std::collections::BTreeMap;
use std::fmt;

use crate::context::Context;
use crate::convert::coerce;
use crate::error::{MapError, MapResult};
use crate::tag::TagIndex;
use crate::value::{
    AttrType, AttrValue, CaseInsensitive, ListValue, Number, ObjectType, ObjectValue, SetValue,
    TriState,
};

/// Nesting at which [`ConfigType::attr_type`] stops describing recursive models
const MAX_TYPE_DEPTH: usize = 32;

/// Declared field of a config model
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFieldSpec {
    pub tag: &'static str,
    pub ty: ConfigType,
}

/// Declared shape of a config model
#[derive(Clone, Copy)]
pub struct ModelType {
    name: &'static str,
    fields: fn() -> Vec<ConfigFieldSpec>,
}

impl ModelType {
    pub fn new(name: &'static str, fields: fn() -> Vec<ConfigFieldSpec>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> Vec<ConfigFieldSpec> {
        (self.fields)()
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelType({})", self.name)
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Declared type of a config model field
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigType {
    String,
    Bool,
    Int64,
    Int32,
    Float64,
    Number,
    CaseInsensitiveString,
    List,
    Set,
    Object,
    /// Nested model held by value
    Model(ModelType),
    /// Nested model that may be null or unknown
    OptionalModel(ModelType),
    /// List of nested models that may be null or unknown
    ModelList(ModelType),
}

impl ConfigType {
    /// Whether the field holds a typed nested model rather than an attribute value
    pub fn is_nested_model(&self) -> bool {
        matches!(
            self,
            ConfigType::Model(_) | ConfigType::OptionalModel(_) | ConfigType::ModelList(_)
        )
    }

    /// Attribute type of the field. Dynamic containers have no declared
    /// element type and report `Missing` for it.
    pub fn attr_type(&self) -> AttrType {
        self.attr_type_at(0)
    }

    fn attr_type_at(&self, depth: usize) -> AttrType {
        if depth > MAX_TYPE_DEPTH {
            return AttrType::Missing;
        }
        match self {
            ConfigType::String => AttrType::String,
            ConfigType::Bool => AttrType::Bool,
            ConfigType::Int64 => AttrType::Int64,
            ConfigType::Int32 => AttrType::Int32,
            ConfigType::Float64 => AttrType::Float64,
            ConfigType::Number => AttrType::Number,
            ConfigType::CaseInsensitiveString => AttrType::CaseInsensitiveString,
            ConfigType::List => AttrType::list(AttrType::Missing),
            ConfigType::Set => AttrType::set(AttrType::Missing),
            ConfigType::Object => AttrType::Missing,
            ConfigType::Model(m) | ConfigType::OptionalModel(m) => {
                AttrType::Object(model_attr_types(m, depth))
            }
            ConfigType::ModelList(m) => {
                AttrType::list(AttrType::Object(model_attr_types(m, depth)))
            }
        }
    }
}

fn model_attr_types(model: &ModelType, depth: usize) -> ObjectType {
    model
        .fields()
        .into_iter()
        .map(|spec| (spec.tag.to_string(), spec.ty.attr_type_at(depth + 1)))
        .collect()
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigType::String => f.write_str("String"),
            ConfigType::Bool => f.write_str("Bool"),
            ConfigType::Int64 => f.write_str("Int64"),
            ConfigType::Int32 => f.write_str("Int32"),
            ConfigType::Float64 => f.write_str("Float64"),
            ConfigType::Number => f.write_str("Number"),
            ConfigType::CaseInsensitiveString => f.write_str("CaseInsensitiveString"),
            ConfigType::List => f.write_str("List"),
            ConfigType::Set => f.write_str("Set"),
            ConfigType::Object => f.write_str("Object"),
            ConfigType::Model(m) => f.write_str(m.name),
            ConfigType::OptionalModel(m) => write!(f, "TriState<{}>", m.name),
            ConfigType::ModelList(m) => write!(f, "TriState<Vec<{}>>", m.name),
        }
    }
}

/// A field that can appear in a config model
pub trait ConfigField {
    fn config_type() -> ConfigType
    where
        Self: Sized;

    fn declared_type(&self) -> ConfigType;

    /// Current value as a dynamic attribute
    fn to_attr(&self) -> AttrValue;

    /// Overwrite with `value`, converting between compatible kinds
    fn assign(&mut self, value: AttrValue, cx: &mut Context) -> MapResult<()>;

    /// Reset to null (or the empty model)
    fn clear(&mut self);
}

macro_rules! impl_scalar_field {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl ConfigField for TriState<$t> {
                fn config_type() -> ConfigType {
                    ConfigType::$variant
                }

                fn declared_type(&self) -> ConfigType {
                    ConfigType::$variant
                }

                fn to_attr(&self) -> AttrValue {
                    AttrValue::$variant(self.clone())
                }

                fn assign(&mut self, value: AttrValue, cx: &mut Context) -> MapResult<()> {
                    match coerce(value, &ConfigType::$variant, cx)? {
                        AttrValue::$variant(v) => {
                            *self = v;
                            Ok(())
                        }
                        other => Err(cx.mismatch(ConfigType::$variant, other.attr_type())),
                    }
                }

                fn clear(&mut self) {
                    *self = TriState::Null;
                }
            }
        )*
    };
}

impl_scalar_field!(
    String => String,
    bool => Bool,
    i64 => Int64,
    i32 => Int32,
    f64 => Float64,
    Number => Number,
    CaseInsensitive => CaseInsensitiveString,
);

impl ConfigField for ListValue {
    fn config_type() -> ConfigType {
        ConfigType::List
    }

    fn declared_type(&self) -> ConfigType {
        ConfigType::List
    }

    fn to_attr(&self) -> AttrValue {
        AttrValue::List(self.clone())
    }

    fn assign(&mut self, value: AttrValue, cx: &mut Context) -> MapResult<()> {
        match coerce(value, &ConfigType::List, cx)? {
            AttrValue::List(v) => {
                *self = v;
                Ok(())
            }
            other => Err(cx.mismatch(ConfigType::List, other.attr_type())),
        }
    }

    fn clear(&mut self) {
        *self = ListValue::null(self.elem_type().clone());
    }
}

impl ConfigField for SetValue {
    fn config_type() -> ConfigType {
        ConfigType::Set
    }

    fn declared_type(&self) -> ConfigType {
        ConfigType::Set
    }

    fn to_attr(&self) -> AttrValue {
        AttrValue::Set(self.clone())
    }

    fn assign(&mut self, value: AttrValue, cx: &mut Context) -> MapResult<()> {
        match coerce(value, &ConfigType::Set, cx)? {
            AttrValue::Set(v) => {
                *self = v;
                Ok(())
            }
            other => Err(cx.mismatch(ConfigType::Set, other.attr_type())),
        }
    }

    fn clear(&mut self) {
        *self = SetValue::null(self.elem_type().clone());
    }
}

impl ConfigField for ObjectValue {
    fn config_type() -> ConfigType {
        ConfigType::Object
    }

    fn declared_type(&self) -> ConfigType {
        ConfigType::Object
    }

    fn to_attr(&self) -> AttrValue {
        AttrValue::Object(self.clone())
    }

    fn assign(&mut self, value: AttrValue, cx: &mut Context) -> MapResult<()> {
        match value {
            AttrValue::Object(v) => {
                *self = v;
                Ok(())
            }
            other => Err(cx.mismatch(ConfigType::Object, other.attr_type())),
        }
    }

    fn clear(&mut self) {
        *self = ObjectValue::null(self.attr_types().clone());
    }
}

/// Nested model that may be null or not yet known
pub type ModelValue<M> = TriState<M>;

/// List of nested models that may be null or not yet known
pub type ModelListValue<M> = TriState<Vec<M>>;

fn model_elem_type<M: ConfigModel>() -> AttrType {
    AttrType::Object(model_attr_types(&M::model_type(), 0))
}

impl<M: ConfigModel> ConfigField for TriState<M> {
    fn config_type() -> ConfigType {
        ConfigType::OptionalModel(M::model_type())
    }

    fn declared_type(&self) -> ConfigType {
        Self::config_type()
    }

    fn to_attr(&self) -> AttrValue {
        let attr_types = || model_attr_types(&M::model_type(), 0);
        match self {
            TriState::Known(model) => model.to_attr(),
            TriState::Null => AttrValue::Object(ObjectValue::null(attr_types())),
            TriState::Unknown => AttrValue::Object(ObjectValue::unknown(attr_types())),
        }
    }

    /// A known object allocates a fresh model
    fn assign(&mut self, value: AttrValue, cx: &mut Context) -> MapResult<()> {
        match value {
            AttrValue::Object(object) if object.is_known() => {
                let mut model = M::default();
                assign_model(&mut model, AttrValue::Object(object), cx)?;
                *self = TriState::Known(model);
            }
            AttrValue::Object(object) if object.is_unknown() => *self = TriState::Unknown,
            AttrValue::Object(_) => *self = TriState::Null,
            other => return Err(cx.mismatch(Self::config_type(), other.attr_type())),
        }
        Ok(())
    }

    fn clear(&mut self) {
        *self = TriState::Null;
    }
}

impl<M: ConfigModel> ConfigField for TriState<Vec<M>> {
    fn config_type() -> ConfigType {
        ConfigType::ModelList(M::model_type())
    }

    fn declared_type(&self) -> ConfigType {
        Self::config_type()
    }

    fn to_attr(&self) -> AttrValue {
        let state = match self {
            TriState::Null => TriState::Null,
            TriState::Unknown => TriState::Unknown,
            TriState::Known(models) => {
                TriState::Known(models.iter().map(ConfigField::to_attr).collect())
            }
        };
        AttrValue::List(ListValue::from_parts(model_elem_type::<M>(), state))
    }

    /// Null and unknown lists keep their state; a known list, even an empty
    /// one, allocates one model per element
    fn assign(&mut self, value: AttrValue, cx: &mut Context) -> MapResult<()> {
        let state = match value {
            AttrValue::List(list) => list.into_parts().1,
            AttrValue::Set(set) => set.into_parts().1,
            other => return Err(cx.mismatch(Self::config_type(), other.attr_type())),
        };
        *self = state.try_map(|elements| {
            let mut models = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                let model = cx.element(index, |cx| {
                    let mut model = M::default();
                    assign_model(&mut model, element, cx)?;
                    Ok(model)
                })?;
                models.push(model);
            }
            Ok::<_, MapError>(models)
        })?;
        Ok(())
    }

    fn clear(&mut self) {
        *self = TriState::Null;
    }
}

/// Struct whose tagged fields are described by [`config_model!`](crate::config_model)
pub trait ConfigModel: ConfigField + Default + Sized {
    fn type_name() -> &'static str;

    /// Raw tags in declaration order, modifiers included
    fn config_tags() -> &'static [&'static str];

    /// Tag lookup, built once per type
    fn tag_index() -> &'static TagIndex;

    fn field(&self, position: usize) -> Option<&dyn ConfigField>;

    fn field_mut(&mut self, position: usize) -> Option<&mut dyn ConfigField>;

    /// Declared fields, in declaration order
    fn field_specs() -> Vec<ConfigFieldSpec> {
        let sample = Self::default();
        Self::tag_index()
            .entries()
            .iter()
            .filter_map(|&(tag, position)| {
                sample.field(position).map(|f| ConfigFieldSpec {
                    tag,
                    ty: f.declared_type(),
                })
            })
            .collect()
    }

    fn model_type() -> ModelType {
        ModelType::new(Self::type_name(), Self::field_specs)
    }

    /// Current values as an object, attribute types taken from the values
    fn to_object(&self) -> ObjectValue {
        let mut attr_types = ObjectType::new();
        let mut attributes = BTreeMap::new();
        for &(tag, position) in Self::tag_index().entries() {
            if let Some(field) = self.field(position) {
                let value = field.to_attr();
                attr_types.insert(tag.to_string(), value.attr_type());
                attributes.insert(tag.to_string(), value);
            }
        }
        ObjectValue::from_parts(attr_types, TriState::Known(attributes))
    }
}

/// Project a known object into a freshly allocated model; used by
/// [`config_model!`](crate::config_model)
///
/// A null or unknown object resets the model. Attributes the model does not
/// declare are skipped unless `strict_nested_fields` is set.
pub fn assign_model<M: ConfigModel>(
    model: &mut M,
    value: AttrValue,
    cx: &mut Context,
) -> MapResult<()> {
    let object = match value {
        AttrValue::Object(object) => object,
        other => return Err(cx.mismatch(M::type_name(), other.attr_type())),
    };
    let Some(attributes) = object.into_parts().1.into_known() else {
        *model = M::default();
        return Ok(());
    };

    let mut fresh = M::default();
    for (name, attr) in attributes {
        match M::tag_index()
            .position(&name)
            .and_then(|position| fresh.field_mut(position))
        {
            Some(field) => {
                let result = cx.scoped(name.as_str(), |cx| field.assign(attr, cx));
                cx.tolerate(result)?;
            }
            None if cx.config().strict_nested_fields => {
                return Err(MapError::FieldNotFound {
                    path: cx.path(),
                    tag: name,
                    type_name: M::type_name(),
                });
            }
            None => log::trace!("{}: no field tagged '{}', skipping", M::type_name(), name),
        }
    }
    *model = fresh;
    Ok(())
}

/// Copy of `planned` in which every field equal to its `prior` value is
/// reset to null, leaving only the attributes an update has to send
pub fn changed_only<M: ConfigModel + Clone>(prior: &M, planned: &M) -> M {
    let mut patch = planned.clone();
    for &(tag, position) in M::tag_index().entries() {
        let unchanged = match (prior.field(position), planned.field(position)) {
            (Some(before), Some(after)) => before.to_attr() == after.to_attr(),
            _ => false,
        };
        if unchanged {
            if let Some(field) = patch.field_mut(position) {
                field.clear();
            }
        } else {
            log::debug!("{}.{} changed", M::type_name(), tag);
        }
    }
    patch
}

/// Reset every top-level field that is still unknown to null
///
/// After a response has been copied in, values the cluster did not report
/// can no longer become known.
pub fn null_unknowns<M: ConfigModel>(model: &mut M) {
    for &(tag, position) in M::tag_index().entries() {
        if let Some(field) = model.field_mut(position)
            && field.to_attr().is_unknown()
        {
            log::debug!("{}.{} left unknown, setting null", M::type_name(), tag);
            field.clear();
        }
    }
}

/// Describe the tagged fields of a config model
///
/// ```
/// use pylon_core::config_model;
/// use pylon_core::value::{Int64Value, StringValue};
///
/// #[derive(Debug, Clone, Default)]
/// pub struct ShareModel {
///     pub name: StringValue,
///     pub size: Int64Value,
/// }
///
/// config_model!(ShareModel {
///     "name" => name,
///     "size" => size,
/// });
/// ```
#[macro_export]
macro_rules! config_model {
    ($model:ident { $($tag:literal => $field:ident),* $(,)? }) => {
        impl $crate::model::ConfigModel for $model {
            fn type_name() -> &'static str {
                stringify!($model)
            }

            fn config_tags() -> &'static [&'static str] {
                &[$($tag),*]
            }

            fn tag_index() -> &'static $crate::tag::TagIndex {
                static INDEX: ::std::sync::OnceLock<$crate::tag::TagIndex> =
                    ::std::sync::OnceLock::new();
                INDEX.get_or_init(|| {
                    $crate::tag::TagIndex::new(<Self as $crate::model::ConfigModel>::config_tags())
                })
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field(
                &self,
                position: usize,
            ) -> ::std::option::Option<&dyn $crate::model::ConfigField> {
                let mut index = 0usize;
                $(
                    if index == position {
                        return ::std::option::Option::Some(
                            &self.$field as &dyn $crate::model::ConfigField,
                        );
                    }
                    index += 1;
                )*
                ::std::option::Option::None
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field_mut(
                &mut self,
                position: usize,
            ) -> ::std::option::Option<&mut dyn $crate::model::ConfigField> {
                let mut index = 0usize;
                $(
                    if index == position {
                        return ::std::option::Option::Some(
                            &mut self.$field as &mut dyn $crate::model::ConfigField,
                        );
                    }
                    index += 1;
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::model::ConfigField for $model {
            fn config_type() -> $crate::model::ConfigType {
                $crate::model::ConfigType::Model(
                    <Self as $crate::model::ConfigModel>::model_type(),
                )
            }

            fn declared_type(&self) -> $crate::model::ConfigType {
                <Self as $crate::model::ConfigField>::config_type()
            }

            fn to_attr(&self) -> $crate::value::AttrValue {
                $crate::value::AttrValue::Object(
                    <Self as $crate::model::ConfigModel>::to_object(self),
                )
            }

            fn assign(
                &mut self,
                value: $crate::value::AttrValue,
                cx: &mut $crate::context::Context,
            ) -> $crate::error::MapResult<()> {
                $crate::model::assign_model(self, value, cx)
            }

            fn clear(&mut self) {
                *self = <Self as ::std::default::Default>::default();
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MapperConfig;
    use crate::value::{Int32Value, Int64Value, StringValue};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct PersonaModel {
        id: StringValue,
        uid: Int32Value,
    }

    crate::config_model!(PersonaModel {
        "id" => id,
        "uid" => uid,
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    struct ExportModel {
        path: StringValue,
        size: Int64Value,
        owner: ModelValue<PersonaModel>,
        members: ModelListValue<PersonaModel>,
    }

    crate::config_model!(ExportModel {
        "path" => path,
        "size" => size,
        "owner" => owner,
        "members" => members,
    });

    fn persona_object(id: &str, uid: i64) -> AttrValue {
        let types = ObjectType::from([
            ("id".to_string(), AttrType::String),
            ("uid".to_string(), AttrType::Int64),
        ]);
        let attrs = BTreeMap::from([
            ("id".to_string(), AttrValue::from(id)),
            ("uid".to_string(), AttrValue::from(uid)),
        ]);
        AttrValue::Object(ObjectValue::known(types, attrs).unwrap())
    }

    #[test]
    fn field_specs_report_nested_models() {
        let specs = ExportModel::field_specs();
        assert_eq!(specs[0].ty, ConfigType::String);
        assert_eq!(specs[2].ty, ConfigType::OptionalModel(PersonaModel::model_type()));
        assert!(specs[3].ty.is_nested_model());
        assert!(!specs[1].ty.is_nested_model());
    }

    #[test]
    fn optional_model_allocates_from_known_object() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let mut owner: ModelValue<PersonaModel> = TriState::Null;
        owner.assign(persona_object("root", 0), &mut cx).unwrap();
        assert_eq!(
            owner,
            TriState::Known(PersonaModel {
                id: "root".into(),
                uid: TriState::Known(0),
            })
        );

        let object_type = ConfigType::OptionalModel(PersonaModel::model_type()).attr_type();
        owner.assign(AttrValue::unknown(&object_type).unwrap(), &mut cx).unwrap();
        assert!(owner.is_unknown());
        assert!(owner.to_attr().is_unknown());

        owner.assign(AttrValue::null(&object_type).unwrap(), &mut cx).unwrap();
        assert!(owner.is_null());
        assert_eq!(owner.to_attr().attr_type(), object_type);
    }

    #[test]
    fn model_list_collects_elements() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let elem = AttrType::Object(ObjectType::from([
            ("id".to_string(), AttrType::String),
            ("uid".to_string(), AttrType::Int64),
        ]));
        let list = ListValue::known(elem, vec![persona_object("a", 1), persona_object("b", 2)])
            .unwrap();
        let mut members: ModelListValue<PersonaModel> = TriState::Null;
        members.assign(AttrValue::List(list), &mut cx).unwrap();
        let models = members.known().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].id, StringValue::from("b"));
    }

    #[test]
    fn model_list_keeps_null_apart_from_empty() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let list_type = ConfigType::ModelList(PersonaModel::model_type()).attr_type();

        let mut members: ModelListValue<PersonaModel> = TriState::Known(Vec::new());
        members.assign(AttrValue::null(&list_type).unwrap(), &mut cx).unwrap();
        assert!(members.is_null());
        assert!(members.to_attr().is_null());
        assert_eq!(members.to_attr().attr_type(), list_type);

        members.assign(AttrValue::unknown(&list_type).unwrap(), &mut cx).unwrap();
        assert!(members.is_unknown());

        let AttrType::List(elem) = list_type else {
            panic!("expected a list type");
        };
        let empty = ListValue::known(*elem, Vec::new()).unwrap();
        members.assign(AttrValue::List(empty), &mut cx).unwrap();
        assert_eq!(members, TriState::Known(Vec::new()));
        assert!(members.to_attr().is_known());
    }

    #[test]
    fn overflowing_nested_int_names_its_path() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let mut owner: ModelValue<PersonaModel> = TriState::Null;
        let err = cx
            .scoped("owner", |cx| owner.assign(persona_object("x", 1 << 40), cx))
            .unwrap_err();
        assert_eq!(err.path(), "owner.uid");
        assert!(matches!(err, MapError::Overflow { .. }));
    }

    #[test]
    fn strict_nested_fields_rejects_unknown_attribute() {
        let types = ObjectType::from([("gid".to_string(), AttrType::Int64)]);
        let attrs = BTreeMap::from([("gid".to_string(), AttrValue::from(5i64))]);
        let object = AttrValue::Object(ObjectValue::known(types, attrs).unwrap());

        let lenient = MapperConfig::default();
        let mut owner: ModelValue<PersonaModel> = TriState::Null;
        owner.assign(object.clone(), &mut Context::new(&lenient)).unwrap();
        assert_eq!(owner, TriState::Known(PersonaModel::default()));

        let strict = MapperConfig {
            strict_nested_fields: true,
            ..Default::default()
        };
        let err = owner.assign(object, &mut Context::new(&strict)).unwrap_err();
        assert!(matches!(err, MapError::FieldNotFound { .. }));
    }

    #[test]
    fn scalar_assign_rejects_wrong_kind() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let mut name = StringValue::default();
        let err = name.assign(AttrValue::from(true), &mut cx).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn to_object_keeps_null_fields() {
        let model = ExportModel {
            path: "/ifs/data".into(),
            ..Default::default()
        };
        let object = model.to_object();
        assert_eq!(object.get("path"), Some(&AttrValue::from("/ifs/data")));
        assert!(object.get("size").is_some_and(AttrValue::is_null));
        assert!(object.get("owner").is_some_and(AttrValue::is_null));
    }

    #[test]
    fn null_unknowns_only_touches_unknown_fields() {
        let mut model = ExportModel {
            path: TriState::Unknown,
            size: TriState::Known(3),
            ..Default::default()
        };
        null_unknowns(&mut model);
        assert!(model.path.is_null());
        assert_eq!(model.size, TriState::Known(3));
    }

    #[test]
    fn changed_only_nulls_unchanged_fields() {
        let prior = ExportModel {
            path: "/ifs/a".into(),
            size: TriState::Known(10),
            ..Default::default()
        };
        let planned = ExportModel {
            size: TriState::Known(20),
            ..prior.clone()
        };
        let patch = changed_only(&prior, &planned);
        assert!(patch.path.is_null());
        assert_eq!(patch.size, TriState::Known(20));
    }
}
