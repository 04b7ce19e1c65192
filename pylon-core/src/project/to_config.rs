//! Wire to config projection

use crate::context::Context;
use crate::convert::wire_to_attr;
use crate::error::{MapError, MapResult};
use crate::model::ConfigModel;
use crate::settings::MapperConfig;
use crate::wire::{Wire, WireType, WireValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Absent wire fields leave the destination untouched
    Nested,
    /// Absent wire fields become null; nested models are rejected
    Flat,
}

/// Copy every tagged field of `source` into `destination`
///
/// Absent fields are skipped, so values already in `destination` survive.
/// Nested structs and slices of structs are projected into freshly
/// allocated nested models.
pub fn copy_fields<C: ConfigModel>(source: &dyn Wire, destination: &mut C) -> MapResult<()> {
    copy_fields_with(source, destination, &MapperConfig::default())
}

pub fn copy_fields_with<C: ConfigModel>(
    source: &dyn Wire,
    destination: &mut C,
    config: &MapperConfig,
) -> MapResult<()> {
    copy_struct(source, destination, config, Mode::Nested)
}

/// Copy every tagged field of `source` into a model without nested models
///
/// Absent fields become typed nulls. A destination field holding a nested
/// model is a shape error.
pub fn copy_fields_to_non_nested<C: ConfigModel>(
    source: &dyn Wire,
    destination: &mut C,
) -> MapResult<()> {
    copy_fields_to_non_nested_with(source, destination, &MapperConfig::default())
}

pub fn copy_fields_to_non_nested_with<C: ConfigModel>(
    source: &dyn Wire,
    destination: &mut C,
    config: &MapperConfig,
) -> MapResult<()> {
    copy_struct(source, destination, config, Mode::Flat)
}

fn copy_struct<C: ConfigModel>(
    source: &dyn Wire,
    destination: &mut C,
    config: &MapperConfig,
    mode: Mode,
) -> MapResult<()> {
    let mut cx = Context::new(config);
    let declared = source.declared_type();
    let (st, entries) = match (declared.base(), source.to_wire()) {
        (_, WireValue::Absent) => {
            log::debug!("{}: source is absent, nothing to copy", C::type_name());
            return Ok(());
        }
        (WireType::Struct(st), WireValue::Struct(entries)) => (*st, entries),
        (other, _) => return Err(cx.shape("a struct", other)),
    };
    let specs = st.fields();

    log::trace!("copying {} into {}", st.name(), C::type_name());
    for (tag, value) in entries {
        let Some(position) = C::tag_index().position(&tag) else {
            log::trace!("{}: no field tagged '{}', skipping", C::type_name(), tag);
            continue;
        };
        let Some(spec) = specs.iter().find(|s| s.tag == tag) else {
            continue;
        };
        let Some(slot) = destination.field_mut(position) else {
            continue;
        };

        match mode {
            Mode::Flat if slot.declared_type().is_nested_model() => {
                return Err(MapError::Shape {
                    path: tag,
                    expected: "a tri-state attribute".to_string(),
                    found: slot.declared_type().to_string(),
                });
            }
            Mode::Nested if value.is_absent() => continue,
            _ => {}
        }

        let result = cx.scoped(tag.as_str(), |cx| {
            let attr = wire_to_attr(&value, &spec.ty, cx)?;
            slot.assign(attr, cx)
        });
        cx.tolerate(result)?;
    }
    Ok(())
}
