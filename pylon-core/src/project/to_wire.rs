//! Config to wire projection

use crate::context::Context;
use crate::convert::attr_to_wire;
use crate::error::MapResult;
use crate::model::ConfigModel;
use crate::settings::MapperConfig;
use crate::wire::{Wire, WireType, WireValue};

/// Write every known field of `source` into `destination`
///
/// Null and unknown fields are skipped, so the destination keeps its zero
/// value (or whatever it already held) for them. An absent pointer along the
/// way is allocated when a known value has to be written through it.
pub fn read_from_state<C: ConfigModel>(source: &C, destination: &mut dyn Wire) -> MapResult<()> {
    read_from_state_with(source, destination, &MapperConfig::default())
}

pub fn read_from_state_with<C: ConfigModel>(
    source: &C,
    destination: &mut dyn Wire,
    config: &MapperConfig,
) -> MapResult<()> {
    let mut cx = Context::new(config);
    let declared = destination.declared_type();
    let WireType::Struct(st) = declared.base() else {
        return Err(cx.shape("a struct", &declared));
    };

    log::trace!("reading {} into {}", C::type_name(), st.name());
    let specs = st.fields();
    let mut entries = Vec::new();
    for &(tag, position) in C::tag_index().entries() {
        let Some(spec) = specs.iter().find(|s| s.tag == tag) else {
            log::trace!("{}: no field tagged '{}', skipping", st.name(), tag);
            continue;
        };
        let Some(field) = source.field(position) else {
            continue;
        };
        let attr = field.to_attr();
        if !attr.is_known() {
            continue;
        }
        let result = cx.scoped(tag, |cx| attr_to_wire(&attr, &spec.ty, cx));
        if let Some(wire) = cx.tolerate(result)? {
            entries.push((tag.to_string(), wire));
        }
    }

    if entries.is_empty() {
        return Ok(());
    }
    destination
        .write_wire(WireValue::Struct(entries))
        .map_err(|e| cx.locate(e))
}
