//! Collection helpers for list and set attributes built from wire slices
//!
//! Every helper has a `_with` variant taking the [`MapperConfig`] whose
//! float precision and depth limit apply; the plain forms use the defaults.

use crate::context::Context;
use crate::convert::{attr_to_wire, attr_type_of, wire_to_attr};
use crate::error::MapResult;
use crate::settings::MapperConfig;
use crate::value::{AttrValue, ListValue, SetValue, TriState};
use crate::wire::{Wire, WireType};

fn known_list<T: Wire>(items: &[T], elem_ty: &WireType, cx: &mut Context) -> MapResult<ListValue> {
    let mut elements = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        elements.push(cx.element(index, |cx| wire_to_attr(&item.to_wire(), elem_ty, cx))?);
    }
    ListValue::known(attr_type_of(elem_ty), elements).map_err(|e| cx.locate(e))
}

/// List attribute from an optional wire slice: `None` gives a null list
pub fn list_value_from<T: Wire>(items: Option<&[T]>) -> MapResult<ListValue> {
    list_value_from_with(items, &MapperConfig::default())
}

pub fn list_value_from_with<T: Wire>(
    items: Option<&[T]>,
    config: &MapperConfig,
) -> MapResult<ListValue> {
    let elem_ty = T::wire_type();
    match items {
        Some(items) => known_list(items, &elem_ty, &mut Context::new(config)),
        None => Ok(ListValue::null(attr_type_of(&elem_ty))),
    }
}

/// Like [`list_value_from`], but `None` gives a known empty list
pub fn list_value_from_not_null<T: Wire>(items: Option<&[T]>) -> MapResult<ListValue> {
    list_value_from_not_null_with(items, &MapperConfig::default())
}

pub fn list_value_from_not_null_with<T: Wire>(
    items: Option<&[T]>,
    config: &MapperConfig,
) -> MapResult<ListValue> {
    known_list(
        items.unwrap_or_default(),
        &T::wire_type(),
        &mut Context::new(config),
    )
}

/// Set attribute from an optional wire slice: `None` gives a null set
pub fn set_value_from<T: Wire>(items: Option<&[T]>) -> MapResult<SetValue> {
    set_value_from_with(items, &MapperConfig::default())
}

pub fn set_value_from_with<T: Wire>(
    items: Option<&[T]>,
    config: &MapperConfig,
) -> MapResult<SetValue> {
    list_value_from_with(items, config).map(|list| list_to_set(&list))
}

/// Like [`set_value_from`], but `None` gives a known empty set
pub fn set_value_from_not_null<T: Wire>(items: Option<&[T]>) -> MapResult<SetValue> {
    set_value_from_not_null_with(items, &MapperConfig::default())
}

pub fn set_value_from_not_null_with<T: Wire>(
    items: Option<&[T]>,
    config: &MapperConfig,
) -> MapResult<SetValue> {
    list_value_from_not_null_with(items, config).map(|list| list_to_set(&list))
}

/// Same elements as a set; duplicates are dropped
pub fn list_to_set(list: &ListValue) -> SetValue {
    SetValue::from_parts(list.elem_type().clone(), list.state().clone())
}

pub fn set_to_list(set: &SetValue) -> ListValue {
    ListValue::from_parts(set.elem_type().clone(), set.state().clone())
}

fn elements_into<T: Wire + Default>(
    state: &TriState<Vec<AttrValue>>,
    config: &MapperConfig,
) -> MapResult<Option<Vec<T>>> {
    let Some(elements) = state.known() else {
        return Ok(None);
    };
    let mut cx = Context::new(config);
    let elem_ty = T::wire_type();
    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let item = cx.element(index, |cx| {
            let mut item = T::default();
            if let Some(wire) = attr_to_wire(element, &elem_ty, cx)? {
                item.write_wire(wire).map_err(|e| cx.locate(e))?;
            }
            Ok(item)
        })?;
        items.push(item);
    }
    Ok(Some(items))
}

/// Wire slice from a list attribute: `None` when the list is null or unknown
pub fn list_elements_into<T: Wire + Default>(list: &ListValue) -> MapResult<Option<Vec<T>>> {
    list_elements_into_with(list, &MapperConfig::default())
}

pub fn list_elements_into_with<T: Wire + Default>(
    list: &ListValue,
    config: &MapperConfig,
) -> MapResult<Option<Vec<T>>> {
    elements_into(list.state(), config)
}

/// Wire slice from a set attribute: `None` when the set is null or unknown
pub fn set_elements_into<T: Wire + Default>(set: &SetValue) -> MapResult<Option<Vec<T>>> {
    set_elements_into_with(set, &MapperConfig::default())
}

pub fn set_elements_into_with<T: Wire + Default>(
    set: &SetValue,
    config: &MapperConfig,
) -> MapResult<Option<Vec<T>>> {
    elements_into(set.state(), config)
}

/// Wire slice from a list attribute; null and unknown give an empty slice
pub fn list_elements_or_empty<T: Wire + Default>(list: &ListValue) -> MapResult<Vec<T>> {
    Ok(list_elements_into(list)?.unwrap_or_default())
}
