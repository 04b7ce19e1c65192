//! Mapping properties checked end to end through the public API

use pylon_core::collection::{list_value_from, list_value_from_not_null};
use pylon_core::error::MapError;
use pylon_core::model::{ModelListValue, ModelValue};
use pylon_core::project::{copy_fields, copy_fields_to_non_nested, read_from_state};
use pylon_core::tag::TagIndex;
use pylon_core::value::{
    AttrType, AttrValue, CaseInsensitive, CaseInsensitiveValue, Int64Value, ListValue, Number,
    NumberValue, SetValue, StringValue, TriState,
};
use pylon_core::wire::Nullable;
use pylon_core::{config_model, wire_model};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Owner {
    id: Option<String>,
    uid: Option<u32>,
}

wire_model!(Owner {
    "id,omitempty" => id,
    "uid,omitempty" => uid,
});

#[derive(Debug, Clone, Default, PartialEq)]
struct Export {
    name: Option<String>,
    size: Option<i64>,
    quota: Option<i32>,
    ratio: Option<f64>,
    zone: Option<CaseInsensitive>,
    clients: Option<Vec<String>>,
    flavors: Option<Vec<String>>,
    note: Nullable<String>,
    owner: Option<Owner>,
    members: Option<Vec<Owner>>,
}

wire_model!(Export {
    "name,omitempty" => name,
    "size,omitempty" => size,
    "quota,omitempty" => quota,
    "ratio,omitempty" => ratio,
    "zone,omitempty" => zone,
    "clients,omitempty" => clients,
    "flavors,omitempty" => flavors,
    "note" => note,
    "owner,omitempty" => owner,
    "members,omitempty" => members,
});

#[derive(Debug, Clone, Default, PartialEq)]
struct OwnerModel {
    id: StringValue,
    uid: Int64Value,
}

config_model!(OwnerModel {
    "id" => id,
    "uid" => uid,
});

#[derive(Debug, Clone, Default, PartialEq)]
struct ExportModel {
    name: StringValue,
    size: Int64Value,
    quota: Int64Value,
    ratio: NumberValue,
    zone: CaseInsensitiveValue,
    clients: ListValue,
    flavors: SetValue,
    note: StringValue,
    owner: ModelValue<OwnerModel>,
    members: ModelListValue<OwnerModel>,
}

config_model!(ExportModel {
    "name" => name,
    "size" => size,
    "quota" => quota,
    "ratio" => ratio,
    "zone" => zone,
    "clients" => clients,
    "flavors" => flavors,
    "note" => note,
    "owner" => owner,
    "members" => members,
});

/// Flat view of the same payload, without the nested owner
#[derive(Debug, Clone, Default, PartialEq)]
struct ExportSummary {
    name: StringValue,
    clients: ListValue,
    flavors: SetValue,
    zone: StringValue,
}

config_model!(ExportSummary {
    "name" => name,
    "clients" => clients,
    "flavors" => flavors,
    "zone" => zone,
});

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn full_export() -> Export {
    let mut note = Nullable::default();
    note.set("primary".to_string());
    Export {
        name: Some("home".to_string()),
        size: Some(-1),
        quota: Some(i32::MAX),
        ratio: Some(0.25),
        zone: Some(CaseInsensitive::from("System")),
        clients: Some(strings(&["10.0.0.1", "10.0.0.2"])),
        flavors: Some(strings(&["krb5", "unix"])),
        note,
        owner: Some(Owner {
            id: Some("USER:root".to_string()),
            uid: Some(0),
        }),
        members: Some(vec![
            Owner {
                id: Some("USER:alice".to_string()),
                uid: Some(1001),
            },
            Owner {
                id: Some("USER:bob".to_string()),
                uid: None,
            },
        ]),
    }
}

#[test]
fn round_trip_preserves_declared_fields() {
    init();
    let wire = full_export();
    let mut model = ExportModel::default();
    copy_fields(&wire, &mut model).unwrap();

    let mut back = Export::default();
    read_from_state(&model, &mut back).unwrap();
    assert_eq!(back, wire);
}

#[test]
fn round_trip_of_partially_populated_payloads() {
    init();
    let payloads = [
        Export {
            name: Some("bare".to_string()),
            ..Default::default()
        },
        Export {
            name: Some("empty-lists".to_string()),
            clients: Some(Vec::new()),
            members: Some(Vec::new()),
            ..Default::default()
        },
        Export {
            owner: Some(Owner::default()),
            members: Some(vec![Owner {
                id: None,
                uid: Some(7),
            }]),
            ..Default::default()
        },
    ];
    for wire in payloads {
        let mut model = ExportModel::default();
        copy_fields(&wire, &mut model).unwrap();
        let mut back = Export::default();
        read_from_state(&model, &mut back).unwrap();
        assert_eq!(back, wire);
    }
}

// An explicit null reads back as null state, and null state is never written
#[test]
fn explicit_null_reads_as_null_and_is_not_resent() {
    init();
    let mut note = Nullable::default();
    note.set_null();
    let wire = Export {
        name: Some("cleared".to_string()),
        note,
        ..Default::default()
    };
    let mut model = ExportModel::default();
    copy_fields(&wire, &mut model).unwrap();
    assert!(model.note.is_null());
    assert!(model.owner.is_null());
    assert!(model.members.is_null());

    let mut back = Export::default();
    read_from_state(&model, &mut back).unwrap();
    assert_eq!(
        back,
        Export {
            note: Nullable::Absent,
            ..wire
        }
    );
}

#[test]
fn nil_and_empty_model_lists_stay_apart() {
    init();
    let mut from_nil = ExportModel::default();
    copy_fields(&Export::default(), &mut from_nil).unwrap();

    let mut from_empty = ExportModel::default();
    let wire = Export {
        members: Some(Vec::new()),
        ..Default::default()
    };
    copy_fields(&wire, &mut from_empty).unwrap();

    assert!(from_nil.members.is_null());
    assert_eq!(from_empty.members, TriState::Known(Vec::new()));
    assert_ne!(from_nil, from_empty);
}

#[test]
fn round_trip_drops_fields_the_model_omits() {
    init();
    let wire = full_export();
    let mut summary = ExportSummary::default();
    copy_fields_to_non_nested(&wire, &mut summary).unwrap();

    let mut back = Export::default();
    read_from_state(&summary, &mut back).unwrap();
    assert_eq!(back.name, wire.name);
    assert_eq!(back.clients, wire.clients);
    assert_eq!(back.size, None);
    assert_eq!(back.owner, None);
}

#[test]
fn nil_slice_is_null_and_empty_slice_is_known() {
    init();
    let wire = Export {
        clients: None,
        flavors: Some(Vec::new()),
        ..Default::default()
    };
    let mut summary = ExportSummary::default();
    copy_fields_to_non_nested(&wire, &mut summary).unwrap();

    assert!(summary.clients.is_null());
    assert_eq!(summary.clients.elem_type(), &AttrType::String);
    assert!(summary.flavors.is_known());
    assert_eq!(summary.flavors.elements(), Some(&[][..]));

    let items: Option<&[String]> = None;
    assert!(list_value_from(items).unwrap().is_null());
    assert_eq!(list_value_from_not_null(items).unwrap().elements(), Some(&[][..]));
}

#[test]
fn null_and_unknown_fields_write_nothing() {
    init();
    let model = ExportModel {
        name: TriState::Unknown,
        size: TriState::Null,
        clients: ListValue::unknown(AttrType::String),
        flavors: SetValue::null(AttrType::String),
        note: TriState::Unknown,
        owner: TriState::Unknown,
        members: TriState::Null,
        ..Default::default()
    };
    let mut wire = Export::default();
    read_from_state(&model, &mut wire).unwrap();
    assert_eq!(wire, Export::default());

    let unknown_members = ExportModel {
        members: TriState::Unknown,
        owner: TriState::Null,
        ..Default::default()
    };
    read_from_state(&unknown_members, &mut wire).unwrap();
    assert_eq!(wire, Export::default());
}

#[test]
fn int32_boundary_is_checked() {
    init();
    let mut wire = Export::default();
    let fits = ExportModel {
        quota: TriState::Known(2_147_483_647),
        ..Default::default()
    };
    read_from_state(&fits, &mut wire).unwrap();
    assert_eq!(wire.quota, Some(i32::MAX));

    let too_big = ExportModel {
        quota: TriState::Known(2_147_483_648),
        ..Default::default()
    };
    let err = read_from_state(&too_big, &mut Export::default()).unwrap_err();
    match err {
        MapError::Overflow { path, value, target } => {
            assert_eq!(path, "quota");
            assert_eq!(value, "2147483648");
            assert_eq!(target, "i32");
        }
        other => panic!("expected overflow, got {other}"),
    }
}

#[test]
fn floats_keep_four_decimal_places() {
    init();
    let model = ExportModel {
        ratio: TriState::Known(Number::new(1.23456789)),
        ..Default::default()
    };
    let mut wire = Export::default();
    read_from_state(&model, &mut wire).unwrap();
    assert_eq!(wire.ratio, Some(1.2346));

    let wire = Export {
        ratio: Some(1.23456789),
        ..Default::default()
    };
    let mut model = ExportModel::default();
    copy_fields(&wire, &mut model).unwrap();
    assert_eq!(model.ratio, TriState::Known(Number::new(1.2346)));
}

#[test]
fn plain_string_into_case_insensitive_field() {
    init();
    let summary = ExportSummary {
        zone: "Value".into(),
        ..Default::default()
    };
    let mut wire = Export::default();
    read_from_state(&summary, &mut wire).unwrap();
    assert_eq!(wire.zone, Some(CaseInsensitive::from("value")));
    assert_eq!(wire.zone.as_ref().map(CaseInsensitive::as_str), Some("Value"));
}

#[test]
fn nested_owner_is_allocated_and_typed() {
    init();
    let mut model = ExportModel::default();
    copy_fields(&full_export(), &mut model).unwrap();
    let owner = model.owner.known().unwrap();
    assert_eq!(owner.uid, TriState::Known(0));
    let members = model.members.known().unwrap();
    assert_eq!(members[1].uid, TriState::Null);

    let object = pylon_core::model::ConfigField::to_attr(&model.owner);
    let AttrValue::Object(object) = object else {
        panic!("owner should project to an object");
    };
    assert_eq!(object.attr_types().get("uid"), Some(&AttrType::Int64));
}

// Two fields sharing a tag are outside the mapping contract: which one a tag
// resolves to is unspecified, only that lookup still answers.
#[test]
fn duplicate_tags_resolve_to_some_field() {
    init();
    let index = TagIndex::new(&["name", "name,omitempty"]);
    let position = index.position("name");
    assert!(matches!(position, Some(0) | Some(1)));
}
