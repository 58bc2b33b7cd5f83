//! Integration tests for cross-model linking.

use std::collections::BTreeMap;
use std::sync::Arc;

use ormbridge_core::proto::{FieldDescriptor, RelationKind};
use ormbridge_core::{
    BridgedModel, DefaultTranslator, FieldTranslator, FieldType, LinkState, PlannedAttachment,
    ReverseLink,
};

/// Remote schema of a small sales setup.
fn remote_schema() -> BTreeMap<&'static str, Vec<FieldDescriptor>> {
    let mut schema = BTreeMap::new();
    schema.insert(
        "res.partner",
        vec![
            FieldDescriptor::new("name", "char").required(),
            FieldDescriptor::many_to_one("parent_id", "res.partner"),
            FieldDescriptor::one_to_many("sale_order_ids", "sale.order", "partner_id"),
        ],
    );
    schema.insert(
        "sale.order",
        vec![
            FieldDescriptor::new("name", "char"),
            FieldDescriptor::many_to_one("partner_id", "res.partner"),
            FieldDescriptor::new("follower_ids", "many2many").with_relation("res.partner"),
            FieldDescriptor::one_to_many("order_line", "sale.order.line", "order_id"),
        ],
    );
    schema.insert(
        "sale.order.line",
        vec![
            FieldDescriptor::new("price_unit", "float"),
            FieldDescriptor::many_to_one("order_id", "sale.order"),
            FieldDescriptor::new("tax_ids", "reference"),
        ],
    );
    schema
}

/// Finalize the models in `order`, replaying links the way the bridge does.
fn link_in_order(order: &[&str]) -> (BTreeMap<String, Arc<BridgedModel>>, LinkState) {
    let schema = remote_schema();
    let mut state = LinkState::new();
    let mut models = BTreeMap::new();

    for remote in order {
        let model = BridgedModel::builder(*remote, *remote).build();
        state.register(remote, model.clone()).unwrap();
        let mut plan = Vec::new();
        for descriptor in &schema[remote] {
            let mut descriptor = descriptor.clone();
            descriptor.annotate(&descriptor.name.clone(), remote);
            let spec = DefaultTranslator.translate(&descriptor);
            state
                .attach_or_defer(remote, descriptor, spec, &mut plan)
                .unwrap();
        }
        state.resolve_deferred(remote, &mut plan).unwrap();
        plan.into_iter().for_each(PlannedAttachment::apply);
        models.insert(remote.to_string(), model);
    }

    (models, state)
}

fn shape(models: &BTreeMap<String, Arc<BridgedModel>>) -> Vec<(String, Vec<String>, Vec<ReverseLink>)> {
    models
        .iter()
        .map(|(id, model)| {
            let mut fields: Vec<String> = model.fields().into_iter().map(|f| f.name).collect();
            fields.sort();
            let mut links = model.reverse_links();
            links.sort_by(|a, b| (&a.from_model, &a.field).cmp(&(&b.from_model, &b.field)));
            (id.clone(), fields, links)
        })
        .collect()
}

#[test]
fn test_final_shape_is_order_independent() {
    let orders: [[&str; 3]; 6] = [
        ["res.partner", "sale.order", "sale.order.line"],
        ["res.partner", "sale.order.line", "sale.order"],
        ["sale.order", "res.partner", "sale.order.line"],
        ["sale.order", "sale.order.line", "res.partner"],
        ["sale.order.line", "res.partner", "sale.order"],
        ["sale.order.line", "sale.order", "res.partner"],
    ];

    let (models, state) = link_in_order(&orders[0]);
    assert!(state.deferred().is_empty());
    let reference = shape(&models);

    for order in &orders[1..] {
        let (models, state) = link_in_order(order);
        assert!(state.deferred().is_empty(), "order {:?}", order);
        assert_eq!(shape(&models), reference, "order {:?}", order);
    }
}

#[test]
fn test_many_to_one_declared_before_target() {
    // sale.order finalizes first and points at res.partner.
    let (models, state) = link_in_order(&["sale.order", "res.partner"]);

    let order = &models["sale.order"];
    let partner = &models["res.partner"];

    assert!(order.has_field("partner_id"));
    assert_eq!(
        order.field("follower_ids").unwrap().field_type,
        FieldType::ManyToMany {
            model: "res.partner".into()
        }
    );
    // order_line still waits for sale.order.line.
    assert_eq!(state.deferred().targets(), vec!["sale.order.line"]);

    let from_order: Vec<ReverseLink> = partner
        .reverse_links()
        .into_iter()
        .filter(|l| l.from_model == "sale.order")
        .collect();
    assert_eq!(
        from_order,
        vec![
            ReverseLink {
                from_model: "sale.order".into(),
                field: "partner_id".into(),
                kind: RelationKind::ManyToOne,
            },
            ReverseLink {
                from_model: "sale.order".into(),
                field: "follower_ids".into(),
                kind: RelationKind::ManyToMany,
            },
        ]
    );
}

#[test]
fn test_skipped_fields_are_absent() {
    let (models, _) = link_in_order(&["sale.order.line", "sale.order", "res.partner"]);

    let line = &models["sale.order.line"];
    assert!(!line.has_field("tax_ids"));
    assert_eq!(line.field_count(), 2);
}
