use std::cmp::Ordering;

use tracing_test::traced_test;

use super::fixtures::{customer, date, metadata, order};
use super::{compile, sub_compare};
use crate::entity::{Entity, ObjectNode};
use crate::limits::QueryLimits;
use crate::metadata::MetadataProvider;
use crate::orderby::OrderByParser;
use crate::{Error, PathViolation, SortDir};

#[test]
fn null_sorts_first_ascending() {
    // Arrange
    let md = metadata();
    let info = compile(&md, "Orders", "ShipName asc").unwrap();
    let null_ship = ObjectNode::new("Order").with_null("ShipName");
    let missing_ship = ObjectNode::new("Order");
    let named = order(1, "Vins", 1.0);

    // Act + Assert
    assert_eq!(sub_compare(&info, 0, &null_ship, &named), Ordering::Less);
    assert_eq!(sub_compare(&info, 0, &named, &null_ship), Ordering::Greater);
    assert_eq!(sub_compare(&info, 0, &null_ship, &missing_ship), Ordering::Equal);
}

#[test]
fn null_sorts_last_descending() {
    let md = metadata();
    let info = compile(&md, "Orders", "ShipName desc").unwrap();
    let null_ship = ObjectNode::new("Order").with_null("ShipName");
    let named = order(1, "Vins", 1.0);

    assert_eq!(sub_compare(&info, 0, &null_ship, &named), Ordering::Greater);
    assert_eq!(sub_compare(&info, 0, &named, &null_ship), Ordering::Less);
    assert_eq!(sub_compare(&info, 0, &null_ship, &null_ship), Ordering::Equal);
}

#[test]
fn null_ancestor_counts_as_null_chain() {
    // Arrange
    let md = metadata();
    let asc = compile(&md, "Orders", "Customer/CustomerName").unwrap();
    let desc = compile(&md, "Orders", "Customer/CustomerName desc").unwrap();
    let no_customer = ObjectNode::new("Order").with_null("Customer");
    let nameless = ObjectNode::new("Order").with_object("Customer", ObjectNode::new("Customer"));
    let alfreds = ObjectNode::new("Order").with_object("Customer", customer("Alfreds"));

    // Act + Assert
    assert_eq!(sub_compare(&asc, 0, &no_customer, &alfreds), Ordering::Less);
    assert_eq!(sub_compare(&asc, 0, &no_customer, &nameless), Ordering::Equal);
    assert_eq!(sub_compare(&desc, 0, &no_customer, &alfreds), Ordering::Greater);
    assert_eq!(sub_compare(&desc, 0, &alfreds, &nameless), Ordering::Less);
}

#[test]
fn values_compare_by_leaf_type() {
    let md = metadata();
    let info = compile(&md, "Orders", "Price, OrderDate desc").unwrap();
    let cheap = order(1, "A", 2.0).with_value("OrderDate", date("1996-07-12T00:00:00"));
    let pricey = ObjectNode::new("Order")
        .with_value("Price", 10)
        .with_value("OrderDate", "1996-07-13T00:00:00");

    assert_eq!(sub_compare(&info, 0, &cheap, &pricey), Ordering::Less);
    assert_eq!(sub_compare(&info, 1, &cheap, &pricey), Ordering::Greater);
}

#[test]
fn composite_returns_first_unequal_segment() {
    // Arrange
    let md = metadata();
    let info = compile(&md, "Orders", "Price desc, ShipName asc").unwrap();
    let a = order(1, "Zephyr", 10.0);
    let b = order(2, "Alpha", 5.0);
    let c = order(3, "Beta", 10.0);

    // Act
    let first = sub_compare(&info, 0, &a, &b);
    let second = sub_compare(&info, 1, &a, &b);
    let composite = info.compare(&a, &b);

    // Assert
    assert_eq!(first, Ordering::Less);
    assert_eq!(second, Ordering::Greater);
    assert_eq!(composite, first);
    assert_eq!(info.compare(&a, &c), sub_compare(&info, 1, &a, &c));
    assert_eq!(info.compare(&a, &a), Ordering::Equal);
    assert_eq!((info.sorter())(&b as &dyn Entity, &c as &dyn Entity), Ordering::Greater);
}

#[test]
#[traced_test]
fn duplicate_paths_keep_first_occurrence() {
    // Arrange
    let md = metadata();

    // Act
    let info = compile(
        &md,
        "Order_Details",
        "Order/Price desc, Product/ProductName asc, Order/Price asc",
    )
    .unwrap();

    // Assert
    let paths: Vec<(String, SortDir)> = info
        .segments()
        .iter()
        .map(|s| (s.path(), s.direction()))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("Order/Price".to_owned(), SortDir::Desc),
            ("Product/ProductName".to_owned(), SortDir::Asc),
        ]
    );
    assert_eq!(info.sub_sorters().len(), 2);
    assert!(logs_contain("duplicate orderby path dropped"));
    assert!(logs_contain("compiled orderby clause"));
}

#[test]
fn navigation_properties_are_recorded_per_segment() {
    let md = metadata();
    let info = compile(
        &md,
        "Order_Details",
        "Order/Customer/CustomerName, UnitPrice, Product/ProductName",
    )
    .unwrap();

    let used: Vec<Vec<&str>> = info
        .navigation_properties_used()
        .unwrap()
        .iter()
        .map(|props| props.iter().map(|p| p.name()).collect())
        .collect();
    assert_eq!(used, vec![vec!["Order", "Customer"], vec![], vec!["Product"]]);

    let plain = compile(&md, "Orders", "ShipName, Customer/Address/StreetName").unwrap();
    assert_eq!(
        plain.navigation_properties_used().unwrap()[1][0].name(),
        "Customer"
    );
    let no_nav = compile(&md, "Orders", "ShipName, Price").unwrap();
    assert!(no_nav.navigation_properties_used().is_none());
}

#[test]
fn complex_hops_are_not_navigation() {
    let md = metadata();
    let info = compile(&md, "Customers", "Address/AltAddress/StreetName").unwrap();

    assert!(info.navigation_properties_used().is_none());
    assert_eq!(info.segments()[0].sub_segments().len(), 3);
    assert!(info.segments()[0].sub_segments()[2].is_terminal());
}

#[test]
fn dummy_object_shares_prefixes() {
    // Arrange
    let md = metadata();

    // Act
    let info = compile(
        &md,
        "Orders",
        "Customer/Address/StreetName, Customer/Address/HouseNumber, Customer/CustomerName, OrderID",
    )
    .unwrap();

    // Assert
    let dummy = info.dummy_object();
    assert_eq!(dummy.type_name(), "Order");
    let customer = dummy.child("Customer").unwrap();
    assert_eq!(customer.type_name(), "Customer");
    let address = customer.child("Address").unwrap();
    assert_eq!(address.type_name(), "Address");
    assert!(address.is_empty());
    assert!(dummy.slot("OrderID").is_none());
    assert!(customer.slot("CustomerName").is_none());
}

#[test]
fn shape_rules_reject_invalid_paths() {
    let md = metadata();
    let cases = [
        ("Customer/EmailAddresses", "EmailAddresses", PathViolation::Bag),
        (
            "Customer/OtherAddresses/StreetName",
            "OtherAddresses",
            PathViolation::Bag,
        ),
        ("Customer/Photo", "Photo", PathViolation::Binary),
        ("Customer/Address", "Address", PathViolation::ComplexTerminal),
        (
            "Order_Details/Quantity",
            "Order_Details",
            PathViolation::NavigationToMany,
        ),
        ("Customer/Orders/Price", "Orders", PathViolation::NavigationToMany),
        ("Customer", "Customer", PathViolation::NavigationTerminal),
        ("ShipName/Length", "ShipName", PathViolation::PrimitiveNotTerminal),
    ];

    for (text, property, violation) in cases {
        let err = compile(&md, "Orders", text).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidPropertyUse {
                property: property.to_owned(),
                violation,
            },
            "{text}"
        );
        assert!(err.is_bad_request());
    }
}

#[test]
fn shape_rule_messages() {
    let md = metadata();

    let bag = compile(&md, "Orders", "Customer/EmailAddresses").unwrap_err();
    let nav = compile(&md, "Orders", "Order_Details/Quantity").unwrap_err();
    let complex = compile(&md, "Orders", "Customer/Address").unwrap_err();

    assert!(bag.to_string().contains("bag property not allowed in this clause"));
    assert!(nav.to_string().contains("navigation property pointing to a collection cannot be used"));
    assert!(complex.to_string().contains("drill into a primitive member"));
}

#[test]
fn invisible_target_set_is_rejected() {
    let md = metadata();

    let err = compile(&md, "Orders", "Employee/LastName").unwrap_err();

    assert_eq!(
        err,
        Error::ResourceSetNotVisible {
            property: "Employee".to_owned(),
            resource_set: "Employees".to_owned(),
        }
    );
    assert!(err.to_string().contains("enable visibility of 'Employees'"));
}

#[test]
fn unknown_properties_name_their_type() {
    let md = metadata();

    assert_eq!(
        compile(&md, "Orders", "Freight").unwrap_err(),
        Error::PropertyNotFound {
            property: "Freight".to_owned(),
            type_name: "Order".to_owned(),
        }
    );
    assert_eq!(
        compile(&md, "Orders", "Customer/Fax").unwrap_err(),
        Error::PropertyNotFound {
            property: "Fax".to_owned(),
            type_name: "Customer".to_owned(),
        }
    );
}

#[test]
fn key_and_etag_primitives_are_allowed() {
    let md = metadata();

    let info = compile(&md, "Orders", "OrderID desc, OrderDate").unwrap();

    assert_eq!(info.segments().len(), 2);
    assert_eq!(info.segments()[0].direction(), SortDir::Desc);
    assert_eq!(info.segments()[1].direction(), SortDir::Asc);
}

#[test]
fn syntax_errors_abort_compilation() {
    let md = metadata();

    for text in ["", "ShipName asc desc", "ShipName,", "Price)", "Customer//CustomerName"] {
        let err = compile(&md, "Orders", text).unwrap_err();
        assert!(matches!(err, Error::OrderBySyntax(_)), "{text:?}: {err:?}");
    }
}

#[test]
fn field_limit_counts_duplicates() {
    let md = metadata();
    let set = md.resource_set("Orders").unwrap();
    let order_type = md.resource_type("Order").unwrap();
    let parser =
        OrderByParser::new(&md).with_limits(QueryLimits::new().with_max_orderby_fields(2));

    let err = parser
        .parse_order_by_clause(set, order_type, "Price, Price, Price")
        .unwrap_err();

    assert!(matches!(err, Error::LimitExceeded(_)));
    assert!(
        parser
            .parse_order_by_clause(set, order_type, "Price, ShipName")
            .is_ok()
    );
}

#[test]
fn provider_ordering_disables_internal_sorting() {
    let md = metadata();
    let set = md.resource_set("Orders").unwrap();
    let order_type = md.resource_type("Order").unwrap();

    let internal = OrderByParser::new(&md)
        .parse_order_by_clause(set, order_type, "Price")
        .unwrap();
    let delegated = OrderByParser::new(&md)
        .provider_handles_ordering(true)
        .parse_order_by_clause(set, order_type, "Price")
        .unwrap();

    assert!(internal.requires_internal_sorting());
    assert!(!delegated.requires_internal_sorting());
    assert_eq!(delegated.resource_type_name(), "Order");
}

#[test]
fn sort_orders_entities_stably() {
    // Arrange
    let md = metadata();
    let info = compile(&md, "Orders", "Customer/CustomerName desc, Price").unwrap();
    let with_customer = |id: i32, name: &str, price: f64| {
        order(id, "x", price).with_object("Customer", customer(name))
    };
    let mut orders = vec![
        with_customer(1, "Alfreds", 5.0),
        ObjectNode::new("Order").with_value("OrderID", 2).with_null("Customer"),
        with_customer(3, "Bottom", 7.0),
        with_customer(4, "Alfreds", 1.0),
        with_customer(5, "Bottom", 7.0),
    ];

    // Act
    info.sort(&mut orders);

    // Assert
    let ids: Vec<_> = orders
        .iter()
        .map(|o| o.value("OrderID").unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["3", "5", "4", "1", "2"]);
}

#[test]
fn debug_output_skips_comparators() {
    let md = metadata();
    let info = compile(&md, "Orders", "Price").unwrap();

    let rendered = format!("{info:?}");

    assert!(rendered.starts_with("InternalOrderByInfo"));
    assert!(rendered.contains("requires_internal_sorting: true"));
    assert!(rendered.ends_with(".. }"));
}
