//! Loading paging settings from a host configuration tree.

use figment::{
    Figment,
    providers::{Format, Serialized, Yaml},
};
use odata_paging::{
    EdmType, Metadata, MetadataProvider, OrderByParser, PagingConfig, QueryLimits,
    ResourceProperty, ResourceSetWrapper, ResourceType, SkipTokenParser,
};

fn metadata() -> Metadata {
    Metadata::new()
        .with_resource_type(
            ResourceType::entity("Product")
                .with_property(ResourceProperty::key("ProductID", EdmType::Int32))
                .with_property(ResourceProperty::primitive("ProductName", EdmType::String))
                .with_property(ResourceProperty::primitive("UnitPrice", EdmType::Decimal)),
        )
        .with_resource_set(ResourceSetWrapper::new("Products", "Product"))
}

#[test]
fn yaml_overrides_selected_limits() {
    let yaml = r"
provider_handles_ordering: true
limits:
  max_orderby_fields: 2
  max_page_size: 200
";

    let config: PagingConfig = Figment::new().merge(Yaml::string(yaml)).extract().unwrap();

    assert!(config.provider_handles_ordering);
    assert_eq!(config.limits.max_orderby_fields, 2);
    assert_eq!(config.limits.max_page_size, 200);
    assert_eq!(config.limits.max_orderby_length, 1024);
    assert_eq!(config.limits.default_page_size, 25);
}

#[test]
fn empty_tree_uses_defaults() {
    let config: PagingConfig = Figment::new()
        .merge(Serialized::defaults(serde_json::json!({})))
        .extract()
        .unwrap();

    assert_eq!(config, PagingConfig::default());
    assert_eq!(config.limits, QueryLimits::default());
    assert!(!config.provider_handles_ordering);
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = r"
limits:
  max_top: 10
";

    let result: Result<PagingConfig, _> = Figment::new().merge(Yaml::string(yaml)).extract();

    assert!(result.is_err());
}

#[test]
fn nested_under_host_section() {
    let figment = Figment::new().merge(Serialized::defaults(serde_json::json!({
        "modules": {
            "catalog": {
                "paging": {
                    "limits": { "max_skiptoken_length": 16 }
                }
            }
        }
    })));

    let config: PagingConfig = figment.extract_inner("modules.catalog.paging").unwrap();

    assert_eq!(config.limits.max_skiptoken_length, 16);
}

#[test]
fn parsers_honour_loaded_config() {
    // Arrange
    let yaml = r"
provider_handles_ordering: true
limits:
  max_orderby_fields: 1
  max_skiptoken_length: 4
";
    let config: PagingConfig = Figment::new().merge(Yaml::string(yaml)).extract().unwrap();
    let md = metadata();
    let set = md.resource_set("Products").unwrap();
    let product = md.resource_type("Product").unwrap();
    let orderby = OrderByParser::from_config(&md, &config);
    let skiptoken = SkipTokenParser::from_config(&config);

    // Act
    let info = orderby
        .parse_order_by_clause(set, product, "UnitPrice desc")
        .unwrap();
    let too_many = orderby.parse_order_by_clause(set, product, "UnitPrice, ProductID");
    let too_long = skiptoken.parse_skip_token_clause(product, &info, "12.50M");
    let accepted = skiptoken.parse_skip_token_clause(product, &info, "1.5M");

    // Assert
    assert!(!info.requires_internal_sorting());
    assert!(too_many.is_err());
    assert!(too_long.is_err());
    assert!(accepted.is_ok());
}

#[test]
fn key_tiebreaker_flag_reaches_the_parser() {
    let yaml = "ensure_key_tiebreaker: true\n";
    let config: PagingConfig = Figment::new().merge(Yaml::string(yaml)).extract().unwrap();
    let md = metadata();
    let set = md.resource_set("Products").unwrap();
    let product = md.resource_type("Product").unwrap();

    let info = OrderByParser::from_config(&md, &config)
        .parse_order_by_clause(set, product, "UnitPrice desc")
        .unwrap();

    let paths: Vec<String> = info.segments().iter().map(|s| s.path()).collect();
    assert!(config.ensure_key_tiebreaker);
    assert_eq!(paths, vec!["UnitPrice", "ProductID"]);
}
