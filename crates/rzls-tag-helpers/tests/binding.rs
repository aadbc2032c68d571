use std::sync::Arc;

use rzls_tag_helpers::conventions::can_satisfy_bound_attribute;
use rzls_tag_helpers::MetadataCollection;
use rzls_tag_helpers::TagHelperCollection;
use rzls_tag_helpers::TagHelperDescriptor;
use rzls_tag_helpers::TagHelperDescriptorBuilder;
use rzls_tag_helpers::TagHelperDocumentContext;

fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect()
}

fn names(descriptors: &[Arc<TagHelperDescriptor>]) -> String {
    descriptors
        .iter()
        .map(|d| d.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[test]
fn unrestricted_rule_matches_root_and_body() {
    let catalog: TagHelperCollection = [TagHelperDescriptorBuilder::tag_helper("DivTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("div"))
        .build()]
    .into_iter()
    .collect();
    let context = TagHelperDocumentContext::create(None, catalog);

    insta::assert_snapshot!(names(&context.binder().get_tag_helpers_given_parent(None)), @"DivTagHelper");
    insta::assert_snapshot!(names(&context.binder().get_tag_helpers_given_parent(Some("body"))), @"DivTagHelper");
}

#[test]
fn binding_picks_descriptor_with_satisfied_attribute() {
    let with_for = TagHelperDescriptorBuilder::tag_helper("ForTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("a").require_attribute(|a| a.name("asp-for")))
        .build();
    let with_other = TagHelperDescriptorBuilder::tag_helper("OtherTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("a").require_attribute(|a| a.name("asp-other")))
        .build();
    let catalog: TagHelperCollection = [with_other, with_for.clone()].into_iter().collect();
    let context = TagHelperDocumentContext::create(None, catalog);

    let binding = context
        .binder()
        .get_binding("a", &attrs(&[("asp-for", "Name")]), Some("p"), false)
        .expect("asp-for should bind");

    let bound: Vec<_> = binding.descriptors().map(|d| d.name()).collect();
    assert_eq!(bound, ["ForTagHelper"]);
    let rules = binding.rules_for(&with_for);
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].attributes()[0].name(), "asp-for");
    assert!(!binding.is_attribute_match());
}

#[test]
fn attribute_rule_and_unconstrained_rule_both_bind() {
    let with_for = TagHelperDescriptorBuilder::tag_helper("ForTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("a").require_attribute(|a| a.name("asp-page")))
        .tag_matching_rule(|rule| rule.tag_name("a").require_attribute(|a| a.name("asp-for")))
        .build();
    let plain = TagHelperDescriptorBuilder::tag_helper("AnchorTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("a"))
        .build();
    let catalog: TagHelperCollection = [with_for.clone(), plain.clone()].into_iter().collect();
    let context = TagHelperDocumentContext::create(None, catalog);

    let binding = context
        .binder()
        .get_binding("a", &attrs(&[("asp-for", "Name")]), Some("p"), false)
        .expect("both descriptors should bind");

    let bound: Vec<_> = binding.descriptors().map(|d| d.name()).collect();
    assert_eq!(bound, ["ForTagHelper", "AnchorTagHelper"]);

    let for_rules = binding.rules_for(&with_for);
    assert_eq!(for_rules.len(), 1);
    assert_eq!(for_rules[0].attributes()[0].name(), "asp-for");

    let plain_rules = binding.rules_for(&plain);
    assert_eq!(plain_rules.len(), 1);
    assert!(plain_rules[0].attributes().is_empty());
    assert_eq!(plain_rules[0].tag_name(), "a");
}

#[test]
fn prefix_gates_tag_lookup() {
    let catalog: TagHelperCollection = [TagHelperDescriptorBuilder::tag_helper("FooTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("foo"))
        .build()]
    .into_iter()
    .collect();
    let context = TagHelperDocumentContext::create(Some("th"), catalog);

    assert!(context.binder().get_tag_helpers_given_tag("foo", None).is_empty());
    insta::assert_snapshot!(names(&context.binder().get_tag_helpers_given_tag("thfoo", None)), @"FooTagHelper");
}

#[test]
fn opt_out_beats_catch_all() {
    let catalog: TagHelperCollection = [TagHelperDescriptorBuilder::tag_helper("CatchAll", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("*"))
        .build()]
    .into_iter()
    .collect();
    let context = TagHelperDocumentContext::create(None, catalog);

    assert!(context.binder().get_binding("!div", &[], None, false).is_none());
    assert!(context.binder().get_binding("div", &[], None, false).is_some());
}

#[test]
fn dictionary_attribute_matches_prefix_only() {
    let descriptor = TagHelperDescriptorBuilder::tag_helper("AnchorTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| rule.tag_name("a"))
        .bound_attribute(|a| {
            a.name("asp-all-route-data")
                .property_name("RouteValues")
                .as_dictionary("asp-route-", "System.String")
        })
        .build();
    let attribute = &descriptor.bound_attributes()[0];

    assert!(can_satisfy_bound_attribute("asp-route-id", attribute));
    assert!(!can_satisfy_bound_attribute("asp-route", attribute));
}

#[test]
fn descriptors_from_separate_builds_deduplicate() {
    let build = || {
        TagHelperDescriptorBuilder::tag_helper("InputTagHelper", "TestAssembly")
            .tag_matching_rule(|rule| {
                rule.tag_name("input")
                    .require_attribute(|a| a.name("asp-for"))
            })
            .bound_attribute(|a| a.name("asp-for").property_name("For"))
            .metadata("first", Some("1".to_string()))
            .metadata("second", None)
            .build()
    };

    let first = build();
    let second = build();
    assert_eq!(first, second);
    assert!(!std::ptr::eq(&first, &second));

    let catalog: TagHelperCollection = [first, second].into_iter().collect();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn metadata_keys_enumerate_sorted() {
    let metadata = MetadataCollection::new([
        ("e", Some("5")),
        ("c", Some("3")),
        ("a", Some("1")),
        ("d", Some("4")),
        ("b", Some("2")),
    ])
    .unwrap();

    insta::assert_snapshot!(metadata.keys().collect::<Vec<_>>().join(","), @"a,b,c,d,e");
    let missing = std::panic::catch_unwind(|| metadata["missing-key"].clone());
    assert!(missing.is_err());
}
