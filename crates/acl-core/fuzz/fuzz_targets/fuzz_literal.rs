//! Fuzz target for literal validation and rule matching
//!
//! Feeds arbitrary category keys and values through request construction and
//! a fixed rule; nothing may panic and accepted literals keep their text.

#![no_main]

use acl_core::{AttributeCategory, Effect, Literal, Request, Rule};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct LiteralInput {
    category: String,
    value: String,
    roles: Vec<String>,
}

fuzz_target!(|input: LiteralInput| {
    if let Ok(literal) = Literal::new(input.value.clone()) {
        assert_eq!(literal.as_str(), input.value);
    }

    let Ok(category) = AttributeCategory::from_key(&input.category) else {
        return;
    };
    let Ok(request) = Request::new().with(category, input.value.clone()) else {
        return;
    };
    let request = request.roles_from(input.roles).unwrap_or_default();

    let rule = Rule::new("fuzz", Effect::Deny)
        .and_then(|rule| rule.constrain(category, [input.value.as_str()]))
        .expect("value already accepted");
    let _ = rule.matches(&request);
});
