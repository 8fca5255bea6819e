use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use tagcheck::schema::{Failure, SchemaError, Validator, ValidatorConfig};
use tagcheck::tree::{DataNode, MarkupError};

fn validate(schema: &str, document: &str) -> Vec<Failure> {
    Validator::new(schema)
        .expect("schema should compile")
        .validate(document)
        .expect("document should validate")
}

fn validate_strict(schema: &str, document: &str) -> Vec<Failure> {
    let config = ValidatorConfig {
        unknown_allow: false,
        ..ValidatorConfig::default()
    };
    Validator::with_config(schema, config)
        .expect("schema should compile")
        .validate(document)
        .expect("document should validate")
}

fn summary(failures: &[Failure]) -> Vec<(&str, &str)> {
    failures
        .iter()
        .map(|f| (f.code.as_str(), f.path.as_str()))
        .collect()
}

#[test]
fn custom_validator_runs_per_occurrence() {
    let schema = r#"<root>
        <a type="positiveInteger" min="3"/>
        <c type="decimal" min="1.2"/>
        <d type="number" min="1.2" max="1.5"/>
        <f repeatable checkBy="fValidator"/>
    </root>"#;
    let document = r#"<root>
        <a>0</a><c>3.2</c><d>3.2</d>
        <f><x>1</x></f><f><x>2</x></f><f><x>bad</x></f><f><x>4</x></f>
    </root>"#;

    let calls = Arc::new(AtomicUsize::new(0));
    let mut validator = Validator::new(schema).unwrap();
    let counter = Arc::clone(&calls);
    validator.register("fValidator", move |node, path| {
        counter.fetch_add(1, Ordering::SeqCst);
        match node.get("x").and_then(DataNode::as_scalar) {
            Some("bad") => Some(Failure::new("custom", path).with_value("bad")),
            _ => None,
        }
    });

    let failures = validator.validate(document).unwrap();
    assert_eq!(
        failures,
        vec![
            Failure::predicate("min", "root.a", 0, 3),
            Failure::predicate("max", "root.d", json!(3.2), json!(1.5)),
            Failure::new("custom", "root.f[2]").with_value("bad"),
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn nested_list_reports_in_traversal_order() {
    let schema = r#"<root>
        <a/>
        <b repeatable minOccurs="1" maxOccurs="2"><nested nillable="false"/></b>
    </root>"#;
    let document = r#"<root>
        <a>1</a>
        <b></b>
        <b><e>x</e></b>
        <b><nested>y</nested></b>
        <d>z</d>
    </root>"#;

    let failures = validate_strict(schema, document);
    assert_eq!(
        summary(&failures),
        vec![
            ("unknown", "root.d"),
            ("maxOccurs", "root.b"),
            ("missing", "root.b[0].nested"),
            ("unknown", "root.b[1].e"),
            ("missing", "root.b[1].nested"),
        ]
    );
    assert_eq!(failures[1].actual, Some(json!(3)));
    assert_eq!(failures[1].expected, Some(json!(2)));
}

#[test]
fn occurrence_bounds_apply_to_lone_and_absent_tags() {
    let schema = r#"<root>
        <a/>
        <b repeatable minOccurs="0"/>
        <c repeatable minOccurs="0" maxOccurs="0"/>
        <d repeatable minOccurs="2" maxOccurs="1"/>
        <e repeatable minOccurs="1" maxOccurs="1"/>
        <f repeatable minOccurs="1" maxOccurs="2"/>
        <g repeatable maxOccurs="0"/>
    </root>"#;
    let failures = validate(schema, "<root><b/><c/><d/></root>");
    assert_eq!(
        failures,
        vec![
            Failure::missing("root.e"),
            Failure::missing("root.f"),
            Failure::predicate("maxOccurs", "root.c", 1, 0),
            Failure::predicate("minOccurs", "root.d", 1, 2),
        ]
    );
}

#[test]
fn booleans_use_configured_tokens() {
    let schema = r#"<root><v repeatable type="boolean"/></root>"#;
    let document = "<root><v>yes</v><v>true</v><v>no</v><v>1</v><v>amit</v></root>";

    let failures = validate(schema, document);
    assert_eq!(
        summary(&failures),
        vec![
            ("not a boolean", "root.v[0]"),
            ("not a boolean", "root.v[2]"),
            ("not a boolean", "root.v[3]"),
            ("not a boolean", "root.v[4]"),
        ]
    );
    assert_eq!(failures[0].value.as_deref(), Some("yes"));

    let config = ValidatorConfig {
        boolean: ["true", "false", "yes", "no"].map(String::from).to_vec(),
        ..ValidatorConfig::default()
    };
    let failures = Validator::with_config(schema, config)
        .unwrap()
        .validate(document)
        .unwrap();
    assert_eq!(
        summary(&failures),
        vec![("not a boolean", "root.v[3]"), ("not a boolean", "root.v[4]")]
    );
}

#[test]
fn dates_reject_words_and_bare_times() {
    let failures = validate(
        r#"<root><v repeatable type="date"/></root>"#,
        "<root><v>yes</v><v>true</v><v>21 sep 21</v><v>33:45:12</v><v>03:45:12</v></root>",
    );
    assert_eq!(
        summary(&failures),
        vec![
            ("not a date", "root.v[0]"),
            ("not a date", "root.v[1]"),
            ("not a date", "root.v[3]"),
            ("not a date", "root.v[4]"),
        ]
    );
}

#[test]
fn string_checks_run_in_declared_order() {
    let schema = r#"<root><m repeatable pattern="[a-z]+@gmail.com" minLength="15"/></root>"#;
    let document = "<root>\
        <m>0</m>\
        <m>amitguptagmail.com</m>\
        <m>amit@gmail.com</m>\
        <m>amitgupta@gmail.com</m>\
        </root>";

    let failures = validate(schema, document);
    assert_eq!(
        summary(&failures),
        vec![
            ("minLength", "root.m[0]"),
            ("pattern", "root.m[0]"),
            ("pattern", "root.m[1]"),
            ("minLength", "root.m[2]"),
        ]
    );
    assert_eq!(failures[1].expected, Some(json!("[a-z]+@gmail.com")));
    assert_eq!(failures[3].actual, Some(json!("amit@gmail.com")));
    assert_eq!(failures[3].expected, Some(json!(15)));
}

#[test]
fn legacy_case_insensitive_pattern() {
    let schema = r#"<root><m repeatable pattern_i="[a-z]+@gmail.com" minLength="15"/></root>"#;
    let document = "<root>\
        <m>0</m>\
        <m>amitguptagmail.com</m>\
        <m>amit@gmail.com</m>\
        <m>amitgupta@gmail.com</m>\
        <m>AmitGupta@Gmail.com</m>\
        </root>";

    assert_eq!(
        summary(&validate(schema, document)),
        vec![
            ("minLength", "root.m[0]"),
            ("pattern", "root.m[0]"),
            ("pattern", "root.m[1]"),
            ("minLength", "root.m[2]"),
        ]
    );
}

#[test]
fn enumerations_and_fixed_values() {
    let schema = r#"<root>
        <first length="4" fixed="-"/>
        <middle in="-,kumar"/>
        <last in="-,gupta"/>
    </root>"#;
    let failures = validate(
        schema,
        "<root><first>kumar</first><middle>middle</middle><last>gupta</last></root>",
    );
    assert_eq!(
        failures,
        vec![
            Failure::predicate("length", "root.first", "kumar", 4),
            Failure::predicate("fixed", "root.first", "kumar", "-"),
            Failure::predicate("in", "root.middle", "middle", "-,kumar"),
        ]
    );
}

#[test]
fn numbers_are_parsed_before_bounds() {
    let schema = r#"<root><f repeatable type="integer" min="1"/></root>"#;
    let failures = validate(
        schema,
        "<root><f>3.2</f><f>-4</f><f>acbc</f><f>7</f></root>",
    );
    assert_eq!(
        failures,
        vec![
            Failure::not_a("integer", "root.f[0]", "3.2"),
            Failure::predicate("min", "root.f[1]", -4, 1),
            Failure::not_a("integer", "root.f[2]", "acbc"),
        ]
    );
}

#[test]
fn radix_literals_count_as_integers() {
    let schema = r#"<root><n repeatable type="integer" max="10"/></root>"#;
    let failures = validate(schema, "<root><n>0x0A</n><n>0x10</n><n>0b11</n></root>");
    assert_eq!(failures, vec![Failure::predicate("max", "root.n[1]", 16, 10)]);
}

#[test]
fn positive_types_reject_negatives() {
    let schema = r#"<root><p type="positiveInteger"/><q type="positiveDecimal"/></root>"#;
    let failures = validate(schema, "<root><p>-3</p><q>-0.5</q></root>");
    assert_eq!(
        summary(&failures),
        vec![("not a positiveInteger", "root.p"), ("not a positiveDecimal", "root.q")]
    );
}

#[test]
fn empty_element_is_not_a_number() {
    let failures = validate(r#"<root><n type="number"/></root>"#, "<root><n/></root>");
    assert_eq!(failures, vec![Failure::not_a("number", "root.n", "")]);
}

#[test]
fn empty_repeated_element_still_needs_required_children() {
    let schema = r#"<root><b repeatable><b nillable="false"/></b></root>"#;
    let failures = validate(schema, "<root><b></b><b><b>x</b></b></root>");
    assert_eq!(failures, vec![Failure::missing("root.b[0].b")]);
}

#[test]
fn repeated_tag_without_repeatable_is_a_sequence_failure() {
    let failures = validate(
        r#"<root><a/><m type="map"><x/></m></root>"#,
        "<root><a>1</a><a>2</a><m><x>1</x></m><m><x>2</x></m></root>",
    );
    assert_eq!(
        failures,
        vec![
            Failure::unexpected_sequence("root.a"),
            Failure::unexpected_sequence("root.m"),
        ]
    );
}

#[test]
fn unexpected_sequence_is_not_descended() {
    // Neither the missing x nor the bad integer in the first m is reported.
    let failures = validate(
        r#"<root><m><x nillable="false"/><y type="integer"/></m></root>"#,
        "<root><m><y>bad</y></m><m/></root>",
    );
    assert_eq!(failures, vec![Failure::unexpected_sequence("root.m")]);
}

#[test]
fn value_inside_map_typed_rule() {
    let failures = validate(
        r#"<root><b repeatable type="map"/></root>"#,
        "<root><b></b><b>amit</b></root>",
    );
    assert_eq!(
        failures,
        vec![Failure::unexpected_value_in_map("root.b[1]", "amit")]
    );
}

#[test]
fn optional_and_required_structure() {
    let schema = r#"<root type="map">
        <opt/>
        <nil nillable="true"/>
        <req nillable="false"/>
        <occ minOccurs="1"/>
    </root>"#;
    assert_eq!(
        summary(&validate(schema, "<root></root>")),
        vec![("missing", "root.req"), ("missing", "root.occ")]
    );
    assert!(validate(schema, "<root><req>1</req><occ>2</occ></root>").is_empty());
}

#[test]
fn attributes_are_validated_like_children() {
    let failures = validate(
        r#"<root><:a><id length="6"/></:a></root>"#,
        r#"<root id="ABCD"></root>"#,
    );
    assert_eq!(
        failures,
        vec![Failure::predicate("length", "root.:a.id", "ABCD", 6)]
    );
}

#[test]
fn unknown_tags_pass_unless_denied() {
    let schema = r#"<root><a/></root>"#;
    let document = "<root><a>1</a><z>2</z></root>";
    assert!(validate(schema, document).is_empty());
    assert_eq!(
        validate_strict(schema, document),
        vec![Failure::unknown("root.z")]
    );
}

#[test]
fn unknown_subtrees_are_skipped_entirely() {
    let schema = r#"<root><a type="integer"/></root>"#;
    let document = "<root>
        <a>1</a>
        <z><q>1</q><q>2</q><w><v>x</v></w></z>
        <r>1</r><r>2</r>
    </root>";
    assert!(validate(schema, document).is_empty());
    assert_eq!(
        validate_strict(schema, document),
        vec![Failure::unknown("root.z"), Failure::unknown("root.r")]
    );
}

#[test]
fn valueless_attributes_in_data_are_accepted() {
    let schema = r#"<root><a type="integer"/><b/></root>"#;
    assert!(validate(schema, "<root><a>1</a><b flag>x</b></root>").is_empty());

    let failures = validate(
        r#"<root><b><:a><flag minLength="1"/></:a></b></root>"#,
        "<root><b flag>x</b></root>",
    );
    assert_eq!(
        failures,
        vec![Failure::predicate("minLength", "root.b.:a.flag", "", 1)]
    );
}

#[test]
fn wrong_root_tag_is_reported() {
    let failures = validate_strict(r#"<root nillable="false"/>"#, "<other>1</other>");
    assert_eq!(
        failures,
        vec![Failure::unknown("other"), Failure::missing("root")]
    );
}

#[test]
fn fatal_errors_are_not_failures() {
    assert!(matches!(
        Validator::new(""),
        Err(SchemaError::Markup(MarkupError::Empty))
    ));
    assert!(matches!(
        Validator::new(r#"<root><a type="uuid"/></root>"#),
        Err(SchemaError::UnsupportedType { .. })
    ));

    let validator = Validator::new("<root><a/></root>").unwrap();
    assert!(matches!(
        validator.validate("   "),
        Err(SchemaError::Markup(MarkupError::Empty))
    ));
    assert!(matches!(
        validator.validate("<root><a></root>"),
        Err(SchemaError::Markup(MarkupError::Malformed { .. }))
    ));

    let validator = Validator::new(r#"<root><a checkBy="missing"/></root>"#).unwrap();
    assert!(matches!(
        validator.validate("<root><a>1</a></root>"),
        Err(SchemaError::UnregisteredCheck { .. })
    ));
}

#[test]
fn duplicate_sibling_rules_are_a_schema_error() {
    let schema = r#"<root>
        <b repeatable minOccurs="1"/>
        <b repeatable maxOccurs="3"/>
    </root>"#;
    assert!(matches!(
        Validator::new(schema),
        Err(SchemaError::DuplicateRule { ref path }) if path == "root.b"
    ));
}

#[test]
fn repeated_calls_do_not_share_failures() {
    let validator = Validator::new(r#"<root><a nillable="false"/></root>"#).unwrap();
    let first = validator.validate("<root></root>").unwrap();
    let second = validator.validate("<root></root>").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert!(validator.validate("<root><a>x</a></root>").unwrap().is_empty());
}

#[test]
fn one_validator_serves_many_threads() {
    let validator = Validator::new(r#"<root><n type="integer" max="10"/></root>"#).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let validator = &validator;
                scope.spawn(move || {
                    let document = format!("<root><n>{}</n></root>", i * 3);
                    validator.validate(&document).unwrap().len()
                })
            })
            .collect();

        let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(counts, vec![0, 0, 0, 0, 1, 1, 1, 1]);
    });
}

#[test]
fn deep_documents_validate_without_stack_growth() {
    let depth = 2000;
    let open = "<n>".repeat(depth);
    let close = "</n>".repeat(depth);
    let schema = format!(r#"{open}<leaf nillable="false"/>{close}"#);
    let document = format!("{open}{close}");

    let failures = validate(&schema, &document);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].code, "missing");
    assert!(failures[0].path.ends_with(".n.leaf"));
}

#[test]
fn depth_is_unbounded_by_default() {
    let depth = 10_000;
    let document = "<n>".repeat(depth) + &"</n>".repeat(depth);
    assert!(validate("<n/>", &document).is_empty());

    let config = ValidatorConfig {
        markup: tagcheck::tree::ParseOptions {
            max_depth: Some(64),
            ..Default::default()
        },
        ..ValidatorConfig::default()
    };
    let guarded = Validator::with_config("<n/>", config).unwrap();
    assert!(matches!(
        guarded.validate(&document),
        Err(SchemaError::Markup(MarkupError::TooDeep { max: 64, .. }))
    ));
}

#[test]
fn failures_serialize_without_empty_fields() {
    let failures = validate(r#"<root><a nillable="false"/><b type="integer"/></root>"#, "<root><b>x</b></root>");
    let json = serde_json::to_value(&failures).unwrap();
    assert_eq!(
        json,
        json!([
            {"code": "missing", "path": "root.a"},
            {"code": "not a integer", "path": "root.b", "value": "x"},
        ])
    );
}
