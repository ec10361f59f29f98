use farescout_common::CrawlError;
use farescout_extract::{extract, FieldValue, PageTree};
use farescout_schema::ExtractionRules;

fn rules(json: &str) -> ExtractionRules {
    serde_json::from_str(json).expect("valid rules")
}

#[test]
fn multiplicity_follows_match_count() {
    let page = PageTree::parse(
        r#"<html><body><ul>
            <li class="fare"></li>
            <li class="fare"><span class="p">100</span></li>
            <li class="fare">
              <span class="p">90</span><span class="p"> 95 </span><span class="p">99</span>
            </li>
        </ul></body></html>"#,
    );
    let rules = rules(
        r#"{"result_group": {"tag": "//li[@class='fare']",
             "items": {"tag": ".", "elements": {"price": {"tag": ".//span[@class='p']"}}}}}"#,
    );

    let records = extract(&page, &rules).unwrap();

    // The zero-match item has no concrete field and is discarded entirely.
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].get("price"),
        Some(&FieldValue::Scalar("100".into()))
    );
    assert_eq!(
        records[1].get("price"),
        Some(&FieldValue::Many(vec!["90".into(), "95".into(), "99".into()]))
    );
}

#[test]
fn records_with_no_concrete_value_are_discarded() {
    let page = PageTree::parse(
        r#"<html><body>
            <div class="row"><b>kept</b></div>
            <div class="row"></div>
        </body></html>"#,
    );
    let rules = rules(
        r#"{"result_group": {"tag": "//div[@class='row']",
             "items": {"elements": {"label": {"tag": ".//b"}, "missing": {"tag": ".//i"}}}}}"#,
    );

    let records = extract(&page, &rules).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("label"), Some(&FieldValue::Scalar("kept".into())));
    assert_eq!(records[0].get("missing"), Some(&FieldValue::Null));
}

#[test]
fn bad_field_path_poisons_only_that_field() {
    let page = PageTree::parse(
        r#"<html><body><div class="row"><b>ok</b></div></body></html>"#,
    );
    let rules = rules(
        r#"{"result_group": {"tag": "//div",
             "items": {"elements": {
                "good": {"tag": ".//b"},
                "bad": {"tag": ".//b[last()]"}}}}}"#,
    );

    let records = extract(&page, &rules).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("good"), Some(&FieldValue::Scalar("ok".into())));
    assert!(matches!(records[0].get("bad"), Some(FieldValue::Error(_))));
}

#[test]
fn item_drilldown_descends_from_wrapper_containers() {
    let page = PageTree::parse(
        r#"<html><body>
            <section><article><h2>a</h2></article><article><h2>b</h2></article></section>
            <section><article><h2>c</h2></article></section>
        </body></html>"#,
    );
    let rules = rules(
        r#"{"result_group": {"tag": "//section",
             "items": {"tag": ".//article", "elements": {"title": {"tag": ".//h2"}}}}}"#,
    );

    let records = extract(&page, &rules).unwrap();
    let titles: Vec<_> = records
        .iter()
        .map(|r| r.get("title").cloned().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec![
            FieldValue::Scalar("a".into()),
            FieldValue::Scalar("b".into()),
            FieldValue::Scalar("c".into())
        ]
    );
}

#[test]
fn result_single_alone_is_an_explicit_unsupported_outcome() {
    let page = PageTree::parse("<html><body></body></html>");
    let rules = rules(r#"{"result_single": {"tag": "//title"}}"#);

    let err = extract(&page, &rules).unwrap_err();
    assert!(matches!(err, CrawlError::Extraction(msg) if msg.contains("not supported")));
}

#[test]
fn missing_rules_are_an_extraction_error() {
    let page = PageTree::parse("<html><body></body></html>");
    let err = extract(&page, &ExtractionRules::default()).unwrap_err();
    assert!(matches!(err, CrawlError::Extraction(_)));
}

#[test]
fn result_single_next_to_a_group_rule_is_ignored() {
    let page = PageTree::parse(r#"<html><body><p class="x">v</p></body></html>"#);
    let rules = rules(
        r#"{"result_single": {"tag": "//title"},
            "result_group": {"tag": "//p", "items": {"elements": {"v": {"tag": "."}}}}}"#,
    );

    let records = extract(&page, &rules).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("v"), Some(&FieldValue::Scalar("v".into())));
}
