//! End-to-end builder scenarios.

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use quarry::datemath::{days, minus, months, plus};
use quarry::{
    Backend, ClauseGroup, DateMath, GroupMode, Member, Op, Operand, Predicate, QueryBuilder,
    QueryConfig, QueryError, Value,
};

fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn builder() -> QueryBuilder {
    QueryBuilder::new().at(instant())
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn boosted_title_match() {
    let mut q = builder();
    q.field("title")
        .unwrap()
        .matches("important")
        .unwrap()
        .with_similarity(2.0)
        .unwrap();

    assert_eq!(q.serialize().unwrap(), "title:important^2");

    let predicate = q.root().predicates().next().unwrap();
    assert_eq!(predicate.op(), Op::Equals);
    assert_eq!(predicate.boost(), Some(2.0));
}

#[test]
fn disjunction_is_sibling_of_enclosing_predicates() {
    let mut q = builder();
    q.content_type("blog").unwrap();
    q.or(|q| {
        q.field("featured")?.matches(true)?;
        q.field("likes")?.gt(50)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        q.serialize().unwrap(),
        "contentType:blog (featured:true OR likes:{50 TO *])"
    );

    let root = q.root();
    assert_eq!(root.len(), 2);
    let or = root.groups().next().unwrap();
    assert_eq!(or.mode(), GroupMode::Or);
    assert_eq!(or.len(), 2);
}

#[test]
fn negated_comparison_uses_captured_now() {
    let mut q = builder();
    q.not(|q| {
        let now = q.now();
        q.field("expired_dt")?.lte(now)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        q.serialize().unwrap(),
        "-(expired_dt:[* TO 2024-03-01T12:00:00Z])"
    );
}

#[test]
fn empty_field_rejected_before_mutation() {
    let mut q = builder();
    q.field("title").unwrap().matches("kept").unwrap();
    let before = q.root().clone();

    let err = q.field("").err().unwrap();
    assert!(matches!(err, QueryError::EmptyField));
    assert!(err.is_invalid_query());
    assert_eq!(q.root(), &before);
}

#[test]
fn date_math_folds_into_one_token() {
    let mut q = builder();
    let month_ago = q.now_with(minus(1, months()).unwrap());
    q.field("modified").unwrap().gte(month_ago).unwrap();

    let rendered = q.serialize().unwrap();
    assert_eq!(rendered, "modified:[2024-03-01T12:00:00Z-1MONTHS TO *]");
    assert_eq!(rendered.matches("MONTHS").count(), 1);
}

#[test]
fn whole_query() {
    let mut q = builder();
    q.content_type("news").unwrap();
    q.field("title")
        .unwrap()
        .matches("release (beta)")
        .unwrap()
        .with_similarity(3.5)
        .unwrap();
    let now = q.now();
    q.field("published")
        .unwrap()
        .between(
            DateMath::now(instant(), Some(minus(7, days()).unwrap())),
            now,
        )
        .unwrap();
    q.not(|q| {
        q.field("status")?.matches("draft")?;
        q.or(|q| {
            q.field("author")?.matches("bot")?;
            q.field("score")?.lte(0.5)?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        q.serialize().unwrap(),
        concat!(
            r#"contentType:news title:"release \(beta\)"^3.5 "#,
            "published:[2024-03-01T12:00:00Z-7DAYS TO 2024-03-01T12:00:00Z] ",
            "-(status:draft (author:bot OR score:[* TO 0.5]))"
        )
    );
}

// ============================================================================
// Invalid input
// ============================================================================

#[test]
fn invalid_inputs_fail_at_call_site() {
    let mut q = builder();

    let err = q.field("title").unwrap().matches("").err().unwrap();
    assert!(matches!(err, QueryError::EmptyValue { .. }));

    let err = q.field("score").unwrap().gt(f64::NAN).unwrap_err();
    assert!(matches!(err, QueryError::NonFiniteNumber { .. }));

    let err = q.content_type("").unwrap_err();
    assert!(matches!(err, QueryError::EmptyContentType));

    let err = q.minus(-3, days()).unwrap_err();
    assert!(matches!(err, QueryError::NegativeOffset { amount: -3 }));

    let err = "weeks".parse::<quarry::DateUnit>().unwrap_err();
    assert!(matches!(err, QueryError::UnknownUnit(_)));

    assert!(q.root().is_empty());
    assert_eq!(q.depth(), 0);
}

#[test]
fn builder_usable_after_error() {
    let mut q = builder();
    let _ = q.or(|q| {
        q.field("a")?.matches("1")?;
        q.field("b")?.matches("2")?.with_similarity(-1.0)?;
        Ok(())
    });
    q.field("c").unwrap().matches("3").unwrap();
    assert_eq!(q.serialize().unwrap(), "c:3");
}

// ============================================================================
// Model and backends
// ============================================================================

#[test]
fn range_bounds_keep_order() {
    let mut q = builder();
    q.field("likes").unwrap().between(5, 10).unwrap();
    let predicate = q.root().predicates().next().unwrap();
    assert_eq!(
        predicate.operand(),
        &Operand::Range {
            lower: Value::from(5),
            upper: Value::from(10),
        }
    );
}

#[test]
fn future_offsets() {
    let mut q = builder();
    let next_week = q.now_with(plus(7, days()).unwrap());
    q.field("due").unwrap().lte(next_week).unwrap();
    assert_eq!(
        q.serialize().unwrap(),
        "due:[* TO 2024-03-01T12:00:00Z+7DAYS]"
    );
}

#[test]
fn text_backend_refuses_object_output() {
    let mut q = builder();
    q.field("a").unwrap().matches("1").unwrap();
    let err = q.to_object().unwrap_err();
    assert!(err.is_unsupported());
    assert!(!err.is_invalid_query());
}

#[test]
fn same_tree_renders_for_both_backends() {
    let mut q = builder();
    q.field("title").unwrap().matches("x").unwrap();
    let root = q.into_root();

    let solr = QueryConfig::default().serializer();
    let elastic = QueryConfig::default()
        .with_backend(Backend::Elastic)
        .serializer();

    assert_eq!(solr.to_text(&root).unwrap(), "title:x");
    assert!(elastic.to_object(&root).unwrap().is_object());
}

#[test]
fn tree_round_trips_through_json() {
    let mut q = builder();
    q.field("title")
        .unwrap()
        .matches("x")
        .unwrap()
        .with_similarity(2.0)
        .unwrap();
    q.not(|q| {
        let yesterday = q.now_with(q.minus(1, days())?);
        q.field("seen")?.gte(yesterday)?;
        Ok(())
    })
    .unwrap();

    let json = serde_json::to_string(q.root()).unwrap();
    let restored: ClauseGroup = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, q.root());
}

#[test]
fn hand_built_tree_matches_builder_output() {
    let mut or = ClauseGroup::new(GroupMode::Or);
    or.push(Predicate::equals("featured", true).unwrap());
    or.push(Predicate::compare("likes", Op::GreaterThan, 50).unwrap());
    let mut root = ClauseGroup::default();
    root.push(Member::Group(or));

    let mut q = builder();
    q.or(|q| {
        q.field("featured")?.matches(true)?;
        q.field("likes")?.gt(50)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(q.root(), &root);
}

// ============================================================================
// Operand and nesting semantics on both backends
// ============================================================================

fn elastic_builder() -> QueryBuilder {
    QueryBuilder::with_config(QueryConfig::default().with_backend(Backend::Elastic)).at(instant())
}

#[test]
fn multi_word_operands_stay_one_term() {
    let mut q = builder();
    q.content_type("/page/article").unwrap();
    q.field("title")
        .unwrap()
        .matches("hello world")
        .unwrap()
        .with_similarity(2.0)
        .unwrap();
    q.field("name").unwrap().lte("john smith").unwrap();

    assert_eq!(
        q.serialize().unwrap(),
        r#"contentType:/page/article title:"hello world"^2 name:[* TO "john smith"]"#
    );

    let mut q = elastic_builder();
    q.field("title")
        .unwrap()
        .matches("hello world")
        .unwrap()
        .with_similarity(2.0)
        .unwrap();
    q.field("name").unwrap().lte("john smith").unwrap();
    assert_eq!(
        q.to_object().unwrap(),
        serde_json::json!({ "bool": { "must": [
            { "match_phrase": { "title": { "query": "hello world", "boost": 2.0 } } },
            { "range": { "name": { "lte": "john smith" } } }
        ] } })
    );
}

#[test]
fn blank_operand_rejected() {
    let mut q = builder();
    let err = q.field("tag").unwrap().matches(" ").err().unwrap();
    assert!(matches!(err, QueryError::EmptyValue { ref field } if field == "tag"));
    assert!(q.root().is_empty());
    assert_eq!(q.serialize().unwrap(), "*:*");
}

#[test]
fn exclusion_inside_disjunction_keeps_or_semantics() {
    let scope = |q: &mut QueryBuilder| -> quarry::Result<()> {
        q.field("a")?.matches("1")?;
        q.not(|q| {
            q.field("b")?.matches("2")?;
            Ok(())
        })?;
        Ok(())
    };

    let mut solr = builder();
    solr.or(scope).unwrap();
    assert_eq!(solr.serialize().unwrap(), "(a:1 OR (*:* -(b:2)))");

    let mut elastic = elastic_builder();
    elastic.or(scope).unwrap();
    assert_eq!(
        elastic.to_object().unwrap(),
        serde_json::json!({ "bool": { "must": [ { "bool": {
            "should": [
                { "match": { "a": { "query": "1" } } },
                { "bool": { "must_not": [ { "match": { "b": { "query": "2" } } } ] } }
            ],
            "minimum_should_match": 1
        } } ] } })
    );
}

#[test]
fn deserialized_tree_is_checked() {
    let json = r#"{"mode":"and","members":[{"predicate":{"field":"likes",
        "op":"greater_than","operand":{"single":{"type":"number","value":50}},"boost":2.0}}]}"#;
    assert!(serde_json::from_str::<ClauseGroup>(json).is_err());
}
