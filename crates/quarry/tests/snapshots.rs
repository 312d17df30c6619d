use chrono::{TimeZone, Utc};
use insta::assert_snapshot;
use quarry::datemath::{hours, minus, years};
use quarry::{NowAnchor, QueryBuilder, QueryConfig};

fn builder(config: QueryConfig) -> QueryBuilder {
    QueryBuilder::with_config(config).at(Utc.with_ymd_and_hms(2025, 6, 30, 8, 15, 0).unwrap())
}

#[test]
fn test_snapshots_content_listing() {
    let mut q = builder(QueryConfig::default());
    q.content_type("products/shoes").unwrap();
    q.field("brand").unwrap().matches("acme").unwrap();
    q.field("price").unwrap().between(20, 99.5).unwrap();
    q.or(|q| {
        q.field("color").unwrap().matches("red").unwrap();
        q.field("color").unwrap().matches("blue").unwrap();
        Ok(())
    })
    .unwrap();

    assert_snapshot!(
        q.to_string(),
        @"contentType:products/shoes brand:acme price:[20 TO 99.5] (color:red OR color:blue)"
    );
}

#[test]
fn test_snapshots_escaped_operands() {
    let mut q = builder(QueryConfig::default());
    q.field("path")
        .unwrap()
        .matches(r"C:\docs\{draft}[1] (old)")
        .unwrap();

    assert_snapshot!(q.to_string(), @r#"path:"C\:\\docs\\\{draft\}\[1\] \(old\)""#);
}

#[test]
fn test_snapshots_recent_unexpired() {
    let mut q = builder(QueryConfig::default());
    let cutoff = q.now_with(minus(6, hours()).unwrap());
    q.field("created").unwrap().gt(cutoff).unwrap();
    q.not(|q| {
        let now = q.now();
        q.field("expired_dt")?.lte(now)?;
        Ok(())
    })
    .unwrap();

    assert_snapshot!(
        q.to_string(),
        @"created:{2025-06-30T08:15:00Z-6HOURS TO *] -(expired_dt:[* TO 2025-06-30T08:15:00Z])"
    );
}

#[test]
fn test_snapshots_engine_now() {
    let mut q = builder(QueryConfig::default().with_now(NowAnchor::Engine));
    let cutoff = q.now_with(minus(1, years()).unwrap());
    q.field("modified").unwrap().gte(cutoff).unwrap();
    let now = q.now();
    q.field("published").unwrap().matches(now).unwrap();

    assert_snapshot!(
        q.to_string(),
        @r#"modified:[NOW-1YEARS TO *] published:"NOW""#
    );
}

#[test]
fn test_snapshots_empty_query() {
    let q = builder(QueryConfig::default());
    assert_snapshot!(q.to_string(), @"*:*");
}
