#![cfg(all(feature = "simulator", feature = "derive"))]

use pretty_assertions::assert_eq;
use switchy_materialize::{
    MaterializeError, QueryError, Record, Value, row,
    simulator::{SimulatedRowSource, SimulatedRowSourceError},
    source::{
        query, query_async, query_first_optional, query_first_optional_async, query_many,
        query_many_async,
    },
};

#[derive(Debug, Default, PartialEq, Record)]
pub struct Artist {
    pub id: u64,
    pub name: String,
    pub genre: Option<String>,
}

fn source() -> SimulatedRowSource {
    SimulatedRowSource::new()
        .with_response(
            "SELECT id, name, genre FROM artists",
            vec![vec![
                row!["id" => 1_u64, "name" => "Low", "genre" => "slowcore"],
                row!["id" => 2_u64, "name" => "Codeine", "genre" => Value::Null],
            ]],
        )
        .with_response(
            "SELECT COUNT(*) FROM artists; SELECT name FROM artists",
            vec![
                vec![row!["count" => 2_i64]],
                vec![row!["name" => "Low"], row!["name" => "Codeine"]],
            ],
        )
        .with_response("SELECT name FROM artists WHERE id = ?", vec![vec![]])
        .with_response(
            "SELECT genre FROM artists WHERE id = ?",
            vec![vec![row!["genre" => Value::Null]]],
        )
        .with_response(
            "SELECT id FROM artists",
            vec![vec![row!["id" => 1_u64]]],
        )
}

#[test_log::test(tokio::test)]
async fn async_query_materializes_records() {
    let source = source();

    let artists = query_async::<Artist, _>(&source, "SELECT id, name, genre FROM artists", &[])
        .await
        .unwrap();

    assert_eq!(
        artists,
        vec![
            Artist {
                id: 1,
                name: "Low".to_string(),
                genre: Some("slowcore".to_string()),
            },
            Artist {
                id: 2,
                name: "Codeine".to_string(),
                genre: None,
            },
        ]
    );
}

#[test_log::test(tokio::test)]
async fn async_and_sync_queries_agree() {
    let source = source();
    let sql = "SELECT id, name, genre FROM artists";

    assert_eq!(
        query_async::<Artist, _>(&source, sql, &[]).await.unwrap(),
        query::<Artist, _>(&source, sql, &[]).unwrap()
    );
}

#[test_log::test(tokio::test)]
async fn async_query_many_maps_each_result_set() {
    let source = source();

    let (counts, names) = query_many_async::<(i64, String), _>(
        &source,
        "SELECT COUNT(*) FROM artists; SELECT name FROM artists",
        &[],
    )
    .await
    .unwrap();

    assert_eq!(counts, vec![2]);
    assert_eq!(names, vec!["Low".to_string(), "Codeine".to_string()]);
}

#[test_log::test(tokio::test)]
async fn async_first_optional_reports_absent_and_null() {
    let source = source();

    let absent = query_first_optional_async::<String, _>(
        &source,
        "SELECT name FROM artists WHERE id = ?",
        &[Value::from(42_u64)],
    )
    .await
    .unwrap();
    let null = query_first_optional_async::<Option<String>, _>(
        &source,
        "SELECT genre FROM artists WHERE id = ?",
        &[Value::from(2_u64)],
    )
    .await
    .unwrap();

    assert!(!absent.present);
    assert_eq!(absent.value, "");
    assert!(null.present);
    assert_eq!(null.value, None);
    assert_eq!(
        source
            .executed()
            .into_iter()
            .map(|(_, params)| params)
            .collect::<Vec<_>>(),
        vec![vec![Value::UInt64(42)], vec![Value::UInt64(2)]]
    );
}

#[test_log::test(tokio::test)]
async fn async_type_mismatch_is_a_materialize_error() {
    let source = source();

    let result = query_async::<i32, _>(&source, "SELECT id FROM artists", &[]).await;

    assert!(matches!(
        result,
        Err(QueryError::Materialize(MaterializeError::Conversion { column, .. })) if column == "id"
    ));
}

#[test_log::test(tokio::test)]
async fn async_source_failures_are_passed_through() {
    let source = source();

    let result = query_async::<Artist, _>(&source, "SELECT * FROM albums", &[]).await;

    assert!(matches!(
        result,
        Err(QueryError::Source(SimulatedRowSourceError::UnknownQuery(query)))
            if query == "SELECT * FROM albums"
    ));
}

#[test_log::test]
fn sync_helpers_use_the_same_source() {
    let source = source();

    let (counts, names) = query_many::<(i64, Option<String>), _>(
        &source,
        "SELECT COUNT(*) FROM artists; SELECT name FROM artists",
        &[],
    )
    .unwrap();
    let first = query_first_optional::<u64, _>(&source, "SELECT id FROM artists", &[]).unwrap();

    assert_eq!(counts, vec![2]);
    assert_eq!(names.len(), 2);
    assert_eq!(first.into_option(), Some(1));
    assert!(matches!(
        query::<u64, _>(&source, "", &[]),
        Err(QueryError::Source(SimulatedRowSourceError::EmptyQuery))
    ));
}
