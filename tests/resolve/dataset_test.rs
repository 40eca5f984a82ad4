use std::collections::HashMap;

use rusqlite::Connection;
use vantage::model::{
    Column, Config, Dataset, Filter, FilterEntry, FilterType, LocationColumns, QueryColumns, View,
    ViewFilterRef,
};
use vantage::resolve::dataset::{introspect_dataset, write_dataset_artifact, DatasetError};
use vantage::source::SqliteSource;

fn snapshot() -> SqliteSource {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE dataset (chrom TEXT, start INTEGER, end INTEGER, species TEXT);
         INSERT INTO dataset VALUES ('chr1', 100, 200, 'mouse');",
    )
    .unwrap();
    SqliteSource::from_connection(conn).unwrap()
}

fn annotations() -> Dataset {
    Dataset {
        name: "annotations".to_string(),
        path: "/tmp/annotations.sqlite".into(),
        create_columns: vec![],
    }
}

fn catalog_filter(id: &str, filter_type: FilterType, query_columns: Option<QueryColumns>) -> Filter {
    Filter {
        id: id.to_string(),
        label: format!("{id} label"),
        filter_type,
        match_mode: None,
        filter_labels: None,
        min: None,
        max: None,
        query_columns,
        regex: None,
    }
}

fn genes_view(filter_ids: &[&str]) -> View {
    View {
        id: "genes".to_string(),
        name: "Genes".to_string(),
        url_name: "genes".to_string(),
        source: "annotations".to_string(),
        include_remaining_columns: false,
        filters: filter_ids
            .iter()
            .map(|id| FilterEntry::Bare(ViewFilterRef::new(*id)))
            .collect(),
        columns: vec![],
    }
}

fn config(filters: Vec<Filter>, views: Vec<View>) -> Config {
    Config {
        filters,
        views,
        columns: HashMap::new(),
    }
}

#[test]
fn builds_default_columns_in_schema_order() {
    let config = config(vec![], vec![]);
    let result = introspect_dataset(&annotations(), &snapshot(), &config).unwrap();

    let names: Vec<_> = result.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["chrom", "start", "end", "species"]);

    let species = result.column("species").unwrap();
    assert_eq!(species.label, "Species");
    assert!(species.sortable);
    assert!(!species.hidden);
}

#[test]
fn misspelled_query_column_fails_naming_view_and_column() {
    let filter = catalog_filter(
        "species",
        FilterType::SelectList,
        Some(QueryColumns::Single {
            column: "speciez".to_string(),
        }),
    );
    let config = config(vec![filter], vec![genes_view(&["species"])]);
    let err = introspect_dataset(&annotations(), &snapshot(), &config).unwrap_err();
    match err {
        DatasetError::UnknownQueryColumn {
            view,
            filter_id,
            column,
            dataset,
        } => {
            assert_eq!(view, "genes");
            assert_eq!(filter_id, "species");
            assert_eq!(column, "speciez");
            assert_eq!(dataset, "annotations");
        }
        other => panic!("expected UnknownQueryColumn, got {other:?}"),
    }
}

#[test]
fn location_roles_are_checked_against_the_schema() {
    let filter = catalog_filter(
        "region",
        FilterType::Location,
        Some(QueryColumns::Location(LocationColumns {
            region: "chrom".to_string(),
            start: "start".to_string(),
            end: "stop".to_string(), // not a real column
            strand: None,
            bin: None,
        })),
    );
    let config = config(vec![filter], vec![genes_view(&["region"])]);
    let err = introspect_dataset(&annotations(), &snapshot(), &config).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::UnknownLocationColumn { role: "end", ref column, .. } if column == "stop"
    ));
}

#[test]
fn optional_location_roles_are_checked_only_when_declared() {
    let mut location = LocationColumns {
        region: "chrom".to_string(),
        start: "start".to_string(),
        end: "end".to_string(),
        strand: None,
        bin: None,
    };
    let make_config = |loc: LocationColumns| {
        config(
            vec![catalog_filter(
                "region",
                FilterType::Location,
                Some(QueryColumns::Location(loc)),
            )],
            vec![genes_view(&["region"])],
        )
    };

    // No optional roles declared: passes
    let ok = make_config(location.clone());
    assert!(introspect_dataset(&annotations(), &snapshot(), &ok).is_ok());

    // Declared strand column must exist
    location.strand = Some("strand".to_string());
    let bad = make_config(location);
    assert!(matches!(
        introspect_dataset(&annotations(), &snapshot(), &bad),
        Err(DatasetError::UnknownLocationColumn { role: "strand", .. })
    ));
}

#[test]
fn filters_without_query_columns_are_not_checked() {
    // 'species' doubles as the column name, but only explicit declarations
    // are validated against the schema
    let filter = catalog_filter("nonexistent_column", FilterType::Select, None);
    let config = config(vec![filter], vec![genes_view(&["nonexistent_column"])]);
    assert!(introspect_dataset(&annotations(), &snapshot(), &config).is_ok());
}

#[test]
fn unknown_override_column_fails_for_the_owning_view() {
    let mut overrides: HashMap<String, HashMap<String, Column>> = HashMap::new();
    overrides
        .entry("genes".to_string())
        .or_default()
        .insert("speciez".to_string(), Column::default());
    let config = Config {
        filters: vec![],
        views: vec![genes_view(&[])],
        columns: overrides,
    };
    let err = introspect_dataset(&annotations(), &snapshot(), &config).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::UnknownOverrideColumn { ref view, ref column, .. }
            if view == "genes" && column == "speciez"
    ));
}

#[test]
fn overrides_for_other_views_are_ignored() {
    // Overrides are keyed by view id; an entry for an unrelated view must
    // not be validated against this dataset
    let mut overrides: HashMap<String, HashMap<String, Column>> = HashMap::new();
    overrides
        .entry("other_view".to_string())
        .or_default()
        .insert("speciez".to_string(), Column::default());
    let config = Config {
        filters: vec![],
        views: vec![genes_view(&[])],
        columns: overrides,
    };
    assert!(introspect_dataset(&annotations(), &snapshot(), &config).is_ok());
}

#[test]
fn writes_dataset_artifact_as_json() {
    let config = config(vec![], vec![]);
    let result = introspect_dataset(&annotations(), &snapshot(), &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = write_dataset_artifact(&result, dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "dataset-annotations.json");

    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["name"], "annotations");
    assert_eq!(parsed["columns"][3]["label"], "Species");
}
