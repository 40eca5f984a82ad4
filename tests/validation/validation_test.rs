use std::collections::HashMap;

use vantage::model::{
    Config, Dataset, Filter, FilterEntry, FilterType, View, ViewFilterGroup, ViewFilterRef,
};
use vantage::validation::{validate_config, validate_datasets, validate_sources, ConfigError};

fn filter(id: &str, filter_type: FilterType) -> Filter {
    Filter {
        id: id.to_string(),
        label: format!("{id} label"),
        filter_type,
        match_mode: None,
        filter_labels: None,
        min: None,
        max: None,
        query_columns: None,
        regex: None,
    }
}

fn view(id: &str, filters: Vec<FilterEntry>) -> View {
    View {
        id: id.to_string(),
        name: format!("{id} view"),
        url_name: id.to_string(),
        source: "annotations".to_string(),
        include_remaining_columns: false,
        filters,
        columns: vec![],
    }
}

fn bare(filter_id: &str) -> FilterEntry {
    FilterEntry::Bare(ViewFilterRef::new(filter_id))
}

fn group(group_id: &str, members: &[&str]) -> FilterEntry {
    FilterEntry::Group(ViewFilterGroup {
        group_id: group_id.to_string(),
        group_label: format!("{group_id} label"),
        filters: members.iter().map(|m| ViewFilterRef::new(*m)).collect(),
    })
}

fn config(filters: Vec<Filter>, views: Vec<View>) -> Config {
    Config {
        filters,
        views,
        columns: HashMap::new(),
    }
}

#[test]
fn accepts_consistent_config() {
    let config = config(
        vec![
            filter("species", FilterType::SelectList),
            filter("region", FilterType::Location),
        ],
        vec![view(
            "genes",
            vec![group("loc", &["region"]), bare("species")],
        )],
    );
    assert!(validate_config(&config).is_ok());
}

#[test]
fn rejects_duplicate_filter_id() {
    let config = config(
        vec![
            filter("species", FilterType::Select),
            filter("species", FilterType::Range),
        ],
        vec![view("genes", vec![bare("species")])],
    );
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::DuplicateFilterId { id }) if id == "species"
    ));
}

#[test]
fn rejects_unknown_filter_reference() {
    let config = config(
        vec![filter("species", FilterType::Select)],
        vec![view("genes", vec![bare("species"), bare("missing")])],
    );
    let err = validate_config(&config).unwrap_err();
    match err {
        ConfigError::UnknownFilter { filter_id, view } => {
            assert_eq!(filter_id, "missing");
            assert_eq!(view, "genes view");
        }
        other => panic!("expected UnknownFilter, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_filter_inside_group() {
    let config = config(
        vec![filter("species", FilterType::Select)],
        vec![view("genes", vec![group("loc", &["species", "ghost"])])],
    );
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::UnknownFilter { filter_id, .. }) if filter_id == "ghost"
    ));
}

#[test]
fn rejects_duplicate_group_id_within_view() {
    let config = config(
        vec![
            filter("species", FilterType::Select),
            filter("region", FilterType::Location),
        ],
        vec![view(
            "genes",
            vec![group("loc", &["region"]), group("loc", &["species"])],
        )],
    );
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::DuplicateGroupId { group_id, .. }) if group_id == "loc"
    ));
}

#[test]
fn same_group_id_in_different_views_is_fine() {
    let config = config(
        vec![
            filter("species", FilterType::Select),
            filter("region", FilterType::Location),
        ],
        vec![
            view("genes", vec![group("loc", &["region"])]),
            view("variants", vec![group("loc", &["species"])]),
        ],
    );
    assert!(validate_config(&config).is_ok());
}

#[test]
fn rejects_unused_catalog_filter() {
    // Usage is judged only after every view has been walked
    let config = config(
        vec![
            filter("species", FilterType::Select),
            filter("orphan", FilterType::Range),
        ],
        vec![
            view("genes", vec![bare("species")]),
            view("variants", vec![group("grp", &["species"])]),
        ],
    );
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::UnusedFilter { id }) if id == "orphan"
    ));
}

#[test]
fn usage_across_views_covers_the_catalog() {
    let config = config(
        vec![
            filter("species", FilterType::Select),
            filter("region", FilterType::Location),
        ],
        vec![
            view("genes", vec![bare("species")]),
            view("variants", vec![group("loc", &["region"])]),
        ],
    );
    assert!(validate_config(&config).is_ok());
}

#[test]
fn rejects_invalid_filter_regex() {
    let mut bad = filter("loc_text", FilterType::Location);
    bad.regex = Some("(?P<region>[^:]+".to_string());
    let config = config(vec![bad], vec![view("genes", vec![bare("loc_text")])]);
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::InvalidRegex { filter_id, .. }) if filter_id == "loc_text"
    ));
}

#[test]
fn accepts_compiling_location_regex() {
    let mut good = filter("loc_text", FilterType::Location);
    good.regex = Some(r"(?P<region>[^:]+):(?P<start>\d+)-(?P<end>\d+):?(?P<strand>[+-])?".into());
    let config = config(vec![good], vec![view("genes", vec![bare("loc_text")])]);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn rejects_missing_dataset_path() {
    let datasets = vec![Dataset {
        name: "annotations".to_string(),
        path: "/definitely/not/here.sqlite".into(),
        create_columns: vec![],
    }];
    let err = validate_datasets(&datasets).unwrap_err();
    match err {
        ConfigError::MissingDatasetPath { dataset, path } => {
            assert_eq!(dataset, "annotations");
            assert!(path.contains("not/here"));
        }
        other => panic!("expected MissingDatasetPath, got {other:?}"),
    }
}

#[test]
fn rejects_duplicate_dataset_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.sqlite");
    std::fs::write(&path, b"").unwrap();
    let datasets = vec![
        Dataset {
            name: "annotations".to_string(),
            path: path.clone(),
            create_columns: vec![],
        },
        Dataset {
            name: "annotations".to_string(),
            path,
            create_columns: vec![],
        },
    ];
    assert!(matches!(
        validate_datasets(&datasets),
        Err(ConfigError::DuplicateDataset { name }) if name == "annotations"
    ));
}

#[test]
fn rejects_view_over_undeclared_dataset() {
    let config = config(
        vec![filter("species", FilterType::Select)],
        vec![view("genes", vec![bare("species")])],
    );
    let datasets = vec![Dataset {
        name: "annotation".to_string(), // view sources "annotations"
        path: "/tmp/annotation.sqlite".into(),
        create_columns: vec![],
    }];
    let err = validate_sources(&config, &datasets).unwrap_err();
    match err {
        ConfigError::UnknownDatasetSource { view, source } => {
            assert_eq!(view, "genes");
            assert_eq!(source, "annotations");
        }
        other => panic!("expected UnknownDatasetSource, got {other:?}"),
    }
}

#[test]
fn accepts_views_over_declared_datasets() {
    let config = config(
        vec![filter("species", FilterType::Select)],
        vec![view("genes", vec![bare("species")])],
    );
    let datasets = vec![Dataset {
        name: "annotations".to_string(),
        path: "/tmp/annotations.sqlite".into(),
        create_columns: vec![],
    }];
    assert!(validate_sources(&config, &datasets).is_ok());
}

#[test]
fn error_messages_carry_enough_context() {
    let err = ConfigError::UnknownFilter {
        filter_id: "speciez".to_string(),
        view: "genes".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("speciez"));
    assert!(message.contains("genes"));
}
