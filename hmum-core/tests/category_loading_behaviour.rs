//! Behavioural tests for loading category configurations from disk.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use hmum_core::{CategoryConfiguration, CategorySource, ConfigurationError, DirectoryCategorySource};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tempfile::TempDir;

fn tv_category() -> Value {
    json!({
        "category_id": "tv",
        "name": "Televisions",
        "attributes": [
            {
                "id": "brightness",
                "data_field": { "fact": "display.peak_nits" },
                "weight": 3.0,
                "normalization": { "kind": "log_normal", "mu": 6.5, "sigma": 0.7 },
                "missing_value_strategy": "impute_penalty",
                "impute_value": 200
            },
            {
                "id": "input_lag",
                "data_field": { "fact": "gaming.input_lag_ms" },
                "weight": 1.0,
                "direction": "minimize",
                "normalization": { "kind": "linear", "min": 5, "max": 40 },
                "missing_value_strategy": "impute_neutral"
            },
            {
                "id": "editorial",
                "data_field": "base_score",
                "weight": 2.0,
                "normalization": { "kind": "linear", "min": 0, "max": 10 },
                "missing_value_strategy": "fail"
            }
        ],
        "contexts": [
            { "id": "gaming", "label": "Gaming", "weight_multipliers": { "input_lag": 4.0 } },
            { "id": "bright_room", "label": "Bright room", "weight_multipliers": { "brightness": 2.0 } },
            { "id": "dark_room", "label": "Dark room" }
        ],
        "mutually_exclusive": [["bright_room", "dark_room"]]
    })
}

#[derive(Debug)]
struct LoadingWorld {
    tmp: TempDir,
    result: RefCell<Option<Result<CategoryConfiguration, ConfigurationError>>>,
}

impl LoadingWorld {
    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.tmp.path().to_path_buf()).expect("utf-8 tempdir")
    }

    fn write(&self, file_stem: &str, category: &Value) {
        let path = self.root().join(format!("{file_stem}.json"));
        let json = serde_json::to_string_pretty(category).expect("serialise category");
        std::fs::write(path, json).expect("write category file");
    }

    fn error(&self) -> ConfigurationError {
        self.result
            .borrow_mut()
            .take()
            .expect("a load was attempted")
            .expect_err("loading should fail")
    }
}

#[fixture]
fn world() -> LoadingWorld {
    LoadingWorld {
        tmp: TempDir::new().expect("tempdir"),
        result: RefCell::new(None),
    }
}

#[given("a configuration directory containing the \"tv\" category")]
fn given_tv(world: &LoadingWorld) {
    world.write("tv", &tv_category());
}

#[given("a configuration directory where the \"tv\" category is saved as \"monitors\"")]
fn given_misnamed(world: &LoadingWorld) {
    world.write("monitors", &tv_category());
}

#[given("a configuration directory containing a \"tv\" category with a context for \"sound\"")]
fn given_unknown_attribute(world: &LoadingWorld) {
    let mut category = tv_category();
    category["contexts"][0]["weight_multipliers"]["sound"] = json!(2.0);
    world.write("tv", &category);
}

#[when("I load the \"tv\" category")]
fn when_load_tv(world: &LoadingWorld) {
    let source = DirectoryCategorySource::new(world.root());
    world.result.replace(Some(source.load("tv")));
}

#[when("I load the \"monitors\" category")]
fn when_load_monitors(world: &LoadingWorld) {
    let source = DirectoryCategorySource::new(world.root());
    world.result.replace(Some(source.load("monitors")));
}

#[when("I load the \"audio\" category")]
fn when_load_audio(world: &LoadingWorld) {
    let source = DirectoryCategorySource::new(world.root());
    world.result.replace(Some(source.load("audio")));
}

#[then("the category loads with 3 attributes")]
fn then_three_attributes(world: &LoadingWorld) {
    let borrowed = world.result.borrow();
    let category = borrowed
        .as_ref()
        .expect("a load was attempted")
        .as_ref()
        .expect("category should load");
    assert_eq!(category.attributes().len(), 3);
    assert_eq!(category.name(), "Televisions");
}

#[then("the contexts are listed in declaration order")]
fn then_context_order(world: &LoadingWorld) {
    let borrowed = world.result.borrow();
    let category = borrowed
        .as_ref()
        .expect("a load was attempted")
        .as_ref()
        .expect("category should load");
    let ids: Vec<_> = category.contexts().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["gaming", "bright_room", "dark_room"]);
}

#[then("loading fails with a category id mismatch")]
fn then_mismatch(world: &LoadingWorld) {
    let err = world.error();
    assert!(
        matches!(
            &err,
            ConfigurationError::CategoryIdMismatch { expected, found }
                if expected == "monitors" && found == "tv"
        ),
        "unexpected error: {err:?}"
    );
}

#[then("loading fails naming the unknown attribute \"sound\"")]
fn then_unknown_attribute(world: &LoadingWorld) {
    let err = world.error();
    let ConfigurationError::InvalidFile { source, .. } = &err else {
        panic!("expected InvalidFile, got {err:?}");
    };
    assert!(
        matches!(
            source.as_ref(),
            ConfigurationError::UnknownAttribute { attribute, .. } if attribute == "sound"
        ),
        "unexpected source: {source:?}"
    );
}

#[then("loading fails with an unknown category error")]
fn then_unknown_category(world: &LoadingWorld) {
    let err = world.error();
    assert!(matches!(err, ConfigurationError::UnknownCategory { .. }));
}

#[scenario(path = "tests/features/category_loading.feature", index = 0)]
fn loads_valid_category(world: LoadingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/category_loading.feature", index = 1)]
fn rejects_mismatched_file_name(world: LoadingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/category_loading.feature", index = 2)]
fn rejects_unknown_attribute_reference(world: LoadingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/category_loading.feature", index = 3)]
fn reports_missing_category(world: LoadingWorld) {
    let _ = world;
}
