//! Behaviour-driven step definitions driving the rank CLI scenarios.

use super::helpers::Workspace;
use super::*;
use camino::Utf8PathBuf;
use hmum_core::ConfigurationError;
use hmum_scorer::{ContextError, MutualExclusionError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;

#[derive(Debug)]
struct RankWorld {
    workspace: Workspace,
    cli_args: RefCell<Vec<String>>,
    output_path: RefCell<Option<Utf8PathBuf>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl RankWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            cli_args: RefCell::new(Vec::new()),
            output_path: RefCell::new(None),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self, category: &str) -> Vec<String> {
        let mut argv = vec![
            "hmum".to_owned(),
            "rank".to_owned(),
            self.workspace.products_path().into_string(),
            format!("--{ARG_CONFIG_DIR}"),
            self.workspace.config_dir().into_string(),
            format!("--{ARG_CATEGORY}"),
            category.to_owned(),
        ];
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }

    fn printed_ranking(&self) -> Value {
        serde_json::from_slice(&self.stdout.borrow()).expect("output should be JSON ranking")
    }
}

fn ids_in(ranking: &Value, section: &str) -> Vec<String> {
    ranking[section]
        .as_array()
        .expect("ranking section")
        .iter()
        .map(|entry| {
            entry["product_id"]
                .as_str()
                .expect("product id")
                .to_owned()
        })
        .collect()
}

#[fixture]
fn world() -> RankWorld {
    RankWorld::new()
}

#[given("the demo television workspace")]
fn demo_workspace(#[from(world)] world: &RankWorld) {
    assert!(
        world.workspace.products_path().is_file(),
        "expected the demo catalogue on disk",
    );
    assert!(
        world.workspace.category_path("tv").is_file(),
        "expected the demo category on disk",
    );
}

#[given("I pass the context {context:word}")]
fn pass_context(#[from(world)] world: &RankWorld, context: String) {
    let clean_context = context.trim_matches('"').to_owned();
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_CONTEXT}"), clean_context]);
}

#[given("I ask for the ranking to be written to a file")]
fn ask_for_output_file(#[from(world)] world: &RankWorld) {
    let path = world.workspace.root().join("out").join("ranking.json");
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_OUTPUT}"), path.as_str().to_owned()]);
    world.output_path.replace(Some(path));
}

#[when("I run the rank command for {category:word}")]
fn run_rank_command(#[from(world)] world: &RankWorld, category: String) {
    let invocation = world.build_command_line(category.trim_matches('"'));
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| {
        let mut buffer = world.stdout.borrow_mut();
        run_command(cli.command, &mut *buffer)
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints a ranking")]
fn command_succeeds(#[from(world)] world: &RankWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    if let Err(err) = result {
        panic!("expected success, found {err:?}");
    }

    let ranking = world.printed_ranking();
    assert_eq!(ranking["category_id"], "tv");
    let ranks: Vec<u64> = ranking["ranked"]
        .as_array()
        .expect("ranked entries")
        .iter()
        .map(|entry| entry["rank"].as_u64().expect("rank"))
        .collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[then("{product:word} is listed as excluded")]
fn listed_as_excluded(#[from(world)] world: &RankWorld, product: String) {
    let excluded = ids_in(&world.printed_ranking(), "excluded");
    assert_eq!(excluded, vec![product.trim_matches('"').to_owned()]);
}

#[then("{product:word} is listed as failed")]
fn listed_as_failed(#[from(world)] world: &RankWorld, product: String) {
    let failed = ids_in(&world.printed_ranking(), "failed");
    assert_eq!(failed, vec![product.trim_matches('"').to_owned()]);
}

#[then("the ranking lists the contexts {context:word}")]
fn ranking_lists_contexts(#[from(world)] world: &RankWorld, context: String) {
    let ranking = world.printed_ranking();
    assert_eq!(
        ranking["contexts"],
        serde_json::json!([context.trim_matches('"')])
    );
}

#[then("the command fails because the contexts are mutually exclusive")]
fn fails_mutually_exclusive(#[from(world)] world: &RankWorld) {
    match &*world.error() {
        CliError::Context(ContextError::MutuallyExclusive(MutualExclusionError {
            first,
            second,
        })) => {
            assert_eq!(first, "bright_room");
            assert_eq!(second, "dark_room");
        }
        other => panic!("expected MutuallyExclusive, found {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}

#[then("the command fails because the category is unknown")]
fn fails_unknown_category(#[from(world)] world: &RankWorld) {
    match &*world.error() {
        CliError::Category(ConfigurationError::UnknownCategory { id }) => {
            assert_eq!(id, "kettles");
        }
        other => panic!("expected UnknownCategory, found {other:?}"),
    }
}

#[then("the ranking file holds the ranking and nothing is printed")]
fn ranking_written_to_file(#[from(world)] world: &RankWorld) {
    let borrowed = world.result.borrow();
    if let Some(Err(err)) = borrowed.as_ref() {
        panic!("expected success, found {err:?}");
    }
    assert!(world.stdout.borrow().is_empty());

    let path = world.output_path.borrow().clone().expect("output path set");
    let contents = hmum_fs::read_utf8_to_string(&path).expect("ranking file written");
    let ranking: Value = serde_json::from_str(&contents).expect("file holds JSON");
    assert_eq!(ranking["category_id"], "tv");
}

macro_rules! register_rank_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/rank_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: RankWorld) {
            let _ = world;
        }
    };
}

register_rank_scenario!(rank_demo_catalogue, "ranking the demo catalogue");
register_rank_scenario!(rank_gaming_session, "ranking for a gaming session");
register_rank_scenario!(rank_exclusive_contexts, "rejecting mutually exclusive contexts");
register_rank_scenario!(rank_unknown_category, "rejecting an unknown category");
register_rank_scenario!(rank_to_file, "writing the ranking to a file");
