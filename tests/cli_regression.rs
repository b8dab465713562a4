// Regression tests for the appsync-sdl binary.
// Requires: assert_cmd, predicates, tempfile in [dev-dependencies]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

const SCHEMA: &str = r#"type Query {
  GetTodo(id: ID!): String @AWSLambda(handler: "Controllers/Todo/GetTodo.default")
}
"#;

const CLEAN: &str = "type Query {\n  GetTodo(id: ID!): String\n}\n";

fn appsync_sdl(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("appsync-sdl").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_extract_writes_clean_schema_and_prints_bindings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();

    appsync_sdl(dir.path())
        .args(["extract", "schema.graphql"])
        .assert()
        .success()
        .stdout(
            contains("\"qualifiedName\": \"Query_GetTodo\"")
                .and(contains("\"handler\": \"Controllers/Todo/GetTodo.default\"")),
        );

    let written = fs::read_to_string(dir.path().join(".serverless_schema.graphql")).unwrap();
    assert_eq!(written, CLEAN);
}

#[test]
fn cli_extract_yaml_to_custom_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();

    appsync_sdl(dir.path())
        .args(["extract", "schema.graphql", "--out", "clean.graphql", "--format", "yaml"])
        .assert()
        .success()
        .stdout(contains("parentType: Query").and(contains("fieldName: GetTodo")));

    assert!(dir.path().join("clean.graphql").exists());
    assert!(!dir.path().join(".serverless_schema.graphql").exists());
}

#[test]
fn cli_reports_localized_directive_errors_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("schema.graphql"),
        "type Todo {\n  author: Author! @AWSLambda(handlr: \"x.default\")\n}\n",
    )
    .unwrap();

    appsync_sdl(dir.path())
        .args(["extract", "schema.graphql"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("[author > AWSLambda]").and(contains("appsync_sdl::directive")));

    assert!(!dir.path().join(".serverless_schema.graphql").exists());
}

#[test]
fn cli_reports_syntax_errors_for_empty_schema() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("empty.graphql"), "").unwrap();

    appsync_sdl(dir.path())
        .args(["validate", "empty.graphql"])
        .assert()
        .failure()
        .stderr(contains("appsync_sdl::syntax"));
}

#[test]
fn cli_print_outputs_clean_schema() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();

    appsync_sdl(dir.path())
        .args(["print", "schema.graphql"])
        .assert()
        .success()
        .stdout(CLEAN);
}

#[test]
fn cli_print_diff_shows_removed_directive() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();

    appsync_sdl(dir.path())
        .args(["print", "schema.graphql", "--diff"])
        .assert()
        .success()
        .stdout(contains("-  GetTodo(id: ID!): String @AWSLambda").and(contains("+  GetTodo(id: ID!): String")));
}

#[test]
fn cli_validate_assembles_fragment_directories() {
    let dir = tempfile::tempdir().unwrap();
    let schema_dir = dir.path().join("schema");
    fs::create_dir(&schema_dir).unwrap();
    fs::write(schema_dir.join("query.graphql"), SCHEMA).unwrap();
    fs::write(
        schema_dir.join("todo.graphql"),
        "type Todo { author: String @AWSLambda(handler: \"author.default\") }",
    )
    .unwrap();

    appsync_sdl(dir.path())
        .args(["validate", "schema"])
        .assert()
        .success()
        .stdout(contains("2 @AWSLambda binding(s) across 2 file(s)"));
}

#[test]
fn cli_generate_merges_service_configuration() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("serverless.yml"),
        "service: todo\ncustom:\n  appSync:\n    name: todo-api\n    schema: schema.graphql\n",
    )
    .unwrap();
    fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();

    appsync_sdl(dir.path())
        .args(["generate", "--service-role", "TodoRole"])
        .assert()
        .success()
        .stdout(
            contains("Query_GetTodo")
                .and(contains("AWS_LAMBDA"))
                .and(contains("Fn::GetAtt"))
                .and(contains("TodoRole"))
                .and(contains("name: todo-api"))
                .and(contains(".serverless_schema.graphql")),
        );

    let written = fs::read_to_string(dir.path().join(".serverless_schema.graphql")).unwrap();
    assert_eq!(written, CLEAN);
}

#[test]
fn cli_generate_stdout_is_only_yaml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("serverless.yml"),
        "service: todo\ncustom:\n  appSync:\n    schema: schema.graphql\n",
    )
    .unwrap();
    fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();

    let assert = appsync_sdl(dir.path())
        .arg("generate")
        .assert()
        .success()
        .stdout(contains("wrote").not())
        .stderr(contains("wrote").and(contains("(1 binding(s))")));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&stdout).unwrap();
    assert!(parsed["functions"]["Query_GetTodo"].is_mapping());

    let written = fs::read_to_string(dir.path().join(".serverless_schema.graphql")).unwrap();
    assert_eq!(written, CLEAN);
}

#[test]
fn cli_generate_requires_schema_settings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), "service: todo\n").unwrap();

    appsync_sdl(dir.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(contains("Invalid configuration"));

    assert!(!dir.path().join(".serverless_schema.graphql").exists());
}
