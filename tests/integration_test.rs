use openapi_from_serverless::{
    config::{CollisionPolicy, DocumentationConfig, GeneratorConfig, WriteStrategy},
    error::{Diagnostic, Error},
    generator,
    openapi_builder::{HttpMethod, OpenApiDocument},
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const SERVERLESS: &str = include_str!("fixtures/serverless.yml");
const WIDGETS: &str = include_str!("fixtures/functions/widgets.yml");
const USERS: &str = include_str!("fixtures/functions/users.yml");

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn fixture_project() -> TempDir {
    create_test_project(vec![
        ("serverless.yml", SERVERLESS),
        ("functions/widgets.yml", WIDGETS),
        ("functions/users.yml", USERS),
    ])
}

fn config_for(project: &Path, output: &str) -> GeneratorConfig {
    GeneratorConfig::new(project.join("serverless.yml"), project.join(output))
        .with_base_dir(project)
}

fn read_document(path: &Path) -> OpenApiDocument {
    let content = std::fs::read_to_string(path).expect("Failed to read output");
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&content).expect("Output should be valid JSON")
    } else {
        serde_yaml::from_str(&content).expect("Output should be valid YAML")
    }
}

#[test]
fn test_end_to_end_yaml_generation() {
    let project = fixture_project();
    let config = config_for(project.path(), "swagger.yaml");

    let report = generator::run(&config)
        .expect("Generation should succeed")
        .expect("Documentation block should be found");

    assert_eq!(report.fragments, 2);
    assert_eq!(report.routes, 3);
    assert_eq!(report.operations, 3);
    assert_eq!(
        report.diagnostics,
        vec![
            Diagnostic::MissingFragment {
                path: project.path().join("functions/missing.yml"),
            },
            Diagnostic::MissingComponent {
                header: "X-Trace-Id".to_string(),
            },
            Diagnostic::UnknownTag {
                tag: "internal".to_string(),
            },
        ]
    );

    let document = read_document(&report.output_path);
    assert_eq!(document, report.document);

    assert_eq!(document.openapi, "3.0.0");
    assert_eq!(document.info.title, "Widgets API");
    assert_eq!(document.info.version, "2.0.0");
    assert_eq!(document.servers[0].url, "https://api.widgets.test");
    assert_eq!(document.servers[0].description, "Default server");
    assert_eq!(document.tags[1].name, "users");
    assert_eq!(document.tags[1].description, "Default tag description");

    let paths: Vec<_> = document.paths.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["/users/{id}", "/widgets"]);

    let list = document.paths["/widgets"]
        .operation(HttpMethod::Get)
        .expect("GET /widgets should be documented");
    assert_eq!(list.summary, "No summary provided");
    assert_eq!(list.description, "Lists every widget");
    assert_eq!(list.operation_id, "/widgets");
    assert_eq!(list.tags, Some(vec!["widgets".to_string()]));
    assert_eq!(list.parameters.len(), 2);
    assert_eq!(list.parameters[0].name, "X-Api-Key");
    assert!(list.parameters[0].required);
    assert_eq!(
        list.parameters[0].schema,
        json!({"type": "string", "example": "SUB:${Stage}-api-key"})
    );
    assert_eq!(list.parameters[1].name, "X-Trace-Id");
    assert!(!list.parameters[1].required);
    assert_eq!(list.parameters[1].schema, json!({"type": "string"}));

    let create = document.paths["/widgets"]
        .operation(HttpMethod::Post)
        .expect("POST /widgets should be documented");
    assert_eq!(create.summary, "Create a widget");
    assert_eq!(create.operation_id, "createWidget");

    assert!(document.paths.get("/health").is_none());
}

#[test]
fn test_end_to_end_json_generation() {
    let project = fixture_project();
    let config = config_for(project.path(), "docs/openapi.json");

    let report = generator::run(&config).unwrap().unwrap();

    assert_eq!(report.output_path, project.path().join("docs/openapi.json"));
    let content = std::fs::read_to_string(&report.output_path).unwrap();
    assert!(content.starts_with("{\n  \"openapi\": \"3.0.0\""));

    let document: OpenApiDocument = serde_json::from_str(&content).unwrap();
    assert_eq!(document, report.document);

    let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
    let responses = &raw["paths"]["/users/{id}"]["get"]["responses"];
    assert_eq!(
        responses,
        &json!({
            "200": {"description": "Success"},
            "400": {"description": "Bad Request"},
            "500": {"description": "Internal Server Error"}
        })
    );
    assert_eq!(raw["paths"]["/users/{id}"]["get"]["tags"], json!(["users"]));
}

#[test]
fn test_single_route_without_summary() {
    let project = create_test_project(vec![
        (
            "serverless.yml",
            "functions:\n  - ${file(functions/widgets.yml)}\ncustom:\n  documentation:\n    components: {}\n",
        ),
        (
            "functions/widgets.yml",
            "list:\n  handler: a.b\n  events:\n    - http:\n        path: /widgets\n        method: GET\n        documentation:\n          description: All widgets\n",
        ),
    ]);
    let config = config_for(project.path(), "swagger.yaml");

    let report = generator::run(&config).unwrap().unwrap();
    let document = read_document(&report.output_path);

    assert_eq!(document.info.title, "OpenAPI Swagger Documentation");
    assert!(document.servers.is_empty());
    assert!(document.tags.is_empty());

    let operation = document.paths["/widgets"].get.as_ref().unwrap();
    assert_eq!(operation.summary, "No summary provided");
    assert_eq!(operation.operation_id, "/widgets");
    assert_eq!(
        operation.responses.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["200", "400", "500"]
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_missing_root_config_writes_nothing() {
    let project = create_test_project(vec![]);
    let config = config_for(project.path(), "swagger.yaml");

    let result = generator::run(&config);

    assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    assert!(!project.path().join("swagger.yaml").exists());
}

#[test]
fn test_no_documentation_key_writes_nothing() {
    let project = create_test_project(vec![
        ("serverless.yml", "functions:\n  - ${file(functions/widgets.yml)}\n"),
        ("functions/widgets.yml", WIDGETS),
    ]);
    let config = config_for(project.path(), "swagger.yaml");

    let report = generator::run(&config).unwrap();

    assert!(report.is_none());
    assert!(!project.path().join("swagger.yaml").exists());
}

#[test]
fn test_output_without_extension_is_yaml() {
    let project = fixture_project();
    let config = config_for(project.path(), "out/swagger");

    let report = generator::run(&config).unwrap().unwrap();

    assert_eq!(report.output_path, project.path().join("out/swagger.yaml"));
    assert_eq!(read_document(&report.output_path), report.document);
}

#[test]
fn test_incremental_matches_in_memory() {
    let project = fixture_project();
    let in_memory = generator::run(&config_for(project.path(), "memory.yaml"))
        .unwrap()
        .unwrap();
    let incremental = generator::run(
        &config_for(project.path(), "incremental.yaml").with_strategy(WriteStrategy::Incremental),
    )
    .unwrap()
    .unwrap();

    let written = read_document(&incremental.output_path);
    assert_eq!(written, read_document(&in_memory.output_path));
    assert!(written.paths["/widgets"].get.is_some());
    assert!(written.paths["/widgets"].post.is_some());
    assert_eq!(written.info.title, "Widgets API");
}

#[test]
fn test_incremental_truncates_previous_output() {
    let project = fixture_project();
    std::fs::write(
        project.path().join("swagger.yaml"),
        "paths:\n  /stale:\n    get:\n      summary: old\n",
    )
    .unwrap();
    let config =
        config_for(project.path(), "swagger.yaml").with_strategy(WriteStrategy::Incremental);

    let report = generator::run(&config).unwrap().unwrap();

    let document = read_document(&report.output_path);
    assert!(document.paths.get("/stale").is_none());
}

const DUPLICATE: &str = r#"
listWidgetsV2:
  handler: src/v2.list
  events:
    - http:
        path: /widgets
        method: get
        documentation:
          summary: Second definition
"#;

/// The fixture project with a second fragment that also documents GET /widgets
fn duplicate_project() -> TempDir {
    let serverless = SERVERLESS.replace("functions/missing.yml", "functions/duplicate.yml");
    create_test_project(vec![
        ("serverless.yml", serverless.as_str()),
        ("functions/widgets.yml", WIDGETS),
        ("functions/users.yml", USERS),
        ("functions/duplicate.yml", DUPLICATE),
    ])
}

#[test]
fn test_duplicate_operation_last_write_wins() {
    for strategy in [WriteStrategy::InMemory, WriteStrategy::Incremental] {
        let project = duplicate_project();
        let config = config_for(project.path(), "swagger.yaml").with_strategy(strategy);

        let report = generator::run(&config).unwrap().unwrap();

        assert!(report.diagnostics.contains(&Diagnostic::DuplicateOperation {
            path: "/widgets".to_string(),
            method: "get".to_string(),
        }));
        let document = read_document(&report.output_path);
        let operation = document.paths["/widgets"].get.as_ref().unwrap();
        assert_eq!(operation.summary, "Second definition");
        assert_eq!(operation.parameters, vec![], "{:?}", strategy);
        assert_eq!(operation.tags, None, "{:?}", strategy);
    }
}

const REPLACED_LATER: &str = r#"
tagged:
  handler: src/a.tagged
  events:
    - http:
        path: /gadgets
        method: get
        documentation:
          summary: First gadget
          tags:
            - widgets
plain:
  handler: src/a.plain
  events:
    - http:
        path: /gadgets
        method: get
        documentation:
          summary: Second gadget
"#;

#[test]
fn test_incremental_replacement_after_earlier_collision() {
    let serverless = SERVERLESS.replace("functions/missing.yml", "functions/duplicate.yml");
    let project = create_test_project(vec![
        ("serverless.yml", serverless.as_str()),
        ("functions/widgets.yml", WIDGETS),
        ("functions/users.yml", REPLACED_LATER),
        ("functions/duplicate.yml", DUPLICATE),
    ]);
    let in_memory = generator::run(&config_for(project.path(), "memory.yaml"))
        .unwrap()
        .unwrap();
    let incremental = generator::run(
        &config_for(project.path(), "incremental.yaml").with_strategy(WriteStrategy::Incremental),
    )
    .unwrap()
    .unwrap();

    let written = read_document(&incremental.output_path);
    assert_eq!(written, read_document(&in_memory.output_path));
    let gadget = written.paths["/gadgets"].get.as_ref().unwrap();
    assert_eq!(gadget.summary, "Second gadget");
    assert_eq!(gadget.tags, None);
}

#[test]
fn test_duplicate_operation_fails_when_strict() {
    let project = duplicate_project();
    let config = config_for(project.path(), "swagger.yaml")
        .with_collision_policy(CollisionPolicy::Fail);

    let result = generator::run(&config);

    assert!(matches!(
        result,
        Err(Error::DuplicateOperation { ref path, ref method }) if path == "/widgets" && method == "get"
    ));
    assert!(!project.path().join("swagger.yaml").exists());
}

#[test]
fn test_incremental_strict_duplicate_writes_nothing() {
    let project = duplicate_project();
    let previous = "paths:\n  /kept:\n    get:\n      summary: untouched\n";
    std::fs::write(project.path().join("previous.yaml"), previous).unwrap();

    for output in ["swagger.yaml", "previous.yaml"] {
        let config = config_for(project.path(), output)
            .with_strategy(WriteStrategy::Incremental)
            .with_collision_policy(CollisionPolicy::Fail);

        let result = generator::run(&config);

        assert!(
            matches!(result, Err(Error::DuplicateOperation { .. })),
            "{}",
            output
        );
    }
    assert!(!project.path().join("swagger.yaml").exists());
    assert_eq!(
        std::fs::read_to_string(project.path().join("previous.yaml")).unwrap(),
        previous
    );
}

#[test]
fn test_generate_with_supplied_documentation() {
    let project = fixture_project();
    let config = config_for(project.path(), "swagger.yaml");
    let documentation = DocumentationConfig::from_yaml(
        "api:\n  info:\n    title: Supplied\n  tags:\n    - name: internal\n",
    )
    .unwrap();

    let report = generator::generate(&config, &documentation).unwrap();

    assert_eq!(report.document.info.title, "Supplied");
    let list = report.document.paths["/widgets"].get.as_ref().unwrap();
    assert_eq!(list.tags, Some(vec!["internal".to_string()]));
    // Components come from the supplied block only
    assert_eq!(list.parameters[0].schema, json!({"type": "string"}));
}

#[test]
fn test_unparseable_fragment_aborts_run() {
    let project = create_test_project(vec![
        ("serverless.yml", SERVERLESS),
        ("functions/widgets.yml", WIDGETS),
        ("functions/users.yml", "getUser: [unclosed\n"),
    ]);
    let config = config_for(project.path(), "swagger.yaml");

    match generator::run(&config) {
        Err(Error::ParseError { file, .. }) => {
            assert_eq!(file, project.path().join("functions/users.yml"))
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}
