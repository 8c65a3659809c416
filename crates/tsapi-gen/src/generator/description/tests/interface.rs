use http::Method;

use crate::generator::{
  ast::{ParameterLocation, ResponseContent, SchemaRef},
  description::InterfaceDescription,
  metrics::GenerationWarning,
};

const LEAGUE: &str = include_str!("../../../../fixtures/league.d.ts");

fn parse(text: &str) -> (InterfaceDescription, Vec<GenerationWarning>) {
  let mut warnings = vec![];
  let description = InterfaceDescription::parse(text, &mut warnings);
  (description, warnings)
}

#[test]
fn test_locates_structural_blocks() {
  let (description, warnings) = parse(LEAGUE);
  assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

  assert!(description.paths_block().contains(r#""/users/{id}""#));
  assert!(description.schemas_block().trim_start().starts_with("User:"));
  assert!(description.operations_block().contains("getUserById:"));
  assert!(!description.schemas_block().contains("responses: never"));

  let schemas = description.extract_top_level_block("components.schemas");
  assert_eq!(schemas, Some(description.schemas_block()));
  assert!(description.extract_top_level_block("missing").is_none());
}

#[test]
fn test_extract_all_paths_in_declaration_order() {
  let (description, _) = parse(LEAGUE);
  let mut warnings = vec![];
  let paths = description.extract_all_paths(&mut warnings);

  assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
  let names: Vec<_> = paths.iter().map(|entry| entry.path.as_str()).collect();
  assert_eq!(
    names,
    vec![
      "/users/{id}",
      "/v1/users",
      "/matches/{matchId}",
      "/matches/{matchId}/score",
      "/v1/internal/cache",
      "/health",
    ]
  );

  let users = &paths[0];
  let methods: Vec<_> = users.operations.keys().cloned().collect();
  assert_eq!(methods, vec![Method::GET, Method::DELETE]);
  assert_eq!(users.operations[&Method::DELETE].operation_id, "deleteUser");
}

#[test]
fn test_every_operation_reference_yields_one_result() {
  let (description, _) = parse(LEAGUE);
  let mut warnings = vec![];
  let paths = description.extract_all_paths(&mut warnings);

  let ids: Vec<_> = paths
    .iter()
    .flat_map(|entry| entry.operations.values())
    .map(|operation| operation.operation_id.as_str())
    .collect();
  assert_eq!(
    ids,
    vec![
      "getUserById",
      "deleteUser",
      "listUsers",
      "createUser",
      "getMatch",
      "patchMatchStatus",
      "getMatchScore",
      "dumpCache",
      "get_health",
    ]
  );
}

#[test]
fn test_extract_operation_get_user_by_id() {
  let (description, _) = parse(LEAGUE);
  let mut warnings = vec![];
  let operation = description
    .extract_operation("/users/{id}", &Method::GET, &mut warnings)
    .expect("operation should resolve");

  assert_eq!(operation.operation_id, "getUserById");
  assert_eq!(operation.path, "/users/{id}");
  assert!(!operation.synthesized_id);
  assert_eq!(operation.parameters.len(), 1);
  assert_eq!(operation.parameters[0].name, "id");
  assert_eq!(operation.parameters[0].location, ParameterLocation::Path);
  assert_eq!(operation.parameters[0].type_text, "number");
  assert!(operation.request_body.is_none());
  assert_eq!(
    operation.responses.get("200"),
    Some(&ResponseContent::Schema("UserResponse".to_string()))
  );
}

#[test]
fn test_extract_operation_absent_method() {
  let (description, _) = parse(LEAGUE);
  let mut warnings = vec![];
  assert!(
    description
      .extract_operation("/users/{id}", &Method::PUT, &mut warnings)
      .is_none()
  );
  assert!(
    description
      .extract_operation("/nope", &Method::GET, &mut warnings)
      .is_none()
  );
  assert!(warnings.is_empty());
}

#[test]
fn test_extract_operation_query_and_header_parameters() {
  let (description, _) = parse(LEAGUE);
  let mut warnings = vec![];
  let operation = description
    .extract_operation("/v1/users", &Method::GET, &mut warnings)
    .expect("operation should resolve");

  let params: Vec<_> = operation
    .parameters
    .iter()
    .map(|param| (param.name.as_str(), param.location))
    .collect();
  assert_eq!(
    params,
    vec![
      ("page", ParameterLocation::Query),
      ("size", ParameterLocation::Query),
      ("X-Tenant-Id", ParameterLocation::Header),
    ]
  );
  assert!(matches!(operation.responses.get("200"), Some(ResponseContent::Inline(_))));
}

#[test]
fn test_extract_operation_request_body_and_no_content() {
  let (description, _) = parse(LEAGUE);
  let mut warnings = vec![];
  let create = description
    .extract_operation("/v1/users", &Method::POST, &mut warnings)
    .expect("operation should resolve");
  assert_eq!(create.request_body, Some(SchemaRef::Named("UserCreate".to_string())));

  let delete = description
    .extract_operation("/users/{id}", &Method::DELETE, &mut warnings)
    .expect("operation should resolve");
  assert_eq!(delete.responses.get("204"), Some(&ResponseContent::NoContent));
}

#[test]
fn test_inline_operation_gets_synthesized_id() {
  let (description, _) = parse(LEAGUE);
  let mut warnings = vec![];
  let health = description
    .extract_operation("/health", &Method::GET, &mut warnings)
    .expect("inline operation should resolve");

  assert_eq!(health.operation_id, "get_health");
  assert!(health.synthesized_id);
  assert!(!health.has_parameters());
}

#[test]
fn test_schema_lookup() {
  let (description, _) = parse(LEAGUE);
  let names: Vec<_> = description.schema_names().collect();
  assert!(names.contains(&"Match"));
  assert!(names.contains(&"UserResponse"));
  assert_eq!(names.len(), 10);

  let schema = description.schema("Match").expect("Match schema");
  let properties: Vec<_> = schema.properties.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(
    properties,
    vec![
      "id",
      "tournamentType",
      "matchStatus",
      "homeTeam",
      "awayTeam",
      "venueUrl",
      "200",
      "description"
    ]
  );

  let tournament = &schema.properties[1];
  assert_eq!(
    tournament.enum_values,
    Some(vec!["LEAGUE".to_string(), "CUP".to_string(), "FRIENDLY".to_string()])
  );
  assert_eq!(schema.properties[3].nested_schema.as_deref(), Some("Team"));

  assert!(description.schema("Missing").is_none());
}

#[test]
fn test_braces_inside_strings_do_not_perturb_matching() {
  let text = r#"
export interface paths {
    "/odd": {
        get: operations["odd"];
    };
}
export interface components {
    schemas: {
        Odd: {
            open: "{" | "{{";
            close?: "}";
        };
        Next: {
            id: number;
        };
    };
}
export interface operations {
    odd: {
        responses: {
            200: {
                content: {
                    "application/json": components["schemas"]["Odd"];
                };
            };
        };
    };
}
"#;
  let (description, warnings) = parse(text);
  assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

  let names: Vec<_> = description.schema_names().collect();
  assert_eq!(names, vec!["Odd", "Next"]);
  let odd = description.schema("Odd").expect("Odd schema");
  assert_eq!(odd.properties.len(), 2);
  assert_eq!(
    odd.properties[0].enum_values,
    Some(vec!["{".to_string(), "{{".to_string()])
  );

  let mut warnings = vec![];
  let paths = description.extract_all_paths(&mut warnings);
  assert_eq!(paths.len(), 1);
  assert_eq!(paths[0].operations[&Method::GET].operation_id, "odd");
}

#[test]
fn test_missing_blocks_degrade_to_warnings() {
  let text = "export interface paths {\n    \"/a\": {\n        get: operations[\"a\"];\n    };\n}\n";
  let (description, warnings) = parse(text);

  assert_eq!(warnings.len(), 2);
  assert!(
    warnings
      .iter()
      .all(|warning| matches!(warning, GenerationWarning::MalformedInput { .. }))
  );
  assert_eq!(description.schemas_block(), "");
  assert_eq!(description.schema_names().count(), 0);

  let mut warnings = vec![];
  let paths = description.extract_all_paths(&mut warnings);
  assert_eq!(paths.len(), 1);
  assert!(paths[0].operations.is_empty());
  assert_eq!(warnings.len(), 1);
}

#[test]
fn test_unbalanced_block_is_malformed() {
  let text = "export interface paths {\n  \"/a\": {\n";
  let (description, warnings) = parse(text);
  assert!(description.paths_block().is_empty());
  assert!(warnings.iter().any(|warning| warning.to_string().contains("paths")));
}
