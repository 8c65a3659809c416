use http::Method;

use super::{League, imports};
use crate::generator::{
  codegen::{
    api::{DomainApi, generate_domain_api, wrapper_base_name},
    endpoints::plan_endpoints,
  },
  config::{CodegenConfig, DocTemplates, VerbPrefixes},
};

fn domain_api(league: &League, tag: &str, config: &CodegenConfig) -> anyhow::Result<DomainApi> {
  let operations = league.operations(tag);
  let endpoints = plan_endpoints(&operations);
  generate_domain_api("league", tag, &operations, &endpoints, config, &imports())
}

#[test]
fn test_wrapper_base_name() {
  let prefixes = VerbPrefixes::default();
  assert_eq!(wrapper_base_name(&prefixes, &Method::GET, "/users/{id}"), "fetchUsersId");
  assert_eq!(wrapper_base_name(&prefixes, &Method::POST, "/v1/users"), "createV1Users");
  assert_eq!(
    wrapper_base_name(&prefixes, &Method::PATCH, "/matches/{matchId}"),
    "modifyMatchesMatchId"
  );
  assert_eq!(wrapper_base_name(&prefixes, &Method::DELETE, "/"), "removeRoot");
  assert_eq!(wrapper_base_name(&prefixes, &Method::HEAD, "/health"), "headHealth");
}

#[test]
fn test_get_user_by_id_wrapper() {
  let league = League::load();
  let api = domain_api(&league, "users", &CodegenConfig::default()).expect("api module");

  let expected = "/**
 * GET /users/{id}
 * @operationId getUserById
 */
export const fetchUsersId = async (params: getUserById_Params): Promise<getUserById_RO> => {
  const { id } = params;
  return handleResponse<getUserById_RO>(http.get(GET_USERS_ID(id)));
};";
  assert!(api.content.contains(expected), "{}", api.content);

  assert!(api.content.contains("import { handleResponse, http } from '@/api/runtime';"));
  assert!(api.content.contains("import { DELETE_USERS_ID, GET_USERS_ID } from './endpoints';"));
  assert!(
    api
      .content
      .contains("import type { deleteUser_Params, getUserById_Params, getUserById_RO } from './types';")
  );

  let names: Vec<_> = api.wrappers.iter().map(|wrapper| wrapper.name.as_str()).collect();
  assert_eq!(names, vec!["fetchUsersId", "removeUsersId"]);
  assert_eq!(api.wrappers[0].method, Method::GET);
  assert_eq!(api.wrappers[1].method, Method::DELETE);
}

#[test]
fn test_no_content_wrapper_resolves_to_void() {
  let league = League::load();
  let api = domain_api(&league, "users", &CodegenConfig::default()).expect("api module");

  assert!(
    api
      .content
      .contains("export const removeUsersId = async (params: deleteUser_Params): Promise<void> => {")
  );
  assert!(
    api
      .content
      .contains("return handleResponse<void>(http.delete(DELETE_USERS_ID(id)));")
  );
}

#[test]
fn test_query_and_header_parameters() {
  let league = League::load();
  let api = domain_api(&league, "v1_users", &CodegenConfig::default()).expect("api module");

  assert!(api.content.contains("const { 'X-Tenant-Id': xTenantId, ...query } = params;"));
  assert!(api.content.contains(
    "return handleResponse<listUsers_RO>(http.get(GET_V1_USERS, { params: query, headers: { 'X-Tenant-Id': xTenantId } }));"
  ));
}

#[test]
fn test_body_is_passed_to_mutating_calls() {
  let league = League::load();
  let api = domain_api(&league, "v1_users", &CodegenConfig::default()).expect("api module");

  assert!(
    api
      .content
      .contains("export const createV1Users = async (body: createUser_Body): Promise<createUser_RO> => {")
  );
  assert!(
    api
      .content
      .contains("return handleResponse<createUser_RO>(http.post(POST_V1_USERS, body));")
  );

  let matches = domain_api(&league, "matches", &CodegenConfig::default()).expect("api module");
  assert!(matches.content.contains(
    "export const modifyMatchesMatchId = async (params: patchMatchStatus_Params, body: patchMatchStatus_Body): Promise<patchMatchStatus_Response> => {"
  ));
  assert!(matches.content.contains("http.patch(PATCH_MATCHES_MATCH_ID(matchId), body)"));
}

#[test]
fn test_custom_prefixes_and_templates() {
  let league = League::load();
  let config = CodegenConfig::builder()
    .verb_prefixes(serde_json::from_str(r#"{ "get": "load" }"#).expect("valid prefixes"))
    .doc_templates(DocTemplates {
      wrapper: "Calls {operationId}.\n{method} {path}".to_string(),
      ..DocTemplates::default()
    })
    .build();
  let api = domain_api(&league, "health", &config).expect("api module");

  assert_eq!(api.wrappers[0].name, "loadHealth");
  assert!(api.content.contains(" * Calls get_health.\n * GET /health\n * @operationId get_health\n"));
}

#[test]
fn test_invalid_template_fails() {
  let league = League::load();
  let config = CodegenConfig::builder()
    .doc_templates(DocTemplates {
      wrapper: "{verb}".to_string(),
      ..DocTemplates::default()
    })
    .build();

  let error = domain_api(&league, "users", &config).expect_err("unknown placeholder");
  assert_eq!(error.to_string(), "Unknown placeholder '{verb}' in wrapper template");
}

#[test]
fn test_empty_tag_yields_empty_module() {
  let api = generate_domain_api("league", "none", &[], &[], &CodegenConfig::default(), &imports()).expect("api module");
  assert!(api.wrappers.is_empty());
  assert!(api.content.ends_with("export {};\n"));
}
