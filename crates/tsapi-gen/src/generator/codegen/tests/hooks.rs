use http::Method;

use super::{League, imports};
use crate::generator::{
  codegen::{
    api::generate_domain_api,
    endpoints::plan_endpoints,
    hooks::{
      HookTypeResolver, NameInferenceResolver, OperationIdResolver, SignatureResolver, generate_hooks, parse_wrappers,
      resolve_hook_types,
    },
  },
  config::{CodegenConfig, ErrorNotification, NotificationPolicy, VerbPrefixes},
  metrics::GenerationWarning,
};

const HAND_WRITTEN_API: &str = r"
import { http } from '@/api/runtime';

/** Loads one user. */
export const loadUser = async (params) => {
  return http.get(`/users/${params.id}`);
};

export const sendUser = async (body: createUser_Body, options: Record<string, string>) => {
  return http.post('/v1/users', body);
};

export const mystery = async () => {
  return fetch('/somewhere');
};
";

fn generated_api(league: &League, tag: &str) -> String {
  let operations = league.operations(tag);
  let endpoints = plan_endpoints(&operations);
  generate_domain_api("league", tag, &operations, &endpoints, &CodegenConfig::default(), &imports())
    .expect("api module")
    .content
}

#[test]
fn test_parse_generated_wrappers() {
  let league = League::load();
  let wrappers = parse_wrappers(&generated_api(&league, "v1_users"));

  assert_eq!(wrappers.len(), 2);
  let list = &wrappers[0];
  assert_eq!(list.name, "fetchV1Users");
  assert_eq!(list.operation_id.as_deref(), Some("listUsers"));
  assert_eq!(list.method, Some(Method::GET));
  assert_eq!(list.return_type.as_deref(), Some("listUsers_RO"));
  assert_eq!(list.args.len(), 1);
  assert_eq!(list.args[0].name, "params");
  assert_eq!(list.args[0].type_text.as_deref(), Some("listUsers_Params"));

  let create = &wrappers[1];
  assert_eq!(create.name, "createV1Users");
  assert_eq!(create.method, Some(Method::POST));
  assert_eq!(create.args[0].name, "body");
}

#[test]
fn test_parse_hand_written_wrappers() {
  let wrappers = parse_wrappers(HAND_WRITTEN_API);
  let names: Vec<_> = wrappers.iter().map(|wrapper| wrapper.name.as_str()).collect();
  assert_eq!(names, vec!["loadUser", "sendUser", "mystery"]);

  assert_eq!(wrappers[0].operation_id, None);
  assert_eq!(wrappers[0].return_type, None);
  assert_eq!(wrappers[0].args[0].type_text, None);
  assert_eq!(wrappers[1].args[1].type_text.as_deref(), Some("Record<string, string>"));
  assert_eq!(wrappers[2].method, None);
}

#[test]
fn test_resolver_chain_order() {
  let league = League::load();
  let operations = league.operations("users");
  let wrappers = parse_wrappers(&generated_api(&league, "users"));
  let wrapper = &wrappers[0];

  let signature = SignatureResolver.resolve(wrapper).expect("signature types");
  assert_eq!(signature.params.as_deref(), Some("getUserById_Params"));
  assert_eq!(signature.result, "getUserById_RO");

  let mut unsigned = wrapper.clone();
  unsigned.return_type = None;
  assert!(SignatureResolver.resolve(&unsigned).is_none());
  let by_id = OperationIdResolver::new(&operations)
    .resolve(&unsigned)
    .expect("operation id types");
  assert_eq!(by_id, signature);

  let mut warnings = vec![];
  let by_operation_id = OperationIdResolver::new(&operations);
  let resolvers: [&dyn HookTypeResolver; 2] = [&SignatureResolver, &by_operation_id];
  assert_eq!(resolve_hook_types(&resolvers, &unsigned, &mut warnings), signature);
  assert!(warnings.is_empty());
}

#[test]
fn test_name_inference() {
  let names = [
    "getUserById_Params",
    "getUserById_Response",
    "getUserById_RO",
    "deleteUser_Params",
    "deleteUser_Response",
  ];
  let resolver = NameInferenceResolver::new(names, &VerbPrefixes::default());
  let wrappers = parse_wrappers(
    "export const removeUser = async (params) => {\n  return http.delete('/x');\n};\nexport const getUserByIdAndCache = async (params) => {\n  return http.get('/y');\n};\nexport const fetchTeams = async () => {\n  return http.get('/z');\n};\n",
  );

  let remove = resolver.resolve(&wrappers[0]).expect("matches deleteUser");
  assert_eq!(remove.params.as_deref(), Some("deleteUser_Params"));
  assert_eq!(remove.result, "deleteUser_Response");

  let cached = resolver.resolve(&wrappers[1]).expect("matches getUserById");
  assert_eq!(cached.result, "getUserById_RO");

  assert!(resolver.resolve(&wrappers[2]).is_none());
}

#[test]
fn test_unresolvable_wrapper_falls_back_to_unknown() {
  let wrappers = parse_wrappers(HAND_WRITTEN_API);
  let mut warnings = vec![];
  let resolvers: [&dyn HookTypeResolver; 1] = [&SignatureResolver];

  let types = resolve_hook_types(&resolvers, &wrappers[0], &mut warnings);
  assert_eq!(types.params.as_deref(), Some("unknown"));
  assert_eq!(types.body, None);
  assert_eq!(types.result, "unknown");
  assert_eq!(warnings.len(), 1);
  assert!(matches!(
    &warnings[0],
    GenerationWarning::UnresolvableType { operation_id, .. } if operation_id == "loadUser"
  ));
}

#[test]
fn test_query_hook_for_get_user_by_id() {
  let league = League::load();
  let operations = league.operations("users");
  let mut warnings = vec![];
  let hooks = generate_hooks(
    &generated_api(&league, "users"),
    &operations,
    &CodegenConfig::default(),
    &imports(),
    &mut warnings,
  )
  .expect("hooks");

  assert!(warnings.is_empty());
  assert_eq!(hooks.query_hooks, vec!["useFetchUsersId"]);
  assert_eq!(hooks.mutation_hooks, vec!["useRemoveUsersId"]);

  let expected = "export const useFetchUsersId = (params: getUserById_Params, options?: Omit<UseQueryOptions<getUserById_RO>, 'queryKey' | 'queryFn'>) =>
  useQuery<getUserById_RO>({
    queryKey: ['fetchUsersId', params],
    queryFn: () => fetchUsersId(params),
    ...options,
  });";
  assert!(hooks.queries.contains(expected), "{}", hooks.queries);
  assert!(hooks.queries.contains(" * Query hook for `fetchUsersId` (GET /users/{id}).\n"));
  assert!(hooks.queries.contains("import { useQuery } from '@tanstack/react-query';"));
  assert!(hooks.queries.contains("import type { UseQueryOptions } from '@tanstack/react-query';"));
  assert!(hooks.queries.contains("import { fetchUsersId } from './api';"));
  assert!(
    hooks
      .queries
      .contains("import type { getUserById_Params, getUserById_RO } from './types';")
  );
}

#[test]
fn test_no_content_mutation_is_typed_void() {
  let league = League::load();
  let operations = league.operations("users");
  let mut warnings = vec![];
  let hooks = generate_hooks(
    &generated_api(&league, "users"),
    &operations,
    &CodegenConfig::default(),
    &imports(),
    &mut warnings,
  )
  .expect("hooks");

  let expected = "export const useRemoveUsersId = () =>
  useMutation<void, Error, deleteUser_Params>({
    mutationFn: (params) => removeUsersId(params),
    onError: (error) => {
      console.error('[removeUsersId]', error);
    },
  });";
  assert!(hooks.mutations.contains(expected), "{}", hooks.mutations);
  assert!(!hooks.mutations.contains("notify"));
}

#[test]
fn test_mutation_notifications() {
  let league = League::load();
  let operations = league.operations("matches");
  let config = CodegenConfig::builder()
    .notifications(NotificationPolicy {
      on_error: ErrorNotification::Toast,
      on_success: true,
      success_message: "Saved".to_string(),
    })
    .build();
  let mut warnings = vec![];
  let hooks = generate_hooks(
    &generated_api(&league, "matches"),
    &operations,
    &config,
    &imports(),
    &mut warnings,
  )
  .expect("hooks");

  assert_eq!(hooks.query_hooks.len(), 2);
  assert_eq!(hooks.mutation_hooks, vec!["useModifyMatchesMatchId"]);
  assert!(hooks.mutations.contains("import { notify } from '@/lib/notify';"));
  assert!(hooks.mutations.contains(
    "useMutation<patchMatchStatus_Response, Error, { params: patchMatchStatus_Params; body: patchMatchStatus_Body }>"
  ));
  assert!(
    hooks
      .mutations
      .contains("mutationFn: ({ params, body }) => modifyMatchesMatchId(params, body),")
  );
  assert!(hooks.mutations.contains("notify.error(error.message);"));
  assert!(hooks.mutations.contains("notify.success('Saved');"));
  assert!(!hooks.queries.contains("notify"));
}

#[test]
fn test_hand_written_module() {
  let mut warnings = vec![];
  let hooks = generate_hooks(
    HAND_WRITTEN_API,
    &[],
    &CodegenConfig::default(),
    &imports(),
    &mut warnings,
  )
  .expect("hooks");

  assert_eq!(hooks.query_hooks, vec!["useLoadUser"]);
  assert_eq!(hooks.mutation_hooks, vec!["useSendUser"]);
  assert!(hooks.queries.contains("useQuery<unknown>"));
  assert!(
    hooks
      .mutations
      .contains("useMutation<unknown, Error, { params: unknown; body: unknown }>")
  );
  assert!(hooks.mutations.contains("mutationFn: ({ params, body }) => sendUser(body, params),"));
  assert!(!hooks.mutations.contains("from './types'"));
  // loadUser and sendUser fall back to unknown, mystery has no detectable method.
  assert_eq!(warnings.len(), 3);
}

#[test]
fn test_body_argument_is_matched_by_name() {
  let wrappers = parse_wrappers(
    "export const sendUser = async (body: createUser_Body, options: Record<string, string>): Promise<createUser_RO> => {\n  return http.post('/v1/users', body);\n};\n",
  );
  let mut warnings = vec![];
  let resolvers: [&dyn HookTypeResolver; 1] = [&SignatureResolver];

  let types = resolve_hook_types(&resolvers, &wrappers[0], &mut warnings);
  assert_eq!(types.body.as_deref(), Some("createUser_Body"));
  assert_eq!(types.params.as_deref(), Some("Record<string, string>"));
  assert_eq!(types.result, "createUser_RO");
  assert!(warnings.is_empty());
}

#[test]
fn test_empty_api_module() {
  let mut warnings = vec![];
  let hooks = generate_hooks("export {};\n", &[], &CodegenConfig::default(), &imports(), &mut warnings).expect("hooks");
  assert!(hooks.queries.ends_with("export {};\n"));
  assert!(hooks.mutations.ends_with("export {};\n"));
  assert!(hooks.query_hooks.is_empty());
}
