use std::collections::BTreeSet;

use crate::naming::identifiers::{
  NUMERIC_PROPERTY_NAME, ensure_unique, generate_operation_id, property_key, sanitize, split_pascal_case,
  to_constant_case, to_identifier, to_pascal_case, to_property_type_segment,
};

#[test]
fn test_sanitize() {
  assert_eq!(sanitize("user-profiles"), "user_profiles");
  assert_eq!(sanitize("{id}"), "id");
  assert_eq!(sanitize("__a..b__"), "a_b");
  assert_eq!(sanitize(""), "");
}

#[test]
fn test_pascal_case() {
  assert_eq!(to_pascal_case("users"), "Users");
  assert_eq!(to_pascal_case("{id}"), "Id");
  assert_eq!(to_pascal_case("tournamentType"), "TournamentType");
  assert_eq!(to_pascal_case("user-profiles"), "UserProfiles");
  assert_eq!(to_pascal_case("match_type"), "MatchType");
  assert_eq!(to_pascal_case("HTTPProxy"), "HTTPProxy");
  assert_eq!(to_pascal_case("USERS"), "Users");
}

#[test]
fn test_split_pascal_case() {
  assert_eq!(split_pascal_case("AvatarUrl"), vec!["Avatar", "Url"]);
  assert_eq!(split_pascal_case("XMLParser"), vec!["XML", "Parser"]);
  assert!(split_pascal_case("").is_empty());
}

#[test]
fn test_property_type_segment() {
  assert_eq!(to_property_type_segment("tournamentType"), "TournamentType");
  assert_eq!(to_property_type_segment("avatarUrl"), "AvatarURL");
  assert_eq!(to_property_type_segment("ownerId"), "OwnerID");
  assert_eq!(to_property_type_segment("identity"), "Identity");
  assert_eq!(to_property_type_segment("status"), "Status");
}

#[test]
fn test_property_type_segment_boolean_prefixes() {
  assert_eq!(to_property_type_segment("isUrlValid"), "IsUrlValid");
  assert_eq!(to_property_type_segment("hasOwnerId"), "HasOwnerId");
  assert_eq!(to_property_type_segment("allowId"), "AllowId");
  assert_eq!(to_property_type_segment("hideUrl"), "HideUrl");
  assert_eq!(to_property_type_segment("issueId"), "IssueID");
}

#[test]
fn test_property_type_segment_numeric() {
  assert_eq!(to_property_type_segment("200"), NUMERIC_PROPERTY_NAME);
  assert_eq!(to_property_type_segment("0"), NUMERIC_PROPERTY_NAME);
  assert_eq!(to_property_type_segment("v2"), "V2");
}

#[test]
fn test_identifiers() {
  assert_eq!(to_identifier("id"), "id");
  assert_eq!(to_identifier("user_id"), "userId");
  assert_eq!(to_identifier("X-Trace-Id"), "xTraceId");
  assert_eq!(to_identifier("1st"), "_1st");
  assert_eq!(to_identifier("default"), "default_");
  assert_eq!(to_identifier(""), "_");
}

#[test]
fn test_constant_case() {
  assert_eq!(to_constant_case("users"), "USERS");
  assert_eq!(to_constant_case("{id}"), "ID");
  assert_eq!(to_constant_case("user-profiles"), "USER_PROFILES");
}

#[test]
fn test_property_key_quotes_non_identifiers() {
  assert_eq!(property_key("id"), "id");
  assert_eq!(property_key("X-Trace"), "'X-Trace'");
  assert_eq!(property_key("$ref"), "$ref");
}

#[test]
fn test_ensure_unique() {
  let used: BTreeSet<String> = ["fetchUsers".to_string(), "fetchUsers2".to_string()].into();
  assert_eq!(ensure_unique("fetchUsers", &used), "fetchUsers3");
  assert_eq!(ensure_unique("fetchOrders", &used), "fetchOrders");
}

#[test]
fn test_generate_operation_id() {
  assert_eq!(generate_operation_id("GET", "/users/{id}"), "get_users_by_id");
  assert_eq!(generate_operation_id("POST", "/"), "post");
  assert_eq!(generate_operation_id("get", "/user-profiles"), "get_user_profiles");
}
