//! Derives `Props_{Schema}_{Property}` aliases by walking schema references.
//!
//! The walk is depth-first from each root schema. A [`WalkContext`] is threaded
//! through every call; it remembers visited schemas for the whole run, so a
//! schema reachable from many operations is expanded once and cycles terminate.

use std::collections::{BTreeSet, HashSet};

use crate::{
  generator::{
    ast::{GeneratedType, PropertyInfo, TypeKind, TypeTarget},
    description::{InterfaceDescription, refs::schema_refs, schemas::has_categorical_suffix},
    metrics::GenerationWarning,
  },
  naming::identifiers::{to_property_type_segment, to_schema_type_name},
};

pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 5;

const PROPERTY_ALIAS_PREFIX: &str = "Props";
const SKIPPED_NAMES: [&str; 7] = ["id", "description", "content", "message", "code", "data", "format"];
const SKIPPED_SUFFIXES: [&str; 3] = ["Id", "Url", "Count"];

/// Traversal state shared by every walk of one run.
#[derive(Debug, Clone)]
pub struct WalkContext {
  visited: BTreeSet<String>,
  max_depth: usize,
}

impl Default for WalkContext {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_SCHEMA_DEPTH)
  }
}

impl WalkContext {
  pub fn new(max_depth: usize) -> Self {
    Self {
      visited: BTreeSet::new(),
      max_depth,
    }
  }

  pub fn is_visited(&self, schema: &str) -> bool {
    self.visited.contains(schema)
  }
}

/// One derived property alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAlias {
  pub schema: String,
  pub property: PropertyInfo,
  pub generated: GeneratedType,
}

/// Property aliases destined for one artifact, without duplicate names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyAliases {
  aliases: Vec<PropertyAlias>,
  names: HashSet<String>,
}

impl PropertyAliases {
  /// Adds an alias unless one with the same name is already present.
  pub fn push(&mut self, alias: PropertyAlias) -> bool {
    if !self.names.insert(alias.generated.name.clone()) {
      return false;
    }
    self.aliases.push(alias);
    true
  }

  pub fn iter(&self) -> impl Iterator<Item = &PropertyAlias> {
    self.aliases.iter()
  }

  pub fn len(&self) -> usize {
    self.aliases.len()
  }

  pub fn is_empty(&self) -> bool {
    self.aliases.is_empty()
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.aliases.iter().map(|alias| alias.generated.name.as_str())
  }
}

/// Whether a property deserves its own alias.
pub(crate) fn is_relevant(property: &PropertyInfo) -> bool {
  if property.is_enum() || has_categorical_suffix(&property.name) {
    return true;
  }
  let name = property.name.as_str();
  !SKIPPED_NAMES.contains(&name) && !SKIPPED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

pub fn property_alias_name(schema: &str, property: &str) -> String {
  format!(
    "{PROPERTY_ALIAS_PREFIX}_{}_{}",
    to_schema_type_name(schema),
    to_property_type_segment(property)
  )
}

fn quoted(segment: &str) -> String {
  format!("['{}']", segment.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// The indexed access type of a property, wrapped in `NonNullable` when optional.
pub fn property_access_type(schema: &str, property: &PropertyInfo) -> String {
  let access = format!("components['schemas']{}{}", quoted(schema), quoted(&property.name));
  if property.optional {
    format!("NonNullable<{access}>")
  } else {
    access
  }
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaWalker<'a> {
  description: &'a InterfaceDescription,
}

impl<'a> SchemaWalker<'a> {
  pub fn new(description: &'a InterfaceDescription) -> Self {
    Self { description }
  }

  /// Walks every root in order, appending new aliases to `out`.
  pub fn walk_roots<'r>(
    &self,
    roots: impl IntoIterator<Item = &'r str>,
    context: &mut WalkContext,
    out: &mut PropertyAliases,
    warnings: &mut Vec<GenerationWarning>,
  ) {
    for root in roots {
      self.walk(root, context, out, warnings);
    }
  }

  pub fn walk(
    &self,
    root: &str,
    context: &mut WalkContext,
    out: &mut PropertyAliases,
    warnings: &mut Vec<GenerationWarning>,
  ) {
    self.visit(root, 0, context, out, warnings);
  }

  fn visit(
    &self,
    schema: &str,
    depth: usize,
    context: &mut WalkContext,
    out: &mut PropertyAliases,
    warnings: &mut Vec<GenerationWarning>,
  ) {
    if context.is_visited(schema) {
      return;
    }
    if depth > context.max_depth {
      warnings.push(GenerationWarning::DepthLimitExceeded {
        schema: schema.to_string(),
        depth,
        limit: context.max_depth,
      });
      return;
    }
    context.visited.insert(schema.to_string());

    if self.description.schema_type(schema).is_none() {
      warnings.push(GenerationWarning::malformed(
        "components.schemas",
        format!("schema '{schema}' is referenced but not declared"),
      ));
      return;
    }
    let Some(definition) = self.description.schema(schema) else {
      return;
    };

    let mut relevant: Vec<&PropertyInfo> = definition.properties.iter().filter(|p| is_relevant(p)).collect();
    relevant.sort_by(|a, b| b.priority.cmp(&a.priority));

    for property in relevant {
      out.push(PropertyAlias {
        schema: schema.to_string(),
        property: property.clone(),
        generated: GeneratedType {
          name: property_alias_name(schema, &property.name),
          kind: TypeKind::Property,
          target: TypeTarget::Inline(property_access_type(schema, property)),
        },
      });
    }

    for property in &definition.properties {
      for nested in schema_refs(&property.type_text) {
        self.visit(nested, depth + 1, context, out, warnings);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::description::schemas::classify_property;

  const LEAGUE: &str = include_str!("../../fixtures/league.d.ts");

  fn league() -> InterfaceDescription {
    let mut warnings = vec![];
    InterfaceDescription::parse(LEAGUE, &mut warnings)
  }

  fn walk(
    description: &InterfaceDescription,
    roots: &[&str],
    context: &mut WalkContext,
  ) -> (PropertyAliases, Vec<GenerationWarning>) {
    let mut out = PropertyAliases::default();
    let mut warnings = vec![];
    SchemaWalker::new(description).walk_roots(roots.iter().copied(), context, &mut out, &mut warnings);
    (out, warnings)
  }

  #[test]
  fn test_relevance_filter() {
    let keep = |name: &str, ty: &str| is_relevant(&classify_property(name, ty, false));
    assert!(!keep("id", "number"));
    assert!(!keep("userId", "number"));
    assert!(!keep("avatarUrl", "string"));
    assert!(!keep("playerCount", "number"));
    assert!(!keep("description", "string"));
    assert!(!keep("data", r#"components["schemas"]["User"]"#));
    assert!(keep("name", "string"));
    assert!(keep("matchType", "string"));
    assert!(keep("code", r#""A" | "B""#));
    assert!(keep("statusId", r#""OPEN" | "CLOSED""#));
  }

  #[test]
  fn test_property_alias_name() {
    assert_eq!(property_alias_name("Match", "tournamentType"), "Props_Match_TournamentType");
    assert_eq!(property_alias_name("Match", "200"), "Props_Match_NumericKey");
    assert_eq!(property_alias_name("Match", "venueUrl"), "Props_Match_VenueURL");
    assert_eq!(property_alias_name("Page«User»", "items"), "Props_PageUser_Items");
  }

  #[test]
  fn test_property_access_type() {
    let required = classify_property("tournamentType", r#""LEAGUE""#, false);
    assert_eq!(
      property_access_type("Match", &required),
      "components['schemas']['Match']['tournamentType']"
    );
    let optional = classify_property("200", "string", true);
    assert_eq!(
      property_access_type("Match", &optional),
      "NonNullable<components['schemas']['Match']['200']>"
    );
  }

  #[test]
  fn test_walk_match_ranks_and_follows_references() {
    let description = league();
    let mut context = WalkContext::default();
    let (aliases, warnings) = walk(&description, &["Match"], &mut context);

    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    let names: Vec<_> = aliases.names().collect();
    assert_eq!(
      names,
      vec![
        "Props_Match_TournamentType",
        "Props_Match_MatchStatus",
        "Props_Match_HomeTeam",
        "Props_Match_AwayTeam",
        "Props_Match_NumericKey",
        "Props_Team_Captain",
        "Props_Team_Players",
        "Props_Team_Name",
        "Props_Player_Position",
        "Props_Player_Team",
        "Props_Player_Nickname",
      ]
    );
    assert!(context.is_visited("Team"));
    assert!(context.is_visited("Player"));
  }

  #[test]
  fn test_walk_terminates_on_cycles_and_is_idempotent() {
    let description = league();
    let mut context = WalkContext::default();
    let (first, _) = walk(&description, &["Team"], &mut context);
    assert!(context.is_visited("Team") && context.is_visited("Player"));

    let (second, warnings) = walk(&description, &["Team", "Player"], &mut context);
    assert!(second.is_empty());
    assert!(warnings.is_empty());

    let mut fresh = WalkContext::default();
    let (again, _) = walk(&description, &["Team"], &mut fresh);
    assert_eq!(first, again);
  }

  #[test]
  fn test_walk_depth_limit_truncates_with_warning() {
    let description = league();
    let mut context = WalkContext::new(1);
    let (aliases, warnings) = walk(&description, &["UserResponse"], &mut context);

    assert!(aliases.names().any(|name| name.starts_with("Props_User_")));
    assert!(!context.is_visited("Team"));
    assert_eq!(
      warnings,
      vec![GenerationWarning::DepthLimitExceeded {
        schema: "Team".to_string(),
        depth: 2,
        limit: 1,
      }]
    );
  }

  #[test]
  fn test_duplicate_alias_names_are_suppressed() {
    let property = classify_property("kind", "string", false);
    let alias = PropertyAlias {
      schema: "A".to_string(),
      property: property.clone(),
      generated: GeneratedType {
        name: property_alias_name("A", "kind"),
        kind: TypeKind::Property,
        target: TypeTarget::Inline(property_access_type("A", &property)),
      },
    };
    let mut aliases = PropertyAliases::default();
    assert!(aliases.push(alias.clone()));
    assert!(!aliases.push(alias));
    assert_eq!(aliases.len(), 1);
  }

  #[test]
  fn test_missing_schema_warns() {
    let description = league();
    let mut context = WalkContext::default();
    let (aliases, warnings) = walk(&description, &["Ghost"], &mut context);
    assert!(aliases.is_empty());
    assert!(matches!(warnings.as_slice(), [GenerationWarning::MalformedInput { .. }]));
  }
}
