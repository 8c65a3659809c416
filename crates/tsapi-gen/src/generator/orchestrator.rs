//! Runs the generation pipeline for one server.
//!
//! Steps run strictly in order. The first three are required: if loading,
//! model extraction or tag classification fails the run is aborted. Every
//! later step produces artifacts, can be switched off with a feature flag, and
//! on failure is recorded while the pipeline moves on. The orchestrator always
//! returns a [`RunOutcome`], aborted or not.

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
  generator::{
    ast::PathEntry,
    codegen::{
      ArtifactKind, ArtifactSet, GeneratedArtifact, ImportResolver, RelativeImportResolver,
      api::generate_domain_api,
      endpoints::{EndpointDef, generate_endpoints, plan_endpoints},
      hooks::generate_hooks,
      property_types::generate_property_types,
      tag_list::generate_tag_list,
      validated_types::generate_validated_types,
    },
    config::{CodegenConfig, Feature},
    description::InterfaceDescription,
    extractor::{OperationTypes, TypeExtractor, extract_model},
    metrics::{GenerationStats, GenerationWarning},
    schema_walker::{PropertyAliases, SchemaWalker, WalkContext},
    tags::{TagClassification, TagClassifier},
  },
  utils::description::read_description,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum PipelineStep {
  LoadDescription,
  ExtractModel,
  ClassifyTags,
  TagList,
  ValidatedTypes,
  PropertyTypes,
  Endpoints,
  DomainApi,
  Hooks,
}

impl PipelineStep {
  /// The feature flag that switches this step off, if any.
  pub const fn feature(self) -> Option<Feature> {
    match self {
      Self::LoadDescription | Self::ExtractModel | Self::ClassifyTags => None,
      Self::TagList => Some(Feature::TagList),
      Self::ValidatedTypes => Some(Feature::ValidatedTypes),
      Self::PropertyTypes => Some(Feature::PropertyTypes),
      Self::Endpoints => Some(Feature::Endpoints),
      Self::DomainApi => Some(Feature::DomainApi),
      Self::Hooks => Some(Feature::Hooks),
    }
  }

  pub const fn is_required(self) -> bool {
    self.feature().is_none()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionSource {
  File(PathBuf),
  Inline(String),
}

/// One server to generate for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInput {
  pub name: String,
  pub exclude_tag: Option<String>,
  pub source: DescriptionSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
  pub step: PipelineStep,
  pub error: String,
}

/// What happened to each step of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
  pub server: String,
  pub successes: Vec<PipelineStep>,
  pub failures: Vec<StepFailure>,
  pub skipped: Vec<PipelineStep>,
  pub aborted: Option<StepFailure>,
}

impl RunSummary {
  pub fn is_aborted(&self) -> bool {
    self.aborted.is_some()
  }

  pub fn is_clean(&self) -> bool {
    self.aborted.is_none() && self.failures.is_empty()
  }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
  pub summary: RunSummary,
  pub artifacts: ArtifactSet,
  pub stats: GenerationStats,
}

/// State threaded through the steps of one run.
struct RunState {
  server: String,
  description: Option<InterfaceDescription>,
  paths: Vec<PathEntry>,
  classification: TagClassification,
  operations: BTreeMap<String, Vec<OperationTypes>>,
  endpoints: BTreeMap<String, Vec<EndpointDef>>,
  walk: WalkContext,
  artifacts: ArtifactSet,
  stats: GenerationStats,
}

impl RunState {
  fn description(&self) -> anyhow::Result<&InterfaceDescription> {
    self
      .description
      .as_ref()
      .context("interface description was not loaded")
  }

  fn add(&mut self, artifact: GeneratedArtifact) {
    self.stats.record_artifact();
    self.artifacts.insert(artifact);
  }

  fn endpoints_for(&mut self, tag: &str) -> &[EndpointDef] {
    let operations = self.operations.get(tag).map_or(&[][..], Vec::as_slice);
    self
      .endpoints
      .entry(tag.to_string())
      .or_insert_with(|| plan_endpoints(operations))
  }
}

pub struct Orchestrator {
  config: CodegenConfig,
  imports: Box<dyn ImportResolver + Send + Sync>,
}

impl Orchestrator {
  pub fn new(config: CodegenConfig) -> Self {
    let imports = RelativeImportResolver::new(config.imports.clone());
    Self::with_imports(config, imports)
  }

  pub fn with_imports(config: CodegenConfig, imports: impl ImportResolver + Send + Sync + 'static) -> Self {
    Self {
      config,
      imports: Box::new(imports),
    }
  }

  /// Runs every step for `server`. `seed` holds artifacts from earlier runs,
  /// such as an existing `api.ts` for the hook step to read.
  pub async fn run(&self, server: &ServerInput, seed: ArtifactSet) -> RunOutcome {
    let mut state = RunState {
      server: server.name.clone(),
      description: None,
      paths: vec![],
      classification: TagClassification::default(),
      operations: BTreeMap::new(),
      endpoints: BTreeMap::new(),
      walk: WalkContext::new(self.config.max_schema_depth),
      artifacts: seed,
      stats: GenerationStats::default(),
    };
    let mut summary = RunSummary {
      server: server.name.clone(),
      ..RunSummary::default()
    };

    for step in PipelineStep::iter() {
      if let Some(feature) = step.feature()
        && !self.config.features.is_enabled(feature)
      {
        summary.skipped.push(step);
        continue;
      }

      let result = match step {
        PipelineStep::LoadDescription => self.load_description(server, &mut state).await,
        _ => self.run_step(step, server, &mut state),
      };

      match result {
        Ok(()) => summary.successes.push(step),
        Err(error) => {
          let failure = StepFailure {
            step,
            error: format!("{error:#}"),
          };
          if step.is_required() {
            summary.aborted = Some(failure);
            break;
          }
          state.stats.record_warning(GenerationWarning::StepFailed {
            step: step.to_string(),
            error: failure.error.clone(),
          });
          summary.failures.push(failure);
        }
      }
    }

    RunOutcome {
      summary,
      artifacts: state.artifacts,
      stats: state.stats,
    }
  }

  async fn load_description(&self, server: &ServerInput, state: &mut RunState) -> anyhow::Result<()> {
    let text = match &server.source {
      DescriptionSource::File(path) => read_description(path).await?,
      DescriptionSource::Inline(text) => text.clone(),
    };
    state.description = Some(InterfaceDescription::parse(text, &mut state.stats.warnings));
    Ok(())
  }

  fn run_step(&self, step: PipelineStep, server: &ServerInput, state: &mut RunState) -> anyhow::Result<()> {
    match step {
      PipelineStep::LoadDescription => Ok(()),
      PipelineStep::ExtractModel => Self::extract(state),
      PipelineStep::ClassifyTags => Self::classify(server, state),
      PipelineStep::TagList => Self::tag_list(state),
      PipelineStep::ValidatedTypes => self.validated_types(state),
      PipelineStep::PropertyTypes => self.property_types(state),
      PipelineStep::Endpoints => Self::endpoints(state),
      PipelineStep::DomainApi => self.domain_api(state),
      PipelineStep::Hooks => self.hooks(state),
    }
  }

  fn extract(state: &mut RunState) -> anyhow::Result<()> {
    let description = state.description.as_ref().context("interface description was not loaded")?;
    state.paths = extract_model(description, &mut state.stats.warnings)?;
    state.stats.record_schemas(description.schema_names().count());
    Ok(())
  }

  /// Assigns paths to tags and derives the validated types of every operation
  /// that survived exclusion.
  fn classify(server: &ServerInput, state: &mut RunState) -> anyhow::Result<()> {
    let classification = TagClassifier::new(server.exclude_tag.clone()).classify_entries(&state.paths);
    let description = state.description()?;
    let extractor = TypeExtractor::new(description);

    let mut warnings = vec![];
    let mut operations: BTreeMap<String, Vec<OperationTypes>> = BTreeMap::new();
    for tag in classification.tag_names() {
      let derived = classification
        .entries_for(tag, &state.paths)
        .flat_map(|entry| entry.operations.values())
        .map(|operation| extractor.derive(operation, &mut warnings))
        .collect();
      operations.insert(tag.to_string(), derived);
    }

    state.stats.record_paths(state.paths.len(), classification.excluded.len());
    state.stats.record_tags(classification.tags.len());
    state.stats.record_operations(operations.values().map(Vec::len).sum());
    state.stats.record_warnings(warnings);
    state.classification = classification;
    state.operations = operations;
    Ok(())
  }

  fn tag_list(state: &mut RunState) -> anyhow::Result<()> {
    let content = generate_tag_list(&state.server, &state.classification)?;
    let artifact = GeneratedArtifact::for_server(&state.server, ArtifactKind::TagList, content);
    state.add(artifact);
    Ok(())
  }

  fn validated_types(&self, state: &mut RunState) -> anyhow::Result<()> {
    let mut artifacts = vec![];
    for (tag, operations) in &state.operations {
      state
        .stats
        .record_generated_types(operations.iter().flat_map(OperationTypes::aliases));
      let content = generate_validated_types(&state.server, tag, operations, self.imports.as_ref());
      artifacts.push(GeneratedArtifact::for_tag(
        &state.server,
        tag,
        ArtifactKind::ValidatedTypes,
        content,
      ));
    }
    artifacts.into_iter().for_each(|artifact| state.add(artifact));
    Ok(())
  }

  /// Walks from the Body, Response and RO schemas of each tag. The walk context
  /// lives for the whole run, so a schema is expanded in the first tag that
  /// reaches it.
  fn property_types(&self, state: &mut RunState) -> anyhow::Result<()> {
    let description = state.description.as_ref().context("interface description was not loaded")?;
    let walker = SchemaWalker::new(description);

    let mut artifacts = vec![];
    for (tag, operations) in &state.operations {
      let mut aliases = PropertyAliases::default();
      for operation in operations {
        walker.walk_roots(
          operation.root_schemas(),
          &mut state.walk,
          &mut aliases,
          &mut state.stats.warnings,
        );
      }
      state
        .stats
        .record_generated_types(aliases.iter().map(|alias| &alias.generated));
      let content = generate_property_types(&state.server, tag, &aliases, self.imports.as_ref());
      artifacts.push(GeneratedArtifact::for_tag(
        &state.server,
        tag,
        ArtifactKind::PropertyTypes,
        content,
      ));
    }
    artifacts.into_iter().for_each(|artifact| state.add(artifact));
    Ok(())
  }

  fn endpoints(state: &mut RunState) -> anyhow::Result<()> {
    let tags: Vec<String> = state.operations.keys().cloned().collect();
    for tag in tags {
      let endpoints = state.endpoints_for(&tag);
      let count = endpoints.len();
      let content = generate_endpoints(endpoints);
      state.stats.record_endpoints(count);
      let artifact = GeneratedArtifact::for_tag(&state.server, &tag, ArtifactKind::Endpoints, content);
      state.add(artifact);
    }
    Ok(())
  }

  fn domain_api(&self, state: &mut RunState) -> anyhow::Result<()> {
    let tags: Vec<String> = state.operations.keys().cloned().collect();
    let mut artifacts = vec![];
    for tag in tags {
      let endpoints = state.endpoints_for(&tag).to_vec();
      let operations = state.operations.get(&tag).map_or(&[][..], Vec::as_slice);
      let api = generate_domain_api(
        &state.server,
        &tag,
        operations,
        &endpoints,
        &self.config,
        self.imports.as_ref(),
      )
      .with_context(|| format!("domain API for tag '{tag}'"))?;
      state.stats.record_wrappers(api.wrappers.len());
      artifacts.push(GeneratedArtifact::for_tag(
        &state.server,
        &tag,
        ArtifactKind::DomainApi,
        api.content,
      ));
    }
    artifacts.into_iter().for_each(|artifact| state.add(artifact));
    Ok(())
  }

  /// Reads each tag's `api.ts` from the artifacts produced so far. Tags without
  /// one are skipped with a warning.
  fn hooks(&self, state: &mut RunState) -> anyhow::Result<()> {
    let mut artifacts = vec![];
    for (tag, operations) in &state.operations {
      let Some(api_source) = state
        .artifacts
        .content(&state.server, Some(tag.as_str()), ArtifactKind::DomainApi)
      else {
        state.stats.record_warning(GenerationWarning::MissingCollaboratorOutput {
          server: state.server.clone(),
          tag: tag.clone(),
          artifact: ArtifactKind::QueryHooks,
          message: format!("no {} to read, hooks not generated", ArtifactKind::DomainApi.file_name()),
        });
        continue;
      };

      let hooks = generate_hooks(
        api_source,
        operations,
        &self.config,
        self.imports.as_ref(),
        &mut state.stats.warnings,
      )
      .with_context(|| format!("hooks for tag '{tag}'"))?;
      state
        .stats
        .record_hooks(hooks.query_hooks.len(), hooks.mutation_hooks.len());
      artifacts.push(GeneratedArtifact::for_tag(
        &state.server,
        tag,
        ArtifactKind::QueryHooks,
        hooks.queries,
      ));
      artifacts.push(GeneratedArtifact::for_tag(
        &state.server,
        tag,
        ArtifactKind::MutationHooks,
        hooks.mutations,
      ));
    }
    artifacts.into_iter().for_each(|artifact| state.add(artifact));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::config::{FeatureFlags, FeatureSetting};

  const LEAGUE: &str = include_str!("../../fixtures/league.d.ts");

  const HEALTH_API: &str = r"/**
 * GET /health
 * @operationId get_health
 */
export const fetchHealth = async (): Promise<get_health_Response> => {
  return handleResponse<get_health_Response>(http.get(GET_HEALTH));
};
";

  fn inline(name: &str, text: &str) -> ServerInput {
    ServerInput {
      name: name.to_string(),
      exclude_tag: None,
      source: DescriptionSource::Inline(text.to_string()),
    }
  }

  fn league() -> ServerInput {
    inline("league", LEAGUE)
  }

  fn without(feature: Feature) -> CodegenConfig {
    CodegenConfig::builder()
      .features(FeatureFlags::from(BTreeMap::from([(feature, FeatureSetting::Flag(false))])))
      .build()
  }

  fn missing_collaborators(stats: &GenerationStats) -> usize {
    stats
      .warnings
      .iter()
      .filter(|warning| matches!(warning, GenerationWarning::MissingCollaboratorOutput { .. }))
      .count()
  }

  #[test]
  fn test_required_steps() {
    let required: Vec<_> = PipelineStep::iter().filter(|step| step.is_required()).collect();
    assert_eq!(
      required,
      vec![
        PipelineStep::LoadDescription,
        PipelineStep::ExtractModel,
        PipelineStep::ClassifyTags
      ]
    );
    assert_eq!(PipelineStep::DomainApi.to_string(), "domain-api");
  }

  #[tokio::test]
  async fn test_full_run_generates_every_artifact() {
    let outcome = Orchestrator::new(CodegenConfig::default()).run(&league(), ArtifactSet::default()).await;

    assert!(outcome.summary.is_clean(), "{:?}", outcome.summary);
    assert_eq!(outcome.summary.successes.len(), PipelineStep::iter().count());
    assert!(outcome.summary.skipped.is_empty());

    // tags.json plus six modules for each of health, matches, users and v1_users
    assert_eq!(outcome.artifacts.len(), 25);
    assert_eq!(outcome.stats.artifacts_generated, 25);
    assert_eq!(outcome.stats.paths_discovered, 6);
    assert_eq!(outcome.stats.paths_excluded, 1);
    assert_eq!(outcome.stats.schemas_discovered, 10);
    assert_eq!(outcome.stats.tags_classified, 4);
    assert_eq!(outcome.stats.operations_extracted, 8);
    assert_eq!(outcome.stats.wrappers_generated, 8);
    assert_eq!(outcome.stats.endpoints_generated, 8);
    assert_eq!(
      outcome.stats.query_hooks_generated + outcome.stats.mutation_hooks_generated,
      8
    );
    assert_eq!(missing_collaborators(&outcome.stats), 0);

    let api = outcome
      .artifacts
      .content("league", Some("users"), ArtifactKind::DomainApi)
      .expect("users api");
    assert!(api.contains("export const fetchUsersId = async (params: getUserById_Params)"));
  }

  #[tokio::test]
  async fn test_runs_are_deterministic() {
    let orchestrator = Orchestrator::new(CodegenConfig::default());
    let first = orchestrator.run(&league(), ArtifactSet::default()).await;
    let second = orchestrator.run(&league(), ArtifactSet::default()).await;
    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first.stats, second.stats);
  }

  #[tokio::test]
  async fn test_duplicate_operation_id_aborts() {
    let text = r#"
export interface paths {
    "/a": {
        get: operations["same"];
    };
    "/b": {
        post: operations["same"];
    };
}
export interface components {
    schemas: {};
}
export interface operations {
    same: {
        responses: {
            204: {
                content?: never;
            };
        };
    };
}
"#;
    let outcome = Orchestrator::new(CodegenConfig::default())
      .run(&inline("dup", text), ArtifactSet::default())
      .await;

    let aborted = outcome.summary.aborted.expect("run must abort");
    assert_eq!(aborted.step, PipelineStep::ExtractModel);
    assert!(aborted.error.contains("duplicate operationId 'same'"));
    assert_eq!(outcome.summary.successes, vec![PipelineStep::LoadDescription]);
    assert!(outcome.artifacts.is_empty());
  }

  #[tokio::test]
  async fn test_disabled_domain_api_skips_hooks_with_warnings() {
    let outcome = Orchestrator::new(without(Feature::DomainApi))
      .run(&league(), ArtifactSet::default())
      .await;

    assert!(outcome.summary.is_clean());
    assert_eq!(outcome.summary.skipped, vec![PipelineStep::DomainApi]);
    assert_eq!(outcome.artifacts.iter().filter(|artifact| artifact.kind == ArtifactKind::DomainApi).count(), 0);
    assert_eq!(outcome.artifacts.iter().filter(|artifact| artifact.kind == ArtifactKind::QueryHooks).count(), 0);
    assert_eq!(missing_collaborators(&outcome.stats), 4);
    assert!(outcome.stats.warnings.iter().any(GenerationWarning::is_skipped_item));
  }

  #[tokio::test]
  async fn test_seeded_api_module_feeds_hooks() {
    let mut seed = ArtifactSet::default();
    seed.insert(GeneratedArtifact::for_tag(
      "league",
      "health",
      ArtifactKind::DomainApi,
      HEALTH_API.to_string(),
    ));

    let outcome = Orchestrator::new(without(Feature::DomainApi)).run(&league(), seed).await;

    let queries = outcome
      .artifacts
      .content("league", Some("health"), ArtifactKind::QueryHooks)
      .expect("health queries");
    assert!(queries.contains("export const useFetchHealth"), "{queries}");
    assert_eq!(missing_collaborators(&outcome.stats), 3);
  }

  #[tokio::test]
  async fn test_optional_step_failure_does_not_abort() {
    let config = CodegenConfig::builder()
      .doc_templates(crate::generator::config::DocTemplates {
        wrapper: "{verb} {path}".to_string(),
        ..Default::default()
      })
      .build();
    let outcome = Orchestrator::new(config).run(&league(), ArtifactSet::default()).await;

    assert!(!outcome.summary.is_aborted());
    let failed: Vec<_> = outcome.summary.failures.iter().map(|failure| failure.step).collect();
    assert_eq!(failed, vec![PipelineStep::DomainApi]);
    assert!(outcome.summary.successes.contains(&PipelineStep::Hooks));
    assert!(
      outcome
        .stats
        .warnings
        .iter()
        .any(|warning| matches!(warning, GenerationWarning::StepFailed { step, .. } if step == "domain-api"))
    );
    assert_eq!(missing_collaborators(&outcome.stats), 4);
    assert!(
      outcome
        .artifacts
        .content("league", Some("users"), ArtifactKind::ValidatedTypes)
        .is_some()
    );
  }

  #[tokio::test]
  async fn test_file_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("league.d.ts");
    tokio::fs::write(&path, LEAGUE).await.expect("write");

    let input = ServerInput {
      name: "league".to_string(),
      exclude_tag: Some("matches".to_string()),
      source: DescriptionSource::File(path),
    };
    let outcome = Orchestrator::new(CodegenConfig::default()).run(&input, ArtifactSet::default()).await;
    assert!(outcome.summary.is_clean());
    assert_eq!(outcome.stats.tags_classified, 3);
    assert!(
      outcome
        .artifacts
        .content("league", Some("matches"), ArtifactKind::DomainApi)
        .is_none()
    );
  }

  #[tokio::test]
  async fn test_missing_file_aborts_at_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = ServerInput {
      name: "ghost".to_string(),
      exclude_tag: None,
      source: DescriptionSource::File(dir.path().join("missing.d.ts")),
    };
    let outcome = Orchestrator::new(CodegenConfig::default()).run(&input, ArtifactSet::default()).await;

    let aborted = outcome.summary.aborted.expect("run must abort");
    assert_eq!(aborted.step, PipelineStep::LoadDescription);
    assert!(outcome.summary.successes.is_empty());
  }
}
