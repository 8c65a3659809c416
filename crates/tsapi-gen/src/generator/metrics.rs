use strum::Display;

use crate::generator::{
  ast::{GeneratedType, TypeKind},
  codegen::ArtifactKind,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub paths_discovered: usize,
  pub paths_excluded: usize,
  pub schemas_discovered: usize,
  pub operations_extracted: usize,
  pub tags_classified: usize,
  pub params_aliases: usize,
  pub body_aliases: usize,
  pub response_aliases: usize,
  pub ro_aliases: usize,
  pub property_aliases: usize,
  pub endpoints_generated: usize,
  pub wrappers_generated: usize,
  pub query_hooks_generated: usize,
  pub mutation_hooks_generated: usize,
  pub artifacts_generated: usize,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_paths(&mut self, discovered: usize, excluded: usize) {
    self.paths_discovered += discovered;
    self.paths_excluded += excluded;
  }

  pub fn record_schemas(&mut self, count: usize) {
    self.schemas_discovered += count;
  }

  pub fn record_operations(&mut self, count: usize) {
    self.operations_extracted += count;
  }

  pub fn record_tags(&mut self, count: usize) {
    self.tags_classified += count;
  }

  pub fn record_generated_type(&mut self, generated: &GeneratedType) {
    match generated.kind {
      TypeKind::Params => self.params_aliases += 1,
      TypeKind::Body => self.body_aliases += 1,
      TypeKind::Response => self.response_aliases += 1,
      TypeKind::Ro => self.ro_aliases += 1,
      TypeKind::Property => self.property_aliases += 1,
    }
  }

  pub fn record_generated_types<'a>(&mut self, generated: impl IntoIterator<Item = &'a GeneratedType>) {
    for generated_type in generated {
      self.record_generated_type(generated_type);
    }
  }

  pub fn record_endpoints(&mut self, count: usize) {
    self.endpoints_generated += count;
  }

  pub fn record_wrappers(&mut self, count: usize) {
    self.wrappers_generated += count;
  }

  pub fn record_hooks(&mut self, queries: usize, mutations: usize) {
    self.query_hooks_generated += queries;
    self.mutation_hooks_generated += mutations;
  }

  pub fn record_artifact(&mut self) {
    self.artifacts_generated += 1;
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }

  pub fn aliases_generated(&self) -> usize {
    self.params_aliases + self.body_aliases + self.response_aliases + self.ro_aliases + self.property_aliases
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Malformed input in {scope}: {message}")]
  MalformedInput { scope: String, message: String },
  #[strum(to_string = "[{operation_id}] {message}")]
  UnresolvableType { operation_id: String, message: String },
  #[strum(to_string = "Skipped {artifact} for '{server}/{tag}': {message}")]
  MissingCollaboratorOutput {
    server: String,
    tag: String,
    artifact: ArtifactKind,
    message: String,
  },
  #[strum(to_string = "Schema walk truncated at '{schema}' (depth {depth} exceeds {limit})")]
  DepthLimitExceeded { schema: String, depth: usize, limit: usize },
  #[strum(to_string = "Step '{step}' failed: {error}")]
  StepFailed { step: String, error: String },
}

impl GenerationWarning {
  pub fn malformed(scope: impl Into<String>, message: impl Into<String>) -> Self {
    Self::MalformedInput {
      scope: scope.into(),
      message: message.into(),
    }
  }

  pub fn unresolvable(operation_id: impl Into<String>, message: impl Into<String>) -> Self {
    Self::UnresolvableType {
      operation_id: operation_id.into(),
      message: message.into(),
    }
  }

  /// Warnings that mean generated output is missing a piece, not just degraded.
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::MissingCollaboratorOutput { .. } | Self::StepFailed { .. })
  }
}
