use super::ArtifactKind;
use crate::generator::config::ImportPaths;

/// Supplies module specifiers for generated imports.
pub trait ImportResolver {
  /// Module that exports the openapi-typescript `components` interface.
  fn schema_module(&self, server: &str, tag: &str) -> String;

  /// Module of another artifact generated for the same tag.
  fn sibling_module(&self, kind: ArtifactKind) -> String {
    format!("./{}", kind.module_name())
  }

  /// Module that exports `http` and `handleResponse`.
  fn runtime_module(&self) -> String;

  /// Module that exports `useQuery` and `useMutation`.
  fn query_module(&self) -> String;

  /// Module that exports `notify`.
  fn notifier_module(&self) -> String;
}

/// Relative sibling imports plus the configured runtime modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativeImportResolver {
  paths: ImportPaths,
}

impl RelativeImportResolver {
  pub fn new(paths: ImportPaths) -> Self {
    Self { paths }
  }
}

impl ImportResolver for RelativeImportResolver {
  fn schema_module(&self, server: &str, tag: &str) -> String {
    self.paths.schema.replace("{server}", server).replace("{tag}", tag)
  }

  fn runtime_module(&self) -> String {
    self.paths.runtime.clone()
  }

  fn query_module(&self) -> String {
    self.paths.query.clone()
  }

  fn notifier_module(&self) -> String {
    self.paths.notifier.clone()
  }
}
