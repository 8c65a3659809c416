mod api;
mod hooks;

use crate::generator::{
  codegen::RelativeImportResolver,
  description::InterfaceDescription,
  extractor::{OperationTypes, TypeExtractor, extract_model},
  tags::{TagClassification, TagClassifier},
};

const LEAGUE: &str = include_str!("../../../../fixtures/league.d.ts");

struct League {
  description: InterfaceDescription,
  classification: TagClassification,
}

impl League {
  fn load() -> Self {
    let mut warnings = vec![];
    let description = InterfaceDescription::parse(LEAGUE, &mut warnings);
    let paths = extract_model(&description, &mut warnings).expect("unique operation ids");
    let classification = TagClassifier::new(None).classify_entries(&paths);
    Self {
      description,
      classification,
    }
  }

  fn operations(&self, tag: &str) -> Vec<OperationTypes> {
    let mut warnings = vec![];
    let paths = extract_model(&self.description, &mut warnings).expect("unique operation ids");
    let extractor = TypeExtractor::new(&self.description);
    self
      .classification
      .entries_for(tag, &paths)
      .flat_map(|entry| entry.operations.values())
      .map(|operation| extractor.derive(operation, &mut warnings))
      .collect()
  }
}

fn imports() -> RelativeImportResolver {
  RelativeImportResolver::default()
}
