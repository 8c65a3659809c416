use crate::generator::tags::TagClassification;

/// The `tags.json` document of one server.
pub fn generate_tag_list(server: &str, classification: &TagClassification) -> anyhow::Result<String> {
  let mut json = serde_json::to_string_pretty(&classification.summary(server))?;
  json.push('\n');
  Ok(json)
}
