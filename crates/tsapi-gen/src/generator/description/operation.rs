use http::Method;
use indexmap::IndexMap;
use mediatype::MediaType;
use strum::IntoEnumIterator;

use super::{
  members::{Member, braced_body, find_member, members},
  refs::direct_schema_ref,
};
use crate::generator::{
  ast::{OperationRef, ParameterInfo, ParameterLocation, ResponseContent, SchemaRef, path_placeholders},
  metrics::GenerationWarning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub(crate) enum ContentCategory {
  #[default]
  Json,
  FormUrlEncoded,
  Multipart,
  Text,
  Binary,
}

impl ContentCategory {
  /// Classifies a content key. Keys that do not parse (such as `*/*`) count as JSON.
  #[must_use]
  pub(crate) fn from_content_type(content_type: &str) -> Self {
    let Some(media) = MediaType::parse(content_type).ok() else {
      return Self::Json;
    };

    let suffix = media.suffix.as_ref().map(mediatype::Name::as_str);

    match (media.ty.as_str(), media.subty.as_str(), suffix) {
      ("*", "*", _) => Self::Json,
      ("multipart", _, _) => Self::Multipart,
      ("application", "x-www-form-urlencoded", _) => Self::FormUrlEncoded,
      ("application", "json", _) | (_, _, Some("json")) => Self::Json,
      ("image" | "audio" | "video", _, _) | ("application", "pdf" | "octet-stream", _) => Self::Binary,
      _ => Self::Text,
    }
  }
}

/// Picks the JSON entry of a `content` block, or the first entry when there is none.
pub(crate) fn select_content<'a>(content_block: &'a str) -> Option<Member<'a>> {
  let entries = members(content_block);
  let json = entries
    .iter()
    .position(|entry| ContentCategory::from_content_type(&entry.name) == ContentCategory::Json);
  let index = json.unwrap_or(0);
  entries.into_iter().nth(index)
}

/// Builds an [`OperationRef`] from the body of one operation.
pub(crate) fn parse_operation(
  operation_id: &str,
  method: &Method,
  path: &str,
  body: &str,
  synthesized_id: bool,
  warnings: &mut Vec<GenerationWarning>,
) -> OperationRef {
  let parameters = parse_parameters(operation_id, body, warnings);
  OperationRef {
    operation_id: operation_id.to_string(),
    method: method.clone(),
    path: path.to_string(),
    parameters: with_path_placeholders(operation_id, path, parameters, warnings),
    request_body: parse_request_body(operation_id, body, warnings),
    responses: parse_responses(operation_id, body, warnings),
    synthesized_id,
  }
}

fn parse_parameters(operation_id: &str, body: &str, warnings: &mut Vec<GenerationWarning>) -> Vec<ParameterInfo> {
  let Some(parameters) = find_member(body, "parameters") else {
    return vec![];
  };
  if parameters.is_placeholder() {
    return vec![];
  }
  let Some(groups) = parameters.block() else {
    warnings.push(GenerationWarning::unresolvable(
      operation_id,
      format!("parameters are not an object literal: {}", parameters.value),
    ));
    return vec![];
  };

  let mut result = vec![];
  for location in ParameterLocation::iter() {
    let Some(group) = find_member(groups, &location.to_string()) else {
      continue;
    };
    if group.is_placeholder() {
      continue;
    }
    let Some(group_body) = group.block() else {
      warnings.push(GenerationWarning::unresolvable(
        operation_id,
        format!("{location} parameters are not an object literal: {}", group.value),
      ));
      continue;
    };

    result.extend(
      members(group_body)
        .into_iter()
        .filter(|param| !param.is_placeholder())
        .map(|param| ParameterInfo {
          name: param.name,
          type_text: param.value.to_string(),
          optional: param.optional,
          location,
        }),
    );
  }

  result
}

/// Adds a `string` path parameter for every placeholder the operation does not declare.
fn with_path_placeholders(
  operation_id: &str,
  path: &str,
  mut parameters: Vec<ParameterInfo>,
  warnings: &mut Vec<GenerationWarning>,
) -> Vec<ParameterInfo> {
  for placeholder in path_placeholders(path) {
    let declared = parameters
      .iter()
      .any(|param| param.location == ParameterLocation::Path && param.name == placeholder);
    if declared {
      continue;
    }
    warnings.push(GenerationWarning::unresolvable(
      operation_id,
      format!("path placeholder '{placeholder}' is not declared, typed as string"),
    ));
    let position = parameters
      .iter()
      .position(|param| param.location != ParameterLocation::Path)
      .unwrap_or(parameters.len());
    parameters.insert(
      position,
      ParameterInfo {
        name: placeholder,
        type_text: "string".to_string(),
        optional: false,
        location: ParameterLocation::Path,
      },
    );
  }
  parameters
}

fn parse_request_body(operation_id: &str, body: &str, warnings: &mut Vec<GenerationWarning>) -> Option<SchemaRef> {
  let request_body = find_member(body, "requestBody")?;
  if request_body.is_placeholder() {
    return None;
  }

  let Some(request_block) = request_body.block() else {
    return Some(SchemaRef::Inline(request_body.value.to_string()));
  };

  let Some(content) = find_member(request_block, "content").and_then(|content| content.block()) else {
    warnings.push(GenerationWarning::unresolvable(
      operation_id,
      "request body has no content block",
    ));
    return None;
  };

  let entry = select_content(content)?;
  Some(match direct_schema_ref(entry.value) {
    Some(name) => SchemaRef::Named(name.to_string()),
    None => SchemaRef::Inline(entry.value.to_string()),
  })
}

fn parse_responses(
  operation_id: &str,
  body: &str,
  warnings: &mut Vec<GenerationWarning>,
) -> IndexMap<String, ResponseContent> {
  let Some(responses) = find_member(body, "responses").and_then(|responses| responses.block()) else {
    warnings.push(GenerationWarning::unresolvable(operation_id, "operation has no responses block"));
    return IndexMap::new();
  };

  members(responses)
    .into_iter()
    .map(|response| {
      let content = classify_response(&response);
      (response.name, content)
    })
    .collect()
}

fn classify_response(response: &Member<'_>) -> ResponseContent {
  let Some(response_block) = response.block() else {
    return if response.is_placeholder() {
      ResponseContent::NoContent
    } else {
      ResponseContent::Other(response.value.to_string())
    };
  };

  let Some(content) = find_member(response_block, "content") else {
    return ResponseContent::NoContent;
  };
  if content.is_placeholder() {
    return ResponseContent::NoContent;
  }
  let Some(entry) = content.block().and_then(select_content) else {
    return ResponseContent::Other(content.value.to_string());
  };

  if let Some(name) = direct_schema_ref(entry.value) {
    ResponseContent::Schema(name.to_string())
  } else if braced_body(entry.value).is_some() {
    ResponseContent::Inline(entry.value.to_string())
  } else {
    ResponseContent::Other(entry.value.to_string())
  }
}
