use strum::{Display, EnumIter, IntoEnumIterator};

use super::{data_target, render_object_type};
use crate::generator::{
  ast::{ResponseContent, TypeTarget},
  description::{
    InterfaceDescription,
    members::{braced_body, find_member, members},
    refs::array_schema_ref,
  },
};

const DATA_FIELD: &str = "data";
const STATUS_FIELDS: [&str; 2] = ["code", "message"];
const RESPONSE_SUFFIX: &str = "Response";
const DEFAULT_STATUS: &str = "default";
const NO_CONTENT_STATUS: &str = "204";

/// The Response type of an operation and the payload type it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResponse {
  pub status: String,
  pub strategy: ResponseStrategy,
  pub response: TypeTarget,
  pub ro: Option<TypeTarget>,
}

/// Ways of turning one response entry into a Response type, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ResponseStrategy {
  /// A component schema whose name ends in `Response`.
  NamedResponse,
  /// An inline object whose `data` field references a schema.
  DataEnvelope,
  /// An inline object carrying only `code` and `message`.
  StatusEnvelope,
  NoContent,
  /// Any other component schema, or an array of one.
  NamedSchema,
}

impl ResponseStrategy {
  fn resolve(
    self,
    status: &str,
    content: &ResponseContent,
    description: &InterfaceDescription,
  ) -> Option<(TypeTarget, Option<TypeTarget>)> {
    match (self, content) {
      (Self::NamedResponse, ResponseContent::Schema(name))
        if name.ends_with(RESPONSE_SUFFIX) && description.schema_type(name).is_some() =>
      {
        Some((TypeTarget::Schema(name.clone()), schema_data_target(description, name)))
      }
      (Self::DataEnvelope, ResponseContent::Inline(text)) => {
        let body = braced_body(text)?;
        let data = find_member(body, DATA_FIELD)?;
        let ro = data_target(data.value)?;
        Some((TypeTarget::Inline(render_object_type(&members(body))), Some(ro)))
      }
      (Self::StatusEnvelope, ResponseContent::Inline(text)) => {
        let fields = members(braced_body(text)?);
        let status_only = !fields.is_empty()
          && fields
            .iter()
            .all(|field| STATUS_FIELDS.contains(&field.name.as_str()));
        status_only.then(|| (TypeTarget::Inline(render_object_type(&fields)), None))
      }
      (Self::NoContent, content) if *content == ResponseContent::NoContent || status == NO_CONTENT_STATUS => {
        Some((TypeTarget::Void, None))
      }
      (Self::NamedSchema, ResponseContent::Schema(name)) if description.schema_type(name).is_some() => {
        Some((TypeTarget::Schema(name.clone()), schema_data_target(description, name)))
      }
      (Self::NamedSchema, ResponseContent::Other(text)) => {
        array_schema_ref(text).map(|name| (TypeTarget::SchemaArray(name.to_string()), None))
      }
      _ => None,
    }
  }
}

fn schema_data_target(description: &InterfaceDescription, name: &str) -> Option<TypeTarget> {
  let body = description.schema_body(name)?;
  find_member(body, DATA_FIELD).and_then(|data| data_target(data.value))
}

fn is_success_status(status: &str) -> bool {
  status.len() == 3 && status.starts_with('2')
}

/// Success statuses in ascending order followed by `default`.
pub(crate) fn candidate_statuses<'a>(statuses: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
  let mut success: Vec<&str> = vec![];
  let mut fallback = None;
  for status in statuses {
    if is_success_status(status) {
      success.push(status);
    } else if status == DEFAULT_STATUS {
      fallback = Some(status.as_str());
    }
  }
  success.sort_unstable();
  success.extend(fallback);
  success
}

/// Tries every strategy against every candidate status and keeps the first hit.
pub fn resolve_response(
  responses: &indexmap::IndexMap<String, ResponseContent>,
  description: &InterfaceDescription,
) -> Option<ResolvedResponse> {
  candidate_statuses(responses.keys()).into_iter().find_map(|status| {
    let content = &responses[status];
    ResponseStrategy::iter().find_map(|strategy| {
      strategy
        .resolve(status, content, description)
        .map(|(response, ro)| ResolvedResponse {
          status: status.to_string(),
          strategy,
          response,
          ro,
        })
    })
  })
}
