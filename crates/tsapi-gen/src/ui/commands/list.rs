use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use http::Method;
use itertools::Itertools;

use crate::{
  generator::{
    description::InterfaceDescription,
    extractor::extract_model,
    tags::{TagClassification, TagClassifier},
  },
  ui::{
    Colors,
    cli::SourceArgs,
    colors::{IntoComfyColor, Role},
    term_width,
  },
  utils::description::DescriptionLoader,
};

const EXCLUDED: &str = "(excluded)";

/// One operation as shown by `list paths`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathRow {
  tag: Option<String>,
  method: Method,
  path: String,
  operation_id: String,
}

/// Every operation, grouped by tag in tag order, excluded paths last.
fn path_rows(text: &str, exclude_tag: Option<String>) -> anyhow::Result<(Vec<PathRow>, TagClassification)> {
  let mut warnings = vec![];
  let description = InterfaceDescription::parse(text, &mut warnings);
  let paths = extract_model(&description, &mut warnings)?;
  let classification = TagClassifier::new(exclude_tag).classify_entries(&paths);

  let rows = paths
    .iter()
    .flat_map(|entry| {
      let tag = classification.tag_of(&entry.path).map(ToString::to_string);
      entry.operations.iter().map(move |(method, operation)| PathRow {
        tag: tag.clone(),
        method: method.clone(),
        path: entry.path.clone(),
        operation_id: operation.operation_id.clone(),
      })
    })
    .sorted_by(|a, b| {
      (a.tag.is_none(), &a.tag, &a.path)
        .cmp(&(b.tag.is_none(), &b.tag, &b.path))
    })
    .collect();
  Ok((rows, classification))
}

fn table(headers: &[&str], colors: &Colors) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in headers {
    row.add_cell(Cell::new(header).fg(colors.comfy(Role::Label)));
  }
  table.set_header(row);
  table
}

async fn load(source: &SourceArgs) -> anyhow::Result<(Vec<PathRow>, TagClassification)> {
  let loader = DescriptionLoader::open(&source.input).await?;
  path_rows(loader.text()?, source.exclude_tag.clone())
}

pub async fn list_paths(source: &SourceArgs, colors: &Colors) -> anyhow::Result<()> {
  let (rows, _) = load(source).await?;

  let mut table = table(&["TAG", "METHOD", "PATH", "OPERATION ID"], colors);
  for path_row in rows {
    let mut row = Row::new();
    match path_row.tag {
      Some(tag) => row.add_cell(Cell::new(tag).fg(colors.comfy(Role::Tag)).add_attribute(Attribute::Bold)),
      None => row.add_cell(Cell::new(EXCLUDED).fg(colors.comfy(Role::Excluded))),
    };
    row.add_cell(
      Cell::new(path_row.method.as_str())
        .fg(IntoComfyColor::into(colors.method(&path_row.method)))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(path_row.path).fg(colors.comfy(Role::Path)));
    row.add_cell(Cell::new(path_row.operation_id).fg(colors.comfy(Role::OperationId)));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}

pub async fn list_tags(source: &SourceArgs, colors: &Colors) -> anyhow::Result<()> {
  let (_, classification) = load(source).await?;

  let mut table = table(&["TAG", "PATHS"], colors);
  for entry in classification.tags.values() {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(&entry.name)
        .fg(colors.comfy(Role::Tag))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(entry.path_count)
        .fg(colors.comfy(Role::Value))
        .set_alignment(CellAlignment::Right),
    );
    table.add_row(row);
  }
  if !classification.excluded.is_empty() {
    let mut row = Row::new();
    row.add_cell(Cell::new(EXCLUDED).fg(colors.comfy(Role::Excluded)));
    row.add_cell(
      Cell::new(classification.excluded.len())
        .fg(colors.comfy(Role::Excluded))
        .set_alignment(CellAlignment::Right),
    );
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}
