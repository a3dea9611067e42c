//! Index and detail page readers.
//!
//! The index page lists every base command in a table and ends with the
//! global parameter block. A base command's detail page lists its group
//! pages in a table of links.

use cmdtree_core::SubcommandSpec;
use scraper::{ElementRef, Html};
use url::Url;

use super::{RawParameter, SELECTORS, clean_command_name, element_text};
use crate::error::{DiscoveryError, Result, join_url};

/// Element wrapping the global parameter block.
const GLOBAL_BLOCK_ELEMENT: &str = "details";

/// One row of the index table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// Cleaned command text (`vm`, `network vnet`).
    pub command: String,
    pub description: String,
    /// Detail page, or `None` when the row links back to the index itself.
    pub link: Option<Url>,
}

/// A top-level entry of the documented tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseCommand {
    /// Has its own reference pages.
    Detailed {
        command: String,
        description: String,
        detail_url: Url,
    },
    /// Documented only on the index page.
    Stub { command: String, description: String },
}

impl From<IndexRow> for BaseCommand {
    fn from(row: IndexRow) -> Self {
        match row.link {
            Some(detail_url) => BaseCommand::Detailed {
                command: row.command,
                description: row.description,
                detail_url,
            },
            None => BaseCommand::Stub {
                command: row.command,
                description: row.description,
            },
        }
    }
}

impl BaseCommand {
    pub fn command(&self) -> &str {
        match self {
            BaseCommand::Detailed { command, .. } | BaseCommand::Stub { command, .. } => command,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            BaseCommand::Detailed { description, .. }
            | BaseCommand::Stub { description, .. } => description,
        }
    }

    pub fn detail_url(&self) -> Option<&Url> {
        match self {
            BaseCommand::Detailed { detail_url, .. } => Some(detail_url),
            BaseCommand::Stub { .. } => None,
        }
    }

    /// Bare node carrying only the name and description.
    pub fn to_stub_node(&self) -> SubcommandSpec {
        SubcommandSpec::new(self.command(), self.description())
    }
}

/// Reads the base command table of the index page.
///
/// Links are resolved against `reference_base`. A row whose link, without
/// fragment, equals `index_url` has no detail page.
///
/// # Errors
///
/// Returns [`MalformedDocument`](DiscoveryError::MalformedDocument) if the
/// page has no table, or a row lacks a description column or a link.
pub fn read_index_rows(html: &str, reference_base: &Url, index_url: &Url) -> Result<Vec<IndexRow>> {
    let document = Html::parse_document(html);
    let index_url = without_fragment(index_url);

    first_table_rows(&document)?
        .into_iter()
        .map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&SELECTORS.cell).collect();
            let [name_cell, description_cell, ..] = cells.as_slice() else {
                return Err(malformed("index row has fewer than two columns"));
            };
            let link = without_fragment(&join_url(reference_base, cell_href(*name_cell)?)?);
            Ok(IndexRow {
                command: clean_command_name(&element_text(*name_cell)),
                description: element_text(*description_cell).trim().to_string(),
                link: (link != index_url).then_some(link),
            })
        })
        .collect()
}

/// Reads the group page links of a base command's detail page.
///
/// Links are resolved against `detail_url`, stripped of fragments and
/// deduplicated keeping first-seen order.
pub fn read_group_urls(html: &str, detail_url: &Url) -> Result<Vec<Url>> {
    let document = Html::parse_document(html);
    let mut urls: Vec<Url> = Vec::new();
    for row in first_table_rows(&document)? {
        let Some(name_cell) = row.select(&SELECTORS.cell).next() else {
            return Err(malformed("group table row has no cells"));
        };
        let url = without_fragment(&join_url(detail_url, cell_href(name_cell)?)?);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    Ok(urls)
}

/// Reads the global parameter block: the first disclosure block after the
/// page's first `h2`, with its parameter names and descriptions paired in
/// order.
///
/// # Errors
///
/// Returns [`MalformedDocument`](DiscoveryError::MalformedDocument) if the
/// page has no `h2` or no block follows it.
pub fn read_global_parameters(html: &str) -> Result<Vec<RawParameter>> {
    let document = Html::parse_document(html);
    let heading = document
        .select(&SELECTORS.h2)
        .next()
        .ok_or_else(|| malformed("index page has no h2 heading"))?;

    let block = document
        .select(&SELECTORS.any)
        .skip_while(|element| element.id() != heading.id())
        .skip(1)
        .find(|element| element.value().name() == GLOBAL_BLOCK_ELEMENT)
        .ok_or_else(|| malformed("no global parameter block after the first h2"))?;

    let names = block.select(&SELECTORS.parameter_name).map(element_text);
    let infos = block.select(&SELECTORS.parameter_info).map(element_text);
    Ok(names
        .zip(infos)
        .map(|(name, info)| RawParameter::new(name.trim(), info.trim()))
        .collect())
}

fn first_table_rows(document: &Html) -> Result<Vec<ElementRef<'_>>> {
    let table = document
        .select(&SELECTORS.table)
        .next()
        .ok_or_else(|| malformed("page has no table"))?;
    Ok(table.select(&SELECTORS.body_row).collect())
}

fn cell_href(cell: ElementRef<'_>) -> Result<&str> {
    cell.select(&SELECTORS.link)
        .next()
        .and_then(|link| link.value().attr("href"))
        .ok_or_else(|| malformed("table cell has no link"))
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

fn malformed(detail: &str) -> DiscoveryError {
    DiscoveryError::MalformedDocument(detail.to_string())
}
