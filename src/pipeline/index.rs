// src/pipeline/index.rs

//! Archive index document merging.
//!
//! The archive index is a markdown document with one section per platform,
//! each holding a table whose columns are problem tags and whose cells are
//! links to rendered records:
//!
//! ```text
//! # Coding Submissions
//!
//! ## Codeforces
//!
//! | dp | greedy |
//! | --- | --- |
//! | [A](codeforces/1-A.md) | [B](codeforces/1-B.md) |
//! ```
//!
//! The document doubles as stored state: every run parses the previously
//! published tables back into tag maps, folds the new records in, and
//! re-serializes. Merging with no new records must reproduce the input
//! byte-for-byte (modulo trailing whitespace), so the parse and serialize
//! halves are kept strictly symmetric.

use std::collections::BTreeMap;

use crate::models::{Platform, SubmissionRecord};
use crate::utils::collapse_excess_newlines;

/// Root heading inserted when the document does not already carry one.
pub const ROOT_TITLE: &str = "# Coding Submissions";

/// Tag-keyed table of rendered links.
///
/// Links within a tag keep their first-merged insertion order; tags are
/// always serialized in sorted order regardless of discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    columns: BTreeMap<String, Vec<String>>,
}

impl TagTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Append a link under a tag, creating the column if new.
    ///
    /// A link already present in the column is not appended again, so
    /// re-running a merge with the same records does not duplicate entries.
    pub fn insert(&mut self, tag: &str, link: String) {
        let column = self.columns.entry(tag.to_string()).or_default();
        if !column.contains(&link) {
            column.push(link);
        }
    }

    /// Links recorded under a tag, if the column exists.
    pub fn column(&self, tag: &str) -> Option<&[String]> {
        self.columns.get(tag).map(Vec::as_slice)
    }

    /// Serialize to a markdown table block (header, separator, padded rows).
    pub fn serialize(&self) -> String {
        let tags: Vec<&String> = self.columns.keys().collect();
        if tags.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        out.push_str("| ");
        out.push_str(
            &tags
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" | "),
        );
        out.push_str(" |\n");

        out.push_str("| ");
        out.push_str(&vec!["---"; tags.len()].join(" | "));
        out.push_str(" |\n");

        let max_len = self
            .columns
            .values()
            .map(Vec::len)
            .max()
            .unwrap_or_default();
        for i in 0..max_len {
            let cells: Vec<&str> = tags
                .iter()
                .map(|tag| {
                    self.columns[*tag]
                        .get(i)
                        .map(String::as_str)
                        .unwrap_or_default()
                })
                .collect();
            out.push_str("| ");
            out.push_str(&cells.join(" | "));
            out.push_str(" |\n");
        }

        out
    }

    /// Parse a table block back into a tag map.
    ///
    /// `lines` must start at the header row. Empty header cells are skipped;
    /// data cells map to their header cell by position, with empty cells
    /// recording no entry.
    fn parse(lines: &[&str]) -> Self {
        let mut table = TagTable::default();
        if lines.len() < 2 || !is_separator_row(lines[1]) {
            return table;
        }

        // (position, tag) pairs; empty header cells keep positions aligned
        let header: Vec<(usize, String)> = split_row(lines[0])
            .into_iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .collect();
        if header.is_empty() {
            return table;
        }

        for (_, tag) in &header {
            table.columns.entry(tag.clone()).or_default();
        }

        for line in lines.iter().skip(2) {
            let cells = split_row(line);
            for (pos, tag) in &header {
                if let Some(cell) = cells.get(*pos) {
                    if !cell.is_empty() {
                        table.insert(tag, cell.clone());
                    }
                }
            }
        }

        table
    }
}

/// Parsed state of one platform section.
#[derive(Debug, Clone, Default)]
struct Section {
    table: TagTable,
    /// Loose bullet entries kept verbatim (used only by tagless sections)
    bullets: Vec<String>,
}

impl Section {
    fn is_empty(&self) -> bool {
        self.table.is_empty() && self.bullets.is_empty()
    }
}

/// Merge new records into a previously published index document.
///
/// Content outside the recognized platform sections is preserved; a root
/// title is inserted if absent; runs of blank lines are collapsed to one.
pub fn merge(old_document: &str, new_records: &[SubmissionRecord]) -> String {
    let mut doc = old_document.to_string();
    if !doc.contains(ROOT_TITLE) {
        doc.push('\n');
        doc.push_str(ROOT_TITLE);
        doc.push_str("\n\n");
    }

    for platform in Platform::ALL {
        let records: Vec<&SubmissionRecord> = new_records
            .iter()
            .filter(|r| r.platform == platform)
            .collect();

        let mut section = parse_section(&doc, platform.section_name());

        for record in &records {
            for tag in &record.tags {
                section.table.insert(tag, record.index_link());
            }
        }

        // Untagged records fall back to loose bullets, but only when the
        // section has no tag columns at all.
        if section.table.is_empty() {
            for record in records.iter().filter(|r| r.tags.is_empty()) {
                let bullet = if record.summary.is_empty() {
                    format!("- {}", record.index_link())
                } else {
                    format!("- {} - {}", record.index_link(), record.summary)
                };
                if !section.bullets.contains(&bullet) {
                    section.bullets.push(bullet);
                }
            }
        }

        if section.is_empty() {
            continue;
        }

        let rendered = render_section(platform.section_name(), &section);
        doc = splice_section(&doc, platform.section_name(), &rendered);
    }

    let collapsed = collapse_excess_newlines(&doc);
    format!("{}\n", collapsed.trim())
}

/// Parse one platform section out of a document. Absent or malformed
/// sections come back empty, which makes the merge treat them as fresh.
fn parse_section(document: &str, name: &str) -> Section {
    let lines: Vec<&str> = document.lines().collect();
    let Some((start, end)) = section_region(&lines, name) else {
        return Section::default();
    };
    let region = &lines[start..end];

    let mut section = Section::default();

    // Locate the first table: a pipe row immediately followed by a
    // separator row.
    let mut table_end = 0;
    for (i, line) in region.iter().enumerate() {
        if line.trim_start().starts_with('|')
            && i + 1 < region.len()
            && is_separator_row(region[i + 1])
        {
            let mut j = i + 2;
            while j < region.len() && region[j].trim_start().starts_with('|') {
                j += 1;
            }
            section.table = TagTable::parse(&region[i..j]);
            table_end = j;
            break;
        }
    }

    // Carry forward loose bullet entries so a tagless section never loses
    // previously recorded links.
    for line in region.iter().skip(table_end) {
        let trimmed = line.trim();
        if trimmed.starts_with("- [") {
            section.bullets.push(trimmed.to_string());
        }
    }

    section
}

/// Serialize one platform section (heading, table, bullets).
fn render_section(name: &str, section: &Section) -> String {
    let mut out = format!("## {}\n\n", name);

    if !section.table.is_empty() {
        out.push_str(&section.table.serialize());
        out.push('\n');
    }

    if !section.bullets.is_empty() {
        for bullet in &section.bullets {
            out.push_str(bullet);
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Replace a section region with its re-rendered text, or append the section
/// at the end of the document if it does not exist yet.
fn splice_section(document: &str, name: &str, rendered: &str) -> String {
    let lines: Vec<&str> = document.lines().collect();

    match section_region(&lines, name) {
        Some((start, end)) => {
            let mut out = String::new();
            for line in &lines[..start] {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(rendered);
            for line in &lines[end..] {
                out.push_str(line);
                out.push('\n');
            }
            out
        }
        None => {
            let mut out = document.trim_end().to_string();
            out.push_str("\n\n");
            out.push_str(rendered);
            out
        }
    }
}

/// Line span `[start, end)` of a section: from its heading line to the next
/// `## ` heading or end of document. Heading match is case-insensitive.
fn section_region(lines: &[&str], name: &str) -> Option<(usize, usize)> {
    let heading = format!("## {}", name);
    let start = lines
        .iter()
        .position(|line| line.trim().eq_ignore_ascii_case(&heading))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim_start().starts_with("## "))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());
    Some((start, end))
}

/// Whether a line is a markdown table separator row (`| --- | --- |`).
fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && trimmed.contains("---")
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

/// Split a table row into trimmed cells, dropping the outer pipes.
fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}
