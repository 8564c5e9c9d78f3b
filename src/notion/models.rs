// src/notion/models.rs
#![allow(dead_code)]
use serde::Deserialize;
use std::collections::HashMap;

use crate::extractors::{PageMeta, TextRun};

/// One page of `GET /v1/blocks/{id}/children`.
#[derive(Debug, Deserialize)]
pub struct BlockList {
    #[serde(default)]
    pub results: Vec<NotionBlock>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A Notion block as returned by the API. The payload lives under a field
/// named after the block type; only the types the classifier understands are
/// modeled, everything else deserializes with all payloads `None`.
#[derive(Debug, Deserialize)]
pub struct NotionBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,

    pub heading_2: Option<RichTextPayload>,
    pub heading_3: Option<RichTextPayload>,
    pub paragraph: Option<RichTextPayload>,
    pub quote: Option<RichTextPayload>,
    pub callout: Option<RichTextPayload>,
    pub bulleted_list_item: Option<RichTextPayload>,
    pub numbered_list_item: Option<RichTextPayload>,
    pub toggle: Option<RichTextPayload>,
    pub table_row: Option<TableRowPayload>,
}

impl NotionBlock {
    /// The rich-text runs of this block's payload, whichever type it is.
    pub fn runs(&self) -> Vec<TextRun> {
        let payload = self
            .heading_2
            .as_ref()
            .or(self.heading_3.as_ref())
            .or(self.paragraph.as_ref())
            .or(self.quote.as_ref())
            .or(self.callout.as_ref())
            .or(self.bulleted_list_item.as_ref())
            .or(self.numbered_list_item.as_ref())
            .or(self.toggle.as_ref());
        match payload {
            Some(p) => p.rich_text.iter().map(NotionRichText::to_run).collect(),
            None => Vec::new(),
        }
    }

    /// The plain-text cells of a `table_row` block.
    pub fn row_cells(&self) -> Option<Vec<String>> {
        self.table_row.as_ref().map(|row| {
            row.cells
                .iter()
                .map(|cell| cell.iter().map(|t| t.plain_text.as_str()).collect())
                .collect()
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RichTextPayload {
    #[serde(default)]
    pub rich_text: Vec<NotionRichText>,
}

#[derive(Debug, Deserialize)]
pub struct TableRowPayload {
    #[serde(default)]
    pub cells: Vec<Vec<NotionRichText>>,
}

#[derive(Debug, Deserialize)]
pub struct NotionRichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

impl NotionRichText {
    fn to_run(&self) -> TextRun {
        TextRun { text: self.plain_text.clone(), href: self.href.clone() }
    }
}

/// `GET /v1/pages/{id}` — only the properties the pipeline reads.
#[derive(Debug, Deserialize)]
pub struct NotionPage {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PageProperty>,
}

#[derive(Debug, Deserialize)]
pub struct PageProperty {
    pub title: Option<Vec<NotionRichText>>,
    pub rich_text: Option<Vec<NotionRichText>>,
    pub date: Option<DateProperty>,
}

#[derive(Debug, Deserialize)]
pub struct DateProperty {
    pub start: Option<String>,
}

impl NotionPage {
    /// Page metadata with the property-name fallback chain the source
    /// databases use (Korean names first, English aliases second).
    pub fn meta(&self) -> PageMeta {
        let title = self
            .text_property(&["제목", "Title", "Name"], true)
            .unwrap_or_default();
        let date = self
            .date_property(&["날짜", "Date"])
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        let excerpt = self
            .text_property(&["요약", "Excerpt"], false)
            .unwrap_or_default();
        PageMeta { title, date, excerpt }
    }

    fn text_property(&self, names: &[&str], is_title: bool) -> Option<String> {
        for name in names {
            if let Some(prop) = self.properties.get(*name) {
                let runs = if is_title { prop.title.as_ref() } else { prop.rich_text.as_ref() };
                if let Some(runs) = runs {
                    let text: String = runs.iter().map(|t| t.plain_text.as_str()).collect();
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
        }
        None
    }

    fn date_property(&self, names: &[&str]) -> Option<String> {
        for name in names {
            if let Some(start) = self
                .properties
                .get(*name)
                .and_then(|p| p.date.as_ref())
                .and_then(|d| d.start.clone())
            {
                return Some(start);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_block_list() {
        let json = r#"{
            "results": [
                {
                    "id": "b1",
                    "type": "heading_2",
                    "has_children": false,
                    "heading_2": { "rich_text": [ { "plain_text": "상세 리뷰", "href": null } ] }
                },
                {
                    "id": "b2",
                    "type": "paragraph",
                    "paragraph": { "rich_text": [
                        { "plain_text": "구매 링크", "href": "https://link.coupang.com/a/x" }
                    ] }
                },
                { "id": "b3", "type": "divider" }
            ],
            "has_more": true,
            "next_cursor": "abc"
        }"#;

        let list: BlockList = serde_json::from_str(json).expect("valid block list");
        assert_eq!(list.results.len(), 3);
        assert!(list.has_more);
        assert_eq!(list.results[0].runs()[0].text, "상세 리뷰");
        assert_eq!(
            list.results[1].runs()[0].href.as_deref(),
            Some("https://link.coupang.com/a/x")
        );
        // Unmodeled block types still deserialize.
        assert_eq!(list.results[2].block_type, "divider");
        assert!(list.results[2].runs().is_empty());
    }

    #[test]
    fn table_row_cells_flatten_to_strings() {
        let json = r#"{
            "id": "r1",
            "type": "table_row",
            "table_row": { "cells": [
                [ { "plain_text": "제품명" } ],
                [ { "plain_text": "핵심 " }, { "plain_text": "장점" } ]
            ] }
        }"#;
        let block: NotionBlock = serde_json::from_str(json).expect("valid row");
        assert_eq!(block.row_cells(), Some(vec!["제품명".to_string(), "핵심 장점".to_string()]));
    }

    #[test]
    fn page_meta_property_fallbacks() {
        let json = r#"{
            "id": "p1",
            "properties": {
                "Title": { "title": [ { "plain_text": "노트북 추천" } ] },
                "날짜": { "date": { "start": "2025-06-01" } },
                "Excerpt": { "rich_text": [ { "plain_text": "요약문" } ] }
            }
        }"#;
        let page: NotionPage = serde_json::from_str(json).expect("valid page");
        let meta = page.meta();
        assert_eq!(meta.title, "노트북 추천");
        assert_eq!(meta.date, "2025-06-01");
        assert_eq!(meta.excerpt, "요약문");
    }

    #[test]
    fn missing_title_yields_empty_string() {
        let json = r#"{ "id": "p1", "properties": {} }"#;
        let page: NotionPage = serde_json::from_str(json).expect("valid page");
        assert!(page.meta().title.is_empty());
    }
}
