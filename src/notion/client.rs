// src/notion/client.rs
use reqwest::header;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::extractors::{Block, BlockKind, PageMeta};
use crate::notion::models::{BlockList, NotionBlock, NotionPage};
use crate::utils::error::NotionError;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
// Notion allows ~3 requests/second. Be conservative.
const NOTION_REQUEST_DELAY_MS: u64 = 350;
const CHILDREN_PAGE_SIZE: u32 = 100;

/// Thin client over the Notion REST API: page metadata retrieval and
/// paginated block-tree fetching. Rate limiting lives here, not in the
/// classifier.
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
}

impl NotionClient {
    pub fn new(token: String) -> Result<Self, NotionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, token })
    }

    /// Reads the integration token from `NOTION_API_KEY`.
    pub fn from_env() -> Result<Self, NotionError> {
        let token = std::env::var("NOTION_API_KEY").map_err(|_| NotionError::MissingToken)?;
        Self::new(token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NotionError> {
        tokio::time::sleep(Duration::from_millis(NOTION_REQUEST_DELAY_MS)).await;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(NotionError::RateLimited);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(NotionError::PageNotFound(url.to_string()));
            }
            return Err(NotionError::Http(status));
        }

        Ok(response.json().await?)
    }

    /// Fetches the page record and reduces it to the metadata the parser
    /// consumes. An empty title is reported by the caller, not here.
    pub async fn retrieve_page(&self, page_id: &str) -> Result<PageMeta, NotionError> {
        let url = format!("{}/pages/{}", NOTION_API_BASE, page_id);
        let page: NotionPage = self.get_json(&url).await?;
        Ok(page.meta())
    }

    /// Fetches the full top-level block sequence of a page, resolving table
    /// rows and one level of list/toggle children. A failed child fetch
    /// degrades to empty children so one broken node never aborts the
    /// document.
    pub async fn fetch_block_tree(&self, page_id: &str) -> Result<Vec<Block>, NotionError> {
        let raw = self.list_children(page_id).await?;
        tracing::info!("Fetched {} top-level blocks for page {}", raw.len(), page_id);

        let mut blocks = Vec::with_capacity(raw.len());
        for nb in raw {
            if let Some(block) = self.convert_block(nb).await {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }

    /// All children of one block, following pagination cursors.
    async fn list_children(&self, block_id: &str) -> Result<Vec<NotionBlock>, NotionError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/blocks/{}/children?page_size={}",
                NOTION_API_BASE, block_id, CHILDREN_PAGE_SIZE
            );
            if let Some(c) = &cursor {
                url.push_str("&start_cursor=");
                url.push_str(c);
            }

            let page: BlockList = self.get_json(&url).await?;
            results.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }
        Ok(results)
    }

    /// Children of one block, degraded to empty on failure (spec data or FAQ
    /// answers simply come out blank).
    async fn fetch_children_lossy(&self, block_id: &str) -> Vec<NotionBlock> {
        match self.list_children(block_id).await {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!("Failed to fetch children of block {}: {}", block_id, e);
                Vec::new()
            }
        }
    }

    /// Maps an API block onto the classifier's block model, fetching nested
    /// content where the type calls for it. Unknown types are skipped.
    async fn convert_block(&self, nb: NotionBlock) -> Option<Block> {
        let kind = match nb.block_type.as_str() {
            "heading_2" => BlockKind::Heading2 { runs: nb.runs() },
            "heading_3" => BlockKind::Heading3 { runs: nb.runs() },
            "paragraph" => BlockKind::Paragraph { runs: nb.runs() },
            "quote" => BlockKind::Quote { runs: nb.runs() },
            "callout" => BlockKind::Callout { runs: nb.runs() },
            "table" => {
                let rows = self
                    .fetch_children_lossy(&nb.id)
                    .await
                    .iter()
                    .filter_map(NotionBlock::row_cells)
                    .collect();
                BlockKind::Table { rows }
            }
            "bulleted_list_item" | "numbered_list_item" | "toggle" => {
                let children = if nb.has_children {
                    self.fetch_children_lossy(&nb.id)
                        .await
                        .into_iter()
                        .filter_map(convert_child)
                        .collect()
                } else {
                    Vec::new()
                };
                let runs = nb.runs();
                match nb.block_type.as_str() {
                    "bulleted_list_item" => BlockKind::BulletedItem { runs, children },
                    "numbered_list_item" => BlockKind::NumberedItem { runs, children },
                    _ => BlockKind::Toggle { runs, children },
                }
            }
            other => {
                tracing::debug!("Skipping unsupported block type: {}", other);
                return None;
            }
        };
        Some(Block { id: nb.id, kind })
    }
}

/// Shallow conversion for nested children. The document tree is two-level by
/// contract, so grandchildren are not fetched.
fn convert_child(nb: NotionBlock) -> Option<Block> {
    let kind = match nb.block_type.as_str() {
        "paragraph" => BlockKind::Paragraph { runs: nb.runs() },
        "quote" => BlockKind::Quote { runs: nb.runs() },
        "callout" => BlockKind::Callout { runs: nb.runs() },
        "bulleted_list_item" => BlockKind::BulletedItem { runs: nb.runs(), children: Vec::new() },
        "numbered_list_item" => BlockKind::NumberedItem { runs: nb.runs(), children: Vec::new() },
        other => {
            tracing::debug!("Skipping unsupported child block type: {}", other);
            return None;
        }
    };
    Some(Block { id: nb.id, kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_conversion_covers_leaf_types() {
        let json = r#"{
            "id": "c1",
            "type": "bulleted_list_item",
            "bulleted_list_item": { "rich_text": [ { "plain_text": "CPU: i7" } ] }
        }"#;
        let nb: NotionBlock = serde_json::from_str(json).unwrap();
        let block = convert_child(nb).expect("bullet converts");
        assert!(matches!(block.kind, BlockKind::BulletedItem { .. }));

        let json = r#"{ "id": "c2", "type": "image" }"#;
        let nb: NotionBlock = serde_json::from_str(json).unwrap();
        assert!(convert_child(nb).is_none());
    }

    #[test]
    fn top_level_conversion_maps_headings() {
        let client = NotionClient::new("test-token".into()).unwrap();
        let json = r#"{
            "id": "b1",
            "type": "heading_3",
            "heading_3": { "rich_text": [ { "plain_text": "1. 모델 X" } ] }
        }"#;
        let nb: NotionBlock = serde_json::from_str(json).unwrap();
        let block = tokio_test::block_on(client.convert_block(nb)).expect("heading converts");
        assert!(matches!(block.kind, BlockKind::Heading3 { .. }));
    }
}
