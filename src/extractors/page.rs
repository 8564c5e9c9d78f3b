// src/extractors/page.rs
//
// The document-structure classifier: walks the flat block sequence of one
// review post, tracks the current section / product / sub-section, and routes
// each block's text into the structured result. One parser instance per
// document; nothing is shared across runs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::extractors::blocks::{extract_url, find_url_in_text, plain_text, Block, BlockKind, TextRun};
use crate::extractors::bullet::classify_bullet;
use crate::extractors::enrich::{dedupe_products, enrich_from_summary, token_overlap};
use crate::extractors::keywords::Lexicon;

// --- Constants ---
// A heading3 this short (chars, not bytes) and digit-free is a candidate
// sub-section label rather than a product name.
const SUB_SECTION_LABEL_MAX_CHARS: usize = 10;
// Token-overlap ratio at which a heading3 refines an existing product
// instead of starting a new one. Tuned empirically; keep literal.
const REFINE_SIMILARITY: f64 = 0.6;

// --- Regex Patterns (Lazy Static) ---
static NUMBERED_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.\s*(.+)$").expect("Failed to compile NUMBERED_HEADING_RE")
});
static Q_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    // Leading toggle arrow and an explicit "Q:"/"Q." marker. A bare `Q` is
    // left alone so questions that merely start with Q survive intact.
    Regex::new(r"^(?:▶\s*)?(?:Q[:.]\s*)?").expect("Failed to compile Q_MARKER_RE")
});
static A_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:A[:.]\s*|-\s*)?").expect("Failed to compile A_MARKER_RE")
});

/// Coarse phase of the document; changes how subsequent blocks are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Intro,
    Topic,
    Summary,
    Products,
    Guide,
    Comparison,
    Closing,
    Faq,
}

/// Fine-grained label scoping bullet routing within a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubSection {
    Specs,
    Pros,
    Cons,
    Recommend,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Spec {
    pub label: String,
    pub value: String,
}

/// One reviewed item's accumulated structured data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// 1-based display rank, reassigned after deduplication.
    pub id: u32,
    pub name: String,
    pub summary: String,
    pub key_point: String,
    pub target: String,
    pub buy_url: Option<String>,
    pub description: String,
    pub specs: Vec<Spec>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub recommend_for: Vec<String>,
}

impl Product {
    fn named(id: u32, name: String) -> Self {
        Self { id, name, ..Self::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Faq {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
}

/// Page-level metadata supplied by the fetch collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub date: String,
    pub excerpt: String,
}

/// The classifier's sole output. Mutated only during one parse pass,
/// immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub intro: String,
    pub topic_title: String,
    pub topic_explanation: String,
    pub summary_table: Vec<Vec<String>>,
    pub products: Vec<Product>,
    pub selection_guide: String,
    pub comparison_table: Vec<Vec<String>>,
    pub closing: String,
    pub faqs: Vec<Faq>,
}

/// Parser state threaded through one document. The current product is an
/// index into `result.products`, never a reference, so later dedup/reorder
/// cannot dangle.
pub struct PageParser<'a> {
    lexicon: &'a Lexicon,
    section: Section,
    current_product: Option<usize>,
    sub_section: Option<SubSection>,
    result: ParseResult,
}

impl<'a> PageParser<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            section: Section::Intro,
            current_product: None,
            sub_section: None,
            result: ParseResult::default(),
        }
    }

    /// Classifies the full block sequence of one page, then runs the post
    /// passes (product dedup, summary-table enrichment).
    pub fn parse(mut self, meta: &PageMeta, blocks: &[Block]) -> ParseResult {
        self.result.title = meta.title.clone();
        self.result.date = meta.date.clone();
        self.result.excerpt = meta.excerpt.clone();

        for block in blocks {
            self.handle_block(block);
        }

        let products = std::mem::take(&mut self.result.products);
        self.result.products = dedupe_products(products);
        enrich_from_summary(&self.result.summary_table, &mut self.result.products, self.lexicon);

        self.result
    }

    fn handle_block(&mut self, block: &Block) {
        match &block.kind {
            BlockKind::Heading2 { runs } => self.on_heading2(&plain_text(runs)),
            BlockKind::Heading3 { runs } => self.on_heading3(&plain_text(runs)),
            BlockKind::Table { rows } => self.on_table(rows),
            BlockKind::Paragraph { runs }
            | BlockKind::Quote { runs }
            | BlockKind::Callout { runs } => self.on_text_block(runs),
            BlockKind::BulletedItem { runs, children }
            | BlockKind::NumberedItem { runs, children } => self.on_list_item(runs, children),
            BlockKind::Toggle { runs, children } => self.on_toggle(block, runs, children),
        }
    }

    // --- Section Classifier ---

    fn enter_section(&mut self, section: Section) {
        self.section = section;
        self.sub_section = None;
        if section != Section::Products {
            self.current_product = None;
        }
    }

    fn on_heading2(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if let Some(section) = self.lexicon.section_for_heading(text) {
            tracing::debug!("heading2 starts section {:?}: {}", section, text);
            if section == Section::Topic && self.result.topic_title.is_empty() {
                self.result.topic_title = text.to_string();
            }
            self.enter_section(section);
            return;
        }

        if let Some((id, name)) = parse_numbered_heading(text) {
            // Numbered headings only name products while the document is
            // already inside the review section; elsewhere they are inert.
            if self.section == Section::Products {
                self.start_or_refine_product(Some(id), name);
            } else {
                tracing::debug!("numbered heading2 outside products ignored: {}", text);
            }
            return;
        }

        // The first unmatched heading2 of the document titles the topic
        // explanation that follows the intro.
        if self.section == Section::Intro && self.result.topic_title.is_empty() {
            self.result.topic_title = text.to_string();
            self.enter_section(Section::Topic);
            return;
        }

        tracing::warn!("unrecognized heading2 ignored: {}", text);
    }

    fn on_heading3(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        // Headings inside these sections are never products.
        if matches!(
            self.section,
            Section::Guide | Section::Comparison | Section::Summary | Section::Closing | Section::Faq
        ) {
            tracing::debug!("heading3 ignored in section {:?}: {}", self.section, text);
            return;
        }

        if let Some((id, name)) = parse_numbered_heading(text) {
            self.start_or_refine_product(Some(id), name);
            return;
        }

        // Non-numeric heading that names an already-seen product refines it.
        if let Some(idx) = self.find_similar_product(text) {
            self.refine_product(idx, text);
            return;
        }

        // Short, digit-free label under an active product scopes bullets.
        if self.current_product.is_some() && is_label_shaped(text) {
            if let Some(sub) = self.lexicon.sub_section_for(text) {
                self.sub_section = Some(sub);
                return;
            }
        }

        let id = self.result.products.len() as u32 + 1;
        self.start_or_refine_product(Some(id), text.to_string());
    }

    fn start_or_refine_product(&mut self, id: Option<u32>, name: String) {
        let name = name.trim().to_string();

        // Same numeric id is the strongest duplicate signal.
        if let Some(id) = id {
            if let Some(idx) = self.result.products.iter().position(|p| p.id == id) {
                self.refine_product(idx, &name);
                return;
            }
        }
        if let Some(idx) = self.find_similar_product(&name) {
            self.refine_product(idx, &name);
            return;
        }

        let id = id.unwrap_or(self.result.products.len() as u32 + 1);
        self.result.products.push(Product::named(id, name));
        self.enter_section(Section::Products);
        self.current_product = Some(self.result.products.len() - 1);
        self.sub_section = None;
    }

    fn refine_product(&mut self, idx: usize, name: &str) {
        let product = &mut self.result.products[idx];
        if name.chars().count() > product.name.chars().count() {
            product.name = name.to_string();
        }
        self.enter_section(Section::Products);
        self.current_product = Some(idx);
        self.sub_section = None;
    }

    /// Finds an existing product whose name matches exactly (normalized) or
    /// whose token overlap reaches the refinement threshold.
    fn find_similar_product(&self, name: &str) -> Option<usize> {
        let normalized = normalize_name(name);
        for (idx, product) in self.result.products.iter().enumerate() {
            if normalize_name(&product.name) == normalized {
                return Some(idx);
            }
            let shorter = word_count(name).min(word_count(&product.name));
            if shorter > 0 {
                let overlap = token_overlap(name, &product.name);
                if overlap as f64 / shorter as f64 >= REFINE_SIMILARITY {
                    return Some(idx);
                }
            }
        }
        None
    }

    // --- Content Router ---

    fn on_table(&mut self, rows: &[Vec<String>]) {
        if rows.len() < 2 {
            tracing::warn!("table with fewer than 2 rows ignored");
            return;
        }
        if self.result.summary_table.is_empty() && self.is_summary_header(&rows[0]) {
            tracing::debug!("summary table detected ({} rows)", rows.len());
            self.result.summary_table = rows.to_vec();
        } else {
            // Last comparison table wins.
            self.result.comparison_table = rows.to_vec();
        }
    }

    /// Summary-table test: the first column names a product-identifying
    /// field and at least one other column names an evaluative field.
    fn is_summary_header(&self, header: &[String]) -> bool {
        let Some(first) = header.first() else { return false };
        if !self.lexicon.table_name_keys.iter().any(|k| first.contains(k)) {
            return false;
        }
        header.iter().skip(1).any(|cell| {
            self.lexicon.col_key_point.iter().any(|k| cell.contains(k))
                || self.lexicon.col_summary.iter().any(|k| cell.contains(k))
                || self.lexicon.col_target.iter().any(|k| cell.contains(k))
        })
    }

    /// Pre-filters shared by paragraphs and list items. Returns true when
    /// the block was consumed (or dropped) and needs no further routing.
    fn pre_route(&mut self, text: &str, runs: &[TextRun]) -> bool {
        if text.is_empty() {
            return true;
        }
        if self.lexicon.is_disclosure(text) {
            tracing::debug!("disclosure boilerplate dropped");
            return true;
        }
        if let Some(url) = extract_url(runs) {
            if self.lexicon.is_buy_url(&url) {
                if let Some(product) = self.current_product_mut() {
                    product.buy_url = Some(url);
                }
                return true;
            }
        }
        if self.lexicon.has_buy_phrase(text) && self.current_product.is_some() {
            if let Some(url) = find_url_in_text(text) {
                if let Some(product) = self.current_product_mut() {
                    product.buy_url = Some(url);
                }
            }
            return true;
        }
        if self.section == Section::Products {
            if let Some(sub) = inline_label(self.lexicon, text) {
                self.sub_section = Some(sub);
                return true;
            }
        }
        false
    }

    fn on_text_block(&mut self, runs: &[TextRun]) {
        let text = plain_text(runs).trim().to_string();
        if self.pre_route(&text, runs) {
            return;
        }

        match self.section {
            Section::Intro => append_line(&mut self.result.intro, &text),
            Section::Topic => append_line(&mut self.result.topic_explanation, &text),
            Section::Guide => append_line(&mut self.result.selection_guide, &text),
            Section::Closing => append_line(&mut self.result.closing, &text),
            Section::Products => self.route_product_text(&text, false),
            // Summary and comparison sections carry only tables; FAQ prose
            // arrives as bullets or toggles. Stray paragraphs are dropped.
            Section::Summary | Section::Comparison | Section::Faq => {}
        }
    }

    fn on_list_item(&mut self, runs: &[TextRun], children: &[Block]) {
        let text = plain_text(runs).trim().to_string();

        // A label-shaped parent routes its children as that sub-section.
        if self.section == Section::Products && !children.is_empty() {
            if let Some(sub) = inline_label(self.lexicon, &text) {
                self.sub_section = Some(sub);
                for child in children {
                    if let Some(child_runs) = child.runs() {
                        let child_text = plain_text(child_runs).trim().to_string();
                        if !self.pre_route(&child_text, child_runs) {
                            self.route_product_bullet(&child_text, Some(sub));
                        }
                    }
                }
                return;
            }
        }

        if self.pre_route(&text, runs) {
            return;
        }

        match self.section {
            Section::Faq => self.on_faq_bullet(&text),
            Section::Products => {
                self.route_product_bullet(&text, self.sub_section);
                // Children of an ordinary bullet are classified one by one.
                for child in children {
                    if let Some(child_runs) = child.runs() {
                        let child_text = plain_text(child_runs).trim().to_string();
                        if !self.pre_route(&child_text, child_runs) {
                            self.route_product_bullet(&child_text, None);
                        }
                    }
                }
            }
            Section::Intro => append_line(&mut self.result.intro, &text),
            Section::Topic => append_line(&mut self.result.topic_explanation, &text),
            Section::Guide => append_line(&mut self.result.selection_guide, &text),
            Section::Closing => append_line(&mut self.result.closing, &text),
            Section::Summary | Section::Comparison => {}
        }
    }

    /// Free text inside the products section. `via_bullet` distinguishes
    /// ungrouped list items (which go through the bullet classifier) from
    /// paragraphs (which default to the description).
    fn route_product_text(&mut self, text: &str, via_bullet: bool) {
        let Some(idx) = self.current_product else { return };
        let lexicon = self.lexicon;
        let recommend = lexicon.has_recommend_phrase(text);
        let product = &mut self.result.products[idx];

        match self.sub_section {
            Some(SubSection::Pros) => product.pros.push(text.to_string()),
            Some(SubSection::Cons) => product.cons.push(text.to_string()),
            Some(SubSection::Recommend) => product.recommend_for.push(text.to_string()),
            Some(SubSection::Specs) => {
                // Under an explicit spec label any key:value line splits;
                // the stricter shape test only applies to ungrouped bullets.
                if let Some(spec) = split_key_value(text) {
                    product.specs.push(spec);
                } else if via_bullet {
                    classify_bullet(lexicon, text, product);
                } else {
                    append_line(&mut product.description, text);
                }
            }
            None => {
                if recommend {
                    product.recommend_for.push(strip_recommend_phrase(text));
                } else if via_bullet {
                    classify_bullet(lexicon, text, product);
                } else {
                    append_line(&mut product.description, text);
                }
            }
        }
    }

    fn route_product_bullet(&mut self, text: &str, sub: Option<SubSection>) {
        if text.is_empty() {
            return;
        }
        let saved = self.sub_section;
        self.sub_section = sub;
        self.route_product_text(text, true);
        self.sub_section = saved;
    }

    // --- FAQ handling ---

    fn on_faq_bullet(&mut self, text: &str) {
        if text.starts_with('Q') || text.contains('?') {
            self.result.faqs.push(Faq {
                question: Q_MARKER_RE.replace(text, "").to_string(),
                answer: String::new(),
            });
        } else if text.starts_with('A') || text.starts_with('-') {
            let answer = A_MARKER_RE.replace(text, "").to_string();
            if let Some(last) = self.result.faqs.last_mut() {
                if last.answer.is_empty() {
                    last.answer = answer;
                } else {
                    last.answer.push(' ');
                    last.answer.push_str(&answer);
                }
            }
        } else {
            tracing::debug!("faq bullet without Q/A marker ignored: {}", text);
        }
    }

    fn on_toggle(&mut self, block: &Block, runs: &[TextRun], children: &[Block]) {
        let title = plain_text(runs).trim().to_string();
        if self.section != Section::Faq && !title.contains('?') {
            tracing::debug!("toggle outside FAQ ignored: {}", block.id);
            return;
        }

        let mut answer = String::new();
        for child in children {
            let text = match &child.kind {
                BlockKind::Paragraph { runs }
                | BlockKind::Quote { runs }
                | BlockKind::BulletedItem { runs, .. }
                | BlockKind::NumberedItem { runs, .. } => plain_text(runs),
                _ => continue,
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if !answer.is_empty() {
                answer.push(' ');
            }
            answer.push_str(text);
        }

        self.result.faqs.push(Faq {
            question: Q_MARKER_RE.replace(&title, "").to_string(),
            answer: A_MARKER_RE.replace(answer.trim(), "").to_string(),
        });
    }

    fn current_product_mut(&mut self) -> Option<&mut Product> {
        self.current_product.map(|idx| &mut self.result.products[idx])
    }
}

// --- Helpers ---

/// `"3. 제품명"` → `(3, "제품명")`.
fn parse_numbered_heading(text: &str) -> Option<(u32, String)> {
    let caps = NUMBERED_HEADING_RE.captures(text.trim())?;
    let id = caps[1].parse().ok()?;
    Some((id, caps[2].trim().to_string()))
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn word_count(name: &str) -> usize {
    name.split_whitespace().filter(|w| w.chars().count() >= 2).count()
}

/// Short, digit-free heading text that could be a sub-section label.
fn is_label_shaped(text: &str) -> bool {
    text.chars().count() <= SUB_SECTION_LABEL_MAX_CHARS && !text.chars().any(|c| c.is_ascii_digit())
}

/// A stripped line short enough to be an inline sub-section label, after
/// removing decoration and a trailing colon.
fn inline_label(lexicon: &Lexicon, text: &str) -> Option<SubSection> {
    let stripped = text
        .trim_start_matches(['-', '•', '▶', '*', ' '])
        .trim_end_matches([':', '：', ' '])
        .trim();
    if stripped.chars().count() > SUB_SECTION_LABEL_MAX_CHARS {
        return None;
    }
    lexicon.sub_section_for(stripped)
}

/// Plain `key: value` split at the first colon, both sides trimmed.
fn split_key_value(text: &str) -> Option<Spec> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some(Spec { label: key.to_string(), value: value.to_string() })
}

fn strip_recommend_phrase(text: &str) -> String {
    match text.split_once(':') {
        Some((_, rest)) if !rest.trim().is_empty() => rest.trim().to_string(),
        _ => text.trim().to_string(),
    }
}

fn append_line(field: &mut String, text: &str) {
    field.push_str(text);
    field.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::blocks::TextRun;

    fn h2(text: &str) -> Block {
        Block::new("h2", BlockKind::Heading2 { runs: vec![TextRun::plain(text)] })
    }
    fn h3(text: &str) -> Block {
        Block::new("h3", BlockKind::Heading3 { runs: vec![TextRun::plain(text)] })
    }
    fn para(text: &str) -> Block {
        Block::new("p", BlockKind::Paragraph { runs: vec![TextRun::plain(text)] })
    }
    fn bullet(text: &str) -> Block {
        Block::new("li", BlockKind::BulletedItem { runs: vec![TextRun::plain(text)], children: vec![] })
    }
    fn bullet_with(text: &str, children: Vec<Block>) -> Block {
        Block::new("li", BlockKind::BulletedItem { runs: vec![TextRun::plain(text)], children })
    }
    fn toggle(text: &str, children: Vec<Block>) -> Block {
        Block::new("tg", BlockKind::Toggle { runs: vec![TextRun::plain(text)], children })
    }
    fn table(rows: Vec<Vec<&str>>) -> Block {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect();
        Block::new("tb", BlockKind::Table { rows })
    }

    fn parse(blocks: &[Block]) -> ParseResult {
        let lexicon = Lexicon::default();
        let meta = PageMeta {
            title: "2025 가성비 노트북 추천".into(),
            date: "2025-06-01".into(),
            excerpt: String::new(),
        };
        PageParser::new(&lexicon).parse(&meta, blocks)
    }

    #[test]
    fn numbered_heading2_outside_products_is_inert() {
        // Scenario A: no section change, no product.
        let result = parse(&[h2("1. 순위 정리")]);
        assert!(result.products.is_empty());
        assert!(result.topic_title.is_empty());
        assert!(result.summary_table.is_empty());
    }

    #[test]
    fn bullets_split_into_specs_pros_cons() {
        // Scenario B: key:value bullet, positive bullet, negative bullet.
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            bullet("CPU: i7"),
            bullet("좋은 가성비"),
            bullet("발열이 심함"),
        ]);
        assert_eq!(result.products.len(), 1);
        let p = &result.products[0];
        assert_eq!(p.name, "노트북 A");
        assert_eq!(p.specs, vec![Spec { label: "CPU".into(), value: "i7".into() }]);
        assert_eq!(p.pros, vec!["좋은 가성비"]);
        assert_eq!(p.cons, vec!["발열이 심함"]);
    }

    #[test]
    fn duplicate_numbered_heading_refines_single_product() {
        // Scenario C: same id and name, one merged product.
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 모델 X"),
            bullet("배터리: 10시간"),
            h3("1. 모델 X"),
            bullet("튼튼한 마감"),
        ]);
        assert_eq!(result.products.len(), 1);
        let p = &result.products[0];
        assert_eq!(p.specs.len(), 1);
        assert_eq!(p.pros, vec!["튼튼한 마감"]);
    }

    #[test]
    fn summary_table_enriches_matching_product() {
        // Scenario D.
        let result = parse(&[
            h2("핵심만 콕"),
            table(vec![
                vec!["제품명", "핵심", "한줄평", "대상"],
                vec!["모델 X", "가성비", "합리적", "학생"],
            ]),
            h2("상세 리뷰"),
            h3("1. 모델 X"),
        ]);
        assert_eq!(result.products.len(), 1);
        let p = &result.products[0];
        assert_eq!(p.key_point, "가성비");
        assert_eq!(p.summary, "합리적");
        assert_eq!(p.target, "학생");
    }

    #[test]
    fn faq_toggle_becomes_entry() {
        // Scenario E.
        let result = parse(&[
            h2("자주 묻는 질문"),
            toggle("배터리는 얼마나 가나요?", vec![para("약 10시간입니다.")]),
        ]);
        assert_eq!(result.faqs.len(), 1);
        assert_eq!(result.faqs[0].question, "배터리는 얼마나 가나요?");
        assert_eq!(result.faqs[0].answer, "약 10시간입니다.");
    }

    #[test]
    fn classification_is_idempotent() {
        // P1: pure function of blocks + lexicon.
        let blocks = vec![
            para("올해 노트북 시장을 정리했습니다."),
            h2("노트북이 왜 필요한가"),
            para("재택근무가 늘었습니다."),
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            bullet("주요 스펙"),
            bullet("RAM: 16GB"),
            h2("마무리"),
            para("도움이 되셨길 바랍니다."),
        ];
        assert_eq!(parse(&blocks), parse(&blocks));
    }

    #[test]
    fn faq_section_isolates_product_fields() {
        // P5: after entering FAQ, nothing reaches product or guide fields.
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            bullet("CPU: i5"),
            h2("자주 묻는 질문"),
            para("이 문단은 버려집니다."),
            bullet("아주 좋은 제품입니다"),
        ]);
        let p = &result.products[0];
        assert_eq!(p.specs.len(), 1);
        assert!(p.pros.is_empty());
        assert!(p.description.is_empty());
        assert!(result.selection_guide.is_empty());
        assert!(result.topic_explanation.is_empty());
    }

    #[test]
    fn first_unmatched_heading2_titles_the_topic() {
        let result = parse(&[
            para("서론입니다."),
            h2("게이밍 노트북 고르는 기준"),
            para("GPU가 가장 중요합니다."),
        ]);
        assert_eq!(result.intro.trim(), "서론입니다.");
        assert_eq!(result.topic_title, "게이밍 노트북 고르는 기준");
        assert_eq!(result.topic_explanation.trim(), "GPU가 가장 중요합니다.");
    }

    #[test]
    fn later_unrecognized_heading2_changes_nothing() {
        let result = parse(&[
            h2("노트북 고르는 기준"),
            para("첫 문단"),
            h2("완전히 다른 제목"),
            para("둘째 문단"),
        ]);
        // Second heading is unrecognized; routing continues to the topic.
        assert_eq!(result.topic_title, "노트북 고르는 기준");
        assert_eq!(result.topic_explanation, "첫 문단\n둘째 문단\n");
    }

    #[test]
    fn buy_link_pre_filters() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            Block::new(
                "p",
                BlockKind::Paragraph {
                    runs: vec![TextRun::linked("구매 링크", "https://link.coupang.com/a/abc")],
                },
            ),
            para("이 포스팅은 쿠팡파트너스 활동의 일환입니다."),
        ]);
        let p = &result.products[0];
        assert_eq!(p.buy_url.as_deref(), Some("https://link.coupang.com/a/abc"));
        // Disclosure never lands in the description.
        assert!(p.description.is_empty());
    }

    #[test]
    fn buy_phrase_extracts_url_from_text() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            para("최저가 보러가기 https://coupang.com/vp/99"),
        ]);
        assert_eq!(result.products[0].buy_url.as_deref(), Some("https://coupang.com/vp/99"));
    }

    #[test]
    fn inline_label_switches_sub_section() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            bullet("장점:"),
            bullet("화면이 밝다"),
            bullet("단점"),
            bullet("충전이 오래 걸린다"),
        ]);
        let p = &result.products[0];
        assert_eq!(p.pros, vec!["화면이 밝다"]);
        assert_eq!(p.cons, vec!["충전이 오래 걸린다"]);
    }

    #[test]
    fn short_heading3_label_is_not_a_product() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            h3("주요 스펙"),
            bullet("무게: 1.2kg"),
        ]);
        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0].specs.len(), 1);
    }

    #[test]
    fn explicit_spec_label_splits_any_key_value_line() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            bullet("주요 스펙"),
            bullet("  동봉된 어댑터의 최대 충전 출력 :  140W  "),
        ]);
        let p = &result.products[0];
        assert_eq!(
            p.specs,
            vec![Spec { label: "동봉된 어댑터의 최대 충전 출력".into(), value: "140W".into() }]
        );
    }

    #[test]
    fn similar_heading3_refines_existing_product() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 삼성 갤럭시북4 프로"),
            bullet("무게: 1.2kg"),
            h3("삼성 갤럭시북4 프로 360 최신형"),
            bullet("화면: 16인치"),
        ]);
        // Token overlap well above the 0.6 threshold; one product, longer
        // name kept.
        assert_eq!(result.products.len(), 1);
        let p = &result.products[0];
        assert_eq!(p.name, "삼성 갤럭시북4 프로 360 최신형");
        assert_eq!(p.specs.len(), 2);
    }

    #[test]
    fn label_parent_routes_nested_children() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            bullet_with("주요 스펙", vec![bullet("CPU: i9"), bullet("RAM: 32GB")]),
        ]);
        let p = &result.products[0];
        assert_eq!(p.specs.len(), 2);
        assert_eq!(p.specs[1], Spec { label: "RAM".into(), value: "32GB".into() });
    }

    #[test]
    fn plain_parent_classifies_children_independently() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            bullet_with("사용해 본 소감", vec![bullet("키보드가 편하다"), bullet("팬 소음이 크다")]),
        ]);
        let p = &result.products[0];
        assert_eq!(p.pros, vec!["키보드가 편하다"]);
        assert_eq!(p.cons, vec!["팬 소음이 크다"]);
    }

    #[test]
    fn faq_bullets_pair_questions_and_answers() {
        let result = parse(&[
            h2("FAQ"),
            bullet("Q: 배터리는 오래 가나요?"),
            bullet("A: 약 10시간입니다."),
            bullet("- 게임 시에는 더 짧습니다."),
        ]);
        assert_eq!(result.faqs.len(), 1);
        assert_eq!(result.faqs[0].question, "배터리는 오래 가나요?");
        assert_eq!(result.faqs[0].answer, "약 10시간입니다. 게임 시에는 더 짧습니다.");
    }

    #[test]
    fn question_toggle_outside_faq_still_collected() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            toggle("AS는 어떻게 받나요?", vec![para("공식 센터에서 받습니다.")]),
        ]);
        assert_eq!(result.faqs.len(), 1);
        assert_eq!(result.faqs[0].question, "AS는 어떻게 받나요?");
    }

    #[test]
    fn second_table_lands_in_comparison_slot() {
        let result = parse(&[
            h2("핵심만 콕"),
            table(vec![
                vec!["제품명", "핵심 장점"],
                vec!["모델 X", "가성비"],
            ]),
            h2("비교표"),
            table(vec![
                vec!["항목", "모델 X", "모델 Y"],
                vec!["무게", "1.2kg", "1.5kg"],
            ]),
        ]);
        assert_eq!(result.summary_table.len(), 2);
        assert_eq!(result.comparison_table[0][0], "항목");
    }

    #[test]
    fn single_row_table_is_ignored() {
        let result = parse(&[h2("비교표"), table(vec![vec!["항목", "모델 X"]])]);
        assert!(result.summary_table.is_empty());
        assert!(result.comparison_table.is_empty());
    }

    #[test]
    fn recommend_phrase_without_label() {
        let result = parse(&[
            h2("상세 리뷰"),
            h3("1. 노트북 A"),
            para("이런 분께 추천: 영상 편집을 자주 하는 분"),
        ]);
        assert_eq!(result.products[0].recommend_for, vec!["영상 편집을 자주 하는 분"]);
    }

    #[test]
    fn numbered_heading_parse() {
        assert_eq!(parse_numbered_heading("3. 모델 Z"), Some((3, "모델 Z".to_string())));
        assert_eq!(parse_numbered_heading("모델 Z"), None);
        assert_eq!(parse_numbered_heading("3번째 모델"), None);
    }
}
