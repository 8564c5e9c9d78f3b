// src/extractors/enrich.rs
//
// Post passes over the accumulated products: merge duplicate entries that
// appeared under multiple headings, then fill missing summary fields from the
// detected summary table.

use crate::extractors::keywords::Lexicon;
use crate::extractors::page::Product;

// Minimum token-overlap score for a table row to claim a product by name.
// Below this the row falls back to positional matching. Tuned empirically;
// keep literal.
const ROW_MATCH_MIN_OVERLAP: usize = 2;

/// Merges products whose names are equal after normalization (lowercase,
/// whitespace collapsed). Exact match only: fuzzy similarity is reserved for
/// table enrichment so distinct models sharing vocabulary never merge.
/// Survivors keep first-occurrence order and get fresh 1-based ranks.
pub fn dedupe_products(products: Vec<Product>) -> Vec<Product> {
    let mut merged: Vec<Product> = Vec::with_capacity(products.len());

    for product in products {
        let key = normalize_name(&product.name);
        match merged.iter_mut().find(|p| normalize_name(&p.name) == key) {
            Some(existing) => {
                tracing::debug!("merging duplicate product entry: {}", product.name);
                merge_into(existing, product);
            }
            None => merged.push(product),
        }
    }

    for (rank, product) in merged.iter_mut().enumerate() {
        product.id = rank as u32 + 1;
    }
    merged
}

/// Per-field merge: the earlier entry's value wins unless empty. List fields
/// are taken whole from the first non-empty source, never concatenated, so a
/// product reviewed twice does not double its bullets.
fn merge_into(first: &mut Product, later: Product) {
    if first.summary.is_empty() {
        first.summary = later.summary;
    }
    if first.key_point.is_empty() {
        first.key_point = later.key_point;
    }
    if first.target.is_empty() {
        first.target = later.target;
    }
    if first.description.trim().is_empty() {
        first.description = later.description;
    }
    if first.buy_url.is_none() {
        first.buy_url = later.buy_url;
    }
    if first.specs.is_empty() {
        first.specs = later.specs;
    }
    if first.pros.is_empty() {
        first.pros = later.pros;
    }
    if first.cons.is_empty() {
        first.cons = later.cons;
    }
    if first.recommend_for.is_empty() {
        first.recommend_for = later.recommend_for;
    }
}

/// Fills product summary fields (key point, one-liner, target audience) from
/// the summary table. Column roles are located by header keywords; a missing
/// column leaves its field untouched. Each product is claimed by at most one
/// row.
pub fn enrich_from_summary(table: &[Vec<String>], products: &mut [Product], lexicon: &Lexicon) {
    if table.len() < 2 || products.is_empty() {
        return;
    }

    let headers = &table[0];
    let name_idx = find_column(headers, &lexicon.table_name_keys);
    let key_point_idx = find_column(headers, &lexicon.col_key_point);
    let summary_idx = find_column(headers, &lexicon.col_summary);
    let target_idx = find_column(headers, &lexicon.col_target);

    let mut claimed = vec![false; products.len()];

    for (row_pos, row) in table[1..].iter().enumerate() {
        let by_name = name_idx
            .and_then(|i| row.get(i))
            .and_then(|cell| best_name_match(cell, products, &claimed));

        // Positional fallback only claims a product no row has taken yet.
        let matched = by_name.or_else(|| {
            (row_pos < products.len() && !claimed[row_pos]).then_some(row_pos)
        });

        let Some(product_idx) = matched else {
            tracing::debug!("summary row {} matched no product, skipped", row_pos + 1);
            continue;
        };
        claimed[product_idx] = true;

        let product = &mut products[product_idx];
        fill_field(&mut product.key_point, key_point_idx, row);
        fill_field(&mut product.summary, summary_idx, row);
        fill_field(&mut product.target, target_idx, row);
    }
}

fn find_column(headers: &[String], keys: &[&str]) -> Option<usize> {
    headers.iter().position(|h| keys.iter().any(|k| h.contains(k)))
}

fn fill_field(field: &mut String, idx: Option<usize>, row: &[String]) {
    if let Some(cell) = idx.and_then(|i| row.get(i)) {
        if !cell.trim().is_empty() {
            *field = cell.trim().to_string();
        }
    }
}

/// Highest-scoring unclaimed product for a row's name cell, if any reaches
/// the overlap threshold.
fn best_name_match(cell: &str, products: &[Product], claimed: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, product) in products.iter().enumerate() {
        if claimed[idx] {
            continue;
        }
        let score = token_overlap(cell, &product.name);
        if score >= ROW_MATCH_MIN_OVERLAP && best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Count of word pairs where one word contains the other, case-insensitive.
/// Words shorter than 2 characters are ignored.
pub fn token_overlap(a: &str, b: &str) -> usize {
    let words_a = significant_words(a);
    let words_b = significant_words(b);
    let mut count = 0;
    for wa in &words_a {
        for wb in &words_b {
            if wa.contains(wb.as_str()) || wb.contains(wa.as_str()) {
                count += 1;
            }
        }
    }
    count
}

fn significant_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.chars().count() >= 2)
        .map(|w| w.to_lowercase())
        .collect()
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::page::Spec;

    fn product(name: &str) -> Product {
        Product { name: name.to_string(), ..Product::default() }
    }

    #[test]
    fn exact_normalized_names_merge() {
        let mut a = product("LG 그램 17");
        a.pros.push("가볍다".into());
        let mut b = product("lg  그램 17");
        b.cons.push("비싸다".into());
        b.pros.push("버려질 장점".into());

        let merged = dedupe_products(vec![a, b]);
        assert_eq!(merged.len(), 1);
        // First entry's non-empty list wins whole; no concatenation.
        assert_eq!(merged[0].pros, vec!["가볍다"]);
        assert_eq!(merged[0].cons, vec!["비싸다"]);
    }

    #[test]
    fn similar_but_distinct_names_do_not_merge() {
        let merged = dedupe_products(vec![product("갤럭시북4 프로"), product("갤럭시북4 울트라")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn ranks_reassigned_in_first_seen_order() {
        // P2: interleaved duplicates keep first-seen order and fields.
        let mut a1 = product("모델 A");
        a1.id = 7;
        a1.summary = "먼저 온 요약".into();
        let b = product("모델 B");
        let mut a2 = product("모델 A");
        a2.id = 1;
        a2.summary = "나중 요약".into();
        a2.target = "학생".into();

        let merged = dedupe_products(vec![a1, b, a2]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "모델 A");
        assert_eq!(merged[0].id, 1);
        assert_eq!(merged[1].id, 2);
        // Earlier non-empty field wins; empty field backfilled.
        assert_eq!(merged[0].summary, "먼저 온 요약");
        assert_eq!(merged[0].target, "학생");
    }

    #[test]
    fn dedup_is_permutation_stable_on_names() {
        let names = |v: &[Product]| v.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
        let merged1 = dedupe_products(vec![product("A모델"), product("B모델"), product("A모델")]);
        let merged2 = dedupe_products(vec![product("A모델"), product("A모델"), product("B모델")]);
        assert_eq!(names(&merged1), names(&merged2));
    }

    #[test]
    fn token_overlap_uses_containment_both_ways() {
        assert_eq!(token_overlap("삼성 갤럭시북4", "삼성 갤럭시북4 프로"), 2);
        // Single-char words are ignored.
        assert_eq!(token_overlap("모델 X", "모델 X"), 1);
        assert_eq!(token_overlap("전혀 다른", "이름 입니다"), 0);
    }

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    #[test]
    fn rows_claim_products_by_name_overlap() {
        let mut products = vec![product("레노버 씽크패드 E14"), product("삼성 갤럭시북4 프로")];
        let table = table(&[
            &["제품명", "핵심 장점", "한 줄 평"],
            // Rows arrive in the opposite order of the products.
            &["삼성 갤럭시북4 프로 16인치", "휴대성", "출장족 최적"],
            &["레노버 씽크패드 E14 G6", "내구성", "사무용 정석"],
        ]);

        enrich_from_summary(&table, &mut products, &Lexicon::default());
        assert_eq!(products[0].key_point, "내구성");
        assert_eq!(products[0].summary, "사무용 정석");
        assert_eq!(products[1].key_point, "휴대성");
    }

    #[test]
    fn positional_fallback_when_names_never_score() {
        let mut products = vec![product("모델 X"), product("모델 Y")];
        let table = table(&[
            &["제품명", "핵심"],
            &["완전히 다른 표기", "가성비"],
            &["역시 다른 표기", "성능"],
        ]);

        enrich_from_summary(&table, &mut products, &Lexicon::default());
        assert_eq!(products[0].key_point, "가성비");
        assert_eq!(products[1].key_point, "성능");
    }

    #[test]
    fn claimed_product_is_not_claimed_twice() {
        let mut products = vec![product("삼성 갤럭시북4 프로")];
        let table = table(&[
            &["제품명", "핵심"],
            &["삼성 갤럭시북4 프로", "첫 행"],
            &["삼성 갤럭시북4 프로", "둘째 행"],
        ]);

        enrich_from_summary(&table, &mut products, &Lexicon::default());
        // Second row finds nothing unclaimed and is skipped.
        assert_eq!(products[0].key_point, "첫 행");
    }

    #[test]
    fn missing_columns_leave_fields_untouched() {
        let mut products = vec![product("모델 X")];
        products[0].target = "기존 값".into();
        let table = table(&[&["제품명", "핵심"], &["모델 X", "가성비"]]);

        enrich_from_summary(&table, &mut products, &Lexicon::default());
        assert_eq!(products[0].key_point, "가성비");
        assert_eq!(products[0].target, "기존 값");
        assert!(products[0].summary.is_empty());
    }

    #[test]
    fn header_only_table_is_a_no_op() {
        let mut products = vec![product("모델 X")];
        let table = table(&[&["제품명", "핵심"]]);
        enrich_from_summary(&table, &mut products, &Lexicon::default());
        assert!(products[0].key_point.is_empty());
    }

    #[test]
    fn merge_keeps_first_specs_list() {
        let mut a = product("모델 A");
        a.specs.push(Spec { label: "CPU".into(), value: "i7".into() });
        let mut b = product("모델 A");
        b.specs.push(Spec { label: "CPU".into(), value: "i5".into() });
        b.specs.push(Spec { label: "RAM".into(), value: "16GB".into() });

        let merged = dedupe_products(vec![a, b]);
        assert_eq!(merged[0].specs.len(), 1);
        assert_eq!(merged[0].specs[0].value, "i7");
    }
}
