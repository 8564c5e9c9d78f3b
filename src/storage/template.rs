// src/storage/template.rs
//
// Page serializer: turns a ParseResult into an Astro page. Rendering is
// template substitution only; all structuring decisions were made by the
// classifier.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::extractors::{ParseResult, Product};

static SLUG_STRIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9가-힣\s-]").expect("Failed to compile SLUG_STRIP_RE")
});
static SLUG_SPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile SLUG_SPACE_RE")
});
static SLUG_DASH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-+").expect("Failed to compile SLUG_DASH_RE")
});

// Derived comparison columns when the document carries no comparison table.
const FALLBACK_COMPARISON_SPECS: &[(&str, &str, &[&str])] = &[
    ("cpu", "CPU", &["cpu"]),
    ("gpu", "GPU", &["gpu"]),
    ("ram", "RAM", &["ram", "메모리"]),
    ("storage", "저장장치", &["저장", "ssd"]),
    ("display", "디스플레이", &["디스플레이", "화면"]),
    ("weight", "무게", &["무게"]),
];

const PRODUCT_NAME_MAX_CHARS: usize = 15;

/// File-name slug for a page title: lowercase, Korean and alphanumerics
/// kept, whitespace collapsed to single dashes.
pub fn page_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lower, "");
    let dashed = SLUG_SPACE_RE.replace_all(stripped.trim(), "-");
    SLUG_DASH_RE.replace_all(&dashed, "-").trim_matches('-').to_string()
}

/// Renders the structured review as an Astro page document.
pub fn render_astro_page(data: &ParseResult) -> String {
    let products_json = serde_json::to_string_pretty(&data.products)
        .unwrap_or_else(|_| "[]".to_string());
    let faqs_json = serde_json::to_string_pretty(&data.faqs).unwrap_or_else(|_| "[]".to_string());
    let (comparison_data, comparison_specs) = comparison_json(data);

    let intro = non_empty_or(
        data.intro.trim(),
        &format!("오늘은 {}에 대해 말씀드릴게요.", data.title),
    );
    let closing = non_empty_or(data.closing.trim(), "위 내용이 여러분께 도움이 되길 바랍니다.");
    let topic_title = non_empty_or(data.topic_title.trim(), "소개");
    let description = meta_description(&intro);

    let topic_paragraphs: String = data
        .topic_explanation
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| format!("        <p>{}</p>\n", l.trim()))
        .collect();
    let guide_paragraphs: String = data
        .selection_guide
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| format!("        <p>{}</p>\n", l.trim()))
        .collect();
    let guide_section = if guide_paragraphs.is_empty() {
        String::new()
    } else {
        format!(
            "      <section class=\"section\">\n        <h2>어떤 제품을 골라야 할까?</h2>\n{}      </section>\n\n",
            guide_paragraphs
        )
    };

    format!(
        r#"---
import BaseLayout from '../layouts/BaseLayout.astro';
import Header from '../components/Header.astro';

const products = {products_json};
const faqs = {faqs_json};
const comparisonData = {comparison_data};
const comparisonSpecs = {comparison_specs};
---

<BaseLayout
  title="{title}"
  description="{description}"
>
  <Header />

  <main>
    <article>
      <header class="article-header">
        <h1>{title}</h1>
        <p class="intro-text">{intro}</p>
      </header>

      <section class="section summary-section">
        <h2>핵심만 콕!</h2>
        <div class="table-wrapper">
          <table class="summary-table">
            <thead>
              <tr>
                <th>제품명</th>
                <th>핵심 장점</th>
                <th>한 줄 평</th>
                <th>추천 대상</th>
              </tr>
            </thead>
            <tbody>
              {{products.map(p => (
                <tr>
                  <td class="product-name-cell">{{p.name}}</td>
                  <td>{{p.keyPoint}}</td>
                  <td>{{p.summary}}</td>
                  <td>{{p.target}}</td>
                </tr>
              ))}}
            </tbody>
          </table>
        </div>
      </section>

      <section class="section topic-intro">
        <h2>{topic_title}</h2>
{topic_paragraphs}        <div class="affiliate-notice">
          이 포스팅은 쿠팡파트너스 일환으로 수수료를 지급받습니다.
        </div>
      </section>

      <section class="section">
        <h2>상세 리뷰</h2>
        {{products.map((product, index) => (
          <div class="product-review" id={{`product-${{product.id}}`}}>
            <h3 class="product-title">
              <span class="rank-num">{{index + 1}}.</span>
              {{product.name}}
            </h3>
            <p class="product-desc">{{product.description}}</p>
            <div class="product-cta">
              <a href={{product.buyUrl}} class="buy-link" target="_blank" rel="sponsored nofollow">
                최저가 보러가기 <span class="arrow">→</span>
              </a>
            </div>
            <div class="product-details">
              <div class="spec-block">
                <h4>주요 스펙</h4>
                <ul class="spec-list">
                  {{product.specs.map(spec => (
                    <li><strong>{{spec.label}}:</strong> {{spec.value}}</li>
                  ))}}
                </ul>
              </div>
              <div class="pros-block">
                <h4>장점</h4>
                <ul>{{product.pros.map(pro => <li>{{pro}}</li>)}}</ul>
              </div>
              <div class="cons-block">
                <h4>단점</h4>
                <ul>{{product.cons.map(con => <li>{{con}}</li>)}}</ul>
              </div>
              {{product.recommendFor.length > 0 && (
                <div class="recommend-block">
                  <h4>이런 분께 추천합니다</h4>
                  <ul>{{product.recommendFor.map(r => <li>{{r}}</li>)}}</ul>
                </div>
              )}}
            </div>
          </div>
        ))}}
      </section>

{guide_section}      <section class="section">
        <h2>제품 비교표</h2>
        <div class="table-wrapper">
          <table class="comparison-table">
            <thead>
              <tr>
                <th>항목</th>
                {{comparisonData.map(p => <th>{{p.name}}</th>)}}
              </tr>
            </thead>
            <tbody>
              {{comparisonSpecs.map(spec => (
                <tr>
                  <th>{{spec.label}}</th>
                  {{comparisonData.map(p => <td>{{p[spec.key] || '-'}}</td>)}}
                </tr>
              ))}}
            </tbody>
          </table>
        </div>
      </section>

      <section class="section closing">
        <h2>마무리</h2>
        <p>{closing}</p>
      </section>

      {{faqs.length > 0 && (
        <section class="section faq-section">
          <h2>자주 묻는 질문 (FAQ)</h2>
          <div class="faq-list">
            {{faqs.map(faq => (
              <details class="faq-item">
                <summary>{{faq.q}}</summary>
                <p>{{faq.a}}</p>
              </details>
            ))}}
          </div>
        </section>
      )}}
    </article>
  </main>
</BaseLayout>
"#,
        products_json = products_json,
        faqs_json = faqs_json,
        comparison_data = comparison_data,
        comparison_specs = comparison_specs,
        title = escape_attr(&data.title),
        description = description,
        intro = intro,
        topic_title = topic_title,
        topic_paragraphs = topic_paragraphs,
        guide_section = guide_section,
        closing = closing,
    )
}

/// Comparison view: the detected comparison table when present, otherwise a
/// fixed spec grid derived from each product's spec entries.
fn comparison_json(data: &ParseResult) -> (String, String) {
    if data.comparison_table.len() > 1 {
        let headers = &data.comparison_table[0];
        let mut rows = Vec::new();
        for row in &data.comparison_table[1..] {
            let mut item = serde_json::Map::new();
            item.insert("name".into(), json!(row.first().cloned().unwrap_or_default()));
            for (j, header) in headers.iter().enumerate().skip(1) {
                let key = header.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_");
                item.insert(key, json!(row.get(j).cloned().unwrap_or_else(|| "-".to_string())));
            }
            rows.push(serde_json::Value::Object(item));
        }
        let specs: Vec<_> = headers
            .iter()
            .skip(1)
            .map(|h| {
                let key = h.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_");
                json!({ "key": key, "label": h })
            })
            .collect();
        (
            serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".into()),
            serde_json::to_string_pretty(&specs).unwrap_or_else(|_| "[]".into()),
        )
    } else {
        let rows: Vec<_> = data.products.iter().map(spec_grid_row).collect();
        let specs: Vec<_> = FALLBACK_COMPARISON_SPECS
            .iter()
            .map(|(key, label, _)| json!({ "key": key, "label": label }))
            .collect();
        (
            serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".into()),
            serde_json::to_string_pretty(&specs).unwrap_or_else(|_| "[]".into()),
        )
    }
}

fn spec_grid_row(product: &Product) -> serde_json::Value {
    let mut item = serde_json::Map::new();
    item.insert("name".into(), json!(truncate_name(&product.name)));
    for (key, _, needles) in FALLBACK_COMPARISON_SPECS {
        let value = product
            .specs
            .iter()
            .find(|s| {
                let label = s.label.to_lowercase();
                needles.iter().any(|n| label.contains(n))
            })
            .map(|s| s.value.clone())
            .unwrap_or_else(|| "-".to_string());
        item.insert((*key).into(), json!(value));
    }
    serde_json::Value::Object(item)
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > PRODUCT_NAME_MAX_CHARS {
        let short: String = name.chars().take(PRODUCT_NAME_MAX_CHARS).collect();
        format!("{}...", short)
    } else {
        name.to_string()
    }
}

fn meta_description(intro: &str) -> String {
    let one_line = intro.replace('\n', " ");
    let short: String = one_line.chars().take(150).collect();
    escape_attr(&short)
}

fn escape_attr(text: &str) -> String {
    text.replace('"', "\\\"")
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() { fallback.to_string() } else { value.to_string() }
}
