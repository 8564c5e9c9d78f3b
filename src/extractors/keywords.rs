// src/extractors/keywords.rs
//
// Keyword tables driving the heuristic classifier. These are configuration
// data, not logic: the parser only ever does ordered substring checks against
// them, so a different template family or language can swap in its own
// `Lexicon` without touching the state machine. The defaults are tuned to
// Korean tech-product review posts.

use crate::extractors::page::{Section, SubSection};

/// All keyword tables consulted by the classifier, router and enricher.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Ordered heading2 boundary patterns, most specific first. First match
    /// wins; there is deliberately no generic fallback (earlier revisions had
    /// one and it produced false section boundaries).
    pub section_headings: Vec<(&'static str, Section)>,

    /// Sub-section label keywords, per label kind.
    pub spec_labels: Vec<&'static str>,
    pub pros_labels: Vec<&'static str>,
    pub cons_labels: Vec<&'static str>,
    pub recommend_labels: Vec<&'static str>,

    /// Key-side keywords marking a `key: value` line as a spec entry.
    pub spec_keys: Vec<&'static str>,

    /// Sentiment lexicons for ungrouped bullets.
    pub positive: Vec<&'static str>,
    pub negative: Vec<&'static str>,

    /// Marketplace domains whose links become a product's buy URL.
    pub buy_domains: Vec<&'static str>,
    /// Purchase-intent phrases triggering in-text URL extraction.
    pub buy_phrases: Vec<&'static str>,
    /// Disclosure boilerplate lines dropped outright.
    pub disclosure: Vec<&'static str>,
    /// Phrase marking a free-text line as a "recommend for" entry.
    pub recommend_phrases: Vec<&'static str>,

    /// Table header keywords: product-identifying first column, and the
    /// evaluative columns the enricher maps onto product fields.
    pub table_name_keys: Vec<&'static str>,
    pub col_key_point: Vec<&'static str>,
    pub col_summary: Vec<&'static str>,
    pub col_target: Vec<&'static str>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::korean()
    }
}

impl Lexicon {
    /// The lexicon the production template family was tuned against.
    pub fn korean() -> Self {
        Self {
            section_headings: vec![
                ("자주 묻는", Section::Faq),
                ("FAQ", Section::Faq),
                ("마치며", Section::Closing),
                ("마무리", Section::Closing),
                ("핵심만 콕", Section::Summary),
                ("비교표", Section::Comparison),
                ("어떤 제품", Section::Guide),
                ("선택 가이드", Section::Guide),
                ("선택", Section::Guide),
                ("상세 리뷰", Section::Products),
                ("TOP5", Section::Products),
                ("Top5", Section::Products),
                ("왜 필요", Section::Topic),
            ],
            spec_labels: vec!["주요 스펙", "스펙", "사양"],
            pros_labels: vec!["장점"],
            cons_labels: vec!["단점"],
            recommend_labels: vec!["추천", "이런 분께"],
            spec_keys: vec![
                "cpu", "gpu", "ram", "ssd", "메모리", "저장", "디스플레이", "화면",
                "무게", "배터리", "크기", "용량", "소재", "색상", "해상도",
            ],
            positive: vec![
                "좋", "뛰어나", "우수", "가성비", "빠르", "빠른", "만족", "편리",
                "편하", "튼튼", "조용", "가벼", "넉넉", "강력", "쾌적",
            ],
            negative: vec![
                "아쉽", "아쉬운", "무겁", "무거", "느리", "느린", "발열", "소음",
                "비싸", "비싼", "부족", "불편", "떨어지", "단점",
            ],
            buy_domains: vec!["coupang.com"],
            buy_phrases: vec!["최저가 보러가기", "구매하러 가기", "최저가 확인"],
            disclosure: vec!["쿠팡파트너스", "쿠팡 파트너스"],
            recommend_phrases: vec!["이런 분께 추천"],
            table_name_keys: vec!["제품명", "제품", "모델"],
            col_key_point: vec!["핵심", "장점"],
            col_summary: vec!["한 줄", "한줄", "평"],
            col_target: vec!["추천", "대상"],
        }
    }

    /// Section boundary lookup for a heading2 text. First match in table
    /// order wins.
    pub fn section_for_heading(&self, text: &str) -> Option<Section> {
        self.section_headings
            .iter()
            .find(|(pat, _)| text.contains(pat))
            .map(|(_, section)| *section)
    }

    /// Sub-section label lookup by keyword containment.
    pub fn sub_section_for(&self, text: &str) -> Option<SubSection> {
        if self.spec_labels.iter().any(|k| text.contains(k)) {
            Some(SubSection::Specs)
        } else if self.pros_labels.iter().any(|k| text.contains(k)) {
            Some(SubSection::Pros)
        } else if self.cons_labels.iter().any(|k| text.contains(k)) {
            Some(SubSection::Cons)
        } else if self.recommend_labels.iter().any(|k| text.contains(k)) {
            Some(SubSection::Recommend)
        } else {
            None
        }
    }

    pub fn is_disclosure(&self, text: &str) -> bool {
        self.disclosure.iter().any(|k| text.contains(k))
    }

    pub fn is_buy_url(&self, url: &str) -> bool {
        self.buy_domains.iter().any(|d| url.contains(d))
    }

    pub fn has_buy_phrase(&self, text: &str) -> bool {
        self.buy_phrases.iter().any(|k| text.contains(k))
    }

    pub fn has_recommend_phrase(&self, text: &str) -> bool {
        self.recommend_phrases.iter().any(|k| text.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_patterns_are_first_match_wins() {
        let lex = Lexicon::default();
        // "자주 묻는 질문 (FAQ)" matches both FAQ patterns; the more specific
        // one comes first in the table but both map to Faq.
        assert_eq!(lex.section_for_heading("자주 묻는 질문 (FAQ)"), Some(Section::Faq));
        // "제품 선택 가이드" must hit Guide before any looser pattern.
        assert_eq!(lex.section_for_heading("제품 선택 가이드"), Some(Section::Guide));
        assert_eq!(lex.section_for_heading("2025년 노트북 순위"), None);
    }

    #[test]
    fn sub_section_labels() {
        let lex = Lexicon::default();
        assert_eq!(lex.sub_section_for("주요 스펙"), Some(SubSection::Specs));
        assert_eq!(lex.sub_section_for("장점"), Some(SubSection::Pros));
        assert_eq!(lex.sub_section_for("단점"), Some(SubSection::Cons));
        assert_eq!(lex.sub_section_for("이런 분께"), Some(SubSection::Recommend));
        assert_eq!(lex.sub_section_for("총평"), None);
    }
}
