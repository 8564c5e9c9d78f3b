// src/extractors/bullet.rs
//
// Destination picker for list items that arrive without an explicit
// sub-section header. Keyword-driven, not semantic: mis-scored bullets are an
// accepted cost of the heuristic.

use crate::extractors::keywords::Lexicon;
use crate::extractors::page::{Product, Spec};

// A colon this early in the line marks a `key: value` spec even when the key
// is not in the spec-keyword table.
const SPEC_COLON_MAX_CHARS: usize = 15;

/// Routes one ungrouped bullet into the product: spec entry, pro, con, or
/// description. Ambiguous sentiment (both or neither lexicon hit) always
/// falls back to the description so uncertain text is never asserted as a
/// pro or con.
pub fn classify_bullet(lexicon: &Lexicon, text: &str, product: &mut Product) {
    if let Some(spec) = split_spec(lexicon, text) {
        product.specs.push(spec);
        return;
    }

    let lower = text.to_lowercase();
    let positive = lexicon.positive.iter().any(|k| lower.contains(&k.to_lowercase()));
    let negative = lexicon.negative.iter().any(|k| lower.contains(&k.to_lowercase()));

    match (positive, negative) {
        (false, true) => product.cons.push(text.to_string()),
        (true, false) => product.pros.push(text.to_string()),
        _ => {
            product.description.push_str(text);
            product.description.push('\n');
        }
    }
}

/// Splits a `key: value` shaped line into a spec entry when the key carries a
/// known spec keyword or the colon falls within the first 15 characters.
pub fn split_spec(lexicon: &Lexicon, text: &str) -> Option<Spec> {
    let (key, value) = text.split_once(':')?;
    let label = key.trim();
    let value = value.trim();
    if label.is_empty() || value.is_empty() {
        return None;
    }

    let key_lower = label.to_lowercase();
    let keyword_hit = lexicon.spec_keys.iter().any(|k| key_lower.contains(k));
    let colon_pos = key.chars().count();
    if keyword_hit || colon_pos < SPEC_COLON_MAX_CHARS {
        Some(Spec { label: label.to_string(), value: value.to_string() })
    } else {
        None
    }
}
