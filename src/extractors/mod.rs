// src/extractors/mod.rs
pub mod blocks;
pub mod bullet;
pub mod enrich;
pub mod keywords;
pub mod page;

// Re-export the types the rest of the pipeline works with.
pub use blocks::{Block, BlockKind, TextRun};
pub use keywords::Lexicon;
pub use page::{Faq, PageMeta, PageParser, ParseResult, Product, Spec};
