//! Offset-tracking text processing.
//!
//! - `markup`: parse plain or HTML content into an offset-addressable tree
//! - `tokenize`: word tokens and n-gram fragments
//! - `fragment`: minimal well-formed fragments for an offset range

mod escape;
pub mod fragment;
pub mod markup;
pub mod tokenize;

pub use fragment::{extract_fragment, extract_nodes};
pub use markup::{document_length, inner_text, MarkupNode, ParsedContent, TextLeaf};
pub use tokenize::{ngrams, tokenize, word_tokens, TextFragment, Token};
