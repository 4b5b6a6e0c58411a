//! Bidirectional conversion between word-processing documents and HTML.
//!
//! The abstract HTML side is an editing surface; the concrete package stays
//! authoritative. `get` derives HTML from a package, `put` reconciles edits
//! back into the original package without disturbing content the HTML never
//! surfaced, and `create` builds a fresh package from HTML.

#![recursion_limit = "512"]

pub mod bdt;
pub mod css;
pub mod error;
pub mod ops;
pub mod package;
pub mod word;
pub mod xml;

pub use error::{Result, WordlensError};
pub use ops::{create, create_file, get, get_file, put, put_file};
pub use word::WordPackage;
