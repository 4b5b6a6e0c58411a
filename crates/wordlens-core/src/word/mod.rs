pub mod converter;
pub mod fields;
pub mod formatting;
pub mod lenses;
pub mod numbering;
pub mod objects;
pub mod package;
pub mod sheet;
pub mod styles;

pub use numbering::{update_numbering, WordNumbering};
pub use package::WordPackage;
pub use sheet::{StyleFamily, WordSheet};
