pub mod content;
pub mod length;
pub mod sheet;

pub use content::{format_content, parse_content, ContentPart};
pub use length::{convert_between_units, twips_from_css, CssLength, Units};
pub use sheet::{CssProperties, CssSheet, CssStyle};
