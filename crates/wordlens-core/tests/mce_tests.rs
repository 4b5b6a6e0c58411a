//! Markup-compatibility behaviour at the whole-document level.

use pretty_assertions::assert_eq;
use wordlens_core::xml::parser::parse;
use wordlens_core::xml::tags::NAMESPACE_NULL;
use wordlens_core::xml::writer::serialize;

#[test]
fn ignorable_content_parses_as_if_absent() {
    let with_extension = r#"<w:document
            xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"
            xmlns:x="urn:future-extension"
            mc:Ignorable="x">
        <w:body><w:p x:marker="1"><w:r><w:t>text</w:t></w:r><x:annotation><x:data/></x:annotation></w:p></w:body>
    </w:document>"#;
    let without_extension = r#"<w:document
            xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
        <w:body><w:p><w:r><w:t>text</w:t></w:r></w:p></w:body>
    </w:document>"#;

    let mut a = parse(with_extension).unwrap();
    let mut b = parse(without_extension).unwrap();
    a.strip_whitespace(a.root().unwrap());
    b.strip_whitespace(b.root().unwrap());

    assert_eq!(
        serialize(&a, NAMESPACE_NULL, false).unwrap(),
        serialize(&b, NAMESPACE_NULL, false).unwrap()
    );
}

#[test]
fn must_understand_is_a_no_op() {
    let xml = r#"<root
            xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"
            xmlns:x="urn:z" mc:MustUnderstand="x">
        <x:kept/>
    </root>"#;
    let doc = parse(xml).unwrap();
    let root = doc.root().unwrap();
    let elements: Vec<_> = doc
        .children(root)
        .filter(|&c| doc.node(c).is_element())
        .collect();
    assert_eq!(elements.len(), 1);
}
