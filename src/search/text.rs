//! Plain-text views of comment HTML.

/// Strip comment HTML down to text, leaving entities encoded.
///
/// Paragraph and line-break tags become newlines. Offsets into the
/// result line up with what the query evaluator sees between tags.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let end = rest[lt..].find('>').map_or(rest.len(), |idx| lt + idx + 1);
        let tag = rest[lt..end].to_ascii_lowercase();
        if tag.starts_with("<p") || tag.starts_with("<br") {
            out.push('\n');
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Decode the entities the comment API emits.
pub fn decode_entities(text: &str) -> String {
    // `&amp;` goes last so `&amp;lt;` decodes to `&lt;`, not `<`.
    const ENTITIES: [(&str, &str); 7] = [
        ("&#x27;", "'"),
        ("&#39;", "'"),
        ("&#x2F;", "/"),
        ("&quot;", "\""),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&amp;", "&"),
    ];

    let mut out = text.to_string();
    for (entity, replacement) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, replacement);
        }
    }
    out
}

/// Tags stripped and entities decoded.
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_tags(html))
}
