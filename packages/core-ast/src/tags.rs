//! Fixed tag and attribute sets shared by the parser, normalizer and serializer.

pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "command", "embed", "frame", "hr", "image",
    "img", "input", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose first and last text children are trimmed by normalization
pub const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "section", "article",
    "header", "footer", "nav", "main", "aside", "blockquote", "pre",
];

/// Wrappers dropped by normalization when they carry no attributes
pub const INLINE_WRAPPERS: &[&str] = &["span"];

/// Content is never decoded or escaped
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Content is decoded but never holds markup
pub const RCDATA_ELEMENTS: &[&str] = &["textarea", "title"];

/// Pretty printing never adds whitespace inside these
pub const WHITESPACE_SENSITIVE: &[&str] = &["pre", "textarea", "script", "style"];

/// Roots of SVG and MathML content, where `/>` closes any element
pub const FOREIGN_ROOTS: &[&str] = &["svg", "math"];

/// Start tags that close an open `p`
const PARAGRAPH_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "summary", "table", "ul",
];

/// Elements whose end tag may be left out without a diagnostic
const OPTIONAL_END_TAGS: &[&str] = &[
    "p", "li", "dt", "dd", "option", "optgroup", "tr", "td", "th", "thead", "tbody", "tfoot",
    "colgroup", "caption", "rb", "rt", "rp",
];

/// Elements an implicit `p` close does not look past
pub const PARAGRAPH_SCOPE_BOUNDARIES: &[&str] =
    &["button", "table", "td", "th", "caption", "template", "object", "marquee", "applet"];

const TOKEN_LIST_ATTRIBUTES: &[&str] = &["class", "rel", "headers", "ping", "sandbox"];

const NUMERIC_ATTRIBUTES: &[&str] = &[
    "colspan", "rowspan", "tabindex", "maxlength", "minlength", "size", "cols", "rows", "start",
    "span",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

pub fn is_inline_wrapper(tag: &str) -> bool {
    INLINE_WRAPPERS.contains(&tag)
}

pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

pub fn is_rcdata(tag: &str) -> bool {
    RCDATA_ELEMENTS.contains(&tag)
}

pub fn is_whitespace_sensitive(tag: &str) -> bool {
    WHITESPACE_SENSITIVE.contains(&tag)
}

pub fn is_foreign_root(tag: &str) -> bool {
    FOREIGN_ROOTS.contains(&tag)
}

pub fn closes_paragraph(tag: &str) -> bool {
    PARAGRAPH_CLOSERS.contains(&tag)
}

pub fn has_optional_end_tag(tag: &str) -> bool {
    OPTIONAL_END_TAGS.contains(&tag)
}

pub fn is_token_list_attribute(name: &str) -> bool {
    TOKEN_LIST_ATTRIBUTES.contains(&name)
}

pub fn is_numeric_attribute(name: &str) -> bool {
    NUMERIC_ATTRIBUTES.contains(&name)
}

/// Open siblings closed by a start tag, and the ancestors that stop the search
pub fn implied_siblings(tag: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
    match tag {
        "li" => Some((&["li"], &["ul", "ol", "menu", "div", "section", "article"])),
        "dt" | "dd" => Some((&["dt", "dd"], &["dl", "div"])),
        "option" => Some((&["option"], &["select", "datalist", "optgroup"])),
        "optgroup" => Some((&["optgroup", "option"], &["select"])),
        "tr" => Some((&["tr"], &["table", "thead", "tbody", "tfoot"])),
        "td" | "th" => Some((&["td", "th"], &["tr", "table"])),
        "thead" | "tbody" | "tfoot" => Some((&["thead", "tbody", "tfoot"], &["table"])),
        _ => None,
    }
}
