/// Element names from the HTML schema, lowercase and sorted.
const HTML_TAG_NAMES: &[&str] = &[
    "a", "abbr", "acronym", "address", "applet", "area", "article", "aside", "audio", "b", "base",
    "basefont", "bdi", "bdo", "bgsound", "big", "blink", "blockquote", "body", "br", "button",
    "canvas", "caption", "center", "cite", "code", "col", "colgroup", "command", "content", "data",
    "datalist", "dd", "del", "details", "dfn", "dialog", "dir", "div", "dl", "dt", "element", "em",
    "embed", "fieldset", "figcaption", "figure", "font", "footer", "form", "frame", "frameset",
    "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe",
    "image", "img", "input", "ins", "isindex", "kbd", "keygen", "label", "legend", "li", "link",
    "listing", "main", "map", "mark", "marquee", "menu", "menuitem", "meta", "meter", "multicol",
    "nav", "nextid", "nobr", "noembed", "noframes", "noscript", "object", "ol", "optgroup",
    "option", "output", "p", "param", "picture", "plaintext", "pre", "progress", "q", "rb", "rp",
    "rt", "rtc", "ruby", "s", "samp", "script", "search", "section", "select", "shadow", "slot",
    "small", "source", "spacer", "span", "strike", "strong", "style", "sub", "summary", "sup",
    "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr",
    "track", "tt", "u", "ul", "var", "video", "wbr", "xmp",
];

/// Answers whether a name belongs to the HTML schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFacts;

impl HtmlFacts {
    /// Case-insensitive schema lookup.
    #[must_use]
    pub fn is_html_tag_name(self, name: &str) -> bool {
        if name.is_empty() || !name.is_ascii() {
            return false;
        }
        HTML_TAG_NAMES
            .binary_search(&name.to_ascii_lowercase().as_str())
            .is_ok()
    }

    /// Schema lookup that also requires the schema's lowercase spelling.
    ///
    /// `DIV` is an HTML tag name but not an exact one, so it still gets its
    /// own completion entry next to `div`.
    #[must_use]
    pub fn is_exact_html_tag_name(self, name: &str) -> bool {
        HTML_TAG_NAMES.binary_search(&name).is_ok()
    }

    pub fn tag_names(self) -> impl Iterator<Item = &'static str> {
        HTML_TAG_NAMES.iter().copied()
    }
}
