//! Security Policy - Allow-Lists Are Protective
//!
//! Pure predicates over strings. Nothing in here knows about document
//! structure; the validators decide *where* each predicate applies.
//!
//! Every table and regex is built once per process and never mutated, so the
//! predicates are safe to call from any number of threads.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

// --- Rule tables ---

/// SVG elements that only draw, group, reference or describe. Scripting,
/// hyperlinks, animation, foreign content and embedding are absent on purpose.
pub const ALLOWED_ELEMENTS: &[&str] = &[
    "svg", "g", "defs", "symbol", "use", "title", "desc", "style",
    "path", "rect", "circle", "ellipse", "line", "polyline", "polygon", "image",
    "text", "tspan", "textPath",
    "clipPath", "mask", "pattern", "marker",
    "linearGradient", "radialGradient", "stop",
    "filter", "feBlend", "feColorMatrix", "feComponentTransfer", "feComposite",
    "feConvolveMatrix", "feDiffuseLighting", "feDisplacementMap", "feDistantLight",
    "feDropShadow", "feFlood", "feFuncA", "feFuncB", "feFuncG", "feFuncR",
    "feGaussianBlur", "feMerge", "feMergeNode", "feMorphology", "feOffset",
    "fePointLight", "feSpecularLighting", "feSpotLight", "feTile", "feTurbulence",
];

/// Value policy attached to an allowed attribute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePolicy {
    /// Free text that must still be CSS-safe.
    Text,
    /// Color grammar, local `url(#id)` paint server, or a color reference.
    Paint,
    /// Color grammar or a color reference.
    Color,
    /// Must pass [`is_safe_url`].
    Href,
    /// CSS-safe text whose `url()` arguments are all local fragments.
    Reference,
    /// Inline CSS; must pass [`is_safe_css_value`].
    Style,
    Id,
    Class,
}

impl AttributePolicy {
    pub fn accepts_color_reference(self) -> bool {
        matches!(self, AttributePolicy::Paint | AttributePolicy::Color)
    }
}

const ATTRIBUTES: &[(&str, AttributePolicy)] = {
    use AttributePolicy::*;
    &[
        ("id", Id),
        ("class", Class),
        ("style", Style),
        ("href", Href),
        ("fill", Paint),
        ("stroke", Paint),
        ("color", Color),
        ("stop-color", Color),
        ("flood-color", Color),
        ("lighting-color", Color),
        ("filter", Reference),
        ("mask", Reference),
        ("clip-path", Reference),
        ("marker-start", Reference),
        ("marker-mid", Reference),
        ("marker-end", Reference),
        // geometry
        ("d", Text),
        ("x", Text),
        ("y", Text),
        ("x1", Text),
        ("y1", Text),
        ("x2", Text),
        ("y2", Text),
        ("cx", Text),
        ("cy", Text),
        ("r", Text),
        ("rx", Text),
        ("ry", Text),
        ("fx", Text),
        ("fy", Text),
        ("fr", Text),
        ("dx", Text),
        ("dy", Text),
        ("width", Text),
        ("height", Text),
        ("points", Text),
        ("pathLength", Text),
        ("viewBox", Text),
        ("preserveAspectRatio", Text),
        ("transform", Text),
        ("transform-origin", Text),
        ("rotate", Text),
        ("textLength", Text),
        ("lengthAdjust", Text),
        ("offset", Text),
        // paint servers, clipping, markers
        ("gradientUnits", Text),
        ("gradientTransform", Text),
        ("spreadMethod", Text),
        ("patternUnits", Text),
        ("patternContentUnits", Text),
        ("patternTransform", Text),
        ("clipPathUnits", Text),
        ("maskUnits", Text),
        ("maskContentUnits", Text),
        ("markerUnits", Text),
        ("markerWidth", Text),
        ("markerHeight", Text),
        ("refX", Text),
        ("refY", Text),
        ("orient", Text),
        // filter primitives
        ("filterUnits", Text),
        ("primitiveUnits", Text),
        ("in", Text),
        ("in2", Text),
        ("result", Text),
        ("stdDeviation", Text),
        ("mode", Text),
        ("operator", Text),
        ("k1", Text),
        ("k2", Text),
        ("k3", Text),
        ("k4", Text),
        ("type", Text),
        ("values", Text),
        ("tableValues", Text),
        ("slope", Text),
        ("intercept", Text),
        ("amplitude", Text),
        ("exponent", Text),
        ("baseFrequency", Text),
        ("numOctaves", Text),
        ("seed", Text),
        ("stitchTiles", Text),
        ("scale", Text),
        ("xChannelSelector", Text),
        ("yChannelSelector", Text),
        ("radius", Text),
        ("order", Text),
        ("kernelMatrix", Text),
        ("divisor", Text),
        ("bias", Text),
        ("targetX", Text),
        ("targetY", Text),
        ("edgeMode", Text),
        ("preserveAlpha", Text),
        ("surfaceScale", Text),
        ("diffuseConstant", Text),
        ("specularConstant", Text),
        ("specularExponent", Text),
        ("azimuth", Text),
        ("elevation", Text),
        ("z", Text),
        ("pointsAtX", Text),
        ("pointsAtY", Text),
        ("pointsAtZ", Text),
        ("limitingConeAngle", Text),
        // presentation
        ("fill-opacity", Text),
        ("fill-rule", Text),
        ("stroke-width", Text),
        ("stroke-opacity", Text),
        ("stroke-linecap", Text),
        ("stroke-linejoin", Text),
        ("stroke-miterlimit", Text),
        ("stroke-dasharray", Text),
        ("stroke-dashoffset", Text),
        ("opacity", Text),
        ("stop-opacity", Text),
        ("flood-opacity", Text),
        ("clip-rule", Text),
        ("display", Text),
        ("visibility", Text),
        ("overflow", Text),
        ("shape-rendering", Text),
        ("text-rendering", Text),
        ("image-rendering", Text),
        ("color-interpolation", Text),
        ("color-interpolation-filters", Text),
        ("paint-order", Text),
        ("vector-effect", Text),
        ("mix-blend-mode", Text),
        ("isolation", Text),
        ("font-family", Text),
        ("font-size", Text),
        ("font-weight", Text),
        ("font-style", Text),
        ("font-variant", Text),
        ("font-stretch", Text),
        ("letter-spacing", Text),
        ("word-spacing", Text),
        ("text-anchor", Text),
        ("text-decoration", Text),
        ("dominant-baseline", Text),
        ("alignment-baseline", Text),
        ("baseline-shift", Text),
        ("writing-mode", Text),
        ("direction", Text),
        ("unicode-bidi", Text),
        ("white-space", Text),
    ]
};

/// Identifiers that carry meaning in prototype-based object models.
pub const RESERVED_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Variables a `text` element may reference.
pub const VARIABLES: &[&str] = &["initial", "initials", "fontFamily", "fontWeight"];

static ELEMENT_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ALLOWED_ELEMENTS.iter().copied().collect());

static ATTRIBUTE_TABLE: LazyLock<HashMap<&'static str, AttributePolicy>> =
    LazyLock::new(|| ATTRIBUTES.iter().copied().collect());

// --- Cached regexes ---

const CHANNEL: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])";
const ALPHA: &str = r"(?:0(?:\.[0-9]+)?|1(?:\.0+)?|\.[0-9]+)";
const HUE: &str = r"(?:[0-9]{1,3}(?:\.[0-9]+)?)";
const PERCENT: &str = r"(?:[0-9]{1,3}(?:\.[0-9]+)?%)";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-zA-Z0-9_-]*$").unwrap());

static COLOR_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").unwrap());

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][A-Za-z0-9_.-]*$").unwrap());

static CLASS_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][A-Za-z0-9_-]*$").unwrap());

static FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[A-Za-z_][A-Za-z0-9_.-]*$").unwrap());

static DATA_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^data:image/(?:png|jpeg);base64,[a-z0-9+/]+={0,2}$").unwrap()
});

static META_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?i:https?)://[^\s/?#<>"'`\\]+(?:[/?#][^\s<>"'`\\]*)?$"#).unwrap()
});

static URL_FN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)url(\s*)\(([^)]*)(\))?").unwrap());

static LOCAL_PAINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"^(?i:url)\(\s*(?:#[A-Za-z_][A-Za-z0-9_.-]*|'#[A-Za-z_][A-Za-z0-9_.-]*'|"#[A-Za-z_][A-Za-z0-9_.-]*")\s*\)$"##,
    )
    .unwrap()
});

static EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"expression\s*\(").unwrap());

static BEHAVIOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"behavior\s*:").unwrap());

static SCRIPT_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:java|vb)script\s*:").unwrap());

static NAMED_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

static OPTION_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^rgb\(\s*{c}\s*,\s*{c}\s*,\s*{c}\s*\)$|^rgba\(\s*{c}\s*,\s*{c}\s*,\s*{c}\s*,\s*{a}\s*\)$",
        c = CHANNEL,
        a = ALPHA
    ))
    .unwrap()
});

static HSL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^hs[lb]\(\s*{h}\s*,\s*{p}\s*,\s*{p}\s*\)$|^hs[lb]a\(\s*{h}\s*,\s*{p}\s*,\s*{p}\s*,\s*{a}\s*\)$",
        h = HUE,
        p = PERCENT,
        a = ALPHA
    ))
    .unwrap()
});

static FONT_FAMILY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 _-]+$").unwrap());

// --- Names ---

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Component, variant and color-group names and references to them.
pub fn is_safe_name(s: &str) -> bool {
    NAME_RE.is_match(s) && !is_reserved_key(s)
}

/// Like [`is_safe_name`] but also permits periods and interior capitals.
pub fn is_safe_id(s: &str) -> bool {
    ID_RE.is_match(s) && !is_reserved_key(s)
}

/// One or more class tokens separated by single spaces.
pub fn is_safe_class_list(s: &str) -> bool {
    !s.is_empty() && s.split(' ').all(|token| CLASS_TOKEN_RE.is_match(token))
}

/// Name of a color group referenced from a `{type: "color"}` object.
pub fn is_color_reference_name(s: &str) -> bool {
    COLOR_REF_RE.is_match(s) && !is_reserved_key(s)
}

pub fn is_known_variable(name: &str) -> bool {
    VARIABLES.contains(&name)
}

// --- Elements and attributes ---

pub fn is_allowed_element(name: &str) -> bool {
    ELEMENT_SET.contains(name)
}

/// How an attribute key fares against the attribute policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    Allowed(AttributePolicy),
    Reserved,
    EventHandler,
    Namespaced,
    NotAllowed,
}

pub fn classify_attribute(key: &str) -> AttributeKey {
    if is_reserved_key(key) {
        return AttributeKey::Reserved;
    }
    if key.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on")) {
        return AttributeKey::EventHandler;
    }
    let lower = key.to_ascii_lowercase();
    if lower.starts_with("xlink:")
        || lower.starts_with("xmlns")
        || lower.starts_with("xml:")
        || key.contains(':')
    {
        return AttributeKey::Namespaced;
    }
    match ATTRIBUTE_TABLE.get(key) {
        Some(policy) => AttributeKey::Allowed(*policy),
        None => AttributeKey::NotAllowed,
    }
}

pub fn is_allowed_attribute(key: &str) -> bool {
    matches!(classify_attribute(key), AttributeKey::Allowed(_))
}

pub fn attribute_policy(key: &str) -> Option<AttributePolicy> {
    match classify_attribute(key) {
        AttributeKey::Allowed(policy) => Some(policy),
        _ => None,
    }
}

// --- URLs ---

fn is_fragment_reference(s: &str) -> bool {
    FRAGMENT_RE.is_match(s)
}

/// URLs inside the drawing: a local `#id` or a base64 PNG/JPEG data URI.
///
/// Anything else, including absolute, protocol-relative and script URLs, is
/// rejected. Leading whitespace or control characters fail outright so that
/// `"\tjavascript:..."` cannot slip past a scheme check.
pub fn is_safe_url(s: &str) -> bool {
    if s.starts_with(|c: char| c.is_whitespace() || c.is_control()) {
        return false;
    }
    if s.starts_with('#') {
        return is_fragment_reference(s);
    }
    DATA_IMAGE_RE.is_match(s)
}

/// URLs in `meta`: absolute `http`/`https` only.
pub fn is_safe_meta_url(s: &str) -> bool {
    !s.chars().any(char::is_control) && META_URL_RE.is_match(s)
}

// --- CSS ---

/// The first dangerous construct found in a piece of CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssThreat {
    Escape,
    Markup,
    ControlCharacter,
    Import,
    FontFace,
    Expression,
    Binding,
    Behavior,
    ScriptScheme,
    ImageSet,
    SpacedUrl,
    ExternalUrl,
}

impl fmt::Display for CssThreat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CssThreat::Escape => "CSS escape sequences are not allowed",
            CssThreat::Markup => "'<' is not allowed in CSS",
            CssThreat::ControlCharacter => "control characters are not allowed in CSS",
            CssThreat::Import => "@import is not allowed",
            CssThreat::FontFace => "@font-face is not allowed",
            CssThreat::Expression => "expression() is not allowed",
            CssThreat::Binding => "-moz-binding is not allowed",
            CssThreat::Behavior => "behavior: is not allowed",
            CssThreat::ScriptScheme => "script URL schemes are not allowed",
            CssThreat::ImageSet => "image-set() is not allowed",
            CssThreat::SpacedUrl => "whitespace between url and '(' is not allowed",
            CssThreat::ExternalUrl => "url() must reference a local #id",
        };
        f.write_str(text)
    }
}

pub fn find_css_threat(css: &str) -> Option<CssThreat> {
    if css.contains('\\') {
        return Some(CssThreat::Escape);
    }
    if css.contains('<') {
        return Some(CssThreat::Markup);
    }
    if css
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\x0c'))
    {
        return Some(CssThreat::ControlCharacter);
    }

    let lower = css.to_ascii_lowercase();
    if lower.contains("@import") {
        return Some(CssThreat::Import);
    }
    if lower.contains("@font-face") {
        return Some(CssThreat::FontFace);
    }
    if EXPRESSION_RE.is_match(&lower) {
        return Some(CssThreat::Expression);
    }
    if lower.contains("-moz-binding") {
        return Some(CssThreat::Binding);
    }
    if BEHAVIOR_RE.is_match(&lower) {
        return Some(CssThreat::Behavior);
    }
    if SCRIPT_SCHEME_RE.is_match(&lower) {
        return Some(CssThreat::ScriptScheme);
    }
    if lower.contains("image-set(") {
        return Some(CssThreat::ImageSet);
    }

    for caps in URL_FN_RE.captures_iter(css) {
        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            return Some(CssThreat::SpacedUrl);
        }
        if caps.get(3).is_none() {
            return Some(CssThreat::ExternalUrl);
        }
        let arg = caps.get(2).map_or("", |m| m.as_str()).trim();
        let arg = strip_quotes(arg);
        if !is_fragment_reference(arg) {
            return Some(CssThreat::ExternalUrl);
        }
    }
    None
}

pub fn is_safe_css_value(css: &str) -> bool {
    find_css_threat(css).is_none()
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

// --- Colors and fonts ---

/// Named, hex, rgb(a) and hsl(a)/hsb(a) colors.
pub fn is_color_value(s: &str) -> bool {
    NAMED_COLOR_RE.is_match(s)
        || HEX_COLOR_RE.is_match(s)
        || RGB_RE.is_match(s)
        || HSL_RE.is_match(s)
}

pub fn is_paint_value(s: &str) -> bool {
    is_color_value(s) || LOCAL_PAINT_RE.is_match(s)
}

/// Palette entries: `#` followed by 3, 6 or 8 hex digits.
pub fn is_hex_color(s: &str) -> bool {
    HEX_COLOR_RE.is_match(s)
}

/// Option colors, where the leading `#` is optional.
pub fn is_option_color(s: &str) -> bool {
    OPTION_COLOR_RE.is_match(s)
}

pub fn is_safe_font_family(s: &str) -> bool {
    FONT_FAMILY_RE.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_safe_url_accepts_fragments_and_images() {
        assert!(is_safe_url("#myElement"));
        assert!(is_safe_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(is_safe_url("data:image/jpeg;base64,/9j/4AAQ="));
        assert!(is_safe_url("DATA:IMAGE/PNG;BASE64,iVBORw0KGgo="));
    }

    #[test]
    fn test_safe_url_rejects_everything_else() {
        for url in [
            "#",
            "https://example.com/img.png",
            "ftp://example.com/img.png",
            "//example.com/img.png",
            "javascript:alert(1)",
            "JavaScript:alert(1)",
            "vbscript:MsgBox(1)",
            " javascript:alert(1)",
            "\tjavascript:alert(1)",
            "\u{0}#id",
            "file:///etc/passwd",
            "data:image/svg;base64,PHN2Zz4=",
            "data:image/svg+xml;base64,PHN2Zz4=",
            "data:text/html;base64,PHNjcmlwdD4=",
            "data:application/xml;base64,PHN2Zz4=",
            "data:image/png,rawcontent",
            "",
        ] {
            assert!(!is_safe_url(url), "{url:?} should be rejected");
        }
    }

    #[test]
    fn test_meta_url() {
        assert!(is_safe_meta_url("https://opensource.org/license/mit"));
        assert!(is_safe_meta_url("http://example.com"));
        assert!(is_safe_meta_url("HTTPS://example.com/a?b=c#d"));
        assert!(!is_safe_meta_url("javascript:alert(1)"));
        assert!(!is_safe_meta_url("data:text/html,<script>alert(1)</script>"));
        assert!(!is_safe_meta_url("file:///etc/passwd"));
        assert!(!is_safe_meta_url("//evil.com/steal"));
        assert!(!is_safe_meta_url("https://"));
        assert!(!is_safe_meta_url(" https://example.com"));
        assert!(!is_safe_meta_url("https://exa mple.com"));
    }

    #[test]
    fn test_css_safe_declarations() {
        assert!(is_safe_css_value("fill: red; stroke: blue"));
        assert!(is_safe_css_value("opacity: 0.5"));
        assert!(is_safe_css_value("fill: url(#myGradient)"));
        assert!(is_safe_css_value(".cls { fill: url('#gradient'); }"));
        assert!(is_safe_css_value("blur(5px)"));
        assert!(is_safe_css_value("circle(50%)"));
    }

    #[test]
    fn test_css_threats() {
        let cases = [
            ("background: url(https://evil.com/steal)", CssThreat::ExternalUrl),
            ("background: URL(https://evil.com/steal)", CssThreat::ExternalUrl),
            ("background: Url(https://evil.com/steal)", CssThreat::ExternalUrl),
            ("background: url (https://evil.com/x)", CssThreat::SpacedUrl),
            ("@import url(https://evil.com/steal.css)", CssThreat::Import),
            ("@font-face { src: url('https://evil.com/f.woff'); }", CssThreat::FontFace),
            ("width: expression(alert(1))", CssThreat::Expression),
            ("-moz-binding: url(https://evil.com/xbl)", CssThreat::Binding),
            ("behavior: url(https://evil.com/xss.htc)", CssThreat::Behavior),
            ("background: \\75\\72\\6C(https://evil.com)", CssThreat::Escape),
            ("\\75rl(https://evil.com/c.svg#c)", CssThreat::Escape),
            ("url(data:image/svg+xml,...)", CssThreat::ExternalUrl),
            ("url(javascript:alert(1))", CssThreat::ScriptScheme),
            ("fill: url(#a", CssThreat::ExternalUrl),
            ("</style><script>", CssThreat::Markup),
            ("background: image-set('x.png' 1x)", CssThreat::ImageSet),
        ];
        for (css, threat) in cases {
            assert_eq!(find_css_threat(css), Some(threat), "{css:?}");
        }
    }

    #[test]
    fn test_attribute_classification() {
        assert_eq!(classify_attribute("fill"), AttributeKey::Allowed(AttributePolicy::Paint));
        assert_eq!(classify_attribute("onclick"), AttributeKey::EventHandler);
        assert_eq!(classify_attribute("ONLOAD"), AttributeKey::EventHandler);
        assert_eq!(classify_attribute("xlink:href"), AttributeKey::Namespaced);
        assert_eq!(classify_attribute("XLINK:href"), AttributeKey::Namespaced);
        assert_eq!(classify_attribute("xmlns"), AttributeKey::Namespaced);
        assert_eq!(classify_attribute("xml:base"), AttributeKey::Namespaced);
        assert_eq!(classify_attribute("__proto__"), AttributeKey::Reserved);
        assert_eq!(classify_attribute("constructor"), AttributeKey::Reserved);
        assert_eq!(classify_attribute("unknownProp"), AttributeKey::NotAllowed);
        assert!(is_allowed_attribute("marker-end"));
        assert!(!is_allowed_attribute("src"));
    }

    #[test]
    fn test_elements() {
        assert!(is_allowed_element("rect"));
        assert!(is_allowed_element("linearGradient"));
        for name in [
            "script", "foreignObject", "a", "animate", "animateTransform",
            "animateMotion", "set", "iframe", "object", "embed", "div",
        ] {
            assert!(!is_allowed_element(name), "{name} should be rejected");
        }
    }

    #[test]
    fn test_colors() {
        for ok in [
            "red", "DarkSlateGray", "#fff", "#FF00FF", "#FF00FF80", "fff",
            "rgb(255, 0, 128)", "rgba(255, 0, 128, 0.5)", "hsl(120, 50%, 50%)",
            "hsla(120, 50%, 50%, 0.5)", "hsb(120, 50%, 50%)", "hsba(120, 50%, 50%, 0.5)",
        ] {
            assert!(is_color_value(ok), "{ok:?}");
        }
        for bad in [
            "", "#ffff", "#ggg", "rgba(255, 0, 128, 2)", "rgb(256, 0, 0)",
            "hsl(120, 50, 50)", "url(#myGradient)",
        ] {
            assert!(!is_color_value(bad), "{bad:?}");
        }
        assert!(is_paint_value("url(#myGradient)"));
        assert!(is_paint_value("url('#g')"));
        assert!(is_paint_value(r##"url( "#g" )"##));
        assert!(!is_paint_value(r##"url('#g")"##));
        assert!(!is_paint_value("url(https://evil.com/p)"));
        assert!(is_option_color("ff0000"));
        assert!(!is_hex_color("ff0000"));
        assert!(!is_option_color("red"));
    }

    #[test]
    fn test_names() {
        assert!(is_safe_name("head"));
        assert!(is_safe_name("facialHair"));
        assert!(is_safe_name("_private-part_2"));
        assert!(!is_safe_name("Head"));
        assert!(!is_safe_name("1head"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name("Invalid Name"));
        assert!(!is_safe_name("constructor"));
        assert!(is_safe_id("_my-element.v2"));
        assert!(!is_safe_id("my element"));
        assert!(!is_safe_id("a\"onload=\"alert(1)"));
        assert!(is_safe_class_list("class1 class2"));
        assert!(!is_safe_class_list("a{color:red}"));
        assert!(!is_safe_class_list("a  b"));
        assert!(is_color_reference_name("skinColor"));
        assert!(!is_color_reference_name("skin-color"));
    }

    proptest! {
        #[test]
        fn prop_names_never_contain_markup(s in "\\PC*") {
            if is_safe_name(&s) || is_safe_id(&s) || is_safe_class_list(&s) {
                prop_assert!(!s.contains(['<', '>', '"', '\'']));
            }
        }

        #[test]
        fn prop_leading_whitespace_never_safe(ws in "[ \t\n\r]{1,3}", rest in "\\PC*") {
            let candidate = format!("{ws}{rest}");
            prop_assert!(!is_safe_url(&candidate));
            prop_assert!(!is_safe_meta_url(&candidate));
        }
    }
}
