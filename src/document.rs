//! Definition Validator - Depth-First, Total, Non-Mutating
//!
//! Walks a candidate definition and reports every structural and security
//! violation it finds. The walk never stops early except where a resource
//! bound says it must.

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::ValidatorConfig;
use crate::model::Dialect;
use crate::policy::{
    self, AttributeKey, AttributePolicy, CssThreat, classify_attribute, find_css_threat,
    is_allowed_element, is_color_reference_name, is_color_value, is_hex_color, is_known_variable,
    is_paint_value, is_reserved_key, is_safe_class_list, is_safe_id, is_safe_meta_url,
    is_safe_name, is_safe_url,
};
use crate::shape::{
    NumberRule, check_number, check_number_or_list, closed, closed_with, expect_object,
    expect_string, required, type_name,
};
use crate::violation::{Collector, Subject, Violation, ViolationCode};
use crate::Validate;

const ROOT_FIELDS: &[&str] = &["meta", "attributes", "body", "canvas", "components", "colors"];
const META_FIELDS: &[&str] = &["license", "creator", "source"];
const META_ENTRY_FIELDS: &[&str] = &["name", "url", "text"];
const SVG_ELEMENT_FIELDS: &[&str] = &["type", "name", "attributes", "children", "value"];
const TEXT_FIELDS: &[&str] = &["type", "value", "children"];
const COMPONENT_ELEMENT_FIELDS: &[&str] = &["type", "value"];
const COLOR_GROUP_FIELDS: &[&str] = &["values", "notEqualTo", "contrastTo"];
const COMPONENT_FIELDS: &[&str] = &[
    "width", "height", "probability", "variants", "rotation", "offset", "rotate", "translate",
];
const VARIANT_FIELDS: &[&str] = &["content", "elements"];
const OFFSET_FIELDS: &[&str] = &["x", "y"];
const REFERENCE_FIELDS: &[&str] = &["type", "value"];

/// Validates avatar definition documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentValidator {
    config: ValidatorConfig,
}

impl DocumentValidator {
    /// Limits are used as given; [`crate::Gate::new`] is where they are checked.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(&self, document: &Value) -> Vec<Violation> {
        let mut walk = Walk::new(&self.config);
        walk.document(document);
        walk.out.into_violations()
    }
}

impl Validate for DocumentValidator {
    fn subject(&self) -> Subject {
        Subject::Definition
    }

    fn collect(&self, input: &Value) -> Vec<Violation> {
        self.validate(input)
    }
}

/// State of one traversal. Lives only for a single `validate` call.
struct Walk<'c> {
    config: &'c ValidatorConfig,
    out: Collector,
    dialect: Option<Dialect>,
    elements_seen: usize,
    element_limit_reported: bool,
}

impl<'c> Walk<'c> {
    fn new(config: &'c ValidatorConfig) -> Self {
        Self {
            config,
            out: Collector::new(),
            dialect: None,
            elements_seen: 0,
            element_limit_reported: false,
        }
    }

    fn at<R>(&mut self, segment: impl ToString, f: impl FnOnce(&mut Self) -> R) -> R {
        self.out.enter(segment);
        let result = f(self);
        self.out.leave();
        result
    }

    fn string<'v>(&mut self, value: &'v Value, what: &str) -> Option<&'v str> {
        expect_string(&mut self.out, value, what, self.config.max_string_length)
    }

    fn optional_string<'v>(&mut self, map: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
        let value = map.get(key)?;
        self.at(key, |w| w.string(value, key))
    }

    /// Records which dialect a field belongs to; the first evidence wins when
    /// the surface did not settle it.
    fn expect_dialect(&mut self, used: Dialect, key: &str) {
        match self.dialect {
            Some(current) if current != used => self.out.report_at(
                key,
                ViolationCode::DialectMismatch,
                format!(
                    "'{key}' belongs to the {} dialect but this document uses {}",
                    used.surface_key(),
                    current.surface_key()
                ),
            ),
            Some(_) => {}
            None => self.dialect = Some(used),
        }
    }

    /// Keys of user-named maps: components, variants, color groups.
    fn map_key(&mut self, key: &str, what: &str) {
        if is_reserved_key(key) {
            self.out.report(
                ViolationCode::ReservedKey,
                format!("reserved key '{key}' cannot name a {what}"),
            );
        } else if !is_safe_name(key) {
            self.out.report(
                ViolationCode::PatternMismatch,
                format!(
                    "{what} name '{key}' must start with a lowercase letter or underscore \
                     followed by letters, digits, '_' or '-'"
                ),
            );
        }
    }

    fn name_reference(&mut self, value: &Value, what: &str) {
        let Some(name) = self.string(value, what) else { return };
        if is_reserved_key(name) {
            self.out.report(
                ViolationCode::ReservedKey,
                format!("reserved key '{name}' cannot be referenced"),
            );
        } else if !is_safe_name(name) {
            self.out.report(
                ViolationCode::PatternMismatch,
                format!("{what} '{name}' is not a valid name"),
            );
        }
    }

    // --- Root ---

    fn document(&mut self, value: &Value) {
        let Some(root) = expect_object(&mut self.out, value, "document") else { return };
        closed(&mut self.out, root, ROOT_FIELDS, "document");

        match (root.get("body"), root.get("canvas")) {
            (Some(_), Some(_)) => self.out.report(
                ViolationCode::DialectMismatch,
                "document declares both 'body' and 'canvas'; use exactly one drawing surface",
            ),
            (Some(_), None) => self.dialect = Some(Dialect::Body),
            (None, Some(_)) => self.dialect = Some(Dialect::Canvas),
            (None, None) => self.out.report_at(
                "body",
                ViolationCode::MissingField,
                "document requires a drawing surface ('body' or 'canvas')",
            ),
        }

        if let Some(meta) = root.get("meta") {
            self.at("meta", |w| w.meta(meta));
        }
        if let Some(attributes) = root.get("attributes") {
            self.at("attributes", |w| w.attributes(attributes));
        }
        for dialect in [Dialect::Body, Dialect::Canvas] {
            let key = dialect.surface_key();
            if let Some(surface) = root.get(key) {
                self.at(key, |w| w.surface(surface, dialect));
            }
        }
        if let Some(components) = root.get("components") {
            self.at("components", |w| w.components(components));
        }
        if let Some(colors) = root.get("colors") {
            self.at("colors", |w| w.colors(colors));
        }
    }

    fn surface(&mut self, value: &Value, dialect: Dialect) {
        let Some(map) = expect_object(&mut self.out, value, dialect.surface_key()) else { return };
        let list_key = dialect.elements_key();
        let foreign = dialect.other().elements_key();
        closed_with(&mut self.out, map, &[list_key, "width", "height"], dialect.surface_key(), |key| {
            (key == foreign).then(|| {
                (
                    ViolationCode::DialectMismatch,
                    format!("'{key}' is not used with '{}'; use '{list_key}'", dialect.surface_key()),
                )
            })
        });

        self.dimension(map, "width", dialect.surface_key());
        self.dimension(map, "height", dialect.surface_key());
        if let Some(list) = required(&mut self.out, map, list_key, dialect.surface_key()) {
            self.at(list_key, |w| w.element_list(list, 1));
        }
    }

    fn dimension(&mut self, map: &Map<String, Value>, key: &str, context: &str) {
        if let Some(value) = required(&mut self.out, map, key, context) {
            self.out.at(key, |out| check_number(out, value, NumberRule::at_least(1.0), key));
        }
    }

    // --- Meta ---

    fn meta(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "meta") else { return };
        closed(&mut self.out, map, META_FIELDS, "meta");
        for key in META_FIELDS {
            if let Some(entry) = map.get(*key) {
                self.at(key, |w| w.meta_entry(entry, key));
            }
        }
    }

    fn meta_entry(&mut self, value: &Value, what: &str) {
        let Some(map) = expect_object(&mut self.out, value, what) else { return };
        closed(&mut self.out, map, META_ENTRY_FIELDS, what);
        self.optional_string(map, "name");
        self.optional_string(map, "text");
        if let Some(url) = self.optional_string(map, "url") {
            if !is_safe_meta_url(url) {
                self.out.report_at(
                    "url",
                    ViolationCode::UnsafeUrl,
                    format!("meta url '{url}' must be an absolute http or https URL"),
                );
            }
        }
    }

    // --- Elements ---

    fn element_list(&mut self, value: &Value, depth: usize) {
        let Value::Array(items) = value else {
            self.out.report(
                ViolationCode::WrongType,
                format!("expected a list of elements, found {}", type_name(value)),
            );
            return;
        };
        for (i, item) in items.iter().enumerate() {
            self.at(i, |w| w.element(item, depth));
        }
    }

    fn element(&mut self, value: &Value, depth: usize) {
        if depth > self.config.max_depth {
            let path = self.out.path();
            warn!(%path, max_depth = self.config.max_depth, "element nesting limit reached");
            self.out.report(
                ViolationCode::ResourceLimitExceeded,
                format!("element nesting exceeds the maximum depth of {}", self.config.max_depth),
            );
            return;
        }
        self.elements_seen += 1;
        if self.elements_seen > self.config.max_elements {
            if !self.element_limit_reported {
                self.element_limit_reported = true;
                let path = self.out.path();
                warn!(%path, max_elements = self.config.max_elements, "element count limit reached");
                self.out.report(
                    ViolationCode::ResourceLimitExceeded,
                    format!("document holds more than {} elements", self.config.max_elements),
                );
            }
            return;
        }

        let Some(map) = expect_object(&mut self.out, value, "element") else { return };
        let Some(kind) = required(&mut self.out, map, "type", "element") else { return };
        let Some(kind) = self.at("type", |w| w.string(kind, "type")) else { return };
        match kind {
            "element" => self.svg_element(map, depth),
            "text" => self.text_element(map, depth),
            "component" => self.component_element(map),
            other => self.out.report_at(
                "type",
                ViolationCode::InvalidEnumValue,
                format!("element type '{other}' must be one of element, text, component"),
            ),
        }
    }

    fn svg_element(&mut self, map: &Map<String, Value>, depth: usize) {
        closed(&mut self.out, map, SVG_ELEMENT_FIELDS, "element");

        let name = required(&mut self.out, map, "name", "element")
            .and_then(|name| self.at("name", |w| w.string(name, "element name")));
        if let Some(name) = name {
            if !is_allowed_element(name) {
                self.out.report_at(
                    "name",
                    ViolationCode::DisallowedElement,
                    format!("element '{name}' is not on the SVG allow-list"),
                );
            }
        }

        if let Some(attributes) = map.get("attributes") {
            self.at("attributes", |w| w.attributes(attributes));
        }

        if let Some(value) = map.get("value") {
            if name == Some("style") {
                self.at("value", |w| {
                    if let Some(css) = w.string(value, "style content") {
                        w.css(css, "style content");
                    }
                });
            } else if name.is_some() {
                self.out.report_at(
                    "value",
                    ViolationCode::ForbiddenField,
                    "'value' is only allowed on style elements",
                );
            }
        }

        if let Some(children) = map.get("children") {
            self.at("children", |w| w.element_list(children, depth + 1));
        }
    }

    fn text_element(&mut self, map: &Map<String, Value>, depth: usize) {
        closed_with(&mut self.out, map, TEXT_FIELDS, "text element", |key| {
            SVG_ELEMENT_FIELDS.contains(&key).then(|| {
                (
                    ViolationCode::ForbiddenField,
                    format!("'{key}' is not allowed on text elements"),
                )
            })
        });

        if let Some(value) = map.get("value") {
            self.at("value", |w| match value {
                Value::String(_) => {
                    w.string(value, "text value");
                }
                Value::Object(reference) => w.variable_reference(reference),
                other => w.out.report(
                    ViolationCode::WrongType,
                    format!(
                        "text value must be a string or a variable reference, found {}",
                        type_name(other)
                    ),
                ),
            });
        }

        if let Some(children) = map.get("children") {
            self.at("children", |w| w.element_list(children, depth + 1));
        }
    }

    fn variable_reference(&mut self, map: &Map<String, Value>) {
        closed(&mut self.out, map, REFERENCE_FIELDS, "variable reference");
        self.reference_type(map, "variable");
        if let Some(name) = required(&mut self.out, map, "value", "variable reference") {
            self.at("value", |w| {
                let Some(name) = w.string(name, "variable name") else { return };
                if !is_known_variable(name) {
                    w.out.report(
                        ViolationCode::UnknownVariable,
                        format!(
                            "unknown variable '{name}', expected one of {}",
                            policy::VARIABLES.join(", ")
                        ),
                    );
                }
            });
        }
    }

    fn reference_type(&mut self, map: &Map<String, Value>, expected: &str) {
        let Some(kind) = required(&mut self.out, map, "type", "reference") else { return };
        self.at("type", |w| {
            if let Some(kind) = w.string(kind, "reference type") {
                if kind != expected {
                    w.out.report(
                        ViolationCode::InvalidEnumValue,
                        format!("reference type must be '{expected}', found '{kind}'"),
                    );
                }
            }
        });
    }

    fn component_element(&mut self, map: &Map<String, Value>) {
        closed_with(&mut self.out, map, COMPONENT_ELEMENT_FIELDS, "component element", |key| {
            SVG_ELEMENT_FIELDS.contains(&key).then(|| {
                (
                    ViolationCode::ForbiddenField,
                    format!("'{key}' is not allowed on component elements"),
                )
            })
        });
        if let Some(value) = required(&mut self.out, map, "value", "component element") {
            self.at("value", |w| w.name_reference(value, "component"));
        }
    }

    // --- Attributes ---

    fn attributes(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "attributes") else { return };
        for (key, value) in map {
            self.at(key, |w| w.attribute(key, value));
        }
    }

    fn attribute(&mut self, key: &str, value: &Value) {
        let policy = match classify_attribute(key) {
            AttributeKey::Allowed(policy) => policy,
            AttributeKey::Reserved => {
                return self.out.report(
                    ViolationCode::ReservedKey,
                    format!("reserved key '{key}' cannot be an attribute"),
                )
            }
            AttributeKey::EventHandler => {
                return self.out.report(
                    ViolationCode::EventHandlerAttribute,
                    format!("event handler attribute '{key}' is not allowed"),
                )
            }
            AttributeKey::Namespaced => {
                return self.out.report(
                    ViolationCode::NamespaceAttribute,
                    format!("namespaced attribute '{key}' is not allowed"),
                )
            }
            AttributeKey::NotAllowed => {
                return self.out.report(
                    ViolationCode::DisallowedAttribute,
                    format!("attribute '{key}' is not on the allow-list"),
                )
            }
        };

        match value {
            Value::String(_) => {
                if let Some(text) = self.string(value, key) {
                    self.attribute_text(policy, key, text);
                }
            }
            Value::Object(reference) if policy.accepts_color_reference() => {
                self.color_reference(reference);
            }
            other => {
                let expected = if policy.accepts_color_reference() {
                    "a string or a color reference"
                } else {
                    "a string"
                };
                self.out.report(
                    ViolationCode::WrongType,
                    format!("attribute '{key}' must be {expected}, found {}", type_name(other)),
                );
            }
        }
    }

    fn attribute_text(&mut self, policy: AttributePolicy, key: &str, text: &str) {
        match policy {
            AttributePolicy::Text | AttributePolicy::Reference | AttributePolicy::Style => {
                self.css(text, key);
            }
            AttributePolicy::Paint | AttributePolicy::Color => {
                let ok = match policy {
                    AttributePolicy::Paint => is_paint_value(text),
                    _ => is_color_value(text),
                };
                if ok {
                    return;
                }
                if let Some(threat) = find_css_threat(text) {
                    self.report_css(threat, key);
                } else {
                    self.out.report(
                        ViolationCode::PatternMismatch,
                        format!("'{text}' is not a valid color for '{key}'"),
                    );
                }
            }
            AttributePolicy::Href => {
                if !is_safe_url(text) {
                    self.out.report(
                        ViolationCode::UnsafeUrl,
                        format!("'{key}' must be a local #id or a base64 PNG/JPEG data URI"),
                    );
                }
            }
            AttributePolicy::Id => {
                if !is_safe_id(text) {
                    self.out.report(ViolationCode::UnsafeName, format!("'{text}' is not a valid id"));
                }
            }
            AttributePolicy::Class => {
                if !is_safe_class_list(text) {
                    self.out.report(
                        ViolationCode::UnsafeName,
                        format!("'{text}' is not a valid class list"),
                    );
                }
            }
        }
    }

    fn css(&mut self, css: &str, what: &str) {
        if let Some(threat) = find_css_threat(css) {
            self.report_css(threat, what);
        }
    }

    fn report_css(&mut self, threat: CssThreat, what: &str) {
        let code = match threat {
            CssThreat::ExternalUrl | CssThreat::SpacedUrl | CssThreat::ScriptScheme => {
                ViolationCode::UnsafeUrl
            }
            _ => ViolationCode::UnsafeCss,
        };
        self.out.report(code, format!("{threat} (in {what})"));
    }

    fn color_reference(&mut self, map: &Map<String, Value>) {
        closed(&mut self.out, map, REFERENCE_FIELDS, "color reference");
        self.reference_type(map, "color");
        if let Some(name) = required(&mut self.out, map, "value", "color reference") {
            self.at("value", |w| {
                let Some(name) = w.string(name, "color name") else { return };
                if is_reserved_key(name) {
                    w.out.report(
                        ViolationCode::ReservedKey,
                        format!("reserved key '{name}' cannot be referenced"),
                    );
                } else if !is_color_reference_name(name) {
                    w.out.report(
                        ViolationCode::PatternMismatch,
                        format!("color reference '{name}' must be a camelCase name"),
                    );
                }
            });
        }
    }

    // --- Colors ---

    fn colors(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "colors") else { return };
        for (name, group) in map {
            self.at(name, |w| {
                w.map_key(name, "color group");
                w.color_group(group);
            });
        }
    }

    fn color_group(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "color group") else { return };
        closed(&mut self.out, map, COLOR_GROUP_FIELDS, "color group");

        if let Some(values) = required(&mut self.out, map, "values", "color group") {
            self.at("values", |w| w.color_values(values));
        }
        if let Some(others) = map.get("notEqualTo") {
            self.at("notEqualTo", |w| match others {
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        w.at(i, |w| w.name_reference(item, "color group reference"));
                    }
                }
                other => w.out.report(
                    ViolationCode::WrongType,
                    format!("notEqualTo must be a list of names, found {}", type_name(other)),
                ),
            });
        }
        if let Some(contrast) = map.get("contrastTo") {
            self.at("contrastTo", |w| w.name_reference(contrast, "color group reference"));
        }
    }

    fn color_values(&mut self, value: &Value) {
        let Value::Array(items) = value else {
            self.out.report(
                ViolationCode::WrongType,
                format!("values must be a list of hex colors, found {}", type_name(value)),
            );
            return;
        };
        if items.is_empty() && self.dialect == Some(Dialect::Body) {
            self.out.report(ViolationCode::InvalidArity, "values must hold at least one color");
        }
        for (i, item) in items.iter().enumerate() {
            self.at(i, |w| {
                let Some(color) = w.string(item, "color") else { return };
                if !is_hex_color(color) {
                    w.out.report(
                        ViolationCode::PatternMismatch,
                        format!("'{color}' must be '#' followed by 3, 6 or 8 hex digits"),
                    );
                }
            });
        }
    }

    // --- Components ---

    fn components(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "components") else { return };
        for (name, component) in map {
            self.at(name, |w| {
                w.map_key(name, "component");
                w.component(component);
            });
        }
    }

    fn component(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "component") else { return };
        closed(&mut self.out, map, COMPONENT_FIELDS, "component");

        self.dimension(map, "width", "component");
        self.dimension(map, "height", "component");
        if let Some(probability) = map.get("probability") {
            self.out.at("probability", |out| {
                check_number(out, probability, NumberRule::real(0.0, 100.0), "probability")
            });
        }

        for dialect in [Dialect::Body, Dialect::Canvas] {
            let key = dialect.rotation_key();
            if let Some(angle) = map.get(key) {
                self.expect_dialect(dialect, key);
                self.out.at(key, |out| {
                    check_number_or_list(out, angle, NumberRule::real(-360.0, 360.0), 1..=2, key)
                });
            }
            let key = dialect.offset_key();
            if let Some(offset) = map.get(key) {
                self.expect_dialect(dialect, key);
                self.at(key, |w| w.offset(offset, key));
            }
        }

        if let Some(variants) = required(&mut self.out, map, "variants", "component") {
            self.at("variants", |w| w.variants(variants));
        }
    }

    fn offset(&mut self, value: &Value, what: &str) {
        let Some(map) = expect_object(&mut self.out, value, what) else { return };
        closed(&mut self.out, map, OFFSET_FIELDS, what);
        for axis in OFFSET_FIELDS {
            if let Some(amount) = map.get(*axis) {
                self.out.at(axis, |out| {
                    check_number_or_list(out, amount, NumberRule::real(-100.0, 100.0), 1..=2, axis)
                });
            }
        }
    }

    fn variants(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "variants") else { return };
        for (name, variant) in map {
            self.at(name, |w| {
                w.map_key(name, "variant");
                w.variant(variant);
            });
        }
    }

    fn variant(&mut self, value: &Value) {
        let Some(map) = expect_object(&mut self.out, value, "variant") else { return };
        closed(&mut self.out, map, VARIANT_FIELDS, "variant");

        let mut found = false;
        for dialect in [Dialect::Body, Dialect::Canvas] {
            let key = dialect.elements_key();
            if let Some(list) = map.get(key) {
                found = true;
                self.expect_dialect(dialect, key);
                self.at(key, |w| w.element_list(list, 1));
            }
        }
        if !found {
            let key = self.dialect.unwrap_or(Dialect::Body).elements_key();
            self.out.report_at(key, ViolationCode::MissingField, format!("variant requires '{key}'"));
        }
    }
}
