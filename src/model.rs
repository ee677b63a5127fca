//! Definition Model - Typed Shapes of Validated Input
//!
//! These types are what a renderer receives after [`crate::Gate`] has accepted
//! a document. They mirror the JSON vocabulary one-to-one; the validators are
//! the authority on what is allowed, these types only give it a name.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Field-naming convention a document is written in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `body`/`content`/`rotation`/`offset`
    Body,
    /// `canvas`/`elements`/`rotate`/`translate`
    Canvas,
}

impl Dialect {
    pub fn surface_key(self) -> &'static str {
        match self {
            Dialect::Body => "body",
            Dialect::Canvas => "canvas",
        }
    }

    pub fn elements_key(self) -> &'static str {
        match self {
            Dialect::Body => "content",
            Dialect::Canvas => "elements",
        }
    }

    pub fn rotation_key(self) -> &'static str {
        match self {
            Dialect::Body => "rotation",
            Dialect::Canvas => "rotate",
        }
    }

    pub fn offset_key(self) -> &'static str {
        match self {
            Dialect::Body => "offset",
            Dialect::Canvas => "translate",
        }
    }

    pub fn other(self) -> Dialect {
        match self {
            Dialect::Body => Dialect::Canvas,
            Dialect::Canvas => Dialect::Body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<Canvas>,
    #[serde(default)]
    pub components: BTreeMap<String, Component>,
    #[serde(default)]
    pub colors: BTreeMap<String, ColorGroup>,
}

/// Dialect-neutral view of the drawing surface.
#[derive(Debug, Clone, Copy)]
pub struct Surface<'a> {
    pub dialect: Dialect,
    pub elements: &'a [Element],
    pub width: f64,
    pub height: f64,
}

impl Document {
    pub fn dialect(&self) -> Option<Dialect> {
        match (&self.body, &self.canvas) {
            (Some(_), None) => Some(Dialect::Body),
            (None, Some(_)) => Some(Dialect::Canvas),
            _ => None,
        }
    }

    pub fn surface(&self) -> Option<Surface<'_>> {
        if let Some(body) = &self.body {
            return Some(Surface {
                dialect: Dialect::Body,
                elements: &body.content,
                width: body.width,
                height: body.height,
            });
        }
        self.canvas.as_ref().map(|canvas| Surface {
            dialect: Dialect::Canvas,
            elements: &canvas.elements,
            width: canvas.width,
            height: canvas.height,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Body {
    pub content: Vec<Element>,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Canvas {
    pub elements: Vec<Element>,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<MetaEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<MetaEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MetaEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetaEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

pub type Attributes = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Color(ColorRef),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorRefKind {
    Color,
}

/// `{"type": "color", "value": "skinColor"}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ColorRef {
    #[serde(rename = "type")]
    pub kind: ColorRefKind,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Element {
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: Attributes,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Element>,
        /// CSS text; only present on `style` elements.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<TextValue>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Element>,
    },
    Component {
        value: String,
    },
}

impl Element {
    pub fn children(&self) -> &[Element] {
        match self {
            Element::Element { children, .. } | Element::Text { children, .. } => children,
            Element::Component { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Variable(VariableRef),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariableRefKind {
    Variable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VariableRef {
    #[serde(rename = "type")]
    pub kind: VariableRefKind,
    pub value: Variable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Variable {
    Initial,
    Initials,
    FontFamily,
    FontWeight,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColorGroup {
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_equal_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast_to: Option<String>,
}

/// Either one number or a `[min, max]`-style list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Range {
    Single(f64),
    Span(Vec<f64>),
}

impl Range {
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Range::Single(v) => Some((*v, *v)),
            Range::Span(values) => match values.as_slice() {
                [v] => Some((*v, *v)),
                [a, b] => Some((a.min(*b), a.max(*b))),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Offset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Range>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Component {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    pub variants: BTreeMap<String, Variant>,
    #[serde(default, alias = "rotate", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Range>,
    #[serde(default, alias = "translate", skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Variant {
    #[serde(alias = "elements")]
    pub content: Vec<Element>,
}

// --- Options ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Flip {
    None,
    Horizontal,
    Vertical,
    Both,
}

/// Flat generation options.
///
/// Named properties are typed; every `<component><Suffix>` key lands in
/// `components` untouched, since applying them is the renderer's business.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(default, deserialize_with = "whole_opt", skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_randomization: Option<bool>,
    #[serde(default, alias = "flipDirection", skip_serializing_if = "Option::is_none")]
    pub flip: Option<OneOrMany<Flip>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<OneOrMany<String>>,
    #[serde(default, deserialize_with = "whole_list_opt", skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<OneOrMany<u16>>,
    #[serde(default, alias = "scaleFactor", skip_serializing_if = "Option::is_none")]
    pub scale: Option<Range>,
    #[serde(default, alias = "cornerRadius", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<Range>,
    #[serde(flatten)]
    pub components: BTreeMap<String, Value>,
}

/// Integer fields also accept integral floats such as `128.0`.
fn whole<T: TryFrom<u64>, E: de::Error>(n: Number) -> Result<T, E> {
    let value = n
        .as_u64()
        .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
        .ok_or_else(|| E::custom(format!("expected a whole number, found {n}")))?;
    T::try_from(value).map_err(|_| E::custom(format!("{n} is out of range")))
}

fn whole_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Option::<Number>::deserialize(d)?.map(whole).transpose()
}

fn whole_list_opt<'de, D, T>(d: D) -> Result<Option<OneOrMany<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    Ok(match Option::<OneOrMany<Number>>::deserialize(d)? {
        None => None,
        Some(OneOrMany::One(n)) => Some(OneOrMany::One(whole::<T, D::Error>(n)?)),
        Some(OneOrMany::Many(ns)) => Some(OneOrMany::Many(
            ns.into_iter().map(whole::<T, D::Error>).collect::<Result<_, _>>()?,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_variants_deserialize() {
        let el: Element = serde_json::from_value(json!({
            "type": "element",
            "name": "g",
            "attributes": {"fill": {"type": "color", "value": "skin"}},
            "children": [
                {"type": "text", "value": {"type": "variable", "value": "initials"}},
                {"type": "component", "value": "eyes"}
            ]
        }))
        .unwrap();

        let Element::Element { name, attributes, children, .. } = &el else {
            panic!("expected element");
        };
        assert_eq!(name, "g");
        assert!(matches!(attributes.get("fill"), Some(AttributeValue::Color(_))));
        assert_eq!(children.len(), 2);
        assert!(matches!(
            children[0],
            Element::Text { value: Some(TextValue::Variable(VariableRef { value: Variable::Initials, .. })), .. }
        ));
    }

    #[test]
    fn test_component_accepts_both_dialects() {
        let body: Component = serde_json::from_value(json!({
            "width": 10, "height": 10, "rotation": [-10, 10],
            "offset": {"x": 5}, "variants": {"a": {"content": []}}
        }))
        .unwrap();
        let canvas: Component = serde_json::from_value(json!({
            "width": 10, "height": 10, "rotate": [-10, 10],
            "translate": {"x": 5}, "variants": {"a": {"elements": []}}
        }))
        .unwrap();
        assert_eq!(body, canvas);
        assert_eq!(body.rotation.as_ref().and_then(Range::bounds), Some((-10.0, 10.0)));
    }

    #[test]
    fn test_document_surface() {
        let doc: Document = serde_json::from_value(json!({
            "canvas": {"elements": [], "width": 32, "height": 16}
        }))
        .unwrap();
        let surface = doc.surface().unwrap();
        assert_eq!(surface.dialect, Dialect::Canvas);
        assert_eq!(surface.width, 32.0);
        assert_eq!(doc.dialect(), Some(Dialect::Canvas));
    }

    #[test]
    fn test_options_collect_component_keys() {
        let options: Options = serde_json::from_value(json!({
            "seed": "abc",
            "flipDirection": ["horizontal"],
            "headProbability": 50,
            "skinColor": ["ff0000"]
        }))
        .unwrap();
        assert_eq!(options.seed.as_deref(), Some("abc"));
        assert_eq!(
            options.flip.as_ref().map(OneOrMany::as_slice),
            Some(&[Flip::Horizontal][..])
        );
        assert_eq!(options.components.len(), 2);
        assert_eq!(options.components["headProbability"], json!(50));
    }

    #[test]
    fn test_options_integers_accept_integral_floats() {
        let options: Options =
            serde_json::from_value(json!({"size": 128.0, "fontWeight": [400.0, 700]})).unwrap();
        assert_eq!(options.size, Some(128));
        assert_eq!(options.font_weight.as_ref().map(OneOrMany::as_slice), Some(&[400u16, 700][..]));

        assert!(serde_json::from_value::<Options>(json!({"size": 1.5})).is_err());
        assert!(serde_json::from_value::<Options>(json!({"fontWeight": 70000})).is_err());
    }
}
