//! Options Validator - Named Properties Plus `<component><Suffix>` Keys
//!
//! The options map is closed: a key is either one of the named properties,
//! a component-prefixed dynamic key, or a violation.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::config::ValidatorConfig;
use crate::policy::{find_css_threat, is_option_color, is_reserved_key, is_safe_font_family};
use crate::shape::{
    NumberRule, check_number, check_number_or_list, check_string_or_list, expect_object,
    expect_string, type_name,
};
use crate::violation::{Collector, Subject, Violation, ViolationCode};
use crate::Validate;

const FLIP_VALUES: &[&str] = &["none", "horizontal", "vertical", "both"];

static DYNAMIC_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([a-z][A-Za-z0-9]*)?(Probability|Variant|Color|Rotation|Rotate|VerticalOffset|HorizontalOffset|TranslateX|TranslateY)$",
    )
    .unwrap()
});

/// A fixed option name. Aliased spellings map to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NamedOption {
    Seed,
    Size,
    IdRandomization,
    Flip,
    FontFamily,
    FontWeight,
    Scale,
    BorderRadius,
}

const NAMED: &[(&str, NamedOption)] = &[
    ("seed", NamedOption::Seed),
    ("size", NamedOption::Size),
    ("idRandomization", NamedOption::IdRandomization),
    ("flip", NamedOption::Flip),
    ("flipDirection", NamedOption::Flip),
    ("fontFamily", NamedOption::FontFamily),
    ("fontWeight", NamedOption::FontWeight),
    ("scale", NamedOption::Scale),
    ("scaleFactor", NamedOption::Scale),
    ("borderRadius", NamedOption::BorderRadius),
    ("cornerRadius", NamedOption::BorderRadius),
];

impl NamedOption {
    pub fn lookup(key: &str) -> Option<Self> {
        NAMED.iter().find(|(name, _)| *name == key).map(|(_, option)| *option)
    }
}

/// Value grammar selected by a dynamic key's suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    Probability,
    Variant,
    Color,
    /// `Rotation` or `Rotate`.
    Rotation,
    /// `VerticalOffset` or `TranslateY`.
    VerticalOffset,
    /// `HorizontalOffset` or `TranslateX`.
    HorizontalOffset,
}

impl Suffix {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Probability" => Suffix::Probability,
            "Variant" => Suffix::Variant,
            "Color" => Suffix::Color,
            "Rotation" | "Rotate" => Suffix::Rotation,
            "VerticalOffset" | "TranslateY" => Suffix::VerticalOffset,
            "HorizontalOffset" | "TranslateX" => Suffix::HorizontalOffset,
            _ => return None,
        })
    }

    /// Bare keys are the suffix with a lower-cased first letter.
    fn parse_bare(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let first = chars.next()?;
        if !first.is_ascii_lowercase() {
            return None;
        }
        let capitalized = format!("{}{}", first.to_ascii_uppercase(), chars.as_str());
        Self::parse(&capitalized)
    }
}

/// How one options key is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey<'a> {
    Named(NamedOption),
    Dynamic { prefix: &'a str, suffix: Suffix },
    Reserved,
    Unknown,
}

impl<'a> OptionKey<'a> {
    pub fn classify(key: &'a str) -> Self {
        if is_reserved_key(key) {
            return OptionKey::Reserved;
        }
        if let Some(named) = NamedOption::lookup(key) {
            return OptionKey::Named(named);
        }
        if let Some(caps) = DYNAMIC_KEY_RE.captures(key) {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            if let Some(suffix) = caps.get(2).and_then(|m| Suffix::parse(m.as_str())) {
                return OptionKey::Dynamic { prefix, suffix };
            }
        }
        if let Some(suffix) = Suffix::parse_bare(key) {
            return OptionKey::Dynamic { prefix: "", suffix };
        }
        OptionKey::Unknown
    }
}

/// Validates flat options maps.
#[derive(Debug, Clone, Default)]
pub struct OptionsValidator {
    config: ValidatorConfig,
}

impl OptionsValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, options: &Value) -> Vec<Violation> {
        let mut out = Collector::new();
        let Some(map) = expect_object(&mut out, options, "options") else {
            return out.into_violations();
        };

        let mut seen: BTreeMap<NamedOption, &str> = BTreeMap::new();
        for (key, value) in map {
            out.at(key, |out| match OptionKey::classify(key) {
                OptionKey::Reserved => out.report(
                    ViolationCode::ReservedKey,
                    format!("reserved key '{key}' is not allowed in options"),
                ),
                OptionKey::Named(named) => {
                    if let Some(first) = seen.get(&named) {
                        out.report(
                            ViolationCode::DuplicateField,
                            format!("'{key}' sets the same option as '{first}'"),
                        );
                    } else {
                        seen.insert(named, key.as_str());
                    }
                    self.named(out, named, key, value);
                }
                OptionKey::Dynamic { suffix, .. } => self.dynamic(out, suffix, key, value),
                OptionKey::Unknown => out.report(
                    ViolationCode::UnknownField,
                    format!("unknown option '{key}'"),
                ),
            });
        }
        out.into_violations()
    }

    fn named(&self, out: &mut Collector, option: NamedOption, key: &str, value: &Value) {
        let max_len = self.config.max_string_length;
        match option {
            NamedOption::Seed => {
                expect_string(out, value, key, max_len);
            }
            NamedOption::Size => {
                check_number(out, value, NumberRule::integer_at_least(1), key);
            }
            NamedOption::IdRandomization => {
                if !value.is_boolean() {
                    out.report(
                        ViolationCode::WrongType,
                        format!("{key} must be a boolean, found {}", type_name(value)),
                    );
                }
            }
            NamedOption::Flip => check_string_or_list(out, value, key, max_len, |out, flip| {
                if !FLIP_VALUES.contains(&flip) {
                    out.report(
                        ViolationCode::InvalidEnumValue,
                        format!("'{flip}' must be one of {}", FLIP_VALUES.join(", ")),
                    );
                }
            }),
            NamedOption::FontFamily => check_string_or_list(out, value, key, max_len, font_family),
            NamedOption::FontWeight => {
                check_number_or_list(out, value, NumberRule::integer(1, 1000), 2..=2, key)
            }
            NamedOption::Scale => {
                check_number_or_list(out, value, NumberRule::at_least(0.0), 2..=2, key)
            }
            NamedOption::BorderRadius => {
                check_number_or_list(out, value, NumberRule::real(0.0, 50.0), 2..=2, key)
            }
        }
    }

    fn dynamic(&self, out: &mut Collector, suffix: Suffix, key: &str, value: &Value) {
        let max_len = self.config.max_string_length;
        match suffix {
            Suffix::Probability => {
                check_number(out, value, NumberRule::integer(0, 100), key);
            }
            Suffix::Variant => check_string_or_list(out, value, key, max_len, |_, _| {}),
            Suffix::Color => check_string_or_list(out, value, key, max_len, |out, color| {
                if !is_option_color(color) {
                    out.report(
                        ViolationCode::PatternMismatch,
                        format!("'{color}' must be 3, 6 or 8 hex digits with an optional '#'"),
                    );
                }
            }),
            Suffix::Rotation => {
                check_number_or_list(out, value, NumberRule::integer(-360, 360), 1..=2, key)
            }
            Suffix::VerticalOffset | Suffix::HorizontalOffset => {
                check_number_or_list(out, value, NumberRule::integer(-100, 100), 1..=2, key)
            }
        }
    }
}

fn font_family(out: &mut Collector, family: &str) {
    if is_safe_font_family(family) {
        return;
    }
    let injected = find_css_threat(family).is_some()
        || family.contains([';', '(', ')', '{', '}', '<', '>', '"', '\'']);
    let code = if injected {
        ViolationCode::UnsafeCss
    } else {
        ViolationCode::PatternMismatch
    };
    out.report(
        code,
        format!("font family '{family}' may only contain letters, digits, spaces, '-' and '_'"),
    );
}

impl Validate for OptionsValidator {
    fn subject(&self) -> Subject {
        Subject::Options
    }

    fn collect(&self, input: &Value) -> Vec<Violation> {
        self.validate(input)
    }
}
