//! Action parameter metadata and flat-string coercion.
//!
//! Action definitions store every parameter as a string. This module owns the
//! descriptors that say how each string should be read, and the parse/format
//! pairs for compound values. Compound numeric values are joined with
//! [`NUMBER_PARAM_SEPARATOR`]; two-part string references (scene + actor,
//! actor + animation) use [`STRING_PARAM_SEPARATOR`].
//!
//! Parsing never panics. Malformed input yields `None` so speculative callers
//! (tooling validating as the user types) can substitute a default.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::action::ActionError;
use crate::geometry::{Color, Polygon, Vec2, Vec3};
use crate::world::SceneActorRef;

pub const NUMBER_PARAM_SEPARATOR: char = ',';
pub const STRING_PARAM_SEPARATOR: char = '#';

/// Flat parameter map in canonical (sorted) order.
pub type ParamMap = BTreeMap<String, String>;

/// Closed set of parameter types. Editors use the tag to pick an input widget;
/// the engine uses it to pick a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamType {
    String,
    Boolean,
    Float,
    Integer,
    Vector2,
    Vector3,
    Dimension,
    Actor,
    Scene,
    Chapter,
    File,
    Option,
    SceneActor,
    ActorAnimation,
    Layer,
    EditableOption,
    Text,
    SmallText,
    BigText,
    Color,
    Sound,
    Font,
    FileSound,
    FileMusic,
    FileAtlas,
    FileS3d,
    FileSpine,
    FileImage,
}

impl ParamType {
    /// Validate a raw value against this type without keeping the result.
    pub fn accepts(self, raw: &str) -> bool {
        match self {
            ParamType::Boolean => parse_bool(raw).is_some(),
            ParamType::Float => parse_float(raw).is_some(),
            ParamType::Integer => parse_int(raw).is_some(),
            ParamType::Vector2 | ParamType::Dimension => parse_vector2(raw).is_some(),
            ParamType::Vector3 => parse_vector3(raw).is_some(),
            ParamType::Color => parse_color(raw).is_some(),
            ParamType::SceneActor | ParamType::ActorAnimation => !parse_string2(raw).1.trim().is_empty(),
            _ => true,
        }
    }
}

/// Immutable descriptor of one action parameter.
///
/// Descriptors live in static per-action tables and compare structurally, so
/// tooling can diff and deduplicate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Param {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub kind: ParamType,
    pub mandatory: bool,
    pub default: Option<&'static str>,
    pub options: &'static [&'static str],
    pub link: Option<&'static str>,
}

impl Param {
    pub const fn new(id: &'static str, kind: ParamType) -> Self {
        Self {
            id,
            name: id,
            desc: "",
            kind,
            mandatory: false,
            default: None,
            options: &[],
            link: None,
        }
    }

    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub const fn desc(mut self, desc: &'static str) -> Self {
        self.desc = desc;
        self
    }

    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    pub const fn link(mut self, link: &'static str) -> Self {
        self.link = Some(link);
        self
    }
}

/// Parse a float the way definitions write them (`"12.5"`, `" 3 "`).
pub fn parse_float(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok().filter(|f| f.is_finite())
}

pub fn parse_int(s: &str) -> Option<i32> {
    s.trim().parse::<i32>().ok()
}

/// `"true"` / `"false"`, case-insensitive.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse `"x,y"`.
pub fn parse_vector2(s: &str) -> Option<Vec2> {
    let (x, y) = s.split_once(NUMBER_PARAM_SEPARATOR)?;
    Some(Vec2::new(parse_float(x)?, parse_float(y)?))
}

/// Parse `"x,y,z"`.
pub fn parse_vector3(s: &str) -> Option<Vec3> {
    let mut parts = s.split(NUMBER_PARAM_SEPARATOR);
    let x = parse_float(parts.next()?)?;
    let y = parse_float(parts.next()?)?;
    let z = parse_float(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Vec3::new(x, y, z))
}

/// Parse `"x1,y1,x2,y2,x3,y3,..."`: an even count of at least six components.
pub fn parse_polygon(s: &str) -> Option<Polygon> {
    let vertices = s
        .split(NUMBER_PARAM_SEPARATOR)
        .map(parse_float)
        .collect::<Option<Vec<_>>>()?;
    Polygon::new(vertices)
}

/// Parse a polygon and place it at `pos` (`"x,y"`).
pub fn parse_polygon_at(vertices: &str, pos: &str) -> Option<Polygon> {
    let mut polygon = parse_polygon(vertices)?;
    polygon.set_position(parse_vector2(pos)?);
    Some(polygon)
}

/// Split `"first#second"`. Without a separator the whole input is the second
/// part; an empty first part counts as absent.
pub fn parse_string2(s: &str) -> (Option<&str>, &str) {
    match s.split_once(STRING_PARAM_SEPARATOR) {
        Some((first, second)) if !first.is_empty() => (Some(first), second),
        Some((_, second)) => (None, second),
        None => (None, s),
    }
}

/// Color literal: blank is black, `black`/`white` by name, otherwise hex.
pub fn parse_color(s: &str) -> Option<Color> {
    match s.trim() {
        "" | "black" => Some(Color::BLACK),
        "white" => Some(Color::WHITE),
        other => Color::from_hex(other),
    }
}

/// Floats always carry a decimal point (`8.0`, not `8`).
pub fn format_float(f: f32) -> String {
    format!("{f:?}")
}

pub fn format_vector2(v: Vec2) -> String {
    format!("{}{NUMBER_PARAM_SEPARATOR}{}", format_float(v.x), format_float(v.y))
}

pub fn format_vector3(v: Vec3) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        format_float(v.x),
        format_float(v.y),
        format_float(v.z),
        sep = NUMBER_PARAM_SEPARATOR
    )
}

pub fn format_polygon(p: &Polygon) -> String {
    p.vertices()
        .iter()
        .map(|v| format_float(*v))
        .collect::<Vec<_>>()
        .join(&NUMBER_PARAM_SEPARATOR.to_string())
}

pub fn format_string2(first: Option<&str>, second: &str) -> String {
    match first {
        Some(first) if !first.is_empty() => format!("{first}{STRING_PARAM_SEPARATOR}{second}"),
        _ => second.to_string(),
    }
}

pub fn format_color(c: Color) -> String {
    c.to_hex()
}

/// Raw parameter values for one action, already checked against its table.
///
/// Built by [`ParamValues::resolve`], which fills declared defaults and rejects
/// missing mandatory parameters. Typed getters coerce on read: a malformed
/// value logs a warning and falls back to the declared default, if any.
#[derive(Debug)]
pub struct ParamValues<'a> {
    action: &'static str,
    table: &'static [Param],
    values: HashMap<&'static str, Cow<'a, str>>,
}

impl<'a> ParamValues<'a> {
    /// Check raw values against `table`.
    ///
    /// # Errors
    /// - [`ActionError::MissingParam`] when a mandatory parameter has neither a
    ///   value nor a declared default.
    pub fn resolve<S: std::hash::BuildHasher>(
        action: &'static str,
        table: &'static [Param],
        raw: &'a HashMap<String, String, S>,
    ) -> Result<Self, ActionError> {
        for key in raw.keys() {
            if !table.iter().any(|p| p.id == key.as_str()) {
                warn!("action '{action}': ignoring unknown parameter '{key}'");
            }
        }

        let mut values = HashMap::new();
        for param in table {
            if let Some(value) = raw.get(param.id) {
                values.insert(param.id, Cow::Borrowed(value.as_str()));
            } else if let Some(default) = param.default {
                values.insert(param.id, Cow::Borrowed(default));
            } else if param.mandatory {
                return Err(ActionError::MissingParam {
                    action,
                    param: param.id,
                });
            }
        }
        Ok(Self { action, table, values })
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    /// Raw string value, if present.
    pub fn str(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(|value| &**value)
    }

    pub fn string(&self, id: &str) -> Option<String> {
        self.str(id).map(str::to_string)
    }

    /// Raw string value of a mandatory parameter.
    ///
    /// # Errors
    /// - [`ActionError::MissingParam`] if no value is present.
    pub fn required_string(&self, id: &'static str) -> Result<String, ActionError> {
        self.string(id).ok_or(ActionError::MissingParam {
            action: self.action,
            param: id,
        })
    }

    /// Typed value, falling back to the declared default when the raw value is malformed.
    pub fn typed<T>(&self, id: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.str(id)?;
        if let Some(value) = parse(raw) {
            return Some(value);
        }
        let param = self.table.iter().find(|p| p.id == id);
        warn!(
            "action '{}': parameter '{id}' has malformed {:?} value '{raw}', using default",
            self.action,
            param.map(|p| p.kind)
        );
        param.and_then(|p| p.default).and_then(|d| parse(d))
    }

    /// Typed value of a parameter that must end up with a value.
    ///
    /// # Errors
    /// - [`ActionError::MissingParam`] if absent.
    /// - [`ActionError::InvalidParam`] if malformed with no usable default.
    pub fn required<T>(&self, id: &'static str, parse: impl Fn(&str) -> Option<T>) -> Result<T, ActionError> {
        let Some(raw) = self.str(id) else {
            return Err(ActionError::MissingParam {
                action: self.action,
                param: id,
            });
        };
        self.typed(id, parse).ok_or_else(|| ActionError::InvalidParam {
            action: self.action,
            param: id,
            value: raw.to_string(),
        })
    }

    pub fn float(&self, id: &str) -> Option<f32> {
        self.typed(id, parse_float)
    }

    pub fn bool(&self, id: &str) -> Option<bool> {
        self.typed(id, parse_bool)
    }

    pub fn int(&self, id: &str) -> Option<i32> {
        self.typed(id, parse_int)
    }

    pub fn vector2(&self, id: &str) -> Option<Vec2> {
        self.typed(id, parse_vector2)
    }

    pub fn scene_actor(&self, id: &str) -> Option<SceneActorRef> {
        self.typed(id, SceneActorRef::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector2_reparses_from_its_canonical_form() {
        for raw in ["12.5,8.0", "-3,0.25", " 7 , 9 ", "1e3,-0.5"] {
            let v = parse_vector2(raw).expect("valid vector");
            let formatted = format_vector2(v);
            let again = parse_vector2(&formatted).expect("canonical form parses");
            assert!((v - again).length() < 1e-5, "{raw} -> {formatted}");
        }
        assert_eq!(format_vector2(Vec2::new(12.5, 8.0)), "12.5,8.0");
    }

    #[test]
    fn malformed_vectors_yield_none() {
        assert!(parse_vector2("12.5").is_none());
        assert!(parse_vector2("a,b").is_none());
        assert!(parse_vector2("").is_none());
        assert!(parse_vector3("1,2").is_none());
        assert!(parse_vector3("1,2,3,4").is_none());
        assert_eq!(parse_vector3("1,2,3"), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(format_vector3(Vec3::new(1.0, 2.0, 3.5)), "1.0,2.0,3.5");
    }

    #[test]
    fn polygons_need_three_full_vertices() {
        assert!(parse_polygon("0,0,10,0").is_none());
        assert!(parse_polygon("0,0,10,0,10").is_none());
        assert!(parse_polygon("0,0,10,0,10,10,0").is_none());
        assert!(parse_polygon("0,0,10,x,10,10").is_none());

        let poly = parse_polygon("0,0,10,0,10,10").expect("triangle");
        assert_eq!(poly.vertices().len(), 6);
        assert_eq!(format_polygon(&poly), "0.0,0.0,10.0,0.0,10.0,10.0");

        let placed = parse_polygon_at("0,0,10,0,10,10", "5,5").expect("placed");
        assert_eq!(placed.position(), Vec2::new(5.0, 5.0));
        assert!(parse_polygon_at("0,0,10,0,10,10", "nope").is_none());
    }

    #[test]
    fn string_pairs_split_on_hash() {
        assert_eq!(parse_string2("kitchen#knife"), (Some("kitchen"), "knife"));
        assert_eq!(parse_string2("knife"), (None, "knife"));
        assert_eq!(parse_string2("#knife"), (None, "knife"));
        assert_eq!(format_string2(Some("kitchen"), "knife"), "kitchen#knife");
        assert_eq!(format_string2(None, "knife"), "knife");
        assert_eq!(format_string2(Some(""), "knife"), "knife");
    }

    #[test]
    fn colors_default_to_black_when_blank() {
        assert_eq!(parse_color(""), Some(Color::BLACK));
        assert_eq!(parse_color("   "), Some(Color::BLACK));
        assert_eq!(parse_color("white"), Some(Color::WHITE));
        assert_eq!(parse_color("black"), Some(Color::BLACK));
        assert!(parse_color("ff0000").is_some());
        assert!(parse_color("reddish").is_none());
    }

    #[test]
    fn type_tags_validate_raw_values() {
        assert!(ParamType::Boolean.accepts("TRUE"));
        assert!(!ParamType::Boolean.accepts("yes"));
        assert!(ParamType::Vector2.accepts("1,2"));
        assert!(!ParamType::Float.accepts("1,2"));
        assert!(ParamType::SceneActor.accepts("hall#door"));
        assert!(!ParamType::SceneActor.accepts("hall#"));
        assert!(ParamType::Text.accepts("anything at all"));
    }

    const TABLE: &[Param] = &[
        Param::new("speed", ParamType::Float).default_value("1.5"),
        Param::new("target", ParamType::Actor).mandatory(),
        Param::new("wait", ParamType::Boolean).mandatory().default_value("true"),
    ];

    #[test]
    fn resolve_fills_defaults_and_rejects_missing_mandatory() {
        let raw = HashMap::from([("target".to_string(), "door".to_string())]);
        let values = ParamValues::resolve("test", TABLE, &raw).expect("resolves");
        assert_eq!(values.float("speed"), Some(1.5));
        assert_eq!(values.bool("wait"), Some(true));
        assert_eq!(values.str("target"), Some("door"));

        let empty: HashMap<String, String> = HashMap::new();
        let err = ParamValues::resolve("test", TABLE, &empty).unwrap_err();
        assert!(matches!(err, ActionError::MissingParam { param: "target", .. }));
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let raw = HashMap::from([
            ("target".to_string(), "door".to_string()),
            ("speed".to_string(), "fast".to_string()),
            ("wait".to_string(), "maybe".to_string()),
        ]);
        let values = ParamValues::resolve("test", TABLE, &raw).expect("resolves");
        assert_eq!(values.float("speed"), Some(1.5));
        assert_eq!(values.required("wait", parse_bool).ok(), Some(true));
    }
}
