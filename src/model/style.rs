//! Element styling and style patches.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    /// Flexbox `justify-content` equivalent used by the renderer.
    pub fn justify_content(self) -> &'static str {
        match self {
            TextAlign::Left => "flex-start",
            TextAlign::Center => "center",
            TextAlign::Right => "flex-end",
        }
    }
}

/// Accepts either a number (`1.2`) or a string (`"1.2"`, `"normal"`).
fn deserialize_line_height<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LineHeightValue {
        Number(f64),
        Text(String),
    }

    let opt: Option<LineHeightValue> = Option::deserialize(deserializer)?;
    Ok(match opt {
        None => None,
        Some(LineHeightValue::Number(n)) => Some(n.to_string()),
        Some(LineHeightValue::Text(s)) => Some(s),
    })
}

/// Visual style of a template element. Sizes are in native layout space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub color: String,
    pub background_color: String,
    pub padding: f64,
    pub border_radius: f64,
    #[serde(default)]
    pub text_align: TextAlign,
    /// 0.0 = transparent, 1.0 = opaque.
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_line_height"
    )]
    pub line_height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".into(),
            font_size: 14.0,
            font_weight: "400".into(),
            color: "#1a1a1a".into(),
            background_color: "transparent".into(),
            padding: 8.0,
            border_radius: 4.0,
            text_align: TextAlign::Left,
            opacity: 1.0,
            text_transform: None,
            line_height: None,
            border: None,
        }
    }
}

/// A single-key style patch, as produced by one editor control.
///
/// Serialized as `{"key": "fontSize", "value": 20}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum StyleProperty {
    FontFamily(String),
    FontSize(f64),
    FontWeight(String),
    Color(String),
    BackgroundColor(String),
    Padding(f64),
    BorderRadius(f64),
    TextAlign(TextAlign),
    Opacity(f64),
    TextTransform(Option<String>),
    LineHeight(Option<String>),
    Border(Option<String>),
}

impl ElementStyle {
    /// Merge one property into this style.
    ///
    /// Opacity is clamped to [0, 1]; a NaN opacity leaves the style unchanged.
    pub fn apply(&mut self, property: StyleProperty) {
        match property {
            StyleProperty::FontFamily(v) => self.font_family = v,
            StyleProperty::FontSize(v) => self.font_size = v,
            StyleProperty::FontWeight(v) => self.font_weight = v,
            StyleProperty::Color(v) => self.color = v,
            StyleProperty::BackgroundColor(v) => self.background_color = v,
            StyleProperty::Padding(v) => self.padding = v,
            StyleProperty::BorderRadius(v) => self.border_radius = v,
            StyleProperty::TextAlign(v) => self.text_align = v,
            StyleProperty::Opacity(v) => {
                if !v.is_nan() {
                    self.opacity = v.clamp(0.0, 1.0);
                }
            }
            StyleProperty::TextTransform(v) => self.text_transform = v,
            StyleProperty::LineHeight(v) => self.line_height = v,
            StyleProperty::Border(v) => self.border = v,
        }
    }

    /// Font weight as a number (CSS keywords `normal`/`bold` map to 400/700).
    pub fn numeric_weight(&self) -> u16 {
        match self.font_weight.trim() {
            "normal" => 400,
            "bold" => 700,
            w => w.parse().unwrap_or(400),
        }
    }

    /// Line height multiplier; `normal` and unparsable values map to 1.2.
    pub fn line_height_factor(&self) -> f64 {
        self.line_height
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| *v > 0.0)
            .unwrap_or(1.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_is_clamped() {
        let mut style = ElementStyle::default();
        style.apply(StyleProperty::Opacity(1.7));
        assert_eq!(style.opacity, 1.0);
        style.apply(StyleProperty::Opacity(-0.2));
        assert_eq!(style.opacity, 0.0);
        style.apply(StyleProperty::Opacity(f64::NAN));
        assert_eq!(style.opacity, 0.0);
    }

    #[test]
    fn property_patch_from_json() {
        let prop: StyleProperty =
            serde_json::from_str(r#"{"key": "fontSize", "value": 20}"#).unwrap();
        assert_eq!(prop, StyleProperty::FontSize(20.0));

        let prop: StyleProperty =
            serde_json::from_str(r#"{"key": "textAlign", "value": "right"}"#).unwrap();
        assert_eq!(prop, StyleProperty::TextAlign(TextAlign::Right));
    }

    #[test]
    fn line_height_accepts_number_or_string() {
        let json = r##"{"fontFamily":"Inter","fontSize":12,"fontWeight":"400","color":"#000",
            "backgroundColor":"transparent","padding":0,"borderRadius":0,"opacity":1,
            "lineHeight":1.4}"##;
        let style: ElementStyle = serde_json::from_str(json).unwrap();
        assert_eq!(style.line_height.as_deref(), Some("1.4"));
        assert_eq!(style.line_height_factor(), 1.4);

        let style = ElementStyle {
            line_height: Some("normal".into()),
            ..ElementStyle::default()
        };
        assert_eq!(style.line_height_factor(), 1.2);
    }

    #[test]
    fn weight_keywords() {
        let mut style = ElementStyle::default();
        assert_eq!(style.numeric_weight(), 400);
        style.apply(StyleProperty::FontWeight("bold".into()));
        assert_eq!(style.numeric_weight(), 700);
        style.apply(StyleProperty::FontWeight("800".into()));
        assert_eq!(style.numeric_weight(), 800);
    }
}
