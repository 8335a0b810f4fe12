//! Element and background mutators.
//!
//! Every mutator targets one element by id, merges its patch into that
//! element only and preserves list order. An unknown id is a silent no-op;
//! the return value only says whether anything was touched.

use serde::{Deserialize, Serialize};

use crate::model::{BackgroundProperty, Position, Size, StyleProperty, TemplateLayout};

/// Horizontal margin used by the quick-align actions, in native units.
const QUICK_ALIGN_MARGIN: f64 = 20.0;

pub fn set_style(layout: &mut TemplateLayout, id: &str, property: StyleProperty) -> bool {
    match layout.element_mut(id) {
        Some(el) => {
            el.style.apply(property);
            true
        }
        None => false,
    }
}

/// Move an element. Coordinates are not validated.
pub fn set_position(layout: &mut TemplateLayout, id: &str, position: Position) -> bool {
    match layout.element_mut(id) {
        Some(el) => {
            el.position = position;
            true
        }
        None => false,
    }
}

/// Resize an element. Sizes are not validated.
pub fn set_size(layout: &mut TemplateLayout, id: &str, size: Size) -> bool {
    match layout.element_mut(id) {
        Some(el) => {
            el.size = size;
            true
        }
        None => false,
    }
}

pub fn set_locked(layout: &mut TemplateLayout, id: &str, locked: bool) -> bool {
    match layout.element_mut(id) {
        Some(el) => {
            el.locked = locked;
            true
        }
        None => false,
    }
}

pub fn set_background(layout: &mut TemplateLayout, property: BackgroundProperty) {
    layout.background_style.apply(property);
}

// ============================================================================
// NUMERIC TEXT ENTRY
// ============================================================================

/// Which geometry box a numeric text field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericInput {
    X,
    Y,
    Width,
    Height,
}

impl NumericInput {
    /// Value used when the typed text is not a usable number.
    pub fn fallback(self) -> f64 {
        match self {
            NumericInput::X | NumericInput::Y => 0.0,
            NumericInput::Width => 50.0,
            NumericInput::Height => 20.0,
        }
    }
}

/// Parse the leading integer of `text` (`"12px"` → 12, `" -7"` → -7).
///
/// Text without a leading integer, or one that parses to zero, yields
/// `fallback`.
pub fn parse_numeric_input(text: &str, fallback: f64) -> f64 {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<f64>() {
        Ok(n) if n != 0.0 => sign * n,
        _ => fallback,
    }
}

/// Apply one numeric text field to an element, keeping the other axis.
pub fn set_numeric_input(
    layout: &mut TemplateLayout,
    id: &str,
    input: NumericInput,
    text: &str,
) -> bool {
    let Some(el) = layout.element_mut(id) else {
        return false;
    };
    let value = parse_numeric_input(text, input.fallback());
    match input {
        NumericInput::X => el.position.x = value,
        NumericInput::Y => el.position.y = value,
        NumericInput::Width => el.size.width = value,
        NumericInput::Height => el.size.height = value,
    }
    true
}

// ============================================================================
// QUICK ACTIONS
// ============================================================================

/// One-click placement shortcuts for the selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuickAlign {
    Left,
    Center,
    Right,
    Top,
}

/// Position an element would get from a quick action. Only one axis changes.
pub fn quick_align_position(layout: &TemplateLayout, id: &str, align: QuickAlign) -> Option<Position> {
    let el = layout.element(id)?;
    let native_width = layout.display_size.width as f64;
    let Position { x, y } = el.position;

    Some(match align {
        QuickAlign::Left => Position::new(QUICK_ALIGN_MARGIN, y),
        QuickAlign::Center => Position::new(native_width / 2.0 - el.size.width / 2.0, y),
        QuickAlign::Right => Position::new(native_width - QUICK_ALIGN_MARGIN - el.size.width, y),
        QuickAlign::Top => Position::new(x, QUICK_ALIGN_MARGIN),
    })
}

pub fn quick_align(layout: &mut TemplateLayout, id: &str, align: QuickAlign) -> bool {
    match quick_align_position(layout, id, align) {
        Some(position) => set_position(layout, id, position),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn square() -> TemplateLayout {
        Catalog::builtin().by_id("square").unwrap().clone()
    }

    #[test]
    fn patches_touch_only_the_target_element() {
        let mut layout = square();
        let before = layout.clone();

        assert!(set_position(&mut layout, "price", Position::new(1.0, 2.0)));
        assert!(set_size(&mut layout, "price", Size::new(3.0, 4.0)));
        assert!(set_locked(&mut layout, "price", true));
        assert!(set_style(&mut layout, "price", StyleProperty::Color("#000".into())));

        for (after, orig) in layout.elements.iter().zip(&before.elements) {
            assert_eq!(after.id, orig.id, "order must be preserved");
            if after.id != "price" {
                assert_eq!(after, orig);
            }
        }
        let price = layout.element("price").unwrap();
        assert_eq!(price.position, Position::new(1.0, 2.0));
        assert_eq!(price.size, Size::new(3.0, 4.0));
        assert!(price.locked);
        assert_eq!(price.style.color, "#000");
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let mut layout = square();
        let before = layout.clone();
        assert!(!set_position(&mut layout, "nope", Position::new(9.0, 9.0)));
        assert!(!set_style(&mut layout, "nope", StyleProperty::FontSize(99.0)));
        assert!(!set_numeric_input(&mut layout, "nope", NumericInput::X, "5"));
        assert!(!quick_align(&mut layout, "nope", QuickAlign::Top));
        assert_eq!(layout, before);
    }

    #[test]
    fn direct_geometry_is_unchecked() {
        let mut layout = square();
        set_position(&mut layout, "title", Position::new(-500.0, 9000.0));
        set_size(&mut layout, "title", Size::new(0.0, -1.0));
        let title = layout.element("title").unwrap();
        assert_eq!(title.position, Position::new(-500.0, 9000.0));
        assert_eq!(title.size, Size::new(0.0, -1.0));
    }

    #[test]
    fn numeric_input_follows_leading_integer_rules() {
        assert_eq!(parse_numeric_input("42", 0.0), 42.0);
        assert_eq!(parse_numeric_input("  12px", 0.0), 12.0);
        assert_eq!(parse_numeric_input("-7.9", 0.0), -7.0);
        assert_eq!(parse_numeric_input("abc", 50.0), 50.0);
        assert_eq!(parse_numeric_input("", 20.0), 20.0);
        assert_eq!(parse_numeric_input("0", 50.0), 50.0);
        assert_eq!(parse_numeric_input("-", 3.0), 3.0);
    }

    #[test]
    fn malformed_numeric_input_uses_field_defaults() {
        let mut layout = square();
        set_numeric_input(&mut layout, "price", NumericInput::X, "oops");
        set_numeric_input(&mut layout, "price", NumericInput::Width, "wide");
        set_numeric_input(&mut layout, "price", NumericInput::Height, "");
        let price = layout.element("price").unwrap();
        assert_eq!(price.position, Position::new(0.0, 130.0));
        assert_eq!(price.size, Size::new(50.0, 20.0));
    }

    #[test]
    fn quick_actions_move_one_axis() {
        let mut layout = square();
        // price: (150, 130), 100 wide, on a 400-wide native canvas
        quick_align(&mut layout, "price", QuickAlign::Left);
        assert_eq!(layout.element("price").unwrap().position, Position::new(20.0, 130.0));
        quick_align(&mut layout, "price", QuickAlign::Center);
        assert_eq!(layout.element("price").unwrap().position, Position::new(150.0, 130.0));
        quick_align(&mut layout, "price", QuickAlign::Right);
        assert_eq!(layout.element("price").unwrap().position, Position::new(280.0, 130.0));
        quick_align(&mut layout, "price", QuickAlign::Top);
        assert_eq!(layout.element("price").unwrap().position, Position::new(280.0, 20.0));
    }

    #[test]
    fn quick_actions_use_the_layout_width() {
        let mut story = Catalog::builtin().by_id("story").unwrap().clone();
        // price is 55 wide on a 225-wide native canvas
        quick_align(&mut story, "price", QuickAlign::Right);
        assert_eq!(story.element("price").unwrap().position.x, 150.0);

        // a fixed 400-wide canvas would put it at 325, past the right edge
        let mut portrait = Catalog::builtin().by_id("portrait").unwrap().clone();
        quick_align(&mut portrait, "price", QuickAlign::Center);
        assert_eq!(portrait.element("price").unwrap().position, Position::new(125.0, 20.0));
        quick_align(&mut portrait, "price", QuickAlign::Right);
        assert_eq!(portrait.element("price").unwrap().position, Position::new(230.0, 20.0));
        let el = portrait.element("price").unwrap();
        assert!(el.position.x + el.size.width <= portrait.display_size.width as f64);
    }
}
