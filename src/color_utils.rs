// File: src/color_utils.rs
use crate::model::Priority;

pub type Rgb = (u8, u8, u8);

pub const RED: Rgb = (244, 67, 54);
pub const AMBER: Rgb = (255, 193, 7);
pub const GREEN_400: Rgb = (102, 187, 106);
/// Used for anything we can't classify.
pub const GREY_700: Rgb = (97, 97, 97);

/// Colour of the priority marker shown next to a task.
pub fn priority_color(priority: Option<Priority>) -> Rgb {
    match priority {
        Some(Priority::VeryImportant) => RED,
        Some(Priority::Important) => AMBER,
        Some(Priority::LessImportant) => GREEN_400,
        None => GREY_700,
    }
}

/// Determines if text on top of this color should be white.
pub fn is_dark((r, g, b): Rgb) -> bool {
    let brightness = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    brightness < 128.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_priority_has_its_own_color() {
        let colors: Vec<Rgb> = Priority::ALL.iter().map(|p| priority_color(Some(*p))).collect();
        assert_eq!(colors, vec![RED, AMBER, GREEN_400]);
        assert_eq!(priority_color(None), GREY_700);
    }

    #[test]
    fn text_contrast() {
        assert!(is_dark(GREY_700));
        assert!(!is_dark(AMBER));
    }
}
