use crate::ir::Size;

/// Font size of the name label drawn on every node box.
pub const LABEL_FONT_SIZE: f32 = 11.0;
/// Horizontal room around the name label.
pub const LABEL_PADDING: f32 = 35.0;
pub const NODE_HEIGHT: f32 = 34.0;

// Bold glyphs run a little wider than the regular widths below.
const BOLD_FACTOR: f32 = 1.06;

/// Box size for a node showing `name` in bold 11px sans-serif.
pub fn measure_label(name: &str) -> Size {
    Size {
        width: label_width(name, LABEL_FONT_SIZE) + LABEL_PADDING,
        height: NODE_HEIGHT,
    }
}

pub fn label_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size * BOLD_FACTOR
}

// Per-character advance as a fraction of the font size, for a typical
// sans-serif face.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.28,
        '.' | ',' | ':' | ';' | '\'' | '|' | '!' | 'i' | 'j' | 'l' | 'I' => 0.25,
        'f' | 'r' | 't' | '(' | ')' | '[' | ']' | '-' => 0.34,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '#' | '%' | '&' => 0.9,
        'A'..='Z' => 0.67,
        'a'..='z' => 0.56,
        '0'..='9' => 0.58,
        _ if ch.is_alphabetic() => 0.6,
        _ => 0.56,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wider_names_get_wider_boxes() {
        let short = measure_label("Al");
        let long = measure_label("Maximilian Wolfgang");
        assert!(long.width > short.width);
        assert_eq!(short.height, NODE_HEIGHT);
        assert_eq!(long.height, NODE_HEIGHT);
    }

    #[test]
    fn empty_label_keeps_padding() {
        assert_eq!(measure_label("").width, LABEL_PADDING);
    }
}
