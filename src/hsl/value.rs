use crate::color::{rgb_to_hsl, Rgba};
use crate::utils::round_to;

/// 编译期已知的 HSL 颜色。饱和度与亮度以百分数存储，透明度为 0..1。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorValue {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
    pub alpha: f64,
}

impl ColorValue {
    pub fn new(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Self {
        Self {
            hue,
            saturation,
            lightness,
            alpha,
        }
    }

    /// 由 RGB 颜色转换；饱和度、亮度取整，透明度保留两位小数。
    pub fn from_rgb(rgba: Rgba) -> Self {
        let (h, s, l) = rgb_to_hsl(rgba);
        Self {
            hue: (h * 360.0).rem_euclid(360.0),
            saturation: (s * 100.0).round(),
            lightness: (l * 100.0).round(),
            alpha: round_to(rgba.a, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_color;

    #[test]
    fn converts_rgb_literal() {
        let value = ColorValue::from_rgb(parse_color("#336699").unwrap());
        assert!((value.hue - 210.0).abs() < 1e-9);
        assert_eq!(value.saturation, 50.0);
        assert_eq!(value.lightness, 40.0);
        assert_eq!(value.alpha, 1.0);
    }

    #[test]
    fn rounds_alpha_to_two_places() {
        let value = ColorValue::from_rgb(parse_color("rgba(255, 0, 0, 0.333)").unwrap());
        assert_eq!(value.hue, 0.0);
        assert_eq!(value.saturation, 100.0);
        assert_eq!(value.lightness, 50.0);
        assert_eq!(value.alpha, 0.33);
    }

    #[test]
    fn grey_has_no_saturation() {
        let value = ColorValue::from_rgb(parse_color("#808080").unwrap());
        assert_eq!(value.saturation, 0.0);
        assert_eq!(value.lightness, 50.0);
    }
}
