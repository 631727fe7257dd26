//! 宿主编译器的 RGB 颜色模型与通用颜色函数。
//! 主题扩展只在遇到 HSL 颜色或 CSS 变量时接管，其余情况都落到这里。

use crate::utils::format_number;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }.clamp()
    }

    fn clamp(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// 相对亮度（WCAG 公式）。
    pub fn luma(self) -> f64 {
        fn linear(channel: f64) -> f64 {
            if channel <= 0.03928 {
                channel / 12.92
            } else {
                ((channel + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

pub fn parse_color(input: &str) -> Option<Rgba> {
    let trimmed = input.trim();
    if let Some(stripped) = trimmed.strip_prefix('#') {
        return parse_hex(stripped);
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("rgba") {
        return parse_rgb_function(&lowered, true);
    }
    if lowered.starts_with("rgb") {
        return parse_rgb_function(&lowered, false);
    }
    named_color(&lowered)
}

/// 常用颜色关键字。
pub fn named_color(name: &str) -> Option<Rgba> {
    let (r, g, b, a) = match name {
        "black" => (0, 0, 0, 1.0),
        "white" => (255, 255, 255, 1.0),
        "red" => (255, 0, 0, 1.0),
        "lime" => (0, 255, 0, 1.0),
        "green" => (0, 128, 0, 1.0),
        "blue" => (0, 0, 255, 1.0),
        "yellow" => (255, 255, 0, 1.0),
        "cyan" | "aqua" => (0, 255, 255, 1.0),
        "magenta" | "fuchsia" => (255, 0, 255, 1.0),
        "gray" | "grey" => (128, 128, 128, 1.0),
        "silver" => (192, 192, 192, 1.0),
        "orange" => (255, 165, 0, 1.0),
        "transparent" => (0, 0, 0, 0.0),
        _ => return None,
    };
    Some(from_channels(r, g, b, a))
}

pub fn from_channels(r: u8, g: u8, b: u8, a: f64) -> Rgba {
    Rgba::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, a)
}

pub fn lighten(color: Rgba, amount: f64) -> Rgba {
    let (h, s, l) = rgb_to_hsl(color);
    let new_l = (l + amount).clamp(0.0, 1.0);
    hsl_to_rgb(h, s, new_l, color.a)
}

pub fn darken(color: Rgba, amount: f64) -> Rgba {
    let (h, s, l) = rgb_to_hsl(color);
    let new_l = (l - amount).clamp(0.0, 1.0);
    hsl_to_rgb(h, s, new_l, color.a)
}

pub fn saturate(color: Rgba, amount: f64) -> Rgba {
    let (h, s, l) = rgb_to_hsl(color);
    hsl_to_rgb(h, (s + amount).clamp(0.0, 1.0), l, color.a)
}

pub fn desaturate(color: Rgba, amount: f64) -> Rgba {
    saturate(color, -amount)
}

pub fn greyscale(color: Rgba) -> Rgba {
    desaturate(color, 1.0)
}

/// 旋转色相，`degrees` 以角度为单位。
pub fn spin(color: Rgba, degrees: f64) -> Rgba {
    let (h, s, l) = rgb_to_hsl(color);
    let hue = (h * 360.0 + degrees).rem_euclid(360.0);
    hsl_to_rgb(hue / 360.0, s, l, color.a)
}

pub fn fade(color: Rgba, amount: f64) -> Rgba {
    Rgba {
        a: amount.clamp(0.0, 1.0),
        ..color
    }
    .clamp()
}

pub fn fadein(color: Rgba, amount: f64) -> Rgba {
    fade(color, color.a + amount)
}

pub fn fadeout(color: Rgba, amount: f64) -> Rgba {
    fade(color, color.a - amount)
}

/// 按权重混合两个颜色，`weight` 为第一个颜色所占比例 (0..1)。
pub fn mix(first: Rgba, second: Rgba, weight: f64) -> Rgba {
    let p = weight.clamp(0.0, 1.0);
    let w = p * 2.0 - 1.0;
    let a = first.a - second.a;
    let w1 = if (w * a + 1.0).abs() < f64::EPSILON {
        (w + 1.0) / 2.0
    } else {
        ((w + a) / (1.0 + w * a) + 1.0) / 2.0
    };
    let w2 = 1.0 - w1;
    Rgba::new(
        first.r * w1 + second.r * w2,
        first.g * w1 + second.g * w2,
        first.b * w1 + second.b * w2,
        first.a * p + second.a * (1.0 - p),
    )
}

pub fn tint(color: Rgba, weight: f64) -> Rgba {
    mix(Rgba::new(1.0, 1.0, 1.0, 1.0), color, weight)
}

pub fn shade(color: Rgba, weight: f64) -> Rgba {
    mix(Rgba::new(0.0, 0.0, 0.0, 1.0), color, weight)
}

/// 根据亮度在深浅两色之间选择。
pub fn contrast(color: Rgba, dark: Option<Rgba>, light: Option<Rgba>, threshold: f64) -> Rgba {
    let mut dark = dark.unwrap_or(Rgba::new(0.0, 0.0, 0.0, 1.0));
    let mut light = light.unwrap_or(Rgba::new(1.0, 1.0, 1.0, 1.0));
    if dark.luma() > light.luma() {
        std::mem::swap(&mut dark, &mut light);
    }
    if color.luma() < threshold {
        light
    } else {
        dark
    }
}

pub fn overlay(top: Rgba, bottom: Rgba) -> Rgba {
    color_blend(blend_overlay, top, bottom)
}

pub fn format_hex(color: Rgba) -> String {
    let c = color.clamp();
    format!(
        "#{:02x}{:02x}{:02x}",
        to_channel(c.r),
        to_channel(c.g),
        to_channel(c.b)
    )
}

pub fn format_rgba(color: Rgba) -> String {
    let c = color.clamp();
    let alpha = format_float(c.a);
    format!(
        "rgba({}, {}, {}, {})",
        to_channel(c.r),
        to_channel(c.g),
        to_channel(c.b),
        alpha
    )
}

/// RGB 通道值 (0..255)。
pub fn channel(value: f64) -> u8 {
    to_channel(value)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let r = hex_value(&digits[0..2])?;
    let g = hex_value(&digits[2..4])?;
    let b = hex_value(&digits[4..6])?;
    let a = match digits.get(6..8) {
        Some(alpha) => hex_value(alpha)? as f64 / 255.0,
        None => 1.0,
    };
    Some(from_channels(r, g, b, a))
}

fn parse_rgb_function(input: &str, has_alpha: bool) -> Option<Rgba> {
    let start = input.find('(')? + 1;
    let end = input.rfind(')')?;
    let body = &input[start..end];
    let parts: Vec<&str> = body.split(',').map(|s| s.trim()).collect();
    if (has_alpha && parts.len() != 4) || (!has_alpha && parts.len() != 3) {
        return None;
    }
    let r = parse_u8(parts[0])?;
    let g = parse_u8(parts[1])?;
    let b = parse_u8(parts[2])?;
    let a = if has_alpha {
        parse_alpha(parts[3])?
    } else {
        1.0
    };
    Some(from_channels(r, g, b, a))
}

fn parse_u8(input: &str) -> Option<u8> {
    input.parse().ok()
}

fn parse_alpha(input: &str) -> Option<f64> {
    if let Some(value) = input.strip_suffix('%') {
        let num: f64 = value.parse().ok()?;
        Some((num / 100.0).clamp(0.0, 1.0))
    } else {
        input.parse().ok().map(|v: f64| v.clamp(0.0, 1.0))
    }
}

fn color_blend<F>(mode: F, bottom: Rgba, top: Rgba) -> Rgba
where
    F: Fn(f64, f64) -> f64 + Copy,
{
    let ab = bottom.a;
    let at = top.a;
    let ar = at + ab * (1.0 - at);
    let bottom_channels = [bottom.r, bottom.g, bottom.b];
    let top_channels = [top.r, top.g, top.b];
    let mut result = [0.0; 3];
    for i in 0..3 {
        let cb = bottom_channels[i];
        let cs = top_channels[i];
        let mut cr = mode(cb, cs);
        if ar > 0.0 {
            cr = (at * cs + ab * (cb - at * (cb + cs - cr))) / ar;
        }
        result[i] = cr;
    }
    Rgba::new(result[0], result[1], result[2], ar)
}

fn blend_multiply(a: f64, b: f64) -> f64 {
    a * b
}

fn blend_screen(a: f64, b: f64) -> f64 {
    a + b - a * b
}

fn blend_overlay(base: f64, overlay: f64) -> f64 {
    if base <= 0.5 {
        blend_multiply(base * 2.0, overlay)
    } else {
        blend_screen(base * 2.0 - 1.0, overlay)
    }
}

fn hex_value(hex: &str) -> Option<u8> {
    u8::from_str_radix(hex, 16).ok()
}

/// RGB → HSL，三个分量均为 0..1 的小数。
pub fn rgb_to_hsl(color: Rgba) -> (f64, f64, f64) {
    let r = color.r;
    let g = color.g;
    let b = color.b;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    } / 6.0;

    (h, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64, alpha: f64) -> Rgba {
    if s <= 0.0 {
        return Rgba::new(l, l, l, alpha);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Rgba::new(r, g, b, alpha)
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    match t {
        _ if t < 1.0 / 6.0 => p + (q - p) * 6.0 * t,
        _ if t < 1.0 / 2.0 => q,
        _ if t < 2.0 / 3.0 => p + (q - p) * (2.0 / 3.0 - t) * 6.0,
        _ => p,
    }
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn format_float(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    format_number(rounded)
}
