/// 压缩多余空白字符，主要用于输出压缩模式。
pub fn collapse_whitespace(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(ch);
            last_was_space = false;
        }
    }
    result.trim().to_string()
}

/// 保持相对缩进的辅助函数。
pub fn indent(level: usize) -> String {
    const INDENT: &str = "  ";
    (0..level).map(|_| INDENT).collect()
}

/// 格式化数值：最多保留四位小数并去掉多余的 0。
pub fn format_number(value: f64) -> String {
    let mut value = value;
    if value.abs() < 1e-9 {
        value = 0.0;
    }
    let mut formatted = format!("{value:.4}");
    while formatted.contains('.') && formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }
    if formatted == "-0" {
        formatted = "0".to_string();
    }
    formatted
}

/// 四舍五入到指定小数位。
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}
