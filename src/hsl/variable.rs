use crate::serializer::Output;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Display};

/// HSL 的四个分量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Hue,
    Saturation,
    Lightness,
    Alpha,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Hue,
        Channel::Saturation,
        Channel::Lightness,
        Channel::Alpha,
    ];

    pub fn letter(self) -> char {
        match self {
            Channel::Hue => 'h',
            Channel::Saturation => 's',
            Channel::Lightness => 'l',
            Channel::Alpha => 'a',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'h' => Some(Channel::Hue),
            's' => Some(Channel::Saturation),
            'l' => Some(Channel::Lightness),
            'a' => Some(Channel::Alpha),
            _ => None,
        }
    }
}

/// 对运行时 CSS 变量的引用，可选地指向其中一个 HSL 分量。
///
/// `--brand` 表示整个颜色，`--brand--l` 表示它的亮度分量。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableRef {
    name: String,
    channel: Option<Channel>,
}

impl VariableRef {
    pub fn new<S: Into<String>>(name: S, channel: Option<Channel>) -> Self {
        Self {
            name: name.into(),
            channel,
        }
    }

    /// 解析 `var()` 的唯一参数；不符合 `--name[--h|s|l|a]` 的返回 `None`。
    pub fn parse(argument: &str) -> Option<Self> {
        static VAR_ARG_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^--([A-Za-z0-9_-]+?)(?:--([hslaHSLA]))?$").expect("变量参数正则编译失败")
        });

        let caps = VAR_ARG_RE.captures(argument.trim())?;
        let name = caps.get(1)?.as_str();
        let channel = match caps.get(2) {
            Some(letter) => Some(Channel::from_letter(letter.as_str().chars().next()?)?),
            None => None,
        };
        Some(Self::new(name, channel))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }

    pub fn is_whole(&self) -> bool {
        self.channel.is_none()
    }

    /// 返回指向另一个分量（或整个变量）的新引用。
    pub fn with_channel(&self, channel: Option<Channel>) -> Self {
        Self::new(self.name.clone(), channel)
    }

    /// 自定义属性名，例如 `--brand--h`。
    pub fn property(&self) -> String {
        match self.channel {
            Some(channel) => format!("--{}--{}", self.name, channel.letter()),
            None => format!("--{}", self.name),
        }
    }

    pub fn gen_css(&self, output: &mut Output) {
        output.add("var(");
        output.add(&self.property());
        output.add(")");
    }
}

impl Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var({})", self.property())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_component_references() {
        let whole = VariableRef::parse("--brand").unwrap();
        assert_eq!(whole.name(), "brand");
        assert!(whole.is_whole());

        let hue = VariableRef::parse("--brand--h").unwrap();
        assert_eq!(hue.name(), "brand");
        assert_eq!(hue.channel(), Some(Channel::Hue));

        let upper = VariableRef::parse("--brand-dark--L").unwrap();
        assert_eq!(upper.name(), "brand-dark");
        assert_eq!(upper.channel(), Some(Channel::Lightness));
    }

    #[test]
    fn unknown_component_stays_in_the_name() {
        let reference = VariableRef::parse("--panel--x").unwrap();
        assert_eq!(reference.name(), "panel--x");
        assert!(reference.is_whole());
    }

    #[test]
    fn rejects_non_custom_property_arguments() {
        assert!(VariableRef::parse("brand").is_none());
        assert!(VariableRef::parse("--brand, red").is_none());
        assert!(VariableRef::parse("--").is_none());
    }

    #[test]
    fn with_channel_returns_new_reference() {
        let whole = VariableRef::parse("--theme").unwrap();
        let alpha = whole.with_channel(Some(Channel::Alpha));
        assert_eq!(alpha.to_string(), "var(--theme--a)");
        assert_eq!(whole.to_string(), "var(--theme)");
        assert_eq!(alpha.with_channel(None), whole);
    }
}
