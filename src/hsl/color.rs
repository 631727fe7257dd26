use super::calc::Component;
use super::value::ColorValue;
use super::variable::{Channel, VariableRef};
use crate::serializer::Output;
use crate::utils::{format_number, round_to};

/// 四分量颜色表达式。每个分量可以是字面量、变量分量或 `calc()`。
///
/// 全部为字面量时等价于 [`ColorValue`]；全部指向同一变量的对应分量时，
/// 输出会折叠回 `var(--name)`。
#[derive(Debug, Clone, PartialEq)]
pub struct HslColor {
    hue: Component,
    saturation: Component,
    lightness: Component,
    alpha: Component,
}

impl HslColor {
    pub fn new(
        hue: Component,
        saturation: Component,
        lightness: Component,
        alpha: Component,
    ) -> Self {
        Self {
            hue,
            saturation,
            lightness,
            alpha,
        }
    }

    pub fn from_value(value: ColorValue) -> Self {
        Self::new(
            Component::number(value.hue),
            Component::percent(value.saturation),
            Component::percent(value.lightness),
            Component::number(value.alpha),
        )
    }

    /// 把整个变量拆成四个分量引用。
    pub fn from_variable(reference: &VariableRef) -> Self {
        let slice = |channel| Component::Var(reference.with_channel(Some(channel)));
        Self::new(
            slice(Channel::Hue),
            slice(Channel::Saturation),
            slice(Channel::Lightness),
            slice(Channel::Alpha),
        )
    }

    pub fn component(&self, channel: Channel) -> &Component {
        match channel {
            Channel::Hue => &self.hue,
            Channel::Saturation => &self.saturation,
            Channel::Lightness => &self.lightness,
            Channel::Alpha => &self.alpha,
        }
    }

    pub fn with_component(&self, channel: Channel, value: Component) -> Self {
        let mut next = self.clone();
        match channel {
            Channel::Hue => next.hue = value,
            Channel::Saturation => next.saturation = value,
            Channel::Lightness => next.lightness = value,
            Channel::Alpha => next.alpha = value,
        }
        next
    }

    /// 以旧分量为输入计算新分量。
    pub fn map_component<F>(&self, channel: Channel, f: F) -> Self
    where
        F: FnOnce(Component) -> Component,
    {
        let current = self.component(channel).clone();
        self.with_component(channel, f(current))
    }

    pub fn as_value(&self) -> Option<ColorValue> {
        Some(ColorValue::new(
            self.hue.as_literal()?.value,
            self.saturation.as_literal()?.value,
            self.lightness.as_literal()?.value,
            self.alpha.as_literal()?.value,
        ))
    }

    /// 四个分量都是同一变量的对应分量时返回整体引用。
    pub fn shared_variable(&self) -> Option<VariableRef> {
        let hue = self.hue.as_variable()?;
        let shared = Channel::ALL.iter().all(|&channel| {
            self.component(channel)
                .as_variable()
                .map_or(false, |reference| {
                    reference.name() == hue.name() && reference.channel() == Some(channel)
                })
        });
        shared.then(|| hue.with_channel(None))
    }

    pub fn is_simple(&self) -> bool {
        self.as_value().is_some() || self.shared_variable().is_some()
    }

    pub fn is_deferred(&self) -> bool {
        self.as_value().is_none()
    }

    pub fn gen_css(&self, output: &mut Output) {
        if let Some(reference) = self.shared_variable() {
            reference.gen_css(output);
            return;
        }
        if let Some(value) = self.as_value() {
            Self::gen_value(value, output);
            return;
        }

        let opaque = self
            .alpha
            .as_literal()
            .map_or(false, |alpha| alpha.value == 1.0);
        let channels: &[Channel] = if opaque {
            &Channel::ALL[..3]
        } else {
            &Channel::ALL
        };

        output.add("hsl(");
        output.indent_in();
        for (idx, &channel) in channels.iter().enumerate() {
            if idx > 0 {
                output.push(',');
            }
            output.newline();
            self.component(channel).gen_css(output);
        }
        output.indent_out();
        output.newline();
        output.push(')');
    }

    fn gen_value(value: ColorValue, output: &mut Output) {
        // 先按输出精度取整再取模，避免 359.99996 输出成 360。
        let hue = round_to(value.hue, 4).rem_euclid(360.0);
        let saturation = value.saturation.clamp(0.0, 100.0);
        let lightness = value.lightness.clamp(0.0, 100.0);
        let alpha = value.alpha.clamp(0.0, 1.0);

        output.add("hsl(");
        output.add(&format_number(hue));
        output.separator();
        output.add(&format_number(saturation));
        output.push('%');
        output.separator();
        output.add(&format_number(lightness));
        output.push('%');
        if alpha != 1.0 {
            output.separator();
            output.add(&format_number(alpha));
        }
        output.push(')');
    }

    pub fn to_css(&self, compress: bool) -> String {
        let mut output = Output::new(compress);
        self.gen_css(&mut output);
        output.into_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn brand() -> VariableRef {
        VariableRef::new("brand", None)
    }

    #[test]
    fn hue_is_rounded_before_wrapping() {
        let color = HslColor::from_value(ColorValue::new(359.99996, 10.0, 10.0, 1.0));
        assert_eq!(color.to_css(false), "hsl(0, 10%, 10%)");

        let negative = HslColor::from_value(ColorValue::new(-30.0, 10.0, 10.0, 1.0));
        assert_eq!(negative.to_css(true), "hsl(330,10%,10%)");
    }

    #[test]
    fn constant_color_omits_opaque_alpha() {
        let color = HslColor::from_value(ColorValue::new(200.0, 50.0, 60.0, 1.0));
        assert_eq!(color.to_css(false), "hsl(200, 50%, 60%)");
        assert_eq!(color.to_css(true), "hsl(200,50%,60%)");

        let translucent = color.with_component(Channel::Alpha, Component::number(0.5));
        assert_eq!(translucent.to_css(false), "hsl(200, 50%, 60%, 0.5)");
    }

    #[test]
    fn constant_color_normalizes_on_output() {
        let color = HslColor::from_value(ColorValue::new(370.0, 120.0, -5.0, 1.4));
        assert_eq!(color.to_css(false), "hsl(10, 100%, 0%)");
    }

    #[test]
    fn unmodified_variable_collapses_to_shorthand() {
        let color = HslColor::from_variable(&VariableRef::new("theme", None));
        assert!(color.is_simple());
        assert_eq!(color.to_css(false), "var(--theme)");
    }

    #[test]
    fn altered_variable_is_spelled_out_per_line() {
        let color = HslColor::from_variable(&brand())
            .map_component(Channel::Lightness, |l| l.add(Component::percent(10.0)));
        assert!(!color.is_simple());
        assert_eq!(
            color.to_css(false),
            "hsl(\n  var(--brand--h),\n  var(--brand--s),\n  calc(var(--brand--l) + 10%),\n  var(--brand--a)\n)"
        );
        assert_eq!(
            color.to_css(true),
            "hsl(var(--brand--h),var(--brand--s),calc(var(--brand--l) + 10%),var(--brand--a))"
        );
    }

    #[test]
    fn swapped_channels_are_not_shorthand() {
        let color = HslColor::from_variable(&brand()).with_component(
            Channel::Hue,
            Component::Var(brand().with_channel(Some(Channel::Lightness))),
        );
        assert!(color.shared_variable().is_none());
    }
}
