//! 颜色函数目录与分发。
//!
//! 每个变换都只用分量上的加、减、乘表达，所以同一份实现既能在编译期折叠常量，
//! 也能为运行时变量生成等价的 `calc()` 表达式。

use super::calc::{CalcExpr, Component};
use super::color::HslColor;
use super::value::ColorValue;
use super::variable::{Channel, VariableRef};
use crate::ast::{Dimension, Location, Node};
use crate::color::Rgba;
use crate::error::{LessError, LessResult};
use crate::evaluator::Environment;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFunction {
    Hsl,
    Hue,
    Saturation,
    Lightness,
    Alpha,
    Red,
    Green,
    Blue,
    Saturate,
    Desaturate,
    Lighten,
    Darken,
    Diminish,
    Intensify,
    FadeIn,
    FadeOut,
    Fade,
    Spin,
    Mix,
    Tint,
    Shade,
    Greyscale,
    Contrast,
}

impl ColorFunction {
    pub const ALL: [ColorFunction; 23] = [
        ColorFunction::Hsl,
        ColorFunction::Hue,
        ColorFunction::Saturation,
        ColorFunction::Lightness,
        ColorFunction::Alpha,
        ColorFunction::Red,
        ColorFunction::Green,
        ColorFunction::Blue,
        ColorFunction::Saturate,
        ColorFunction::Desaturate,
        ColorFunction::Lighten,
        ColorFunction::Darken,
        ColorFunction::Diminish,
        ColorFunction::Intensify,
        ColorFunction::FadeIn,
        ColorFunction::FadeOut,
        ColorFunction::Fade,
        ColorFunction::Spin,
        ColorFunction::Mix,
        ColorFunction::Tint,
        ColorFunction::Shade,
        ColorFunction::Greyscale,
        ColorFunction::Contrast,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "hsl" => ColorFunction::Hsl,
            "hue" => ColorFunction::Hue,
            "saturation" => ColorFunction::Saturation,
            "lightness" => ColorFunction::Lightness,
            "alpha" => ColorFunction::Alpha,
            "red" => ColorFunction::Red,
            "green" => ColorFunction::Green,
            "blue" => ColorFunction::Blue,
            "saturate" => ColorFunction::Saturate,
            "desaturate" => ColorFunction::Desaturate,
            "lighten" => ColorFunction::Lighten,
            "darken" => ColorFunction::Darken,
            "xf-diminish" => ColorFunction::Diminish,
            "xf-intensify" => ColorFunction::Intensify,
            "fadein" => ColorFunction::FadeIn,
            "fadeout" => ColorFunction::FadeOut,
            "fade" => ColorFunction::Fade,
            "spin" => ColorFunction::Spin,
            "mix" => ColorFunction::Mix,
            "tint" => ColorFunction::Tint,
            "shade" => ColorFunction::Shade,
            "greyscale" => ColorFunction::Greyscale,
            "contrast" => ColorFunction::Contrast,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorFunction::Hsl => "hsl",
            ColorFunction::Hue => "hue",
            ColorFunction::Saturation => "saturation",
            ColorFunction::Lightness => "lightness",
            ColorFunction::Alpha => "alpha",
            ColorFunction::Red => "red",
            ColorFunction::Green => "green",
            ColorFunction::Blue => "blue",
            ColorFunction::Saturate => "saturate",
            ColorFunction::Desaturate => "desaturate",
            ColorFunction::Lighten => "lighten",
            ColorFunction::Darken => "darken",
            ColorFunction::Diminish => "xf-diminish",
            ColorFunction::Intensify => "xf-intensify",
            ColorFunction::FadeIn => "fadein",
            ColorFunction::FadeOut => "fadeout",
            ColorFunction::Fade => "fade",
            ColorFunction::Spin => "spin",
            ColorFunction::Mix => "mix",
            ColorFunction::Tint => "tint",
            ColorFunction::Shade => "shade",
            ColorFunction::Greyscale => "greyscale",
            ColorFunction::Contrast => "contrast",
        }
    }

    /// 允许的参数个数范围（闭区间）。
    fn arity(self) -> (usize, usize) {
        match self {
            ColorFunction::Hsl => (3, 4),
            ColorFunction::Hue
            | ColorFunction::Saturation
            | ColorFunction::Lightness
            | ColorFunction::Alpha
            | ColorFunction::Red
            | ColorFunction::Green
            | ColorFunction::Blue
            | ColorFunction::Greyscale => (1, 1),
            ColorFunction::Tint | ColorFunction::Shade => (1, 2),
            ColorFunction::Mix => (2, 3),
            ColorFunction::Contrast => (1, 4),
            _ => (2, 2),
        }
    }
}

/// 分发结果。`NotHandled` 表示交还给宿主的通用调用。
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Color(HslColor),
    Scalar(Component),
    NotHandled,
}

impl Dispatch {
    pub fn into_node(self, location: &Location) -> Option<Node> {
        match self {
            Dispatch::Color(color) => Some(Node::HslColor(color)),
            Dispatch::Scalar(component) => Some(component.into_node(location)),
            Dispatch::NotHandled => None,
        }
    }
}

/// 数值参数的换算方式。
#[derive(Debug, Clone, Copy)]
enum Amount {
    /// 饱和度/亮度：`10%` 与 `10` 都是 10 个百分点。
    Percent,
    /// 透明度：`10%` 换算为 0.1，无单位数值原样使用。
    Fraction,
    /// 色相：角度，单位被丢弃。
    Angle,
    /// 权重：按 LESS 的约定除以 100。
    Weight,
}

impl Amount {
    fn convert(self, dimension: &Dimension) -> Component {
        match self {
            Amount::Percent => Component::percent(dimension.value),
            Amount::Fraction if dimension.is_percentage() => {
                Component::number(dimension.value / 100.0)
            }
            Amount::Fraction | Amount::Angle => Component::number(dimension.value),
            Amount::Weight => Component::number(dimension.value / 100.0),
        }
    }
}

#[derive(Debug)]
enum Operand<'a> {
    Color(&'a HslColor),
    Variable(&'a VariableRef),
    Calc(&'a CalcExpr),
    Dimension(&'a Dimension),
    Rgb(Rgba),
    Other,
}

impl<'a> Operand<'a> {
    fn classify(node: &'a Node) -> Self {
        match node {
            Node::HslColor(color) => Operand::Color(color),
            Node::HslColorVariable(variable) => Operand::Variable(variable.reference()),
            Node::Calc(calc) => Operand::Calc(calc),
            Node::Dimension(dimension) => Operand::Dimension(dimension),
            Node::Color(color) => Operand::Rgb(color.rgba),
            _ => Operand::Other,
        }
    }

    fn belongs_to_engine(&self) -> bool {
        matches!(
            self,
            Operand::Color(_) | Operand::Variable(_) | Operand::Calc(_)
        )
    }

    fn scalar(&self, amount: Amount) -> Option<Component> {
        match self {
            Operand::Dimension(dimension) => Some(amount.convert(dimension)),
            Operand::Variable(reference) => Some(Component::Var((*reference).clone())),
            Operand::Calc(calc) => Some(Component::Calc((*calc).clone())),
            _ => None,
        }
    }
}

/// 已编译参数的类型化视图，负责参数校验与类型错误。
struct Arguments<'a> {
    function: ColorFunction,
    operands: Vec<Operand<'a>>,
    location: &'a Location,
}

impl<'a> Arguments<'a> {
    fn color(&self, idx: usize) -> LessResult<HslColor> {
        match self.operands.get(idx) {
            Some(Operand::Color(color)) => Ok((*color).clone()),
            Some(Operand::Variable(reference)) if reference.is_whole() => {
                Ok(HslColor::from_variable(reference))
            }
            Some(Operand::Rgb(rgba)) => Ok(HslColor::from_value(ColorValue::from_rgb(*rgba))),
            _ => Err(self.error(idx, "必须是颜色")),
        }
    }

    fn amount(&self, idx: usize, amount: Amount) -> LessResult<Component> {
        self.operands
            .get(idx)
            .and_then(|operand| operand.scalar(amount))
            .ok_or_else(|| self.error(idx, "必须是数值或变量"))
    }

    fn optional(&self, idx: usize, amount: Amount, default: Component) -> LessResult<Component> {
        if idx < self.operands.len() {
            self.amount(idx, amount)
        } else {
            Ok(default)
        }
    }

    fn error(&self, idx: usize, message: &str) -> LessError {
        LessError::type_error(
            self.function.name(),
            format!("的第 {} 个参数{message}", idx + 1),
            self.location,
        )
    }
}

/// 对已编译的参数执行颜色函数。
///
/// 只要有一个参数是引擎颜色、主题变量或 `calc()`，调用就由引擎接管，
/// 包括同名的 CSS 滤镜函数：`saturate(var(--amount))` 会报参数个数错误，
/// `contrast(var(--x))` 会得到 `hsl(...)` 表达式。
pub fn dispatch(
    function: ColorFunction,
    args: &[Node],
    env: &Environment,
    location: &Location,
) -> LessResult<Dispatch> {
    let operands: Vec<Operand<'_>> = args.iter().map(Operand::classify).collect();

    if function == ColorFunction::Hsl {
        return Ok(construct_hsl(&operands));
    }

    if !operands.iter().any(Operand::belongs_to_engine) {
        debug!(function = function.name(), "没有主题颜色参数，交给通用调用");
        return Ok(Dispatch::NotHandled);
    }

    let (min, max) = function.arity();
    if args.len() < min || args.len() > max {
        return Err(LessError::type_error(
            function.name(),
            format!("需要 {min} 到 {max} 个参数，实际 {} 个", args.len()),
            location,
        ));
    }

    let args = Arguments {
        function,
        operands,
        location,
    };
    let result = apply(&args, env)?;
    if let Dispatch::Color(color) = &result {
        debug!(
            function = function.name(),
            deferred = color.is_deferred(),
            "主题颜色函数已求值"
        );
    }
    Ok(result)
}

/// `hsl(h, s, l[, a])`：参数都能作为分量时构造颜色，否则交还宿主。
fn construct_hsl(operands: &[Operand<'_>]) -> Dispatch {
    if operands.len() < 3 || operands.len() > 4 {
        return Dispatch::NotHandled;
    }
    let alpha = match operands.get(3) {
        Some(operand) => operand.scalar(Amount::Fraction),
        None => Some(Component::number(1.0)),
    };
    let components = (
        operands[0].scalar(Amount::Angle),
        operands[1].scalar(Amount::Percent),
        operands[2].scalar(Amount::Percent),
        alpha,
    );
    match components {
        (Some(hue), Some(saturation), Some(lightness), Some(alpha)) => {
            Dispatch::Color(HslColor::new(hue, saturation, lightness, alpha))
        }
        _ => Dispatch::NotHandled,
    }
}

fn apply(args: &Arguments<'_>, env: &Environment) -> LessResult<Dispatch> {
    use ColorFunction::*;

    let adjusted = |channel: Channel, delta: Component, add: bool| -> LessResult<Dispatch> {
        let color = args.color(0)?;
        Ok(Dispatch::Color(color.map_component(channel, |current| {
            if add {
                current.add(delta)
            } else {
                current.sub(delta)
            }
        })))
    };

    let result = match args.function {
        Hsl => construct_hsl(&args.operands),
        Hue => Dispatch::Scalar(args.color(0)?.component(Channel::Hue).clone()),
        Saturation => Dispatch::Scalar(args.color(0)?.component(Channel::Saturation).clone()),
        Lightness => Dispatch::Scalar(args.color(0)?.component(Channel::Lightness).clone()),
        Alpha => Dispatch::Scalar(args.color(0)?.component(Channel::Alpha).clone()),
        Red | Green | Blue => {
            // HSL 表示无法回答 RGB 通道，统一返回 0。
            args.color(0)?;
            Dispatch::Scalar(Component::number(0.0))
        }
        Saturate => adjusted(Channel::Saturation, args.amount(1, Amount::Percent)?, true)?,
        Desaturate => adjusted(Channel::Saturation, args.amount(1, Amount::Percent)?, false)?,
        Lighten => adjusted(Channel::Lightness, args.amount(1, Amount::Percent)?, true)?,
        Darken => adjusted(Channel::Lightness, args.amount(1, Amount::Percent)?, false)?,
        Diminish | Intensify => {
            let scale = Component::Var(VariableRef::new(env.color_adjust_variable(), None));
            let delta = args.amount(1, Amount::Percent)?.mul(scale);
            adjusted(Channel::Lightness, delta, args.function == Diminish)?
        }
        FadeIn => adjusted(Channel::Alpha, args.amount(1, Amount::Fraction)?, true)?,
        FadeOut => adjusted(Channel::Alpha, args.amount(1, Amount::Fraction)?, false)?,
        Fade => {
            let alpha = args.amount(1, Amount::Fraction)?;
            Dispatch::Color(args.color(0)?.with_component(Channel::Alpha, alpha))
        }
        Spin => adjusted(Channel::Hue, args.amount(1, Amount::Angle)?, true)?,
        Mix => {
            let first = args.color(0)?;
            let second = args.color(1)?;
            let weight = args.optional(2, Amount::Weight, Component::number(0.5))?;
            let rest = Component::number(1.0).sub(weight.clone());
            let blend = |channel: Channel| {
                first
                    .component(channel)
                    .clone()
                    .mul(weight.clone())
                    .add(second.component(channel).clone().mul(rest.clone()))
            };
            Dispatch::Color(HslColor::new(
                blend(Channel::Hue),
                blend(Channel::Saturation),
                blend(Channel::Lightness),
                blend(Channel::Alpha),
            ))
        }
        Tint => {
            let color = args.color(0)?;
            let weight = args.optional(1, Amount::Weight, Component::number(0.5))?;
            let rest = Component::number(1.0).sub(weight.clone());
            let tinted = color
                .map_component(Channel::Saturation, |s| s.mul(rest.clone()))
                .map_component(Channel::Lightness, |l| {
                    Component::percent(100.0).mul(weight).add(l.mul(rest))
                });
            Dispatch::Color(tinted)
        }
        Shade => {
            let color = args.color(0)?;
            let weight = args.optional(1, Amount::Weight, Component::number(0.5))?;
            let rest = Component::number(1.0).sub(weight);
            Dispatch::Color(color.map_component(Channel::Lightness, |l| l.mul(rest)))
        }
        Greyscale => Dispatch::Color(
            args.color(0)?
                .with_component(Channel::Saturation, Component::percent(0.0)),
        ),
        Contrast => {
            // dark/light 参数仅为兼容保留，结果只调整亮度。
            let color = args.color(0)?;
            let threshold = args.optional(3, Amount::Percent, Component::percent(67.0))?;
            Dispatch::Color(color.map_component(Channel::Lightness, |l| {
                Component::number(-100.0).mul(l.sub(threshold))
            }))
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsl::HslColorVariable;
    use crate::CompileOptions;
    use pretty_assertions::assert_eq;

    fn env() -> Environment {
        Environment::new(&CompileOptions::default()).unwrap()
    }

    fn color(h: f64, s: f64, l: f64) -> Node {
        Node::HslColor(HslColor::from_value(ColorValue::new(h, s, l, 1.0)))
    }

    fn variable(name: &str) -> Node {
        Node::HslColorVariable(HslColorVariable::new(
            VariableRef::new(name, None),
            Location::default(),
        ))
    }

    fn run(function: ColorFunction, args: Vec<Node>) -> LessResult<Dispatch> {
        dispatch(function, &args, &env(), &Location::default())
    }

    fn css(result: Dispatch) -> String {
        match result.into_node(&Location::default()) {
            Some(node) => node.to_css(false),
            None => panic!("期待引擎处理该调用"),
        }
    }

    #[test]
    fn plain_values_are_not_handled() {
        let result = run(
            ColorFunction::Lighten,
            vec![Node::Keyword("red".into()), Node::Dimension(Dimension::percent(10.0))],
        )
        .unwrap();
        assert_eq!(result, Dispatch::NotHandled);

        let short = run(ColorFunction::Hsl, vec![Node::Dimension(Dimension::number(1.0))]).unwrap();
        assert_eq!(short, Dispatch::NotHandled);
    }

    #[test]
    fn fraction_amounts_accept_percent_or_number() {
        let percent = run(
            ColorFunction::Fade,
            vec![color(0.0, 0.0, 0.0), Node::Dimension(Dimension::percent(30.0))],
        )
        .unwrap();
        let number = run(
            ColorFunction::Fade,
            vec![color(0.0, 0.0, 0.0), Node::Dimension(Dimension::number(0.3))],
        )
        .unwrap();
        assert_eq!(percent, number);
        assert_eq!(css(percent), "hsl(0, 0%, 0%, 0.3)");
    }

    #[test]
    fn tint_and_shade_fold_constants() {
        let tinted = run(
            ColorFunction::Tint,
            vec![color(0.0, 50.0, 40.0), Node::Dimension(Dimension::percent(50.0))],
        )
        .unwrap();
        assert_eq!(css(tinted), "hsl(0, 25%, 70%)");

        let shaded = run(ColorFunction::Shade, vec![color(0.0, 50.0, 40.0)]).unwrap();
        assert_eq!(css(shaded), "hsl(0, 50%, 20%)");
    }

    #[test]
    fn shade_on_variable_multiplies_lightness() {
        let shaded = run(
            ColorFunction::Shade,
            vec![variable("brand"), Node::Dimension(Dimension::percent(20.0))],
        )
        .unwrap();
        let Dispatch::Color(color) = shaded else {
            panic!("期待颜色结果");
        };
        assert!(color.is_deferred());
        let mut output = crate::serializer::Output::new(true);
        color.component(Channel::Lightness).gen_css(&mut output);
        assert_eq!(output.into_css(), "calc(var(--brand--l) * 0.8)");
    }

    #[test]
    fn channel_references_are_not_colors() {
        let channel = Node::HslColorVariable(HslColorVariable::new(
            VariableRef::new("brand", Some(Channel::Hue)),
            Location::new(7, None),
        ));
        let err = run(ColorFunction::Greyscale, vec![channel]).unwrap_err();
        match err {
            LessError::TypeError {
                function, location, ..
            } => {
                assert_eq!(function, "greyscale");
                assert_eq!(location.index, 0);
            }
            other => panic!("期待类型错误: {other:?}"),
        }
    }

    #[test]
    fn hsl_accepts_variable_channels() {
        let result = run(
            ColorFunction::Hsl,
            vec![
                Node::HslColorVariable(HslColorVariable::new(
                    VariableRef::new("a", Some(Channel::Hue)),
                    Location::default(),
                )),
                Node::Dimension(Dimension::percent(50.0)),
                Node::Dimension(Dimension::percent(50.0)),
                Node::Dimension(Dimension::number(0.4)),
            ],
        )
        .unwrap();
        assert_eq!(
            css(result),
            "hsl(\n  var(--a--h),\n  50%,\n  50%,\n  0.4\n)"
        );
    }
}
