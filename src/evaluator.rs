use crate::ast::{Call, Color, ColorFormat, Dimension, Location, Node};
use crate::color::{self, Rgba};
use crate::error::{LessError, LessResult};
use crate::parser::ValueParser;
use crate::visitor::rewrite_color_calls;
use crate::CompileOptions;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::sync::Arc;

/// 编译环境：维护 LESS 变量并携带主题相关配置。
pub struct Environment {
    variables: IndexMap<String, Node>,
    color_adjust_variable: String,
    filename: Option<Arc<str>>,
    resolving: RefCell<Vec<String>>,
}

impl Environment {
    pub fn new(options: &CompileOptions) -> LessResult<Self> {
        let filename: Option<Arc<str>> = options
            .filename
            .as_ref()
            .map(|path| Arc::from(path.display().to_string()));
        let mut env = Self {
            variables: IndexMap::new(),
            color_adjust_variable: options.color_adjust_variable.clone(),
            filename,
            resolving: RefCell::new(Vec::new()),
        };
        let parser = env.parser();
        for (name, source) in &options.variables {
            let mut value = parser.parse_value(source)?;
            rewrite_color_calls(&mut value)?;
            env.define(name.trim_start_matches('@'), value);
        }
        Ok(env)
    }

    /// 使用当前文件名构造值解析器，保证节点位置带上来源。
    pub fn parser(&self) -> ValueParser {
        ValueParser::new(self.filename.clone())
    }

    pub fn color_adjust_variable(&self) -> &str {
        &self.color_adjust_variable
    }

    /// 定义变量；同名变量以后定义的为准。
    pub fn define<S: Into<String>>(&mut self, name: S, value: Node) {
        self.variables.insert(name.into(), value);
    }

    /// 查找并编译变量；变量在使用时才求值。
    pub fn resolve(&self, name: &str, location: &Location) -> LessResult<Node> {
        let value = self
            .variables
            .get(name)
            .ok_or_else(|| LessError::eval(format!("未定义的变量 @{name} ({location})")))?;

        if self.resolving.borrow().iter().any(|pending| pending == name) {
            return Err(LessError::eval(format!("变量 @{name} 存在循环引用")));
        }
        self.resolving.borrow_mut().push(name.to_string());
        let compiled = value.compile(self);
        self.resolving.borrow_mut().pop();
        compiled
    }
}

/// 宿主编译器的通用颜色函数（作用于 RGB 颜色）。
///
/// 返回 `None` 表示无法求值，调用会原样输出。
pub fn evaluate_builtin(call: &Call) -> LessResult<Option<Node>> {
    let name = call.name.as_str();
    let args = &call.args;

    let result = match name {
        "rgb" | "rgba" => rgb_from_args(args),
        "lighten" | "darken" | "fade" => {
            let color = required_color(name, args.first())?;
            let amount = args
                .get(1)
                .and_then(fraction)
                .ok_or_else(|| LessError::eval(format!("{name}() 缺少合法的百分比参数")))?
                .clamp(0.0, 1.0);
            let node = match name {
                "lighten" => Color::computed(color::lighten(color, amount)),
                "darken" => Color::computed(color::darken(color, amount)),
                _ => Color::computed(color::fade(color, amount)).with_format(ColorFormat::Rgba),
            };
            Some(node)
        }
        "overlay" => {
            let top = required_color(name, args.first())?;
            let bottom = required_color(name, args.get(1))?;
            Some(Color::computed(color::overlay(top, bottom)).with_format(ColorFormat::Hex))
        }
        "saturate" | "desaturate" | "fadein" | "fadeout" | "spin" => {
            match (color_of(args.first()), args.get(1)) {
                (Some(color), Some(amount)) => {
                    let rgba = match name {
                        "spin" => dimension_of(amount).map(|d| color::spin(color, d.value)),
                        "saturate" => fraction(amount).map(|a| color::saturate(color, a)),
                        "desaturate" => fraction(amount).map(|a| color::desaturate(color, a)),
                        "fadein" => fraction(amount).map(|a| color::fadein(color, a)),
                        _ => fraction(amount).map(|a| color::fadeout(color, a)),
                    };
                    rgba.map(Color::computed)
                }
                _ => None,
            }
        }
        "mix" => match (color_of(args.first()), color_of(args.get(1))) {
            (Some(first), Some(second)) => {
                let weight = weight_of(args.get(2));
                weight.map(|w| Color::computed(color::mix(first, second, w)))
            }
            _ => None,
        },
        "tint" | "shade" => color_of(args.first()).and_then(|color| {
            weight_of(args.get(1)).map(|w| {
                Color::computed(if name == "tint" {
                    color::tint(color, w)
                } else {
                    color::shade(color, w)
                })
            })
        }),
        "greyscale" => color_of(args.first()).map(|c| Color::computed(color::greyscale(c))),
        "contrast" => color_of(args.first()).map(|c| {
            let threshold = args.get(3).and_then(fraction).unwrap_or(0.43);
            let dark = color_of(args.get(1));
            let light = color_of(args.get(2));
            Color::computed(color::contrast(c, dark, light, threshold))
        }),
        "hue" | "saturation" | "lightness" | "alpha" | "red" | "green" | "blue" => {
            return Ok(color_of(args.first()).map(|c| Node::Dimension(channel_of(name, c))));
        }
        _ => None,
    };
    Ok(result.map(Node::Color))
}

fn required_color(function: &str, node: Option<&Node>) -> LessResult<Rgba> {
    color_of(node).ok_or_else(|| {
        let found = node.map(|n| n.to_css(false)).unwrap_or_default();
        LessError::eval(format!("{function}() 无法解析颜色参数: {found}"))
    })
}

fn color_of(node: Option<&Node>) -> Option<Rgba> {
    match node? {
        Node::Color(color) => Some(color.rgba),
        _ => None,
    }
}

fn dimension_of(node: &Node) -> Option<&Dimension> {
    match node {
        Node::Dimension(dimension) => Some(dimension),
        _ => None,
    }
}

/// `20%` 与 `0.2` 都视为 0.2。
fn fraction(node: &Node) -> Option<f64> {
    let dimension = dimension_of(node)?;
    if dimension.is_percentage() {
        Some(dimension.value / 100.0)
    } else {
        Some(dimension.value)
    }
}

fn weight_of(node: Option<&Node>) -> Option<f64> {
    match node {
        Some(node) => fraction(node),
        None => Some(0.5),
    }
}

fn channel_of(name: &str, rgba: Rgba) -> Dimension {
    let (h, s, l) = color::rgb_to_hsl(rgba);
    match name {
        "hue" => Dimension::number((h * 360.0).round()),
        "saturation" => Dimension::percent((s * 100.0).round()),
        "lightness" => Dimension::percent((l * 100.0).round()),
        "alpha" => Dimension::number(rgba.a),
        "red" => Dimension::number(color::channel(rgba.r) as f64),
        "green" => Dimension::number(color::channel(rgba.g) as f64),
        _ => Dimension::number(color::channel(rgba.b) as f64),
    }
}

fn rgb_from_args(args: &[Node]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let channel = |node: &Node| {
        dimension_of(node).map(|d| {
            if d.is_percentage() {
                d.value / 100.0
            } else {
                d.value / 255.0
            }
        })
    };
    let r = channel(&args[0])?;
    let g = channel(&args[1])?;
    let b = channel(&args[2])?;
    let a = match args.get(3) {
        Some(alpha) => fraction(alpha)?,
        None => 1.0,
    };
    Some(Color::computed(Rgba::new(r, g, b, a)))
}
