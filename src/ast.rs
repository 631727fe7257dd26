//! 宿主编译器的值节点树。
//! 每种节点都遵循同一套约定：`compile` 返回新节点，`accept` 让访问器改写子节点，
//! `gen_css` 把文本追加到输出缓冲区。

use crate::color::{format_hex, format_rgba, Rgba};
use crate::error::LessResult;
use crate::evaluator::{evaluate_builtin, Environment};
use crate::hsl::{CalcExpr, HslColor, HslColorFunction, HslColorVariable};
use crate::serializer::Output;
use crate::utils::format_number;
use crate::visitor::Visitor;
use std::fmt::{self, Display};
use std::sync::Arc;

/// 节点在源码中的位置，仅用于错误信息。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub index: usize,
    pub filename: Option<Arc<str>>,
}

impl Location {
    pub fn new(index: usize, filename: Option<Arc<str>>) -> Self {
        Self { index, filename }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filename {
            Some(file) => write!(f, "{file} 位置 {}", self.index),
            None => write!(f, "位置 {}", self.index),
        }
    }
}

/// 带单位的数值，例如 `10px`、`50%`、`0.5`。
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: String,
}

impl Dimension {
    pub fn new<U: Into<String>>(value: f64, unit: U) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    pub fn number(value: f64) -> Self {
        Self::new(value, "")
    }

    pub fn percent(value: f64) -> Self {
        Self::new(value, "%")
    }

    pub fn is_percentage(&self) -> bool {
        self.unit == "%"
    }

    pub fn to_css(&self) -> String {
        format!("{}{}", format_number(self.value), self.unit)
    }
}

/// 颜色字面量的输出形式。
#[derive(Debug, Clone, PartialEq)]
pub enum ColorFormat {
    Hex,
    Rgba,
    /// 保留源码中的原始写法（`#fff`、`red` 等）。
    Raw(String),
}

/// RGB 颜色字面量。
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    pub rgba: Rgba,
    pub format: ColorFormat,
}

impl Color {
    pub fn literal<S: Into<String>>(raw: S, rgba: Rgba) -> Self {
        Self {
            rgba,
            format: ColorFormat::Raw(raw.into()),
        }
    }

    /// 计算结果：不透明输出十六进制，否则输出 rgba()。
    pub fn computed(rgba: Rgba) -> Self {
        let format = if rgba.a < 1.0 {
            ColorFormat::Rgba
        } else {
            ColorFormat::Hex
        };
        Self { rgba, format }
    }

    pub fn with_format(self, format: ColorFormat) -> Self {
        Self { format, ..self }
    }

    pub fn to_css(&self) -> String {
        match &self.format {
            ColorFormat::Hex => format_hex(self.rgba),
            ColorFormat::Rgba => format_rgba(self.rgba),
            ColorFormat::Raw(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quoted {
    pub value: String,
    pub quote: char,
}

/// 通用函数调用节点。
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Node>,
    pub location: Location,
}

impl Call {
    pub fn new<S: Into<String>>(name: S, args: Vec<Node>, location: Location) -> Self {
        Self {
            name: name.into(),
            args,
            location,
        }
    }

    /// 先编译参数，再交给内置函数；无法求值的调用原样保留。
    pub fn compile(&self, env: &Environment) -> LessResult<Node> {
        let args = compile_all(&self.args, env)?;
        let call = Call::new(self.name.clone(), args, self.location.clone());
        match evaluate_builtin(&call)? {
            Some(node) => Ok(node),
            None => Ok(Node::Call(call)),
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&mut self, visitor: &mut V) -> LessResult<()> {
        for arg in &mut self.args {
            visitor.visit_node(arg)?;
        }
        Ok(())
    }

    pub fn gen_css(&self, output: &mut Output) {
        output.add(&self.name);
        output.add("(");
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                output.separator();
            }
            arg.gen_css(output);
        }
        output.add(")");
    }
}

/// mixin 调用中的选择器部分，例如 `.button-variant`。
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub value: String,
}

impl Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MixinArgument {
    pub name: Option<String>,
    pub value: Node,
}

/// 宿主的 mixin 调用节点。
#[derive(Debug, Clone, PartialEq)]
pub struct MixinCall {
    pub selector: Selector,
    pub args: Vec<MixinArgument>,
    pub important: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Dimension(Dimension),
    Color(Color),
    Keyword(String),
    Quoted(Quoted),
    Variable(String, Location),
    Anonymous(String),
    Expression(Vec<Node>),
    List(Vec<Node>),
    Call(Call),
    Calc(CalcExpr),
    HslColor(HslColor),
    HslColorFunction(HslColorFunction),
    HslColorVariable(HslColorVariable),
}

impl Node {
    pub fn compile(&self, env: &Environment) -> LessResult<Node> {
        match self {
            Node::Variable(name, location) => env.resolve(name, location),
            Node::Expression(items) => Ok(Node::Expression(compile_all(items, env)?)),
            Node::List(items) => Ok(Node::List(compile_all(items, env)?)),
            Node::Call(call) => call.compile(env),
            Node::HslColorFunction(function) => function.compile(env),
            Node::HslColorVariable(variable) => variable.compile(env),
            other => Ok(other.clone()),
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&mut self, visitor: &mut V) -> LessResult<()> {
        match self {
            Node::Expression(items) | Node::List(items) => {
                for item in items {
                    visitor.visit_node(item)?;
                }
                Ok(())
            }
            Node::Call(call) => call.accept(visitor),
            Node::HslColorFunction(function) => function.accept(visitor),
            _ => Ok(()),
        }
    }

    pub fn gen_css(&self, output: &mut Output) {
        match self {
            Node::Dimension(dimension) => output.add(&dimension.to_css()),
            Node::Color(color) => output.add(&color.to_css()),
            Node::Keyword(word) | Node::Anonymous(word) => output.add(word),
            Node::Quoted(quoted) => {
                output.push(quoted.quote);
                output.add(&quoted.value);
                output.push(quoted.quote);
            }
            Node::Variable(name, _) => {
                output.push('@');
                output.add(name);
            }
            Node::Expression(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        output.push(' ');
                    }
                    item.gen_css(output);
                }
            }
            Node::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        output.separator();
                    }
                    item.gen_css(output);
                }
            }
            Node::Call(call) => call.gen_css(output),
            Node::Calc(calc) => calc.gen_css(output),
            Node::HslColor(color) => color.gen_css(output),
            Node::HslColorFunction(function) => function.gen_css(output),
            Node::HslColorVariable(variable) => variable.gen_css(output),
        }
    }

    pub fn to_css(&self, compress: bool) -> String {
        let mut output = Output::new(compress);
        self.gen_css(&mut output);
        output.into_css()
    }
}

fn compile_all(nodes: &[Node], env: &Environment) -> LessResult<Vec<Node>> {
    nodes.iter().map(|node| node.compile(env)).collect()
}
