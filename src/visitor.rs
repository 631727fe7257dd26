use crate::ast::{Call, Location, Node, Selector};
use crate::error::{LessError, LessResult};
use crate::evaluator::Environment;
use crate::hsl::{HslColorFunction, HslColorVariable};
use tracing::trace;

/// 节点树的统一遍历入口。
///
/// 实现者覆盖 `visit_*` 来改写节点；需要继续深入时调用 `walk_node`。
pub trait Visitor {
    fn visit_node(&mut self, node: &mut Node) -> LessResult<()> {
        walk_node(self, node)
    }

    fn visit_selector(&mut self, _selector: &mut Selector) -> LessResult<()> {
        Ok(())
    }
}

pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &mut Node) -> LessResult<()> {
    node.accept(visitor)
}

/// 编译前的改写：把 `var(--x)` 与目录中的颜色函数调用替换成引擎节点。
///
/// 自底向上进行，外层调用看到的参数已经完成替换。
#[derive(Debug, Default)]
pub struct ColorCallRewriter {
    rewritten: usize,
}

impl ColorCallRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本次遍历替换的节点数。
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    fn rewrite(&mut self, call: Call) -> Node {
        let call = match HslColorVariable::from_call(call) {
            Ok(variable) => {
                trace!(variable = %variable.reference(), "替换主题变量引用");
                self.rewritten += 1;
                return Node::HslColorVariable(variable);
            }
            Err(call) => call,
        };
        match HslColorFunction::from_call(call) {
            Ok(function) => {
                trace!(function = function.function().name(), "替换颜色函数调用");
                self.rewritten += 1;
                Node::HslColorFunction(function)
            }
            Err(call) => Node::Call(call),
        }
    }
}

impl Visitor for ColorCallRewriter {
    fn visit_node(&mut self, node: &mut Node) -> LessResult<()> {
        walk_node(self, node)?;
        if !matches!(node, Node::Call(_)) {
            return Ok(());
        }
        let taken = std::mem::replace(node, Node::Anonymous(String::new()));
        *node = match taken {
            Node::Call(call) => self.rewrite(call),
            other => other,
        };
        Ok(())
    }
}

/// 对整棵值树执行颜色调用改写，返回替换的节点数。
pub fn rewrite_color_calls(node: &mut Node) -> LessResult<usize> {
    let mut rewriter = ColorCallRewriter::new();
    rewriter.visit_node(node)?;
    Ok(rewriter.rewritten())
}

/// 替换选择器中的 `@{name}` 插值。
pub struct SelectorInterpolator<'a> {
    env: &'a Environment,
    location: Location,
}

impl<'a> SelectorInterpolator<'a> {
    pub fn new(env: &'a Environment, location: Location) -> Self {
        Self { env, location }
    }

    fn interpolate(&self, raw: &str) -> LessResult<String> {
        if !raw.contains("@{") {
            return Ok(raw.to_string());
        }
        let mut chars = raw.chars().peekable();
        let mut output = String::new();
        while let Some(ch) = chars.next() {
            if ch == '@' && chars.peek() == Some(&'{') {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                if name.is_empty() || !closed {
                    return Err(LessError::eval(format!(
                        "选择器插值缺少变量名 ({})",
                        self.location
                    )));
                }
                let value = self.env.resolve(&name, &self.location)?;
                let text = match value {
                    Node::Quoted(quoted) => quoted.value,
                    other => other.to_css(false),
                };
                output.push_str(text.trim());
            } else {
                output.push(ch);
            }
        }
        Ok(output)
    }
}

impl Visitor for SelectorInterpolator<'_> {
    fn visit_node(&mut self, _node: &mut Node) -> LessResult<()> {
        Ok(())
    }

    fn visit_selector(&mut self, selector: &mut Selector) -> LessResult<()> {
        selector.value = self.interpolate(&selector.value)?;
        Ok(())
    }
}
