use super::nodes::HslColorVariable;
use super::variable::VariableRef;
use crate::ast::{Dimension, Location, Node};
use crate::serializer::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Add,
    Sub,
    Mul,
}

impl CalcOp {
    fn symbol(self) -> &'static str {
        match self {
            CalcOp::Add => "+",
            CalcOp::Sub => "-",
            CalcOp::Mul => "*",
        }
    }

    fn fold(self, lhs: &Dimension, rhs: &Dimension) -> Dimension {
        let value = match self {
            CalcOp::Add => lhs.value + rhs.value,
            CalcOp::Sub => lhs.value - rhs.value,
            CalcOp::Mul => lhs.value * rhs.value,
        };
        let unit = if lhs.unit.is_empty() {
            rhs.unit.clone()
        } else {
            lhs.unit.clone()
        };
        Dimension::new(value, unit)
    }
}

/// 颜色表达式中的一个分量：字面量、变量分量或延迟到运行时的 `calc()`。
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Literal(Dimension),
    Var(VariableRef),
    Calc(CalcExpr),
}

impl Component {
    pub fn number(value: f64) -> Self {
        Component::Literal(Dimension::number(value))
    }

    pub fn percent(value: f64) -> Self {
        Component::Literal(Dimension::percent(value))
    }

    /// 两个字面量直接折叠，否则生成 `calc()`。
    pub fn combine(op: CalcOp, lhs: Component, rhs: Component) -> Self {
        match (&lhs, &rhs) {
            (Component::Literal(a), Component::Literal(b)) => Component::Literal(op.fold(a, b)),
            _ => Component::Calc(CalcExpr::new(op, lhs, rhs)),
        }
    }

    pub fn add(self, rhs: Component) -> Self {
        Self::combine(CalcOp::Add, self, rhs)
    }

    pub fn sub(self, rhs: Component) -> Self {
        Self::combine(CalcOp::Sub, self, rhs)
    }

    pub fn mul(self, rhs: Component) -> Self {
        Self::combine(CalcOp::Mul, self, rhs)
    }

    pub fn as_literal(&self) -> Option<&Dimension> {
        match self {
            Component::Literal(dimension) => Some(dimension),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableRef> {
        match self {
            Component::Var(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn gen_css(&self, output: &mut Output) {
        match self {
            Component::Literal(dimension) => output.add(&dimension.to_css()),
            Component::Var(reference) => reference.gen_css(output),
            Component::Calc(calc) => calc.gen_css(output),
        }
    }

    /// 作为 `calc()` 操作数输出：嵌套的 calc 只保留括号。
    fn gen_operand(&self, output: &mut Output) {
        match self {
            Component::Calc(calc) => {
                output.push('(');
                calc.gen_inner(output);
                output.push(')');
            }
            other => other.gen_css(output),
        }
    }

    pub fn into_node(self, location: &Location) -> Node {
        match self {
            Component::Literal(dimension) => Node::Dimension(dimension),
            Component::Var(reference) => {
                Node::HslColorVariable(HslColorVariable::new(reference, location.clone()))
            }
            Component::Calc(calc) => Node::Calc(calc),
        }
    }
}

/// `calc(lhs op rhs)`。
#[derive(Debug, Clone, PartialEq)]
pub struct CalcExpr {
    op: CalcOp,
    lhs: Box<Component>,
    rhs: Box<Component>,
}

impl CalcExpr {
    pub fn new(op: CalcOp, lhs: Component, rhs: Component) -> Self {
        Self {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn gen_css(&self, output: &mut Output) {
        output.add("calc(");
        self.gen_inner(output);
        output.push(')');
    }

    fn gen_inner(&self, output: &mut Output) {
        self.lhs.gen_operand(output);
        output.push(' ');
        output.add(self.op.symbol());
        output.push(' ');
        self.rhs.gen_operand(output);
    }

    pub fn to_css(&self) -> String {
        let mut output = Output::new(false);
        self.gen_css(&mut output);
        output.into_css()
    }
}
