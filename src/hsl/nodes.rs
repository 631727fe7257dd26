//! 把宿主的通用调用节点包装成颜色引擎节点，并在引擎不适用时还原。

use super::function::{dispatch, ColorFunction};
use super::variable::VariableRef;
use crate::ast::{Call, Location, Node};
use crate::error::LessResult;
use crate::evaluator::Environment;
use crate::serializer::Output;
use crate::visitor::Visitor;
use tracing::debug;

/// 目录中的颜色函数调用，例如 `lighten(var(--brand), 10%)`。
#[derive(Debug, Clone, PartialEq)]
pub struct HslColorFunction {
    function: ColorFunction,
    args: Vec<Node>,
    location: Location,
}

impl HslColorFunction {
    pub fn new(function: ColorFunction, args: Vec<Node>, location: Location) -> Self {
        Self {
            function,
            args,
            location,
        }
    }

    /// 名称不在目录中时原样交还调用节点。
    pub fn from_call(call: Call) -> Result<Self, Call> {
        match ColorFunction::from_name(&call.name) {
            Some(function) => Ok(Self::new(function, call.args, call.location)),
            None => Err(call),
        }
    }

    pub fn into_call(self) -> Call {
        Call::new(self.function.name(), self.args, self.location)
    }

    pub fn function(&self) -> ColorFunction {
        self.function
    }

    pub fn args(&self) -> &[Node] {
        &self.args
    }

    pub fn compile(&self, env: &Environment) -> LessResult<Node> {
        let args = self
            .args
            .iter()
            .map(|arg| arg.compile(env))
            .collect::<LessResult<Vec<_>>>()?;

        if let Some(node) = dispatch(self.function, &args, env, &self.location)?
            .into_node(&self.location)
        {
            return Ok(node);
        }

        debug!(function = self.function.name(), "还原为通用调用");
        Call::new(self.function.name(), args, self.location.clone()).compile(env)
    }

    pub fn accept<V: Visitor + ?Sized>(&mut self, visitor: &mut V) -> LessResult<()> {
        for arg in &mut self.args {
            visitor.visit_node(arg)?;
        }
        Ok(())
    }

    pub fn gen_css(&self, output: &mut Output) {
        output.add(self.function.name());
        output.push('(');
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                output.separator();
            }
            arg.gen_css(output);
        }
        output.push(')');
    }
}

/// `var(--name)` 或 `var(--name--h)` 形式的主题变量引用。
#[derive(Debug, Clone, PartialEq)]
pub struct HslColorVariable {
    reference: VariableRef,
    location: Location,
}

impl HslColorVariable {
    pub fn new(reference: VariableRef, location: Location) -> Self {
        Self {
            reference,
            location,
        }
    }

    /// 只接受恰好一个符合变量模式的参数，其他 `var()` 保持通用调用。
    pub fn from_call(call: Call) -> Result<Self, Call> {
        if call.name != "var" || call.args.len() != 1 {
            return Err(call);
        }
        let reference = match &call.args[0] {
            Node::Keyword(word) => VariableRef::parse(word),
            _ => None,
        };
        match reference {
            Some(reference) => Ok(Self::new(reference, call.location)),
            None => Err(call),
        }
    }

    pub fn into_call(self) -> Call {
        Call::new(
            "var",
            vec![Node::Keyword(self.reference.property())],
            self.location,
        )
    }

    pub fn reference(&self) -> &VariableRef {
        &self.reference
    }

    pub fn compile(&self, _env: &Environment) -> LessResult<Node> {
        Ok(Node::HslColorVariable(self.clone()))
    }

    pub fn gen_css(&self, output: &mut Output) {
        self.reference.gen_css(output);
    }
}
