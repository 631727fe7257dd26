use crate::ast::{Location, MixinArgument, MixinCall, Node, Selector};
use crate::error::LessResult;
use crate::evaluator::Environment;
use crate::serializer::Output;
use crate::visitor::Visitor;

/// 与宿主 mixin 调用携带相同内容，单独成型以便访问器区分处理。
#[derive(Debug, Clone, PartialEq)]
pub struct HslMixinCall {
    pub selector: Selector,
    pub args: Vec<MixinArgument>,
    pub important: bool,
    pub location: Location,
}

impl From<MixinCall> for HslMixinCall {
    fn from(call: MixinCall) -> Self {
        Self {
            selector: call.selector,
            args: call.args,
            important: call.important,
            location: call.location,
        }
    }
}

impl HslMixinCall {
    pub fn into_mixin_call(self) -> MixinCall {
        MixinCall {
            selector: self.selector,
            args: self.args,
            important: self.important,
            location: self.location,
        }
    }

    /// 依次访问选择器与每个参数的值。
    pub fn accept<V: Visitor + ?Sized>(&mut self, visitor: &mut V) -> LessResult<()> {
        visitor.visit_selector(&mut self.selector)?;
        for arg in &mut self.args {
            visitor.visit_node(&mut arg.value)?;
        }
        Ok(())
    }

    /// 编译所有参数值；mixin 的查找与展开由宿主负责。
    pub fn compile(&self, env: &Environment) -> LessResult<Self> {
        let args = self
            .args
            .iter()
            .map(|arg| {
                Ok(MixinArgument {
                    name: arg.name.clone(),
                    value: arg.value.compile(env)?,
                })
            })
            .collect::<LessResult<Vec<_>>>()?;
        Ok(Self {
            args,
            ..self.clone()
        })
    }

    pub fn argument(&self, name: &str) -> Option<&Node> {
        self.args
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
            .map(|arg| &arg.value)
    }

    pub fn gen_css(&self, output: &mut Output) {
        output.add(&self.selector.value);
        output.push('(');
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                output.add(if output.is_compressed() { ";" } else { "; " });
            }
            if let Some(name) = &arg.name {
                output.push('@');
                output.add(name);
                output.add(if output.is_compressed() { ":" } else { ": " });
            }
            arg.value.gen_css(output);
        }
        output.push(')');
        if self.important {
            output.add(if output.is_compressed() { "!important" } else { " !important" });
        }
    }

    pub fn to_css(&self, compress: bool) -> String {
        let mut output = Output::new(compress);
        self.gen_css(&mut output);
        output.into_css()
    }
}
