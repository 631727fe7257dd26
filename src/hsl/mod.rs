//! 主题颜色引擎：在常量颜色与运行时 CSS 变量上统一实现 HSL 颜色运算。

mod calc;
mod color;
mod function;
mod mixin;
mod nodes;
mod value;
mod variable;

pub use calc::{CalcExpr, CalcOp, Component};
pub use color::HslColor;
pub use function::{dispatch, ColorFunction, Dispatch};
pub use mixin::HslMixinCall;
pub use nodes::{HslColorFunction, HslColorVariable};
pub use value::ColorValue;
pub use variable::{Channel, VariableRef};
