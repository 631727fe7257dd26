//! less_hsl 库入口，提供面向 Rust 与 Node.js 的 LESS 值编译能力，并内置主题颜色引擎。
//! 处理流程：解析（Parser）→ 颜色调用改写（Visitor）→ 求值（Environment）→ CSS 序列化（Serializer）。
//! 颜色引擎见 [`hsl`]：常量颜色在编译期折叠，`var(--x)` 主题变量生成运行时 `calc()` 表达式。

mod ast;
mod color;
mod error;
mod evaluator;
pub mod hsl;
mod parser;
mod serializer;
mod utils;
mod visitor;

pub use crate::ast::{Location, MixinArgument, MixinCall, Node, Selector};
pub use crate::error::{LessError, LessResult};
pub use crate::evaluator::Environment;

use crate::hsl::HslMixinCall;
use crate::parser::Statement;
use crate::serializer::{CompiledDeclaration, Serializer};
use crate::visitor::{rewrite_color_calls, ColorCallRewriter, SelectorInterpolator};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `xf-diminish` / `xf-intensify` 默认使用的运行时缩放变量。
pub const DEFAULT_COLOR_ADJUST_VARIABLE: &str = "xf-color-adjust";

/// LESS 编译配置。
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// 是否输出压缩后的 CSS。
    pub minify: bool,
    /// 源文件路径，仅用于错误信息中的位置。
    pub filename: Option<PathBuf>,
    /// 预定义的 `@变量`，值为 LESS 源码，按插入顺序定义。
    pub variables: IndexMap<String, String>,
    /// 运行时颜色缩放变量名（不含 `--` 前缀）。
    pub color_adjust_variable: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            minify: false,
            filename: None,
            variables: IndexMap::new(),
            color_adjust_variable: DEFAULT_COLOR_ADJUST_VARIABLE.to_string(),
        }
    }
}

/// 编译单个属性值。
///
/// ```
/// use less_hsl::{compile_value, CompileOptions};
///
/// let css = compile_value("lighten(hsl(200, 50%, 50%), 10%)", &CompileOptions::default()).unwrap();
/// assert_eq!(css, "hsl(200, 50%, 60%)");
/// ```
pub fn compile_value(source: &str, options: &CompileOptions) -> LessResult<String> {
    let env = Environment::new(options)?;
    let mut node = env.parser().parse_value(source)?;
    let rewritten = rewrite_color_calls(&mut node)?;
    debug!(rewritten, "属性值改写完成");
    let compiled = node.compile(&env)?;
    Ok(compiled.to_css(options.minify))
}

/// 编译由 `@变量` 定义与属性声明组成的代码块。
///
/// # 参数
/// * `source` - 待编译的 LESS 声明
/// * `options` - 编译配置
pub fn compile(source: &str, options: CompileOptions) -> LessResult<String> {
    let mut env = Environment::new(&options)?;
    let statements = env.parser().parse_declarations(source)?;

    let mut declarations = Vec::new();
    for statement in statements {
        match statement {
            Statement::Variable { name, mut value } => {
                rewrite_color_calls(&mut value)?;
                env.define(name, value);
            }
            Statement::Declaration {
                name,
                mut value,
                important,
            } => {
                rewrite_color_calls(&mut value)?;
                let compiled = value.compile(&env)?;
                declarations.push(CompiledDeclaration {
                    name,
                    value: compiled.to_css(options.minify),
                    important,
                });
            }
        }
    }
    debug!(count = declarations.len(), "声明编译完成");

    let serializer = Serializer::new(options.minify);
    Ok(serializer.to_css(&declarations))
}

/// 从文件路径编译 LESS 声明块，文件名会出现在错误位置中。
pub fn compile_file<P: AsRef<Path>>(path: P, mut options: CompileOptions) -> LessResult<String> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|err| LessError::eval(format!("读取文件 {} 失败: {err}", path.display())))?;
    if options.filename.is_none() {
        options.filename = Some(path.to_path_buf());
    }
    compile(&source, options)
}

/// 解析并编译 mixin 调用的参数，mixin 的查找与展开留给宿主。
pub fn compile_mixin_call(source: &str, options: &CompileOptions) -> LessResult<HslMixinCall> {
    let env = Environment::new(options)?;
    let mut call = HslMixinCall::from(env.parser().parse_mixin_call(source)?);

    call.accept(&mut ColorCallRewriter::new())?;
    let location = call.location.clone();
    call.accept(&mut SelectorInterpolator::new(&env, location))?;
    call.compile(&env)
}

#[cfg(feature = "node")]
use napi::{Error, Result};
#[cfg(feature = "node")]
use napi_derive::napi;

/// Node.js 侧的编译选项对象。
#[cfg(feature = "node")]
#[napi(object)]
pub struct JsCompileOptions {
    /// 是否压缩输出 CSS。
    pub minify: Option<bool>,
    /// 源文件路径，用于错误信息。
    pub filename: Option<String>,
    /// 运行时颜色缩放变量名。
    pub color_adjust_variable: Option<String>,
}

/// 暴露给 Node.js 的编译函数。
#[cfg(feature = "node")]
#[napi]
pub fn compile_less(source: String, options: Option<JsCompileOptions>) -> Result<String> {
    let mut compile_options = CompileOptions::default();
    if let Some(opt) = options {
        compile_options.minify = opt.minify.unwrap_or(false);
        compile_options.filename = opt.filename.map(PathBuf::from);
        if let Some(variable) = opt.color_adjust_variable {
            compile_options.color_adjust_variable = variable;
        }
    }
    compile(&source, compile_options).map_err(|err| Error::from_reason(err.to_string()))
}
