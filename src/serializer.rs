use crate::utils::{collapse_whitespace, indent};

/// `gen_css` 的输出缓冲区。
#[derive(Debug, Default)]
pub struct Output {
    buffer: String,
    compress: bool,
    tab_level: usize,
}

impl Output {
    pub fn new(compress: bool) -> Self {
        Self {
            buffer: String::new(),
            compress,
            tab_level: 0,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    pub fn add(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
    }

    pub fn push(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    /// 参数之间的逗号分隔符。
    pub fn separator(&mut self) {
        self.add(if self.compress { "," } else { ", " });
    }

    pub fn indent_in(&mut self) {
        self.tab_level += 1;
    }

    pub fn indent_out(&mut self) {
        self.tab_level = self.tab_level.saturating_sub(1);
    }

    /// 换行并缩进到当前层级；压缩模式下不输出任何内容。
    pub fn newline(&mut self) {
        if self.compress {
            return;
        }
        self.buffer.push('\n');
        let padding = indent(self.tab_level);
        self.buffer.push_str(&padding);
    }

    pub fn into_css(self) -> String {
        self.buffer
    }
}

/// 编译后的单条声明。
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDeclaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// 负责将编译后的声明块转换为最终 CSS 文本。
pub struct Serializer {
    minify: bool,
}

impl Serializer {
    pub fn new(minify: bool) -> Self {
        Self { minify }
    }

    pub fn to_css(&self, declarations: &[CompiledDeclaration]) -> String {
        if self.minify {
            declarations
                .iter()
                .map(|decl| self.format_declaration_minified(decl))
                .collect::<Vec<_>>()
                .join(";")
        } else {
            declarations
                .iter()
                .map(|decl| self.format_declaration(decl))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    fn format_declaration(&self, decl: &CompiledDeclaration) -> String {
        let mut result = format!("{}: {}", decl.name.trim(), decl.value.trim());
        if decl.important {
            result.push_str(" !important");
        }
        result.push(';');
        result
    }

    fn format_declaration_minified(&self, decl: &CompiledDeclaration) -> String {
        let mut result = format!("{}:{}", decl.name.trim(), collapse_whitespace(&decl.value));
        if decl.important {
            result.push_str("!important");
        }
        result
    }
}
