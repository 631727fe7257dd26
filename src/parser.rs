use crate::ast::*;
use crate::color::{named_color, parse_color};
use crate::error::{LessError, LessResult};
use crate::utils::is_ident_char;
use std::sync::Arc;

/// 声明块中的一条语句。
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Variable {
        name: String,
        value: Node,
    },
    Declaration {
        name: String,
        value: Node,
        important: bool,
    },
}

/// LESS 值解析器，负责把属性值、声明块与 mixin 调用转换成节点树。
pub struct ValueParser {
    filename: Option<Arc<str>>,
}

impl ValueParser {
    pub fn new(filename: Option<Arc<str>>) -> Self {
        Self { filename }
    }

    /// 解析单个属性值，例如 `1px solid lighten(@brand, 10%)`。
    pub fn parse_value(&self, source: &str) -> LessResult<Node> {
        let mut cursor = Cursor::new(source);
        let value = self.read_value(&mut cursor, &[])?;
        cursor.skip_whitespace_and_comments();
        if !cursor.is_eof() {
            return Err(LessError::parse("属性值后存在多余内容", cursor.position()));
        }
        Ok(value)
    }

    /// 解析只包含变量定义与属性声明的代码块。
    pub fn parse_declarations(&self, source: &str) -> LessResult<Vec<Statement>> {
        let mut cursor = Cursor::new(source);
        let mut statements = Vec::new();

        loop {
            cursor.skip_whitespace_and_comments();
            if cursor.is_eof() {
                break;
            }

            let statement = if cursor.starts_with('@') && cursor.lookahead_is_variable_decl() {
                self.parse_variable(&mut cursor)?
            } else {
                self.parse_declaration(&mut cursor)?
            };
            statements.push(statement);

            cursor.skip_whitespace_and_comments();
            match cursor.peek_char() {
                Some(';') => {
                    cursor.advance_char();
                }
                None => break,
                Some(ch) => {
                    return Err(LessError::parse(
                        format!("声明之后期待 ';', 却得到 '{ch}'"),
                        cursor.position(),
                    ))
                }
            }
        }

        Ok(statements)
    }

    /// 解析 `.name(args) !important;` 形式的 mixin 调用。
    pub fn parse_mixin_call(&self, source: &str) -> LessResult<MixinCall> {
        let mut cursor = Cursor::new(source);
        cursor.skip_whitespace_and_comments();
        let location = self.location(cursor.position());
        let selector = Selector {
            value: cursor.read_mixin_name()?,
        };
        cursor.skip_whitespace_and_comments();
        let args = if cursor.starts_with('(') {
            self.parse_mixin_arguments(&mut cursor)?
        } else {
            Vec::new()
        };
        let important = self.read_important(&mut cursor)?;
        cursor.skip_whitespace_and_comments();
        if cursor.starts_with(';') {
            cursor.advance_char();
            cursor.skip_whitespace_and_comments();
        }
        if !cursor.is_eof() {
            return Err(LessError::parse("mixin 调用后存在多余内容", cursor.position()));
        }
        Ok(MixinCall {
            selector,
            args,
            important,
            location,
        })
    }

    fn location(&self, index: usize) -> Location {
        Location::new(index, self.filename.clone())
    }

    fn parse_variable(&self, cursor: &mut Cursor<'_>) -> LessResult<Statement> {
        cursor.expect_char('@')?;
        let name = cursor.read_identifier();
        cursor.skip_whitespace_and_comments();
        cursor.expect_char(':')?;
        let value = self.read_value(cursor, &[';'])?;
        Ok(Statement::Variable { name, value })
    }

    fn parse_declaration(&self, cursor: &mut Cursor<'_>) -> LessResult<Statement> {
        let name = cursor.read_property_name();
        if name.is_empty() {
            return Err(LessError::parse("缺少属性名", cursor.position()));
        }
        cursor.skip_whitespace_and_comments();
        cursor.expect_char(':')?;
        let value = self.read_value(cursor, &[';', '!'])?;
        let important = self.read_important(cursor)?;
        Ok(Statement::Declaration {
            name,
            value,
            important,
        })
    }

    fn read_important(&self, cursor: &mut Cursor<'_>) -> LessResult<bool> {
        cursor.skip_whitespace_and_comments();
        if !cursor.starts_with('!') {
            return Ok(false);
        }
        cursor.advance_char();
        cursor.skip_whitespace();
        if !cursor.starts_with_keyword("important") {
            return Err(LessError::parse("期待 !important", cursor.position()));
        }
        cursor.consume_keyword("important");
        Ok(true)
    }

    fn parse_mixin_arguments(&self, cursor: &mut Cursor<'_>) -> LessResult<Vec<MixinArgument>> {
        // 参数中出现分号时按分号分隔，逗号属于参数值本身
        let separator = if cursor.arguments_use_semicolons() {
            ';'
        } else {
            ','
        };
        let mut args = Vec::new();
        cursor.expect_char('(')?;
        loop {
            cursor.skip_whitespace_and_comments();
            if cursor.starts_with(')') {
                cursor.advance_char();
                break;
            }

            let name = if cursor.starts_with('@') && cursor.lookahead_is_variable_decl() {
                cursor.expect_char('@')?;
                let name = cursor.read_identifier();
                cursor.skip_whitespace_and_comments();
                cursor.expect_char(':')?;
                Some(name)
            } else {
                None
            };

            let value = if separator == ';' {
                self.read_value(cursor, &[';', ')'])?
            } else {
                self.read_expression(cursor, &[')'])?
            };
            args.push(MixinArgument { name, value });

            cursor.skip_whitespace_and_comments();
            match cursor.peek_char() {
                Some(ch) if ch == separator => {
                    cursor.advance_char();
                }
                Some(')') => {
                    cursor.advance_char();
                    break;
                }
                _ => {
                    return Err(LessError::parse(
                        "mixin 参数调用缺少分隔符",
                        cursor.position(),
                    ))
                }
            }
        }
        Ok(args)
    }

    /// 逗号分隔的值列表；只有一项时直接返回该项。
    fn read_value(&self, cursor: &mut Cursor<'_>, terminators: &[char]) -> LessResult<Node> {
        let mut items = Vec::new();
        loop {
            items.push(self.read_expression(cursor, terminators)?);
            if cursor.starts_with(',') {
                cursor.advance_char();
            } else {
                break;
            }
        }
        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(Node::List(items))
        }
    }

    /// 空白分隔的若干项，遇到逗号或终止符停止。
    fn read_expression(&self, cursor: &mut Cursor<'_>, terminators: &[char]) -> LessResult<Node> {
        let mut terms = Vec::new();
        loop {
            cursor.skip_whitespace_and_comments();
            match cursor.peek_char() {
                None => break,
                Some(ch) if ch == ',' || terminators.contains(&ch) => break,
                Some(_) => terms.push(self.read_chunk(cursor, terminators)?),
            }
        }
        match terms.len() {
            0 => Err(LessError::parse("缺少属性值", cursor.position())),
            1 => Ok(terms.remove(0)),
            _ => Ok(Node::Expression(terms)),
        }
    }

    /// 读取一段不含顶层空白的文本；能完整解析为单个值时返回该值，否则原样保留。
    fn read_chunk(&self, cursor: &mut Cursor<'_>, terminators: &[char]) -> LessResult<Node> {
        let start = cursor.position();
        let end = cursor.chunk_end(terminators)?;
        if end == start {
            let found = cursor.peek_char().unwrap_or_default();
            return Err(LessError::parse(format!("意外的字符 '{found}'"), start));
        }

        let mut lookahead = cursor.clone();
        if let Some(node) = self.read_term(&mut lookahead)? {
            if lookahead.position() == end {
                *cursor = lookahead;
                return Ok(node);
            }
        }

        cursor.seek(end);
        Ok(Node::Anonymous(cursor.slice(start, end).to_string()))
    }

    fn read_term(&self, cursor: &mut Cursor<'_>) -> LessResult<Option<Node>> {
        let start = cursor.position();
        let location = self.location(start);
        let Some(ch) = cursor.peek_char() else {
            return Ok(None);
        };

        match ch {
            '\'' | '"' => {
                let value = cursor.read_quoted()?;
                Ok(Some(Node::Quoted(Quoted { value, quote: ch })))
            }
            '@' => {
                cursor.advance_char();
                let name = cursor.read_identifier();
                if name.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Node::Variable(name, location)))
            }
            '#' => {
                cursor.advance_char();
                cursor.read_identifier();
                let raw = cursor.slice(start, cursor.position());
                Ok(parse_color(raw).map(|rgba| Node::Color(Color::literal(raw, rgba))))
            }
            _ if cursor.starts_number() => Ok(cursor.read_dimension().map(Node::Dimension)),
            _ if is_ident_char(ch) => {
                let name = cursor.read_identifier();
                if !cursor.starts_with('(') {
                    return Ok(Some(match named_color(&name.to_ascii_lowercase()) {
                        Some(rgba) => Node::Color(Color::literal(name, rgba)),
                        None => Node::Keyword(name),
                    }));
                }
                if name.eq_ignore_ascii_case("url") {
                    let end = cursor.chunk_end(&[])?;
                    cursor.seek(end);
                    return Ok(Some(Node::Anonymous(cursor.slice(start, end).to_string())));
                }
                cursor.expect_char('(')?;
                cursor.skip_whitespace_and_comments();
                let args = if cursor.starts_with(')') {
                    Vec::new()
                } else {
                    match self.read_value(cursor, &[')'])? {
                        Node::List(items) => items,
                        single => vec![single],
                    }
                };
                cursor.skip_whitespace_and_comments();
                cursor.expect_char(')')?;
                Ok(Some(Node::Call(Call::new(name, args, location))))
            }
            _ => Ok(None),
        }
    }
}

/// 带位置指针的输入游标，提供便捷的字符读取与回退功能。
#[derive(Clone)]
struct Cursor<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn seek(&mut self, position: usize) {
        self.position = position.min(self.source.len());
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    fn starts_with(&self, ch: char) -> bool {
        self.peek_char() == Some(ch)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.position..].chars().nth(n)
    }

    fn advance_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn expect_char(&mut self, expect: char) -> LessResult<()> {
        match self.advance_char() {
            Some(ch) if ch == expect => Ok(()),
            Some(ch) => Err(LessError::parse(
                format!("期待字符 '{expect}', 却得到 '{ch}'"),
                self.position,
            )),
            None => Err(LessError::parse(
                format!("期待字符 '{expect}'"),
                self.position,
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.skip_whitespace();
            if self.starts_with('/') && self.consume_comment() {
                continue;
            }
            break;
        }
    }

    fn consume_comment(&mut self) -> bool {
        if self.match_str("//") {
            while let Some(ch) = self.advance_char() {
                if ch == '\n' {
                    break;
                }
            }
            true
        } else if self.match_str("/*") {
            while !self.is_eof() {
                if self.match_str("*/") {
                    break;
                }
                self.advance_char();
            }
            true
        } else {
            false
        }
    }

    fn match_str(&mut self, prefix: &str) -> bool {
        if self.source[self.position..].starts_with(prefix) {
            self.position += prefix.len();
            true
        } else {
            false
        }
    }

    fn starts_with_keyword(&self, keyword: &str) -> bool {
        let rest = &self.source[self.position..];
        if !rest.starts_with(keyword) {
            return false;
        }
        match rest[keyword.len()..].chars().next() {
            Some(ch) => !is_ident_char(ch),
            None => true,
        }
    }

    fn consume_keyword(&mut self, keyword: &str) {
        self.position += keyword.len();
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(ch) = self.peek_char() {
            if is_ident_char(ch) {
                ident.push(ch);
                self.advance_char();
            } else {
                break;
            }
        }
        ident
    }

    fn read_property_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek_char() {
            if ch == ':' || ch == ';' || ch.is_control() {
                break;
            }
            name.push(ch);
            self.advance_char();
        }
        name.trim().to_string()
    }

    fn read_mixin_name(&mut self) -> LessResult<String> {
        let start = self.position;
        while matches!(self.peek_char(), Some('.') | Some('#')) {
            self.advance_char();
            let segment = self.position;
            loop {
                if self.match_str("@{") {
                    self.read_until('}')?;
                    self.advance_char();
                } else if self.read_identifier().is_empty() {
                    break;
                }
            }
            if self.position == segment {
                return Err(LessError::parse("mixin 名称不能为空", self.position));
            }
        }
        if self.position == start {
            return Err(LessError::parse(
                "mixin 调用必须以 '.' 或 '#' 开头",
                self.position,
            ));
        }
        Ok(self.source[start..self.position].to_string())
    }

    fn read_until(&mut self, end: char) -> LessResult<String> {
        let mut result = String::new();
        while let Some(ch) = self.peek_char() {
            if ch == end {
                break;
            }
            result.push(ch);
            self.advance_char();
        }
        if self.peek_char() != Some(end) {
            return Err(LessError::parse(format!("期待字符 '{end}'"), self.position));
        }
        Ok(result)
    }

    /// 读取引号字符串，返回不含引号的内容（保留转义）。
    fn read_quoted(&mut self) -> LessResult<String> {
        let start = self.position;
        let Some(quote) = self.advance_char() else {
            return Err(LessError::parse("期待字符串", start));
        };
        let mut value = String::new();
        loop {
            match self.advance_char() {
                Some(ch) if ch == quote => return Ok(value),
                Some('\\') => {
                    value.push('\\');
                    if let Some(escaped) = self.advance_char() {
                        value.push(escaped);
                    }
                }
                Some(ch) => value.push(ch),
                None => return Err(LessError::parse("字符串缺少结束引号", start)),
            }
        }
    }

    fn starts_number(&self) -> bool {
        let digit_at = |n: usize| self.peek_nth(n).is_some_and(|ch| ch.is_ascii_digit());
        match self.peek_char() {
            Some(ch) if ch.is_ascii_digit() => true,
            Some('.') => digit_at(1),
            Some('+') | Some('-') => digit_at(1) || (self.peek_nth(1) == Some('.') && digit_at(2)),
            _ => false,
        }
    }

    fn read_dimension(&mut self) -> Option<Dimension> {
        let start = self.position;
        if matches!(self.peek_char(), Some('+') | Some('-')) {
            self.advance_char();
        }
        self.skip_digits();
        if self.starts_with('.') && self.peek_nth(1).is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance_char();
            self.skip_digits();
        }
        let value = self.source[start..self.position].parse::<f64>().ok()?;

        let unit = if self.starts_with('%') {
            self.advance_char();
            "%".to_string()
        } else {
            let mut unit = String::new();
            while let Some(ch) = self.peek_char() {
                if ch.is_ascii_alphabetic() {
                    unit.push(ch);
                    self.advance_char();
                } else {
                    break;
                }
            }
            unit
        };
        Some(Dimension::new(value, unit))
    }

    fn skip_digits(&mut self) {
        while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance_char();
        }
    }

    /// 从当前位置向后扫描，找到顶层空白、逗号或终止符所在位置；括号与引号内的内容整体跳过。
    fn chunk_end(&self, terminators: &[char]) -> LessResult<usize> {
        let mut scan = self.clone();
        let mut depth = 0usize;
        while let Some(ch) = scan.peek_char() {
            if depth == 0 && (ch.is_whitespace() || ch == ',' || terminators.contains(&ch)) {
                break;
            }
            match ch {
                '\'' | '"' => {
                    scan.read_quoted()?;
                    continue;
                }
                '(' => depth += 1,
                ')' if depth > 0 => depth -= 1,
                ')' => break,
                _ => {}
            }
            scan.advance_char();
        }
        if depth > 0 {
            return Err(LessError::parse("缺少匹配的 ')'", scan.position));
        }
        Ok(scan.position)
    }

    fn lookahead_is_variable_decl(&self) -> bool {
        let mut lookahead = self.clone();
        if lookahead.advance_char() != Some('@') || lookahead.read_identifier().is_empty() {
            return false;
        }
        lookahead.skip_whitespace();
        lookahead.starts_with(':')
    }

    /// 当前位于 `(`，判断与之匹配的 `)` 之前是否出现顶层分号。
    fn arguments_use_semicolons(&self) -> bool {
        let mut scan = self.clone();
        scan.advance_char();
        let mut depth = 0usize;
        while let Some(ch) = scan.peek_char() {
            match ch {
                '\'' | '"' => {
                    if scan.read_quoted().is_err() {
                        return false;
                    }
                    continue;
                }
                '(' => depth += 1,
                ')' if depth == 0 => return false,
                ')' => depth -= 1,
                ';' if depth == 0 => return true,
                _ => {}
            }
            scan.advance_char();
        }
        false
    }
}
