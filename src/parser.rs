use crate::ast::Ast;
use crate::comparison::number_value;
use crate::errors::{Error, Result};
use crate::operators::OperatorTable;
use serde_json::{Number, Value};

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Single-pass recursive-descent parser over a character cursor. There
/// is no separate lexer: every level reads straight from the source,
/// skipping whitespace between tokens.
///
/// Precedence, loosest to tightest: `|`, `or`, `and`, comparison
/// (including `in`, `not in` and per-compile custom operators), `+ -`,
/// `* / %`, `^` (right-associative), unary `-`/`not`, primary.
pub(crate) struct Parser<'a> {
    source: &'a str,
    pos: usize,
    operators: &'a OperatorTable,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, operators: &'a OperatorTable) -> Parser<'a> {
        Parser {
            source,
            pos: 0,
            operators,
        }
    }

    pub(crate) fn parse(&mut self) -> Result<Ast> {
        let ast = self.parse_pipe()?;
        self.skip_ws();
        if !self.eof() {
            return Err(self.fail("unexpected trailing input"));
        }
        Ok(ast)
    }

    // ------------------------------------------------------ cursor

    fn fail(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.fail(format!("expected '{c}'")))
        }
    }

    fn skip_ws(&mut self) {
        self.pos = self.ws_end(self.pos);
    }

    fn eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn ws_end(&self, mut offset: usize) -> usize {
        while let Some(c) = self.source[offset..].chars().next() {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                offset += c.len_utf8();
            } else {
                break;
            }
        }
        offset
    }

    /// True if `kw` sits at `offset` as a whole word.
    fn keyword_at(&self, offset: usize, kw: &str) -> bool {
        self.source[offset..].starts_with(kw)
            && !self.source[offset + kw.len()..]
                .chars()
                .next()
                .map(is_ident_char)
                .unwrap_or(false)
    }

    fn peek_keyword(&self, kw: &str) -> bool {
        self.keyword_at(self.pos, kw)
    }

    fn consume_keyword(&mut self, kw: &str) -> bool {
        if self.peek_keyword(kw) {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    // ------------------------------------------------- binary levels

    fn parse_pipe(&mut self) -> Result<Ast> {
        let mut items = vec![self.parse_or()?];
        loop {
            self.skip_ws();
            if self.consume_char('|') {
                items.push(self.parse_or()?);
            } else {
                break;
            }
        }
        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(Ast::Pipe(items))
        }
    }

    fn parse_or(&mut self) -> Result<Ast> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            if self.consume_keyword("or") {
                let right = self.parse_and()?;
                left = Ast::function("or", vec![left, right]);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_and(&mut self) -> Result<Ast> {
        let mut left = self.parse_comparison()?;
        loop {
            self.skip_ws();
            if self.consume_keyword("and") {
                let right = self.parse_comparison()?;
                left = Ast::function("and", vec![left, right]);
            } else {
                return Ok(left);
            }
        }
    }

    /// The comparison tier also hosts `in`, `not in` and any custom
    /// operators registered for this compile. Returns the canonical
    /// function name and how many bytes the symbol spans.
    fn match_comparison_op(&self) -> Option<(String, usize)> {
        for (symbol, name) in self.operators.comparison_ops() {
            if symbol == "not in" {
                // Two words; any amount of whitespace between them.
                if self.peek_keyword("not") {
                    let after = self.ws_end(self.pos + "not".len());
                    if after > self.pos + "not".len() && self.keyword_at(after, "in") {
                        return Some((name.to_string(), after + "in".len() - self.pos));
                    }
                }
                continue;
            }
            let word = symbol.chars().next().map(is_ident_start).unwrap_or(false);
            let hit = if word {
                self.peek_keyword(symbol)
            } else {
                self.rest().starts_with(symbol)
            };
            if hit {
                return Some((name.to_string(), symbol.len()));
            }
        }
        None
    }

    fn parse_comparison(&mut self) -> Result<Ast> {
        let mut left = self.parse_additive()?;
        loop {
            self.skip_ws();
            match self.match_comparison_op() {
                Some((name, consumed)) => {
                    self.pos += consumed;
                    let right = self.parse_additive()?;
                    left = Ast::function(name, vec![left, right]);
                }
                None => return Ok(left),
            }
        }
    }

    fn parse_additive(&mut self) -> Result<Ast> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_ws();
            let name = match self.peek_char() {
                Some('+') => "add",
                Some('-') => "subtract",
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_multiplicative()?;
            left = Ast::function(name, vec![left, right]);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Ast> {
        let mut left = self.parse_power()?;
        loop {
            self.skip_ws();
            let name = match self.peek_char() {
                Some('*') => "multiply",
                Some('/') => "divide",
                Some('%') => "mod",
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_power()?;
            left = Ast::function(name, vec![left, right]);
        }
    }

    /// `^` is the one right-associative operator.
    fn parse_power(&mut self) -> Result<Ast> {
        let base = self.parse_unary()?;
        self.skip_ws();
        if self.consume_char('^') {
            let exponent = self.parse_power()?;
            Ok(Ast::function("pow", vec![base, exponent]))
        } else {
            Ok(base)
        }
    }

    fn parse_unary(&mut self) -> Result<Ast> {
        self.skip_ws();
        if self.consume_keyword("not") {
            let operand = self.parse_unary()?;
            return Ok(Ast::function("not", vec![operand]));
        }
        if self.consume_char('-') {
            let operand = self.parse_unary()?;
            return Ok(negate(operand));
        }
        self.parse_primary()
    }

    // ------------------------------------------------------ primary

    fn parse_primary(&mut self) -> Result<Ast> {
        self.skip_ws();
        match self.peek_char() {
            None => Err(self.fail("expected expression")),
            Some('(') => {
                self.bump();
                let inner = self.parse_pipe()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(inner)
            }
            Some('{') => self.parse_object_literal(),
            Some('[') => self.parse_array_literal(),
            Some('"') => Ok(Ast::Literal(Value::String(self.parse_string_literal()?))),
            Some('/') => self.parse_regex_literal(),
            Some('.') => self.parse_property_chain(Vec::new()),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some(c) if is_ident_start(c) => self.parse_identifier_form(),
            Some(c) => Err(self.fail(format!("unexpected character '{c}'"))),
        }
    }

    /// A bare identifier is a keyword, a call (when a `(` follows it
    /// immediately) or the head of a property chain.
    fn parse_identifier_form(&mut self) -> Result<Ast> {
        let name = self.parse_identifier()?;
        match name.as_str() {
            "true" => return Ok(Ast::Literal(Value::Bool(true))),
            "false" => return Ok(Ast::Literal(Value::Bool(false))),
            "null" => return Ok(Ast::Literal(Value::Null)),
            _ => {}
        }
        if self.peek_char() == Some('(') {
            self.bump();
            let args = self.parse_call_args()?;
            return Ok(Ast::function(name, args));
        }
        self.parse_property_chain(vec![Ast::Literal(Value::String(name))])
    }

    fn parse_call_args(&mut self) -> Result<Vec<Ast>> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.consume_char(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_pipe()?);
            self.skip_ws();
            if self.consume_char(',') {
                continue;
            }
            self.expect(')')?;
            return Ok(args);
        }
    }

    /// `.a.b."c"`: segments must be adjacent; each is an identifier or
    /// a quoted string. A lone `.` is the identity query `get()`.
    fn parse_property_chain(&mut self, mut keys: Vec<Ast>) -> Result<Ast> {
        while self.peek_char() == Some('.') {
            self.bump();
            let key = match self.peek_char() {
                Some('"') => self.parse_string_literal()?,
                Some(c) if is_ident_start(c) => self.parse_identifier()?,
                _ if keys.is_empty() => break,
                _ => return Err(self.fail("expected property name after '.'")),
            };
            keys.push(Ast::Literal(Value::String(key)));
        }
        Ok(Ast::function("get", keys))
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek_char() {
            Some(c) if is_ident_start(c) => self.bump(),
            _ => return Err(self.fail("expected identifier")),
        }
        while let Some(c) = self.peek_char() {
            if is_ident_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn parse_object_literal(&mut self) -> Result<Ast> {
        self.expect('{')?;
        let mut pairs = Vec::new();
        self.skip_ws();
        if self.consume_char('}') {
            return Ok(Ast::Object(pairs));
        }
        loop {
            self.skip_ws();
            let key = match self.peek_char() {
                Some('"') => self.parse_string_literal()?,
                Some(c) if is_ident_start(c) => self.parse_identifier()?,
                _ => return Err(self.fail("expected object key")),
            };
            self.skip_ws();
            self.expect(':')?;
            let value = self.parse_pipe()?;
            pairs.push((key, value));
            self.skip_ws();
            if self.consume_char(',') {
                continue;
            }
            self.expect('}')?;
            return Ok(Ast::Object(pairs));
        }
    }

    fn parse_array_literal(&mut self) -> Result<Ast> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.consume_char(']') {
            return Ok(Ast::Array(items));
        }
        loop {
            items.push(self.parse_pipe()?);
            self.skip_ws();
            if self.consume_char(',') {
                continue;
            }
            self.expect(']')?;
            return Ok(Ast::Array(items));
        }
    }

    fn parse_string_literal(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let c = match self.peek_char() {
                Some(c) => c,
                None => return Err(self.fail("unterminated string")),
            };
            self.bump();
            match c {
                '"' => return Ok(out),
                '\\' => out.push(self.parse_escape()?),
                _ => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char> {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Err(self.fail("unterminated string")),
        };
        self.bump();
        Ok(match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'u' => return self.parse_unicode_escape(),
            other => return Err(self.fail(format!("invalid escape '\\{other}'"))),
        })
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        let high = self.parse_hex4()?;
        // Surrogate pairs arrive as two \uXXXX escapes.
        if (0xD800..=0xDBFF).contains(&high) {
            if !(self.consume_char('\\') && self.consume_char('u')) {
                return Err(self.fail("expected low surrogate escape"));
            }
            let low = self.parse_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.fail("invalid low surrogate"));
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code).ok_or_else(|| self.fail("invalid unicode escape"));
        }
        char::from_u32(high).ok_or_else(|| self.fail("invalid unicode escape"))
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .peek_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.fail("expected four hex digits"))?;
            self.bump();
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Ast> {
        let start = self.pos;
        if self.consume_char('0') {
            if matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                return Err(self.fail("leading zeros are not allowed"));
            }
        } else {
            self.digits()?;
        }
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            // Only a fraction when a digit follows; otherwise the dot
            // belongs to whatever comes next.
            let next = self.source[self.pos + 1..].chars().next();
            if matches!(next, Some(c) if c.is_ascii_digit()) {
                self.bump();
                self.digits()?;
                is_float = true;
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            self.bump();
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.bump();
            }
            self.digits()?;
            is_float = true;
        }
        let text = &self.source[start..self.pos];
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Ast::Literal(Value::Number(Number::from(i))));
            }
        }
        let f = text
            .parse::<f64>()
            .map_err(|_| self.fail("invalid number"))?;
        if !f.is_finite() {
            return Err(self.fail("number out of range"));
        }
        Ok(Ast::Literal(number_value(f)))
    }

    fn digits(&mut self) -> Result<()> {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.fail("expected digit"));
        }
        Ok(())
    }

    /// `/pattern/flags`: desugars to a string literal; flags fold into
    /// the pattern as an inline group so the value stays a plain string.
    fn parse_regex_literal(&mut self) -> Result<Ast> {
        self.expect('/')?;
        let mut pattern = String::new();
        loop {
            let c = match self.peek_char() {
                Some(c) => c,
                None => return Err(self.fail("unterminated regex")),
            };
            self.bump();
            match c {
                '/' => break,
                '\\' => {
                    pattern.push('\\');
                    match self.peek_char() {
                        Some(next) => {
                            self.bump();
                            pattern.push(next);
                        }
                        None => return Err(self.fail("unterminated regex")),
                    }
                }
                _ => pattern.push(c),
            }
        }
        let mut flags = String::new();
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            match c {
                'i' | 'm' | 's' | 'u' => {
                    flags.push(c);
                    self.bump();
                }
                other => return Err(self.fail(format!("unsupported regex flag '{other}'"))),
            }
        }
        let pattern = if flags.is_empty() {
            pattern
        } else {
            format!("(?{flags}){pattern}")
        };
        Ok(Ast::Literal(Value::String(pattern)))
    }
}

fn negate(operand: Ast) -> Ast {
    match operand {
        Ast::Literal(Value::Number(n)) => Ast::Literal(negate_number(&n)),
        other => Ast::function("subtract", vec![Ast::Literal(Value::from(0)), other]),
    }
}

fn negate_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        if let Some(neg) = i.checked_neg() {
            return Value::Number(Number::from(neg));
        }
    }
    n.as_f64().map(|f| number_value(-f)).unwrap_or(Value::Null)
}
