//! Rule language parser.
//!
//! Recursive descent parser for strategy text of the form
//! `ENTRY: <expr>` newline `EXIT: <expr>`. Converts text to AST with
//! meaningful error messages including character offset.
//!
//! Precedence, loosest first: OR, AND, comparison. Parentheses group
//! boolean expressions. Keywords are case-sensitive and whitespace is
//! insignificant. Parsing is total: malformed text always fails with a
//! [`ParseError`], never a partial AST.

use crate::domain::bar::SeriesField;
use crate::domain::error::ParseError;
use crate::domain::indicator::{IndicatorKind, IndicatorSpec};
use crate::domain::rule::{CompareOp, Operand, Rule, Strategy};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        remaining.starts_with(keyword)
            && (remaining.len() == keyword.len()
                || !remaining[keyword.len()..]
                    .chars()
                    .next()
                    .map(|c| c.is_alphanumeric() || c == '_')
                    .unwrap_or(false))
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            let found = self.peek_word();
            Err(ParseError {
                message: format!("expected '{}', found '{}'", keyword, found),
                position: self.pos,
            })
        }
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn consume_exact(&mut self, s: &str) -> bool {
        if self.remaining().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_integer(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected integer".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<usize>().map_err(|_| ParseError {
            message: format!("invalid integer: {}", num_str),
            position: start,
        })
    }

    fn parse_series_name(&mut self) -> Result<SeriesField, ParseError> {
        self.skip_whitespace();
        let word = self.peek_word();
        match SeriesField::from_name(&word) {
            Some(field) => {
                self.pos += word.len();
                Ok(field)
            }
            None => Err(ParseError {
                message: format!(
                    "expected series (open, high, low, close, volume), found '{}'",
                    word
                ),
                position: self.pos,
            }),
        }
    }

    fn parse_series(&mut self) -> Result<Operand, ParseError> {
        let field = self.parse_series_name()?;

        let mut lookback = 0;
        if self.peek() == Some('[') {
            self.advance();
            self.expect_char('-')?;
            lookback = self.parse_integer()?;
            self.expect_char(']')?;
        }

        Ok(Operand::Series { field, lookback })
    }

    fn parse_indicator(&mut self, kind: IndicatorKind) -> Result<Operand, ParseError> {
        let source = self.parse_series_name()?;
        self.expect_char(',')?;

        self.skip_whitespace();
        let period_pos = self.pos;
        let period = self.parse_integer()?;
        if period == 0 {
            return Err(ParseError {
                message: "indicator period must be positive".to_string(),
                position: period_pos,
            });
        }

        self.expect_char(')')?;
        Ok(Operand::Indicator(IndicatorSpec {
            kind,
            source,
            period,
        }))
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();

        if self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == '-' || ch == '.')
        {
            let num = self.parse_number()?;
            return Ok(Operand::Constant(num));
        }

        if self.consume_exact("SMA(") {
            return self.parse_indicator(IndicatorKind::Sma);
        }
        if self.consume_exact("RSI(") {
            return self.parse_indicator(IndicatorKind::Rsi);
        }

        let word = self.peek_word();
        if SeriesField::from_name(&word).is_some() {
            return self.parse_series();
        }

        Err(ParseError {
            message: format!(
                "expected value (number, series, or indicator), found '{}'",
                word
            ),
            position: self.pos,
        })
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp, ParseError> {
        self.skip_whitespace();

        // Two-character operators before their one-character prefixes.
        if self.consume_exact(">=") {
            return Ok(CompareOp::Ge);
        }
        if self.consume_exact("<=") {
            return Ok(CompareOp::Le);
        }
        if self.consume_exact("==") {
            return Ok(CompareOp::Eq);
        }
        if self.consume_exact("!=") {
            return Ok(CompareOp::Ne);
        }
        if self.consume_exact(">") {
            return Ok(CompareOp::Gt);
        }
        if self.consume_exact("<") {
            return Ok(CompareOp::Lt);
        }
        if self.consume_keyword("CROSSES_ABOVE") {
            return Ok(CompareOp::CrossesAbove);
        }
        if self.consume_keyword("CROSSES_BELOW") {
            return Ok(CompareOp::CrossesBelow);
        }

        let found = self.peek_word();
        Err(ParseError {
            message: format!("expected comparison operator, found '{}'", found),
            position: self.pos,
        })
    }

    fn parse_comparison(&mut self) -> Result<Rule, ParseError> {
        let left = self.parse_operand()?;
        let op = self.parse_compare_op()?;
        let right = self.parse_operand()?;
        Ok(Rule::Compare { op, left, right })
    }

    fn parse_primary(&mut self) -> Result<Rule, ParseError> {
        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect_char(')')?;
            return Ok(expr);
        }
        self.parse_comparison()
    }

    fn parse_and(&mut self) -> Result<Rule, ParseError> {
        let mut left = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            if self.consume_keyword("AND") {
                let right = self.parse_primary()?;
                left = Rule::And(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Rule, ParseError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.consume_keyword("OR") {
                let right = self.parse_and()?;
                left = Rule::Or(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_strategy(&mut self) -> Result<Strategy, ParseError> {
        self.expect_keyword("ENTRY")?;
        self.expect_char(':')?;
        let entry = self.parse_expr()?;

        self.expect_keyword("EXIT")?;
        self.expect_char(':')?;
        let exit = self.parse_expr()?;

        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input after rules: '{}'", self.remaining()),
                position: self.pos,
            });
        }

        Ok(Strategy { entry, exit })
    }
}

pub fn parse(input: &str) -> Result<Strategy, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse_strategy()
}
