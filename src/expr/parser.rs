//! Recursive descent parser for formula expressions.
//!
//! Grammar, in precedence order:
//!
//! ```text
//! expr      := mul (("+" | "-") mul)*
//! mul       := unary (("*" | "/") unary)*
//! unary     := "-" unary | atom
//! atom      := NUMBER ["%"] | "(" expr ")" | "emoluments" "[" STRING "]"
//!            | "SUM" "(" "emoluments" "WHERE" predicate ")"
//!            | "progressive_tax" "(" expr ")" [using]
//!            | IDENT
//! predicate := clause ("AND" clause)*
//! clause    := "payroll_category" "=" STRING
//!            | "payroll_category" "IN" "(" STRING ("," STRING)* ")"
//!            | ("is_pensionable" | "is_taxable") "=" ("TRUE" | "FALSE")
//! using     := "USING" "tax_brackets" "WHERE" "is_active" "=" "TRUE"
//! ```
//!
//! Keywords are case-insensitive. Only the two listed functions exist;
//! calling anything else is a syntax error.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::expr::ast::{BinaryOp, ComponentFilter, Expr, FilterClause};
use crate::expr::lexer::{Spanned, Token, lex};
use crate::models::ComponentCategory;

/// Parses a formula expression into its AST.
///
/// `formula_code` labels syntax errors with the formula they came from.
pub fn parse(src: &str, formula_code: &str) -> EngineResult<Expr> {
    let tokens = lex(src, formula_code)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        formula_code,
    };
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    formula_code: &'a str,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &Spanned {
        // The token stream always terminates with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        let next = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[next].token
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn err(&self, message: impl Into<String>) -> EngineError {
        EngineError::ExpressionSyntax {
            formula_code: self.formula_code.to_string(),
            message: format!("{} at position {}", message.into(), self.cur().pos),
        }
    }

    fn cur_is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.cur().token, Token::Ident(word) if word.eq_ignore_ascii_case(keyword))
    }

    fn expect_keyword(&mut self, keyword: &str) -> EngineResult<()> {
        if self.cur_is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{keyword}'")))
        }
    }

    fn expect_token(&mut self, expected: Token, symbol: &str) -> EngineResult<()> {
        if self.cur().token == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{symbol}'")))
        }
    }

    fn expect_eof(&mut self) -> EngineResult<()> {
        if self.cur().token == Token::Eof {
            Ok(())
        } else {
            Err(self.err("unexpected trailing input"))
        }
    }

    fn take_ident(&mut self, what: &str) -> EngineResult<String> {
        match &self.cur().token {
            Token::Ident(word) => {
                let word = word.clone();
                self.advance();
                Ok(word)
            }
            _ => Err(self.err(format!("expected {what}"))),
        }
    }

    fn take_string(&mut self, what: &str) -> EngineResult<String> {
        match &self.cur().token {
            Token::Str(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.err(format!("expected {what}"))),
        }
    }

    fn take_bool(&mut self) -> EngineResult<bool> {
        let word = self.take_ident("TRUE or FALSE")?;
        if word.eq_ignore_ascii_case("TRUE") {
            Ok(true)
        } else if word.eq_ignore_ascii_case("FALSE") {
            Ok(false)
        } else {
            Err(self.err(format!("expected TRUE or FALSE, found '{word}'")))
        }
    }

    fn take_category(&mut self) -> EngineResult<ComponentCategory> {
        let label = self.take_string("a category label")?;
        ComponentCategory::from_str(&label).map_err(|message| self.err(message))
    }

    fn parse_expr(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.cur().token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.cur().token {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> EngineResult<Expr> {
        if self.cur().token == Token::Minus {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> EngineResult<Expr> {
        match &self.cur().token {
            Token::Number(value) => {
                let value = *value;
                self.advance();
                if self.cur().token == Token::Percent {
                    self.advance();
                    return Ok(Expr::Number(value / Decimal::ONE_HUNDRED));
                }
                Ok(Expr::Number(value))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_token(Token::RParen, ")")?;
                Ok(inner)
            }
            Token::Ident(name) => {
                let name = name.clone();
                if *self.peek() == Token::LParen {
                    if name.eq_ignore_ascii_case("SUM") {
                        return self.parse_sum();
                    }
                    if name.eq_ignore_ascii_case("progressive_tax") {
                        return self.parse_progressive_tax();
                    }
                    return Err(self.err(format!("unknown function '{name}'")));
                }
                if name.eq_ignore_ascii_case("emoluments") && *self.peek() == Token::LBracket {
                    return self.parse_emolument_lookup();
                }
                self.advance();
                Ok(Expr::Variable(name))
            }
            Token::Str(_) => Err(self.err("string literals are only valid inside a predicate")),
            _ => Err(self.err("expected a value")),
        }
    }

    fn parse_emolument_lookup(&mut self) -> EngineResult<Expr> {
        self.advance(); // emoluments
        self.expect_token(Token::LBracket, "[")?;
        let code = self.take_string("a component code")?;
        self.expect_token(Token::RBracket, "]")?;
        Ok(Expr::EmolumentLookup(code))
    }

    fn parse_sum(&mut self) -> EngineResult<Expr> {
        self.advance(); // SUM
        self.expect_token(Token::LParen, "(")?;
        self.expect_keyword("emoluments")?;
        self.expect_keyword("WHERE")?;
        let mut clauses = vec![self.parse_filter_clause()?];
        while self.cur_is_keyword("AND") {
            self.advance();
            clauses.push(self.parse_filter_clause()?);
        }
        self.expect_token(Token::RParen, ")")?;
        Ok(Expr::Sum(ComponentFilter::new(clauses)))
    }

    fn parse_filter_clause(&mut self) -> EngineResult<FilterClause> {
        let field = self.take_ident("a predicate field")?;
        if field.eq_ignore_ascii_case("payroll_category") {
            if self.cur().token == Token::Eq {
                self.advance();
                return Ok(FilterClause::CategoryEquals(self.take_category()?));
            }
            if self.cur_is_keyword("IN") {
                self.advance();
                self.expect_token(Token::LParen, "(")?;
                let mut categories = vec![self.take_category()?];
                while self.cur().token == Token::Comma {
                    self.advance();
                    categories.push(self.take_category()?);
                }
                self.expect_token(Token::RParen, ")")?;
                return Ok(FilterClause::CategoryIn(categories));
            }
            return Err(self.err("expected '=' or 'IN' after payroll_category"));
        }
        if field.eq_ignore_ascii_case("is_pensionable") {
            self.expect_token(Token::Eq, "=")?;
            return Ok(FilterClause::Pensionable(self.take_bool()?));
        }
        if field.eq_ignore_ascii_case("is_taxable") {
            self.expect_token(Token::Eq, "=")?;
            return Ok(FilterClause::Taxable(self.take_bool()?));
        }
        Err(self.err(format!("unknown predicate field '{field}'")))
    }

    fn parse_progressive_tax(&mut self) -> EngineResult<Expr> {
        self.advance(); // progressive_tax
        self.expect_token(Token::LParen, "(")?;
        let arg = self.parse_expr()?;
        self.expect_token(Token::RParen, ")")?;
        if self.cur_is_keyword("USING") {
            self.parse_using_clause()?;
        }
        Ok(Expr::ProgressiveTax(Box::new(arg)))
    }

    // The USING tail names the snapshot's active bracket table, which is the
    // only table the evaluator can reach; parsing validates it and moves on.
    fn parse_using_clause(&mut self) -> EngineResult<()> {
        self.advance(); // USING
        let source = self.take_ident("a bracket source")?;
        if !source.eq_ignore_ascii_case("tax_brackets") {
            return Err(self.err(format!("unknown bracket source '{source}'")));
        }
        self.expect_keyword("WHERE")?;
        let field = self.take_ident("is_active")?;
        if !field.eq_ignore_ascii_case("is_active") {
            return Err(self.err(format!("unknown bracket filter '{field}'")));
        }
        self.expect_token(Token::Eq, "=")?;
        if !self.take_bool()? {
            return Err(self.err("only the active bracket table is available"));
        }
        Ok(())
    }
}
