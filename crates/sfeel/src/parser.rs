//! S-FEEL parser.
//!
//! A precedence-climbing parser over the token stream. Each grammar level is
//! one method; the levels from loosest to tightest binding are:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | disjunction | `or` |
//! | conjunction | `and` |
//! | negation | `not` |
//! | comparison | `=` `!=` `<` `<=` `>` `>=` `between` `in` `in(` `instance of` |
//! | additive | `+` `-` |
//! | multiplicative | `*` `/` |
//! | power | `**` |
//! | unary | prefix `-` |
//! | postfix | filter `[...]`, path `.name`, selectors |
//!
//! Syntax errors are recovered by dropping the offending token and parsing
//! the remaining stream again, so a single call reports every bad token.

use crate::ast::{
    Argument, ArithmeticOperator, ComparisonOperator, ContextEntry, Expr, Iteration, Literal,
    Quantifier, RangeBound, Statement, TypeName,
};
use crate::diagnostics::Diagnostics;
use crate::error::{SFeelError, SFeelResult};
use crate::functions::BuiltinFunction;
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Parses one line of S-FEEL.
///
/// Never fails: lexical and syntax problems are returned as diagnostics next
/// to whatever statement could be recovered.
///
/// # Example
///
/// ```rust
/// use sfeel::{parse, Statement};
///
/// let (diagnostics, statement) = parse("x <- 1 + 2");
/// assert!(diagnostics.is_empty());
/// assert!(matches!(statement, Some(Statement::Assignment { .. })));
///
/// let (diagnostics, statement) = parse("1 + + 2");
/// assert!(diagnostics.contains("Syntax error at token '+'"));
/// assert_eq!(statement.unwrap().to_string(), "1 + 2");
/// ```
pub fn parse(text: &str) -> (Diagnostics, Option<Statement>) {
    parse_tokens(tokenize(text))
}

/// Parses an already tokenized line. See [`parse`].
pub fn parse_tokens(tokens: Vec<Token>) -> (Diagnostics, Option<Statement>) {
    let mut diagnostics = Diagnostics::new();
    let mut usable = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.kind {
            TokenKind::Error(ch) => diagnostics.report(&SFeelError::IllegalCharacter {
                position: token.position,
                ch,
            }),
            _ => usable.push(token),
        }
    }

    while !usable.is_empty() {
        match Parser::new(&usable).statement() {
            Ok(statement) => return (diagnostics, Some(statement)),
            Err(failure) => {
                diagnostics.report(&failure.error);
                match failure.index {
                    Some(index) => {
                        usable.remove(index);
                    }
                    None => break,
                }
            }
        }
    }
    (diagnostics, None)
}

/// Parses one line of S-FEEL, failing on the first lexical or syntax error.
///
/// # Example
///
/// ```rust
/// use sfeel::{parse_strict, SFeelError};
///
/// assert!(parse_strict("[1..5]").is_ok());
/// assert_eq!(parse_strict("   "), Err(SFeelError::EmptyExpression));
/// assert_eq!(parse_strict("1 +"), Err(SFeelError::UnexpectedEof));
/// ```
pub fn parse_strict(text: &str) -> SFeelResult<Statement> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Err(SFeelError::EmptyExpression);
    }
    if let Some(token) = tokens.iter().find(|t| t.is_error()) {
        if let TokenKind::Error(ch) = token.kind {
            return Err(SFeelError::IllegalCharacter {
                position: token.position,
                ch,
            });
        }
    }
    Parser::new(&tokens).statement().map_err(|failure| failure.error)
}

// ============================================================================
// Parser state
// ============================================================================

/// A syntax error plus the index of the token to drop before retrying.
#[derive(Debug)]
struct Failure {
    index: Option<usize>,
    error: SFeelError,
}

type ParseResult<T> = Result<T, Failure>;

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Set while parsing the high endpoint of a range, where `[` closes the
    /// range instead of opening a filter.
    bracket_closes_range: bool,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            bracket_closes_range: false,
        }
    }

    fn peek(&self) -> Option<&'t TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error_here())
        }
    }

    fn error_here(&self) -> Failure {
        match self.tokens.get(self.pos) {
            Some(token) => Failure {
                index: Some(self.pos),
                error: SFeelError::Syntax {
                    position: token.position,
                    token: token.lexeme.clone(),
                },
            },
            None => Failure {
                index: None,
                error: SFeelError::UnexpectedEof,
            },
        }
    }

    /// Runs `parse` with `[` treated as a filter again, restoring the
    /// enclosing context afterwards.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = std::mem::replace(&mut self.bracket_closes_range, false);
        let result = parse(self);
        self.bracket_closes_range = saved;
        result
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> ParseResult<Statement> {
        let statement = match (self.peek(), self.peek_at(1)) {
            (Some(TokenKind::Name(name)), Some(TokenKind::Assign)) => {
                self.pos += 2;
                Statement::Assignment {
                    name: name.clone(),
                    value: self.statement_value()?,
                }
            }
            _ => Statement::Expression(self.statement_value()?),
        };
        if self.pos < self.tokens.len() {
            return Err(self.error_here());
        }
        Ok(statement)
    }

    /// A whole statement may be an equality test standing alone (`!= 5`).
    /// The ordering tests are already primaries.
    fn statement_value(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Some(TokenKind::Equal | TokenKind::NotEqual) => self.unary_test(),
            _ => self.expression(),
        }
    }

    // ========================================================================
    // Binary levels
    // ========================================================================

    fn expression(&mut self) -> ParseResult<Expr> {
        self.disjunction()
    }

    fn disjunction(&mut self) -> ParseResult<Expr> {
        let mut left = self.conjunction()?;
        while self.eat(&TokenKind::Or) {
            let right = self.conjunction()?;
            left = Expr::Or(left.boxed(), right.boxed());
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> ParseResult<Expr> {
        let mut left = self.negation()?;
        while self.eat(&TokenKind::And) {
            let right = self.negation()?;
            left = Expr::And(left.boxed(), right.boxed());
        }
        Ok(left)
    }

    fn negation(&mut self) -> ParseResult<Expr> {
        if self.eat(&TokenKind::Not) {
            return Ok(Expr::Not(self.negation()?.boxed()));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.additive()?;
        loop {
            let Some(kind) = self.peek() else { break };
            if let Some(op) = comparison_operator(kind) {
                self.advance();
                let right = self.additive()?;
                left = Expr::Comparison {
                    op,
                    left: left.boxed(),
                    right: right.boxed(),
                };
                continue;
            }
            left = match kind {
                TokenKind::Between => {
                    self.advance();
                    let low = self.additive()?;
                    self.expect(&TokenKind::And)?;
                    let high = self.additive()?;
                    Expr::Between {
                        value: left.boxed(),
                        low: low.boxed(),
                        high: high.boxed(),
                    }
                }
                TokenKind::In => {
                    self.advance();
                    let target = match self.peek() {
                        Some(kind) if kind.is_comparison() => self.unary_test()?,
                        _ => self.additive()?,
                    };
                    Expr::In {
                        value: left.boxed(),
                        target: target.boxed(),
                    }
                }
                TokenKind::InList => {
                    self.advance();
                    let tests = self.in_list()?;
                    Expr::InList {
                        value: left.boxed(),
                        tests,
                    }
                }
                TokenKind::InstanceOf => {
                    self.advance();
                    let type_name = self.type_name()?;
                    Expr::InstanceOf {
                        value: left.boxed(),
                        type_name,
                    }
                }
                _ => break,
            };
        }
        Ok(left)
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => ArithmeticOperator::Add,
                Some(TokenKind::Minus) => ArithmeticOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.multiplicative()?;
            left = Expr::Arithmetic {
                op,
                left: left.boxed(),
                right: right.boxed(),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.power()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => ArithmeticOperator::Multiply,
                Some(TokenKind::Slash) => ArithmeticOperator::Divide,
                _ => break,
            };
            self.advance();
            let right = self.power()?;
            left = Expr::Arithmetic {
                op,
                left: left.boxed(),
                right: right.boxed(),
            };
        }
        Ok(left)
    }

    fn power(&mut self) -> ParseResult<Expr> {
        let mut left = self.unary()?;
        while self.eat(&TokenKind::Power) {
            let right = self.unary()?;
            left = Expr::Arithmetic {
                op: ArithmeticOperator::Power,
                left: left.boxed(),
                right: right.boxed(),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.eat(&TokenKind::Minus) {
            return Ok(Expr::Negate(self.unary()?.boxed()));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                Some(TokenKind::LBracket) if !self.bracket_closes_range => {
                    self.advance();
                    let condition = self.nested(|p| p.test())?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = Expr::Filter {
                        target: expr.boxed(),
                        condition: condition.boxed(),
                    };
                }
                Some(TokenKind::Dot) => {
                    self.advance();
                    let name = self.property_name()?;
                    expr = Expr::Path {
                        target: expr.boxed(),
                        name,
                    };
                }
                Some(TokenKind::Selector(selector)) => {
                    self.advance();
                    expr = Expr::Path {
                        target: expr.boxed(),
                        name: selector.name().to_string(),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    fn primary(&mut self) -> ParseResult<Expr> {
        let Some(kind) = self.peek() else {
            return Err(self.error_here());
        };
        let literal = match kind {
            TokenKind::Number(n) => Some(Literal::Number(*n)),
            TokenKind::String(s) => Some(Literal::String(s.clone())),
            TokenKind::Boolean(b) => Some(Literal::Boolean(*b)),
            TokenKind::Null => Some(Literal::Null),
            TokenKind::Date(text) => Some(Literal::Date(text.clone())),
            TokenKind::Time(text) => Some(Literal::Time(text.clone())),
            TokenKind::DateTime(text) => Some(Literal::DateTime(text.clone())),
            TokenKind::DayTimeDuration(text) => Some(Literal::DayTimeDuration(text.clone())),
            TokenKind::YearMonthDuration(text) => Some(Literal::YearMonthDuration(text.clone())),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(Expr::Literal(literal));
        }

        match kind {
            TokenKind::Name(name) => {
                self.advance();
                Ok(Expr::Name(name.clone()))
            }
            TokenKind::Item => {
                self.advance();
                // `item key` is accepted as `item.key`
                if let Some(TokenKind::Name(name)) = self.peek() {
                    self.advance();
                    return Ok(Expr::Path {
                        target: Expr::Item.boxed(),
                        name: name.clone(),
                    });
                }
                Ok(Expr::Item)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.nested(|p| p.expression())?;
                if self.at(&TokenKind::Ellipsis) {
                    return self.range_tail(RangeBound::Open, inner);
                }
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                self.nested(|p| p.list_or_range())
            }
            TokenKind::RBracket => {
                self.advance();
                let low = self.nested(|p| p.expression())?;
                if !self.at(&TokenKind::Ellipsis) {
                    return Err(self.error_here());
                }
                self.range_tail(RangeBound::Open, low)
            }
            TokenKind::LBrace => {
                self.advance();
                self.nested(|p| p.context())
            }
            TokenKind::Function(function) => {
                self.advance();
                self.nested(|p| p.call(*function))
            }
            TokenKind::FunctionKeyword => {
                self.advance();
                self.nested(|p| p.lambda())
            }
            TokenKind::Some | TokenKind::Every => {
                let quantifier = if *kind == TokenKind::Some {
                    Quantifier::Some
                } else {
                    Quantifier::Every
                };
                self.advance();
                self.quantified(quantifier)
            }
            TokenKind::LessThan
            | TokenKind::LessOrEqual
            | TokenKind::GreaterThan
            | TokenKind::GreaterOrEqual => self.unary_test(),
            _ => Err(self.error_here()),
        }
    }

    /// After `[`: an empty list, a list literal, or a range with a closed
    /// start.
    fn list_or_range(&mut self) -> ParseResult<Expr> {
        if self.eat(&TokenKind::RBracket) {
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.test()?;
        if self.at(&TokenKind::Ellipsis) {
            return self.range_tail(RangeBound::Closed, first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            items.push(self.test()?);
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(Expr::List(items))
    }

    /// Parses `.. high end` where the cursor is on `..`.
    fn range_tail(&mut self, start: RangeBound, low: Expr) -> ParseResult<Expr> {
        self.expect(&TokenKind::Ellipsis)?;
        let saved = std::mem::replace(&mut self.bracket_closes_range, true);
        let high = self.expression();
        self.bracket_closes_range = saved;
        let high = high?;
        let end = match self.peek() {
            Some(TokenKind::RBracket) => RangeBound::Closed,
            Some(TokenKind::RParen) | Some(TokenKind::LBracket) => RangeBound::Open,
            _ => return Err(self.error_here()),
        };
        self.advance();
        Ok(Expr::Range {
            start,
            low: low.boxed(),
            high: high.boxed(),
            end,
        })
    }

    /// `< x`, `<= x`, `> x`, `>= x`, `= x`, `!= x`.
    fn unary_test(&mut self) -> ParseResult<Expr> {
        let op = self
            .peek()
            .and_then(comparison_operator)
            .ok_or_else(|| self.error_here())?;
        self.advance();
        let operand = self.additive()?;
        Ok(Expr::UnaryTest {
            op,
            operand: operand.boxed(),
        })
    }

    /// A unary test or a plain expression; used where `= x` / `!= x` are
    /// allowed (membership targets, `in(` lists, filters, list elements).
    fn test(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Some(kind) if kind.is_comparison() => self.unary_test(),
            _ => self.expression(),
        }
    }

    /// After `in(`: comma separated tests up to `)`. A range written straight
    /// after the parenthesis (`x in (1..5]`) takes `(` as its opening bracket.
    fn in_list(&mut self) -> ParseResult<Vec<Expr>> {
        if self.eat(&TokenKind::RParen) {
            return Ok(Vec::new());
        }
        let first = self.nested(|p| p.test())?;
        if self.at(&TokenKind::Ellipsis) && !matches!(first, Expr::UnaryTest { .. }) {
            return Ok(vec![self.range_tail(RangeBound::Open, first)?]);
        }
        let mut tests = vec![first];
        while self.eat(&TokenKind::Comma) {
            tests.push(self.nested(|p| p.test())?);
        }
        self.expect(&TokenKind::RParen)?;
        Ok(tests)
    }

    fn context(&mut self) -> ParseResult<Expr> {
        let mut entries = Vec::new();
        if self.eat(&TokenKind::RBrace) {
            return Ok(Expr::Context(entries));
        }
        loop {
            let key = self.context_key()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.expression()?;
            entries.push(ContextEntry { key, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::Context(entries))
    }

    fn context_key(&mut self) -> ParseResult<String> {
        if let Some(TokenKind::String(key)) = self.peek() {
            self.advance();
            return Ok(key.clone());
        }
        self.words().ok_or_else(|| self.error_here())
    }

    /// One or more consecutive names joined by single spaces.
    fn words(&mut self) -> Option<String> {
        let mut words: Vec<&str> = Vec::new();
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Name(word) => words.push(word),
                TokenKind::Item => words.push("item"),
                _ => break,
            }
            self.advance();
        }
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }

    fn property_name(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(TokenKind::Name(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            Some(TokenKind::Item) => {
                self.advance();
                Ok("item".to_string())
            }
            _ => Err(self.error_here()),
        }
    }

    /// After a function token: arguments up to `)`.
    fn call(&mut self, function: BuiltinFunction) -> ParseResult<Expr> {
        let mut arguments = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                arguments.push(self.argument()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }
        if function == BuiltinFunction::Not
            && arguments.len() == 1
            && matches!(arguments[0], Argument::Positional(_))
        {
            if let Some(Argument::Positional(inner)) = arguments.pop() {
                return Ok(Expr::Not(inner.boxed()));
            }
        }
        Ok(Expr::Call {
            function,
            arguments,
        })
    }

    fn argument(&mut self) -> ParseResult<Argument> {
        if self.named_argument_ahead() {
            let name = self.words().ok_or_else(|| self.error_here())?;
            self.expect(&TokenKind::Colon)?;
            let value = self.expression()?;
            return Ok(Argument::Named { name, value });
        }
        Ok(Argument::Positional(self.test()?))
    }

    fn named_argument_ahead(&self) -> bool {
        let mut offset = 0;
        while let Some(TokenKind::Name(_)) = self.peek_at(offset) {
            offset += 1;
        }
        offset > 0 && self.peek_at(offset) == Some(&TokenKind::Colon)
    }

    /// After `function`: `(a, b) body`.
    fn lambda(&mut self) -> ParseResult<Expr> {
        self.expect(&TokenKind::LParen)?;
        let mut parameters = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                match self.peek() {
                    Some(TokenKind::Name(name)) => {
                        parameters.push(name.clone());
                        self.advance();
                    }
                    _ => return Err(self.error_here()),
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }
        let body = self.expression()?;
        Ok(Expr::Lambda {
            parameters,
            body: body.boxed(),
        })
    }

    /// After `some` / `every`.
    fn quantified(&mut self, quantifier: Quantifier) -> ParseResult<Expr> {
        let mut iterations = Vec::new();
        loop {
            let name = match self.peek() {
                Some(TokenKind::Name(name)) => name.clone(),
                _ => return Err(self.error_here()),
            };
            self.advance();
            let source = match self.peek() {
                Some(TokenKind::In) => {
                    self.advance();
                    self.expression()?
                }
                Some(TokenKind::InList) => {
                    self.advance();
                    let source = self.nested(|p| p.expression())?;
                    self.expect(&TokenKind::RParen)?;
                    source
                }
                _ => return Err(self.error_here()),
            };
            iterations.push(Iteration { name, source });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Satisfies)?;
        let condition = self.expression()?;
        Ok(Expr::Quantified {
            quantifier,
            iterations,
            condition: condition.boxed(),
        })
    }

    /// After `instance of`: the longest type name spelled by the next words.
    fn type_name(&mut self) -> ParseResult<TypeName> {
        let mut words = Vec::new();
        for offset in 0..4 {
            match self.peek_at(offset) {
                Some(TokenKind::Name(word)) => words.push(word.as_str()),
                Some(TokenKind::And) => words.push("and"),
                Some(TokenKind::Null) => words.push("null"),
                _ => break,
            }
        }
        for len in (1..=words.len()).rev() {
            if let Some(type_name) = TypeName::from_name(&words[..len].join(" ")) {
                self.pos += len;
                return Ok(type_name);
            }
        }
        Err(self.error_here())
    }
}

fn comparison_operator(kind: &TokenKind) -> Option<ComparisonOperator> {
    match kind {
        TokenKind::Equal => Some(ComparisonOperator::Equal),
        TokenKind::NotEqual => Some(ComparisonOperator::NotEqual),
        TokenKind::LessThan => Some(ComparisonOperator::LessThan),
        TokenKind::LessOrEqual => Some(ComparisonOperator::LessOrEqual),
        TokenKind::GreaterThan => Some(ComparisonOperator::GreaterThan),
        TokenKind::GreaterOrEqual => Some(ComparisonOperator::GreaterOrEqual),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(text: &str) -> Expr {
        match parse_strict(text) {
            Ok(Statement::Expression(expr)) => expr,
            other => panic!("Expected expression for {:?}, got {:?}", text, other),
        }
    }

    mod precedence {
        use super::*;

        #[test]
        fn test_multiplication_binds_tighter_than_addition() {
            assert_eq!(expr("1 + 2 * 3").to_string(), "1 + (2 * 3)");
        }

        #[test]
        fn test_comparison_binds_tighter_than_logic() {
            assert_eq!(expr("a < b and c > d").to_string(), "(a < b) and (c > d)");
            assert_eq!(expr("a or b and c").to_string(), "a or (b and c)");
        }

        #[test]
        fn test_unary_minus_binds_tighter_than_power() {
            assert_eq!(expr("-2 ** 2").to_string(), "(-2) ** 2");
        }

        #[test]
        fn test_between() {
            let e = expr("5 between 3 and 7");
            assert!(matches!(e, Expr::Between { .. }));
        }

        #[test]
        fn test_postfix_chain() {
            assert_eq!(
                expr("x.a[item > 1].b").to_string(),
                "x.a[item > 1].b"
            );
        }
    }

    mod ranges {
        use super::*;

        fn bounds(e: &Expr) -> (RangeBound, RangeBound) {
            match e {
                Expr::Range { start, end, .. } => (*start, *end),
                other => panic!("Expected range, got {:?}", other),
            }
        }

        #[test]
        fn test_all_bracket_forms() {
            use RangeBound::{Closed, Open};
            assert_eq!(bounds(&expr("[1..5]")), (Closed, Closed));
            assert_eq!(bounds(&expr("(1..5)")), (Open, Open));
            assert_eq!(bounds(&expr("(1..5]")), (Open, Closed));
            assert_eq!(bounds(&expr("[1..5)")), (Closed, Open));
            assert_eq!(bounds(&expr("]1..5]")), (Open, Closed));
            assert_eq!(bounds(&expr("[1..5[")), (Closed, Open));
            assert_eq!(bounds(&expr("(3 .. 5[")), (Open, Open));
        }

        #[test]
        fn test_one_sided_unary_tests() {
            assert!(matches!(
                expr("<= 5"),
                Expr::UnaryTest {
                    op: ComparisonOperator::LessOrEqual,
                    ..
                }
            ));
        }

        #[test]
        fn test_equality_unary_tests_stand_alone() {
            assert!(matches!(
                expr("!= 5"),
                Expr::UnaryTest {
                    op: ComparisonOperator::NotEqual,
                    ..
                }
            ));
            assert!(matches!(
                expr("= 5"),
                Expr::UnaryTest {
                    op: ComparisonOperator::Equal,
                    ..
                }
            ));
            assert!(parse_strict("x in != 5").is_ok());
            assert!(parse_strict("1 + != 5").is_err());
        }
    }

    mod lists_and_contexts {
        use super::*;

        #[test]
        fn test_list_literal_then_filter() {
            match expr("[1,2,3,4][item > 2]") {
                Expr::Filter { target, condition } => {
                    assert!(matches!(*target, Expr::List(ref items) if items.len() == 4));
                    assert!(condition.mentions_item());
                }
                other => panic!("Expected filter, got {:?}", other),
            }
        }

        #[test]
        fn test_empty_list() {
            assert_eq!(expr("[]"), Expr::List(Vec::new()));
        }

        #[test]
        fn test_item_key_form() {
            assert_eq!(expr("l[item key = \"a\"]").to_string(), "l[item.key = \"a\"]");
        }

        #[test]
        fn test_bare_unary_test_filter() {
            assert_eq!(expr("l[> 2]").to_string(), "l[> 2]");
        }

        #[test]
        fn test_context_with_multi_word_and_string_keys() {
            match expr("{first name: \"Jo\", \"age\": 3}") {
                Expr::Context(entries) => {
                    assert_eq!(entries[0].key, "first name");
                    assert_eq!(entries[1].key, "age");
                }
                other => panic!("Expected context, got {:?}", other),
            }
        }

        #[test]
        fn test_selectors_become_paths() {
            assert_eq!(
                expr("r.start included"),
                Expr::Path {
                    target: Expr::name("r").boxed(),
                    name: "start included".into()
                }
            );
        }
    }

    mod membership {
        use super::*;

        #[test]
        fn test_in_list_of_unary_tests() {
            match expr("2 in(<1,!=2,>3)") {
                Expr::InList { tests, .. } => {
                    assert_eq!(tests.len(), 3);
                    assert!(tests.iter().all(|t| matches!(t, Expr::UnaryTest { .. })));
                }
                other => panic!("Expected in-list, got {:?}", other),
            }
        }

        #[test]
        fn test_in_paren_range() {
            match expr("5 in (1..5]") {
                Expr::InList { tests, .. } => {
                    assert_eq!(tests.len(), 1);
                    assert_eq!(tests[0].to_string(), "(1..5]");
                }
                other => panic!("Expected in-list, got {:?}", other),
            }
        }

        #[test]
        fn test_in_keyword_with_list() {
            assert!(matches!(expr("3 in [2,3,4]"), Expr::In { .. }));
        }

        #[test]
        fn test_instance_of_multi_word_type() {
            assert_eq!(
                expr("x instance of date and time"),
                Expr::InstanceOf {
                    value: Expr::name("x").boxed(),
                    type_name: TypeName::DateAndTime
                }
            );
        }

        #[test]
        fn test_quantifiers() {
            assert_eq!(
                expr("some x in [1, 2] satisfies x > 1").to_string(),
                "some x in [1, 2] satisfies x > 1"
            );
            assert!(matches!(
                expr("every x in l, y in m satisfies x < y"),
                Expr::Quantified { quantifier: Quantifier::Every, ref iterations, .. } if iterations.len() == 2
            ));
        }
    }

    mod calls {
        use super::*;

        #[test]
        fn test_named_arguments() {
            match expr("substring(string: \"foobar\", start position: 3)") {
                Expr::Call {
                    function,
                    arguments,
                } => {
                    assert_eq!(function, BuiltinFunction::Substring);
                    assert!(matches!(&arguments[1], Argument::Named { name, .. } if name == "start position"));
                }
                other => panic!("Expected call, got {:?}", other),
            }
        }

        #[test]
        fn test_sort_with_lambda() {
            match expr("sort([3, 1], function(x, y) x < y)") {
                Expr::Call { arguments, .. } => {
                    assert!(matches!(arguments[1].value(), Expr::Lambda { parameters, .. } if parameters.len() == 2));
                }
                other => panic!("Expected call, got {:?}", other),
            }
        }

        #[test]
        fn test_not_call_is_negation() {
            assert!(matches!(expr("not(true)"), Expr::Not(_)));
            assert!(matches!(expr("not(negand: true)"), Expr::Call { .. }));
        }

        #[test]
        fn test_empty_argument_list() {
            assert_eq!(
                expr("today()"),
                Expr::Call {
                    function: BuiltinFunction::Today,
                    arguments: Vec::new()
                }
            );
        }
    }

    mod recovery {
        use super::*;

        #[test]
        fn test_empty_input() {
            let (diagnostics, statement) = parse("   ");
            assert!(diagnostics.is_empty());
            assert!(statement.is_none());
        }

        #[test]
        fn test_assignment() {
            let (diagnostics, statement) = parse("total <- 1 + 2");
            assert!(diagnostics.is_empty());
            assert_eq!(statement.unwrap().to_string(), "total <- 1 + 2");
        }

        #[test]
        fn test_eof_error() {
            let (diagnostics, statement) = parse("(1 + 2");
            assert_eq!(diagnostics.into_vec(), vec!["Syntax error at EOF".to_string()]);
            assert!(statement.is_none());
        }

        #[test]
        fn test_skip_and_continue() {
            let (diagnostics, statement) = parse("1 2 3");
            assert_eq!(
                diagnostics.into_vec(),
                vec![
                    "Syntax error at token '2'".to_string(),
                    "Syntax error at token '3'".to_string(),
                ]
            );
            assert_eq!(statement.unwrap().to_string(), "1");
        }

        #[test]
        fn test_illegal_character_then_parse() {
            let (diagnostics, statement) = parse("1 + $2");
            assert_eq!(diagnostics.into_vec(), vec!["Illegal character '$'".to_string()]);
            assert_eq!(statement.unwrap().to_string(), "1 + 2");
        }

        #[test]
        fn test_display_reparses_to_same_tree() {
            for text in [
                "x in [1..10) and not(y = \"a\")",
                "{a: 1, b: [2, 3]}.b[1] * -4",
                "date and time(\"2019-01-01T00:00:00\") + @\"P1D\"",
            ] {
                let first = parse_strict(text).unwrap();
                let second = parse_strict(&first.to_string()).unwrap();
                assert_eq!(first, second, "round trip of {}", text);
            }
        }
    }
}
