//! Integer constant expressions.
//!
//! Enum initializers and default arguments are evaluated with a small
//! recursive-descent parser over C precedence:
//!
//! ```text
//! expr    := lor
//! lor     := land ('||' land)*
//! land    := bor ('&&' bor)*
//! bor     := bxor ('|' bxor)*
//! bxor    := band ('^' band)*
//! band    := shift ('&' shift)*
//! shift   := add (('<<' | '>>') add)*
//! add     := mul (('+' | '-') mul)*
//! mul     := unary (('*' | '/' | '%') unary)*
//! unary   := ('~' | '-' | '+' | '!') unary | primary
//! primary := literal | '(' expr ')' | cast '(' expr ')' | Type '(' expr ')' | symbol
//! ```
//!
//! Symbols are looked up through a caller-supplied function. A symbol that
//! is not known yet yields [`EvalError::Unresolved`], which the enum pass
//! treats as "try again next round".

use rustc_hash::FxHashMap;
use thiserror::Error;

use cppmeta_core::join_scope;
use cppmeta_parser::{Cursor, is_ident_continue, is_ident_start};

/// Why an expression has no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Depends on a symbol with no known value.
    #[error("unresolved symbol '{0}'")]
    Unresolved(String),

    /// Not a constant expression this evaluator understands.
    #[error("cannot evaluate '{expression}': {reason}")]
    Syntax { expression: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(i64),
    Ident(String),
    Punct(&'static str),
}

const PUNCTUATION: &[&str] = &[
    "<<", ">>", "||", "&&", "|", "^", "&", "+", "-", "*", "/", "%", "~", "!", "(", ")", "<", ">",
    ",",
];

const CASTS: &[&str] = &["static_cast", "reinterpret_cast", "const_cast"];

/// Evaluates constant expressions, resolving symbols through `resolve`.
///
/// ```
/// use cppmeta_builder::ConstantEvaluator;
///
/// let eval = ConstantEvaluator::new(|name: &str| (name == "Base").then_some(8));
/// assert_eq!(eval.evaluate("Base | 1 << 2"), Ok(12));
/// assert_eq!(eval.evaluate("static_cast<int>('A')"), Ok(65));
/// ```
pub struct ConstantEvaluator<F> {
    resolve: F,
}

impl<F: Fn(&str) -> Option<i64>> ConstantEvaluator<F> {
    pub fn new(resolve: F) -> Self {
        Self { resolve }
    }

    pub fn evaluate(&self, expression: &str) -> Result<i64, EvalError> {
        let tokens = tokenize(expression)?;
        let mut parser = ExprParser {
            tokens: &tokens,
            pos: 0,
            expression,
            resolve: &self.resolve,
        };
        let value = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(parser.syntax("trailing tokens"));
        }
        Ok(value)
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

fn tokenize(expression: &str) -> Result<Vec<Token>, EvalError> {
    let syntax = |reason: &str| EvalError::Syntax {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };
    let mut cursor = Cursor::new(expression);
    let mut tokens = Vec::new();

    loop {
        cursor.skip_whitespace();
        let Some(c) = cursor.peek() else { break };

        if c.is_ascii_digit() {
            tokens.push(Token::Int(number(&mut cursor).ok_or_else(|| syntax("bad number"))?));
        } else if c == '\'' {
            tokens.push(Token::Int(char_literal(&mut cursor).ok_or_else(|| syntax("bad character"))?));
        } else if is_ident_start(c) || cursor.check_str("::") {
            let start = cursor.offset();
            cursor.eat_str("::");
            cursor.eat_while(is_ident_continue);
            // Encoding prefixes of character literals: L'x', u'x', U'x', u8'x'.
            let word = cursor.slice_from(start);
            if matches!(word, "L" | "u" | "U" | "u8") && cursor.check(|c| c == '\'') {
                tokens.push(Token::Int(char_literal(&mut cursor).ok_or_else(|| syntax("bad character"))?));
                continue;
            }
            while cursor.check_str("::") && cursor.peek_nth(2).is_some_and(is_ident_start) {
                cursor.eat_str("::");
                cursor.eat_while(is_ident_continue);
            }
            let word = cursor.slice_from(start);
            tokens.push(Token::Ident(word.trim_start_matches("::").to_string()));
        } else {
            let punct = PUNCTUATION
                .iter()
                .find(|p| cursor.check_str(p))
                .ok_or_else(|| syntax("unexpected character"))?;
            cursor.eat_str(punct);
            tokens.push(Token::Punct(*punct));
        }
    }
    Ok(tokens)
}

/// Integer literal with optional `0x`/`0b`/octal prefix, digit separators
/// and `u`/`l` suffixes.
fn number(cursor: &mut Cursor<'_>) -> Option<i64> {
    let (radix, digits) = if cursor.eat_str("0x") || cursor.eat_str("0X") {
        (16, cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '\''))
    } else if cursor.eat_str("0b") || cursor.eat_str("0B") {
        (2, cursor.eat_while(|c| c == '0' || c == '1' || c == '\''))
    } else {
        let digits = cursor.eat_while(|c| c.is_ascii_digit() || c == '\'');
        let radix = if digits.len() > 1 && digits.starts_with('0') { 8 } else { 10 };
        (radix, digits)
    };
    cursor.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    if cursor.check(is_ident_continue) {
        return None;
    }
    let digits: String = digits.chars().filter(|c| *c != '\'').collect();
    u64::from_str_radix(&digits, radix).ok().map(|v| v as i64)
}

fn char_literal(cursor: &mut Cursor<'_>) -> Option<i64> {
    cursor.eat('\'');
    let value = match cursor.advance()? {
        '\\' => escape(cursor)?,
        '\'' => return None,
        c => c as i64,
    };
    cursor.eat('\'').then_some(value)
}

fn escape(cursor: &mut Cursor<'_>) -> Option<i64> {
    let hex = |cursor: &mut Cursor<'_>, max: usize| {
        let start = cursor.offset();
        let mut count = 0;
        while count < max && cursor.check(|c| c.is_ascii_hexdigit()) {
            cursor.advance();
            count += 1;
        }
        i64::from_str_radix(cursor.slice_from(start), 16).ok()
    };
    match cursor.advance()? {
        'n' => Some(10),
        't' => Some(9),
        'r' => Some(13),
        'a' => Some(7),
        'b' => Some(8),
        'f' => Some(12),
        'v' => Some(11),
        '\\' => Some('\\' as i64),
        '\'' => Some('\'' as i64),
        '"' => Some('"' as i64),
        '?' => Some('?' as i64),
        'x' => hex(cursor, usize::MAX),
        'u' => hex(cursor, 4),
        'U' => hex(cursor, 8),
        c @ '0'..='7' => {
            let mut value = c as i64 - '0' as i64;
            for _ in 0..2 {
                match cursor.peek() {
                    Some(d @ '0'..='7') => {
                        cursor.advance();
                        value = value * 8 + (d as i64 - '0' as i64);
                    }
                    _ => break,
                }
            }
            Some(value)
        }
        _ => None,
    }
}

// ============================================================================
// Parser
// ============================================================================

struct ExprParser<'t, F> {
    tokens: &'t [Token],
    pos: usize,
    expression: &'t str,
    resolve: &'t F,
}

impl<F: Fn(&str) -> Option<i64>> ExprParser<'_, F> {
    fn syntax(&self, reason: &str) -> EvalError {
        EvalError::Syntax {
            expression: self.expression.to_string(),
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn check(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == punct)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.check(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), EvalError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.syntax(&format!("expected '{punct}'")))
        }
    }

    fn expr(&mut self) -> Result<i64, EvalError> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Result<i64, EvalError> {
        let mut value = self.logical_and()?;
        while self.eat("||") {
            let rhs = self.logical_and()?;
            value = i64::from(value != 0 || rhs != 0);
        }
        Ok(value)
    }

    fn logical_and(&mut self) -> Result<i64, EvalError> {
        let mut value = self.bit_or()?;
        while self.eat("&&") {
            let rhs = self.bit_or()?;
            value = i64::from(value != 0 && rhs != 0);
        }
        Ok(value)
    }

    fn bit_or(&mut self) -> Result<i64, EvalError> {
        let mut value = self.bit_xor()?;
        while self.eat("|") {
            value |= self.bit_xor()?;
        }
        Ok(value)
    }

    fn bit_xor(&mut self) -> Result<i64, EvalError> {
        let mut value = self.bit_and()?;
        while self.eat("^") {
            value ^= self.bit_and()?;
        }
        Ok(value)
    }

    fn bit_and(&mut self) -> Result<i64, EvalError> {
        let mut value = self.shift()?;
        while self.eat("&") {
            value &= self.shift()?;
        }
        Ok(value)
    }

    fn shift(&mut self) -> Result<i64, EvalError> {
        let mut value = self.additive()?;
        loop {
            if self.eat("<<") {
                let rhs = self.additive()?;
                value = value.wrapping_shl(rhs as u32 & 63);
            } else if self.eat(">>") {
                let rhs = self.additive()?;
                value = value.wrapping_shr(rhs as u32 & 63);
            } else {
                return Ok(value);
            }
        }
    }

    fn additive(&mut self) -> Result<i64, EvalError> {
        let mut value = self.multiplicative()?;
        loop {
            if self.eat("+") {
                value = value.wrapping_add(self.multiplicative()?);
            } else if self.eat("-") {
                value = value.wrapping_sub(self.multiplicative()?);
            } else {
                return Ok(value);
            }
        }
    }

    fn multiplicative(&mut self) -> Result<i64, EvalError> {
        let mut value = self.unary()?;
        loop {
            if self.eat("*") {
                value = value.wrapping_mul(self.unary()?);
            } else if self.eat("/") {
                let rhs = self.unary()?;
                value = value
                    .checked_div(rhs)
                    .ok_or_else(|| self.syntax("division by zero"))?;
            } else if self.eat("%") {
                let rhs = self.unary()?;
                value = value
                    .checked_rem(rhs)
                    .ok_or_else(|| self.syntax("division by zero"))?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<i64, EvalError> {
        if self.eat("~") {
            Ok(!self.unary()?)
        } else if self.eat("-") {
            Ok(self.unary()?.wrapping_neg())
        } else if self.eat("+") {
            self.unary()
        } else if self.eat("!") {
            Ok(i64::from(self.unary()? == 0))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<i64, EvalError> {
        match self.peek().cloned() {
            Some(Token::Int(value)) => {
                self.pos += 1;
                Ok(value)
            }
            Some(Token::Punct("(")) => {
                self.pos += 1;
                let value = self.expr()?;
                self.expect(")")?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                self.identifier(&name)
            }
            _ => Err(self.syntax("expected a value")),
        }
    }

    fn identifier(&mut self, name: &str) -> Result<i64, EvalError> {
        match name {
            "true" => return Ok(1),
            "false" => return Ok(0),
            "sizeof" | "alignof" => return Err(self.syntax("sizeof is not supported")),
            _ => {}
        }

        if CASTS.contains(&name) {
            self.expect("<")?;
            self.skip_template_arguments()?;
            return self.parenthesized();
        }
        // `QFlags<Enum>(value)`
        if self.check("<") {
            let save = self.pos;
            self.pos += 1;
            if self.skip_template_arguments().is_ok() && self.check("(") {
                return self.parenthesized();
            }
            self.pos = save;
        }
        // `Type(value)`
        if self.check("(") {
            return self.parenthesized();
        }

        (self.resolve)(name).ok_or_else(|| EvalError::Unresolved(name.to_string()))
    }

    /// `( expr )` or `()`, which reads as zero.
    fn parenthesized(&mut self) -> Result<i64, EvalError> {
        self.expect("(")?;
        if self.eat(")") {
            return Ok(0);
        }
        let value = self.expr()?;
        self.expect(")")?;
        Ok(value)
    }

    /// Skip to the `>` closing an already consumed `<`.
    fn skip_template_arguments(&mut self) -> Result<(), EvalError> {
        let mut depth = 1usize;
        while let Some(token) = self.peek() {
            let step = match token {
                Token::Punct("<") => 1isize,
                Token::Punct(">") => -1,
                Token::Punct(">>") => -2,
                _ => 0,
            };
            self.pos += 1;
            let next = depth as isize + step;
            if next <= 0 {
                return Ok(());
            }
            depth = next as usize;
        }
        Err(self.syntax("unterminated template argument list"))
    }
}

// ============================================================================
// Constant table
// ============================================================================

/// Resolved enum constants by qualified name. The first value written for a
/// name is kept.
#[derive(Debug, Clone, Default)]
pub struct EnumConstantTable {
    values: FxHashMap<String, i64>,
}

impl EnumConstantTable {
    pub fn insert(&mut self, name: impl Into<String>, value: i64) -> bool {
        let name = name.into();
        if self.values.contains_key(&name) {
            return false;
        }
        self.values.insert(name, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    /// First `scope::symbol` present, scopes tried in order.
    pub fn lookup_in_scopes(&self, symbol: &str, scopes: &[String]) -> Option<(String, i64)> {
        scopes.iter().find_map(|scope| {
            let qualified = join_scope(scope, symbol);
            self.get(&qualified).map(|value| (qualified, value))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expression: &str) -> Result<i64, EvalError> {
        ConstantEvaluator::new(|name: &str| match name {
            "A" => Some(0),
            "Qt::AlignLeft" => Some(1),
            "Qt::AlignRight" => Some(2),
            _ => None,
        })
        .evaluate(expression)
    }

    #[test]
    fn bitwise_or() {
        assert_eq!(eval("1|2"), Ok(3));
        assert_eq!(eval("A | 2"), Ok(2));
        assert_eq!(eval("Qt::AlignLeft | Qt::AlignRight"), Ok(3));
    }

    #[test]
    fn casts_and_constructor_wrappers() {
        assert_eq!(eval("static_cast<Foo>(4)"), Ok(4));
        assert_eq!(eval("static_cast<QFlags<Foo>>(5)"), Ok(5));
        assert_eq!(eval("Qt::Alignment(Qt::AlignLeft)"), Ok(1));
        assert_eq!(eval("QFlags<Qt::AlignmentFlag>(Qt::AlignRight)"), Ok(2));
        assert_eq!(eval("QString()"), Ok(0));
    }

    #[test]
    fn character_literals() {
        assert_eq!(eval("'A'"), Ok(65));
        assert_eq!(eval("'\\n'"), Ok(10));
        assert_eq!(eval("'\\x41'"), Ok(65));
        assert_eq!(eval("'\\101'"), Ok(65));
        assert_eq!(eval("u'\\u00e9'"), Ok(0xe9));
    }

    #[test]
    fn number_forms() {
        assert_eq!(eval("0x10"), Ok(16));
        assert_eq!(eval("0777"), Ok(511));
        assert_eq!(eval("0b101"), Ok(5));
        assert_eq!(eval("10u"), Ok(10));
        assert_eq!(eval("0xFFFFFFFFUL"), Ok(0xFFFF_FFFF));
        assert_eq!(eval("1'000"), Ok(1000));
        assert_eq!(eval("0"), Ok(0));
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("1 + 2 * 3"), Ok(7));
        assert_eq!(eval("0x10 | 1 << 2"), Ok(20));
        assert_eq!(eval("(1 + 2) * 3"), Ok(9));
        assert_eq!(eval("6 & 3 ^ 1"), Ok(3));
        assert_eq!(eval("~0"), Ok(-1));
        assert_eq!(eval("-1 + 3"), Ok(2));
        assert_eq!(eval("!0 && 1"), Ok(1));
        assert_eq!(eval("1 << 31"), Ok(0x8000_0000));
    }

    #[test]
    fn or_of_subexpressions_equals_bitwise_or() {
        for (a, b) in [("1<<3", "0x5"), ("7%4", "~8 & 0xF"), ("'a'", "2*3")] {
            let combined = eval(&format!("({a}) | ({b})")).unwrap();
            assert_eq!(combined, eval(a).unwrap() | eval(b).unwrap());
        }
    }

    #[test]
    fn unresolved_symbols_are_reported() {
        assert_eq!(eval("B + 1"), Err(EvalError::Unresolved("B".into())));
        assert_eq!(eval("Other::Thing"), Err(EvalError::Unresolved("Other::Thing".into())));
    }

    #[test]
    fn malformed_expressions() {
        assert!(matches!(eval("1 |"), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("1 2"), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("4 / 0"), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("sizeof(int)"), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("\"text\""), Err(EvalError::Syntax { .. })));
        assert!(matches!(eval("12abc"), Err(EvalError::Syntax { .. })));
    }

    #[test]
    fn constant_table_first_write_wins() {
        let mut table = EnumConstantTable::default();
        assert!(table.insert("Qt::AlignLeft", 1));
        assert!(!table.insert("Qt::AlignLeft", 9));
        assert_eq!(table.get("Qt::AlignLeft"), Some(1));

        let scopes = vec!["Inner".to_string(), "Qt".to_string(), String::new()];
        assert_eq!(
            table.lookup_in_scopes("AlignLeft", &scopes),
            Some(("Qt::AlignLeft".to_string(), 1))
        );
        assert_eq!(table.lookup_in_scopes("Missing", &scopes), None);
    }
}
