//! Recursive-descent parser for C++ type expressions.
//!
//! Grammar (informal):
//!
//! ```text
//! type      := cv* NAME cv* suffix* [function]
//! NAME      := ['::'] segment ('::' segment)*
//! segment   := WORD+ ['<' [type (',' type)*] '>']
//! suffix    := '*' cv* | '&' | '&&' | '[' TEXT ']'
//! function  := '(' ['*' [WORD] ')' '('] [params] ')'
//! ```
//!
//! Consecutive primitive keywords (`unsigned long long`) form one segment and
//! are normalized to their canonical spelling.

use cppmeta_core::ReferenceType;

use super::TypeDescriptor;
use crate::cursor::{Cursor, is_ident_continue, is_ident_start};

/// Marker for malformed input; turned into a busted descriptor.
#[derive(Debug)]
struct Busted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'src> {
    Word(&'src str),
    Scope,
    Less,
    Greater,
    Comma,
    Star,
    Amp,
    AmpAmp,
    LParen,
    RParen,
    /// Text between `[` and `]`.
    Array(&'src str),
}

const PRIMITIVE_WORDS: &[&str] = &["unsigned", "signed", "short", "long", "int", "char", "double"];
const SKIPPED_KEYWORDS: &[&str] = &["typename", "struct", "class", "enum", "union"];

/// Parse a type expression.
///
/// Never fails: malformed text yields a descriptor whose
/// [`is_busted`](TypeDescriptor::is_busted) flag is set.
///
/// ```
/// use cppmeta_parser::parse_type;
///
/// let desc = parse_type("const QMap<QString, QList<int> >::iterator &");
/// assert!(!desc.is_busted());
/// assert_eq!(desc.qualified_name, ["QMap", "iterator"]);
/// assert_eq!(desc.to_string(), "const QMap<QString,QList<int>>::iterator&");
///
/// assert!(parse_type("QList<int").is_busted());
/// ```
pub fn parse_type(text: &str) -> TypeDescriptor {
    let Ok(tokens) = tokenize(text) else {
        return TypeDescriptor::busted();
    };
    let mut parser = Parser { tokens, pos: 0 };
    match parser.parse_type() {
        Ok(desc) if parser.is_eof() => desc,
        _ => TypeDescriptor::busted(),
    }
}

fn tokenize(text: &str) -> Result<Vec<Token<'_>>, Busted> {
    let mut cursor = Cursor::new(text);
    let mut tokens = Vec::new();
    loop {
        cursor.skip_whitespace();
        let Some(ch) = cursor.peek() else {
            break;
        };
        let token = match ch {
            c if is_ident_start(c) || c.is_ascii_digit() => {
                Token::Word(cursor.eat_while(|c| is_ident_continue(c) || c == '.'))
            }
            ':' if cursor.check_str("::") => {
                cursor.eat_str("::");
                Token::Scope
            }
            '&' if cursor.check_str("&&") => {
                cursor.eat_str("&&");
                Token::AmpAmp
            }
            '[' => {
                cursor.advance();
                let start = cursor.offset();
                cursor.eat_while(|c| c != ']' && c != '[');
                let dim = cursor.slice_from(start).trim();
                if !cursor.eat(']') {
                    return Err(Busted);
                }
                Token::Array(dim)
            }
            _ => {
                cursor.advance();
                match ch {
                    '<' => Token::Less,
                    '>' => Token::Greater,
                    ',' => Token::Comma,
                    '*' => Token::Star,
                    '&' => Token::Amp,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    _ => return Err(Busted),
                }
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + n).copied()
    }

    fn check(&self, token: Token<'src>) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: Token<'src>) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token<'src>) -> Result<(), Busted> {
        if self.eat(token) { Ok(()) } else { Err(Busted) }
    }

    fn check_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == word)
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, Busted> {
        let mut desc = TypeDescriptor::default();
        self.parse_cv(&mut desc, true);
        self.parse_name(&mut desc)?;
        self.parse_cv(&mut desc, false);
        self.parse_suffixes(&mut desc)?;
        if self.check(Token::LParen) {
            return self.parse_function_type(desc);
        }
        Ok(desc)
    }

    fn parse_cv(&mut self, desc: &mut TypeDescriptor, leading: bool) {
        while let Some(Token::Word(word)) = self.peek() {
            match word {
                "const" | "constexpr" => desc.is_constant = true,
                "volatile" => desc.is_volatile = true,
                w if leading && SKIPPED_KEYWORDS.contains(&w) => {}
                _ => break,
            }
            self.pos += 1;
        }
    }

    fn parse_name(&mut self, desc: &mut TypeDescriptor) -> Result<(), Busted> {
        self.eat(Token::Scope);
        loop {
            let segment = self.parse_segment_word()?;
            let is_number = segment.starts_with(|c: char| c.is_ascii_digit());
            desc.qualified_name.push(segment);
            if is_number {
                break;
            }

            if self.eat(Token::Less) {
                let args = self.parse_template_arguments()?;
                if !desc.arguments.is_empty() {
                    // Arguments on an outer segment stay textual.
                    let index = desc.arguments_segment;
                    let folded = desc.name_with_arguments();
                    let folded_segment = cppmeta_core::split_scopes(&folded)
                        .get(index)
                        .cloned()
                        .unwrap_or_default();
                    desc.qualified_name[index] = folded_segment;
                }
                desc.arguments = args;
                desc.arguments_segment = desc.qualified_name.len() - 1;
            }

            if !self.eat(Token::Scope) {
                break;
            }
        }
        if desc.arguments.is_empty() {
            desc.arguments_segment = desc.qualified_name.len().saturating_sub(1);
        }
        Ok(())
    }

    fn parse_segment_word(&mut self) -> Result<String, Busted> {
        let Some(Token::Word(first)) = self.peek() else {
            return Err(Busted);
        };
        if !PRIMITIVE_WORDS.contains(&first) {
            self.pos += 1;
            return Ok(first.to_string());
        }
        let mut words = Vec::new();
        while let Some(Token::Word(word)) = self.peek() {
            if !PRIMITIVE_WORDS.contains(&word) {
                break;
            }
            words.push(word);
            self.pos += 1;
        }
        Ok(normalize_primitive(&words))
    }

    fn parse_template_arguments(&mut self) -> Result<Vec<TypeDescriptor>, Busted> {
        let mut args = Vec::new();
        if self.eat(Token::Greater) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_type()?);
            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(Token::Greater)?;
            return Ok(args);
        }
    }

    fn parse_suffixes(&mut self, desc: &mut TypeDescriptor) -> Result<(), Busted> {
        loop {
            match self.peek() {
                Some(Token::Star) if desc.reference == ReferenceType::NoReference => {
                    self.pos += 1;
                    let mut is_const = false;
                    while let Some(Token::Word(word @ ("const" | "volatile"))) = self.peek() {
                        is_const |= word == "const";
                        self.pos += 1;
                    }
                    desc.indirections.push(is_const);
                }
                Some(Token::Amp) if desc.reference == ReferenceType::NoReference => {
                    self.pos += 1;
                    desc.reference = ReferenceType::LValue;
                }
                Some(Token::AmpAmp) if desc.reference == ReferenceType::NoReference => {
                    self.pos += 1;
                    desc.reference = ReferenceType::RValue;
                }
                Some(Token::Array(dim)) => {
                    self.pos += 1;
                    desc.arrays.push(dim.to_string());
                }
                Some(Token::Star | Token::Amp | Token::AmpAmp) => return Err(Busted),
                _ => return Ok(()),
            }
        }
    }

    fn parse_function_type(&mut self, ret: TypeDescriptor) -> Result<TypeDescriptor, Busted> {
        self.expect(Token::LParen)?;
        let mut desc = TypeDescriptor {
            function_return: Some(Box::new(ret)),
            ..TypeDescriptor::default()
        };
        if self.eat(Token::Star) {
            if let Some(Token::Word(_)) = self.peek() {
                self.pos += 1;
            }
            self.expect(Token::RParen)?;
            self.expect(Token::LParen)?;
            desc.is_function_pointer = true;
        }
        desc.arguments = self.parse_parameters()?;
        self.parse_suffixes(&mut desc)?;
        Ok(desc)
    }

    fn parse_parameters(&mut self) -> Result<Vec<TypeDescriptor>, Busted> {
        let mut params = Vec::new();
        if self.eat(Token::RParen) {
            return Ok(params);
        }
        if self.check_word("void") && self.peek_nth(1) == Some(Token::RParen) {
            self.pos += 2;
            return Ok(params);
        }
        loop {
            params.push(self.parse_type()?);
            // Optional parameter name.
            if let Some(Token::Word(_)) = self.peek() {
                self.pos += 1;
            }
            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(Token::RParen)?;
            return Ok(params);
        }
    }
}

fn normalize_primitive(words: &[&str]) -> String {
    let has = |w: &str| words.contains(&w);
    let mut kept: Vec<&str> = words.to_vec();
    if has("short") || has("long") || (has("char") && has("int")) {
        kept.retain(|w| *w != "int");
    }
    if !has("char") {
        kept.retain(|w| *w != "signed");
    }
    match kept.as_slice() {
        [] => "int".to_string(),
        ["unsigned"] => "unsigned int".to_string(),
        _ => kept.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name() {
        let desc = parse_type("QString");
        assert_eq!(desc.qualified_name, ["QString"]);
        assert!(desc.is_plain());
    }

    #[test]
    fn const_reference() {
        let desc = parse_type("const QString &");
        assert!(desc.is_constant);
        assert_eq!(desc.reference, ReferenceType::LValue);
        assert_eq!(desc.to_string(), "const QString&");
    }

    #[test]
    fn trailing_const_and_rvalue() {
        let desc = parse_type("QString const&&");
        assert!(desc.is_constant);
        assert_eq!(desc.reference, ReferenceType::RValue);
    }

    #[test]
    fn pointer_levels() {
        let desc = parse_type("char * const *");
        assert_eq!(desc.qualified_name, ["char"]);
        assert_eq!(desc.indirections, [true, false]);
        assert_eq!(desc.to_string(), "char*const*");
    }

    #[test]
    fn nested_templates_with_closing_shift() {
        let desc = parse_type("QMap<QString,QList<QPair<int,int>>>");
        assert!(!desc.is_busted());
        assert_eq!(desc.arguments.len(), 2);
        assert_eq!(desc.arguments[1].arguments[0].arguments.len(), 2);
        assert_eq!(desc.to_string(), "QMap<QString,QList<QPair<int,int>>>");
    }

    #[test]
    fn scoped_template_arguments() {
        let desc = parse_type("Qt::QFlags<Qt::AlignmentFlag>");
        assert_eq!(desc.qualified_name, ["Qt", "QFlags"]);
        assert_eq!(desc.arguments[0].qualified_name, ["Qt", "AlignmentFlag"]);
        assert_eq!(desc.arguments_segment, 1);
    }

    #[test]
    fn iterator_arguments_stay_on_container_segment() {
        let desc = parse_type("QList<int>::const_iterator");
        assert_eq!(desc.qualified_name, ["QList", "const_iterator"]);
        assert_eq!(desc.arguments_segment, 0);
        assert_eq!(desc.to_string(), "QList<int>::const_iterator");
    }

    #[test]
    fn multi_word_primitives() {
        assert_eq!(parse_type("unsigned long long int").qualified_name, ["unsigned long long"]);
        assert_eq!(parse_type("unsigned").qualified_name, ["unsigned int"]);
        assert_eq!(parse_type("signed char").qualified_name, ["signed char"]);
        assert_eq!(parse_type("short int").qualified_name, ["short"]);
        assert_eq!(parse_type("const unsigned int *").to_string(), "const unsigned int*");
    }

    #[test]
    fn arrays() {
        let desc = parse_type("int[4][]");
        assert_eq!(desc.arrays, ["4", ""]);
        assert!(desc.is_sized_array());
        assert!(!parse_type("char[]").is_sized_array());
    }

    #[test]
    fn function_pointer() {
        let desc = parse_type("void (*)(int, const QString &name)");
        assert!(desc.is_function_pointer);
        assert_eq!(desc.arguments.len(), 2);
        assert_eq!(desc.to_string(), "void(*)(int,const QString&)");
    }

    #[test]
    fn function_signature_in_template() {
        let desc = parse_type("std::function<bool(int)>");
        assert_eq!(desc.qualified_name, ["std", "function"]);
        let signature = &desc.arguments[0];
        assert!(signature.is_function_type());
        assert!(!signature.is_function_pointer);
        assert_eq!(signature.to_string(), "bool(int)");
    }

    #[test]
    fn void_parameter_list() {
        assert!(parse_type("int (*)(void)").arguments.is_empty());
    }

    #[test]
    fn non_type_template_argument() {
        let desc = parse_type("std::array<int, 4>");
        assert_eq!(desc.arguments[1].qualified_name, ["4"]);
    }

    #[test]
    fn elaborated_type_specifier_is_skipped() {
        assert_eq!(parse_type("struct Foo *").qualified_name, ["Foo"]);
        assert_eq!(parse_type("typename T::value_type").qualified_name, ["T", "value_type"]);
    }

    #[test]
    fn malformed_input_is_busted() {
        for text in ["", "QList<int", "QList<int>>", "::", "int &&&", "a b", "int[", "Foo<,>", "int @"] {
            assert!(parse_type(text).is_busted(), "{text:?} should be busted");
        }
    }

    #[test]
    fn leading_scope_dropped() {
        assert_eq!(parse_type("::Qt::Key").name(), "Qt::Key");
    }

    #[test]
    fn display_reparses_identically() {
        for text in ["const QList<int>&", "QMap<QString,QVariant>::const_iterator", "int*const*", "void(*)(int)"] {
            let desc = parse_type(text);
            assert_eq!(parse_type(&desc.to_string()), desc, "{text}");
        }
    }
}
