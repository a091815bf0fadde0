//! CSS selector parsing.
//! See <https://www.w3.org/TR/selectors-4/#parse-selector>

use crate::attribute::{AttrCase, AttrOperator, AttributeSelector};
use crate::error::SyntaxError;
use crate::nth::NthFormula;
use crate::{Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorList};
use core::mem::take;
use log::trace;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
enum Tok {
    /// A combinator, including the descendant combinator implied by
    /// whitespace, with the character that spelled it.
    Combinator(Combinator, char),
    /// A top-level `,` starting a new alternative.
    Comma,
    /// `*`
    Universal,
    /// A type selector.
    Type(String),
    /// `.class`
    Class(String),
    /// `#id`
    Id(String),
    /// `[...]`
    Attribute(AttributeSelector),
    /// `:name` or `:name(...)`
    Pseudo(PseudoClass),
}

/// Tokenizer over a selector string.
struct SelectorTokenizer {
    /// Decoded characters of the selector.
    input: Vec<char>,
    /// Current cursor index into `input`.
    index: usize,
    /// Offset of `input` inside the outermost selector text, for error positions.
    base: usize,
    /// Whether whitespace at the cursor is insignificant (start of a selector,
    /// after a comma or an explicit combinator).
    after_separator: bool,
}

impl SelectorTokenizer {
    fn new(input: &str, base: usize) -> Self {
        Self {
            input: input.chars().collect(),
            index: 0,
            base,
            after_separator: true,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input.get(self.index).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.input.get(self.index.saturating_add(ahead)).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Absolute offset of the cursor, for error reporting.
    #[inline]
    fn position(&self) -> usize {
        self.base.saturating_add(self.index)
    }

    /// Return the next selector token, if any.
    fn next(&mut self) -> Result<Option<(usize, Tok)>, SyntaxError> {
        let saw_whitespace = self.skip_whitespace();
        let position = self.position();
        let Some(current) = self.peek() else {
            return Ok(None);
        };
        if saw_whitespace && !self.after_separator && !matches!(current, ',' | '>' | '+' | '~') {
            self.after_separator = true;
            return Ok(Some((position, Tok::Combinator(Combinator::Descendant, ' '))));
        }
        self.after_separator = false;

        let token = match current {
            ',' => {
                self.advance();
                self.after_separator = true;
                Tok::Comma
            }
            '>' | '+' | '~' => {
                self.advance();
                self.after_separator = true;
                let combinator = match current {
                    '>' => Combinator::Child,
                    '+' => Combinator::AdjacentSibling,
                    _ => Combinator::GeneralSibling,
                };
                Tok::Combinator(combinator, current)
            }
            '*' => {
                self.advance();
                Tok::Universal
            }
            '.' => {
                self.advance();
                Tok::Class(self.expect_ident()?)
            }
            '#' => {
                self.advance();
                Tok::Id(self.expect_ident()?)
            }
            '[' => Tok::Attribute(self.consume_attr()?),
            ':' => Tok::Pseudo(self.consume_pseudo()?),
            ')' | ']' => return Err(SyntaxError::Unbalanced { bracket: current, position }),
            _ if self.starts_ident() => Tok::Type(self.expect_ident()?),
            found => return Err(SyntaxError::UnexpectedToken { found, position }),
        };
        Ok(Some((position, token)))
    }

    /// Skip whitespace, reporting whether any was present.
    #[inline]
    fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(is_css_whitespace) {
            self.advance();
        }
        self.index != start
    }

    /// Whether an identifier starts at the cursor.
    /// CSS Syntax §4.3.9: check if three code points would start an ident
    fn starts_ident(&self) -> bool {
        match self.peek() {
            Some('-') => match self.peek_at(1) {
                Some('\\') => self.peek_at(2).is_some_and(|ch| ch != '\n'),
                Some(next) => next == '-' || is_name_start(next),
                None => false,
            },
            Some('\\') => self.peek_at(1).is_some_and(|ch| ch != '\n'),
            Some(first) => is_name_start(first),
            None => false,
        }
    }

    fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        if !self.starts_ident() {
            return Err(SyntaxError::ExpectedIdentifier {
                position: self.position(),
            });
        }
        Ok(self.consume_name())
    }

    /// Consume name code points and escapes.
    fn consume_name(&mut self) -> String {
        let mut out = String::new();
        while let Some(current) = self.peek() {
            if current == '\\' && self.peek_at(1).is_some_and(|ch| ch != '\n') {
                self.advance();
                out.push(self.consume_escape());
            } else if is_name_char(current) {
                out.push(current);
                self.advance();
            } else {
                break;
            }
        }
        out
    }

    /// Consume the code points of an escape; the cursor sits after the `\`.
    /// CSS Syntax §4.3.7: consume an escaped code point
    fn consume_escape(&mut self) -> char {
        let Some(first) = self.peek() else {
            return char::REPLACEMENT_CHARACTER;
        };
        if !first.is_ascii_hexdigit() {
            self.advance();
            return first;
        }
        let mut value = 0_u32;
        let mut digits = 0;
        while digits < 6
            && let Some(digit) = self.peek().and_then(|ch| ch.to_digit(16))
        {
            value = value.saturating_mul(16).saturating_add(digit);
            digits += 1;
            self.advance();
        }
        if self.peek().is_some_and(is_css_whitespace) {
            self.advance();
        }
        match char::from_u32(value) {
            Some(ch) if value != 0 => ch,
            _ => char::REPLACEMENT_CHARACTER,
        }
    }

    /// Consume a quoted string; the cursor sits on the opening quote.
    fn consume_string(&mut self) -> Result<String, SyntaxError> {
        let position = self.position();
        let Some(quote) = self.peek() else {
            return Err(SyntaxError::UnterminatedString { position });
        };
        self.advance();
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return Err(SyntaxError::UnterminatedString { position }),
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        None => {}
                        Some('\n') => self.advance(),
                        Some(_) => out.push(self.consume_escape()),
                    }
                }
                Some(ch) => {
                    out.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Parse an attribute selector: `[name]`, `[name op value]`, `[name op value i|s]`.
    /// Selectors 4 §6: Attribute selectors
    fn consume_attr(&mut self) -> Result<AttributeSelector, SyntaxError> {
        let open = self.position();
        // skip '['
        self.advance();
        self.skip_whitespace();
        if !self.starts_ident() {
            return Err(self.attr_error(open, "expected attribute name"));
        }
        let name = self.consume_name();
        self.skip_whitespace();

        let operator = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.advance();
                return Ok(AttributeSelector::new(
                    name,
                    AttrOperator::Exists,
                    String::new(),
                    AttrCase::Default,
                ));
            }
            (None, _) => return Err(SyntaxError::Unbalanced { bracket: '[', position: open }),
            (Some('='), _) => AttrOperator::Equals,
            (Some('~'), Some('=')) => AttrOperator::Includes,
            (Some('|'), Some('=')) => AttrOperator::DashMatch,
            (Some('^'), Some('=')) => AttrOperator::Prefix,
            (Some('$'), Some('=')) => AttrOperator::Suffix,
            (Some('*'), Some('=')) => AttrOperator::Substring,
            _ => return Err(self.attr_error(open, "expected operator or ']'")),
        };
        if operator != AttrOperator::Equals {
            self.advance();
        }
        self.advance();
        self.skip_whitespace();

        let value = match self.peek() {
            Some('"' | '\'') => self.consume_string()?,
            None => return Err(SyntaxError::Unbalanced { bracket: '[', position: open }),
            Some(_) => {
                let value = self.consume_unquoted_attr_value();
                if value.is_empty() {
                    return Err(self.attr_error(open, "expected attribute value"));
                }
                value
            }
        };
        self.skip_whitespace();

        let case = match self.peek() {
            Some('i' | 'I') => {
                self.advance();
                AttrCase::Insensitive
            }
            Some('s' | 'S') => {
                self.advance();
                AttrCase::Sensitive
            }
            _ => AttrCase::Default,
        };
        self.skip_whitespace();
        match self.peek() {
            Some(']') => {
                self.advance();
                Ok(AttributeSelector::new(name, operator, value, case))
            }
            None => Err(SyntaxError::Unbalanced { bracket: '[', position: open }),
            Some(_) => Err(self.attr_error(open, "expected ']'")),
        }
    }

    /// Consume an unquoted attribute value until whitespace or a closing bracket.
    fn consume_unquoted_attr_value(&mut self) -> String {
        let mut out = String::new();
        while let Some(current) = self.peek() {
            if is_css_whitespace(current) || matches!(current, ']' | '[' | '"' | '\'') {
                break;
            }
            if current == '\\' {
                self.advance();
                out.push(self.consume_escape());
            } else {
                out.push(current);
                self.advance();
            }
        }
        out
    }

    fn attr_error(&self, open: usize, reason: &'static str) -> SyntaxError {
        if self.peek().is_none() {
            SyntaxError::Unbalanced { bracket: '[', position: open }
        } else {
            SyntaxError::InvalidAttribute {
                position: self.position(),
                reason,
            }
        }
    }

    /// Parse a pseudo-class after ':'.
    /// Selectors 4 §4, 12–15
    fn consume_pseudo(&mut self) -> Result<PseudoClass, SyntaxError> {
        // skip ':'
        self.advance();
        if self.peek() == Some(':') {
            return Err(SyntaxError::UnexpectedToken {
                found: ':',
                position: self.position(),
            });
        }
        let name = self.expect_ident()?.to_ascii_lowercase();
        if self.peek() != Some('(') {
            return simple_pseudo(&name).ok_or(SyntaxError::UnknownPseudoClass(name));
        }

        let (argument, argument_base) = self.consume_arguments()?;
        match name.as_str() {
            "not" => Ok(PseudoClass::Not(parse_nested(&argument, argument_base)?)),
            "is" => Ok(PseudoClass::Is(parse_nested(&argument, argument_base)?)),
            "where" => Ok(PseudoClass::Where(parse_nested(&argument, argument_base)?)),
            "nth-child" | "nth-last-child" => {
                let (formula_text, of) = split_of_clause(&argument);
                let formula = NthFormula::parse(formula_text)?;
                let of = match of {
                    Some((selector_text, offset)) => {
                        Some(parse_nested(selector_text, argument_base.saturating_add(offset))?)
                    }
                    None => None,
                };
                Ok(if name == "nth-child" {
                    PseudoClass::NthChild { formula, of }
                } else {
                    PseudoClass::NthLastChild { formula, of }
                })
            }
            "nth-of-type" => Ok(PseudoClass::NthOfType(NthFormula::parse(&argument)?)),
            "nth-last-of-type" => Ok(PseudoClass::NthLastOfType(NthFormula::parse(&argument)?)),
            _ => Err(SyntaxError::UnknownPseudoClass(format!("{name}()"))),
        }
    }

    /// Consume a parenthesized argument and return its raw text together with
    /// its absolute offset. Nested brackets and quotes must balance.
    fn consume_arguments(&mut self) -> Result<(String, usize), SyntaxError> {
        let open = self.position();
        // skip '('
        self.advance();
        let start = self.index;
        let mut closers: Vec<(char, usize)> = Vec::new();
        loop {
            let Some(current) = self.peek() else {
                let (unclosed, position) = closers
                    .last()
                    .map_or(('(', open), |&(closer, position)| (opener_of(closer), position));
                return Err(SyntaxError::Unbalanced { bracket: unclosed, position });
            };
            match current {
                '"' | '\'' => {
                    self.consume_string()?;
                    continue;
                }
                '\\' => {
                    self.advance();
                }
                '(' => closers.push((')', self.position())),
                '[' => closers.push((']', self.position())),
                ')' if closers.is_empty() => {
                    let argument: String =
                        self.input.get(start..self.index).unwrap_or(&[]).iter().collect();
                    self.advance();
                    return Ok((argument, self.base.saturating_add(start)));
                }
                ')' | ']' => match closers.pop() {
                    Some((closer, _)) if closer == current => {}
                    // The innermost bracket is left open.
                    Some((closer, position)) => {
                        return Err(SyntaxError::Unbalanced {
                            bracket: opener_of(closer),
                            position,
                        });
                    }
                    None => {
                        return Err(SyntaxError::Unbalanced {
                            bracket: current,
                            position: self.position(),
                        });
                    }
                },
                _ => {}
            }
            self.advance();
        }
    }
}

/// Map a non-functional pseudo-class name to its predicate.
fn simple_pseudo(name: &str) -> Option<PseudoClass> {
    Some(match name {
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        "empty" => PseudoClass::Empty,
        "root" => PseudoClass::Root,
        "checked" => PseudoClass::Checked,
        "disabled" => PseudoClass::Disabled,
        "enabled" => PseudoClass::Enabled,
        "required" => PseudoClass::Required,
        "optional" => PseudoClass::Optional,
        _ => return None,
    })
}

/// Split `An+B of S` into the formula text and, if present, the selector text
/// with its char offset inside `argument`.
fn split_of_clause(argument: &str) -> (&str, Option<(&str, usize)>) {
    let bytes = argument.as_bytes();
    let mut index = 1_usize;
    while index.saturating_add(2) <= bytes.len() {
        let before = bytes.get(index.saturating_sub(1)).copied().unwrap_or(b'x');
        let word = bytes.get(index..index.saturating_add(2)).unwrap_or(&[]);
        let after = bytes.get(index.saturating_add(2)).copied();
        if before.is_ascii_whitespace()
            && word.eq_ignore_ascii_case(b"of")
            && after.is_none_or(|byte| byte.is_ascii_whitespace())
        {
            let formula = argument.get(..index).unwrap_or("");
            let rest_start = index.saturating_add(2);
            let selector = argument.get(rest_start..).unwrap_or("");
            let offset = argument.get(..rest_start).map_or(0, |head| head.chars().count());
            return (formula, Some((selector, offset)));
        }
        index = index.saturating_add(1);
    }
    (argument, None)
}

const fn opener_of(closer: char) -> char {
    match closer {
        ']' => '[',
        _ => '(',
    }
}

#[inline]
const fn is_css_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

#[inline]
fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

#[inline]
fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_ascii_digit() || ch == '-'
}

/// Assembles tokens into complex selectors.
struct SelectorParser {
    tokens: SelectorTokenizer,
}

impl SelectorParser {
    fn parse_list(&mut self) -> Result<SelectorList, SyntaxError> {
        let mut list = SelectorList::default();
        loop {
            let (complex, more) = self.parse_complex()?;
            list.selectors.push(complex);
            if !more {
                return Ok(list);
            }
        }
    }

    /// Parse one complex selector, stopping after a comma (returning `true`)
    /// or at the end of input (returning `false`).
    /// Selectors 4 §16: Combinators; Sections 5–7: simple selectors
    fn parse_complex(&mut self) -> Result<(ComplexSelector, bool), SyntaxError> {
        let start = self.tokens.position();
        let mut compounds: Vec<CompoundSelector> = Vec::new();
        let mut current = CompoundSelector::default();
        let mut simples_in_current = 0_usize;
        let mut has_type = false;
        let mut last_combinator: Option<(char, usize)> = None;
        let mut more = false;

        while let Some((position, token)) = self.tokens.next()? {
            match token {
                Tok::Comma => {
                    more = true;
                    break;
                }
                Tok::Combinator(combinator, symbol) => {
                    if simples_in_current == 0 {
                        return Err(SyntaxError::DanglingCombinator {
                            combinator: symbol,
                            position,
                        });
                    }
                    current.combinator = Some(combinator);
                    compounds.push(take(&mut current));
                    simples_in_current = 0;
                    has_type = false;
                    last_combinator = Some((symbol, position));
                }
                Tok::Universal if has_type || simples_in_current > 0 => {
                    return Err(SyntaxError::UnexpectedToken { found: '*', position });
                }
                Tok::Type(name) if has_type || simples_in_current > 0 => {
                    let found = name.chars().next().unwrap_or('?');
                    return Err(SyntaxError::UnexpectedToken { found, position });
                }
                Tok::Universal => {
                    has_type = true;
                    simples_in_current += 1;
                }
                Tok::Type(name) => {
                    has_type = true;
                    current.tag = Some(name);
                    simples_in_current += 1;
                }
                Tok::Class(class) => {
                    current.classes.push(class);
                    simples_in_current += 1;
                }
                Tok::Id(id) => {
                    match &current.id {
                        // `#a#b`: keep the first as the id constraint, the rest as
                        // equivalent attribute predicates.
                        Some(existing) if *existing != id => current.attributes.push(
                            AttributeSelector::new("id".into(), AttrOperator::Equals, id, AttrCase::Sensitive),
                        ),
                        Some(_) => {}
                        None => current.id = Some(id),
                    }
                    simples_in_current += 1;
                }
                Tok::Attribute(attribute) => {
                    current.attributes.push(attribute);
                    simples_in_current += 1;
                }
                Tok::Pseudo(pseudo) => {
                    current.pseudos.push(pseudo);
                    simples_in_current += 1;
                }
            }
        }

        if simples_in_current == 0 {
            if let Some((combinator, position)) = last_combinator {
                return Err(SyntaxError::DanglingCombinator { combinator, position });
            }
            return Err(SyntaxError::EmptyCompound { position: start });
        }
        compounds.push(current);
        Ok((ComplexSelector { compounds }, more))
    }
}

/// Parse a selector list from CSS text.
/// Selectors 4 §4.1: Selector lists; §16: Combinators
///
/// # Errors
/// Returns a [`SyntaxError`] describing the first problem found; no partial
/// selector is ever produced.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SyntaxError> {
    let list = parse_nested(input, 0)?;
    trace!(target: "css_selectors", "compiled '{input}' into {} selector(s)", list.selectors.len());
    Ok(list)
}

/// Parse a selector list found at `base` inside a larger selector text.
fn parse_nested(input: &str, base: usize) -> Result<SelectorList, SyntaxError> {
    if input.chars().all(is_css_whitespace) {
        return Err(SyntaxError::Empty);
    }
    let mut parser = SelectorParser {
        tokens: SelectorTokenizer::new(input, base),
    };
    parser.parse_list()
}
