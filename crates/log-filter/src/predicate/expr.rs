//! 술어 표현식 언어 -- 캡처 그룹에 대한 부수효과 없는 불리언 표현식
//!
//! # 문법
//! ```text
//! or      := and (("||" | "or") and)*
//! and     := not (("&&" | "and") not)*
//! not     := ("!" | "not") not | compare
//! compare := primary (cmp_op primary)?
//! cmp_op  := "==" | "!=" | "<" | "<=" | ">" | ">="
//!          | "contains" | "startswith" | "endswith"
//! primary := "$" digits | "$" ident | "${" ident "}"
//!          | string | number | "true" | "false"
//!          | ("len" | "defined") "(" or ")"
//!          | "(" or ")"
//! ```
//!
//! # 평가 규칙
//! - 매칭에 참여하지 않은 그룹은 `null`이며, `null`이 포함된 비교는 모두 거짓입니다.
//! - 양쪽 피연산자가 모두 숫자로 해석되면 숫자 비교, 아니면 문자열 비교입니다.
//! - 결과가 `true`, 비어 있지 않은 문자열, 0이 아닌 숫자이면 참입니다.

use std::cmp::Ordering;

use super::{PredicateError, PredicateInput};

/// 술어 소스 최대 길이
const MAX_SOURCE_LEN: usize = 4096;
/// 최대 중첩 깊이
const MAX_DEPTH: usize = 64;

/// 평가 결과 값
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Value {
    /// 참/거짓 판정
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Num(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    StartsWith,
    EndsWith,
}

/// 내장 함수
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    /// 문자 수, `null`은 0
    Len,
    /// `null`이 아니면 참
    Defined,
}

/// 표현식 AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// 1부터 시작하는 위치 캡처 그룹
    Group(usize),
    /// 이름 있는 캡처 그룹
    Named(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CmpOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    /// 소스를 파싱하여 AST를 생성합니다.
    pub fn parse(source: &str) -> Result<Self, PredicateError> {
        if source.len() > MAX_SOURCE_LEN {
            return Err(syntax(
                0,
                format!("expression too long: {} bytes (max: {MAX_SOURCE_LEN})", source.len()),
            ));
        }

        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens: &tokens,
            position: 0,
            depth: 0,
            end: source.len(),
        };
        let expr = parser.parse_or()?;

        if let Some(token) = parser.current() {
            return Err(syntax(
                token.offset,
                format!("unexpected token {:?}", token.kind),
            ));
        }
        Ok(expr)
    }

    /// 표현식을 평가하여 참/거짓을 반환합니다.
    pub fn evaluate(&self, input: &PredicateInput<'_>) -> bool {
        self.value(input).is_truthy()
    }

    /// 표현식의 값을 계산합니다.
    pub fn value(&self, input: &PredicateInput<'_>) -> Value {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Group(n) => input
                .group(*n)
                .map_or(Value::Null, |s| Value::Str(s.to_owned())),
            Self::Named(name) => input
                .named(name)
                .map_or(Value::Null, |s| Value::Str(s.to_owned())),
            Self::Not(inner) => Value::Bool(!inner.value(input).is_truthy()),
            Self::And(lhs, rhs) => {
                Value::Bool(lhs.value(input).is_truthy() && rhs.value(input).is_truthy())
            }
            Self::Or(lhs, rhs) => {
                Value::Bool(lhs.value(input).is_truthy() || rhs.value(input).is_truthy())
            }
            Self::Compare(op, lhs, rhs) => {
                Value::Bool(compare(*op, &lhs.value(input), &rhs.value(input)))
            }
            Self::Call(Func::Len, arg) => match arg.value(input) {
                Value::Null => Value::Num(0.0),
                other => Value::Num(other.as_text().chars().count() as f64),
            },
            Self::Call(Func::Defined, arg) => {
                Value::Bool(!matches!(arg.value(input), Value::Null))
            }
        }
    }
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> bool {
    if matches!(lhs, Value::Null) || matches!(rhs, Value::Null) {
        return false;
    }

    match op {
        CmpOp::Contains => return lhs.as_text().contains(&rhs.as_text()),
        CmpOp::StartsWith => return lhs.as_text().starts_with(&rhs.as_text()),
        CmpOp::EndsWith => return lhs.as_text().ends_with(&rhs.as_text()),
        _ => {}
    }

    let ordering = match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(lhs.as_text().cmp(&rhs.as_text())),
        },
    };
    let Some(ordering) = ordering else {
        return false;
    };

    match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
        CmpOp::Contains | CmpOp::StartsWith | CmpOp::EndsWith => false,
    }
}

fn syntax(offset: usize, message: impl Into<String>) -> PredicateError {
    PredicateError::Syntax {
        offset,
        message: message.into(),
    }
}

// --- 토크나이저 ---

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Group(usize),
    Named(String),
    Str(String),
    Num(f64),
    Ident(String),
    Op(CmpOp),
    AndAnd,
    OrOr,
    Bang,
    LeftParen,
    RightParen,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(source: &str) -> Result<Vec<Token>, PredicateError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let two = chars.get(i + 1).map(|&(_, n)| n);
        let (kind, width) = match (c, two) {
            ('(', _) => (TokenKind::LeftParen, 1),
            (')', _) => (TokenKind::RightParen, 1),
            ('=', Some('=')) => (TokenKind::Op(CmpOp::Eq), 2),
            ('!', Some('=')) => (TokenKind::Op(CmpOp::Ne), 2),
            ('<', Some('=')) => (TokenKind::Op(CmpOp::Le), 2),
            ('>', Some('=')) => (TokenKind::Op(CmpOp::Ge), 2),
            ('<', _) => (TokenKind::Op(CmpOp::Lt), 1),
            ('>', _) => (TokenKind::Op(CmpOp::Gt), 1),
            ('!', _) => (TokenKind::Bang, 1),
            ('&', Some('&')) => (TokenKind::AndAnd, 2),
            ('|', Some('|')) => (TokenKind::OrOr, 2),
            ('$', _) => lex_reference(&chars, i)?,
            ('"' | '\'', _) => lex_string(&chars, i)?,
            (d, _) if d.is_ascii_digit() => lex_number(&chars, i)?,
            ('-', Some(d)) if d.is_ascii_digit() => lex_number(&chars, i)?,
            (s, _) if is_ident_start(s) => {
                let len = chars[i..]
                    .iter()
                    .take_while(|&&(_, ch)| is_ident_char(ch))
                    .count();
                let word: String = chars[i..i + len].iter().map(|&(_, ch)| ch).collect();
                (keyword_or_ident(word), len)
            }
            (other, _) => return Err(syntax(offset, format!("unexpected character '{other}'"))),
        };

        tokens.push(Token { kind, offset });
        i += width;
    }

    Ok(tokens)
}

fn keyword_or_ident(word: String) -> TokenKind {
    match word.as_str() {
        "and" => TokenKind::AndAnd,
        "or" => TokenKind::OrOr,
        "not" => TokenKind::Bang,
        "contains" => TokenKind::Op(CmpOp::Contains),
        "startswith" => TokenKind::Op(CmpOp::StartsWith),
        "endswith" => TokenKind::Op(CmpOp::EndsWith),
        _ => TokenKind::Ident(word),
    }
}

/// `$1`, `$name`, `${name}`
fn lex_reference(chars: &[(usize, char)], start: usize) -> Result<(TokenKind, usize), PredicateError> {
    let offset = chars[start].0;
    let rest = &chars[start + 1..];

    match rest.first().map(|&(_, c)| c) {
        Some(d) if d.is_ascii_digit() => {
            let len = rest.iter().take_while(|&&(_, c)| c.is_ascii_digit()).count();
            let digits: String = rest[..len].iter().map(|&(_, c)| c).collect();
            let index: usize = digits
                .parse()
                .map_err(|_| syntax(offset, format!("group index out of range: ${digits}")))?;
            if index == 0 {
                return Err(syntax(offset, "capture groups are numbered from 1"));
            }
            Ok((TokenKind::Group(index), len + 1))
        }
        Some('{') => {
            let inner = &rest[1..];
            let len = inner.iter().take_while(|&&(_, c)| c != '}').count();
            if len == inner.len() {
                return Err(syntax(offset, "unterminated '${'"));
            }
            let name: String = inner[..len].iter().map(|&(_, c)| c).collect();
            if name.chars().all(|c| c.is_ascii_digit()) && !name.is_empty() {
                let index: usize = name
                    .parse()
                    .map_err(|_| syntax(offset, format!("group index out of range: {name}")))?;
                if index == 0 {
                    return Err(syntax(offset, "capture groups are numbered from 1"));
                }
                return Ok((TokenKind::Group(index), len + 3));
            }
            if !name.starts_with(is_ident_start) || !name.chars().all(is_ident_char) {
                return Err(syntax(offset, format!("invalid group name '{name}'")));
            }
            Ok((TokenKind::Named(name), len + 3))
        }
        Some(c) if is_ident_start(c) => {
            let len = rest.iter().take_while(|&&(_, c)| is_ident_char(c)).count();
            let name: String = rest[..len].iter().map(|&(_, c)| c).collect();
            Ok((TokenKind::Named(name), len + 1))
        }
        _ => Err(syntax(offset, "expected group index or name after '$'")),
    }
}

fn lex_string(chars: &[(usize, char)], start: usize) -> Result<(TokenKind, usize), PredicateError> {
    let (offset, quote) = chars[start];
    let mut value = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i].1;
        if c == quote {
            return Ok((TokenKind::Str(value), i - start + 1));
        }
        if c == '\\' {
            let Some(&(_, escaped)) = chars.get(i + 1) else {
                break;
            };
            value.push(match escaped {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            i += 2;
            continue;
        }
        value.push(c);
        i += 1;
    }

    Err(syntax(offset, "unterminated string literal"))
}

fn lex_number(chars: &[(usize, char)], start: usize) -> Result<(TokenKind, usize), PredicateError> {
    let offset = chars[start].0;
    let mut len = usize::from(chars[start].1 == '-');
    len += chars[start + len..]
        .iter()
        .take_while(|&&(_, c)| c.is_ascii_digit() || c == '.')
        .count();
    let text: String = chars[start..start + len].iter().map(|&(_, c)| c).collect();
    let value: f64 = text
        .parse()
        .map_err(|_| syntax(offset, format!("invalid number '{text}'")))?;
    Ok((TokenKind::Num(value), len))
}

// --- 재귀 하강 파서 ---

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn current_offset(&self) -> usize {
        self.current().map_or(self.end, |t| t.offset)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn enter(&mut self) -> Result<(), PredicateError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(syntax(
                self.current_offset(),
                format!("expression nested too deeply (max: {MAX_DEPTH})"),
            ));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, PredicateError> {
        self.enter()?;
        let mut left = self.parse_and()?;
        while matches!(self.current().map(|t| &t.kind), Some(TokenKind::OrOr)) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth -= 1;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, PredicateError> {
        let mut left = self.parse_not()?;
        while matches!(self.current().map(|t| &t.kind), Some(TokenKind::AndAnd)) {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, PredicateError> {
        if matches!(self.current().map(|t| &t.kind), Some(TokenKind::Bang)) {
            self.advance();
            self.enter()?;
            let operand = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expr, PredicateError> {
        let left = self.parse_primary()?;
        if let Some(TokenKind::Op(op)) = self.current().map(|t| &t.kind) {
            let op = *op;
            self.advance();
            let right = self.parse_primary()?;
            return Ok(Expr::Compare(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, PredicateError> {
        let offset = self.current_offset();
        let Some(token) = self.current() else {
            return Err(syntax(offset, "unexpected end of expression"));
        };

        let expr = match &token.kind {
            TokenKind::Group(n) => Expr::Group(*n),
            TokenKind::Named(name) => Expr::Named(name.clone()),
            TokenKind::Str(s) => Expr::Literal(Value::Str(s.clone())),
            TokenKind::Num(n) => Expr::Literal(Value::Num(*n)),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect_right_paren()?;
                return Ok(inner);
            }
            TokenKind::Ident(word) => match word.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "len" | "defined" => {
                    let func = if word == "len" { Func::Len } else { Func::Defined };
                    self.advance();
                    if !matches!(self.current().map(|t| &t.kind), Some(TokenKind::LeftParen)) {
                        return Err(syntax(
                            self.current_offset(),
                            format!("expected '(' after '{word}'"),
                        ));
                    }
                    self.advance();
                    let arg = self.parse_or()?;
                    self.expect_right_paren()?;
                    return Ok(Expr::Call(func, Box::new(arg)));
                }
                other => return Err(syntax(offset, format!("unknown identifier '{other}'"))),
            },
            other => return Err(syntax(offset, format!("unexpected token {other:?}"))),
        };

        self.advance();
        Ok(expr)
    }

    fn expect_right_paren(&mut self) -> Result<(), PredicateError> {
        if matches!(self.current().map(|t| &t.kind), Some(TokenKind::RightParen)) {
            self.advance();
            Ok(())
        } else {
            Err(syntax(self.current_offset(), "expected closing parenthesis"))
        }
    }
}
