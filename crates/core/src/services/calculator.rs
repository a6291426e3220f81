use crate::errors::CoreError;

/// Shown in place of a result when evaluation fails.
pub const ERROR_DISPLAY: &str = "Error";

const MAX_DECIMALS: usize = 10;

/// Nesting limit for parentheses and unary signs; the parser recurses per level.
const MAX_DEPTH: usize = 64;

/// A button on the calculator widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculatorKey {
    Digit(u8),
    Decimal,
    /// One of `+ - * / %`.
    Operator(char),
    OpenParen,
    CloseParen,
    Clear,
    Backspace,
    Equals,
}

impl CalculatorKey {
    /// Map a typed character to a key. `×`/`÷` are accepted as `*`/`/`,
    /// Enter as `=`, `c`/Esc as clear.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(CalculatorKey::Digit(c as u8 - b'0')),
            '.' => Some(CalculatorKey::Decimal),
            '+' | '-' | '*' | '/' | '%' => Some(CalculatorKey::Operator(c)),
            '×' => Some(CalculatorKey::Operator('*')),
            '÷' => Some(CalculatorKey::Operator('/')),
            '(' => Some(CalculatorKey::OpenParen),
            ')' => Some(CalculatorKey::CloseParen),
            '=' | '\n' | '\r' => Some(CalculatorKey::Equals),
            'c' | 'C' | '\u{1b}' => Some(CalculatorKey::Clear),
            '\u{8}' => Some(CalculatorKey::Backspace),
            _ => None,
        }
    }
}

/// Input reducer behind the embedded calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calculator {
    expression: String,
    /// Last `=` produced a result (or `Error`) that is still on screen.
    showing_result: bool,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the screen shows; `"0"` when empty.
    #[must_use]
    pub fn display(&self) -> &str {
        if self.expression.is_empty() {
            "0"
        } else {
            &self.expression
        }
    }

    /// Feed one key and return the new display.
    pub fn press(&mut self, key: CalculatorKey) -> &str {
        match key {
            CalculatorKey::Clear => {
                self.expression.clear();
                self.showing_result = false;
            }
            CalculatorKey::Backspace => {
                if self.showing_result {
                    self.expression.clear();
                    self.showing_result = false;
                } else {
                    self.expression.pop();
                }
            }
            CalculatorKey::Equals => {
                if !self.expression.is_empty() && !self.showing_result {
                    self.expression = match evaluate(&self.expression) {
                        Ok(value) => format_number(value),
                        Err(_) => ERROR_DISPLAY.to_string(),
                    };
                    self.showing_result = true;
                }
            }
            CalculatorKey::Operator(op) => {
                // Operators continue from a result, but not from an error.
                if self.expression == ERROR_DISPLAY {
                    self.expression.clear();
                }
                self.showing_result = false;
                if let Some(last) = self.expression.chars().last() {
                    if is_binary_operator(last) && op != '-' {
                        self.expression.pop();
                    }
                }
                if !(self.expression.is_empty() && op != '-') {
                    self.expression.push(op);
                }
            }
            CalculatorKey::Digit(d) => {
                self.start_fresh_if_showing_result();
                self.expression.push(char::from(b'0' + d.min(9)));
            }
            CalculatorKey::Decimal => {
                self.start_fresh_if_showing_result();
                let current_number: String = self
                    .expression
                    .chars()
                    .rev()
                    .take_while(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                if !current_number.contains('.') {
                    if current_number.is_empty() {
                        self.expression.push('0');
                    }
                    self.expression.push('.');
                }
            }
            CalculatorKey::OpenParen => {
                self.start_fresh_if_showing_result();
                self.expression.push('(');
            }
            CalculatorKey::CloseParen => {
                if !self.showing_result {
                    self.expression.push(')');
                }
            }
        }
        self.display()
    }

    /// Feed a whole typed string; unknown characters are skipped.
    pub fn input(&mut self, keys: &str) -> &str {
        for key in keys.chars().filter_map(CalculatorKey::from_char) {
            self.press(key);
        }
        self.display()
    }

    fn start_fresh_if_showing_result(&mut self) {
        if self.showing_result {
            self.expression.clear();
            self.showing_result = false;
        }
    }
}

fn is_binary_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '%')
}

/// Evaluate an arithmetic expression.
///
/// Grammar (`%` is remainder, same precedence as `*` and `/`):
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/' | '%') factor)*
/// factor := ('-' | '+') factor | number | '(' expr ')'
/// ```
pub fn evaluate(expression: &str) -> Result<f64, CoreError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(calc_error("unexpected trailing input"));
    }
    if !value.is_finite() {
        return Err(calc_error("result is not a finite number"));
    }
    Ok(value)
}

/// Render a result without trailing zeros, rounded to 10 decimals.
#[must_use]
pub fn format_number(value: f64) -> String {
    let s = format!("{:.*}", MAX_DECIMALS, value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CoreError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = literal
                    .parse::<f64>()
                    .map_err(|_| calc_error(&format!("bad number '{literal}'")))?;
                tokens.push(Token::Number(n));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '×' => {
                tokens.push(Token::Op('*'));
                chars.next();
            }
            '÷' => {
                tokens.push(Token::Op('/'));
                chars.next();
            }
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            other => return Err(calc_error(&format!("unexpected character '{other}'"))),
        }
    }
    if tokens.is_empty() {
        return Err(calc_error("empty expression"));
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64, CoreError> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CoreError> {
        let mut value = self.factor()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = match op {
                '*' => value * rhs,
                _ if rhs == 0.0 => return Err(calc_error("division by zero")),
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CoreError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.nested(Self::factor)?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.nested(Self::factor)
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(n)
            }
            Some(Token::Open) => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                if self.peek() != Some(Token::Close) {
                    return Err(calc_error("missing ')'"));
                }
                self.pos += 1;
                Ok(value)
            }
            _ => Err(calc_error("expected a number")),
        }
    }

    /// Run `rule` one level deeper, failing once [`MAX_DEPTH`] is exceeded.
    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<f64, CoreError>,
    ) -> Result<f64, CoreError> {
        if self.depth >= MAX_DEPTH {
            return Err(calc_error("expression nested too deeply"));
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }
}

fn calc_error(detail: &str) -> CoreError {
    CoreError::Validation(format!("Invalid expression: {detail}"))
}
