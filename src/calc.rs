//! Arithmetic expression evaluator.
//!
//! Recursive-descent parsing and evaluation of simple arithmetic over `f64`, with
//! the usual precedence: `+` `-` below `*` `/` `%` below right-associative `^`,
//! and parentheses for grouping. Spaces are stripped before parsing. Numeric
//! literals accept integers, decimals, leading-dot decimals (`.2`), a leading
//! minus directly before a digit, and `E`/`e` exponents with unsigned digits
//! (`1.2E2`).
//!
//! Deliberate grammar restrictions: a unary minus is only accepted directly
//! before a numeric literal (`-2.2` yes, `-(2+3)` no), exponents take no sign,
//! and there is no implicit multiplication (`2(2+5)` is an error).
//!
//! 算术表达式求值器。
//!
//! 对 `f64` 上的简单算术进行递归下降解析与求值，采用常规优先级：`+` `-` 低于
//! `*` `/` `%` 低于右结合的 `^`，括号用于分组。解析前会去除空格。数字字面量
//! 接受整数、小数、点开头的小数（`.2`）、紧邻数字前的负号，以及不带符号数字
//! 的 `E`/`e` 指数（`1.2E2`）。
//!
//! 有意保留的文法限制：一元负号只接受在数字字面量正前方（`-2.2` 可以，
//! `-(2+3)` 不行），指数不带符号，不支持隐式乘法（`2(2+5)` 是错误）。
//!
//! # Examples
//!
//! ```
//! use lite_coord::calc;
//!
//! assert_eq!(calc::calculate("2*(3+4)").unwrap(), 14.0);
//! assert_eq!(calc::calculate("2^3^2").unwrap(), 512.0);
//! assert_eq!(calc::try_calculate("2(2+5)"), None);
//! ```

pub mod error {
    //! Expression error types.

    use thiserror::Error;

    /// Errors reported while parsing or evaluating an expression
    ///
    /// Positions are character offsets into the expression after space removal.
    ///
    /// 解析或求值表达式时报告的错误
    ///
    /// 位置是去除空格后表达式中的字符偏移。
    #[derive(Debug, Error, Clone, PartialEq)]
    pub enum CalcError {
        /// The expression was empty or contained only spaces
        ///
        /// 表达式为空或只包含空格
        #[error("empty expression cannot be evaluated")]
        Empty,

        /// A character that cannot start or continue the expected token
        ///
        /// 无法开始或延续预期记号的字符
        #[error("'{ch}' at position {pos} is not an expected character")]
        UnexpectedChar { ch: char, pos: usize },

        /// The expression ended where an operand was required
        ///
        /// 表达式在需要操作数的位置结束
        #[error("unexpected end of expression")]
        UnexpectedEnd,

        /// A numeric token that does not parse as a float
        ///
        /// 无法解析为浮点数的数字记号
        #[error("'{text}' at position {pos} is not a valid number")]
        InvalidNumber { text: String, pos: usize },

        /// A parenthesis opened at `pos` was never closed
        ///
        /// 在 `pos` 处打开的括号从未闭合
        #[error("parenthesis opened at position {pos} is never closed")]
        UnclosedParen { pos: usize },

        /// Input left over after a complete expression, e.g. `2(2+5)`
        ///
        /// 完整表达式之后的剩余输入，例如 `2(2+5)`
        #[error("'{ch}' at position {pos} is left over after the expression")]
        TrailingChar { ch: char, pos: usize },
    }
}

use self::error::CalcError;

/// Evaluate an arithmetic expression
///
/// Supported symbols are `+ - * / % ^ ( )`. Fails with a [`CalcError`] describing
/// the offending token and position on malformed input.
///
/// 计算一个算术表达式
///
/// 支持的符号为 `+ - * / % ^ ( )`。输入格式错误时返回描述问题记号及位置的
/// [`CalcError`]。
pub fn calculate(expression: &str) -> Result<f64, CalcError> {
    let chars: Vec<char> = expression.chars().filter(|c| *c != ' ').collect();

    if chars.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser { chars, pos: 0 };
    let value = parser.expression()?;

    match parser.peek() {
        None => Ok(value),
        Some(ch) => Err(CalcError::TrailingChar {
            ch,
            pos: parser.pos,
        }),
    }
}

/// Non-failing variant of [`calculate`]
///
/// Returns `None` for every input `calculate` would reject: empty/space-only
/// strings, unrecognized tokens, unbalanced parentheses, missing operands and
/// adjacent sub-expressions without an operator.
///
/// [`calculate`] 的不报错变体
///
/// 对 `calculate` 会拒绝的所有输入返回 `None`：空/纯空格字符串、无法识别的
/// 记号、不配对的括号、缺失的操作数，以及中间没有运算符的相邻子表达式。
#[inline]
pub fn try_calculate(expression: &str) -> Option<f64> {
    calculate(expression).ok()
}

/// Cursor over the space-stripped expression.
///
/// One method per grammar rule:
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/' | '%') factor)*
/// factor     := base ('^' factor)?          right-associative
/// base       := number | '(' expression ')'
/// ```
struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;

        loop {
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;

        loop {
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                Some('%') => {
                    self.pos += 1;
                    value %= self.factor()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        let base = self.base()?;

        if self.peek() == Some('^') {
            self.pos += 1;

            // Right-associative: the whole remaining factor is the exponent
            let exponent = self.factor()?;

            return Ok(base.powf(exponent));
        }

        Ok(base)
    }

    fn base(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            None => Err(CalcError::UnexpectedEnd),
            Some('(') => {
                let open = self.pos;
                self.pos += 1;

                let value = self.expression()?;

                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(ch) => Err(CalcError::UnexpectedChar { ch, pos: self.pos }),
                    None => Err(CalcError::UnclosedParen { pos: open }),
                }
            }
            Some(_) => self.number(),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;

        // Unary minus is accepted only when a digit follows directly, so `-2.2`
        // is a literal while `-(2+3)` and `-.2` are rejected.
        if self.peek() == Some('-') {
            match self.chars.get(self.pos + 1) {
                Some(c) if c.is_ascii_digit() => self.pos += 1,
                _ => {
                    return Err(CalcError::UnexpectedChar {
                        ch: '-',
                        pos: self.pos,
                    });
                }
            }
        }

        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }

        if self.pos == start {
            // Not even the start of a literal; whatever is here cannot begin an
            // operand (covers leading operators and stray symbols).
            return Err(CalcError::UnexpectedChar {
                ch: self.chars[self.pos],
                pos: self.pos,
            });
        }

        // Exponent marker, digits only: `1.2E2` but neither `1.2E` nor `1.2E-2`.
        if matches!(self.peek(), Some('E') | Some('e'))
            && matches!(self.chars.get(self.pos + 1), Some(c) if c.is_ascii_digit())
        {
            self.pos += 1;

            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();

        text.parse::<f64>().map_err(|_| CalcError::InvalidNumber {
            text,
            pos: start,
        })
    }
}
