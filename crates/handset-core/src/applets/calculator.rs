//! Four-function calculator.

use crate::applets::{Applet, AppletContext, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;

/// Shown after division by zero or any non-finite result.
const ERROR_TEXT: &str = "Error";
/// Longest operand the display accepts.
const MAX_DIGITS: usize = 16;

/// Binary operator keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '×',
            Self::Divide => '÷',
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" | "x" | "×" => Some(Self::Multiply),
            "/" | "÷" => Some(Self::Divide),
            _ => None,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        let value = match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
            Self::Divide if rhs == 0.0 => return None,
            Self::Divide => lhs / rhs,
        };
        value.is_finite().then_some(value)
    }
}

/// Display / pending-operator state machine.
#[derive(Debug, Clone)]
pub struct CalculatorApplet {
    display: String,
    operator: Option<Operator>,
    previous: Option<f64>,
    /// The next digit starts a new operand instead of appending.
    reset_display: bool,
}

impl CalculatorApplet {
    pub fn new() -> Self {
        Self {
            display: "0".to_string(),
            operator: None,
            previous: None,
            reset_display: false,
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.operator
    }

    fn is_error(&self) -> bool {
        self.display == ERROR_TEXT
    }

    fn value(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    fn show(&mut self, value: Option<f64>) {
        self.display = match value {
            // Avoid displaying "-0".
            Some(v) if v == 0.0 => "0".to_string(),
            Some(v) => v.to_string(),
            None => ERROR_TEXT.to_string(),
        };
    }

    pub fn digit(&mut self, d: char) {
        debug_assert!(d.is_ascii_digit());
        if self.display == "0" || self.reset_display || self.is_error() {
            self.display = d.to_string();
            self.reset_display = false;
        } else if self.display.trim_start_matches('-').len() < MAX_DIGITS {
            self.display.push(d);
        }
    }

    /// Add a decimal point unless the operand already has one.
    pub fn decimal_point(&mut self) {
        if self.reset_display || self.is_error() {
            self.display = "0.".to_string();
            self.reset_display = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    /// Select an operator. A pending operation with a fresh operand is
    /// evaluated first, so `2 + 3 ×` shows 5.
    pub fn operator(&mut self, op: Operator) {
        if self.is_error() {
            return;
        }
        if let (Some(pending), Some(prev), false) =
            (self.operator, self.previous, self.reset_display)
        {
            self.show(pending.apply(prev, self.value()));
            if self.is_error() {
                self.operator = None;
                self.previous = None;
                self.reset_display = true;
                return;
            }
        }
        self.operator = Some(op);
        self.previous = Some(self.value());
        self.reset_display = true;
    }

    pub fn equals(&mut self) {
        let (Some(op), Some(prev)) = (self.operator, self.previous) else {
            return;
        };
        self.show(op.apply(prev, self.value()));
        self.operator = None;
        self.previous = None;
        self.reset_display = true;
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn negate(&mut self) {
        if self.is_error() || self.value() == 0.0 {
            return;
        }
        match self.display.strip_prefix('-') {
            Some(positive) => self.display = positive.to_string(),
            None => self.display.insert(0, '-'),
        }
    }

    pub fn percent(&mut self) {
        if self.is_error() {
            return;
        }
        self.show(Some(self.value() / 100.0));
        self.reset_display = true;
    }

    /// Press one key by its label.
    pub fn press(&mut self, key: &str) -> Result<()> {
        match key {
            "." => self.decimal_point(),
            "=" => self.equals(),
            "%" => self.percent(),
            "+/-" | "neg" => self.negate(),
            k if k.eq_ignore_ascii_case("ac") || k.eq_ignore_ascii_case("c") => self.clear(),
            k if k.len() == 1 && k.as_bytes()[0].is_ascii_digit() => {
                self.digit(char::from(k.as_bytes()[0]));
            },
            k => match Operator::from_key(k) {
                Some(op) => self.operator(op),
                None => {
                    // Multi-digit operands typed in one go.
                    if !k.is_empty() && k.chars().all(|c| c.is_ascii_digit() || c == '.') {
                        for c in k.chars() {
                            self.press(c.encode_utf8(&mut [0; 4]))?;
                        }
                    } else {
                        return Err(HandsetError::Validation(format!("no key {k:?}")));
                    }
                },
            },
        }
        Ok(())
    }
}

impl Default for CalculatorApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for CalculatorApplet {
    fn id(&self) -> AppId {
        AppId::Calculator
    }

    fn handle(&mut self, command: &str, args: &[&str], _cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "press" => args.iter().try_for_each(|k| self.press(k)),
            key => self.press(key).map_err(|_| unknown_command(self.id(), key)),
        }
    }

    fn view(&self) -> Vec<String> {
        let pending = match (self.previous, self.operator) {
            (Some(prev), Some(op)) => format!("{prev} {}", op.symbol()),
            _ => String::new(),
        };
        vec![
            format!("{:>20}", pending),
            format!("{:>20}", self.display),
            "AC  +/-  %  ÷".into(),
            " 7   8   9  ×".into(),
            " 4   5   6  -".into(),
            " 1   2   3  +".into(),
            "   0     .  =".into(),
        ]
    }
}
