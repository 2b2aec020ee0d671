//! Arithmetic operations displayed by drops.
//!
//! Operations are immutable once constructed: the result is computed eagerly so
//! that malformed operand pairs surface while the difficulty catalogue is being
//! validated rather than while a drop is spawning.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of arithmetic kinds a drop may carry.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumCount,
    strum_macros::EnumIter,
)]
pub enum OperationKind {
    /// Integer addition.
    Sum,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Integer division truncating toward zero.
    Div,
    /// Bitwise conjunction over operands written as binary digit strings.
    And,
    /// Bitwise disjunction over operands written as binary digit strings.
    Or,
}

impl OperationKind {
    /// Symbol rendered between the two operands.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Sum => "+",
            Self::Sub => "-",
            Self::Mul => "X",
            Self::Div => "/",
            Self::And => "&",
            Self::Or => "|",
        }
    }

    /// Reports whether operands are interpreted as binary digit strings.
    #[must_use]
    pub const fn is_bitwise(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Catalogue entry describing an operation a profile may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationTemplate {
    /// Operand rendered on the left-hand side.
    pub first_operand: i32,
    /// Operand rendered on the right-hand side.
    pub second_operand: i32,
    /// Arithmetic kind combining both operands.
    pub operation_type: OperationKind,
}

impl OperationTemplate {
    /// Creates a new template from its operands and kind.
    #[must_use]
    pub const fn new(first_operand: i32, second_operand: i32, operation_type: OperationKind) -> Self {
        Self {
            first_operand,
            second_operand,
            operation_type,
        }
    }

    /// Builds the concrete operation described by the template.
    pub fn instantiate(&self) -> Result<Operation, OperationError> {
        Operation::new(self.operation_type, self.first_operand, self.second_operand)
    }
}

impl fmt::Display for OperationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.first_operand, self.operation_type, self.second_operand
        )
    }
}

/// Immutable operation with its result computed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Operation {
    kind: OperationKind,
    first_operand: i32,
    second_operand: i32,
    result: i32,
}

impl Operation {
    /// Creates an operation, computing its result.
    ///
    /// Bitwise kinds read each operand's decimal digits as a binary string, so
    /// `110 & 11` evaluates `6 & 3` and reports the result as the digits `10`.
    pub fn new(
        kind: OperationKind,
        first_operand: i32,
        second_operand: i32,
    ) -> Result<Self, OperationError> {
        let result = compute(kind, first_operand, second_operand)?;
        Ok(Self {
            kind,
            first_operand,
            second_operand,
            result,
        })
    }

    /// Arithmetic kind of the operation.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Left-hand operand.
    #[must_use]
    pub const fn first_operand(&self) -> i32 {
        self.first_operand
    }

    /// Right-hand operand.
    #[must_use]
    pub const fn second_operand(&self) -> i32 {
        self.second_operand
    }

    /// Value the player must submit to match the operation.
    #[must_use]
    pub const fn result(&self) -> i32 {
        self.result
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.kind.is_bitwise() {
            return write!(
                f,
                "{}{}{}",
                self.first_operand,
                self.kind.symbol(),
                self.second_operand
            );
        }

        let first = self.first_operand.to_string();
        let second = self.second_operand.to_string();
        let width = first.len().max(second.len());
        write!(
            f,
            "{first:0>width$}\n{}\n{second:0>width$}",
            self.kind.symbol()
        )
    }
}

/// Reasons an operand pair cannot form a valid operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The divisor of a division is zero.
    #[error("division of {dividend} by zero")]
    DivisionByZero {
        /// Left-hand operand of the rejected division.
        dividend: i32,
    },
    /// The result does not fit in a 32-bit signed integer.
    #[error("{first} {kind} {second} overflows")]
    Overflow {
        /// Kind of the overflowing operation.
        kind: OperationKind,
        /// Left-hand operand.
        first: i32,
        /// Right-hand operand.
        second: i32,
    },
    /// A bitwise operand is negative.
    #[error("bitwise operand {operand} is negative")]
    NegativeBitwiseOperand {
        /// Offending operand.
        operand: i32,
    },
    /// A bitwise operand contains digits other than zero and one.
    #[error("bitwise operand {operand} is not a binary digit string")]
    NonBinaryOperand {
        /// Offending operand.
        operand: i32,
    },
}

fn compute(kind: OperationKind, first: i32, second: i32) -> Result<i32, OperationError> {
    let overflow = OperationError::Overflow {
        kind,
        first,
        second,
    };
    match kind {
        OperationKind::Sum => first.checked_add(second).ok_or(overflow),
        OperationKind::Sub => first.checked_sub(second).ok_or(overflow),
        OperationKind::Mul => first.checked_mul(second).ok_or(overflow),
        OperationKind::Div => {
            if second == 0 {
                return Err(OperationError::DivisionByZero { dividend: first });
            }
            first.checked_div(second).ok_or(overflow)
        }
        OperationKind::And => combine_binary(first, second, |lhs, rhs| lhs & rhs, overflow),
        OperationKind::Or => combine_binary(first, second, |lhs, rhs| lhs | rhs, overflow),
    }
}

fn combine_binary(
    first: i32,
    second: i32,
    combine: impl Fn(u32, u32) -> u32,
    overflow: OperationError,
) -> Result<i32, OperationError> {
    let lhs = binary_digits_value(first)?;
    let rhs = binary_digits_value(second)?;
    format!("{:b}", combine(lhs, rhs))
        .parse::<i32>()
        .map_err(|_| overflow)
}

fn binary_digits_value(operand: i32) -> Result<u32, OperationError> {
    if operand < 0 {
        return Err(OperationError::NegativeBitwiseOperand { operand });
    }
    u32::from_str_radix(&operand.to_string(), 2)
        .map_err(|_| OperationError::NonBinaryOperand { operand })
}
