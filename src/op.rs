//! The closed set of operations a [`Value`](crate::engine::Value) can be
//! produced by, with their forward evaluation and local derivatives.

use crate::engine::ValueType;
use crate::error::{Error, Result};
use log::debug;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Op {
    /// Input value, not produced by any operation.
    Leaf,
    Add,
    Mul,
    Neg,
    /// Power with a constant exponent.
    Pow(ValueType),
    /// Power whose exponent is the second operand.
    PowValue,
    Relu,
    LeakyRelu(ValueType),
    Exp,
    Ln,
    Tanh,
    Sigmoid,
}

impl Op {
    pub fn arity(&self) -> usize {
        match self {
            Op::Leaf => 0,
            Op::Add | Op::Mul | Op::PowValue => 2,
            _ => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Op::Leaf => "leaf",
            Op::Add => "add",
            Op::Mul => "mul",
            Op::Neg => "neg",
            Op::Pow(_) => "pow",
            Op::PowValue => "powv",
            Op::Relu => "relu",
            Op::LeakyRelu(_) => "leaky_relu",
            Op::Exp => "exp",
            Op::Ln => "ln",
            Op::Tanh => "tanh",
            Op::Sigmoid => "sigmoid",
        }
    }

    /// Evaluates the operation on the operands' values.
    ///
    /// Points where the result or its derivative is undefined are rejected
    /// here so that a bad expression fails where it is written rather than
    /// during backward.
    pub(crate) fn forward(&self, args: &[ValueType]) -> Result<ValueType> {
        debug_assert_eq!(args.len(), self.arity());

        let out = match *self {
            Op::Leaf => return Err(Error::UnsupportedOperation(self.name().to_string())),
            Op::Add => args[0] + args[1],
            Op::Mul => args[0] * args[1],
            Op::Neg => -args[0],
            Op::Pow(exp) => {
                self.check_pow(args[0], exp)?;
                args[0].powf(exp)
            }
            Op::PowValue => {
                self.check_pow(args[0], args[1])?;
                args[0].powf(args[1])
            }
            Op::Relu => args[0].max(0.),
            Op::LeakyRelu(alpha) => {
                if args[0] > 0. {
                    args[0]
                } else {
                    alpha * args[0]
                }
            }
            Op::Exp => args[0].exp(),
            Op::Ln => {
                if args[0] <= 0. {
                    return Err(self.domain_error(args));
                }
                args[0].ln()
            }
            Op::Tanh => args[0].tanh(),
            Op::Sigmoid => sigmoid(args[0]),
        };

        Ok(out)
    }

    /// Partial derivative of the output with respect to each operand, given
    /// the operands' values and the output value. Entries past the arity are 0.
    pub(crate) fn partials(&self, args: &[ValueType], out: ValueType) -> [ValueType; 2] {
        match *self {
            Op::Leaf => [0., 0.],
            Op::Add => [1., 1.],
            Op::Mul => [args[1], args[0]],
            Op::Neg => [-1., 0.],
            Op::Pow(exp) => [exp * args[0].powf(exp - 1.), 0.],
            Op::PowValue => {
                let (base, exp) = (args[0], args[1]);
                // d/d(exp) needs ln(base); a non-positive base contributes nothing.
                let d_exp = if base > 0. { out * base.ln() } else { 0. };
                [exp * base.powf(exp - 1.), d_exp]
            }
            Op::Relu => [if out > 0. { 1. } else { 0. }, 0.],
            Op::LeakyRelu(alpha) => [if args[0] > 0. { 1. } else { alpha }, 0.],
            Op::Exp => [out, 0.],
            Op::Ln => [1. / args[0], 0.],
            Op::Tanh => [1. - out * out, 0.],
            Op::Sigmoid => [out * (1. - out), 0.],
        }
    }

    fn check_pow(&self, base: ValueType, exp: ValueType) -> Result<()> {
        if (base == 0. && exp < 1.) || (base < 0. && exp.fract() != 0.) {
            return Err(self.domain_error(&[base, exp]));
        }
        Ok(())
    }

    fn domain_error(&self, args: &[ValueType]) -> Error {
        debug!("rejecting `{}` at {:?}", self.name(), args);
        Error::DomainError {
            op: self.name(),
            args: args.to_vec(),
        }
    }
}

fn sigmoid(x: ValueType) -> ValueType {
    if x >= 0. {
        1. / (1. + (-x).exp())
    } else {
        let e = x.exp();
        e / (1. + e)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Leaf => Ok(()),
            Op::Add => f.write_str("+"),
            Op::Mul => f.write_str("*"),
            Op::Neg => f.write_str("-"),
            Op::Pow(exp) => write!(f, "^{}", exp),
            Op::PowValue => f.write_str("^"),
            Op::Relu => f.write_str("ReLU"),
            Op::LeakyRelu(alpha) => write!(f, "LeakyReLU({})", alpha),
            Op::Exp => f.write_str("exp"),
            Op::Ln => f.write_str("ln"),
            Op::Tanh => f.write_str("tanh"),
            Op::Sigmoid => f.write_str("sigmoid"),
        }
    }
}

/// Parses the name of a unary operation that takes no parameter.
impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "neg" => Ok(Op::Neg),
            "relu" => Ok(Op::Relu),
            "exp" => Ok(Op::Exp),
            "ln" | "log" => Ok(Op::Ln),
            "tanh" => Ok(Op::Tanh),
            "sigmoid" => Ok(Op::Sigmoid),
            _ => Err(Error::UnsupportedOperation(s.to_string())),
        }
    }
}
