use crate::config::{BackwardConfig, GradClip};
use crate::error::{Error, Result};
use crate::op::Op;
use log::{debug, trace};
use std::cell::Cell;
use std::collections::HashSet;
use std::iter::zip;
use std::rc::Rc;

pub type ValueId = usize;

pub type ValueType = f64;

#[derive(Debug)]
struct Node {
    id: ValueId,
    data: ValueType,
    grad: Cell<ValueType>,
    op: Op,
    op_args: Vec<Value>,
}

impl Drop for Node {
    fn drop(&mut self) {
        // Release uniquely owned operands iteratively; a long chain would
        // otherwise recurse once per node.
        let mut pending = std::mem::take(&mut self.op_args);
        while let Some(value) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(value.0) {
                pending.append(&mut node.op_args);
            }
        }
    }
}

/// Value backed by an autograd engine.
///
/// A `Value` is a cheap handle: cloning it shares the same node, so the same
/// value can feed any number of downstream operations. Only the gradient is
/// mutable, and only through [`Value::backward`] and the reset methods.
#[derive(Clone, Debug)]
pub struct Value(Rc<Node>);

impl Value {
    pub fn new(data: ValueType) -> Self {
        Self::from_parts(data, Op::Leaf, vec![])
    }

    fn from_parts(data: ValueType, op: Op, op_args: Vec<Value>) -> Self {
        Self(Rc::new(Node {
            id: super::get_id(),
            data,
            grad: Cell::new(0.),
            op,
            op_args,
        }))
    }

    /// Evaluates `op` on `args` and records the result as a new node.
    fn apply(op: Op, args: Vec<Value>) -> Result<Value> {
        let data = op.forward(&args.iter().map(Value::data).collect::<Vec<_>>())?;
        Ok(Self::from_parts(data, op, args))
    }

    /// Same as [`Value::apply`] for operations that are defined everywhere.
    fn apply_total(op: Op, args: Vec<Value>) -> Value {
        match Self::apply(op, args) {
            Ok(val) => val,
            Err(err) => unreachable!("`{}` is defined everywhere: {}", op.name(), err),
        }
    }

    pub fn id(&self) -> ValueId {
        self.0.id
    }

    pub fn data(&self) -> ValueType {
        self.0.data
    }

    pub fn grad(&self) -> ValueType {
        self.0.grad.get()
    }

    pub fn op(&self) -> Op {
        self.0.op
    }

    pub fn op_args(&self) -> &[Value] {
        &self.0.op_args
    }

    pub fn is_leaf(&self) -> bool {
        self.0.op_args.is_empty()
    }

    /// Resets the gradient of this node only.
    pub fn reset_grad(&self) {
        self.0.grad.set(Default::default())
    }

    /// Resets the gradient of every node this value was computed from,
    /// including itself.
    pub fn zero_grad(&self) {
        Self::build_topology(self)
            .iter()
            .for_each(Value::reset_grad)
    }

    pub fn relu(&self) -> Value {
        Self::apply_total(Op::Relu, vec![self.clone()])
    }

    pub fn leaky_relu(&self, alpha: ValueType) -> Value {
        Self::apply_total(Op::LeakyRelu(alpha), vec![self.clone()])
    }

    pub fn exp(&self) -> Value {
        Self::apply_total(Op::Exp, vec![self.clone()])
    }

    pub fn ln(&self) -> Result<Value> {
        Self::apply(Op::Ln, vec![self.clone()])
    }

    pub fn tanh(&self) -> Value {
        Self::apply_total(Op::Tanh, vec![self.clone()])
    }

    pub fn sigmoid(&self) -> Value {
        Self::apply_total(Op::Sigmoid, vec![self.clone()])
    }

    pub fn pow(&self, exp: ValueType) -> Result<Value> {
        Self::apply(Op::Pow(exp), vec![self.clone()])
    }

    pub fn powv(&self, exp: &Value) -> Result<Value> {
        Self::apply(Op::PowValue, vec![self.clone(), exp.clone()])
    }

    pub fn div(&self, rhs: &Value) -> Result<Value> {
        if rhs.data() == 0. {
            debug!("division of {} by a zero value", self.data());
            return Err(Error::DivisionByZero {
                numerator: self.data(),
            });
        }
        Ok(self * &rhs.pow(-1.)?)
    }

    /// Applies a parameterless unary operation by name, e.g. `"tanh"`.
    pub fn unary(&self, name: &str) -> Result<Value> {
        let op: Op = name.parse()?;
        Self::apply(op, vec![self.clone()])
    }

    /// Computes the gradient of this value with respect to every node it was
    /// computed from.
    ///
    /// The gradient of `self` is set to 1 and every intermediate node reached
    /// holds the gradient of this pass only. Leaf gradients are added to, so
    /// calling this twice without [`Value::zero_grad`] in between doubles the
    /// gradients of the leaves.
    pub fn backward(&self) {
        self.backward_with(&BackwardConfig::default())
    }

    pub fn backward_with(&self, config: &BackwardConfig) {
        let topo = Self::build_topology(self);
        debug!(
            "backward from value {} through {} nodes",
            self.id(),
            topo.len()
        );

        topo.iter()
            .filter(|node| config.zero_grad || !node.is_leaf())
            .for_each(Value::reset_grad);

        self.0.grad.set(1.0);
        for node in topo.iter() {
            node.propagate(config.grad_clip);
        }
    }

    /// Reverse topological order of the graph rooted at `root`: every node
    /// comes before the operands it was computed from.
    fn build_topology(root: &Value) -> Vec<Value> {
        let mut topo = vec![];
        let mut visited = HashSet::<ValueId>::new();
        // `true` marks a node whose operands have all been pushed already.
        let mut stack = vec![(root.clone(), false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                topo.push(node);
                continue;
            }
            if !visited.insert(node.id()) {
                continue;
            }
            stack.push((node.clone(), true));
            for child in node.op_args().iter().rev() {
                if !visited.contains(&child.id()) {
                    stack.push((child.clone(), false));
                }
            }
        }
        topo.reverse();

        topo
    }

    fn propagate(&self, clip: Option<GradClip>) {
        if self.is_leaf() {
            return;
        }

        let args = self.op_args().iter().map(Value::data).collect::<Vec<_>>();
        let partials = self.op().partials(&args, self.data());
        trace!(
            "value {} ({}) grad={} partials={:?}",
            self.id(),
            self.op().name(),
            self.grad(),
            &partials[..args.len()]
        );
        for (arg, partial) in zip(self.op_args(), partials) {
            arg.update_grad(partial * self.grad(), clip);
        }
    }

    fn update_grad(&self, delta: ValueType, clip: Option<GradClip>) {
        let grad = self.grad() + delta;
        self.0.grad.set(match clip {
            Some(clip) => clip.apply(grad),
            None => grad,
        });
    }
}

impl From<ValueType> for Value {
    fn from(data: ValueType) -> Self {
        Value::new(data)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "Value({:.06}, grad={:.06})", self.data(), self.grad())?;
        if !fmt.alternate() {
            return Ok(());
        }

        match (self.op(), self.op_args()) {
            (_, []) => {}
            (Op::Pow(_), [arg]) => write!(fmt, " = [{}] {}", arg, self.op())?,
            (op, [arg]) => write!(fmt, " = {} [{}]", op, arg)?,
            (op, [lhs, rhs]) => write!(fmt, " = [{}] {} [{}]", lhs, op, rhs)?,
            _ => unimplemented!(),
        }
        Ok(())
    }
}

impl std::ops::Add<&Value> for &Value {
    type Output = Value;

    fn add(self, rhs: &Value) -> Self::Output {
        Value::apply_total(Op::Add, vec![self.clone(), rhs.clone()])
    }
}

impl std::ops::Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Self::Output {
        &self + &rhs
    }
}

impl std::ops::Add<Value> for ValueType {
    type Output = Value;

    fn add(self, rhs: Value) -> Self::Output {
        Value::new(self) + rhs
    }
}

impl std::ops::Add<ValueType> for Value {
    type Output = Value;

    fn add(self, rhs: ValueType) -> Self::Output {
        self + Value::new(rhs)
    }
}

impl std::ops::Sub<&Value> for &Value {
    type Output = Value;

    fn sub(self, rhs: &Value) -> Self::Output {
        self + &(-rhs)
    }
}

impl std::ops::Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Sub<Value> for ValueType {
    type Output = Value;

    fn sub(self, rhs: Value) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Sub<ValueType> for Value {
    type Output = Value;

    fn sub(self, rhs: ValueType) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Mul<&Value> for &Value {
    type Output = Value;

    fn mul(self, rhs: &Value) -> Self::Output {
        Value::apply_total(Op::Mul, vec![self.clone(), rhs.clone()])
    }
}

impl std::ops::Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Self::Output {
        &self * &rhs
    }
}

impl std::ops::Mul<Value> for ValueType {
    type Output = Value;

    fn mul(self, rhs: Value) -> Self::Output {
        Value::new(self) * rhs
    }
}

impl std::ops::Mul<ValueType> for Value {
    type Output = Value;

    fn mul(self, rhs: ValueType) -> Self::Output {
        self * Value::new(rhs)
    }
}

impl std::ops::Neg for &Value {
    type Output = Value;

    fn neg(self) -> Self::Output {
        Value::apply_total(Op::Neg, vec![self.clone()])
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Self::Output {
        -&self
    }
}

impl std::ops::Div<&Value> for &Value {
    type Output = Result<Value>;

    fn div(self, rhs: &Value) -> Self::Output {
        Value::div(self, rhs)
    }
}

impl std::ops::Div for Value {
    type Output = Result<Value>;

    fn div(self, rhs: Value) -> Self::Output {
        Value::div(&self, &rhs)
    }
}

impl std::ops::Div<Value> for ValueType {
    type Output = Result<Value>;

    fn div(self, rhs: Value) -> Self::Output {
        Value::new(self) / rhs
    }
}

impl std::ops::Div<ValueType> for Value {
    type Output = Result<Value>;

    fn div(self, rhs: ValueType) -> Self::Output {
        self / Value::new(rhs)
    }
}
