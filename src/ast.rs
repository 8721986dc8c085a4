use crate::literal::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// The protocol keyword for this operator.
    pub fn keyword(self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
        }
    }

    /// Lower numbers bind tighter. An operand is parenthesized iff its own
    /// precedence is numerically greater than its parent's.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 2,
            BinaryOp::Add | BinaryOp::Sub => 3,
            BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Le => 4,
            BinaryOp::Eq | BinaryOp::Ne => 5,
            BinaryOp::And => 6,
            BinaryOp::Or => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn precedence(self) -> u8 {
        1
    }
}

/// The unified expression tree. Both front ends construct these nodes and
/// the formatter consumes them; nothing mutates a node after construction,
/// so a tree can be formatted concurrently against different contexts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// A dotted symbolic path naming a property or navigation chain.
    /// Resolved against entity metadata at format time, not here.
    Reference(String),
    Value(Literal),
    /// An abstract function invocation. `target` is the receiver when the
    /// call was written receiver-qualified; free calls leave it `None`.
    Function {
        name: String,
        args: Vec<Expr>,
        target: Option<Box<Expr>>,
    },
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
}

impl Expr {
    pub fn reference(path: impl Into<String>) -> Expr {
        Expr::Reference(path.into())
    }

    pub fn value(literal: impl Into<Literal>) -> Expr {
        Expr::Value(literal.into())
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>, target: Option<Expr>) -> Expr {
        Expr::Function {
            name: name.into(),
            args,
            target: target.map(Box::new),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        Expr::Binary(Box::new(left), op, Box::new(right))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary(op, Box::new(operand))
    }

    /// Precedence of this node as an operand; leaves never need grouping.
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(_, op, _) => op.precedence(),
            Expr::Unary(op, _) => op.precedence(),
            Expr::Reference(_) | Expr::Value(_) | Expr::Function { .. } => 0,
        }
    }

    /// True for operator nodes, which the unary renderers must group.
    pub fn is_operator(&self) -> bool {
        matches!(self, Expr::Binary(..) | Expr::Unary(..))
    }
}

// These From implementations let raw operands slot into builder positions.
impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Value(literal)
    }
}
impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Value(Literal::from(s))
    }
}
impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Value(Literal::from(s))
    }
}
impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Value(Literal::from(b))
    }
}
impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Expr::Value(Literal::from(n))
    }
}
impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::Value(Literal::from(n))
    }
}
impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::Value(Literal::from(n))
    }
}
