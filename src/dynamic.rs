//! Dynamic front end: a duck-typed builder that intercepts member access
//! and operator application, producing exactly the tree shapes the typed
//! front end produces. Operator interception is spelled as explicit
//! methods; raw primitives convert into `Value` leaves implicitly.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::functions;

/// The proxy value. Start from [`DynamicExpr::root`] and chain member and
/// operator calls; the finished node comes out via [`DynamicExpr::into_expr`].
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicExpr {
    node: Expr,
}

impl DynamicExpr {
    /// The query root, standing in for the entity being filtered.
    pub fn root() -> DynamicExpr {
        DynamicExpr {
            node: Expr::Reference(String::new()),
        }
    }

    /// Intercepted member access. A plain name extends the dotted reference
    /// path; a zero-argument abstract function name (a date-part accessor,
    /// `Length`, ...) wraps the current node as that function's target. Any
    /// other name on a computed node becomes a zero-argument call and fails
    /// at format time as `UnsupportedFunction`.
    pub fn member(self, name: &str) -> DynamicExpr {
        if let Some(func) = functions::zero_argument_function(name) {
            return DynamicExpr {
                node: Expr::function(func, vec![], Some(self.node)),
            };
        }
        let node = match self.node {
            Expr::Reference(path) if path.is_empty() => Expr::Reference(name.to_string()),
            Expr::Reference(path) => Expr::Reference(format!("{path}.{name}")),
            other => Expr::function(name, vec![], Some(other)),
        };
        DynamicExpr { node }
    }

    /// Intercepted method call with arguments.
    pub fn call(self, name: &str, args: Vec<DynamicExpr>) -> DynamicExpr {
        let args = args.into_iter().map(|a| a.node).collect();
        DynamicExpr {
            node: Expr::function(name, args, Some(self.node)),
        }
    }

    pub fn into_expr(self) -> Expr {
        self.node
    }

    fn binary(self, op: BinaryOp, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        DynamicExpr {
            node: Expr::binary(self.node, op, rhs.into().node),
        }
    }

    pub fn eq(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Eq, rhs)
    }
    pub fn ne(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Ne, rhs)
    }
    pub fn gt(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Gt, rhs)
    }
    pub fn ge(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Ge, rhs)
    }
    pub fn lt(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Lt, rhs)
    }
    pub fn le(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Le, rhs)
    }
    pub fn and(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::And, rhs)
    }
    pub fn or(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Or, rhs)
    }
    pub fn add(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Add, rhs)
    }
    pub fn sub(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Sub, rhs)
    }
    pub fn mul(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Mul, rhs)
    }
    pub fn div(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Div, rhs)
    }
    pub fn modulo(self, rhs: impl Into<DynamicExpr>) -> DynamicExpr {
        self.binary(BinaryOp::Mod, rhs)
    }

    pub fn not(self) -> DynamicExpr {
        DynamicExpr {
            node: Expr::unary(UnaryOp::Not, self.node),
        }
    }
    pub fn neg(self) -> DynamicExpr {
        DynamicExpr {
            node: Expr::unary(UnaryOp::Neg, self.node),
        }
    }
}

impl From<DynamicExpr> for Expr {
    fn from(proxy: DynamicExpr) -> Expr {
        proxy.node
    }
}

impl From<Expr> for DynamicExpr {
    fn from(node: Expr) -> DynamicExpr {
        DynamicExpr { node }
    }
}

macro_rules! from_primitive {
    ($($ty:ty),*) => {
        $(impl From<$ty> for DynamicExpr {
            fn from(value: $ty) -> DynamicExpr {
                DynamicExpr { node: Expr::from(value) }
            }
        })*
    };
}
from_primitive!(&str, String, bool, i32, i64, f64);
