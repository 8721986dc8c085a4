//! Static front end: translates a typed host expression tree into the
//! unified AST. Dispatch is purely structural, by node shape; anything
//! without a translation rule fails with `UnsupportedExpression`.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::Error;
use crate::literal::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBinaryOp {
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

impl From<SourceBinaryOp> for BinaryOp {
    fn from(op: SourceBinaryOp) -> Self {
        match op {
            SourceBinaryOp::And => BinaryOp::And,
            SourceBinaryOp::Or => BinaryOp::Or,
            SourceBinaryOp::Eq => BinaryOp::Eq,
            SourceBinaryOp::Ne => BinaryOp::Ne,
            SourceBinaryOp::Gt => BinaryOp::Gt,
            SourceBinaryOp::Ge => BinaryOp::Ge,
            SourceBinaryOp::Lt => BinaryOp::Lt,
            SourceBinaryOp::Le => BinaryOp::Le,
            SourceBinaryOp::Add => BinaryOp::Add,
            SourceBinaryOp::Sub => BinaryOp::Sub,
            SourceBinaryOp::Mul => BinaryOp::Mul,
            SourceBinaryOp::Div => BinaryOp::Div,
            SourceBinaryOp::Mod => BinaryOp::Mod,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceUnaryOp {
    Not,
    Neg,
}

/// Conversion marker attached by the host compiler. Enum conversions carry
/// the declared enumeration type so comparisons stay symmetric; primitive
/// widenings are transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Enum(String),
    Primitive,
}

/// The typed input tree, mirroring the host language's expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceExpr {
    /// The query lambda's parameter; the root of every reference chain.
    Parameter,
    Constant(Literal),
    /// An outer-scope value captured by name, resolved through the
    /// caller-supplied [`ConstantResolver`].
    Captured(String),
    Member {
        target: Option<Box<SourceExpr>>,
        name: String,
    },
    Call {
        target: Option<Box<SourceExpr>>,
        name: String,
        args: Vec<SourceExpr>,
    },
    Binary(Box<SourceExpr>, SourceBinaryOp, Box<SourceExpr>),
    Unary(SourceUnaryOp, Box<SourceExpr>),
    Convert {
        operand: Box<SourceExpr>,
        conversion: Conversion,
    },
    TypeIs {
        operand: Box<SourceExpr>,
        type_name: String,
    },
    TypeAs {
        operand: Box<SourceExpr>,
        type_name: String,
    },
    New {
        type_name: String,
        args: Vec<SourceExpr>,
    },
}

impl SourceExpr {
    pub fn member(target: SourceExpr, name: impl Into<String>) -> SourceExpr {
        SourceExpr::Member {
            target: Some(Box::new(target)),
            name: name.into(),
        }
    }

    pub fn call(target: SourceExpr, name: impl Into<String>, args: Vec<SourceExpr>) -> SourceExpr {
        SourceExpr::Call {
            target: Some(Box::new(target)),
            name: name.into(),
            args,
        }
    }

    pub fn free_call(name: impl Into<String>, args: Vec<SourceExpr>) -> SourceExpr {
        SourceExpr::Call {
            target: None,
            name: name.into(),
            args,
        }
    }

    pub fn constant(literal: impl Into<Literal>) -> SourceExpr {
        SourceExpr::Constant(literal.into())
    }

    pub fn binary(left: SourceExpr, op: SourceBinaryOp, right: SourceExpr) -> SourceExpr {
        SourceExpr::Binary(Box::new(left), op, Box::new(right))
    }

    pub fn unary(op: SourceUnaryOp, operand: SourceExpr) -> SourceExpr {
        SourceExpr::Unary(op, Box::new(operand))
    }

    /// Syntactic kind, used in `UnsupportedExpression` reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceExpr::Parameter => "parameter",
            SourceExpr::Constant(_) => "constant",
            SourceExpr::Captured(_) => "captured",
            SourceExpr::Member { .. } => "member access",
            SourceExpr::Call { .. } => "call",
            SourceExpr::Binary(..) => "binary operator",
            SourceExpr::Unary(..) => "unary operator",
            SourceExpr::Convert { .. } => "conversion",
            SourceExpr::TypeIs { .. } => "type test",
            SourceExpr::TypeAs { .. } => "type cast",
            SourceExpr::New { .. } => "object construction",
        }
    }
}

/// Eager evaluation of captured values, constant members, and constructors.
/// The front end walks member chains rooted at constants through this
/// capability instead of reflecting over the object graph itself.
pub trait ConstantResolver {
    /// Resolve a member chain rooted at a captured outer-scope value.
    fn resolve(&self, root: &str, path: &[String]) -> Result<Literal, Error>;

    /// Evaluate one member against an already-resolved constant.
    fn member(&self, value: &Literal, name: &str) -> Result<Literal, Error> {
        let _ = value;
        Err(Error::Other(format!("no member {name} on constant value")))
    }

    /// Evaluate a method call against an already-resolved constant.
    fn invoke(&self, value: &Literal, name: &str, args: &[Literal]) -> Result<Literal, Error> {
        let _ = (value, args);
        Err(Error::Other(format!("no method {name} on constant value")))
    }

    /// Invoke a constructor eagerly (anonymous projection shapes).
    fn construct(&self, type_name: &str, args: &[Literal]) -> Result<Literal, Error> {
        let _ = args;
        Err(Error::Other(format!("no constructor for {type_name}")))
    }
}

/// Resolver for expressions that capture nothing from the enclosing scope.
#[derive(Debug, Clone, Copy)]
pub struct NoCaptures;

impl ConstantResolver for NoCaptures {
    fn resolve(&self, root: &str, _path: &[String]) -> Result<Literal, Error> {
        Err(Error::Other(format!("cannot resolve captured value {root}")))
    }
}

// Framework-level numeric/string conversions are transparent: their single
// operand is parsed directly rather than wrapped in a call node.
fn is_transparent_conversion(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "tostring"
            | "toboolean"
            | "tobyte"
            | "toint16"
            | "toint32"
            | "toint64"
            | "tosingle"
            | "todouble"
            | "todecimal"
    )
}

/// Translate a typed source tree into one unified node.
pub fn parse(source: &SourceExpr, resolver: &dyn ConstantResolver) -> Result<Expr, Error> {
    match source {
        SourceExpr::Constant(lit) => Ok(Expr::Value(lit.clone())),
        SourceExpr::Captured(root) => resolver.resolve(root, &[]).map(Expr::Value),
        SourceExpr::Member { target, name } => parse_member(target.as_deref(), name, resolver),
        SourceExpr::Call { target, name, args } => {
            parse_call(target.as_deref(), name, args, resolver)
        }
        SourceExpr::Binary(l, op, r) => parse_binary(l, *op, r, resolver),
        SourceExpr::Unary(op, operand) => {
            let operand = parse(operand, resolver)?;
            let op = match op {
                SourceUnaryOp::Not => UnaryOp::Not,
                SourceUnaryOp::Neg => UnaryOp::Neg,
            };
            Ok(Expr::unary(op, operand))
        }
        SourceExpr::Convert {
            operand,
            conversion,
        } => parse_convert(operand, conversion, resolver),
        SourceExpr::TypeIs { operand, type_name } => {
            let value = parse(operand, resolver)?;
            Ok(Expr::function(
                "isof",
                vec![value, Expr::Value(Literal::String(type_name.clone()))],
                None,
            ))
        }
        SourceExpr::TypeAs { operand, type_name } => {
            let value = parse(operand, resolver)?;
            Ok(Expr::function(
                "cast",
                vec![value, Expr::Value(Literal::String(type_name.clone()))],
                None,
            ))
        }
        SourceExpr::New { type_name, args } => {
            let literals = literal_args(args, resolver, "object construction")?;
            resolver.construct(type_name, &literals).map(Expr::Value)
        }
        SourceExpr::Parameter => Err(Error::UnsupportedExpression(source.kind().to_string())),
    }
}

// Collapses a member chain rooted at the lambda parameter into a dotted
// path; conversion markers inside the chain are skipped.
fn reference_path(source: &SourceExpr) -> Option<String> {
    match source {
        SourceExpr::Parameter => Some(String::new()),
        SourceExpr::Member {
            target: Some(target),
            name,
        } => {
            let prefix = reference_path(target)?;
            if prefix.is_empty() {
                Some(name.clone())
            } else {
                Some(format!("{prefix}.{name}"))
            }
        }
        SourceExpr::Convert { operand, .. } => reference_path(operand),
        _ => None,
    }
}

// Collapses a member chain rooted at a captured value into its root name
// and member path, for one-shot resolution.
fn captured_chain(source: &SourceExpr) -> Option<(String, Vec<String>)> {
    match source {
        SourceExpr::Captured(root) => Some((root.clone(), Vec::new())),
        SourceExpr::Member {
            target: Some(target),
            name,
        } => {
            let (root, mut path) = captured_chain(target)?;
            path.push(name.clone());
            Some((root, path))
        }
        SourceExpr::Convert { operand, .. } => captured_chain(operand),
        _ => None,
    }
}

fn parse_member(
    target: Option<&SourceExpr>,
    name: &str,
    resolver: &dyn ConstantResolver,
) -> Result<Expr, Error> {
    let Some(target) = target else {
        // Static field or property: evaluate eagerly.
        return resolver.resolve(name, &[]).map(Expr::Value);
    };

    let whole = SourceExpr::member(target.clone(), name);
    if let Some(path) = reference_path(&whole) {
        return Ok(Expr::Reference(path));
    }
    if let Some((root, path)) = captured_chain(&whole) {
        return resolver.resolve(&root, &path).map(Expr::Value);
    }

    match parse(target, resolver)? {
        // Constant receiver: evaluate the member against it eagerly.
        Expr::Value(lit) => resolver.member(&lit, name).map(Expr::Value),
        Expr::Reference(path) => Ok(Expr::Reference(format!("{path}.{name}"))),
        inner => {
            // Member access on a computed node only makes sense for a
            // zero-argument abstract function, e.g. `.Length` on a call.
            match crate::functions::zero_argument_function(name) {
                Some(func) => Ok(Expr::function(func, vec![], Some(inner))),
                None => Err(Error::UnsupportedExpression(format!(
                    "member {name} on computed expression"
                ))),
            }
        }
    }
}

// Strips no-op display conversions off a call receiver, e.g.
// `x.Name.ToString().Contains(...)` resolves against `x.Name`.
fn unwrap_display_conversion(receiver: &SourceExpr) -> &SourceExpr {
    let mut current = receiver;
    loop {
        match current {
            SourceExpr::Call {
                target: Some(inner),
                name,
                args,
            } if is_transparent_conversion(name) && args.is_empty() => {
                current = inner.as_ref();
            }
            _ => return current,
        }
    }
}

fn parse_call(
    target: Option<&SourceExpr>,
    name: &str,
    args: &[SourceExpr],
    resolver: &dyn ConstantResolver,
) -> Result<Expr, Error> {
    if is_transparent_conversion(name) {
        if let Some(receiver) = target {
            if args.is_empty() {
                return parse(receiver, resolver);
            }
        } else if let [operand] = args {
            return parse(operand, resolver);
        }
    }

    match target {
        None => {
            // Free call: the first argument acts as the target.
            let Some((first, rest)) = args.split_first() else {
                return Err(Error::UnsupportedExpression(
                    "call without receiver or arguments".to_string(),
                ));
            };
            let target = parse(first, resolver)?;
            let args = rest
                .iter()
                .map(|a| parse(a, resolver))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::function(name, args, Some(target)))
        }
        Some(receiver) => {
            let receiver = unwrap_display_conversion(receiver);
            let target = parse(receiver, resolver)?;
            if let Expr::Value(lit) = &target {
                if let Ok(literals) = literal_args(args, resolver, "call") {
                    return resolver.invoke(lit, name, &literals).map(Expr::Value);
                }
            }
            let args = args
                .iter()
                .map(|a| parse(a, resolver))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::function(name, args, Some(target)))
        }
    }
}

fn enum_conversion_type(source: &SourceExpr) -> Option<String> {
    match source {
        SourceExpr::Convert {
            conversion: Conversion::Enum(ty),
            ..
        } => Some(ty.clone()),
        _ => None,
    }
}

fn parse_binary(
    left: &SourceExpr,
    op: SourceBinaryOp,
    right: &SourceExpr,
    resolver: &dyn ConstantResolver,
) -> Result<Expr, Error> {
    // When one side carries an enum conversion, re-parse the other side as
    // if converted to the same enumeration type, so enum comparisons come
    // out symmetric regardless of which side had the explicit cast.
    let (l, r) = match (enum_conversion_type(left), enum_conversion_type(right)) {
        (Some(ty), None) => {
            let wrapped = SourceExpr::Convert {
                operand: Box::new(right.clone()),
                conversion: Conversion::Enum(ty),
            };
            (parse(left, resolver)?, parse(&wrapped, resolver)?)
        }
        (None, Some(ty)) => {
            let wrapped = SourceExpr::Convert {
                operand: Box::new(left.clone()),
                conversion: Conversion::Enum(ty),
            };
            (parse(&wrapped, resolver)?, parse(right, resolver)?)
        }
        _ => (parse(left, resolver)?, parse(right, resolver)?),
    };
    Ok(Expr::binary(l, op.into(), r))
}

fn parse_convert(
    operand: &SourceExpr,
    conversion: &Conversion,
    resolver: &dyn ConstantResolver,
) -> Result<Expr, Error> {
    let inner = parse(operand, resolver)?;
    match conversion {
        // The marker only retypes constants; tree shape is unchanged.
        Conversion::Enum(type_name) => Ok(match inner {
            Expr::Value(lit) => Expr::Value(retype_enum(type_name, lit)),
            other => other,
        }),
        Conversion::Primitive => Ok(inner),
    }
}

fn retype_enum(type_name: &str, literal: Literal) -> Literal {
    let value = match literal {
        Literal::String(s) => s,
        Literal::Integer(n) => n.to_string(),
        Literal::Enum { value, .. } => value,
        other => return other,
    };
    Literal::Enum {
        type_name: type_name.to_string(),
        value,
    }
}

fn literal_args(
    args: &[SourceExpr],
    resolver: &dyn ConstantResolver,
    context: &str,
) -> Result<Vec<Literal>, Error> {
    args.iter()
        .map(|a| match parse(a, resolver)? {
            Expr::Value(lit) => Ok(lit),
            _ => Err(Error::UnsupportedExpression(format!(
                "non-constant argument in eagerly evaluated {context}"
            ))),
        })
        .collect()
}
