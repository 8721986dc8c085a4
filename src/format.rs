//! Renders a unified tree into a precedence-correct filter string,
//! resolving symbolic references against entity metadata and mapping
//! abstract function calls onto the protocol generation's concrete names.

use crate::ast::{Expr, UnaryOp};
use crate::error::Error;
use crate::functions::{self, ArgumentOrder, ODataVersion};
use crate::literal::LiteralFormatter;

/// Answers the formatter's metadata questions. Fuzzy and pluralized name
/// matching happens entirely behind this trait; answers are treated as
/// exact. Implementations must be safe for concurrent read access.
pub trait MetadataLookup {
    fn is_structural_property(&self, collection: &str, name: &str) -> bool;
    fn is_navigation_property(&self, collection: &str, name: &str) -> bool;
    fn exact_property_name(&self, collection: &str, name: &str) -> Option<String>;
    fn exact_navigation_name(&self, collection: &str, name: &str) -> Option<String>;
    fn partner_collection(&self, collection: &str, navigation: &str) -> Option<String>;
}

/// Everything one formatting call reads: the metadata capability, the
/// literal formatter, the protocol generation, the entity collection the
/// walk starts from, an optional lambda-scope qualifier, and the literal
/// escaping flag (set for filter clauses, clear for general query
/// options). The formatter never mutates any of it.
pub struct FormatContext<'a> {
    pub metadata: &'a dyn MetadataLookup,
    pub literals: &'a dyn LiteralFormatter,
    pub version: ODataVersion,
    pub collection: Option<String>,
    pub scope: Option<String>,
    pub escape_literals: bool,
}

impl<'a> FormatContext<'a> {
    pub fn new(
        metadata: &'a dyn MetadataLookup,
        literals: &'a dyn LiteralFormatter,
        version: ODataVersion,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            literals,
            version,
            collection: Some(collection.into()),
            scope: None,
            escape_literals: true,
        }
    }

    /// A context for nested lambda bodies with no collection of their own;
    /// unresolved final segments render as literal paths.
    pub fn nameless(
        metadata: &'a dyn MetadataLookup,
        literals: &'a dyn LiteralFormatter,
        version: ODataVersion,
    ) -> Self {
        Self {
            metadata,
            literals,
            version,
            collection: None,
            scope: None,
            escape_literals: true,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Render one tree. Pure function of `(node, context)`: the same tree may
/// be formatted concurrently against different contexts.
pub fn format(expr: &Expr, cx: &FormatContext) -> Result<String, Error> {
    match expr {
        Expr::Value(lit) => Ok(cx.literals.format_literal(lit, cx.escape_literals)),
        Expr::Reference(path) => format_reference(path, cx),
        Expr::Function { name, args, target } => {
            format_function(name, args, target.as_deref(), cx)
        }
        Expr::Unary(op, operand) => {
            let inner = format(operand, cx)?;
            Ok(match op {
                UnaryOp::Not if operand.is_operator() => format!("not({inner})"),
                UnaryOp::Not => format!("not {inner}"),
                UnaryOp::Neg if operand.is_operator() => format!("-({inner})"),
                UnaryOp::Neg => format!("-{inner}"),
            })
        }
        Expr::Binary(left, op, right) => {
            let l = format_operand(left, op.precedence(), cx)?;
            let r = format_operand(right, op.precedence(), cx)?;
            Ok(format!("{l} {} {r}", op.keyword()))
        }
    }
}

fn format_operand(operand: &Expr, parent: u8, cx: &FormatContext) -> Result<String, Error> {
    let rendered = format(operand, cx)?;
    if operand.precedence() > parent {
        Ok(format!("({rendered})"))
    } else {
        Ok(rendered)
    }
}

// Walks a dotted symbolic path against the metadata, re-rooting at each
// navigation step and wrapping the built prefix whenever a segment names a
// zero-argument function. Resolved segments join with '/'.
fn format_reference(path: &str, cx: &FormatContext) -> Result<String, Error> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let mut out: Vec<String> = Vec::new();
    if let Some(scope) = &cx.scope {
        out.push(scope.clone());
    }
    let mut collection = cx.collection.clone();

    for (i, segment) in segments.iter().enumerate() {
        if let Some(current) = &collection {
            if cx.metadata.is_structural_property(current, segment) {
                let exact = cx
                    .metadata
                    .exact_property_name(current, segment)
                    .unwrap_or_else(|| segment.to_string());
                out.push(exact);
                // Structural properties are terminal.
                collection = None;
                continue;
            }
            if cx.metadata.is_navigation_property(current, segment) {
                let exact = cx
                    .metadata
                    .exact_navigation_name(current, segment)
                    .unwrap_or_else(|| segment.to_string());
                let partner = cx
                    .metadata
                    .partner_collection(current, &exact)
                    .ok_or_else(|| Error::UnresolvableReference {
                        segment: segment.to_string(),
                        collection: current.clone(),
                    })?;
                out.push(exact);
                collection = Some(partner);
                continue;
            }
        }
        if let Some(func) = functions::zero_argument_function(segment) {
            let mapping = functions::resolve(cx.version, func, 0)?;
            let target = out.join("/");
            out = vec![format!("{}({target})", mapping.name)];
            continue;
        }
        if collection.is_none() && i + 1 == segments.len() {
            // Nested nameless scope: the unresolved tail is a literal path.
            out.push(segment.to_string());
            continue;
        }
        return Err(Error::UnresolvableReference {
            segment: segment.to_string(),
            collection: collection.unwrap_or_default(),
        });
    }
    Ok(out.join("/"))
}

fn format_function(
    name: &str,
    args: &[Expr],
    target: Option<&Expr>,
    cx: &FormatContext,
) -> Result<String, Error> {
    let mapping = functions::resolve(cx.version, name, args.len())?;
    let target = target.map(|t| format(t, cx)).transpose()?;
    let mut parts = args
        .iter()
        .map(|a| format(a, cx))
        .collect::<Result<Vec<_>, _>>()?;

    match mapping.order {
        ArgumentOrder::TargetFirst => {
            if let Some(t) = target {
                parts.insert(0, t);
            }
        }
        ArgumentOrder::TargetLast => {
            if let Some(t) = target {
                parts.push(t);
            }
        }
        ArgumentOrder::TargetOnly => {
            if !parts.is_empty() || target.is_none() {
                return Err(Error::UnresolvableFunctionArguments {
                    name: name.to_string(),
                    arity: args.len(),
                });
            }
            parts = vec![target.unwrap_or_default()];
        }
        ArgumentOrder::NoTarget => {
            if let Some(t) = target {
                parts.insert(0, t);
            }
        }
    }
    Ok(format!("{}({})", mapping.name, parts.join(",")))
}
