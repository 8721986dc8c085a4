/// Query-construction errors. All of these are raised synchronously and
/// abort the in-flight compile or format call; there is no partial-result
/// recovery or default substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A front-end node shape with no translation rule; carries the node's
    /// syntactic kind.
    UnsupportedExpression(String),
    /// A `(name, arity)` pair absent from the function mapping registry.
    UnsupportedFunction { name: String, arity: usize },
    /// A path segment that is neither a structural property, a navigation
    /// property, nor a zero-argument function in the searched collection.
    UnresolvableReference { segment: String, collection: String },
    /// A call whose calling convention cannot take the supplied arguments.
    UnresolvableFunctionArguments { name: String, arity: usize },
    /// A constant-resolver or constructor failure reported by the caller.
    Other(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedExpression(kind) => {
                write!(f, "Unsupported expression node: {kind}")
            }
            Self::UnsupportedFunction { name, arity } => write!(
                f,
                "Function {name} called with {arity} arguments is not supported"
            ),
            Self::UnresolvableReference {
                segment,
                collection,
            } => write!(
                f,
                "Unresolvable reference segment {segment} in collection {collection}"
            ),
            Self::UnresolvableFunctionArguments { name, arity } => write!(
                f,
                "Function {name} cannot accept {arity} arguments under its calling convention"
            ),
            Self::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
