use crate::error::Error;

/// Wire-format generation. `V3` covers the first three generations, which
/// share one function table; `V4` renamed and reordered a handful of calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ODataVersion {
    V3,
    V4,
}

/// Where the call's receiver lands relative to its explicit arguments in
/// the rendered concrete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentOrder {
    TargetFirst,
    TargetLast,
    TargetOnly,
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionMapping {
    pub name: &'static str,
    pub order: ArgumentOrder,
}

const fn mapping(name: &'static str, order: ArgumentOrder) -> FunctionMapping {
    FunctionMapping { name, order }
}

/// Exact `(name, arity)` lookup; no overload resolution beyond the arity.
/// Abstract names are matched case-insensitively, the way both front ends
/// hand them over.
pub fn resolve(version: ODataVersion, name: &str, arity: usize) -> Result<FunctionMapping, Error> {
    let key = name.to_ascii_lowercase();
    let found = match version {
        ODataVersion::V3 => resolve_v3(&key, arity),
        ODataVersion::V4 => resolve_v4(&key, arity),
    };
    found.ok_or_else(|| Error::UnsupportedFunction {
        name: name.to_string(),
        arity,
    })
}

// Only the entries that changed in V4 live here; everything else falls
// through to the shared pre-V4 table.
fn resolve_v4(name: &str, arity: usize) -> Option<FunctionMapping> {
    use ArgumentOrder::*;
    match (name, arity) {
        ("contains" | "substringof", 1) => Some(mapping("contains", TargetFirst)),
        _ => resolve_v3(name, arity),
    }
}

fn resolve_v3(name: &str, arity: usize) -> Option<FunctionMapping> {
    use ArgumentOrder::*;
    match (name, arity) {
        // String containment keeps the pre-V4 name and the needle-first
        // argument order: substringof('ai',ProductName).
        ("contains" | "substringof", 1) => Some(mapping("substringof", TargetLast)),
        ("startswith", 1) => Some(mapping("startswith", TargetFirst)),
        ("endswith", 1) => Some(mapping("endswith", TargetFirst)),
        ("indexof", 1) => Some(mapping("indexof", TargetFirst)),
        ("replace", 2) => Some(mapping("replace", TargetFirst)),
        ("substring", 1 | 2) => Some(mapping("substring", TargetFirst)),
        ("concat", 1) => Some(mapping("concat", TargetFirst)),

        ("length", 0) => Some(mapping("length", TargetOnly)),
        ("tolower", 0) => Some(mapping("tolower", TargetOnly)),
        ("toupper", 0) => Some(mapping("toupper", TargetOnly)),
        ("trim", 0) => Some(mapping("trim", TargetOnly)),

        ("year", 0) => Some(mapping("year", TargetOnly)),
        ("month", 0) => Some(mapping("month", TargetOnly)),
        ("day", 0) => Some(mapping("day", TargetOnly)),
        ("hour", 0) => Some(mapping("hour", TargetOnly)),
        ("minute", 0) => Some(mapping("minute", TargetOnly)),
        ("second", 0) => Some(mapping("second", TargetOnly)),

        ("round", 0) => Some(mapping("round", TargetOnly)),
        ("floor", 0) => Some(mapping("floor", TargetOnly)),
        ("ceiling", 0) => Some(mapping("ceiling", TargetOnly)),

        // Type tests take the tested value and the type name as plain
        // arguments, never a receiver.
        ("isof", 1 | 2) => Some(mapping("isof", NoTarget)),
        ("cast", 1 | 2) => Some(mapping("cast", NoTarget)),

        _ => None,
    }
}

/// Recognizes the zero-argument abstract functions that may appear as
/// reference-path segments or intercepted member names, returning the
/// canonical abstract name. Version-agnostic: concrete renaming happens in
/// `resolve`.
pub fn zero_argument_function(name: &str) -> Option<&'static str> {
    let key = name.to_ascii_lowercase();
    match key.as_str() {
        "length" => Some("length"),
        "tolower" => Some("tolower"),
        "toupper" => Some("toupper"),
        "trim" => Some("trim"),
        "year" => Some("year"),
        "month" => Some("month"),
        "day" => Some("day"),
        "hour" => Some("hour"),
        "minute" => Some("minute"),
        "second" => Some("second"),
        "round" => Some("round"),
        "floor" => Some("floor"),
        "ceiling" => Some("ceiling"),
        _ => None,
    }
}
