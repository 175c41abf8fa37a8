//! Type names referenced by definition headers.

use std::collections::HashSet;

lazy_static::lazy_static! {
    /// Built-in scalar and container names that never map to a project type.
    static ref BUILTIN_TYPES: HashSet<&'static str> = [
        // scalars
        "int", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
        "usize", "f32", "f64", "float", "double", "long", "short", "byte", "char", "bool",
        "boolean", "str", "string", "void", "unit", "rune", "uint", "int8", "int16", "int32",
        "int64", "uint8", "uint16", "uint32", "uint64", "float32", "float64", "complex64",
        "complex128", "uintptr", "error", "any", "object", "number", "bigint", "symbol",
        "undefined", "null", "never", "unknown", "none", "bytes", "list", "dict", "set",
        "tuple", "frozenset", "mixed", "self", "auto", "signed", "unsigned", "const", "mut",
        "dyn", "impl", "var", "val", "func", "fn", "interface", "struct", "map", "chan",
        "static", "final", "public", "private", "protected", "internal", "async", "def",
        "function", "return", "true", "false", "nil",
        // capitalized built-ins and wrappers
        "String", "Integer", "Int", "Long", "Short", "Double", "Float", "Boolean", "Bool",
        "Character", "Char", "Byte", "Object", "Void", "Unit", "Any", "Nothing", "Number",
        "Self", "None", "Option", "Optional", "Result", "Vec", "Box", "Rc", "Arc", "RefCell",
        "Cell", "Mutex", "RwLock", "HashMap", "HashSet", "BTreeMap", "BTreeSet", "VecDeque",
        "List", "ArrayList", "LinkedList", "Map", "Set", "Dict", "Tuple", "Union", "Callable",
        "Iterable", "Iterator", "Sequence", "Mapping", "Array", "Promise", "Partial",
        "Readonly", "Date", "Error", "Exception", "Func", "Action",
        "IEnumerable", "IList", "IDictionary", "Dictionary", "Collection", "Vector",
        "MutableList", "MutableMap", "Pair", "Triple", "URL", "UUID",
    ]
    .into_iter()
    .collect();
}

/// Whether `name` is a built-in or wrapper type.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPES.contains(name)
}

/// Project type names mentioned in a type expression.
///
/// Wrappers are unwrapped (`Option<Record>` yields `Record`) and qualified
/// paths keep their last segment.
pub fn type_names(type_expr: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in identifiers(type_expr) {
        if is_builtin(token) || names.iter().any(|n| n == token) {
            continue;
        }
        names.push(token.to_string());
    }
    names
}

/// Capitalized, non-built-in identifiers of a definition header, excluding
/// the definition's own name.
pub fn signature_types(header: &str, name: &str) -> Vec<String> {
    let own = name.rsplit("::").next().unwrap_or(name);
    let mut names: Vec<String> = Vec::new();
    for token in identifiers(strip_literals(header).as_str()) {
        let capitalized = token.chars().next().map(char::is_uppercase).unwrap_or(false);
        if !capitalized || token == own || is_builtin(token) || names.iter().any(|n| n == token) {
            continue;
        }
        names.push(token.to_string());
    }
    names
}

/// Identifier tokens, with qualified paths reduced to their last segment.
fn identifiers(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == ':'))
        .filter_map(|segment| {
            segment
                .split(|c: char| c == '.' || c == ':')
                .filter(|s| !s.is_empty())
                .last()
        })
        .filter(|t| t.chars().next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false))
}

/// Drop quoted string contents so default values do not leak type names.
fn strip_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                    out.push(' ');
                }
            }
            None if c == '"' || c == '\'' || c == '`' => quote = Some(c),
            None => out.push(c),
        }
    }
    out
}
