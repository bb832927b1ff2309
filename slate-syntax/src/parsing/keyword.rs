//! Keyword and operator catalogs.
//!
//! These lists are textual wire identity: tools and embedders match on the
//! exact spellings.

pub const DECLARATION_KEYWORDS: &[&str] = &["using", "struct", "alias"];

pub const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "return", "yield", "goto", "break", "crash", "delete", "new",
    "as", "var", "this", "sizeof",
];

pub const MODIFIER_KEYWORDS: &[&str] = &["inline", "const", "ref", "temp", "this"];

pub const PROTECTION_KEYWORDS: &[&str] = &["export", "private"];

pub const BUILTIN_TYPE_KEYWORDS: &[&str] = &[
    "any", "void", "int", "float", "char", "byte", "u8", "u16", "u32", "u64", "i8", "i16", "i32",
    "i64", "f32", "f64",
];

pub const OVERLOADABLE_OPERATORS: &[&str] = &[
    "<<", ">>", "+", "-", "*", "/", "%", "&", "|", "^", "<", ">", "<=", ">=", "!=", "==", "&&",
    "||",
];

pub const COMPOUND_ASSIGNMENT_OPERATORS: &[&str] =
    &["+=", "-=", "*=", "/=", "%=", "&=", "|=", "^="];

pub const UNARY_PREFIX_OPERATORS: &[&str] = &["!", "~", "-", "+"];

pub const INCREMENT_DECREMENT_OPERATORS: &[&str] = &["++", "--"];

/// Every word with reserved meaning; none of these may name a variable,
/// function, field or struct.
pub fn is_reserved(word: &str) -> bool {
    DECLARATION_KEYWORDS.contains(&word)
        || STATEMENT_KEYWORDS.contains(&word)
        || MODIFIER_KEYWORDS.contains(&word)
        || PROTECTION_KEYWORDS.contains(&word)
        || BUILTIN_TYPE_KEYWORDS.contains(&word)
}

/// Binding strength of a binary operator; higher binds tighter. Unary
/// prefixes bind tighter than all of these and are handled separately.
pub fn binary_precedence(operator: &str) -> Option<u8> {
    Some(match operator {
        "*" | "/" | "%" => 9,
        "+" | "-" => 8,
        "<<" | ">>" => 7,
        "&" => 6,
        "^" => 5,
        "|" => 4,
        "<" | ">" | "<=" | ">=" | "!=" | "==" => 3,
        "&&" => 2,
        "||" => 1,
        _ => return None,
    })
}
