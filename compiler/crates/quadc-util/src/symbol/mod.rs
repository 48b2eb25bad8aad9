//! String interning for identifier and literal text.
//!
//! [`Symbol`] is a 4-byte handle to an interned string. Comparing two
//! symbols is an index comparison; recovering the text is an `as_str()`
//! call. Keywords and other fixed strings the compiler refers to often are
//! pre-interned at startup so their indices never depend on input order.

mod interner;

pub use interner::StringTable;
use interner::STRING_TABLE;

/// A compact, `Copy` handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    index: u32,
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! known_symbols {
    ($($const_name:ident = $text:literal;)*) => {
        /// Every string pre-interned at startup, in index order.
        pub(crate) const KNOWN_SYMBOLS: &[&str] = &[$($text),*];

        known_symbols!(@consts 0; $($const_name = $text;)*);
    };
    (@consts $idx:expr; $const_name:ident = $text:literal; $($rest:tt)*) => {
        #[doc = concat!("Pre-interned symbol for `", $text, "`.")]
        pub const $const_name: Symbol = Symbol { index: $idx };
        known_symbols!(@consts $idx + 1; $($rest)*);
    };
    (@consts $idx:expr;) => {};
}

known_symbols! {
    KW_CONST = "const";
    KW_INT = "int";
    KW_REAL = "real";
    KW_LOGICAL = "logical";
    KW_STRING = "string";
    KW_ENUM = "enum";
    KW_FUNC = "func";
    KW_RETURN = "return";
    KW_BEGIN = "begin";
    KW_END = "end";
    KW_IF = "if";
    KW_THEN = "then";
    KW_ELSE = "else";
    KW_WHILE = "while";
    KW_DO = "do";
    KW_REPEAT = "repeat";
    KW_UNTIL = "until";
    KW_FOR = "for";
    KW_SWITCH = "switch";
    KW_CASE = "case";
    KW_DEFAULT = "default";
    KW_ENDSWITCH = "endswitch";
    KW_PRINT = "print";
    KW_DUMP = "dump";
    KW_TRUE = "true";
    KW_FALSE = "false";
    ID_MAIN = "main";
}

/// Number of pre-interned indices; user identifiers start past this.
const RESERVED_SYMBOLS_END: u32 = KNOWN_SYMBOLS.len() as u32;

impl Symbol {
    /// Intern a string, returning its handle. Interning the same text twice
    /// returns the same `Symbol`.
    #[inline]
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// Recover the interned text. `O(n)` in the number of distinct strings
    /// seen so far (see [`StringTable::get`]); callers on a hot path should
    /// cache the result rather than re-resolving it in a loop.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.get(*self).unwrap_or("")
    }

    #[inline]
    pub fn eq_str(&self, other: &str) -> bool {
        self.as_str() == other
    }

    /// True for symbols pre-interned at startup (keywords, fixed names).
    #[inline]
    pub fn is_known(&self) -> bool {
        self.index < RESERVED_SYMBOLS_END
    }

    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.index
    }

    /// # Safety-adjacent note
    /// Does not validate that `index` corresponds to an interned string;
    /// only meant for round-tripping an index obtained from `as_u32`.
    #[inline]
    pub fn from_u32_unchecked(index: u32) -> Self {
        Symbol { index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_returns_same_symbol() {
        assert_eq!(Symbol::intern("foo"), Symbol::intern("foo"));
    }

    #[test]
    fn distinct_text_interns_to_distinct_symbols() {
        assert_ne!(Symbol::intern("foo"), Symbol::intern("bar"));
    }

    #[test]
    fn round_trips_through_as_str() {
        let sym = Symbol::intern("some_identifier_37");
        assert_eq!(sym.as_str(), "some_identifier_37");
    }

    #[test]
    fn known_keywords_report_known() {
        assert!(KW_IF.is_known());
        assert!(!Symbol::intern("user_variable").is_known());
    }

    #[test]
    fn empty_string_interns_fine() {
        assert_eq!(Symbol::intern("").as_str(), "");
    }
}
