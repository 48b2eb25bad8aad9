//! The symbol table (§4.3): a stack of scope frames. The original encodes
//! four disjoint identifier shapes behind `is_func`/`is_enum_type`/
//! `is_enum_variant` flags on one struct; here they're a closed `Identifier`
//! enum, with the metadata common to every kind — name, declaring scope and
//! line, usage — lifted to the outer record.

use quadc_util::{FxHashMap, Symbol};

use crate::value::{Type, Value};

#[derive(Clone, Debug)]
pub enum IdentKind {
    Variable { ty: Type, is_initialized: bool, is_const: bool, value: Option<Value> },
    Function { return_type: Type, param_types: Vec<Type> },
    EnumType { variants: Vec<Symbol> },
    EnumVariant { enum_type_name: Symbol },
}

#[derive(Clone, Debug)]
pub struct Identifier {
    pub name: Symbol,
    pub declared_scope: u32,
    pub declared_line: u32,
    pub is_used: bool,
    pub kind: IdentKind,
}

/// The kind a lookup expects. A `Variable` lookup accepts an identifier
/// that is actually `Variable` or `EnumVariant` — anything that isn't a
/// `Function` or `EnumType` (§4.3).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExpectedKind {
    Variable,
    Function,
    EnumType,
}

pub enum LookupError {
    NotFound,
    KindMismatch { found: &'static str },
}

pub struct SymbolTable {
    frames: Vec<FxHashMap<Symbol, Identifier>>,
    pub current_scope: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { frames: vec![FxHashMap::default()], current_scope: 0 }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(FxHashMap::default());
        self.current_scope += 1;
    }

    /// Pops the top frame, returning the identifiers that were never used
    /// so the caller can emit the unused-identifier warning (§4.3) citing
    /// each one's declaration line.
    pub fn leave_scope(&mut self) -> Vec<Identifier> {
        let frame = self.frames.pop().expect("leave_scope without a matching enter_scope");
        self.current_scope -= 1;
        frame.into_values().filter(|id| !id.is_used).collect()
    }

    /// `Err` holds the line of the prior declaration when the name is
    /// already present in the current frame.
    pub fn declare(&mut self, ident: Identifier) -> Result<(), u32> {
        let frame = self.frames.last_mut().expect("at least the global frame always exists");
        if let Some(existing) = frame.get(&ident.name) {
            return Err(existing.declared_line);
        }
        frame.insert(ident.name, ident);
        Ok(())
    }

    pub fn lookup(&self, name: Symbol, expected: ExpectedKind) -> Result<&Identifier, LookupError> {
        for frame in self.frames.iter().rev() {
            if let Some(ident) = frame.get(&name) {
                let kind_name = match &ident.kind {
                    IdentKind::Variable { .. } => "Variable",
                    IdentKind::Function { .. } => "Function",
                    IdentKind::EnumType { .. } => "EnumType",
                    IdentKind::EnumVariant { .. } => "EnumVariant",
                };
                let matches = match expected {
                    ExpectedKind::Variable => {
                        matches!(ident.kind, IdentKind::Variable { .. } | IdentKind::EnumVariant { .. })
                    }
                    ExpectedKind::Function => matches!(ident.kind, IdentKind::Function { .. }),
                    ExpectedKind::EnumType => matches!(ident.kind, IdentKind::EnumType { .. }),
                };
                return if matches {
                    Ok(ident)
                } else {
                    Err(LookupError::KindMismatch { found: kind_name })
                };
            }
        }
        Err(LookupError::NotFound)
    }

    pub fn lookup_mut(&mut self, name: Symbol, expected: ExpectedKind) -> Result<&mut Identifier, LookupError> {
        for frame in self.frames.iter_mut().rev() {
            if frame.contains_key(&name) {
                let ident = frame.get(&name).unwrap();
                let ok = match expected {
                    ExpectedKind::Variable => {
                        matches!(ident.kind, IdentKind::Variable { .. } | IdentKind::EnumVariant { .. })
                    }
                    ExpectedKind::Function => matches!(ident.kind, IdentKind::Function { .. }),
                    ExpectedKind::EnumType => matches!(ident.kind, IdentKind::EnumType { .. }),
                };
                let kind_name = match &ident.kind {
                    IdentKind::Variable { .. } => "Variable",
                    IdentKind::Function { .. } => "Function",
                    IdentKind::EnumType { .. } => "EnumType",
                    IdentKind::EnumVariant { .. } => "EnumVariant",
                };
                return if ok {
                    Ok(frame.get_mut(&name).unwrap())
                } else {
                    Err(LookupError::KindMismatch { found: kind_name })
                };
            }
        }
        Err(LookupError::NotFound)
    }

    /// The scope an identifier was declared in, used to render `v_<name><scope>`
    /// / `f_<name><scope>` operands. `None` if undeclared.
    pub fn scope_of(&self, name: Symbol) -> Option<u32> {
        for frame in self.frames.iter().rev() {
            if let Some(ident) = frame.get(&name) {
                return Some(ident.declared_scope);
            }
        }
        None
    }

    /// All identifiers across every live frame, outermost first — used by
    /// `log_symtable`, which dumps the whole stack rather than just the
    /// current scope.
    pub fn all_live_identifiers(&self) -> Vec<&Identifier> {
        self.frames.iter().flat_map(|frame| frame.values()).collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
