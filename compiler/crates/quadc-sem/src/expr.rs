//! The expression record (§3/§4.2). Transient: produced during reduction
//! of a grammar production, consumed by the next semantic action.

use quadc_util::Symbol;

use crate::value::{Type, Value};

#[derive(Clone, Debug)]
pub struct Expr {
    pub ty: Type,
    pub is_const: bool,
    pub value: Option<Value>,
    pub enum_type_name: Option<Symbol>,
}

impl Expr {
    pub fn new(ty: Type, is_const: bool, value: Option<Value>) -> Self {
        Expr { ty, is_const, value, enum_type_name: None }
    }

    pub fn non_const(ty: Type) -> Self {
        Expr { ty, is_const: false, value: None, enum_type_name: None }
    }

    pub fn is_num(&self) -> bool {
        self.ty.is_numeric()
    }
}
