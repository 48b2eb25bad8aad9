//! Semantic analysis and quad emission (§3/§4): symbol table, expression
//! type-checking with Int/Real promotion, and the control-flow quad
//! emitter, glued together behind a single [`compiler::Compiler`] that a
//! parser drives one grammar production at a time.

pub mod compiler;
pub mod diag;
pub mod emit;
pub mod expr;
pub mod scope;
pub mod value;

pub use compiler::Compiler;
pub use diag::{Diagnostics, SemanticError};
pub use expr::Expr;
pub use scope::{ExpectedKind, IdentKind, Identifier, LookupError, SymbolTable};
pub use value::{Type, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use quadc_lex::Op;
    use quadc_util::Symbol;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn const_declaration_folds_and_records_value() {
        let mut c = Compiler::new();
        let lit = c.literal(Value::Integer(7));
        c.declare_const(sym("k"), Type::Integer, lit).unwrap();
        let read = c.read_var(sym("k")).unwrap();
        assert_eq!(read.value, Some(Value::Integer(7)));
        assert!(read.is_const);
    }

    #[test]
    fn mixed_int_real_addition_promotes_and_folds() {
        let mut c = Compiler::new();
        let l = c.literal(Value::Integer(2));
        let r = c.literal(Value::Real(1.5));
        let sum = c.oper(l, Op::Plus, r).unwrap();
        assert_eq!(sum.ty, Type::Real);
        assert_eq!(sum.value, Some(Value::Real(3.5)));
    }

    #[test]
    fn assigning_int_literal_to_real_variable_promotes_silently() {
        let mut c = Compiler::new();
        c.declare_var(sym("x"), Type::Real).unwrap();
        let lit = c.literal(Value::Integer(3));
        assert!(c.assign(sym("x"), lit).is_ok());
    }

    #[test]
    fn comparing_different_enum_types_is_fatal() {
        let mut c = Compiler::new();
        c.declare_enum_type(sym("Color"), vec![sym("Red"), sym("Green")]).unwrap();
        c.declare_enum_type(sym("Size"), vec![sym("Small"), sym("Large")]).unwrap();
        let a = c.enum_member_expr(sym("Color"), sym("Red")).unwrap();
        let b = c.enum_member_expr(sym("Size"), sym("Small")).unwrap();
        let err = c.oper(a, Op::Eq, b).unwrap_err();
        assert!(matches!(err, SemanticError::IncompatibleEnumComparison { .. }));
    }

    #[test]
    fn calling_function_with_wrong_arity_is_fatal() {
        let mut c = Compiler::new();
        c.begin_function(sym("f"), Type::Integer, vec![(sym("a"), Type::Integer)]).unwrap();
        let lit = c.literal(Value::Integer(0));
        c.return_stmt(lit).unwrap();
        c.end_function(sym("f"));

        let err = c.call_function(sym("f"), vec![]).unwrap_err();
        assert!(matches!(err, SemanticError::ArityMismatch { expected: 1, found: 0, .. }));
    }

    #[test]
    fn reading_uninitialized_variable_warns_but_succeeds() {
        let mut c = Compiler::new();
        c.declare_var(sym("y"), Type::Integer).unwrap();
        let before = c.diagnostics.warnings.len();
        c.read_var(sym("y")).unwrap();
        assert_eq!(c.diagnostics.warnings.len(), before + 1);
    }

    #[test]
    fn constant_if_condition_emits_a_warning() {
        let mut c = Compiler::new();
        let cond = c.literal(Value::Logical(true));
        let before = c.diagnostics.warnings.len();
        let end = c.if_begin(&cond).unwrap();
        assert_eq!(c.diagnostics.warnings.len(), before + 1);
        c.if_end(&end);
    }

    #[test]
    fn redeclaring_in_same_scope_is_fatal() {
        let mut c = Compiler::new();
        c.declare_var(sym("z"), Type::Integer).unwrap();
        let err = c.declare_var(sym("z"), Type::Real).unwrap_err();
        assert!(matches!(err, SemanticError::AlreadyDeclared { .. }));
    }

    #[test]
    fn leaving_scope_warns_about_unused_locals() {
        let mut c = Compiler::new();
        c.enter_scope();
        c.declare_var(sym("unused"), Type::Integer).unwrap();
        let before = c.diagnostics.warnings.len();
        c.leave_scope();
        assert_eq!(c.diagnostics.warnings.len(), before + 1);
    }

    #[test]
    fn assigning_to_const_is_fatal() {
        let mut c = Compiler::new();
        let lit = c.literal(Value::Integer(1));
        c.declare_const(sym("k"), Type::Integer, lit).unwrap();
        let v = c.literal(Value::Integer(2));
        let err = c.assign(sym("k"), v).unwrap_err();
        assert!(matches!(err, SemanticError::AssignToConst { .. }));
    }

    #[test]
    fn integer_division_by_zero_is_not_folded_as_constant() {
        let mut c = Compiler::new();
        let l = c.literal(Value::Integer(5));
        let r = c.literal(Value::Integer(0));
        let result = c.oper(l, Op::Div, r).unwrap();
        assert!(!result.is_const);
        assert_eq!(result.value, None);
    }

    #[test]
    fn declaring_variable_of_undeclared_enum_type_is_fatal() {
        let mut c = Compiler::new();
        let err = c.declare_var(sym("s"), Type::EnumRef(sym("Status"))).unwrap_err();
        assert!(matches!(err, SemanticError::UndeclaredEnumType { .. }));
    }

    #[test]
    fn case_value_type_mismatch_is_fatal() {
        let mut c = Compiler::new();
        let scrutinee = c.literal(Value::Integer(1));
        c.switch_begin(&scrutinee).unwrap();
        c.case_dup();
        let case_value = c.literal(Value::String("x".to_string()));
        let err = c.case_test(&case_value).unwrap_err();
        assert!(matches!(err, SemanticError::CaseTypeMismatch { .. }));
    }

    #[test]
    fn constant_switch_scrutinee_warning_includes_value() {
        let mut c = Compiler::new();
        let scrutinee = c.literal(Value::Integer(42));
        c.switch_begin(&scrutinee).unwrap();
        assert!(c.diagnostics.warnings.iter().any(|w| w.contains("42")));
    }

    #[test]
    fn for_loop_emits_head_step_continue_exit_labels_in_order() {
        let mut c = Compiler::new();
        let (head, step, cont, exit) = c.for_begin();
        let cond = c.literal(Value::Logical(true));
        c.for_check(&cond, &exit, &cont).unwrap();
        c.for_after_check(&step);
        c.for_step_done(&head, &cont);
        c.for_end(&step, &exit);

        let (_, quads) = c.take_outputs();
        let head_pos = quads.find(&format!("LABEL {head}")).unwrap();
        let step_pos = quads.find(&format!("LABEL {step}")).unwrap();
        let cont_pos = quads.find(&format!("LABEL {cont}")).unwrap();
        let exit_pos = quads.find(&format!("LABEL {exit}")).unwrap();
        assert!(head_pos < step_pos);
        assert!(step_pos < cont_pos);
        assert!(cont_pos < exit_pos);
    }
}
