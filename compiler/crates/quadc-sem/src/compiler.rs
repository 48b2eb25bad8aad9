//! `Compiler`: the process-wide context every grammar-production callback
//! is invoked against (§9 — acceptable for a single-threaded, one-shot
//! compiler in place of the original's scattered globals). Glues the
//! symbol table, quad emitter, and diagnostics together and exposes the
//! full driver contract (§4.3-4.6) as methods.

use quadc_lex::Op;
use quadc_util::Symbol;

use crate::diag::{Diagnostics, SemanticError};
use crate::emit::QuadEmitter;
use crate::expr::Expr;
use crate::scope::{ExpectedKind, IdentKind, Identifier, LookupError, SymbolTable};
use crate::value::{token_name_op, token_name_type, Type, Value};

pub struct Compiler {
    pub symtab: SymbolTable,
    emitter: QuadEmitter,
    pub diagnostics: Diagnostics,
    /// `(expected_return_type, has_returned, declared_scope)`, top = innermost
    /// function. `declared_scope` is the scope the function's identifier and
    /// `DEF`/`fend` labels live in — the scope *surrounding* the function
    /// body, captured before [`Compiler::enter_scope`] pushes the body frame.
    return_stack: Vec<(Type, bool, u32)>,
    /// Scrutinee type of each enclosing `switch`, top = innermost, pushed
    /// in [`Compiler::switch_begin`] and popped in [`Compiler::endswitch`]
    /// so `case` values can be checked against it.
    switch_types: Vec<Type>,
    current_line: u32,
    sym_log: String,
    aborted: bool,
}

type SemResult<T> = Result<T, SemanticError>;

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            symtab: SymbolTable::new(),
            emitter: QuadEmitter::new(),
            diagnostics: Diagnostics::new(),
            return_stack: Vec::new(),
            switch_types: Vec::new(),
            current_line: 0,
            sym_log: String::new(),
            aborted: false,
        }
    }

    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    pub fn line(&self) -> u32 {
        self.current_line
    }

    pub fn syntax_error(&mut self, text: &str) {
        self.diagnostics.syntax_error(self.current_line, text);
    }

    /// Records a fatal error at the current line and marks the compiler
    /// aborted, so the CLI driver knows to discard the buffered artifacts
    /// (§4.7/§7) instead of writing them.
    fn fatal(&mut self, err: SemanticError) -> SemanticError {
        eprintln!("{}", Diagnostics::format_error(self.current_line, &err));
        self.aborted = true;
        err
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    // -- scope ------------------------------------------------------------

    pub fn enter_scope(&mut self) {
        self.symtab.enter_scope();
    }

    pub fn leave_scope(&mut self) {
        for ident in self.symtab.leave_scope() {
            self.diagnostics.warn(
                ident.declared_line,
                format!("Identifier '{}' defined in L#{} has never been used.", ident.name, ident.declared_line),
            );
        }
    }

    // -- declarations -------------------------------------------------------

    fn declare(&mut self, name: Symbol, kind: IdentKind) -> SemResult<()> {
        let ident = Identifier {
            name,
            declared_scope: self.symtab.current_scope,
            declared_line: self.current_line,
            is_used: false,
            kind,
        };
        self.symtab.declare(ident).map_err(|prev_line| {
            self.fatal(SemanticError::AlreadyDeclared { name: name.to_string(), prev_line })
        })
    }

    /// `Type::EnumRef(name)` is only well-formed once `name` has actually
    /// been declared as an enum type (§4.4); the parser can't tell a bare
    /// `Status x;` apart from a forward reference to an enum, so every site
    /// that turns an `EnumRef` into a declared identifier checks it here.
    fn check_declared_type(&mut self, ty: &Type) -> SemResult<()> {
        if let Type::EnumRef(enum_name) = ty {
            match self.symtab.lookup(*enum_name, ExpectedKind::EnumType) {
                Ok(_) => {}
                Err(LookupError::NotFound) => {
                    return Err(self.fatal(SemanticError::UndeclaredEnumType { name: enum_name.to_string() }))
                }
                Err(LookupError::KindMismatch { found }) => {
                    return Err(self.fatal(SemanticError::KindMismatch {
                        name: enum_name.to_string(),
                        found,
                        expected: "EnumType",
                    }))
                }
            }
        }
        Ok(())
    }

    pub fn declare_var(&mut self, name: Symbol, ty: Type) -> SemResult<()> {
        self.check_declared_type(&ty)?;
        self.declare(name, IdentKind::Variable { ty, is_initialized: false, is_const: false, value: None })
    }

    pub fn declare_const(&mut self, name: Symbol, ty: Type, expr: Expr) -> SemResult<()> {
        self.check_declared_type(&ty)?;
        if expr.ty != ty || !expr.is_const {
            return Err(self.fatal(SemanticError::NotAConstInitializer { expected: ty.to_string() }));
        }
        self.declare(name, IdentKind::Variable { ty, is_initialized: true, is_const: true, value: expr.value })
    }

    pub fn declare_param(&mut self, name: Symbol, ty: Type) -> SemResult<()> {
        self.check_declared_type(&ty)?;
        self.declare(name, IdentKind::Variable { ty, is_initialized: true, is_const: false, value: None })
    }

    pub fn declare_enum_type(&mut self, name: Symbol, variants: Vec<Symbol>) -> SemResult<()> {
        self.declare(name, IdentKind::EnumType { variants: variants.clone() })?;
        for variant in variants {
            let qualified = Symbol::intern(&format!("{name}.{variant}"));
            self.declare(qualified, IdentKind::EnumVariant { enum_type_name: name })?;
        }
        Ok(())
    }

    // -- reads / enum member access ----------------------------------------

    pub fn read_var(&mut self, name: Symbol) -> SemResult<Expr> {
        let scope = match self.symtab.lookup(name, ExpectedKind::Variable) {
            Ok(ident) => ident.declared_scope,
            Err(LookupError::NotFound) => {
                return Err(self.fatal(SemanticError::NotDeclared { name: name.to_string() }))
            }
            Err(LookupError::KindMismatch { found }) => {
                return Err(self.fatal(SemanticError::KindMismatch {
                    name: name.to_string(),
                    found,
                    expected: "Variable",
                }))
            }
        };

        let expr = {
            let ident = self.symtab.lookup_mut(name, ExpectedKind::Variable).ok().unwrap();
            ident.is_used = true;
            match &ident.kind {
                IdentKind::Variable { ty, is_initialized, is_const, value } => {
                    if !*is_initialized {
                        Some((false, Expr::new(ty.clone(), *is_const, value.clone())))
                    } else {
                        Some((true, Expr::new(ty.clone(), *is_const, value.clone())))
                    }
                }
                IdentKind::EnumVariant { enum_type_name } => {
                    let mut e = Expr::new(
                        Type::EnumRef(*enum_type_name),
                        true,
                        Some(Value::String(name.to_string())),
                    );
                    e.enum_type_name = Some(*enum_type_name);
                    Some((true, e))
                }
                _ => unreachable!("lookup already filtered to Variable/EnumVariant"),
            }
        };

        let (initialized, expr) = expr.unwrap();
        if !initialized {
            self.diagnostics.warn(
                self.current_line,
                format!("Variable '{name}' is being used without being initialized"),
            );
        }

        self.emitter.push_var(name, scope);
        Ok(expr)
    }

    pub fn enum_member_expr(&mut self, enum_type: Symbol, variant: Symbol) -> SemResult<Expr> {
        match self.symtab.lookup(enum_type, ExpectedKind::EnumType) {
            Ok(Identifier { kind: IdentKind::EnumType { variants }, .. }) => {
                if !variants.contains(&variant) {
                    return Err(self.fatal(SemanticError::UnknownEnumVariant {
                        enum_name: enum_type.to_string(),
                        variant: variant.to_string(),
                    }));
                }
            }
            Ok(_) => unreachable!(),
            Err(LookupError::NotFound) => {
                return Err(self.fatal(SemanticError::NotDeclared { name: enum_type.to_string() }))
            }
            Err(LookupError::KindMismatch { found }) => {
                return Err(self.fatal(SemanticError::KindMismatch {
                    name: enum_type.to_string(),
                    found,
                    expected: "EnumType",
                }))
            }
        }
        let qualified = format!("{enum_type}.{variant}");
        self.emitter.push_value(&Value::String(qualified.clone()));
        let mut e = Expr::new(Type::EnumRef(enum_type), true, Some(Value::String(qualified)));
        e.enum_type_name = Some(enum_type);
        Ok(e)
    }

    // -- expression evaluator -----------------------------------------------

    pub fn literal(&mut self, value: Value) -> Expr {
        self.emitter.push_value(&value);
        let ty = match &value {
            Value::Logical(_) => Type::Logical,
            Value::Integer(_) => Type::Integer,
            Value::Real(_) => Type::Real,
            Value::String(_) => Type::String,
        };
        Expr::new(ty, true, Some(value))
    }

    pub fn neg(&mut self, e: Expr) -> SemResult<Expr> {
        if !e.is_num() {
            return Err(self.fatal(SemanticError::OperatorTypeMismatch {
                op: "negation",
                left: token_name_type(&e.ty),
                right: token_name_type(&e.ty),
            }));
        }
        self.emitter.neg();
        let value = match (&e.ty, &e.value) {
            (Type::Integer, Some(Value::Integer(i))) => Some(Value::Integer(-i)),
            (Type::Real, Some(Value::Real(r))) => Some(Value::Real(-r)),
            _ => None,
        };
        Ok(Expr::new(e.ty, e.is_const, value))
    }

    pub fn complement(&mut self, e: Expr) -> SemResult<Expr> {
        if e.ty != Type::Logical {
            return Err(self.fatal(SemanticError::OperatorTypeMismatch {
                op: "complement",
                left: token_name_type(&e.ty),
                right: token_name_type(&e.ty),
            }));
        }
        self.emitter.not();
        let value = match e.value {
            Some(Value::Logical(b)) => Some(Value::Logical(!b)),
            _ => None,
        };
        Ok(Expr::new(Type::Logical, e.is_const, value))
    }

    pub fn oper(&mut self, left: Expr, op: Op, right: Expr) -> SemResult<Expr> {
        match op {
            Op::Plus | Op::Minus | Op::Mult | Op::Div => self.arith_oper(left, op, right),
            Op::Lt | Op::Gt | Op::Lte | Op::Gte => self.relational_oper(left, op, right),
            Op::Eq | Op::Ne => self.equality_oper(left, op, right),
            Op::And | Op::Or => self.logical_oper(left, op, right),
        }
    }

    fn type_mismatch(&mut self, op: Op, left: &Type, right: &Type) -> SemanticError {
        self.fatal(SemanticError::OperatorTypeMismatch {
            op: token_name_op(op),
            left: token_name_type(left),
            right: token_name_type(right),
        })
    }

    fn arith_oper(&mut self, left: Expr, op: Op, right: Expr) -> SemResult<Expr> {
        if !left.is_num() || !right.is_num() {
            return Err(self.type_mismatch(op, &left.ty, &right.ty));
        }
        let is_const = left.is_const && right.is_const;
        let result_ty = match (&left.ty, &right.ty) {
            (Type::Integer, Type::Real) => {
                // Right operand (on top of stack) moves to scratch so
                // INT2REAL can convert the now-exposed left operand, then
                // the scratch value is pushed back (§4.2).
                self.emitter.pop();
                self.emitter.int2real();
                self.emitter.push();
                Type::Real
            }
            (Type::Real, Type::Integer) => {
                self.emitter.int2real();
                Type::Real
            }
            (Type::Integer, Type::Integer) => Type::Integer,
            (Type::Real, Type::Real) => Type::Real,
            _ => unreachable!("is_num already restricted to Integer/Real"),
        };
        self.emitter.arith(op);

        let value = if is_const {
            fold_arith(&left, op, &right, &result_ty)
        } else {
            None
        };
        // Folding can fail even when both operands are const (e.g. integer
        // division by zero, deferred to the emitted DIV quad's runtime
        // behavior); `is_const` must track whether a value actually came
        // back, never the operands alone, or a "constant" Expr with no
        // value could flow into a const declaration or symbol-table dump.
        let is_const = is_const && value.is_some();
        Ok(Expr::new(result_ty, is_const, value))
    }

    fn relational_oper(&mut self, left: Expr, op: Op, right: Expr) -> SemResult<Expr> {
        if !left.is_num() || !right.is_num() {
            return Err(self.type_mismatch(op, &left.ty, &right.ty));
        }
        self.promote_for_comparison(&left.ty, &right.ty);
        self.emitter.arith(op);
        Ok(Expr::non_const(Type::Logical))
    }

    fn equality_oper(&mut self, left: Expr, op: Op, right: Expr) -> SemResult<Expr> {
        let ok = match (&left.ty, &right.ty) {
            (Type::Integer, Type::Integer)
            | (Type::Real, Type::Real)
            | (Type::Integer, Type::Real)
            | (Type::Real, Type::Integer)
            | (Type::String, Type::String) => true,
            (Type::EnumRef(l), Type::EnumRef(r)) => {
                if l != r {
                    return Err(self.fatal(SemanticError::IncompatibleEnumComparison {
                        left: l.to_string(),
                        right: r.to_string(),
                    }));
                }
                true
            }
            _ => false,
        };
        if !ok {
            return Err(self.type_mismatch(op, &left.ty, &right.ty));
        }
        if left.ty.is_numeric() && right.ty.is_numeric() {
            self.promote_for_comparison(&left.ty, &right.ty);
        }
        self.emitter.arith(op);
        Ok(Expr::non_const(Type::Logical))
    }

    fn logical_oper(&mut self, left: Expr, op: Op, right: Expr) -> SemResult<Expr> {
        if left.ty != Type::Logical || right.ty != Type::Logical {
            return Err(self.type_mismatch(op, &left.ty, &right.ty));
        }
        self.emitter.arith(op);
        let is_const = left.is_const && right.is_const;
        let value = match (is_const, &left.value, &right.value) {
            (true, Some(Value::Logical(l)), Some(Value::Logical(r))) => Some(Value::Logical(match op {
                Op::And => *l && *r,
                Op::Or => *l || *r,
                _ => unreachable!(),
            })),
            _ => None,
        };
        Ok(Expr::new(Type::Logical, is_const, value))
    }

    fn promote_for_comparison(&mut self, left: &Type, right: &Type) {
        match (left, right) {
            (Type::Integer, Type::Real) => {
                self.emitter.pop();
                self.emitter.int2real();
                self.emitter.push();
            }
            (Type::Real, Type::Integer) => self.emitter.int2real(),
            _ => {}
        }
    }

    // -- assignment / calls --------------------------------------------------

    pub fn assign(&mut self, name: Symbol, expr: Expr) -> SemResult<()> {
        let (scope, target_ty, is_const) = match self.symtab.lookup(name, ExpectedKind::Variable) {
            Ok(Identifier { declared_scope, kind: IdentKind::Variable { ty, is_const, .. }, .. }) => {
                (*declared_scope, ty.clone(), *is_const)
            }
            Ok(_) => {
                return Err(self.fatal(SemanticError::KindMismatch {
                    name: name.to_string(),
                    found: "EnumVariant",
                    expected: "Variable",
                }))
            }
            Err(LookupError::NotFound) => {
                return Err(self.fatal(SemanticError::NotDeclared { name: name.to_string() }))
            }
            Err(LookupError::KindMismatch { found }) => {
                return Err(self.fatal(SemanticError::KindMismatch {
                    name: name.to_string(),
                    found,
                    expected: "Variable",
                }))
            }
        };
        if is_const {
            return Err(self.fatal(SemanticError::AssignToConst { name: name.to_string() }));
        }

        match (&target_ty, &expr.ty) {
            (Type::EnumRef(target_enum), Type::EnumRef(src_enum)) => {
                if target_enum != src_enum {
                    return Err(self.fatal(SemanticError::AssignTypeMismatch {
                        expected: target_ty.to_string(),
                        found: expr.ty.to_string(),
                    }));
                }
            }
            (t, s) if t == s => {}
            (Type::Real, Type::Integer) => self.emitter.int2real(),
            (Type::Integer, Type::Real) => self.emitter.real2int(),
            _ if target_ty.is_numeric() && expr.ty.is_numeric() => {
                unreachable!("all numeric combinations are handled above")
            }
            _ => {
                return Err(self.fatal(SemanticError::AssignTypeMismatch {
                    expected: target_ty.to_string(),
                    found: expr.ty.to_string(),
                }))
            }
        }

        self.emitter.pop_var(name, scope);

        let ident = self.symtab.lookup_mut(name, ExpectedKind::Variable).ok().unwrap();
        if let IdentKind::Variable { is_initialized, value, .. } = &mut ident.kind {
            *is_initialized = true;
            *value = expr.value;
        }
        Ok(())
    }

    pub fn call_function(&mut self, name: Symbol, args: Vec<Expr>) -> SemResult<Expr> {
        let (scope, return_ty, param_types) = match self.symtab.lookup(name, ExpectedKind::Function) {
            Ok(Identifier { declared_scope, kind: IdentKind::Function { return_type, param_types }, .. }) => {
                (*declared_scope, return_type.clone(), param_types.clone())
            }
            Ok(_) => unreachable!(),
            Err(LookupError::NotFound) => {
                return Err(self.fatal(SemanticError::NotDeclared { name: name.to_string() }))
            }
            Err(LookupError::KindMismatch { found }) => {
                return Err(self.fatal(SemanticError::KindMismatch {
                    name: name.to_string(),
                    found,
                    expected: "Function",
                }))
            }
        };

        if args.len() != param_types.len() {
            return Err(self.fatal(SemanticError::ArityMismatch {
                name: name.to_string(),
                expected: param_types.len(),
                found: args.len(),
            }));
        }
        for (index, (arg, expected)) in args.iter().zip(param_types.iter()).enumerate() {
            if arg.ty != *expected {
                return Err(self.fatal(SemanticError::ArgTypeMismatch {
                    name: name.to_string(),
                    index: index + 1,
                    expected: expected.to_string(),
                    found: arg.ty.to_string(),
                }));
            }
        }

        let ident = self.symtab.lookup_mut(name, ExpectedKind::Function).ok().unwrap();
        ident.is_used = true;

        self.emitter.call(name, scope);
        Ok(Expr::non_const(return_ty))
    }

    // -- control flow ---------------------------------------------------------

    fn check_condition(&mut self, cond: &Expr, context: &'static str) -> SemResult<()> {
        if cond.ty != Type::Logical {
            return Err(self.fatal(SemanticError::OperatorTypeMismatch {
                op: context,
                left: token_name_type(&cond.ty),
                right: token_name_type(&cond.ty),
            }));
        }
        if cond.is_const {
            if let Some(Value::Logical(b)) = cond.value {
                self.diagnostics.warn(self.current_line, format!("condition is always {b}"));
            }
        }
        Ok(())
    }

    pub fn if_begin(&mut self, cond: &Expr) -> SemResult<String> {
        self.check_condition(cond, "if")?;
        self.emitter.block_start("if");
        Ok(self.emitter.if_begin(self.symtab.current_scope))
    }

    pub fn if_end(&mut self, end_label: &str) {
        self.emitter.label(end_label);
        self.emitter.block_end("if");
    }

    pub fn if_else_begin(&mut self, cond: &Expr) -> SemResult<(String, String)> {
        self.check_condition(cond, "if")?;
        self.emitter.block_start("if");
        Ok(self.emitter.if_else_begin(self.symtab.current_scope))
    }

    pub fn if_else_then_end(&mut self, end_label: &str, else_label: &str) {
        self.emitter.if_else_then_end(end_label, else_label);
    }

    pub fn if_else_end(&mut self, end_label: &str) {
        self.emitter.label(end_label);
        self.emitter.block_end("if");
    }

    pub fn while_begin(&mut self) -> (String, String) {
        self.emitter.block_start("while");
        self.emitter.while_begin(self.symtab.current_scope)
    }

    pub fn while_test(&mut self, cond: &Expr, end_label: &str) -> SemResult<()> {
        self.check_condition(cond, "while")?;
        self.emitter.while_test(end_label);
        Ok(())
    }

    pub fn while_end(&mut self, head_label: &str, end_label: &str) {
        self.emitter.while_end(head_label, end_label);
        self.emitter.block_end("while");
    }

    pub fn repeat_begin(&mut self) -> String {
        self.emitter.block_start("repeat");
        self.emitter.repeat_begin(self.symtab.current_scope)
    }

    pub fn repeat_end(&mut self, cond: &Expr, head_label: &str) -> SemResult<()> {
        self.check_condition(cond, "repeat")?;
        self.emitter.repeat_end(head_label);
        self.emitter.block_end("repeat");
        Ok(())
    }

    pub fn for_begin(&mut self) -> (String, String, String, String) {
        self.emitter.block_start("for");
        let labels = self.emitter.for_labels(self.symtab.current_scope);
        self.emitter.label(&labels.0);
        labels
    }

    pub fn for_check(&mut self, cond: &Expr, exit_label: &str, cont_label: &str) -> SemResult<()> {
        self.check_condition(cond, "for")?;
        self.emitter.for_check(exit_label, cont_label);
        Ok(())
    }

    pub fn for_after_check(&mut self, step_label: &str) {
        self.emitter.label(step_label);
    }

    pub fn for_step_done(&mut self, head_label: &str, cont_label: &str) {
        self.emitter.for_step_to_head(head_label, cont_label);
    }

    pub fn for_end(&mut self, step_label: &str, exit_label: &str) {
        self.emitter.for_end(step_label, exit_label);
        self.emitter.block_end("for");
    }

    pub fn switch_begin(&mut self, scrutinee: &Expr) -> SemResult<String> {
        if !scrutinee.is_num() && scrutinee.ty != Type::String {
            return Err(self.fatal(SemanticError::OperatorTypeMismatch {
                op: "switch",
                left: token_name_type(&scrutinee.ty),
                right: token_name_type(&scrutinee.ty),
            }));
        }
        if scrutinee.is_const {
            self.diagnostics.warn(
                self.current_line,
                format!("switch expression is the constant {}", render_value(scrutinee.value.as_ref())),
            );
        }
        self.switch_types.push(scrutinee.ty.clone());
        self.emitter.block_start("switch");
        Ok(self.emitter.switch_begin(self.symtab.current_scope))
    }

    /// Call before parsing/pushing the case's value expression.
    pub fn case_dup(&mut self) {
        self.emitter.case_dup();
    }

    /// Call once the case's value expression has been pushed; checks it
    /// against the enclosing switch's scrutinee type (§4.5) before emitting
    /// the comparison.
    pub fn case_test(&mut self, case_value: &Expr) -> SemResult<String> {
        let switch_ty = self.switch_types.last().cloned().expect("case outside switch");
        if case_value.ty != switch_ty {
            return Err(self.fatal(SemanticError::CaseTypeMismatch {
                expected: switch_ty.to_string(),
                found: case_value.ty.to_string(),
            }));
        }
        Ok(self.emitter.case_test(self.symtab.current_scope))
    }

    pub fn case_end(&mut self, next_label: &str) {
        self.emitter.case_end(next_label);
    }

    pub fn endswitch(&mut self) {
        self.switch_types.pop();
        self.emitter.endswitch();
        self.emitter.block_end("switch");
    }

    pub fn print_stmt(&mut self) {
        self.emitter.print();
    }

    // -- functions --------------------------------------------------------

    pub fn begin_function(&mut self, name: Symbol, return_ty: Type, params: Vec<(Symbol, Type)>) -> SemResult<()> {
        let param_types = params.iter().map(|(_, t)| t.clone()).collect();
        self.declare(name, IdentKind::Function { return_type: return_ty.clone(), param_types })?;
        let scope = self.symtab.current_scope;
        self.emitter.begin_function(name, scope);
        self.enter_scope();
        self.return_stack.push((return_ty, false, scope));
        for (param_name, param_ty) in params {
            self.declare_param(param_name, param_ty)?;
        }
        Ok(())
    }

    pub fn return_stmt(&mut self, expr: Expr) -> SemResult<()> {
        let (expected, _, _) = self
            .return_stack
            .last()
            .cloned()
            .expect("return outside a function body");
        if expr.ty != expected {
            return Err(self.fatal(SemanticError::ReturnTypeMismatch {
                expected: expected.to_string(),
                found: expr.ty.to_string(),
            }));
        }
        self.return_stack.last_mut().unwrap().1 = true;
        self.emitter.ret();
        Ok(())
    }

    pub fn end_function(&mut self, name: Symbol) {
        let (return_ty, has_returned, scope) =
            self.return_stack.pop().expect("end_function without begin_function");
        if !has_returned {
            self.diagnostics.warn(
                self.current_line,
                format!("function '{name}' may not return a value on every path"),
            );
            let default = match return_ty {
                Type::Integer | Type::Logical => Value::Integer(0),
                Type::Real => Value::Real(0.0),
                Type::String => Value::String(String::new()),
                Type::EnumRef(_) => Value::Integer(0),
            };
            self.emitter.push_value(&default);
            self.emitter.ret();
        }
        self.emitter.end_function(name, scope);
        self.leave_scope();
    }

    // -- symbol table dump --------------------------------------------------

    pub fn log_symtable(&mut self) {
        self.sym_log.push_str("====\n");
        self.sym_log.push_str(&format!("L#{}:\n", self.current_line));
        self.sym_log.push_str(&format!(
            "{}\tScope\tDec. Line\tIs Used\tIs Init.\tIs Const.\tValue\n",
            padn("Id. Name", 15)
        ));
        for ident in self.symtab.all_live_identifiers() {
            let (is_used, is_init, is_const, value) = match &ident.kind {
                IdentKind::Variable { is_initialized, is_const, value, .. } => {
                    (ident.is_used, *is_initialized, *is_const, render_value(value.as_ref()))
                }
                _ => (ident.is_used, true, false, "-".to_string()),
            };
            self.sym_log.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                padn(ident.name.as_str(), 15),
                ident.declared_scope,
                ident.declared_line,
                is_used,
                is_init,
                is_const,
                value
            ));
        }
    }

    pub fn take_outputs(self) -> (String, String) {
        (self.sym_log, self.emitter.take())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncates past 15 characters with an ellipsis, else right-pads with
/// spaces to width 15 — the column width the original's symbol-table log
/// hard-codes (`padn`, `original_source/src/lib.hpp`).
fn padn(s: &str, width: usize) -> String {
    if s.len() > width {
        let mut truncated: String = s.chars().take(width.saturating_sub(3)).collect();
        truncated.push_str("...");
        truncated
    } else {
        format!("{s:<width$}")
    }
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::Logical(b)) => b.to_string(),
        Some(Value::Integer(i)) => i.to_string(),
        Some(Value::Real(r)) => r.to_string(),
        Some(Value::String(s)) => format!("\"{s}\""),
    }
}

fn fold_arith(left: &Expr, op: Op, right: &Expr, result_ty: &Type) -> Option<Value> {
    let lf = as_f64(left)?;
    let rf = as_f64(right)?;
    match result_ty {
        Type::Integer => {
            let (Some(Value::Integer(l)), Some(Value::Integer(r))) = (&left.value, &right.value) else {
                return None;
            };
            let result = match op {
                Op::Plus => l.wrapping_add(*r),
                Op::Minus => l.wrapping_sub(*r),
                Op::Mult => l.wrapping_mul(*r),
                Op::Div => {
                    if *r == 0 {
                        return None;
                    }
                    l.wrapping_div(*r)
                }
                _ => unreachable!(),
            };
            Some(Value::Integer(result))
        }
        Type::Real => {
            let result = match op {
                Op::Plus => lf + rf,
                Op::Minus => lf - rf,
                Op::Mult => lf * rf,
                Op::Div => lf / rf,
                _ => unreachable!(),
            };
            Some(Value::Real(result))
        }
        _ => None,
    }
}

fn as_f64(e: &Expr) -> Option<f64> {
    match &e.value {
        Some(Value::Integer(i)) => Some(*i as f64),
        Some(Value::Real(r)) => Some(*r),
        _ => None,
    }
}
