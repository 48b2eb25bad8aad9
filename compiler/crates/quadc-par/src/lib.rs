//! quadc-par - recursive-descent parser.
//!
//! Single-pass: grammar productions call straight into [`quadc_sem::Compiler`]
//! as they're recognized rather than building an intermediate AST, mirroring
//! how the original grammar's actions drove code generation directly.
//! Expression parsing uses precedence-climbing (one function per binding
//! level) rather than a table-driven Pratt loop, since the operator set is
//! small and fixed.

use quadc_lex::{Lexer, Op as LexOp, Token, TokenKind};
use quadc_sem::{Compiler, Expr, SemanticError, Type, Value};
use quadc_util::Symbol;

/// `Err(())` means a fatal semantic error already reported through
/// [`Compiler`]'s diagnostics channel (or end-of-input reached while
/// recovering from a syntax error); the caller should stop parsing.
type PResult<T> = Result<T, ()>;

pub struct Parser<'a, 'c> {
    tokens: std::iter::Peekable<TokenStream<'a>>,
    current: Token,
    compiler: &'c mut Compiler,
}

/// Wraps the lexer so a `LexError` becomes a reported syntax error rather
/// than a panic, and EOF becomes a steady stream of `Eof` tokens so lookahead
/// never runs off the end.
struct TokenStream<'a> {
    lexer: Lexer<'a>,
    done: bool,
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        match self.lexer.next_token() {
            Ok(tok) => {
                if matches!(tok.kind, TokenKind::Eof) {
                    self.done = true;
                }
                Some(tok)
            }
            Err(err) => {
                self.done = true;
                Some(Token { kind: TokenKind::Eof, line: err_line(&err), text: err.to_string() })
            }
        }
    }
}

fn err_line(err: &quadc_lex::LexError) -> u32 {
    match err {
        quadc_lex::LexError::UnterminatedString { line }
        | quadc_lex::LexError::UnexpectedChar { line, .. }
        | quadc_lex::LexError::MalformedNumber { line, .. } => *line,
    }
}

impl<'a, 'c> Parser<'a, 'c> {
    pub fn new(source: &'a str, compiler: &'c mut Compiler) -> Self {
        let mut tokens = (TokenStream { lexer: Lexer::new(source), done: false }).peekable();
        let current = tokens.next().unwrap_or(Token { kind: TokenKind::Eof, line: 0, text: String::new() });
        Parser { tokens, current, compiler }
    }

    fn bump(&mut self) -> Token {
        let next = self.tokens.next().unwrap_or(Token { kind: TokenKind::Eof, line: self.current.line, text: String::new() });
        std::mem::replace(&mut self.current, next)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn at_eof(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    /// Consumes the current token if it matches `kind`'s shape, else reports
    /// a syntax error and performs panic-mode recovery (§7): skip tokens
    /// until a statement boundary (`;`, `end`, or a keyword that starts a
    /// new declaration/statement) and return `Err(())`.
    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(&kind) {
            Ok(self.bump())
        } else {
            self.compiler.set_line(self.current.line);
            self.compiler.syntax_error(&self.current.text);
            self.synchronize();
            Err(())
        }
    }

    fn synchronize(&mut self) {
        while !self.at_eof() {
            match &self.current.kind {
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::KwEnd
                | TokenKind::KwEndswitch
                | TokenKind::KwFunc
                | TokenKind::KwIf
                | TokenKind::KwWhile
                | TokenKind::KwFor
                | TokenKind::KwRepeat
                | TokenKind::KwSwitch
                | TokenKind::KwInt
                | TokenKind::KwReal
                | TokenKind::KwLogical
                | TokenKind::KwString
                | TokenKind::KwConst
                | TokenKind::KwEnum => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    pub fn parse_program(&mut self) {
        while !self.at_eof() {
            if self.statement().is_err() && self.compiler.aborted() {
                return;
            }
        }
    }

    // -- statements ---------------------------------------------------------

    fn statement(&mut self) -> PResult<()> {
        self.compiler.set_line(self.current.line);
        match &self.current.kind {
            TokenKind::KwConst => self.const_decl(),
            TokenKind::KwInt | TokenKind::KwReal | TokenKind::KwLogical | TokenKind::KwString => self.var_decl(),
            TokenKind::KwEnum => self.enum_decl(),
            TokenKind::KwFunc => self.func_decl(),
            TokenKind::KwIf => self.if_stmt(),
            TokenKind::KwWhile => self.while_stmt(),
            TokenKind::KwRepeat => self.repeat_stmt(),
            TokenKind::KwFor => self.for_stmt(),
            TokenKind::KwSwitch => self.switch_stmt(),
            TokenKind::KwReturn => self.return_stmt(),
            TokenKind::KwPrint => self.print_stmt(),
            TokenKind::KwDump => self.dump_stmt(),
            TokenKind::Ident(_) => self.assign_or_call_stmt(),
            _ => {
                self.compiler.syntax_error(&self.current.text);
                self.synchronize();
                Err(())
            }
        }
    }

    fn type_name(&mut self) -> PResult<Type> {
        let ty = match &self.current.kind {
            TokenKind::KwInt => Type::Integer,
            TokenKind::KwReal => Type::Real,
            TokenKind::KwLogical => Type::Logical,
            TokenKind::KwString => Type::String,
            TokenKind::Ident(name) => Type::EnumRef(*name),
            _ => {
                self.compiler.syntax_error(&self.current.text);
                self.synchronize();
                return Err(());
            }
        };
        self.bump();
        Ok(ty)
    }

    fn ident(&mut self) -> PResult<Symbol> {
        match self.current.kind {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(name)
            }
            _ => {
                self.compiler.syntax_error(&self.current.text);
                self.synchronize();
                Err(())
            }
        }
    }

    /// Already printed by [`Compiler`]'s own fatal-error path; just turns
    /// the `SemanticError` into the parser's abort sentinel. Generic so it
    /// can close out an `or_else` chain regardless of the Ok type (`()`,
    /// `String`, a label pair, ...) since the `Err` arm never needs one.
    fn reported<T>(&mut self, err: SemanticError) -> PResult<T> {
        let _ = err;
        Err(())
    }

    fn var_decl(&mut self) -> PResult<()> {
        let ty = self.type_name()?;
        let name = self.ident()?;
        self.expect(TokenKind::Semicolon)?;
        self.compiler.declare_var(name, ty).or_else(|e| self.reported(e))
    }

    fn const_decl(&mut self) -> PResult<()> {
        self.bump(); // const
        let ty = self.type_name()?;
        let name = self.ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.expr()?;
        self.expect(TokenKind::Semicolon)?;
        self.compiler.declare_const(name, ty, value).or_else(|e| self.reported(e))
    }

    fn enum_decl(&mut self) -> PResult<()> {
        self.bump(); // enum
        let name = self.ident()?;
        self.expect(TokenKind::LBrace)?;
        let mut variants = vec![self.ident()?];
        while self.at(&TokenKind::Comma) {
            self.bump();
            variants.push(self.ident()?);
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Semicolon)?;
        self.compiler.declare_enum_type(name, variants).or_else(|e| self.reported(e))
    }

    fn func_decl(&mut self) -> PResult<()> {
        self.bump(); // func
        let name = self.ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                let ty = self.type_name()?;
                let pname = self.ident()?;
                params.push((pname, ty));
                if self.at(&TokenKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Colon)?;
        let return_ty = self.type_name()?;
        self.expect(TokenKind::KwBegin)?;

        self.compiler.begin_function(name, return_ty, params).or_else(|e| self.reported(e))?;
        while !self.at(&TokenKind::KwEnd) && !self.at_eof() {
            let _ = self.statement();
            if self.compiler.aborted() {
                return Err(());
            }
        }
        self.expect(TokenKind::KwEnd)?;
        if self.at(&TokenKind::Semicolon) {
            self.bump();
        }
        self.compiler.end_function(name);
        Ok(())
    }

    fn block_until(&mut self, terminators: &[TokenKind]) -> PResult<()> {
        while !terminators.iter().any(|t| self.at(t)) && !self.at_eof() {
            let _ = self.statement();
            if self.compiler.aborted() {
                return Err(());
            }
        }
        Ok(())
    }

    fn if_stmt(&mut self) -> PResult<()> {
        self.bump(); // if
        let cond = self.expr()?;
        self.expect(TokenKind::KwThen)?;
        if self.at(&TokenKind::KwElse) {
            let (else_label, end_label) = self.compiler.if_else_begin(&cond).or_else(|e| self.reported(e))?;
            self.block_until(&[TokenKind::KwElse, TokenKind::KwEnd])?;
            self.compiler.if_else_then_end(&end_label, &else_label);
            self.bump(); // else
            self.block_until(&[TokenKind::KwEnd])?;
            self.expect(TokenKind::KwEnd)?;
            self.compiler.if_else_end(&end_label);
        } else {
            let end_label = self.compiler.if_begin(&cond).or_else(|e| self.reported(e))?;
            self.block_until(&[TokenKind::KwEnd])?;
            self.expect(TokenKind::KwEnd)?;
            self.compiler.if_end(&end_label);
        }
        if self.at(&TokenKind::Semicolon) {
            self.bump();
        }
        Ok(())
    }

    fn while_stmt(&mut self) -> PResult<()> {
        self.bump(); // while
        let (head, end) = self.compiler.while_begin();
        let cond = self.expr()?;
        self.compiler.while_test(&cond, &end).or_else(|e| self.reported(e))?;
        self.expect(TokenKind::KwDo)?;
        self.block_until(&[TokenKind::KwEnd])?;
        self.expect(TokenKind::KwEnd)?;
        self.compiler.while_end(&head, &end);
        if self.at(&TokenKind::Semicolon) {
            self.bump();
        }
        Ok(())
    }

    fn repeat_stmt(&mut self) -> PResult<()> {
        self.bump(); // repeat
        let head = self.compiler.repeat_begin();
        self.block_until(&[TokenKind::KwUntil])?;
        self.expect(TokenKind::KwUntil)?;
        let cond = self.expr()?;
        self.expect(TokenKind::Semicolon)?;
        self.compiler.repeat_end(&cond, &head).or_else(|e| self.reported(e))
    }

    /// `for ( name := expr ; cond ; name := expr ) do body end`. The step
    /// clause's quads are emitted right where the grammar places it —
    /// between the condition test and the loop body — so the textual
    /// header order already matches the quad emission order (§4.5).
    fn for_stmt(&mut self) -> PResult<()> {
        self.bump(); // for
        self.expect(TokenKind::LParen)?;
        self.assign_stmt_bare()?;
        self.expect(TokenKind::Semicolon)?;

        let (head, step, cont, exit) = self.compiler.for_begin();
        let cond = self.expr()?;
        self.compiler.for_check(&cond, &exit, &cont).or_else(|e| self.reported(e))?;
        self.expect(TokenKind::Semicolon)?;

        self.compiler.for_after_check(&step);
        self.assign_stmt_bare()?;
        self.expect(TokenKind::RParen)?;
        self.compiler.for_step_done(&head, &cont);

        self.expect(TokenKind::KwDo)?;
        self.block_until(&[TokenKind::KwEnd])?;
        self.expect(TokenKind::KwEnd)?;
        self.compiler.for_end(&step, &exit);
        if self.at(&TokenKind::Semicolon) {
            self.bump();
        }
        Ok(())
    }

    /// `name := expr`, without a trailing semicolon — used for the `for`
    /// header's init/step clauses.
    fn assign_stmt_bare(&mut self) -> PResult<()> {
        let name = self.ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.expr()?;
        self.compiler.assign(name, value).or_else(|e| self.reported(e))
    }

    fn switch_stmt(&mut self) -> PResult<()> {
        self.bump(); // switch
        self.expect(TokenKind::LParen)?;
        let scrutinee = self.expr()?;
        self.expect(TokenKind::RParen)?;
        self.compiler.switch_begin(&scrutinee).or_else(|e| self.reported(e))?;
        self.expect(TokenKind::LBrace)?;

        while self.at(&TokenKind::KwCase) {
            self.bump();
            self.compiler.case_dup();
            let case_value = self.expr()?;
            let next = self.compiler.case_test(&case_value).or_else(|e| self.reported(e))?;
            self.expect(TokenKind::Colon)?;
            self.block_until(&[TokenKind::KwCase, TokenKind::KwDefault, TokenKind::RBrace])?;
            self.compiler.case_end(&next);
        }
        if self.at(&TokenKind::KwDefault) {
            self.bump();
            self.expect(TokenKind::Colon)?;
            self.block_until(&[TokenKind::RBrace])?;
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::KwEndswitch)?;
        self.compiler.endswitch();
        if self.at(&TokenKind::Semicolon) {
            self.bump();
        }
        Ok(())
    }

    fn return_stmt(&mut self) -> PResult<()> {
        self.bump(); // return
        let value = self.expr()?;
        self.expect(TokenKind::Semicolon)?;
        self.compiler.return_stmt(value).or_else(|e| self.reported(e))
    }

    fn print_stmt(&mut self) -> PResult<()> {
        self.bump(); // print
        self.expr()?;
        self.expect(TokenKind::Semicolon)?;
        self.compiler.print_stmt();
        Ok(())
    }

    fn dump_stmt(&mut self) -> PResult<()> {
        self.bump(); // dump
        self.expect(TokenKind::Semicolon)?;
        self.compiler.log_symtable();
        Ok(())
    }

    fn assign_or_call_stmt(&mut self) -> PResult<()> {
        let name = self.ident()?;
        if self.at(&TokenKind::Assign) {
            self.bump();
            let value = self.expr()?;
            self.expect(TokenKind::Semicolon)?;
            self.compiler.assign(name, value).or_else(|e| self.reported(e))
        } else if self.at(&TokenKind::LParen) {
            self.bump();
            let args = self.call_args()?;
            self.expect(TokenKind::RParen)?;
            self.expect(TokenKind::Semicolon)?;
            self.compiler.call_function(name, args).map(|_| ()).or_else(|e| self.reported(e))
        } else {
            self.compiler.syntax_error(&self.current.text);
            self.synchronize();
            Err(())
        }
    }

    fn call_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            args.push(self.expr()?);
            while self.at(&TokenKind::Comma) {
                self.bump();
                args.push(self.expr()?);
            }
        }
        Ok(args)
    }

    // -- expressions (precedence-climbing) -----------------------------------

    fn expr(&mut self) -> PResult<Expr> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> PResult<Expr> {
        let mut left = self.and_expr()?;
        while matches!(self.current.kind, TokenKind::Op(LexOp::Or)) {
            self.bump();
            let right = self.and_expr()?;
            left = self.apply_oper(left, LexOp::Or, right)?;
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> PResult<Expr> {
        let mut left = self.eq_expr()?;
        while matches!(self.current.kind, TokenKind::Op(LexOp::And)) {
            self.bump();
            let right = self.eq_expr()?;
            left = self.apply_oper(left, LexOp::And, right)?;
        }
        Ok(left)
    }

    fn eq_expr(&mut self) -> PResult<Expr> {
        let mut left = self.rel_expr()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Op(op @ (LexOp::Eq | LexOp::Ne)) => op,
                _ => break,
            };
            self.bump();
            let right = self.rel_expr()?;
            left = self.apply_oper(left, op, right)?;
        }
        Ok(left)
    }

    fn rel_expr(&mut self) -> PResult<Expr> {
        let mut left = self.add_expr()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Op(op @ (LexOp::Lt | LexOp::Gt | LexOp::Lte | LexOp::Gte)) => op,
                _ => break,
            };
            self.bump();
            let right = self.add_expr()?;
            left = self.apply_oper(left, op, right)?;
        }
        Ok(left)
    }

    fn add_expr(&mut self) -> PResult<Expr> {
        let mut left = self.mul_expr()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Op(op @ (LexOp::Plus | LexOp::Minus)) => op,
                _ => break,
            };
            self.bump();
            let right = self.mul_expr()?;
            left = self.apply_oper(left, op, right)?;
        }
        Ok(left)
    }

    fn mul_expr(&mut self) -> PResult<Expr> {
        let mut left = self.unary_expr()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Op(op @ (LexOp::Mult | LexOp::Div)) => op,
                _ => break,
            };
            self.bump();
            let right = self.unary_expr()?;
            left = self.apply_oper(left, op, right)?;
        }
        Ok(left)
    }

    fn apply_oper(&mut self, left: Expr, op: LexOp, right: Expr) -> PResult<Expr> {
        self.compiler.oper(left, op, right).map_err(|_| ())
    }

    fn unary_expr(&mut self) -> PResult<Expr> {
        match self.current.kind {
            TokenKind::Op(LexOp::Minus) => {
                self.bump();
                let e = self.unary_expr()?;
                self.compiler.neg(e).map_err(|_| ())
            }
            TokenKind::Bang => {
                self.bump();
                let e = self.unary_expr()?;
                self.compiler.complement(e).map_err(|_| ())
            }
            _ => self.primary_expr(),
        }
    }

    fn primary_expr(&mut self) -> PResult<Expr> {
        self.compiler.set_line(self.current.line);
        match self.current.kind.clone() {
            TokenKind::Integer(n) => {
                self.bump();
                Ok(self.compiler.literal(Value::Integer(n)))
            }
            TokenKind::Double(n) => {
                self.bump();
                Ok(self.compiler.literal(Value::Real(n)))
            }
            TokenKind::Logical(b) => {
                self.bump();
                Ok(self.compiler.literal(Value::Logical(b)))
            }
            TokenKind::StringLit(s) => {
                self.bump();
                Ok(self.compiler.literal(Value::String(s)))
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.at(&TokenKind::Dot) {
                    self.bump();
                    let variant = self.ident()?;
                    self.compiler.enum_member_expr(name, variant).map_err(|_| ())
                } else if self.at(&TokenKind::LParen) {
                    self.bump();
                    let args = self.call_args()?;
                    self.expect(TokenKind::RParen)?;
                    self.compiler.call_function(name, args).map_err(|_| ())
                } else {
                    self.compiler.read_var(name).map_err(|_| ())
                }
            }
            TokenKind::LParen => {
                self.bump();
                let e = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            _ => {
                self.compiler.syntax_error(&self.current.text);
                self.synchronize();
                Err(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> (bool, String, String) {
        let mut compiler = Compiler::new();
        Parser::new(src, &mut compiler).parse_program();
        let aborted = compiler.aborted();
        let (sym, quad) = compiler.take_outputs();
        (aborted, sym, quad)
    }

    #[test]
    fn const_declaration_produces_no_conversion_quads() {
        let (_, _, quad) = compile("const int x := 3 + 4;");
        assert!(!quad.contains("INT2REAL"));
    }

    #[test]
    fn mixed_arithmetic_assignment_promotes_once() {
        let (_, _, quad) = compile("int a; real b; a := 2; b := a + 1.5;");
        assert_eq!(quad.matches("INT2REAL").count(), 1);
    }

    #[test]
    fn comparing_distinct_enum_types_aborts() {
        let mut compiler = Compiler::new();
        let src = "enum Color { Red, Green, Blue } enum Size { Small, Large } \
                   Color c; Size s; c := Color.Green; if c == s then end";
        Parser::new(src, &mut compiler).parse_program();
        assert!(compiler.aborted());
    }

    #[test]
    fn calling_with_wrong_arity_aborts() {
        let mut compiler = Compiler::new();
        let src = "func f(int x, int y) : int begin return x + y; end f(1, 2, 3);";
        Parser::new(src, &mut compiler).parse_program();
        assert!(compiler.aborted());
    }

    #[test]
    fn reading_before_init_warns_without_aborting() {
        let mut compiler = Compiler::new();
        let src = "int x; if x > 0 then end";
        Parser::new(src, &mut compiler).parse_program();
        assert!(!compiler.aborted());
        assert!(compiler.diagnostics.warnings.iter().any(|w| w.contains("without being initialized")));
    }

    #[test]
    fn constant_while_condition_warns() {
        let mut compiler = Compiler::new();
        let src = "int x; while true do x := x + 1; end";
        Parser::new(src, &mut compiler).parse_program();
        assert!(compiler.diagnostics.warnings.iter().any(|w| w.contains("always")));
    }

    #[test]
    fn for_loop_parses_and_emits_four_labels() {
        let mut compiler = Compiler::new();
        let src = "int i; for (i := 0; i < 10; i := i + 1) do print i; end";
        Parser::new(src, &mut compiler).parse_program();
        assert!(!compiler.aborted());
        let (_, quad) = compiler.take_outputs();
        assert_eq!(quad.matches("LABEL").count(), 4);
    }

    #[test]
    fn switch_case_parses_to_matching_exit_label() {
        let mut compiler = Compiler::new();
        let src = "int x; x := 1; switch (x) { case 1: print x; case 2: print x; } endswitch;";
        Parser::new(src, &mut compiler).parse_program();
        assert!(!compiler.aborted());
    }

    #[test]
    fn case_value_type_mismatch_aborts() {
        let mut compiler = Compiler::new();
        let src = "int x; x := 1; switch (x) { case \"a\": print x; } endswitch;";
        Parser::new(src, &mut compiler).parse_program();
        assert!(compiler.aborted());
    }

    #[test]
    fn enum_typed_variable_without_declared_enum_aborts() {
        let mut compiler = Compiler::new();
        let src = "Status s;";
        Parser::new(src, &mut compiler).parse_program();
        assert!(compiler.aborted());
    }

    #[test]
    fn dump_statement_writes_symbol_table_header() {
        let mut compiler = Compiler::new();
        let src = "int x; dump;";
        Parser::new(src, &mut compiler).parse_program();
        let (sym, _) = compiler.take_outputs();
        assert!(sym.contains("Id. Name"));
    }
}
