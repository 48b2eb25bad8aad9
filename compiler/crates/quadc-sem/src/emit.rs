//! The control-flow quad emitter (§4.5): a line-oriented stack-IR with
//! symbolic, scope-qualified labels. Transcribed from `quads.hpp`'s
//! opcode macros and per-scope `lbls` counter.

use quadc_lex::Op;
use quadc_util::{FxHashMap, Symbol};

use crate::value::Value;

pub struct QuadEmitter {
    buf: String,
    /// Per-scope label counter (`quads.hpp`'s `std::map<int,int> lbls`,
    /// keyed by `current_scope`).
    label_counters: FxHashMap<u32, u32>,
    /// End-of-switch label names, top = innermost switch.
    switch_stack: Vec<String>,
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

impl QuadEmitter {
    pub fn new() -> Self {
        QuadEmitter { buf: String::new(), label_counters: FxHashMap::default(), switch_stack: Vec::new() }
    }

    pub fn take(self) -> String {
        self.buf
    }

    fn line(&mut self, text: &str) {
        self.buf.push('\t');
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn label_def(&mut self, label: &str) {
        self.buf.push_str(label);
        self.buf.push_str(":\n");
    }

    /// Allocates `count` fresh, consecutive labels in `scope`, returned in
    /// allocation order. The `for` pattern reserves all four of its labels
    /// through a single call so no intermediate allocation in another
    /// scope can desynchronize the `lbl+1`/`lbl+2`/`lbl+3` arithmetic the
    /// original relies on (§9).
    pub fn alloc_labels(&mut self, scope: u32, count: u32) -> Vec<String> {
        let counter = self.label_counters.entry(scope).or_insert(0);
        let start = *counter;
        *counter += count;
        (start..start + count).map(|n| format!("s{scope}_l{n}")).collect()
    }

    pub fn alloc_label(&mut self, scope: u32) -> String {
        self.alloc_labels(scope, 1).pop().unwrap()
    }

    // -- block markers --------------------------------------------------

    pub fn block_start(&mut self, kind: &str) {
        self.buf.push('\n');
        self.buf.push_str(&format!("/* {kind} statement */\n"));
        self.buf.push('\n');
    }

    pub fn block_end(&mut self, kind: &str) {
        self.buf.push('\n');
        self.buf.push_str(&format!("/* {kind} statement */\n"));
        self.buf.push('\n');
    }

    // -- stack ops --------------------------------------------------------

    pub fn push_value(&mut self, value: &Value) {
        let text = match value {
            Value::Logical(b) => format!("PUSH {b}"),
            Value::Integer(i) => format!("PUSH {i}"),
            Value::Real(r) => format!("PUSH {r}"),
            Value::String(s) => format!("PUSH {}", escape_string(s)),
        };
        self.line(&text);
    }

    pub fn push_var(&mut self, name: Symbol, scope: u32) {
        self.line(&format!("PUSH v_{name}{scope}"));
    }

    /// Bare `POP` / `PUSH`, used to shuttle the right operand into the
    /// implicit scratch slot while `INT2REAL` converts the exposed left
    /// operand (the Int-left/Real-right promotion case, §4.2).
    pub fn pop(&mut self) {
        self.line("POP");
    }

    pub fn push(&mut self) {
        self.line("PUSH");
    }

    pub fn pop_var(&mut self, name: Symbol, scope: u32) {
        self.line(&format!("POP v_{name}{scope}"));
    }

    pub fn dup(&mut self) {
        self.line("DUP");
    }

    pub fn int2real(&mut self) {
        self.line("INT2REAL");
    }

    pub fn real2int(&mut self) {
        self.line("REAL2INT");
    }

    pub fn neg(&mut self) {
        self.line("NEG");
    }

    pub fn not(&mut self) {
        self.line("NOT");
    }

    pub fn arith(&mut self, op: Op) {
        let mnemonic = match op {
            Op::Plus => "PLUS",
            Op::Minus => "MINUS",
            Op::Mult => "MULT",
            Op::Div => "DIV",
            Op::Lt => "LT",
            Op::Gt => "GT",
            Op::Lte => "LTEQ",
            Op::Gte => "GTEQ",
            Op::Eq => "EQ",
            Op::Ne => "NEQ",
            Op::And => "AND",
            Op::Or => "OR",
        };
        self.line(mnemonic);
    }

    pub fn jmp(&mut self, label: &str) {
        self.line(&format!("JMP {label}"));
    }

    pub fn jz(&mut self, label: &str) {
        self.line(&format!("JZ {label}"));
    }

    pub fn call(&mut self, name: Symbol, scope: u32) {
        self.line(&format!("CALL f_{name}{scope}"));
    }

    pub fn ret(&mut self) {
        self.line("RET");
    }

    pub fn print(&mut self) {
        self.line("PRINT");
    }

    pub fn def_func(&mut self, name: Symbol, scope: u32) {
        self.label_def(&format!("DEF f_{name}{scope}"));
    }

    pub fn label(&mut self, label: &str) {
        self.label_def(&format!("LABEL {label}"));
    }

    // -- control-flow patterns -------------------------------------------

    /// `if`: caller has already emitted the condition. Returns the
    /// end-of-if label to close with [`QuadEmitter::label`] once the body
    /// is emitted.
    pub fn if_begin(&mut self, scope: u32) -> String {
        let end = self.alloc_label(scope);
        self.jz(&end);
        end
    }

    /// `if/else`: returns `(else_label, end_label)`. Call
    /// `label(&else_label)` after the then-body and before the else-body
    /// (preceded by a `JMP end_label`), and `label(&end_label)` after the
    /// else-body.
    pub fn if_else_begin(&mut self, scope: u32) -> (String, String) {
        let labels = self.alloc_labels(scope, 2);
        self.jz(&labels[0]);
        (labels[0].clone(), labels[1].clone())
    }

    pub fn if_else_then_end(&mut self, end_label: &str, else_label: &str) {
        self.jmp(end_label);
        self.label(else_label);
    }

    /// `while`: returns `(head_label, end_label)`. Emit `label(&head)`
    /// before the condition, then after the condition call
    /// `jz(&end)`; after the body, `jmp(&head)` then `label(&end)`.
    pub fn while_begin(&mut self, scope: u32) -> (String, String) {
        let labels = self.alloc_labels(scope, 2);
        self.label(&labels[0]);
        (labels[0].clone(), labels[1].clone())
    }

    pub fn while_test(&mut self, end_label: &str) {
        self.jz(end_label);
    }

    pub fn while_end(&mut self, head_label: &str, end_label: &str) {
        self.jmp(head_label);
        self.label(end_label);
    }

    /// `repeat`: loops while the condition is zero (until it becomes
    /// true). Returns the head label to loop back to.
    pub fn repeat_begin(&mut self, scope: u32) -> String {
        let head = self.alloc_label(scope);
        self.label(&head);
        head
    }

    pub fn repeat_end(&mut self, head_label: &str) {
        self.jz(head_label);
    }

    /// `for`: reserves the head/continue/step/exit labels in one call, per
    /// the fixed four-label allocation (§9). Order: `(head, step, cont, exit)`.
    ///
    /// Emission order relative to parser-produced quads:
    /// 1. `label(head)`; condition quads; `jz(exit)`; `jmp(cont)`; `label(step)`
    /// 2. step/increment quads (produced by the parser)
    /// 3. `jmp(head)`; `label(cont)`
    /// 4. body quads (produced by the parser)
    /// 5. `jmp(step)`; `label(exit)`
    pub fn for_labels(&mut self, scope: u32) -> (String, String, String, String) {
        let l = self.alloc_labels(scope, 4);
        (l[0].clone(), l[1].clone(), l[2].clone(), l[3].clone())
    }

    pub fn for_check(&mut self, exit_label: &str, cont_label: &str) {
        self.jz(exit_label);
        self.jmp(cont_label);
    }

    pub fn for_step_to_head(&mut self, head_label: &str, cont_label: &str) {
        self.jmp(head_label);
        self.label(cont_label);
    }

    pub fn for_end(&mut self, step_label: &str, exit_label: &str) {
        self.jmp(step_label);
        self.label(exit_label);
    }

    /// `switch`: pushes a fresh exit label and returns it.
    pub fn switch_begin(&mut self, scope: u32) -> String {
        let exit = self.alloc_label(scope);
        self.switch_stack.push(exit.clone());
        exit
    }

    /// Each `case`: duplicate the scrutinee so the comparison leaves it on
    /// the stack for the next case. Call this *before* the case's value
    /// expression is parsed/pushed, so the stack reads
    /// `[scrutinee, scrutinee, case_value]` by the time [`QuadEmitter::case_test`]
    /// emits `EQ`.
    pub fn case_dup(&mut self) {
        self.dup();
    }

    /// Compares the just-pushed case value against the duplicated scrutinee
    /// and branches past the case body on mismatch. Returns the label for
    /// the next case to try.
    pub fn case_test(&mut self, scope: u32) -> String {
        self.arith(Op::Eq);
        let next = self.alloc_label(scope);
        self.jz(&next);
        next
    }

    pub fn case_end(&mut self, next_label: &str) {
        let exit = self.switch_stack.last().expect("case outside switch").clone();
        self.jmp(&exit);
        self.label(next_label);
    }

    pub fn endswitch(&mut self) {
        let exit = self.switch_stack.pop().expect("endswitch without switch");
        self.label(&exit);
        self.pop();
    }

    /// `func ... begin`: `JMP fend_<name><scope>` then `DEF f_<name><scope>:`.
    pub fn begin_function(&mut self, name: Symbol, scope: u32) {
        self.jmp(&format!("fend_{name}{scope}"));
        self.def_func(name, scope);
    }

    pub fn end_function(&mut self, name: Symbol, scope: u32) {
        self.label(&format!("fend_{name}{scope}"));
    }
}

impl Default for QuadEmitter {
    fn default() -> Self {
        Self::new()
    }
}
