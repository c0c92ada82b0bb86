//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<&str,bool>` tracking declared/defined).
//! 2. Report static errors (redeclaration, self‑read in an initializer, invalid
//!    `return`/`this`/`super` placement, self‑inheritance).
//! 3. Record a frame distance for every occurrence of a declared variable.
//!    Occurrences with no recorded distance are left to dynamic lookup in the
//!    global frame at run time (native definitions, names from earlier REPL
//!    lines).
//!
//! The scope stack is seeded with one bottom scope standing in for the
//! global frame, so top-level declarations shadow and self-initialize under
//! the same rules as block locals.  A read that lands on the declaration
//! being initialized binds to an enclosing declaration of the same name
//! instead; only when none exists is it reported.
//!
//! The output is a [`Bindings`] table keyed by [`ExprId`]: the AST itself is
//! never mutated, and the interpreter merges the table before executing.
//! Diagnostics accumulate; one bad declaration never hides the rest of the
//! program from analysis.

use crate::error::LoxError;
use crate::parser::{Expr, ExprId, FunctionDecl, Stmt};
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

/// Scope distance table: node id → number of frames to walk at runtime.
/// Absence of an id means the occurrence resolved to a global.
pub type Bindings = HashMap<ExprId, usize>;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
}

/// What kind of class body encloses us.  Kept as a stack so nested class
/// declarations restore the outer class's state on exit; an empty stack
/// means we are outside any class.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    Class,
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and records binding
/// distances (locals vs. globals) into a [`Bindings`] table.
pub struct Resolver<'a> {
    scopes: Vec<HashMap<&'a str, bool>>, // false=declared, true=defined
    bindings: Bindings,
    errors: Vec<LoxError>,
    current_function: FunctionType,
    class_stack: Vec<ClassType>,
}

impl<'a> Default for Resolver<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Resolver<'a> {
    /// Create a new resolver.
    pub fn new() -> Self {
        info!("Resolver instantiated");

        Resolver {
            // The bottom scope mirrors the global frame, so top-level
            // declarations participate in shadowing and self-initializer
            // detection like any block scope.  Names never declared in
            // this pass stay unrecorded and resolve dynamically against
            // the global frame at run time.
            scopes: vec![HashMap::new()],
            bindings: HashMap::new(),
            errors: Vec::new(),
            current_function: FunctionType::None,
            class_stack: Vec::new(),
        }
    }

    /// Walk all top‑level statements, producing the binding table and any
    /// diagnostics encountered along the way.
    pub fn resolve(mut self, statements: &[Stmt<'a>]) -> (Bindings, Vec<LoxError>) {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        info!(
            "Resolve pass complete: {} bindings, {} errors",
            self.bindings.len(),
            self.errors.len()
        );

        (self.bindings, self.errors)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt<'a>) {
        debug!("Resolving stmt: {:?}", stmt);
        match stmt {
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),

            Stmt::Block(statements) => {
                // ① Push a new anonymous scope for `{ … }`
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s);
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // ② var declaration: declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(decl) => {
                // ③ function declaration: name is visible *inside* its own body
                self.declare(decl.name);
                self.define(decl.name);
                self.resolve_function(decl, FunctionType::Function);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                // ④ just resolve the inner expression
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                // ⑤ if
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                // ⑥ while (desugared `for` loops arrive in this shape too)
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                // ⑦ return only allowed inside a function or method
                if self.current_function == FunctionType::None {
                    self.report(LoxError::resolve(
                        keyword,
                        "'return' used outside of function",
                    ));
                }
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    /// Resolve a class declaration: its name, its superclass reference, and
    /// every method body inside one implicit scope that binds `this` (and
    /// `super` when a superclass exists).  Static methods resolve in the
    /// same scope; on the class object `this` is the class itself.
    fn resolve_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[Rc<FunctionDecl<'a>>],
    ) {
        self.declare(name);
        self.define(name);

        if let Some(sup) = superclass {
            if let Expr::Variable { name: sup_name, .. } = sup {
                if sup_name.lexeme == name.lexeme {
                    self.report(LoxError::resolve(
                        sup_name,
                        "A class cannot inherit from itself",
                    ));
                }
            }

            self.resolve_expr(sup);
        }

        self.class_stack.push(if superclass.is_some() {
            ClassType::Subclass
        } else {
            ClassType::Class
        });

        // One scope for the whole body: `this` and `super` live side by
        // side, mirroring the frame a bound method sees at runtime.
        self.begin_scope();
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert("this", true);
            if superclass.is_some() {
                scope.insert("super", true);
            }
        }

        for method in methods {
            self.resolve_function(method, FunctionType::Method);
        }

        self.end_scope();
        self.class_stack.pop();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr<'a>) {
        debug!("Resolving expr: {:?}", expr);
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }

            Expr::Binary { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::Comma { left, right } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }

            Expr::Variable { name, id } => {
                self.resolve_read(*id, name);
            }

            Expr::Assign { name, value, id } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::This { keyword, id } => {
                if self.class_stack.is_empty() {
                    self.report(LoxError::resolve(
                        keyword,
                        "Cannot use 'this' outside of a class",
                    ));
                    return;
                }

                // `this` is looked up like any other variable.
                self.resolve_local(*id, keyword);
            }

            Expr::Super { keyword, id, .. } => {
                match self.class_stack.last() {
                    None => {
                        self.report(LoxError::resolve(
                            keyword,
                            "Cannot use 'super' outside of a class",
                        ));
                        return;
                    }
                    Some(ClassType::Class) => {
                        self.report(LoxError::resolve(
                            keyword,
                            "Cannot use 'super' in a class with no superclass",
                        ));
                        return;
                    }
                    Some(ClassType::Subclass) => {}
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.
    fn resolve_function(&mut self, decl: &FunctionDecl<'a>, ftype: FunctionType) {
        let enclosing = self.current_function;
        self.current_function = ftype;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        for stmt in &decl.body {
            self.resolve_stmt(stmt);
        }
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme) {
                let e = LoxError::resolve(name, "Variable already declared in this scope");
                self.errors.push(e);
                return;
            }
            scope.insert(name.lexeme, false);
        }
    }

    fn define(&mut self, name: &Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme, true);
        }
    }

    /// Record a diagnostic and keep walking.
    fn report(&mut self, e: LoxError) {
        debug!("Resolve error recorded: {}", e);

        self.errors.push(e);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this variable occurrence as either:
    ///  - a local at depth `d` (innermost scope that declares it wins), or
    ///  - a global if not found in *any* scope.
    fn resolve_local(&mut self, id: ExprId, name: &Token<'a>) {
        // 1. check innermost → outermost, stop at the first hit
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.bindings.insert(id, depth);
                return;
            }
        }

        // 2. not found in any local scope ⇒ global
        debug!("Resolved '{}' as global", name.lexeme);
    }

    /// Resolve a variable *read*.
    ///
    /// A declared-but-undefined entry can only belong to the declaration
    /// whose initializer is being resolved right now, so the read skips
    /// it and binds to an enclosing declaration of the same name:
    /// `var a = 1; { var a = a + 1; }` reads the outer `a`.  With no
    /// enclosing declaration to bind to, the initializer refers to the
    /// very variable it is initializing, which is an error.
    fn resolve_read(&mut self, id: ExprId, name: &Token<'a>) {
        let mut in_flight: bool = false;

        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            match scope.get(name.lexeme) {
                Some(true) => {
                    debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                    self.bindings.insert(id, depth);
                    return;
                }
                Some(false) => in_flight = true,
                None => {}
            }
        }

        if in_flight {
            self.report(LoxError::resolve(
                name,
                "Cannot read local variable in its own initializer",
            ));
            return;
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}
