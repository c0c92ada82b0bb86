//! Runtime values and the class object model.
//!
//! Everything a Lox program can produce at runtime is a [`Value`].  Callables
//! are plain enum variants dispatched by matching, not trait objects: user
//! functions hold their declaration and captured closure, classes hold their
//! method table, and construction/binding live here while the call machinery
//! itself sits in the interpreter.
//!
//! Classes follow the metaclass model: a class is itself an instance of its
//! metaclass, which carries the `static` methods.  Property access on a
//! class therefore walks the exact same fields‑then‑methods path as access
//! on an ordinary instance, with the metaclass playing the class role.
//! Metaclasses inherit along the superclass chain, so static methods are
//! inherited too.
//!
//! The lifetime `'s` ties every runtime value back to the source buffer the
//! AST borrows from.

use crate::environment::Environment;
use crate::parser::FunctionDecl;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Host function exposed to Lox code.  Errors are plain strings; the
/// interpreter attaches line information at the call site.
pub type NativeFn<'s> = fn(&[Value<'s>]) -> Result<Value<'s>, String>;

#[derive(Debug, Clone)]
pub enum Value<'s> {
    NativeFunction {
        name: String,
        arity: usize,
        func: NativeFn<'s>,
    },
    Function(Rc<LoxFunction<'s>>),
    Class(Rc<LoxClass<'s>>),
    Instance(Rc<LoxInstance<'s>>),
    Number(f64),
    String(String),
    Bool(bool),
    Nil,

    /// Marker held by declared‑but‑unassigned variables.  Never observable
    /// by user code: reading it is intercepted as a runtime fault.
    Unset,
}

/// Host‑level equality.  `Nil == Nil` is `true` *here*; the language rule
/// that `nil` equals nothing (itself included) lives in the evaluator's
/// `is_equal`, keeping this impl useful for ordinary Rust comparisons.
impl<'s> PartialEq for Value<'s> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Unset, Value::Unset) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (
                Value::NativeFunction { name: a, .. },
                Value::NativeFunction { name: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl<'s> fmt::Display for Value<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::NativeFunction { name, .. } => write!(f, "<native fn {}>", name),

            Value::Function(fun) => write!(f, "<fn {}>", fun.name()),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{} instance", instance.class.name),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil | Value::Unset => write!(f, "nil"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User functions
// ─────────────────────────────────────────────────────────────────────────────

/// A user‑declared function or method: its declaration (shared with the AST)
/// plus the frame chain captured where the declaration executed.
pub struct LoxFunction<'s> {
    pub declaration: Rc<FunctionDecl<'s>>,
    pub closure: Rc<RefCell<Environment<'s>>>,

    /// `init` methods construct: they implicitly return their receiver.
    pub is_initializer: bool,
}

impl<'s> LoxFunction<'s> {
    pub fn new(
        declaration: Rc<FunctionDecl<'s>>,
        closure: Rc<RefCell<Environment<'s>>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Whether this method is a getter (invoked on property access).
    pub fn is_getter(&self) -> bool {
        self.declaration.is_getter
    }

    /// Produce the bound form of this method: a copy whose closure is a
    /// fresh frame defining `this` (and `super` when the defining class has
    /// a superclass), chained to the original closure.  The receiver can be
    /// an instance or, for static methods, the class object itself.  The
    /// original function is never mutated.
    pub fn bind(
        &self,
        receiver: Value<'s>,
        superclass: Option<Rc<LoxClass<'s>>>,
    ) -> LoxFunction<'s> {
        let mut frame: Environment<'s> = Environment::with_enclosing(Rc::clone(&self.closure));
        frame.define("this", receiver);

        if let Some(sup) = superclass {
            frame.define("super", Value::Class(sup));
        }

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(frame)),
            is_initializer: self.is_initializer,
        }
    }
}

impl<'s> fmt::Debug for LoxFunction<'s> {
    // Shallow on purpose: the closure chain can point back at this function.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes and metaclasses
// ─────────────────────────────────────────────────────────────────────────────

/// A class object.  Also serves as a metaclass: a metaclass is just a
/// `LoxClass` whose `metaclass` link is `None` and whose method table holds
/// the static methods.
pub struct LoxClass<'s> {
    pub name: String,
    pub superclass: Option<Rc<LoxClass<'s>>>,
    pub methods: HashMap<String, Rc<LoxFunction<'s>>>,

    /// The class this class is an instance of.  `None` for metaclasses.
    pub metaclass: Option<Rc<LoxClass<'s>>>,

    /// Fields set directly on the class object (`C.x = v`), mirroring how
    /// instances carry theirs.
    pub fields: RefCell<HashMap<String, Value<'s>>>,
}

impl<'s> LoxClass<'s> {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass<'s>>>,
        methods: HashMap<String, Rc<LoxFunction<'s>>>,
        metaclass: Option<Rc<LoxClass<'s>>>,
    ) -> Self {
        LoxClass {
            name,
            superclass,
            methods,
            metaclass,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Find `name` on this class or up the superclass chain and bind it to
    /// `receiver`.  Binding always uses the **defining** class's superclass,
    /// so `super` inside the method starts above where the method lives,
    /// not above the receiver's class.
    pub fn find_method(&self, receiver: Value<'s>, name: &str) -> Option<LoxFunction<'s>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.bind(receiver, self.superclass.clone()));
        }

        if let Some(sup) = &self.superclass {
            return sup.find_method(receiver, name);
        }

        None
    }

    /// Unbound lookup along the superclass chain.
    pub fn lookup(&self, name: &str) -> Option<&Rc<LoxFunction<'s>>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method);
        }

        match &self.superclass {
            Some(sup) => sup.lookup(name),
            None => None,
        }
    }

    /// Calling a class constructs an instance; its arity is the arity of
    /// the `init` found anywhere up the chain, or zero without one.
    pub fn arity(&self) -> usize {
        self.lookup("init").map_or(0, |init| init.arity())
    }
}

impl<'s> fmt::Debug for LoxClass<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instances
// ─────────────────────────────────────────────────────────────────────────────

/// An instance: a class pointer plus a mutable field map, populated lazily
/// by assignment.  Shared behind `Rc`, so identity is pointer identity.
pub struct LoxInstance<'s> {
    pub class: Rc<LoxClass<'s>>,
    fields: RefCell<HashMap<String, Value<'s>>>,
}

impl<'s> LoxInstance<'s> {
    pub fn new(class: Rc<LoxClass<'s>>) -> Self {
        LoxInstance {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Read an own field (shadows any method of the same name).
    pub fn field(&self, name: &str) -> Option<Value<'s>> {
        self.fields.borrow().get(name).cloned()
    }

    pub fn set_field(&self, name: &str, value: Value<'s>) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}

impl<'s> fmt::Debug for LoxInstance<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)
    }
}
