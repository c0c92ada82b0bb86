//! Scope frames for the runtime.
//!
//! An [`Environment`] is one frame: a name → value map plus a shared handle
//! to the enclosing frame.  Frames are linked through `Rc<RefCell<_>>` so a
//! closure and the block that created it can observe the same slots; a frame
//! stays alive for as long as anything (call, closure, nested frame) still
//! points at it.
//!
//! Declared‑but‑unassigned variables hold [`Value::Unset`]; reading one is a
//! runtime fault, which `get`/`get_at` intercept so the marker never leaks
//! into user‑visible values.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Environment<'s> {
    values: HashMap<String, Value<'s>>,
    enclosing: Option<Rc<RefCell<Environment<'s>>>>,
}

impl<'s> Environment<'s> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'s>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this frame, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value<'s>) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up through the frame chain.
    pub fn get(&self, name: &Token<'_>) -> Result<Value<'s>> {
        if let Some(value) = self.values.get(name.lexeme) {
            if matches!(value, Value::Unset) {
                return Err(LoxError::runtime(
                    name,
                    format!("Use of unassigned variable '{}'.", name.lexeme),
                ));
            }

            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Overwrite an existing binding, walking outward until one is found.
    pub fn assign(&mut self, name: &Token<'_>, value: Value<'s>) -> Result<()> {
        if self.values.contains_key(name.lexeme) {
            self.values.insert(name.lexeme.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    // ────────────────── distance‑indexed access (resolved locals) ──────────

    /// Read `name` from the frame exactly `distance` hops up the chain.
    pub fn get_at(
        env: &Rc<RefCell<Environment<'s>>>,
        distance: usize,
        name: &Token<'_>,
    ) -> Result<Value<'s>> {
        let frame = Self::ancestor(env, distance)
            .ok_or_else(|| Environment::undefined(name))?;

        let borrowed = frame.borrow();
        match borrowed.values.get(name.lexeme) {
            Some(Value::Unset) => Err(LoxError::runtime(
                name,
                format!("Use of unassigned variable '{}'.", name.lexeme),
            )),
            Some(value) => Ok(value.clone()),
            None => Err(Environment::undefined(name)),
        }
    }

    /// Assign into the frame exactly `distance` hops up the chain.
    pub fn assign_at(
        env: &Rc<RefCell<Environment<'s>>>,
        distance: usize,
        name: &Token<'_>,
        value: Value<'s>,
    ) -> Result<()> {
        let frame = Self::ancestor(env, distance)
            .ok_or_else(|| Environment::undefined(name))?;

        frame
            .borrow_mut()
            .values
            .insert(name.lexeme.to_string(), value);

        Ok(())
    }

    /// Raw read of an implicit binding (`this` / `super`) at a known
    /// distance.  No unassigned interception: these bindings are always
    /// populated when the frame is created.
    pub fn read_at(
        env: &Rc<RefCell<Environment<'s>>>,
        distance: usize,
        name: &str,
    ) -> Option<Value<'s>> {
        let frame = Self::ancestor(env, distance)?;
        let value = frame.borrow().values.get(name).cloned();

        value
    }

    /// Walk `distance` enclosing links, iteratively.  Returns `None` if the
    /// chain is shorter than the resolver believed.
    fn ancestor(
        env: &Rc<RefCell<Environment<'s>>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment<'s>>>> {
        let mut current: Rc<RefCell<Environment<'s>>> = Rc::clone(env);

        for _ in 0..distance {
            let next = current.borrow().enclosing.as_ref().map(Rc::clone);
            match next {
                Some(enclosing) => current = enclosing,
                None => return None,
            }
        }

        Some(current)
    }

    fn undefined(name: &Token<'_>) -> LoxError {
        LoxError::runtime(
            name,
            format!("Undefined variable '{}'.", name.lexeme),
        )
    }
}
