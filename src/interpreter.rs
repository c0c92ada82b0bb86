/*!
Tree-walking evaluator.

Executes a resolved program directly over the syntax tree. Environments
form a parent chain of `Rc<RefCell<_>>` frames; every local read and
write goes through the distance table produced by the resolver, and
anything without a recorded distance falls back to the globals frame.

## Control flow

`return` does not unwind through the error channel. Statement execution
yields a [`Flow`], and enclosing blocks and loops forward
[`Flow::Return`] upward until the active function call absorbs it.

## Complexity

| Operation          | Time                     | Space                  |
|--------------------|--------------------------|------------------------|
| Variable access    | O(d) frame hops          | O(1)                   |
| Function call      | O(body)                  | O(params) new frame    |
| Property access    | O(inheritance depth)     | O(1) bound method      |
| Program            | O(nodes executed)        | O(live closures)       |

## Logging

| Level   | What                                              |
|---------|---------------------------------------------------|
| `info`  | Interpreter start, class and function definitions |
| `debug` | Every statement and expression evaluation step    |
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::parser::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::resolver::Bindings;
use crate::token::{Token, TokenType};
use crate::value::{LoxClass, LoxFunction, LoxInstance, Value};

/// Outcome of executing a single statement.
///
/// `Return` carries the value of a `return` statement out through
/// nested blocks and loops until the active function call consumes it.
#[derive(Debug)]
pub enum Flow<'s> {
    Normal,
    Return(Value<'s>),
}

pub struct Interpreter<'s> {
    /// Outermost frame. Holds native functions and top-level definitions.
    globals: Rc<RefCell<Environment<'s>>>,

    /// Frame for the code currently executing.
    environment: Rc<RefCell<Environment<'s>>>,

    /// Resolved distances, keyed by expression id. Grows with each
    /// resolved chunk fed to [`Interpreter::interpret`].
    locals: Bindings,

    /// Sink for `print`. Stdout in the binary, a buffer in tests.
    out: Box<dyn Write>,
}

impl Default for Interpreter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> Interpreter<'s> {
    /// Creates an interpreter printing to stdout, with native functions
    /// such as `clock` already defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an interpreter that writes `print` output to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing interpreter");

        let globals: Rc<RefCell<Environment<'s>>> = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");
        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: native_clock,
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entry points
    // ─────────────────────────────────────────────────────────────────────

    /// Executes `statements` under the given resolution table.
    ///
    /// The table is merged into the distances already absorbed, so a
    /// REPL can feed one resolved chunk after another into the same
    /// interpreter. The first runtime fault aborts the chunk; state
    /// mutated before the fault remains visible.
    pub fn interpret(&mut self, statements: &[Stmt<'s>], bindings: Bindings) -> Result<()> {
        debug!(
            "Interpreting {} statements with {} resolved locals",
            statements.len(),
            bindings.len()
        );
        self.locals.extend(bindings);

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Evaluates a single expression to a value.
    ///
    /// Used for expression-only input, where no resolution table
    /// exists; identifier lookups fall back to the globals frame.
    pub fn evaluate_expression(&mut self, expr: &Expr<'s>) -> Result<Value<'s>> {
        self.evaluate(expr)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt<'s>) -> Result<Flow<'s>> {
        match stmt {
            Stmt::Expression(expr) => {
                debug!("Evaluating expression statement");
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                debug!("Evaluating print statement");
                let value: Value<'s> = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                // ① A declaration without an initializer leaves the
                //    variable unassigned, not nil. Reading it faults.
                let value: Value<'s> = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Unset,
                };

                debug!("Defining variable '{}' as {}", name.lexeme, value);
                self.environment.borrow_mut().define(name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                debug!("Entering block with {} statements", statements.len());
                let frame: Environment<'s> =
                    Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let tested: Value<'s> = self.evaluate(condition)?;

                if is_truthy(&tested) {
                    self.execute(then_branch)
                } else if let Some(alternative) = else_branch {
                    self.execute(alternative)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");

                loop {
                    let tested: Value<'s> = self.evaluate(condition)?;
                    if !is_truthy(&tested) {
                        break;
                    }

                    match self.execute(body)? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                // ① The closure captures the frame active at the
                //    declaration site, not the call site.
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                info!(
                    "Function '{}' defined with {} parameters",
                    declaration.name.lexeme,
                    declaration.params.len()
                );
                self.environment
                    .borrow_mut()
                    .define(declaration.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let result: Value<'s> = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", result);
                Ok(Flow::Return(result))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Runs `statements` inside `frame`, restoring the previous frame
    /// on every exit path, faulting included.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt<'s>],
        frame: Environment<'s>,
    ) -> Result<Flow<'s>> {
        let previous: Rc<RefCell<Environment<'s>>> =
            mem::replace(&mut self.environment, Rc::new(RefCell::new(frame)));

        let mut outcome: Result<Flow<'s>> = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;
        outcome
    }

    fn execute_class(
        &mut self,
        name: &Token<'_>,
        superclass: Option<&Expr<'s>>,
        methods: &[Rc<FunctionDecl<'s>>],
    ) -> Result<Flow<'s>> {
        // ① The superclass clause must evaluate to a class object.
        let parent: Option<Rc<LoxClass<'s>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    return Err(LoxError::runtime(name, "Superclass must be a class."));
                }
            },
            None => None,
        };

        // ② The name is declared before the methods are built, so the
        //    body can refer to the class being defined.
        self.environment
            .borrow_mut()
            .define(name.lexeme, Value::Nil);

        let mut instance_methods: HashMap<String, Rc<LoxFunction<'s>>> = HashMap::new();
        let mut static_methods: HashMap<String, Rc<LoxFunction<'s>>> = HashMap::new();

        for declaration in methods {
            let is_initializer = !declaration.is_static && declaration.name.lexeme == "init";
            let method = Rc::new(LoxFunction::new(
                Rc::clone(declaration),
                Rc::clone(&self.environment),
                is_initializer,
            ));

            if declaration.is_static {
                static_methods.insert(declaration.name.lexeme.to_string(), method);
            } else {
                instance_methods.insert(declaration.name.lexeme.to_string(), method);
            }
        }

        // ③ Static methods live on a metaclass the class itself is an
        //    instance of. Chaining each metaclass to the parent's makes
        //    statics inherit like ordinary methods.
        let metaclass = Rc::new(LoxClass::new(
            format!("{} metaclass", name.lexeme),
            parent.as_ref().and_then(|class| class.metaclass.clone()),
            static_methods,
            None,
        ));

        let class = Rc::new(LoxClass::new(
            name.lexeme.to_string(),
            parent,
            instance_methods,
            Some(metaclass),
        ));

        info!("Class '{}' defined", name.lexeme);
        self.environment
            .borrow_mut()
            .assign(name, Value::Class(class))?;
        Ok(Flow::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    fn evaluate(&mut self, expr: &Expr<'s>) -> Result<Value<'s>> {
        let value: Value<'s> = match expr {
            Expr::Literal(literal) => evaluate_literal(literal),

            Expr::Grouping(inner) => self.evaluate(inner)?,

            Expr::Unary { operator, right } => {
                let operand: Value<'s> = self.evaluate(right)?;
                self.evaluate_unary(operator, operand)?
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let lhs: Value<'s> = self.evaluate(left)?;
                let rhs: Value<'s> = self.evaluate(right)?;
                self.evaluate_binary(lhs, operator, rhs)?
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right)?,

            Expr::Comma { left, right } => {
                // Left side runs for its effects only.
                self.evaluate(left)?;
                self.evaluate(right)?
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                let tested: Value<'s> = self.evaluate(condition)?;

                if is_truthy(&tested) {
                    self.evaluate(then_branch)?
                } else {
                    self.evaluate(else_branch)?
                }
            }

            Expr::Variable { name, id } => self.lookup_variable(name, *id)?,

            Expr::Assign { name, value, id } => {
                debug!("Assigning to variable '{}'", name.lexeme);
                let assigned: Value<'s> = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(
                            &self.environment,
                            distance,
                            name,
                            assigned.clone(),
                        )?;
                    }
                    None => {
                        self.globals.borrow_mut().assign(name, assigned.clone())?;
                    }
                }

                assigned
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                debug!("Evaluating call with {} arguments", arguments.len());
                let target: Value<'s> = self.evaluate(callee)?;

                let mut evaluated: Vec<Value<'s>> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated.push(self.evaluate(argument)?);
                }

                self.invoke_callable(&target, paren, &evaluated)?
            }

            Expr::Get { object, name } => {
                let target: Value<'s> = self.evaluate(object)?;
                self.evaluate_property(target, name)?
            }

            Expr::Set {
                object,
                name,
                value,
            } => self.evaluate_set(object, name, value)?,

            Expr::This { keyword, id } => self.lookup_variable(keyword, *id)?,

            Expr::Super {
                keyword,
                method,
                id,
            } => self.evaluate_super(keyword, method, *id)?,
        };

        debug!("Expression evaluated to: {}", value);
        Ok(value)
    }

    fn evaluate_unary(&mut self, operator: &Token<'_>, operand: Value<'s>) -> Result<Value<'s>> {
        debug!("Evaluating unary operation: {}", operator.lexeme);

        match operator.token_type {
            TokenType::MINUS => match operand {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(
                    operator,
                    "Operand must be a number.",
                )),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&operand))),

            _ => Err(LoxError::runtime(
                operator,
                format!("Invalid unary operator '{}'", operator.lexeme),
            )),
        }
    }

    fn evaluate_binary(
        &mut self,
        lhs: Value<'s>,
        operator: &Token<'_>,
        rhs: Value<'s>,
    ) -> Result<Value<'s>> {
        debug!("Evaluating binary: {} {} {}", lhs, operator.lexeme, rhs);

        match operator.token_type {
            // ① `+` adds numbers, and concatenates as soon as either
            //    side is a string.
            TokenType::PLUS => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (a, b) if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) => {
                    Ok(Value::String(format!("{}{}", a, b)))
                }
                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be numbers or one of them must be a string",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = expect_numbers(lhs, operator, rhs)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = expect_numbers(lhs, operator, rhs)?;
                Ok(Value::Number(a * b))
            }

            // ② Division by zero is a fault, not an IEEE infinity.
            TokenType::SLASH => {
                let (a, b) = expect_numbers(lhs, operator, rhs)?;

                if b == 0.0 {
                    Err(LoxError::runtime(operator, "Division by zero."))
                } else {
                    Ok(Value::Number(a / b))
                }
            }

            TokenType::GREATER => {
                let (a, b) = expect_numbers(lhs, operator, rhs)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = expect_numbers(lhs, operator, rhs)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = expect_numbers(lhs, operator, rhs)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = expect_numbers(lhs, operator, rhs)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&lhs, &rhs))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&lhs, &rhs))),

            _ => Err(LoxError::runtime(
                operator,
                format!("Invalid binary operator '{}'", operator.lexeme),
            )),
        }
    }

    fn evaluate_logical(
        &mut self,
        left: &Expr<'s>,
        operator: &Token<'_>,
        right: &Expr<'s>,
    ) -> Result<Value<'s>> {
        let lhs: Value<'s> = self.evaluate(left)?;

        // Short-circuit: the left value itself is the result when it
        // already decides the operator.
        if operator.token_type == TokenType::OR {
            if is_truthy(&lhs) {
                return Ok(lhs);
            }
        } else if !is_truthy(&lhs) {
            return Ok(lhs);
        }

        self.evaluate(right)
    }

    fn lookup_variable(&self, name: &Token<'_>, id: ExprId) -> Result<Value<'s>> {
        debug!("Looking up variable '{}'", name.lexeme);

        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Calls
    // ─────────────────────────────────────────────────────────────────────

    fn invoke_callable(
        &mut self,
        callee: &Value<'s>,
        paren: &Token<'_>,
        arguments: &[Value<'s>],
    ) -> Result<Value<'s>> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                debug!("Calling native function '{}'", name);
                check_arity(*arity, arguments.len(), paren)?;

                func(arguments).map_err(|message| LoxError::runtime(paren, message))
            }

            Value::Function(function) => {
                debug!("Calling function '{}'", function.name());
                check_arity(function.arity(), arguments.len(), paren)?;

                self.call_function(function, arguments)
            }

            Value::Class(class) => {
                debug!("Constructing instance of '{}'", class.name);
                check_arity(class.arity(), arguments.len(), paren)?;

                self.construct(class, arguments)
            }

            _ => Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn call_function(
        &mut self,
        function: &LoxFunction<'s>,
        arguments: &[Value<'s>],
    ) -> Result<Value<'s>> {
        let mut frame: Environment<'s> =
            Environment::with_enclosing(Rc::clone(&function.closure));

        for (param, value) in function.declaration.params.iter().zip(arguments) {
            debug!("Binding parameter '{}' to {}", param.lexeme, value);
            frame.define(param.lexeme, value.clone());
        }

        let flow: Flow<'s> = self.execute_block(&function.declaration.body, frame)?;

        // ① An initializer yields its receiver however its body exits;
        //    an explicit return value is discarded.
        if function.is_initializer {
            if let Some(receiver) = Environment::read_at(&function.closure, 0, "this") {
                return Ok(receiver);
            }
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }

    fn construct(
        &mut self,
        class: &Rc<LoxClass<'s>>,
        arguments: &[Value<'s>],
    ) -> Result<Value<'s>> {
        let instance: Rc<LoxInstance<'s>> = Rc::new(LoxInstance::new(Rc::clone(class)));

        if let Some(initializer) =
            class.find_method(Value::Instance(Rc::clone(&instance)), "init")
        {
            self.call_function(&initializer, arguments)?;
        }

        Ok(Value::Instance(instance))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────

    fn evaluate_property(&mut self, target: Value<'s>, name: &Token<'_>) -> Result<Value<'s>> {
        match target {
            Value::Instance(instance) => {
                debug!("Reading property '{}' on instance", name.lexeme);

                // ① Fields shadow methods.
                if let Some(value) = instance.field(name.lexeme) {
                    return Ok(value);
                }

                let receiver = Value::Instance(Rc::clone(&instance));
                match instance.class.find_method(receiver, name.lexeme) {
                    Some(method) => self.finish_property(method),
                    None => Err(undefined_property(name)),
                }
            }

            // ② Property access on a class object reaches its own
            //    fields, then the static methods on its metaclass.
            Value::Class(class) => {
                debug!("Reading property '{}' on class '{}'", name.lexeme, class.name);

                let stored: Option<Value<'s>> = class.fields.borrow().get(name.lexeme).cloned();
                if let Some(value) = stored {
                    return Ok(value);
                }

                let receiver = Value::Class(Rc::clone(&class));
                let found = class
                    .metaclass
                    .as_ref()
                    .and_then(|meta| meta.find_method(receiver, name.lexeme));

                match found {
                    Some(method) => self.finish_property(method),
                    None => Err(undefined_property(name)),
                }
            }

            _ => Err(LoxError::runtime(
                name,
                "Only instances have properties.",
            )),
        }
    }

    /// A getter runs immediately on access; anything else surfaces as
    /// a bound method value.
    fn finish_property(&mut self, method: LoxFunction<'s>) -> Result<Value<'s>> {
        if method.is_getter() {
            debug!("Invoking getter '{}'", method.name());
            return self.call_function(&method, &[]);
        }

        Ok(Value::Function(Rc::new(method)))
    }

    fn evaluate_set(
        &mut self,
        object: &Expr<'s>,
        name: &Token<'_>,
        value: &Expr<'s>,
    ) -> Result<Value<'s>> {
        let target: Value<'s> = self.evaluate(object)?;

        match target {
            Value::Instance(instance) => {
                let assigned: Value<'s> = self.evaluate(value)?;
                debug!("Setting field '{}' to {}", name.lexeme, assigned);
                instance.set_field(name.lexeme, assigned.clone());
                Ok(assigned)
            }

            Value::Class(class) => {
                let assigned: Value<'s> = self.evaluate(value)?;
                debug!("Setting class field '{}' to {}", name.lexeme, assigned);
                class
                    .fields
                    .borrow_mut()
                    .insert(name.lexeme.to_string(), assigned.clone());
                Ok(assigned)
            }

            _ => Err(LoxError::runtime(name, "Only instances have fields.")),
        }
    }

    fn evaluate_super(
        &mut self,
        keyword: &Token<'_>,
        method: &Token<'_>,
        id: ExprId,
    ) -> Result<Value<'s>> {
        // The resolver recorded the distance to the frame binding both
        // 'super' and 'this' for this method body.
        let distance: usize = match self.locals.get(&id) {
            Some(&distance) => distance,
            None => {
                return Err(LoxError::runtime(
                    keyword,
                    "Undefined variable 'super'.",
                ));
            }
        };

        let superclass: Rc<LoxClass<'s>> =
            match Environment::get_at(&self.environment, distance, keyword)? {
                Value::Class(class) => class,
                _ => {
                    return Err(LoxError::runtime(
                        keyword,
                        "Superclass must be a class.",
                    ));
                }
            };

        let receiver: Value<'s> = match Environment::read_at(&self.environment, distance, "this") {
            Some(value) => value,
            None => {
                return Err(LoxError::runtime(
                    keyword,
                    "Undefined variable 'this'.",
                ));
            }
        };

        match superclass.find_method(receiver, method.lexeme) {
            Some(found) => self.finish_property(found),
            None => Err(undefined_property(method)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Free helpers
// ─────────────────────────────────────────────────────────────────────────────

fn native_clock<'s>(_args: &[Value<'s>]) -> std::result::Result<Value<'s>, String> {
    debug!("Calling native function 'clock'");

    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

fn evaluate_literal<'s>(literal: &LiteralValue) -> Value<'s> {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::String(s.clone()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

fn expect_numbers<'s>(
    lhs: Value<'s>,
    operator: &Token<'_>,
    rhs: Value<'s>,
) -> Result<(f64, f64)> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(LoxError::runtime(
            operator,
            "Operands must be numbers.",
        )),
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token<'_>) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        ))
    }
}

fn undefined_property(name: &Token<'_>) -> LoxError {
    LoxError::runtime(name, format!("Undefined property '{}'.", name.lexeme))
}

/// `false` and `nil` are falsey; every other value is truthy.
fn is_truthy(value: &Value<'_>) -> bool {
    let truthy: bool = match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    };

    debug!("Truthiness of {}: {}", value, truthy);
    truthy
}

/// Language-level equality. `nil` compares unequal to everything,
/// including another `nil`.
fn is_equal<'s>(left: &Value<'s>, right: &Value<'s>) -> bool {
    let equal: bool = match (left, right) {
        (Value::Nil, _) | (_, Value::Nil) => false,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        (
            Value::NativeFunction { name: a, .. },
            Value::NativeFunction { name: b, .. },
        ) => a == b,
        _ => false,
    };

    debug!("Equality of {} and {}: {}", left, right, equal);
    equal
}
