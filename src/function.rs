use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A user-defined callable: the shared declaration plus the environment
/// captured when the declaration executed.
pub struct LoxFunction {
    decl: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        decl: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            decl,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }

    /// Produce a copy whose closure has `this` bound one frame outside the
    /// body; property access goes through here so methods see their receiver.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let environment = Rc::new(RefCell::new(Environment::with_enclosing(
            self.closure.clone(),
        )));
        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));

        LoxFunction {
            decl: self.decl.clone(),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }

    /// Invoke with already-evaluated arguments.  The caller checks arity.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        let environment = Rc::new(RefCell::new(Environment::with_enclosing(
            self.closure.clone(),
        )));

        for (param, argument) in self.decl.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        let returned = interpreter.execute_block(&self.decl.body, environment)?;

        // Initializers yield the receiver no matter how the body exits.
        if self.is_initializer {
            return Environment::get_at(&self.closure, 0, "this").ok_or_else(|| {
                LoxError::runtime(self.decl.name.line, "Initializer lost its receiver.")
            });
        }

        Ok(returned.unwrap_or(Value::Nil))
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The closure chain can reach back to this function; print a summary
        // instead of recursing through it.
        f.debug_struct("LoxFunction")
            .field("name", &self.decl.name.lexeme)
            .field("arity", &self.decl.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

/// `clock()`: seconds since the Unix epoch as a Lox number.
pub fn clock_native(_args: &[Value]) -> Result<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LoxError::runtime(0, format!("Clock error: {}", e)))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
