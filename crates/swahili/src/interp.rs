//! The tree-walking evaluator.
//!
//! One `visit` dispatches on the node variant; every sub-evaluation that
//! fails aborts the enclosing visitor immediately via `?`, preserving the
//! original error and position. Non-error control flow (`rudisha`,
//! `vunja`, `endelea`) travels in `Flow` and is caught by the nearest
//! call frame or loop.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
    builtins::{self, Builtin},
    context::{ANONYMOUS_NAME, ContextId, Contexts, GLOBAL_CONTEXT},
    error::{ErrorKind, RunResult, RuntimeError},
    io::Console,
    lexer::Span,
    limits::Limits,
    parse::{Node, UnaryOp},
    scope::{GLOBAL_SCOPE, ScopeId, Scopes},
    tracer::{EvalTracer, TraceEvent},
    value::{Function, Value, ValueKind},
};

/// Implicit binding holding the full argument list inside every call.
pub(crate) const ARGS_NAME: &str = "__hoja";

/// Evaluates a sub-expression; any flow other than a plain value is
/// propagated to the caller unchanged.
macro_rules! value_of {
    ($flow:expr) => {
        match $flow {
            Flow::Value(value) => value,
            other => return Ok(other),
        }
    };
}

/// What a visitor produced: a value, or a control-flow signal still looking
/// for the construct that consumes it.
#[derive(Debug)]
pub(crate) enum Flow {
    Value(Value),
    Return(Value, Span),
    Break(Span),
    Continue(Span),
}

/// The host endpoints threaded through evaluation.
pub(crate) struct Host<'h, C: Console> {
    pub console: &'h mut C,
    pub tracer: &'h mut dyn EvalTracer,
}

/// Evaluator state: the scope and context arenas plus limits. Persists
/// across program runs, which is what gives the REPL its memory.
#[derive(Debug)]
pub(crate) struct Interpreter {
    scopes: Scopes,
    contexts: Contexts,
    limits: Limits,
    call_depth: usize,
}

impl Interpreter {
    /// Creates an interpreter whose root symbol table is already populated
    /// with the builtins and sentinel constants.
    pub fn new(limits: Limits) -> Self {
        let mut scopes = Scopes::new();
        builtins::register(&mut scopes);
        let contexts = Contexts::new(GLOBAL_SCOPE);
        Self {
            scopes,
            contexts,
            limits,
            call_depth: 0,
        }
    }

    pub fn contexts(&self) -> &Contexts {
        &self.contexts
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut Scopes {
        &mut self.scopes
    }

    /// Runs a program in the global context. A `rudisha`/`vunja`/`endelea`
    /// escaping to the top is a runtime error at its own position.
    pub fn eval_program<C: Console>(
        &mut self,
        program: &Node,
        console: &mut C,
        tracer: &mut dyn EvalTracer,
    ) -> RunResult<Value> {
        let mut host = Host { console, tracer };
        match self.visit(program, GLOBAL_CONTEXT, &mut host)? {
            Flow::Value(value) => Ok(value),
            Flow::Return(_, span) => Err(RuntimeError::new(
                ErrorKind::IllegalOperation,
                "'rudisha' outside a function",
                span,
                GLOBAL_CONTEXT,
            )),
            Flow::Break(span) => Err(RuntimeError::new(
                ErrorKind::IllegalOperation,
                "'vunja' outside a loop",
                span,
                GLOBAL_CONTEXT,
            )),
            Flow::Continue(span) => Err(RuntimeError::new(
                ErrorKind::IllegalOperation,
                "'endelea' outside a loop",
                span,
                GLOBAL_CONTEXT,
            )),
        }
    }

    fn scope_of(&self, context: ContextId) -> ScopeId {
        self.contexts.get(context).scope
    }

    fn visit<C: Console>(&mut self, node: &Node, context: ContextId, host: &mut Host<'_, C>) -> RunResult<Flow> {
        match node {
            Node::Number { value, span } => Ok(Flow::Value(Value::new(
                ValueKind::Number(*value),
                Some(*span),
                context,
            ))),
            Node::Str { value, span } => Ok(Flow::Value(Value::new(
                ValueKind::Str(Rc::clone(value)),
                Some(*span),
                context,
            ))),
            Node::List { elements, span } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(value_of!(self.visit(element, context, host)?));
                }
                Ok(Flow::Value(Value::new(
                    ValueKind::List(Rc::new(values)),
                    Some(*span),
                    context,
                )))
            }
            Node::Block { statements, span } => {
                let mut last = Value::new(ValueKind::Null, Some(*span), context);
                for statement in statements {
                    last = value_of!(self.visit(statement, context, host)?);
                }
                Ok(Flow::Value(last))
            }
            Node::VarAccess { name, span } => {
                let scope = self.scope_of(context);
                match self.scopes.get(scope, name) {
                    // a fresh copy stamped with the access site, so later
                    // errors point at the usage rather than the definition
                    Some(value) => Ok(Flow::Value(value.clone().with_span(*span).with_context(context))),
                    None => Err(RuntimeError::new(
                        ErrorKind::UnboundName,
                        format!("'{name}' is not defined"),
                        *span,
                        context,
                    )),
                }
            }
            Node::VarAssign { name, value, .. } => {
                let value = value_of!(self.visit(value, context, host)?);
                let scope = self.scope_of(context);
                self.scopes.set(scope, Rc::clone(name), value.clone());
                Ok(Flow::Value(value))
            }
            Node::BinOp { op, lhs, rhs, .. } => {
                // strictly left to right, and both sides always evaluate:
                // && and || do not short-circuit
                let lhs = value_of!(self.visit(lhs, context, host)?);
                let rhs = value_of!(self.visit(rhs, context, host)?);
                Ok(Flow::Value(lhs.bin_op(*op, &rhs)?))
            }
            Node::UnaryOp { op, operand, .. } => {
                let operand = value_of!(self.visit(operand, context, host)?);
                let value = match op {
                    UnaryOp::Neg => operand.negated()?,
                    UnaryOp::Not => operand.notted(),
                };
                Ok(Flow::Value(value))
            }
            Node::If { cases, otherwise, span } => {
                for case in cases {
                    let condition = value_of!(self.visit(&case.condition, context, host)?);
                    if condition.is_true() {
                        return self.visit(&case.body, context, host);
                    }
                }
                match otherwise {
                    Some(body) => self.visit(body, context, host),
                    None => Ok(Flow::Value(Value::new(ValueKind::Null, Some(*span), context))),
                }
            }
            Node::For {
                var,
                start,
                end,
                step,
                body,
                span,
            } => self.visit_for(var, start, end, step.as_deref(), body, *span, context, host),
            Node::While { condition, body, span } => self.visit_while(condition, body, *span, context, host),
            Node::FuncDef { name, params, body, span } => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    defining_context: context,
                };
                let value = Value::new(ValueKind::Function(Rc::new(function)), Some(*span), context);
                if let Some(name) = name {
                    let scope = self.scope_of(context);
                    self.scopes.set(scope, Rc::clone(name), value.clone());
                }
                Ok(Flow::Value(value))
            }
            Node::Call { callee, args, span } => {
                let callee = value_of!(self.visit(callee, context, host)?);
                let callee = callee.with_span(*span).with_context(context);
                let mut values: SmallVec<[Value; 8]> = SmallVec::new();
                for arg in args {
                    values.push(value_of!(self.visit(arg, context, host)?));
                }
                let result = self.execute(&callee, values, *span, context, host)?;
                Ok(Flow::Value(result.with_span(*span).with_context(context)))
            }
            Node::Return { value, span } => {
                let value = match value {
                    Some(value) => value_of!(self.visit(value, context, host)?),
                    None => Value::new(ValueKind::Null, Some(*span), context),
                };
                Ok(Flow::Return(value, *span))
            }
            Node::Break { span } => Ok(Flow::Break(*span)),
            Node::Continue { span } => Ok(Flow::Continue(*span)),
        }
    }

    #[expect(clippy::too_many_arguments, reason = "loop pieces travel together")]
    fn visit_for<C: Console>(
        &mut self,
        var: &Rc<str>,
        start: &Node,
        end: &Node,
        step: Option<&Node>,
        body: &Node,
        span: Span,
        context: ContextId,
        host: &mut Host<'_, C>,
    ) -> RunResult<Flow> {
        let start_value = value_of!(self.visit(start, context, host)?);
        let start_number = self.expect_number(&start_value, "Loop start", context)?;
        let end_value = value_of!(self.visit(end, context, host)?);
        let end_number = self.expect_number(&end_value, "Loop limit", context)?;
        let step_number = match step {
            Some(step) => {
                let step_value = value_of!(self.visit(step, context, host)?);
                self.expect_number(&step_value, "Loop step", context)?
            }
            None => 1.0,
        };

        let scope = self.scope_of(context);
        let mut collected = Vec::new();
        let mut current = start_number;
        let mut iterations = 0usize;
        loop {
            let proceed = if step_number >= 0.0 {
                current < end_number
            } else {
                current > end_number
            };
            if !proceed {
                break;
            }
            self.check_loop_bound(iterations, span, context)?;
            host.tracer.record(TraceEvent::LoopIteration { iteration: iterations });
            iterations += 1;

            self.scopes.set(
                scope,
                Rc::clone(var),
                Value::new(ValueKind::Number(current), Some(span), context),
            );
            match self.visit(body, context, host)? {
                Flow::Value(value) => collected.push(value),
                Flow::Continue(_) => {}
                Flow::Break(_) => break,
                flow @ Flow::Return(..) => return Ok(flow),
            }
            current += step_number;
        }
        Ok(Flow::Value(Value::new(
            ValueKind::List(Rc::new(collected)),
            Some(span),
            context,
        )))
    }

    fn visit_while<C: Console>(
        &mut self,
        condition: &Node,
        body: &Node,
        span: Span,
        context: ContextId,
        host: &mut Host<'_, C>,
    ) -> RunResult<Flow> {
        let mut collected = Vec::new();
        let mut iterations = 0usize;
        loop {
            let condition = value_of!(self.visit(condition, context, host)?);
            if !condition.is_true() {
                break;
            }
            self.check_loop_bound(iterations, span, context)?;
            host.tracer.record(TraceEvent::LoopIteration { iteration: iterations });
            iterations += 1;

            match self.visit(body, context, host)? {
                Flow::Value(value) => collected.push(value),
                Flow::Continue(_) => {}
                Flow::Break(_) => break,
                flow @ Flow::Return(..) => return Ok(flow),
            }
        }
        Ok(Flow::Value(Value::new(
            ValueKind::List(Rc::new(collected)),
            Some(span),
            context,
        )))
    }

    /// Invokes a callable with already-evaluated arguments.
    fn execute<C: Console>(
        &mut self,
        callee: &Value,
        args: SmallVec<[Value; 8]>,
        call_span: Span,
        caller: ContextId,
        host: &mut Host<'_, C>,
    ) -> RunResult<Value> {
        match &callee.kind {
            ValueKind::Function(function) => self.call_function(function, args, call_span, caller, host),
            ValueKind::Builtin(builtin) => self.call_builtin(*builtin, args, call_span, caller, host),
            _ => Err(RuntimeError::new(
                ErrorKind::IllegalOperation,
                "Value is not callable",
                call_span,
                caller,
            )),
        }
    }

    fn call_function<C: Console>(
        &mut self,
        function: &Rc<Function>,
        args: SmallVec<[Value; 8]>,
        call_span: Span,
        caller: ContextId,
        host: &mut Host<'_, C>,
    ) -> RunResult<Value> {
        self.check_call_depth(call_span, caller)?;
        self.check_arity(function.display_name(), function.params.len(), args.len(), call_span, caller)?;

        // the symbol table chains to the *defining* scope, the context to
        // the *caller*: scope chain and call chain are independent
        let defining_scope = self.scope_of(function.defining_context);
        let scope = self.scopes.push(defining_scope);
        let display: Rc<str> = match &function.name {
            Some(name) => Rc::clone(name),
            None => ANONYMOUS_NAME.into(),
        };
        let execution = self.contexts.push(Rc::clone(&display), caller, call_span.start, scope);

        let args: Vec<Value> = args.into_iter().map(|arg| arg.with_context(execution)).collect();
        let all_args = Value::new(ValueKind::List(Rc::new(args.clone())), Some(call_span), execution);
        self.scopes.set(scope, ARGS_NAME.into(), all_args);
        for (param, arg) in function.params.iter().zip(args) {
            self.scopes.set(scope, Rc::clone(param), arg);
        }

        host.tracer.record(TraceEvent::CallEnter {
            name: display.to_string(),
            depth: self.call_depth,
        });
        self.call_depth += 1;
        let result = self.visit(&function.body, execution, host);
        self.call_depth -= 1;
        host.tracer.record(TraceEvent::CallExit {
            name: display.to_string(),
        });

        match result? {
            Flow::Value(value) | Flow::Return(value, _) => Ok(value),
            Flow::Break(span) => Err(RuntimeError::new(
                ErrorKind::IllegalOperation,
                "'vunja' outside a loop",
                span,
                execution,
            )),
            Flow::Continue(span) => Err(RuntimeError::new(
                ErrorKind::IllegalOperation,
                "'endelea' outside a loop",
                span,
                execution,
            )),
        }
    }

    fn call_builtin<C: Console>(
        &mut self,
        builtin: Builtin,
        args: SmallVec<[Value; 8]>,
        call_span: Span,
        caller: ContextId,
        host: &mut Host<'_, C>,
    ) -> RunResult<Value> {
        self.check_call_depth(call_span, caller)?;
        let params = builtin.params();
        self.check_arity(builtin.name(), params.len(), args.len(), call_span, caller)?;

        // builtins have no defining scope of their own; they chain to the
        // global symbol table
        let scope = self.scopes.push(GLOBAL_SCOPE);
        let execution = self.contexts.push(builtin.name().into(), caller, call_span.start, scope);

        let args: Vec<Value> = args.into_iter().map(|arg| arg.with_context(execution)).collect();
        let all_args = Value::new(ValueKind::List(Rc::new(args.clone())), Some(call_span), execution);
        self.scopes.set(scope, ARGS_NAME.into(), all_args);
        for (param, arg) in params.iter().zip(args.iter()) {
            self.scopes.set(scope, (*param).into(), arg.clone());
        }

        host.tracer.record(TraceEvent::CallEnter {
            name: builtin.name().to_owned(),
            depth: self.call_depth,
        });
        self.call_depth += 1;
        let result = builtin.call(&args, call_span, execution, host.console);
        self.call_depth -= 1;
        host.tracer.record(TraceEvent::CallExit {
            name: builtin.name().to_owned(),
        });
        result
    }

    fn check_arity(
        &self,
        name: &str,
        expected: usize,
        given: usize,
        span: Span,
        context: ContextId,
    ) -> RunResult<()> {
        if given > expected {
            Err(RuntimeError::new(
                ErrorKind::ArityMismatch,
                format!("{} too many args passed into '{name}'", given - expected),
                span,
                context,
            ))
        } else if given < expected {
            Err(RuntimeError::new(
                ErrorKind::ArityMismatch,
                format!("{} too few args passed into '{name}'", expected - given),
                span,
                context,
            ))
        } else {
            Ok(())
        }
    }

    fn check_call_depth(&self, span: Span, context: ContextId) -> RunResult<()> {
        if self.call_depth >= self.limits.max_call_depth {
            Err(RuntimeError::new(
                ErrorKind::CallStackExceeded,
                "Max call stack size exceeded",
                span,
                context,
            ))
        } else {
            Ok(())
        }
    }

    /// The loop bound is per activation: each loop entry counts from zero.
    fn check_loop_bound(&self, iterations: usize, span: Span, context: ContextId) -> RunResult<()> {
        if iterations >= self.limits.max_loop_iterations {
            Err(RuntimeError::new(
                ErrorKind::CallStackExceeded,
                "Max call stack size exceeded",
                span,
                context,
            ))
        } else {
            Ok(())
        }
    }

    fn expect_number(&self, value: &Value, what: &str, context: ContextId) -> RunResult<f64> {
        match value.kind {
            ValueKind::Number(number) => Ok(number),
            _ => Err(RuntimeError::new(
                ErrorKind::IllegalOperation,
                format!("{what} must be a number"),
                value.span.unwrap_or_else(|| {
                    let origin = crate::lexer::Pos::start();
                    Span::new(origin, origin)
                }),
                context,
            )),
        }
    }
}
