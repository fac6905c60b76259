//! Tree-walking executor for parsed templates.

use super::funcs::{self, display, is_truthy};
use super::parser::{Command, Node, Operand, Pipeline};
use serde_json::Value;

type ExecResult<T> = Result<T, (usize, String)>;

struct State {
    /// Variable stack; `$` sits at the bottom.
    vars: Vec<(String, Value)>,
    out: String,
    line: usize,
}

/// Execute a node list against `data`.
pub(super) fn execute(nodes: &[Node], data: &Value) -> ExecResult<String> {
    let mut state = State {
        vars: vec![("$".to_string(), data.clone())],
        out: String::new(),
        line: 1,
    };
    state.walk(data, nodes)?;
    Ok(state.out)
}

impl State {
    fn error<T>(&self, message: impl Into<String>) -> ExecResult<T> {
        Err((self.line, message.into()))
    }

    fn walk(&mut self, dot: &Value, nodes: &[Node]) -> ExecResult<()> {
        for node in nodes {
            self.walk_node(dot, node)?;
        }
        Ok(())
    }

    fn walk_node(&mut self, dot: &Value, node: &Node) -> ExecResult<()> {
        match node {
            Node::Text(text) => self.out.push_str(text),
            Node::Action { line, pipe } => {
                self.line = *line;
                let value = self.eval_pipeline(dot, pipe, true)?;
                if pipe.decl.is_empty() {
                    self.out.push_str(&display(&value));
                }
            }
            Node::If {
                line,
                pipe,
                list,
                else_list,
            } => {
                self.line = *line;
                let mark = self.vars.len();
                let value = self.eval_pipeline(dot, pipe, true)?;
                if is_truthy(&value) {
                    self.walk(dot, list)?;
                } else if let Some(else_list) = else_list {
                    self.walk(dot, else_list)?;
                }
                self.vars.truncate(mark);
            }
            Node::With {
                line,
                pipe,
                list,
                else_list,
            } => {
                self.line = *line;
                let mark = self.vars.len();
                let value = self.eval_pipeline(dot, pipe, true)?;
                if is_truthy(&value) {
                    self.walk(&value, list)?;
                } else if let Some(else_list) = else_list {
                    self.walk(dot, else_list)?;
                }
                self.vars.truncate(mark);
            }
            Node::Range {
                line,
                pipe,
                list,
                else_list,
            } => {
                self.line = *line;
                self.walk_range(dot, pipe, list, else_list.as_deref())?;
            }
        }
        Ok(())
    }

    fn walk_range(
        &mut self,
        dot: &Value,
        pipe: &Pipeline,
        list: &[Node],
        else_list: Option<&[Node]>,
    ) -> ExecResult<()> {
        let value = self.eval_pipeline(dot, pipe, false)?;
        let items: Vec<(Value, Value)> = match &value {
            Value::Array(elems) => elems
                .iter()
                .enumerate()
                .map(|(i, elem)| (Value::from(i), elem.clone()))
                .collect(),
            Value::Object(map) => map
                .iter()
                .map(|(key, elem)| (Value::String(key.clone()), elem.clone()))
                .collect(),
            Value::Number(n) => match n.as_i64() {
                Some(count) if count >= 0 => (0..count)
                    .map(|i| (Value::from(i), Value::from(i)))
                    .collect(),
                _ => return self.error(format!("range can't iterate over {}", n)),
            },
            Value::Null => Vec::new(),
            other => return self.error(format!("range can't iterate over {}", display(other))),
        };

        if items.is_empty() {
            if let Some(else_list) = else_list {
                self.walk(dot, else_list)?;
            }
            return Ok(());
        }

        for (key, elem) in items {
            let mark = self.vars.len();
            match pipe.decl.as_slice() {
                [] => {}
                [value_var] => self.vars.push((value_var.clone(), elem.clone())),
                [key_var, value_var, ..] => {
                    self.vars.push((key_var.clone(), key));
                    self.vars.push((value_var.clone(), elem.clone()));
                }
            }
            self.walk(&elem, list)?;
            self.vars.truncate(mark);
        }
        Ok(())
    }

    fn eval_pipeline(&mut self, dot: &Value, pipe: &Pipeline, bind: bool) -> ExecResult<Value> {
        let mut value: Option<Value> = None;
        for cmd in &pipe.cmds {
            value = Some(self.eval_command(dot, cmd, value.take())?);
        }
        let value = value.unwrap_or(Value::Null);

        if bind {
            for name in &pipe.decl {
                if pipe.is_assign {
                    self.assign(name, value.clone())?;
                } else {
                    self.vars.push((name.clone(), value.clone()));
                }
            }
        }
        Ok(value)
    }

    fn assign(&mut self, name: &str, value: Value) -> ExecResult<()> {
        match self.vars.iter_mut().rev().find(|(n, _)| n == name) {
            Some(slot) => {
                slot.1 = value;
                Ok(())
            }
            None => self.error(format!("undefined variable: {}", name)),
        }
    }

    fn eval_command(
        &mut self,
        dot: &Value,
        cmd: &Command,
        piped: Option<Value>,
    ) -> ExecResult<Value> {
        match &cmd.args[0] {
            Operand::Function(name) => {
                let mut args = Vec::with_capacity(cmd.args.len());
                for arg in &cmd.args[1..] {
                    args.push(self.eval_operand(dot, arg)?);
                }
                if let Some(piped) = piped {
                    args.push(piped);
                }
                funcs::call(name, &args).map_err(|message| (self.line, message))
            }
            operand => {
                if piped.is_some() {
                    return self.error("can't give argument to non-function");
                }
                self.eval_operand(dot, operand)
            }
        }
    }

    fn eval_operand(&mut self, dot: &Value, operand: &Operand) -> ExecResult<Value> {
        match operand {
            Operand::Dot => Ok(dot.clone()),
            Operand::Field(chain) => self.lookup_chain(dot, chain),
            Operand::Variable(name, chain) => {
                let value = match self.vars.iter().rev().find(|(n, _)| n == name) {
                    Some((_, value)) => value.clone(),
                    None => return self.error(format!("undefined variable: {}", name)),
                };
                self.lookup_chain(&value, chain)
            }
            Operand::Function(name) => {
                funcs::call(name, &[]).map_err(|message| (self.line, message))
            }
            Operand::Str(s) => Ok(Value::String(s.clone())),
            Operand::Int(n) => Ok(Value::from(*n)),
            Operand::Float(n) => Ok(serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null)),
            Operand::Bool(b) => Ok(Value::Bool(*b)),
            Operand::Nil => Ok(Value::Null),
            Operand::Pipe(pipe) => self.eval_pipeline(dot, pipe, true),
        }
    }

    fn lookup_chain(&self, value: &Value, chain: &[String]) -> ExecResult<Value> {
        let mut current = value.clone();
        for field in chain {
            current = match current {
                Value::Object(mut map) => map.remove(field).unwrap_or(Value::Null),
                Value::Null => Value::Null,
                other => {
                    return self.error(format!(
                        "can't evaluate field {} in type {}",
                        field,
                        funcs::type_name(&other)
                    ));
                }
            };
        }
        Ok(current)
    }
}
