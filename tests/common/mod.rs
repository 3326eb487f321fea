//! Shared scripted mock driver for the integration tests.
//!
//! Records every call made through the driver capability and replays
//! pre-seeded outcomes, so tests can assert both the synthesized SQL and the
//! facade's connection/transaction discipline.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tabledal::{
    Command, Driver, DriverConnection, DriverParameter, Result, ResultSet, Value, WriteOutcome,
};

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open,
    Begin,
    Commit,
    Rollback,
    Close,
    Execute {
        sql: String,
        parameters: Vec<(String, Value)>,
    },
    Query {
        sql: String,
        parameters: Vec<(String, Value)>,
    },
    QueryScalar {
        sql: String,
    },
}

/// Shared recorder plus scripted outcomes.
#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<Call>,
    pub write_outcomes: VecDeque<WriteOutcome>,
    pub result_sets: VecDeque<ResultSet>,
    pub scalars: VecDeque<Value>,
}

impl MockState {
    /// SQL texts of all executed write commands, in order.
    pub fn executed_sql(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute { sql, .. } => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of calls of a given shape.
    pub fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| matcher(c)).count()
    }
}

pub struct MockDriver {
    state: Rc<RefCell<MockState>>,
}

struct MockConnection {
    state: Rc<RefCell<MockState>>,
}

/// Build a mock driver plus the shared state handle for assertions.
pub fn mock_driver() -> (Box<dyn Driver>, Rc<RefCell<MockState>>) {
    let state = Rc::new(RefCell::new(MockState::default()));
    (
        Box::new(MockDriver {
            state: Rc::clone(&state),
        }),
        state,
    )
}

fn parameter_pairs(parameters: &[DriverParameter]) -> Vec<(String, Value)> {
    parameters
        .iter()
        .map(|p| (p.name.clone(), p.value.clone()))
        .collect()
}

impl Driver for MockDriver {
    fn open(&self, _connection_string: &str) -> Result<Box<dyn DriverConnection>> {
        self.state.borrow_mut().calls.push(Call::Open);
        Ok(Box::new(MockConnection {
            state: Rc::clone(&self.state),
        }))
    }
}

impl DriverConnection for MockConnection {
    fn begin(&mut self) -> Result<()> {
        self.state.borrow_mut().calls.push(Call::Begin);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.state.borrow_mut().calls.push(Call::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.state.borrow_mut().calls.push(Call::Rollback);
        Ok(())
    }

    fn execute(
        &mut self,
        command: &Command,
        parameters: &[DriverParameter],
    ) -> Result<WriteOutcome> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Execute {
            sql: command.text.clone(),
            parameters: parameter_pairs(parameters),
        });
        Ok(state.write_outcomes.pop_front().unwrap_or(WriteOutcome {
            affected: 1,
            refreshed: None,
        }))
    }

    fn query(&mut self, command: &Command, parameters: &[DriverParameter]) -> Result<ResultSet> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Query {
            sql: command.text.clone(),
            parameters: parameter_pairs(parameters),
        });
        Ok(state.result_sets.pop_front().unwrap_or_default())
    }

    fn query_scalar(
        &mut self,
        command: &Command,
        _parameters: &[DriverParameter],
    ) -> Result<Value> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::QueryScalar {
            sql: command.text.clone(),
        });
        Ok(state.scalars.pop_front().unwrap_or(Value::Null))
    }

    fn close(&mut self) -> Result<()> {
        self.state.borrow_mut().calls.push(Call::Close);
        Ok(())
    }
}
