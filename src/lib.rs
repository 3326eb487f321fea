//! tabledal - configuration-driven SQL data access with optimistic
//! concurrency control.
//!
//! The crate synthesizes SQL commands from an in-memory tabular schema and
//! dispatches them against a relational database through a driver supplied by
//! the embedding application. It supports optimistic locking with NULL-safe
//! original-value comparison, refresh-after-write re-selects, and an ambient
//! single-slot transaction scope.
//!
//! # Architecture
//!
//! ```text
//! accessor (facade: fill / update / execute / transactions)
//!    │
//!    ├─── command      (SELECT/INSERT/UPDATE/DELETE synthesis)
//!    │       ├─── dialect   (per-product rules as data)
//!    │       └─── locking   (NULL-safe optimistic predicate)
//!    ├─── transaction  (ambient single-slot scope)
//!    ├─── statement    (registry/inline statements, parameter lists)
//!    ├─── config       (YAML configuration + statement registry)
//!    └─── driver       (capability traits implemented per product)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use tabledal::{
//!     Column, Config, DataAccessor, DatabaseType, FillSource, Locking,
//!     ParameterList, SchemaHandling, SemanticType, Table, Value,
//! };
//!
//! # fn driver() -> Box<dyn tabledal::Driver> { unimplemented!() }
//! let config = Config::new("server=localhost", DatabaseType::SqlServer);
//! let accessor = DataAccessor::new(config, driver());
//!
//! let mut employees = Table::with_columns(
//!     "Employee",
//!     vec![
//!         Column::auto_key("Id", SemanticType::Int32),
//!         Column::new("Name", SemanticType::String),
//!         Column::new("Salary", SemanticType::Double),
//!     ],
//! );
//! employees.add_row(vec![
//!     ("Name", Value::from("Ann")),
//!     ("Salary", Value::Double(52000.0)),
//! ]);
//! accessor.update(&mut employees, Locking::Optimistic, false)?;
//! # Ok::<(), tabledal::Error>(())
//! ```

pub mod accessor;
pub mod command;
pub mod config;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod locking;
pub mod statement;
pub mod table;
pub mod transaction;
pub mod types;

// Re-exports for convenience
pub use accessor::{DataAccessor, FillSource, Locking, SchemaHandling};
pub use command::{BoundParameter, Command, CommandSynthesizer, ParameterSource, RowVersion};
pub use config::{Config, StatementDefinition};
pub use dialect::{DatabaseType, DialectProvider, QuoteStyle};
pub use driver::{Driver, DriverConnection, DriverParameter, ResultSet, WriteOutcome};
pub use error::{Error, Result};
pub use locking::{build_predicate, LockPredicate};
pub use statement::{
    DeclaredParameter, Parameter, ParameterList, ResolvedStatement, Statement, StatementKind,
};
pub use table::{Column, Row, RowState, Table};
pub use transaction::{TransactionContext, TransactionScope};
pub use types::{SemanticType, Value};
