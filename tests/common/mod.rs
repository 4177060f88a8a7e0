#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sql_kit::prelude::*;

/// Everything the mock saw, shared between the test and the driver.
#[derive(Debug, Default)]
pub struct MockLog {
    pub opens: usize,
    pub kind_queries: usize,
    pub prepared: Vec<String>,
    pub executed: Vec<Vec<RowValues>>,
    pub attribute_sets: Vec<ConnectionAttributes>,
    pub current: ConnectionAttributes,
}

/// Canned behaviour for a mock connection.
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    pub rows: Vec<CustomDbRow>,
    pub affected: usize,
    pub fail_open: bool,
    pub fail_prepare: bool,
    pub fail_execute: bool,
    /// Refuse to put back anything other than the engine's attributes.
    pub fail_restore: bool,
    pub last_insert_id: String,
}

pub struct MockDriver {
    pub kind: DriverKind,
    pub script: MockScript,
    pub log: Arc<Mutex<MockLog>>,
}

impl MockDriver {
    pub fn new(kind: DriverKind, script: MockScript) -> Self {
        Self {
            kind,
            script,
            log: Arc::new(Mutex::new(MockLog::default())),
        }
    }

    /// A connection as if already opened by the driver.
    pub fn connection(&self) -> Box<dyn DriverConnection> {
        Box::new(MockConnection {
            kind: self.kind,
            script: self.script.clone(),
            log: Arc::clone(&self.log),
        })
    }
}

impl Driver for MockDriver {
    fn kind(&self) -> DriverKind {
        self.kind
    }

    fn open(&self, _dsn: &Dsn) -> Result<Box<dyn DriverConnection>, SqlKitError> {
        self.log.lock().unwrap().opens += 1;
        if self.script.fail_open {
            return Err(SqlKitError::connection(
                "connection refused",
                Some("2002".into()),
            ));
        }
        Ok(self.connection())
    }
}

struct MockConnection {
    kind: DriverKind,
    script: MockScript,
    log: Arc<Mutex<MockLog>>,
}

impl DriverConnection for MockConnection {
    fn driver_kind(&self) -> DriverKind {
        self.log.lock().unwrap().kind_queries += 1;
        self.kind
    }

    fn attributes(&self) -> ConnectionAttributes {
        self.log.lock().unwrap().current
    }

    fn set_attributes(&mut self, attributes: &ConnectionAttributes) -> Result<(), SqlKitError> {
        let mut log = self.log.lock().unwrap();
        if self.script.fail_restore && *attributes != ConnectionAttributes::desired() {
            return Err(SqlKitError::execution("attribute locked", None));
        }
        log.attribute_sets.push(*attributes);
        log.current = *attributes;
        Ok(())
    }

    fn prepare<'conn>(
        &'conn mut self,
        sql: &str,
    ) -> Result<Box<dyn DriverStatement + 'conn>, SqlKitError> {
        self.log.lock().unwrap().prepared.push(sql.to_string());
        if self.script.fail_prepare {
            return Err(SqlKitError::statement("syntax error", Some("42000".into())));
        }
        Ok(Box::new(MockStatement {
            script: self.script.clone(),
            log: Arc::clone(&self.log),
            pending: VecDeque::new(),
        }))
    }

    fn last_insert_id(&mut self, _sequence_name: Option<&str>) -> Result<String, SqlKitError> {
        Ok(self.script.last_insert_id.clone())
    }
}

struct MockStatement {
    script: MockScript,
    log: Arc<Mutex<MockLog>>,
    pending: VecDeque<CustomDbRow>,
}

impl DriverStatement for MockStatement {
    fn execute(&mut self, params: &[RowValues]) -> Result<usize, SqlKitError> {
        self.log.lock().unwrap().executed.push(params.to_vec());
        if self.script.fail_execute {
            return Err(SqlKitError::execution(
                "duplicate entry",
                Some("1062".into()),
            ));
        }
        self.pending = self.script.rows.iter().cloned().collect();
        Ok(self.script.affected)
    }

    fn fetch_one(&mut self) -> Result<Option<CustomDbRow>, SqlKitError> {
        Ok(self.pending.pop_front())
    }
}

/// A one-row fixture.
pub fn row(pairs: &[(&str, RowValues)]) -> CustomDbRow {
    let names = pairs.iter().map(|(name, _)| (*name).to_string()).collect();
    let values = pairs.iter().map(|(_, value)| value.clone()).collect();
    CustomDbRow::new(Arc::new(names), values)
}
