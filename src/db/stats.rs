//! Pass/fail statistics grouped by device type.
//!
//! The WHERE clause is assembled from a fixed set of predicates; filter
//! values only ever travel as bound parameters.

use sea_orm::{DatabaseBackend, FromQueryResult, Statement, Value};

use crate::error::{AppError, AppResult};
use crate::models::AggregationRow;

use super::DbPool;

/// A structural condition on the aggregated record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatPredicate {
    /// Only records entered by this operator.
    OperatorEquals(String),
}

impl StatPredicate {
    fn column(&self) -> &'static str {
        match self {
            Self::OperatorEquals(_) => "operator",
        }
    }

    fn value(&self) -> Value {
        match self {
            Self::OperatorEquals(operator) => operator.clone().into(),
        }
    }
}

/// Filter applied before grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatFilter {
    predicates: Vec<StatPredicate>,
}

impl StatFilter {
    /// Aggregate over every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one operator. A missing or empty operator means no filter.
    pub fn for_operator(operator: Option<&str>) -> Self {
        Self::all().with_operator(operator)
    }

    pub fn with_operator(mut self, operator: Option<&str>) -> Self {
        if let Some(operator) = operator.filter(|op| !op.is_empty()) {
            self.predicates
                .push(StatPredicate::OperatorEquals(operator.to_string()));
        }
        self
    }

    pub fn predicates(&self) -> &[StatPredicate] {
        &self.predicates
    }

    /// Build the aggregation statement for `backend`.
    pub fn build(&self, backend: DatabaseBackend) -> Statement {
        let mut conditions = Vec::with_capacity(self.predicates.len());
        let mut values = Vec::with_capacity(self.predicates.len());

        for predicate in &self.predicates {
            conditions.push(format!("{} = ?", predicate.column()));
            values.push(predicate.value());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT
                dev_type,
                COUNT(*) AS count,
                COALESCE(SUM(CASE WHEN success THEN 1 ELSE 0 END), 0) AS successful,
                COALESCE(SUM(CASE WHEN success THEN 0 ELSE 1 END), 0) AS failed
            FROM test_results
            {}
            GROUP BY dev_type
            ORDER BY dev_type
            "#,
            where_clause
        );

        Statement::from_sql_and_values(backend, sql, values)
    }
}

impl DbPool {
    /// Count successful and failed runs per device type.
    ///
    /// Rows are sorted by `dev_type`.
    pub async fn aggregate_test_results(
        &self,
        filter: &StatFilter,
    ) -> AppResult<Vec<AggregationRow>> {
        let rows = AggregationRow::find_by_statement(filter.build(self.backend()))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Storage(format!("Failed to aggregate test results: {}", e)))?;

        Ok(rows)
    }
}
