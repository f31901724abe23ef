//! Database operations for test results.

use sea_orm::{ActiveValue::NotSet, EntityTrait, Set, TransactionTrait};

use crate::entity::test_result::{ActiveModel as TestResultActiveModel, Entity as TestResult};
use crate::error::{AppError, AppResult};
use crate::models::NewTestResult;

use super::DbPool;

fn to_active_model(record: NewTestResult) -> TestResultActiveModel {
    TestResultActiveModel {
        id: NotSet,
        dev_type: Set(record.dev_type),
        operator: Set(record.operator),
        dt: Set(record.dt.to_canonical_string()),
        success: Set(record.success),
    }
}

impl DbPool {
    /// Insert a validated test result and return its new ID.
    pub async fn insert_test_result(&self, record: NewTestResult) -> AppResult<i64> {
        let result = TestResult::insert(to_active_model(record))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Storage(format!("Failed to insert test result: {}", e)))?;

        Ok(result.last_insert_id)
    }

    /// Insert a batch of validated test results in one transaction.
    ///
    /// Returns the number of persisted records, which always equals the
    /// number supplied.
    pub async fn insert_test_results<I>(&self, records: I) -> AppResult<u64>
    where
        I: IntoIterator<Item = NewTestResult>,
    {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;

        let mut inserted = 0u64;
        for record in records {
            TestResult::insert(to_active_model(record))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to insert test result: {}", e)))?;
            inserted += 1;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to commit test results: {}", e)))?;

        Ok(inserted)
    }

    /// Delete a test result by ID. Returns the number of removed rows (0 or 1).
    pub async fn delete_test_result(&self, id: i64) -> AppResult<u64> {
        let result = TestResult::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete test result: {}", e)))?;

        Ok(result.rows_affected)
    }

    /// Get a single test result by ID.
    pub async fn get_test_result_by_id(
        &self,
        id: i64,
    ) -> AppResult<Option<crate::entity::test_result::Model>> {
        let result = TestResult::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Storage(format!("Failed to get test result: {}", e)))?;

        Ok(result)
    }
}
