//! SeaORM entity definitions for the embedded SQLite database.

pub mod test_result;
