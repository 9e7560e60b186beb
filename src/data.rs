use crate::{
    data::{
        sort::StudentSort,
        student::{NewStudent, Student, StudentChanges},
    },
    error::RosterResult,
};
use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
pub mod memory;
pub mod sort;
pub mod student;

/// Everything the handlers need from storage.
///
/// Writes are single conditional statements: `insert` fails with
/// [`crate::error::RosterError::DuplicateStudent`] if the id is taken, `update` and
/// `remove` fail with [`crate::error::RosterError::MissingStudent`] if it is absent.
/// There is no separate existence check to race against.
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    async fn get_by_id(&self, id: i32) -> RosterResult<Option<Student>>;
    async fn get_all(&self, sort: StudentSort) -> RosterResult<Vec<Student>>;
    /// Mean score over every row, `0.0` when there are none.
    async fn average_score(&self) -> RosterResult<f64>;
    async fn insert(&self, to_be_added: NewStudent) -> RosterResult<()>;
    async fn update(&self, id: i32, changes: StudentChanges) -> RosterResult<()>;
    async fn remove(&self, id: i32) -> RosterResult<()>;
    async fn close(&self);
}
