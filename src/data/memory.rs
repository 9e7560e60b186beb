//! A [`StudentStore`] held in a `BTreeMap`, used to drive the handlers in tests.

use crate::{
    data::{
        StudentStore,
        sort::{SortField, SortOrder, StudentSort},
        student::{NewStudent, Student, StudentChanges},
    },
    error::{RosterError, RosterResult},
};
use async_trait::async_trait;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, btree_map::Entry},
    sync::Mutex,
};

#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    rows: Mutex<BTreeMap<i32, Student>>,
}

impl MemoryStudentStore {
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        Self {
            rows: Mutex::new(students.into_iter().map(|s| (s.id, s)).collect()),
        }
    }

    pub fn snapshot(&self) -> Vec<Student> {
        self.rows.lock().unwrap().values().cloned().collect()
    }
}

fn compare(sort: StudentSort, a: &Student, b: &Student) -> Ordering {
    let ordering = match sort.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Score => a.score.total_cmp(&b.score),
        SortField::FirstName => a.first_name.cmp(&b.first_name),
        SortField::LastName => a.last_name.cmp(&b.last_name),
    };
    let ordering = match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    ordering.then(a.id.cmp(&b.id))
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn get_by_id(&self, id: i32) -> RosterResult<Option<Student>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self, sort: StudentSort) -> RosterResult<Vec<Student>> {
        let mut students = self.snapshot();
        students.sort_by(|a, b| compare(sort, a, b));
        Ok(students)
    }

    async fn average_score(&self) -> RosterResult<f64> {
        let rows = self.rows.lock().unwrap();
        if rows.is_empty() {
            return Ok(0.0);
        }
        #[allow(clippy::cast_precision_loss)]
        let count = rows.len() as f64;
        Ok(rows.values().map(|s| s.score).sum::<f64>() / count)
    }

    async fn insert(&self, to_be_added: NewStudent) -> RosterResult<()> {
        match self.rows.lock().unwrap().entry(to_be_added.id) {
            Entry::Occupied(_) => Err(RosterError::DuplicateStudent { id: to_be_added.id }),
            Entry::Vacant(vac) => {
                vac.insert(to_be_added.into());
                Ok(())
            }
        }
    }

    async fn update(&self, id: i32, changes: StudentChanges) -> RosterResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let student = rows
            .get_mut(&id)
            .ok_or(RosterError::MissingStudent { id })?;

        student.first_name = changes.first_name;
        student.middle_name = changes.middle_name;
        student.last_name = changes.last_name;
        student.score = changes.score;
        Ok(())
    }

    async fn remove(&self, id: i32) -> RosterResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RosterError::MissingStudent { id })
    }

    async fn close(&self) {}
}
