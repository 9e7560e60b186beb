use crate::{
    config::DbConfig,
    data::{StudentStore, sort::StudentSort},
    error::{MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu, RosterError, RosterResult},
};
use async_trait::async_trait;
use serde::Serialize;
use snafu::ResultExt;
use sqlx::{FromRow, Pool, Postgres, postgres::PgPoolOptions};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Student {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentChanges {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub score: f64,
}

impl Student {
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle_name) => format!("{} {middle_name} {}", self.first_name, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

impl From<NewStudent> for Student {
    fn from(
        NewStudent {
            id,
            first_name,
            middle_name,
            last_name,
            score,
        }: NewStudent,
    ) -> Self {
        Self {
            id,
            first_name,
            middle_name,
            last_name,
            score,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgStudentStore {
    pool: Pool<Postgres>,
}

impl PgStudentStore {
    pub async fn new(options: PgPoolOptions, db_config: &DbConfig) -> RosterResult<Self> {
        let pool = options
            .connect_with(db_config.connect_options())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn get_by_id(&self, id: i32) -> RosterResult<Option<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT id, first_name, middle_name, last_name, score FROM public.students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_all(&self, sort: StudentSort) -> RosterResult<Vec<Student>> {
        //both pieces come from fixed enums, never from the request
        let query = format!(
            "SELECT id, first_name, middle_name, last_name, score FROM public.students ORDER BY {} {}, id ASC",
            sort.field.column(),
            sort.order.keyword()
        );

        sqlx::query_as::<_, Student>(&query)
            .fetch_all(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn average_score(&self) -> RosterResult<f64> {
        sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(AVG(score), 0)::DOUBLE PRECISION FROM public.students",
        )
        .fetch_one(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert(&self, to_be_added: NewStudent) -> RosterResult<()> {
        let NewStudent {
            id,
            first_name,
            middle_name,
            last_name,
            score,
        } = to_be_added;

        let inserted = sqlx::query("INSERT INTO public.students (id, first_name, middle_name, last_name, score) VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .bind(first_name)
            .bind(middle_name)
            .bind(last_name)
            .bind(score)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected();

        if inserted == 0 {
            return Err(RosterError::DuplicateStudent { id });
        }
        Ok(())
    }

    async fn update(&self, id: i32, changes: StudentChanges) -> RosterResult<()> {
        let StudentChanges {
            first_name,
            middle_name,
            last_name,
            score,
        } = changes;

        let updated = sqlx::query("UPDATE public.students SET first_name = $2, middle_name = $3, last_name = $4, score = $5 WHERE id = $1")
            .bind(id)
            .bind(first_name)
            .bind(middle_name)
            .bind(last_name)
            .bind(score)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected();

        if updated == 0 {
            return Err(RosterError::MissingStudent { id });
        }
        Ok(())
    }

    async fn remove(&self, id: i32) -> RosterResult<()> {
        let removed = sqlx::query("DELETE FROM public.students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected();

        if removed == 0 {
            return Err(RosterError::MissingStudent { id });
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
