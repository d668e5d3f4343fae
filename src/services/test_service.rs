use crate::dto::test_dto::{CreateTestPayload, UpdateTestPayload};
use crate::error::{Error, Result};
use crate::models::test::Test;
use sqlx::PgPool;
use uuid::Uuid;

const TEST_COLUMNS: &str =
    "id, title, description, instructions, category, published, creator_id, created_at, updated_at";

#[derive(Debug, serde::Serialize)]
pub struct PaginatedTests {
    #[serde(rename = "items")]
    pub tests: Vec<Test>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Default)]
pub struct TestFilter {
    pub published: Option<bool>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct TestService {
    pool: PgPool,
}

impl TestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_test(&self, payload: CreateTestPayload, creator_id: Uuid) -> Result<Test> {
        let test = sqlx::query_as::<_, Test>(&format!(
            r#"
            INSERT INTO tests (title, description, instructions, category, published, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TEST_COLUMNS
        ))
        .bind(payload.title)
        .bind(payload.description.unwrap_or_default())
        .bind(payload.instructions.unwrap_or_default())
        .bind(payload.category)
        .bind(payload.published.unwrap_or(false))
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(test_id = %test.id, category = %test.category, "test created");
        Ok(test)
    }

    pub async fn get_test_by_id(&self, test_id: Uuid) -> Result<Test> {
        sqlx::query_as::<_, Test>(&format!("SELECT {} FROM tests WHERE id = $1", TEST_COLUMNS))
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Test non trovato".to_string()))
    }

    pub async fn update_test(&self, test_id: Uuid, payload: UpdateTestPayload) -> Result<Test> {
        sqlx::query_as::<_, Test>(&format!(
            r#"
            UPDATE tests
            SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                instructions = COALESCE($3, instructions),
                category = COALESCE($4, category),
                published = COALESCE($5, published),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            TEST_COLUMNS
        ))
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.instructions)
        .bind(payload.category)
        .bind(payload.published)
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test non trovato".to_string()))
    }

    pub async fn list_tests(
        &self,
        page: i64,
        per_page: i64,
        filter: Option<TestFilter>,
    ) -> Result<PaginatedTests> {
        let offset = (page - 1).max(0) * per_page;
        let filter = filter.unwrap_or_default();
        let search_param: Option<String> = filter.search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tests
            WHERE ($1::bool IS NULL OR published = $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR (title ILIKE $3 OR description ILIKE $3))
            "#,
        )
        .bind(filter.published)
        .bind(filter.category.as_deref())
        .bind(search_param.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };

        let tests = sqlx::query_as::<_, Test>(&format!(
            r#"
            SELECT {}
            FROM tests
            WHERE ($1::bool IS NULL OR published = $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR (title ILIKE $3 OR description ILIKE $3))
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
            TEST_COLUMNS
        ))
        .bind(filter.published)
        .bind(filter.category.as_deref())
        .bind(search_param.as_deref())
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedTests {
            tests,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn count_tests(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(test_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::test_dto::CreateUserPayload;
    use crate::services::user_service::UserService;
    use sqlx::postgres::PgPoolOptions;
    use std::env;

    async fn setup_test_db() -> Option<PgPool> {
        dotenvy::dotenv().ok();
        let database_url = env::var("DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to create test pool");

        crate::database::pool::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Some(pool)
    }

    #[tokio::test]
    async fn test_list_tests() {
        let Some(pool) = setup_test_db().await else {
            eprintln!("DATABASE_URL not set, skipping");
            return;
        };
        let users = UserService::new(pool.clone());
        let service = TestService::new(pool);
        let creator = users
            .create_user(CreateUserPayload {
                email: format!("creator_{}@example.com", Uuid::new_v4()),
                name: Some("Creator".into()),
                password: "password123".into(),
                role: None,
            })
            .await
            .unwrap();

        let marker = Uuid::new_v4().to_string();
        let test1 = service
            .create_test(
                CreateTestPayload {
                    title: format!("S-AS {}", marker),
                    description: Some("Scopi e antiscopi".into()),
                    instructions: None,
                    category: "personalita".into(),
                    published: Some(true),
                },
                creator.id,
            )
            .await
            .unwrap();

        let test2 = service
            .create_test(
                CreateTestPayload {
                    title: format!("PID-5 {}", marker),
                    description: None,
                    instructions: Some("Rispondi con sincerità".into()),
                    category: "personalita".into(),
                    published: Some(false),
                },
                creator.id,
            )
            .await
            .unwrap();

        let result = service
            .list_tests(
                1,
                10,
                Some(TestFilter {
                    search: Some(marker.clone()),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        assert_eq!(result.total, 2);

        let result = service
            .list_tests(
                1,
                10,
                Some(TestFilter {
                    published: Some(true),
                    search: Some(marker.clone()),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.tests[0].id, test1.id);

        let updated = service
            .update_test(
                test2.id,
                UpdateTestPayload {
                    published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.published);
        assert_eq!(updated.instructions, "Rispondi con sincerità");

        assert!(service.delete_test(test1.id).await.unwrap());
        assert!(service.delete_test(test2.id).await.unwrap());
        assert!(matches!(
            service.get_test_by_id(test1.id).await,
            Err(Error::NotFound(_))
        ));
        users.delete_user(creator.id).await.unwrap();
    }
}
