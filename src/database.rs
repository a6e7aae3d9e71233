use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use utoipa::ToSchema;

use crate::catalog::Course;

pub const MAX_POST_LENGTH: usize = 1000;
const DEFAULT_ANONYMOUS_NICKNAME: &str = "anonymous";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseReview {
    pub id: i64,
    pub course_id: u32,
    /// Course name at the time of writing
    pub course_name: String,
    pub rating: i32, // 1-5 scale
    pub content: String,
    pub nickname: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePost {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub course_id: u32,
    pub rating: i32,
    pub content: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct RatingSummary {
    pub count: i64,
    /// Absent when the course has no reviews
    pub average: Option<f64>,
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init_tables(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS course_reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                course_name TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
                content TEXT NOT NULL,
                nickname TEXT NOT NULL DEFAULT 'anonymous',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_state (
                device_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (device_id, key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_course_reviews_course_id ON course_reviews(course_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // Posts
    pub async fn create_post(&self, post: CreatePost) -> Result<Post, DatabaseError> {
        let content = post.content.trim();
        if content.is_empty() {
            return Err(DatabaseError::InvalidData("Post content is required".to_string()));
        }
        if content.chars().count() > MAX_POST_LENGTH {
            return Err(DatabaseError::InvalidData(format!(
                "Post content must be at most {} characters",
                MAX_POST_LENGTH
            )));
        }

        let result = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (content, created_at) VALUES (?, ?) RETURNING *",
        )
        .bind(content)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    /// One page of posts, newest first. `offset` skips that many newer posts.
    pub async fn list_posts(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Post>, DatabaseError> {
        let limit = limit.unwrap_or(50).clamp(1, 100);
        let offset = offset.unwrap_or(0).max(0);

        let results = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    // Course reviews
    pub async fn create_review(
        &self,
        course: &Course,
        review: CreateReview,
    ) -> Result<CourseReview, DatabaseError> {
        if !(1..=5).contains(&review.rating) {
            return Err(DatabaseError::InvalidData(format!(
                "Rating must be between 1 and 5, got {}",
                review.rating
            )));
        }

        let content = review.content.trim();
        if content.is_empty() {
            return Err(DatabaseError::InvalidData("Review content is required".to_string()));
        }

        let nickname = review
            .nickname
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_ANONYMOUS_NICKNAME);

        let result = sqlx::query_as::<_, CourseReview>(
            r#"
            INSERT INTO course_reviews (course_id, course_name, rating, content, nickname, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(review.rating)
        .bind(content)
        .bind(nickname)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn list_reviews(&self, course_id: Option<u32>) -> Result<Vec<CourseReview>, DatabaseError> {
        let results = match course_id {
            Some(course_id) => {
                sqlx::query_as::<_, CourseReview>(
                    "SELECT * FROM course_reviews WHERE course_id = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(course_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, CourseReview>(
                    "SELECT * FROM course_reviews ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(results)
    }

    pub async fn rating_summary(&self, course_id: u32) -> Result<RatingSummary, DatabaseError> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            "SELECT COUNT(*) AS count, AVG(rating) AS average FROM course_reviews WHERE course_id = ?",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::tests::sample_course;
    use crate::catalog::{Season, WalkDuration, WeatherStyle};
    use sqlx::sqlite::SqlitePoolOptions;

    pub(crate) async fn memory_database() -> Database {
        // One connection, otherwise each connection opens its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let database = Database::new(pool);
        database.init_tables().await.unwrap();
        database
    }

    fn course(id: u32) -> Course {
        sample_course(id, &[Season::Autumn], &[WeatherStyle::Cloudy], WalkDuration::Ninety)
    }

    fn review(course_id: u32, rating: i32, nickname: Option<&str>) -> CreateReview {
        CreateReview {
            course_id,
            rating,
            content: "Lovely leaves".to_string(),
            nickname: nickname.map(|n| n.to_string()),
        }
    }

    #[tokio::test]
    async fn test_posts_are_trimmed_and_newest_first() {
        let db = memory_database().await;

        db.create_post(CreatePost { content: "  first  ".into() }).await.unwrap();
        db.create_post(CreatePost { content: "second".into() }).await.unwrap();

        let posts = db.list_posts(None, None).await.unwrap();
        let contents: Vec<&str> = posts.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_invalid_posts_are_rejected() {
        let db = memory_database().await;

        assert!(matches!(
            db.create_post(CreatePost { content: "   ".into() }).await,
            Err(DatabaseError::InvalidData(_))
        ));
        assert!(matches!(
            db.create_post(CreatePost { content: "a".repeat(MAX_POST_LENGTH + 1) }).await,
            Err(DatabaseError::InvalidData(_))
        ));
        assert!(db
            .create_post(CreatePost { content: "あ".repeat(MAX_POST_LENGTH) })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_list_posts_limit() {
        let db = memory_database().await;
        for i in 0..5 {
            db.create_post(CreatePost { content: format!("post {}", i) }).await.unwrap();
        }

        let posts = db.list_posts(Some(2), None).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].content, "post 4");
    }

    #[tokio::test]
    async fn test_list_posts_pages_past_the_limit_cap() {
        let db = memory_database().await;
        for i in 0..105 {
            db.create_post(CreatePost { content: format!("post {}", i) }).await.unwrap();
        }

        let first_page = db.list_posts(Some(500), None).await.unwrap();
        assert_eq!(first_page.len(), 100);
        assert_eq!(first_page[99].content, "post 5");

        let second_page = db.list_posts(Some(100), Some(100)).await.unwrap();
        let contents: Vec<&str> = second_page.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["post 4", "post 3", "post 2", "post 1", "post 0"]);

        assert!(db.list_posts(None, Some(105)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_snapshots_course_and_defaults_nickname() {
        let db = memory_database().await;
        let course = course(3);

        let saved = db.create_review(&course, review(3, 4, Some("  "))).await.unwrap();
        assert_eq!(saved.course_id, 3);
        assert_eq!(saved.course_name, course.name);
        assert_eq!(saved.nickname, "anonymous");

        let named = db.create_review(&course, review(3, 5, Some(" Ken "))).await.unwrap();
        assert_eq!(named.nickname, "Ken");
    }

    #[tokio::test]
    async fn test_review_validation() {
        let db = memory_database().await;
        let course = course(1);

        for rating in [0, 6, -1] {
            assert!(matches!(
                db.create_review(&course, review(1, rating, None)).await,
                Err(DatabaseError::InvalidData(_))
            ));
        }

        let blank = CreateReview { content: " ".into(), ..review(1, 3, None) };
        assert!(matches!(
            db.create_review(&course, blank).await,
            Err(DatabaseError::InvalidData(_))
        ));
        assert!(db.list_reviews(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reviews_filter_by_course() {
        let db = memory_database().await;
        db.create_review(&course(1), review(1, 3, None)).await.unwrap();
        db.create_review(&course(2), review(2, 4, None)).await.unwrap();
        db.create_review(&course(1), review(1, 5, None)).await.unwrap();

        let all = db.list_reviews(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let first_course = db.list_reviews(Some(1)).await.unwrap();
        let ratings: Vec<i32> = first_course.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5, 3]);
    }

    #[tokio::test]
    async fn test_rating_summary() {
        let db = memory_database().await;

        assert_eq!(
            db.rating_summary(7).await.unwrap(),
            RatingSummary { count: 0, average: None }
        );

        db.create_review(&course(7), review(7, 4, None)).await.unwrap();
        db.create_review(&course(7), review(7, 5, None)).await.unwrap();

        let summary = db.rating_summary(7).await.unwrap();
        assert_eq!(summary.count, 2);
        assert!((summary.average.unwrap() - 4.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_health_check() {
        let db = memory_database().await;
        assert!(db.health_check().await.is_ok());
    }
}
