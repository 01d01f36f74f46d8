//! Example queries against the `articles` table.
//!
//! Reference for application code once `001_create_articles_table` has been
//! applied. Neither binary calls into this module.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{OrmError, OrmResult};

const ARTICLE_COLUMNS: &str = "id, title, author, primary_image, content, created_time";

/// A row of the `articles` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub primary_image: Option<String>,
    pub content: String,
    pub created_time: DateTime<Utc>,
}

/// Input for [`create`]
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub content: String,
    pub primary_image: Option<String>,
}

/// Pagination for [`list`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// Columns that [`ArticleChanges`] may assign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleField {
    Title,
    Author,
    Content,
    PrimaryImage,
}

impl ArticleField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Content => "content",
            Self::PrimaryImage => "primary_image",
        }
    }
}

/// Partial update for an article.
///
/// Each setter appends a `(column, value)` pair; setting a field twice keeps
/// the last value. Values are always bound, never spliced into the SQL.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    fields: Vec<(ArticleField, Option<String>)>,
}

impl ArticleChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set(ArticleField::Title, Some(title.into()))
    }

    pub fn author(self, author: impl Into<String>) -> Self {
        self.set(ArticleField::Author, Some(author.into()))
    }

    pub fn content(self, content: impl Into<String>) -> Self {
        self.set(ArticleField::Content, Some(content.into()))
    }

    /// `None` clears the image
    pub fn primary_image(self, image: Option<String>) -> Self {
        self.set(ArticleField::PrimaryImage, image)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = ArticleField> + '_ {
        self.fields.iter().map(|(field, _)| *field)
    }

    fn set(mut self, field: ArticleField, value: Option<String>) -> Self {
        match self.fields.iter().position(|(existing, _)| *existing == field) {
            Some(index) => self.fields[index].1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Build the UPDATE statement; fails on an empty change set
    pub fn into_query(self, id: i32) -> OrmResult<QueryBuilder<'static, Postgres>> {
        if self.fields.is_empty() {
            return Err(OrmError::validation("No fields to update"));
        }

        let mut builder = QueryBuilder::new("UPDATE articles SET ");
        {
            let mut assignments = builder.separated(", ");
            for (field, value) in self.fields {
                assignments.push(format!("{} = ", field.column()));
                assignments.push_bind_unseparated(value);
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(ARTICLE_COLUMNS);

        Ok(builder)
    }
}

/// Insert an article and return the stored row
pub async fn create(pool: &PgPool, article: NewArticle) -> OrmResult<Article> {
    let sql = format!(
        "INSERT INTO articles (title, author, content, primary_image) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        ARTICLE_COLUMNS
    );

    let row = sqlx::query_as::<_, Article>(&sql)
        .bind(article.title)
        .bind(article.author)
        .bind(article.content)
        .bind(article.primary_image)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Newest articles first, paginated
pub async fn list(pool: &PgPool, options: ListOptions) -> OrmResult<Vec<Article>> {
    let sql = format!(
        "SELECT {} FROM articles ORDER BY created_time DESC LIMIT $1 OFFSET $2",
        ARTICLE_COLUMNS
    );

    let rows = sqlx::query_as::<_, Article>(&sql)
        .bind(options.limit)
        .bind(options.offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> OrmResult<Option<Article>> {
    let sql = format!("SELECT {} FROM articles WHERE id = $1", ARTICLE_COLUMNS);

    let row = sqlx::query_as::<_, Article>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_author(pool: &PgPool, author: &str) -> OrmResult<Vec<Article>> {
    let sql = format!(
        "SELECT {} FROM articles WHERE author = $1 ORDER BY created_time DESC",
        ARTICLE_COLUMNS
    );

    let rows = sqlx::query_as::<_, Article>(&sql)
        .bind(author)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Apply a partial update and return the updated row
pub async fn update(pool: &PgPool, id: i32, changes: ArticleChanges) -> OrmResult<Article> {
    let mut query = changes.into_query(id)?;
    let row = query.build_query_as::<Article>().fetch_one(pool).await?;
    Ok(row)
}

/// Delete an article, returning its id when a row was removed
pub async fn delete(pool: &PgPool, id: i32) -> OrmResult<Option<i32>> {
    let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM articles WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(deleted)
}

/// Case-insensitive substring match on title or content, newest first
pub async fn search(pool: &PgPool, term: &str) -> OrmResult<Vec<Article>> {
    let sql = format!(
        "SELECT {} FROM articles WHERE title ILIKE $1 OR content ILIKE $1 \
         ORDER BY created_time DESC",
        ARTICLE_COLUMNS
    );

    let rows = sqlx::query_as::<_, Article>(&sql)
        .bind(format!("%{}%", term))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count(pool: &PgPool) -> OrmResult<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Articles created in the last 7 days, newest first
pub async fn recent(pool: &PgPool) -> OrmResult<Vec<Article>> {
    let sql = format!(
        "SELECT {} FROM articles WHERE created_time >= NOW() - INTERVAL '7 days' \
         ORDER BY created_time DESC",
        ARTICLE_COLUMNS
    );

    let rows = sqlx::query_as::<_, Article>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_changes_are_rejected() {
        let result = ArticleChanges::new().into_query(1);
        match result {
            Err(OrmError::Validation(message)) => assert_eq!(message, "No fields to update"),
            Err(other) => panic!("expected validation error, got {:?}", other),
            Ok(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_update_binds_only_supplied_fields() {
        let query = ArticleChanges::new()
            .title("New title")
            .content("Body")
            .into_query(42)
            .unwrap();

        assert_eq!(
            query.sql(),
            "UPDATE articles SET title = $1, content = $2 WHERE id = $3 \
             RETURNING id, title, author, primary_image, content, created_time"
        );
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let hostile = "x'; DROP TABLE articles; --";
        let query = ArticleChanges::new().author(hostile).into_query(7).unwrap();

        assert!(!query.sql().contains(hostile));
        assert!(query.sql().starts_with("UPDATE articles SET author = $1"));
    }

    #[test]
    fn test_setting_a_field_twice_keeps_last_value() {
        let changes = ArticleChanges::new()
            .title("first")
            .primary_image(Some("a.png".into()))
            .title("second")
            .primary_image(None);

        let fields: Vec<_> = changes.fields().collect();
        assert_eq!(fields, vec![ArticleField::Title, ArticleField::PrimaryImage]);

        let query = changes.into_query(1).unwrap();
        assert!(query.sql().starts_with("UPDATE articles SET title = $1, primary_image = $2"));
    }

    #[test]
    fn test_list_defaults() {
        let options = ListOptions::default();
        assert_eq!(options.limit, 10);
        assert_eq!(options.offset, 0);
    }
}
