use super::helpers::decode_all;
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Executor};

use crate::{
    api::SupportAPI,
    auth::{Platform, User},
    entities::{Article, ArticleInput, Faq, FaqInput, Service, ServiceInput},
    error::Error,
};

#[async_trait]
impl SupportAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn list_faqs(&self, category: Option<String>) -> Result<Vec<Faq>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM faqs WHERE ($1::VARCHAR IS NULL OR category = $1) ORDER BY category ASC, position ASC")
                    .bind(category),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn create_faq(&self, user: User, input: FaqInput) -> Result<Faq, Error> {
        self.authorize(user.clone(), "manage_support", Platform::default())?;

        let faq = Faq::new(input)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO faqs (id, category, position, data) VALUES ($1, $2, $3, $4)")
                .bind(&faq.id)
                .bind(&faq.category)
                .bind(faq.order)
                .bind(Json(&faq)),
        )
        .await?;

        Ok(faq)
    }

    #[tracing::instrument(skip(self))]
    async fn list_articles(&self) -> Result<Vec<Article>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(sqlx::query("SELECT data FROM articles ORDER BY published_at DESC"))
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn create_article(&self, user: User, input: ArticleInput) -> Result<Article, Error> {
        self.authorize(user.clone(), "manage_support", Platform::default())?;

        let article = Article::new(input, Utc::now())?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO articles (id, published_at, data) VALUES ($1, $2, $3)")
                .bind(&article.id)
                .bind(article.published_at)
                .bind(Json(&article)),
        )
        .await?;

        Ok(article)
    }

    #[tracing::instrument(skip(self))]
    async fn list_services(&self) -> Result<Vec<Service>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(sqlx::query("SELECT data FROM services ORDER BY title ASC"))
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn create_service(&self, user: User, input: ServiceInput) -> Result<Service, Error> {
        self.authorize(user.clone(), "manage_support", Platform::default())?;

        let service = Service::new(input)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO services (id, title, data) VALUES ($1, $2, $3)")
                .bind(&service.id)
                .bind(&service.title)
                .bind(Json(&service)),
        )
        .await?;

        Ok(service)
    }
}
