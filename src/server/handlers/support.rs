use axum::extract::{Extension, Json, Query};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{Article, ArticleInput, Faq, FaqInput, Service, ServiceInput};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct FaqParams {
    category: Option<String>,
}

pub async fn list_faqs(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<FaqParams>,
) -> Result<Json<Vec<Faq>>, Error> {
    let faqs = api.list_faqs(params.category).await?;

    Ok(faqs.into())
}

pub async fn create_faq(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<FaqInput>,
) -> Result<Json<Faq>, Error> {
    let faq = api.create_faq(user, params).await?;

    Ok(faq.into())
}

pub async fn list_articles(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Article>>, Error> {
    let articles = api.list_articles().await?;

    Ok(articles.into())
}

pub async fn create_article(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<ArticleInput>,
) -> Result<Json<Article>, Error> {
    let article = api.create_article(user, params).await?;

    Ok(article.into())
}

pub async fn list_services(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Service>>, Error> {
    let services = api.list_services().await?;

    Ok(services.into())
}

pub async fn create_service(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<ServiceInput>,
) -> Result<Json<Service>, Error> {
    let service = api.create_service(user, params).await?;

    Ok(service.into())
}
