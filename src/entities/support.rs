use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::Error;

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct FaqInput {
    #[validate(length(min = 1, max = 255))]
    pub question: String,
    #[validate(length(min = 1))]
    pub answer: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub order: i32,
}

impl Faq {
    pub fn new(input: FaqInput) -> Result<Self, Error> {
        input.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            question: input.question,
            answer: input.answer,
            category: input.category,
            order: input.order,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ArticleInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 1, max = 120))]
    pub read_time_minutes: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub read_time_minutes: i32,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(input: ArticleInput, now: DateTime<Utc>) -> Result<Self, Error> {
        input.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            author: input.author,
            category: input.category,
            read_time_minutes: input.read_time_minutes,
            published_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ServiceInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(max = 50))]
    pub icon_class: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub icon_class: String,
    pub features: Vec<String>,
}

impl Service {
    pub fn new(input: ServiceInput) -> Result<Self, Error> {
        input.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            icon_class: input.icon_class,
            features: input
                .features
                .into_iter()
                .map(|feature| feature.trim().to_string())
                .filter(|feature| !feature.is_empty())
                .collect(),
        })
    }
}

#[test]
fn support_content_test() {
    let err = Faq::new(FaqInput {
        question: "".into(),
        answer: "Post a listing and wait for bids.".into(),
        category: "general".into(),
        order: 1,
    })
    .unwrap_err();
    assert!(err.fields.contains_key("question"));

    let article = ArticleInput {
        title: "Packing perishables".into(),
        content: "Keep the cold chain unbroken.".into(),
        author: "Ops".into(),
        category: "guides".into(),
        read_time_minutes: 0,
    };
    assert!(Article::new(article, Utc::now()).is_err());

    let service = Service::new(ServiceInput {
        title: "Refrigerated haulage".into(),
        description: "Temperature controlled trucks".into(),
        icon_class: "fa-snowflake".into(),
        features: vec![" GPS tracking ".into(), "".into(), "Insurance".into()],
    })
    .unwrap();
    assert_eq!(service.features, vec!["GPS tracking", "Insurance"]);
}
