use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, Value};
use std::collections::HashMap;

pub use entity::{answers, inspection_status, inspections, questionnaires, questions, users, Id};

pub mod answer;
pub mod error;
pub mod inspection;
pub mod query;
pub mod question;
pub mod questionnaire;
pub mod user;

/// `QueryFilterMap` is a data structure that serves as a bridge for translating filter parameters
/// between different layers of the application. It is essentially a wrapper around a `HashMap`
/// where the keys are filter parameter names (as `String`) and the values are optional `Value` types
/// from `sea_orm`.
///
/// This structure is particularly useful in scenarios where you need to pass filter parameters
/// from a web request down to the database query layer in a type-safe and organized manner.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("questionnaire_id".to_string(), Some(Value::String(Some(Box::new("a_questionnaire_id".to_string())))));
/// let filter_value = query_filter_map.get("questionnaire_id");
/// ```
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// `IntoQueryFilterMap` is a trait that provides a method for converting a struct into a `QueryFilterMap`.
/// This is particularly useful for translating data between different layers of the application,
/// such as from web request parameters to database query filters.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

/// Seeds a demo user and the default secret-shopper questionnaire so a fresh
/// environment can process an inspection end to end.
pub async fn seed_database(db: &DatabaseConnection) {
    let now = Utc::now();

    let _demo_user = users::ActiveModel {
        chat_user_id: Set(10_000_001),
        username: Set(Some("demo_shopper".to_owned())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();

    let store_visit = questionnaires::ActiveModel {
        name: Set("Store visit call review".to_owned()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();

    let prompts = [
        "Поздоровался ли продавец с покупателем?",
        "Был ли продавец вежлив на протяжении разговора?",
        "Упоминал ли продавец действующие акции или скидки?",
        "Были ли упомянуты просроченные товары?",
        "Предложил ли продавец помощь с выбором товара?",
    ];

    for (position, prompt) in prompts.iter().enumerate() {
        questions::ActiveModel {
            questionnaire_id: Set(store_visit.id.clone().unwrap()),
            position: Set(position as i32),
            prompt: Set((*prompt).to_owned()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .save(db)
        .await
        .unwrap();
    }
}

