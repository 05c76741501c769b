#![allow(dead_code)]

use actix_web::http::header::{HeaderName, AUTHORIZATION};
use actix_web::web::Data;
use chrono::Utc;

use fundraiser_server::campaign::{self, Campaign};
use fundraiser_server::update::{self, Update};
use fundraiser_server::user::db::UserStore;
use fundraiser_server::user::password::hash_password;
use fundraiser_server::user::{self, User, UserId};
use fundraiser_server::{Database, MemoryDatabase};

macro_rules! test_app {
    ($db:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($db.clone())
                .configure(fundraiser_server::configure),
        )
        .await
    };
}

pub fn memory_db() -> Data<Box<dyn Database>> {
    let db: Box<dyn Database> = Box::new(MemoryDatabase::new());
    Data::new(db)
}

pub fn bearer(user: &User) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", user.token))
}

pub const PASSWORD: &str = "correct horse";

pub async fn register(db: &Data<Box<dyn Database>>, username: &str) -> User {
    user::manager::create_user(&****db, username.to_string(), PASSWORD.to_string())
        .await
        .unwrap()
}

pub async fn register_inactive(db: &Data<Box<dyn Database>>, username: &str) -> User {
    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        username: username.to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
        token: format!("{}-token", username),
        is_active: false,
        created_at: now,
        modified_at: now,
    };
    db.users().insert_user(&user).await.unwrap();
    user
}

pub async fn create_campaign(db: &Data<Box<dyn Database>>, owner: &User, title: &str) -> Campaign {
    campaign::manager::create_campaign(&****db, owner, title.to_string(), String::new(), 1_000)
        .await
        .unwrap()
}

pub async fn create_update(
    db: &Data<Box<dyn Database>>,
    campaign: &Campaign,
    title: &str,
) -> Update {
    update::manager::create_update(&****db, campaign, title.to_string(), String::new())
        .await
        .unwrap()
}
