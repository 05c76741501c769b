use actix_web::web::{
    self, Data, FormConfig, JsonConfig, PathConfig, QueryConfig, ServiceConfig,
};
use actix_web::{App, HttpResponse, HttpServer};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod access;
pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod seed;
pub mod typedid;
pub mod update;
pub mod user;
pub mod utils;

pub use campaign::{CampaignBody, CreateCampaignBody, ModifyCampaignBody};
pub use config::{Config, Storage};
pub use database::{Database, MemoryDatabase, MongoDatabase};
pub use error::Error;
pub use update::{CreateUpdateBody, ModifyUpdateBody, UpdateBody};
pub use user::{CreateUserBody, LoginBody, RegisteredUserBody, TokenBody, UserBody};

/// Registers every endpoint along with the extractor error handlers. The
/// caller is expected to provide a `Data<Box<dyn Database>>`.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(FormConfig::default().error_handler(|err, _req| {
        // format form errors with custom format
        Error::InvalidForm(err).into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        // format query errors with custom format
        Error::InvalidQuery(err).into()
    }))
    .service(user::endpoints::create_user)
    .service(user::endpoints::login)
    .service(user::endpoints::get_current_user)
    .service(user::endpoints::get_user_by_id)
    .service(campaign::endpoints::create_campaign)
    .service(campaign::endpoints::get_campaigns)
    .service(campaign::endpoints::get_campaigns_by_user)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::update_campaign)
    .service(campaign::endpoints::start_campaign)
    .service(campaign::endpoints::delete_campaign)
    .service(update::endpoints::create_update_in_campaign)
    .service(update::endpoints::get_updates_in_campaign)
    .service(update::endpoints::get_update_by_id)
    .service(update::endpoints::update_update)
    .service(update::endpoints::delete_update);
}

pub async fn connect(config: &Config) -> Result<Box<dyn Database>, Error> {
    let db: Box<dyn Database> = match config.storage {
        Storage::Mongo => {
            info!("connecting to db: {}", config.database_uri);
            let client = Client::with_uri_str(&config.database_uri).await?;
            let db = MongoDatabase::initialize(client.database(&config.database_name)).await?;
            Box::new(db)
        }
        Storage::Memory => {
            info!("using in-memory storage, data will not persist");
            Box::new(MemoryDatabase::new())
        }
    };

    Ok(db)
}

pub async fn run(config: Config) -> Result<(), Error> {
    let db = connect(&config).await?;

    if config.seed {
        seed::seed(&*db).await?;
    }

    let db = Data::new(db);

    info!("listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .configure(configure)
            .wrap(TracingLogger::default())
            .default_service(web::to(path_not_found))
    })
    .bind(config.bind_address.as_str())?
    .run()
    .await?;

    Ok(())
}

async fn path_not_found() -> Result<HttpResponse, Error> {
    Err(Error::PathNotFound)
}
