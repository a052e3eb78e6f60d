//! MongoDB connection
//!
//! A single [`Database`] is created at startup, registered with the
//! `ServiceLocator`, and injected into every `#[repository]` through its
//! `db` field.
//!
//! ```bash
//! MONGODB_URI=mongodb://localhost:27017   # default
//! DATABASE_NAME=catalog_dev              # default
//! ```

use std::env;

use log::info;
use mongodb::bson::doc;
use mongodb::{options::ClientOptions, Client};

#[derive(Clone)]
pub struct Database {
    client: Client,
    database_name: String,
}

impl Database {
    /// Connects and pings the server. Startup aborts when this fails.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let mongodb_uri = env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let database_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "catalog_dev".to_string());

        let mut client_options = ClientOptions::parse(&mongodb_uri).await?;
        client_options.app_name = Some("catalog_service".to_string());

        let client = Client::with_options(client_options)?;

        client
            .database(&database_name)
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("✅ MongoDB connected: {}", database_name);

        Ok(Self { client, database_name })
    }

    /// Handle used by the `#[repository]` generated `collection::<T>()`
    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}
