use anyhow::{Context, Result};
use schools::NewSchool;
use serde::Serialize;

use super::StoreOptions;

#[derive(Serialize)]
struct AddResponse {
    success: bool,
    #[serde(rename = "schoolId")]
    school_id: String,
}

pub async fn run(
    store: &StoreOptions,
    name: String,
    address: String,
    lat: f64,
    lon: f64,
    json: bool,
) -> Result<()> {
    let service = store.connect().await?;

    let id = service
        .create(NewSchool::new(name, address, lat, lon))
        .await
        .context("Failed to add school")?;
    service.close().await;

    if json {
        let response = AddResponse {
            success: true,
            school_id: id.to_string(),
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", id);
    }

    Ok(())
}
