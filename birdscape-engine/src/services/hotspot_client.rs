//! Observation registry hotspot client
//!
//! Wraps the nearby-hotspots-by-geo and hotspot-info-by-id endpoints.

use super::registry::RegistryHttp;
use super::HotspotSource;
use crate::models::Hotspot;
use async_trait::async_trait;
use birdscape_common::{Result, Settings};

/// HTTP client for the registry's hotspot reference endpoints
pub struct EbirdHotspotClient {
    registry: RegistryHttp,
}

impl EbirdHotspotClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            registry: RegistryHttp::new(settings)?,
        })
    }
}

#[async_trait]
impl HotspotSource for EbirdHotspotClient {
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: u16,
        back_days: Option<u8>,
    ) -> Result<Vec<Hotspot>> {
        // Upstream expects 2-decimal coordinate precision
        let mut query = vec![
            ("lat", format!("{:.2}", lat)),
            ("lng", format!("{:.2}", lng)),
            ("dist", radius_km.to_string()),
            ("fmt", "json".to_string()),
        ];
        if let Some(back) = back_days {
            query.push(("back", back.to_string()));
        }

        let hotspots: Vec<Hotspot> = self.registry.get_json("/ref/hotspot/geo", &query).await?;

        tracing::info!(
            lat,
            lng,
            radius_km,
            count = hotspots.len(),
            "Retrieved nearby hotspots"
        );

        Ok(hotspots)
    }

    async fn info(&self, loc_id: &str) -> Result<Hotspot> {
        let path = format!("/ref/hotspot/info/{}", loc_id);
        let hotspot: Hotspot = self.registry.get_json(&path, &[]).await?;

        tracing::debug!(
            loc_id = %hotspot.loc_id,
            name = %hotspot.name,
            num_checklists = hotspot.num_checklists,
            "Retrieved hotspot detail"
        );

        Ok(hotspot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = EbirdHotspotClient::new(&test_settings());
        assert!(client.is_ok());
    }

    #[test]
    fn test_nearby_payload_list_parsing() {
        // Shape returned by the geo endpoint
        let json = r#"[
            {"locId": "L1", "locName": "A", "lat": 6.24, "lng": -75.58, "countryCode": "CO", "subnational1Code": "CO-ANT"},
            {"locId": "L2", "locName": "B", "lat": 6.25, "lng": -75.59, "countryCode": "CO", "subnational1Code": "CO-ANT"}
        ]"#;

        let hotspots: Vec<Hotspot> = serde_json::from_str(json).unwrap();
        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].loc_id, "L1");
        assert_eq!(hotspots[1].name, "B");
    }
}
