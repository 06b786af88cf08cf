/*!
Test Harness pour le simulateur de données process

Facilite l'écriture de tests avec:
- Démarrage automatique de l'endpoint mock
- Expectations sur le nombre de requêtes reçues
- Assertions sur le dernier lot envoyé
*/

use crate::batch_helpers::get_nested_field;
use crate::mock_endpoint::MockMonitorEndpoint;
use anyhow::Result;
use serde_json::Value;

/// Harness de test complet autour de l'endpoint mock
pub struct TestHarness {
    pub endpoint: MockMonitorEndpoint,
    expected_requests: Option<usize>,
}

impl TestHarness {
    /// Crée un nouveau harness de test (endpoint démarré)
    pub async fn new() -> Result<Self> {
        env_logger::try_init().ok(); // Init logging pour tests

        Ok(Self {
            endpoint: MockMonitorEndpoint::start().await?,
            expected_requests: None,
        })
    }

    /// Ajoute une expectation: on s'attend à recevoir N requêtes
    pub fn expect_requests(&mut self, count: usize) -> &mut Self {
        self.expected_requests = Some(count);
        self
    }

    /// Vérifie l'expectation configurée
    pub fn verify_expectations(&self) -> Result<()> {
        let Some(expected) = self.expected_requests else {
            return Ok(());
        };

        let actual = self.endpoint.request_count();
        if actual != expected {
            anyhow::bail!("Expected {} requests, got {}", expected, actual);
        }

        log::info!("✅ {} requests as expected", actual);
        Ok(())
    }

    /// Corps JSON de la dernière requête reçue
    pub fn last_body(&self) -> Result<Value> {
        self.endpoint
            .last_json::<Value>()?
            .ok_or_else(|| anyhow::anyhow!("No request received"))
    }

    /// Assert qu'un champ existe dans la dernière requête
    pub fn assert_field_exists(&self, field_path: &str) -> Result<()> {
        let body = self.last_body()?;
        if get_nested_field(&body, field_path).is_none() {
            anyhow::bail!("Field '{}' not found in latest request", field_path);
        }
        Ok(())
    }

    /// Assert qu'un champ a une valeur spécifique
    pub fn assert_field_equals(&self, field_path: &str, expected: &Value) -> Result<()> {
        let body = self.last_body()?;
        match get_nested_field(&body, field_path) {
            Some(actual) if actual == expected => {
                log::info!("✅ Field '{}' = {:?}", field_path, expected);
                Ok(())
            }
            Some(actual) => anyhow::bail!(
                "Field '{}' mismatch: expected {:?}, got {:?}",
                field_path, expected, actual
            ),
            None => anyhow::bail!("Field '{}' not found for comparison", field_path),
        }
    }

    /// Reset le harness pour un nouveau test
    pub fn reset(&mut self) {
        self.endpoint.clear();
        self.expected_requests = None;
        log::info!("🧹 Test harness reset");
    }
}
