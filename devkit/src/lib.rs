/*!
# Process DevKit - Mocks et Utilitaires pour le simulateur

Bibliothèque facilitant les tests du simulateur de données process avec:
- Endpoint HTTP mock (pas besoin de l'API distante)
- Helpers pour valider les lots de mesures JSON
- Harness de test avec assertions sur les requêtes reçues
*/

pub mod mock_endpoint;
pub mod batch_helpers;
pub mod test_utils;

pub use mock_endpoint::{unreachable_url, MockMonitorEndpoint, RecordedRequest};
pub use batch_helpers::{monitor_response, parameter_ids, validate_batch};
pub use test_utils::TestHarness;
