/*!
Helpers pour construire et valider les payloads de l'API de monitoring

Facilite l'écriture de tests en fournissant des utilitaires pour:
- Construire des réponses serveur conformes
- Valider la structure d'un lot de mesures envoyé
- Naviguer dans le JSON par chemin pointé (`data.0.value`)
*/

use anyhow::Result;
use serde_json::Value;

/// Identifiants capteurs attendus, dans l'ordre de l'enveloppe
pub const EXPECTED_PARAMETER_IDS: [&str; 3] = ["TI-101-01", "VI-100-01", "FI-100-01"];

/// Crée une réponse de l'API monitor
pub fn monitor_response(processed: u64, triggers_detected: u64, es_notifications: u64) -> Value {
    serde_json::json!({
        "processed": processed,
        "triggers_detected": triggers_detected,
        "es_notifications": es_notifications
    })
}

/// Liste des `parameter_id` du lot, dans l'ordre
pub fn parameter_ids(batch: &Value) -> Vec<String> {
    batch
        .get("data")
        .and_then(|d| d.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|r| r.get("parameter_id").and_then(|v| v.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Valide l'enveloppe `{"data": [Reading; 3]}`
pub fn validate_batch(batch: &Value) -> Result<()> {
    let data = batch
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Missing 'data' array"))?;

    if data.len() != EXPECTED_PARAMETER_IDS.len() {
        anyhow::bail!("Expected {} readings, got {}", EXPECTED_PARAMETER_IDS.len(), data.len());
    }

    for (index, (reading, expected_id)) in data.iter().zip(EXPECTED_PARAMETER_IDS).enumerate() {
        let id = reading.get("parameter_id").and_then(|v| v.as_str());
        if id != Some(expected_id) {
            anyhow::bail!("Reading {}: expected parameter_id {}, got {:?}", index, expected_id, id);
        }

        let timestamp = reading
            .get("timestamp")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Reading {}: missing timestamp", index))?;
        chrono::DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| anyhow::anyhow!("Reading {}: invalid timestamp {}: {}", index, timestamp, e))?;

        if !reading.get("value").map(Value::is_number).unwrap_or(false) {
            anyhow::bail!("Reading {}: value is not a number", index);
        }
        if reading.get("quality").and_then(|v| v.as_str()) != Some("GOOD") {
            anyhow::bail!("Reading {}: quality must be GOOD", index);
        }
        if reading.get("source").and_then(|v| v.as_str()) != Some("DCS") {
            anyhow::bail!("Reading {}: source must be DCS", index);
        }
    }

    Ok(())
}

/// Accès par chemin pointé; les segments numériques indexent les tableaux
pub fn get_nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for part in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}
