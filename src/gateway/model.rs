//! Typed payload shapes of the clinic schema.
//!
//! The backend boundary is `serde_json::Value`; each query tool pulls
//! `data.<root_field>` through one of these structs before the payload goes
//! back to the engine, so shape drift surfaces as an extraction failure
//! instead of leaking half-parsed JSON. Absent optional fields serialize as
//! `null`, so every record of a list carries the same keys.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Function that extracts and re-serializes `data.<field>`.
pub type Extractor = fn(&Value, &str) -> Result<Value, ToolError>;

/// Specialty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Especialidad {
    /// Identifier.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Display name.
    pub nombre: String,
    /// Free-text description.
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// Short reference to a related person or specialty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referencia {
    /// Identifier.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// First name or specialty name.
    #[serde(default)]
    pub nombre: Option<String>,
    /// Last name.
    #[serde(default)]
    pub apellido: Option<String>,
}

/// User of the clinic (patient, doctor, staff).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    /// Identifier.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// First name.
    pub nombre: String,
    /// Last name.
    #[serde(default)]
    pub apellido: Option<String>,
    /// E-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub telefono: Option<String>,
    /// Role name.
    #[serde(default)]
    pub rol: Option<String>,
    /// Specialty, for doctors.
    #[serde(default)]
    pub especialidad: Option<Referencia>,
}

/// Appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cita {
    /// Identifier.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Date of the appointment.
    pub fecha: String,
    /// Time of the appointment.
    #[serde(default)]
    pub hora: Option<String>,
    /// Status (scheduled, done, cancelled...).
    #[serde(default)]
    pub estado: Option<String>,
    /// Reason for the visit.
    #[serde(default)]
    pub motivo: Option<String>,
    /// Patient.
    #[serde(default)]
    pub paciente: Option<Referencia>,
    /// Attending doctor.
    #[serde(default)]
    pub medico: Option<Referencia>,
}

/// Diagnosis recorded for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostico {
    /// Identifier.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Diagnosis text.
    pub descripcion: String,
    /// Date recorded.
    #[serde(default)]
    pub fecha: Option<String>,
    /// Additional notes.
    #[serde(default)]
    pub observaciones: Option<String>,
    /// Diagnosing doctor.
    #[serde(default)]
    pub medico: Option<Referencia>,
}

/// Triage record (vital signs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triaje {
    /// Identifier.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Date recorded.
    #[serde(default)]
    pub fecha: Option<String>,
    /// Blood pressure, e.g. `120/80`.
    #[serde(default, alias = "presionArterial")]
    pub presion_arterial: Option<String>,
    /// Body temperature.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub temperatura: Option<f64>,
    /// Heart rate.
    #[serde(default, alias = "frecuenciaCardiaca", deserialize_with = "de_opt_number")]
    pub frecuencia_cardiaca: Option<f64>,
    /// Weight.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub peso: Option<f64>,
    /// Height.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub altura: Option<f64>,
    /// Additional notes.
    #[serde(default)]
    pub observaciones: Option<String>,
}

/// Free or busy slot in a doctor's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horario {
    /// Slot start.
    #[serde(alias = "horaInicio")]
    pub hora_inicio: String,
    /// Slot end.
    #[serde(default, alias = "horaFin")]
    pub hora_fin: Option<String>,
    /// Whether the slot can be booked.
    #[serde(default)]
    pub disponible: Option<bool>,
}

/// Accepts an identifier given as a string or an integer.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Accepts a number, a numeric string or null.
fn de_opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("'{s}' is not a number"))),
        Some(other) => Err(de::Error::custom(format!("expected number, got {other}"))),
    }
}

/// Returns `data.<field>` or an extraction error when it is absent.
fn root_field<'a>(data: &'a Value, field: &str) -> Result<&'a Value, ToolError> {
    data.get(field).ok_or_else(|| ToolError::Extraction {
        field: field.to_string(),
        message: "field missing from response data".to_string(),
    })
}

fn reserialize<T: Serialize>(value: &T, field: &str) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Extraction {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Extracts `data.<field>` as a list of `T`.
///
/// A `null` list is treated as empty.
pub fn extract_list<T>(data: &Value, field: &str) -> Result<Value, ToolError>
where
    T: DeserializeOwned + Serialize,
{
    let raw = root_field(data, field)?;
    if raw.is_null() {
        return Ok(Value::Array(Vec::new()));
    }
    let items = Vec::<T>::deserialize(raw).map_err(|e| ToolError::Extraction {
        field: field.to_string(),
        message: e.to_string(),
    })?;
    reserialize(&items, field)
}

/// Extracts `data.<field>` as a single optional `T` (`null` when not found).
pub fn extract_one<T>(data: &Value, field: &str) -> Result<Value, ToolError>
where
    T: DeserializeOwned + Serialize,
{
    let raw = root_field(data, field)?;
    let item = Option::<T>::deserialize(raw).map_err(|e| ToolError::Extraction {
        field: field.to_string(),
        message: e.to_string(),
    })?;
    reserialize(&item, field)
}

/// Passes `data.<field>` through untouched.
pub fn extract_raw(data: &Value, field: &str) -> Result<Value, ToolError> {
    root_field(data, field).cloned()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_id_accepts_string_and_number() {
        let a: Especialidad = serde_json::from_value(json!({"id": 3, "nombre": "Cardiología"}))
            .unwrap_or_else(|e| panic!("decode failed: {e}"));
        let b: Especialidad = serde_json::from_value(json!({"id": "3", "nombre": "Cardiología"}))
            .unwrap_or_else(|e| panic!("decode failed: {e}"));
        assert_eq!(a, b);
        assert_eq!(a.id, "3");
    }

    #[test]
    fn test_id_rejects_bool() {
        let r: Result<Especialidad, _> =
            serde_json::from_value(json!({"id": true, "nombre": "x"}));
        assert!(r.is_err());
    }

    #[test]
    fn test_extract_list_reserializes_typed_shape() {
        let data = json!({"especialidades": [
            {"id": 1, "nombre": "Cardiología", "descripcion": null, "extra": "ignored"},
            {"id": "2", "nombre": "Pediatría", "descripcion": "Niños"}
        ]});
        let out = extract_list::<Especialidad>(&data, "especialidades")
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        assert_eq!(
            out,
            json!([
                {"id": "1", "nombre": "Cardiología", "descripcion": null},
                {"id": "2", "nombre": "Pediatría", "descripcion": "Niños"}
            ])
        );
    }

    #[test]
    fn test_extract_list_null_is_empty() {
        let data = json!({"citas": null});
        let out = extract_list::<Cita>(&data, "citas")
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        assert_eq!(out, json!([]));
    }

    #[test]
    fn test_extract_list_missing_field() {
        let data = json!({"otra": []});
        let err = extract_list::<Cita>(&data, "citas").err();
        assert!(matches!(err, Some(ToolError::Extraction { ref field, .. }) if field == "citas"));
    }

    #[test]
    fn test_extract_list_shape_mismatch() {
        let data = json!({"citas": [{"id": 1}]});
        let err = extract_list::<Cita>(&data, "citas").err();
        assert!(matches!(err, Some(ToolError::Extraction { .. })));
    }

    #[test]
    fn test_extract_one_null_passes_through() {
        let data = json!({"especialidad": null});
        let out = extract_one::<Especialidad>(&data, "especialidad")
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        assert!(out.is_null());
    }

    #[test]
    fn test_triaje_accepts_camel_case_and_numeric_strings() {
        let t: Triaje = serde_json::from_value(json!({
            "id": 9,
            "presionArterial": "120/80",
            "temperatura": "36.6",
            "frecuenciaCardiaca": 72,
            "peso": null
        }))
        .unwrap_or_else(|e| panic!("decode failed: {e}"));
        assert_eq!(t.presion_arterial.as_deref(), Some("120/80"));
        assert_eq!(t.temperatura, Some(36.6));
        assert_eq!(t.frecuencia_cardiaca, Some(72.0));
        assert!(t.peso.is_none());
    }

    #[test]
    fn test_horario_camel_case() {
        let h: Horario = serde_json::from_value(
            json!({"horaInicio": "09:00", "horaFin": "09:30", "disponible": true}),
        )
        .unwrap_or_else(|e| panic!("decode failed: {e}"));
        assert_eq!(h.hora_inicio, "09:00");
        assert_eq!(h.disponible, Some(true));
    }
}
