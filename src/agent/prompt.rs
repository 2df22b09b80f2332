//! System prompt for the clinic agent.
//!
//! The compiled-in prompt can be replaced by a file (`CLINIC_AGENT_PROMPT_FILE`).
//! The placeholder `{fecha_actual}` is substituted with the current date so the
//! engine can resolve relative dates such as "mañana".

use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;

/// Placeholder replaced with the current date.
const DATE_PLACEHOLDER: &str = "{fecha_actual}";

/// Default system prompt.
pub const SYSTEM_PROMPT: &str = r#"Eres el asistente de datos de una clínica médica. Respondes en español a preguntas sobre especialidades, usuarios, médicos, citas, diagnósticos, triajes y horarios disponibles.

La fecha de hoy es {fecha_actual}.

## Cómo trabajar

1. Usa las herramientas para obtener datos reales del sistema. Nunca inventes registros, nombres ni IDs.
2. Si necesitas un ID que el usuario no dio (por ejemplo, el de un médico a partir de su nombre), búscalo primero con la herramienta de listado correspondiente.
3. Las fechas se envían siempre en formato YYYY-MM-DD.
4. Si una herramienta devuelve un error, explica el problema al usuario en lugar de reintentar indefinidamente.
5. Si una consulta no devuelve resultados, dilo claramente.

## Reportes

Cuando el usuario pida un reporte, archivo, PDF o Excel:
1. Obtén los datos con las herramientas de consulta.
2. Llama a `generar_reporte_pdf` o `generar_reporte_excel` con las filas (una lista de objetos con las mismas claves, en el orden de columnas deseado).
3. Responde con una frase breve que indique qué contiene el reporte.

Si no hay filas que exportar, no generes el archivo e infórmalo.

## Formato de respuesta

Responde de forma breve y clara. Usa listas o tablas en markdown cuando haya varios registros."#;

/// Loads the system prompt, falling back to [`SYSTEM_PROMPT`] when the file
/// is absent or unreadable.
#[must_use]
pub fn load_system_prompt(path: Option<&Path>) -> String {
    path.and_then(|p| match std::fs::read_to_string(p) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!(path = %p.display(), "prompt file is empty, using default prompt");
            None
        }
        Err(e) => {
            warn!(path = %p.display(), error = %e, "cannot read prompt file, using default prompt");
            None
        }
    })
    .unwrap_or_else(|| SYSTEM_PROMPT.to_string())
}

/// Substitutes the current date into a prompt template.
#[must_use]
pub fn render_system_prompt(template: &str, today: NaiveDate) -> String {
    template.replace(DATE_PLACEHOLDER, &today.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_prompt_mentions_export_tools() {
        assert!(SYSTEM_PROMPT.contains("generar_reporte_pdf"));
        assert!(SYSTEM_PROMPT.contains("generar_reporte_excel"));
        assert!(SYSTEM_PROMPT.contains(DATE_PLACEHOLDER));
    }

    #[test]
    fn test_render_substitutes_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap_or_default();
        let rendered = render_system_prompt(SYSTEM_PROMPT, today);
        assert!(rendered.contains("2025-03-14"));
        assert!(!rendered.contains(DATE_PLACEHOLDER));
    }

    #[test]
    fn test_load_without_path_uses_default() {
        assert_eq!(load_system_prompt(None), SYSTEM_PROMPT);
    }

    #[test]
    fn test_load_missing_file_uses_default() {
        let prompt = load_system_prompt(Some(Path::new("/nonexistent/prompt.md")));
        assert_eq!(prompt, SYSTEM_PROMPT);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("temp: {e}"));
        write!(file, "Prompt personalizado {{fecha_actual}}")
            .unwrap_or_else(|e| panic!("write: {e}"));
        let prompt = load_system_prompt(Some(file.path()));
        assert_eq!(prompt, "Prompt personalizado {fecha_actual}");
    }
}
