//! The fixed tool catalog of the clinic agent.
//!
//! One query tool per backend query shape, two report exports and the
//! opt-in raw query tool. Built once when the registry is created.

use crate::gateway::model::{
    Cita, Diagnostico, Especialidad, Horario, Triaje, Usuario, extract_list, extract_one,
};
use crate::gateway::queries;
use crate::report::ReportFormat;

use super::tool::{Binding, ParamKind, ParamSpec, ToolSpec};

/// Name of the raw GraphQL tool.
pub const RAW_QUERY_TOOL: &str = "execute_graphql_query";

const fn id_param(name: &'static str, variable: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Id,
        required: true,
        description,
        variable,
    }
}

fn export_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec {
            name: "rows",
            kind: ParamKind::Rows,
            required: true,
            description: "Filas del reporte: lista de objetos con las mismas claves. \
                          Las claves del primer objeto son los encabezados.",
            variable: "rows",
        },
        ParamSpec {
            name: "nombre_archivo",
            kind: ParamKind::Text,
            required: false,
            description: "Nombre opcional del archivo (sin ruta).",
            variable: "nombre_archivo",
        },
    ]
}

/// Builds the tool catalog in the order it is shown to the engine.
#[must_use]
pub fn catalog(allow_raw_queries: bool) -> Vec<ToolSpec> {
    let mut specs = vec![
        ToolSpec {
            name: "get_especialidades",
            description: "Lista todas las especialidades médicas de la clínica.",
            params: Vec::new(),
            binding: Binding::Query {
                template: queries::ESPECIALIDADES,
                root_field: "especialidades",
                extract: extract_list::<Especialidad>,
            },
        },
        ToolSpec {
            name: "get_especialidad_por_id",
            description: "Obtiene una especialidad por su ID. Devuelve null si no existe.",
            params: vec![id_param("id", "id", "ID de la especialidad.")],
            binding: Binding::Query {
                template: queries::ESPECIALIDAD_POR_ID,
                root_field: "especialidad",
                extract: extract_one::<Especialidad>,
            },
        },
        ToolSpec {
            name: "get_usuarios",
            description: "Lista todos los usuarios (pacientes, médicos y personal).",
            params: Vec::new(),
            binding: Binding::Query {
                template: queries::USUARIOS,
                root_field: "usuarios",
                extract: extract_list::<Usuario>,
            },
        },
        ToolSpec {
            name: "get_medicos",
            description: "Lista los usuarios con rol de médico y su especialidad.",
            params: Vec::new(),
            binding: Binding::Query {
                template: queries::MEDICOS,
                root_field: "medicos",
                extract: extract_list::<Usuario>,
            },
        },
        ToolSpec {
            name: "get_usuarios_por_especialidad",
            description: "Lista los usuarios asociados a una especialidad.",
            params: vec![id_param(
                "especialidad_id",
                "especialidadId",
                "ID de la especialidad.",
            )],
            binding: Binding::Query {
                template: queries::USUARIOS_POR_ESPECIALIDAD,
                root_field: "usuariosPorEspecialidad",
                extract: extract_list::<Usuario>,
            },
        },
        ToolSpec {
            name: "get_citas",
            description: "Lista todas las citas con paciente y médico.",
            params: Vec::new(),
            binding: Binding::Query {
                template: queries::CITAS,
                root_field: "citas",
                extract: extract_list::<Cita>,
            },
        },
        ToolSpec {
            name: "get_citas_por_usuario",
            description: "Lista las citas de un usuario (paciente).",
            params: vec![id_param("usuario_id", "usuarioId", "ID del usuario.")],
            binding: Binding::Query {
                template: queries::CITAS_POR_USUARIO,
                root_field: "citasPorUsuario",
                extract: extract_list::<Cita>,
            },
        },
        ToolSpec {
            name: "get_citas_por_medico",
            description: "Lista las citas atendidas por un médico.",
            params: vec![id_param("medico_id", "medicoId", "ID del médico.")],
            binding: Binding::Query {
                template: queries::CITAS_POR_MEDICO,
                root_field: "citasPorMedico",
                extract: extract_list::<Cita>,
            },
        },
        ToolSpec {
            name: "get_diagnosticos_por_paciente",
            description: "Lista los diagnósticos registrados para un paciente.",
            params: vec![id_param("paciente_id", "pacienteId", "ID del paciente.")],
            binding: Binding::Query {
                template: queries::DIAGNOSTICOS_POR_PACIENTE,
                root_field: "diagnosticosPorPaciente",
                extract: extract_list::<Diagnostico>,
            },
        },
        ToolSpec {
            name: "get_triajes_por_paciente",
            description: "Lista los triajes (signos vitales) de un paciente.",
            params: vec![id_param("paciente_id", "pacienteId", "ID del paciente.")],
            binding: Binding::Query {
                template: queries::TRIAJES_POR_PACIENTE,
                root_field: "triajesPorPaciente",
                extract: extract_list::<Triaje>,
            },
        },
        ToolSpec {
            name: "get_horarios_disponibles",
            description: "Lista los horarios disponibles de un médico en una fecha.",
            params: vec![
                id_param("medico_id", "medicoId", "ID del médico."),
                ParamSpec {
                    name: "fecha",
                    kind: ParamKind::Date,
                    required: true,
                    description: "Fecha a consultar.",
                    variable: "fecha",
                },
            ],
            binding: Binding::Query {
                template: queries::HORARIOS_DISPONIBLES,
                root_field: "horariosDisponibles",
                extract: extract_list::<Horario>,
            },
        },
        ToolSpec {
            name: "generar_reporte_pdf",
            description: "Genera un reporte PDF con una tabla a partir de filas de datos. \
                          Usar solo cuando el usuario pide un reporte o archivo PDF.",
            params: export_params(),
            binding: Binding::Export(ReportFormat::Pdf),
        },
        ToolSpec {
            name: "generar_reporte_excel",
            description: "Genera un reporte Excel (.xlsx) a partir de filas de datos. \
                          Usar solo cuando el usuario pide un reporte Excel u hoja de cálculo.",
            params: export_params(),
            binding: Binding::Export(ReportFormat::Xlsx),
        },
    ];

    if allow_raw_queries {
        specs.push(ToolSpec {
            name: RAW_QUERY_TOOL,
            description: "Ejecuta una consulta GraphQL arbitraria contra el backend de la \
                          clínica. Usar solo si ninguna otra herramienta sirve.",
            params: vec![
                ParamSpec {
                    name: "query",
                    kind: ParamKind::Text,
                    required: true,
                    description: "Documento GraphQL completo.",
                    variable: "query",
                },
                ParamSpec {
                    name: "variables",
                    kind: ParamKind::Object,
                    required: false,
                    description: "Variables de la consulta.",
                    variable: "variables",
                },
            ],
            binding: Binding::RawQuery,
        });
    }

    specs
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let specs = catalog(true);
        let names: HashSet<&str> = specs.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), specs.len());
    }

    #[test]
    fn test_raw_query_tool_is_opt_in() {
        assert!(!catalog(false).iter().any(|s| s.name == RAW_QUERY_TOOL));
        assert!(catalog(true).iter().any(|s| s.name == RAW_QUERY_TOOL));
        assert_eq!(catalog(true).len(), catalog(false).len() + 1);
    }

    #[test]
    fn test_catalog_contains_all_backend_tools() {
        let specs = catalog(false);
        for name in [
            "get_especialidades",
            "get_especialidad_por_id",
            "get_usuarios",
            "get_medicos",
            "get_usuarios_por_especialidad",
            "get_citas",
            "get_citas_por_usuario",
            "get_citas_por_medico",
            "get_diagnosticos_por_paciente",
            "get_triajes_por_paciente",
            "get_horarios_disponibles",
            "generar_reporte_pdf",
            "generar_reporte_excel",
        ] {
            assert!(specs.iter().any(|s| s.name == name), "missing {name}");
        }
    }

    #[test]
    fn test_query_variables_appear_in_templates() {
        for spec in catalog(false) {
            if let Binding::Query { template, .. } = spec.binding {
                for param in &spec.params {
                    assert!(
                        template.contains(&format!("${}", param.variable)),
                        "{} does not declare ${}",
                        spec.name,
                        param.variable
                    );
                }
            }
        }
    }
}
