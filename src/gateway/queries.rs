//! Static GraphQL documents for the clinic schema.
//!
//! Variable names match the `variable` of each tool parameter in the catalog.

/// All specialties.
pub const ESPECIALIDADES: &str = "query GetEspecialidades {
  especialidades { id nombre descripcion }
}";

/// One specialty by id.
pub const ESPECIALIDAD_POR_ID: &str = "query GetEspecialidad($id: ID!) {
  especialidad(id: $id) { id nombre descripcion }
}";

/// All users.
pub const USUARIOS: &str = "query GetUsuarios {
  usuarios { id nombre apellido email telefono rol especialidad { id nombre } }
}";

/// Users with the doctor role.
pub const MEDICOS: &str = "query GetMedicos {
  medicos { id nombre apellido email telefono rol especialidad { id nombre } }
}";

/// Users attached to a specialty.
pub const USUARIOS_POR_ESPECIALIDAD: &str = "query GetUsuariosPorEspecialidad($especialidadId: ID!) {
  usuariosPorEspecialidad(especialidadId: $especialidadId) {
    id nombre apellido email telefono rol especialidad { id nombre }
  }
}";

/// All appointments.
pub const CITAS: &str = "query GetCitas {
  citas {
    id fecha hora estado motivo
    paciente { id nombre apellido }
    medico { id nombre apellido }
  }
}";

/// Appointments of one user.
pub const CITAS_POR_USUARIO: &str = "query GetCitasPorUsuario($usuarioId: ID!) {
  citasPorUsuario(usuarioId: $usuarioId) {
    id fecha hora estado motivo
    paciente { id nombre apellido }
    medico { id nombre apellido }
  }
}";

/// Appointments of one doctor.
pub const CITAS_POR_MEDICO: &str = "query GetCitasPorMedico($medicoId: ID!) {
  citasPorMedico(medicoId: $medicoId) {
    id fecha hora estado motivo
    paciente { id nombre apellido }
    medico { id nombre apellido }
  }
}";

/// Diagnoses of one patient.
pub const DIAGNOSTICOS_POR_PACIENTE: &str = "query GetDiagnosticosPorPaciente($pacienteId: ID!) {
  diagnosticosPorPaciente(pacienteId: $pacienteId) {
    id descripcion fecha observaciones
    medico { id nombre apellido }
  }
}";

/// Triage records of one patient.
pub const TRIAJES_POR_PACIENTE: &str = "query GetTriajesPorPaciente($pacienteId: ID!) {
  triajesPorPaciente(pacienteId: $pacienteId) {
    id fecha presionArterial temperatura frecuenciaCardiaca peso altura observaciones
  }
}";

/// Free slots of a doctor on a date.
pub const HORARIOS_DISPONIBLES: &str = "query GetHorariosDisponibles($medicoId: ID!, $fecha: String!) {
  horariosDisponibles(medicoId: $medicoId, fecha: $fecha) { horaInicio horaFin disponible }
}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_declare_their_variables() {
        let cases = [
            (ESPECIALIDAD_POR_ID, "$id"),
            (USUARIOS_POR_ESPECIALIDAD, "$especialidadId"),
            (CITAS_POR_USUARIO, "$usuarioId"),
            (CITAS_POR_MEDICO, "$medicoId"),
            (DIAGNOSTICOS_POR_PACIENTE, "$pacienteId"),
            (TRIAJES_POR_PACIENTE, "$pacienteId"),
            (HORARIOS_DISPONIBLES, "$fecha"),
        ];
        for (doc, var) in cases {
            assert!(doc.contains(&format!("{var}:")), "{var} not declared");
        }
    }

    #[test]
    fn test_documents_have_balanced_braces() {
        for doc in [ESPECIALIDADES, USUARIOS, MEDICOS, CITAS, HORARIOS_DISPONIBLES] {
            let open = doc.matches('{').count();
            let close = doc.matches('}').count();
            assert_eq!(open, close);
        }
    }
}
