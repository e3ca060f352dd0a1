use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("field `{0}` must be a finite number")]
    InvalidNumber(&'static str),
}

impl DomainError {
    /// Message returned to HTTP clients.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields(_) => "Todos os campos são obrigatórios!".to_owned(),
            Self::EmptyField(field) => format!("O campo `{field}` não pode ser vazio."),
            Self::InvalidNumber(field) => format!("O campo `{field}` deve ser um número válido."),
        }
    }
}
