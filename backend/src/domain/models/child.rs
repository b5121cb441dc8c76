use uuid::Uuid;

use super::language::Language;

#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub id: Uuid,
    pub first_name: String,
}

/// A guardian is identified by the id of the user acting on its behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct Guardian {
    pub id: Uuid,
    pub email: String,
    /// Preferred language for notifications
    pub language: Language,
}
