use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::Student;

/// Caller identity and capabilities, as established by the embedding
/// application's identity layer. The engine only enforces what it is
/// handed: the manage-ledger capability gates every mutation, and an
/// optional teacher scope restricts the caller to that teacher's students.
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    pub actor_id: Uuid,
    pub can_manage_ledger: bool,
    pub teacher_scope: Option<Uuid>,
}

impl ActorContext {
    /// Full-capability actor with no teacher restriction.
    pub fn manager(actor_id: Uuid) -> Self {
        Self {
            actor_id,
            can_manage_ledger: true,
            teacher_scope: None,
        }
    }

    /// Actor restricted to students assigned to the given teacher.
    pub fn teacher(actor_id: Uuid, teacher_id: Uuid) -> Self {
        Self {
            actor_id,
            can_manage_ledger: true,
            teacher_scope: Some(teacher_id),
        }
    }

    /// Actor without the manage-ledger capability.
    pub fn read_only(actor_id: Uuid) -> Self {
        Self {
            actor_id,
            can_manage_ledger: false,
            teacher_scope: None,
        }
    }

    pub fn ensure_can_manage(&self) -> ServiceResult<()> {
        if self.can_manage_ledger {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "actor {} lacks the manage-ledger capability",
                self.actor_id
            )))
        }
    }

    pub fn sees_student(&self, student: &Student) -> bool {
        match self.teacher_scope {
            Some(teacher_id) => student.teacher_id == Some(teacher_id),
            None => true,
        }
    }

    pub fn ensure_student_in_scope(&self, student: &Student) -> ServiceResult<()> {
        if self.sees_student(student) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "student {} is outside the caller's teacher scope",
                student.id
            )))
        }
    }
}
