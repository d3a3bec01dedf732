use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read model for one student as supplied by the external directory.
///
/// A `monthly_fee` of `None` marks the student as not billable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub monthly_fee: Option<f64>,
    pub parent_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            monthly_fee: None,
            parent_id: None,
            teacher_id: None,
        }
    }

    pub fn with_fee(mut self, monthly_fee: f64) -> Self {
        self.monthly_fee = Some(monthly_fee);
        self
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_teacher(mut self, teacher_id: Uuid) -> Self {
        self.teacher_id = Some(teacher_id);
        self
    }

    pub fn is_billable(&self) -> bool {
        self.monthly_fee.is_some()
    }
}

/// Seam to the external student directory.
pub trait StudentDirectory: Send + Sync {
    fn student(&self, id: Uuid) -> Option<Student>;

    fn students(&self) -> Vec<Student>;

    /// All students linked to the given parent.
    fn children_of(&self, parent_id: Uuid) -> Vec<Student> {
        self.students()
            .into_iter()
            .filter(|student| student.parent_id == Some(parent_id))
            .collect()
    }
}

/// In-memory directory implementation used by embedders, the CLI, and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentRoster {
    #[serde(default)]
    pub students: Vec<Student>,
}

impl StudentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, student: Student) -> Uuid {
        let id = student.id;
        self.students.push(student);
        id
    }

    pub fn student_mut(&mut self, id: Uuid) -> Option<&mut Student> {
        self.students.iter_mut().find(|student| student.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Student> {
        let needle = name.trim().to_lowercase();
        self.students
            .iter()
            .find(|student| student.name.trim().to_lowercase() == needle)
    }
}

impl StudentDirectory for StudentRoster {
    fn student(&self, id: Uuid) -> Option<Student> {
        self.students.iter().find(|s| s.id == id).cloned()
    }

    fn students(&self) -> Vec<Student> {
        self.students.clone()
    }
}
