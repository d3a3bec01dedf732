pub mod json_backend;

use crate::core::errors::Result;
use crate::domain::StudentRoster;
use crate::ledger::Ledger;

/// Abstraction over persistence backends capable of storing ledger
/// snapshots, their backups, and the student roster.
pub trait StorageBackend: Send + Sync {
    fn save_ledger(&self, ledger: &Ledger, name: &str) -> Result<()>;
    fn load_ledger(&self, name: &str) -> Result<Ledger>;
    fn list_ledgers(&self) -> Result<Vec<String>>;
    fn backup_ledger(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<()>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore_backup(&self, name: &str, backup_name: &str) -> Result<Ledger>;
    fn save_roster(&self, roster: &StudentRoster) -> Result<()>;
    fn load_roster(&self) -> Result<StudentRoster>;
}

pub use json_backend::JsonStorage;
