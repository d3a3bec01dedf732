use uuid::Uuid;

use crate::config::{Config, ConfigManager};
use crate::core::access::ActorContext;
use crate::core::errors::CliError;
use crate::domain::{BillingMonth, Student, StudentRoster};
use crate::ledger::Ledger;
use crate::storage::{JsonStorage, StorageBackend};

const DEFAULT_LEDGER_NAME: &str = "school";

/// Mutable state threaded through one CLI invocation: the active ledger,
/// the roster, and the storage backing both.
pub struct ShellContext {
    pub ledger: Ledger,
    pub roster: StudentRoster,
    pub storage: JsonStorage,
    pub config: Config,
    pub actor: ActorContext,
}

impl ShellContext {
    /// Loads roster and the last-opened ledger from the app data dir,
    /// falling back to a fresh ledger. The CLI acts with the full
    /// manage-ledger capability.
    pub fn bootstrap() -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        let storage = JsonStorage::new(None, Some(config.backup_retention))?;
        let roster = storage.load_roster()?;
        let name = config
            .last_opened_ledger
            .clone()
            .or(storage.last_ledger()?);
        let ledger = match name {
            Some(name) => storage
                .load_ledger(&name)
                .unwrap_or_else(|_| Ledger::new(name)),
            None => Ledger::new(DEFAULT_LEDGER_NAME),
        };
        Ok(Self {
            ledger,
            roster,
            storage,
            config,
            actor: ActorContext::manager(Uuid::new_v4()),
        })
    }

    /// Writes the ledger and roster back and remembers the active ledger.
    pub fn persist(&self) -> Result<(), CliError> {
        self.storage.save_ledger(&self.ledger, &self.ledger.name)?;
        self.storage.save_roster(&self.roster)?;
        self.storage.record_last_ledger(Some(&self.ledger.name))?;
        Ok(())
    }

    /// Resolves a student argument given as an id or a (case-insensitive)
    /// name.
    pub fn resolve_student(&self, arg: &str) -> Result<Student, CliError> {
        if let Ok(id) = Uuid::parse_str(arg) {
            return self
                .roster
                .students
                .iter()
                .find(|student| student.id == id)
                .cloned()
                .ok_or_else(|| CliError::Input(format!("no student with id {arg}")));
        }
        self.roster
            .find_by_name(arg)
            .cloned()
            .ok_or_else(|| CliError::Input(format!("no student named `{arg}`")))
    }

    /// Resolves the fee period for a student and month, if one exists.
    pub fn resolve_period(&self, student_id: Uuid, month: BillingMonth) -> Result<Uuid, CliError> {
        self.ledger
            .period_for(student_id, month)
            .map(|period| period.id)
            .ok_or_else(|| {
                CliError::Input(format!("no fee period for that student in {month}"))
            })
    }
}
