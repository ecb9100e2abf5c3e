mod salary_entry;
mod tax_bracket;
mod tax_calculation;
mod tax_schedule;

pub use salary_entry::{EntryError, NewSalaryEntry, SalaryEntry};
pub use tax_bracket::TaxBracket;
pub use tax_calculation::{BracketContribution, TaxCalculationResult};
pub use tax_schedule::{ScheduleError, TaxSchedule};
