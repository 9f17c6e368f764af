mod apply;
mod config;
mod date;
mod planner;
mod store;
mod template;

pub use apply::{apply_plan, RenameError, RenameFailure, RenameOperation, RenameReport};
pub use config::{app_paths, load_config, load_config_from, AppConfig, AppPaths};
pub use date::{format_date, today};
pub use planner::{
    assign_final_names, extension_of, generate_plan, plan_entries, preview_names,
    resolve_batch_names, FileEntry, PlanOptions, RenameCandidate, RenamePlan, DEFAULT_SEPARATOR,
};
pub use store::{FileStore, LocalFs};
pub use template::{NameTemplate, Placeholder, PlaceholderMode};
