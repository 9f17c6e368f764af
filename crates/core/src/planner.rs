use crate::store::FileStore;
use crate::template::NameTemplate;
use anyhow::Result;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const DEFAULT_SEPARATOR: &str = " - ";

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub folder: PathBuf,
    pub template: NameTemplate,
    pub separator: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: OsString,
    pub path: PathBuf,
    /// Lower-cased, including the leading dot. Empty when the name has none.
    pub extension: String,
}

impl FileEntry {
    pub fn new(folder: &Path, name: &OsStr) -> Self {
        Self {
            name: name.to_os_string(),
            path: folder.join(name),
            extension: extension_of(&name.to_string_lossy()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenameCandidate {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub resolved_name: String,
    pub final_name: String,
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub folder: PathBuf,
    pub template: String,
    pub candidates: Vec<RenameCandidate>,
}

impl RenamePlan {
    pub fn changed(&self) -> impl Iterator<Item = &RenameCandidate> {
        self.candidates.iter().filter(|c| c.changed)
    }
}

pub fn generate_plan<S: FileStore + ?Sized>(options: &PlanOptions, store: &S) -> Result<RenamePlan> {
    let names = store.list_entries(&options.folder)?;
    plan_entries(options, &names, store)
}

/// Builds a plan from an existing listing of `options.folder`.
pub fn plan_entries<S: FileStore + ?Sized>(
    options: &PlanOptions,
    names: &[OsString],
    store: &S,
) -> Result<RenamePlan> {
    let entries: Vec<FileEntry> = names
        .iter()
        .map(|name| FileEntry::new(&options.folder, name))
        .collect();
    let final_names = resolve_batch_names(&entries, &options.template, &options.separator, store)?;

    let candidates = entries
        .into_iter()
        .zip(final_names)
        .map(|(entry, (resolved_name, final_name))| {
            let target_path = options
                .folder
                .join(format!("{}{}", final_name, entry.extension));
            RenameCandidate {
                changed: target_path != entry.path,
                original_path: entry.path,
                target_path,
                resolved_name,
                final_name,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        folder = %options.folder.display(),
        planned = candidates.len(),
        "rename plan ready"
    );

    Ok(RenamePlan {
        folder: options.folder.clone(),
        template: options.template.as_str().to_string(),
        candidates,
    })
}

/// Resolves the template for every entry, then disambiguates duplicates.
/// Returns `(resolved name, final name)` aligned with `entries`.
pub fn resolve_batch_names<S: FileStore + ?Sized>(
    entries: &[FileEntry],
    template: &NameTemplate,
    separator: &str,
    store: &S,
) -> Result<Vec<(String, String)>> {
    let resolved = entries
        .iter()
        .map(|entry| template.resolve(&entry.path, store))
        .collect::<Result<Vec<_>>>()?;
    let finals = assign_final_names(&resolved, separator);
    Ok(resolved.into_iter().zip(finals).collect())
}

/// Two passes: count every resolved name first, then number the names that
/// occur more than once in input order, starting at 1.
pub fn assign_final_names(resolved: &[String], separator: &str) -> Vec<String> {
    let mut totals = HashMap::<&str, usize>::new();
    for name in resolved {
        *totals.entry(name.as_str()).or_default() += 1;
    }

    let mut current = HashMap::<&str, usize>::new();
    resolved
        .iter()
        .map(|name| {
            let ordinal = current.entry(name.as_str()).or_default();
            *ordinal += 1;
            if totals[name.as_str()] == 1 {
                name.clone()
            } else {
                format!("{}{}{}", name, separator, ordinal)
            }
        })
        .collect()
}

/// First and second example output names, with `.ext` standing in for the
/// real extension.
pub fn preview_names(template: &NameTemplate, separator: &str) -> [String; 2] {
    let base = template.as_str();
    [
        format!("{}{}1.ext", base, separator),
        format!("{}{}2.ext", base, separator),
    ]
}

/// Lower-cased extension including the dot, following Node's `path.extname`:
/// a single leading dot belongs to the name, so `.bashrc` has no extension
/// while `..foo` has `.foo`.
pub fn extension_of(name: &str) -> String {
    if name == ".." {
        return String::new();
    }
    match name.rfind('.') {
        Some(pos) if pos > 0 => name[pos..].to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::{local_date, MemoryStore};
    use crate::template::PlaceholderMode;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn os_names(values: &[&str]) -> Vec<OsString> {
        values.iter().map(|v| OsString::from(*v)).collect()
    }

    fn options(template: &str) -> PlanOptions {
        PlanOptions {
            folder: PathBuf::from("/photos"),
            template: NameTemplate::new(template, PlaceholderMode::First),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    fn target_names(plan: &RenamePlan) -> Vec<String> {
        plan.candidates
            .iter()
            .map(|c| {
                c.target_path
                    .file_name()
                    .map(|v| v.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn distinct_names_get_no_suffix() {
        let resolved = names(&["a", "b", "c"]);
        assert_eq!(assign_final_names(&resolved, DEFAULT_SEPARATOR), resolved);
    }

    #[test]
    fn duplicates_are_numbered_in_input_order() {
        let resolved = names(&["photo", "other", "photo"]);
        assert_eq!(
            assign_final_names(&resolved, DEFAULT_SEPARATOR),
            names(&["photo - 1", "other", "photo - 2"])
        );
    }

    #[test]
    fn ordinals_are_counted_per_name() {
        let resolved = names(&["x", "y", "x", "y", "x"]);
        assert_eq!(
            assign_final_names(&resolved, "_"),
            names(&["x_1", "y_1", "x_2", "y_2", "x_3"])
        );
    }

    #[test]
    fn extension_rules() {
        assert_eq!(extension_of("A.TXT"), ".txt");
        assert_eq!(extension_of("archive.tar.GZ"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of(".config.Toml"), ".toml");
        assert_eq!(extension_of("name."), ".");
    }

    #[test]
    fn only_one_leading_dot_belongs_to_the_name() {
        assert_eq!(extension_of("..foo"), ".foo");
        assert_eq!(extension_of("..FOO"), ".foo");
        assert_eq!(extension_of(".."), "");
        assert_eq!(extension_of("..."), ".");
        assert_eq!(extension_of("."), "");
    }

    #[test]
    fn modified_at_dates_make_names_unique() {
        let store = MemoryStore::with_files(&[
            ("A.TXT", local_date(2024, 1, 1)),
            ("B.txt", local_date(2024, 1, 2)),
        ]);
        let plan = generate_plan(&options("{modifiedAt}"), &store).expect("plan");
        assert_eq!(target_names(&plan), names(&["2024-01-01.txt", "2024-01-02.txt"]));
        assert_eq!(plan.candidates[0].resolved_name, "2024-01-01");
    }

    #[test]
    fn static_template_numbers_every_file_and_keeps_extensions() {
        let store = MemoryStore::with_files(&[
            ("x.png", local_date(2024, 1, 1)),
            ("y.jpg", local_date(2024, 1, 1)),
        ]);
        let plan = generate_plan(&options("photo"), &store).expect("plan");
        assert_eq!(target_names(&plan), names(&["photo - 1.png", "photo - 2.jpg"]));
    }

    #[test]
    fn same_modified_date_collides() {
        let store = MemoryStore::with_files(&[
            ("a.jpg", local_date(2024, 5, 1)),
            ("b.jpg", local_date(2024, 5, 1)),
            ("c.jpg", local_date(2024, 5, 2)),
        ]);
        let plan = generate_plan(&options("trip {modifiedAt}"), &store).expect("plan");
        assert_eq!(
            target_names(&plan),
            names(&[
                "trip 2024-05-01 - 1.jpg",
                "trip 2024-05-01 - 2.jpg",
                "trip 2024-05-02.jpg"
            ])
        );
    }

    #[test]
    fn unchanged_target_is_flagged() {
        let store = MemoryStore::with_files(&[("photo.jpg", local_date(2024, 1, 1))]);
        let plan = generate_plan(&options("photo"), &store).expect("plan");
        assert!(!plan.candidates[0].changed);
        assert_eq!(plan.changed().count(), 0);
    }

    #[test]
    fn plan_entries_uses_given_listing() {
        let store = MemoryStore::with_files(&[("a.jpg", local_date(2024, 1, 1))]);
        let plan = plan_entries(&options("new"), &os_names(&["a.jpg"]), &store).expect("plan");
        assert_eq!(plan.candidates.len(), 1);
        assert_eq!(plan.candidates[0].original_path, PathBuf::from("/photos/a.jpg"));
        assert_eq!(plan.candidates[0].target_path, PathBuf::from("/photos/new.jpg"));
    }

    #[test]
    fn preview_shows_first_two_names() {
        let template = NameTemplate::new("holiday", PlaceholderMode::First);
        assert_eq!(
            preview_names(&template, DEFAULT_SEPARATOR),
            ["holiday - 1.ext".to_string(), "holiday - 2.ext".to_string()]
        );
    }
}
