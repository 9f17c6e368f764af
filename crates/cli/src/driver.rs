use crate::prompt::Prompt;
use anyhow::Result;
use bulk_renamer_core::{
    apply_plan, format_date, plan_entries, preview_names, AppConfig, FileStore, NameTemplate,
    PlanOptions, RenameReport,
};
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::path::PathBuf;

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug)]
pub enum Outcome {
    EmptyFolder,
    Cancelled,
    Renamed(RenameReport),
}

enum State {
    AwaitFolder,
    ListNonEmpty {
        folder: PathBuf,
        names: Vec<OsString>,
    },
    AwaitTemplate {
        folder: PathBuf,
        names: Vec<OsString>,
    },
    AwaitConfirmation {
        folder: PathBuf,
        names: Vec<OsString>,
        template: NameTemplate,
    },
    Renaming {
        folder: PathBuf,
        names: Vec<OsString>,
        template: NameTemplate,
    },
    Done(Outcome),
}

/// Interactive rename flow: folder, template, confirmation, rename.
pub struct Driver<P, S, C> {
    session: P,
    store: S,
    clock: C,
    config: AppConfig,
}

impl<P, S, C> Driver<P, S, C>
where
    P: Prompt,
    S: FileStore,
    C: Clock,
{
    pub fn new(session: P, store: S, clock: C, config: AppConfig) -> Self {
        Self {
            session,
            store,
            clock,
            config,
        }
    }

    pub fn run(&mut self) -> Result<Outcome> {
        let mut state = State::AwaitFolder;
        loop {
            state = match state {
                State::AwaitFolder => self.await_folder()?,
                State::ListNonEmpty { folder, names } => self.list_non_empty(folder, names)?,
                State::AwaitTemplate { folder, names } => self.await_template(folder, names)?,
                State::AwaitConfirmation {
                    folder,
                    names,
                    template,
                } => self.await_confirmation(folder, names, template)?,
                State::Renaming {
                    folder,
                    names,
                    template,
                } => self.rename(folder, names, template)?,
                State::Done(outcome) => return Ok(outcome),
            };
        }
    }

    pub fn into_session(self) -> P {
        self.session
    }

    fn await_folder(&mut self) -> Result<State> {
        let folder = PathBuf::from(self.session.ask("Enter folder path: ")?);
        let names = self.store.list_entries(&folder)?;
        if names.is_empty() {
            self.session.say("No file found.")?;
            return Ok(State::Done(Outcome::EmptyFolder));
        }
        Ok(State::ListNonEmpty { folder, names })
    }

    fn list_non_empty(&mut self, folder: PathBuf, names: Vec<OsString>) -> Result<State> {
        self.session
            .say(format!("{} {} found:", names.len(), plural(names.len())))?;
        for name in &names {
            self.session.say(format!("  - {}", name.to_string_lossy()))?;
        }

        let today = format_date(&self.clock.now());
        self.session.say("\nAvailable file name patterns:")?;
        self.session
            .say(format!("  {{today}} = {today} (today as YYYY-MM-DD)"))?;
        self.session
            .say("  {modifiedAt} = file modified date as YYYY-MM-DD\n")?;
        Ok(State::AwaitTemplate { folder, names })
    }

    fn await_template(&mut self, folder: PathBuf, names: Vec<OsString>) -> Result<State> {
        let raw = self.session.ask("Enter new file name: ")?;
        let template =
            NameTemplate::new(raw, self.config.placeholder_mode).with_today(&self.clock.now());
        let [first, second] = preview_names(&template, &self.config.separator);
        self.session.say(format!(
            "The files in {} will be renamed to {first}, {second}, etc.",
            folder.display()
        ))?;
        Ok(State::AwaitConfirmation {
            folder,
            names,
            template,
        })
    }

    fn await_confirmation(
        &mut self,
        folder: PathBuf,
        names: Vec<OsString>,
        template: NameTemplate,
    ) -> Result<State> {
        let answer = self.session.ask("Do you want to proceed? (y/n): ")?;
        if !answer.eq_ignore_ascii_case("y") {
            self.session.say("Cancelled. No files were renamed.")?;
            return Ok(State::Done(Outcome::Cancelled));
        }
        Ok(State::Renaming {
            folder,
            names,
            template,
        })
    }

    fn rename(&mut self, folder: PathBuf, names: Vec<OsString>, template: NameTemplate) -> Result<State> {
        self.session.say("Renaming files...")?;

        // The folder may have changed since the preview.
        let names = if self.config.relist_before_rename {
            self.store.list_entries(&folder)?
        } else {
            names
        };
        if names.is_empty() {
            self.session.say("No file found.")?;
            return Ok(State::Done(Outcome::EmptyFolder));
        }

        let options = PlanOptions {
            folder,
            template,
            separator: self.config.separator.clone(),
        };
        let plan = plan_entries(&options, &names, &self.store)?;
        let report = apply_plan(&plan, &self.store);

        for op in &report.succeeded {
            self.session.say(format!(
                "Renamed {} to {}",
                op.from.display(),
                op.to.display()
            ))?;
        }
        for failure in &report.failed {
            self.session.say(format!(
                "Failed to rename {} to {}: {}",
                failure.from.display(),
                failure.to.display(),
                failure.error
            ))?;
        }

        let renamed = report.succeeded.len();
        if report.is_success() {
            self.session
                .say(format!("Successfully renamed {renamed} {}.", plural(renamed)))?;
        } else {
            let attempted = report.attempted();
            self.session.say(format!(
                "Renamed {renamed} of {attempted} {}; {} failed.",
                plural(attempted),
                report.failed.len()
            ))?;
        }
        if report.unchanged > 0 {
            self.session.say(format!(
                "{} {} already had the target name.",
                report.unchanged,
                plural(report.unchanged)
            ))?;
        }

        Ok(State::Done(Outcome::Renamed(report)))
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "files"
    } else {
        "file"
    }
}
