use clap::ArgMatches;

use crate::context::Context;
use crate::dispatch::{Action, BoundAction, Injectables, Offer, Slot};
use crate::document::Document;
use crate::error::ClapbindError;
use crate::fields::{self, Field};
use crate::flags::{self, Reserved};
use crate::merge;
use crate::prompt::{self, Prompter};
use crate::record::{self, Record};

/// A subcommand of an [`App`](crate::App) with root record `R` and its own
/// record `C`.
pub struct Command<R, C = ()> {
    name: String,
    description: String,
    hidden: bool,
    config: C,
    action: Option<BoundAction<C, R>>,
    fields: Vec<Field>,
    merge_error: Option<ClapbindError>,
}

impl<R: Record> Command<R, ()> {
    /// A command without a record of its own.
    pub fn new(name: &str, description: &str) -> Self {
        Self::with_config(name, description, ())
    }
}

impl<R: Record, C: Record> Command<R, C> {
    /// A command whose flags, config section and prompts come from `config`.
    /// The value given here supplies the defaults.
    pub fn with_config(name: &str, description: &str, config: C) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            hidden: false,
            config,
            action: None,
            fields: Vec::new(),
            merge_error: None,
        }
    }

    /// Leave the command out of usage text. It can still be run.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn action<P: 'static, A: Action<C, R, P>>(mut self, action: A) -> Self {
        self.action = Some(BoundAction::new(action));
        self
    }
}

/// A command with its record type erased, as held by the app.
pub(crate) trait Subcommand<R> {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Check that an action is set and that every parameter it declares can
    /// be filled.
    fn validate(&self) -> Result<(), ClapbindError>;

    /// Describe the record, apply the command's config section and build the
    /// clap subcommand. Names in `reserved` are already in use.
    fn prepare(
        &mut self,
        doc: &Document,
        reserved: &Reserved,
    ) -> Result<clap::Command, ClapbindError>;

    /// Apply flags, prompt for what is still missing and dispatch.
    fn run(
        &mut self,
        matches: &ArgMatches,
        doc: &Document,
        root: &R,
        ctx: &Context,
        prompter: &mut Prompter<'_>,
    ) -> Result<(), ClapbindError>;
}

impl<R: Record, C: Record> Subcommand<R> for Command<R, C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn validate(&self) -> Result<(), ClapbindError> {
        let Some(action) = &self.action else {
            return Err(ClapbindError::MissingAction(self.name.clone()));
        };
        Offer::new::<C, R>(record::is_present::<C>(), record::is_present::<R>())
            .check(action.slots())
    }

    fn prepare(
        &mut self,
        doc: &Document,
        reserved: &Reserved,
    ) -> Result<clap::Command, ClapbindError> {
        self.fields = fields::describe(&self.config)?;
        reserved.clone().claim(&self.fields)?;

        // Only fatal if this command is the one selected.
        if let Err(e) = merge::apply_segment(
            &self.fields,
            &mut self.config,
            doc.segment(Some(&self.name)),
        ) {
            tracing::debug!(command = %self.name, error = %e, "config section rejected");
            self.merge_error = Some(e);
        }

        let cmd = clap::Command::new(self.name.clone())
            .about(self.description.clone())
            .hide(self.hidden);
        let cmd = flags::register(cmd, &self.fields, &self.config, false);
        let takes_args = self.action.as_ref().is_some_and(|a| a.takes(Slot::Args));
        Ok(flags::register_positional(cmd, takes_args))
    }

    fn run(
        &mut self,
        matches: &ArgMatches,
        doc: &Document,
        root: &R,
        ctx: &Context,
        prompter: &mut Prompter<'_>,
    ) -> Result<(), ClapbindError> {
        if let Some(e) = self.merge_error.take() {
            return Err(e);
        }
        let seen = flags::collect(matches, &self.fields, &mut self.config)?;
        prompt::resolve_missing(
            &self.fields,
            &mut self.config,
            doc.segment(Some(&self.name)),
            &seen,
            prompter,
        )?;

        let Some(action) = &self.action else {
            return Err(ClapbindError::MissingAction(self.name.clone()));
        };
        let set = Injectables {
            args: flags::positional(matches),
            config: record::is_present::<C>().then(|| self.config.clone()),
            global: record::is_present::<R>().then(|| root.clone()),
            ctx: ctx.clone(),
        };
        tracing::debug!(command = %self.name, "running command");
        action.dispatch(&set)
    }
}
