use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Arg, ArgAction};

use crate::command::{Command, Subcommand};
use crate::context::Context;
use crate::dispatch::{Action, BoundAction, Injectables, Offer, Slot};
use crate::document::Document;
use crate::error::ClapbindError;
use crate::fields::{self, Field};
use crate::file;
use crate::flags::{self, Reserved};
use crate::merge;
use crate::prompt::{self, Prompter, Retry};
use crate::record::{self, Record};
use crate::term::{self, Style};

const VERSION_ID: &str = "clapbind::version";

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An action ran. `command` is `None` for the root action.
    Dispatched { command: Option<String> },
    /// Nothing to run; the usage text.
    Usage(String),
    /// `--help` was given; the help text for the selected level.
    Help(String),
    /// `--version` was given; the version string.
    Version(String),
}

#[derive(Debug, Clone)]
enum ConfigSource {
    Default,
    Path(PathBuf),
    Disabled,
}

/// Entry point: a root record, a root action and any number of commands.
///
/// ```ignore
/// App::with_config(ServeOpts::default())
///     .name("serve")
///     .version("1.0.0")
///     .action(|Config(opts): Config<ServeOpts>| serve(opts))
///     .command(Command::new("check", "Check the setup").action(check))
///     .run();
/// ```
pub struct App<R = ()> {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    help: bool,
    version_flag: bool,
    config: R,
    action: Option<BoundAction<R, ()>>,
    commands: Vec<Box<dyn Subcommand<R>>>,
    config_source: ConfigSource,
    style: Option<Style>,
    retry: Option<Retry>,
}

impl App<()> {
    /// An app without a root record.
    pub fn new() -> Self {
        Self::with_config(())
    }
}

impl Default for App<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> App<R> {
    /// An app whose root flags, config entries and prompts come from
    /// `config`. The value given here supplies the defaults.
    pub fn with_config(config: R) -> Self {
        Self {
            name: None,
            description: None,
            version: None,
            help: true,
            version_flag: true,
            config,
            action: None,
            commands: Vec::new(),
            config_source: ConfigSource::Default,
            style: None,
            retry: None,
        }
    }

    /// Application name (default: the file name of `argv[0]`). Also names
    /// the config directory.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the version string and enable `-v`/`--version`.
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn disable_help(mut self) -> Self {
        self.help = false;
        self
    }

    /// Keep the version string for [`Context::version`] but drop the flag.
    pub fn disable_version(mut self) -> Self {
        self.version_flag = false;
        self
    }

    /// The action run when no command is selected. Without one, usage is
    /// printed instead.
    pub fn action<P: 'static, A: Action<R, (), P>>(mut self, action: A) -> Self {
        self.action = Some(BoundAction::new(action));
        self
    }

    pub fn command<C: Record>(mut self, command: Command<R, C>) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    /// Read the config document from `path` instead of
    /// `~/.config/{name}/config.yml`.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_source = ConfigSource::Path(path.into());
        self
    }

    pub fn no_config_file(mut self) -> Self {
        self.config_source = ConfigSource::Disabled;
        self
    }

    /// Output colouring (default: [`Style::detect`]).
    pub fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Retry policy for invalid prompt answers (default: [`Retry::Forever`]).
    pub fn prompt_retry(mut self, retry: Retry) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Run with the process arguments, prompting on stdin. Exits the process
    /// on help, version, usage and errors.
    pub fn run(self) {
        self.run_from(std::env::args_os())
    }

    /// Like [`run`](Self::run) with explicit arguments, `argv[0]` included.
    pub fn run_from<I, T>(self, args: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let style = self.style.unwrap_or_else(Style::detect);
        let mut input = io::stdin().lock();
        let mut output = io::stdout();
        let mut prompter = Prompter::new(&mut input, &mut output, style);

        match self.try_run_with(args, &mut prompter) {
            Ok(Outcome::Dispatched { .. }) => {}
            Ok(Outcome::Usage(text)) | Ok(Outcome::Help(text)) => {
                print!("{text}");
                std::process::exit(0);
            }
            Ok(Outcome::Version(version)) => {
                println!("{}", term::info_line(style, &version));
                std::process::exit(0);
            }
            Err(ClapbindError::Cli(e)) => {
                let _ = e.print();
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("{}", term::error_line(style, &e.to_string()));
                std::process::exit(1);
            }
        }
    }

    /// Run without touching the process: prompts go through `prompter`, and
    /// help, usage and errors are returned instead of printed.
    pub fn try_run_with<I, T>(
        mut self,
        args: I,
        prompter: &mut Prompter<'_>,
    ) -> Result<Outcome, ClapbindError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        self.validate()?;

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| program_name(args.first()));
        let style = self.style.unwrap_or_else(Style::detect);
        if let Some(retry) = self.retry {
            prompter.set_retry(retry);
        }
        let version_flag = self.version.is_some() && self.version_flag;

        let doc = self.load_document(&name);
        let root_fields = fields::describe(&self.config)?;
        let mut reserved = Reserved::new();
        if version_flag {
            reserved = reserved.with_version();
        }
        reserved.claim(&root_fields)?;
        merge::apply_segment(&root_fields, &mut self.config, doc.segment(None))?;

        let mut cli = self.root_command(&name, &root_fields, version_flag, style);
        for command in &mut self.commands {
            cli = cli.subcommand(command.prepare(&doc, &reserved)?);
        }

        let matches = match cli.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(e) if e.kind() == ErrorKind::DisplayHelp => {
                return Ok(Outcome::Help(e.render().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if version_flag
            && matches.get_flag(VERSION_ID)
            && let Some(version) = &self.version
        {
            return Ok(Outcome::Version(version.clone()));
        }

        let seen = flags::collect(&matches, &root_fields, &mut self.config)?;
        let ctx = Context::new(name, self.version.clone(), style);

        if let Some((selected, sub_matches)) = matches.subcommand()
            && let Some(command) = self.commands.iter_mut().find(|c| c.name() == selected)
        {
            tracing::debug!(command = selected, "routing to command");
            prompt::resolve_missing(
                &root_fields,
                &mut self.config,
                doc.segment(None),
                &seen,
                prompter,
            )?;
            command.run(sub_matches, &doc, &self.config, &ctx, prompter)?;
            return Ok(Outcome::Dispatched {
                command: Some(selected.to_string()),
            });
        }

        let Some(action) = &self.action else {
            return Ok(Outcome::Usage(cli.render_help().to_string()));
        };
        prompt::resolve_missing(
            &root_fields,
            &mut self.config,
            doc.segment(None),
            &seen,
            prompter,
        )?;
        let set = Injectables {
            args: flags::positional(&matches),
            config: record::is_present::<R>().then(|| self.config.clone()),
            global: None,
            ctx,
        };
        action.dispatch(&set)?;
        Ok(Outcome::Dispatched { command: None })
    }

    /// Command names and descriptions, and every action's parameters.
    fn validate(&self) -> Result<(), ClapbindError> {
        let mut names = HashSet::new();
        for command in &self.commands {
            if command.name().is_empty() {
                return Err(ClapbindError::EmptyCommandName);
            }
            if command.description().is_empty() {
                return Err(ClapbindError::EmptyCommandDescription(
                    command.name().to_string(),
                ));
            }
            if !names.insert(command.name()) {
                return Err(ClapbindError::DuplicateCommand(command.name().to_string()));
            }
            command.validate()?;
        }
        if let Some(action) = &self.action {
            Offer::new::<R, ()>(record::is_present::<R>(), false).check(action.slots())?;
        }
        Ok(())
    }

    fn load_document(&self, name: &str) -> Document {
        match &self.config_source {
            ConfigSource::Default => match file::default_config_path(name) {
                Some(path) => file::load_document(&path),
                None => {
                    tracing::debug!("no home directory, skipping config file");
                    Document::empty()
                }
            },
            ConfigSource::Path(path) => file::load_document(path),
            ConfigSource::Disabled => Document::empty(),
        }
    }

    fn root_command(
        &self,
        name: &str,
        fields: &[Field],
        version_flag: bool,
        style: Style,
    ) -> clap::Command {
        let mut cli = clap::Command::new(name.to_string())
            .disable_help_subcommand(true)
            .disable_version_flag(true)
            .disable_help_flag(!self.help)
            .color(style.clap_color());
        if let Some(description) = &self.description {
            cli = cli.about(description.clone());
        }
        if version_flag {
            cli = cli.arg(
                Arg::new(VERSION_ID)
                    .short('v')
                    .long("version")
                    .action(ArgAction::SetTrue)
                    .help("Print version information"),
            );
        }
        let cli = flags::register(cli, fields, &self.config, true);
        let takes_args = self.action.as_ref().is_some_and(|a| a.takes(Slot::Args));
        flags::register_positional(cli, takes_args)
    }
}

fn program_name(arg0: Option<&OsString>) -> String {
    arg0.and_then(|arg| Path::new(arg).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Args, Config, Global};
    use crate::fixtures::test::{NameOpts, ServeOpts, SyncOpts, VerboseOpts};
    use serde::{Deserialize, Serialize};
    use std::cell::RefCell;
    use std::fs;
    use std::io::Cursor;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Run `app` with `args`, feeding `input` to prompts. Returns the result
    /// and everything the prompter wrote.
    fn run<R: Record>(
        app: App<R>,
        args: &[&str],
        input: &str,
    ) -> (Result<Outcome, ClapbindError>, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = {
            let mut prompter = Prompter::new(&mut input, &mut output, Style::plain());
            app.style(Style::plain())
                .no_config_file()
                .try_run_with(args.iter().copied(), &mut prompter)
        };
        (result, String::from_utf8(output).unwrap())
    }

    fn config_dir(content: &str, file_name: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn capture<T>() -> (Rc<RefCell<Option<T>>>, Rc<RefCell<Option<T>>>) {
        let cell = Rc::new(RefCell::new(None));
        (cell.clone(), cell)
    }

    #[test]
    fn short_bool_flag_without_prompts() {
        let (seen, sink) = capture();
        let app = App::with_config(VerboseOpts::default()).action(
            move |Config(opts): Config<VerboseOpts>| {
                *sink.borrow_mut() = Some(opts);
                Ok::<(), String>(())
            },
        );
        let (result, transcript) = run(app, &["prog", "-v"], "");
        assert_eq!(result.unwrap(), Outcome::Dispatched { command: None });
        assert!(seen.borrow().as_ref().unwrap().verbose);
        assert!(transcript.is_empty());
    }

    #[test]
    fn missing_promptable_value_is_asked_for() {
        let (seen, sink) = capture();
        let app = App::with_config(NameOpts::default()).action(
            move |Config(opts): Config<NameOpts>| {
                *sink.borrow_mut() = Some(opts.name);
                Ok::<(), String>(())
            },
        );
        let (result, transcript) = run(app, &["prog"], "alice\n");
        result.unwrap();
        assert_eq!(seen.borrow().as_deref(), Some("alice"));
        assert_eq!(transcript, "[?] Name: ");
    }

    #[test]
    fn flag_suppresses_prompt() {
        let (seen, sink) = capture();
        let app = App::with_config(NameOpts::default()).action(
            move |Config(opts): Config<NameOpts>| {
                *sink.borrow_mut() = Some(opts.name);
                Ok::<(), String>(())
            },
        );
        let (result, transcript) = run(app, &["prog", "--name", "bob"], "");
        result.unwrap();
        assert_eq!(seen.borrow().as_deref(), Some("bob"));
        assert!(transcript.is_empty());
    }

    #[test]
    fn command_receives_remaining_positionals() {
        let (seen, sink) = capture();
        let app = App::new().command(Command::new("sync", "Sync things").action(
            move |Args(args): Args| {
                *sink.borrow_mut() = Some(args);
                Ok::<(), String>(())
            },
        ));
        let (result, _) = run(app, &["prog", "sync", "extra"], "");
        assert_eq!(
            result.unwrap(),
            Outcome::Dispatched {
                command: Some("sync".into())
            }
        );
        assert_eq!(*seen.borrow(), Some(vec!["extra".to_string()]));
    }

    #[test]
    fn unknown_first_positional_goes_to_root_action() {
        let (seen, sink) = capture();
        let app = App::new()
            .action(move |Args(args): Args| {
                *sink.borrow_mut() = Some(args);
                Ok::<(), String>(())
            })
            .command(Command::new("sync", "Sync things").action(|| Ok::<(), String>(())));
        let (result, _) = run(app, &["prog", "other", "sync"], "");
        assert_eq!(result.unwrap(), Outcome::Dispatched { command: None });
        assert_eq!(
            *seen.borrow(),
            Some(vec!["other".to_string(), "sync".to_string()])
        );
    }

    #[test]
    fn flag_beats_config_and_config_suppresses_prompt() {
        let (_dir, path) = config_dir("port: 9000\nname: carol\ntags: [a, b]\n", "config.yml");
        let (seen, sink) = capture();
        let app = App::with_config(ServeOpts::default())
            .action(move |Config(opts): Config<ServeOpts>| {
                *sink.borrow_mut() = Some(opts);
                Ok::<(), String>(())
            });
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output, Style::plain());
        let result = app
            .style(Style::plain())
            .config_file(&path)
            .try_run_with(["prog", "-p", "7000", "--tags", "c"], &mut prompter);
        result.unwrap();

        let opts = seen.borrow_mut().take().unwrap();
        assert_eq!(opts.port, 7000);
        assert_eq!(opts.name, "carol");
        assert_eq!(opts.tags, vec!["c"]);
        assert!(output.is_empty());
    }

    #[test]
    fn config_type_mismatch_is_fatal() {
        let (_dir, path) = config_dir("port: eighty\n", "config.yml");
        let called = Rc::new(RefCell::new(false));
        let flag = called.clone();
        let app = App::with_config(ServeOpts::default()).action(move || {
            *flag.borrow_mut() = true;
            Ok::<(), String>(())
        });
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output, Style::plain());
        let err = app
            .style(Style::plain())
            .config_file(&path)
            .try_run_with(["prog"], &mut prompter)
            .unwrap_err();
        assert!(matches!(err, ClapbindError::TypeMismatch { ref key, .. } if key == "port"));
        assert!(!*called.borrow());
    }

    #[test]
    fn command_section_from_yaml_and_root_flag_after_command() {
        let (_dir, path) = config_dir(
            "name: root\nsync:\n  remote: origin\n  depth: 2\n  branches: [main]\n",
            "config.yml",
        );
        let (seen, sink) = capture();
        let app = App::with_config(ServeOpts::default()).command(
            Command::with_config("sync", "Sync things", SyncOpts::default()).action(
                move |Config(sync): Config<SyncOpts>, Global(root): Global<ServeOpts>| {
                    *sink.borrow_mut() = Some((sync, root));
                    Ok::<(), String>(())
                },
            ),
        );
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output, Style::plain());
        app.style(Style::plain())
            .config_file(&path)
            .try_run_with(["prog", "sync", "-v", "--dryrun"], &mut prompter)
            .unwrap();

        let (sync, root) = seen.borrow_mut().take().unwrap();
        assert_eq!(sync.remote, "origin");
        assert_eq!(sync.depth, 2);
        assert!(sync.dry_run);
        assert!(root.verbose);
        assert_eq!(root.name, "root");
        assert!(output.is_empty());
    }

    #[test]
    fn toml_config_file() {
        let (_dir, path) = config_dir("name = \"dave\"\noffset = -4\n", "config.toml");
        let (seen, sink) = capture();
        let app = App::with_config(ServeOpts::default()).action(
            move |Config(opts): Config<ServeOpts>| {
                *sink.borrow_mut() = Some(opts);
                Ok::<(), String>(())
            },
        );
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output, Style::plain());
        app.style(Style::plain())
            .config_file(&path)
            .try_run_with(["prog"], &mut prompter)
            .unwrap();
        let opts = seen.borrow_mut().take().unwrap();
        assert_eq!(opts.name, "dave");
        assert_eq!(opts.offset, -4);
    }

    #[test]
    fn non_string_lists_are_left_to_the_record() {
        #[derive(Serialize, Deserialize, Clone, Default)]
        struct Ids {
            ids: Vec<u32>,
            label: Option<String>,
        }
        impl Record for Ids {}

        let (_dir, path) = config_dir("ids: [1, 2]\nlabel: prod\n", "config.yml");
        let (seen, sink) = capture();
        let app = App::with_config(Ids::default()).action(move |Config(ids): Config<Ids>| {
            *sink.borrow_mut() = Some(ids);
            Ok::<(), String>(())
        });
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output, Style::plain());
        app.style(Style::plain())
            .config_file(&path)
            .try_run_with(["prog"], &mut prompter)
            .unwrap();
        let ids = seen.borrow_mut().take().unwrap();
        assert!(ids.ids.is_empty());
        assert_eq!(ids.label.as_deref(), Some("prod"));

        let app = App::with_config(Ids::default()).action(|| Ok::<(), String>(()));
        let (result, _) = run(app, &["prog", "--ids", "7"], "");
        assert!(matches!(result, Err(ClapbindError::Cli(_))));
    }

    #[test]
    fn root_prompts_come_before_command_prompts() {
        let app = App::with_config(NameOpts::default()).command(
            Command::with_config("sync", "Sync things", SyncOpts::default())
                .action(|| Ok::<(), String>(())),
        );
        let (result, transcript) = run(app, &["prog", "sync"], "alice\norigin\n1\n\n");
        result.unwrap();
        let name = transcript.find("[?] Name: ").unwrap();
        let remote = transcript.find("[?] Remote: ").unwrap();
        assert!(name < remote);
    }

    #[test]
    fn global_on_root_action_is_rejected_before_running() {
        let called = Rc::new(RefCell::new(false));
        let flag = called.clone();
        let app = App::with_config(ServeOpts::default()).action(move |_: Global<()>| {
            *flag.borrow_mut() = true;
            Ok::<(), String>(())
        });
        let (result, transcript) = run(app, &["prog"], "alice\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ClapbindError::UnmatchedParameter { position: 1, .. }));
        assert!(err.to_string().contains("Args, Context or Config<ServeOpts>"));
        assert!(!*called.borrow());
        assert!(transcript.is_empty());
    }

    #[test]
    fn action_failure_is_reported() {
        let app = App::new().action(|| Err::<(), _>("disk full"));
        let (result, _) = run(app, &["prog"], "");
        assert!(matches!(
            result,
            Err(ClapbindError::ActionFailed(ref m)) if m == "disk full"
        ));
    }

    #[test]
    fn command_registration_errors() {
        let ok = || Ok::<(), String>(());

        let app = App::new().command(Command::new("", "Empty").action(ok));
        assert!(matches!(run(app, &["prog"], "").0, Err(ClapbindError::EmptyCommandName)));

        let app = App::new().command(Command::new("sync", "").action(ok));
        assert!(matches!(
            run(app, &["prog"], "").0,
            Err(ClapbindError::EmptyCommandDescription(_))
        ));

        let app = App::new()
            .command(Command::new("sync", "One").action(ok))
            .command(Command::new("sync", "Two").action(ok));
        assert!(matches!(
            run(app, &["prog"], "").0,
            Err(ClapbindError::DuplicateCommand(ref n)) if n == "sync"
        ));

        let app = App::new().command(Command::new("sync", "No action"));
        assert!(matches!(
            run(app, &["prog"], "").0,
            Err(ClapbindError::MissingAction(_))
        ));
    }

    #[test]
    fn hidden_command_dispatches_but_is_not_listed() {
        let build = || {
            App::new()
                .command(Command::new("visible", "Shown").action(|| Ok::<(), String>(())))
                .command(
                    Command::new("secret", "Not shown")
                        .hidden()
                        .action(|| Ok::<(), String>(())),
                )
        };
        let (result, _) = run(build(), &["prog", "secret"], "");
        assert_eq!(
            result.unwrap(),
            Outcome::Dispatched {
                command: Some("secret".into())
            }
        );

        let (result, _) = run(build(), &["prog"], "");
        let Outcome::Usage(text) = result.unwrap() else {
            panic!("expected usage");
        };
        assert!(text.contains("visible"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn help_at_both_levels() {
        let build = || {
            App::with_config(ServeOpts::default())
                .description("Serve things")
                .action(|| Ok::<(), String>(()))
                .command(
                    Command::with_config("sync", "Sync things", SyncOpts::default())
                        .action(|| Ok::<(), String>(())),
                )
        };
        let (result, _) = run(build(), &["prog", "--help"], "");
        let Outcome::Help(text) = result.unwrap() else {
            panic!("expected help");
        };
        assert!(text.contains("Serve things"));
        assert!(text.contains("Port [8080]"));

        let (result, transcript) = run(build(), &["prog", "sync", "-h"], "");
        let Outcome::Help(text) = result.unwrap() else {
            panic!("expected help");
        };
        assert!(text.contains("Sync things"));
        assert!(text.contains("--dryrun"));
        assert!(transcript.is_empty());
    }

    #[test]
    fn disabled_help_is_an_unknown_flag() {
        let app = App::new().disable_help().action(|| Ok::<(), String>(()));
        assert!(matches!(
            run(app, &["prog", "--help"], "").0,
            Err(ClapbindError::Cli(_))
        ));
    }

    #[test]
    fn version_flag() {
        let app = App::new().version("1.2.3").action(|| Ok::<(), String>(()));
        assert_eq!(
            run(app, &["prog", "--version"], "").0.unwrap(),
            Outcome::Version("1.2.3".into())
        );

        let app = App::new().version("1.2.3").action(|| Ok::<(), String>(()));
        assert_eq!(
            run(app, &["prog", "-v"], "").0.unwrap(),
            Outcome::Version("1.2.3".into())
        );
    }

    #[test]
    fn version_flag_absent_without_version() {
        let app = App::new().action(|| Ok::<(), String>(()));
        assert!(matches!(
            run(app, &["prog", "--version"], "").0,
            Err(ClapbindError::Cli(_))
        ));

        let (seen, sink) = capture();
        let app = App::with_config(VerboseOpts::default())
            .version("1.0.0")
            .disable_version()
            .action(move |ctx: Context, Config(opts): Config<VerboseOpts>| {
                *sink.borrow_mut() = Some((ctx.version().map(str::to_string), opts.verbose));
                Ok::<(), String>(())
            });
        run(app, &["prog", "-v"], "").0.unwrap();
        assert_eq!(*seen.borrow(), Some((Some("1.0.0".to_string()), true)));
    }

    #[test]
    fn root_short_flag_clashing_with_version_is_rejected() {
        let app = App::with_config(VerboseOpts::default())
            .version("1.0.0")
            .action(|| Ok::<(), String>(()));
        assert!(matches!(
            run(app, &["prog"], "").0,
            Err(ClapbindError::DuplicateFlag(ref n)) if n == "v"
        ));
    }

    #[test]
    fn usage_without_root_action() {
        let app = App::with_config(ServeOpts::default())
            .command(Command::new("sync", "Sync things").action(|| Ok::<(), String>(())));
        let (result, transcript) = run(app, &["prog"], "");
        let Outcome::Usage(text) = result.unwrap() else {
            panic!("expected usage");
        };
        assert!(text.contains("sync"));
        assert!(text.contains("Sync things"));
        assert!(transcript.is_empty());
    }

    #[test]
    fn name_defaults_to_program_basename() {
        let (seen, sink) = capture();
        let app = App::new().action(move |ctx: Context| {
            *sink.borrow_mut() = Some(ctx.name().to_string());
            Ok::<(), String>(())
        });
        run(app, &["/usr/local/bin/tool"], "").0.unwrap();
        assert_eq!(seen.borrow().as_deref(), Some("tool"));
    }

    #[test]
    fn bounded_retry_applies_to_run() {
        #[derive(serde::Serialize, serde::Deserialize, Clone, Default)]
        struct Confirm {
            sure: bool,
        }
        impl Record for Confirm {
            fn tags() -> crate::record::Tags {
                crate::record::Tags::new().field(
                    "sure",
                    crate::record::FieldTags::new().usage("Sure").prompt("yes"),
                )
            }
        }
        let app = App::with_config(Confirm::default())
            .prompt_retry(Retry::Times(2))
            .action(|| Ok::<(), String>(()));
        let (result, _) = run(app, &["prog"], "maybe\nperhaps\nyes\n");
        assert!(matches!(result, Err(ClapbindError::RetriesExhausted(2))));
    }
}
