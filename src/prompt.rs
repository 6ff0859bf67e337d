//! Interactive fallback for promptable fields left unset by flags and config.
//!
//! Input and output are injected, so the same code serves a terminal and a
//! test driving it with a `Cursor`. Invalid answers are re-asked according to
//! a [`Retry`] policy; the default never gives up.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use crate::document::Section;
use crate::error::ClapbindError;
use crate::fields::Field;
use crate::record::Record;
use crate::term::{self, Style};
use crate::types::{FieldValue, Kind};

/// How many times an invalid answer is asked again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retry {
    #[default]
    Forever,
    /// Give up after this many attempts.
    Times(usize),
}

impl Retry {
    /// Call `attempt` until it yields a value. `Ok(None)` means "ask again".
    pub fn run<T>(
        self,
        mut attempt: impl FnMut() -> Result<Option<T>, ClapbindError>,
    ) -> Result<T, ClapbindError> {
        let mut attempts = 0;
        loop {
            if let Some(value) = attempt()? {
                return Ok(value);
            }
            attempts += 1;
            if let Retry::Times(limit) = self
                && attempts >= limit
            {
                return Err(ClapbindError::RetriesExhausted(attempts));
            }
        }
    }
}

/// `yes`/`y`/`true`/`t` and `no`/`n`/`false`/`f`, any case.
pub fn parse_bool(answer: &str) -> Option<bool> {
    match answer.to_lowercase().as_str() {
        "yes" | "y" | "true" | "t" => Some(true),
        "no" | "n" | "false" | "f" => Some(false),
        _ => None,
    }
}

pub struct Prompter<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
    style: Style,
    retry: Retry,
}

impl<'a> Prompter<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write, style: Style) -> Self {
        Self {
            input,
            output,
            style,
            retry: Retry::default(),
        }
    }

    pub fn retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn set_retry(&mut self, retry: Retry) {
        self.retry = retry;
    }

    /// Print `[?] text: ` and read one line without its line ending. End of
    /// input is an error.
    fn ask(&mut self, text: &str) -> Result<String, ClapbindError> {
        self.ask_line(text)?
            .ok_or_else(|| ClapbindError::InputClosed(text.to_string()))
    }

    /// Like `ask`, with `None` at end of input.
    fn ask_line(&mut self, text: &str) -> Result<Option<String>, ClapbindError> {
        write!(
            self.output,
            "{} {text}: ",
            term::tag("?", term::BLUE, self.style.stdout_color)
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    pub fn ask_string(&mut self, usage: &str) -> Result<String, ClapbindError> {
        self.ask(usage)
    }

    pub fn ask_bool(&mut self, usage: &str) -> Result<bool, ClapbindError> {
        let text = format!("{usage} (yes/no)");
        let retry = self.retry;
        retry.run(|| Ok(parse_bool(self.ask(&text)?.trim())))
    }

    pub fn ask_int(&mut self, usage: &str) -> Result<i64, ClapbindError> {
        let text = number_prompt(usage);
        let retry = self.retry;
        retry.run(|| Ok(self.ask(&text)?.trim().parse().ok()))
    }

    pub fn ask_uint(&mut self, usage: &str) -> Result<u64, ClapbindError> {
        let text = number_prompt(usage);
        let retry = self.retry;
        retry.run(|| Ok(self.ask(&text)?.trim().parse().ok()))
    }

    /// One entry per line until a blank line or the end of input.
    pub fn ask_list(&mut self, usage: &str) -> Result<Vec<String>, ClapbindError> {
        let text = format!("{usage} (enter a blank line when finished)");
        let mut items = Vec::new();
        loop {
            match self.ask_line(&text)? {
                Some(line) if !line.trim().is_empty() => items.push(line),
                _ => return Ok(items),
            }
        }
    }

    /// Ask for `field` and write the answer into `record`. A number the member
    /// cannot hold is asked again like any other invalid answer, and counts
    /// against the same retry budget.
    pub fn fill<R: Record>(&mut self, field: &Field, record: &mut R) -> Result<(), ClapbindError> {
        match field.kind {
            Kind::Bool => {
                let value = self.ask_bool(&field.usage)?;
                field.write(record, FieldValue::Bool(value))
            }
            Kind::Str => {
                let value = self.ask_string(&field.usage)?;
                field.write(record, FieldValue::Str(value))
            }
            Kind::List => {
                let value = self.ask_list(&field.usage)?;
                field.write(record, FieldValue::List(value))
            }
            Kind::Int => {
                let text = number_prompt(&field.usage);
                let retry = self.retry;
                retry.run(|| match self.ask(&text)?.trim().parse() {
                    Ok(n) => fits(field, record, FieldValue::Int(n)),
                    Err(_) => Ok(None),
                })
            }
            Kind::Uint => {
                let text = number_prompt(&field.usage);
                let retry = self.retry;
                retry.run(|| match self.ask(&text)?.trim().parse() {
                    Ok(n) => fits(field, record, FieldValue::Uint(n)),
                    Err(_) => Ok(None),
                })
            }
            Kind::Unsupported => Ok(()),
        }
    }
}

fn number_prompt(usage: &str) -> String {
    format!("{usage} (number)")
}

/// Write a numeric answer, turning a range failure into "ask again".
fn fits<R: Record>(
    field: &Field,
    record: &mut R,
    answer: FieldValue,
) -> Result<Option<()>, ClapbindError> {
    match field.write(record, answer) {
        Ok(()) => Ok(Some(())),
        Err(ClapbindError::WriteFailed { reason, .. }) => {
            tracing::debug!(key = %field.long, %reason, "answer out of range, asking again");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Prompt for every promptable field that was neither given on the command
/// line (`seen`) nor present in the context's config `segment`.
pub fn resolve_missing<R: Record>(
    fields: &[Field],
    record: &mut R,
    segment: Option<&Section>,
    seen: &HashSet<String>,
    prompter: &mut Prompter<'_>,
) -> Result<usize, ClapbindError> {
    let mut asked = 0;
    for field in fields {
        if seen.contains(&field.long)
            || segment.is_some_and(|s| s.contains_key(&field.long))
            || !field.prompt
            || !field.kind.is_bindable()
        {
            continue;
        }
        prompter.fill(field, record)?;
        asked += 1;
    }
    Ok(asked)
}
