// UI layer: the register/login loop and the quote menu. Input comes through
// a `Prompter` so the flow can be driven from a script in tests; the
// terminal version uses `dialoguer`.

use std::io::{BufRead, ErrorKind, Write};
use std::time::Duration;

use anyhow::Result;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::api::QuoteSource;
use crate::store::{AddOutcome, UserStore};

const REGISTER_OR_LOGIN: &str = "[+] Do you want to 'register' or 'login'";
const ENTER_USERNAME: &str = "[+] Enter your username";
const RANDOM_OR_CATEGORY: &str = "[+] Do you want to get a 'random' quote or choose by 'category'";
const ENTER_CATEGORY: &str = "[+] Enter the category of the quote";

/// Ctrl-D as read by dialoguer in raw mode.
const END_OF_TRANSMISSION: char = '\u{4}';

/// Source of user answers. `Ok(None)` means the input is exhausted and the
/// session should end.
pub trait Prompter {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads answers from the terminal with `dialoguer`. When stderr is not a
/// terminal (piped input, redirected logs) dialoguer cannot prompt, so the
/// answers are read line by line from stdin instead.
///
/// On a terminal the session ends with Ctrl-D followed by Enter, or Ctrl-C.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        if !console::user_attended_stderr() {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            return LinePrompter::new(stdin.lock(), stdout.lock()).ask(prompt);
        }

        match Input::<String>::new().with_prompt(prompt).interact_text() {
            // The terminal is in raw mode, so Ctrl-D arrives as a character.
            Ok(answer) if answer.contains(END_OF_TRANSMISSION) => Ok(None),
            Ok(answer) => Ok(Some(answer)),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Writes `prompt: ` and reads one line per answer. End of input ends the
/// session.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompter { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

enum Action {
    Register,
    Login,
}

/// One interactive run against an open store and a quote source.
pub struct Session<'a, Q: QuoteSource> {
    store: &'a UserStore,
    quotes: &'a Q,
}

impl<'a, Q: QuoteSource> Session<'a, Q> {
    pub fn new(store: &'a UserStore, quotes: &'a Q) -> Self {
        Session { store, quotes }
    }

    /// Run the register/login loop until the prompter runs out of input.
    pub fn run<P: Prompter, W: Write>(&self, prompter: &mut P, out: &mut W) -> Result<()> {
        loop {
            let Some(answer) = prompter.ask(REGISTER_OR_LOGIN)? else {
                return Ok(());
            };
            let action = match normalize(&answer).as_str() {
                "register" => Action::Register,
                "login" => Action::Login,
                _ => {
                    writeln!(out, "[+] Invalid option. Please choose 'register' or 'login'.")?;
                    continue;
                }
            };

            let Some(username) = self.ask_username(prompter, out)? else {
                return Ok(());
            };

            let keep_going = match action {
                Action::Register => {
                    self.register(&username, out)?;
                    true
                }
                Action::Login => self.login(&username, prompter, out)?,
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    /// Ask until the answer is a non-blank username.
    fn ask_username<P: Prompter, W: Write>(
        &self,
        prompter: &mut P,
        out: &mut W,
    ) -> Result<Option<String>> {
        loop {
            let Some(answer) = prompter.ask(ENTER_USERNAME)? else {
                return Ok(None);
            };
            let username = normalize(&answer);
            if !username.is_empty() {
                return Ok(Some(username));
            }
            writeln!(out, "[+] Invalid username. Please enter a non-empty username.")?;
        }
    }

    fn register<W: Write>(&self, username: &str, out: &mut W) -> Result<()> {
        match self.store.add_user(username) {
            Ok(AddOutcome::Inserted) => {
                writeln!(out, "[+] User {username} registered successfully.")?;
            }
            Ok(AddOutcome::AlreadyExists) => {
                writeln!(
                    out,
                    "[+] Username {username} is already taken. Please choose a different username."
                )?;
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                writeln!(out, "[!] Storage error: {err}")?;
            }
        }
        Ok(())
    }

    /// Returns `false` when input ran out while in the quote menu.
    fn login<P: Prompter, W: Write>(
        &self,
        username: &str,
        prompter: &mut P,
        out: &mut W,
    ) -> Result<bool> {
        match self.store.check_user(username) {
            Ok(true) => {}
            Ok(false) => {
                writeln!(out, "[+] No user found with username: {username}")?;
                return Ok(true);
            }
            Err(err) => {
                warn!(error = %err, "login lookup failed");
                writeln!(out, "[!] Storage error: {err}")?;
                return Ok(true);
            }
        }

        loop {
            let Some(choice) = prompter.ask(RANDOM_OR_CATEGORY)? else {
                return Ok(false);
            };
            let category = match normalize(&choice).as_str() {
                "random" => None,
                "category" => match prompter.ask(ENTER_CATEGORY)? {
                    Some(category) => Some(category.trim().to_string()),
                    None => return Ok(false),
                },
                _ => {
                    writeln!(out, "[+] Invalid option. Please choose 'random' or 'category'.")?;
                    continue;
                }
            };
            let text = self.fetch_quote(category.as_deref());
            writeln!(out, "{text}")?;
            return Ok(true);
        }
    }

    fn fetch_quote(&self, category: Option<&str>) -> String {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Fetching quote...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let text = match self.quotes.fetch(category) {
            Ok(quote) => quote.to_string(),
            Err(err) => {
                warn!(error = %err, "quote fetch failed");
                err.to_string()
            }
        };
        spinner.finish_and_clear();
        text
    }
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}
