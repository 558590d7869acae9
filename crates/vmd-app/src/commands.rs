//! Line-oriented command shell driving a [`Session`].
//!
//! Each line is tokenized (single and double quotes group words) and the
//! first token picks a [`Command`] from the [`CommandRegistry`]. `help` is
//! answered by the registry itself.

use std::collections::HashMap;
use std::path::Path;

use vmd_shell::MenuAction;
use vmd_types::error::{Result, VmdError};

use crate::session::Session;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Text(String),
    None,
    /// Stop the event loop.
    Quit,
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    fn usage(&self) -> &str;

    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput>;
}

/// Registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// A registry with every built-in command.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        register_builtins(&mut reg);
        reg
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Parse and execute one line. Command names are case-insensitive.
    pub fn execute(&self, line: &str, session: &mut Session) -> Result<CommandOutput> {
        let tokens = tokenize(line.trim())?;
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(CommandOutput::None);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let name_lower = name.to_ascii_lowercase();

        if name_lower == "help" {
            return self.execute_help(&args);
        }

        match self.commands.get(name_lower.as_str()) {
            Some(cmd) => {
                log::debug!("Running {name_lower} {args:?}");
                cmd.execute(&args, session)
            },
            None => Err(VmdError::Command(format!("unknown command: {name}"))),
        }
    }

    /// `(name, description)` pairs sorted by name.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    fn execute_help(&self, args: &[&str]) -> Result<CommandOutput> {
        if let Some(&name) = args.first() {
            let cmd = self
                .commands
                .get(name.to_ascii_lowercase().as_str())
                .ok_or_else(|| VmdError::Command(format!("unknown command: {name}")))?;
            return Ok(CommandOutput::Text(format!(
                "{}\n  {}\n  Usage: {}",
                cmd.name(),
                cmd.description(),
                cmd.usage()
            )));
        }

        let cmds = self.list_commands();
        let width = cmds.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        let mut out = String::from("Commands:\n");
        for (name, description) in cmds {
            out.push_str(&format!("  {name:<width$}  {description}\n"));
        }
        out.push_str("Type `help <command>` for usage.");
        Ok(CommandOutput::Text(out))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a line into words, honouring quotes and backslash escapes.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut chars = input.chars();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some('"') if ch == '\\' => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                },
                None => current.push('\\'),
            },
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    started = true;
                },
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        started = true;
                    }
                },
                c if c.is_whitespace() => {
                    if started {
                        tokens.push(std::mem::take(&mut current));
                        started = false;
                    }
                },
                _ => {
                    current.push(ch);
                    started = true;
                },
            },
        }
    }

    if let Some(q) = quote {
        let kind = if q == '"' { "double" } else { "single" };
        return Err(VmdError::Command(format!("unterminated {kind} quote")));
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Register all built-in commands.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(OpenCmd));
    reg.register(Box::new(FollowCmd));
    reg.register(Box::new(ClassifyCmd));
    reg.register(Box::new(BackCmd));
    reg.register(Box::new(ForwardCmd));
    reg.register(Box::new(StatusCmd));
    reg.register(Box::new(HistoryCmd));
    reg.register(Box::new(MenuCmd));
    reg.register(Box::new(ContextCmd));
    reg.register(Box::new(ZoomCmd));
    reg.register(Box::new(SelectCmd));
    reg.register(Box::new(UnselectCmd));
    reg.register(Box::new(FindCmd));
    reg.register(Box::new(WindowsCmd));
    reg.register(Box::new(FocusCmd));
    reg.register(Box::new(CloseCmd));
    reg.register(Box::new(QuitCmd));
}

/// Split off a leading `--new` flag.
fn new_window_flag<'a>(args: &'a [&'a str]) -> (bool, &'a [&'a str]) {
    match args.split_first() {
        Some((&"--new", rest)) => (true, rest),
        _ => (false, args),
    }
}

fn one_arg<'a>(args: &[&'a str], usage: &str) -> Result<&'a str> {
    match args {
        &[arg] => Ok(arg),
        _ => Err(VmdError::Command(format!("usage: {usage}"))),
    }
}

fn steps_arg(args: &[&str], usage: &str) -> Result<usize> {
    match args {
        [] => Ok(1),
        [n] => n
            .parse()
            .map_err(|_| VmdError::Command(format!("invalid step count: {n}"))),
        _ => Err(VmdError::Command(format!("usage: {usage}"))),
    }
}

// ---------------------------------------------------------------------------
// open / follow / classify
// ---------------------------------------------------------------------------

struct OpenCmd;
impl Command for OpenCmd {
    fn name(&self) -> &str {
        "open"
    }
    fn description(&self) -> &str {
        "Open a markdown file"
    }
    fn usage(&self) -> &str {
        "open [--new] <path>"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let (new_window, rest) = new_window_flag(args);
        let path = one_arg(rest, self.usage())?;
        session.open(Path::new(path), new_window)?;
        Ok(CommandOutput::None)
    }
}

struct FollowCmd;
impl Command for FollowCmd {
    fn name(&self) -> &str {
        "follow"
    }
    fn description(&self) -> &str {
        "Activate a link of the current document"
    }
    fn usage(&self) -> &str {
        "follow [--new] <href>"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let (new_window, rest) = new_window_flag(args);
        let href = one_arg(rest, self.usage())?;
        match session.follow(href, new_window)? {
            Some(_) => Ok(CommandOutput::None),
            None => Ok(CommandOutput::Text(format!("Ignored {href}"))),
        }
    }
}

struct ClassifyCmd;
impl Command for ClassifyCmd {
    fn name(&self) -> &str {
        "classify"
    }
    fn description(&self) -> &str {
        "Show how a link would be handled"
    }
    fn usage(&self) -> &str {
        "classify <href>"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let href = one_arg(args, self.usage())?;
        let text = session
            .classify(href)?
            .map_or_else(|| "ignored".to_string(), |link| link.to_string());
        Ok(CommandOutput::Text(text))
    }
}

// ---------------------------------------------------------------------------
// back / forward / status / history
// ---------------------------------------------------------------------------

struct BackCmd;
impl Command for BackCmd {
    fn name(&self) -> &str {
        "back"
    }
    fn description(&self) -> &str {
        "Go back in history"
    }
    fn usage(&self) -> &str {
        "back [steps]"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let steps = steps_arg(args, self.usage())?;
        session.back(steps)?;
        Ok(CommandOutput::None)
    }
}

struct ForwardCmd;
impl Command for ForwardCmd {
    fn name(&self) -> &str {
        "forward"
    }
    fn description(&self) -> &str {
        "Go forward in history"
    }
    fn usage(&self) -> &str {
        "forward [steps]"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let steps = steps_arg(args, self.usage())?;
        session.forward(steps)?;
        Ok(CommandOutput::None)
    }
}

struct StatusCmd;
impl Command for StatusCmd {
    fn name(&self) -> &str {
        "status"
    }
    fn description(&self) -> &str {
        "Describe the focused window"
    }
    fn usage(&self) -> &str {
        "status"
    }
    fn execute(&self, _args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(session.status_report()?))
    }
}

struct HistoryCmd;
impl Command for HistoryCmd {
    fn name(&self) -> &str {
        "history"
    }
    fn description(&self) -> &str {
        "List the navigation history of the focused window"
    }
    fn usage(&self) -> &str {
        "history"
    }
    fn execute(&self, _args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(session.history_report()?))
    }
}

// ---------------------------------------------------------------------------
// menu / context
// ---------------------------------------------------------------------------

struct MenuCmd;
impl Command for MenuCmd {
    fn name(&self) -> &str {
        "menu"
    }
    fn description(&self) -> &str {
        "Show the application menu or activate one of its items"
    }
    fn usage(&self) -> &str {
        "menu [action]"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        match args {
            [] => Ok(CommandOutput::Text(session.app_menu_outline())),
            [action] => {
                session.activate_menu(action.parse::<MenuAction>()?)?;
                Ok(CommandOutput::None)
            },
            _ => Err(VmdError::Command(format!("usage: {}", self.usage()))),
        }
    }
}

struct ContextCmd;
impl Command for ContextCmd {
    fn name(&self) -> &str {
        "context"
    }
    fn description(&self) -> &str {
        "Show or activate the context menu for a link or image"
    }
    fn usage(&self) -> &str {
        "context [--image <src>] [<href>] [action]"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let mut image = None;
        let mut positional = Vec::new();
        let mut iter = args.iter();
        while let Some(&arg) = iter.next() {
            if arg == "--image" {
                let src = iter
                    .next()
                    .ok_or_else(|| VmdError::Command(format!("usage: {}", self.usage())))?;
                image = Some(*src);
            } else {
                positional.push(arg);
            }
        }

        // A lone positional that names an action applies to the image.
        let (link, action) = match positional.as_slice() {
            [] => (None, None),
            [only] => match only.parse::<MenuAction>() {
                Ok(action) if image.is_some() => (None, Some(action)),
                _ => (Some(*only), None),
            },
            [link, action] => (Some(*link), Some(action.parse::<MenuAction>()?)),
            _ => return Err(VmdError::Command(format!("usage: {}", self.usage()))),
        };

        let menu = session.context_menu(link, image)?;
        match action {
            None => Ok(CommandOutput::Text(vmd_shell::menu::render_outline(
                menu.items(),
            ))),
            Some(action) => {
                session.activate_context(&menu, action)?;
                Ok(CommandOutput::None)
            },
        }
    }
}

// ---------------------------------------------------------------------------
// zoom / select / find
// ---------------------------------------------------------------------------

struct ZoomCmd;
impl Command for ZoomCmd {
    fn name(&self) -> &str {
        "zoom"
    }
    fn description(&self) -> &str {
        "Change the zoom of the focused window"
    }
    fn usage(&self) -> &str {
        "zoom in|out|reset"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let factor = match one_arg(args, self.usage())? {
            "in" => session.zoom_in()?,
            "out" => session.zoom_out()?,
            "reset" => session.zoom_reset()?,
            _ => return Err(VmdError::Command(format!("usage: {}", self.usage()))),
        };
        Ok(CommandOutput::Text(format!("Zoom {:.0}%", factor * 100.0)))
    }
}

struct SelectCmd;
impl Command for SelectCmd {
    fn name(&self) -> &str {
        "select"
    }
    fn description(&self) -> &str {
        "Set the text selection of the focused window"
    }
    fn usage(&self) -> &str {
        "select --all | select <text>"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        match args {
            [] => Err(VmdError::Command(format!("usage: {}", self.usage()))),
            ["--all"] => session.select_all().map(|()| CommandOutput::None),
            words => {
                session.select(Some(words.join(" ").as_str()))?;
                Ok(CommandOutput::None)
            },
        }
    }
}

struct UnselectCmd;
impl Command for UnselectCmd {
    fn name(&self) -> &str {
        "unselect"
    }
    fn description(&self) -> &str {
        "Clear the text selection"
    }
    fn usage(&self) -> &str {
        "unselect"
    }
    fn execute(&self, _args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        session.select(None)?;
        Ok(CommandOutput::None)
    }
}

struct FindCmd;
impl Command for FindCmd {
    fn name(&self) -> &str {
        "find"
    }
    fn description(&self) -> &str {
        "Search the focused document"
    }
    fn usage(&self) -> &str {
        "find <text>"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(VmdError::Command(format!("usage: {}", self.usage())));
        }
        let needle = args.join(" ");
        let lines = session.find(&needle)?;
        if lines.is_empty() {
            return Ok(CommandOutput::Text(format!("No matches for {needle:?}")));
        }
        let list: Vec<String> = lines.iter().map(usize::to_string).collect();
        Ok(CommandOutput::Text(format!(
            "{} match(es) on line(s) {}",
            lines.len(),
            list.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// windows / focus / close / quit
// ---------------------------------------------------------------------------

struct WindowsCmd;
impl Command for WindowsCmd {
    fn name(&self) -> &str {
        "windows"
    }
    fn description(&self) -> &str {
        "List open windows"
    }
    fn usage(&self) -> &str {
        "windows"
    }
    fn execute(&self, _args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let focused = session.focused_window().map(|w| w.id());
        let lines: Vec<String> = session
            .windows()
            .iter()
            .map(|w| {
                let marker = if Some(w.id()) == focused { '*' } else { ' ' };
                let hidden = if w.is_hidden() { "  (hidden)" } else { "" };
                format!("{marker} {}  {}{hidden}", w.id(), w.title())
            })
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

struct FocusCmd;
impl Command for FocusCmd {
    fn name(&self) -> &str {
        "focus"
    }
    fn description(&self) -> &str {
        "Focus another window"
    }
    fn usage(&self) -> &str {
        "focus <window-id>"
    }
    fn execute(&self, args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let arg = one_arg(args, self.usage())?;
        let id = arg
            .parse()
            .map_err(|_| VmdError::Command(format!("invalid window id: {arg}")))?;
        session.focus(id)?;
        Ok(CommandOutput::None)
    }
}

struct CloseCmd;
impl Command for CloseCmd {
    fn name(&self) -> &str {
        "close"
    }
    fn description(&self) -> &str {
        "Close the focused window"
    }
    fn usage(&self) -> &str {
        "close"
    }
    fn execute(&self, _args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        let id = session.close_focused()?;
        if session.should_quit() {
            return Ok(CommandOutput::Quit);
        }
        Ok(CommandOutput::Text(format!("Closed window {id}")))
    }
}

struct QuitCmd;
impl Command for QuitCmd {
    fn name(&self) -> &str {
        "quit"
    }
    fn description(&self) -> &str {
        "Close every window and exit"
    }
    fn usage(&self) -> &str {
        "quit"
    }
    fn execute(&self, _args: &[&str], session: &mut Session) -> Result<CommandOutput> {
        session.request_quit();
        Ok(CommandOutput::Quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{docs_fs, session_with};
    use crate::startup::StartupDocument;

    fn setup() -> (CommandRegistry, Session) {
        let (mut session, _) = session_with(docs_fs());
        session.open_window(StartupDocument::File("/docs/a.md".into()));
        session.take_output();
        (CommandRegistry::with_builtins(), session)
    }

    fn text(output: CommandOutput) -> String {
        match output {
            CommandOutput::Text(s) => s,
            other => panic!("expected text output, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_quotes_and_escapes() {
        assert_eq!(
            tokenize(r#"follow "my file.md""#).unwrap(),
            vec!["follow", "my file.md"]
        );
        assert_eq!(tokenize("a 'b c'  d").unwrap(), vec!["a", "b c", "d"]);
        assert_eq!(tokenize(r"open a\ b.md").unwrap(), vec!["open", "a b.md"]);
        assert_eq!(tokenize(r#"select """#).unwrap(), vec!["select", ""]);
        assert!(tokenize("open \"unterminated").is_err());
    }

    #[test]
    fn empty_input() {
        let (reg, mut session) = setup();
        assert_eq!(reg.execute("   ", &mut session).unwrap(), CommandOutput::None);
    }

    #[test]
    fn unknown_command() {
        let (reg, mut session) = setup();
        let err = reg.execute("nonexistent", &mut session).unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }

    #[test]
    fn help_lists_and_describes() {
        let (reg, mut session) = setup();
        let all = text(reg.execute("help", &mut session).unwrap());
        assert!(all.contains("follow"));
        assert!(all.contains("zoom"));

        let one = text(reg.execute("HELP back", &mut session).unwrap());
        assert!(one.contains("Usage: back [steps]"));
    }

    #[test]
    fn follow_back_and_status() {
        let (reg, mut session) = setup();
        reg.execute("follow b.md", &mut session).unwrap();
        assert_eq!(
            session.focused_window().unwrap().document(),
            Some(Path::new("/docs/b.md"))
        );

        reg.execute("back", &mut session).unwrap();
        let status = text(reg.execute("status", &mut session).unwrap());
        assert!(status.contains("document: /docs/a.md"));
        assert!(status.contains("history: 1/2 back=false forward=true"));
    }

    #[test]
    fn follow_ignored_reference() {
        let (reg, mut session) = setup();
        let out = text(reg.execute("follow missing.md", &mut session).unwrap());
        assert_eq!(out, "Ignored missing.md");
    }

    #[test]
    fn classify_reports_kind() {
        let (reg, mut session) = setup();
        let out = text(reg.execute("classify logo.png", &mut session).unwrap());
        assert_eq!(out, "plain-file: /docs/logo.png");
        let out = text(reg.execute("classify https://example.com", &mut session).unwrap());
        assert_eq!(out, "external: https://example.com");
    }

    #[test]
    fn invalid_step_count() {
        let (reg, mut session) = setup();
        assert!(reg.execute("back two", &mut session).is_err());
    }

    #[test]
    fn menu_activation_by_name() {
        let (reg, mut session) = setup();
        let outline = text(reg.execute("menu", &mut session).unwrap());
        assert!(outline.contains("History"));

        reg.execute("menu zoom-in", &mut session).unwrap();
        assert_eq!(session.focused_window().unwrap().zoom().percent(), 110);
        assert!(reg.execute("menu nope", &mut session).is_err());
    }

    #[test]
    fn context_menu_outline_and_copy() {
        let (reg, mut session) = setup();
        let outline = text(reg.execute("context https://example.com", &mut session).unwrap());
        assert!(outline.contains("Open link"));
        assert!(outline.contains("Copy link address"));

        reg.execute("context https://example.com copy-link-address", &mut session)
            .unwrap();
        assert_eq!(session.clipboard(), Some("https://example.com"));

        reg.execute("context --image logo.png copy-image-path", &mut session)
            .unwrap();
        assert_eq!(session.clipboard(), Some("/docs/logo.png"));
    }

    #[test]
    fn zoom_and_find() {
        let (reg, mut session) = setup();
        assert_eq!(text(reg.execute("zoom out", &mut session).unwrap()), "Zoom 90%");
        assert!(reg.execute("zoom sideways", &mut session).is_err());

        let found = text(reg.execute("find usage", &mut session).unwrap());
        assert_eq!(found, "1 match(es) on line(s) 5");
    }

    #[test]
    fn select_enables_copy() {
        let (reg, mut session) = setup();
        reg.execute("select some text", &mut session).unwrap();
        reg.execute("menu copy", &mut session).unwrap();
        assert_eq!(session.clipboard(), Some("some text"));

        reg.execute("unselect", &mut session).unwrap();
        assert!(reg.execute("menu copy", &mut session).is_err());
    }

    #[test]
    fn windows_focus_and_close() {
        let (reg, mut session) = setup();
        reg.execute("open --new b.md", &mut session).unwrap();
        let list = text(reg.execute("windows", &mut session).unwrap());
        assert_eq!(list, "  1  a.md - vmd\n* 2  b.md - vmd");

        reg.execute("focus 1", &mut session).unwrap();
        assert_eq!(session.focused_window().unwrap().id(), 1);
        assert!(reg.execute("focus 9", &mut session).is_err());

        assert_eq!(
            text(reg.execute("close", &mut session).unwrap()),
            "Closed window 1"
        );
        assert_eq!(reg.execute("close", &mut session).unwrap(), CommandOutput::Quit);
    }

    #[test]
    fn quit_command() {
        let (reg, mut session) = setup();
        assert_eq!(reg.execute("quit", &mut session).unwrap(), CommandOutput::Quit);
        assert!(session.should_quit());
    }
}
