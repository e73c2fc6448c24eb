//! Line-oriented terminal front end for the note list view-model.

use crate::view_model::{NoteListState, NoteListViewModel};
use notes_types::NoteId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const USAGE: &str = "\
commands:
  add <text>      create a note
  edit <id>       start editing a note
  text <text>     set the edit buffer
  save [<id>]     save the edit buffer (defaults to the note being edited)
  cancel          stop editing
  delete <id>     delete a note
  refresh         reload notes
  help            show this help
  quit            exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Edit(String),
    Text(String),
    Save(Option<String>),
    Cancel,
    Delete(String),
    Refresh,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("{} needs {}", word, what))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_lowercase().as_str() {
            "add" | "new" => required("some text").map(Command::Add),
            "edit" => required("a note id").map(Command::Edit),
            "text" => Ok(Command::Text(rest.to_string())),
            "save" => Ok(Command::Save((!rest.is_empty()).then(|| rest.to_string()))),
            "cancel" => Ok(Command::Cancel),
            "delete" | "rm" => required("a note id").map(Command::Delete),
            "refresh" | "list" | "ls" => Ok(Command::Refresh),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

/// Render the note list the way the page shows it
pub fn render(state: &NoteListState) -> String {
    if state.is_loading {
        return "Loading...\n".to_string();
    }
    if state.notes.is_empty() {
        return "(no notes)\n".to_string();
    }

    let mut out = String::new();
    for note in &state.notes {
        if state.is_editing(&note.id) {
            out.push_str(&format!("[{}] > {}\n", note.id, state.editing_text));
        } else {
            out.push_str(&format!("[{}] {}\n", note.id, note.text));
        }
    }
    out
}

/// Match an id typed by the user against the ids currently shown
fn resolve_id(vm: &NoteListViewModel, raw: &str) -> Result<NoteId, String> {
    vm.notes()
        .into_iter()
        .map(|n| n.id)
        .find(|id| id.to_string() == raw)
        .ok_or_else(|| format!("no note with id {}", raw))
}

async fn execute(vm: &NoteListViewModel, command: Command) -> Result<(), String> {
    let result = match command {
        Command::Add(text) => {
            vm.set_draft_text(text);
            vm.create_from_draft().await
        }
        Command::Edit(raw) => {
            vm.begin_edit(resolve_id(vm, &raw)?);
            Ok(())
        }
        Command::Text(text) => {
            if vm.snapshot().editing_id.is_none() {
                return Err("not editing any note".to_string());
            }
            vm.set_editing_text(text);
            Ok(())
        }
        Command::Save(raw) => {
            let id = match raw {
                Some(raw) => resolve_id(vm, &raw)?,
                None => vm
                    .snapshot()
                    .editing_id
                    .ok_or_else(|| "not editing any note".to_string())?,
            };
            vm.commit_edit(&id).await
        }
        Command::Cancel => {
            vm.cancel_edit();
            Ok(())
        }
        Command::Delete(raw) => {
            let id = resolve_id(vm, &raw)?;
            vm.delete_note(&id).await
        }
        Command::Refresh => vm.refresh().await,
        Command::Help | Command::Quit => Ok(()),
    };

    result.map_err(|e| {
        if e.is_remote_failure() {
            log::error!("[NOTES] {} failed: {}", e.op(), e);
        } else {
            log::error!("[NOTES] Store sent an unexpected {} response: {}", e.op(), e);
        }
        e.to_string()
    })
}

/// Read commands from `input` until `quit` or EOF, re-rendering after each one.
/// Store failures are reported and the loop continues.
pub async fn run<R, W>(vm: &NoteListViewModel, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(render(&vm.snapshot()).as_bytes()).await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                output.write_all(format!("{}\n", msg).as_bytes()).await?;
                output.flush().await?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                output.write_all(USAGE.as_bytes()).await?;
            }
            command => {
                if let Err(msg) = execute(vm, command).await {
                    output.write_all(format!("error: {}\n", msg).as_bytes()).await?;
                }
                output.write_all(render(&vm.snapshot()).as_bytes()).await?;
            }
        }
        output.flush().await?;
    }

    Ok(())
}
