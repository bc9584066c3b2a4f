use chrono::{DateTime, Local};

use crate::{api::Note, state::NoteDraft};

/// Shown instead of a timestamp that cannot be parsed.
pub const NO_DATE: &str = "No date";

/// User actions the views hand to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Select(i64),
    Add,
    Delete(i64),
    Edit(NoteDraft),
}

/// One parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    SetTitle(String),
    SetContent(String),
    List,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list               show all notes
  show               show the active note
  new                create a note
  select <id>        make a note active
  delete <id>        delete a note
  title <text>       set the active note's title
  content <text>     set the active note's content
  quit               exit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim_start()));

    let id = || {
        rest.parse::<i64>()
            .map_err(|_| format!("expected a note id, got '{rest}'"))
    };

    match word {
        "list" | "ls" => Ok(Command::List),
        "show" => Ok(Command::Show),
        "new" | "add" => Ok(Command::Intent(Intent::Add)),
        "select" => Ok(Command::Intent(Intent::Select(id()?))),
        "delete" | "rm" => Ok(Command::Intent(Intent::Delete(id()?))),
        "title" => Ok(Command::SetTitle(rest.to_string())),
        "content" => Ok(Command::SetContent(rest.replace("\\n", "\n"))),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn parse_mod_date(mod_date: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(mod_date)
        .ok()
        .map(|date| date.with_timezone(&Local))
}

pub fn format_mod_date(mod_date: &str) -> String {
    parse_mod_date(mod_date).map_or_else(
        || NO_DATE.to_string(),
        |date| date.format("%Y/%m/%d %H:%M").to_string(),
    )
}

/// Most recently modified first. Notes with unreadable dates go last and
/// otherwise keep their relative order.
pub fn sorted_notes(notes: &[Note]) -> Vec<&Note> {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by_cached_key(|note| std::cmp::Reverse(parse_mod_date(&note.mod_date)));
    sorted
}

pub fn render_list(notes: &[Note], active_note_id: Option<i64>) -> String {
    if notes.is_empty() {
        return "No notes yet. Use 'new' to create one.".to_string();
    }

    sorted_notes(notes)
        .into_iter()
        .map(|note| {
            let marker = if Some(note.id) == active_note_id {
                '>'
            } else {
                ' '
            };
            let preview = note.content.lines().next().unwrap_or_default();
            format!(
                "{marker} [{}] {}  {}  ({})",
                note.id,
                note.title,
                preview,
                format_mod_date(&note.mod_date)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_editor(note: Option<&Note>) -> String {
    match note {
        Some(note) => format!(
            "# {}\n{}\n-- modified {}",
            note.title,
            note.content,
            format_mod_date(&note.mod_date)
        ),
        None => "No note selected.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, title: &str, mod_date: &str) -> Note {
        Note {
            id,
            title: title.to_string(),
            content: format!("body of {title}\nsecond line"),
            mod_date: mod_date.to_string(),
        }
    }

    #[test]
    fn unparseable_date_uses_placeholder() {
        assert_eq!(format_mod_date("not a date"), NO_DATE);
        assert_eq!(format_mod_date(""), NO_DATE);
    }

    #[test]
    fn date_is_shown_in_local_time() {
        let expected = DateTime::parse_from_rfc3339("2024-05-01T12:30:00.000Z")
            .unwrap()
            .with_timezone(&Local)
            .format("%Y/%m/%d %H:%M")
            .to_string();

        assert_eq!(format_mod_date("2024-05-01T12:30:00.000Z"), expected);
    }

    #[test]
    fn notes_are_sorted_newest_first_at_render_time() {
        let notes = vec![
            note(1, "old", "2024-01-01T00:00:00.000Z"),
            note(2, "broken", "garbage"),
            note(3, "new", "2024-03-01T00:00:00.000Z"),
            note(4, "mid", "2024-02-01T00:00:00+09:00"),
        ];

        let ids: Vec<i64> = sorted_notes(&notes).iter().map(|n| n.id).collect();

        assert_eq!(ids, [3, 4, 1, 2]);
        // input order is untouched
        assert_eq!(notes[0].id, 1);
    }

    #[test]
    fn list_marks_active_note_and_previews_first_line() {
        let notes = vec![
            note(1, "a", "2024-01-01T00:00:00.000Z"),
            note(2, "b", "2024-02-01T00:00:00.000Z"),
        ];

        let rendered = render_list(&notes, Some(1));
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(!rendered.ends_with('\n'));
        assert!(lines[0].starts_with("  [2] b  body of b"));
        assert!(lines[1].starts_with("> [1] a  body of a"));
        assert!(!rendered.contains("second line"));
    }

    #[test]
    fn editor_without_note_shows_hint() {
        assert_eq!(render_editor(None), "No note selected.");
        let n = note(1, "t", "bad");
        assert!(render_editor(Some(&n)).ends_with(NO_DATE));
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command("ls"), Ok(Command::List));
        assert_eq!(
            parse_command("select 12"),
            Ok(Command::Intent(Intent::Select(12)))
        );
        assert_eq!(
            parse_command("  title  Hello world "),
            Ok(Command::SetTitle("Hello world".to_string()))
        );
        assert_eq!(parse_command("title"), Ok(Command::SetTitle(String::new())));
        assert_eq!(
            parse_command(r"content a\nb"),
            Ok(Command::SetContent("a\nb".to_string()))
        );
        assert!(parse_command("delete x").is_err());
        assert!(parse_command("frobnicate").is_err());
    }
}
