use super::*;

use std::collections::BTreeSet;

pub(super) const SAVE_USAGE: &str =
    "Kaydedilecek bir yazı girmelisin. Örnek:\n/save Kırmızı Pazartesi - Gabriel García Márquez";
pub(super) const FIND_USAGE: &str = "Aramak istediğin kelimeyi yazmalısın. Örnek:\n/find aşk";
pub(super) const DELETE_USAGE: &str =
    "Silmek istediğin kayıt numaralarını yazmalısın. Örnek:\n/delete 1 3 5";
pub(super) const EDIT_USAGE: &str =
    "Düzenlemek istediğin kaydın numarasını ve yeni yazıyı girmelisin. Örnek:\n/edit 2 Simyacı - Paulo Coelho";
pub(super) const EMPTY_NOTICE: &str = "Henüz kayıtlı kitap yok 📭";
pub(super) const NO_VALID_POSITION: &str = "⚠️ Geçerli bir numara bulunamadı.";
pub(super) const EXPORT_CAPTION: &str = "📚 İşte kayıtlı kitaplar dosyan!";

/// A parsed record-keeping command. Arguments are kept raw; validation happens
/// against the loaded list in [`apply_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ListCommand {
    Save(String),
    List,
    Find(String),
    Delete(Vec<String>),
    Edit { position: String, text: String },
    Export,
}

impl ListCommand {
    pub(super) fn parse(cmd: &str, rest: &str) -> Option<Self> {
        let args: Vec<&str> = rest.split_whitespace().collect();
        let command = match cmd {
            "save" => ListCommand::Save(args.join(" ")),
            "kitaplar" | "list" => ListCommand::List,
            "find" => ListCommand::Find(args.join(" ")),
            "delete" => ListCommand::Delete(args.iter().map(|a| a.to_string()).collect()),
            "edit" => {
                let (position, text) = match args.split_first() {
                    Some((position, text)) => (position.to_string(), text.join(" ")),
                    None => (String::new(), String::new()),
                };
                ListCommand::Edit { position, text }
            }
            "export" => ListCommand::Export,
            _ => return None,
        };
        Some(command)
    }

    /// The usage hint for a command missing its arguments. Checked before the
    /// store is touched.
    pub(super) fn usage_hint(&self) -> Option<&'static str> {
        match self {
            ListCommand::Save(text) if text.trim().is_empty() => Some(SAVE_USAGE),
            ListCommand::Find(query) if query.trim().is_empty() => Some(FIND_USAGE),
            ListCommand::Delete(args) if args.is_empty() => Some(DELETE_USAGE),
            ListCommand::Edit { position, text }
                if position.is_empty() || text.trim().is_empty() =>
            {
                Some(EDIT_USAGE)
            }
            _ => None,
        }
    }

    pub(super) fn is_mutating(&self) -> bool {
        matches!(
            self,
            ListCommand::Save(_) | ListCommand::Delete(_) | ListCommand::Edit { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum CommandOutcome {
    /// Nothing changed; just answer.
    Reply(String),
    /// The list was modified and must be written back before answering.
    Changed(String),
    Document { bytes: Vec<u8>, caption: String },
}

pub(super) fn apply_command(
    entries: &mut Vec<String>,
    command: &ListCommand,
) -> Result<CommandOutcome> {
    if let Some(hint) = command.usage_hint() {
        return Ok(CommandOutcome::Reply(hint.to_string()));
    }

    let outcome = match command {
        ListCommand::Save(text) => {
            let text = text.trim();
            entries.push(text.to_string());
            CommandOutcome::Changed(format!("✅ Yazı kaydedildi!\n📝 {}", text))
        }
        ListCommand::List => match format_listing(entries) {
            Some(listing) => CommandOutcome::Reply(format!("📚 Okunan Kitaplar:\n\n{}", listing)),
            None => CommandOutcome::Reply(EMPTY_NOTICE.to_string()),
        },
        ListCommand::Find(query) => {
            let query = query.trim().to_lowercase();
            let results = search_entries(entries, &query);
            if results.is_empty() {
                CommandOutcome::Reply(format!(
                    "🔍 '{}' kelimesini içeren kayıt bulunamadı.",
                    query
                ))
            } else {
                let lines = results
                    .iter()
                    .map(|(position, text)| format!("{}. {}", position, text))
                    .collect::<Vec<_>>()
                    .join("\n");
                CommandOutcome::Reply(format!("🔍 Arama Sonuçları ({}):\n\n{}", query, lines))
            }
        }
        ListCommand::Delete(args) => {
            let removed = delete_positions(entries, args);
            if removed.is_empty() {
                CommandOutcome::Reply(NO_VALID_POSITION.to_string())
            } else {
                let lines = removed
                    .iter()
                    .map(|text| format!("- {}", text))
                    .collect::<Vec<_>>()
                    .join("\n");
                CommandOutcome::Changed(format!("🗑️ Silinen Kayıtlar:\n{}", lines))
            }
        }
        ListCommand::Edit { position, text } => {
            let text = text.trim();
            match edit_entry(entries, position, text) {
                Some(old) => CommandOutcome::Changed(format!(
                    "✏️ Kayıt güncellendi:\nEski: {}\nYeni: {}",
                    old, text
                )),
                None => CommandOutcome::Reply(NO_VALID_POSITION.to_string()),
            }
        }
        ListCommand::Export => {
            if entries.is_empty() {
                CommandOutcome::Reply(EMPTY_NOTICE.to_string())
            } else {
                CommandOutcome::Document {
                    bytes: serialize_entries(entries)?,
                    caption: EXPORT_CAPTION.to_string(),
                }
            }
        }
    };
    Ok(outcome)
}

/// `"1. first\n2. second"`, or `None` for an empty list.
pub(super) fn format_listing(entries: &[String]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let lines = entries
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {}", i + 1, text))
        .collect::<Vec<_>>();
    Some(lines.join("\n"))
}

/// Case-insensitive containment. Returned positions are 1-based.
pub(super) fn search_entries(entries: &[String], query: &str) -> Vec<(usize, String)> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    entries
        .iter()
        .enumerate()
        .filter(|(_, text)| text.to_lowercase().contains(&needle))
        .map(|(i, text)| (i + 1, text.clone()))
        .collect()
}

/// Turns a user-supplied 1-based position into a 0-based index, if it is all
/// ASCII digits and inside the list.
pub(super) fn parse_position(arg: &str, len: usize) -> Option<usize> {
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let position = arg.parse::<usize>().ok()?;
    if position == 0 || position > len {
        return None;
    }
    Some(position - 1)
}

/// Removes every valid position (duplicates count once) and returns the removed
/// texts in their original order. Invalid arguments are dropped silently.
pub(super) fn delete_positions(entries: &mut Vec<String>, args: &[String]) -> Vec<String> {
    let indices: BTreeSet<usize> = args
        .iter()
        .filter_map(|arg| parse_position(arg, entries.len()))
        .collect();
    let mut removed: Vec<String> = indices
        .iter()
        .rev()
        .map(|&index| entries.remove(index))
        .collect();
    removed.reverse();
    removed
}

/// Replaces the entry at `position` and returns the previous text.
pub(super) fn edit_entry(entries: &mut [String], position: &str, text: &str) -> Option<String> {
    let index = parse_position(position, entries.len())?;
    Some(std::mem::replace(&mut entries[index], text.to_string()))
}

pub(super) fn serialize_entries(entries: &[String]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(entries).context("serialize entries")
}
