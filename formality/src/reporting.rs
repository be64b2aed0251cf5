//! Diagnostic messages reported by the command line tool.
//!
//! These can be converted to [`Diagnostic`]s in order to present them to the user.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use std::path::PathBuf;

use crate::source::{FileId, SourceTooBig, MAX_SOURCE_LEN};
use crate::surface::ParseError;

/// The furthest a name may be from a definition name for that definition to be
/// suggested in its place.
fn suggestion_distance(name: &str) -> usize {
    std::cmp::max(1, name.chars().count() / 3)
}

#[derive(Debug, Clone)]
pub enum Message {
    /// A term did not parse.
    Parse { file_id: FileId, error: ParseError },
    /// A source file exceeded the addressable length.
    SourceTooBig { name: String, error: SourceTooBig },
    /// The requested definition was not read from the file.
    UnknownDefinition {
        file_id: FileId,
        name: String,
        suggestion: Option<String>,
    },
    /// The companion file of a definitions file could not be written.
    CompanionWrite { path: PathBuf, error: String },
}

impl Message {
    pub fn unknown_definition<'a>(
        file_id: FileId,
        name: &str,
        candidates: impl Iterator<Item = &'a str>,
    ) -> Message {
        Message::UnknownDefinition {
            file_id,
            name: name.to_owned(),
            suggestion: suggest_name(name, candidates).map(str::to_owned),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Message::Parse { file_id, error } => error.to_diagnostic(*file_id),
            Message::SourceTooBig { name, error } => Diagnostic::error()
                .with_message(format!("`{name}` is too big to be read"))
                .with_notes(vec![format!(
                    "the file is {} bytes long, but at most {MAX_SOURCE_LEN} are supported",
                    error.actual_len,
                )]),
            Message::UnknownDefinition {
                file_id,
                name,
                suggestion,
            } => {
                let diagnostic = Diagnostic::error()
                    .with_message(format!("cannot find a definition named `{name}`"))
                    .with_labels(vec![Label::primary(*file_id, 0..0)
                        .with_message("definitions were read from this file")]);

                match suggestion {
                    Some(suggestion) => {
                        diagnostic.with_notes(vec![format!("help: did you mean `{suggestion}`?")])
                    }
                    None => diagnostic,
                }
            }
            Message::CompanionWrite { path, error } => Diagnostic::error().with_message(format!(
                "couldn't write `{}`: {error}",
                path.display(),
            )),
        }
    }
}

/// The candidate closest to `name`, if any is close enough to be a likely typo.
pub fn suggest_name<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .map(|candidate| (levenshtein::levenshtein(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= suggestion_distance(name))
        .min()
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_closest_name() {
        let names = ["Nat.succ", "Nat.zero", "Bool"];

        assert_eq!(suggest_name("Nat.suc", names.into_iter()), Some("Nat.succ"));
        assert_eq!(suggest_name("Bol", names.into_iter()), Some("Bool"));
    }

    #[test]
    fn distant_names_are_not_suggested() {
        let names = ["Nat.succ", "Bool"];

        assert_eq!(suggest_name("List", names.into_iter()), None);
        assert_eq!(suggest_name("x", std::iter::empty()), None);
    }

    #[test]
    fn ties_prefer_the_lexically_smaller_name() {
        let names = ["ab", "aa"];

        assert_eq!(suggest_name("a", names.into_iter()), Some("aa"));
    }

    #[test]
    fn unknown_definition_has_help_note() {
        let message = Message::unknown_definition(0, "Bol", ["Bool"].into_iter());
        let diagnostic = message.to_diagnostic();

        assert_eq!(diagnostic.message, "cannot find a definition named `Bol`");
        assert_eq!(diagnostic.notes, vec!["help: did you mean `Bool`?".to_owned()]);
    }
}
