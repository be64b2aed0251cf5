//! Top-level definitions.
//!
//! A definitions file is a sequence of
//!
//! ```text
//! name : type [//loop//] [//prim//] body
//! ```
//!
//! Definitions are read one after another until one fails to parse, at which
//! point reading stops without reporting anything. Everything read before that
//! point is kept, along with the exact source text it was read from.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::{Definition, Definitions, Meta};
use crate::env::Scope;
use crate::surface::{ParseError, Parser};

/// Marks a definition that may be non-terminating.
pub const LOOP_MARKER: &str = "//loop//";
/// Marks a definition that is opaque to reduction.
pub const PRIM_MARKER: &str = "//prim//";
/// Appended to the path of a source file to name its companion file.
pub const COMPANION_SUFFIX: &str = "c";

/// The parsed prefix of a definitions file.
#[derive(Debug, Clone)]
pub struct Module {
    pub definitions: Definitions,
    /// The source text of every definition that was read, verbatim.
    pub consumed: String,
}

impl Module {
    pub fn parse(source: &str) -> Module {
        let mut parser = Parser::new(source);
        let mut definitions = Definitions::default();

        let error = loop {
            let start = parser.pos();
            match parser.attempt(Parser::definition) {
                Ok((name, definition)) => {
                    tracing::trace!(name, start, end = parser.pos(), "read definition");
                    definitions.insert(name.to_owned(), definition);
                }
                Err(error) => break error,
            }
        };

        // Trailing trivia belongs to the module only if nothing follows it.
        let offset = parser.pos();
        let checkpoint = parser.checkpoint();
        parser.skip_trivia();
        if !parser.is_at_end() {
            parser.rewind(checkpoint);
        }

        tracing::debug!(
            offset,
            definitions = definitions.len(),
            exhausted = parser.is_at_end(),
            %error,
            "stopped reading definitions",
        );

        Module {
            definitions,
            consumed: parser.into_consumed(),
        }
    }

    /// Write the consumed text next to `path`, returning the companion path.
    pub fn write_companion(&self, path: &Path) -> io::Result<PathBuf> {
        let companion = companion_path(path);
        fs::write(&companion, &self.consumed)?;
        tracing::debug!(
            path = %companion.display(),
            len = self.consumed.len(),
            "wrote companion file",
        );
        Ok(companion)
    }
}

/// The path of the companion file for `path`: the same path with
/// [`COMPANION_SUFFIX`] appended.
pub fn companion_path(path: &Path) -> PathBuf {
    let mut companion = OsString::from(path.as_os_str());
    companion.push(COMPANION_SUFFIX);
    PathBuf::from(companion)
}

/// Read the definitions in `source`, writing the text that was consumed to the
/// companion file of `path`.
pub fn parse_defs(source: &str, path: &Path) -> io::Result<Definitions> {
    let module = Module::parse(source);
    module.write_companion(path)?;
    Ok(module.definitions)
}

impl<'source> Parser<'source> {
    fn definition(&mut self) -> Result<(&'source str, Definition), ParseError> {
        self.skip_trivia();
        let name = self.name()?;
        self.skip_trivia();
        self.expect(":")?;
        let r#type = self.term(&Scope::new())?;

        // Markers are comments, so only whitespace may precede them.
        self.skip_whitespace();
        let r#loop = self.accept(LOOP_MARKER);
        self.skip_whitespace();
        let prim = self.accept(PRIM_MARKER);

        let body = self.term(&Scope::new())?;

        Ok((
            name,
            Definition {
                r#type,
                body,
                meta: Meta { r#loop, prim },
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Erasure, Term};
    use crate::env::Index;
    use crate::source::ByteRange;
    use crate::surface::{parse_term, NAT_SUCC, NAT_ZERO};

    const NOWHERE: ByteRange = ByteRange::new(0, 0);

    fn definition<'a>(module: &'a Module, name: &str) -> &'a Definition {
        match module.definitions.get(name) {
            Some(definition) => definition,
            None => panic!("missing definition `{name}`"),
        }
    }

    #[test]
    fn single_definition() {
        let module = Module::parse("f : Type Type");

        assert_eq!(module.definitions.len(), 1);
        let f = definition(&module, "f");
        assert_eq!(f.r#type, Term::Typ(NOWHERE));
        assert_eq!(f.body, Term::Typ(NOWHERE));
        assert_eq!(f.meta, Meta::default());
        assert_eq!(module.consumed, "f : Type Type");
    }

    #[test]
    fn numeral_bodies() {
        let module = Module::parse("n : Nat #0\nm : Nat #3\n");

        assert_eq!(definition(&module, "n").body, Term::Ref(NOWHERE, NAT_ZERO.to_owned()));

        let succ = |term| {
            Term::App(
                NOWHERE,
                Erasure::Kept,
                Box::new(Term::Ref(NOWHERE, NAT_SUCC.to_owned())),
                Box::new(term),
            )
        };
        let three = succ(succ(succ(Term::Ref(NOWHERE, NAT_ZERO.to_owned()))));
        assert_eq!(definition(&module, "m").body, three);
    }

    #[test]
    fn whole_file_is_consumed() {
        let source = "\
// Identity on types
id : (A : Type) -> Type
  (A) => A

{- Church booleans -}
Bool : Type
  <P : Type> -> P -> P -> P
";
        let module = Module::parse(source);

        assert_eq!(module.definitions.len(), 2);
        assert_eq!(module.consumed, source);
    }

    #[test]
    fn stops_silently_at_first_failure() {
        let source = "a : Type Type\nb : Type (\nc : Type Type\n";
        let module = Module::parse(source);

        assert_eq!(module.definitions.len(), 1);
        assert!(module.definitions.contains_key("a"));
        assert_eq!(module.consumed, "a : Type Type");
    }

    #[test]
    fn empty_source() {
        let module = Module::parse("");

        assert!(module.definitions.is_empty());
        assert_eq!(module.consumed, "");
    }

    #[test]
    fn only_trivia() {
        let module = Module::parse("  // nothing here\n/* or here */\n");

        assert!(module.definitions.is_empty());
        assert_eq!(module.consumed, "  // nothing here\n/* or here */\n");
    }

    #[test]
    fn unterminated_comment_is_trailing_trivia() {
        let source = "f : Type Type\n/* never closed";
        let module = Module::parse(source);

        assert_eq!(module.definitions.len(), 1);
        assert_eq!(module.consumed, source);
    }

    #[test]
    fn later_duplicates_replace_earlier_ones() {
        let module = Module::parse("x : Type Type\nx : Type Type :: Type\n");

        assert_eq!(module.definitions.len(), 1);
        assert!(matches!(definition(&module, "x").body, Term::Ann(..)));
    }

    #[test]
    fn loop_and_prim_markers() {
        let module = Module::parse(
            "a : Type //loop// Type\n\
             b : Type //prim// Type\n\
             c : Type //loop// //prim// Type\n\
             d : Type\n  //loop//\n  Type\n",
        );

        let meta = |name| definition(&module, name).meta;
        assert_eq!(meta("a"), Meta { r#loop: true, prim: false });
        assert_eq!(meta("b"), Meta { r#loop: false, prim: true });
        assert_eq!(meta("c"), Meta { r#loop: true, prim: true });
        assert_eq!(meta("d"), Meta { r#loop: true, prim: false });
    }

    #[test]
    fn markers_out_of_order_are_comments() {
        let module = Module::parse("a : Type //prim// //loop//\n  Type\n");

        let a = definition(&module, "a");
        assert_eq!(a.meta, Meta { r#loop: false, prim: true });
        assert_eq!(a.body, Term::Typ(NOWHERE));
    }

    #[test]
    fn marker_after_a_comment_is_ignored() {
        let module = Module::parse("a : Type /* c */ //loop//\n  Type\n");

        let a = definition(&module, "a");
        assert_eq!(a.meta, Meta::default());
        assert_eq!(a.body, Term::Typ(NOWHERE));
    }

    #[test]
    fn types_and_bodies_start_in_an_empty_scope() {
        let module = Module::parse("k : Type (x) => (y) => x\n");

        let expected = parse_term("(x) => (y) => x", &Scope::new()).unwrap();
        assert_eq!(definition(&module, "k").body, expected);
        match &definition(&module, "k").body {
            Term::Lam(_, _, _, body) => match &**body {
                Term::Lam(_, _, _, body) => assert_eq!(**body, Term::Var(NOWHERE, Index::new(1))),
                term => panic!("expected function literal, found {term:?}"),
            },
            term => panic!("expected function literal, found {term:?}"),
        }
    }

    #[test]
    fn companion_path_appends_suffix() {
        assert_eq!(companion_path(Path::new("dir/Base.fm")), Path::new("dir/Base.fmc"));
    }

    #[test]
    fn parse_defs_writes_companion() {
        let dir = std::env::temp_dir().join(format!("formality-defs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Partial.fm");
        let source = "a : Type Type\nb : ) oops\n";

        let definitions = parse_defs(source, &path).unwrap();

        assert_eq!(definitions.len(), 1);
        let companion = fs::read_to_string(dir.join("Partial.fmc")).unwrap();
        assert_eq!(companion, "a : Type Type");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parse_defs_reports_unwritable_companion() {
        let path = Path::new("/this/directory/does/not/exist/File.fm");

        assert!(parse_defs("a : Type Type", path).is_err());
    }
}
