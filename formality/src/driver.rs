use codespan_reporting::diagnostic::{Diagnostic, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{BufferedStandardStream, ColorChoice, WriteColor};
use std::cell::RefCell;
use std::io::{Read, Write};
use std::path::Path;

use crate::core::pretty;
use crate::env::Scope;
use crate::reporting::Message;
use crate::source::{FileId, ProgramSource};
use crate::surface::{self, Module};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }
}

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

pub struct Driver {
    files: SimpleFiles<String, ProgramSource>,

    seen_errors: RefCell<bool>,
    codespan_config: codespan_reporting::term::Config,
    diagnostic_writer: RefCell<Box<dyn WriteColor>>,

    emit_width: usize,
    emit_writer: RefCell<Box<dyn WriteColor>>,
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            files: SimpleFiles::new(),

            seen_errors: RefCell::new(false),
            codespan_config: codespan_reporting::term::Config::default(),
            diagnostic_writer: RefCell::new(Box::new(BufferedStandardStream::stderr(
                color_choice(atty::Stream::Stderr),
            ))),

            emit_width: usize::MAX,
            emit_writer: RefCell::new(Box::new(BufferedStandardStream::stdout(color_choice(
                atty::Stream::Stdout,
            )))),
        }
    }

    /// Setup a global panic hook
    pub fn install_panic_hook(&self) {
        // Use the currently set codespan configuration
        let term_config = self.codespan_config.clone();
        // Fetch the default hook (which prints the panic message and an optional backtrace)
        let default_hook = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            let location = info.location();
            let message = if let Some(message) = info.payload().downcast_ref::<String>() {
                message.as_str()
            } else if let Some(message) = info.payload().downcast_ref::<&str>() {
                message
            } else {
                "unknown panic type"
            };

            let diagnostic = Diagnostic::bug()
                .with_message(format!("formality panicked at '{message}'"))
                .with_notes(vec![match location {
                    Some(location) => format!("panicked at: {location}"),
                    None => "panicked at: unknown location".to_owned(),
                }]);

            let mut writer = BufferedStandardStream::stderr(color_choice(atty::Stream::Stderr));
            let dummy_files = SimpleFiles::<String, String>::new();

            default_hook(info);
            eprintln!();
            // Nothing sensible is left to do if this fails while panicking.
            let _ =
                codespan_reporting::term::emit(&mut writer, &term_config, &dummy_files, &diagnostic);
        }));
    }

    /// Set the width to use when emitting rendered terms
    pub fn set_emit_width(&mut self, emit_width: usize) {
        self.emit_width = emit_width;
    }

    /// Load a source string into the file database.
    pub fn load_source_string(&mut self, name: String, source: String) -> Option<FileId> {
        match ProgramSource::try_from(source) {
            Ok(source) => Some(self.files.add(name, source)),
            Err(error) => {
                self.emit_message(Message::SourceTooBig { name, error });
                None
            }
        }
    }

    /// Load a source file into the file database using a reader.
    pub fn load_source(&mut self, name: String, mut reader: impl Read) -> Option<FileId> {
        let mut source = String::new();
        match reader.read_to_string(&mut source) {
            Ok(_) => self.load_source_string(name, source),
            Err(error) => {
                self.emit_read_diagnostic(name, error);
                None
            }
        }
    }

    /// Load a source file into the file database from the given path.
    pub fn load_source_path(&mut self, path: &Path) -> Option<FileId> {
        match std::fs::File::open(path) {
            Ok(file) => self.load_source(path.display().to_string(), file),
            Err(error) => {
                self.emit_read_diagnostic(path.display(), error);
                None
            }
        }
    }

    /// Read the definitions in a file, write its companion file next to
    /// `path`, and emit every definition that was read.
    pub fn parse_and_emit_definitions(&mut self, file_id: FileId, path: &Path) -> Status {
        let module = self.parse_module(file_id, path);

        // Return early if the companion file couldn't be written
        if self.seen_errors() {
            return Status::Error;
        }

        let context = pretty::Context::new();
        self.emit_doc(context.definitions(&module.definitions));

        self.status()
    }

    /// Read the definitions in a file, write its companion file next to
    /// `path`, and emit the definition called `name`.
    pub fn parse_and_emit_definition(&mut self, file_id: FileId, path: &Path, name: &str) -> Status {
        let module = self.parse_module(file_id, path);

        if self.seen_errors() {
            return Status::Error;
        }

        match module.definitions.get(name) {
            Some(definition) => {
                let context = pretty::Context::new();
                self.emit_doc(context.definition(name, definition));
            }
            None => {
                let names = module.definitions.keys().map(String::as_str);
                self.emit_message(Message::unknown_definition(file_id, name, names));
            }
        }

        self.status()
    }

    /// Parse a single term in the empty scope and emit it.
    pub fn parse_and_emit_term(&mut self, file_id: FileId) -> Status {
        let scope = Scope::new();
        match surface::parse_term(self.source(file_id), &scope) {
            Ok(term) => {
                let context = pretty::Context::new();
                self.emit_doc(context.term(&scope, &term));
            }
            Err(error) => self.emit_message(Message::Parse { file_id, error }),
        }

        self.status()
    }

    fn source(&self, file_id: FileId) -> &str {
        match self.files.get(file_id) {
            Ok(file) => file.source().as_str(),
            Err(error) => panic!("file {file_id} was never loaded: {error}"),
        }
    }

    fn parse_module(&self, file_id: FileId, path: &Path) -> Module {
        let module = Module::parse(self.source(file_id));
        if let Err(error) = module.write_companion(path) {
            let path = surface::companion_path(path);
            let error = error.to_string();
            self.emit_message(Message::CompanionWrite { path, error });
        }
        module
    }

    fn emit_doc(&self, doc: ::pretty::RcDoc) {
        let mut emit_writer = self.emit_writer.borrow_mut();
        let result = writeln!(emit_writer, "{}", doc.pretty(self.emit_width))
            .and_then(|()| emit_writer.flush());
        if let Err(error) = result {
            self.emit_diagnostic(
                Diagnostic::error().with_message(format!("couldn't write output: {error}")),
            );
        }
    }

    fn emit_message(&self, message: Message) {
        self.emit_diagnostic(message.to_diagnostic());
    }

    fn emit_diagnostic(&self, diagnostic: Diagnostic<FileId>) {
        let mut writer = self.diagnostic_writer.borrow_mut();
        let config = &self.codespan_config;

        // Diagnostics go to stderr; if that fails there is nowhere left to report to.
        let _ = codespan_reporting::term::emit(&mut *writer, config, &self.files, &diagnostic)
            .and_then(|()| writer.flush().map_err(Into::into));

        if diagnostic.severity >= Severity::Error {
            *self.seen_errors.borrow_mut() = true;
        }
    }

    fn emit_read_diagnostic(&self, name: impl std::fmt::Display, error: std::io::Error) {
        let diagnostic =
            Diagnostic::error().with_message(format!("couldn't read `{name}`: {error}"));
        self.emit_diagnostic(diagnostic);
    }

    /// Returns true if an error has been reported.
    fn seen_errors(&self) -> bool {
        *self.seen_errors.borrow()
    }

    fn status(&self) -> Status {
        match self.seen_errors() {
            true => Status::Error,
            false => Status::Ok,
        }
    }
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}
