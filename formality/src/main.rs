use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Parse Formality definitions and terms, printing the results to stdout
#[derive(Parser)]
#[clap(author, version, about)]
enum Cli {
    /// Read the definitions in a file, printing every definition that was read
    ///
    /// The text that was read is written next to the file, to a companion file
    /// whose name has a `c` appended to it.
    Defs {
        /// Path to the definitions file
        #[clap(name = "FILE")]
        file: PathBuf,
    },
    /// Parse a single term, printing the result
    Term {
        /// Path to the term, or `-` to read from stdin
        #[clap(name = "TERM_FILE")]
        term_file: PathOrStdin,
    },
    /// Read the definitions in a file, printing a single definition
    Show {
        /// Path to the definitions file
        #[clap(name = "FILE")]
        file: PathBuf,
        /// Name of the definition to print
        #[clap(name = "NAME")]
        name: String,
    },
}

#[derive(Clone, Debug)]
enum PathOrStdin {
    StdIn,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(src: &str) -> Result<PathOrStdin, std::convert::Infallible> {
        match src {
            "-" => Ok(PathOrStdin::StdIn),
            _ => Ok(PathOrStdin::Path(PathBuf::from(src))),
        }
    }
}

fn unwrap_or_exit<T>(option: Option<T>) -> T {
    option.unwrap_or_else(|| std::process::exit(formality::Status::Error.exit_code()))
}

fn load_file_or_exit(driver: &mut formality::Driver, file: PathOrStdin) -> formality::source::FileId {
    unwrap_or_exit(match file {
        PathOrStdin::StdIn => driver.load_source("<stdin>".to_owned(), std::io::stdin()),
        PathOrStdin::Path(path) => driver.load_source_path(&path),
    })
}

const MAX_PRETTY_WIDTH: usize = 80;

fn get_pretty_width() -> usize {
    let term_width = termsize::get().map_or(usize::MAX, |size| usize::from(size.cols));
    std::cmp::min(term_width, MAX_PRETTY_WIDTH)
}

/// Environment variable holding the log filter, in `tracing_subscriber`'s
/// `EnvFilter` syntax.
const LOG_ENV: &str = "FORMALITY_LOG";

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .with_writer(std::io::stderr)
        .init();
}

fn new_driver() -> formality::Driver {
    let mut driver = formality::Driver::new();
    driver.install_panic_hook();
    driver.set_emit_width(get_pretty_width());
    driver
}

fn main() -> ! {
    init_logging();

    let status = match Cli::parse() {
        Cli::Defs { file } => {
            let mut driver = new_driver();
            let file_id = unwrap_or_exit(driver.load_source_path(&file));
            driver.parse_and_emit_definitions(file_id, &file)
        }
        Cli::Term { term_file } => {
            let mut driver = new_driver();
            let file_id = load_file_or_exit(&mut driver, term_file);
            driver.parse_and_emit_term(file_id)
        }
        Cli::Show { file, name } => {
            let mut driver = new_driver();
            let file_id = unwrap_or_exit(driver.load_source_path(&file));
            driver.parse_and_emit_definition(file_id, &file, &name)
        }
    };

    std::process::exit(status.exit_code());
}
