//! Corpus fixtures and error helpers shared by the CLI tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::{Cli, CliError, run_cli};

const DOCUMENTS: [(&str, &str); 4] = [
    (
        "austen_emma",
        "Emma Woodhouse, handsome, clever, and rich, with a comfortable home and happy \
         disposition, seemed to unite some of the best blessings of existence; and she \
         had lived nearly twenty-one years in the world with very little to vex her.",
    ),
    (
        "austen_persuasion",
        "Sir Walter Elliot, of Kellynch Hall, was a man who, for his own amusement, never \
         took up any book but the Baronetage; and she was of the family, and she had the \
         best of the house, and it was a very comfortable home to her.",
    ),
    (
        "bronte_jane",
        "There was no possibility of taking a walk that day. I was glad of it: I never \
         liked long walks, especially on chilly afternoons; dreadful to me was the coming \
         home in the raw twilight, with nipped fingers and toes.",
    ),
    (
        "bronte_villette",
        "My godmother lived in a handsome house in the clean and ancient town of Bretton. \
         I liked the visit; I was glad of the large peaceful rooms, and I never wished that \
         the wind and the rain would bring me home again.",
    ),
];

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

/// Writes the four-document corpus below `root` and returns its path.
pub(super) fn write_corpus(root: &Path) -> io::Result<PathBuf> {
    let corpus = root.join("corpus");
    fs::create_dir_all(&corpus)?;
    for (name, text) in DOCUMENTS {
        fs::write(corpus.join(format!("{name}.txt")), text)?;
    }
    Ok(corpus)
}

/// Options for a one-cutoff sweep of `corpus`.
pub(super) fn small_sweep(corpus: &Path) -> Cli {
    let mut cli = Cli::for_corpus(corpus);
    cli.words = vec!["50".to_owned()];
    cli
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
