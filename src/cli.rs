use crate::core::SortSpec;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// paste_packer – pick files from a folder and pack them into one text block
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding preferences.json (defaults to the per-user config dir)
    #[arg(long, value_name = "DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Files larger than this many bytes are listed but not read
    #[arg(long, value_name = "BYTES", global = true)]
    pub max_file_size: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a folder; the selection is reset to the default files
    Open {
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,
    },
    /// Scan the opened folder again, keeping the current selection
    Rescan,
    /// Show the opened folder, the last status and the selection totals
    Status,
    /// Print the displayed (filtered and sorted) files with selection markers
    List,
    /// Print the displayed files as a folder tree
    Tree,
    /// Set the search filter; an empty term clears it
    Search {
        #[arg(value_name = "TERM", default_value = "")]
        term: String,
    },
    /// Set the sort order: tokens-desc, tokens-asc, name-asc, name-desc, size-asc or size-desc
    Sort {
        #[arg(value_name = "ORDER")]
        order: SortSpec,
    },
    /// Toggle one file in or out of the selection
    Toggle {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Select every eligible file under a folder
    SelectFolder {
        #[arg(value_name = "FOLDER")]
        folder: String,
    },
    /// Deselect every eligible file under a folder
    DeselectFolder {
        #[arg(value_name = "FOLDER")]
        folder: String,
    },
    /// Select every eligible file in the displayed list
    SelectAll,
    /// Deselect every file in the displayed list
    DeselectAll,
    /// Collapse or expand a folder in the tree
    Expand {
        #[arg(value_name = "FOLDER")]
        folder: String,
    },
    /// Print the content of one file
    View {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Replace a file's content with the content of another file and save it
    Edit {
        #[arg(value_name = "PATH")]
        path: String,
        #[arg(long, value_name = "FILE")]
        from: PathBuf,
    },
    /// Assemble the selected files and write them to stdout or a file
    Copy {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

pub fn level_filter(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
