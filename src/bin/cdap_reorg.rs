//! Reorganize legacy CDAP acquisition directories into per-dataset
//! directories of normalized csv files.

use std::{
    error::Error,
    path::{Path, PathBuf},
};

use clap::Arg;

use cdap_data::{process_directory, run_batch, CdapDataErr, CommonCmdLineArgs};

fn main() {
    env_logger::init();

    if let Err(ref e) = run() {
        println!("error: {}", e);

        let mut cause = e.source();
        while let Some(c) = cause {
            println!("caused by: {}", c);
            cause = c.source();
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let app = CommonCmdLineArgs::new_app(
        "cdap-reorg",
        "Reorganize legacy CDAP acquisition directories.",
    )
    .arg(
        Arg::with_name("out")
            .short("o")
            .long("out")
            .takes_value(true)
            .help("Directory the reorganized tree is written to.")
            .long_help(concat!(
                "Directory the reorganized tree is written to. Defaults to ",
                "'restructured' under the archive root."
            )),
    )
    .arg(
        Arg::with_name("master-list")
            .short("l")
            .long("master-list")
            .takes_value(true)
            .help("File listing acquisition directories to process, one per line.")
            .long_help(concat!(
                "File listing acquisition directories to process, one per line. ",
                "Completed directories are appended to completed.txt and failed ",
                "ones written to error_list.txt next to this file."
            )),
    )
    .arg(
        Arg::with_name("retry-errors")
            .long("retry-errors")
            .requires("master-list")
            .help("Process the error list of a previous run instead of the master list."),
    )
    .arg(
        Arg::with_name("data-dir")
            .index(1)
            .takes_value(true)
            .help("A single acquisition directory to process."),
    );

    let (common, matches) = CommonCmdLineArgs::matches(app)?;

    let out_root = matches
        .value_of("out")
        .map(PathBuf::from)
        .unwrap_or_else(|| common.root().join("restructured"));

    match (matches.value_of("master-list"), matches.value_of("data-dir")) {
        (Some(list), _) => {
            let list = if matches.is_present("retry-errors") {
                Path::new(list)
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join("error_list.txt")
            } else {
                PathBuf::from(list)
            };
            let summary = run_batch(&list, &out_root)?;
            println!(
                "completed {}, skipped {}, failed {}",
                summary.completed, summary.skipped, summary.failed
            );
        }
        (None, Some(dir)) => {
            if process_directory(Path::new(dir), &out_root)? {
                println!("processed {}", dir);
            } else {
                println!("skipped {}, no upwelling data", dir);
            }
        }
        (None, None) => {
            return Err(Box::new(CdapDataErr::GeneralError(
                "provide a data directory or --master-list".to_owned(),
            )));
        }
    }

    Ok(())
}
