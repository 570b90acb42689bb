//! Build or update the sqlite index over a reorganized tree.

use std::{error::Error, path::PathBuf};

use clap::Arg;

use cdap_data::{Archive, CommonCmdLineArgs};

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
        "cdap-load",
        "Index a reorganized CDAP tree in the archive database.",
    )
    .arg(
        Arg::with_name("create")
            .long("create")
            .help("Create the archive at `root` if it does not exist."),
    )
    .arg(
        Arg::with_name("tree")
            .index(1)
            .takes_value(true)
            .help("Root of the reorganized tree to index.")
            .long_help(concat!(
                "Root of the reorganized tree to index. Defaults to 'restructured' ",
                "under the archive root."
            )),
    );

    let (common, matches) = CommonCmdLineArgs::matches(app)?;

    let arch = if matches.is_present("create") {
        Archive::create(&common.root())?
    } else {
        Archive::connect(&common.root())?
    };

    let tree = matches
        .value_of("tree")
        .map(PathBuf::from)
        .unwrap_or_else(|| common.root().join("restructured"));

    let count = arch.load_tree(&tree)?;
    println!(
        "indexed {} new datasets, {} total",
        count,
        arch.dataset_count()?
    );

    Ok(())
}
