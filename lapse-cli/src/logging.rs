//! Log file setup

use chrono::Local;
use env_logger::{Builder, Env, Target, WriteStyle};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Routes `log` records to `log_file`, appending, as
/// `YYYY-MM-DD HH:MM:SS,mmm LEVEL:message`.
///
/// The default filter is `info`; `RUST_LOG` overrides it. If the file cannot
/// be opened, records go to stderr instead.
pub fn init(log_file: &Path) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {}:{}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            record.level(),
            record.args()
        )
    });

    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => {
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
        Err(e) => {
            eprintln!(
                "Warning: cannot open log file {} ({}), logging to stderr",
                log_file.display(),
                e
            );
        }
    }

    // A second init (tests) keeps the first logger.
    let _ = builder.try_init();
}
