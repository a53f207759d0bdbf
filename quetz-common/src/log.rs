// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{io::Write as _, sync::Once, time::Instant};

use env_logger::Builder;

/// Install the process-wide logger.  Only the first call has any
/// effect; later calls (including from other threads) are no-ops.
pub fn init(level_filter: Option<log::LevelFilter>) {
    static INIT_ONCE: Once = Once::new();

    INIT_ONCE.call_once(|| {
        let start = Instant::now();
        let mut builder = Builder::from_env("RUST_LOG");
        if let Some(filter) = level_filter {
            builder.filter_level(filter);
        }
        builder.format(move |buf, record| {
            let elapsed = start.elapsed();
            writeln!(
                buf,
                "{}s{:3}ms {} {}",
                elapsed.as_secs(),
                elapsed.as_millis() % 1000,
                record.level(),
                record.args()
            )
        });
        if let Err(e) = builder.try_init() {
            eprintln!("logging initialization error {e:?}");
        }
    });
}

#[macro_export]
macro_rules! do_log {
    (target: $target:expr, $lvl:expr, $($arg:tt)+) => ({
        let lvl = $lvl;
        if lvl <= ::log::max_level() {
            ::log::logger().log(
                &::log::Record::builder()
                    .args(format_args!($($arg)+))
                    .level(lvl)
                    .target($target)
                    .module_path_static(Some(module_path!()))
                    .file_static(Some(file!()))
                    .line(Some(line!()))
                    .build(),
            );
        }
    });
    ($lvl:expr, $($arg:tt)+) => ($crate::do_log!(target: module_path!(), $lvl, $($arg)+));
}

// Only construct the subject string when the record will be emitted.
#[macro_export]
macro_rules! log_subject {
    ($lvl:expr, $subject:expr) => {{
        if $lvl <= ::log::max_level() {
            format!("{}", $subject)
        } else {
            String::new()
        }
    }};
}

#[macro_export]
macro_rules! qerror {
    ([$subject:expr], $($arg:tt)*) => ({
        let s = $crate::log_subject!(::log::Level::Error, $subject);
        $crate::do_log!(::log::Level::Error, "[{}] {}", s, format!($($arg)*));
    });
    ($($arg:tt)*) => ( $crate::do_log!(::log::Level::Error, $($arg)*); );
}

#[macro_export]
macro_rules! qwarn {
    ([$subject:expr], $($arg:tt)*) => ({
        let s = $crate::log_subject!(::log::Level::Warn, $subject);
        $crate::do_log!(::log::Level::Warn, "[{}] {}", s, format!($($arg)*));
    });
    ($($arg:tt)*) => ( $crate::do_log!(::log::Level::Warn, $($arg)*); );
}

#[macro_export]
macro_rules! qinfo {
    ([$subject:expr], $($arg:tt)*) => ({
        let s = $crate::log_subject!(::log::Level::Info, $subject);
        $crate::do_log!(::log::Level::Info, "[{}] {}", s, format!($($arg)*));
    });
    ($($arg:tt)*) => ( $crate::do_log!(::log::Level::Info, $($arg)*); );
}

#[macro_export]
macro_rules! qdebug {
    ([$subject:expr], $($arg:tt)*) => ({
        let s = $crate::log_subject!(::log::Level::Debug, $subject);
        $crate::do_log!(::log::Level::Debug, "[{}] {}", s, format!($($arg)*));
    });
    ($($arg:tt)*) => ( $crate::do_log!(::log::Level::Debug, $($arg)*); );
}

#[macro_export]
macro_rules! qtrace {
    ([$subject:expr], $($arg:tt)*) => ({
        let s = $crate::log_subject!(::log::Level::Trace, $subject);
        $crate::do_log!(::log::Level::Trace, "[{}] {}", s, format!($($arg)*));
    });
    ($($arg:tt)*) => ( $crate::do_log!(::log::Level::Trace, $($arg)*); );
}
