//! The process-wide destination of statistics. Nothing is written until
//! [`configure_statistic_logging`] has been called.

use std::fmt::Display;
use std::io::stdout;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

/// Where and how statistics are written: every statistic becomes a line
/// `{prefix} {name}={value}`, and [`log_statistic_postfix`] writes the closing line.
struct StatisticSink {
    prefix: &'static str,
    postfix: Option<&'static str>,
    casing: Option<Case>,
    writer: Mutex<Box<dyn Write + Send + Sync>>,
}

impl StatisticSink {
    fn line(&self, name: impl Display, value: impl Display) -> String {
        let name = match self.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        format!("{} {name}={value}", self.prefix)
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
        }
    }
}

static STATISTIC_SINK: OnceLock<StatisticSink> = OnceLock::new();

/// Configures the logging of the statistics.
///
/// `prefix` starts every statistic line, `after` is the closing line written by
/// [`log_statistic_postfix`], and `casing` converts the names of the statistics (for example
/// `run_num_samples` to `runNumSamples`). Statistics go to stdout unless a `writer` is given. Only
/// the first call has an effect.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_SINK.get_or_init(|| StatisticSink {
        prefix,
        postfix: after,
        casing,
        writer: Mutex::new(writer.unwrap_or(Box::new(stdout()))),
    });
}

/// Logs the statistic `name` with `value`.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(sink) = STATISTIC_SINK.get() {
        sink.write_line(&sink.line(name, value));
    }
}

/// Writes the closing line of the statistics, if one was configured.
pub fn log_statistic_postfix() {
    if let Some(sink) = STATISTIC_SINK.get() {
        if let Some(postfix) = sink.postfix {
            sink.write_line(postfix);
        }
    }
}

pub fn should_log_statistics() -> bool {
    STATISTIC_SINK.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(casing: Option<Case>) -> StatisticSink {
        let writer: Box<dyn Write + Send + Sync> = Box::new(Vec::new());
        StatisticSink {
            prefix: "%%%cpbp-stat:",
            postfix: None,
            casing,
            writer: Mutex::new(writer),
        }
    }

    #[test]
    fn statistic_lines_carry_the_prefix() {
        assert_eq!(
            sink(None).line("engine_num_conflicts", 3),
            "%%%cpbp-stat: engine_num_conflicts=3"
        );
    }

    #[test]
    fn names_are_converted_to_the_casing() {
        assert_eq!(
            sink(Some(Case::Camel)).line("run_num_samples", 12),
            "%%%cpbp-stat: runNumSamples=12"
        );
    }
}
